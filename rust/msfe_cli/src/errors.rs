use std::path::Path;

#[derive(Debug)]
pub enum CliError {
    Config {
        source: String,
    },
    ParseError {
        msg: String,
    },
    Io {
        source: String,
        path: Option<String>,
    },
    Extraction {
        source: String,
    },
}

impl CliError {
    pub fn io(source: std::io::Error, path: &Path) -> Self {
        CliError::Io {
            source: source.to_string(),
            path: Some(path.to_string_lossy().to_string()),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Config { source } => write!(f, "Error interpreting the config: {}", source),
            CliError::ParseError { msg } => write!(f, "Error parsing input: {}", msg),
            CliError::Io { source, path } => {
                if let Some(path) = path {
                    write!(f, "Error reading file {}: {}", path, source)
                } else {
                    write!(f, "Error reading file: {}", source)
                }
            }
            CliError::Extraction { source } => write!(f, "Error extracting features: {}", source),
        }
    }
}

impl From<msfe::MsfeError> for CliError {
    fn from(e: msfe::MsfeError) -> Self {
        CliError::Extraction {
            source: e.to_string(),
        }
    }
}
