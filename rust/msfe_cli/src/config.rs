use msfe::{
    ExtractionConfig,
    SelectionConfig,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::path::PathBuf;

use crate::cli::Cli;
use crate::errors::CliError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub input: Option<InputConfig>,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InputConfig {
    pub catalogue: PathBuf,
    #[serde(default)]
    pub runs: Vec<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AnalysisConfig {
    pub extraction: ExtractionConfig,
    pub selection: SelectionConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    pub feature_matrix: PathBuf,
}

impl Config {
    /// Applies the command line overrides and checks that every path needed
    /// to run is known.
    pub fn with_cli_args(mut self, args: Cli) -> Result<Self, CliError> {
        if let Some(catalogue) = args.catalogue {
            let runs = self.input.take().map(|x| x.runs).unwrap_or_default();
            self.input = Some(InputConfig { catalogue, runs });
        }
        let Some(input) = self.input.as_mut() else {
            return Err(CliError::Config {
                source: "No catalogue provided, please provide one in either the config file or with the --catalogue flag".to_string(),
            });
        };
        if !args.runs.is_empty() {
            input.runs = args.runs;
        }
        if input.runs.is_empty() {
            return Err(CliError::Config {
                source: "No runs to process, please list them in the config file or with the --runs flag".to_string(),
            });
        }

        if let Some(feature_matrix) = args.feature_matrix {
            self.output = Some(OutputConfig { feature_matrix });
        }
        if self.output.is_none() {
            return Err(CliError::Config {
                source: "No output provided, please provide one in either the config file or with the --feature-matrix flag".to_string(),
            });
        }
        Ok(self)
    }
}
