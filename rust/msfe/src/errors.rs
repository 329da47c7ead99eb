use std::fmt::Display;
use std::path::PathBuf;

use crate::models::feature::FeatureShape;

/// Problems with the shape of the numeric data handed to the extractor.
#[derive(Debug, Clone)]
pub enum DataProcessingError {
    ExpectedSlicesSameLength {
        expected: usize,
        other: usize,
        context: String,
    },
    ExpectedNonEmptyData {
        context: Option<String>,
    },
    ExpectedFiniteNonNanData {
        context: String,
    },
    ExpectedSortedData {
        context: String,
    },
}

impl Display for DataProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Reasons a catalogue of expected ions is rejected at load time.
#[derive(Debug, Clone)]
pub enum CatalogueError {
    /// The document does not deserialize into catalogue entries.
    Malformed {
        msg: String,
    },
    EmptyId {
        category: &'static str,
        position: usize,
    },
    DuplicateId {
        category: &'static str,
        id: String,
    },
    InvalidMz {
        category: &'static str,
        id: String,
        mz: f64,
    },
    RatioCountMismatch {
        id: String,
        isotopes: usize,
        ratios: usize,
    },
    UnknownCompanion {
        id: String,
        mz: f64,
    },
    CompanionNotLedByParent {
        id: String,
        first: f64,
    },
}

impl Display for CatalogueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { msg } => write!(f, "Malformed catalogue: {}", msg),
            Self::EmptyId { category, position } => {
                write!(f, "Entry {} of '{}' has an empty id", position, category)
            }
            Self::DuplicateId { category, id } => {
                write!(f, "Id '{}' appears more than once in '{}'", id, category)
            }
            Self::InvalidMz { category, id, mz } => {
                write!(f, "Entry '{}' of '{}' has an invalid m/z: {}", id, category, mz)
            }
            Self::RatioCountMismatch {
                id,
                isotopes,
                ratios,
            } => write!(
                f,
                "Entry '{}' declares {} isotopes but {} isotopic ratios",
                id, isotopes, ratios
            ),
            Self::UnknownCompanion { id, mz } => write!(
                f,
                "Entry '{}' references companion m/z {} that is not in the catalogue",
                id, mz
            ),
            Self::CompanionNotLedByParent { id, first } => write!(
                f,
                "Companion list of '{}' must start with the parent m/z, found {}",
                id, first
            ),
        }
    }
}

/// Peak-level fitting failures. These never abort a scan, the caller swaps in
/// a null fit and keeps going.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    InsufficientPoints { real: usize, expected: usize },
    NonConvergence { iterations: usize },
    NonFiniteParameters,
    DegenerateWindow,
}

impl Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientPoints { real, expected } => write!(
                f,
                "Fitting window has {} points, at least {} are needed",
                real, expected
            ),
            Self::NonConvergence { iterations } => {
                write!(f, "Fit did not converge after {} iterations", iterations)
            }
            Self::NonFiniteParameters => write!(f, "Fit produced non-finite parameters"),
            Self::DegenerateWindow => write!(f, "Fitting window has no usable signal"),
        }
    }
}

#[derive(Debug)]
pub enum MsfeError {
    InvalidCatalogue(CatalogueError),
    InvalidConfig {
        field: &'static str,
        reason: String,
    },
    /// A feature changed its type or width between scans of the same run.
    /// Continuing would silently mis-align the columns of the feature row.
    UnsupportedFeatureType {
        feature: String,
        expected: Option<FeatureShape>,
        found: Option<FeatureShape>,
    },
    DataProcessingError(DataProcessingError),
    ScanIndexOutOfBounds {
        index: usize,
        len: usize,
    },
    Io {
        source: std::io::Error,
        path: Option<PathBuf>,
    },
    ParseError {
        msg: String,
    },
}

impl Display for MsfeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCatalogue(e) => write!(f, "InvalidCatalogue: {}", e),
            Self::InvalidConfig { field, reason } => {
                write!(f, "InvalidConfig: '{}' {}", field, reason)
            }
            Self::UnsupportedFeatureType {
                feature,
                expected,
                found,
            } => write!(
                f,
                "UnsupportedFeatureType: '{}' expected {:?}, found {:?}",
                feature, expected, found
            ),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl std::error::Error for MsfeError {}

impl From<CatalogueError> for MsfeError {
    fn from(x: CatalogueError) -> Self {
        Self::InvalidCatalogue(x)
    }
}

impl From<DataProcessingError> for MsfeError {
    fn from(x: DataProcessingError) -> Self {
        Self::DataProcessingError(x)
    }
}

impl From<serde_json::Error> for MsfeError {
    fn from(val: serde_json::Error) -> Self {
        MsfeError::ParseError {
            msg: val.to_string(),
        }
    }
}
