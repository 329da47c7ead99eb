pub mod aggregation;
pub mod catalogue;
pub mod centroiding;
pub mod config;
pub mod errors;
pub mod extraction;
pub mod features;
pub mod fitting;
pub mod matching;
pub mod merging;
pub mod models;
pub mod selection;
pub mod timings;
pub mod utils;

pub use catalogue::{
    Catalogue,
    ExpectedIon,
};
pub use config::ExtractionConfig;
pub use errors::MsfeError;
pub use extraction::{
    FeatureExtractor,
    RunFeatures,
};
pub use merging::FeatureMatrixRow;
pub use models::{
    ScanCategory,
    Spectrum,
};
pub use selection::{
    select_best_tic_scans,
    ScanSelection,
    SelectionConfig,
};
