pub mod category;
pub mod feature;
pub mod peaks;
pub mod spectrum;

pub use feature::{
    FeatureRecord,
    FeatureShape,
    FeatureValue,
};
pub use peaks::{
    ActualPeak,
    FitInfo,
    FittedCurve,
    GoodnessOfFit,
    PeakFit,
};
pub use spectrum::Spectrum;
pub use category::ScanCategory;
