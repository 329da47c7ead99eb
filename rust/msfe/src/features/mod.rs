pub mod companions;
pub mod frames;
pub mod peak;

use crate::models::FeatureRecord;

/// Every record produced for one scan, grouped in the order they are merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanFeatures {
    pub independent: Vec<FeatureRecord>,
    pub isotopic: Vec<FeatureRecord>,
    pub fragmentation: Vec<FeatureRecord>,
    pub frames: Vec<FeatureRecord>,
}

impl ScanFeatures {
    /// All records in merge order: independent peaks, isotopes, fragments,
    /// then frames.
    pub fn records(&self) -> impl Iterator<Item = &FeatureRecord> {
        self.independent
            .iter()
            .chain(self.isotopic.iter())
            .chain(self.fragmentation.iter())
            .chain(self.frames.iter())
    }
}
