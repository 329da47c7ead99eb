use serde::{
    Deserialize,
    Serialize,
};

/// The kind of scan being processed. Each category has its own detection
/// threshold, frame layout and (for the first two) catalogue section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanCategory {
    Normal,
    ChemicalNoise,
    InstrumentNoise,
}

impl ScanCategory {
    pub const ALL: [ScanCategory; 3] = [
        ScanCategory::Normal,
        ScanCategory::ChemicalNoise,
        ScanCategory::InstrumentNoise,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::ChemicalNoise => "chemical_noise",
            Self::InstrumentNoise => "instrument_noise",
        }
    }

    /// Prefix used in the names of the frame noise features.
    pub fn frame_prefix(&self) -> &'static str {
        match self {
            Self::Normal => "norm",
            Self::ChemicalNoise => "chem",
            Self::InstrumentNoise => "bg",
        }
    }

    /// Whether scans of this category are matched against expected ions.
    pub fn has_expected_ions(&self) -> bool {
        !matches!(self, Self::InstrumentNoise)
    }
}
