use serde::Serialize;
use std::time::Duration;

/// Wall time spent in each stage of the per-scan extraction, summed over
/// all scans of a category or run.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractionTimings {
    pub centroiding: Duration,
    pub matching: Duration,
    /// Gaussian fits of the present expected ions.
    pub fitting: Duration,
    /// Per-peak, isotope and fragment features.
    pub peak_features: Duration,
    pub frames: Duration,
    pub scans: usize,
}

impl Serialize for ExtractionTimings {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ExtractionTimings", 6)?;
        state.serialize_field("centroiding_ms", &self.centroiding.as_millis())?;
        state.serialize_field("matching_ms", &self.matching.as_millis())?;
        state.serialize_field("fitting_ms", &self.fitting.as_millis())?;
        state.serialize_field("peak_features_ms", &self.peak_features.as_millis())?;
        state.serialize_field("frames_ms", &self.frames.as_millis())?;
        state.serialize_field("scans", &self.scans)?;
        state.end()
    }
}

impl std::ops::AddAssign for ExtractionTimings {
    fn add_assign(&mut self, rhs: Self) {
        self.centroiding += rhs.centroiding;
        self.matching += rhs.matching;
        self.fitting += rhs.fitting;
        self.peak_features += rhs.peak_features;
        self.frames += rhs.frames;
        self.scans += rhs.scans;
    }
}

impl ExtractionTimings {
    pub fn total(&self) -> Duration {
        self.centroiding + self.matching + self.fitting + self.peak_features + self.frames
    }
}
