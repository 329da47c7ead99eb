//! Catalogue of expected ions, loaded once per run.
//!
//! The on-disk representation is a JSON object with one list of
//! [`ExpectedIon`] per scan category that has expected ions:
//!
//! ```json
//! {
//!   "normal": [
//!     {"id": "caffeine", "expected_mz": 195.0877,
//!      "expected_isotopes": [195.0877, 196.0911],
//!      "expected_isotopic_ratios": [0.9, 0.1],
//!      "expected_fragments": [195.0877, 138.0662]},
//!     {"id": "caffeine_i1", "expected_mz": 196.0911},
//!     {"id": "caffeine_f1", "expected_mz": 138.0662}
//!   ],
//!   "chemical_noise": []
//! }
//! ```
//!
//! Isotopes and fragments are declared by m/z and must themselves be entries of
//! the same section. On load they are resolved to the id of that entry so the
//! extraction stages can look companion fits up by id.

use crate::errors::{
    CatalogueError,
    MsfeError,
};
use crate::models::ScanCategory;
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpectedIon {
    pub id: String,
    pub expected_mz: f64,
    #[serde(default)]
    pub expected_isotopes: Vec<f64>,
    #[serde(default)]
    pub expected_isotopic_ratios: Vec<f64>,
    #[serde(default)]
    pub expected_fragments: Vec<f64>,
}

impl ExpectedIon {
    pub fn new(id: impl Into<String>, expected_mz: f64) -> Self {
        Self {
            id: id.into(),
            expected_mz,
            expected_isotopes: Vec::new(),
            expected_isotopic_ratios: Vec::new(),
            expected_fragments: Vec::new(),
        }
    }

    pub fn with_isotopes(mut self, mzs: Vec<f64>, ratios: Vec<f64>) -> Self {
        self.expected_isotopes = mzs;
        self.expected_isotopic_ratios = ratios;
        self
    }

    pub fn with_fragments(mut self, mzs: Vec<f64>) -> Self {
        self.expected_fragments = mzs;
        self
    }
}

/// A resolved isotope or fragment of an ion.
#[derive(Debug, Clone, PartialEq)]
pub struct Companion {
    pub mz: f64,
    /// Id of the catalogue entry with this m/z.
    pub ion_id: String,
    /// Theoretical abundance share, only set for isotopes.
    pub expected_ratio: Option<f64>,
}

/// A validated catalogue entry.
///
/// When present, the first isotope/fragment is the parent itself.
#[derive(Debug, Clone, PartialEq)]
pub struct IonEntry {
    pub id: String,
    pub expected_mz: f64,
    pub isotopes: Vec<Companion>,
    pub fragments: Vec<Companion>,
}

/// Validated, ordered expected ions of one scan category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IonSet {
    entries: Vec<IonEntry>,
}

impl IonSet {
    pub fn try_new(category: ScanCategory, ions: Vec<ExpectedIon>) -> Result<Self, CatalogueError> {
        let category = category.name();
        let mut seen = HashSet::with_capacity(ions.len());
        for (position, ion) in ions.iter().enumerate() {
            if ion.id.is_empty() {
                return Err(CatalogueError::EmptyId { category, position });
            }
            if !seen.insert(ion.id.as_str()) {
                return Err(CatalogueError::DuplicateId {
                    category,
                    id: ion.id.clone(),
                });
            }
            let bad_mz = std::iter::once(&ion.expected_mz)
                .chain(ion.expected_isotopes.iter())
                .chain(ion.expected_fragments.iter())
                .find(|mz| !mz.is_finite() || **mz <= 0.0);
            if let Some(mz) = bad_mz {
                return Err(CatalogueError::InvalidMz {
                    category,
                    id: ion.id.clone(),
                    mz: *mz,
                });
            }
            if ion.expected_isotopes.len() != ion.expected_isotopic_ratios.len() {
                return Err(CatalogueError::RatioCountMismatch {
                    id: ion.id.clone(),
                    isotopes: ion.expected_isotopes.len(),
                    ratios: ion.expected_isotopic_ratios.len(),
                });
            }
        }

        let resolve = |owner: &ExpectedIon,
                       mzs: &[f64],
                       ratios: Option<&[f64]>|
         -> Result<Vec<Companion>, CatalogueError> {
            if let Some(first) = mzs.first() {
                if *first != owner.expected_mz {
                    return Err(CatalogueError::CompanionNotLedByParent {
                        id: owner.id.clone(),
                        first: *first,
                    });
                }
            }
            mzs.iter()
                .enumerate()
                .map(|(i, mz)| {
                    let target = ions
                        .iter()
                        .find(|x| x.expected_mz == *mz)
                        .ok_or_else(|| CatalogueError::UnknownCompanion {
                            id: owner.id.clone(),
                            mz: *mz,
                        })?;
                    Ok(Companion {
                        mz: *mz,
                        ion_id: target.id.clone(),
                        expected_ratio: ratios.map(|r| r[i]),
                    })
                })
                .collect()
        };

        let mut entries = Vec::with_capacity(ions.len());
        for ion in ions.iter() {
            let isotopes = resolve(
                ion,
                ion.expected_isotopes.as_slice(),
                Some(ion.expected_isotopic_ratios.as_slice()),
            )?;
            let fragments = resolve(ion, ion.expected_fragments.as_slice(), None)?;
            entries.push(IonEntry {
                id: ion.id.clone(),
                expected_mz: ion.expected_mz,
                isotopes,
                fragments,
            });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[IonEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&IonEntry> {
        self.entries.iter().find(|x| x.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawCatalogue {
    #[serde(default)]
    normal: Vec<ExpectedIon>,
    #[serde(default)]
    chemical_noise: Vec<ExpectedIon>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogue {
    normal: IonSet,
    chemical_noise: IonSet,
}

impl Catalogue {
    pub fn try_new(
        normal: Vec<ExpectedIon>,
        chemical_noise: Vec<ExpectedIon>,
    ) -> Result<Self, CatalogueError> {
        Ok(Self {
            normal: IonSet::try_new(ScanCategory::Normal, normal)?,
            chemical_noise: IonSet::try_new(ScanCategory::ChemicalNoise, chemical_noise)?,
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MsfeError> {
        let raw: RawCatalogue = serde_json::from_reader(reader)
            .map_err(|e| CatalogueError::Malformed { msg: e.to_string() })?;
        Ok(Self::try_new(raw.normal, raw.chemical_noise)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, MsfeError> {
        let file = std::fs::File::open(path).map_err(|e| MsfeError::Io {
            source: e,
            path: Some(path.to_path_buf()),
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Expected ions for a category, `None` for categories that are not
    /// matched against expected ions.
    pub fn ions_for(&self, category: ScanCategory) -> Option<&IonSet> {
        match category {
            ScanCategory::Normal => Some(&self.normal),
            ScanCategory::ChemicalNoise => Some(&self.chemical_noise),
            ScanCategory::InstrumentNoise => None,
        }
    }
}
