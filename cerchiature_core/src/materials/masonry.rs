//! Masonry Materials (NTC 2018 Circolare, Tab. C8.5.I)
//!
//! Mechanical properties of existing masonry types, the knowledge level that
//! sets the confidence factor FC, and a catalog combining the normative
//! table with user-defined entries.
//!
//! The catalog is an explicit value handed to the engines; there is no
//! process-wide registry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{CalcError, CalcResult};

// ============================================================================
// Knowledge Level
// ============================================================================

/// Knowledge level of the existing structure (NTC 2018 §C8.5.4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KnowledgeLevel {
    /// Limited knowledge
    #[default]
    LC1,
    /// Adequate knowledge
    LC2,
    /// Accurate knowledge
    LC3,
}

impl KnowledgeLevel {
    pub const ALL: [KnowledgeLevel; 3] = [KnowledgeLevel::LC1, KnowledgeLevel::LC2, KnowledgeLevel::LC3];

    /// Confidence factor FC for this level
    pub fn confidence_factor(&self) -> f64 {
        match self {
            KnowledgeLevel::LC1 => 1.35,
            KnowledgeLevel::LC2 => 1.20,
            KnowledgeLevel::LC3 => 1.00,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            KnowledgeLevel::LC1 => "LC1 - Limited knowledge",
            KnowledgeLevel::LC2 => "LC2 - Adequate knowledge",
            KnowledgeLevel::LC3 => "LC3 - Accurate knowledge",
        }
    }
}

impl std::fmt::Display for KnowledgeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Masonry Material
// ============================================================================

/// Plausible ranges used for advisory warnings: (min, max)
const FCM_RANGE_MPA: (f64, f64) = (0.5, 20.0);
const TAU0_RANGE_MPA: (f64, f64) = (0.01, 0.5);
const E_RANGE_MPA: (f64, f64) = (100.0, 10000.0);

/// Mechanical properties of a masonry type.
///
/// ## JSON Example
///
/// ```json
/// {
///   "name": "Solid brick masonry with lime mortar",
///   "fcm_mpa": 2.4,
///   "tau0_mpa": 0.06,
///   "e_mpa": 1500.0,
///   "unit_weight_kn_m3": 18.0,
///   "knowledge_level": "LC2"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasonryMaterial {
    /// Descriptive name
    pub name: String,
    /// Mean compressive strength fcm (N/mm²)
    pub fcm_mpa: f64,
    /// Mean shear strength τ0 (N/mm²)
    pub tau0_mpa: f64,
    /// Elastic modulus E (N/mm²)
    pub e_mpa: f64,
    /// Unit weight w (kN/m³)
    pub unit_weight_kn_m3: f64,
    /// Knowledge level reached on the existing wall
    #[serde(default)]
    pub knowledge_level: KnowledgeLevel,
}

impl MasonryMaterial {
    /// Validate the material.
    ///
    /// Non-positive values are errors. Values outside the usual ranges for
    /// existing masonry are returned as warnings.
    pub fn validate(&self) -> CalcResult<Vec<String>> {
        let checks = [
            ("fcm_mpa", self.fcm_mpa, FCM_RANGE_MPA),
            ("tau0_mpa", self.tau0_mpa, TAU0_RANGE_MPA),
            ("e_mpa", self.e_mpa, E_RANGE_MPA),
        ];

        let mut warnings = Vec::new();
        for (field, value, (min, max)) in checks {
            if value <= 0.0 || value.is_nan() {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Masonry property must be positive",
                ));
            }
            if value < min || value > max {
                warnings.push(format!(
                    "{} = {} N/mm² is outside the usual range [{}, {}]",
                    field, value, min, max
                ));
            }
        }

        if self.unit_weight_kn_m3 <= 0.0 || self.unit_weight_kn_m3.is_nan() {
            return Err(CalcError::invalid_input(
                "unit_weight_kn_m3",
                self.unit_weight_kn_m3.to_string(),
                "Unit weight must be positive",
            ));
        }

        Ok(warnings)
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Masonry family used to group catalog entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MasonryCategory {
    Stone,
    Brick,
    Block,
    Mixed,
}

/// A keyed catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Lookup key (e.g. "mattoni_pieni")
    pub key: String,
    pub category: MasonryCategory,
    pub material: MasonryMaterial,
    /// Tabulated shear modulus G (N/mm²), reported for reference
    pub g_mpa: f64,
    /// True for entries from the normative table
    pub normative: bool,
}

/// Masonry catalog: normative Tab. C8.5.I entries plus custom entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl MaterialCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with the normative masonry table.
    pub fn normative() -> Self {
        use MasonryCategory::*;

        // (key, name, category, fcm, tau0, E, G, w)
        let table = [
            ("pietrame_disordinata", "Irregular rubble stone masonry", Stone, 1.0, 0.020, 870.0, 290.0, 19.0),
            ("pietrame_sbozzata", "Roughly hewn stone masonry", Stone, 2.0, 0.035, 1050.0, 350.0, 20.0),
            ("pietrame_buona", "Split stone masonry with good bonding", Stone, 2.6, 0.056, 1260.0, 420.0, 21.0),
            ("pietrame_blocchi", "Squared stone block masonry", Stone, 5.8, 0.090, 1740.0, 580.0, 22.0),
            ("mattoni_pieni", "Solid brick masonry with lime mortar", Brick, 2.4, 0.060, 1500.0, 500.0, 18.0),
            ("mattoni_semipieni", "Semi-solid brick masonry with cement mortar", Brick, 3.8, 0.092, 1740.0, 580.0, 15.0),
            ("mattoni_forati", "Hollow brick masonry", Brick, 2.8, 0.056, 1080.0, 360.0, 12.0),
            ("blocchi_tufo", "Tuff block masonry", Block, 2.0, 0.074, 1410.0, 470.0, 14.5),
            ("blocchi_calcarenite", "Calcarenite block masonry", Block, 2.0, 0.074, 1410.0, 470.0, 14.5),
            ("blocchi_cls", "Concrete block masonry", Block, 3.0, 0.080, 1800.0, 600.0, 16.0),
            ("blocchi_laterizio", "Clay block masonry", Block, 4.0, 0.100, 2400.0, 800.0, 11.0),
            ("mista", "Mixed masonry", Mixed, 1.8, 0.025, 1200.0, 400.0, 19.0),
        ];

        let mut catalog = Self::new();
        for (key, name, category, fcm, tau0, e, g, w) in table {
            catalog.entries.insert(
                key.to_string(),
                CatalogEntry {
                    key: key.to_string(),
                    category,
                    material: MasonryMaterial {
                        name: name.to_string(),
                        fcm_mpa: fcm,
                        tau0_mpa: tau0,
                        e_mpa: e,
                        unit_weight_kn_m3: w,
                        knowledge_level: KnowledgeLevel::default(),
                    },
                    g_mpa: g,
                    normative: true,
                },
            );
        }
        catalog
    }

    /// Look up a material by key.
    pub fn lookup(&self, key: &str) -> CalcResult<&MasonryMaterial> {
        self.entries
            .get(key)
            .map(|e| &e.material)
            .ok_or_else(|| CalcError::material_not_found(key))
    }

    /// Full catalog entry for a key, if present.
    pub fn entry(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.get(key)
    }

    /// Add or replace a custom entry. Normative keys cannot be overridden.
    pub fn add_custom(
        &mut self,
        key: impl Into<String>,
        category: MasonryCategory,
        material: MasonryMaterial,
    ) -> CalcResult<()> {
        let key = key.into();
        if self.entries.get(&key).is_some_and(|e| e.normative) {
            return Err(CalcError::invalid_input(
                "key",
                key,
                "Normative catalog entries cannot be overridden",
            ));
        }
        material.validate()?;

        let g_mpa = material.e_mpa / 3.0;
        self.entries.insert(
            key.clone(),
            CatalogEntry {
                key,
                category,
                material,
                g_mpa,
                normative: false,
            },
        );
        Ok(())
    }

    /// Remove a custom entry. Returns the removed entry.
    pub fn remove_custom(&mut self, key: &str) -> CalcResult<CatalogEntry> {
        match self.entries.get(key) {
            None => Err(CalcError::material_not_found(key)),
            Some(e) if e.normative => Err(CalcError::invalid_input(
                "key",
                key,
                "Normative catalog entries cannot be removed",
            )),
            Some(_) => self
                .entries
                .remove(key)
                .ok_or_else(|| CalcError::material_not_found(key)),
        }
    }

    /// Custom (non-normative) entries, sorted by key
    pub fn custom_entries(&self) -> Vec<&CatalogEntry> {
        let mut out: Vec<_> = self.entries.values().filter(|e| !e.normative).collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }

    /// Entries of a category, sorted by key
    pub fn entries_of_category(&self, category: MasonryCategory) -> Vec<&CatalogEntry> {
        let mut out: Vec<_> = self.entries.values().filter(|e| e.category == category).collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<_> = self.entries.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom_material() -> MasonryMaterial {
        MasonryMaterial {
            name: "Tested brick".to_string(),
            fcm_mpa: 3.1,
            tau0_mpa: 0.07,
            e_mpa: 1650.0,
            unit_weight_kn_m3: 17.0,
            knowledge_level: KnowledgeLevel::LC3,
        }
    }

    #[test]
    fn test_confidence_factors() {
        assert_eq!(KnowledgeLevel::LC1.confidence_factor(), 1.35);
        assert_eq!(KnowledgeLevel::LC2.confidence_factor(), 1.20);
        assert_eq!(KnowledgeLevel::LC3.confidence_factor(), 1.00);
    }

    #[test]
    fn test_normative_lookup() {
        let catalog = MaterialCatalog::normative();
        assert_eq!(catalog.len(), 12);

        let brick = catalog.lookup("mattoni_pieni").unwrap();
        assert_eq!(brick.fcm_mpa, 2.4);
        assert_eq!(brick.tau0_mpa, 0.060);
        assert_eq!(brick.e_mpa, 1500.0);
        assert_eq!(brick.unit_weight_kn_m3, 18.0);
        assert_eq!(catalog.entry("mattoni_pieni").unwrap().g_mpa, 500.0);
    }

    #[test]
    fn test_missing_key() {
        let catalog = MaterialCatalog::normative();
        let err = catalog.lookup("adobe").unwrap_err();
        assert_eq!(err.error_code(), "MATERIAL_NOT_FOUND");
    }

    #[test]
    fn test_custom_entries() {
        let mut catalog = MaterialCatalog::normative();
        catalog
            .add_custom("lab_brick", MasonryCategory::Brick, custom_material())
            .unwrap();
        assert_eq!(catalog.lookup("lab_brick").unwrap().fcm_mpa, 3.1);
        assert_eq!(catalog.custom_entries().len(), 1);

        // Normative entries are protected
        assert!(catalog
            .add_custom("mattoni_pieni", MasonryCategory::Brick, custom_material())
            .is_err());
        assert!(catalog.remove_custom("mattoni_pieni").is_err());

        catalog.remove_custom("lab_brick").unwrap();
        assert!(catalog.lookup("lab_brick").is_err());
    }

    #[test]
    fn test_validation_warnings_and_errors() {
        let mut m = custom_material();
        assert!(m.validate().unwrap().is_empty());

        m.fcm_mpa = 25.0;
        assert_eq!(m.validate().unwrap().len(), 1);

        m.tau0_mpa = 0.0;
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_category_filter() {
        let catalog = MaterialCatalog::normative();
        let stones = catalog.entries_of_category(MasonryCategory::Stone);
        assert_eq!(stones.len(), 4);
        assert_eq!(stones[0].key, "pietrame_blocchi");
    }
}
