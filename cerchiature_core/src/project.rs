//! # Project Data Structures
//!
//! The `Project` struct is the root container for all calculation data.
//! Projects serialize to `.cerch` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (version, engineer, job info, timestamps)
//! ├── settings: GlobalSettings (code, partial factors, limits, defaults)
//! └── items: HashMap<Uuid, CalculationItem> (all calculations)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cerchiature_core::project::Project;
//!
//! let project = Project::new("Jane Engineer", "25-042", "Comune di Lucca");
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! assert!(json.contains("NTC2018"));
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::masonry::GAMMA_M_EXISTING;
use crate::calculations::{CalculationItem, InterventionLimits};
use crate::materials::{ConcreteClass, SteelGrade};

/// Current schema version for .cerch files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Project file extension
pub const FILE_EXTENSION: &str = "cerch";

/// Root project container.
///
/// Items are stored in a flat UUID-keyed map for O(1) lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project metadata (version, engineer, job info)
    pub meta: ProjectMetadata,

    /// Global settings (code, partial factors, default materials)
    pub settings: GlobalSettings,

    /// All calculation items, keyed by UUID
    pub items: HashMap<Uuid, CalculationItem>,
}

impl Project {
    /// Create a new empty project.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cerchiature_core::project::Project;
    ///
    /// let project = Project::new("John Doe", "25-001", "Client");
    /// assert_eq!(project.meta.engineer, "John Doe");
    /// ```
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>, client: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                site: None,
                created: now,
                modified: now,
            },
            settings: GlobalSettings::default(),
            items: HashMap::new(),
        }
    }

    /// Add a calculation item to the project.
    ///
    /// Returns the UUID assigned to the item.
    pub fn add_item(&mut self, item: CalculationItem) -> Uuid {
        let id = Uuid::new_v4();
        self.items.insert(id, item);
        self.touch();
        id
    }

    /// Remove a calculation item by UUID.
    pub fn remove_item(&mut self, id: &Uuid) -> Option<CalculationItem> {
        let item = self.items.remove(id);
        if item.is_some() {
            self.touch();
        }
        item
    }

    pub fn get_item(&self, id: &Uuid) -> Option<&CalculationItem> {
        self.items.get(id)
    }

    /// Get a mutable reference to a calculation item by UUID.
    ///
    /// Marks the project as modified when the item exists.
    pub fn get_item_mut(&mut self, id: &Uuid) -> Option<&mut CalculationItem> {
        if self.items.contains_key(id) {
            self.meta.modified = Utc::now();
            self.items.get_mut(id)
        } else {
            None
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Items of one calculation type ("Intervention", "Bendability", ...),
    /// sorted by label.
    pub fn items_of_type(&self, calc_type: &str) -> Vec<(&Uuid, &CalculationItem)> {
        let mut items: Vec<_> = self.items.iter().filter(|(_, i)| i.calc_type() == calc_type).collect();
        items.sort_by(|a, b| a.1.label().cmp(b.1.label()));
        items
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Name of the responsible engineer
    pub engineer: String,

    /// Job/project number
    pub job_id: String,

    /// Client name
    pub client: String,

    /// Building address
    #[serde(default)]
    pub site: Option<String>,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

fn default_gamma_m() -> f64 {
    GAMMA_M_EXISTING
}

/// Global project settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Design code label
    pub code: String,

    /// Masonry partial factor γ_M
    #[serde(default = "default_gamma_m")]
    pub masonry_gamma_m: f64,

    /// Local-intervention thresholds and collaboration factor
    #[serde(default)]
    pub limits: InterventionLimits,

    /// Default materials for new frames
    #[serde(default)]
    pub default_materials: DefaultMaterials,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        GlobalSettings {
            code: "NTC2018".to_string(),
            masonry_gamma_m: GAMMA_M_EXISTING,
            limits: InterventionLimits::default(),
            default_materials: DefaultMaterials::default(),
        }
    }
}

/// Default materials for new frames.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DefaultMaterials {
    #[serde(default)]
    pub steel: SteelGrade,
    #[serde(default)]
    pub concrete: ConcreteClass,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{BendabilityInput, InterventionInput, Labeled};
    use crate::materials::MaterialCatalog;
    use crate::model::WallGeometry;

    #[test]
    fn test_project_creation() {
        let project = Project::new("John Doe", "25-001", "Acme Corp");
        assert_eq!(project.meta.engineer, "John Doe");
        assert_eq!(project.meta.job_id, "25-001");
        assert_eq!(project.meta.client, "Acme Corp");
        assert_eq!(project.meta.version, SCHEMA_VERSION);
        assert_eq!(project.settings.limits.collaboration_gamma, 1.5);
    }

    #[test]
    fn test_project_serialization() {
        let project = Project::new("Jane Engineer", "25-042", "Test Client");
        let json = serde_json::to_string_pretty(&project).unwrap();

        assert!(json.contains("Jane Engineer"));
        assert!(json.contains("25-042"));
        assert!(json.contains("NTC2018"));

        let roundtrip: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.meta.engineer, "Jane Engineer");
        assert_eq!(roundtrip.settings, project.settings);
    }

    #[test]
    fn test_add_remove_item() {
        let mut project = Project::new("Engineer", "25-001", "Client");
        let masonry = MaterialCatalog::normative().lookup("mattoni_pieni").unwrap().clone();
        let input = InterventionInput::new(WallGeometry::new(500.0, 300.0, 30.0), masonry);

        let id = project.add_item(CalculationItem::Intervention(Labeled::new("Ground floor wall", input)));
        assert_eq!(project.item_count(), 1);
        assert!(project.get_item(&id).is_some());

        let removed = project.remove_item(&id);
        assert!(removed.is_some());
        assert_eq!(project.item_count(), 0);
    }

    #[test]
    fn test_items_of_type_sorted() {
        let mut project = Project::new("Engineer", "25-001", "Client");
        for label in ["B", "A"] {
            project.add_item(CalculationItem::Bendability(Labeled::new(
                label,
                BendabilityInput {
                    profile: "IPE 200".to_string(),
                    radius_cm: 400.0,
                    grade: SteelGrade::S275,
                },
            )));
        }
        let items = project.items_of_type("Bendability");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].1.label(), "A");
        assert!(project.items_of_type("Intervention").is_empty());
    }

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let settings: GlobalSettings = serde_json::from_str(r#"{ "code": "NTC2018" }"#).unwrap();
        assert_eq!(settings, GlobalSettings::default());
    }
}
