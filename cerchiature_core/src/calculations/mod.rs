//! # Structural Calculations
//!
//! Each engine follows the same pattern:
//!
//! - `*Input` - input parameters (JSON-serializable)
//! - `*Result` / `*Check` - results (JSON-serializable)
//! - a pure function returning `CalcResult<_>`
//!
//! Catalogs are passed in explicitly; no engine reads global state.
//!
//! ## Available Calculations
//!
//! - [`masonry`] - stiffness and shear resistance of a masonry wall with openings
//! - [`composite`] - equivalent section of multi-profile members
//! - [`arch`] - arch geometry, bendability, steel take-off and thrust
//! - [`frame`] - contribution of the frame around one opening
//! - [`connections`] - anchors, welds and bolts
//! - [`verification`] - local-intervention classification and opening limits
//! - [`intervention`] - the end-to-end run over a whole wall
//! - [`weight`] - self-weight, seismic mass, foundation and overturning

pub mod arch;
pub mod composite;
pub mod connections;
pub mod frame;
pub mod intervention;
pub mod masonry;
pub mod verification;
pub mod weight;

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::materials::ProfileCatalog;

// Re-export commonly used types
pub use arch::{BendabilityInput, BendabilityResult};
pub use connections::{ConnectionCheck, ConnectionInput};
pub use frame::FrameResult;
pub use intervention::{CalculationResult, InterventionInput, Stage};
pub use masonry::{MasonryInput, MasonryState};
pub use verification::{InterventionLimits, VerificationResult};

/// A stored calculation input with its user-provided label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Labeled<T> {
    pub label: String,
    pub input: T,
}

impl<T> Labeled<T> {
    pub fn new(label: impl Into<String>, input: T) -> Self {
        Labeled {
            label: label.into(),
            input,
        }
    }
}

/// Enum wrapper for all calculation types.
///
/// This allows storing heterogeneous calculations in a single collection
/// while maintaining type safety and clean serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationItem {
    /// Local-intervention check of a whole wall
    Intervention(Labeled<InterventionInput>),
    /// Bending feasibility of a profile for an arch
    Bendability(Labeled<BendabilityInput>),
    /// Stand-alone connection check
    Connection(Labeled<ConnectionInput>),
}

/// Result of evaluating a [`CalculationItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationOutput {
    Intervention(CalculationResult),
    Bendability(BendabilityResult),
    Connection(ConnectionCheck),
}

impl CalculationItem {
    /// Get the user-provided label for this calculation
    pub fn label(&self) -> &str {
        match self {
            CalculationItem::Intervention(i) => &i.label,
            CalculationItem::Bendability(b) => &b.label,
            CalculationItem::Connection(c) => &c.label,
        }
    }

    /// Get the calculation type as a string
    pub fn calc_type(&self) -> &'static str {
        match self {
            CalculationItem::Intervention(_) => "Intervention",
            CalculationItem::Bendability(_) => "Bendability",
            CalculationItem::Connection(_) => "Connection",
        }
    }

    /// Run the stored calculation.
    ///
    /// Intervention runs report their failures inside the result; the other
    /// kinds return the engine error.
    pub fn evaluate(&self, catalog: &ProfileCatalog, limits: &InterventionLimits) -> CalcResult<CalculationOutput> {
        Ok(match self {
            CalculationItem::Intervention(i) => {
                CalculationOutput::Intervention(intervention::verify(&i.input, catalog, limits))
            }
            CalculationItem::Bendability(b) => CalculationOutput::Bendability(arch::check_bendability(catalog, &b.input)?),
            CalculationItem::Connection(c) => CalculationOutput::Connection(connections::calculate(&c.input)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::SteelGrade;

    #[test]
    fn test_item_labels_and_types() {
        let item = CalculationItem::Bendability(Labeled::new(
            "Arch lintel",
            BendabilityInput {
                profile: "HEA 200".to_string(),
                radius_cm: 600.0,
                grade: SteelGrade::S355,
            },
        ));
        assert_eq!(item.label(), "Arch lintel");
        assert_eq!(item.calc_type(), "Bendability");

        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"type\":\"Bendability\""));
        let back: CalculationItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_evaluate_bendability() {
        let item = CalculationItem::Bendability(Labeled::new(
            "Arch lintel",
            BendabilityInput {
                profile: "HEA 200".to_string(),
                radius_cm: 600.0,
                grade: SteelGrade::S355,
            },
        ));
        let out = item
            .evaluate(&ProfileCatalog::standard(), &InterventionLimits::default())
            .unwrap();
        match out {
            CalculationOutput::Bendability(r) => assert!(r.r_h_ratio > 30.0),
            other => panic!("unexpected output {:?}", other),
        }
    }
}
