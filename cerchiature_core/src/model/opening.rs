//! Openings cut in the wall.
//!
//! An opening is a rectangle in the wall's elevation frame (origin at the
//! bottom-left corner of the wall, x to the right, y upwards). Arched
//! openings keep their bounding rectangle and carry the arch data on top.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::model::reinforcement::ReinforcementSpec;
use crate::model::wall::WallGeometry;

/// Tolerance for geometric comparisons (cm)
const GEOMETRY_TOL_CM: f64 = 1e-6;

/// Arch profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchType {
    /// Round arch, rise = span/2
    Semicircular,
    /// Circular segment with rise < span/2
    Segmental,
    /// Two-centred (gothic) arch
    Pointed,
    /// Elliptical (basket-handle) arch
    MultiCentered,
}

impl ArchType {
    pub const ALL: [ArchType; 4] = [
        ArchType::Semicircular,
        ArchType::Segmental,
        ArchType::Pointed,
        ArchType::MultiCentered,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ArchType::Semicircular => "Semicircular",
            ArchType::Segmental => "Segmental",
            ArchType::Pointed => "Pointed",
            ArchType::MultiCentered => "Multi-centered",
        }
    }

    /// Segmental and multi-centered arches are defined by their rise; the
    /// other shapes follow from the span.
    pub fn needs_rise(&self) -> bool {
        matches!(self, ArchType::Segmental | ArchType::MultiCentered)
    }
}

impl std::fmt::Display for ArchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Geometry of an arched head.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchData {
    pub arch_type: ArchType,
    /// Arch rise above the springing line (cm)
    pub rise_cm: f64,
    /// Height of the springing line above the opening bottom (cm)
    pub impost_height_cm: f64,
}

/// Opening outline
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum OpeningShape {
    #[default]
    Rectangular,
    Arched(ArchData),
}

/// Partial-depth recess: the opening does not pass through the wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NicheData {
    /// Recess depth measured from the wall face (cm)
    pub depth_cm: f64,
}

/// Infill material for a closed opening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClosureMaterial {
    SolidBrick,
    HollowBrick,
    ConcreteBlock,
    ClayBlock,
    Plasterboard,
    GlassBlock,
    Other,
}

impl ClosureMaterial {
    pub const ALL: [ClosureMaterial; 7] = [
        ClosureMaterial::SolidBrick,
        ClosureMaterial::HollowBrick,
        ClosureMaterial::ConcreteBlock,
        ClosureMaterial::ClayBlock,
        ClosureMaterial::Plasterboard,
        ClosureMaterial::GlassBlock,
        ClosureMaterial::Other,
    ];

    /// Unit weight (kN/m³)
    pub fn unit_weight_kn_m3(&self) -> f64 {
        match self {
            ClosureMaterial::SolidBrick => 18.0,
            ClosureMaterial::HollowBrick => 12.0,
            ClosureMaterial::ConcreteBlock => 16.0,
            ClosureMaterial::ClayBlock => 11.0,
            ClosureMaterial::Plasterboard => 8.0,
            ClosureMaterial::GlassBlock => 20.0,
            ClosureMaterial::Other => 15.0,
        }
    }
}

/// Infill thickness assumed when none is given (cm)
pub const DEFAULT_CLOSURE_THICKNESS_CM: f64 = 12.0;

/// Infill of an existing opening.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosureData {
    pub material: ClosureMaterial,
    /// Infill thickness (cm); 12 cm when absent
    #[serde(default)]
    pub thickness_cm: Option<f64>,
}

impl ClosureData {
    /// Infill thickness within a wall of `wall_thickness_cm` (cm)
    pub fn effective_thickness_cm(&self, wall_thickness_cm: f64) -> f64 {
        self.thickness_cm
            .unwrap_or(DEFAULT_CLOSURE_THICKNESS_CM)
            .clamp(0.0, wall_thickness_cm)
    }
}

/// How an opening interacts with the resisting section
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpeningKind {
    /// Through opening: splits the wall into piers
    Through,
    /// Recess of the given depth (cm) inside a pier
    Niche { depth_cm: f64 },
    /// Opening closed by a lighter (or equal) infill
    Infilled(ClosureData),
}

/// An opening in the wall.
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "W1",
///   "x_cm": 150.0, "y_cm": 0.0, "width_cm": 120.0, "height_cm": 210.0,
///   "shape": { "kind": "Rectangular" },
///   "existing": false,
///   "reinforcement": null
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    /// Identifier used to key frame results; defaults to `A{index+1}`
    #[serde(default)]
    pub id: Option<String>,
    pub x_cm: f64,
    pub y_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
    #[serde(default)]
    pub shape: OpeningShape,
    /// True for openings already present in the original wall
    #[serde(default)]
    pub existing: bool,
    #[serde(default)]
    pub niche: Option<NicheData>,
    #[serde(default)]
    pub closure: Option<ClosureData>,
    #[serde(default)]
    pub reinforcement: Option<ReinforcementSpec>,
}

impl Opening {
    /// New rectangular through opening.
    pub fn rectangular(x_cm: f64, y_cm: f64, width_cm: f64, height_cm: f64) -> Self {
        Opening {
            id: None,
            x_cm,
            y_cm,
            width_cm,
            height_cm,
            shape: OpeningShape::Rectangular,
            existing: false,
            niche: None,
            closure: None,
            reinforcement: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn existing(mut self) -> Self {
        self.existing = true;
        self
    }

    pub fn with_reinforcement(mut self, spec: ReinforcementSpec) -> Self {
        self.reinforcement = Some(spec);
        self
    }

    pub fn with_arch(mut self, arch: ArchData) -> Self {
        self.shape = OpeningShape::Arched(arch);
        self
    }

    /// Identifier, defaulting to `A{index+1}` for the opening's position.
    pub fn label(&self, index: usize) -> String {
        self.id.clone().unwrap_or_else(|| format!("A{}", index + 1))
    }

    pub fn right_cm(&self) -> f64 {
        self.x_cm + self.width_cm
    }

    pub fn top_cm(&self) -> f64 {
        self.y_cm + self.height_cm
    }

    /// Bounding-rectangle area (cm²)
    pub fn area_cm2(&self) -> f64 {
        self.width_cm * self.height_cm
    }

    /// Openings with no area leave the wall unchanged.
    pub fn is_zero_area(&self) -> bool {
        self.width_cm <= GEOMETRY_TOL_CM || self.height_cm <= GEOMETRY_TOL_CM
    }

    pub fn arch(&self) -> Option<&ArchData> {
        match &self.shape {
            OpeningShape::Arched(arch) => Some(arch),
            OpeningShape::Rectangular => None,
        }
    }

    /// Classify the opening for the resisting-section model.
    pub fn kind(&self) -> OpeningKind {
        if let Some(niche) = self.niche {
            OpeningKind::Niche {
                depth_cm: niche.depth_cm,
            }
        } else if let Some(closure) = self.closure {
            OpeningKind::Infilled(closure)
        } else {
            OpeningKind::Through
        }
    }

    /// True when the rectangles share a positive area.
    pub fn overlaps(&self, other: &Opening) -> bool {
        self.x_cm < other.right_cm() - GEOMETRY_TOL_CM
            && other.x_cm < self.right_cm() - GEOMETRY_TOL_CM
            && self.y_cm < other.top_cm() - GEOMETRY_TOL_CM
            && other.y_cm < self.top_cm() - GEOMETRY_TOL_CM
    }

    /// Validate the opening against the wall.
    ///
    /// Returns advisory warnings. Openings leaving the wall outline or with
    /// negative dimensions are input errors.
    pub fn validate(&self, wall: &WallGeometry, label: &str) -> CalcResult<Vec<String>> {
        let field = |name: &str| format!("openings[{}].{}", label, name);
        let dims = [
            ("x_cm", self.x_cm),
            ("y_cm", self.y_cm),
            ("width_cm", self.width_cm),
            ("height_cm", self.height_cm),
        ];
        for (name, value) in dims {
            if value < 0.0 || !value.is_finite() {
                return Err(CalcError::invalid_input(
                    field(name),
                    value.to_string(),
                    "Opening coordinates and sizes must be non-negative",
                ));
            }
        }

        if self.right_cm() > wall.length_cm + GEOMETRY_TOL_CM {
            return Err(CalcError::invalid_input(
                field("width_cm"),
                self.width_cm.to_string(),
                format!("Opening extends beyond the wall length ({} cm)", wall.length_cm),
            ));
        }
        if self.top_cm() > wall.height_cm + GEOMETRY_TOL_CM {
            return Err(CalcError::invalid_input(
                field("height_cm"),
                self.height_cm.to_string(),
                format!("Opening extends beyond the wall height ({} cm)", wall.height_cm),
            ));
        }
        if self.niche.is_some() && self.closure.is_some() {
            return Err(CalcError::invalid_input(
                field("niche"),
                "niche+closure",
                "An opening cannot be both a niche and an infilled opening",
            ));
        }

        let mut warnings = Vec::new();
        if let Some(niche) = self.niche {
            if niche.depth_cm <= 0.0 {
                return Err(CalcError::invalid_input(
                    field("niche.depth_cm"),
                    niche.depth_cm.to_string(),
                    "Niche depth must be positive",
                ));
            }
            if niche.depth_cm >= wall.thickness_cm {
                warnings.push(format!(
                    "Opening {}: niche depth {} cm reaches the wall thickness; treated as full depth",
                    label, niche.depth_cm
                ));
            }
        }

        if let Some(arch) = self.arch() {
            let rise_invalid = !arch.rise_cm.is_finite() || arch.rise_cm < 0.0;
            if rise_invalid || (arch.arch_type.needs_rise() && arch.rise_cm == 0.0) {
                return Err(CalcError::invalid_input(
                    field("shape.rise_cm"),
                    arch.rise_cm.to_string(),
                    "Arch rise must be positive",
                ));
            }
            if arch.impost_height_cm + arch.rise_cm > self.height_cm + GEOMETRY_TOL_CM {
                warnings.push(format!(
                    "Opening {}: impost height + rise ({} cm) exceeds the opening height ({} cm)",
                    label,
                    arch.impost_height_cm + arch.rise_cm,
                    self.height_cm
                ));
            }
        }

        Ok(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> WallGeometry {
        WallGeometry::new(500.0, 300.0, 30.0)
    }

    #[test]
    fn test_default_label() {
        let o = Opening::rectangular(100.0, 0.0, 90.0, 210.0);
        assert_eq!(o.label(2), "A3");
        assert_eq!(o.with_id("P1").label(2), "P1");
    }

    #[test]
    fn test_opening_outside_wall_is_rejected() {
        let o = Opening::rectangular(450.0, 0.0, 100.0, 210.0);
        let err = o.validate(&wall(), "A1").unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_rise_required_only_by_rise_defined_arches() {
        let arched = |arch_type, rise_cm| {
            Opening::rectangular(100.0, 0.0, 120.0, 210.0).with_arch(ArchData {
                arch_type,
                rise_cm,
                impost_height_cm: 150.0,
            })
        };
        assert!(arched(ArchType::Semicircular, 0.0).validate(&wall(), "A1").is_ok());
        assert!(arched(ArchType::Pointed, 0.0).validate(&wall(), "A1").is_ok());
        assert!(arched(ArchType::Segmental, 0.0).validate(&wall(), "A1").is_err());
        assert!(arched(ArchType::Semicircular, -1.0).validate(&wall(), "A1").is_err());
    }

    #[test]
    fn test_overlap() {
        let a = Opening::rectangular(100.0, 0.0, 100.0, 200.0);
        let b = Opening::rectangular(150.0, 50.0, 100.0, 100.0);
        let c = Opening::rectangular(200.0, 0.0, 50.0, 100.0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_kind_and_zero_area() {
        let mut o = Opening::rectangular(100.0, 0.0, 0.0, 210.0);
        assert!(o.is_zero_area());
        assert_eq!(o.kind(), OpeningKind::Through);

        o.niche = Some(NicheData { depth_cm: 10.0 });
        assert_eq!(o.kind(), OpeningKind::Niche { depth_cm: 10.0 });
    }

    #[test]
    fn test_shape_serialization() {
        let o = Opening::rectangular(100.0, 0.0, 120.0, 240.0).with_arch(ArchData {
            arch_type: ArchType::Semicircular,
            rise_cm: 60.0,
            impost_height_cm: 180.0,
        });
        let json = serde_json::to_string(&o).unwrap();
        assert!(json.contains("\"kind\":\"Arched\""));
        let back: Opening = serde_json::from_str(&json).unwrap();
        assert_eq!(back, o);
    }

    #[test]
    fn test_minimal_json() {
        let o: Opening =
            serde_json::from_str(r#"{"x_cm": 10, "y_cm": 0, "width_cm": 80, "height_cm": 200}"#).unwrap();
        assert_eq!(o.shape, OpeningShape::Rectangular);
        assert!(!o.existing);
        assert!(o.reinforcement.is_none());
    }
}
