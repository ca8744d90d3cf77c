//! Reinforcement frames around openings.
//!
//! A frame is either steel (rolled profiles, optionally several side by side)
//! or cast-in-place reinforced concrete. Both may carry anchors into the
//! surrounding masonry.

use serde::{Deserialize, Serialize};

use crate::materials::{ConcreteClass, RebarGrade, RebarSet, SteelGrade, Stirrups};

// ============================================================================
// Steel frames
// ============================================================================

/// Arrangement of multiple profiles in one member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompositeLayout {
    /// Side by side in the wall thickness
    #[default]
    Inline,
    /// Offset along the member
    Staggered,
    /// Back-to-back with battens
    Coupled,
}

fn default_count() -> u32 {
    1
}

/// Profile choice for a lintel or the jambs.
///
/// ## JSON Example
///
/// ```json
/// { "profile": "HEA 200", "count": 2, "spacing_cm": 15.0, "layout": "Inline", "rotated": false }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSpec {
    /// Designation, e.g. "HEA 200"
    pub profile: String,
    #[serde(default = "default_count")]
    pub count: u32,
    /// Centre-to-centre spacing between profiles (cm)
    #[serde(default)]
    pub spacing_cm: f64,
    #[serde(default)]
    pub layout: CompositeLayout,
    /// Profile turned so that it bends about its weak axis
    #[serde(default)]
    pub rotated: bool,
}

impl ProfileSpec {
    pub fn single(profile: impl Into<String>) -> Self {
        ProfileSpec {
            profile: profile.into(),
            count: 1,
            spacing_cm: 0.0,
            layout: CompositeLayout::Inline,
            rotated: false,
        }
    }
}

/// Base restraint of a steel jamb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BaseCondition {
    #[default]
    Fixed,
    Pinned,
    SimpleSupport,
    SemiRigid,
    Elastic,
    VerticalRoller,
    HorizontalRoller,
}

impl BaseCondition {
    /// Stiffness reduction factor relative to a fixed base
    pub fn factor(&self) -> f64 {
        match self {
            BaseCondition::Fixed => 1.0,
            BaseCondition::Pinned => 0.5,
            BaseCondition::SimpleSupport => 0.3,
            BaseCondition::SemiRigid => 0.7,
            BaseCondition::Elastic => 0.6,
            BaseCondition::VerticalRoller => 0.4,
            BaseCondition::HorizontalRoller => 0.2,
        }
    }
}

/// Lintel-to-jamb joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeCondition {
    #[default]
    Continuous,
    Hinged,
    SemiRigid,
    Bolted,
    PartialWeld,
}

impl NodeCondition {
    pub fn factor(&self) -> f64 {
        match self {
            NodeCondition::Continuous => 1.0,
            NodeCondition::Hinged => 0.6,
            NodeCondition::SemiRigid => 0.8,
            NodeCondition::Bolted => 0.9,
            NodeCondition::PartialWeld => 0.85,
        }
    }
}

/// Degree of composite action between frame and masonry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Collaboration {
    #[default]
    None,
    Partial,
    Full,
}

impl Collaboration {
    pub fn factor(&self) -> f64 {
        match self {
            Collaboration::None => 1.0,
            Collaboration::Partial => 1.15,
            Collaboration::Full => 1.3,
        }
    }
}

/// Boundary conditions of a steel frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameConstraints {
    #[serde(default)]
    pub base_left: BaseCondition,
    /// Right base; same as the left one when absent
    #[serde(default)]
    pub base_right: Option<BaseCondition>,
    #[serde(default)]
    pub node_left: NodeCondition,
    /// Right node; same as the left one when absent
    #[serde(default)]
    pub node_right: Option<NodeCondition>,
    #[serde(default)]
    pub collaboration: Collaboration,
    /// Apply the second-order (P-Δ) stiffness reduction
    #[serde(default)]
    pub second_order: bool,
    /// Arch-specific end restraints on a lintel-only frame
    #[serde(default)]
    pub arch_end_restraints: bool,
}

impl FrameConstraints {
    /// Mean base factor of the two jambs
    pub fn base_factor(&self) -> f64 {
        let right = self.base_right.unwrap_or(self.base_left);
        (self.base_left.factor() + right.factor()) / 2.0
    }

    /// Mean node factor of the two lintel ends
    pub fn node_factor(&self) -> f64 {
        let right = self.node_right.unwrap_or(self.node_left);
        (self.node_left.factor() + right.factor()) / 2.0
    }
}

/// Steel frame: lintel plus optional jambs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteelFrameSpec {
    pub lintel: ProfileSpec,
    /// Jamb profiles; a frame without jambs is a lintel-only reinforcement
    #[serde(default)]
    pub jambs: Option<ProfileSpec>,
    #[serde(default)]
    pub grade: SteelGrade,
    #[serde(default)]
    pub constraints: FrameConstraints,
    #[serde(default)]
    pub anchors: Option<AnchorSpec>,
    /// Lintel-to-jamb splice checked against the frame forces
    #[serde(default)]
    pub splice: Option<SpliceSpec>,
}

// ============================================================================
// Concrete frames
// ============================================================================

fn default_beam_width() -> f64 {
    30.0
}

fn default_beam_depth() -> f64 {
    40.0
}

fn default_column_size() -> f64 {
    30.0
}

fn default_cover_mm() -> f64 {
    30.0
}

/// Reinforced-concrete lintel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcreteBeamSpec {
    #[serde(default = "default_beam_width")]
    pub width_cm: f64,
    #[serde(default = "default_beam_depth")]
    pub depth_cm: f64,
    #[serde(default)]
    pub top_bars: RebarSet,
    #[serde(default)]
    pub bottom_bars: RebarSet,
    #[serde(default)]
    pub stirrups: Stirrups,
}

impl Default for ConcreteBeamSpec {
    fn default() -> Self {
        ConcreteBeamSpec {
            width_cm: default_beam_width(),
            depth_cm: default_beam_depth(),
            top_bars: RebarSet::default(),
            bottom_bars: RebarSet::default(),
            stirrups: Stirrups::default(),
        }
    }
}

/// Reinforced-concrete jambs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcreteColumnSpec {
    /// Dimension in the wall plane (cm)
    #[serde(default = "default_column_size")]
    pub width_cm: f64,
    /// Dimension across the wall (cm)
    #[serde(default = "default_column_size")]
    pub thickness_cm: f64,
}

impl Default for ConcreteColumnSpec {
    fn default() -> Self {
        ConcreteColumnSpec {
            width_cm: default_column_size(),
            thickness_cm: default_column_size(),
        }
    }
}

/// Reinforced-concrete frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteFrameSpec {
    #[serde(default)]
    pub class: ConcreteClass,
    #[serde(default)]
    pub rebar: RebarGrade,
    #[serde(default = "default_cover_mm")]
    pub cover_mm: f64,
    #[serde(default)]
    pub beam: ConcreteBeamSpec,
    #[serde(default)]
    pub columns: Option<ConcreteColumnSpec>,
    #[serde(default)]
    pub anchors: Option<AnchorSpec>,
}

// ============================================================================
// Reinforcement
// ============================================================================

/// Frame around an opening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "material")]
pub enum ReinforcementSpec {
    Steel(SteelFrameSpec),
    Concrete(ConcreteFrameSpec),
}

impl ReinforcementSpec {
    pub fn anchors(&self) -> Option<&AnchorSpec> {
        match self {
            ReinforcementSpec::Steel(s) => s.anchors.as_ref(),
            ReinforcementSpec::Concrete(c) => c.anchors.as_ref(),
        }
    }

    pub fn material_name(&self) -> &'static str {
        match self {
            ReinforcementSpec::Steel(_) => "steel",
            ReinforcementSpec::Concrete(_) => "reinforced concrete",
        }
    }
}

// ============================================================================
// Connections
// ============================================================================

/// Chemical anchor installation system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnchorSystem {
    #[default]
    ChemicalInjection,
    ThreadedBarEpoxy,
    WalledInStirrups,
    MechanicalPlates,
    ThroughBars,
}

/// Anchor rod diameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnchorDiameter {
    M12,
    #[default]
    M16,
    M20,
    M24,
    M27,
    M30,
}

/// Anchor group pattern at a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnchorPattern {
    #[default]
    Square,
    Circular,
    Inline,
    Staggered,
}

fn default_anchor_count() -> u32 {
    4
}

fn default_embedment_cm() -> f64 {
    20.0
}

/// Bonded anchors at each frame node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChemicalAnchorSpec {
    #[serde(default)]
    pub system: AnchorSystem,
    #[serde(default)]
    pub diameter: AnchorDiameter,
    #[serde(default = "default_anchor_count")]
    pub count_per_node: u32,
    #[serde(default = "default_embedment_cm")]
    pub embedment_cm: f64,
    #[serde(default)]
    pub pattern: AnchorPattern,
}

impl Default for ChemicalAnchorSpec {
    fn default() -> Self {
        ChemicalAnchorSpec {
            system: AnchorSystem::default(),
            diameter: AnchorDiameter::default(),
            count_per_node: default_anchor_count(),
            embedment_cm: default_embedment_cm(),
            pattern: AnchorPattern::default(),
        }
    }
}

/// Shape of anchors cast into the masonry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EmbeddedAnchorKind {
    #[default]
    LBar,
    UBar,
    ClosedStirrup,
    Plate,
}

/// Anchors embedded along the frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedAnchorSpec {
    #[serde(default)]
    pub kind: EmbeddedAnchorKind,
    #[serde(default = "default_anchor_count")]
    pub count_per_meter: u32,
    #[serde(default = "default_embedment_cm")]
    pub embedment_cm: f64,
}

/// Frame-to-masonry anchorage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnchorSpec {
    Chemical(ChemicalAnchorSpec),
    Embedded(EmbeddedAnchorSpec),
}

fn default_throat_mm() -> f64 {
    6.0
}

/// Fillet weld joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeldSpec {
    /// Weld leg size a (mm)
    #[serde(default = "default_throat_mm")]
    pub leg_mm: f64,
}

/// Bolt diameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BoltDiameter {
    M12,
    #[default]
    M16,
    M20,
    M24,
}

/// Bolted joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltSpec {
    #[serde(default)]
    pub diameter: BoltDiameter,
    #[serde(default = "default_anchor_count")]
    pub count: u32,
    #[serde(default)]
    pub preloaded: bool,
}

/// Lintel-to-jamb splice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SpliceSpec {
    Welded(WeldSpec),
    Bolted(BoltSpec),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_factors() {
        let c = FrameConstraints {
            base_left: BaseCondition::Fixed,
            base_right: Some(BaseCondition::Pinned),
            node_left: NodeCondition::Bolted,
            ..Default::default()
        };
        assert!((c.base_factor() - 0.75).abs() < 1e-12);
        assert!((c.node_factor() - 0.9).abs() < 1e-12);
        assert_eq!(Collaboration::Partial.factor(), 1.15);
    }

    #[test]
    fn test_steel_spec_defaults_from_json() {
        let json = r#"{
            "material": "Steel",
            "lintel": { "profile": "HEA 160" },
            "jambs": { "profile": "HEA 160", "count": 2, "spacing_cm": 12.0 },
            "anchors": { "type": "Chemical", "diameter": "M20" }
        }"#;
        let spec: ReinforcementSpec = serde_json::from_str(json).unwrap();
        match &spec {
            ReinforcementSpec::Steel(s) => {
                assert_eq!(s.lintel.count, 1);
                assert_eq!(s.grade, SteelGrade::S275);
                assert_eq!(s.jambs.as_ref().map(|j| j.count), Some(2));
            }
            ReinforcementSpec::Concrete(_) => panic!("expected steel"),
        }
        match spec.anchors() {
            Some(AnchorSpec::Chemical(a)) => {
                assert_eq!(a.diameter, AnchorDiameter::M20);
                assert_eq!(a.count_per_node, 4);
                assert_eq!(a.embedment_cm, 20.0);
            }
            other => panic!("unexpected anchors: {:?}", other),
        }
    }

    #[test]
    fn test_concrete_spec_defaults() {
        let spec: ReinforcementSpec = serde_json::from_str(r#"{ "material": "Concrete" }"#).unwrap();
        match spec {
            ReinforcementSpec::Concrete(c) => {
                assert_eq!(c.beam.width_cm, 30.0);
                assert_eq!(c.beam.depth_cm, 40.0);
                assert_eq!(c.cover_mm, 30.0);
                assert_eq!(c.class, ConcreteClass::C25_30);
            }
            ReinforcementSpec::Steel(_) => panic!("expected concrete"),
        }
    }

    #[test]
    fn test_unknown_material_is_rejected() {
        let result: Result<ReinforcementSpec, _> = serde_json::from_str(r#"{ "material": "Timber" }"#);
        assert!(result.is_err());
    }
}
