//! # Input Model
//!
//! Wall, openings and reinforcement specifications. These are plain serde
//! values validated once at the boundary by the engines that consume them.

pub mod opening;
pub mod reinforcement;
pub mod wall;

pub use opening::{ArchData, ArchType, ClosureData, ClosureMaterial, NicheData, Opening, OpeningKind, OpeningShape};
pub use reinforcement::{
    AnchorDiameter, AnchorPattern, AnchorSpec, AnchorSystem, BaseCondition, BoltDiameter, BoltSpec,
    ChemicalAnchorSpec, Collaboration, CompositeLayout, ConcreteBeamSpec, ConcreteColumnSpec, ConcreteFrameSpec,
    EmbeddedAnchorKind, EmbeddedAnchorSpec, FrameConstraints, NodeCondition, ProfileSpec, ReinforcementSpec,
    SpliceSpec, SteelFrameSpec, WeldSpec,
};
pub use wall::{BottomRestraint, TopRestraint, WallConstraints, WallGeometry, WallLoads};
