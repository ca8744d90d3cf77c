//! # Connection Checks
//!
//! Anchorage of the frame into the masonry and lintel-to-jamb splices,
//! checked against the frame design forces.
//!
//! | connection | resistance | demand | required SF |
//! |---|---|---|---|
//! | chemical anchors | tabulated N/V × system × depth × pattern | N + M/0.3, V (elliptical) | > 1.5 |
//! | embedded anchors | 10·(embedment/20)·n·type | max(\|V\|, \|N\|) | > 2.0 |
//! | fillet weld | 180·0.7a·500/1000 | √(N² + V²) | > 1.5 |
//! | bolts | per-bolt shear × n (×1.25 preloaded) | \|V\| | > 1.5 |

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::model::{
    AnchorDiameter, AnchorPattern, AnchorSpec, AnchorSystem, BoltDiameter, BoltSpec, ChemicalAnchorSpec,
    EmbeddedAnchorKind, EmbeddedAnchorSpec, SpliceSpec, WeldSpec,
};

/// Safety factor reported when the connection carries no load
pub const UNLOADED_SAFETY_FACTOR: f64 = 999.0;

/// Required safety factor for chemical anchors, welds and bolts
pub const REQUIRED_SF: f64 = 1.5;
/// Required safety factor for embedded anchors
pub const REQUIRED_SF_EMBEDDED: f64 = 2.0;

/// Lever arm turning the node moment into anchor tension (m)
pub const NODE_LEVER_ARM_M: f64 = 0.3;
/// Reference embedment for chemical anchors (cm)
pub const REFERENCE_EMBEDMENT_CM: f64 = 15.0;
/// Cap on the embedment factor
pub const MAX_EMBEDMENT_FACTOR: f64 = 1.2;
/// Reduction on the group shear resistance
pub const SHEAR_GROUP_FACTOR: f64 = 0.8;

/// Resistance of one embedded anchor at reference embedment (kN)
pub const EMBEDDED_UNIT_RESISTANCE_KN: f64 = 10.0;
pub const EMBEDDED_REFERENCE_CM: f64 = 20.0;

/// Design stress of a fillet weld throat (N/mm²)
pub const WELD_DESIGN_STRESS_MPA: f64 = 180.0;
/// Effective weld length (mm)
pub const WELD_LENGTH_MM: f64 = 500.0;
/// Throat-to-leg ratio
pub const WELD_THROAT_RATIO: f64 = 0.7;
/// Shear capacity increase for preloaded bolts
pub const PRELOAD_FACTOR: f64 = 1.25;

/// Forces from the frame acting on its connections.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DesignForces {
    #[serde(default)]
    pub m_max_knm: f64,
    #[serde(default)]
    pub v_max_kn: f64,
    #[serde(default)]
    pub n_max_kn: f64,
}

impl DesignForces {
    pub fn validate(&self) -> CalcResult<()> {
        for (field, value) in [
            ("m_max_knm", self.m_max_knm),
            ("v_max_kn", self.v_max_kn),
            ("n_max_kn", self.n_max_kn),
        ] {
            if !value.is_finite() {
                return Err(CalcError::invalid_input(field, value.to_string(), "Force must be finite"));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tables
// ============================================================================

impl AnchorDiameter {
    /// Tabulated (tension, shear) resistance of a single anchor (kN)
    pub fn resistance_kn(&self) -> (f64, f64) {
        match self {
            AnchorDiameter::M12 => (15.0, 10.0),
            AnchorDiameter::M16 => (25.0, 18.0),
            AnchorDiameter::M20 => (40.0, 30.0),
            AnchorDiameter::M24 => (60.0, 45.0),
            AnchorDiameter::M27 => (80.0, 60.0),
            AnchorDiameter::M30 => (100.0, 75.0),
        }
    }
}

impl AnchorSystem {
    pub fn factor(&self) -> f64 {
        match self {
            AnchorSystem::ChemicalInjection => 1.0,
            AnchorSystem::ThreadedBarEpoxy => 0.95,
            AnchorSystem::WalledInStirrups => 0.8,
            AnchorSystem::MechanicalPlates => 0.85,
            AnchorSystem::ThroughBars => 1.1,
        }
    }
}

impl AnchorPattern {
    pub fn factor(&self) -> f64 {
        match self {
            AnchorPattern::Square => 1.0,
            AnchorPattern::Circular => 0.95,
            AnchorPattern::Inline => 0.85,
            AnchorPattern::Staggered => 0.9,
        }
    }
}

impl EmbeddedAnchorKind {
    pub fn factor(&self) -> f64 {
        match self {
            EmbeddedAnchorKind::LBar => 1.0,
            EmbeddedAnchorKind::UBar => 1.2,
            EmbeddedAnchorKind::ClosedStirrup => 1.5,
            EmbeddedAnchorKind::Plate => 1.3,
        }
    }
}

impl BoltDiameter {
    /// Shear resistance per bolt, class 8.8 (kN)
    pub fn shear_resistance_kn(&self) -> f64 {
        match self {
            BoltDiameter::M12 => 22.0,
            BoltDiameter::M16 => 39.0,
            BoltDiameter::M20 => 61.0,
            BoltDiameter::M24 => 88.0,
        }
    }
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionKind {
    ChemicalAnchors,
    EmbeddedAnchors,
    Weld,
    Bolts,
}

impl ConnectionKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ConnectionKind::ChemicalAnchors => "Chemical anchors",
            ConnectionKind::EmbeddedAnchors => "Embedded anchors",
            ConnectionKind::Weld => "Fillet weld",
            ConnectionKind::Bolts => "Bolted joint",
        }
    }
}

impl std::fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Outcome of one connection check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionCheck {
    pub kind: ConnectionKind,
    /// Governing demand (kN); anchor tension for chemical anchors
    pub demand_kn: f64,
    pub resistance_kn: f64,
    /// Shear demand and resistance, for checks with an interaction
    pub shear_demand_kn: Option<f64>,
    pub shear_resistance_kn: Option<f64>,
    pub utilization: f64,
    pub safety_factor: f64,
    pub required_safety_factor: f64,
    pub verified: bool,
}

impl ConnectionCheck {
    fn simple(kind: ConnectionKind, demand: f64, resistance: f64, required: f64) -> Self {
        let safety_factor = if demand > 0.0 {
            resistance / demand
        } else {
            UNLOADED_SAFETY_FACTOR
        };
        ConnectionCheck {
            kind,
            demand_kn: demand,
            resistance_kn: resistance,
            shear_demand_kn: None,
            shear_resistance_kn: None,
            utilization: if resistance > 0.0 { demand / resistance } else { f64::MAX },
            safety_factor,
            required_safety_factor: required,
            verified: safety_factor > required,
        }
    }
}

// ============================================================================
// Checks
// ============================================================================

/// Chemical anchors at a frame node.
pub fn check_chemical_anchors(spec: &ChemicalAnchorSpec, forces: &DesignForces) -> CalcResult<ConnectionCheck> {
    if spec.count_per_node == 0 {
        return Err(CalcError::invalid_input("count_per_node", "0", "At least one anchor per node"));
    }
    if spec.embedment_cm <= 0.0 || !spec.embedment_cm.is_finite() {
        return Err(CalcError::invalid_input(
            "embedment_cm",
            spec.embedment_cm.to_string(),
            "Embedment depth must be positive",
        ));
    }

    let (n_single, v_single) = spec.diameter.resistance_kn();
    let k_depth = (spec.embedment_cm / REFERENCE_EMBEDMENT_CM).min(MAX_EMBEDMENT_FACTOR);
    let group = spec.count_per_node as f64 * spec.system.factor() * k_depth * spec.pattern.factor();
    let n_rd = n_single * group;
    let v_rd = v_single * group * SHEAR_GROUP_FACTOR;

    let tension = forces.n_max_kn.abs() + forces.m_max_knm.abs() / NODE_LEVER_ARM_M;
    let shear = forces.v_max_kn.abs();
    let utilization = (tension / n_rd).powi(2) + (shear / v_rd).powi(2);
    let safety_factor = if utilization > 0.0 {
        1.0 / utilization.sqrt()
    } else {
        UNLOADED_SAFETY_FACTOR
    };

    Ok(ConnectionCheck {
        kind: ConnectionKind::ChemicalAnchors,
        demand_kn: tension,
        resistance_kn: n_rd,
        shear_demand_kn: Some(shear),
        shear_resistance_kn: Some(v_rd),
        utilization,
        safety_factor,
        required_safety_factor: REQUIRED_SF,
        verified: safety_factor > REQUIRED_SF,
    })
}

/// Anchors cast into the masonry, per metre of frame.
pub fn check_embedded_anchors(spec: &EmbeddedAnchorSpec, forces: &DesignForces) -> CalcResult<ConnectionCheck> {
    if spec.embedment_cm <= 0.0 || !spec.embedment_cm.is_finite() {
        return Err(CalcError::invalid_input(
            "embedment_cm",
            spec.embedment_cm.to_string(),
            "Embedment depth must be positive",
        ));
    }
    let unit = EMBEDDED_UNIT_RESISTANCE_KN * spec.embedment_cm / EMBEDDED_REFERENCE_CM;
    let resistance = unit * spec.count_per_meter as f64 * spec.kind.factor();
    let demand = forces.v_max_kn.abs().max(forces.n_max_kn.abs());
    Ok(ConnectionCheck::simple(
        ConnectionKind::EmbeddedAnchors,
        demand,
        resistance,
        REQUIRED_SF_EMBEDDED,
    ))
}

pub fn check_weld(spec: &WeldSpec, forces: &DesignForces) -> CalcResult<ConnectionCheck> {
    if spec.leg_mm <= 0.0 || !spec.leg_mm.is_finite() {
        return Err(CalcError::invalid_input("leg_mm", spec.leg_mm.to_string(), "Weld size must be positive"));
    }
    let throat_mm = spec.leg_mm * WELD_THROAT_RATIO;
    let resistance = WELD_DESIGN_STRESS_MPA * throat_mm * WELD_LENGTH_MM / 1000.0;
    let demand = forces.n_max_kn.hypot(forces.v_max_kn);
    Ok(ConnectionCheck::simple(ConnectionKind::Weld, demand, resistance, REQUIRED_SF))
}

pub fn check_bolts(spec: &BoltSpec, forces: &DesignForces) -> CalcResult<ConnectionCheck> {
    if spec.count == 0 {
        return Err(CalcError::invalid_input("count", "0", "At least one bolt is required"));
    }
    let mut resistance = spec.diameter.shear_resistance_kn() * spec.count as f64;
    if spec.preloaded {
        resistance *= PRELOAD_FACTOR;
    }
    Ok(ConnectionCheck::simple(
        ConnectionKind::Bolts,
        forces.v_max_kn.abs(),
        resistance,
        REQUIRED_SF,
    ))
}

pub fn check_anchors(spec: &AnchorSpec, forces: &DesignForces) -> CalcResult<ConnectionCheck> {
    match spec {
        AnchorSpec::Chemical(chemical) => check_chemical_anchors(chemical, forces),
        AnchorSpec::Embedded(embedded) => check_embedded_anchors(embedded, forces),
    }
}

pub fn check_splice(spec: &SpliceSpec, forces: &DesignForces) -> CalcResult<ConnectionCheck> {
    match spec {
        SpliceSpec::Welded(weld) => check_weld(weld, forces),
        SpliceSpec::Bolted(bolts) => check_bolts(bolts, forces),
    }
}

// ============================================================================
// Stand-alone check
// ============================================================================

/// Connection to verify on its own
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "connection")]
pub enum ConnectionSpec {
    Anchors(AnchorSpec),
    Splice(SpliceSpec),
}

/// A connection checked against given forces, outside any intervention.
///
/// ## JSON Example
///
/// ```json
/// {
///   "spec": { "connection": "Splice", "type": "Bolted", "diameter": "M20", "count": 4 },
///   "forces": { "m_max_knm": 0.0, "v_max_kn": 40.0, "n_max_kn": 0.0 }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInput {
    pub spec: ConnectionSpec,
    pub forces: DesignForces,
}

pub fn calculate(input: &ConnectionInput) -> CalcResult<ConnectionCheck> {
    input.forces.validate()?;
    match &input.spec {
        ConnectionSpec::Anchors(anchors) => check_anchors(anchors, &input.forces),
        ConnectionSpec::Splice(splice) => check_splice(splice, &input.forces),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn forces(m: f64, v: f64, n: f64) -> DesignForces {
        DesignForces {
            m_max_knm: m,
            v_max_kn: v,
            n_max_kn: n,
        }
    }

    #[test]
    fn test_chemical_anchor_resistance() {
        let spec = ChemicalAnchorSpec::default();
        // M16, 4 anchors, 20 cm → k_depth = 1.2 (capped from 1.333)
        let check = check_chemical_anchors(&spec, &forces(3.0, 10.0, 5.0)).unwrap();
        assert_relative_eq!(check.resistance_kn, 25.0 * 4.0 * 1.2, max_relative = 1e-12);
        assert_relative_eq!(check.shear_resistance_kn.unwrap(), 18.0 * 4.0 * 1.2 * 0.8, max_relative = 1e-12);
        // N = 5 + 3/0.3 = 15
        assert_relative_eq!(check.demand_kn, 15.0, max_relative = 1e-12);
        let u = (15.0_f64 / 120.0).powi(2) + (10.0_f64 / 69.12).powi(2);
        assert_relative_eq!(check.utilization, u, max_relative = 1e-12);
        assert_relative_eq!(check.safety_factor, 1.0 / u.sqrt(), max_relative = 1e-12);
        assert!(check.verified);
    }

    #[test]
    fn test_chemical_anchor_factors() {
        let spec = ChemicalAnchorSpec {
            system: AnchorSystem::WalledInStirrups,
            diameter: AnchorDiameter::M20,
            count_per_node: 2,
            embedment_cm: 12.0,
            pattern: AnchorPattern::Inline,
        };
        let check = check_chemical_anchors(&spec, &forces(0.0, 0.0, 10.0)).unwrap();
        assert_relative_eq!(check.resistance_kn, 40.0 * 2.0 * 0.8 * 0.8 * 0.85, max_relative = 1e-12);
    }

    #[test]
    fn test_unloaded_connection() {
        let check = check_chemical_anchors(&ChemicalAnchorSpec::default(), &DesignForces::default()).unwrap();
        assert_eq!(check.safety_factor, UNLOADED_SAFETY_FACTOR);
        assert!(check.verified);
    }

    #[test]
    fn test_embedded_anchors() {
        let spec = EmbeddedAnchorSpec {
            kind: EmbeddedAnchorKind::UBar,
            count_per_meter: 4,
            embedment_cm: 30.0,
        };
        let check = check_embedded_anchors(&spec, &forces(0.0, 20.0, 35.0)).unwrap();
        // 10·1.5·4·1.2 = 72 kN against 35 kN
        assert_relative_eq!(check.resistance_kn, 72.0, max_relative = 1e-12);
        assert_relative_eq!(check.safety_factor, 72.0 / 35.0, max_relative = 1e-12);
        assert!(check.verified);

        let weak = check_embedded_anchors(&spec, &forces(0.0, 40.0, 0.0)).unwrap();
        assert!(!weak.verified);
    }

    #[test]
    fn test_weld() {
        let check = check_weld(&WeldSpec { leg_mm: 6.0 }, &forces(0.0, 30.0, 40.0)).unwrap();
        assert_relative_eq!(check.resistance_kn, 180.0 * 4.2 * 500.0 / 1000.0, max_relative = 1e-12);
        assert_relative_eq!(check.demand_kn, 50.0, max_relative = 1e-12);
        assert!(check.verified);
    }

    #[test]
    fn test_bolts() {
        let spec = BoltSpec {
            diameter: BoltDiameter::M20,
            count: 4,
            preloaded: true,
        };
        let check = check_bolts(&spec, &forces(10.0, -100.0, 50.0)).unwrap();
        assert_relative_eq!(check.resistance_kn, 61.0 * 4.0 * 1.25, max_relative = 1e-12);
        assert_relative_eq!(check.demand_kn, 100.0);
        assert!(check.verified);
    }

    #[test]
    fn test_standalone_input_from_json() {
        let json = r#"{
            "spec": { "connection": "Splice", "type": "Bolted", "diameter": "M12", "count": 2 },
            "forces": { "v_max_kn": 40.0 }
        }"#;
        let input: ConnectionInput = serde_json::from_str(json).unwrap();
        let check = calculate(&input).unwrap();
        assert_eq!(check.kind, ConnectionKind::Bolts);
        // 44 kN / 40 kN = 1.1
        assert!(!check.verified);
    }
}
