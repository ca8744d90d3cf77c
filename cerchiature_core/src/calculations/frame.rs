//! # Frame Contribution
//!
//! Stiffness and shear resistance contributed by the frame (cerchiatura)
//! placed around one new opening.
//!
//! ## Steel
//!
//! Portal frame (lintel + jambs), E = 210 000 N/mm²:
//!
//! K = 12·E·I_c/H³ · (1 + 3·I_c·H/(I_b·L)) · f_base · f_node · f_collab · (0.9 with P-Δ)
//!
//! Lintel only: K = 48·E·I/L³, reduced by 0.7 with arch end restraints.
//!
//! Shear resistance: V = 2·W_pl·f_y·n/(h·γ_M0), with W_pl of the lintel.
//!
//! ## Reinforced concrete
//!
//! Portal: k1 = 12·Ecm·I_col/h³, k2 = 12·Ecm·I_beam/L³,
//! K = 2/(1/k1 + 1/k2) · 0.5 (cracked section). Lintel only: 48·Ecm·I/L³ · 0.5.
//! Concrete frames contribute stiffness only; their section capacities are
//! reported alongside.
//!
//! A failure inside one frame never aborts the run: the result carries the
//! error and contributes nothing.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::arch::{self, BendabilityInput, BendabilityResult, MaterialQuantity, ThrustCheck};
use crate::calculations::composite::{self, CompositeSection};
use crate::calculations::connections::{self, ConnectionCheck, DesignForces};
use crate::errors::{CalcError, CalcResult};
use crate::materials::concrete::CRACKED_INERTIA_FACTOR;
use crate::materials::steel::{E_STEEL_MPA, GAMMA_M0};
use crate::materials::{ProfileCatalog, RebarSet};
use crate::model::{ConcreteFrameSpec, Opening, ReinforcementSpec, SteelFrameSpec, WallGeometry};
use crate::units::{cm_to_m, Cm3, Cm4, Kilopascals, Megapascals, M4};

/// Stiffness reduction for second-order (P-Δ) effects
pub const SECOND_ORDER_FACTOR: f64 = 0.9;
/// Lintel stiffness reduction with arch end restraints
pub const ARCH_END_RESTRAINT_FACTOR: f64 = 0.7;

/// Stirrup diameter assumed in the effective depth (m)
pub const ASSUMED_STIRRUP_M: f64 = 0.008;
/// Neutral axis limit x/d between fields 2 and 3
pub const FIELD_LIMIT_XD: f64 = 0.259;
/// Minimum longitudinal reinforcement as a fraction of the concrete area
pub const MIN_REINFORCEMENT_RATIO: f64 = 0.001;
/// Absolute stirrup spacing limit (cm)
pub const MAX_STIRRUP_SPACING_CM: f64 = 30.0;

/// Everything a frame computation reads besides the opening itself.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub catalog: &'a ProfileCatalog,
    pub wall: &'a WallGeometry,
    /// Unit weight of the masonry above the opening (kN/m³)
    pub masonry_unit_weight_kn_m3: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameMaterial {
    Steel,
    Concrete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameLayout {
    /// Lintel and jambs
    Portal,
    LintelOnly,
}

/// Arch-related results of a frame around an arched opening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchFrameData {
    pub radius_cm: f64,
    pub developed_length_cm: f64,
    /// Steel frames only
    pub bendability: Option<BendabilityResult>,
    pub quantity: Option<MaterialQuantity>,
    pub thrust: Option<ThrustCheck>,
}

/// Section capacities of a concrete frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcreteCapacity {
    pub fcd_mpa: f64,
    pub fyd_mpa: f64,
    /// Effective depth of the lintel (m)
    pub effective_depth_m: f64,
    pub m_rd_beam_knm: f64,
    pub v_rd_beam_kn: f64,
    pub n_rd_column_kn: Option<f64>,
    pub m_rd_column_knm: Option<f64>,
    pub min_reinforcement_ok: bool,
}

/// Contribution of one reinforced opening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    pub opening_id: String,
    pub material: FrameMaterial,
    pub layout: FrameLayout,
    pub span_m: f64,
    pub height_m: f64,
    /// Lateral stiffness (kN/m)
    pub k_frame_kn_m: f64,
    /// Shear resistance (kN)
    pub v_resistance_kn: f64,
    /// Line load on the lintel (kN/m)
    pub q_kn_m: f64,
    pub forces: DesignForces,
    pub lintel: Option<CompositeSection>,
    pub jambs: Option<CompositeSection>,
    pub arch: Option<ArchFrameData>,
    pub concrete: Option<ConcreteCapacity>,
    pub connections: Vec<ConnectionCheck>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

impl FrameResult {
    fn empty(opening_id: &str, spec: &ReinforcementSpec, opening: &Opening) -> Self {
        let (material, layout) = match spec {
            ReinforcementSpec::Steel(s) => (
                FrameMaterial::Steel,
                if s.jambs.is_some() {
                    FrameLayout::Portal
                } else {
                    FrameLayout::LintelOnly
                },
            ),
            ReinforcementSpec::Concrete(c) => (
                FrameMaterial::Concrete,
                if c.columns.is_some() {
                    FrameLayout::Portal
                } else {
                    FrameLayout::LintelOnly
                },
            ),
        };
        FrameResult {
            opening_id: opening_id.to_string(),
            material,
            layout,
            span_m: cm_to_m(opening.width_cm),
            height_m: cm_to_m(opening.height_cm),
            k_frame_kn_m: 0.0,
            v_resistance_kn: 0.0,
            q_kn_m: 0.0,
            forces: DesignForces::default(),
            lintel: None,
            jambs: None,
            arch: None,
            concrete: None,
            connections: Vec::new(),
            warnings: Vec::new(),
            error: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// True when every connection check passed
    pub fn connections_ok(&self) -> bool {
        self.connections.iter().all(|c| c.verified)
    }
}

// ============================================================================
// Forces
// ============================================================================

/// Lintel line load and the resulting simply supported forces.
///
/// q = γ·t·h_above; M = qL²/8; V = qL/2; N = V.
pub fn lintel_forces(opening: &Opening, wall: &WallGeometry, unit_weight_kn_m3: f64) -> (f64, DesignForces) {
    let h_above = (wall.height_m() - cm_to_m(opening.top_cm())).max(0.0);
    let q = unit_weight_kn_m3 * wall.thickness_m() * h_above;
    let span = cm_to_m(opening.width_cm);
    let v = q * span / 2.0;
    (
        q,
        DesignForces {
            m_max_knm: q * span.powi(2) / 8.0,
            v_max_kn: v,
            n_max_kn: v,
        },
    )
}

// ============================================================================
// Steel
// ============================================================================

fn e_steel_kpa() -> f64 {
    Kilopascals::from(Megapascals(E_STEEL_MPA)).value()
}

fn inertia_m4(cm4: f64) -> f64 {
    M4::from(Cm4(cm4)).value()
}

/// Lateral stiffness of a steel portal (kN/m).
pub fn steel_portal_stiffness(i_column_m4: f64, i_beam_m4: f64, height_m: f64, span_m: f64) -> f64 {
    let e = e_steel_kpa();
    12.0 * e * i_column_m4 / height_m.powi(3) * (1.0 + 3.0 * i_column_m4 * height_m / (i_beam_m4 * span_m))
}

/// Lateral stiffness of a steel lintel on two supports (kN/m).
pub fn steel_lintel_stiffness(i_beam_m4: f64, span_m: f64) -> f64 {
    48.0 * e_steel_kpa() * i_beam_m4 / span_m.powi(3)
}

fn compute_steel(ctx: &FrameContext<'_>, spec: &SteelFrameSpec, result: &mut FrameResult) -> CalcResult<()> {
    let lintel = composite::resolve_spec(ctx.catalog, &spec.lintel)?;
    let i_beam = inertia_m4(lintel.bending_inertia_cm4(spec.lintel.rotated));
    let span = result.span_m;
    let height = result.height_m;
    let c = &spec.constraints;

    result.k_frame_kn_m = match &spec.jambs {
        Some(jamb_spec) => {
            let jambs = composite::resolve_spec(ctx.catalog, jamb_spec)?;
            let i_column = inertia_m4(jambs.bending_inertia_cm4(jamb_spec.rotated));
            result.jambs = Some(jambs);

            let mut k = steel_portal_stiffness(i_column, i_beam, height, span)
                * c.base_factor()
                * c.node_factor()
                * c.collaboration.factor();
            if c.second_order {
                k *= SECOND_ORDER_FACTOR;
            }
            k
        }
        None => {
            let mut k = steel_lintel_stiffness(i_beam, span);
            if c.arch_end_restraints {
                k *= ARCH_END_RESTRAINT_FACTOR;
            }
            k
        }
    };

    match ctx.catalog.plastic_modulus(&spec.lintel.profile, spec.lintel.rotated) {
        Some(w_pl) => {
            let m_pl = Cm3(w_pl).moment_at(Megapascals(spec.grade.fy_mpa())).value();
            result.v_resistance_kn = 2.0 * m_pl * spec.lintel.count as f64 / height / GAMMA_M0;
        }
        None => {
            result.warnings.push(format!(
                "Plastic modulus not available for {}: frame shear resistance taken as 0",
                spec.lintel.profile
            ));
        }
    }

    result.lintel = Some(lintel);

    if let Some(splice) = &spec.splice {
        result.connections.push(connections::check_splice(splice, &result.forces)?);
    }
    Ok(())
}

/// Outcome of an optional arch check; a failure becomes a warning.
fn optional_check<T>(result: &mut FrameResult, check: &str, outcome: CalcResult<T>) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(opening = %result.opening_id, check, error = %e, "arch check skipped");
            result.warnings.push(format!("Arch {} not evaluated: {}", check, e));
            None
        }
    }
}

fn arch_thrust(ctx: &FrameContext<'_>, opening: &Opening, result: &mut FrameResult) -> Option<ThrustCheck> {
    let thrust = optional_check(
        result,
        "thrust check",
        arch::thrust_check(opening, ctx.wall, ctx.masonry_unit_weight_kn_m3),
    )?;
    if !thrust.verified {
        result.warnings.push(format!(
            "Arch thrust {:.1} kN exceeds the pier capacity (SF = {:.2})",
            thrust.thrust_kn, thrust.safety_factor
        ));
    }
    Some(thrust)
}

fn steel_arch_data(ctx: &FrameContext<'_>, opening: &Opening, spec: &SteelFrameSpec, result: &mut FrameResult) -> CalcResult<()> {
    let Some(arch_data) = opening.arch() else {
        return Ok(());
    };
    let radius_cm = arch::curvature_radius(arch_data, opening.width_cm)?;
    let developed_length_cm = arch::developed_length(arch_data, opening.width_cm)?;

    let bendability = optional_check(
        result,
        "bendability",
        arch::check_bendability(
            ctx.catalog,
            &BendabilityInput {
                profile: spec.lintel.profile.clone(),
                radius_cm,
                grade: spec.grade,
            },
        ),
    );
    if let Some(b) = bendability.as_ref().filter(|b| !b.bendable) {
        result.warnings.push(format!(
            "Arch: {} cannot be bent to R = {:.0} cm ({})",
            b.profile, radius_cm, b.method
        ));
    }

    let quantity = optional_check(
        result,
        "material quantity",
        arch::material_quantity(ctx.catalog, opening, &spec.lintel.profile, spec.lintel.count),
    );
    let thrust = arch_thrust(ctx, opening, result);

    result.arch = Some(ArchFrameData {
        radius_cm,
        developed_length_cm,
        bendability,
        quantity,
        thrust,
    });
    Ok(())
}

// ============================================================================
// Concrete
// ============================================================================

/// Section capacities of a reinforced-concrete frame.
pub fn concrete_capacity(spec: &ConcreteFrameSpec) -> ConcreteCapacity {
    let props = spec.class.properties();
    let fcd = spec.class.fcd_mpa();
    let fyd = spec.rebar.fyd_mpa();
    let cover = spec.cover_mm / 1000.0;

    let b = cm_to_m(spec.beam.width_cm);
    let h = cm_to_m(spec.beam.depth_cm);
    let d = h - cover - ASSUMED_STIRRUP_M;
    let a_s = spec.beam.bottom_bars.area_mm2() * 1e-6;

    let x = a_s * fyd / (0.8 * b * fcd);
    let m_rd = if x < FIELD_LIMIT_XD * d {
        a_s * fyd * (d - 0.4 * x) * 1e3
    } else {
        FIELD_LIMIT_XD * b * d.powi(2) * fcd * 1e3
    };

    let k = (1.0 + (200.0 / (d * 1000.0)).sqrt()).min(2.0);
    let rho = a_s / (b * d);
    let v_rd = 0.18 * k * (100.0 * rho * props.fck_mpa).cbrt() * b * d * 1000.0;

    let (n_rd_column, m_rd_column) = match &spec.columns {
        Some(col) => {
            let b_col = cm_to_m(col.width_cm);
            let h_col = cm_to_m(col.thickness_cm);
            let a_s_col = RebarSet::new(4, 16.0).area_mm2() * 1e-6;
            let d_col = h_col - cover - ASSUMED_STIRRUP_M;
            (
                Some((0.8 * b_col * h_col * fcd + a_s_col * fyd) * 1e3),
                Some(a_s_col * fyd * d_col * 0.9 * 1e3),
            )
        }
        None => (None, None),
    };

    ConcreteCapacity {
        fcd_mpa: fcd,
        fyd_mpa: fyd,
        effective_depth_m: d,
        m_rd_beam_knm: m_rd,
        v_rd_beam_kn: v_rd,
        n_rd_column_kn: n_rd_column,
        m_rd_column_knm: m_rd_column,
        min_reinforcement_ok: minimum_reinforcement(spec).is_empty(),
    }
}

/// Minimum reinforcement checks, one message per violation.
pub fn minimum_reinforcement(spec: &ConcreteFrameSpec) -> Vec<String> {
    let beam = &spec.beam;
    // cm² → mm²
    let a_s_min = MIN_REINFORCEMENT_RATIO * beam.width_cm * beam.depth_cm * 100.0;
    let mut messages = Vec::new();

    for (label, bars) in [("Top", beam.top_bars), ("Bottom", beam.bottom_bars)] {
        if bars.area_mm2() < a_s_min {
            messages.push(format!(
                "{} reinforcement {} insufficient: {:.0} mm² < {:.0} mm²",
                label,
                bars,
                bars.area_mm2(),
                a_s_min
            ));
        }
    }

    let max_spacing = (0.8 * (beam.depth_cm - 5.0)).min(MAX_STIRRUP_SPACING_CM);
    if beam.stirrups.spacing_cm > max_spacing {
        messages.push(format!(
            "Stirrup spacing too large: {} cm > {:.0} cm",
            beam.stirrups.spacing_cm, max_spacing
        ));
    }
    messages
}

fn compute_concrete(spec: &ConcreteFrameSpec, result: &mut FrameResult) -> CalcResult<()> {
    for (field, value) in [
        ("beam.width_cm", spec.beam.width_cm),
        ("beam.depth_cm", spec.beam.depth_cm),
        ("cover_mm", spec.cover_mm),
    ] {
        if value <= 0.0 || !value.is_finite() {
            return Err(CalcError::invalid_input(field, value.to_string(), "Section size must be positive"));
        }
    }

    let ecm = Kilopascals::from(Megapascals(spec.class.properties().ecm_mpa)).value();
    let b = cm_to_m(spec.beam.width_cm);
    let h = cm_to_m(spec.beam.depth_cm);
    let i_beam = b * h.powi(3) / 12.0;
    let span = result.span_m;

    result.k_frame_kn_m = match &spec.columns {
        Some(col) => {
            let b_col = cm_to_m(col.width_cm);
            let t_col = cm_to_m(col.thickness_cm);
            let i_col = t_col * b_col.powi(3) / 12.0;
            let k1 = 12.0 * ecm * i_col / result.height_m.powi(3);
            let k2 = 12.0 * ecm * i_beam / span.powi(3);
            2.0 / (1.0 / k1 + 1.0 / k2) * CRACKED_INERTIA_FACTOR
        }
        None => 48.0 * ecm * i_beam / span.powi(3) * CRACKED_INERTIA_FACTOR,
    };

    let capacity = concrete_capacity(spec);
    if capacity.effective_depth_m <= 0.0 {
        return Err(CalcError::invalid_input(
            "cover_mm",
            spec.cover_mm.to_string(),
            "Cover leaves no effective depth",
        ));
    }
    result.warnings.extend(minimum_reinforcement(spec));
    result.concrete = Some(capacity);
    Ok(())
}

// ============================================================================
// Public API
// ============================================================================

fn try_compute(
    ctx: &FrameContext<'_>,
    opening: &Opening,
    spec: &ReinforcementSpec,
    result: &mut FrameResult,
) -> CalcResult<()> {
    if opening.width_cm <= 0.0 || opening.height_cm <= 0.0 {
        return Err(CalcError::calculation_failed(
            "frame",
            "A frame needs an opening with positive width and height",
        ));
    }

    let (q, forces) = lintel_forces(opening, ctx.wall, ctx.masonry_unit_weight_kn_m3);
    result.q_kn_m = q;
    result.forces = forces;

    match spec {
        ReinforcementSpec::Steel(steel) => {
            steel_arch_data(ctx, opening, steel, result)?;
            compute_steel(ctx, steel, result)?;
        }
        ReinforcementSpec::Concrete(concrete) => {
            if let Some(arch_data) = opening.arch() {
                let radius_cm = arch::curvature_radius(arch_data, opening.width_cm)?;
                let developed_length_cm = arch::developed_length(arch_data, opening.width_cm)?;
                let thrust = arch_thrust(ctx, opening, result);
                result.arch = Some(ArchFrameData {
                    radius_cm,
                    developed_length_cm,
                    bendability: None,
                    quantity: None,
                    thrust,
                });
            }
            compute_concrete(concrete, result)?;
        }
    }

    if let Some(anchors) = spec.anchors() {
        let check = connections::check_anchors(anchors, &result.forces)?;
        if !check.verified {
            result.warnings.push(format!(
                "{} not verified: SF = {:.2} < {}",
                check.kind, check.safety_factor, check.required_safety_factor
            ));
        }
        result.connections.push(check);
    }
    Ok(())
}

/// Compute the contribution of the frame around `opening`.
///
/// Never fails: errors are reported in [`FrameResult::error`] with zero
/// stiffness and resistance.
pub fn compute_frame(ctx: &FrameContext<'_>, opening_id: &str, opening: &Opening, spec: &ReinforcementSpec) -> FrameResult {
    let mut result = FrameResult::empty(opening_id, spec, opening);
    match try_compute(ctx, opening, spec, &mut result) {
        Ok(()) => {
            debug!(
                opening = %opening_id,
                material = ?result.material,
                k_frame = result.k_frame_kn_m,
                v_resistance = result.v_resistance_kn,
                "frame computed"
            );
        }
        Err(err) => {
            warn!(opening = %opening_id, error = %err, "frame calculation degraded");
            result.k_frame_kn_m = 0.0;
            result.v_resistance_kn = 0.0;
            result.error = Some(err.to_string());
        }
    }
    result
}
