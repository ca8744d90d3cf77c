//! # Wall Self-Weight
//!
//! Self-weight of the wall panel and the checks that follow from it:
//! seismic mass, foundation pressures and overturning.
//!
//! Openings change the weight as follows:
//!
//! | opening | volume removed | weight added back |
//! |---|---|---|
//! | through | w·h·t | none |
//! | niche | w·h·depth | none |
//! | infilled | w·h·t | w·h·t_infill·γ_infill |

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::materials::MasonryMaterial;
use crate::model::{Opening, OpeningKind, WallGeometry};
use crate::units::cm_to_m;

/// Gravity acceleration (m/s²)
pub const G: f64 = 9.81;
/// Required overturning safety factor
pub const OVERTURNING_REQUIRED_SF: f64 = 1.5;
/// Safety factor reported when no overturning force acts
pub const UNLOADED_SAFETY_FACTOR: f64 = 999.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallWeight {
    pub gross_volume_m3: f64,
    /// Masonry volume left after the openings
    pub net_volume_m3: f64,
    pub unit_weight_kn_m3: f64,
    /// Masonry plus infills (kN)
    pub weight_kn: f64,
    /// Weight per metre of wall length (kN/m)
    pub weight_per_m_kn_m: f64,
    /// Centroid from the left end (m)
    pub centroid_x_m: f64,
    /// Centroid from the base (m)
    pub centroid_y_m: f64,
}

/// Self-weight of `wall` with `openings`.
pub fn wall_weight(wall: &WallGeometry, masonry: &MasonryMaterial, openings: &[Opening]) -> CalcResult<WallWeight> {
    wall.validate()?;
    let gamma = masonry.unit_weight_kn_m3;
    if gamma <= 0.0 || !gamma.is_finite() {
        return Err(CalcError::invalid_input(
            "unit_weight_kn_m3",
            gamma.to_string(),
            "Unit weight must be positive",
        ));
    }

    let (l, h, t) = (wall.length_m(), wall.height_m(), wall.thickness_m());
    let gross = l * h * t;

    let mut removed_volume = 0.0;
    // Net weight removed and its first moments
    let mut removed_weight = 0.0;
    let mut moment_x = 0.0;
    let mut moment_y = 0.0;

    for opening in openings.iter().filter(|o| !o.is_zero_area()) {
        let area = cm_to_m(opening.width_cm) * cm_to_m(opening.height_cm);
        let (volume, weight) = match opening.kind() {
            OpeningKind::Through => (area * t, area * t * gamma),
            OpeningKind::Niche { depth_cm } => {
                let v = area * cm_to_m(depth_cm.min(wall.thickness_cm));
                (v, v * gamma)
            }
            OpeningKind::Infilled(closure) => {
                let infill_t = cm_to_m(closure.effective_thickness_cm(wall.thickness_cm));
                let v = area * t;
                (v, v * gamma - area * infill_t * closure.material.unit_weight_kn_m3())
            }
        };
        removed_volume += volume;
        removed_weight += weight;
        moment_x += weight * cm_to_m(opening.x_cm + opening.width_cm / 2.0);
        moment_y += weight * cm_to_m(opening.y_cm + opening.height_cm / 2.0);
    }

    let net = gross - removed_volume;
    let weight = gross * gamma - removed_weight;
    let (centroid_x, centroid_y) = if weight > 0.0 {
        (
            (gross * gamma * l / 2.0 - moment_x) / weight,
            (gross * gamma * h / 2.0 - moment_y) / weight,
        )
    } else {
        (l / 2.0, h / 2.0)
    };

    debug!(gross, net, weight, "wall weight");

    Ok(WallWeight {
        gross_volume_m3: gross,
        net_volume_m3: net,
        unit_weight_kn_m3: gamma,
        weight_kn: weight,
        weight_per_m_kn_m: weight / l,
        centroid_x_m: centroid_x,
        centroid_y_m: centroid_y,
    })
}

// ============================================================================
// Seismic mass
// ============================================================================

fn default_floor_g2() -> f64 {
    2.0
}

fn default_floor_q() -> f64 {
    2.0
}

fn default_roof_g2() -> f64 {
    1.5
}

fn default_psi2() -> f64 {
    0.3
}

/// Floor and roof loads carried by the wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TributaryLoads {
    /// Floor area carried by the wall (m²)
    #[serde(default)]
    pub floor_area_m2: f64,
    /// Floor permanent load G2 (kN/m²)
    #[serde(default = "default_floor_g2")]
    pub floor_g2_kn_m2: f64,
    /// Floor variable load Q (kN/m²)
    #[serde(default = "default_floor_q")]
    pub floor_q_kn_m2: f64,
    #[serde(default)]
    pub roof_area_m2: f64,
    #[serde(default = "default_roof_g2")]
    pub roof_g2_kn_m2: f64,
    /// Seismic combination factor ψ2
    #[serde(default = "default_psi2")]
    pub psi2: f64,
}

impl Default for TributaryLoads {
    fn default() -> Self {
        TributaryLoads {
            floor_area_m2: 0.0,
            floor_g2_kn_m2: default_floor_g2(),
            floor_q_kn_m2: default_floor_q(),
            roof_area_m2: 0.0,
            roof_g2_kn_m2: default_roof_g2(),
            psi2: default_psi2(),
        }
    }
}

/// Seismic mass (t): (W + G2 + ψ2·Q)/g.
pub fn seismic_mass_t(wall_weight_kn: f64, loads: &TributaryLoads) -> f64 {
    let g2 = loads.floor_area_m2 * loads.floor_g2_kn_m2 + loads.roof_area_m2 * loads.roof_g2_kn_m2;
    let q = loads.psi2 * loads.floor_area_m2 * loads.floor_q_kn_m2;
    (wall_weight_kn + g2 + q) / G
}

// ============================================================================
// Foundation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoundationPressure {
    /// Total vertical load N (kN)
    pub n_kn: f64,
    /// M = N·e (kNm)
    pub m_knm: f64,
    pub sigma_max_kpa: f64,
    pub sigma_min_kpa: f64,
    /// Part of the base is in tension and excluded
    pub partialized: bool,
    /// Compressed base length when partialized (m)
    pub compressed_length_m: Option<f64>,
}

/// Pressures under the wall base, σ = N/A ± M/W along the wall length.
///
/// A base in tension is partialized: L_c = 3·(L/2 − e), σ_max = 2N/(t·L_c).
/// An eccentricity reaching L/2 leaves no compressed length and is an error.
pub fn foundation_pressure(
    wall: &WallGeometry,
    wall_weight_kn: f64,
    vertical_kn: f64,
    eccentricity_m: f64,
) -> CalcResult<FoundationPressure> {
    let (b, l) = (wall.thickness_m(), wall.length_m());
    let n = wall_weight_kn + vertical_kn;
    let m = n * eccentricity_m;

    let area = b * l;
    let modulus = b * l.powi(2) / 6.0;
    let sigma_max = n / area + m.abs() / modulus;
    let sigma_min = n / area - m.abs() / modulus;

    if sigma_min >= 0.0 {
        return Ok(FoundationPressure {
            n_kn: n,
            m_knm: m,
            sigma_max_kpa: sigma_max,
            sigma_min_kpa: sigma_min,
            partialized: false,
            compressed_length_m: None,
        });
    }

    let compressed = 3.0 * (l / 2.0 - eccentricity_m.abs());
    if compressed <= 0.0 {
        return Err(CalcError::calculation_failed(
            "foundation",
            format!("Eccentricity {:.2} m leaves no compressed base (L/2 = {:.2} m)", eccentricity_m, l / 2.0),
        ));
    }

    Ok(FoundationPressure {
        n_kn: n,
        m_knm: m,
        sigma_max_kpa: 2.0 * n / (b * compressed),
        sigma_min_kpa: 0.0,
        partialized: true,
        compressed_length_m: Some(compressed),
    })
}

// ============================================================================
// Overturning
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverturningCheck {
    pub m_overturning_knm: f64,
    pub m_stabilizing_knm: f64,
    pub safety_factor: f64,
    pub verified: bool,
}

/// Out-of-plane overturning about the base edge under a horizontal force
/// applied at `height_m`.
pub fn overturning_check(wall: &WallGeometry, wall_weight_kn: f64, force_kn: f64, height_m: f64) -> OverturningCheck {
    let m_over = force_kn * height_m;
    let m_stab = wall_weight_kn * wall.thickness_m() / 2.0;
    let safety_factor = if m_over > 0.0 {
        m_stab / m_over
    } else {
        UNLOADED_SAFETY_FACTOR
    };
    OverturningCheck {
        m_overturning_knm: m_over,
        m_stabilizing_knm: m_stab,
        safety_factor,
        verified: safety_factor >= OVERTURNING_REQUIRED_SF,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClosureData, ClosureMaterial, NicheData};
    use approx::assert_relative_eq;

    fn brick() -> MasonryMaterial {
        MasonryMaterial {
            name: "Brick".to_string(),
            fcm_mpa: 2.4,
            tau0_mpa: 0.06,
            e_mpa: 1500.0,
            unit_weight_kn_m3: 18.0,
            knowledge_level: Default::default(),
        }
    }

    fn test_wall() -> WallGeometry {
        WallGeometry::new(500.0, 300.0, 30.0)
    }

    #[test]
    fn test_solid_wall_weight() {
        let w = wall_weight(&test_wall(), &brick(), &[]).unwrap();
        assert_relative_eq!(w.gross_volume_m3, 4.5, max_relative = 1e-12);
        assert_relative_eq!(w.weight_kn, 81.0, max_relative = 1e-12);
        assert_relative_eq!(w.weight_per_m_kn_m, 16.2, max_relative = 1e-12);
        assert_relative_eq!(w.centroid_x_m, 2.5, max_relative = 1e-12);
        assert_relative_eq!(w.centroid_y_m, 1.5, max_relative = 1e-12);
    }

    #[test]
    fn test_through_opening_shifts_centroid() {
        let door = Opening::rectangular(0.0, 0.0, 100.0, 200.0);
        let w = wall_weight(&test_wall(), &brick(), &[door]).unwrap();
        let removed = 1.0 * 2.0 * 0.3;
        assert_relative_eq!(w.net_volume_m3, 4.5 - removed, max_relative = 1e-12);
        assert_relative_eq!(w.weight_kn, (4.5 - removed) * 18.0, max_relative = 1e-12);
        assert!(w.centroid_x_m > 2.5);
        assert!(w.centroid_y_m > 1.5);
    }

    #[test]
    fn test_niche_removes_only_its_depth() {
        let mut niche = Opening::rectangular(100.0, 50.0, 100.0, 100.0);
        niche.niche = Some(NicheData { depth_cm: 10.0 });
        let w = wall_weight(&test_wall(), &brick(), &[niche]).unwrap();
        assert_relative_eq!(w.net_volume_m3, 4.5 - 0.1, max_relative = 1e-12);
    }

    #[test]
    fn test_infill_adds_its_weight() {
        let mut closed = Opening::rectangular(100.0, 0.0, 100.0, 200.0);
        closed.closure = Some(ClosureData {
            material: ClosureMaterial::HollowBrick,
            thickness_cm: Some(12.0),
        });
        let w = wall_weight(&test_wall(), &brick(), &[closed.clone()]).unwrap();
        let infill = 2.0 * 0.12 * ClosureMaterial::HollowBrick.unit_weight_kn_m3();
        assert_relative_eq!(w.net_volume_m3, 4.5 - 0.6, max_relative = 1e-12);
        assert_relative_eq!(w.weight_kn, (4.5 - 0.6) * 18.0 + infill, max_relative = 1e-12);

        // Without a thickness the infill is 12 cm deep
        closed.closure = Some(ClosureData {
            material: ClosureMaterial::HollowBrick,
            thickness_cm: None,
        });
        let default = wall_weight(&test_wall(), &brick(), &[closed]).unwrap();
        assert_relative_eq!(default.weight_kn, w.weight_kn, max_relative = 1e-12);
    }

    #[test]
    fn test_seismic_mass() {
        let loads = TributaryLoads {
            floor_area_m2: 10.0,
            roof_area_m2: 4.0,
            ..Default::default()
        };
        // G2 = 20 + 6, ψ2·Q = 0.3·20
        assert_relative_eq!(seismic_mass_t(81.0, &loads), (81.0 + 26.0 + 6.0) / 9.81, max_relative = 1e-12);
        assert_relative_eq!(seismic_mass_t(81.0, &TributaryLoads::default()), 81.0 / 9.81);
    }

    #[test]
    fn test_centred_foundation() {
        let f = foundation_pressure(&test_wall(), 81.0, 69.0, 0.0).unwrap();
        assert!(!f.partialized);
        assert_relative_eq!(f.sigma_max_kpa, 150.0 / 1.5, max_relative = 1e-12);
        assert_relative_eq!(f.sigma_min_kpa, f.sigma_max_kpa);
    }

    #[test]
    fn test_partialized_foundation() {
        // e = 1.0 m > L/6
        let f = foundation_pressure(&test_wall(), 100.0, 0.0, 1.0).unwrap();
        assert!(f.partialized);
        let lc = 3.0 * (2.5 - 1.0);
        assert_relative_eq!(f.compressed_length_m.unwrap(), lc, max_relative = 1e-12);
        assert_relative_eq!(f.sigma_max_kpa, 200.0 / (0.3 * lc), max_relative = 1e-12);
        assert_eq!(f.sigma_min_kpa, 0.0);

        assert!(foundation_pressure(&test_wall(), 100.0, 0.0, 2.5).is_err());
    }

    #[test]
    fn test_overturning() {
        let c = overturning_check(&test_wall(), 81.0, 2.0, 3.0);
        assert_relative_eq!(c.m_stabilizing_knm, 81.0 * 0.15, max_relative = 1e-12);
        assert_relative_eq!(c.safety_factor, 12.15 / 6.0, max_relative = 1e-12);
        assert!(c.verified);

        let unloaded = overturning_check(&test_wall(), 81.0, 0.0, 3.0);
        assert_eq!(unloaded.safety_factor, 999.0);
    }
}
