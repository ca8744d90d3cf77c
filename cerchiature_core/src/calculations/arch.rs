//! # Arched Openings
//!
//! Geometry of arched heads and the checks needed to bend (calender) a
//! steel profile to follow them.
//!
//! ## Geometry (w = span, r = rise)
//!
//! | arch | radius R | developed length |
//! |---|---|---|
//! | semicircular | w/2 | π·R |
//! | segmental | (r² + (w/2)²)/(2r) | R·2·asin(w/2R) |
//! | pointed | 0.75·w | 2·R·acos(w/2R) |
//! | multi-centred | (w/2 + r)/2 | half Ramanujan ellipse perimeter, semi-axes w/2 and r |
//!
//! ## Bendability
//!
//! Ruled by the ratio between bending radius and profile depth (r/h):
//!
//! | r/h | outcome |
//! |---|---|
//! | < 10 | not bendable |
//! | 10–15 | hot bending mandatory |
//! | 15–30 | hot bending preferred |
//! | 30–50 | cold bending possible |
//! | ≥ 50 | standard cold bending |
//!
//! Residual stress σ = E·h/(2R) is compared with f_y: above 80 % the profile
//! is not bendable whatever the ratio.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::materials::steel::E_STEEL_MPA;
use crate::materials::{ProfileCatalog, SteelGrade};
use crate::model::{ArchData, ArchType, Opening, WallGeometry};
use crate::units::cm_to_m;

// ============================================================================
// Constants
// ============================================================================

/// r/h below which bending is impossible
pub const RH_CRITICAL: f64 = 10.0;
/// r/h below which only hot bending is possible
pub const RH_HOT_MANDATORY: f64 = 15.0;
/// r/h below which hot bending is preferred
pub const RH_HOT_PREFERRED: f64 = 30.0;
/// r/h below which cold bending needs a capable machine
pub const RH_COLD_POSSIBLE: f64 = 50.0;

/// σ_res/f_y above which the profile is not bendable
pub const STRESS_RATIO_CRITICAL: f64 = 0.80;
/// σ_res/f_y above which heat treatment is required
pub const STRESS_RATIO_HIGH: f64 = 0.50;
/// σ_res/f_y above which fatigue must be checked
pub const STRESS_RATIO_MODERATE: f64 = 0.30;

/// Pointed arch radius as a multiple of the span
pub const POINTED_RADIUS_RATIO: f64 = 0.75;

/// Section depth assumed for profiles missing from the catalog (mm)
pub const FALLBACK_DEPTH_MM: f64 = 200.0;

/// Longest bent segment (cm)
pub const MAX_SEGMENT_CM: f64 = 100.0;
/// Cutting waste on the developed length
pub const WASTE_FACTOR: f64 = 1.05;
/// Fallback mass for profiles missing from the catalog (kg/m)
pub const FALLBACK_KG_PER_M: f64 = 40.0;
/// Batten spacing along coupled profiles (cm)
pub const BATTEN_SPACING_CM: f64 = 60.0;
/// Fillet welds per batten and length of each (m)
pub const WELDS_PER_BATTEN: f64 = 4.0;
pub const WELD_LENGTH_M: f64 = 0.08;

/// Empirical thrust capacity of the abutment piers per metre of thickness (kN/m)
pub const PIER_THRUST_CAPACITY_KN_PER_M: f64 = 50.0;
/// Minimum safety factor against the arch thrust
pub const THRUST_SAFETY_FACTOR: f64 = 1.5;
/// Safety factor reported when there is no thrust
pub const UNLOADED_SAFETY_FACTOR: f64 = 999.0;

// ============================================================================
// Geometry
// ============================================================================

fn arch_of(opening: &Opening) -> CalcResult<&ArchData> {
    opening
        .arch()
        .ok_or_else(|| CalcError::missing_field("shape.arch"))
}

fn check_geometry(arch: &ArchData, span_cm: f64) -> CalcResult<()> {
    if span_cm <= 0.0 || !span_cm.is_finite() {
        return Err(CalcError::invalid_input("width_cm", span_cm.to_string(), "Arch span must be positive"));
    }
    let invalid = !arch.rise_cm.is_finite() || arch.rise_cm < 0.0;
    if invalid || (arch.arch_type.needs_rise() && arch.rise_cm == 0.0) {
        return Err(CalcError::invalid_input(
            "rise_cm",
            arch.rise_cm.to_string(),
            "Arch rise must be positive",
        ));
    }
    Ok(())
}

fn segmental_radius(span_cm: f64, rise_cm: f64) -> f64 {
    (rise_cm.powi(2) + (span_cm / 2.0).powi(2)) / (2.0 * rise_cm)
}

/// Curvature radius of the arch (cm).
pub fn curvature_radius(arch: &ArchData, span_cm: f64) -> CalcResult<f64> {
    check_geometry(arch, span_cm)?;
    Ok(match arch.arch_type {
        ArchType::Semicircular => span_cm / 2.0,
        ArchType::Segmental => segmental_radius(span_cm, arch.rise_cm),
        ArchType::Pointed => POINTED_RADIUS_RATIO * span_cm,
        ArchType::MultiCentered => (span_cm / 2.0 + arch.rise_cm) / 2.0,
    })
}

/// Rise of the arch (cm).
///
/// The stated rise when given; semicircular and pointed arches without one
/// take the rise of their construction.
pub fn effective_rise(arch: &ArchData, span_cm: f64) -> CalcResult<f64> {
    check_geometry(arch, span_cm)?;
    if arch.rise_cm > 0.0 {
        return Ok(arch.rise_cm);
    }
    Ok(match arch.arch_type {
        ArchType::Semicircular => span_cm / 2.0,
        ArchType::Pointed => {
            let r = POINTED_RADIUS_RATIO * span_cm;
            (r.powi(2) - (r - span_cm / 2.0).powi(2)).sqrt()
        }
        ArchType::Segmental | ArchType::MultiCentered => arch.rise_cm,
    })
}

/// Developed length of the arch intrados (cm).
pub fn developed_length(arch: &ArchData, span_cm: f64) -> CalcResult<f64> {
    check_geometry(arch, span_cm)?;
    let half = span_cm / 2.0;
    Ok(match arch.arch_type {
        ArchType::Semicircular => PI * half,
        ArchType::Segmental => {
            let r = segmental_radius(span_cm, arch.rise_cm);
            r * 2.0 * (half / r).min(1.0).asin()
        }
        ArchType::Pointed => {
            let r = POINTED_RADIUS_RATIO * span_cm;
            2.0 * r * (half / r).acos()
        }
        ArchType::MultiCentered => {
            let (a, b) = (half, arch.rise_cm);
            let h = (a - b).powi(2) / (a + b).powi(2);
            PI * (a + b) * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt())) / 2.0
        }
    })
}

/// A point on the arch in wall coordinates (cm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchPoint {
    pub x_cm: f64,
    pub y_cm: f64,
}

/// Sample `segments + 1` points along the arch, from the left springing to
/// the right springing.
///
/// `offset_cm` moves the curve radially, positive outwards. The result
/// depends only on the arguments.
pub fn sample_points(opening: &Opening, segments: usize, offset_cm: f64) -> CalcResult<Vec<ArchPoint>> {
    let arch = arch_of(opening)?;
    check_geometry(arch, opening.width_cm)?;
    if segments == 0 {
        return Err(CalcError::invalid_input("segments", "0", "At least one segment is required"));
    }

    let w = opening.width_cm;
    let cx = opening.x_cm + w / 2.0;
    let spring_y = opening.y_cm + arch.impost_height_cm;
    let n = segments as f64;
    let point = |x: f64, y: f64| ArchPoint { x_cm: x, y_cm: y };

    let points = match arch.arch_type {
        ArchType::Semicircular => {
            let r = w / 2.0 + offset_cm;
            (0..=segments)
                .map(|i| {
                    let a = PI * (1.0 - i as f64 / n);
                    point(cx + r * a.cos(), spring_y + r * a.sin())
                })
                .collect()
        }
        ArchType::Segmental => {
            let r0 = segmental_radius(w, arch.rise_cm);
            let cy = spring_y + arch.rise_cm - r0;
            let half_angle = (w / (2.0 * r0)).min(1.0).asin();
            let r = r0 + offset_cm;
            (0..=segments)
                .map(|i| {
                    let a = PI / 2.0 + half_angle - 2.0 * half_angle * i as f64 / n;
                    point(cx + r * a.cos(), cy + r * a.sin())
                })
                .collect()
        }
        ArchType::Pointed => {
            // Each half is an arc centred on the springing line, on the
            // opposite side of the crown.
            let r0 = POINTED_RADIUS_RATIO * w;
            let r = r0 + offset_cm;
            let left_centre = opening.x_cm + r0;
            let right_centre = opening.right_cm() - r0;
            let apex_angle = ((cx - left_centre) / r).clamp(-1.0, 1.0).acos();
            let left_n = (segments / 2).max(1);
            let right_n = segments.saturating_sub(left_n).max(1);

            let mut pts: Vec<ArchPoint> = (0..=left_n)
                .map(|i| {
                    let a = PI - (PI - apex_angle) * i as f64 / left_n as f64;
                    point(left_centre + r * a.cos(), spring_y + r * a.sin())
                })
                .collect();
            pts.extend((1..=right_n).map(|i| {
                let a = (PI - apex_angle) * (1.0 - i as f64 / right_n as f64);
                point(right_centre + r * a.cos(), spring_y + r * a.sin())
            }));
            pts
        }
        ArchType::MultiCentered => {
            let a_axis = w / 2.0 + offset_cm;
            let b_axis = arch.rise_cm + offset_cm;
            (0..=segments)
                .map(|i| {
                    let a = PI * (1.0 - i as f64 / n);
                    point(cx + a_axis * a.cos(), spring_y + b_axis * a.sin())
                })
                .collect()
        }
    };
    Ok(points)
}

/// Number of bent segments for fabrication: at least 3, always odd.
pub fn bending_segments(length_cm: f64, max_segment_cm: f64) -> u32 {
    let raw = if max_segment_cm > 0.0 {
        (length_cm / max_segment_cm).ceil().max(0.0) as u32
    } else {
        0
    };
    let n = raw.max(3);
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}

// ============================================================================
// Bendability
// ============================================================================

/// Recommended bending process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BendingMethod {
    NotBendable,
    HotMandatory,
    HotPreferred,
    ColdPossible,
    ColdStandard,
}

impl BendingMethod {
    pub fn from_ratio(r_h: f64) -> Self {
        if r_h < RH_CRITICAL {
            BendingMethod::NotBendable
        } else if r_h < RH_HOT_MANDATORY {
            BendingMethod::HotMandatory
        } else if r_h < RH_HOT_PREFERRED {
            BendingMethod::HotPreferred
        } else if r_h < RH_COLD_POSSIBLE {
            BendingMethod::ColdPossible
        } else {
            BendingMethod::ColdStandard
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BendingMethod::NotBendable => "Not bendable: radius too tight",
            BendingMethod::HotMandatory => "Hot bending mandatory",
            BendingMethod::HotPreferred => "Hot bending preferred",
            BendingMethod::ColdPossible => "Cold bending possible",
            BendingMethod::ColdStandard => "Standard cold bending",
        }
    }
}

impl std::fmt::Display for BendingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Bendability check request.
///
/// ## JSON Example
///
/// ```json
/// { "profile": "HEA 200", "radius_cm": 600.0, "grade": "S275" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BendabilityInput {
    pub profile: String,
    pub radius_cm: f64,
    #[serde(default)]
    pub grade: SteelGrade,
}

impl BendabilityInput {
    pub fn validate(&self) -> CalcResult<()> {
        if self.radius_cm <= 0.0 || !self.radius_cm.is_finite() {
            return Err(CalcError::invalid_input(
                "radius_cm",
                self.radius_cm.to_string(),
                "Bending radius must be positive",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BendabilityResult {
    pub profile: String,
    pub radius_cm: f64,
    pub depth_mm: f64,
    pub r_h_ratio: f64,
    pub method: BendingMethod,
    pub bendable: bool,
    /// σ = E·h/(2R) (N/mm²)
    pub residual_stress_mpa: f64,
    /// σ/f_y
    pub stress_ratio: f64,
    pub warnings: Vec<String>,
}

/// Check whether a profile can be bent to `radius_cm`.
///
/// Profiles missing from the catalog are checked with a 200 mm depth.
pub fn check_bendability(catalog: &ProfileCatalog, input: &BendabilityInput) -> CalcResult<BendabilityResult> {
    input.validate()?;
    let mut warnings = Vec::new();
    let (profile_name, depth_mm) = match catalog.lookup_name(&input.profile) {
        Ok(profile) => (profile.display_name(), profile.h_mm),
        Err(_) => {
            warnings.push(format!(
                "Profile {} not in the catalog: depth taken as {} mm",
                input.profile, FALLBACK_DEPTH_MM
            ));
            (input.profile.clone(), FALLBACK_DEPTH_MM)
        }
    };

    let depth_cm = depth_mm / 10.0;
    let r_h = input.radius_cm / depth_cm;
    let method = BendingMethod::from_ratio(r_h);
    let mut bendable = method != BendingMethod::NotBendable;

    match method {
        BendingMethod::NotBendable => {
            warnings.push(format!("r/h = {:.1} < {}: profile would fracture", r_h, RH_CRITICAL));
        }
        BendingMethod::HotMandatory => {
            warnings.push(format!("r/h = {:.1} < {}: hot bending only", r_h, RH_HOT_MANDATORY));
            warnings.push("Check availability of a specialised workshop".to_string());
        }
        BendingMethod::HotPreferred => {
            warnings.push(format!("r/h = {:.1} < {}: hot bending preferred", r_h, RH_HOT_PREFERRED));
            warnings.push("Cold bending possible with preheating".to_string());
        }
        BendingMethod::ColdPossible => {
            warnings.push("Check the capacity of the bending machine".to_string());
        }
        BendingMethod::ColdStandard => {}
    }

    let residual = E_STEEL_MPA * cm_to_m(depth_cm) / (2.0 * cm_to_m(input.radius_cm));
    let ratio = residual / input.grade.fy_mpa();

    if ratio > STRESS_RATIO_CRITICAL {
        warnings.push(format!("Residual stress very high ({:.0}% of fy): fracture risk", ratio * 100.0));
        bendable = false;
    } else if ratio > STRESS_RATIO_HIGH {
        warnings.push(format!(
            "Residual stress high ({:.0}% of fy): post-bending heat treatment required",
            ratio * 100.0
        ));
    } else if ratio > STRESS_RATIO_MODERATE {
        warnings.push(format!(
            "Residual stress moderate ({:.0}% of fy): check fatigue resistance",
            ratio * 100.0
        ));
    }

    debug!(profile = %profile_name, r_h, ratio, bendable, "bendability checked");

    Ok(BendabilityResult {
        profile: profile_name,
        radius_cm: input.radius_cm,
        depth_mm,
        r_h_ratio: r_h,
        method,
        bendable,
        residual_stress_mpa: residual,
        stress_ratio: ratio,
        warnings,
    })
}

// ============================================================================
// Material take-off
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialQuantity {
    /// Bent steel including waste, all profiles (m)
    pub steel_length_m: f64,
    pub weight_kg: f64,
    /// Batten welds for coupled profiles (m)
    pub welding_length_m: f64,
    pub segments: u32,
}

/// Steel needed to follow the arch with `count` profiles.
///
/// Profiles missing from the catalog are weighed at 40 kg/m.
pub fn material_quantity(
    catalog: &ProfileCatalog,
    opening: &Opening,
    profile: &str,
    count: u32,
) -> CalcResult<MaterialQuantity> {
    let arch = arch_of(opening)?;
    let length_cm = developed_length(arch, opening.width_cm)?;
    let steel_length_m = cm_to_m(length_cm * WASTE_FACTOR) * count as f64;
    let kg_per_m = catalog
        .lookup_name(profile)
        .map(|p| p.weight_kg_m())
        .unwrap_or(FALLBACK_KG_PER_M);

    let welding_length_m = if count > 1 {
        (length_cm / BATTEN_SPACING_CM).floor() * WELDS_PER_BATTEN * WELD_LENGTH_M
    } else {
        0.0
    };

    Ok(MaterialQuantity {
        steel_length_m,
        weight_kg: steel_length_m * kg_per_m,
        welding_length_m,
        segments: bending_segments(length_cm, MAX_SEGMENT_CM),
    })
}

// ============================================================================
// Thrust
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThrustCheck {
    /// Line load from the masonry above (kN/m)
    pub q_kn_m: f64,
    /// Horizontal thrust H (kN)
    pub thrust_kn: f64,
    /// Pier resistance H_Rd (kN)
    pub resistance_kn: f64,
    pub safety_factor: f64,
    pub verified: bool,
}

/// Horizontal thrust H = q·L²/(8·f) and abutment check.
pub fn thrust_check(
    opening: &Opening,
    wall: &WallGeometry,
    masonry_unit_weight_kn_m3: f64,
) -> CalcResult<ThrustCheck> {
    let arch = arch_of(opening)?;
    let rise_cm = effective_rise(arch, opening.width_cm)?;

    let t = wall.thickness_m();
    let h_above = (wall.height_m() - cm_to_m(opening.top_cm())).max(0.0);
    let q = masonry_unit_weight_kn_m3 * t * h_above;
    let span = cm_to_m(opening.width_cm);
    let thrust = q * span.powi(2) / (8.0 * cm_to_m(rise_cm));
    let resistance = PIER_THRUST_CAPACITY_KN_PER_M * t;
    let safety_factor = if thrust > 0.0 {
        resistance / thrust
    } else {
        UNLOADED_SAFETY_FACTOR
    };

    Ok(ThrustCheck {
        q_kn_m: q,
        thrust_kn: thrust,
        resistance_kn: resistance,
        safety_factor,
        verified: safety_factor > THRUST_SAFETY_FACTOR,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn arched(arch_type: ArchType, width: f64, rise: f64) -> Opening {
        Opening::rectangular(100.0, 0.0, width, 240.0).with_arch(ArchData {
            arch_type,
            rise_cm: rise,
            impost_height_cm: 180.0,
        })
    }

    #[test]
    fn test_semicircular() {
        let o = arched(ArchType::Semicircular, 120.0, 60.0);
        let arch = o.arch().unwrap();
        assert_relative_eq!(curvature_radius(arch, 120.0).unwrap(), 60.0);
        assert_relative_eq!(developed_length(arch, 120.0).unwrap(), PI * 60.0);
    }

    #[test]
    fn test_segmental() {
        let o = arched(ArchType::Segmental, 120.0, 30.0);
        let arch = o.arch().unwrap();
        // R = (900 + 3600)/60 = 75
        assert_relative_eq!(curvature_radius(arch, 120.0).unwrap(), 75.0);
        let expected = 75.0 * 2.0 * (60.0_f64 / 75.0).asin();
        assert_relative_eq!(developed_length(arch, 120.0).unwrap(), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_pointed() {
        let o = arched(ArchType::Pointed, 100.0, 80.0);
        let arch = o.arch().unwrap();
        assert_relative_eq!(curvature_radius(arch, 100.0).unwrap(), 75.0);
        let expected = 2.0 * 75.0 * (50.0_f64 / 75.0).acos();
        assert_relative_eq!(developed_length(arch, 100.0).unwrap(), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_multi_centered_circle_limit() {
        // Equal semi-axes: half the circumference
        let o = arched(ArchType::MultiCentered, 120.0, 60.0);
        let arch = o.arch().unwrap();
        assert_relative_eq!(developed_length(arch, 120.0).unwrap(), PI * 60.0, max_relative = 1e-12);
    }

    #[test]
    fn test_segmental_needs_rise() {
        let o = arched(ArchType::Segmental, 120.0, 0.0);
        assert!(developed_length(o.arch().unwrap(), 120.0).is_err());
    }

    #[test]
    fn test_sample_points_semicircular() {
        let o = arched(ArchType::Semicircular, 120.0, 60.0);
        let pts = sample_points(&o, 10, 0.0).unwrap();
        assert_eq!(pts.len(), 11);
        assert_relative_eq!(pts[0].x_cm, 100.0, epsilon = 1e-9);
        assert_relative_eq!(pts[0].y_cm, 180.0, epsilon = 1e-9);
        assert_relative_eq!(pts[5].x_cm, 160.0, epsilon = 1e-9);
        assert_relative_eq!(pts[5].y_cm, 240.0, epsilon = 1e-9);
        assert_relative_eq!(pts[10].x_cm, 220.0, epsilon = 1e-9);

        // Outward offset enlarges the radius
        let outer = sample_points(&o, 10, 5.0).unwrap();
        assert_relative_eq!(outer[5].y_cm, 245.0, epsilon = 1e-9);

        // Same arguments, same points
        assert_eq!(pts, sample_points(&o, 10, 0.0).unwrap());
    }

    #[test]
    fn test_sample_points_segmental_springings() {
        let o = arched(ArchType::Segmental, 120.0, 30.0);
        let pts = sample_points(&o, 8, 0.0).unwrap();
        assert_relative_eq!(pts[0].x_cm, 100.0, epsilon = 1e-9);
        assert_relative_eq!(pts[0].y_cm, 180.0, epsilon = 1e-9);
        assert_relative_eq!(pts[4].y_cm, 210.0, epsilon = 1e-9);
        assert_relative_eq!(pts[8].x_cm, 220.0, epsilon = 1e-9);
        assert_relative_eq!(pts[8].y_cm, 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sample_points_pointed_is_symmetric() {
        let o = arched(ArchType::Pointed, 100.0, 80.0);
        let pts = sample_points(&o, 10, 0.0).unwrap();
        assert_eq!(pts.len(), 11);
        assert_relative_eq!(pts[0].x_cm, 100.0, epsilon = 1e-9);
        assert_relative_eq!(pts[10].x_cm, 200.0, epsilon = 1e-9);
        assert_relative_eq!(pts[5].x_cm, 150.0, epsilon = 1e-9);
        // Crown height sqrt(R² − (R − w/2)²) with R = 75
        assert_relative_eq!(pts[5].y_cm, 180.0 + (75.0_f64.powi(2) - 25.0_f64.powi(2)).sqrt(), epsilon = 1e-9);
        for i in 0..=5 {
            assert_relative_eq!(pts[i].y_cm, pts[10 - i].y_cm, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_sample_points_requires_arch() {
        let o = Opening::rectangular(100.0, 0.0, 100.0, 200.0);
        assert!(sample_points(&o, 10, 0.0).is_err());
    }

    #[test]
    fn test_bending_segments() {
        assert_eq!(bending_segments(150.0, 100.0), 3);
        assert_eq!(bending_segments(350.0, 100.0), 5);
        assert_eq!(bending_segments(500.0, 100.0), 5);
        assert_eq!(bending_segments(510.0, 100.0), 7);
    }

    #[test]
    fn test_bendability_tight_radius() {
        let catalog = ProfileCatalog::standard();
        let input = BendabilityInput {
            profile: "HEA 200".to_string(),
            radius_cm: 60.0,
            grade: SteelGrade::S275,
        };
        let r = check_bendability(&catalog, &input).unwrap();
        assert_relative_eq!(r.r_h_ratio, 60.0 / 19.0, max_relative = 1e-12);
        assert_eq!(r.method, BendingMethod::NotBendable);
        assert!(!r.bendable);
    }

    #[test]
    fn test_bendability_ratio_band_and_stress_veto() {
        let catalog = ProfileCatalog::standard();
        let input = BendabilityInput {
            profile: "HEA 200".to_string(),
            radius_cm: 600.0,
            grade: SteelGrade::S275,
        };
        let r = check_bendability(&catalog, &input).unwrap();
        assert_relative_eq!(r.r_h_ratio, 600.0 / 19.0, max_relative = 1e-12);
        assert_eq!(r.method, BendingMethod::ColdPossible);
        // σ = 210000·0.19/12 = 3325 MPa
        assert_relative_eq!(r.residual_stress_mpa, 3325.0, max_relative = 1e-9);
        assert!(!r.bendable);
    }

    #[test]
    fn test_bendability_unknown_profile_uses_default_depth() {
        let input = BendabilityInput {
            profile: "HEM 300".to_string(),
            radius_cm: 2000.0,
            grade: SteelGrade::S275,
        };
        let r = check_bendability(&ProfileCatalog::standard(), &input).unwrap();
        assert_eq!(r.depth_mm, FALLBACK_DEPTH_MM);
        assert_relative_eq!(r.r_h_ratio, 100.0, max_relative = 1e-12);
        assert_eq!(r.profile, "HEM 300");
        assert!(r.warnings.iter().any(|w| w.contains("not in the catalog")));
    }

    #[test]
    fn test_bendability_monotonic_in_radius() {
        let catalog = ProfileCatalog::standard();
        let mut previous = BendingMethod::NotBendable;
        let rank = |m: BendingMethod| m as u8;
        for radius in [50.0, 150.0, 250.0, 500.0, 800.0, 1200.0] {
            let input = BendabilityInput {
                profile: "IPE 100".to_string(),
                radius_cm: radius,
                grade: SteelGrade::S355,
            };
            let r = check_bendability(&catalog, &input).unwrap();
            assert!(rank(r.method) >= rank(previous));
            previous = r.method;
        }
        assert_eq!(previous, BendingMethod::ColdStandard);
    }

    #[test]
    fn test_material_quantity() {
        let catalog = ProfileCatalog::standard();
        let o = arched(ArchType::Semicircular, 120.0, 60.0);
        let q = material_quantity(&catalog, &o, "HEA 200", 2).unwrap();
        let length = PI * 60.0;
        assert_relative_eq!(q.steel_length_m, length * 1.05 / 100.0 * 2.0, max_relative = 1e-12);
        let kg = catalog.lookup_name("HEA 200").unwrap().weight_kg_m();
        assert_relative_eq!(q.weight_kg, q.steel_length_m * kg, max_relative = 1e-12);
        // floor(188.5/60) = 3 battens
        assert_relative_eq!(q.welding_length_m, 3.0 * 4.0 * 0.08, max_relative = 1e-12);
        assert_eq!(q.segments, 3);

        let unknown = material_quantity(&catalog, &o, "HEM 300", 1).unwrap();
        assert_relative_eq!(unknown.weight_kg, unknown.steel_length_m * 40.0, max_relative = 1e-12);
        assert_eq!(unknown.welding_length_m, 0.0);
    }

    #[test]
    fn test_thrust_check() {
        let wall = WallGeometry::new(500.0, 350.0, 30.0);
        let o = arched(ArchType::Segmental, 120.0, 30.0);
        let check = thrust_check(&o, &wall, 18.0).unwrap();
        // h_above = 1.1 m, q = 18·0.3·1.1 = 5.94 kN/m
        assert_relative_eq!(check.q_kn_m, 5.94, max_relative = 1e-9);
        assert_relative_eq!(check.thrust_kn, 5.94 * 1.44 / 2.4, max_relative = 1e-9);
        assert_relative_eq!(check.resistance_kn, 15.0, max_relative = 1e-12);
        assert!(check.verified);
    }

    #[test]
    fn test_thrust_uses_constructed_rise() {
        let wall = WallGeometry::new(500.0, 350.0, 30.0);
        let stated = thrust_check(&arched(ArchType::Semicircular, 120.0, 60.0), &wall, 18.0).unwrap();
        let derived = thrust_check(&arched(ArchType::Semicircular, 120.0, 0.0), &wall, 18.0).unwrap();
        assert_relative_eq!(derived.thrust_kn, stated.thrust_kn, max_relative = 1e-12);

        let pointed = arched(ArchType::Pointed, 100.0, 0.0);
        // r = 75, centre 25 cm from the crown: √(75² − 25²)
        assert_relative_eq!(
            effective_rise(pointed.arch().unwrap(), 100.0).unwrap(),
            (75.0_f64.powi(2) - 25.0_f64.powi(2)).sqrt(),
            max_relative = 1e-12
        );
        assert!(thrust_check(&pointed, &wall, 18.0).unwrap().thrust_kn > 0.0);
    }

    #[test]
    fn test_negative_rise_rejected() {
        let o = arched(ArchType::Semicircular, 120.0, -5.0);
        assert!(curvature_radius(o.arch().unwrap(), 120.0).is_err());
    }
}
