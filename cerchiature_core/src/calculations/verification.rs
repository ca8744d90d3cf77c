//! # Local Intervention Classification
//!
//! NTC 2018 §8.4.1: an intervention on an existing wall is *local* when
//! the lateral stiffness changes by at most ±15 % and the shear resistance
//! drops by at most 20 %.
//!
//! ```text
//! ΔK% = (K_mod − K_orig) / K_orig · 100      stiffness_ok  = |ΔK%| ≤ 15
//! ΔV% = (V_mod − V_orig) / V_orig · 100      resistance_ok = ΔV% ≥ −20
//! ```
//!
//! Also provides the geometric opening limits, safety factors against a
//! given demand and a plain-text summary.

use serde::{Deserialize, Serialize};

use crate::model::{Opening, OpeningKind, WallGeometry};

/// Thresholds and factors of the local-intervention check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterventionLimits {
    /// Allowed stiffness change, either sign (%)
    pub stiffness_pct: f64,
    /// Allowed resistance change, negative (%)
    pub resistance_pct: f64,
    /// Partial factor dividing the frame contributions
    pub collaboration_gamma: f64,
    /// Maximum share of the wall face taken by openings (%)
    pub max_opening_ratio_pct: f64,
    /// Minimum pier width (cm)
    pub min_pier_width_cm: f64,
}

impl Default for InterventionLimits {
    fn default() -> Self {
        InterventionLimits {
            stiffness_pct: 15.0,
            resistance_pct: -20.0,
            collaboration_gamma: 1.5,
            max_opening_ratio_pct: 40.0,
            min_pier_width_cm: 80.0,
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub is_local: bool,
    pub delta_k_pct: f64,
    pub delta_v_pct: f64,
    pub stiffness_ok: bool,
    pub resistance_ok: bool,
    pub stiffness_limit_pct: f64,
    pub resistance_limit_pct: f64,
    /// K_mod / K_orig (1 when K_orig is zero)
    pub stiffness_ratio: f64,
    /// V_mod / V_orig (1 when V_orig is zero)
    pub resistance_ratio: f64,
    pub message: String,
    #[serde(default)]
    pub warnings: Vec<String>,
}

fn variation_pct(original: f64, modified: f64) -> Option<f64> {
    (original != 0.0).then(|| (modified - original) / original * 100.0)
}

/// Classify an intervention from the original and modified wall states.
pub fn classify(
    k_original: f64,
    k_modified: f64,
    v_original: f64,
    v_modified: f64,
    limits: &InterventionLimits,
) -> VerificationResult {
    let mut warnings = Vec::new();

    let delta_k = variation_pct(k_original, k_modified).unwrap_or_else(|| {
        warnings.push("Original stiffness is zero: stiffness variation taken as 0 %".to_string());
        0.0
    });
    let delta_v = variation_pct(v_original, v_modified).unwrap_or_else(|| {
        warnings.push("Original resistance is zero: resistance variation taken as 0 %".to_string());
        0.0
    });

    let stiffness_ok = delta_k.abs() <= limits.stiffness_pct;
    let resistance_ok = delta_v >= limits.resistance_pct;
    let is_local = stiffness_ok && resistance_ok;

    let message = if is_local {
        "The intervention qualifies as local (NTC 2018 §8.4.1)".to_string()
    } else {
        let mut reasons = Vec::new();
        if !stiffness_ok {
            reasons.push(format!("stiffness change {:+.1}% exceeds ±{:.0}%", delta_k, limits.stiffness_pct));
        }
        if !resistance_ok {
            reasons.push(format!(
                "resistance change {:+.1}% below {:.0}%",
                delta_v, limits.resistance_pct
            ));
        }
        format!("The intervention does not qualify as local: {}", reasons.join("; "))
    };

    VerificationResult {
        is_local,
        delta_k_pct: delta_k,
        delta_v_pct: delta_v,
        stiffness_ok,
        resistance_ok,
        stiffness_limit_pct: limits.stiffness_pct,
        resistance_limit_pct: limits.resistance_pct,
        stiffness_ratio: if k_original != 0.0 { k_modified / k_original } else { 1.0 },
        resistance_ratio: if v_original != 0.0 { v_modified / v_original } else { 1.0 },
        message,
        warnings,
    }
}

// ============================================================================
// Opening limits
// ============================================================================

/// A pier narrower than the minimum width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NarrowPier {
    pub start_cm: f64,
    pub width_cm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningLimitsResult {
    /// Opening area over wall face area (%)
    pub opening_ratio_pct: f64,
    pub opening_ratio_ok: bool,
    pub min_pier_width_cm: f64,
    pub narrow_piers: Vec<NarrowPier>,
    pub min_pier_ok: bool,
}

/// Check the opening ratio and the width of every pier.
///
/// Piers at the wall ends count even when an opening touches the wall edge,
/// so an opening starting at x = 0 leaves a pier of zero width.
pub fn check_opening_limits(wall: &WallGeometry, openings: &[Opening], limits: &InterventionLimits) -> OpeningLimitsResult {
    let face = wall.face_area_cm2();
    let opening_area: f64 = openings
        .iter()
        .filter(|o| !o.is_zero_area())
        .map(|o| o.area_cm2())
        .sum();
    let ratio = if face > 0.0 { opening_area / face * 100.0 } else { 0.0 };

    let mut gaps: Vec<(f64, f64)> = openings
        .iter()
        .filter(|o| !o.is_zero_area() && o.kind() == OpeningKind::Through)
        .map(|o| (o.x_cm, o.right_cm()))
        .collect();
    gaps.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut narrow_piers = Vec::new();
    if !gaps.is_empty() {
        let mut cursor = 0.0;
        for (start, end) in gaps {
            // Overlapping openings leave no pier between them
            if start >= cursor {
                let width = start - cursor;
                if width < limits.min_pier_width_cm {
                    narrow_piers.push(NarrowPier {
                        start_cm: cursor,
                        width_cm: width,
                    });
                }
            }
            cursor = f64::max(cursor, end);
        }
        let last = wall.length_cm - cursor;
        if last < limits.min_pier_width_cm {
            narrow_piers.push(NarrowPier {
                start_cm: cursor,
                width_cm: last.max(0.0),
            });
        }
    }

    OpeningLimitsResult {
        opening_ratio_pct: ratio,
        opening_ratio_ok: ratio <= limits.max_opening_ratio_pct,
        min_pier_width_cm: limits.min_pier_width_cm,
        min_pier_ok: narrow_piers.is_empty(),
        narrow_piers,
    }
}

// ============================================================================
// Safety factors
// ============================================================================

/// Capacity over demand; `None` where the demand is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyFactors {
    pub resistance: Option<f64>,
    pub stiffness: Option<f64>,
    pub global: Option<f64>,
    pub is_safe: bool,
}

pub fn safety_factors(v_design_kn: f64, v_demand_kn: f64, k_provided_kn_m: f64, k_required_kn_m: f64) -> SafetyFactors {
    let resistance = (v_demand_kn > 0.0).then(|| v_design_kn / v_demand_kn);
    let stiffness = (k_required_kn_m > 0.0).then(|| k_provided_kn_m / k_required_kn_m);
    let global = match (resistance, stiffness) {
        (Some(r), Some(s)) => Some(r.min(s)),
        (r, s) => r.or(s),
    };
    SafetyFactors {
        resistance,
        stiffness,
        global,
        is_safe: resistance.map_or(true, |r| r >= 1.0) && stiffness.map_or(true, |s| s >= 1.0),
    }
}

// ============================================================================
// Summary
// ============================================================================

fn status_icon(ok: bool) -> &'static str {
    if ok {
        "[OK]"
    } else {
        "[FAIL]"
    }
}

/// Plain-text summary of a classification, with recommendations when the
/// intervention is not local.
pub fn summary(result: &VerificationResult) -> String {
    let mut lines = Vec::new();

    if result.is_local {
        lines.push("[OK] The intervention qualifies as LOCAL under NTC 2018 §8.4.1".to_string());
    } else {
        lines.push("[FAIL] The intervention does NOT qualify as local".to_string());
    }
    lines.push(String::new());

    lines.push("STIFFNESS:".to_string());
    lines.push(format!(
        "{} Variation {:+.1}% (limit ±{:.0}%)",
        status_icon(result.stiffness_ok),
        result.delta_k_pct,
        result.stiffness_limit_pct
    ));
    lines.push(String::new());

    lines.push("RESISTANCE:".to_string());
    if result.delta_v_pct >= 0.0 {
        lines.push(format!("{} Increase {:+.1}%, always acceptable", status_icon(true), result.delta_v_pct));
    } else {
        lines.push(format!(
            "{} Reduction {:.1}% (limit {:.0}%)",
            status_icon(result.resistance_ok),
            result.delta_v_pct,
            result.resistance_limit_pct
        ));
    }

    if !result.is_local {
        lines.push(String::new());
        lines.push("RECOMMENDATIONS:".to_string());
        if !result.stiffness_ok {
            if result.delta_k_pct > 0.0 {
                lines.push("- Use lighter frame profiles or reduce their collaboration".to_string());
            } else {
                lines.push("- Increase the frame stiffness (larger profiles)".to_string());
                lines.push("- Reduce the number or size of the new openings".to_string());
            }
        }
        if !result.resistance_ok {
            lines.push("- Limit new openings to secondary piers".to_string());
            lines.push("- Add further strengthening (FRP, reinforced plaster)".to_string());
        }
        lines.push(String::new());
        lines.push("Otherwise classify the work as seismic improvement or upgrade, with global checks.".to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_classification_within_limits() {
        let r = classify(1000.0, 1100.0, 100.0, 90.0, &InterventionLimits::default());
        assert_relative_eq!(r.delta_k_pct, 10.0, max_relative = 1e-12);
        assert_relative_eq!(r.delta_v_pct, -10.0, max_relative = 1e-12);
        assert!(r.is_local);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_stiffness_increase_beyond_limit() {
        let r = classify(1000.0, 1200.0, 100.0, 150.0, &InterventionLimits::default());
        assert!(!r.stiffness_ok);
        assert!(r.resistance_ok);
        assert!(!r.is_local);
        assert!(r.message.contains("stiffness"));
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let limits = InterventionLimits::default();
        let r = classify(100.0, 85.0, 100.0, 80.0, &limits);
        assert!(r.stiffness_ok);
        assert!(r.resistance_ok);

        let r = classify(100.0, 84.0, 100.0, 79.0, &limits);
        assert!(!r.stiffness_ok);
        assert!(!r.resistance_ok);
    }

    #[test]
    fn test_zero_denominator_is_guarded() {
        let r = classify(0.0, 500.0, 0.0, 50.0, &InterventionLimits::default());
        assert_eq!(r.delta_k_pct, 0.0);
        assert_eq!(r.delta_v_pct, 0.0);
        assert_eq!(r.warnings.len(), 2);
        assert!(r.is_local);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let limits = InterventionLimits::default();
        let a = classify(1234.5, 1300.0, 98.7, 88.0, &limits);
        let b = classify(1234.5, 1300.0, 98.7, 88.0, &limits);
        assert_eq!(a, b);
    }

    #[test]
    fn test_opening_limits() {
        let wall = WallGeometry::new(500.0, 300.0, 30.0);
        let limits = InterventionLimits::default();

        let openings = vec![
            Opening::rectangular(100.0, 0.0, 100.0, 210.0),
            Opening::rectangular(300.0, 0.0, 100.0, 210.0),
        ];
        let r = check_opening_limits(&wall, &openings, &limits);
        assert_relative_eq!(r.opening_ratio_pct, 42000.0 / 150000.0 * 100.0, max_relative = 1e-12);
        assert!(r.opening_ratio_ok);
        assert!(r.min_pier_ok);

        let tight = vec![
            Opening::rectangular(0.0, 0.0, 100.0, 210.0),
            Opening::rectangular(150.0, 0.0, 100.0, 210.0),
        ];
        let r = check_opening_limits(&wall, &tight, &limits);
        assert!(!r.min_pier_ok);
        // Edge pier of zero width, then 50 cm between the openings
        assert_eq!(r.narrow_piers.len(), 2);
        assert_eq!(r.narrow_piers[0].width_cm, 0.0);
        assert_relative_eq!(r.narrow_piers[1].width_cm, 50.0);
    }

    #[test]
    fn test_opening_ratio_exceeded() {
        let wall = WallGeometry::new(400.0, 300.0, 30.0);
        let r = check_opening_limits(
            &wall,
            &[Opening::rectangular(100.0, 0.0, 200.0, 280.0)],
            &InterventionLimits::default(),
        );
        assert!(!r.opening_ratio_ok);
        assert!(r.min_pier_ok);
    }

    #[test]
    fn test_no_openings_has_no_narrow_piers() {
        let wall = WallGeometry::new(50.0, 300.0, 30.0);
        let r = check_opening_limits(&wall, &[], &InterventionLimits::default());
        assert!(r.min_pier_ok);
        assert_eq!(r.opening_ratio_pct, 0.0);
    }

    #[test]
    fn test_safety_factors() {
        let sf = safety_factors(120.0, 100.0, 900.0, 1000.0);
        assert_relative_eq!(sf.resistance.unwrap(), 1.2);
        assert_relative_eq!(sf.stiffness.unwrap(), 0.9);
        assert_relative_eq!(sf.global.unwrap(), 0.9);
        assert!(!sf.is_safe);

        let unloaded = safety_factors(120.0, 0.0, 900.0, 0.0);
        assert!(unloaded.global.is_none());
        assert!(unloaded.is_safe);
    }

    #[test]
    fn test_summary_recommendations() {
        let limits = InterventionLimits::default();
        let ok = summary(&classify(1000.0, 1050.0, 100.0, 95.0, &limits));
        assert!(ok.starts_with("[OK]"));
        assert!(!ok.contains("RECOMMENDATIONS"));

        let bad = summary(&classify(1000.0, 700.0, 100.0, 60.0, &limits));
        assert!(bad.starts_with("[FAIL]"));
        assert!(bad.contains("RECOMMENDATIONS"));
        assert!(bad.contains("larger profiles"));
    }
}
