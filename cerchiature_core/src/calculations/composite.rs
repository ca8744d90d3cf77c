//! # Composite Steel Sections
//!
//! Equivalent properties of a member made of several identical rolled
//! profiles. Catalog values are in cm-based units and stay that way here;
//! the frame engine converts to SI.
//!
//! | layout | strong axis I_y | weak axis I_z |
//! |---|---|---|
//! | single profile | catalog | catalog |
//! | inline, spacing s > 0 | n·I_y | Σ(I_z + A·d_i²), d_i = (i − (n−1)/2)·s |
//! | inline, s = 0 | n·I_y | n·I_z |
//! | staggered | 1.2·n·I_y | 1.5·n·I_z |
//! | coupled | 1.1·n·I_y | 1.3·n·I_z |
//!
//! The staggered and coupled multipliers are empirical approximations.
//! Section modulus is W = 2·I_y/h.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::materials::{ProfileCatalog, SteelProfile};
use crate::model::{CompositeLayout, ProfileSpec};

/// Empirical inertia multipliers (strong, weak) for staggered profiles
pub const STAGGERED_FACTORS: (f64, f64) = (1.2, 1.5);
/// Empirical inertia multipliers (strong, weak) for coupled profiles
pub const COUPLED_FACTORS: (f64, f64) = (1.1, 1.3);

/// Equivalent section of `count` profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeSection {
    /// Catalog designation of the single profile
    pub profile: String,
    pub count: u32,
    pub spacing_cm: f64,
    pub layout: CompositeLayout,
    /// Total area (cm²)
    pub area_cm2: f64,
    /// Strong-axis inertia (cm⁴)
    pub i_y_cm4: f64,
    /// Weak-axis inertia (cm⁴)
    pub i_z_cm4: f64,
    /// Strong-axis elastic modulus (cm³)
    pub w_el_y_cm3: f64,
    /// Depth of one profile (mm)
    pub depth_mm: f64,
    /// Mass per metre of the whole member (kg/m)
    pub weight_kg_m: f64,
}

impl CompositeSection {
    /// Inertia resisting in-plane bending; the weak axis when the profiles
    /// are rotated.
    pub fn bending_inertia_cm4(&self, rotated: bool) -> f64 {
        if rotated {
            self.i_z_cm4
        } else {
            self.i_y_cm4
        }
    }
}

fn combined_inertia(single: &SteelProfile, count: u32, spacing_cm: f64, layout: CompositeLayout) -> (f64, f64) {
    let n = count as f64;
    match layout {
        CompositeLayout::Inline if spacing_cm > 0.0 => {
            let centre = (n - 1.0) / 2.0;
            let i_z = (0..count)
                .map(|i| {
                    let d = (i as f64 - centre) * spacing_cm;
                    single.i_z_cm4 + single.area_cm2 * d * d
                })
                .sum();
            (single.i_y_cm4 * n, i_z)
        }
        CompositeLayout::Inline => (single.i_y_cm4 * n, single.i_z_cm4 * n),
        CompositeLayout::Staggered => (
            single.i_y_cm4 * n * STAGGERED_FACTORS.0,
            single.i_z_cm4 * n * STAGGERED_FACTORS.1,
        ),
        CompositeLayout::Coupled => (
            single.i_y_cm4 * n * COUPLED_FACTORS.0,
            single.i_z_cm4 * n * COUPLED_FACTORS.1,
        ),
    }
}

/// Resolve the equivalent section of `count` profiles named `profile`.
///
/// A single profile returns the catalog values regardless of layout.
pub fn resolve(
    catalog: &ProfileCatalog,
    profile: &str,
    count: u32,
    spacing_cm: f64,
    layout: CompositeLayout,
) -> CalcResult<CompositeSection> {
    if count == 0 {
        return Err(CalcError::invalid_input(
            "count",
            "0",
            "A member needs at least one profile",
        ));
    }
    if spacing_cm < 0.0 || !spacing_cm.is_finite() {
        return Err(CalcError::invalid_input(
            "spacing_cm",
            spacing_cm.to_string(),
            "Profile spacing must be zero or positive",
        ));
    }

    let single = catalog.lookup_name(profile)?;
    let (i_y, i_z) = if count == 1 {
        (single.i_y_cm4, single.i_z_cm4)
    } else {
        combined_inertia(single, count, spacing_cm, layout)
    };

    let depth_cm = single.h_mm / 10.0;
    let w_el_y = if count == 1 {
        single.w_el_y_cm3
    } else {
        2.0 * i_y / depth_cm
    };

    debug!(profile = %single.display_name(), count, i_y, i_z, "composite section resolved");

    Ok(CompositeSection {
        profile: single.display_name(),
        count,
        spacing_cm,
        layout,
        area_cm2: single.area_cm2 * count as f64,
        i_y_cm4: i_y,
        i_z_cm4: i_z,
        w_el_y_cm3: w_el_y,
        depth_mm: single.h_mm,
        weight_kg_m: single.weight_kg_m() * count as f64,
    })
}

/// Resolve a member described by a [`ProfileSpec`].
pub fn resolve_spec(catalog: &ProfileCatalog, spec: &ProfileSpec) -> CalcResult<CompositeSection> {
    resolve(catalog, &spec.profile, spec.count, spec.spacing_cm, spec.layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_profile_matches_catalog() {
        let catalog = ProfileCatalog::standard();
        let hea = catalog.lookup_name("HEA 200").unwrap().clone();
        for layout in [CompositeLayout::Inline, CompositeLayout::Staggered, CompositeLayout::Coupled] {
            let s = resolve(&catalog, "HEA 200", 1, 20.0, layout).unwrap();
            assert_eq!(s.i_y_cm4, hea.i_y_cm4);
            assert_eq!(s.i_z_cm4, hea.i_z_cm4);
            assert_eq!(s.area_cm2, hea.area_cm2);
            assert_eq!(s.w_el_y_cm3, hea.w_el_y_cm3);
        }
    }

    #[test]
    fn test_inline_with_spacing_uses_parallel_axis() {
        let catalog = ProfileCatalog::standard();
        let single = catalog.lookup_name("HEB 200").unwrap().clone();
        let s = resolve(&catalog, "HEB 200", 2, 20.0, CompositeLayout::Inline).unwrap();

        assert_relative_eq!(s.i_y_cm4, 2.0 * single.i_y_cm4);
        // d = ±10 cm
        let expected_iz = 2.0 * (single.i_z_cm4 + single.area_cm2 * 100.0);
        assert_relative_eq!(s.i_z_cm4, expected_iz, max_relative = 1e-12);
        assert_relative_eq!(s.w_el_y_cm3, 2.0 * s.i_y_cm4 / 20.0, max_relative = 1e-12);
    }

    #[test]
    fn test_three_inline_profiles() {
        let catalog = ProfileCatalog::standard();
        let single = catalog.lookup_name("IPE 160").unwrap().clone();
        let s = resolve(&catalog, "IPE 160", 3, 15.0, CompositeLayout::Inline).unwrap();
        // d = −15, 0, 15
        let expected_iz = 3.0 * single.i_z_cm4 + 2.0 * single.area_cm2 * 225.0;
        assert_relative_eq!(s.i_z_cm4, expected_iz, max_relative = 1e-12);
        assert_relative_eq!(s.area_cm2, 3.0 * single.area_cm2);
    }

    #[test]
    fn test_inline_without_spacing() {
        let catalog = ProfileCatalog::standard();
        let single = catalog.lookup_name("HEA 160").unwrap().clone();
        let s = resolve(&catalog, "HEA 160", 2, 0.0, CompositeLayout::Inline).unwrap();
        assert_relative_eq!(s.i_y_cm4, 2.0 * single.i_y_cm4);
        assert_relative_eq!(s.i_z_cm4, 2.0 * single.i_z_cm4);
    }

    #[test]
    fn test_empirical_layouts() {
        let catalog = ProfileCatalog::standard();
        let single = catalog.lookup_name("HEA 200").unwrap().clone();

        let staggered = resolve(&catalog, "HEA 200", 2, 0.0, CompositeLayout::Staggered).unwrap();
        assert_relative_eq!(staggered.i_y_cm4, single.i_y_cm4 * 2.0 * 1.2, max_relative = 1e-12);
        assert_relative_eq!(staggered.i_z_cm4, single.i_z_cm4 * 2.0 * 1.5, max_relative = 1e-12);

        let coupled = resolve(&catalog, "HEA 200", 4, 0.0, CompositeLayout::Coupled).unwrap();
        assert_relative_eq!(coupled.i_y_cm4, single.i_y_cm4 * 4.0 * 1.1, max_relative = 1e-12);
        assert_relative_eq!(coupled.i_z_cm4, single.i_z_cm4 * 4.0 * 1.3, max_relative = 1e-12);
    }

    #[test]
    fn test_unknown_profile() {
        let catalog = ProfileCatalog::standard();
        let err = resolve(&catalog, "HEA 1000", 1, 0.0, CompositeLayout::Inline).unwrap_err();
        assert_eq!(err.error_code(), "MATERIAL_NOT_FOUND");
    }

    #[test]
    fn test_zero_count_rejected() {
        let catalog = ProfileCatalog::standard();
        assert!(resolve(&catalog, "HEA 200", 0, 0.0, CompositeLayout::Inline).is_err());
    }

    #[test]
    fn test_rotated_bending_inertia() {
        let catalog = ProfileCatalog::standard();
        let s = resolve_spec(&catalog, &ProfileSpec::single("HEA 200")).unwrap();
        assert_eq!(s.bending_inertia_cm4(false), s.i_y_cm4);
        assert_eq!(s.bending_inertia_cm4(true), s.i_z_cm4);
    }
}
