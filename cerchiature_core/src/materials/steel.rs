//! Steel Profiles Database (EN 10365)
//!
//! Section properties of hot-rolled European profiles (HEA, HEB, IPE, UPN)
//! and the NTC 2018 structural steel grades. The catalog is built once and
//! passed by reference to the composite-section resolver and the frame
//! engine; lookups never mutate it.
//!
//! Axis convention follows Eurocode: `y` is the strong axis, `z` the weak one.
//!
//! ## Example
//!
//! ```rust
//! use cerchiature_core::materials::steel::{ProfileCatalog, ProfileFamily};
//!
//! let catalog = ProfileCatalog::standard();
//! let hea200 = catalog.lookup(ProfileFamily::HEA, 200)?;
//! assert_eq!(hea200.h_mm, 190.0);
//! assert_eq!(hea200.i_y_cm4, 3692.0);
//!
//! let same = catalog.lookup_name("hea200")?;
//! assert_eq!(same.display_name(), "HEA 200");
//! # Ok::<(), cerchiature_core::errors::CalcError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{CalcError, CalcResult};

/// Elastic modulus of structural steel (N/mm²)
pub const E_STEEL_MPA: f64 = 210_000.0;
/// Shear modulus of structural steel (N/mm²)
pub const G_STEEL_MPA: f64 = 80_769.0;
/// Partial factor for cross-section resistance (NTC 2018 §4.2.4.1.1)
pub const GAMMA_M0: f64 = 1.05;
/// Mass per metre per cm² of area (kg/m), ρ = 7850 kg/m³
pub const KG_PER_M_PER_CM2: f64 = 0.785;

// ============================================================================
// Steel Grade
// ============================================================================

/// Structural steel grade (NTC 2018 Tab. 11.3.IX)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SteelGrade {
    S235,
    #[default]
    S275,
    S355,
    S450,
}

impl SteelGrade {
    pub const ALL: [SteelGrade; 4] = [SteelGrade::S235, SteelGrade::S275, SteelGrade::S355, SteelGrade::S450];

    /// Characteristic yield strength f_yk (N/mm²)
    pub fn fy_mpa(&self) -> f64 {
        match self {
            SteelGrade::S235 => 235.0,
            SteelGrade::S275 => 275.0,
            SteelGrade::S355 => 355.0,
            SteelGrade::S450 => 450.0,
        }
    }

    /// Characteristic ultimate strength f_tk (N/mm²)
    pub fn fu_mpa(&self) -> f64 {
        match self {
            SteelGrade::S235 => 360.0,
            SteelGrade::S275 => 430.0,
            SteelGrade::S355 => 510.0,
            SteelGrade::S450 => 550.0,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SteelGrade::S235 => "S235",
            SteelGrade::S275 => "S275",
            SteelGrade::S355 => "S355",
            SteelGrade::S450 => "S450",
        }
    }
}

impl std::fmt::Display for SteelGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Profile Family
// ============================================================================

/// Hot-rolled profile family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProfileFamily {
    /// Wide flange, light series
    HEA,
    /// Wide flange, medium series
    HEB,
    /// Narrow flange I-beam
    IPE,
    /// Channel
    UPN,
}

impl ProfileFamily {
    pub const ALL: [ProfileFamily; 4] = [ProfileFamily::HEA, ProfileFamily::HEB, ProfileFamily::IPE, ProfileFamily::UPN];

    pub fn prefix(&self) -> &'static str {
        match self {
            ProfileFamily::HEA => "HEA",
            ProfileFamily::HEB => "HEB",
            ProfileFamily::IPE => "IPE",
            ProfileFamily::UPN => "UPN",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProfileFamily::HEA => "HEA (wide flange, light)",
            ProfileFamily::HEB => "HEB (wide flange, medium)",
            ProfileFamily::IPE => "IPE (I-beam)",
            ProfileFamily::UPN => "UPN (channel)",
        }
    }
}

impl std::fmt::Display for ProfileFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Split a designation such as "HEA 200", "hea200" or "UNP 160" into
/// family and nominal size.
pub fn parse_designation(name: &str) -> Option<(ProfileFamily, u32)> {
    let compact: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    let families = [
        ("HEA", ProfileFamily::HEA),
        ("HEB", ProfileFamily::HEB),
        ("IPE", ProfileFamily::IPE),
        ("UPN", ProfileFamily::UPN),
        ("UNP", ProfileFamily::UPN),
    ];
    families.iter().find_map(|(prefix, family)| {
        compact
            .strip_prefix(prefix)
            .and_then(|rest| rest.parse::<u32>().ok())
            .map(|size| (*family, size))
    })
}

// ============================================================================
// Steel Profile
// ============================================================================

/// Section properties of a rolled steel profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteelProfile {
    pub family: ProfileFamily,
    /// Nominal size (e.g. 200 for HEA 200)
    pub size: u32,
    /// Depth h (mm)
    pub h_mm: f64,
    /// Flange width b (mm)
    pub b_mm: f64,
    /// Web thickness (mm)
    pub tw_mm: f64,
    /// Flange thickness (mm)
    pub tf_mm: f64,
    /// Area (cm²)
    pub area_cm2: f64,
    /// Strong-axis second moment of area (cm⁴)
    pub i_y_cm4: f64,
    /// Weak-axis second moment of area (cm⁴)
    pub i_z_cm4: f64,
    /// Strong-axis elastic modulus (cm³)
    pub w_el_y_cm3: f64,
    /// Weak-axis elastic modulus (cm³)
    pub w_el_z_cm3: f64,
    /// Strong-axis radius of gyration (cm)
    pub r_y_cm: f64,
    /// Weak-axis radius of gyration (cm)
    pub r_z_cm: f64,
    /// Strong-axis plastic modulus (cm³), when tabulated
    pub w_pl_y_cm3: Option<f64>,
    /// Weak-axis plastic modulus (cm³), when tabulated
    pub w_pl_z_cm3: Option<f64>,
}

impl SteelProfile {
    /// Designation used as catalog key (e.g. "HEA 200")
    pub fn display_name(&self) -> String {
        format!("{} {}", self.family.prefix(), self.size)
    }

    /// Mass per metre (kg/m)
    pub fn weight_kg_m(&self) -> f64 {
        self.area_cm2 * KG_PER_M_PER_CM2
    }

    /// Plastic modulus for bending about the strong axis, or about the weak
    /// axis when the profile is rotated. A rotated profile without a weak-axis
    /// value falls back to the strong-axis one.
    pub fn plastic_modulus(&self, rotated: bool) -> Option<f64> {
        if rotated {
            self.w_pl_z_cm3.or(self.w_pl_y_cm3)
        } else {
            self.w_pl_y_cm3
        }
    }
}

impl std::fmt::Display for SteelProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (A={:.1} cm², Iy={:.0} cm⁴, Wy={:.1} cm³)",
            self.display_name(),
            self.area_cm2,
            self.i_y_cm4,
            self.w_el_y_cm3
        )
    }
}

// ============================================================================
// Profile Catalog
// ============================================================================

/// Keyed profile catalog.
#[derive(Debug, Clone, Default)]
pub struct ProfileCatalog {
    /// Profiles by designation ("HEA 200")
    profiles: HashMap<String, SteelProfile>,

    /// Sizes by family, kept sorted
    by_family: HashMap<ProfileFamily, Vec<u32>>,
}

impl ProfileCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the full EN 10365 tables for HEA, HEB, IPE and UPN.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        let tables = [
            (ProfileFamily::HEA, HEA_TABLE),
            (ProfileFamily::HEB, HEB_TABLE),
            (ProfileFamily::IPE, IPE_TABLE),
            (ProfileFamily::UPN, UPN_TABLE),
        ];

        for (family, table) in tables {
            for &(size, h, b, tw, tf, a, iy, iz, wy, wz, ry, rz, wpl_y, wpl_z) in table {
                catalog.insert(SteelProfile {
                    family,
                    size,
                    h_mm: h,
                    b_mm: b,
                    tw_mm: tw,
                    tf_mm: tf,
                    area_cm2: a,
                    i_y_cm4: iy,
                    i_z_cm4: iz,
                    w_el_y_cm3: wy,
                    w_el_z_cm3: wz,
                    r_y_cm: ry,
                    r_z_cm: rz,
                    w_pl_y_cm3: Some(wpl_y),
                    w_pl_z_cm3: Some(wpl_z),
                });
            }
        }
        catalog
    }

    /// Insert a profile, replacing any existing one with the same designation.
    pub fn insert(&mut self, profile: SteelProfile) {
        let sizes = self.by_family.entry(profile.family).or_default();
        if let Err(pos) = sizes.binary_search(&profile.size) {
            sizes.insert(pos, profile.size);
        }
        self.profiles.insert(profile.display_name(), profile);
    }

    /// Look up a profile by family and nominal size.
    pub fn lookup(&self, family: ProfileFamily, size: u32) -> CalcResult<&SteelProfile> {
        let key = format!("{} {}", family.prefix(), size);
        self.profiles
            .get(&key)
            .ok_or_else(|| CalcError::material_not_found(key))
    }

    /// Look up a profile by designation ("HEA 200", "hea200").
    pub fn lookup_name(&self, name: &str) -> CalcResult<&SteelProfile> {
        let (family, size) = parse_designation(name).ok_or_else(|| {
            CalcError::invalid_input("profile", name, "Unrecognized profile designation")
        })?;
        self.lookup(family, size)
            .map_err(|_| CalcError::material_not_found(name))
    }

    /// Nominal sizes available for a family, ascending
    pub fn available_sizes(&self, family: ProfileFamily) -> Vec<u32> {
        self.by_family.get(&family).cloned().unwrap_or_default()
    }

    /// Plastic modulus (cm³) of a named profile in the given orientation.
    pub fn plastic_modulus(&self, name: &str, rotated: bool) -> Option<f64> {
        self.lookup_name(name).ok().and_then(|p| p.plastic_modulus(rotated))
    }

    /// Profiles meeting minimum strong-axis W and I, sorted by W ascending.
    ///
    /// An empty `families` slice searches every family.
    pub fn search(&self, min_w_cm3: f64, min_i_cm4: f64, families: &[ProfileFamily]) -> Vec<&SteelProfile> {
        let mut found: Vec<_> = self
            .profiles
            .values()
            .filter(|p| families.is_empty() || families.contains(&p.family))
            .filter(|p| p.w_el_y_cm3 >= min_w_cm3 && p.i_y_cm4 >= min_i_cm4)
            .collect();
        found.sort_by(|a, b| a.w_el_y_cm3.total_cmp(&b.w_el_y_cm3));
        found
    }

    /// Lightest profile meeting the requirements.
    pub fn optimal_profile(&self, min_w_cm3: f64, min_i_cm4: f64, families: &[ProfileFamily]) -> Option<&SteelProfile> {
        self.search(min_w_cm3, min_i_cm4, families)
            .into_iter()
            .min_by(|a, b| a.area_cm2.total_cmp(&b.area_cm2))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

// ============================================================================
// EN 10365 Tables
// ============================================================================

type ProfileRow = (u32, f64, f64, f64, f64, f64, f64, f64, f64, f64, f64, f64, f64, f64);

const HEA_TABLE: &[ProfileRow] = &[
    // (size, h, b, tw, tf, A, I_y, I_z, W_el_y, W_el_z, i_y, i_z, W_pl_y, W_pl_z)
    (100, 96.0, 100.0, 5.0, 8.0, 21.2, 349.0, 134.0, 72.8, 26.8, 4.06, 2.51, 83.0, 41.1),
    (120, 114.0, 120.0, 5.0, 8.0, 25.3, 606.0, 231.0, 106.3, 38.5, 4.89, 3.02, 119.5, 58.9),
    (140, 133.0, 140.0, 5.5, 8.5, 31.4, 1033.0, 389.0, 155.4, 55.6, 5.73, 3.52, 173.5, 84.8),
    (160, 152.0, 160.0, 6.0, 9.0, 38.8, 1673.0, 616.0, 220.1, 77.0, 6.57, 3.98, 245.1, 117.6),
    (180, 171.0, 180.0, 6.0, 9.5, 45.3, 2510.0, 925.0, 293.6, 102.7, 7.45, 4.52, 324.9, 156.5),
    (200, 190.0, 200.0, 6.5, 10.0, 53.8, 3692.0, 1336.0, 388.6, 133.6, 8.28, 4.98, 429.5, 203.8),
    (220, 210.0, 220.0, 7.0, 11.0, 64.3, 5410.0, 1955.0, 515.2, 177.7, 9.17, 5.51, 568.5, 270.6),
    (240, 230.0, 240.0, 7.5, 12.0, 76.8, 7763.0, 2769.0, 675.1, 230.7, 10.05, 6.0, 744.6, 351.7),
    (260, 250.0, 260.0, 7.5, 12.5, 86.8, 10450.0, 3668.0, 836.4, 282.1, 10.97, 6.5, 919.8, 430.2),
    (280, 270.0, 280.0, 8.0, 13.0, 97.3, 13670.0, 4763.0, 1013.0, 340.2, 11.86, 7.0, 1112.0, 518.1),
    (300, 290.0, 300.0, 8.5, 14.0, 112.5, 18260.0, 6310.0, 1260.0, 420.6, 12.74, 7.49, 1383.0, 641.2),
    (320, 310.0, 300.0, 9.0, 15.5, 124.4, 22930.0, 6985.0, 1479.0, 465.7, 13.58, 7.49, 1628.0, 709.7),
    (340, 330.0, 300.0, 9.5, 16.5, 133.5, 27690.0, 7436.0, 1678.0, 495.7, 14.4, 7.46, 1850.0, 755.9),
    (360, 350.0, 300.0, 10.0, 17.5, 142.8, 33090.0, 7887.0, 1891.0, 525.8, 15.22, 7.43, 2088.0, 802.3),
    (400, 390.0, 300.0, 11.0, 19.0, 159.0, 45070.0, 8564.0, 2311.0, 570.9, 16.84, 7.34, 2562.0, 872.9),
    (450, 440.0, 300.0, 11.5, 21.0, 178.0, 63720.0, 9465.0, 2896.0, 631.0, 18.92, 7.29, 3216.0, 965.5),
    (500, 490.0, 300.0, 12.0, 23.0, 197.5, 86970.0, 10370.0, 3550.0, 691.1, 20.98, 7.24, 3949.0, 1059.0),
];

const HEB_TABLE: &[ProfileRow] = &[
    // (size, h, b, tw, tf, A, I_y, I_z, W_el_y, W_el_z, i_y, i_z, W_pl_y, W_pl_z)
    (100, 100.0, 100.0, 6.0, 10.0, 26.0, 450.0, 167.0, 89.9, 33.5, 4.16, 2.53, 104.2, 51.42),
    (120, 120.0, 120.0, 6.5, 11.0, 34.0, 864.0, 318.0, 144.1, 52.9, 5.04, 3.06, 165.2, 80.97),
    (140, 140.0, 140.0, 7.0, 12.0, 43.0, 1509.0, 550.0, 215.6, 78.5, 5.93, 3.58, 245.4, 119.8),
    (160, 160.0, 160.0, 8.0, 13.0, 54.3, 2492.0, 889.0, 311.5, 111.2, 6.78, 4.05, 354.0, 170.0),
    (180, 180.0, 180.0, 8.5, 14.0, 65.3, 3831.0, 1363.0, 425.7, 151.4, 7.66, 4.57, 481.4, 231.0),
    (200, 200.0, 200.0, 9.0, 15.0, 78.1, 5696.0, 2003.0, 569.6, 200.3, 8.54, 5.07, 642.5, 305.8),
    (220, 220.0, 220.0, 9.5, 16.0, 91.0, 8091.0, 2843.0, 735.5, 258.5, 9.43, 5.59, 827.0, 393.9),
    (240, 240.0, 240.0, 10.0, 17.0, 106.0, 11260.0, 3923.0, 938.3, 326.9, 10.31, 6.08, 1053.0, 498.4),
    (260, 260.0, 260.0, 10.0, 17.5, 118.4, 14920.0, 5135.0, 1148.0, 395.0, 11.22, 6.58, 1283.0, 602.2),
    (280, 280.0, 280.0, 10.5, 18.0, 131.4, 19270.0, 6595.0, 1376.0, 471.1, 12.11, 7.09, 1534.0, 717.6),
    (300, 300.0, 300.0, 11.0, 19.0, 149.1, 25170.0, 8563.0, 1678.0, 570.9, 13.0, 7.58, 1869.0, 870.1),
    (320, 320.0, 300.0, 11.5, 20.5, 161.3, 30820.0, 9239.0, 1926.0, 615.9, 13.82, 7.57, 2149.0, 939.1),
    (340, 340.0, 300.0, 12.0, 21.5, 170.9, 36660.0, 9690.0, 2156.0, 646.0, 14.65, 7.53, 2408.0, 985.7),
    (360, 360.0, 300.0, 12.5, 22.5, 180.6, 43190.0, 10140.0, 2400.0, 676.1, 15.46, 7.49, 2683.0, 1032.0),
    (400, 400.0, 300.0, 13.5, 24.0, 197.8, 57680.0, 10820.0, 2884.0, 721.3, 17.08, 7.4, 3232.0, 1104.0),
    (450, 450.0, 300.0, 14.0, 26.0, 218.0, 79890.0, 11720.0, 3551.0, 781.4, 19.14, 7.33, 3982.0, 1198.0),
    (500, 500.0, 300.0, 14.5, 28.0, 238.6, 107200.0, 12620.0, 4287.0, 841.6, 21.19, 7.27, 4815.0, 1292.0),
];

const IPE_TABLE: &[ProfileRow] = &[
    // (size, h, b, tw, tf, A, I_y, I_z, W_el_y, W_el_z, i_y, i_z, W_pl_y, W_pl_z)
    (80, 80.0, 46.0, 3.8, 5.2, 7.64, 80.1, 8.49, 20.0, 3.69, 3.24, 1.05, 23.22, 5.82),
    (100, 100.0, 55.0, 4.1, 5.7, 10.3, 171.0, 15.9, 34.2, 5.79, 4.07, 1.24, 39.41, 9.15),
    (120, 120.0, 64.0, 4.4, 6.3, 13.2, 318.0, 27.7, 53.0, 8.65, 4.9, 1.45, 60.73, 13.58),
    (140, 140.0, 73.0, 4.7, 6.9, 16.4, 541.0, 44.9, 77.3, 12.3, 5.74, 1.65, 88.34, 19.25),
    (160, 160.0, 82.0, 5.0, 7.4, 20.1, 869.0, 68.3, 108.7, 16.7, 6.58, 1.84, 123.9, 26.1),
    (180, 180.0, 91.0, 5.3, 8.0, 23.9, 1317.0, 101.0, 146.3, 22.2, 7.42, 2.05, 166.4, 34.6),
    (200, 200.0, 100.0, 5.6, 8.5, 28.5, 1943.0, 142.0, 194.3, 28.5, 8.26, 2.24, 220.6, 44.61),
    (220, 220.0, 110.0, 5.9, 9.2, 33.4, 2772.0, 205.0, 252.0, 37.3, 9.11, 2.48, 285.4, 58.11),
    (240, 240.0, 120.0, 6.2, 9.8, 39.1, 3892.0, 284.0, 324.3, 47.3, 9.97, 2.69, 366.6, 73.92),
    (270, 270.0, 135.0, 6.6, 10.2, 45.9, 5790.0, 420.0, 429.0, 62.2, 11.23, 3.02, 484.0, 96.95),
    (300, 300.0, 150.0, 7.1, 10.7, 53.8, 8356.0, 604.0, 557.1, 80.5, 12.46, 3.35, 628.4, 125.2),
    (330, 330.0, 160.0, 7.5, 11.5, 62.6, 11770.0, 788.0, 713.1, 98.5, 13.71, 3.55, 804.3, 153.7),
    (360, 360.0, 170.0, 8.0, 12.7, 72.7, 16270.0, 1043.0, 903.6, 122.8, 14.95, 3.79, 1019.0, 191.1),
    (400, 400.0, 180.0, 8.6, 13.5, 84.5, 23130.0, 1318.0, 1156.0, 146.4, 16.55, 3.95, 1307.0, 229.0),
    (450, 450.0, 190.0, 9.4, 14.6, 98.8, 33740.0, 1676.0, 1500.0, 176.4, 18.48, 4.12, 1702.0, 276.4),
    (500, 500.0, 200.0, 10.2, 16.0, 116.0, 48200.0, 2142.0, 1928.0, 214.2, 20.43, 4.31, 2194.0, 335.9),
    (550, 550.0, 210.0, 11.1, 17.2, 134.4, 67120.0, 2668.0, 2441.0, 254.1, 22.35, 4.45, 2787.0, 400.5),
    (600, 600.0, 220.0, 12.0, 19.0, 156.0, 92080.0, 3387.0, 3069.0, 307.9, 24.3, 4.66, 3512.0, 485.6),
];

const UPN_TABLE: &[ProfileRow] = &[
    // (size, h, b, tw, tf, A, I_y, I_z, W_el_y, W_el_z, i_y, i_z, W_pl_y, W_pl_z)
    (80, 80.0, 45.0, 6.0, 8.0, 11.0, 106.0, 19.4, 26.5, 6.36, 3.1, 1.33, 31.8, 12.1),
    (100, 100.0, 50.0, 6.0, 8.5, 13.5, 206.0, 29.3, 41.2, 8.49, 3.91, 1.47, 49.0, 16.2),
    (120, 120.0, 55.0, 7.0, 9.0, 17.0, 364.0, 43.2, 60.7, 11.1, 4.62, 1.59, 72.6, 21.2),
    (140, 140.0, 60.0, 7.0, 10.0, 20.4, 605.0, 62.7, 86.4, 14.8, 5.45, 1.75, 103.0, 28.3),
    (160, 160.0, 65.0, 7.5, 10.5, 24.0, 925.0, 85.3, 116.0, 18.3, 6.21, 1.89, 138.0, 35.2),
    (180, 180.0, 70.0, 8.0, 11.0, 28.0, 1350.0, 114.0, 150.0, 22.4, 6.95, 2.02, 179.0, 42.9),
    (200, 200.0, 75.0, 8.5, 11.5, 32.2, 1910.0, 148.0, 191.0, 27.0, 7.7, 2.14, 228.0, 51.8),
    (220, 220.0, 80.0, 9.0, 12.5, 37.4, 2690.0, 197.0, 245.0, 33.6, 8.48, 2.3, 292.0, 64.1),
    (240, 240.0, 85.0, 9.5, 13.0, 42.3, 3600.0, 248.0, 300.0, 39.6, 9.22, 2.42, 358.0, 75.7),
    (260, 260.0, 90.0, 10.0, 14.0, 48.3, 4820.0, 317.0, 371.0, 47.7, 9.99, 2.56, 442.0, 89.6),
    (280, 280.0, 95.0, 10.0, 15.0, 53.3, 6280.0, 399.0, 448.0, 57.2, 10.85, 2.74, 532.0, 109.0),
    (300, 300.0, 100.0, 10.0, 16.0, 58.8, 8030.0, 495.0, 535.0, 67.8, 11.69, 2.9, 632.0, 130.0),
];
