//! Reinforced Concrete Materials (NTC 2018 §4.1, §11.2, §11.3.2)
//!
//! Concrete strength classes, reinforcing steel and bar-set notation
//! ("3φ16", "φ8/20") for cast-in-place frames around openings.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

use crate::errors::{CalcError, CalcResult};

/// Partial factor for concrete
pub const GAMMA_C: f64 = 1.5;
/// Partial factor for reinforcing steel
pub const GAMMA_S: f64 = 1.15;
/// Long-term effects coefficient α_cc
pub const ALPHA_CC: f64 = 0.85;
/// Cracked-section inertia factor applied to frame stiffness
pub const CRACKED_INERTIA_FACTOR: f64 = 0.5;

/// Concrete strength class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConcreteClass {
    #[serde(rename = "C20/25")]
    C20_25,
    #[default]
    #[serde(rename = "C25/30")]
    C25_30,
    #[serde(rename = "C28/35")]
    C28_35,
    #[serde(rename = "C30/37")]
    C30_37,
    #[serde(rename = "C32/40")]
    C32_40,
    #[serde(rename = "C35/45")]
    C35_45,
    #[serde(rename = "C40/50")]
    C40_50,
    #[serde(rename = "C45/55")]
    C45_55,
    #[serde(rename = "C50/60")]
    C50_60,
}

/// Mechanical properties of a concrete class (N/mm²)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcreteProperties {
    pub fck_mpa: f64,
    pub fcm_mpa: f64,
    pub fctm_mpa: f64,
    pub ecm_mpa: f64,
}

impl ConcreteClass {
    pub const ALL: [ConcreteClass; 9] = [
        ConcreteClass::C20_25,
        ConcreteClass::C25_30,
        ConcreteClass::C28_35,
        ConcreteClass::C30_37,
        ConcreteClass::C32_40,
        ConcreteClass::C35_45,
        ConcreteClass::C40_50,
        ConcreteClass::C45_55,
        ConcreteClass::C50_60,
    ];

    pub fn properties(&self) -> ConcreteProperties {
        let (fck, fcm, fctm, ecm) = match self {
            ConcreteClass::C20_25 => (20.0, 28.0, 2.2, 30000.0),
            ConcreteClass::C25_30 => (25.0, 33.0, 2.6, 31000.0),
            ConcreteClass::C28_35 => (28.0, 36.0, 2.8, 32000.0),
            ConcreteClass::C30_37 => (30.0, 38.0, 2.9, 33000.0),
            ConcreteClass::C32_40 => (32.0, 40.0, 3.0, 33000.0),
            ConcreteClass::C35_45 => (35.0, 43.0, 3.2, 34000.0),
            ConcreteClass::C40_50 => (40.0, 48.0, 3.5, 35000.0),
            ConcreteClass::C45_55 => (45.0, 53.0, 3.8, 36000.0),
            ConcreteClass::C50_60 => (50.0, 58.0, 4.1, 37000.0),
        };
        ConcreteProperties {
            fck_mpa: fck,
            fcm_mpa: fcm,
            fctm_mpa: fctm,
            ecm_mpa: ecm,
        }
    }

    /// Design compressive strength fcd = α_cc·fck/γ_c (N/mm²)
    pub fn fcd_mpa(&self) -> f64 {
        ALPHA_CC * self.properties().fck_mpa / GAMMA_C
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ConcreteClass::C20_25 => "C20/25",
            ConcreteClass::C25_30 => "C25/30",
            ConcreteClass::C28_35 => "C28/35",
            ConcreteClass::C30_37 => "C30/37",
            ConcreteClass::C32_40 => "C32/40",
            ConcreteClass::C35_45 => "C35/45",
            ConcreteClass::C40_50 => "C40/50",
            ConcreteClass::C45_55 => "C45/55",
            ConcreteClass::C50_60 => "C50/60",
        }
    }
}

impl std::fmt::Display for ConcreteClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Reinforcing steel type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RebarGrade {
    #[default]
    B450C,
    B450A,
}

impl RebarGrade {
    /// Characteristic yield strength (N/mm²)
    pub fn fyk_mpa(&self) -> f64 {
        450.0
    }

    /// Design yield strength fyd = fyk/γ_s (N/mm²)
    pub fn fyd_mpa(&self) -> f64 {
        self.fyk_mpa() / GAMMA_S
    }

    /// Elastic modulus (N/mm²)
    pub fn es_mpa(&self) -> f64 {
        200_000.0
    }
}

// ============================================================================
// Bar notation
// ============================================================================

fn split_on_phi(s: &str) -> Option<(&str, &str)> {
    ['φ', 'Φ', 'ø', 'Ø']
        .iter()
        .find_map(|sym| s.split_once(*sym))
        .or_else(|| s.split_once("fi"))
}

/// A group of longitudinal bars, written "3φ16".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebarSet {
    pub count: u32,
    pub diameter_mm: f64,
}

impl RebarSet {
    pub fn new(count: u32, diameter_mm: f64) -> Self {
        RebarSet { count, diameter_mm }
    }

    /// Total steel area (mm²)
    pub fn area_mm2(&self) -> f64 {
        self.count as f64 * PI * (self.diameter_mm / 2.0).powi(2)
    }
}

impl Default for RebarSet {
    fn default() -> Self {
        RebarSet::new(3, 16.0)
    }
}

impl FromStr for RebarSet {
    type Err = CalcError;

    fn from_str(s: &str) -> CalcResult<Self> {
        let invalid = || CalcError::invalid_input("rebar", s, "Expected bar notation like \"3φ16\"");
        let (count, diameter) = split_on_phi(s.trim()).ok_or_else(invalid)?;
        let count = count.trim().parse::<u32>().map_err(|_| invalid())?;
        let diameter = diameter.trim().parse::<f64>().map_err(|_| invalid())?;
        if count == 0 || diameter <= 0.0 {
            return Err(invalid());
        }
        Ok(RebarSet::new(count, diameter))
    }
}

impl std::fmt::Display for RebarSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}φ{}", self.count, self.diameter_mm)
    }
}

/// Stirrups, written "φ8/20" (diameter in mm, spacing in cm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stirrups {
    pub diameter_mm: f64,
    pub spacing_cm: f64,
}

impl Default for Stirrups {
    fn default() -> Self {
        Stirrups {
            diameter_mm: 8.0,
            spacing_cm: 20.0,
        }
    }
}

impl FromStr for Stirrups {
    type Err = CalcError;

    fn from_str(s: &str) -> CalcResult<Self> {
        let invalid = || CalcError::invalid_input("stirrups", s, "Expected stirrup notation like \"φ8/20\"");
        let (_, rest) = split_on_phi(s.trim()).ok_or_else(invalid)?;
        let (diameter, spacing) = rest.split_once('/').ok_or_else(invalid)?;
        let diameter_mm = diameter.trim().parse::<f64>().map_err(|_| invalid())?;
        let spacing_cm = spacing.trim().parse::<f64>().map_err(|_| invalid())?;
        if diameter_mm <= 0.0 || spacing_cm <= 0.0 {
            return Err(invalid());
        }
        Ok(Stirrups { diameter_mm, spacing_cm })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_properties() {
        let c25 = ConcreteClass::C25_30.properties();
        assert_eq!(c25.fck_mpa, 25.0);
        assert_eq!(c25.ecm_mpa, 31000.0);
        assert!((ConcreteClass::C25_30.fcd_mpa() - 14.1667).abs() < 1e-3);
    }

    #[test]
    fn test_class_serialization() {
        let json = serde_json::to_string(&ConcreteClass::C30_37).unwrap();
        assert_eq!(json, "\"C30/37\"");
        let back: ConcreteClass = serde_json::from_str("\"C50/60\"").unwrap();
        assert_eq!(back, ConcreteClass::C50_60);
    }

    #[test]
    fn test_rebar_parsing() {
        let bars: RebarSet = "3φ16".parse().unwrap();
        assert_eq!(bars.count, 3);
        assert_eq!(bars.diameter_mm, 16.0);
        assert!((bars.area_mm2() - 603.19).abs() < 0.01);

        let alt: RebarSet = "4Ø20".parse().unwrap();
        assert_eq!(alt.count, 4);
        assert!("three bars".parse::<RebarSet>().is_err());
        assert!("0φ16".parse::<RebarSet>().is_err());
    }

    #[test]
    fn test_stirrup_parsing() {
        let s: Stirrups = "φ8/15".parse().unwrap();
        assert_eq!(s.diameter_mm, 8.0);
        assert_eq!(s.spacing_cm, 15.0);
        assert!("φ8".parse::<Stirrups>().is_err());
    }

    #[test]
    fn test_rebar_design_strength() {
        assert!((RebarGrade::B450C.fyd_mpa() - 391.3).abs() < 0.1);
    }
}
