//! # Unit Types
//!
//! Newtype wrappers for the SI units used by the verification engines.
//! Inputs cross the API boundary in centimetres (geometry), kN (loads) and
//! N/mm² (strengths). The engines convert lengths to metres before computing.
//!
//! - Length: centimetres (cm), metres (m), millimetres (mm)
//! - Force: kilonewtons (kN)
//! - Stress: megapascals (MPa = N/mm²), kilopascals (kPa = kN/m²)
//! - Moment: kilonewton-metres (kNm)
//! - Stiffness: kilonewtons per metre (kN/m)
//! - Second moment of area: cm⁴ (catalog), m⁴ (engines)
//!
//! ## Example
//!
//! ```rust
//! use cerchiature_core::units::{Centimeters, Meters, Cm4, M4};
//!
//! let width: Meters = Centimeters(120.0).into();
//! assert_eq!(width.0, 1.2);
//!
//! let inertia: M4 = Cm4(3692.0).into();
//! assert!((inertia.0 - 3.692e-5).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Length Units
// ============================================================================

/// Length in centimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Centimeters(pub f64);

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

impl From<Centimeters> for Meters {
    fn from(cm: Centimeters) -> Self {
        Meters(cm.0 / 100.0)
    }
}

impl From<Meters> for Centimeters {
    fn from(m: Meters) -> Self {
        Centimeters(m.0 * 100.0)
    }
}

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

impl From<Millimeters> for Centimeters {
    fn from(mm: Millimeters) -> Self {
        Centimeters(mm.0 / 10.0)
    }
}

impl From<Centimeters> for Millimeters {
    fn from(cm: Centimeters) -> Self {
        Millimeters(cm.0 * 10.0)
    }
}

// ============================================================================
// Force and Moment Units
// ============================================================================

/// Force in kilonewtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloNewtons(pub f64);

/// Moment in kilonewton-metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnM(pub f64);

/// Distributed load in kilonewtons per metre
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnPerM(pub f64);

/// Lateral stiffness in kilonewtons per metre
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stiffness(pub f64);

// ============================================================================
// Stress Units
// ============================================================================

/// Stress in megapascals (N/mm²)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Megapascals(pub f64);

/// Stress in kilopascals (kN/m²)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilopascals(pub f64);

impl From<Megapascals> for Kilopascals {
    fn from(mpa: Megapascals) -> Self {
        Kilopascals(mpa.0 * 1000.0)
    }
}

impl From<Kilopascals> for Megapascals {
    fn from(kpa: Kilopascals) -> Self {
        Megapascals(kpa.0 / 1000.0)
    }
}

// ============================================================================
// Section Properties
// ============================================================================

/// Second moment of area in cm⁴
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cm4(pub f64);

/// Second moment of area in m⁴
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct M4(pub f64);

impl From<Cm4> for M4 {
    fn from(cm4: Cm4) -> Self {
        M4(cm4.0 * 1e-8)
    }
}

/// Section modulus in cm³
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cm3(pub f64);

impl Cm3 {
    /// Bending moment carried at stress `stress` (N/mm²), in kNm.
    ///
    /// cm³ × N/mm² = 10³ N·mm = N·m, hence the division by 1000.
    pub fn moment_at(self, stress: Megapascals) -> KnM {
        KnM(self.0 * stress.0 / 1000.0)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Centimeters);
impl_arithmetic!(Meters);
impl_arithmetic!(Millimeters);
impl_arithmetic!(KiloNewtons);
impl_arithmetic!(KnM);
impl_arithmetic!(KnPerM);
impl_arithmetic!(Stiffness);
impl_arithmetic!(Megapascals);
impl_arithmetic!(Kilopascals);
impl_arithmetic!(Cm4);
impl_arithmetic!(M4);
impl_arithmetic!(Cm3);

/// Convert a boundary length in cm to metres.
pub fn cm_to_m(cm: f64) -> f64 {
    Meters::from(Centimeters(cm)).value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cm_to_m() {
        let m: Meters = Centimeters(450.0).into();
        assert_eq!(m.0, 4.5);
        assert_eq!(cm_to_m(30.0), 0.3);
    }

    #[test]
    fn test_mm_to_cm() {
        let cm: Centimeters = Millimeters(190.0).into();
        assert_eq!(cm.0, 19.0);
    }

    #[test]
    fn test_plastic_moment() {
        // HEA 200, Wpl,y = 429.5 cm³ at 275 MPa
        let m = Cm3(429.5).moment_at(Megapascals(275.0));
        assert!((m.0 - 118.1125).abs() < 1e-9);
    }

    #[test]
    fn test_arithmetic() {
        let a = Stiffness(100.0);
        let b = Stiffness(40.0);
        assert_eq!((a + b).0, 140.0);
        assert_eq!((a - b).0, 60.0);
        assert_eq!((a * 2.0).0, 200.0);
        assert_eq!((a / 2.0).0, 50.0);
    }

    #[test]
    fn test_serialization() {
        let force = KiloNewtons(12.5);
        let json = serde_json::to_string(&force).unwrap();
        assert_eq!(json, "12.5");

        let roundtrip: KiloNewtons = serde_json::from_str(&json).unwrap();
        assert_eq!(force, roundtrip);
    }
}
