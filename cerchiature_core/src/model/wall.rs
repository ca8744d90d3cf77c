//! Wall geometry, loads and restraints.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::cm_to_m;

/// Usual ranges for existing masonry walls (cm): (min, max)
const LENGTH_RANGE_CM: (f64, f64) = (10.0, 2000.0);
const HEIGHT_RANGE_CM: (f64, f64) = (50.0, 1000.0);
const THICKNESS_RANGE_CM: (f64, f64) = (10.0, 200.0);

/// Slenderness h/t above which a warning is raised
pub const SLENDERNESS_WARNING: f64 = 20.0;

/// Wall panel dimensions in centimetres.
///
/// ## JSON Example
///
/// ```json
/// { "length_cm": 500.0, "height_cm": 300.0, "thickness_cm": 30.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallGeometry {
    pub length_cm: f64,
    pub height_cm: f64,
    pub thickness_cm: f64,
}

impl WallGeometry {
    pub fn new(length_cm: f64, height_cm: f64, thickness_cm: f64) -> Self {
        WallGeometry {
            length_cm,
            height_cm,
            thickness_cm,
        }
    }

    /// Validate the geometry, returning advisory warnings.
    pub fn validate(&self) -> CalcResult<Vec<String>> {
        let checks = [
            ("length_cm", self.length_cm, LENGTH_RANGE_CM),
            ("height_cm", self.height_cm, HEIGHT_RANGE_CM),
            ("thickness_cm", self.thickness_cm, THICKNESS_RANGE_CM),
        ];

        let mut warnings = Vec::new();
        for (field, value, (min, max)) in checks {
            if value <= 0.0 || !value.is_finite() {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Wall dimension must be positive",
                ));
            }
            if value < min || value > max {
                warnings.push(format!("{} = {} cm is outside the usual range [{}, {}]", field, value, min, max));
            }
        }

        let slenderness = self.height_cm / self.thickness_cm;
        if slenderness > SLENDERNESS_WARNING {
            warnings.push(format!(
                "High wall slenderness h/t = {:.1} (> {})",
                slenderness, SLENDERNESS_WARNING
            ));
        }

        Ok(warnings)
    }

    pub fn length_m(&self) -> f64 {
        cm_to_m(self.length_cm)
    }

    pub fn height_m(&self) -> f64 {
        cm_to_m(self.height_cm)
    }

    pub fn thickness_m(&self) -> f64 {
        cm_to_m(self.thickness_cm)
    }

    /// Elevation area (cm²)
    pub fn face_area_cm2(&self) -> f64 {
        self.length_cm * self.height_cm
    }
}

/// Vertical load acting on top of the wall.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WallLoads {
    /// Total vertical load N (kN), compression positive
    #[serde(default)]
    pub vertical_kn: f64,
    /// Load eccentricity e (cm)
    #[serde(default)]
    pub eccentricity_cm: f64,
}

impl WallLoads {
    pub fn validate(&self) -> CalcResult<()> {
        if self.vertical_kn < 0.0 || !self.vertical_kn.is_finite() {
            return Err(CalcError::invalid_input(
                "vertical_kn",
                self.vertical_kn.to_string(),
                "Vertical load must be zero or compressive",
            ));
        }
        if !self.eccentricity_cm.is_finite() {
            return Err(CalcError::invalid_input(
                "eccentricity_cm",
                self.eccentricity_cm.to_string(),
                "Eccentricity must be finite",
            ));
        }
        Ok(())
    }
}

/// Restraint at the wall base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BottomRestraint {
    #[default]
    Fixed,
    Pinned,
}

/// Restraint at the wall head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TopRestraint {
    #[default]
    Fixed,
    Pinned,
    Free,
}

/// End restraints of the wall panel, used by the flexural stiffness term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WallConstraints {
    #[serde(default)]
    pub bottom: BottomRestraint,
    #[serde(default)]
    pub top: TopRestraint,
}

impl WallConstraints {
    /// Flexural stiffness coefficient k in K = k·E·I/h³
    pub fn flexural_coefficient(&self) -> f64 {
        match (self.bottom, self.top) {
            (BottomRestraint::Fixed, TopRestraint::Fixed) => 12.0,
            (BottomRestraint::Fixed, TopRestraint::Free) => 3.0,
            _ => 6.0,
        }
    }
}
