//! # Local Intervention Verification
//!
//! Runs the whole check for one wall:
//!
//! ```text
//! CollectingInputs → ComputingOriginal → ComputingModified
//!     → AggregatingFrames → Classifying → Done
//! ```
//!
//! Any stage may move to `Failed`. The original state sees the existing
//! openings only; the modified state sees all openings. Every new opening
//! with a reinforcement gets a frame, computed independently of the others;
//! the summed frame stiffness and resistance are divided by the
//! collaboration factor γ and added to the modified masonry.
//!
//! A run never returns an error: fatal input problems end in `Failed` with
//! [`CalculationResult::errors`] filled, and frame failures only zero that
//! frame's contribution.
//!
//! ## Example
//!
//! ```rust
//! use cerchiature_core::calculations::intervention::{verify, InterventionInput};
//! use cerchiature_core::calculations::verification::InterventionLimits;
//! use cerchiature_core::materials::{MaterialCatalog, ProfileCatalog};
//! use cerchiature_core::model::{Opening, WallGeometry};
//!
//! let masonry = MaterialCatalog::normative().lookup("mattoni_pieni")?.clone();
//! let input = InterventionInput::new(WallGeometry::new(400.0, 270.0, 30.0), masonry)
//!     .with_opening(Opening::rectangular(100.0, 0.0, 100.0, 200.0).existing());
//!
//! let result = verify(&input, &ProfileCatalog::standard(), &InterventionLimits::default());
//! assert!(result.is_valid());
//! assert!(result.verification.as_ref().map_or(false, |v| v.is_local));
//! # Ok::<(), cerchiature_core::errors::CalcError>(())
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::calculations::frame::{self, FrameContext, FrameResult};
use crate::calculations::masonry::{self, MasonryInput, MasonryState, GAMMA_M_EXISTING};
use crate::calculations::verification::{self, InterventionLimits, OpeningLimitsResult, VerificationResult};
use crate::errors::{CalcError, CalcResult};
use crate::materials::{MasonryMaterial, ProfileCatalog};
use crate::model::{Opening, ReinforcementSpec, WallConstraints, WallGeometry, WallLoads};

fn default_gamma_m() -> f64 {
    GAMMA_M_EXISTING
}

/// Everything needed to verify one wall.
///
/// Wall and masonry are optional so that an incomplete project can be
/// submitted; the run then fails in [`Stage::CollectingInputs`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionInput {
    #[serde(default)]
    pub wall: Option<WallGeometry>,
    #[serde(default)]
    pub masonry: Option<MasonryMaterial>,
    #[serde(default)]
    pub openings: Vec<Opening>,
    #[serde(default)]
    pub loads: WallLoads,
    #[serde(default)]
    pub constraints: WallConstraints,
    /// Masonry partial factor γ_M
    #[serde(default = "default_gamma_m")]
    pub gamma_m: f64,
    /// Overrides the confidence factor of the masonry knowledge level
    #[serde(default)]
    pub confidence_factor: Option<f64>,
}

impl InterventionInput {
    pub fn new(wall: WallGeometry, masonry: MasonryMaterial) -> Self {
        InterventionInput {
            wall: Some(wall),
            masonry: Some(masonry),
            openings: Vec::new(),
            loads: WallLoads::default(),
            constraints: WallConstraints::default(),
            gamma_m: GAMMA_M_EXISTING,
            confidence_factor: None,
        }
    }

    pub fn with_opening(mut self, opening: Opening) -> Self {
        self.openings.push(opening);
        self
    }

    pub fn with_loads(mut self, loads: WallLoads) -> Self {
        self.loads = loads;
        self
    }
}

/// Stage of a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    CollectingInputs,
    ComputingOriginal,
    ComputingModified,
    AggregatingFrames,
    Classifying,
    Done,
    Failed,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::CollectingInputs => "Collecting inputs",
            Stage::ComputingOriginal => "Computing original state",
            Stage::ComputingModified => "Computing modified state",
            Stage::AggregatingFrames => "Aggregating frames",
            Stage::Classifying => "Classifying",
            Stage::Done => "Done",
            Stage::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Frame contributions summed over all reinforced openings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameTotals {
    /// ΣK_frame before γ (kN/m)
    pub k_sum_kn_m: f64,
    /// ΣV_resistance before γ (kN)
    pub v_sum_kn: f64,
    pub gamma: f64,
    /// ΣK_frame/γ (kN/m)
    pub k_kn_m: f64,
    /// ΣV_resistance/γ (kN)
    pub v_kn: f64,
}

impl FrameTotals {
    pub fn new(k_sum_kn_m: f64, v_sum_kn: f64, gamma: f64) -> Self {
        FrameTotals {
            k_sum_kn_m,
            v_sum_kn,
            gamma,
            k_kn_m: k_sum_kn_m / gamma,
            v_kn: v_sum_kn / gamma,
        }
    }

    /// Sum in key order, so the total does not depend on scheduling.
    pub fn from_frames(frames: &BTreeMap<String, FrameResult>, gamma: f64) -> Self {
        let (k, v) = frames
            .values()
            .fold((0.0, 0.0), |(k, v), f| (k + f.k_frame_kn_m, v + f.v_resistance_kn));
        FrameTotals::new(k, v, gamma)
    }
}

/// Outcome of a verification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub stage: Stage,
    pub original: Option<MasonryState>,
    /// Modified masonry alone, without frames
    pub modified: Option<MasonryState>,
    pub frame_totals: FrameTotals,
    /// Per-opening frame results keyed by opening id
    pub frames: BTreeMap<String, FrameResult>,
    pub verification: Option<VerificationResult>,
    pub opening_limits: Option<OpeningLimitsResult>,
    /// Confidence factor FC used
    pub confidence_factor: f64,
    pub errors: Vec<CalcError>,
    pub warnings: Vec<String>,
}

impl CalculationResult {
    fn new(limits: &InterventionLimits) -> Self {
        CalculationResult {
            stage: Stage::CollectingInputs,
            original: None,
            modified: None,
            frame_totals: FrameTotals::new(0.0, 0.0, limits.collaboration_gamma),
            frames: BTreeMap::new(),
            verification: None,
            opening_limits: None,
            confidence_factor: 1.0,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.stage == Stage::Done
    }

    /// Modified masonry plus the frames (kN/m)
    pub fn k_modified_total(&self) -> f64 {
        self.modified.as_ref().map_or(0.0, |m| m.k_kn_m) + self.frame_totals.k_kn_m
    }

    /// Modified masonry V_min plus the frames (kN)
    pub fn v_modified_total(&self) -> f64 {
        self.modified.as_ref().map_or(0.0, |m| m.v_min_kn) + self.frame_totals.v_kn
    }

    pub fn is_local(&self) -> bool {
        self.verification.as_ref().map_or(false, |v| v.is_local)
    }
}

/// Classify from masonry figures and frame totals.
///
/// K_mod = K_masonry,mod + ΣK/γ and V_mod = V_min,mod + ΣV/γ.
pub fn classify_states(
    k_original: f64,
    v_original: f64,
    k_modified_masonry: f64,
    v_modified_masonry: f64,
    totals: &FrameTotals,
    limits: &InterventionLimits,
) -> VerificationResult {
    verification::classify(
        k_original,
        k_modified_masonry + totals.k_kn_m,
        v_original,
        v_modified_masonry + totals.v_kn,
        limits,
    )
}

// ============================================================================
// Run
// ============================================================================

struct FrameJob<'a> {
    id: String,
    opening: &'a Opening,
    spec: &'a ReinforcementSpec,
}

fn compute_frames(ctx: &FrameContext<'_>, jobs: &[FrameJob<'_>]) -> BTreeMap<String, FrameResult> {
    #[cfg(not(target_arch = "wasm32"))]
    let iter = jobs.par_iter();
    #[cfg(target_arch = "wasm32")]
    let iter = jobs.iter();

    iter.map(|job| (job.id.clone(), frame::compute_frame(ctx, &job.id, job.opening, job.spec)))
        .collect()
}

/// A verification run, advanced one stage at a time with [`Run::step`].
pub struct Run<'a> {
    input: &'a InterventionInput,
    catalog: &'a ProfileCatalog,
    limits: &'a InterventionLimits,
    masonry_input: Option<MasonryInput>,
    labels: Vec<String>,
    result: CalculationResult,
}

impl<'a> Run<'a> {
    pub fn new(input: &'a InterventionInput, catalog: &'a ProfileCatalog, limits: &'a InterventionLimits) -> Self {
        Run {
            input,
            catalog,
            limits,
            masonry_input: None,
            labels: Vec::new(),
            result: CalculationResult::new(limits),
        }
    }

    pub fn stage(&self) -> Stage {
        self.result.stage
    }

    /// Execute the current stage and move to the next one.
    pub fn step(&mut self) -> Stage {
        let stage = self.result.stage;
        let outcome = match stage {
            Stage::CollectingInputs => self.collect_inputs().map(|_| Stage::ComputingOriginal),
            Stage::ComputingOriginal => self.compute_original().map(|_| Stage::ComputingModified),
            Stage::ComputingModified => self.compute_modified().map(|_| Stage::AggregatingFrames),
            Stage::AggregatingFrames => self.aggregate_frames().map(|_| Stage::Classifying),
            Stage::Classifying => self.classify().map(|_| Stage::Done),
            Stage::Done | Stage::Failed => Ok(stage),
        };

        self.result.stage = match outcome {
            Ok(next) => next,
            Err(err) => {
                warn!(stage = %stage, error = %err, "verification failed");
                self.result.errors.push(err);
                Stage::Failed
            }
        };
        self.result.stage
    }

    /// Run to completion.
    pub fn finish(mut self) -> CalculationResult {
        while !self.result.stage.is_terminal() {
            self.step();
        }
        self.result
    }

    fn collect_inputs(&mut self) -> CalcResult<()> {
        let wall = self.input.wall.ok_or_else(|| CalcError::missing_field("wall"))?;
        let masonry = self
            .input
            .masonry
            .clone()
            .ok_or_else(|| CalcError::missing_field("masonry"))?;

        if self.limits.collaboration_gamma <= 0.0 || !self.limits.collaboration_gamma.is_finite() {
            return Err(CalcError::invalid_input(
                "collaboration_gamma",
                self.limits.collaboration_gamma.to_string(),
                "Collaboration factor must be positive",
            ));
        }

        let mut masonry_input = MasonryInput::new(wall, masonry);
        masonry_input.loads = self.input.loads;
        masonry_input.constraints = self.input.constraints;
        masonry_input.gamma_m = self.input.gamma_m;
        if let Some(fc) = self.input.confidence_factor {
            masonry_input.confidence_factor = fc;
        }
        self.result.warnings.extend(masonry_input.validate()?);
        self.result.confidence_factor = masonry_input.confidence_factor;

        let mut seen = HashSet::new();
        for (i, opening) in self.input.openings.iter().enumerate() {
            let label = opening.label(i);
            self.result.warnings.extend(opening.validate(&wall, &label)?);
            if !seen.insert(label.clone()) {
                return Err(CalcError::invalid_input(
                    format!("openings[{}].id", i),
                    label,
                    "Opening ids must be unique",
                ));
            }
            self.labels.push(label);
        }

        for (i, a) in self.input.openings.iter().enumerate() {
            for (j, b) in self.input.openings.iter().enumerate().skip(i + 1) {
                if a.overlaps(b) {
                    self.result
                        .warnings
                        .push(format!("Openings {} and {} overlap", self.labels[i], self.labels[j]));
                }
            }
        }

        info!(
            openings = self.input.openings.len(),
            fc = masonry_input.confidence_factor,
            "inputs collected"
        );
        self.masonry_input = Some(masonry_input);
        Ok(())
    }

    fn masonry_input(&self) -> CalcResult<&MasonryInput> {
        self.masonry_input
            .as_ref()
            .ok_or_else(|| CalcError::Internal {
                message: "masonry input not collected".to_string(),
            })
    }

    fn compute_original(&mut self) -> CalcResult<()> {
        let existing: Vec<Opening> = self.input.openings.iter().filter(|o| o.existing).cloned().collect();
        let state = masonry::calculate(self.masonry_input()?, &existing)?;
        info!(k = state.k_kn_m, v_min = state.v_min_kn, openings = existing.len(), "original state");
        self.result.original = Some(state);
        Ok(())
    }

    fn compute_modified(&mut self) -> CalcResult<()> {
        let state = masonry::calculate(self.masonry_input()?, &self.input.openings)?;
        info!(
            k = state.k_kn_m,
            v_min = state.v_min_kn,
            openings = self.input.openings.len(),
            "modified state"
        );
        self.result.modified = Some(state);
        Ok(())
    }

    fn aggregate_frames(&mut self) -> CalcResult<()> {
        let masonry_input = self.masonry_input()?;
        let ctx = FrameContext {
            catalog: self.catalog,
            wall: &masonry_input.wall,
            masonry_unit_weight_kn_m3: masonry_input.masonry.unit_weight_kn_m3,
        };

        let jobs: Vec<FrameJob<'_>> = self
            .input
            .openings
            .iter()
            .zip(&self.labels)
            .filter(|(o, _)| !o.existing)
            .filter_map(|(opening, id)| {
                opening.reinforcement.as_ref().map(|spec| FrameJob {
                    id: id.clone(),
                    opening,
                    spec,
                })
            })
            .collect();

        let frames = compute_frames(&ctx, &jobs);
        let totals = FrameTotals::from_frames(&frames, self.limits.collaboration_gamma);

        for (id, frame) in &frames {
            if let Some(err) = &frame.error {
                self.result.warnings.push(format!("{}: frame not computed ({})", id, err));
            }
            self.result
                .warnings
                .extend(frame.warnings.iter().map(|w| format!("{}: {}", id, w)));
        }

        info!(
            frames = frames.len(),
            k_frames = totals.k_kn_m,
            v_frames = totals.v_kn,
            gamma = totals.gamma,
            "frames aggregated"
        );
        self.result.frames = frames;
        self.result.frame_totals = totals;
        Ok(())
    }

    fn classify(&mut self) -> CalcResult<()> {
        let (original, modified) = match (&self.result.original, &self.result.modified) {
            (Some(o), Some(m)) => (o, m),
            _ => {
                return Err(CalcError::Internal {
                    message: "masonry states missing at classification".to_string(),
                })
            }
        };

        let verification = classify_states(
            original.k_kn_m,
            original.v_min_kn,
            modified.k_kn_m,
            modified.v_min_kn,
            &self.result.frame_totals,
            self.limits,
        );
        self.result.warnings.extend(verification.warnings.iter().cloned());

        let wall = self.masonry_input()?.wall;
        let limits = verification::check_opening_limits(&wall, &self.input.openings, self.limits);
        if !limits.opening_ratio_ok {
            self.result.warnings.push(format!(
                "Opening ratio {:.1}% exceeds {:.0}%",
                limits.opening_ratio_pct, self.limits.max_opening_ratio_pct
            ));
        }
        for pier in &limits.narrow_piers {
            self.result.warnings.push(format!(
                "Pier at x = {:.0} cm is {:.0} cm wide (minimum {:.0} cm)",
                pier.start_cm, pier.width_cm, limits.min_pier_width_cm
            ));
        }

        info!(
            is_local = verification.is_local,
            delta_k = verification.delta_k_pct,
            delta_v = verification.delta_v_pct,
            "intervention classified"
        );
        self.result.verification = Some(verification);
        self.result.opening_limits = Some(limits);
        Ok(())
    }
}

/// Verify an intervention end to end.
pub fn verify(input: &InterventionInput, catalog: &ProfileCatalog, limits: &InterventionLimits) -> CalculationResult {
    Run::new(input, catalog, limits).finish()
}
