//! # Cerchiature CLI
//!
//! Runs a local-intervention check and prints a summary followed by the
//! full JSON result.
//!
//! ```text
//! cerchiature                 # built-in demo wall
//! cerchiature wall.json       # InterventionInput read from a JSON file
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::fs;
use std::process::ExitCode;

use cerchiature_core::calculations::{intervention, verification, CalculationResult, InterventionInput, InterventionLimits};
use cerchiature_core::materials::{MaterialCatalog, ProfileCatalog};
use cerchiature_core::model::{Opening, ProfileSpec, ReinforcementSpec, SteelFrameSpec, WallGeometry, WallLoads};
use cerchiature_core::{CalcError, CalcResult};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn demo_input() -> CalcResult<InterventionInput> {
    let masonry = MaterialCatalog::normative().lookup("mattoni_pieni")?.clone();

    let frame = ReinforcementSpec::Steel(SteelFrameSpec {
        lintel: ProfileSpec::single("HEB 160"),
        jambs: Some(ProfileSpec::single("HEB 160")),
        grade: Default::default(),
        constraints: Default::default(),
        anchors: None,
        splice: None,
    });

    Ok(InterventionInput::new(WallGeometry::new(600.0, 300.0, 40.0), masonry)
        .with_loads(WallLoads {
            vertical_kn: 120.0,
            eccentricity_cm: 0.0,
        })
        .with_opening(Opening::rectangular(60.0, 0.0, 90.0, 210.0).with_id("door").existing())
        .with_opening(
            Opening::rectangular(320.0, 0.0, 120.0, 220.0)
                .with_id("new_opening")
                .with_reinforcement(frame),
        ))
}

fn load_input(path: &str) -> CalcResult<InterventionInput> {
    let contents = fs::read_to_string(path).map_err(|e| CalcError::file_error("read", path, e.to_string()))?;
    Ok(serde_json::from_str(&contents)?)
}

fn print_summary(result: &CalculationResult) {
    println!("═══════════════════════════════════════");
    println!("  LOCAL INTERVENTION CHECK (NTC 2018)");
    println!("═══════════════════════════════════════");
    println!();

    if let (Some(original), Some(modified)) = (&result.original, &result.modified) {
        println!("Masonry:");
        println!("  K original  = {:>10.1} kN/m", original.k_kn_m);
        println!("  K modified  = {:>10.1} kN/m", modified.k_kn_m);
        println!("  V original  = {:>10.1} kN", original.v_min_kn);
        println!("  V modified  = {:>10.1} kN", modified.v_min_kn);
        println!();
    }

    if !result.frames.is_empty() {
        println!("Frames (γ = {:.2}):", result.frame_totals.gamma);
        for (id, frame) in &result.frames {
            match &frame.error {
                Some(reason) => println!("  {:<14} FAILED: {}", id, reason),
                None => println!(
                    "  {:<14} K = {:>10.1} kN/m   V = {:>8.1} kN",
                    id, frame.k_frame_kn_m, frame.v_resistance_kn
                ),
            }
        }
        println!();
    }

    if let Some(verification) = &result.verification {
        println!("{}", verification::summary(verification));
        println!();
    }

    for warning in &result.warnings {
        println!("  ! {}", warning);
    }
    for err in &result.errors {
        println!("  x [{}] {}", err.error_code(), err);
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let input = match std::env::args().nth(1) {
        Some(path) => {
            info!(path = %path, "reading wall description");
            load_input(&path)
        }
        None => {
            info!("no input file given, running the demo wall");
            demo_input()
        }
    };

    let input = match input {
        Ok(input) => input,
        Err(e) => {
            error!(code = e.error_code(), "{}", e);
            println!("{}", serde_json::to_string_pretty(&e).unwrap_or_else(|_| e.to_string()));
            return ExitCode::FAILURE;
        }
    };

    let result = intervention::verify(&input, &ProfileCatalog::standard(), &InterventionLimits::default());
    print_summary(&result);

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("failed to serialize result: {}", e),
    }

    if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
