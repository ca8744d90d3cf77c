//! # cerchiature_core - Local-Intervention Verification Engine
//!
//! `cerchiature_core` decides whether new openings cut into an existing masonry
//! wall, optionally strengthened with steel or reinforced-concrete frames
//! ("cerchiature"), still qualify as a *local intervention* under NTC 2018
//! §8.4.1. All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: engines are pure functions over explicit inputs and catalogs
//! - **JSON-First**: all types implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//! - **Degrading runs**: a failing frame is reported, the rest of the wall still runs
//!
//! ## Quick Start
//!
//! ```rust
//! use cerchiature_core::calculations::{intervention, InterventionInput, InterventionLimits};
//! use cerchiature_core::materials::{MaterialCatalog, ProfileCatalog};
//! use cerchiature_core::model::{Opening, WallGeometry};
//!
//! let masonry = MaterialCatalog::normative().lookup("mattoni_pieni")?.clone();
//! let input = InterventionInput::new(WallGeometry::new(500.0, 300.0, 30.0), masonry)
//!     .with_opening(Opening::rectangular(100.0, 0.0, 90.0, 210.0).existing());
//!
//! let result = intervention::verify(&input, &ProfileCatalog::standard(), &InterventionLimits::default());
//! assert!(result.is_local());
//! # Ok::<(), cerchiature_core::errors::CalcError>(())
//! ```
//!
//! ## Modules
//!
//! - [`project`] - Project container, metadata, and settings
//! - [`calculations`] - Masonry, frame, arch, connection and verification engines
//! - [`model`] - Wall, opening and reinforcement descriptions
//! - [`materials`] - Masonry table, steel profiles, concrete and rebar
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types
//! - [`file_io`] - File operations with atomic saves and locking

pub mod calculations;
pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod materials;
pub mod model;
pub mod project;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{CalculationResult, InterventionInput, InterventionLimits, VerificationResult};
pub use errors::{CalcError, CalcResult};
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_project, save_project, FileLock};
pub use project::{GlobalSettings, Project, ProjectMetadata};
