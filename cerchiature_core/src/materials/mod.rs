//! # Materials Database
//!
//! Read-only data sources consumed by the engines:
//!
//! - **Masonry**: NTC 2018 Tab. C8.5.I types plus custom entries, knowledge levels
//! - **Steel**: EN 10365 rolled profiles and structural steel grades
//! - **Concrete**: strength classes, reinforcing steel and bar notation
//!
//! ## Example
//!
//! ```rust
//! use cerchiature_core::materials::{MaterialCatalog, ProfileCatalog, ProfileFamily};
//!
//! let masonry = MaterialCatalog::normative();
//! let brick = masonry.lookup("mattoni_pieni")?;
//! assert_eq!(brick.fcm_mpa, 2.4);
//!
//! let profiles = ProfileCatalog::standard();
//! assert!(profiles.available_sizes(ProfileFamily::IPE).contains(&160));
//! # Ok::<(), cerchiature_core::errors::CalcError>(())
//! ```

pub mod concrete;
pub mod masonry;
pub mod steel;

pub use concrete::{ConcreteClass, RebarGrade, RebarSet, Stirrups};
pub use masonry::{CatalogEntry, KnowledgeLevel, MasonryCategory, MasonryMaterial, MaterialCatalog};
pub use steel::{ProfileCatalog, ProfileFamily, SteelGrade, SteelProfile};
