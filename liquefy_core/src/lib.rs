//! # liquefy_core - Liquefaction Triggering Engine
//!
//! `liquefy_core` estimates a soil's resistance to earthquake-induced
//! liquefaction at a single measurement point. Cyclic demand (CSR) comes from
//! a layered soil profile; cyclic capacity (CRR) comes from CPT, SPT, DMT,
//! shear-wave velocity or clay correlations. All inputs and outputs are
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Auditable**: Every result lists the equations it applied
//!
//! ## Quick Start
//!
//! ```rust
//! use liquefy_core::calculations::spt::{self, SptInput};
//! use liquefy_core::fines::FinesSource;
//! use liquefy_core::settings::AnalysisSettings;
//!
//! let input = SptInput {
//!     label: "BH-1 @ 6 m".to_string(),
//!     n60: 12.0,
//!     sigma_vc_kpa: 75.0,
//!     sigma_v0_kpa: 75.0,
//!     fines: FinesSource::Measured { percent: 15.0 },
//!     magnitude: 7.0,
//!     msf_max_override: None,
//! };
//!
//! let result = spt::calculate(&input, &AnalysisSettings::default()).unwrap();
//! let json = serde_json::to_string_pretty(&result).unwrap();
//! assert!(json.contains("n1_60cs"));
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - CPT/SPT solver, resistance pipeline, DMT, Vs, clay and CSR
//! - [`equations`] - Closed-form correlations and the equation registry
//! - [`fines`] - Fines content resolution
//! - [`settings`] - Analysis and solver configuration
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod equations;
pub mod errors;
pub mod fines;
pub mod settings;

// Re-export commonly used types at crate root for convenience
pub use calculations::{AnalysisItem, AnalysisOutput};
pub use errors::{CalcError, CalcResult};
pub use fines::{FinesEstimate, FinesSource};
pub use settings::{AnalysisSettings, SolverSettings, StressExponent};
