//! # Analysis Settings
//!
//! Configuration shared by every calculation: atmospheric pressure, the
//! CRR_base cap policy, and the fixed-point solver controls.
//!
//! All fields carry `#[serde(default)]`, so a partial JSON document only
//! overrides what it names:
//!
//! ```rust
//! use liquefy_core::settings::AnalysisSettings;
//!
//! let settings: AnalysisSettings =
//!     serde_json::from_str(r#"{ "solver": { "tolerance": 1e-6 } }"#).unwrap();
//! assert_eq!(settings.solver.tolerance, 1e-6);
//! assert_eq!(settings.solver.max_iterations, 200);
//! assert_eq!(settings.atmospheric_pressure_kpa, 101.325);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{require_finite, require_positive, CalcError, CalcResult};

/// Standard atmospheric pressure in kPa
pub const ATMOSPHERIC_PRESSURE_KPA: f64 = 101.325;

/// Default starting guess for the stress-normalization exponent m
pub const DEFAULT_INITIAL_M: f64 = 0.6;

/// Default convergence tolerance on successive m values
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Default iteration cap for the normalization solver
pub const DEFAULT_MAX_ITERATIONS: usize = 200;

/// Reference earthquake magnitude of the base resistance curves
pub const REFERENCE_MAGNITUDE: f64 = 7.5;

pub(crate) fn default_magnitude() -> f64 {
    REFERENCE_MAGNITUDE
}

pub(crate) fn default_unity() -> f64 {
    1.0
}

/// Settings applied to a whole analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Atmospheric pressure Pa in kPa (reference stress for normalization)
    pub atmospheric_pressure_kpa: f64,

    /// Cap every CRR_base at 1.0 before applying MSF and K_sigma.
    ///
    /// The uncapped value is always reported alongside.
    pub cap_crr_base: bool,

    /// Fixed-point solver controls for the CPT and SPT paths
    pub solver: SolverSettings,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            atmospheric_pressure_kpa: ATMOSPHERIC_PRESSURE_KPA,
            cap_crr_base: true,
            solver: SolverSettings::default(),
        }
    }
}

impl AnalysisSettings {
    /// Validate all settings.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("atmospheric_pressure_kpa", self.atmospheric_pressure_kpa)?;
        self.solver.validate()
    }
}

/// Controls for the normalization solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Initial guess for the stress exponent m
    pub initial_m: f64,

    /// Convergence tolerance on |m_new - m_prev|
    pub tolerance: f64,

    /// Maximum number of fixed-point iterations
    pub max_iterations: usize,

    /// Exponent n* used for the normalized cone resistance Qtn
    pub n_star: StressExponent,

    /// Clamp the SPT exponent update to [0.246, 0.782].
    ///
    /// One revision of the SPT procedure applied this clamp and another did
    /// not; extreme inputs converge differently depending on the choice.
    pub clamp_spt_m: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            initial_m: DEFAULT_INITIAL_M,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            n_star: StressExponent::Sand,
            clamp_spt_m: true,
        }
    }
}

impl SolverSettings {
    /// Validate solver controls.
    pub fn validate(&self) -> CalcResult<()> {
        require_finite("solver.initial_m", self.initial_m)?;
        require_positive("solver.tolerance", self.tolerance)?;
        if self.max_iterations == 0 {
            return Err(CalcError::invalid_input(
                "solver.max_iterations",
                "0",
                "At least one iteration is required",
            ));
        }
        Ok(())
    }
}

/// Stress exponent n* for Qtn normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StressExponent {
    /// n* = 0.5, typical for sands
    #[default]
    Sand,
    /// n* = 1.0, typical for clays
    Clay,
}

impl StressExponent {
    /// Numeric value of the exponent
    pub fn value(&self) -> f64 {
        match self {
            StressExponent::Sand => 0.5,
            StressExponent::Clay => 1.0,
        }
    }
}
