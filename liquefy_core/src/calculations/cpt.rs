//! # CPT Liquefaction Resistance
//!
//! Cyclic resistance of sandy soil from a cone penetration test at one depth.
//!
//! ## Procedure
//!
//! 1. Resolve fines content (measured, from Ic, or from the sounding)
//! 2. Iterate `m` and `qc1Ncs` to a fixed point
//! 3. Run the resistance pipeline on the converged `qc1Ncs`
//!
//! ## Example
//!
//! ```rust
//! use liquefy_core::calculations::cpt::{calculate, CptInput};
//! use liquefy_core::fines::FinesSource;
//! use liquefy_core::settings::AnalysisSettings;
//!
//! let input = CptInput {
//!     label: "CPT-1 @ 6.0 m".to_string(),
//!     qt_kpa: 8000.0,
//!     fs_kpa: None,
//!     sigma_vc_kpa: 80.0,
//!     sigma_v0_kpa: 80.0,
//!     fines: FinesSource::Measured { percent: 10.0 },
//!     magnitude: 7.5,
//!     msf_max_override: None,
//! };
//!
//! let result = calculate(&input, &AnalysisSettings::default()).unwrap();
//! assert!(result.converged);
//! assert!(result.resistance.crr > 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::resistance::{compute_resistance, ResistanceInput, ResistanceMethod, ResistanceResult};
use crate::calculations::solver::{solve, IterationSnapshot, NormalizationMethod, NormalizationPoint};
use crate::equations::normalization::{clamp_m, delta_qc1n, m_from_qc1ncs};
use crate::equations::registry::{Equation, EquationTracker};
use crate::errors::{require_finite, require_positive, CalcResult};
use crate::fines::{self, CptSounding, FinesEstimate, FinesSource};
use crate::settings::{default_magnitude, AnalysisSettings};

/// Input parameters for a CPT measurement point.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "CPT-1 @ 6.0 m",
///   "qt_kpa": 8000.0,
///   "fs_kpa": 60.0,
///   "sigma_vc_kpa": 80.0,
///   "sigma_v0_kpa": 80.0,
///   "fines": { "source": "FromCptSounding" },
///   "magnitude": 7.5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CptInput {
    /// User label for this point (e.g., "CPT-1 @ 6.0 m")
    pub label: String,

    /// Corrected cone tip resistance qt (kPa)
    pub qt_kpa: f64,

    /// Sleeve friction fs (kPa), required only for sounding-based fines
    #[serde(default)]
    pub fs_kpa: Option<f64>,

    /// Effective vertical consolidation stress σ'vc (kPa)
    pub sigma_vc_kpa: f64,

    /// Effective vertical stress σ'v0 (kPa)
    pub sigma_v0_kpa: f64,

    /// Fines content source
    #[serde(default)]
    pub fines: FinesSource,

    /// Earthquake moment magnitude
    #[serde(default = "default_magnitude")]
    pub magnitude: f64,

    /// Replaces the computed MSF_max when set
    #[serde(default)]
    pub msf_max_override: Option<f64>,
}

impl CptInput {
    /// Validate input parameters
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("qt_kpa", self.qt_kpa)?;
        require_positive("sigma_vc_kpa", self.sigma_vc_kpa)?;
        require_positive("sigma_v0_kpa", self.sigma_v0_kpa)?;
        require_finite("magnitude", self.magnitude)?;
        if let Some(fs) = self.fs_kpa {
            require_finite("fs_kpa", fs)?;
        }
        Ok(())
    }
}

/// Fixed-point strategy for qc1Ncs.
#[derive(Debug, Clone, Copy, Default)]
pub struct CptMethod;

impl NormalizationMethod for CptMethod {
    fn name(&self) -> &'static str {
        "CPT"
    }

    fn normalize(&self, qt_kpa: f64, c_n: f64, pa_kpa: f64) -> f64 {
        c_n * (qt_kpa / pa_kpa)
    }

    fn delta_correction(&self, qc1n: f64, fines_content: f64) -> f64 {
        delta_qc1n(qc1n, fines_content)
    }

    fn update_m(&self, qc1ncs: f64) -> f64 {
        clamp_m(m_from_qc1ncs(qc1ncs))
    }
}

/// Results of a CPT resistance calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CptResult {
    // === Fines ===
    /// Resolved fines content and the indices behind it
    pub fines: FinesEstimate,

    // === Normalization ===
    /// Converged stress exponent m
    pub m: f64,

    /// Clean-sand normalized cone resistance qc1Ncs
    pub qc1ncs: f64,

    /// Solver passes used
    pub iterations: usize,

    /// Whether the solver met its tolerance
    pub converged: bool,

    /// Pass-by-pass solver state
    pub trace: Vec<IterationSnapshot>,

    // === Resistance ===
    /// CRR_base, MSF, K_σ and the final CRR
    pub resistance: ResistanceResult,

    /// Conditions the user should know about (e.g., non-convergence)
    pub warnings: Vec<String>,

    /// Equations applied, in first-use order
    pub equations: Vec<Equation>,
}

impl CptResult {
    /// True when the result rests on a non-converged estimate
    pub fn is_provisional(&self) -> bool {
        !self.converged
    }
}

/// Calculate the cyclic resistance ratio for one CPT point.
///
/// # Errors
///
/// `InvalidInput` for non-positive stresses or resistance, invalid settings,
/// or a bad fines source; `MissingField` when sounding-based fines lack `fs_kpa`.
pub fn calculate(input: &CptInput, settings: &AnalysisSettings) -> CalcResult<CptResult> {
    settings.validate()?;
    input.validate()?;

    let pa = settings.atmospheric_pressure_kpa;
    let mut tracker = EquationTracker::new();

    let sounding = CptSounding {
        qt_kpa: input.qt_kpa,
        fs_kpa: input.fs_kpa,
        sigma_vc_kpa: input.sigma_vc_kpa,
        pa_kpa: pa,
        n_star: settings.solver.n_star.value(),
    };
    let fines = fines::resolve(&input.fines, Some(&sounding), &mut tracker)?;

    let point = NormalizationPoint {
        raw_index: input.qt_kpa,
        sigma_vc_kpa: input.sigma_vc_kpa,
        pa_kpa: pa,
        fines_content: fines.fines_content,
    };
    let outcome = solve(&CptMethod, &point, &settings.solver)?;
    for eq in [
        Equation::OverburdenNormalization,
        Equation::CptNormalizedResistance,
        Equation::CptFinesCorrection,
        Equation::CptStressExponent,
    ] {
        tracker.record_for_point(eq, "normalization solver", input.label.as_str());
    }

    let resistance = compute_resistance(&ResistanceInput {
        method: ResistanceMethod::Cpt,
        normalized_index: outcome.normalized_index,
        magnitude: input.magnitude,
        sigma_vc_kpa: input.sigma_vc_kpa,
        sigma_v0_kpa: input.sigma_v0_kpa,
        pa_kpa: pa,
        msf_max_override: input.msf_max_override,
        cap_crr_base: settings.cap_crr_base,
    })?;
    for eq in ResistanceMethod::Cpt.equations(input.msf_max_override.is_some()) {
        tracker.record_for_point(eq, "resistance", input.label.as_str());
    }

    let warnings: Vec<String> = outcome.provisional_warning().into_iter().collect();

    Ok(CptResult {
        fines,
        m: outcome.m,
        qc1ncs: outcome.normalized_index,
        iterations: outcome.iterations,
        converged: outcome.converged,
        trace: outcome.trace,
        resistance,
        warnings,
        equations: tracker.unique_equations(),
    })
}
