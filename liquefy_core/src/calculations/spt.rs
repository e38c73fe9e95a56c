//! # SPT Liquefaction Resistance
//!
//! Cyclic resistance of sandy soil from a standard penetration test at one
//! depth. The blow count must already be corrected to 60% hammer energy
//! (N60 = Nm · C_E · C_B · C_R · C_S); the rod, borehole and sampler
//! corrections are not recomputed here.
//!
//! ## Example
//!
//! ```rust
//! use liquefy_core::calculations::spt::{calculate, SptInput};
//! use liquefy_core::fines::FinesSource;
//! use liquefy_core::settings::AnalysisSettings;
//!
//! let input = SptInput {
//!     label: "BH-2 @ 4.5 m".to_string(),
//!     n60: 15.0,
//!     sigma_vc_kpa: 100.0,
//!     sigma_v0_kpa: 100.0,
//!     fines: FinesSource::Measured { percent: 5.0 },
//!     magnitude: 7.5,
//!     msf_max_override: None,
//! };
//!
//! let result = calculate(&input, &AnalysisSettings::default()).unwrap();
//! assert!(result.converged);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::resistance::{compute_resistance, ResistanceInput, ResistanceMethod, ResistanceResult};
use crate::calculations::solver::{solve, IterationSnapshot, NormalizationMethod, NormalizationPoint};
use crate::equations::normalization::{clamp_m, delta_n1_60, m_from_n1_60cs};
use crate::equations::registry::{Equation, EquationTracker};
use crate::errors::{require_finite, require_non_negative, require_positive, CalcResult};
use crate::fines::{self, FinesEstimate, FinesSource};
use crate::settings::{default_magnitude, AnalysisSettings};

/// Input parameters for an SPT measurement point.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "BH-2 @ 4.5 m",
///   "n60": 15.0,
///   "sigma_vc_kpa": 100.0,
///   "sigma_v0_kpa": 100.0,
///   "fines": { "source": "Measured", "percent": 5.0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SptInput {
    /// User label for this point
    pub label: String,

    /// Energy-corrected blow count N60 (blows/0.3 m)
    pub n60: f64,

    /// Effective vertical consolidation stress σ'vc (kPa)
    pub sigma_vc_kpa: f64,

    /// Effective vertical stress σ'v0 (kPa)
    pub sigma_v0_kpa: f64,

    /// Fines content source (sounding-based estimates are CPT only)
    #[serde(default)]
    pub fines: FinesSource,

    /// Earthquake moment magnitude
    #[serde(default = "default_magnitude")]
    pub magnitude: f64,

    /// Replaces the computed MSF_max when set
    #[serde(default)]
    pub msf_max_override: Option<f64>,
}

impl SptInput {
    /// Validate input parameters
    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("n60", self.n60)?;
        require_positive("sigma_vc_kpa", self.sigma_vc_kpa)?;
        require_positive("sigma_v0_kpa", self.sigma_v0_kpa)?;
        require_finite("magnitude", self.magnitude)?;
        Ok(())
    }
}

/// Fixed-point strategy for (N1)60cs.
#[derive(Debug, Clone, Copy)]
pub struct SptMethod {
    /// Clamp the exponent update to [0.246, 0.782]
    pub clamp_m: bool,
}

impl NormalizationMethod for SptMethod {
    fn name(&self) -> &'static str {
        "SPT"
    }

    fn normalize(&self, n60: f64, c_n: f64, _pa_kpa: f64) -> f64 {
        c_n * n60
    }

    fn delta_correction(&self, _n1_60: f64, fines_content: f64) -> f64 {
        delta_n1_60(fines_content)
    }

    fn update_m(&self, n1_60cs: f64) -> f64 {
        let m = m_from_n1_60cs(n1_60cs);
        if self.clamp_m {
            clamp_m(m)
        } else {
            m
        }
    }
}

/// Results of an SPT resistance calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SptResult {
    // === Fines ===
    pub fines: FinesEstimate,

    // === Normalization ===
    /// Converged stress exponent m
    pub m: f64,

    /// Clean-sand normalized blow count (N1)60cs
    pub n1_60cs: f64,

    /// Solver passes used
    pub iterations: usize,

    /// Whether the solver met its tolerance
    pub converged: bool,

    /// Whether the exponent update was clamped
    pub m_clamped: bool,

    /// Pass-by-pass solver state
    pub trace: Vec<IterationSnapshot>,

    // === Resistance ===
    pub resistance: ResistanceResult,

    /// Conditions the user should know about
    pub warnings: Vec<String>,

    /// Equations applied, in first-use order
    pub equations: Vec<Equation>,
}

impl SptResult {
    /// True when the result rests on a non-converged estimate
    pub fn is_provisional(&self) -> bool {
        !self.converged
    }
}

/// Calculate the cyclic resistance ratio for one SPT point.
pub fn calculate(input: &SptInput, settings: &AnalysisSettings) -> CalcResult<SptResult> {
    settings.validate()?;
    input.validate()?;

    let pa = settings.atmospheric_pressure_kpa;
    let mut tracker = EquationTracker::new();

    let fines = fines::resolve(&input.fines, None, &mut tracker)?;

    let method = SptMethod {
        clamp_m: settings.solver.clamp_spt_m,
    };
    if !method.clamp_m {
        tracing::debug!(label = %input.label, "SPT exponent clamp disabled");
    }

    let point = NormalizationPoint {
        raw_index: input.n60,
        sigma_vc_kpa: input.sigma_vc_kpa,
        pa_kpa: pa,
        fines_content: fines.fines_content,
    };
    let outcome = solve(&method, &point, &settings.solver)?;
    for eq in [
        Equation::OverburdenNormalization,
        Equation::SptNormalizedBlowCount,
        Equation::SptFinesCorrection,
        Equation::SptStressExponent,
    ] {
        tracker.record_for_point(eq, "normalization solver", input.label.as_str());
    }

    let resistance = compute_resistance(&ResistanceInput {
        method: ResistanceMethod::Spt,
        normalized_index: outcome.normalized_index,
        magnitude: input.magnitude,
        sigma_vc_kpa: input.sigma_vc_kpa,
        sigma_v0_kpa: input.sigma_v0_kpa,
        pa_kpa: pa,
        msf_max_override: input.msf_max_override,
        cap_crr_base: settings.cap_crr_base,
    })?;
    for eq in ResistanceMethod::Spt.equations(input.msf_max_override.is_some()) {
        tracker.record_for_point(eq, "resistance", input.label.as_str());
    }

    let warnings: Vec<String> = outcome.provisional_warning().into_iter().collect();

    Ok(SptResult {
        fines,
        m: outcome.m,
        n1_60cs: outcome.normalized_index,
        iterations: outcome.iterations,
        converged: outcome.converged,
        m_clamped: method.clamp_m,
        trace: outcome.trace,
        resistance,
        warnings,
        equations: tracker.unique_equations(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::normalization::{M_MAX, M_MIN};

    fn test_spt() -> SptInput {
        SptInput {
            label: "Test SPT".to_string(),
            n60: 15.0,
            sigma_vc_kpa: 100.0,
            sigma_v0_kpa: 100.0,
            fines: FinesSource::Measured { percent: 5.0 },
            magnitude: 7.5,
            msf_max_override: None,
        }
    }

    #[test]
    fn test_spt_converges_across_range() {
        for n60 in [5.0, 15.0, 30.0, 60.0] {
            let input = SptInput { n60, ..test_spt() };
            let result = calculate(&input, &AnalysisSettings::default()).unwrap();
            assert!(result.converged, "N60 = {} did not converge", n60);
            assert!(result.m >= M_MIN && result.m <= M_MAX);
            assert!(result.resistance.crr.is_finite() && result.resistance.crr > 0.0);
        }
    }

    #[test]
    fn test_spt_known_point() {
        // σ'vc ≈ Pa, FC = 5: Δ(N1)60 ≈ 0.1, so (N1)60cs ≈ 15.1
        let result = calculate(&test_spt(), &AnalysisSettings::default()).unwrap();
        assert!((result.n1_60cs - 15.1).abs() < 0.05, "n1_60cs = {}", result.n1_60cs);
        assert!((result.m - 0.4856).abs() < 1e-3, "m = {}", result.m);
        assert!(result.m_clamped);
    }

    #[test]
    fn test_spt_unclamped_exponent() {
        let mut settings = AnalysisSettings::default();
        settings.solver.clamp_spt_m = false;
        let input = SptInput { n60: 60.0, ..test_spt() };
        let result = calculate(&input, &settings).unwrap();
        assert!(!result.m_clamped);
        // 0.784 - 0.0768 sqrt(60.15) ≈ 0.188, below the clamp range
        assert!(result.m < M_MIN);

        let clamped = calculate(&input, &AnalysisSettings::default()).unwrap();
        assert_eq!(clamped.m, M_MIN);
    }

    #[test]
    fn test_spt_rejects_sounding_fines() {
        let input = SptInput {
            fines: FinesSource::FromCptSounding,
            ..test_spt()
        };
        let err = calculate(&input, &AnalysisSettings::default()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_spt_zero_stress_rejected() {
        let input = SptInput {
            sigma_vc_kpa: -5.0,
            ..test_spt()
        };
        assert!(calculate(&input, &AnalysisSettings::default()).is_err());
    }

    #[test]
    fn test_spt_equations_tracked() {
        let result = calculate(&test_spt(), &AnalysisSettings::default()).unwrap();
        assert!(result.equations.contains(&Equation::SptFinesCorrection));
        assert!(result.equations.contains(&Equation::SptMsfMax));
        assert!(!result.equations.contains(&Equation::CptBaseResistance));
    }

    #[test]
    fn test_serialization() {
        let input = test_spt();
        let json = serde_json::to_string(&input).unwrap();
        let roundtrip: SptInput = serde_json::from_str(&json).unwrap();
        assert_eq!(input, roundtrip);
    }
}
