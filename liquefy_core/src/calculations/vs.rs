//! # Shear-Wave Velocity Liquefaction Resistance
//!
//! Non-iterative cyclic resistance from a measured shear-wave velocity, for
//! uncemented Holocene sands with limited fines. MSF and K_σ are supplied by
//! the user.
//!
//! ## Example
//!
//! ```rust
//! use liquefy_core::calculations::vs::{calculate, VsInput};
//! use liquefy_core::settings::AnalysisSettings;
//!
//! let input = VsInput {
//!     label: "SCPT-1 @ 5 m".to_string(),
//!     vs_mps: 180.0,
//!     sigma_v0_kpa: 100.0,
//!     fines_content_percent: 5.0,
//!     msf: 1.0,
//!     k_sigma: 1.0,
//! };
//! let result = calculate(&input, &AnalysisSettings::default()).unwrap();
//! assert_eq!(result.vs1_star_mps, 215.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::resistance::{capped_base, validate_applied_factors};
use crate::equations::registry::{Equation, EquationTracker};
use crate::equations::resistance::{corrected_shear_wave_velocity, crr_base_vs, limiting_shear_wave_velocity};
use crate::errors::{require_finite, require_non_negative, require_positive, CalcResult};
use crate::settings::{default_unity, AnalysisSettings};

/// Input parameters for a shear-wave velocity measurement point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VsInput {
    /// User label for this point
    pub label: String,

    /// Measured shear-wave velocity Vs (m/s)
    pub vs_mps: f64,

    /// Effective vertical stress σ'v0 (kPa)
    pub sigma_v0_kpa: f64,

    /// Fines content FC (%), clamped to 0..=100
    pub fines_content_percent: f64,

    /// Magnitude scaling factor applied to CRR_base
    #[serde(default = "default_unity")]
    pub msf: f64,

    /// Overburden correction factor applied to CRR_base
    #[serde(default = "default_unity")]
    pub k_sigma: f64,
}

impl VsInput {
    /// Validate input parameters
    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("vs_mps", self.vs_mps)?;
        require_positive("sigma_v0_kpa", self.sigma_v0_kpa)?;
        require_finite("fines_content_percent", self.fines_content_percent)?;
        validate_applied_factors(self.msf, self.k_sigma)
    }
}

/// Results of a shear-wave velocity resistance calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VsResult {
    /// Overburden-corrected velocity Vs1 (m/s)
    pub vs1_mps: f64,
    /// Limiting upper velocity Vs1* (m/s)
    pub vs1_star_mps: f64,
    /// True when 0 < Vs1 < Vs1* and the hyperbolic term was included
    pub hyperbolic_term_applied: bool,
    pub crr_base: f64,
    pub crr_base_uncapped: f64,
    pub msf: f64,
    pub k_sigma: f64,
    /// CRR = CRR_base × MSF × K_σ
    pub crr: f64,
    pub warnings: Vec<String>,
    pub equations: Vec<Equation>,
}

/// Calculate the cyclic resistance ratio from shear-wave velocity.
pub fn calculate(input: &VsInput, settings: &AnalysisSettings) -> CalcResult<VsResult> {
    settings.validate()?;
    input.validate()?;

    let mut tracker = EquationTracker::new();
    let fines_content = input.fines_content_percent.clamp(0.0, 100.0);

    let vs1 = corrected_shear_wave_velocity(input.vs_mps, settings.atmospheric_pressure_kpa, input.sigma_v0_kpa);
    let vs1_star = limiting_shear_wave_velocity(fines_content);
    tracker.record_for_point(Equation::CorrectedShearWaveVelocity, "Vs1", input.label.as_str());
    tracker.record_for_point(Equation::LimitingShearWaveVelocity, "Vs1*", input.label.as_str());

    let mut warnings = Vec::new();
    if vs1 >= vs1_star {
        let warning = format!(
            "Vs1 = {:.1} m/s ≥ Vs1* = {:.1} m/s; soil not expected to liquefy",
            vs1, vs1_star
        );
        tracing::warn!(label = %input.label, "{}", warning);
        warnings.push(warning);
    }

    let crr_base_uncapped = crr_base_vs(vs1, vs1_star);
    let crr_base = capped_base(crr_base_uncapped, settings.cap_crr_base);
    let crr = crr_base * input.msf * input.k_sigma;
    tracker.record_for_point(Equation::VsBaseResistance, "base resistance", input.label.as_str());
    tracker.record_for_point(Equation::CyclicResistanceRatio, "resistance", input.label.as_str());

    Ok(VsResult {
        vs1_mps: vs1,
        vs1_star_mps: vs1_star,
        hyperbolic_term_applied: vs1 > 0.0 && vs1 < vs1_star,
        crr_base,
        crr_base_uncapped,
        msf: input.msf,
        k_sigma: input.k_sigma,
        crr,
        warnings,
        equations: tracker.unique_equations(),
    })
}
