//! # Resistance Pipeline
//!
//! Converts a converged clean-sand index into the final cyclic resistance
//! ratio. The pipeline is a pure function of its input:
//!
//! ```text
//! CRR_base ─┐
//! MSF_max ──┼─> MSF ─┐
//! C_σ ──────┴─> K_σ ─┴─> CRR = CRR_base × MSF × K_σ
//! ```
//!
//! ## Example
//!
//! ```rust
//! use liquefy_core::calculations::resistance::{compute_resistance, ResistanceInput, ResistanceMethod};
//!
//! let input = ResistanceInput {
//!     method: ResistanceMethod::Cpt,
//!     normalized_index: 120.0,
//!     magnitude: 7.5,
//!     sigma_vc_kpa: 101.325,
//!     sigma_v0_kpa: 101.325,
//!     pa_kpa: 101.325,
//!     msf_max_override: None,
//!     cap_crr_base: true,
//! };
//! let result = compute_resistance(&input).unwrap();
//! assert!((result.msf - 1.0).abs() < 1e-3);
//! assert!((result.k_sigma - 1.0).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::registry::Equation;
use crate::equations::resistance::{
    c_sigma_cpt, c_sigma_spt, crr_base_cpt, crr_base_spt, magnitude_scaling_factor, msf_max_cpt,
    msf_max_spt, overburden_correction, CRR_BASE_CAP,
};
use crate::errors::{require_finite, require_positive, CalcResult};

/// Penetration test whose clean-sand index feeds the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResistanceMethod {
    /// Cone penetration test (index = qc1Ncs)
    Cpt,
    /// Standard penetration test (index = (N1)60cs)
    Spt,
}

impl ResistanceMethod {
    /// Base resistance for Mw 7.5 and σ'v0 = 1 atm (uncapped)
    pub fn crr_base(&self, index: f64) -> f64 {
        match self {
            ResistanceMethod::Cpt => crr_base_cpt(index),
            ResistanceMethod::Spt => crr_base_spt(index),
        }
    }

    /// MSF_max from the index (capped at 2.2)
    pub fn msf_max(&self, index: f64) -> f64 {
        match self {
            ResistanceMethod::Cpt => msf_max_cpt(index),
            ResistanceMethod::Spt => msf_max_spt(index),
        }
    }

    /// Overburden coefficient C_σ from the index (capped at 0.3)
    pub fn c_sigma(&self, index: f64) -> f64 {
        match self {
            ResistanceMethod::Cpt => c_sigma_cpt(index),
            ResistanceMethod::Spt => c_sigma_spt(index),
        }
    }

    /// Equations the pipeline applies for this method, in evaluation order.
    ///
    /// `MSF_max` is left out when an override replaces it.
    pub fn equations(&self, msf_max_overridden: bool) -> Vec<Equation> {
        let (base, msf_max, c_sigma) = match self {
            ResistanceMethod::Cpt => (
                Equation::CptBaseResistance,
                Equation::CptMsfMax,
                Equation::CptOverburdenCoefficient,
            ),
            ResistanceMethod::Spt => (
                Equation::SptBaseResistance,
                Equation::SptMsfMax,
                Equation::SptOverburdenCoefficient,
            ),
        };
        let mut eqs = vec![base];
        if !msf_max_overridden {
            eqs.push(msf_max);
        }
        eqs.extend([
            Equation::MagnitudeScalingFactor,
            c_sigma,
            Equation::OverburdenCorrectionFactor,
            Equation::CyclicResistanceRatio,
        ]);
        eqs
    }
}

/// Arguments of the resistance pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResistanceInput {
    /// Which correlations to use
    pub method: ResistanceMethod,
    /// Converged clean-sand index (qc1Ncs or (N1)60cs)
    pub normalized_index: f64,
    /// Earthquake moment magnitude
    pub magnitude: f64,
    /// Effective vertical consolidation stress σ'vc (kPa)
    pub sigma_vc_kpa: f64,
    /// Effective vertical stress σ'v0 (kPa)
    pub sigma_v0_kpa: f64,
    /// Atmospheric pressure Pa (kPa)
    pub pa_kpa: f64,
    /// Replaces the computed MSF_max when set
    pub msf_max_override: Option<f64>,
    /// Cap CRR_base at 1.0
    pub cap_crr_base: bool,
}

/// Output of the resistance pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResistanceResult {
    /// Base resistance used in the product (capped when configured)
    pub crr_base: f64,
    /// Base resistance straight from the correlation
    pub crr_base_uncapped: f64,
    /// Maximum magnitude scaling factor (computed or overridden)
    pub msf_max: f64,
    /// Magnitude scaling factor
    pub msf: f64,
    /// Overburden coefficient
    pub c_sigma: f64,
    /// Overburden correction factor
    pub k_sigma: f64,
    /// Final cyclic resistance ratio
    pub crr: f64,
}

/// Apply the optional 1.0 ceiling to a base resistance.
pub(crate) fn capped_base(crr_base_uncapped: f64, cap: bool) -> f64 {
    if cap {
        crr_base_uncapped.min(CRR_BASE_CAP)
    } else {
        crr_base_uncapped
    }
}

/// Check MSF and K_σ supplied directly by the user (DMT, Vs and clay paths).
pub(crate) fn validate_applied_factors(msf: f64, k_sigma: f64) -> CalcResult<()> {
    require_positive("msf", msf)?;
    require_positive("k_sigma", k_sigma)
}

/// Run the resistance pipeline.
///
/// # Errors
///
/// `InvalidInput` when the index, magnitude or override is not finite, or
/// when Pa is not positive. Degenerate C_σ and K_σ arguments fall back to
/// 0.3 and 1.0 instead of failing.
pub fn compute_resistance(input: &ResistanceInput) -> CalcResult<ResistanceResult> {
    require_finite("normalized_index", input.normalized_index)?;
    require_finite("magnitude", input.magnitude)?;
    require_finite("sigma_vc_kpa", input.sigma_vc_kpa)?;
    require_finite("sigma_v0_kpa", input.sigma_v0_kpa)?;
    require_positive("pa_kpa", input.pa_kpa)?;
    if let Some(msf_max) = input.msf_max_override {
        require_positive("msf_max_override", msf_max)?;
    }

    let index = input.normalized_index;
    let method = input.method;

    let crr_base_uncapped = method.crr_base(index);
    let crr_base = capped_base(crr_base_uncapped, input.cap_crr_base);

    let msf_max = input.msf_max_override.unwrap_or_else(|| method.msf_max(index));
    let msf = magnitude_scaling_factor(msf_max, input.magnitude);

    let c_sigma = method.c_sigma(index);
    let k_sigma = overburden_correction(c_sigma, input.sigma_vc_kpa, input.sigma_v0_kpa, input.pa_kpa);

    let crr = crr_base * msf * k_sigma;

    tracing::debug!(?method, index, crr_base, msf, k_sigma, crr, "resistance pipeline");

    Ok(ResistanceResult {
        crr_base,
        crr_base_uncapped,
        msf_max,
        msf,
        c_sigma,
        k_sigma,
        crr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::resistance::{C_SIGMA_CAP, K_SIGMA_CAP, MSF_MAX_CAP};

    fn input(method: ResistanceMethod, index: f64) -> ResistanceInput {
        ResistanceInput {
            method,
            normalized_index: index,
            magnitude: 7.5,
            sigma_vc_kpa: 100.0,
            sigma_v0_kpa: 100.0,
            pa_kpa: 101.325,
            msf_max_override: None,
            cap_crr_base: true,
        }
    }

    #[test]
    fn test_cpt_pipeline_product() {
        let result = compute_resistance(&input(ResistanceMethod::Cpt, 100.0)).unwrap();
        assert!((result.crr - result.crr_base * result.msf * result.k_sigma).abs() < 1e-15);
        assert!((result.crr_base - (-1.9856_f64).exp()).abs() < 1e-3);
        assert!((result.msf - 1.0).abs() < 1e-3);
        // σ'vc just below Pa gives K_σ slightly above 1
        assert!(result.k_sigma > 1.0 && result.k_sigma < 1.01);
    }

    #[test]
    fn test_caps_hold_for_dense_sand() {
        let result = compute_resistance(&input(ResistanceMethod::Spt, 60.0)).unwrap();
        assert_eq!(result.crr_base, CRR_BASE_CAP);
        assert!(result.crr_base_uncapped > CRR_BASE_CAP);
        assert_eq!(result.msf_max, MSF_MAX_CAP);
        assert_eq!(result.c_sigma, C_SIGMA_CAP);
        assert!(result.k_sigma <= K_SIGMA_CAP);
    }

    #[test]
    fn test_uncapped_base_when_disabled() {
        let mut i = input(ResistanceMethod::Spt, 60.0);
        i.cap_crr_base = false;
        let result = compute_resistance(&i).unwrap();
        assert_eq!(result.crr_base, result.crr_base_uncapped);
        assert!(result.crr_base > 1.0);
    }

    #[test]
    fn test_msf_override() {
        let mut i = input(ResistanceMethod::Cpt, 100.0);
        i.msf_max_override = Some(1.8);
        i.magnitude = 6.5;
        let result = compute_resistance(&i).unwrap();
        assert_eq!(result.msf_max, 1.8);
        assert!((result.msf - (1.0 + 0.8 * (8.64 * (-6.5_f64 / 4.0).exp() - 1.325))).abs() < 1e-12);
    }

    #[test]
    fn test_k_sigma_fallback_for_zero_sigma_v0() {
        let mut i = input(ResistanceMethod::Cpt, 100.0);
        i.sigma_v0_kpa = 0.0;
        let result = compute_resistance(&i).unwrap();
        assert_eq!(result.k_sigma, 1.0);
    }

    #[test]
    fn test_purity() {
        let i = input(ResistanceMethod::Spt, 18.3);
        let a = compute_resistance(&i).unwrap();
        let b = compute_resistance(&i).unwrap();
        assert_eq!(a.crr.to_bits(), b.crr.to_bits());
    }

    #[test]
    fn test_rejects_non_finite_index() {
        assert!(compute_resistance(&input(ResistanceMethod::Cpt, f64::NAN)).is_err());
        let mut i = input(ResistanceMethod::Cpt, 100.0);
        i.msf_max_override = Some(0.0);
        assert!(compute_resistance(&i).is_err());
    }

    #[test]
    fn test_equation_list() {
        let eqs = ResistanceMethod::Spt.equations(false);
        assert_eq!(eqs.first(), Some(&Equation::SptBaseResistance));
        assert_eq!(eqs.last(), Some(&Equation::CyclicResistanceRatio));
        assert!(!ResistanceMethod::Cpt.equations(true).contains(&Equation::CptMsfMax));
    }
}
