//! # Clay and Plastic Silt Cyclic Resistance
//!
//! Empirical cyclic resistance of fine-grained soils from one of three
//! indicators: CPT normalized resistance Qtn, DMT horizontal stress index
//! K_D, or the overconsolidation ratio. MSF and K_σ are supplied by the user.

use serde::{Deserialize, Serialize};

use crate::calculations::resistance::{capped_base, validate_applied_factors};
use crate::equations::normalization::normalized_cone_resistance;
use crate::equations::registry::{Equation, EquationTracker};
use crate::equations::resistance::{
    crr_base_clay_cpt, crr_base_clay_dmt, crr_base_clay_ocr, horizontal_stress_index,
};
use crate::errors::{require_finite, require_positive, CalcError, CalcResult};
use crate::settings::{default_unity, AnalysisSettings, StressExponent};

fn default_clay_exponent() -> StressExponent {
    StressExponent::Clay
}

/// Indicator used to estimate clay CRR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum ClayMethod {
    /// CRR = 0.053 · Qtn
    Cpt {
        qt_kpa: f64,
        sigma_vc_kpa: f64,
        #[serde(default = "default_clay_exponent")]
        n_star: StressExponent,
    },
    /// CRR = 0.074 · K_D^1.25
    Dmt {
        p0_kpa: f64,
        p1_kpa: f64,
        sigma_v0_kpa: f64,
    },
    /// CRR = 0.18 · OCR^0.8
    Ocr { ocr: f64 },
}

/// Input parameters for a clay / plastic silt point.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "Clay @ 8 m",
///   "method": { "method": "Ocr", "ocr": 2.0 },
///   "msf": 1.0,
///   "k_sigma": 1.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClayInput {
    /// User label for this point
    pub label: String,

    /// Which correlation to apply, with its measurements
    pub method: ClayMethod,

    /// Magnitude scaling factor applied to CRR_base
    #[serde(default = "default_unity")]
    pub msf: f64,

    /// Overburden correction factor applied to CRR_base
    #[serde(default = "default_unity")]
    pub k_sigma: f64,
}

impl ClayInput {
    /// Validate input parameters
    pub fn validate(&self) -> CalcResult<()> {
        match &self.method {
            ClayMethod::Cpt { qt_kpa, sigma_vc_kpa, .. } => {
                require_finite("qt_kpa", *qt_kpa)?;
                require_positive("sigma_vc_kpa", *sigma_vc_kpa)?;
            }
            ClayMethod::Dmt { p0_kpa, p1_kpa, sigma_v0_kpa } => {
                require_finite("p0_kpa", *p0_kpa)?;
                require_finite("p1_kpa", *p1_kpa)?;
                require_positive("sigma_v0_kpa", *sigma_v0_kpa)?;
                if p1_kpa < p0_kpa {
                    return Err(CalcError::invalid_input(
                        "p1_kpa",
                        p1_kpa.to_string(),
                        "Expansion pressure must not be below lift-off pressure (K_D < 0)",
                    ));
                }
            }
            ClayMethod::Ocr { ocr } => require_positive("ocr", *ocr)?,
        }
        validate_applied_factors(self.msf, self.k_sigma)
    }
}

/// Results of a clay resistance calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClayResult {
    /// The indicator value (Qtn, K_D or OCR)
    pub indicator: f64,
    pub crr_base: f64,
    pub crr_base_uncapped: f64,
    pub msf: f64,
    pub k_sigma: f64,
    /// CRR = CRR_base × MSF × K_σ
    pub crr: f64,
    pub equations: Vec<Equation>,
}

/// Calculate the cyclic resistance ratio of a clay / plastic silt.
pub fn calculate(input: &ClayInput, settings: &AnalysisSettings) -> CalcResult<ClayResult> {
    settings.validate()?;
    input.validate()?;

    let mut tracker = EquationTracker::new();
    let label = input.label.as_str();

    let (indicator, crr_base_uncapped) = match input.method {
        ClayMethod::Cpt { qt_kpa, sigma_vc_kpa, n_star } => {
            let qtn = normalized_cone_resistance(qt_kpa, sigma_vc_kpa, settings.atmospheric_pressure_kpa, n_star.value());
            tracker.record_for_point(Equation::NormalizedConeResistance, "Qtn", label);
            tracker.record_for_point(Equation::ClayCptResistance, "base resistance", label);
            (qtn, crr_base_clay_cpt(qtn))
        }
        ClayMethod::Dmt { p0_kpa, p1_kpa, sigma_v0_kpa } => {
            let k_d = horizontal_stress_index(p0_kpa, p1_kpa, sigma_v0_kpa);
            tracker.record_for_point(Equation::HorizontalStressIndex, "K_D", label);
            tracker.record_for_point(Equation::ClayDmtResistance, "base resistance", label);
            (k_d, crr_base_clay_dmt(k_d))
        }
        ClayMethod::Ocr { ocr } => {
            tracker.record_for_point(Equation::ClayOcrResistance, "base resistance", label);
            (ocr, crr_base_clay_ocr(ocr))
        }
    };

    let crr_base = capped_base(crr_base_uncapped, settings.cap_crr_base);
    let crr = crr_base * input.msf * input.k_sigma;
    tracker.record_for_point(Equation::CyclicResistanceRatio, "resistance", label);

    Ok(ClayResult {
        indicator,
        crr_base,
        crr_base_uncapped,
        msf: input.msf,
        k_sigma: input.k_sigma,
        crr,
        equations: tracker.unique_equations(),
    })
}
