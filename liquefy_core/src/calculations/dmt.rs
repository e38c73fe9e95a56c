//! # DMT Liquefaction Resistance
//!
//! Non-iterative cyclic resistance from Marchetti flat dilatometer readings.
//! MSF and K_σ are supplied by the user rather than derived.
//!
//! ## Validity
//!
//! - 2 < K_D < 6
//! - I_D > 1.2 (sand-like behaviour)
//!
//! Points outside these limits are still evaluated, with a warning.

use serde::{Deserialize, Serialize};

use crate::calculations::resistance::validate_applied_factors;
use crate::equations::registry::{Equation, EquationTracker};
use crate::equations::resistance::{crr_base_dmt, horizontal_stress_index, material_index};
use crate::errors::{require_finite, require_positive, CalcError, CalcResult};
use crate::settings::default_unity;

/// Input parameters for a DMT measurement point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmtInput {
    /// User label for this point
    pub label: String,

    /// Corrected lift-off pressure p0 (kPa)
    pub p0_kpa: f64,

    /// Corrected expansion pressure p1 (kPa)
    pub p1_kpa: f64,

    /// Pore water pressure u0 (kPa)
    pub u0_kpa: f64,

    /// Effective vertical stress σ'v0 (kPa)
    pub sigma_v0_kpa: f64,

    /// Magnitude scaling factor applied to CRR_base
    #[serde(default = "default_unity")]
    pub msf: f64,

    /// Overburden correction factor applied to CRR_base
    #[serde(default = "default_unity")]
    pub k_sigma: f64,
}

impl DmtInput {
    /// Validate input parameters
    pub fn validate(&self) -> CalcResult<()> {
        require_finite("p0_kpa", self.p0_kpa)?;
        require_finite("p1_kpa", self.p1_kpa)?;
        require_finite("u0_kpa", self.u0_kpa)?;
        require_positive("sigma_v0_kpa", self.sigma_v0_kpa)?;
        if self.p0_kpa - self.u0_kpa <= 0.0 {
            return Err(CalcError::invalid_input(
                "p0_kpa",
                self.p0_kpa.to_string(),
                "Lift-off pressure must exceed pore pressure u0",
            ));
        }
        validate_applied_factors(self.msf, self.k_sigma)
    }
}

/// Results of a DMT resistance calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmtResult {
    /// Horizontal stress index K_D
    pub k_d: f64,
    /// Material index I_D
    pub i_d: f64,
    /// Base resistance for Mw 7.5, σ'v0 = 1 atm (capped at 1.0)
    pub crr_base: f64,
    pub msf: f64,
    pub k_sigma: f64,
    /// CRR = CRR_base × MSF × K_σ
    pub crr: f64,
    /// Applicability warnings
    pub warnings: Vec<String>,
    pub equations: Vec<Equation>,
}

/// Calculate the cyclic resistance ratio from DMT readings.
pub fn calculate(input: &DmtInput) -> CalcResult<DmtResult> {
    input.validate()?;

    let mut tracker = EquationTracker::new();

    let k_d = horizontal_stress_index(input.p0_kpa, input.p1_kpa, input.sigma_v0_kpa);
    let i_d = material_index(input.p0_kpa, input.p1_kpa, input.u0_kpa);
    tracker.record_for_point(Equation::HorizontalStressIndex, "DMT indices", input.label.as_str());
    tracker.record_for_point(Equation::MaterialIndex, "DMT indices", input.label.as_str());

    let mut warnings = Vec::new();
    if !(k_d > 2.0 && k_d < 6.0) {
        warnings.push(format!(
            "K_D = {:.4} is outside the recommended range 2 < K_D < 6; use with caution",
            k_d
        ));
    }
    if i_d <= 1.2 {
        warnings.push(format!(
            "I_D = {:.4} ≤ 1.2; the sand correlation may not apply to this soil",
            i_d
        ));
    }
    for warning in &warnings {
        tracing::warn!(label = %input.label, "{}", warning);
    }

    let crr_base = crr_base_dmt(k_d);
    let crr = crr_base * input.msf * input.k_sigma;
    tracker.record_for_point(Equation::DmtBaseResistance, "base resistance", input.label.as_str());
    tracker.record_for_point(Equation::CyclicResistanceRatio, "resistance", input.label.as_str());

    Ok(DmtResult {
        k_d,
        i_d,
        crr_base,
        msf: input.msf,
        k_sigma: input.k_sigma,
        crr,
        warnings,
        equations: tracker.unique_equations(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dmt() -> DmtInput {
        DmtInput {
            label: "DMT-1".to_string(),
            p0_kpa: 200.0,
            p1_kpa: 400.0,
            u0_kpa: 50.0,
            sigma_v0_kpa: 100.0,
            msf: 1.0,
            k_sigma: 1.0,
        }
    }

    #[test]
    fn test_dmt_reference_point() {
        let result = calculate(&test_dmt()).unwrap();
        assert_eq!(result.k_d, 2.0);
        assert!((result.crr_base - 0.3125).abs() < 1e-12);
        assert!((result.crr - 0.3125).abs() < 1e-12);
        assert!((result.i_d - 200.0 / 150.0).abs() < 1e-12);
        // K_D = 2 sits on the open boundary of the validity range
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("K_D"));
    }

    #[test]
    fn test_dmt_applied_factors() {
        let input = DmtInput {
            p1_kpa: 600.0,
            msf: 1.2,
            k_sigma: 0.9,
            ..test_dmt()
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.k_d, 4.0);
        // 93 (0.1)^2 + 0.08 = 1.01, capped
        assert_eq!(result.crr_base, 1.0);
        assert!((result.crr - 1.08).abs() < 1e-12);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_dmt_low_material_index_warns() {
        let input = DmtInput {
            p0_kpa: 300.0,
            p1_kpa: 550.0,
            u0_kpa: 50.0,
            ..test_dmt()
        };
        // K_D = 2.5, I_D = 250 / 250 = 1.0
        let result = calculate(&input).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("I_D"));
    }

    #[test]
    fn test_dmt_rejects_p0_below_u0() {
        let input = DmtInput {
            u0_kpa: 200.0,
            ..test_dmt()
        };
        let err = calculate(&input).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "p0_kpa"));
    }

    #[test]
    fn test_dmt_rejects_zero_stress() {
        let input = DmtInput {
            sigma_v0_kpa: 0.0,
            ..test_dmt()
        };
        assert!(calculate(&input).is_err());
    }

    #[test]
    fn test_serialization_defaults() {
        let json = r#"{ "label": "D", "p0_kpa": 200.0, "p1_kpa": 400.0, "u0_kpa": 50.0, "sigma_v0_kpa": 100.0 }"#;
        let input: DmtInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.msf, 1.0);
        assert_eq!(input.k_sigma, 1.0);
    }
}
