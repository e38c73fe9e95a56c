//! # Cyclic Stress Ratio
//!
//! Earthquake-induced cyclic demand at one depth by the simplified procedure.
//!
//! ## Procedure
//!
//! 1. σ_v0 = Σ γ_i · h_i over the layer stack
//! 2. u0 = γ_w · (z − z_w) below the water table, 0 above
//! 3. σ'_v0 = σ_v0 − u0 (must be positive)
//! 4. r_d = exp(α(z) + β(z) · M)
//! 5. CSR = 0.65 · (a_max/g) · (σ_v0/σ'_v0) · r_d
//!
//! ## Example
//!
//! ```rust
//! use liquefy_core::calculations::csr::{calculate, CsrInput, SoilLayer};
//!
//! let input = CsrInput {
//!     label: "BH-1 @ 8 m".to_string(),
//!     layers: vec![SoilLayer::new(18.0, 3.0), SoilLayer::new(19.5, 5.0)],
//!     depth_m: None,
//!     water_table_depth_m: 3.0,
//!     gamma_w_kn_m3: 9.81,
//!     amax_g: 0.333,
//!     magnitude: 7.5,
//! };
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.depth_m, 8.0);
//! assert!(result.csr > 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::demand::{
    cyclic_stress_ratio, hydrostatic_pore_pressure, stress_reduction_coefficient, total_vertical_stress,
};
use crate::equations::registry::{Equation, EquationTracker};
use crate::errors::{require_finite, require_non_negative, require_positive, CalcError, CalcResult};
use crate::settings::default_magnitude;

/// Unit weight of water (kN/m³)
pub const GAMMA_W: f64 = 9.81;

/// Default peak ground acceleration ratio a_max/g
pub const DEFAULT_AMAX_G: f64 = 0.333;

/// Default water table depth (m)
pub const DEFAULT_WATER_TABLE_M: f64 = 3.0;

/// Depth beyond which the r_d correlation is extrapolated (m)
pub const RD_MAX_DEPTH_M: f64 = 34.0;

fn default_gamma_w() -> f64 {
    GAMMA_W
}

fn default_amax_g() -> f64 {
    DEFAULT_AMAX_G
}

fn default_water_table() -> f64 {
    DEFAULT_WATER_TABLE_M
}

/// One soil layer above the check depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilLayer {
    /// Total unit weight γ (kN/m³)
    pub unit_weight_kn_m3: f64,
    /// Layer thickness h (m)
    pub thickness_m: f64,
}

impl SoilLayer {
    pub fn new(unit_weight_kn_m3: f64, thickness_m: f64) -> Self {
        Self {
            unit_weight_kn_m3,
            thickness_m,
        }
    }
}

/// Input parameters for a CSR calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "BH-1 @ 8 m",
///   "layers": [
///     { "unit_weight_kn_m3": 18.0, "thickness_m": 3.0 },
///     { "unit_weight_kn_m3": 19.5, "thickness_m": 5.0 }
///   ],
///   "water_table_depth_m": 3.0,
///   "amax_g": 0.25,
///   "magnitude": 7.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrInput {
    /// User label for this point
    pub label: String,

    /// Layers from the ground surface down to the check depth
    pub layers: Vec<SoilLayer>,

    /// Check depth z (m); defaults to the total layer thickness
    #[serde(default)]
    pub depth_m: Option<f64>,

    /// Water table depth below ground surface (m)
    #[serde(default = "default_water_table")]
    pub water_table_depth_m: f64,

    /// Unit weight of water (kN/m³)
    #[serde(default = "default_gamma_w")]
    pub gamma_w_kn_m3: f64,

    /// Peak horizontal ground acceleration ratio a_max/g
    #[serde(default = "default_amax_g")]
    pub amax_g: f64,

    /// Earthquake moment magnitude
    #[serde(default = "default_magnitude")]
    pub magnitude: f64,
}

impl CsrInput {
    /// Validate input parameters
    pub fn validate(&self) -> CalcResult<()> {
        if self.layers.is_empty() {
            return Err(CalcError::missing_field("layers"));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            require_non_negative(&format!("layers[{}].unit_weight_kn_m3", i), layer.unit_weight_kn_m3)?;
            require_non_negative(&format!("layers[{}].thickness_m", i), layer.thickness_m)?;
        }
        if let Some(depth) = self.depth_m {
            require_positive("depth_m", depth)?;
        }
        require_non_negative("water_table_depth_m", self.water_table_depth_m)?;
        require_positive("gamma_w_kn_m3", self.gamma_w_kn_m3)?;
        require_positive("amax_g", self.amax_g)?;
        require_finite("magnitude", self.magnitude)?;
        Ok(())
    }

    /// Check depth: the explicit value or the bottom of the layer stack
    pub fn check_depth_m(&self) -> f64 {
        self.depth_m
            .unwrap_or_else(|| self.layers.iter().map(|l| l.thickness_m).sum())
    }
}

/// Results of a CSR calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrResult {
    /// Check depth z (m)
    pub depth_m: f64,
    /// Total vertical stress σ_v0 (kPa)
    pub sigma_v0_kpa: f64,
    /// Hydrostatic pore pressure u0 (kPa)
    pub u0_kpa: f64,
    /// Effective vertical stress σ'_v0 (kPa)
    pub sigma_v0_eff_kpa: f64,
    /// Stress reduction coefficient r_d
    pub rd: f64,
    /// Cyclic stress ratio
    pub csr: f64,
    pub warnings: Vec<String>,
    pub equations: Vec<Equation>,
}

/// Calculate the cyclic stress ratio at one depth.
///
/// # Errors
///
/// `InvalidInput` when σ'_v0 ≤ 0 (no CSR is produced) or any input is out of
/// range; `MissingField` when no layers are given.
pub fn calculate(input: &CsrInput) -> CalcResult<CsrResult> {
    input.validate()?;

    let mut tracker = EquationTracker::new();
    let label = input.label.as_str();
    let depth = input.check_depth_m();
    require_positive("depth_m", depth)?;

    let sigma_v0 = total_vertical_stress(input.layers.iter().map(|l| (l.unit_weight_kn_m3, l.thickness_m)));
    let u0 = hydrostatic_pore_pressure(depth, input.water_table_depth_m, input.gamma_w_kn_m3);
    let sigma_v0_eff = sigma_v0 - u0;
    tracker.record_for_point(Equation::TotalVerticalStress, "demand", label);
    tracker.record_for_point(Equation::HydrostaticPorePressure, "demand", label);
    tracker.record_for_point(Equation::EffectiveVerticalStress, "demand", label);

    if sigma_v0_eff <= 0.0 {
        return Err(CalcError::invalid_input(
            "sigma_v0_eff_kpa",
            format!("{:.3}", sigma_v0_eff),
            "Effective vertical stress must be positive; check layers and water table",
        ));
    }

    let mut warnings = Vec::new();
    if depth > RD_MAX_DEPTH_M {
        let warning = format!(
            "Depth {:.1} m exceeds {:.0} m; r_d is extrapolated",
            depth, RD_MAX_DEPTH_M
        );
        tracing::warn!(label, "{}", warning);
        warnings.push(warning);
    }

    let rd = stress_reduction_coefficient(depth, input.magnitude);
    let csr = cyclic_stress_ratio(input.amax_g, sigma_v0, sigma_v0_eff, rd);
    tracker.record_for_point(Equation::StressReductionCoefficient, "demand", label);
    tracker.record_for_point(Equation::CyclicStressRatio, "demand", label);

    tracing::debug!(label, depth, sigma_v0, u0, rd, csr, "cyclic stress ratio");

    Ok(CsrResult {
        depth_m: depth,
        sigma_v0_kpa: sigma_v0,
        u0_kpa: u0,
        sigma_v0_eff_kpa: sigma_v0_eff,
        rd,
        csr,
        warnings,
        equations: tracker.unique_equations(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_csr() -> CsrInput {
        CsrInput {
            label: "Test CSR".to_string(),
            layers: vec![SoilLayer::new(18.0, 3.0), SoilLayer::new(20.0, 5.0)],
            depth_m: None,
            water_table_depth_m: 3.0,
            gamma_w_kn_m3: GAMMA_W,
            amax_g: 0.3,
            magnitude: 7.5,
        }
    }

    #[test]
    fn test_csr_layered_profile() {
        let result = calculate(&test_csr()).unwrap();
        assert_eq!(result.depth_m, 8.0);
        assert!((result.sigma_v0_kpa - 154.0).abs() < 1e-9);
        assert!((result.u0_kpa - 49.05).abs() < 1e-9);
        assert!((result.sigma_v0_eff_kpa - 104.95).abs() < 1e-9);
        let expected = 0.65 * 0.3 * (154.0 / 104.95) * stress_reduction_coefficient(8.0, 7.5);
        assert!((result.csr - expected).abs() < 1e-12);
        assert!(result.rd < 1.0);
        assert!(result.warnings.is_empty());
        assert_eq!(result.equations.len(), 5);
    }

    #[test]
    fn test_csr_above_water_table() {
        let input = CsrInput {
            depth_m: Some(2.0),
            ..test_csr()
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.u0_kpa, 0.0);
        assert_eq!(result.sigma_v0_kpa, result.sigma_v0_eff_kpa);
    }

    #[test]
    fn test_csr_non_positive_effective_stress() {
        // Light layer with a deep check point: u0 exceeds σ_v0
        let input = CsrInput {
            layers: vec![SoilLayer::new(5.0, 2.0)],
            depth_m: Some(10.0),
            water_table_depth_m: 0.0,
            ..test_csr()
        };
        let err = calculate(&input).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "sigma_v0_eff_kpa"));
    }

    #[test]
    fn test_csr_requires_layers() {
        let input = CsrInput {
            layers: vec![],
            ..test_csr()
        };
        assert_eq!(calculate(&input).unwrap_err(), CalcError::missing_field("layers"));
    }

    #[test]
    fn test_csr_rejects_bad_values() {
        let input = CsrInput {
            amax_g: 0.0,
            ..test_csr()
        };
        assert!(calculate(&input).is_err());
        let input = CsrInput {
            layers: vec![SoilLayer::new(-18.0, 3.0)],
            ..test_csr()
        };
        assert!(calculate(&input).is_err());
    }

    #[test]
    fn test_csr_deep_point_warns() {
        let input = CsrInput {
            layers: vec![SoilLayer::new(20.0, 40.0)],
            ..test_csr()
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_serialization_defaults() {
        let json = r#"{ "label": "P", "layers": [ { "unit_weight_kn_m3": 19.0, "thickness_m": 6.0 } ] }"#;
        let input: CsrInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.gamma_w_kn_m3, 9.81);
        assert_eq!(input.amax_g, 0.333);
        assert_eq!(input.water_table_depth_m, 3.0);
        assert_eq!(input.magnitude, 7.5);
        assert_eq!(input.check_depth_m(), 6.0);
    }
}
