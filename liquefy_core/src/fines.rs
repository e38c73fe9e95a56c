//! # Fines Content Resolution
//!
//! Fines content FC drives the clean-sand corrections of the CPT and SPT paths
//! and the limiting velocity of the Vs path. It is resolved exactly once per
//! calculation, before any iteration starts, from one of three sources:
//!
//! - a measured percentage (lab gradation),
//! - a known soil behaviour type index Ic,
//! - the CPT sounding itself (qt, fs, σ'vc), through Qtn, F and Ic.
//!
//! ## Example
//!
//! ```rust
//! use liquefy_core::equations::registry::EquationTracker;
//! use liquefy_core::fines::{resolve, FinesSource};
//!
//! let mut tracker = EquationTracker::new();
//! let estimate = resolve(&FinesSource::Measured { percent: 120.0 }, None, &mut tracker).unwrap();
//! assert_eq!(estimate.fines_content, 100.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::normalization::{
    fines_from_ic, friction_ratio, normalized_cone_resistance, soil_behavior_index,
};
use crate::equations::registry::{Equation, EquationTracker};
use crate::errors::{require_finite, require_non_negative, CalcError, CalcResult};

/// Where the fines content of a measurement point comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source")]
pub enum FinesSource {
    /// Measured fines content in percent (clamped to 0..=100)
    Measured { percent: f64 },
    /// Estimated from a known soil behaviour type index
    FromIc { ic: f64 },
    /// Estimated from the CPT sounding (requires sleeve friction)
    FromCptSounding,
}

impl Default for FinesSource {
    fn default() -> Self {
        FinesSource::Measured { percent: 0.0 }
    }
}

/// Raw CPT data needed to estimate Ic from the sounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CptSounding {
    /// Corrected cone tip resistance qt (kPa)
    pub qt_kpa: f64,
    /// Sleeve friction fs (kPa), if recorded
    pub fs_kpa: Option<f64>,
    /// Effective vertical consolidation stress σ'vc (kPa)
    pub sigma_vc_kpa: f64,
    /// Atmospheric pressure Pa (kPa)
    pub pa_kpa: f64,
    /// Stress exponent n* for Qtn
    pub n_star: f64,
}

/// Resolved fines content and the intermediate indices that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinesEstimate {
    /// Fines content used downstream (%)
    pub fines_content: f64,
    /// Soil behaviour type index, when FC was derived from it
    pub ic: Option<f64>,
    /// Normalized cone resistance, when computed from the sounding
    pub qtn: Option<f64>,
    /// Normalized friction ratio (%), when computed from the sounding
    pub friction_ratio: Option<f64>,
}

impl FinesEstimate {
    fn measured(percent: f64) -> Self {
        Self {
            fines_content: percent.clamp(0.0, 100.0),
            ic: None,
            qtn: None,
            friction_ratio: None,
        }
    }
}

/// Resolve the fines content for one measurement point.
///
/// `sounding` is `Some` only on the CPT path; [`FinesSource::FromCptSounding`]
/// without it is rejected as invalid input.
pub fn resolve(
    source: &FinesSource,
    sounding: Option<&CptSounding>,
    tracker: &mut EquationTracker,
) -> CalcResult<FinesEstimate> {
    match *source {
        FinesSource::Measured { percent } => {
            require_finite("fines.percent", percent)?;
            Ok(FinesEstimate::measured(percent))
        }
        FinesSource::FromIc { ic } => {
            require_non_negative("fines.ic", ic)?;
            tracker.record(Equation::FinesFromIc, "fines content");
            Ok(FinesEstimate {
                fines_content: fines_from_ic(ic),
                ic: Some(ic),
                qtn: None,
                friction_ratio: None,
            })
        }
        FinesSource::FromCptSounding => {
            let sounding = sounding.ok_or_else(|| {
                CalcError::invalid_input(
                    "fines.source",
                    "FromCptSounding",
                    "Sounding-based fines estimate is only available for CPT input",
                )
            })?;
            let fs = sounding.fs_kpa.ok_or_else(|| CalcError::missing_field("fs_kpa"))?;
            require_non_negative("fs_kpa", fs)?;

            let qtn = normalized_cone_resistance(
                sounding.qt_kpa,
                sounding.sigma_vc_kpa,
                sounding.pa_kpa,
                sounding.n_star,
            );
            let f = friction_ratio(sounding.qt_kpa, fs, sounding.sigma_vc_kpa);
            let ic = soil_behavior_index(qtn, f);
            let fines_content = fines_from_ic(ic);

            tracker.record(Equation::NormalizedConeResistance, "fines content");
            tracker.record(Equation::FrictionRatio, "fines content");
            tracker.record(Equation::SoilBehaviorIndex, "fines content");
            tracker.record(Equation::FinesFromIc, "fines content");
            tracing::debug!(qtn, f, ic, fines_content, "fines content estimated from sounding");

            Ok(FinesEstimate {
                fines_content,
                ic: Some(ic),
                qtn: Some(qtn),
                friction_ratio: Some(f),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sounding(fs: Option<f64>) -> CptSounding {
        CptSounding {
            qt_kpa: 5000.0,
            fs_kpa: fs,
            sigma_vc_kpa: 100.0,
            pa_kpa: 101.325,
            n_star: 0.5,
        }
    }

    #[test]
    fn test_measured_is_clamped() {
        let mut tracker = EquationTracker::new();
        let low = resolve(&FinesSource::Measured { percent: -3.0 }, None, &mut tracker).unwrap();
        assert_eq!(low.fines_content, 0.0);
        let mid = resolve(&FinesSource::Measured { percent: 35.0 }, None, &mut tracker).unwrap();
        assert_eq!(mid.fines_content, 35.0);
        assert!(mid.ic.is_none());
        assert!(tracker.usages().is_empty());
    }

    #[test]
    fn test_measured_rejects_nan() {
        let mut tracker = EquationTracker::new();
        let err = resolve(&FinesSource::Measured { percent: f64::NAN }, None, &mut tracker).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_from_ic() {
        let mut tracker = EquationTracker::new();
        let est = resolve(&FinesSource::FromIc { ic: 2.5 }, None, &mut tracker).unwrap();
        // 80 (2.5 - 0.07) - 137 = 57.4
        assert!((est.fines_content - 57.4).abs() < 1e-9);
        assert_eq!(est.ic, Some(2.5));
        assert_eq!(tracker.unique_equations(), vec![Equation::FinesFromIc]);
    }

    #[test]
    fn test_from_sounding() {
        let mut tracker = EquationTracker::new();
        let est = resolve(&FinesSource::FromCptSounding, Some(&sounding(Some(50.0))), &mut tracker).unwrap();
        assert!(est.qtn.unwrap() > 1.0);
        // F = 100 * 50 / 4900 ≈ 1.02 %
        assert!((est.friction_ratio.unwrap() - 100.0 * 50.0 / 4900.0).abs() < 1e-9);
        assert!((0.0..=100.0).contains(&est.fines_content));
        assert_eq!(tracker.unique_equations().len(), 4);
    }

    #[test]
    fn test_from_sounding_requires_fs() {
        let mut tracker = EquationTracker::new();
        let err = resolve(&FinesSource::FromCptSounding, Some(&sounding(None)), &mut tracker).unwrap_err();
        assert_eq!(err, CalcError::missing_field("fs_kpa"));
    }

    #[test]
    fn test_from_sounding_rejected_without_cpt() {
        let mut tracker = EquationTracker::new();
        let err = resolve(&FinesSource::FromCptSounding, None, &mut tracker).unwrap_err();
        assert!(err.is_input_error());
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_serde_tagging() {
        let json = r#"{ "source": "Measured", "percent": 12.5 }"#;
        let source: FinesSource = serde_json::from_str(json).unwrap();
        assert_eq!(source, FinesSource::Measured { percent: 12.5 });

        let source: FinesSource = serde_json::from_str(r#"{ "source": "FromCptSounding" }"#).unwrap();
        assert_eq!(source, FinesSource::FromCptSounding);
    }
}
