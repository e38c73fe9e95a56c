//! # Liquefaction Calculations
//!
//! This module contains every analysis the engine performs at a single
//! measurement point. Each calculation follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results (JSON-serializable)
//! - `calculate(input, ...) -> Result<*Result, CalcError>` - Pure calculation function
//!
//! ## Available Calculations
//!
//! - [`cpt`] - Cone penetration test, iterative (m, qc1Ncs)
//! - [`spt`] - Standard penetration test, iterative (m, (N1)60cs)
//! - [`dmt`] - Flat dilatometer, closed form
//! - [`vs`] - Shear-wave velocity, closed form
//! - [`clay`] - Clay and plastic silt correlations
//! - [`csr`] - Cyclic stress ratio (demand)
//!
//! The CPT and SPT paths share [`solver`] and [`resistance`].

pub mod clay;
pub mod cpt;
pub mod csr;
pub mod dmt;
pub mod resistance;
pub mod solver;
pub mod spt;
pub mod vs;

use serde::{Deserialize, Serialize};

use crate::equations::registry::Equation;
use crate::errors::CalcResult;
use crate::settings::AnalysisSettings;

// Re-export commonly used types
pub use clay::{ClayInput, ClayMethod, ClayResult};
pub use cpt::{CptInput, CptResult};
pub use csr::{CsrInput, CsrResult, SoilLayer};
pub use dmt::{DmtInput, DmtResult};
pub use resistance::{compute_resistance, ResistanceInput, ResistanceMethod, ResistanceResult};
pub use solver::{solve, IterationSnapshot, NormalizationMethod, NormalizationPoint, SolverOutcome};
pub use spt::{SptInput, SptResult};
pub use vs::{VsInput, VsResult};

/// Enum wrapper for all calculation types.
///
/// Lets a caller hand over any single analysis as one JSON document:
///
/// ```json
/// { "type": "Spt", "label": "BH-2", "n60": 15.0, "sigma_vc_kpa": 100.0, "sigma_v0_kpa": 100.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnalysisItem {
    /// CPT-based resistance
    Cpt(CptInput),
    /// SPT-based resistance
    Spt(SptInput),
    /// DMT-based resistance
    Dmt(DmtInput),
    /// Shear-wave velocity resistance
    Vs(VsInput),
    /// Clay / plastic silt resistance
    Clay(ClayInput),
    /// Cyclic stress ratio
    Csr(CsrInput),
}

impl AnalysisItem {
    /// Get the user-provided label for this calculation
    pub fn label(&self) -> &str {
        match self {
            AnalysisItem::Cpt(i) => &i.label,
            AnalysisItem::Spt(i) => &i.label,
            AnalysisItem::Dmt(i) => &i.label,
            AnalysisItem::Vs(i) => &i.label,
            AnalysisItem::Clay(i) => &i.label,
            AnalysisItem::Csr(i) => &i.label,
        }
    }

    /// Get the calculation type as a string
    pub fn calc_type(&self) -> &'static str {
        match self {
            AnalysisItem::Cpt(_) => "CPT",
            AnalysisItem::Spt(_) => "SPT",
            AnalysisItem::Dmt(_) => "DMT",
            AnalysisItem::Vs(_) => "Vs",
            AnalysisItem::Clay(_) => "Clay",
            AnalysisItem::Csr(_) => "CSR",
        }
    }

    /// True for the resistance (capacity) analyses, false for CSR
    pub fn is_resistance(&self) -> bool {
        !matches!(self, AnalysisItem::Csr(_))
    }

    /// Run the calculation.
    pub fn run(&self, settings: &AnalysisSettings) -> CalcResult<AnalysisOutput> {
        Ok(match self {
            AnalysisItem::Cpt(i) => AnalysisOutput::Cpt(cpt::calculate(i, settings)?),
            AnalysisItem::Spt(i) => AnalysisOutput::Spt(spt::calculate(i, settings)?),
            AnalysisItem::Dmt(i) => AnalysisOutput::Dmt(dmt::calculate(i)?),
            AnalysisItem::Vs(i) => AnalysisOutput::Vs(vs::calculate(i, settings)?),
            AnalysisItem::Clay(i) => AnalysisOutput::Clay(clay::calculate(i, settings)?),
            AnalysisItem::Csr(i) => AnalysisOutput::Csr(csr::calculate(i)?),
        })
    }
}

/// Result of running an [`AnalysisItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnalysisOutput {
    Cpt(CptResult),
    Spt(SptResult),
    Dmt(DmtResult),
    Vs(VsResult),
    Clay(ClayResult),
    Csr(CsrResult),
}

impl AnalysisOutput {
    /// Final CRR, or `None` for a CSR result
    pub fn crr(&self) -> Option<f64> {
        match self {
            AnalysisOutput::Cpt(r) => Some(r.resistance.crr),
            AnalysisOutput::Spt(r) => Some(r.resistance.crr),
            AnalysisOutput::Dmt(r) => Some(r.crr),
            AnalysisOutput::Vs(r) => Some(r.crr),
            AnalysisOutput::Clay(r) => Some(r.crr),
            AnalysisOutput::Csr(_) => None,
        }
    }

    /// CSR, or `None` for a resistance result
    pub fn csr(&self) -> Option<f64> {
        match self {
            AnalysisOutput::Csr(r) => Some(r.csr),
            _ => None,
        }
    }

    /// Warnings raised while computing the result
    pub fn warnings(&self) -> &[String] {
        match self {
            AnalysisOutput::Cpt(r) => &r.warnings,
            AnalysisOutput::Spt(r) => &r.warnings,
            AnalysisOutput::Dmt(r) => &r.warnings,
            AnalysisOutput::Vs(r) => &r.warnings,
            AnalysisOutput::Clay(_) => &[],
            AnalysisOutput::Csr(r) => &r.warnings,
        }
    }

    /// Equations applied, in first-use order
    pub fn equations(&self) -> &[Equation] {
        match self {
            AnalysisOutput::Cpt(r) => &r.equations,
            AnalysisOutput::Spt(r) => &r.equations,
            AnalysisOutput::Dmt(r) => &r.equations,
            AnalysisOutput::Vs(r) => &r.equations,
            AnalysisOutput::Clay(r) => &r.equations,
            AnalysisOutput::Csr(r) => &r.equations,
        }
    }
}
