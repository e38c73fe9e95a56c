//! # Equation Registry
//!
//! Central registry of every correlation used by the liquefaction engine.
//! Each equation has metadata including its literature reference, formula,
//! and variable definitions, so a reviewer can audit a result against the
//! published procedure.
//!
//! ## Usage
//!
//! ```rust
//! use liquefy_core::equations::registry::{Equation, EquationTracker};
//!
//! // Track equation usage during a calculation
//! let mut tracker = EquationTracker::new();
//! tracker.record(Equation::CptBaseResistance, "CRR_base");
//!
//! // Get metadata for a report
//! let meta = Equation::CptBaseResistance.metadata();
//! assert!(meta.formula_plain.contains("qc1Ncs/113"));
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

// ============================================================================
// Literature References
// ============================================================================

/// Reference to the publication or code clause an equation comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum CodeReference {
    /// Boulanger & Idriss (2014), CPT and SPT based liquefaction triggering procedures
    BoulangerIdriss2014 { equation: &'static str },
    /// Robertson (2009), Interpretation of cone penetration tests
    Robertson2009,
    /// Marchetti / Monaco DMT liquefaction correlations
    MonacoMarchetti2005,
    /// Andrus & Stokoe (2000), liquefaction resistance from shear-wave velocity
    AndrusStokoe2000,
    /// Empirical fine-grained (clay / plastic silt) correlations
    FineGrainedCorrelations,
    /// IS 1893 (Part 1) - Criteria for Earthquake Resistant Design of Structures
    IS1893 { year: u16, clause: &'static str },
    /// Fundamental soil mechanics (no specific reference needed)
    SoilMechanics,
}

impl CodeReference {
    /// Format the reference for display in reports
    pub fn citation(&self) -> String {
        match self {
            CodeReference::BoulangerIdriss2014 { equation } => {
                format!("Boulanger & Idriss (2014), Eq. {}", equation)
            }
            CodeReference::Robertson2009 => "Robertson (2009)".to_string(),
            CodeReference::MonacoMarchetti2005 => "Monaco et al. (2005), Marchetti (2016)".to_string(),
            CodeReference::AndrusStokoe2000 => "Andrus & Stokoe (2000)".to_string(),
            CodeReference::FineGrainedCorrelations => "Empirical clay / plastic silt correlations".to_string(),
            CodeReference::IS1893 { year, clause } => {
                format!("IS 1893 (Part 1): {}, {}", year, clause)
            }
            CodeReference::SoilMechanics => "Fundamental Soil Mechanics".to_string(),
        }
    }

    /// Short form for inline references
    pub fn short_form(&self) -> &'static str {
        match self {
            CodeReference::BoulangerIdriss2014 { .. } => "B&I 2014",
            CodeReference::Robertson2009 => "Robertson 2009",
            CodeReference::MonacoMarchetti2005 => "DMT",
            CodeReference::AndrusStokoe2000 => "A&S 2000",
            CodeReference::FineGrainedCorrelations => "Clay",
            CodeReference::IS1893 { .. } => "IS 1893",
            CodeReference::SoilMechanics => "Mechanics",
        }
    }
}

// ============================================================================
// Equation Categories
// ============================================================================

/// Categories for organizing equations in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquationCategory {
    /// Soil behaviour type and in-situ indices (Qtn, F, Ic, K_D, Vs1)
    InSituIndices,
    /// Stress normalization and fines correction (C_N, Δ, m)
    Normalization,
    /// Base cyclic resistance for Mw 7.5, σ'v0 = 1 atm
    BaseResistance,
    /// Magnitude scaling (MSF_max, MSF)
    MagnitudeScaling,
    /// Overburden correction (C_σ, K_σ)
    OverburdenCorrection,
    /// Final CRR assembly
    ResistanceAssembly,
    /// Seismic demand (stresses, r_d, CSR)
    SeismicDemand,
}

impl EquationCategory {
    /// Display name for the category
    pub fn display_name(&self) -> &'static str {
        match self {
            EquationCategory::InSituIndices => "In-Situ Indices",
            EquationCategory::Normalization => "Normalization",
            EquationCategory::BaseResistance => "Base Resistance",
            EquationCategory::MagnitudeScaling => "Magnitude Scaling",
            EquationCategory::OverburdenCorrection => "Overburden Correction",
            EquationCategory::ResistanceAssembly => "Resistance Assembly",
            EquationCategory::SeismicDemand => "Seismic Demand",
        }
    }

    /// Sort order for reports (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            EquationCategory::SeismicDemand => 1,
            EquationCategory::InSituIndices => 2,
            EquationCategory::Normalization => 3,
            EquationCategory::BaseResistance => 4,
            EquationCategory::MagnitudeScaling => 5,
            EquationCategory::OverburdenCorrection => 6,
            EquationCategory::ResistanceAssembly => 7,
        }
    }
}

// ============================================================================
// Variable Definition
// ============================================================================

/// Definition of a variable used in an equation.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Symbol (e.g., "qt", "σ'vc", "FC")
    pub symbol: &'static str,
    /// Description
    pub description: &'static str,
    /// Units (e.g., "kPa", "%", "m/s", "-")
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }
}

// ============================================================================
// Equation Metadata
// ============================================================================

/// Complete metadata for a registered equation.
#[derive(Debug, Clone)]
pub struct EquationMetadata {
    /// Human-readable name
    pub name: &'static str,
    /// Brief description of what this equation calculates
    pub description: &'static str,
    /// The formula in plain text
    pub formula_plain: &'static str,
    /// Literature reference
    pub reference: CodeReference,
    /// Variable definitions
    pub variables: Vec<Variable>,
    /// Assumptions or limitations
    pub assumptions: Vec<&'static str>,
    /// Category for grouping
    pub category: EquationCategory,
    /// Source module where the equation implementation lives
    pub source_module: &'static str,
    /// Function name implementing the equation
    pub source_function: &'static str,
}

// ============================================================================
// Equation Enum
// ============================================================================

/// All equations used by the liquefaction engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Equation {
    // -------------------------------------------------------------------------
    // In-situ indices
    // -------------------------------------------------------------------------
    /// Qtn = ((qt - σ'vc)/Pa)(Pa/σ'vc)^n
    NormalizedConeResistance,
    /// F = 100 fs / (qt - σ'vc)
    FrictionRatio,
    /// Ic = sqrt((3.47 - log Qtn)² + (1.22 + log F)²)
    SoilBehaviorIndex,
    /// FC = 80 (Ic + C_FC) - 137
    FinesFromIc,
    /// K_D = (p1 - p0)/σ'v0
    HorizontalStressIndex,
    /// I_D = (p1 - p0)/(p0 - u0)
    MaterialIndex,
    /// Vs1 = (Pa/σ'v0)^0.25 Vs
    CorrectedShearWaveVelocity,
    /// Vs1* from FC
    LimitingShearWaveVelocity,

    // -------------------------------------------------------------------------
    // Normalization
    // -------------------------------------------------------------------------
    /// C_N = (Pa/σ'vc)^m ≤ 1.7
    OverburdenNormalization,
    /// qc1N = C_N qt/Pa
    CptNormalizedResistance,
    /// (N1)60 = C_N N60
    SptNormalizedBlowCount,
    /// Δqc1N fines correction
    CptFinesCorrection,
    /// Δ(N1)60 fines correction
    SptFinesCorrection,
    /// m = 1.338 - 0.249 qc1Ncs^0.264
    CptStressExponent,
    /// m = 0.784 - 0.0768 sqrt((N1)60cs)
    SptStressExponent,

    // -------------------------------------------------------------------------
    // Base resistance
    // -------------------------------------------------------------------------
    /// CRR_base from qc1Ncs
    CptBaseResistance,
    /// CRR_base from (N1)60cs
    SptBaseResistance,
    /// CRR_base from K_D
    DmtBaseResistance,
    /// CRR_base from Vs1
    VsBaseResistance,
    /// 0.053 Qtn
    ClayCptResistance,
    /// 0.074 K_D^1.25
    ClayDmtResistance,
    /// 0.18 OCR^0.8
    ClayOcrResistance,

    // -------------------------------------------------------------------------
    // Magnitude scaling
    // -------------------------------------------------------------------------
    /// MSF_max = 1.09 (qc1Ncs/180)³ ≤ 2.2
    CptMsfMax,
    /// MSF_max = 1.09 ((N1)60cs/31.5)² ≤ 2.2
    SptMsfMax,
    /// MSF = 1 + (MSF_max - 1)(8.64 exp(-M/4) - 1.325)
    MagnitudeScalingFactor,

    // -------------------------------------------------------------------------
    // Overburden correction
    // -------------------------------------------------------------------------
    /// C_σ = 1/(37.3 - 8.27 qc1Ncs^0.264) ≤ 0.3
    CptOverburdenCoefficient,
    /// C_σ = 1/(18.9 - 2.55 sqrt((N1)60cs)) ≤ 0.3
    SptOverburdenCoefficient,
    /// K_σ = 1 - C_σ ln(σ'vc/Pa) ≤ 1.1
    OverburdenCorrectionFactor,

    // -------------------------------------------------------------------------
    // Assembly
    // -------------------------------------------------------------------------
    /// CRR = CRR_base MSF K_σ
    CyclicResistanceRatio,

    // -------------------------------------------------------------------------
    // Seismic demand
    // -------------------------------------------------------------------------
    /// σ_v0 = Σ γ_i h_i
    TotalVerticalStress,
    /// u0 = γ_w (z - z_w)
    HydrostaticPorePressure,
    /// σ'_v0 = σ_v0 - u0
    EffectiveVerticalStress,
    /// r_d = exp(α(z) + β(z) M)
    StressReductionCoefficient,
    /// CSR = 0.65 (a_max/g)(σ_v0/σ'_v0) r_d
    CyclicStressRatio,
}

impl Equation {
    /// Get the full metadata for this equation
    pub fn metadata(&self) -> EquationMetadata {
        match self {
            // In-situ indices
            Equation::NormalizedConeResistance => EquationMetadata {
                name: "Normalized Cone Resistance",
                description: "Dimensionless cone tip resistance used for soil behaviour type classification",
                formula_plain: "Qtn = ((qt - σ'vc) / Pa) * (Pa / σ'vc)^n",
                reference: CodeReference::Robertson2009,
                variables: vec![
                    Variable::new("qt", "Corrected cone tip resistance", "kPa"),
                    Variable::new("σ'vc", "Effective vertical consolidation stress", "kPa"),
                    Variable::new("Pa", "Atmospheric pressure", "kPa"),
                    Variable::new("n", "Stress exponent (0.5 sand, 1.0 clay)", "-"),
                ],
                assumptions: vec!["Qtn replaced by 1e-9 when qt ≤ σ'vc"],
                category: EquationCategory::InSituIndices,
                source_module: "equations/normalization.rs",
                source_function: "normalized_cone_resistance",
            },

            Equation::FrictionRatio => EquationMetadata {
                name: "Normalized Friction Ratio",
                description: "Sleeve friction relative to net cone resistance",
                formula_plain: "F = 100 * fs / (qt - σ'vc)",
                reference: CodeReference::Robertson2009,
                variables: vec![
                    Variable::new("F", "Friction ratio", "%"),
                    Variable::new("fs", "Sleeve friction", "kPa"),
                    Variable::new("qt", "Corrected cone tip resistance", "kPa"),
                ],
                assumptions: vec!["F replaced by 1e-9 when qt ≤ σ'vc"],
                category: EquationCategory::InSituIndices,
                source_module: "equations/normalization.rs",
                source_function: "friction_ratio",
            },

            Equation::SoilBehaviorIndex => EquationMetadata {
                name: "Soil Behaviour Type Index",
                description: "Radius of the soil behaviour type chart circle through (F, Qtn)",
                formula_plain: "Ic = sqrt((3.47 - log Qtn)^2 + (1.22 + log F)^2)",
                reference: CodeReference::Robertson2009,
                variables: vec![
                    Variable::new("Ic", "Soil behaviour type index", "-"),
                    Variable::new("Qtn", "Normalized cone resistance", "-"),
                    Variable::new("F", "Friction ratio", "%"),
                ],
                assumptions: vec!["log of a non-positive value taken as -10"],
                category: EquationCategory::InSituIndices,
                source_module: "equations/normalization.rs",
                source_function: "soil_behavior_index",
            },

            Equation::FinesFromIc => EquationMetadata {
                name: "Fines Content from Ic",
                description: "Fines content estimated from the soil behaviour type index",
                formula_plain: "FC = 80 * (Ic + C_FC) - 137, 0 ≤ FC ≤ 100",
                reference: CodeReference::BoulangerIdriss2014 { equation: "2.29" },
                variables: vec![
                    Variable::new("FC", "Fines content", "%"),
                    Variable::new("C_FC", "Fitting parameter (-0.07)", "-"),
                ],
                assumptions: vec!["Generic correlation without site-specific calibration"],
                category: EquationCategory::InSituIndices,
                source_module: "equations/normalization.rs",
                source_function: "fines_from_ic",
            },

            Equation::HorizontalStressIndex => EquationMetadata {
                name: "DMT Horizontal Stress Index",
                description: "Lift-off to expansion pressure difference normalized by effective stress",
                formula_plain: "K_D = (p1 - p0) / σ'v0",
                reference: CodeReference::MonacoMarchetti2005,
                variables: vec![
                    Variable::new("p0", "Lift-off pressure", "kPa"),
                    Variable::new("p1", "Expansion pressure", "kPa"),
                    Variable::new("σ'v0", "Effective vertical stress", "kPa"),
                ],
                assumptions: vec!["Correlation valid for 2 < K_D < 6"],
                category: EquationCategory::InSituIndices,
                source_module: "equations/resistance.rs",
                source_function: "horizontal_stress_index",
            },

            Equation::MaterialIndex => EquationMetadata {
                name: "DMT Material Index",
                description: "Soil type indicator from dilatometer readings",
                formula_plain: "I_D = (p1 - p0) / (p0 - u0)",
                reference: CodeReference::MonacoMarchetti2005,
                variables: vec![
                    Variable::new("I_D", "Material index", "-"),
                    Variable::new("u0", "Pore water pressure", "kPa"),
                ],
                assumptions: vec!["Sand-like behaviour for I_D > 1.2"],
                category: EquationCategory::InSituIndices,
                source_module: "equations/resistance.rs",
                source_function: "material_index",
            },

            Equation::CorrectedShearWaveVelocity => EquationMetadata {
                name: "Overburden-Corrected Shear-Wave Velocity",
                description: "Shear-wave velocity normalized to one atmosphere",
                formula_plain: "Vs1 = (Pa / σ'v0)^0.25 * Vs",
                reference: CodeReference::AndrusStokoe2000,
                variables: vec![
                    Variable::new("Vs", "Measured shear-wave velocity", "m/s"),
                    Variable::new("Vs1", "Corrected shear-wave velocity", "m/s"),
                ],
                assumptions: vec![],
                category: EquationCategory::InSituIndices,
                source_module: "equations/resistance.rs",
                source_function: "corrected_shear_wave_velocity",
            },

            Equation::LimitingShearWaveVelocity => EquationMetadata {
                name: "Limiting Shear-Wave Velocity",
                description: "Upper Vs1 above which liquefaction is not expected",
                formula_plain: "Vs1* = 215 for FC ≥ 5; Vs1* = 200 + 15 (35 - FC)/30 for FC < 5",
                reference: CodeReference::AndrusStokoe2000,
                variables: vec![
                    Variable::new("Vs1*", "Limiting upper Vs1", "m/s"),
                    Variable::new("FC", "Fines content", "%"),
                ],
                assumptions: vec![],
                category: EquationCategory::InSituIndices,
                source_module: "equations/resistance.rs",
                source_function: "limiting_shear_wave_velocity",
            },

            // Normalization
            Equation::OverburdenNormalization => EquationMetadata {
                name: "Overburden Normalization Factor",
                description: "Factor normalizing penetration resistance to one atmosphere",
                formula_plain: "C_N = (Pa / σ'vc)^m ≤ 1.7",
                reference: CodeReference::BoulangerIdriss2014 { equation: "2.15" },
                variables: vec![
                    Variable::new("C_N", "Normalization factor", "-"),
                    Variable::new("m", "Stress exponent", "-"),
                ],
                assumptions: vec!["Capped at 1.7"],
                category: EquationCategory::Normalization,
                source_module: "equations/normalization.rs",
                source_function: "overburden_factor",
            },

            Equation::CptNormalizedResistance => EquationMetadata {
                name: "Normalized Cone Tip Resistance",
                description: "Overburden-normalized dimensionless cone resistance",
                formula_plain: "qc1N = C_N * qt / Pa",
                reference: CodeReference::BoulangerIdriss2014 { equation: "2.4" },
                variables: vec![
                    Variable::new("qc1N", "Normalized cone resistance", "-"),
                    Variable::new("qt", "Cone tip resistance", "kPa"),
                ],
                assumptions: vec![],
                category: EquationCategory::Normalization,
                source_module: "calculations/cpt.rs",
                source_function: "CptMethod::normalize",
            },

            Equation::SptNormalizedBlowCount => EquationMetadata {
                name: "Normalized SPT Blow Count",
                description: "Overburden-normalized, energy-corrected blow count",
                formula_plain: "(N1)60 = C_N * N60",
                reference: CodeReference::BoulangerIdriss2014 { equation: "2.6" },
                variables: vec![
                    Variable::new("N60", "Blow count at 60% hammer energy", "blows/0.3 m"),
                    Variable::new("(N1)60", "Normalized blow count", "blows/0.3 m"),
                ],
                assumptions: vec!["N60 already includes C_E, C_R, C_B and C_S"],
                category: EquationCategory::Normalization,
                source_module: "calculations/spt.rs",
                source_function: "SptMethod::normalize",
            },

            Equation::CptFinesCorrection => EquationMetadata {
                name: "CPT Fines Correction",
                description: "Increment converting qc1N to the clean-sand equivalent qc1Ncs",
                formula_plain: "Δqc1N = (11.9 + qc1N/14.6) * exp(1.63 - 9.7/(FC+2) - (15.7/(FC+2))^2)",
                reference: CodeReference::BoulangerIdriss2014 { equation: "2.22" },
                variables: vec![
                    Variable::new("Δqc1N", "Fines correction", "-"),
                    Variable::new("FC", "Fines content", "%"),
                ],
                assumptions: vec![],
                category: EquationCategory::Normalization,
                source_module: "equations/normalization.rs",
                source_function: "delta_qc1n",
            },

            Equation::SptFinesCorrection => EquationMetadata {
                name: "SPT Fines Correction",
                description: "Increment converting (N1)60 to the clean-sand equivalent (N1)60cs",
                formula_plain: "Δ(N1)60 = exp(1.63 + 9.7/(FC+0.01) - (15.7/(FC+0.01))^2)",
                reference: CodeReference::BoulangerIdriss2014 { equation: "2.23" },
                variables: vec![
                    Variable::new("Δ(N1)60", "Fines correction", "blows/0.3 m"),
                    Variable::new("FC", "Fines content", "%"),
                ],
                assumptions: vec!["Zero when FC + 0.01 ≤ 0"],
                category: EquationCategory::Normalization,
                source_module: "equations/normalization.rs",
                source_function: "delta_n1_60",
            },

            Equation::CptStressExponent => EquationMetadata {
                name: "CPT Stress Exponent",
                description: "Normalization exponent as a function of the clean-sand cone resistance",
                formula_plain: "m = 1.338 - 0.249 * qc1Ncs^0.264, 0.246 ≤ m ≤ 0.782",
                reference: CodeReference::BoulangerIdriss2014 { equation: "2.15b" },
                variables: vec![
                    Variable::new("m", "Stress exponent", "-"),
                    Variable::new("qc1Ncs", "Clean-sand normalized cone resistance", "-"),
                ],
                assumptions: vec!["Clamped to the fitted range"],
                category: EquationCategory::Normalization,
                source_module: "equations/normalization.rs",
                source_function: "m_from_qc1ncs",
            },

            Equation::SptStressExponent => EquationMetadata {
                name: "SPT Stress Exponent",
                description: "Normalization exponent as a function of the clean-sand blow count",
                formula_plain: "m = 0.784 - 0.0768 * sqrt((N1)60cs)",
                reference: CodeReference::BoulangerIdriss2014 { equation: "2.15c" },
                variables: vec![
                    Variable::new("m", "Stress exponent", "-"),
                    Variable::new("(N1)60cs", "Clean-sand normalized blow count", "blows/0.3 m"),
                ],
                assumptions: vec!["Clamp to 0.246 ≤ m ≤ 0.782 is configurable"],
                category: EquationCategory::Normalization,
                source_module: "equations/normalization.rs",
                source_function: "m_from_n1_60cs",
            },

            // Base resistance
            Equation::CptBaseResistance => EquationMetadata {
                name: "CPT Base Cyclic Resistance",
                description: "CRR for Mw 7.5 and σ'v0 = 1 atm from qc1Ncs",
                formula_plain: "CRR = exp(qc1Ncs/113 + (qc1Ncs/1000)^2 - (qc1Ncs/140)^3 + (qc1Ncs/137)^4 - 2.8)",
                reference: CodeReference::BoulangerIdriss2014 { equation: "2.24" },
                variables: vec![
                    Variable::new("CRR", "Cyclic resistance ratio", "-"),
                    Variable::new("qc1Ncs", "Clean-sand normalized cone resistance", "-"),
                ],
                assumptions: vec!["Capped at 1.0 unless the cap is disabled"],
                category: EquationCategory::BaseResistance,
                source_module: "equations/resistance.rs",
                source_function: "crr_base_cpt",
            },

            Equation::SptBaseResistance => EquationMetadata {
                name: "SPT Base Cyclic Resistance",
                description: "CRR for Mw 7.5 and σ'v0 = 1 atm from (N1)60cs",
                formula_plain: "CRR = exp(-2.8 + N/14.1 + (N/126)^2 - (N/23.6)^3 + (N/25.4)^4)",
                reference: CodeReference::BoulangerIdriss2014 { equation: "2.25" },
                variables: vec![
                    Variable::new("CRR", "Cyclic resistance ratio", "-"),
                    Variable::new("N", "(N1)60cs", "blows/0.3 m"),
                ],
                assumptions: vec!["Capped at 1.0 unless the cap is disabled"],
                category: EquationCategory::BaseResistance,
                source_module: "equations/resistance.rs",
                source_function: "crr_base_spt",
            },

            Equation::DmtBaseResistance => EquationMetadata {
                name: "DMT Base Cyclic Resistance",
                description: "CRR for clean sands from the horizontal stress index",
                formula_plain: "CRR = 93 * (0.025 * K_D)^2 + 0.08 ≤ 1.0",
                reference: CodeReference::MonacoMarchetti2005,
                variables: vec![
                    Variable::new("CRR", "Cyclic resistance ratio", "-"),
                    Variable::new("K_D", "Horizontal stress index", "-"),
                ],
                assumptions: vec!["2 < K_D < 6", "I_D > 1.2"],
                category: EquationCategory::BaseResistance,
                source_module: "equations/resistance.rs",
                source_function: "crr_base_dmt",
            },

            Equation::VsBaseResistance => EquationMetadata {
                name: "Shear-Wave Velocity Base Cyclic Resistance",
                description: "CRR for uncemented Holocene soils from Vs1",
                formula_plain: "CRR = a (Vs1/100)^2 + b (1/(Vs1* - Vs1) - 1/Vs1*), a = 0.022, b = 2.8",
                reference: CodeReference::AndrusStokoe2000,
                variables: vec![
                    Variable::new("Vs1", "Corrected shear-wave velocity", "m/s"),
                    Variable::new("Vs1*", "Limiting upper Vs1", "m/s"),
                ],
                assumptions: vec!["Second term dropped when Vs1 ≥ Vs1*"],
                category: EquationCategory::BaseResistance,
                source_module: "equations/resistance.rs",
                source_function: "crr_base_vs",
            },

            Equation::ClayCptResistance => EquationMetadata {
                name: "Clay Cyclic Resistance from CPT",
                description: "CRR of clay and plastic silt from normalized cone resistance",
                formula_plain: "CRR = 0.053 * Qtn",
                reference: CodeReference::FineGrainedCorrelations,
                variables: vec![Variable::new("Qtn", "Normalized cone resistance (n* = 1.0 typical)", "-")],
                assumptions: vec!["Capped at 1.0"],
                category: EquationCategory::BaseResistance,
                source_module: "equations/resistance.rs",
                source_function: "crr_base_clay_cpt",
            },

            Equation::ClayDmtResistance => EquationMetadata {
                name: "Clay Cyclic Resistance from DMT",
                description: "CRR of clay and plastic silt from the horizontal stress index",
                formula_plain: "CRR = 0.074 * K_D^1.25",
                reference: CodeReference::FineGrainedCorrelations,
                variables: vec![Variable::new("K_D", "Horizontal stress index", "-")],
                assumptions: vec!["Capped at 1.0"],
                category: EquationCategory::BaseResistance,
                source_module: "equations/resistance.rs",
                source_function: "crr_base_clay_dmt",
            },

            Equation::ClayOcrResistance => EquationMetadata {
                name: "Clay Cyclic Resistance from OCR",
                description: "CRR of clay and plastic silt from the overconsolidation ratio",
                formula_plain: "CRR = 0.18 * OCR^0.8",
                reference: CodeReference::FineGrainedCorrelations,
                variables: vec![Variable::new("OCR", "Overconsolidation ratio", "-")],
                assumptions: vec!["Capped at 1.0"],
                category: EquationCategory::BaseResistance,
                source_module: "equations/resistance.rs",
                source_function: "crr_base_clay_ocr",
            },

            // Magnitude scaling
            Equation::CptMsfMax => EquationMetadata {
                name: "CPT Maximum Magnitude Scaling",
                description: "Upper limit of MSF as a function of qc1Ncs",
                formula_plain: "MSF_max = 1.09 * (qc1Ncs/180)^3 ≤ 2.2",
                reference: CodeReference::BoulangerIdriss2014 { equation: "2.20" },
                variables: vec![Variable::new("MSF_max", "Maximum magnitude scaling factor", "-")],
                assumptions: vec![],
                category: EquationCategory::MagnitudeScaling,
                source_module: "equations/resistance.rs",
                source_function: "msf_max_cpt",
            },

            Equation::SptMsfMax => EquationMetadata {
                name: "SPT Maximum Magnitude Scaling",
                description: "Upper limit of MSF as a function of (N1)60cs",
                formula_plain: "MSF_max = 1.09 * ((N1)60cs/31.5)^2 ≤ 2.2",
                reference: CodeReference::BoulangerIdriss2014 { equation: "2.21" },
                variables: vec![Variable::new("MSF_max", "Maximum magnitude scaling factor", "-")],
                assumptions: vec![],
                category: EquationCategory::MagnitudeScaling,
                source_module: "equations/resistance.rs",
                source_function: "msf_max_spt",
            },

            Equation::MagnitudeScalingFactor => EquationMetadata {
                name: "Magnitude Scaling Factor",
                description: "Adjusts CRR for earthquake magnitudes other than 7.5",
                formula_plain: "MSF = 1 + (MSF_max - 1) * (8.64 * exp(-M/4) - 1.325)",
                reference: CodeReference::BoulangerIdriss2014 { equation: "2.19" },
                variables: vec![
                    Variable::new("MSF", "Magnitude scaling factor", "-"),
                    Variable::new("M", "Moment magnitude", "-"),
                ],
                assumptions: vec!["MSF = 1 at M = 7.5"],
                category: EquationCategory::MagnitudeScaling,
                source_module: "equations/resistance.rs",
                source_function: "magnitude_scaling_factor",
            },

            // Overburden correction
            Equation::CptOverburdenCoefficient => EquationMetadata {
                name: "CPT Overburden Coefficient",
                description: "Slope of K_σ against ln(σ'vc/Pa) from qc1Ncs",
                formula_plain: "C_σ = 1 / (37.3 - 8.27 * qc1Ncs^0.264) ≤ 0.3",
                reference: CodeReference::BoulangerIdriss2014 { equation: "2.17" },
                variables: vec![Variable::new("C_σ", "Overburden coefficient", "-")],
                assumptions: vec!["0.3 when the denominator is not positive"],
                category: EquationCategory::OverburdenCorrection,
                source_module: "equations/resistance.rs",
                source_function: "c_sigma_cpt",
            },

            Equation::SptOverburdenCoefficient => EquationMetadata {
                name: "SPT Overburden Coefficient",
                description: "Slope of K_σ against ln(σ'vc/Pa) from (N1)60cs",
                formula_plain: "C_σ = 1 / (18.9 - 2.55 * sqrt((N1)60cs)) ≤ 0.3",
                reference: CodeReference::BoulangerIdriss2014 { equation: "2.18" },
                variables: vec![Variable::new("C_σ", "Overburden coefficient", "-")],
                assumptions: vec!["0.3 when the denominator is not positive"],
                category: EquationCategory::OverburdenCorrection,
                source_module: "equations/resistance.rs",
                source_function: "c_sigma_spt",
            },

            Equation::OverburdenCorrectionFactor => EquationMetadata {
                name: "Overburden Correction Factor",
                description: "Adjusts CRR for effective stresses other than one atmosphere",
                formula_plain: "K_σ = 1 - C_σ * ln(σ'vc / Pa) ≤ 1.1",
                reference: CodeReference::BoulangerIdriss2014 { equation: "2.16" },
                variables: vec![
                    Variable::new("K_σ", "Overburden correction factor", "-"),
                    Variable::new("σ'vc", "Effective vertical consolidation stress", "kPa"),
                ],
                assumptions: vec!["K_σ = 1.0 when σ'v0 ≤ 0"],
                category: EquationCategory::OverburdenCorrection,
                source_module: "equations/resistance.rs",
                source_function: "overburden_correction",
            },

            // Assembly
            Equation::CyclicResistanceRatio => EquationMetadata {
                name: "Cyclic Resistance Ratio",
                description: "Base resistance adjusted for magnitude and overburden",
                formula_plain: "CRR = CRR_base * MSF * K_σ",
                reference: CodeReference::BoulangerIdriss2014 { equation: "2.2" },
                variables: vec![
                    Variable::new("CRR_base", "Resistance for Mw 7.5, σ'v0 = 1 atm", "-"),
                    Variable::new("MSF", "Magnitude scaling factor", "-"),
                    Variable::new("K_σ", "Overburden correction factor", "-"),
                ],
                assumptions: vec![],
                category: EquationCategory::ResistanceAssembly,
                source_module: "calculations/resistance.rs",
                source_function: "compute_resistance",
            },

            // Seismic demand
            Equation::TotalVerticalStress => EquationMetadata {
                name: "Total Vertical Stress",
                description: "Overburden stress from the layer stack above the check depth",
                formula_plain: "σ_v0 = Σ γ_i * h_i",
                reference: CodeReference::SoilMechanics,
                variables: vec![
                    Variable::new("γ_i", "Unit weight of layer i", "kN/m³"),
                    Variable::new("h_i", "Thickness of layer i", "m"),
                ],
                assumptions: vec![],
                category: EquationCategory::SeismicDemand,
                source_module: "equations/demand.rs",
                source_function: "total_vertical_stress",
            },

            Equation::HydrostaticPorePressure => EquationMetadata {
                name: "Hydrostatic Pore Pressure",
                description: "Pore water pressure below a static water table",
                formula_plain: "u0 = γ_w * (z - z_w) for z > z_w, else 0",
                reference: CodeReference::SoilMechanics,
                variables: vec![
                    Variable::new("γ_w", "Unit weight of water", "kN/m³"),
                    Variable::new("z_w", "Water table depth", "m"),
                ],
                assumptions: vec!["Hydrostatic conditions"],
                category: EquationCategory::SeismicDemand,
                source_module: "equations/demand.rs",
                source_function: "hydrostatic_pore_pressure",
            },

            Equation::EffectiveVerticalStress => EquationMetadata {
                name: "Effective Vertical Stress",
                description: "Total stress less pore pressure",
                formula_plain: "σ'_v0 = σ_v0 - u0",
                reference: CodeReference::SoilMechanics,
                variables: vec![Variable::new("σ'_v0", "Effective vertical stress", "kPa")],
                assumptions: vec!["Must be positive"],
                category: EquationCategory::SeismicDemand,
                source_module: "calculations/csr.rs",
                source_function: "calculate",
            },

            Equation::StressReductionCoefficient => EquationMetadata {
                name: "Stress Reduction Coefficient",
                description: "Accounts for flexibility of the soil column",
                formula_plain: "r_d = exp(α(z) + β(z) M), α = -1.012 - 1.126 sin(z/11.73 + 5.133), β = 0.106 + 0.118 sin(z/11.28 + 5.142)",
                reference: CodeReference::IS1893 { year: 2016, clause: "Annex F" },
                variables: vec![
                    Variable::new("z", "Depth below ground surface", "m"),
                    Variable::new("M", "Moment magnitude", "-"),
                ],
                assumptions: vec!["Intended for z ≤ 34 m"],
                category: EquationCategory::SeismicDemand,
                source_module: "equations/demand.rs",
                source_function: "stress_reduction_coefficient",
            },

            Equation::CyclicStressRatio => EquationMetadata {
                name: "Cyclic Stress Ratio",
                description: "Earthquake-induced cyclic shear stress normalized by effective stress",
                formula_plain: "CSR = 0.65 * (a_max/g) * (σ_v0 / σ'_v0) * r_d",
                reference: CodeReference::IS1893 { year: 2016, clause: "Annex F" },
                variables: vec![
                    Variable::new("a_max/g", "Peak horizontal ground acceleration ratio", "-"),
                    Variable::new("σ_v0", "Total vertical stress", "kPa"),
                ],
                assumptions: vec!["Simplified procedure"],
                category: EquationCategory::SeismicDemand,
                source_module: "equations/demand.rs",
                source_function: "cyclic_stress_ratio",
            },
        }
    }

    /// Get all equations in a given category
    pub fn in_category(category: EquationCategory) -> Vec<Equation> {
        ALL_EQUATIONS
            .iter()
            .filter(|eq| eq.metadata().category == category)
            .copied()
            .collect()
    }

    /// Get all categories in report order
    pub fn all_categories() -> Vec<EquationCategory> {
        use EquationCategory::*;
        let mut cats = vec![
            InSituIndices,
            Normalization,
            BaseResistance,
            MagnitudeScaling,
            OverburdenCorrection,
            ResistanceAssembly,
            SeismicDemand,
        ];
        cats.sort_by_key(|c| c.sort_order());
        cats
    }
}

/// All equations in the registry (for iteration)
pub static ALL_EQUATIONS: &[Equation] = &[
    // In-situ indices
    Equation::NormalizedConeResistance,
    Equation::FrictionRatio,
    Equation::SoilBehaviorIndex,
    Equation::FinesFromIc,
    Equation::HorizontalStressIndex,
    Equation::MaterialIndex,
    Equation::CorrectedShearWaveVelocity,
    Equation::LimitingShearWaveVelocity,
    // Normalization
    Equation::OverburdenNormalization,
    Equation::CptNormalizedResistance,
    Equation::SptNormalizedBlowCount,
    Equation::CptFinesCorrection,
    Equation::SptFinesCorrection,
    Equation::CptStressExponent,
    Equation::SptStressExponent,
    // Base resistance
    Equation::CptBaseResistance,
    Equation::SptBaseResistance,
    Equation::DmtBaseResistance,
    Equation::VsBaseResistance,
    Equation::ClayCptResistance,
    Equation::ClayDmtResistance,
    Equation::ClayOcrResistance,
    // Magnitude scaling
    Equation::CptMsfMax,
    Equation::SptMsfMax,
    Equation::MagnitudeScalingFactor,
    // Overburden correction
    Equation::CptOverburdenCoefficient,
    Equation::SptOverburdenCoefficient,
    Equation::OverburdenCorrectionFactor,
    // Assembly
    Equation::CyclicResistanceRatio,
    // Seismic demand
    Equation::TotalVerticalStress,
    Equation::HydrostaticPorePressure,
    Equation::EffectiveVerticalStress,
    Equation::StressReductionCoefficient,
    Equation::CyclicStressRatio,
];

// ============================================================================
// Equation Usage Tracking
// ============================================================================

/// Record of an equation being used in a calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquationUsage {
    /// The equation that was used
    pub equation: Equation,
    /// Context describing where/why it was used (e.g., "fines content")
    pub context: String,
    /// Optional: the label of the measurement point
    pub point_label: Option<String>,
}

impl EquationUsage {
    /// Create a new equation usage record
    pub fn new(equation: Equation, context: impl Into<String>) -> Self {
        Self {
            equation,
            context: context.into(),
            point_label: None,
        }
    }

    /// Create usage record with a point label
    pub fn for_point(equation: Equation, context: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            equation,
            context: context.into(),
            point_label: Some(label.into()),
        }
    }
}

/// Collector for equation usage during a calculation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquationTracker {
    usages: Vec<EquationUsage>,
}

impl EquationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an equation was used
    pub fn record(&mut self, equation: Equation, context: impl Into<String>) {
        self.usages.push(EquationUsage::new(equation, context));
    }

    /// Record equation usage for a labelled measurement point
    pub fn record_for_point(&mut self, equation: Equation, context: impl Into<String>, label: impl Into<String>) {
        self.usages.push(EquationUsage::for_point(equation, context, label));
    }

    /// Get all recorded usages
    pub fn usages(&self) -> &[EquationUsage] {
        &self.usages
    }

    /// Get unique equations used (deduplicated, first-use order)
    pub fn unique_equations(&self) -> Vec<Equation> {
        let mut seen = HashSet::new();
        self.usages
            .iter()
            .filter(|u| seen.insert(u.equation))
            .map(|u| u.equation)
            .collect()
    }

    /// Group unique equations by category in report order
    pub fn by_category(&self) -> Vec<(EquationCategory, Vec<Equation>)> {
        let mut by_cat: HashMap<EquationCategory, Vec<Equation>> = HashMap::new();
        for eq in self.unique_equations() {
            by_cat.entry(eq.metadata().category).or_default().push(eq);
        }

        let mut result: Vec<_> = by_cat.into_iter().collect();
        result.sort_by_key(|(cat, _)| cat.sort_order());
        result
    }

    /// Merge another tracker into this one
    pub fn merge(&mut self, other: EquationTracker) {
        self.usages.extend(other.usages);
    }
}

// ============================================================================
// Markdown Generation for EQUATIONS.md
// ============================================================================

/// Generate a complete EQUATIONS.md file for documentation.
///
/// ```rust
/// use liquefy_core::equations::registry::generate_equations_markdown;
///
/// let markdown = generate_equations_markdown();
/// assert!(markdown.contains("Liquefy Equations Reference"));
/// assert!(markdown.contains("Magnitude Scaling"));
/// ```
pub fn generate_equations_markdown() -> String {
    let mut output = String::with_capacity(24_000);

    output.push_str(r#"# Liquefy Equations Reference

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-equations`

This document lists every correlation used in Liquefy calculations.
Each equation includes its formula, literature reference, source location, and assumptions.

## Units

| Quantity | Unit |
|----------|------|
| Stress, pressure | kPa |
| Depth, thickness | m |
| Unit weight | kN/m³ |
| Shear-wave velocity | m/s |
| Fines content | % |

---

"#);

    let categories = Equation::all_categories();

    for category in &categories {
        let equations = Equation::in_category(*category);
        if equations.is_empty() {
            continue;
        }

        output.push_str(&format!("## {}\n\n", category.display_name()));

        for equation in equations {
            let meta = equation.metadata();

            output.push_str(&format!("### {}\n\n", meta.name));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));

            if !meta.variables.is_empty() {
                output.push_str("**Variables:**\n\n");
                output.push_str("| Symbol | Description | Units |\n");
                output.push_str("|--------|-------------|-------|\n");
                for var in &meta.variables {
                    output.push_str(&format!("| {} | {} | {} |\n", var.symbol, var.description, var.units));
                }
                output.push('\n');
            }

            output.push_str(&format!("**Reference:** {}\n\n", meta.reference.citation()));
            output.push_str(&format!(
                "**Source:** [`{}`]({})\n\n",
                meta.source_function, meta.source_module
            ));

            if !meta.assumptions.is_empty() {
                output.push_str("**Assumptions:**\n\n");
                for assumption in &meta.assumptions {
                    output.push_str(&format!("- {}\n", assumption));
                }
                output.push('\n');
            }

            output.push_str("---\n\n");
        }
    }

    output.push_str(&format!(
        "## Statistics\n\n- **Total Equations:** {}\n- **Categories:** {}\n",
        ALL_EQUATIONS.len(),
        categories.len()
    ));

    output
}

// ============================================================================
// Tests
// ============================================================================
