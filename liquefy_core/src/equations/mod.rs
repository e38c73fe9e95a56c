//! # Liquefaction Equations
//!
//! This module contains every closed-form correlation used by the calculations.
//! Having equations in one place enables:
//! - Easy verification against the published procedures
//! - Documentation of caps, floors and fallback values
//! - Consistent implementation across the CPT, SPT, DMT, Vs and clay paths
//!
//! ## Modules
//!
//! - [`normalization`] - Overburden normalization, fines corrections, exponent update, Qtn/F/Ic/FC
//! - [`resistance`] - CRR_base correlations, magnitude scaling, overburden correction
//! - [`demand`] - Vertical stresses, stress reduction coefficient, CSR
//! - [`registry`] - Equation metadata and usage tracking for audit reports
//!
//! ## Conventions
//!
//! - **Stresses**: kPa, compression positive
//! - **Depths**: m below ground surface
//! - **Fines content**: percent, 0 to 100
//! - **Indices** (qc1N, Qtn, K_D, ...): dimensionless
//!
//! ## References
//!
//! - Boulanger & Idriss (2014), CPT and SPT based liquefaction triggering procedures
//! - Robertson (2009), Interpretation of cone penetration tests
//! - Andrus & Stokoe (2000), Liquefaction resistance of soils from shear-wave velocity
//! - IS 1893 (Part 1): 2016, Annex F

pub mod demand;
pub mod normalization;
pub mod registry;
pub mod resistance;

// Re-export commonly used items
pub use normalization::{
    overburden_factor,
    delta_qc1n,
    delta_n1_60,
    m_from_qc1ncs,
    m_from_n1_60cs,
    clamp_m,
    normalized_cone_resistance,
    friction_ratio,
    soil_behavior_index,
    fines_from_ic,
};

pub use resistance::{
    crr_base_cpt,
    crr_base_spt,
    crr_base_dmt,
    crr_base_vs,
    crr_base_clay_cpt,
    crr_base_clay_dmt,
    crr_base_clay_ocr,
    msf_max_cpt,
    msf_max_spt,
    magnitude_scaling_factor,
    c_sigma_cpt,
    c_sigma_spt,
    overburden_correction,
};

pub use demand::{
    total_vertical_stress,
    hydrostatic_pore_pressure,
    stress_reduction_coefficient,
    cyclic_stress_ratio,
};

pub use registry::{
    CodeReference,
    Equation,
    EquationCategory,
    EquationMetadata,
    EquationTracker,
    EquationUsage,
    Variable,
    ALL_EQUATIONS,
    generate_equations_markdown,
};
