//! # Stress Normalization and Fines Correction Formulas
//!
//! Building blocks of the CPT and SPT fixed-point procedure: the overburden
//! normalization factor C_N, the fines-content corrections, the exponent
//! update m(index), and the CPT soil-behaviour-type chain used to estimate
//! fines content (Qtn, F, Ic, FC).
//!
//! ## Notation
//!
//! - `Pa` = Atmospheric pressure (kPa)
//! - `σ'vc` = Effective vertical consolidation stress (kPa)
//! - `m` = Stress-normalization exponent
//! - `FC` = Fines content (%)
//! - `qc1N`, `qc1Ncs` = Normalized and clean-sand-equivalent cone resistance
//! - `(N1)60`, `(N1)60cs` = Normalized and clean-sand-equivalent blow count
//!
//! ## References
//!
//! - Boulanger & Idriss (2014), CPT and SPT based liquefaction triggering procedures
//! - Robertson (2009), Interpretation of cone penetration tests - a unified approach

/// Physical ceiling on the overburden normalization factor C_N
pub const C_N_MAX: f64 = 1.7;

/// Lower bound of the exponent m
pub const M_MIN: f64 = 0.246;

/// Upper bound of the exponent m
pub const M_MAX: f64 = 0.782;

/// Floor applied to the corrected index before it re-enters m(index)
pub const INDEX_FLOOR: f64 = 1e-6;

/// Fitting constant C_FC of the FC(Ic) correlation
pub const C_FC: f64 = -0.07;

/// Substitute for Qtn and F when their formulas are undefined
pub const TINY_RATIO: f64 = 1e-9;

/// Substitute for log10 of a non-positive value in the Ic formula
const LOG_FLOOR: f64 = -10.0;

// =============================================================================
// OVERBURDEN NORMALIZATION
// =============================================================================

/// Overburden normalization factor.
///
/// # Formula
/// - C_N = (Pa / σ'vc)^m ≤ 1.7
///
/// Caller guarantees `sigma_vc > 0`.
#[inline]
pub fn overburden_factor(pa: f64, sigma_vc: f64, m: f64) -> f64 {
    (pa / sigma_vc).powf(m).min(C_N_MAX)
}

// =============================================================================
// FINES CORRECTIONS
// =============================================================================

/// CPT fines correction Δqc1N.
///
/// # Formula
/// - Δqc1N = (11.9 + qc1N/14.6) · exp(1.63 − 9.7/(FC+2) − (15.7/(FC+2))²)
#[inline]
pub fn delta_qc1n(qc1n: f64, fines_content: f64) -> f64 {
    let denom = fines_content + 2.0;
    let exponent = 1.63 - 9.7 / denom - (15.7 / denom).powi(2);
    (11.9 + qc1n / 14.6) * exponent.exp()
}

/// SPT fines correction Δ(N1)60.
///
/// # Formula
/// - Δ(N1)60 = exp(1.63 + 9.7/(FC+0.01) − (15.7/(FC+0.01))²)
/// - Δ(N1)60 = 0 when FC + 0.01 ≤ 0
#[inline]
pub fn delta_n1_60(fines_content: f64) -> f64 {
    let denom = fines_content + 0.01;
    if denom <= 0.0 {
        return 0.0;
    }
    let exponent = 1.63 + 9.7 / denom - (15.7 / denom).powi(2);
    exponent.exp()
}

// =============================================================================
// EXPONENT UPDATE
// =============================================================================

/// Exponent m from the CPT clean-sand index (unclamped).
///
/// # Formula
/// - m = 1.338 − 0.249 · qc1Ncs^0.264
#[inline]
pub fn m_from_qc1ncs(qc1ncs: f64) -> f64 {
    1.338 - 0.249 * qc1ncs.powf(0.264)
}

/// Exponent m from the SPT clean-sand index (unclamped).
///
/// # Formula
/// - m = 0.784 − 0.0768 · sqrt((N1)60cs)
#[inline]
pub fn m_from_n1_60cs(n1_60cs: f64) -> f64 {
    0.784 - 0.0768 * n1_60cs.sqrt()
}

/// Clamp m to the range the correlations were fitted over, [0.246, 0.782].
#[inline]
pub fn clamp_m(m: f64) -> f64 {
    m.clamp(M_MIN, M_MAX)
}

// =============================================================================
// SOIL BEHAVIOUR TYPE AND FINES CONTENT
// =============================================================================

/// Normalized cone resistance Qtn.
///
/// # Formula
/// - Qtn = ((qt − σ'vc) / Pa) · (Pa / σ'vc)^n
///
/// Returns a tiny positive value when `qt − σ'vc ≤ 0` or `σ'vc ≤ 0`.
#[inline]
pub fn normalized_cone_resistance(qt: f64, sigma_vc: f64, pa: f64, n: f64) -> f64 {
    if qt - sigma_vc <= 0.0 || sigma_vc <= 0.0 {
        return TINY_RATIO;
    }
    ((qt - sigma_vc) / pa) * (pa / sigma_vc).powf(n)
}

/// Normalized friction ratio F in percent.
///
/// # Formula
/// - F = 100 · fs / (qt − σ'vc)
#[inline]
pub fn friction_ratio(qt: f64, fs: f64, sigma_vc: f64) -> f64 {
    if qt - sigma_vc <= 0.0 {
        return TINY_RATIO;
    }
    100.0 * fs / (qt - sigma_vc)
}

/// Soil behaviour type index Ic.
///
/// # Formula
/// - Ic = sqrt((3.47 − log Qtn)² + (1.22 + log F)²)
pub fn soil_behavior_index(qtn: f64, friction_ratio: f64) -> f64 {
    let log_q = if qtn > 0.0 { qtn.log10() } else { LOG_FLOOR };
    let log_f = if friction_ratio > 0.0 { friction_ratio.log10() } else { LOG_FLOOR };
    ((3.47 - log_q).powi(2) + (1.22 + log_f).powi(2)).sqrt()
}

/// Fines content estimated from Ic, clamped to [0, 100] %.
///
/// # Formula
/// - FC = 80 · (Ic + C_FC) − 137, C_FC = −0.07
#[inline]
pub fn fines_from_ic(ic: f64) -> f64 {
    (80.0 * (ic + C_FC) - 137.0).clamp(0.0, 100.0)
}
