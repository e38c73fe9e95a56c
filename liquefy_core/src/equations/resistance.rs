//! # Cyclic Resistance Formulas
//!
//! Closed-form correlations that turn an in-situ index into a cyclic
//! resistance ratio for the reference event (Mw = 7.5, σ'v0 = 1 atm), plus
//! the magnitude scaling and overburden correction factors applied on top.
//!
//! ## References
//!
//! - Boulanger & Idriss (2014): CPT/SPT CRR_base, MSF_max, C_σ, K_σ
//! - Marchetti (2016), Monaco et al. (2005): DMT K_D correlations
//! - Andrus & Stokoe (2000): shear-wave velocity correlation
//! - IS 1893 (Part 1): 2016, Annex F

/// Conventional ceiling on CRR_base
pub const CRR_BASE_CAP: f64 = 1.0;

/// Ceiling on the magnitude scaling parameter MSF_max
pub const MSF_MAX_CAP: f64 = 2.2;

/// Ceiling on the overburden coefficient C_σ (also its fallback value)
pub const C_SIGMA_CAP: f64 = 0.3;

/// Ceiling on the overburden correction factor K_σ
pub const K_SIGMA_CAP: f64 = 1.1;

/// Vs correlation curve-fitting parameter a
pub const VS_A: f64 = 0.022;

/// Vs correlation curve-fitting parameter b
pub const VS_B: f64 = 2.8;

// =============================================================================
// CPT / SPT
// =============================================================================

/// CRR for Mw = 7.5 and σ'v0 = 1 atm from the CPT clean-sand index.
///
/// # Formula
/// - CRR = exp(qc1Ncs/113 + (qc1Ncs/1000)² − (qc1Ncs/140)³ + (qc1Ncs/137)⁴ − 2.8)
pub fn crr_base_cpt(qc1ncs: f64) -> f64 {
    let q = qc1ncs;
    (q / 113.0 + (q / 1000.0).powi(2) - (q / 140.0).powi(3) + (q / 137.0).powi(4) - 2.8).exp()
}

/// CRR for Mw = 7.5 and σ'v0 = 1 atm from the SPT clean-sand index.
///
/// # Formula
/// - CRR = exp(−2.8 + N/14.1 + (N/126)² − (N/23.6)³ + (N/25.4)⁴)
pub fn crr_base_spt(n1_60cs: f64) -> f64 {
    let n = n1_60cs;
    (-2.8 + n / 14.1 + (n / 126.0).powi(2) - (n / 23.6).powi(3) + (n / 25.4).powi(4)).exp()
}

// =============================================================================
// DMT
// =============================================================================

/// Horizontal stress index K_D = (p1 − p0) / σ'v0.
///
/// Caller guarantees `sigma_v0 > 0`.
#[inline]
pub fn horizontal_stress_index(p0: f64, p1: f64, sigma_v0: f64) -> f64 {
    (p1 - p0) / sigma_v0
}

/// Material index I_D = (p1 − p0) / (p0 − u0).
///
/// Caller guarantees `p0 - u0 > 0`.
#[inline]
pub fn material_index(p0: f64, p1: f64, u0: f64) -> f64 {
    (p1 - p0) / (p0 - u0)
}

/// DMT-based CRR for sands.
///
/// # Formula
/// - CRR = 93 · (0.025 · K_D)² + 0.08 ≤ 1.0
#[inline]
pub fn crr_base_dmt(k_d: f64) -> f64 {
    (93.0 * (0.025 * k_d).powi(2) + 0.08).min(CRR_BASE_CAP)
}

// =============================================================================
// SHEAR-WAVE VELOCITY
// =============================================================================

/// Overburden-corrected shear-wave velocity Vs1 = (Pa / σ'v0)^0.25 · Vs.
#[inline]
pub fn corrected_shear_wave_velocity(vs: f64, pa: f64, sigma_v0: f64) -> f64 {
    (pa / sigma_v0).powf(0.25) * vs
}

/// Limiting upper value Vs1* of Vs1 for liquefaction occurrence (m/s).
///
/// # Formula
/// - Vs1* = 215 for FC ≥ 5 %
/// - Vs1* = 200 + 15 · (35 − FC) / 30 for FC < 5 %
#[inline]
pub fn limiting_shear_wave_velocity(fines_content: f64) -> f64 {
    if fines_content < 5.0 {
        200.0 + 15.0 * ((35.0 - fines_content) / 30.0)
    } else {
        215.0
    }
}

/// Vs-based CRR.
///
/// # Formula
/// - CRR = a (Vs1/100)² + b (1/(Vs1* − Vs1) − 1/Vs1*) for 0 < Vs1 < Vs1*
/// - CRR = a (Vs1/100)² otherwise
pub fn crr_base_vs(vs1: f64, vs1_star: f64) -> f64 {
    let base = VS_A * (vs1 / 100.0).powi(2);
    if vs1 > 0.0 && vs1 < vs1_star {
        base + VS_B * (1.0 / (vs1_star - vs1) - 1.0 / vs1_star)
    } else {
        base
    }
}

// =============================================================================
// CLAY AND PLASTIC SILT
// =============================================================================

/// Clay CRR from normalized cone resistance: 0.053 · Qtn.
#[inline]
pub fn crr_base_clay_cpt(qtn: f64) -> f64 {
    0.053 * qtn
}

/// Clay CRR from the DMT horizontal stress index: 0.074 · K_D^1.25.
#[inline]
pub fn crr_base_clay_dmt(k_d: f64) -> f64 {
    0.074 * k_d.powf(1.25)
}

/// Clay CRR from the overconsolidation ratio: 0.18 · OCR^0.8.
#[inline]
pub fn crr_base_clay_ocr(ocr: f64) -> f64 {
    0.18 * ocr.powf(0.8)
}

// =============================================================================
// MAGNITUDE SCALING
// =============================================================================

/// MSF_max from the CPT clean-sand index: 1.09 · (qc1Ncs/180)³ ≤ 2.2.
#[inline]
pub fn msf_max_cpt(qc1ncs: f64) -> f64 {
    (1.09 * (qc1ncs / 180.0).powi(3)).min(MSF_MAX_CAP)
}

/// MSF_max from the SPT clean-sand index: 1.09 · ((N1)60cs/31.5)² ≤ 2.2.
#[inline]
pub fn msf_max_spt(n1_60cs: f64) -> f64 {
    (1.09 * (n1_60cs / 31.5).powi(2)).min(MSF_MAX_CAP)
}

/// Magnitude scaling factor.
///
/// # Formula
/// - MSF = 1 + (MSF_max − 1) · (8.64 · exp(−M/4) − 1.325)
///
/// At M = 7.5 the bracket vanishes (to four decimals) and MSF ≈ 1.
#[inline]
pub fn magnitude_scaling_factor(msf_max: f64, magnitude: f64) -> f64 {
    1.0 + (msf_max - 1.0) * (8.64 * (-0.25 * magnitude).exp() - 1.325)
}

// =============================================================================
// OVERBURDEN CORRECTION
// =============================================================================

/// Cap C_σ at 0.3, falling back to 0.3 for a non-positive denominator.
fn c_sigma_from_denominator(denom: f64) -> f64 {
    if denom.is_nan() || denom <= 0.0 {
        tracing::debug!(denom, "C_sigma denominator not positive, using {}", C_SIGMA_CAP);
        return C_SIGMA_CAP;
    }
    (1.0 / denom).min(C_SIGMA_CAP)
}

/// Overburden coefficient from the CPT clean-sand index.
///
/// # Formula
/// - C_σ = 1 / (37.3 − 8.27 · qc1Ncs^0.264) ≤ 0.3
pub fn c_sigma_cpt(qc1ncs: f64) -> f64 {
    c_sigma_from_denominator(37.3 - 8.27 * qc1ncs.powf(0.264))
}

/// Overburden coefficient from the SPT clean-sand index.
///
/// # Formula
/// - C_σ = 1 / (18.9 − 2.55 · sqrt((N1)60cs)) ≤ 0.3
pub fn c_sigma_spt(n1_60cs: f64) -> f64 {
    c_sigma_from_denominator(18.9 - 2.55 * n1_60cs.sqrt())
}

/// Overburden correction factor.
///
/// # Formula
/// - K_σ = 1 − C_σ · ln(σ'vc / Pa) ≤ 1.1
/// - K_σ = 1.0 when σ'v0 ≤ 0 or the logarithm argument is not positive
pub fn overburden_correction(c_sigma: f64, sigma_vc: f64, sigma_v0: f64, pa: f64) -> f64 {
    let ratio = sigma_vc / pa;
    if sigma_v0 <= 0.0 || ratio.is_nan() || ratio <= 0.0 {
        tracing::debug!(sigma_vc, sigma_v0, "K_sigma guard active, using 1.0");
        return 1.0;
    }
    (1.0 - c_sigma * ratio.ln()).min(K_SIGMA_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PA: f64 = 101.325;

    #[test]
    fn test_crr_base_cpt_known_value() {
        // qc1Ncs = 100: 0.885 + 0.010 - 0.364 + 0.284 - 2.8 = -1.9856
        let crr = crr_base_cpt(100.0);
        assert!((crr - (-1.9856_f64).exp()).abs() < 1e-3, "crr = {}", crr);
    }

    #[test]
    fn test_crr_base_spt_known_value() {
        // (N1)60cs = 15: exp(-2.8 + 1.0638 + 0.0142 - 0.2568 + 0.1216) ≈ 0.1561
        let crr = crr_base_spt(15.0);
        assert!((crr - 0.1561).abs() < 1e-3, "crr = {}", crr);
    }

    #[test]
    fn test_dmt_indices() {
        let k_d = horizontal_stress_index(200.0, 400.0, 100.0);
        assert_eq!(k_d, 2.0);
        assert!((crr_base_dmt(k_d) - 0.3125).abs() < 1e-12);
        assert_eq!(crr_base_dmt(50.0), CRR_BASE_CAP);
        assert!((material_index(200.0, 400.0, 50.0) - 200.0 / 150.0).abs() < 1e-12);
    }

    #[test]
    fn test_vs_correlation() {
        let vs1 = corrected_shear_wave_velocity(180.0, PA, 100.0);
        assert!((vs1 - 180.59).abs() < 0.01, "vs1 = {}", vs1);
        assert_eq!(limiting_shear_wave_velocity(5.0), 215.0);
        assert!((limiting_shear_wave_velocity(0.0) - 217.5).abs() < 1e-12);

        let piecewise = crr_base_vs(vs1, 215.0);
        let plain = VS_A * (vs1 / 100.0).powi(2);
        assert!(piecewise > plain);
        // Above the limiting velocity only the quadratic term remains
        assert!((crr_base_vs(220.0, 215.0) - VS_A * 2.2_f64.powi(2)).abs() < 1e-15);
    }

    #[test]
    fn test_clay_correlations() {
        assert!((crr_base_clay_cpt(10.0) - 0.53).abs() < 1e-12);
        assert!((crr_base_clay_dmt(1.0) - 0.074).abs() < 1e-12);
        assert!((crr_base_clay_ocr(1.0) - 0.18).abs() < 1e-12);
    }

    #[test]
    fn test_msf_caps() {
        assert_eq!(msf_max_cpt(1000.0), MSF_MAX_CAP);
        assert_eq!(msf_max_spt(100.0), MSF_MAX_CAP);
        assert!((msf_max_spt(31.5) - 1.09).abs() < 1e-12);
    }

    #[test]
    fn test_msf_at_reference_magnitude() {
        // 8.64 exp(-1.875) = 1.32497, so the bracket is ~ -3e-5
        let msf = magnitude_scaling_factor(2.2, 7.5);
        assert!((msf - 1.0).abs() < 1e-3);
        // Smaller events scale resistance up when MSF_max > 1
        assert!(magnitude_scaling_factor(2.2, 6.0) > 1.0);
    }

    #[test]
    fn test_c_sigma_fallback() {
        // sqrt(N) large enough to make 18.9 - 2.55 sqrt(N) negative
        assert_eq!(c_sigma_spt(100.0), C_SIGMA_CAP);
        // Denominator just above zero gives a huge reciprocal, capped
        assert_eq!(c_sigma_spt(54.0), C_SIGMA_CAP);
        let c = c_sigma_cpt(100.0);
        assert!(c > 0.0 && c < C_SIGMA_CAP);
    }

    #[test]
    fn test_k_sigma_guards() {
        assert_eq!(overburden_correction(0.1, 100.0, 0.0, PA), 1.0);
        assert_eq!(overburden_correction(0.1, 0.0, 100.0, PA), 1.0);
        // Shallow stress: capped at 1.1
        assert_eq!(overburden_correction(0.3, 10.0, 10.0, PA), K_SIGMA_CAP);
        // Deep stress reduces resistance
        assert!(overburden_correction(0.1, 400.0, 400.0, PA) < 1.0);
    }
}
