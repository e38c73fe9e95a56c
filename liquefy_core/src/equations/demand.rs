//! # Cyclic Demand Formulas
//!
//! Simplified procedure for the earthquake-induced cyclic stress ratio at a
//! single depth.
//!
//! ## Notation
//!
//! - `z` = Depth below ground surface (m)
//! - `γ`, `h` = Layer unit weight (kN/m³) and thickness (m)
//! - `γ_w` = Unit weight of water (kN/m³)
//! - `M` = Earthquake moment magnitude
//!
//! ## References
//!
//! - Idriss (1999), Golesorkhi (1989): depth reduction factor r_d
//! - Seed & Idriss (1971): CSR = 0.65 (a_max/g) (σ_v0/σ'_v0) r_d
//! - IS 1893 (Part 1): 2016, Annex F

/// Total vertical stress from a stack of layers: σ_v0 = Σ γ_i · h_i.
pub fn total_vertical_stress<I>(layers: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    layers
        .into_iter()
        .map(|(unit_weight, thickness)| unit_weight * thickness)
        .sum()
}

/// Hydrostatic pore pressure at depth z.
///
/// # Formula
/// - u0 = 0 for z ≤ z_w
/// - u0 = γ_w · (z − z_w) otherwise
#[inline]
pub fn hydrostatic_pore_pressure(depth: f64, water_table_depth: f64, gamma_w: f64) -> f64 {
    if depth <= water_table_depth {
        0.0
    } else {
        gamma_w * (depth - water_table_depth)
    }
}

/// α(z) term of the stress reduction coefficient.
#[inline]
pub fn rd_alpha(depth: f64) -> f64 {
    -1.012 - 1.126 * (depth / 11.73 + 5.133).sin()
}

/// β(z) term of the stress reduction coefficient.
#[inline]
pub fn rd_beta(depth: f64) -> f64 {
    0.106 + 0.118 * (depth / 11.28 + 5.142).sin()
}

/// Shear stress reduction coefficient.
///
/// # Formula
/// - r_d = exp(α(z) + β(z) · M)
/// - α(z) = −1.012 − 1.126 sin(z/11.73 + 5.133)
/// - β(z) = 0.106 + 0.118 sin(z/11.28 + 5.142)
pub fn stress_reduction_coefficient(depth: f64, magnitude: f64) -> f64 {
    (rd_alpha(depth) + rd_beta(depth) * magnitude).exp()
}

/// Cyclic stress ratio.
///
/// # Formula
/// - CSR = 0.65 · (a_max/g) · (σ_v0 / σ'_v0) · r_d
///
/// Caller guarantees `sigma_v0_eff > 0`.
#[inline]
pub fn cyclic_stress_ratio(amax_over_g: f64, sigma_v0: f64, sigma_v0_eff: f64, r_d: f64) -> f64 {
    0.65 * amax_over_g * (sigma_v0 / sigma_v0_eff) * r_d
}
