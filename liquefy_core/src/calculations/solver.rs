//! # Normalization Solver
//!
//! Fixed-point iteration shared by the CPT and SPT paths. The stress
//! exponent `m` and the clean-sand index (qc1Ncs or (N1)60cs) depend on each
//! other, so both are resolved together:
//!
//! 1. `C_N = (Pa/σ'vc)^m`, capped at 1.7
//! 2. base index = method-specific normalization of the raw measurement
//! 3. corrected index = base + Δ(FC), floored at 1e-6
//! 4. `m_new` = method-specific update from the corrected index
//! 5. converged once two successive `m_new` differ by less than the tolerance
//!
//! Each pass is recorded as an immutable [`IterationSnapshot`]; the loop keeps
//! no state beyond the previous `m`.
//!
//! Running out of iterations is not an error. The outcome carries
//! `converged = false` and the last estimate, and callers mark their result
//! as provisional.

use serde::{Deserialize, Serialize};

use crate::equations::normalization::{overburden_factor, INDEX_FLOOR};
use crate::errors::{require_finite, require_non_negative, require_positive, CalcResult};
use crate::settings::SolverSettings;

/// One measurement point, reduced to what the fixed-point loop needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationPoint {
    /// Raw penetration measurement (qt in kPa for CPT, N60 for SPT)
    pub raw_index: f64,
    /// Effective vertical consolidation stress σ'vc (kPa)
    pub sigma_vc_kpa: f64,
    /// Atmospheric pressure Pa (kPa)
    pub pa_kpa: f64,
    /// Fines content (%), already resolved and clamped
    pub fines_content: f64,
}

impl NormalizationPoint {
    /// Reject points the loop cannot start from.
    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("raw_index", self.raw_index)?;
        require_positive("sigma_vc_kpa", self.sigma_vc_kpa)?;
        require_positive("pa_kpa", self.pa_kpa)?;
        require_finite("fines_content", self.fines_content)?;
        Ok(())
    }
}

/// Strategy plugged into [`solve`] for one penetration test type.
pub trait NormalizationMethod {
    /// Short name used in logs ("CPT", "SPT")
    fn name(&self) -> &'static str;

    /// Overburden-normalized index from the raw measurement and C_N.
    fn normalize(&self, raw_index: f64, c_n: f64, pa_kpa: f64) -> f64;

    /// Fines correction added to the normalized index.
    fn delta_correction(&self, normalized_index: f64, fines_content: f64) -> f64;

    /// Next stress exponent from the corrected (clean-sand) index.
    fn update_m(&self, corrected_index: f64) -> f64;
}

/// State of a single fixed-point pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationSnapshot {
    /// 1-based pass number
    pub iteration: usize,
    /// Exponent used for this pass
    pub m: f64,
    /// Overburden normalization factor
    pub c_n: f64,
    /// Normalized index before fines correction
    pub normalized_index: f64,
    /// Fines correction
    pub delta: f64,
    /// Clean-sand index after correction and floor
    pub corrected_index: f64,
    /// Exponent produced by this pass
    pub m_next: f64,
}

/// Result of a solver run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverOutcome {
    /// Final stress exponent
    pub m: f64,
    /// Final clean-sand index (qc1Ncs or (N1)60cs)
    pub normalized_index: f64,
    /// Passes used (max_iterations when not converged)
    pub iterations: usize,
    /// Whether the tolerance was met
    pub converged: bool,
    /// Every pass, in order
    pub trace: Vec<IterationSnapshot>,
}

impl SolverOutcome {
    /// Warning text for results built on a non-converged estimate.
    pub fn provisional_warning(&self) -> Option<String> {
        if self.converged {
            return None;
        }
        Some(format!(
            "Normalization did not converge within {} iterations (last m = {:.6}); results are provisional",
            self.iterations, self.m
        ))
    }
}

/// Run the fixed-point iteration for one measurement point.
///
/// # Errors
///
/// `InvalidInput` for a non-positive σ'vc or Pa, non-finite fines content,
/// or invalid solver settings. Nothing is iterated in that case.
pub fn solve<M>(method: &M, point: &NormalizationPoint, settings: &SolverSettings) -> CalcResult<SolverOutcome>
where
    M: NormalizationMethod + ?Sized,
{
    settings.validate()?;
    point.validate()?;

    tracing::debug!(
        method = method.name(),
        raw_index = point.raw_index,
        sigma_vc = point.sigma_vc_kpa,
        fines_content = point.fines_content,
        "normalization solver start"
    );

    let mut m = settings.initial_m;
    let mut index = f64::NAN;
    let mut last_m: Option<f64> = None;
    let mut trace = Vec::with_capacity(settings.max_iterations.min(64));

    for step in 0..settings.max_iterations {
        let c_n = overburden_factor(point.pa_kpa, point.sigma_vc_kpa, m);
        let normalized = method.normalize(point.raw_index, c_n, point.pa_kpa);
        let delta = method.delta_correction(normalized, point.fines_content);
        let corrected = (normalized + delta).max(INDEX_FLOOR);
        let m_next = method.update_m(corrected);

        let snapshot = IterationSnapshot {
            iteration: step + 1,
            m,
            c_n,
            normalized_index: normalized,
            delta,
            corrected_index: corrected,
            m_next,
        };
        tracing::trace!(?snapshot, "normalization pass");
        trace.push(snapshot);

        let done = matches!(last_m, Some(prev) if (m_next - prev).abs() < settings.tolerance);
        m = m_next;
        index = corrected;

        if done {
            tracing::debug!(method = method.name(), iterations = step + 1, m, index, "solver converged");
            return Ok(SolverOutcome {
                m,
                normalized_index: index,
                iterations: step + 1,
                converged: true,
                trace,
            });
        }
        last_m = Some(m_next);
    }

    tracing::warn!(
        method = method.name(),
        max_iterations = settings.max_iterations,
        m,
        index,
        "normalization solver did not converge"
    );

    Ok(SolverOutcome {
        m,
        normalized_index: index,
        iterations: settings.max_iterations,
        converged: false,
        trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CalcError;
    use std::cell::Cell;

    /// Linear test method whose exponent settles immediately.
    struct Constant;

    impl NormalizationMethod for Constant {
        fn name(&self) -> &'static str {
            "constant"
        }
        fn normalize(&self, raw_index: f64, c_n: f64, _pa_kpa: f64) -> f64 {
            raw_index * c_n
        }
        fn delta_correction(&self, _normalized_index: f64, _fines_content: f64) -> f64 {
            0.0
        }
        fn update_m(&self, _corrected_index: f64) -> f64 {
            0.5
        }
    }

    /// Exponent alternates between two values forever.
    struct Oscillating {
        passes: Cell<usize>,
    }

    impl Oscillating {
        fn new() -> Self {
            Self { passes: Cell::new(0) }
        }
    }

    impl NormalizationMethod for Oscillating {
        fn name(&self) -> &'static str {
            "oscillating"
        }
        fn normalize(&self, raw_index: f64, _c_n: f64, _pa_kpa: f64) -> f64 {
            raw_index
        }
        fn delta_correction(&self, _normalized_index: f64, _fines_content: f64) -> f64 {
            0.0
        }
        fn update_m(&self, _corrected_index: f64) -> f64 {
            let n = self.passes.get();
            self.passes.set(n + 1);
            if n % 2 == 0 { 0.3 } else { 0.7 }
        }
    }

    fn point() -> NormalizationPoint {
        NormalizationPoint {
            raw_index: 10.0,
            sigma_vc_kpa: 101.325,
            pa_kpa: 101.325,
            fines_content: 0.0,
        }
    }

    #[test]
    fn test_constant_method_converges_on_second_pass() {
        let outcome = solve(&Constant, &point(), &SolverSettings::default()).unwrap();
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.trace.len(), 2);
        assert_eq!(outcome.m, 0.5);
        // σ'vc = Pa so C_N = 1
        assert!((outcome.normalized_index - 10.0).abs() < 1e-12);
        assert_eq!(outcome.trace[0].m, 0.6);
        assert_eq!(outcome.trace[1].m, 0.5);
    }

    #[test]
    fn test_single_iteration_never_converges() {
        let settings = SolverSettings {
            max_iterations: 1,
            ..SolverSettings::default()
        };
        let outcome = solve(&Constant, &point(), &settings).unwrap();
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.m, 0.5);
    }

    #[test]
    fn test_index_floor() {
        let p = NormalizationPoint {
            raw_index: 0.0,
            ..point()
        };
        let outcome = solve(&Constant, &p, &SolverSettings::default()).unwrap();
        assert_eq!(outcome.normalized_index, INDEX_FLOOR);
    }

    #[test]
    fn test_rejects_non_positive_stress_before_iterating() {
        let p = NormalizationPoint {
            sigma_vc_kpa: 0.0,
            ..point()
        };
        let method = Oscillating::new();
        let err = solve(&method, &p, &SolverSettings::default()).unwrap_err();
        assert_eq!(method.passes.get(), 0);
        match err {
            CalcError::InvalidInput { field, .. } => assert_eq!(field, "sigma_vc_kpa"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let settings = SolverSettings {
            tolerance: -1.0,
            ..SolverSettings::default()
        };
        assert!(solve(&Oscillating::new(), &point(), &settings).is_err());
    }

    #[test]
    fn test_non_convergence_returns_last_estimate() {
        let settings = SolverSettings {
            max_iterations: 7,
            ..SolverSettings::default()
        };
        let outcome = solve(&Oscillating::new(), &point(), &settings).unwrap();
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 7);
        assert_eq!(outcome.trace.len(), 7);
        // Passes 0..=6 produce 0.3, 0.7, ..., 0.3
        assert_eq!(outcome.m, 0.3);
    }

    #[test]
    fn test_works_through_trait_object() {
        let method: &dyn NormalizationMethod = &Constant;
        let outcome = solve(method, &point(), &SolverSettings::default()).unwrap();
        assert!(outcome.converged);
    }
}
