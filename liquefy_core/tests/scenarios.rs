//! End-to-end scenarios across the public API.

use liquefy_core::calculations::cpt::{self, CptInput};
use liquefy_core::calculations::csr::{self, CsrInput, SoilLayer};
use liquefy_core::calculations::dmt::{self, DmtInput};
use liquefy_core::calculations::resistance::{compute_resistance, ResistanceInput, ResistanceMethod};
use liquefy_core::calculations::spt::{self, SptInput};
use liquefy_core::calculations::vs::{self, VsInput};
use liquefy_core::equations::normalization::{C_N_MAX, M_MAX, M_MIN};
use liquefy_core::equations::resistance::{C_SIGMA_CAP, K_SIGMA_CAP, MSF_MAX_CAP};
use liquefy_core::{AnalysisSettings, CalcError, FinesSource};

const PA: f64 = 101.325;

fn cpt_input(qt_kpa: f64) -> CptInput {
    CptInput {
        label: "scenario".to_string(),
        qt_kpa,
        fs_kpa: None,
        sigma_vc_kpa: 100.0,
        sigma_v0_kpa: 100.0,
        fines: FinesSource::Measured { percent: 5.0 },
        magnitude: 7.5,
        msf_max_override: None,
    }
}

fn spt_input(n60: f64) -> SptInput {
    SptInput {
        label: "scenario".to_string(),
        n60,
        sigma_vc_kpa: 100.0,
        sigma_v0_kpa: 100.0,
        fines: FinesSource::Measured { percent: 5.0 },
        magnitude: 7.5,
        msf_max_override: None,
    }
}

#[test]
fn cpt_reference_scenario_converges() {
    let result = cpt::calculate(&cpt_input(150.0), &AnalysisSettings::default()).unwrap();
    assert!(result.converged);
    assert!(result.resistance.crr.is_finite() && result.resistance.crr > 0.0);
    assert!((result.resistance.msf - 1.0).abs() < 1e-3);
}

#[test]
fn cpt_converges_over_tip_resistance_range() {
    let settings = AnalysisSettings::default();
    for qt_over_pa in [50.0, 100.0, 200.0, 400.0] {
        for sigma_vc in [30.0, 100.0, 400.0] {
            let input = CptInput {
                qt_kpa: qt_over_pa * PA,
                sigma_vc_kpa: sigma_vc,
                sigma_v0_kpa: sigma_vc,
                ..cpt_input(0.0)
            };
            let result = cpt::calculate(&input, &settings).unwrap();
            assert!(result.converged, "qt/Pa = {}, σ'vc = {}", qt_over_pa, sigma_vc);
            assert!(result.iterations <= 200);
            assert!(result.m >= M_MIN && result.m <= M_MAX);
            for snapshot in &result.trace {
                assert!(snapshot.c_n <= C_N_MAX);
            }
            let r = &result.resistance;
            assert!(r.msf_max <= MSF_MAX_CAP);
            assert!(r.c_sigma <= C_SIGMA_CAP);
            assert!(r.k_sigma <= K_SIGMA_CAP);
        }
    }
}

#[test]
fn spt_converges_over_blow_count_range() {
    let settings = AnalysisSettings::default();
    for n60 in [5.0, 10.0, 20.0, 40.0, 60.0] {
        let result = spt::calculate(&spt_input(n60), &settings).unwrap();
        assert!(result.converged, "N60 = {}", n60);
        assert!(result.m >= M_MIN && result.m <= M_MAX);
        assert!(result.resistance.k_sigma <= K_SIGMA_CAP);
    }
}

#[test]
fn identical_inputs_give_identical_bits() {
    let settings = AnalysisSettings::default();
    let a = spt::calculate(&spt_input(22.0), &settings).unwrap();
    let b = spt::calculate(&spt_input(22.0), &settings).unwrap();
    assert_eq!(a.m.to_bits(), b.m.to_bits());
    assert_eq!(a.n1_60cs.to_bits(), b.n1_60cs.to_bits());
    assert_eq!(a.iterations, b.iterations);
    assert_eq!(a.resistance.crr.to_bits(), b.resistance.crr.to_bits());

    let input = ResistanceInput {
        method: ResistanceMethod::Cpt,
        normalized_index: 133.7,
        magnitude: 6.8,
        sigma_vc_kpa: 140.0,
        sigma_v0_kpa: 140.0,
        pa_kpa: PA,
        msf_max_override: None,
        cap_crr_base: true,
    };
    let first = compute_resistance(&input).unwrap();
    let second = compute_resistance(&input).unwrap();
    assert_eq!(first.crr.to_bits(), second.crr.to_bits());
}

#[test]
fn zero_consolidation_stress_is_rejected_before_iteration() {
    let input = CptInput {
        sigma_vc_kpa: 0.0,
        ..cpt_input(150.0)
    };
    let err = cpt::calculate(&input, &AnalysisSettings::default()).unwrap_err();
    assert!(matches!(err, CalcError::InvalidInput { .. }));
}

#[test]
fn csr_rejects_non_positive_effective_stress() {
    let input = CsrInput {
        label: "artesian".to_string(),
        layers: vec![SoilLayer::new(8.0, 4.0)],
        depth_m: Some(12.0),
        water_table_depth_m: 0.0,
        gamma_w_kn_m3: 9.81,
        amax_g: 0.333,
        magnitude: 7.5,
    };
    let err = csr::calculate(&input).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");
}

#[test]
fn dmt_reference_scenario() {
    let input = DmtInput {
        label: "DMT".to_string(),
        p0_kpa: 200.0,
        p1_kpa: 400.0,
        u0_kpa: 50.0,
        sigma_v0_kpa: 100.0,
        msf: 1.0,
        k_sigma: 1.0,
    };
    let result = dmt::calculate(&input).unwrap();
    assert_eq!(result.k_d, 2.0);
    assert!((result.crr_base - 0.3125).abs() < 1e-12);
}

#[test]
fn vs_reference_scenario() {
    let input = VsInput {
        label: "Vs".to_string(),
        vs_mps: 180.0,
        sigma_v0_kpa: 100.0,
        fines_content_percent: 5.0,
        msf: 1.0,
        k_sigma: 1.0,
    };
    let result = vs::calculate(&input, &AnalysisSettings::default()).unwrap();
    assert!((result.vs1_mps - 180.6).abs() < 0.05);
    assert_eq!(result.vs1_star_mps, 215.0);
    assert!(result.hyperbolic_term_applied);
}

#[test]
fn tighter_tolerance_needs_at_least_as_many_iterations() {
    let loose = AnalysisSettings::default();
    let mut tight = AnalysisSettings::default();
    tight.solver.tolerance = 1e-10;

    let a = cpt::calculate(&cpt_input(120.0 * PA), &loose).unwrap();
    let b = cpt::calculate(&cpt_input(120.0 * PA), &tight).unwrap();
    assert!(b.iterations >= a.iterations);
    assert!((a.m - b.m).abs() < 1e-3);
}
