//! Human-readable rendering of CLI responses.

use std::fmt::Write;

use liquefy_core::calculations::resistance::ResistanceResult;
use liquefy_core::equations::registry::Equation;
use liquefy_core::AnalysisOutput;

use crate::{Response, ScreeningResult};

const RULE: &str = "═══════════════════════════════════════";

/// Render a response as a plain-text report.
pub fn render(response: &Response) -> String {
    let mut out = String::new();
    match response {
        Response::Analysis { label, calc_type, output } => {
            banner(&mut out, &format!("{} RESULTS - {}", calc_type, label));
            render_output(&mut out, output);
            render_footer(&mut out, output.warnings(), output.equations());
        }
        Response::Screening(result) => render_screening(&mut out, result),
    }
    out
}

fn banner(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "  {}", title);
    let _ = writeln!(out, "{}", RULE);
    out.push('\n');
}

fn render_output(out: &mut String, output: &AnalysisOutput) {
    match output {
        AnalysisOutput::Cpt(r) => {
            let _ = writeln!(out, "Fines content:  {:.2} %", r.fines.fines_content);
            if let Some(ic) = r.fines.ic {
                let _ = writeln!(out, "  Ic = {:.4}", ic);
            }
            let _ = writeln!(out, "Normalization:  {} after {} iterations", converged_text(r.converged), r.iterations);
            let _ = writeln!(out, "  m      = {:.6}", r.m);
            let _ = writeln!(out, "  qc1Ncs = {:.4}", r.qc1ncs);
            render_resistance(out, &r.resistance);
        }
        AnalysisOutput::Spt(r) => {
            let _ = writeln!(out, "Fines content:  {:.2} %", r.fines.fines_content);
            let _ = writeln!(out, "Normalization:  {} after {} iterations", converged_text(r.converged), r.iterations);
            let _ = writeln!(out, "  m        = {:.6}", r.m);
            let _ = writeln!(out, "  (N1)60cs = {:.4}", r.n1_60cs);
            render_resistance(out, &r.resistance);
        }
        AnalysisOutput::Dmt(r) => {
            let _ = writeln!(out, "K_D = {:.4}", r.k_d);
            let _ = writeln!(out, "I_D = {:.4}", r.i_d);
            render_applied(out, r.crr_base, r.msf, r.k_sigma, r.crr);
        }
        AnalysisOutput::Vs(r) => {
            let _ = writeln!(out, "Vs1  = {:.2} m/s", r.vs1_mps);
            let _ = writeln!(out, "Vs1* = {:.2} m/s", r.vs1_star_mps);
            render_applied(out, r.crr_base, r.msf, r.k_sigma, r.crr);
        }
        AnalysisOutput::Clay(r) => {
            let _ = writeln!(out, "Indicator = {:.4}", r.indicator);
            render_applied(out, r.crr_base, r.msf, r.k_sigma, r.crr);
        }
        AnalysisOutput::Csr(r) => {
            let _ = writeln!(out, "Depth z:  {:.2} m", r.depth_m);
            let _ = writeln!(out, "  σv0  = {:.3} kPa", r.sigma_v0_kpa);
            let _ = writeln!(out, "  u0   = {:.3} kPa", r.u0_kpa);
            let _ = writeln!(out, "  σ'v0 = {:.3} kPa", r.sigma_v0_eff_kpa);
            let _ = writeln!(out, "  r_d  = {:.4}", r.rd);
            out.push('\n');
            let _ = writeln!(out, "CSR = {:.4}", r.csr);
        }
    }
}

fn converged_text(converged: bool) -> &'static str {
    if converged {
        "converged"
    } else {
        "NOT converged"
    }
}

fn render_resistance(out: &mut String, r: &ResistanceResult) {
    out.push('\n');
    let _ = writeln!(out, "Resistance:");
    if r.crr_base != r.crr_base_uncapped {
        let _ = writeln!(out, "  CRR_base = {:.6} (uncapped {:.6})", r.crr_base, r.crr_base_uncapped);
    } else {
        let _ = writeln!(out, "  CRR_base = {:.6}", r.crr_base);
    }
    let _ = writeln!(out, "  MSF_max  = {:.4}", r.msf_max);
    let _ = writeln!(out, "  MSF      = {:.4}", r.msf);
    let _ = writeln!(out, "  C_σ      = {:.4}", r.c_sigma);
    let _ = writeln!(out, "  K_σ      = {:.4}", r.k_sigma);
    out.push('\n');
    let _ = writeln!(out, "CRR = {:.6}", r.crr);
}

fn render_applied(out: &mut String, crr_base: f64, msf: f64, k_sigma: f64, crr: f64) {
    out.push('\n');
    let _ = writeln!(out, "Resistance:");
    let _ = writeln!(out, "  CRR_base = {:.6}", crr_base);
    let _ = writeln!(out, "  MSF      = {:.4} (applied)", msf);
    let _ = writeln!(out, "  K_σ      = {:.4} (applied)", k_sigma);
    out.push('\n');
    let _ = writeln!(out, "CRR = {:.6}", crr);
}

fn render_footer(out: &mut String, warnings: &[String], equations: &[Equation]) {
    if !warnings.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "Warnings:");
        for w in warnings {
            let _ = writeln!(out, "  [WARN] {}", w);
        }
    }
    if !equations.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "Equations applied:");
        for eq in equations {
            let meta = eq.metadata();
            let _ = writeln!(out, "  - {} ({})", meta.name, meta.reference.short_form());
        }
    }
}

fn render_screening(out: &mut String, result: &ScreeningResult) {
    banner(out, "LIQUEFACTION SCREENING");

    let _ = writeln!(out, "Demand:");
    render_output(out, &AnalysisOutput::Csr(result.demand.clone()));
    out.push('\n');
    let _ = writeln!(out, "Capacity:");
    render_output(out, &result.capacity);

    let mut warnings: Vec<String> = result.demand.warnings.clone();
    warnings.extend(result.capacity.warnings().iter().cloned());
    let mut equations: Vec<Equation> = result.demand.equations.clone();
    for eq in result.capacity.equations() {
        if !equations.contains(eq) {
            equations.push(*eq);
        }
    }
    render_footer(out, &warnings, &equations);

    out.push('\n');
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "  FS = CRR / CSR = {:.4} / {:.4} = {:.3}  {}",
        result.crr,
        result.csr,
        result.factor_of_safety,
        if result.liquefiable { "[LIQUEFIABLE]" } else { "[OK]" }
    );
    let _ = writeln!(out, "{}", RULE);
}
