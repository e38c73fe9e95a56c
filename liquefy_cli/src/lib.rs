//! # Liquefy CLI Library
//!
//! Request parsing, execution and report rendering behind the `liquefy`
//! binary. Kept in a library so the flow can be tested without spawning a
//! process.
//!
//! A request file holds either one analysis:
//!
//! ```json
//! { "type": "Cpt", "label": "CPT-1", "qt_kpa": 8000.0, "sigma_vc_kpa": 80.0, "sigma_v0_kpa": 80.0 }
//! ```
//!
//! or a screening pair, comparing demand with one resistance analysis:
//!
//! ```json
//! {
//!   "csr": { "label": "BH-1", "layers": [ { "unit_weight_kn_m3": 19.0, "thickness_m": 6.0 } ] },
//!   "crr": { "type": "Spt", "label": "BH-1", "n60": 12.0, "sigma_vc_kpa": 75.0, "sigma_v0_kpa": 75.0 }
//! }
//! ```

pub mod report;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use liquefy_core::calculations::csr::{self, CsrInput, CsrResult};
use liquefy_core::{AnalysisItem, AnalysisOutput, AnalysisSettings, CalcError, CalcResult};

/// A parsed request file.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// A single analysis
    Analysis(AnalysisItem),
    /// Demand and capacity at the same point
    Screening(ScreeningRequest),
}

/// Demand and capacity inputs for a factor-of-safety check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningRequest {
    /// Cyclic stress ratio input
    pub csr: CsrInput,
    /// Any resistance analysis (not CSR)
    pub crr: AnalysisItem,
}

/// Factor-of-safety screening outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    /// Demand side
    pub demand: CsrResult,
    /// Capacity side
    pub capacity: AnalysisOutput,
    pub csr: f64,
    pub crr: f64,
    /// FS = CRR / CSR
    pub factor_of_safety: f64,
    /// FS < 1.0
    pub liquefiable: bool,
}

/// What the CLI prints, in either format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Response {
    Analysis {
        label: String,
        calc_type: String,
        output: AnalysisOutput,
    },
    Screening(ScreeningResult),
}

/// Parse request JSON, choosing the form by the presence of `csr` and `crr` keys.
pub fn parse_request(text: &str) -> anyhow::Result<Request> {
    let value: serde_json::Value = serde_json::from_str(text).context("request is not valid JSON")?;

    let is_screening = value.get("csr").is_some() && value.get("crr").is_some();
    if is_screening {
        let screening: ScreeningRequest =
            serde_json::from_value(value).context("failed to parse screening request")?;
        if !screening.crr.is_resistance() {
            bail!("screening 'crr' must be a resistance analysis, got {}", screening.crr.calc_type());
        }
        Ok(Request::Screening(screening))
    } else {
        let item: AnalysisItem = serde_json::from_value(value).context("failed to parse analysis request")?;
        Ok(Request::Analysis(item))
    }
}

/// Read a request from a file, or from stdin when `path` is `None` or `-`.
pub fn load_request(path: Option<&Path>) -> anyhow::Result<Request> {
    let text = match path {
        Some(p) if p != Path::new("-") => {
            fs::read_to_string(p).with_context(|| format!("failed to read request '{}'", p.display()))?
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read request from stdin")?;
            buf
        }
    };
    parse_request(&text)
}

/// Load analysis settings, falling back to defaults when no file is given.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<AnalysisSettings> {
    let Some(path) = path else {
        return Ok(AnalysisSettings::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("failed to read settings '{}'", path.display()))?;
    let settings: AnalysisSettings =
        serde_json::from_str(&text).with_context(|| format!("failed to parse settings '{}'", path.display()))?;
    Ok(settings)
}

/// Run a request.
pub fn execute(request: &Request, settings: &AnalysisSettings) -> CalcResult<Response> {
    match request {
        Request::Analysis(item) => {
            tracing::debug!(label = item.label(), calc_type = item.calc_type(), "running analysis");
            let output = item.run(settings)?;
            Ok(Response::Analysis {
                label: item.label().to_string(),
                calc_type: item.calc_type().to_string(),
                output,
            })
        }
        Request::Screening(screening) => screen(screening, settings).map(Response::Screening),
    }
}

/// Compare cyclic resistance with cyclic demand at one point.
pub fn screen(request: &ScreeningRequest, settings: &AnalysisSettings) -> CalcResult<ScreeningResult> {
    let demand = csr::calculate(&request.csr)?;
    let capacity = request.crr.run(settings)?;
    let crr = capacity.crr().ok_or_else(|| {
        CalcError::invalid_input("crr", request.crr.calc_type(), "Screening needs a resistance analysis")
    })?;

    let factor_of_safety = crr / demand.csr;
    if !factor_of_safety.is_finite() {
        return Err(CalcError::calculation_failed(
            "Screening",
            format!("factor of safety is not finite (CRR = {}, CSR = {})", crr, demand.csr),
        ));
    }
    let liquefiable = factor_of_safety < 1.0;
    if liquefiable {
        tracing::warn!(label = request.crr.label(), factor_of_safety, "liquefaction triggered");
    }

    Ok(ScreeningResult {
        csr: demand.csr,
        crr,
        factor_of_safety,
        liquefiable,
        demand,
        capacity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SPT_REQUEST: &str = r#"{
        "type": "Spt",
        "label": "BH-1 @ 6 m",
        "n60": 12.0,
        "sigma_vc_kpa": 75.0,
        "sigma_v0_kpa": 75.0,
        "fines": { "source": "Measured", "percent": 15.0 }
    }"#;

    fn screening_json(n60: f64, amax_g: f64) -> String {
        format!(
            r#"{{
                "csr": {{
                    "label": "BH-1 @ 6 m",
                    "layers": [ {{ "unit_weight_kn_m3": 19.0, "thickness_m": 6.0 }} ],
                    "water_table_depth_m": 2.0,
                    "amax_g": {amax_g}
                }},
                "crr": {{
                    "type": "Spt",
                    "label": "BH-1 @ 6 m",
                    "n60": {n60},
                    "sigma_vc_kpa": 74.76,
                    "sigma_v0_kpa": 74.76,
                    "fines": {{ "source": "Measured", "percent": 10.0 }}
                }}
            }}"#
        )
    }

    #[test]
    fn test_parse_single_analysis() {
        let request = parse_request(SPT_REQUEST).unwrap();
        match request {
            Request::Analysis(item) => assert_eq!(item.calc_type(), "SPT"),
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_parse_screening() {
        let request = parse_request(&screening_json(12.0, 0.3)).unwrap();
        assert!(matches!(request, Request::Screening(_)));
    }

    #[test]
    fn test_screening_rejects_csr_as_capacity() {
        let json = r#"{
            "csr": { "label": "A", "layers": [ { "unit_weight_kn_m3": 19.0, "thickness_m": 6.0 } ] },
            "crr": { "type": "Csr", "label": "B", "layers": [ { "unit_weight_kn_m3": 19.0, "thickness_m": 6.0 } ] }
        }"#;
        let err = parse_request(json).unwrap_err();
        assert!(err.to_string().contains("resistance analysis"));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_request("not json").is_err());
        assert!(parse_request(r#"{ "type": "Beam" }"#).is_err());
    }

    #[test]
    fn test_screening_factor_of_safety() {
        let settings = AnalysisSettings::default();

        let Request::Screening(loose) = parse_request(&screening_json(4.0, 0.4)).unwrap() else {
            panic!("expected screening");
        };
        let result = screen(&loose, &settings).unwrap();
        assert!((result.factor_of_safety - result.crr / result.csr).abs() < 1e-12);
        assert!(result.liquefiable);

        let Request::Screening(dense) = parse_request(&screening_json(40.0, 0.1)).unwrap() else {
            panic!("expected screening");
        };
        let result = screen(&dense, &settings).unwrap();
        assert!(!result.liquefiable);
    }

    #[test]
    fn test_execute_reports_calc_errors() {
        let json = SPT_REQUEST.replace("\"sigma_vc_kpa\": 75.0", "\"sigma_vc_kpa\": 0.0");
        let request = parse_request(&json).unwrap();
        let err = execute(&request, &AnalysisSettings::default()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_load_request_and_settings_from_files() {
        let mut request_file = tempfile::NamedTempFile::new().unwrap();
        request_file.write_all(SPT_REQUEST.as_bytes()).unwrap();

        let mut settings_file = tempfile::NamedTempFile::new().unwrap();
        settings_file
            .write_all(br#"{ "solver": { "tolerance": 1e-6 }, "cap_crr_base": false }"#)
            .unwrap();

        let request = load_request(Some(request_file.path())).unwrap();
        let settings = load_settings(Some(settings_file.path())).unwrap();
        assert_eq!(settings.solver.tolerance, 1e-6);
        assert!(!settings.cap_crr_base);

        let response = execute(&request, &settings).unwrap();
        match response {
            Response::Analysis { label, output, .. } => {
                assert_eq!(label, "BH-1 @ 6 m");
                assert!(output.crr().unwrap() > 0.0);
            }
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[test]
    fn test_missing_files_have_context() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = load_request(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("failed to read request"));
        let err = load_settings(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("failed to read settings"));
        assert_eq!(load_settings(None).unwrap(), AnalysisSettings::default());
    }

    #[test]
    fn test_response_json_is_tagged() {
        let request = parse_request(SPT_REQUEST).unwrap();
        let response = execute(&request, &AnalysisSettings::default()).unwrap();
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"kind\":\"Analysis\""));
        assert!(json.contains("\"n1_60cs\""));
    }
}
