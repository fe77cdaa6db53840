//! End-to-end tests driving the built binary.

mod common;

use common::{fixture, Harness};

#[test]
fn parse_prints_resolved_fields() {
    let harness = Harness::default();
    let feature = fixture("benefits.feature");
    let out = harness.run(&[
        "parse",
        "--feature",
        feature.to_str().expect("utf-8 path"),
        "--scenario",
        "TC01",
    ]);
    assert!(out.success, "stderr: {}", out.stderr);
    assert!(out.stdout.contains("requestType: GET\n"));
    assert!(out.stdout.contains("uriParams: idType=nino,idValue=SC012822\n"));
    assert!(out.stdout.contains("expectedHttpCode: 200\n"));
}

#[test]
fn parse_json_matches_row() {
    let harness = Harness::default();
    let feature = fixture("benefits.feature");
    let out = harness.run(&[
        "parse",
        "--feature",
        feature.to_str().expect("utf-8 path"),
        "--scenario",
        "tc02",
        "--json",
    ]);
    assert!(out.success, "stderr: {}", out.stderr);
    let details: serde_json::Value = serde_json::from_str(&out.stdout).expect("json output");
    assert_eq!(details["headers"], "x-corr-id=abc");
    assert_eq!(details["kongId"], "kong-2");
    assert_eq!(details["expectedHttpCode"], "404");
    assert_eq!(details["expectedPayload"], "missing.json");
}

#[test]
fn parse_unknown_scenario_fails() {
    let harness = Harness::default();
    let feature = fixture("benefits.feature");
    let out = harness.run(&[
        "parse",
        "--feature",
        feature.to_str().expect("utf-8 path"),
        "--scenario",
        "TC99",
    ]);
    assert!(!out.success);
    assert!(out.stderr.contains("not found"), "stderr: {}", out.stderr);
}

#[test]
fn resolve_fills_template() {
    let harness = Harness::default();
    let out = harness.run(&[
        "resolve",
        "--uri",
        "/individuals/{idType}/{idValue}?taxYear={taxYear}&fromDate={fromDate}",
        "--uri-params",
        "idType=nino,idValue=SC012822",
        "--query-params",
        "taxYear=2022",
    ]);
    assert!(out.success, "stderr: {}", out.stderr);
    assert_eq!(out.stdout, "/individuals/nino/SC012822?taxYear=2022\n");
}

#[test]
fn resolve_rejects_malformed_params() {
    let harness = Harness::default();
    let out = harness.run(&["resolve", "--uri", "/users/{id}", "--uri-params", "a=1,b"]);
    assert!(!out.success);
    assert!(out.stderr.contains("format error"), "stderr: {}", out.stderr);
}

#[test]
fn run_requires_a_token() {
    let harness = Harness::default();
    let scenarios = harness.write(
        "api_with_scenarios.json",
        r#"[{"api_number": "1234", "sc_no": "TC01"}]"#,
    );
    let out = harness.run(&[
        "run",
        "--scenarios",
        scenarios.to_str().expect("utf-8 path"),
        "--gitlab-url",
        "http://127.0.0.1:9",
    ]);
    assert!(!out.success);
    assert!(out.stderr.contains("GITLAB_TOKEN"), "stderr: {}", out.stderr);
}

#[test]
fn run_skips_when_gitlab_is_unreachable() {
    let harness = Harness::default();
    let scenarios = harness.write(
        "api_with_scenarios.json",
        r#"[{"api_number": "1234", "sc_no": "TC01"}]"#,
    );
    let out_dir = harness.path().join("out");
    let out = harness.run(&[
        "run",
        "--scenarios",
        scenarios.to_str().expect("utf-8 path"),
        "--gitlab-url",
        "http://127.0.0.1:9",
        "--token",
        "secret",
        "--throttle-ms",
        "0",
        "--output-dir",
        out_dir.to_str().expect("utf-8 path"),
        "--json",
    ]);
    assert!(out.success, "stderr: {}", out.stderr);
    let summary: serde_json::Value = serde_json::from_str(&out.stdout).expect("json summary");
    assert_eq!(summary["processed"], 1);
    assert_eq!(summary["skipped"], 1);
    assert_eq!(summary["written"], 0);
}
