//! Extremo a extremo: fachada y binario `reviewflow` sobre archivos JSON.
use std::path::PathBuf;
use std::process::Command;

use review_adapters::{BarChartConfig, BarChartVisualizer, RatingAnalyser, RatingAnalyserConfig};
use review_core::{Analysis, AnalysisConfig, SequentialIdGenerator, Workflow, WorkflowConfig};
use reviewflow_rust::config::AppConfig;
use reviewflow_rust::{load_analysis, load_table, parse_mappings, registry, run_analysis, CoreError};
use serde_json::json;
use uuid::Uuid;

struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("reviewflow-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn analysis_json() -> String {
    let ids = SequentialIdGenerator::new("e2e-");
    let wf = Workflow::with_generator(WorkflowConfig::new("Ratings").with_filter("rating > 1"), &ids)
        .add(RatingAnalyser::with_generator(RatingAnalyserConfig { fill_rating_gaps: true,
                                                                   ..Default::default() },
                                            &ids))
        .unwrap()
        .add(BarChartVisualizer::with_generator(BarChartConfig { category_field: "rating".into(),
                                                                 target_field: "frequency".into(),
                                                                 use_result: Some("rating_histogram".into()),
                                                                 ..Default::default() },
                                                &ids))
        .unwrap();
    Analysis::with_generator(AnalysisConfig::new("e2e"), &ids).add(wf)
                                                             .unwrap()
                                                             .to_schema()
                                                             .unwrap()
                                                             .to_json()
                                                             .unwrap()
}

const DATASET: &str = r#"[
    {"stars": 5, "review": "loved it"},
    {"stars": 4, "review": "good"},
    {"stars": 1, "review": "awful"},
    {"stars": 5, "review": "perfect"}
]"#;

#[test]
fn facade_runs_a_serialized_analysis() {
    let scratch = Scratch::new();
    let analysis_path = scratch.write("analysis.json", &analysis_json());
    let dataset_path = scratch.write("dataset.json", DATASET);

    let ids = SequentialIdGenerator::new("x-");
    let mut analysis = load_analysis(&analysis_path, &registry(), &ids).unwrap();
    let mut table = load_table(&dataset_path).unwrap();
    let runtime = AppConfig::default().runtime().unwrap();
    let mapping = parse_mappings(&["rating=stars"]).unwrap();

    let report = run_analysis(&mut analysis, &runtime, &mut table, &mapping, None).unwrap();
    assert_eq!(report["analysis_id"], json!(analysis.id()));
    assert_eq!(report["rows"], json!(3));
    assert_eq!(report["fields"]["rating"], json!("int"));

    let wf_id = analysis.workflows()[0].id().to_string();
    let steps = report["results"][&wf_id].as_object().unwrap();
    assert_eq!(steps.len(), 2);
    let histogram = &steps.values().next().unwrap()[0];
    assert_eq!(histogram["name"], json!("rating_histogram"));
    assert_eq!(histogram["type"], json!("dataset"));
}

#[test]
fn facade_reports_missing_mapping_as_validation_failure() {
    let scratch = Scratch::new();
    let analysis_path = scratch.write("analysis.json", &analysis_json());
    let mut analysis = load_analysis(&analysis_path, &registry(), &SequentialIdGenerator::new("x-")).unwrap();
    let mut table = load_table(scratch.write("dataset.json", DATASET)).unwrap();
    let runtime = AppConfig::default().runtime().unwrap();

    let err = run_analysis(&mut analysis, &runtime, &mut table, &Default::default(), None).unwrap_err();
    assert!(matches!(err, CoreError::Engine(_)));
    assert_eq!(err.exit_code(), 4);

    let err = run_analysis(&mut analysis,
                           &runtime,
                           &mut table,
                           &parse_mappings(&["rating=stars"]).unwrap(),
                           Some(1.5)).unwrap_err();
    assert_eq!(err.exit_code(), 5);
}

fn reviewflow(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_reviewflow")).args(args)
                                                  .env("REVIEWFLOW_LOG", "off")
                                                  .output()
                                                  .unwrap()
}

#[test]
fn binary_commands_and_exit_codes() {
    let scratch = Scratch::new();
    let analysis_path = scratch.write("analysis.json", &analysis_json());
    let dataset_path = scratch.write("dataset.json", DATASET);
    let analysis = analysis_path.to_str().unwrap();
    let dataset = dataset_path.to_str().unwrap();

    let out = reviewflow(&["classes"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("review_adapters::steps::BarChartVisualizer"));

    let out = reviewflow(&["fields", analysis]);
    assert_eq!(out.status.code(), Some(0));
    let fields: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(fields["required"]["rating"]["dtype"], json!("int"));

    let out = reviewflow(&["run", analysis, dataset, "rating=stars", "--train-fraction", "0.5"]);
    assert_eq!(out.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["rows"], json!(3));

    assert_eq!(reviewflow(&[]).status.code(), Some(2));
    assert_eq!(reviewflow(&["run", analysis]).status.code(), Some(2));
    assert_eq!(reviewflow(&["run", analysis, dataset]).status.code(), Some(4));

    let broken = scratch.write("broken.json", r#"{"config": {"name": "b"}, "workflows": [{"config": {"name": "w"},
        "steps": [{"module": "nowhere", "classname": "Nothing"}]}]}"#);
    assert_eq!(reviewflow(&["results", broken.to_str().unwrap()]).status.code(), Some(4));
}
