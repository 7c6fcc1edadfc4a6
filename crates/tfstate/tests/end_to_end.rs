//! End-to-end reads over real files on disk.

use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tfstate::{DiagnosticKind, ErrorKind};

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn test_aggregate_two_services() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "ec2/terraform.tfstate",
        &json!({"version": 3, "modules": [{"path": ["root"], "resources": {
            "aws_instance.web": {"type": "aws_instance", "primary": {"id": "i-0abc"}}
        }}]})
        .to_string(),
    );
    write(
        tmp.path(),
        "s3/terraform.tfstate",
        &json!({"version": 3, "modules": [{"path": ["root"], "resources": {
            "aws_s3_bucket.logs": {"type": "aws_s3_bucket", "primary": {"id": "logs"}}
        }}]})
        .to_string(),
    );

    let state = tfstate::read_aggregated_state(tmp.path()).unwrap();
    assert_eq!(state.len(), 2);
    assert!(state.diagnostics.is_empty());
    assert_eq!(state.get("aws_instance.web").unwrap().resource_type, "aws_instance");
    assert_eq!(
        state.get("aws_s3_bucket.logs").unwrap().resource_type,
        "aws_s3_bucket"
    );
    assert_eq!(
        state.get("aws_s3_bucket.logs").unwrap().source_path.as_deref(),
        Some(tmp.path().join("s3/terraform.tfstate").as_path())
    );
}

#[test]
fn test_aggregate_with_one_corrupt_file() {
    let tmp = TempDir::new().unwrap();
    for (dir, key) in [("a", "aws_vpc.a"), ("b", "aws_vpc.b"), ("c", "aws_vpc.c")] {
        write(
            tmp.path(),
            &format!("{dir}/terraform.tfstate"),
            &json!({"modules": [{"resources": {key: {"type": "aws_vpc"}}}]}).to_string(),
        );
    }
    write(tmp.path(), "bad/terraform.tfstate", "not json at all");

    let state = tfstate::read_aggregated_state(tmp.path()).unwrap();
    assert_eq!(state.len(), 3);
    assert_eq!(state.diagnostics.len(), 1);
    assert_eq!(state.diagnostics[0].kind, DiagnosticKind::Decode);
    assert_eq!(
        state.diagnostics[0].path,
        tmp.path().join("bad/terraform.tfstate")
    );

    let rendered = state.to_json();
    let message = rendered["diagnostics"][0].as_str().unwrap();
    assert!(message.contains("bad/terraform.tfstate"));
}

#[test]
fn test_aggregate_empty_tree() {
    let tmp = TempDir::new().unwrap();
    let state = tfstate::read_aggregated_state(tmp.path()).unwrap();
    assert!(state.is_empty());
    assert!(state.diagnostics.is_empty());
    assert_eq!(state.to_json(), json!({"resources": {}, "diagnostics": []}));
}

#[test]
fn test_baseline_single_entry() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "terraform.tfstate",
        r#"{"resources":[{"type":"aws_instance","name":"web"}]}"#,
    );

    let baseline = tfstate::read_baseline(&tmp.path().join("terraform.tfstate")).unwrap();
    assert_eq!(
        baseline.to_json(),
        json!({"resources": [{"type": "aws_instance", "name": "web"}]})
    );
    assert_eq!(baseline.resources[0].key, "aws_instance.web");
}

#[test]
fn test_baseline_rejects_non_object() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "terraform.tfstate", r#"["aws_instance.web"]"#);

    let err = tfstate::read_baseline(&tmp.path().join("terraform.tfstate")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}
