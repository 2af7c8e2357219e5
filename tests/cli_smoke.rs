use std::process::Command;

fn bin_path() -> String {
    std::env::var("CARGO_BIN_EXE_schema-validate")
        .unwrap_or_else(|_| "target/debug/schema-validate".to_string())
}

fn sample(file: &str) -> String {
    format!("{}/resources/school/{}", env!("CARGO_MANIFEST_DIR"), file)
}

#[test]
fn cli_reports_rejections_with_exit_code() {
    let output = Command::new(bin_path())
        .args(["--schema", &sample("model.yaml"), "--data", &sample("data.yaml")])
        .output()
        .expect("Failed to run schema-validate");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1), "stdout: {stdout}");
    assert!(stdout.contains("attribute 'Class' references unknown Class.class_id 3"));
    assert!(stdout.contains("Summary: 4 accepted, 2 rejected, 0 mismatched"));
}

#[test]
fn cli_print_order() {
    let output = Command::new(bin_path())
        .args(["--schema", &sample("model.yaml"), "--print-order"])
        .output()
        .expect("Failed to run schema-validate");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "0: Class\n1: Tutor\n2: Student\n"
    );
}

#[test]
fn cli_missing_schema_is_an_error() {
    let output = Command::new(bin_path())
        .args(["--schema", "does-not-exist.yaml", "--data", &sample("data.yaml")])
        .output()
        .expect("Failed to run schema-validate");

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does-not-exist.yaml"));
}
