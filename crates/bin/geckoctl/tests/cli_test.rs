//! End-to-end tests driving the compiled `geckoctl` binary against the virtual rig.
//!
//! Each test runs in its own temporary directory so no `geckoctl.toml` from
//! the developer's machine is picked up.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const PLAN: &str = r#"
repeat = 2

[[steps]]
axis = "X"
[steps.stop]
conditions = [{ metric = "Fx (N)", comparator = ">=", threshold = 5 }]

[[steps]]
axis = "Z"
enabled = false
"#;

fn geckoctl(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_geckoctl"))
        .args(args)
        .current_dir(dir.path())
        .env("GECKO_BACKEND", "virtual")
        .env_remove("GECKO_BACKEND_URL")
        .env_remove("GECKO_TIMEOUT_SECS")
        .env_remove("GECKO_LOG")
        .env_remove("GECKOCTL_CONFIG")
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

fn write_plan(dir: &TempDir) -> String {
    let path = dir.path().join("plan.toml");
    std::fs::write(&path, PLAN).unwrap();
    path.display().to_string()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// Offline commands
// ---------------------------------------------------------------------------

#[test]
fn should_print_labels_and_summaries() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir);

    let output = geckoctl(&dir, &["summary", &plan]);

    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Step 1: Move X Axis"));
    assert!(text.contains("  - Axis X stops moving if Fx >= 5N"));
    assert!(text.contains("Step 2: Move Z Axis"));
    assert!(text.contains("  This action has no start/stop/hold triggers defined."));
}

#[test]
fn should_export_categorized_program() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir);
    let target = dir.path().join("program.json");

    let output = geckoctl(
        &dir,
        &["export", &plan, "--output", &target.display().to_string()],
    );

    assert!(output.status.success(), "{}", stderr(&output));
    let program: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(program["X"][0]["type"], "move-X-axis");
    assert_eq!(program["Z"][0]["data"], serde_json::json!({}));
    assert_eq!(program["repeat"], 2);
}

#[test]
fn should_fail_on_plan_breaking_trigger_rules() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(
        &path,
        "[[steps]]\naxis = \"X\"\n[steps.hold]\nconditions = [{ metric = \"Fx\", threshold = 1 }]\n",
    )
    .unwrap();

    let output = geckoctl(&dir, &["summary", &path.display().to_string()]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("step 1"));
}

#[test]
fn should_reject_invalid_config_file() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir);
    std::fs::write(dir.path().join("geckoctl.toml"), "[backend]\ntimeout_secs = 0\n").unwrap();

    let output = geckoctl(&dir, &["summary", &plan]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("timeout"));
}

// ---------------------------------------------------------------------------
// Virtual rig
// ---------------------------------------------------------------------------

#[test]
fn should_refuse_run_before_motor_check() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir);

    let output = geckoctl(&dir, &["run", &plan]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("motor check has not completed yet"));
}

#[test]
fn should_run_after_confirmed_motor_check() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir);

    let output = geckoctl(&dir, &["run", &plan, "--motor-checked"]);

    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Sequence submitted (2 steps)"));
    assert!(text.contains("[rig] Sequence started"));
    assert!(text.contains("[rig] X: Step 0 is completed!"));
    assert!(text.contains("[rig] Sequence complete"));
}

#[test]
fn should_show_latest_rig_log_when_run_overflows_telemetry_buffer() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("long.toml");
    std::fs::write(&path, "[[steps]]\naxis = \"X\"\n".repeat(300)).unwrap();

    let output = geckoctl(
        &dir,
        &["run", &path.display().to_string(), "--motor-checked"],
    );

    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Sequence submitted (300 steps)"));
    assert!(text.contains("earlier events not shown"));
    assert!(text.contains("[rig] X: Step 299 is completed!"));
    assert!(text.contains("[rig] Sequence complete"));
    assert!(text.contains("[rig] steps X 3000 | Y 0 | Z 0"));
}

#[test]
fn should_report_rig_log_for_commands() {
    let dir = TempDir::new().unwrap();

    let output = geckoctl(&dir, &["calibrate", "--fx", "0.98"]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("[rig] Calibration updated."));
}

#[test]
fn should_download_then_upload_program_file() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir);

    let output = geckoctl(&dir, &["download", &plan]);
    assert!(output.status.success(), "{}", stderr(&output));

    let saved = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .find(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("export_"))
        })
        .unwrap();
    assert!(Path::new(&saved).extension().is_some_and(|e| e == "json"));

    let output = geckoctl(&dir, &["upload", &saved.display().to_string()]);

    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Step 1: Move X Axis"));
    assert!(text.contains("Step 2: Move Z Axis"));
}
