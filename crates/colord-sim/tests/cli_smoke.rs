use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

const SMALL_EXPERIMENT: &str = "\
grid:
  train_sizes: [20, 50]
  repetitions: 1
  ordering_strategies: [original, random]
model:
  test_size: 200
  propensity_iterations: 50
";

fn colord_sim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_colord-sim"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn colord-sim")
}

fn write_config(dir: &Path, text: &str) -> String {
    let path = dir.join("experiment.yaml");
    fs::write(&path, text).unwrap();
    path.display().to_string()
}

#[test]
fn run_then_rerun_is_idempotent() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), SMALL_EXPERIMENT);
    let output = dir.path().join("out").display().to_string();

    let first = colord_sim(&["-q", "run", "--config", &config, "--output", &output]);
    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    let results = Path::new(&output).join("results.csv");
    let table = fs::read(&results).unwrap();
    assert!(!Path::new(&output).join("checkpoint.json").exists());
    let stdout = String::from_utf8_lossy(&first.stdout);
    assert!(stdout.contains("4 executed"));
    assert!(stdout.contains("best:"));

    let second = colord_sim(&["-q", "run", "--config", &config, "--output", &output]);
    assert!(second.status.success());
    assert!(String::from_utf8_lossy(&second.stdout).contains("0 executed"));
    assert_eq!(fs::read(&results).unwrap(), table);

    let status = colord_sim(&["status", "--config", &config, "--output", &output]);
    assert!(status.status.success());
    assert!(String::from_utf8_lossy(&status.stdout).contains("sweep complete: 4 rows"));

    let summary = colord_sim(&["summarize", "--input", &results.display().to_string()]);
    assert!(summary.status.success());
    assert!(String::from_utf8_lossy(&summary.stdout).contains("k_marginal_tvd"));
}

#[test]
fn unknown_strategy_fails_with_message() {
    let dir = tempdir().unwrap();
    let config = write_config(
        dir.path(),
        "grid:\n  train_sizes: [20]\n  ordering_strategies: [original, sideways]\n",
    );
    let output = dir.path().join("out").display().to_string();
    let result = colord_sim(&["-q", "run", "--config", &config, "--output", &output]);
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("sideways"));
    assert!(stderr.contains("topological"));
}

#[test]
fn corrupt_checkpoint_exits_non_zero_and_names_it() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), SMALL_EXPERIMENT);
    let out = dir.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("checkpoint.json"), b"not json").unwrap();
    let result = colord_sim(&[
        "-q",
        "run",
        "--config",
        &config,
        "--output",
        &out.display().to_string(),
    ]);
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("CorruptCheckpoint"));
    assert!(stderr.contains("checkpoint.json"));
}

#[test]
fn orderings_lists_every_strategy() {
    let result = colord_sim(&["orderings"]);
    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("topological  [2, 0, 1, 3] (C, A, B, D)"));
    assert!(stdout.contains("worst        [3, 1, 0, 2] (D, B, A, C)"));
    assert!(stdout.contains("random"));
}

#[test]
fn status_without_checkpoint_reports_not_started() {
    let dir = tempdir().unwrap();
    let result = colord_sim(&[
        "status",
        "--output",
        &dir.path().join("nothing").display().to_string(),
    ]);
    assert!(result.status.success());
    assert!(String::from_utf8_lossy(&result.stdout).contains("not started (200 units)"));
}
