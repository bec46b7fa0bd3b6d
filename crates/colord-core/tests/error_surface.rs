use colord_core::errors::{ErrorInfo, SweepError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("train_size", "20")
        .with_context("repetition", "0")
}

#[test]
fn corrupt_checkpoint_surface() {
    let err = SweepError::CorruptCheckpoint(sample_info("checkpoint-parse", "bad json"));
    assert_eq!(err.info().code, "checkpoint-parse");
    assert!(err.info().context.contains_key("train_size"));
    assert!(err.to_string().starts_with("corrupt checkpoint:"));
}

#[test]
fn reproducibility_surface() {
    let err = SweepError::Reproducibility(sample_info("hash-mismatch", "train hash changed"));
    assert_eq!(err.info().code, "hash-mismatch");
    assert!(err.info().context.contains_key("repetition"));
}

#[test]
fn executor_surface() {
    let err = SweepError::Executor(sample_info("fit-failed", "singular system"));
    assert_eq!(err.info().code, "fit-failed");
}

#[test]
fn display_includes_context_and_hint() {
    let err = SweepError::Config(
        ErrorInfo::new("unknown-strategy", "unknown ordering strategy")
            .with_context("strategy", "sideways")
            .with_hint("available: original, topological"),
    );
    let rendered = err.to_string();
    assert!(rendered.contains("strategy=sideways"));
    assert!(rendered.contains("hint: available: original, topological"));
}

#[test]
fn io_helper_records_path() {
    let err = SweepError::io("table-write", std::path::Path::new("/tmp/out.csv"), "denied");
    assert_eq!(err.info().context.get("path").map(String::as_str), Some("/tmp/out.csv"));
}

#[test]
fn errors_roundtrip_through_json() {
    let err = SweepError::Serde(sample_info("S001", "schema mismatch"));
    let json = serde_json::to_string(&err).unwrap();
    let restored: SweepError = serde_json::from_str(&json).unwrap();
    assert_eq!(err, restored);
}
