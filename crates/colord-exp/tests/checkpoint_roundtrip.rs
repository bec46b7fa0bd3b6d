use std::fs;

use colord_core::errors::SweepError;
use colord_exp::checkpoint::{CheckpointPayload, CHECKPOINT_SCHEMA};
use colord_exp::{CheckpointStore, Cursor, ResultRow, WorkUnit};
use tempfile::tempdir;

fn sample_rows() -> Vec<ResultRow> {
    ["original", "random"]
        .iter()
        .map(|strategy| {
            let unit = WorkUnit {
                train_idx: 0,
                train_size: 20,
                repetition: 0,
                ordering_strategy: strategy.to_string(),
            };
            let mut row = ResultRow::new("autoregressive", &unit, 42, false, &[3, 1, 0, 2]);
            row.insert_metric("mean_corr_difference", Some(0.1 + 0.2));
            row.insert_metric("propensity_metrics_pmse", Some(1.0 / 3.0));
            row.insert_metric("k_marginal_tvd", None);
            row
        })
        .collect()
}

#[test]
fn saved_rows_load_back_exactly() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::new(dir.path().join("checkpoint.json")).with_grid_hash("abc");
    let rows = sample_rows();
    store.save(&rows, Cursor::new(0, 1)).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.rows, rows);
    assert_eq!(loaded.cursor, Cursor::new(0, 1));
    assert_eq!(loaded.grid_hash.as_deref(), Some("abc"));
    assert_eq!(loaded.rows[0].metrics["propensity_metrics_pmse"], Some(1.0 / 3.0));

    let keys: Vec<_> = loaded.rows[0].metrics.keys().cloned().collect();
    assert_eq!(
        keys,
        ["mean_corr_difference", "propensity_metrics_pmse", "k_marginal_tvd"]
    );
}

#[test]
fn missing_checkpoint_means_fresh_start() {
    let dir = tempdir().unwrap();
    let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
    let loaded = store.load().unwrap();
    assert!(loaded.rows.is_empty());
    assert_eq!(loaded.cursor, Cursor::new(0, 0));
    assert!(loaded.grid_hash.is_none());
}

#[test]
fn unparsable_checkpoint_is_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("checkpoint.json");
    fs::write(&path, b"[1, 2").unwrap();
    let err = CheckpointStore::new(&path).load().unwrap_err();
    assert!(matches!(err, SweepError::CorruptCheckpoint(_)));
    assert_eq!(err.info().code, "checkpoint-parse");
    assert_eq!(err.info().context["path"], path.display().to_string());
}

#[test]
fn cursor_without_rows_is_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("checkpoint.json");
    let payload = CheckpointPayload {
        schema_version: CHECKPOINT_SCHEMA,
        grid_hash: None,
        train_idx: 1,
        rep_idx: 2,
        rows: Vec::new(),
    };
    fs::write(&path, serde_json::to_vec(&payload).unwrap()).unwrap();
    let err = CheckpointStore::new(&path).load().unwrap_err();
    assert_eq!(err.info().code, "checkpoint-cursor");
}

#[test]
fn checkpoint_without_grid_hash_still_loads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("checkpoint.json");
    let rows = serde_json::to_value(sample_rows()).unwrap();
    let legacy = serde_json::json!({
        "schema_version": { "major": 1, "minor": 0, "patch": 0 },
        "train_idx": 0,
        "rep_idx": 1,
        "rows": rows,
    });
    fs::write(&path, serde_json::to_vec(&legacy).unwrap()).unwrap();
    let loaded = CheckpointStore::new(&path).load().unwrap();
    assert_eq!(loaded.completed_count(), 2);
    assert!(loaded.grid_hash.is_none());
}

#[test]
fn cleanup_removes_file_and_temp() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("checkpoint.json");
    let store = CheckpointStore::new(&path);
    store.save(&sample_rows(), Cursor::new(0, 1)).unwrap();
    fs::write(dir.path().join("checkpoint.json.tmp"), b"partial").unwrap();
    store.cleanup().unwrap();
    assert!(!path.exists());
    assert!(!dir.path().join("checkpoint.json.tmp").exists());
    store.cleanup().unwrap();
}
