use std::fs;
use std::path::{Path, PathBuf};

use colord_core::errors::{ErrorInfo, SweepError};
use colord_exp::grid::WorkUnit;
use nalgebra::DMatrix;

/// Rows kept in every sample file.
pub const SAMPLE_ROWS: usize = 10;

/// Writes the head of the train, test and synthetic matrices of one unit.
///
/// Files are named `order_{strategy}_size{n}_rep{r}_{part}.csv`.
pub fn write_data_samples(
    dir: &Path,
    unit: &WorkUnit,
    header: &[String],
    parts: [(&str, &DMatrix<f64>); 3],
) -> Result<Vec<PathBuf>, SweepError> {
    fs::create_dir_all(dir).map_err(|err| SweepError::io("samples-mkdir", dir, err))?;
    let prefix = format!(
        "order_{}_size{}_rep{}",
        unit.ordering_strategy, unit.train_size, unit.repetition
    );
    let mut written = Vec::with_capacity(parts.len());
    for (part, data) in parts {
        let path = dir.join(format!("{prefix}_{part}.csv"));
        write_head(&path, header, data)?;
        written.push(path);
    }
    Ok(written)
}

fn write_head(path: &Path, header: &[String], data: &DMatrix<f64>) -> Result<(), SweepError> {
    let wrap = |err: csv::Error| {
        SweepError::Io(
            ErrorInfo::new("samples-write", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    };
    let mut writer = csv::Writer::from_path(path).map_err(wrap)?;
    writer.write_record(header).map_err(wrap)?;
    for row in 0..data.nrows().min(SAMPLE_ROWS) {
        let record: Vec<String> = data.row(row).iter().map(|v| v.to_string()).collect();
        writer.write_record(&record).map_err(wrap)?;
    }
    writer
        .flush()
        .map_err(|err| SweepError::io("samples-flush", path, err))
}
