//! Directory iteration shared by the batch tools.
//!
//! Missing condition directories and missing table files are warned about
//! and skipped; any other failure aborts the batch.

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::warn;

use crate::config::BatchConfig;

/// Visits `<table_base>/<dir>/<file>` for every configured condition
/// directory and every file name produced by `file_name` from the
/// configured levels.
pub fn for_each_table<N, F>(config: &BatchConfig, file_name: N, mut op: F) -> Result<()>
where
    N: Fn(&str) -> String,
    F: FnMut(&Path) -> Result<()>,
{
    for dir in config.table_dirs.iter() {
        let dir_path = config.table_base.join(dir);
        if !dir_path.is_dir() {
            warn!("Missing directory {}, skipping.", dir_path.display());
            continue;
        }

        for level in config.levels.iter() {
            let in_fp = dir_path.join(file_name(level));
            if !in_fp.is_file() {
                warn!("Missing file {}, skipping.", in_fp.display());
                continue;
            }
            op(&in_fp)?;
        }
    }

    Ok(())
}

/// Derives an output path by inserting `suffix` before the input's
/// extension; inputs without an extension get `.biom`.
pub fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "biom".to_string());
    input.with_file_name(format!("{}{}.{}", stem, suffix, ext))
}
