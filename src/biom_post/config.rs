//! Batch configuration.
//!
//! The compiled-in defaults reproduce the pipeline's fixed directory layout;
//! a TOML file (and a couple of command-line flags) can override any field,
//! which is also how the tests point the batch drivers at scratch space.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Base directory holding one subdirectory per mapping condition.
    #[serde(default = "default_table_base")]
    pub table_base: PathBuf,
    /// Condition subdirectories to process, in order.
    #[serde(default = "default_table_dirs")]
    pub table_dirs: Vec<String>,
    /// Taxonomic levels; each contributes one `<level>.biom` table per
    /// condition directory.
    #[serde(default = "default_levels")]
    pub levels: Vec<String>,
    /// Two-column `GID<TAB>TaxID` lookup used by the gOTU remap.
    #[serde(default = "default_taxonomy_map")]
    pub taxonomy_map: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> BatchConfig {
        BatchConfig {
            table_base: default_table_base(),
            table_dirs: default_table_dirs(),
            levels: default_levels(),
            taxonomy_map: default_taxonomy_map(),
        }
    }
}

impl BatchConfig {
    pub fn from_file(path: &Path) -> Result<BatchConfig> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Reading config file {}", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("Parsing config file {}", path.display()))?;
        Ok(config)
    }
}

fn default_table_base() -> PathBuf {
    PathBuf::from("/ddn_scratch/yac027/03_Bowtie2Benchmark/tables/Test1")
}

fn default_table_dirs() -> Vec<String> {
    [
        "01_k16_no-split",
        "02_a_no-split",
        "03_igor_no-split",
        "04_k16_split4",
        "05_a_split4",
        "06_igor_split4",
        "07_k16_split10",
        "08_a_split10",
        "09_igor_split10",
        "04a_k16_split4a",
        "05a_a_split4a",
        "06a_igor_split4a",
    ]
    .iter()
    .map(|d| d.to_string())
    .collect()
}

fn default_levels() -> Vec<String> {
    ["phylum", "genus", "species"]
        .iter()
        .map(|l| l.to_string())
        .collect()
}

fn default_taxonomy_map() -> PathBuf {
    PathBuf::from("/projects/wol/qiyun/wol2/taxonomy/taxid.map")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: BatchConfig = toml::from_str(
            r#"
            table_base = "/tmp/tables"
            table_dirs = ["c1", "c2"]
            "#,
        )
        .unwrap();
        assert_eq!(config.table_base, PathBuf::from("/tmp/tables"));
        assert_eq!(config.table_dirs, vec!["c1", "c2"]);
        assert_eq!(config.levels, default_levels());
        assert_eq!(config.taxonomy_map, default_taxonomy_map());
    }
}
