//! Sample-ID grouping keys for the collapse transform.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::table::BiomTable;

static INDEX_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"_index\d+$").unwrap());

/// Strips a trailing `_index<digits>` suffix; IDs without the suffix are
/// returned unchanged, so the operation is idempotent.
pub fn strip_index(sample_id: &str) -> String {
    INDEX_SUFFIX.replace(sample_id, "").into_owned()
}

/// Where the sample-to-group mapping comes from.
#[derive(Debug, Clone)]
pub enum SampleMapSource {
    /// Derive the mapping from the table's own sample IDs by stripping the
    /// index suffix. Total over the table by construction.
    StripIndex,
    /// Load an explicit `raw-id<TAB>group-id` table. May be partial, in
    /// which case the collapse fails on any uncovered sample ID.
    File(PathBuf),
}

impl SampleMapSource {
    pub fn mapping_for(&self, table: &BiomTable) -> Result<HashMap<String, String>> {
        match self {
            SampleMapSource::StripIndex => Ok(table
                .sample_ids
                .iter()
                .map(|sid| (sid.clone(), strip_index(sid)))
                .collect()),
            SampleMapSource::File(path) => {
                let fh = File::open(path)
                    .with_context(|| format!("Opening sample map {}", path.display()))?;
                read_sample_map(fh)
                    .with_context(|| format!("Reading sample map {}", path.display()))
            }
        }
    }
}

pub fn read_sample_map<R: Read>(input: R) -> Result<HashMap<String, String>> {
    let mut mapping = HashMap::new();

    for (line_no, line_res) in BufReader::new(input).lines().enumerate() {
        let line = line_res?;
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let raw = fields
            .next()
            .ok_or_else(|| anyhow::anyhow!("Missing sample ID line {}", line_no))?;
        let group = match fields.next() {
            Some(group) => group,
            None => bail!("Missing group ID line {} sample {}", line_no, raw),
        };
        mapping.insert(raw.trim().to_string(), group.trim().to_string());
    }

    Ok(mapping)
}
