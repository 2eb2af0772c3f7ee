//! BIOM-style sparse abundance tables.
//!
//! A table is a sparse matrix of counts with observations (features) as rows
//! and samples as columns, plus a label array and optional metadata per axis.
//! On disk it is a self-describing document in one of two encodings: a binary
//! container (magic bytes followed by a bincode payload) or a BIOM-1.0-shaped
//! JSON serialization. Loading auto-detects the encoding, falling back to
//! JSON when the magic bytes are absent.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sprs::{CsMat, TriMat};

pub const BIOM_FORMAT: &str = "Biological Observation Matrix 1.0.0";
pub const BIOM_FORMAT_URL: &str = "http://biom-format.org";

const MAGIC: &[u8; 8] = b"BIOMTBL\0";

/// Per-axis-entry metadata, e.g. a taxonomy lineage keyed by `"taxonomy"`.
pub type Metadata = BTreeMap<String, Vec<String>>;

/// On-disk output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Magic bytes plus bincode payload.
    Binary,
    /// BIOM 1.0 JSON document.
    Json,
}

impl TableFormat {
    pub fn from_name(name: &str) -> Result<TableFormat> {
        match name {
            "biom" => Ok(TableFormat::Binary),
            "json" => Ok(TableFormat::Json),
            _ => bail!("Unknown table format {:?}, expected biom or json", name),
        }
    }
}

pub struct BiomTable {
    pub matrix: CsMat<f64>,
    pub observation_ids: Vec<String>,
    pub sample_ids: Vec<String>,
    pub observation_metadata: Vec<Option<Metadata>>,
    pub sample_metadata: Vec<Option<Metadata>>,
}

impl BiomTable {
    pub fn new(
        matrix: CsMat<f64>,
        observation_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> BiomTable {
        let n_obs = observation_ids.len();
        let n_samples = sample_ids.len();
        BiomTable {
            matrix,
            observation_ids,
            sample_ids,
            observation_metadata: vec![None; n_obs],
            sample_metadata: vec![None; n_samples],
        }
    }

    /// Builds a table from `(row, column, value)` triplets. Duplicate
    /// positions are summed.
    pub fn from_triplets(
        observation_ids: Vec<String>,
        sample_ids: Vec<String>,
        triplets: &[(usize, usize, f64)],
    ) -> BiomTable {
        let mut tri = TriMat::new((observation_ids.len(), sample_ids.len()));
        for &(i, j, v) in triplets {
            tri.add_triplet(i, j, v);
        }
        BiomTable::new(tri.to_csr(), observation_ids, sample_ids)
    }

    /// `(features, samples)`
    pub fn shape(&self) -> (usize, usize) {
        (self.observation_ids.len(), self.sample_ids.len())
    }

    /// Flattens the table into `(observation id, sample id) -> value`,
    /// mostly useful for comparisons in tests.
    pub fn to_map(&self) -> HashMap<(String, String), f64> {
        let mut entries = HashMap::new();
        for (value, (i, j)) in self.matrix.iter() {
            entries.insert(
                (self.observation_ids[i].clone(), self.sample_ids[j].clone()),
                *value,
            );
        }
        entries
    }

    pub fn load(path: &Path) -> Result<BiomTable> {
        let bytes =
            fs::read(path).with_context(|| format!("Reading table {}", path.display()))?;
        let doc: TableDoc = if bytes.len() >= MAGIC.len() && &bytes[..MAGIC.len()] == MAGIC {
            bincode::deserialize(&bytes[MAGIC.len()..])
                .with_context(|| format!("Decoding binary table {}", path.display()))?
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("Decoding JSON table {}", path.display()))?
        };
        doc.into_table()
            .with_context(|| format!("Malformed table {}", path.display()))
    }

    pub fn write(&self, path: &Path, format: TableFormat, generated_by: &str) -> Result<()> {
        let doc = TableDoc::from_table(self, generated_by);
        let bytes = match format {
            TableFormat::Binary => {
                let mut bytes = MAGIC.to_vec();
                bytes.extend(bincode::serialize(&doc)?);
                bytes
            }
            TableFormat::Json => serde_json::to_vec(&doc)?,
        };
        fs::write(path, bytes).with_context(|| format!("Writing table {}", path.display()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AxisEntry {
    id: String,
    metadata: Option<Metadata>,
}

/// Self-describing serialized form shared by both encodings, shaped after
/// the BIOM 1.0 JSON schema.
#[derive(Debug, Serialize, Deserialize)]
struct TableDoc {
    id: Option<String>,
    format: String,
    format_url: String,
    #[serde(rename = "type")]
    table_type: String,
    generated_by: String,
    date: String,
    matrix_type: String,
    matrix_element_type: String,
    shape: (usize, usize),
    rows: Vec<AxisEntry>,
    columns: Vec<AxisEntry>,
    data: Vec<(usize, usize, f64)>,
}

impl TableDoc {
    fn from_table(table: &BiomTable, generated_by: &str) -> TableDoc {
        let rows = table
            .observation_ids
            .iter()
            .zip(table.observation_metadata.iter())
            .map(|(id, md)| AxisEntry {
                id: id.clone(),
                metadata: md.clone(),
            })
            .collect();
        let columns = table
            .sample_ids
            .iter()
            .zip(table.sample_metadata.iter())
            .map(|(id, md)| AxisEntry {
                id: id.clone(),
                metadata: md.clone(),
            })
            .collect();
        let data = table
            .matrix
            .iter()
            .map(|(value, (i, j))| (i, j, *value))
            .collect();

        TableDoc {
            id: None,
            format: BIOM_FORMAT.to_string(),
            format_url: BIOM_FORMAT_URL.to_string(),
            table_type: "OTU table".to_string(),
            generated_by: generated_by.to_string(),
            date: Utc::now().to_rfc3339(),
            matrix_type: "sparse".to_string(),
            matrix_element_type: "float".to_string(),
            shape: table.shape(),
            rows,
            columns,
            data,
        }
    }

    fn into_table(self) -> Result<BiomTable> {
        let (n_obs, n_samples) = self.shape;
        if self.rows.len() != n_obs {
            bail!(
                "Declared {} rows but found {} row entries",
                n_obs,
                self.rows.len()
            );
        }
        if self.columns.len() != n_samples {
            bail!(
                "Declared {} columns but found {} column entries",
                n_samples,
                self.columns.len()
            );
        }

        let mut tri = TriMat::new((n_obs, n_samples));
        for &(i, j, value) in self.data.iter() {
            if i >= n_obs || j >= n_samples {
                bail!(
                    "Data entry ({}, {}) outside of shape {}x{}",
                    i,
                    j,
                    n_obs,
                    n_samples
                );
            }
            tri.add_triplet(i, j, value);
        }

        let (observation_ids, observation_metadata) =
            self.rows.into_iter().map(|e| (e.id, e.metadata)).unzip();
        let (sample_ids, sample_metadata) =
            self.columns.into_iter().map(|e| (e.id, e.metadata)).unzip();

        Ok(BiomTable {
            matrix: tri.to_csr(),
            observation_ids,
            sample_ids,
            observation_metadata,
            sample_metadata,
        })
    }
}
