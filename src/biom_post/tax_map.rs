//! Taxonomic ID to genome/gOTU ID lookup.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

/// Mapping from TaxID to genome ID, loaded from a two-column tab-separated
/// file of `GID<TAB>TaxID` pairs. Blank lines and lines with fewer than two
/// fields are ignored. When several GIDs claim the same TaxID the first one
/// seen wins; the number of TaxIDs affected is kept for reporting.
pub struct TaxMap {
    tax2gid: HashMap<String, String>,
    duplicates: usize,
}

impl TaxMap {
    pub fn from_file(path: &Path) -> Result<TaxMap> {
        let fh = File::open(path)
            .with_context(|| format!("Opening taxonomy map {}", path.display()))?;
        Self::read(fh).with_context(|| format!("Reading taxonomy map {}", path.display()))
    }

    pub fn read<R: Read>(input: R) -> Result<TaxMap> {
        let mut tax2gid = HashMap::new();
        let mut dup_taxids = HashSet::new();

        for line_res in BufReader::new(input).lines() {
            let line = line_res?;
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split('\t');
            let gid = match fields.next() {
                Some(gid) => gid.trim(),
                None => continue,
            };
            let taxid = match fields.next() {
                Some(taxid) => taxid.trim(),
                None => continue,
            };
            if tax2gid.contains_key(taxid) {
                dup_taxids.insert(taxid.to_string());
            } else {
                tax2gid.insert(taxid.to_string(), gid.to_string());
            }
        }

        Ok(TaxMap {
            tax2gid,
            duplicates: dup_taxids.len(),
        })
    }

    pub fn mapping(&self) -> &HashMap<String, String> {
        &self.tax2gid
    }

    /// Distinct TaxIDs that appeared with more than one GID.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.tax2gid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tax2gid.is_empty()
    }
}
