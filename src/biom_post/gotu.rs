//! Batch remap of taxonomic row labels to gOTU/genome IDs.

use std::path::Path;

use anyhow::Result;
use log::{info, warn};

use crate::batch::{for_each_table, output_path};
use crate::config::BatchConfig;
use crate::table::{BiomTable, TableFormat};
use crate::tax_map::TaxMap;
use crate::transform::{map_axis, Aggregate, Axis, OnMissing};

pub struct CLI {
    pub config: BatchConfig,
    pub format: TableFormat,
}

impl CLI {
    pub fn run(&self) -> Result<()> {
        // One load per invocation, shared read-only across all tables.
        let tax_map = TaxMap::from_file(&self.config.taxonomy_map)?;
        if tax_map.duplicates() > 0 {
            warn!(
                "{} TaxIDs map to multiple GIDs; using first seen per TaxID.",
                tax_map.duplicates()
            );
        }

        for_each_table(
            &self.config,
            |level| format!("{}_collapsed.biom", level),
            |in_fp| self.remap_one(in_fp, &tax_map),
        )?;
        info!("Finished gOTU remapping for all collapsed tables.");
        Ok(())
    }

    fn remap_one(&self, in_fp: &Path, tax_map: &TaxMap) -> Result<()> {
        let out_fp = output_path(in_fp, "_gOTU");
        info!("Remapping {} -> {}", in_fp.display(), out_fp.display());

        let table = BiomTable::load(in_fp)?;
        let mapped = map_axis(
            &table,
            Axis::Observation,
            tax_map.mapping(),
            Aggregate::Replace,
            OnMissing::Identity,
        )?;
        mapped.table.write(&out_fp, self.format, &generated_by())?;

        if mapped.missing > 0 {
            let name = in_fp
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| in_fp.display().to_string());
            info!(
                "{} features in {} not found in map; left unchanged.",
                mapped.missing, name
            );
        }

        Ok(())
    }
}

fn generated_by() -> String {
    format!("biom-gotu {}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaps_rows_with_identity_fallback() {
        let scratch = tempfile::tempdir().unwrap();
        let cond = scratch.path().join("cond");
        std::fs::create_dir(&cond).unwrap();

        let table = BiomTable::from_triplets(
            vec!["T1".to_string(), "T2".to_string(), "T9".to_string()],
            vec!["S1".to_string()],
            &[(0, 0, 1.0), (1, 0, 2.0), (2, 0, 3.0)],
        );
        table
            .write(&cond.join("genus_collapsed.biom"), TableFormat::Binary, "test")
            .unwrap();

        let map_fp = scratch.path().join("taxid.map");
        std::fs::write(&map_fp, "G1\tT1\nG2\tT1\nG3\tT2\n").unwrap();

        let cli = CLI {
            config: BatchConfig {
                table_base: scratch.path().to_path_buf(),
                table_dirs: vec!["cond".to_string()],
                levels: vec!["genus".to_string()],
                taxonomy_map: map_fp,
            },
            format: TableFormat::Binary,
        };
        cli.run().unwrap();

        let out = BiomTable::load(&cond.join("genus_collapsed_gOTU.biom")).unwrap();
        assert_eq!(out.observation_ids, vec!["G1", "G3", "T9"]);
        assert_eq!(out.sample_ids, vec!["S1"]);
        let entries = out.to_map();
        assert_eq!(entries[&("G1".to_string(), "S1".to_string())], 1.0);
        assert_eq!(entries[&("G3".to_string(), "S1".to_string())], 2.0);
        assert_eq!(entries[&("T9".to_string(), "S1".to_string())], 3.0);
    }

    #[test]
    fn skips_tables_that_were_never_collapsed() {
        let scratch = tempfile::tempdir().unwrap();
        let cond = scratch.path().join("cond");
        std::fs::create_dir(&cond).unwrap();
        // genus.biom exists but genus_collapsed.biom does not.
        std::fs::write(cond.join("genus.biom"), b"{}").unwrap();

        let map_fp = scratch.path().join("taxid.map");
        std::fs::write(&map_fp, "G1\tT1\n").unwrap();

        let cli = CLI {
            config: BatchConfig {
                table_base: scratch.path().to_path_buf(),
                table_dirs: vec!["cond".to_string()],
                levels: vec!["genus".to_string()],
                taxonomy_map: map_fp,
            },
            format: TableFormat::Binary,
        };
        cli.run().unwrap();
        assert!(!cond.join("genus_collapsed_gOTU.biom").exists());
    }
}
