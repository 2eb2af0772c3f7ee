//! Batch collapse of per-index sample columns.

use std::path::Path;

use anyhow::Result;
use log::info;

use crate::batch::{for_each_table, output_path};
use crate::config::BatchConfig;
use crate::sample_map::SampleMapSource;
use crate::table::{BiomTable, TableFormat};
use crate::transform::{map_axis, Aggregate, Axis, OnMissing};

pub struct CLI {
    pub config: BatchConfig,
    pub map_source: SampleMapSource,
    pub format: TableFormat,
}

impl CLI {
    pub fn run(&self) -> Result<()> {
        for_each_table(
            &self.config,
            |level| format!("{}.biom", level),
            |in_fp| self.collapse_one(in_fp),
        )?;
        info!("Finished collapsing all tables.");
        Ok(())
    }

    fn collapse_one(&self, in_fp: &Path) -> Result<()> {
        let out_fp = output_path(in_fp, "_collapsed");

        let table = BiomTable::load(in_fp)?;
        // Rebuilt per table so one table's IDs never leak into the next.
        let mapping = self.map_source.mapping_for(&table)?;
        let collapsed = map_axis(
            &table,
            Axis::Sample,
            &mapping,
            Aggregate::Sum,
            OnMissing::Fail,
        )?
        .table;
        collapsed.write(&out_fp, self.format, &generated_by())?;

        let (in_obs, in_samples) = table.shape();
        let (out_obs, out_samples) = collapsed.shape();
        info!(
            "Collapsing {} (input {} features x {} samples) -> (output {} features x {} samples)",
            in_fp.display(),
            in_obs,
            in_samples,
            out_obs,
            out_samples
        );

        Ok(())
    }
}

fn generated_by() -> String {
    format!("biom-collapse {}", env!("CARGO_PKG_VERSION"))
}
