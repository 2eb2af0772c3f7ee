//! Post-processing for sparse feature-by-sample abundance tables produced by
//! a metagenomic read-mapping pipeline.
//!
//! Two batch tools are built on this library:
//!
//! * `biom-collapse` merges per-lane/per-index sample columns into biological
//!   sample columns by summing counts under a grouping key (by default the
//!   sample ID with any trailing `_index<N>` stripped).
//! * `biom-gotu` rewrites feature (row) labels from taxonomic IDs to
//!   genome/gOTU IDs using a static two-column lookup table.
//!
//! Both tools walk a configured set of condition directories and table files,
//! skipping missing inputs with a warning, and write their result next to the
//! input with a suffix inserted before the extension.

pub mod batch;
pub mod collapse_tbls;
pub mod config;
pub mod gotu;
pub mod sample_map;
pub mod table;
pub mod tax_map;
pub mod transform;
