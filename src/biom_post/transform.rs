//! Axis-mapping transforms over abundance tables.
//!
//! Both batch tools are instances of one primitive: apply a mapping to the
//! labels of one axis, either summing all slots that share a target label or
//! substituting labels in place, with a configurable policy for labels the
//! mapping does not cover.

use std::collections::HashMap;

use anyhow::{bail, Result};
use itertools::Itertools;
use sprs::TriMat;

use crate::table::BiomTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Observation,
    Sample,
}

impl Axis {
    fn name(&self) -> &'static str {
        match self {
            Axis::Observation => "observation",
            Axis::Sample => "sample",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// One output slot per distinct target label, element-wise sum of all
    /// source slots mapping to it. Target order is first occurrence.
    Sum,
    /// Substitute labels in place; slot order, count and values unchanged.
    /// Duplicate resulting labels are not merged.
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnMissing {
    /// A label absent from the mapping aborts the transform.
    Fail,
    /// Absent labels map to themselves and are counted.
    Identity,
}

pub struct Mapped {
    pub table: BiomTable,
    /// Labels on the mapped axis that fell back to identity.
    pub missing: usize,
}

pub fn map_axis(
    table: &BiomTable,
    axis: Axis,
    mapping: &HashMap<String, String>,
    aggregate: Aggregate,
    on_missing: OnMissing,
) -> Result<Mapped> {
    let labels = match axis {
        Axis::Observation => &table.observation_ids,
        Axis::Sample => &table.sample_ids,
    };

    let mut missing = 0;
    let mut new_labels = Vec::with_capacity(labels.len());
    for label in labels {
        match mapping.get(label) {
            Some(target) => new_labels.push(target.clone()),
            None => match on_missing {
                OnMissing::Fail => {
                    bail!("{} ID {:?} not present in mapping", axis.name(), label)
                }
                OnMissing::Identity => {
                    missing += 1;
                    new_labels.push(label.clone());
                }
            },
        }
    }

    let table = match aggregate {
        Aggregate::Replace => relabel(table, axis, new_labels),
        Aggregate::Sum => sum_groups(table, axis, &new_labels),
    };

    Ok(Mapped { table, missing })
}

fn relabel(table: &BiomTable, axis: Axis, new_labels: Vec<String>) -> BiomTable {
    let mut out = BiomTable {
        matrix: table.matrix.clone(),
        observation_ids: table.observation_ids.clone(),
        sample_ids: table.sample_ids.clone(),
        observation_metadata: table.observation_metadata.clone(),
        sample_metadata: table.sample_metadata.clone(),
    };
    match axis {
        Axis::Observation => out.observation_ids = new_labels,
        Axis::Sample => out.sample_ids = new_labels,
    }
    out
}

fn sum_groups(table: &BiomTable, axis: Axis, new_labels: &[String]) -> BiomTable {
    // Distinct targets in first-seen order; every source slot contributes
    // to exactly one of them.
    let group_labels: Vec<String> = new_labels.iter().unique().cloned().collect();
    let group_index: HashMap<&str, usize> = group_labels
        .iter()
        .enumerate()
        .map(|(idx, label)| (label.as_str(), idx))
        .collect();
    let slot_to_group: Vec<usize> = new_labels
        .iter()
        .map(|label| group_index[label.as_str()])
        .collect();

    let (n_obs, n_samples) = table.shape();
    let shape = match axis {
        Axis::Observation => (group_labels.len(), n_samples),
        Axis::Sample => (n_obs, group_labels.len()),
    };

    // TriMat sums duplicate positions on compression, which is exactly the
    // group-by-sum we want here.
    let mut tri = TriMat::new(shape);
    for (value, (i, j)) in table.matrix.iter() {
        match axis {
            Axis::Observation => tri.add_triplet(slot_to_group[i], j, *value),
            Axis::Sample => tri.add_triplet(i, slot_to_group[j], *value),
        }
    }

    let none_metadata = vec![None; group_labels.len()];
    match axis {
        Axis::Observation => BiomTable {
            matrix: tri.to_csr(),
            observation_ids: group_labels,
            sample_ids: table.sample_ids.clone(),
            observation_metadata: none_metadata,
            sample_metadata: table.sample_metadata.clone(),
        },
        Axis::Sample => BiomTable {
            matrix: tri.to_csr(),
            observation_ids: table.observation_ids.clone(),
            sample_ids: group_labels,
            observation_metadata: table.observation_metadata.clone(),
            sample_metadata: none_metadata,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample_map::SampleMapSource;

    fn indexed_table() -> BiomTable {
        BiomTable::from_triplets(
            vec!["F1".to_string()],
            vec![
                "S1_index1".to_string(),
                "S1_index2".to_string(),
                "S2_index1".to_string(),
            ],
            &[(0, 0, 2.0), (0, 1, 3.0), (0, 2, 5.0)],
        )
    }

    fn mapping_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect()
    }

    #[test]
    fn collapse_sums_index_groups() {
        let table = indexed_table();
        let mapping = SampleMapSource::StripIndex.mapping_for(&table).unwrap();

        let collapsed = map_axis(&table, Axis::Sample, &mapping, Aggregate::Sum, OnMissing::Fail)
            .unwrap()
            .table;

        assert_eq!(collapsed.sample_ids, vec!["S1", "S2"]);
        assert_eq!(collapsed.observation_ids, vec!["F1"]);
        let entries = collapsed.to_map();
        assert_eq!(entries[&("F1".to_string(), "S1".to_string())], 5.0);
        assert_eq!(entries[&("F1".to_string(), "S2".to_string())], 5.0);
    }

    #[test]
    fn collapse_preserves_row_totals() {
        let table = BiomTable::from_triplets(
            vec!["F1".to_string(), "F2".to_string()],
            vec![
                "A_index1".to_string(),
                "A_index2".to_string(),
                "B_index7".to_string(),
                "C".to_string(),
            ],
            &[
                (0, 0, 1.0),
                (0, 1, 4.0),
                (0, 3, 2.5),
                (1, 1, 7.0),
                (1, 2, 0.5),
            ],
        );
        let mapping = SampleMapSource::StripIndex.mapping_for(&table).unwrap();
        let collapsed = map_axis(&table, Axis::Sample, &mapping, Aggregate::Sum, OnMissing::Fail)
            .unwrap()
            .table;

        for (row, label) in table.observation_ids.iter().enumerate() {
            let before: f64 = table
                .matrix
                .iter()
                .filter(|(_, (i, _))| *i == row)
                .map(|(v, _)| *v)
                .sum();
            let out_row = collapsed
                .observation_ids
                .iter()
                .position(|l| l == label)
                .unwrap();
            let after: f64 = collapsed
                .matrix
                .iter()
                .filter(|(_, (i, _))| *i == out_row)
                .map(|(v, _)| *v)
                .sum();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn collapse_fails_on_unmapped_sample() {
        let table = indexed_table();
        let mapping = mapping_of(&[("S1_index1", "S1"), ("S1_index2", "S1")]);
        let res = map_axis(&table, Axis::Sample, &mapping, Aggregate::Sum, OnMissing::Fail);
        assert!(res.is_err());
        assert!(format!("{}", res.err().unwrap()).contains("S2_index1"));
    }

    #[test]
    fn replace_changes_labels_only() {
        let table = BiomTable::from_triplets(
            vec!["T1".to_string(), "T2".to_string(), "T9".to_string()],
            vec!["S1".to_string()],
            &[(0, 0, 1.0), (1, 0, 2.0), (2, 0, 3.0)],
        );
        let mapping = mapping_of(&[("T1", "G1"), ("T2", "G3")]);

        let mapped = map_axis(
            &table,
            Axis::Observation,
            &mapping,
            Aggregate::Replace,
            OnMissing::Identity,
        )
        .unwrap();

        assert_eq!(mapped.missing, 1);
        assert_eq!(mapped.table.observation_ids, vec!["G1", "G3", "T9"]);
        assert_eq!(mapped.table.sample_ids, table.sample_ids);
        // Values stay put position by position.
        let before: Vec<_> = table.matrix.iter().map(|(v, ij)| (*v, ij)).collect();
        let after: Vec<_> = mapped.table.matrix.iter().map(|(v, ij)| (*v, ij)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn replace_tolerates_duplicate_targets() {
        let table = BiomTable::from_triplets(
            vec!["T1".to_string(), "T2".to_string()],
            vec!["S1".to_string()],
            &[(0, 0, 1.0), (1, 0, 2.0)],
        );
        let mapping = mapping_of(&[("T1", "G1"), ("T2", "G1")]);

        let mapped = map_axis(
            &table,
            Axis::Observation,
            &mapping,
            Aggregate::Replace,
            OnMissing::Identity,
        )
        .unwrap();

        // Not merged: two rows, both labeled G1.
        assert_eq!(mapped.table.observation_ids, vec!["G1", "G1"]);
        assert_eq!(mapped.table.shape(), (2, 1));
    }
}
