use crate::domain::{DuplicateStatus, NormalizedRecord, Table};
use crate::identity::{composite_key, identity_key};
use crate::pipeline::processing::normalize::{clamp_amount, normalize_date};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// How rows sharing an identity are reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MergeMode {
    /// The later row replaces the earlier one with the same identity key
    #[default]
    LastWriteWins,
    /// Every row is kept; later occurrences are marked `REPEATED`
    Audit,
}

impl MergeMode {
    pub fn from_audit_flag(audit: bool) -> Self {
        if audit {
            MergeMode::Audit
        } else {
            MergeMode::LastWriteWins
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Consolidation {
    pub table: Table,
    /// Rows dropped because a later row shared their identity key
    pub superseded: usize,
    /// Rows marked `REPEATED` (audit mode only)
    pub repeated: usize,
}

/// Merges the previously persisted table with newly built records.
///
/// Prior rows come first, so a freshly fetched record supersedes the stored
/// one. Dates are canonicalised and amounts sanitised across the whole table.
pub fn consolidate(prior: Table, new_records: Vec<NormalizedRecord>, mode: MergeMode) -> Consolidation {
    let mut rows = prior.records;
    rows.extend(new_records);
    rows.iter_mut().for_each(scrub);

    match mode {
        MergeMode::LastWriteWins => keep_last(rows),
        MergeMode::Audit => mark_repeated(rows),
    }
}

fn keep_last(rows: Vec<NormalizedRecord>) -> Consolidation {
    let mut last_index: HashMap<String, usize> = HashMap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        last_index.insert(row.identity_key.clone(), i);
    }

    let total = rows.len();
    let records: Vec<NormalizedRecord> = rows
        .into_iter()
        .enumerate()
        .filter(|(i, row)| last_index.get(&row.identity_key) == Some(i))
        .map(|(_, mut row)| {
            row.duplicate_status = None;
            row
        })
        .collect();

    let superseded = total - records.len();
    debug!(total, kept = records.len(), superseded, "deduplicated by identity key");
    Consolidation {
        table: Table::new(records),
        superseded,
        repeated: 0,
    }
}

fn mark_repeated(mut rows: Vec<NormalizedRecord>) -> Consolidation {
    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    let mut repeated = 0;
    for row in rows.iter_mut() {
        let key = composite_key(&row.origin_link, &row.description, row.value, &row.organization);
        if seen.insert(key) {
            row.duplicate_status = Some(DuplicateStatus::Original);
        } else {
            row.duplicate_status = Some(DuplicateStatus::Repeated);
            repeated += 1;
        }
    }
    debug!(total = rows.len(), repeated, "marked repeated rows");
    Consolidation {
        table: Table::new(rows),
        superseded: 0,
        repeated,
    }
}

fn scrub(row: &mut NormalizedRecord) {
    row.published_date = normalize_date(Some(&row.published_date));
    row.value = clamp_amount(row.value);
    if row.identity_key.trim().is_empty() {
        row.identity_key = identity_key(&row.origin_link, &row.description, row.value, &row.organization);
    }
}
