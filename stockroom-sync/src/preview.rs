//! Dry-run change preview for `stockroom … --dry-run`.

use std::fmt;

use serde::Serialize;

use stockroom_core::{GroupKey, WorkingSet};

use crate::classify::{classify, OwnedRecord};
use crate::engine::CommitStep;

/// One row a commit would send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedChange {
    pub step: CommitStep,
    pub summary: String,
}

/// Everything a commit of the current working set would send, in step order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangePreview {
    pub changes: Vec<PlannedChange>,
}

impl ChangePreview {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl fmt::Display for ChangePreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for change in &self.changes {
            writeln!(f, "{:<15} {}", change.step.to_string(), change.summary)?;
        }
        Ok(())
    }
}

/// Describe what [`crate::SyncEngine::commit`] would send, without a store.
pub fn preview(ws: &WorkingSet) -> ChangePreview {
    let changes = classify(ws);
    let mut out = Vec::with_capacity(changes.len());
    let mut push = |step, summary| out.push(PlannedChange { step, summary });

    for key in &changes.groups.update {
        push(CommitStep::GroupUpdate, describe_group(ws, *key));
    }
    for key in &changes.groups.insert {
        push(CommitStep::GroupInsert, describe_group(ws, *key));
    }
    for group in ws.pending_group_deletions() {
        if let Some(id) = group.id() {
            push(CommitStep::GroupDelete, format!("#{id} {}", group.name()));
        }
    }
    for owned in &changes.records.update {
        push(CommitStep::RecordUpdate, describe_record(ws, owned));
    }
    for owned in &changes.records.insert {
        push(CommitStep::RecordInsert, describe_record(ws, owned));
    }
    for id in &changes.records.delete {
        let name = ws
            .pending_group_deletions()
            .iter()
            .flat_map(|g| g.records())
            .chain(ws.pending_record_deletions())
            .find(|r| r.id() == Some(*id))
            .map(|r| r.name().to_string())
            .unwrap_or_default();
        push(CommitStep::RecordDelete, format!("#{id} {name}").trim_end().to_string());
    }

    ChangePreview { changes: out }
}

fn describe_group(ws: &WorkingSet, key: GroupKey) -> String {
    match ws.group(key) {
        Ok(group) => match group.id() {
            Some(id) => format!("#{id} {}", group.name()),
            None => format!("(new) {}", group.name()),
        },
        Err(err) => err.to_string(),
    }
}

fn describe_record(ws: &WorkingSet, owned: &OwnedRecord) -> String {
    let Ok(record) = ws.record(owned.record) else {
        return owned.record.to_string();
    };
    let id = record
        .id()
        .map(|id| format!("#{id}"))
        .unwrap_or_else(|| "(new)".to_string());
    let owner = match ws.group(owned.owner).map(|g| (g.id(), g.name())) {
        Ok((Some(gid), name)) => format!("#{gid} {name}"),
        Ok((None, name)) => format!("(new) {name}"),
        Err(err) => err.to_string(),
    };
    format!(
        "{id} {} ×{} → {owner}",
        record.name(),
        record.quantity()
    )
}
