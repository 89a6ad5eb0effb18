//! Human renderer for CLI outputs.
//!
//! Pure formatting; handlers gather any extra data needed.

use std::path::Path;

use serde::Serialize;

use crate::objects::{Commit, Reference, StatusEntry};
use crate::ops::OpSnapshot;
use crate::repo::RepoState;

pub(crate) fn render_info(
    state: RepoState,
    description: &str,
    workdir: Option<&Path>,
    head: Option<&Reference>,
    tip: Option<&Commit>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("state:    {}\n", state_name(state)));
    out.push_str(&format!("status:   {description}\n"));
    if let Some(workdir) = workdir {
        out.push_str(&format!("workdir:  {}\n", workdir.display()));
    }
    match head {
        Some(head) => {
            out.push_str(&format!("head:     {}\n", head.shorthand()));
            if let Some(tip) = tip {
                out.push_str(&format!(
                    "commit:   {} {}",
                    tip.short_id(),
                    tip.summary().unwrap_or("(no message)")
                ));
            }
        }
        None => out.push_str("head:     (unborn)"),
    }
    out
}

pub(crate) fn state_name(state: RepoState) -> &'static str {
    match state {
        RepoState::Invalid => "invalid",
        RepoState::Cloning => "cloning",
        RepoState::Idle => "idle",
    }
}

pub(crate) fn render_status(entries: &[StatusEntry]) -> String {
    if entries.is_empty() {
        return "working tree clean".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "{:>24}  {}\n",
            entry.flags.names().join("|"),
            entry.path.display()
        ));
    }
    out.pop();
    out
}

#[derive(Debug, Serialize)]
pub(crate) struct BranchRow {
    pub current: bool,
    pub name: String,
    pub kind: &'static str,
    pub local_name: String,
    pub tip: Option<String>,
}

pub(crate) fn render_branches(rows: &[BranchRow]) -> String {
    if rows.is_empty() {
        return "no branches".to_string();
    }
    let mut out = String::new();
    for row in rows {
        let marker = if row.current { '*' } else { ' ' };
        let tip = row.tip.as_deref().unwrap_or("-");
        out.push_str(&format!("{marker} {:7} {tip:8} {}\n", row.kind, row.name));
    }
    out.pop();
    out
}

/// One line of transfer progress, e.g.
/// `Cloning https://…: 45/120 objects, 1.2 MiB`.
pub(crate) fn progress_line(snapshot: &OpSnapshot) -> String {
    let mut line = snapshot.description.clone();
    if let Some((done, total)) = snapshot.progress {
        line.push_str(&format!(": {done}/{total} objects"));
        if snapshot.received_bytes > 0 {
            line.push_str(&format!(", {}", human_bytes(snapshot.received_bytes)));
        }
    } else if !snapshot.informational_text.is_empty() {
        line.push_str(&format!(": {}", snapshot.informational_text));
    }
    line
}

fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
