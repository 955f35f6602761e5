//! Text rendering of cycle totals, the "Cycled Resources" view.

use anyhow::Result;
use minijinja::{Environment, context};
use serde::Serialize;

use crate::core::accumulator::sum_totals;
use crate::core::text::group_thousands;
use crate::core::types::{CyclePhase, CycleState, ResourceKind, ResourceSnapshot};

const SUMMARY_TEMPLATE: &str = include_str!("templates/summary.txt");

#[derive(Debug, Clone, Serialize)]
struct AmountRow {
    label: &'static str,
    amount: String,
}

#[derive(Debug, Clone, Serialize)]
struct TargetRows {
    id: String,
    rows: Vec<AmountRow>,
}

fn amount_rows(snapshot: &ResourceSnapshot) -> Vec<AmountRow> {
    ResourceKind::ALL
        .iter()
        .map(|kind| AmountRow {
            label: kind.label(),
            amount: group_thousands(snapshot.get(*kind)),
        })
        .collect()
}

/// Render the status summary for a persisted cycle.
///
/// Per-target rows are only shown once no cycle is running, when every
/// visited target's snapshot is final.
pub fn render_summary(state: &CycleState) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("summary", SUMMARY_TEMPLATE)?;
    let template = env.get_template("summary")?;

    let running = state.phase() == CyclePhase::Running;
    let targets: Vec<TargetRows> = if running {
        Vec::new()
    } else {
        state
            .totals
            .iter()
            .map(|(id, snapshot)| TargetRows {
                id: id.to_string(),
                rows: amount_rows(snapshot),
            })
            .collect()
    };

    let rendered = template.render(context! {
        running => running,
        remaining => state.queue.len(),
        auto_enabled => state.auto_enabled,
        totals => amount_rows(&sum_totals(&state.totals)),
        targets => targets,
    })?;
    Ok(rendered)
}
