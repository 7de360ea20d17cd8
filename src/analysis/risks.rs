//! Delivery-risk detection over a built snapshot.

use crate::models::{DashboardSnapshot, Phase, Risk, RiskLevel, UNASSIGNED};

/// Active phases with fewer remaining tasks than this are not flagged.
const BOTTLENECK_MIN_REMAINING: usize = 5;

/// Derive the ordered list of risks for a snapshot.
pub fn detect_risks(snapshot: &DashboardSnapshot) -> Vec<Risk> {
    let phases = &snapshot.phases;
    let mut risks = Vec::new();

    let stalled: Vec<&Phase> = phases
        .iter()
        .filter(|p| p.percent_done == 0 && p.task_count > 0)
        .collect();
    if !stalled.is_empty() {
        risks.push(Risk {
            level: RiskLevel::High,
            title: format!("{} phase(s) have zero progress", stalled.len()),
            detail: format!(
                "{}. Planning should start before active phases complete.",
                summaries(&stalled)
            ),
        });
    }

    let unassigned = snapshot
        .all_tasks
        .iter()
        .filter(|t| t.assignee == UNASSIGNED)
        .count();
    if unassigned > 0 {
        risks.push(Risk {
            level: RiskLevel::High,
            title: format!("{} tasks are unassigned", unassigned),
            detail: "Resource allocation needed to avoid bottlenecks.".to_string(),
        });
    }

    if let Some(bottleneck) = bottleneck(phases) {
        let remaining = bottleneck.remaining();
        if remaining >= BOTTLENECK_MIN_REMAINING {
            risks.push(Risk {
                level: RiskLevel::Medium,
                title: format!(
                    "{} is at {}% with {} tasks remaining",
                    bottleneck.summary, bottleneck.percent_done, remaining
                ),
                detail: "Largest active workload. May need additional resources.".to_string(),
            });
        }
    }

    let empty: Vec<&Phase> = phases.iter().filter(|p| p.task_count == 0).collect();
    if !empty.is_empty() {
        risks.push(Risk {
            level: RiskLevel::Medium,
            title: format!("{} phase(s) have no child tasks", empty.len()),
            detail: format!("{}. Scope and effort TBD.", summaries(&empty)),
        });
    }

    let no_due = phases.iter().filter(|p| p.due_date.is_none()).count();
    if no_due > 0 && no_due == phases.len() {
        risks.push(Risk {
            level: RiskLevel::Info,
            title: "No due dates set on any phase".to_string(),
            detail: "Consider adding milestones for tracking against timeline.".to_string(),
        });
    } else if no_due > 0 {
        risks.push(Risk {
            level: RiskLevel::Info,
            title: format!("{} phase(s) missing due dates", no_due),
            detail: "Consider adding target completion dates for better tracking.".to_string(),
        });
    }

    risks
}

/// The partially-done phase with the most remaining work; earliest wins ties.
fn bottleneck(phases: &[Phase]) -> Option<&Phase> {
    phases
        .iter()
        .filter(|p| p.percent_done > 0 && p.percent_done < 100)
        .fold(None, |best: Option<&Phase>, p| match best {
            Some(b) if p.remaining() <= b.remaining() => Some(b),
            _ => Some(p),
        })
}

fn summaries(phases: &[&Phase]) -> String {
    phases
        .iter()
        .map(|p| p.summary.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
