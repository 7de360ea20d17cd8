//! Rollup statistics over normalized tasks and phases.

use crate::models::{Kpi, Phase, StatusCounts, Task, TeamMember};
use std::cmp::Reverse;
use std::collections::HashMap;

/// Whole-number completion percentage of one phase.
///
/// Halves round to even, so 12.5 becomes 12.
pub fn phase_percent(done: usize, task_count: usize) -> u32 {
    if task_count == 0 {
        return 0;
    }
    (done as f64 / task_count as f64 * 100.0).round_ties_even() as u32
}

/// Overall completion percentage, rounded to one decimal place.
///
/// Rounds the percentage itself rather than a scaled copy: `23/80*100` is
/// stored as 28.74999..., so it becomes 28.7, not 28.8.
pub fn overall_percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percent = done as f64 / total as f64 * 100.0;
    // Display formatting rounds the exact binary value correctly.
    format!("{:.1}", percent).parse().unwrap_or(percent)
}

/// Number of phases that have tasks and are fully done.
pub fn phases_done(phases: &[Phase]) -> usize {
    phases.iter().filter(|p| p.is_complete()).count()
}

/// Compute the portfolio KPI block from the built phases.
pub fn compute_kpi(phases: &[Phase]) -> Kpi {
    let mut totals = StatusCounts::default();
    for phase in phases {
        totals.absorb(phase.counts);
    }
    let total_tasks = totals.total();

    Kpi {
        total_tasks,
        done: totals.done,
        in_progress: totals.in_progress,
        todo: totals.todo,
        phases_total: phases.len(),
        phases_done: phases_done(phases),
        percent_done: overall_percent(totals.done, total_tasks),
    }
}

/// Group tasks by assignee name.
///
/// Members are sorted by total task count, highest first. The sort is
/// stable, so equal totals keep the order in which assignees first appear.
pub fn team_rollup(tasks: &[Task]) -> Vec<TeamMember> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut team: Vec<TeamMember> = Vec::new();

    for task in tasks {
        let slot = *index.entry(task.assignee.as_str()).or_insert_with(|| {
            team.push(TeamMember {
                name: task.assignee.clone(),
                counts: StatusCounts::default(),
                tasks: Vec::new(),
            });
            team.len() - 1
        });

        let member = &mut team[slot];
        member.counts.record(task.status_category);
        member.tasks.push(task.clone());
    }

    team.sort_by_key(|m| Reverse(m.total()));
    team
}
