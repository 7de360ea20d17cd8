//! Snapshot construction.
//!
//! The aggregator runs the fetch sequence (initiative, then phases, then
//! all tasks in one search) and folds the results into a
//! [`DashboardSnapshot`].

use super::rollup::{compute_kpi, phase_percent, team_rollup};
use crate::error::Result;
use crate::jira::{IssueApi, DEFAULT_PAGE_SIZE, INITIATIVE_FIELDS, PHASE_FIELDS, TASK_FIELDS};
use crate::models::{DashboardSnapshot, Initiative, Phase, StatusCounts, Task};
use crate::normalize::{
    assignee_name, browse_url, due_date, issue_key, normalize_initiative, normalize_task, parent_key,
    str_field,
};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Settings for one aggregator instance.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Site root used to build browse links.
    pub base_url: String,
    /// Key of the root initiative.
    pub initiative_key: String,
    pub page_size: u32,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            initiative_key: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Builds dashboard snapshots for one configured initiative.
pub struct Aggregator {
    api: Arc<dyn IssueApi>,
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(api: Arc<dyn IssueApi>, config: AggregatorConfig) -> Self {
        Self { api, config }
    }

    pub fn initiative_key(&self) -> &str {
        &self.config.initiative_key
    }

    /// Fetch everything and build a fresh snapshot.
    ///
    /// Any remote failure aborts the build; no partial snapshot is returned.
    pub async fn build_snapshot(&self) -> Result<DashboardSnapshot> {
        let start = Instant::now();
        let key = &self.config.initiative_key;
        info!("Building dashboard for initiative {}", key);

        let initiative_raw = self.api.fetch_issue(key, INITIATIVE_FIELDS).await?;

        let phase_raws = self
            .api
            .search(&phases_jql(key), PHASE_FIELDS, self.config.page_size)
            .await?;

        let phase_keys = phase_raws
            .iter()
            .map(|raw| issue_key(raw, "phase search"))
            .collect::<Result<Vec<_>>>()?;

        let task_raws = match tasks_jql(&phase_keys) {
            Some(jql) => {
                self.api
                    .search(&jql, TASK_FIELDS, self.config.page_size)
                    .await?
            }
            None => Vec::new(),
        };

        let snapshot = assemble(
            normalize_initiative(&initiative_raw, key, &self.config.base_url),
            &phase_raws,
            &task_raws,
            &self.config.base_url,
        )?;

        info!(
            "Built dashboard: {} phases, {} tasks, {} team members in {:.2}s",
            snapshot.kpi.phases_total,
            snapshot.kpi.total_tasks,
            snapshot.team.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(snapshot)
    }
}

/// Query for the initiative's direct children, in rank order.
pub fn phases_jql(initiative_key: &str) -> String {
    format!("parent = {} ORDER BY rank ASC", initiative_key)
}

/// Query for the children of every phase, or `None` when there are no phases.
pub fn tasks_jql(phase_keys: &[&str]) -> Option<String> {
    if phase_keys.is_empty() {
        return None;
    }
    Some(format!(
        "parent in ({}) ORDER BY rank ASC",
        phase_keys.join(", ")
    ))
}

/// Fold already-fetched records into a snapshot stamped with the current time.
pub fn assemble(
    initiative: Initiative,
    phase_raws: &[Value],
    task_raws: &[Value],
    base_url: &str,
) -> Result<DashboardSnapshot> {
    // Group by parent, keeping rank order within each group.
    let mut tasks_by_phase: HashMap<&str, Vec<&Value>> = HashMap::new();
    for raw in task_raws {
        tasks_by_phase
            .entry(parent_key(raw).unwrap_or_default())
            .or_default()
            .push(raw);
    }

    let mut phases = Vec::with_capacity(phase_raws.len());
    let mut all_tasks: Vec<Task> = Vec::with_capacity(task_raws.len());

    for raw in phase_raws {
        let key = issue_key(raw, "phase search")?;
        let tasks = tasks_by_phase
            .get(key)
            .map(|raws| {
                raws.iter()
                    .map(|raw| normalize_task(raw, base_url))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        let phase = build_phase(raw, key, tasks, base_url);
        all_tasks.extend(phase.tasks.iter().cloned());
        phases.push(phase);
    }

    let kpi = compute_kpi(&phases);
    let team = team_rollup(&all_tasks);

    Ok(DashboardSnapshot {
        fetched_at: Utc::now(),
        initiative,
        kpi,
        phases,
        team,
        all_tasks,
    })
}

fn build_phase(raw: &Value, key: &str, tasks: Vec<Task>, base_url: &str) -> Phase {
    let fields = &raw["fields"];
    let counts = StatusCounts::from_tasks(&tasks);
    let task_count = tasks.len();

    Phase {
        key: key.to_string(),
        summary: str_field(&fields["summary"]),
        status: str_field(&fields["status"]["name"]),
        assignee: assignee_name(fields),
        due_date: due_date(fields),
        task_count,
        counts,
        percent_done: phase_percent(counts.done, task_count),
        web_url: browse_url(base_url, key),
        tasks,
    }
}
