//! Data models for the dashboard.
//!
//! This module contains the core data structures produced by a rebuild:
//! tasks, phases, the initiative, team rollups and the snapshot that
//! bundles them together. Field names serialize in camelCase because the
//! dashboard front end reads them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used for tasks and phases without an assignee.
pub const UNASSIGNED: &str = "Unassigned";

/// Normalized three-valued status classification.
///
/// The wire values are the remote tracker's own category keys so existing
/// consumers keep working: `done`, `indeterminate` and `new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCategory {
    /// Work is finished.
    #[serde(rename = "done")]
    Done,
    /// Work has started but is not finished.
    #[serde(rename = "indeterminate")]
    InProgress,
    /// Work has not started.
    #[serde(rename = "new")]
    Todo,
}

impl StatusCategory {
    /// Map a raw status-category key onto the three normalized values.
    ///
    /// Anything other than `done` or `indeterminate` counts as todo.
    pub fn from_key(key: &str) -> Self {
        match key {
            "done" => StatusCategory::Done,
            "indeterminate" => StatusCategory::InProgress,
            _ => StatusCategory::Todo,
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCategory::Done => write!(f, "Done"),
            StatusCategory::InProgress => write!(f, "In Progress"),
            StatusCategory::Todo => write!(f, "To Do"),
        }
    }
}

/// One unit of tracked work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Issue key, unique within a rebuild.
    pub key: String,
    pub summary: String,
    /// Tool-specific status name (e.g. "Code Review").
    pub status: String,
    pub status_category: StatusCategory,
    /// Display name of the assignee, or [`UNASSIGNED`].
    pub assignee: String,
    /// Priority name, empty when the issue has none.
    pub priority: String,
    /// Last-updated timestamp as reported by the tracker.
    pub updated: String,
    pub due_date: Option<String>,
    /// Browse link synthesized from the base URL and key.
    pub web_url: String,
}

/// Per-category task counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub done: usize,
    pub in_progress: usize,
    pub todo: usize,
}

impl StatusCounts {
    /// Count the tasks in each category.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut counts = Self::default();
        for task in tasks {
            counts.record(task.status_category);
        }
        counts
    }

    /// Increment the counter for one category.
    pub fn record(&mut self, category: StatusCategory) {
        match category {
            StatusCategory::Done => self.done += 1,
            StatusCategory::InProgress => self.in_progress += 1,
            StatusCategory::Todo => self.todo += 1,
        }
    }

    /// Add another set of counts into this one.
    pub fn absorb(&mut self, other: StatusCounts) {
        self.done += other.done;
        self.in_progress += other.in_progress;
        self.todo += other.todo;
    }

    pub fn total(&self) -> usize {
        self.done + self.in_progress + self.todo
    }
}

/// A grouping of tasks directly under the initiative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: String,
    pub due_date: Option<String>,
    pub task_count: usize,
    #[serde(flatten)]
    pub counts: StatusCounts,
    /// Whole-number completion percentage.
    pub percent_done: u32,
    pub web_url: String,
    /// Tasks in the tracker's rank order.
    pub tasks: Vec<Task>,
}

impl Phase {
    /// A phase counts as complete only when it has tasks and all are done.
    pub fn is_complete(&self) -> bool {
        self.task_count > 0 && self.percent_done == 100
    }

    /// Tasks not yet done.
    pub fn remaining(&self) -> usize {
        self.task_count - self.counts.done
    }
}

/// The root entity being tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiative {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub owner: String,
    /// Name of the project the initiative lives in.
    pub project: String,
    pub web_url: String,
}

/// Aggregated workload for one assignee name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub name: String,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub tasks: Vec<Task>,
}

impl TeamMember {
    pub fn total(&self) -> usize {
        self.counts.total()
    }
}

/// Portfolio-level statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub total_tasks: usize,
    pub done: usize,
    pub in_progress: usize,
    pub todo: usize,
    pub phases_total: usize,
    pub phases_done: usize,
    /// Completion percentage rounded to one decimal place.
    pub percent_done: f64,
}

/// One fully-built aggregation result.
///
/// Snapshots are immutable; a rebuild replaces the cached one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub initiative: Initiative,
    pub kpi: Kpi,
    pub phases: Vec<Phase>,
    pub team: Vec<TeamMember>,
    /// Every task in phase order, as one flat list.
    pub all_tasks: Vec<Task>,
}

/// Read-only view of the cache state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheHealth {
    pub has_snapshot: bool,
    pub age_seconds: Option<u64>,
    pub ttl_seconds: u64,
    pub rebuilding: bool,
}

/// Severity of a detected delivery risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Info,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Info => write!(f, "Info"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

impl RiskLevel {
    /// Returns an emoji representation of the level.
    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::Info => "🔵",
            RiskLevel::Medium => "🟠",
            RiskLevel::High => "🔴",
        }
    }
}

/// A delivery risk derived from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Risk {
    pub level: RiskLevel,
    pub title: String,
    pub detail: String,
}

/// Keyword rule giving matching phases a custom milestone label.
///
/// Keywords match case-insensitively as substrings of the phase summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneRule {
    pub keywords: Vec<String>,
    pub label: String,
}

/// Completion checkpoint derived from one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub label: String,
    /// Set once the phase has tasks and all of them are done.
    pub done: bool,
    /// Summary of the phase the milestone tracks.
    pub phase: String,
    pub phase_key: String,
    /// Position of the phase in the snapshot.
    pub phase_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(key: &str, category: StatusCategory) -> Task {
        Task {
            key: key.to_string(),
            summary: String::new(),
            status: String::new(),
            status_category: category,
            assignee: UNASSIGNED.to_string(),
            priority: String::new(),
            updated: String::new(),
            due_date: None,
            web_url: String::new(),
        }
    }

    #[test]
    fn test_status_category_from_key() {
        assert_eq!(StatusCategory::from_key("done"), StatusCategory::Done);
        assert_eq!(
            StatusCategory::from_key("indeterminate"),
            StatusCategory::InProgress
        );
        assert_eq!(StatusCategory::from_key("new"), StatusCategory::Todo);
        assert_eq!(StatusCategory::from_key("undefined"), StatusCategory::Todo);
    }

    #[test]
    fn test_status_category_wire_values() {
        let json = serde_json::to_string(&StatusCategory::InProgress).unwrap();
        assert_eq!(json, "\"indeterminate\"");
        let parsed: StatusCategory = serde_json::from_str("\"new\"").unwrap();
        assert_eq!(parsed, StatusCategory::Todo);
    }

    #[test]
    fn test_status_counts() {
        let tasks = vec![
            task("A-1", StatusCategory::Done),
            task("A-2", StatusCategory::Done),
            task("A-3", StatusCategory::Todo),
        ];
        let counts = StatusCounts::from_tasks(&tasks);
        assert_eq!(counts.done, 2);
        assert_eq!(counts.in_progress, 0);
        assert_eq!(counts.todo, 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_phase_serializes_flat_counts() {
        let phase = Phase {
            key: "EP-1".to_string(),
            summary: "Phase".to_string(),
            status: "Open".to_string(),
            assignee: UNASSIGNED.to_string(),
            due_date: None,
            task_count: 1,
            counts: StatusCounts {
                done: 1,
                in_progress: 0,
                todo: 0,
            },
            percent_done: 100,
            web_url: String::new(),
            tasks: vec![task("A-1", StatusCategory::Done)],
        };

        let json = serde_json::to_value(&phase).unwrap();
        assert_eq!(json["taskCount"], 1);
        assert_eq!(json["inProgress"], 0);
        assert_eq!(json["percentDone"], 100);
        assert_eq!(json["dueDate"], serde_json::Value::Null);
        assert_eq!(json["tasks"][0]["statusCategory"], "done");
        assert!(phase.is_complete());
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Info < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert_eq!(RiskLevel::High.emoji(), "🔴");
    }
}
