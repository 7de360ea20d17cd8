//! Markdown report generation.
//!
//! This module renders a dashboard snapshot as a Markdown status report
//! for one-shot runs.

use crate::analysis::{detect_milestones, detect_risks};
use crate::models::{
    DashboardSnapshot, Kpi, Milestone, MilestoneRule, Phase, Risk, StatusCategory, TeamMember,
};
use anyhow::Result;

/// Generate a complete Markdown report.
///
/// `milestone_rules` may be empty; phases then get "<summary> complete" labels.
pub fn generate_markdown_report(
    snapshot: &DashboardSnapshot,
    milestone_rules: &[MilestoneRule],
) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!(
        "# {}: {}\n\n",
        snapshot.initiative.key, snapshot.initiative.summary
    ));

    output.push_str(&generate_header_section(snapshot));
    output.push_str(&generate_kpi_section(&snapshot.kpi));
    output.push_str(&generate_phases_section(&snapshot.phases));
    output.push_str(&generate_milestones_section(&detect_milestones(
        snapshot,
        milestone_rules,
    )));
    output.push_str(&generate_team_section(&snapshot.team));
    output.push_str(&generate_risks_section(&detect_risks(snapshot)));
    output.push_str(&generate_footer());

    output
}

/// Generate the initiative header.
fn generate_header_section(snapshot: &DashboardSnapshot) -> String {
    let initiative = &snapshot.initiative;
    let mut section = String::new();

    section.push_str(&format!("- **Status:** {}\n", initiative.status));
    section.push_str(&format!("- **Owner:** {}\n", initiative.owner));
    if !initiative.project.is_empty() {
        section.push_str(&format!("- **Project:** {}\n", initiative.project));
    }
    section.push_str(&format!("- **Link:** {}\n", initiative.web_url));
    section.push_str(&format!(
        "- **Fetched:** {}\n",
        snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push('\n');

    section
}

/// Generate the KPI table.
fn generate_kpi_section(kpi: &Kpi) -> String {
    let mut section = String::new();

    section.push_str("## Progress\n\n");
    section.push_str("| Total | Done | In Progress | To Do | Phases Done | % Done |\n");
    section.push_str("|-------|------|-------------|-------|-------------|--------|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {}/{} | {:.1}% |\n\n",
        kpi.total_tasks,
        kpi.done,
        kpi.in_progress,
        kpi.todo,
        kpi.phases_done,
        kpi.phases_total,
        kpi.percent_done
    ));

    section
}

/// Generate the per-phase table.
fn generate_phases_section(phases: &[Phase]) -> String {
    let mut section = String::new();

    section.push_str("## Phases\n\n");
    if phases.is_empty() {
        section.push_str("No phases found.\n\n");
        return section;
    }

    section.push_str("| Phase | Status | Owner | Due | Tasks | Done | In Progress | To Do | % |\n");
    section.push_str("|-------|--------|-------|-----|-------|------|-------------|-------|---|\n");
    for phase in phases {
        section.push_str(&format!(
            "| [{}]({}) {} | {} | {} | {} | {} | {} | {} | {} | {}% |\n",
            phase.key,
            phase.web_url,
            escape_cell(&phase.summary),
            escape_cell(&phase.status),
            escape_cell(&phase.assignee),
            escape_cell(phase.due_date.as_deref().unwrap_or("-")),
            phase.task_count,
            phase.counts.done,
            phase.counts.in_progress,
            phase.counts.todo,
            phase.percent_done
        ));
    }
    section.push('\n');

    section
}

/// Generate the milestone checklist.
fn generate_milestones_section(milestones: &[Milestone]) -> String {
    let mut section = String::new();

    section.push_str("## Milestones\n\n");
    if milestones.is_empty() {
        section.push_str("No milestones defined.\n\n");
        return section;
    }

    for milestone in milestones {
        let check = if milestone.done { "x" } else { " " };
        section.push_str(&format!("- [{}] {}\n", check, milestone.label));
    }
    section.push('\n');

    section
}

/// Generate the team workload table.
fn generate_team_section(team: &[TeamMember]) -> String {
    let mut section = String::new();

    section.push_str("## Team\n\n");
    if team.is_empty() {
        section.push_str("No assigned work.\n\n");
        return section;
    }

    section.push_str(&format!(
        "| Member | {} | {} | {} | Total |\n",
        StatusCategory::Done,
        StatusCategory::InProgress,
        StatusCategory::Todo
    ));
    section.push_str("|--------|------|-------------|-------|-------|\n");
    for member in team {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            escape_cell(&member.name),
            member.counts.done,
            member.counts.in_progress,
            member.counts.todo,
            member.total()
        ));
    }
    section.push('\n');

    section
}

/// Generate the risks section.
fn generate_risks_section(risks: &[Risk]) -> String {
    let mut section = String::new();

    section.push_str("## Risks\n\n");
    if risks.is_empty() {
        section.push_str("No risks detected.\n\n");
        return section;
    }

    for risk in risks {
        section.push_str(&format!(
            "- {} **{}:** {}. {}\n",
            risk.level.emoji(),
            risk.level,
            risk.title,
            risk.detail
        ));
    }
    section.push('\n');

    section
}

/// Escape text for use inside a Markdown table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn generate_footer() -> String {
    "---\n\n*Report generated by Phaseboard*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(snapshot: &DashboardSnapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).map_err(Into::into)
}
