//! Milestone checklist derived from the phases of a snapshot.

use crate::models::{DashboardSnapshot, Milestone, MilestoneRule};

/// One milestone per phase, in phase order.
///
/// The first rule with a keyword found in the phase summary supplies the
/// label; otherwise the label is "<summary> complete".
pub fn detect_milestones(snapshot: &DashboardSnapshot, rules: &[MilestoneRule]) -> Vec<Milestone> {
    snapshot
        .phases
        .iter()
        .enumerate()
        .map(|(index, phase)| Milestone {
            label: milestone_label(&phase.summary, rules),
            done: phase.is_complete(),
            phase: phase.summary.clone(),
            phase_key: phase.key.clone(),
            phase_index: index,
        })
        .collect()
}

fn milestone_label(summary: &str, rules: &[MilestoneRule]) -> String {
    let lower = summary.to_lowercase();
    rules
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .any(|k| !k.is_empty() && lower.contains(&k.to_lowercase()))
        })
        .map(|rule| rule.label.clone())
        .unwrap_or_else(|| format!("{} complete", summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::rollup::{compute_kpi, phase_percent};
    use crate::models::{Initiative, Phase, StatusCounts, UNASSIGNED};
    use chrono::Utc;

    fn phase(key: &str, summary: &str, done: usize, todo: usize) -> Phase {
        let task_count = done + todo;
        Phase {
            key: key.to_string(),
            summary: summary.to_string(),
            status: String::new(),
            assignee: UNASSIGNED.to_string(),
            due_date: None,
            task_count,
            counts: StatusCounts {
                done,
                in_progress: 0,
                todo,
            },
            percent_done: phase_percent(done, task_count),
            web_url: String::new(),
            tasks: Vec::new(),
        }
    }

    fn snapshot(phases: Vec<Phase>) -> DashboardSnapshot {
        DashboardSnapshot {
            fetched_at: Utc::now(),
            initiative: Initiative {
                key: "INIT-1".to_string(),
                summary: String::new(),
                status: String::new(),
                owner: UNASSIGNED.to_string(),
                project: String::new(),
                web_url: String::new(),
            },
            kpi: compute_kpi(&phases),
            phases,
            team: Vec::new(),
            all_tasks: Vec::new(),
        }
    }

    fn rules() -> Vec<MilestoneRule> {
        vec![
            MilestoneRule {
                keywords: vec!["poc".to_string(), "validation".to_string()],
                label: "POC validation complete".to_string(),
            },
            MilestoneRule {
                keywords: vec!["Database".to_string(), "rds".to_string()],
                label: "Database migration to RDS complete".to_string(),
            },
        ]
    }

    #[test]
    fn test_default_labels_and_done_flags() {
        let snap = snapshot(vec![
            phase("EP-1", "Discovery", 3, 0),
            phase("EP-2", "Rollout", 1, 2),
            phase("EP-3", "Hypercare", 0, 0),
        ]);

        let milestones = detect_milestones(&snap, &[]);

        let labels: Vec<_> = milestones.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Discovery complete", "Rollout complete", "Hypercare complete"]
        );
        let done: Vec<_> = milestones.iter().map(|m| m.done).collect();
        assert_eq!(done, vec![true, false, false]);
        assert_eq!(milestones[1].phase_key, "EP-2");
        assert_eq!(milestones[2].phase_index, 2);
    }

    #[test]
    fn test_keyword_rules_match_case_insensitively() {
        let snap = snapshot(vec![
            phase("EP-1", "PoC Validation", 1, 0),
            phase("EP-2", "Move to RDS", 0, 1),
            phase("EP-3", "Monitoring", 0, 1),
        ]);

        let milestones = detect_milestones(&snap, &rules());

        assert_eq!(milestones[0].label, "POC validation complete");
        assert_eq!(milestones[1].label, "Database migration to RDS complete");
        assert_eq!(milestones[2].label, "Monitoring complete");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let snap = snapshot(vec![phase("EP-1", "POC for RDS", 0, 1)]);
        let milestones = detect_milestones(&snap, &rules());
        assert_eq!(milestones[0].label, "POC validation complete");
    }

    #[test]
    fn test_no_phases_no_milestones() {
        assert!(detect_milestones(&snapshot(Vec::new()), &rules()).is_empty());
    }
}
