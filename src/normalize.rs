//! Conversion of raw tracker records into canonical domain values.
//!
//! Raw records are dynamically shaped JSON. Every nested lookup goes
//! through [`serde_json::Value`] indexing, which yields `Null` for missing
//! keys at any depth, so absent optional fields fall back to defaults
//! instead of failing.

use crate::error::{DashboardError, Result};
use crate::models::{Initiative, StatusCategory, Task, UNASSIGNED};
use serde_json::Value;

/// Default raw category key when a record carries none.
const DEFAULT_CATEGORY_KEY: &str = "new";

/// Build the browse link for an issue key.
pub fn browse_url(base_url: &str, key: &str) -> String {
    format!("{}/browse/{}", base_url, key)
}

/// Read the mandatory issue key.
pub fn issue_key<'a>(raw: &'a Value, context: &str) -> Result<&'a str> {
    raw["key"]
        .as_str()
        .ok_or_else(|| DashboardError::malformed(context))
}

/// Derive the normalized status category from `fields.status.statusCategory.key`.
pub fn status_category(raw: &Value) -> StatusCategory {
    let key = raw["fields"]["status"]["statusCategory"]["key"]
        .as_str()
        .unwrap_or(DEFAULT_CATEGORY_KEY);
    StatusCategory::from_key(key)
}

/// Assignee display name, or [`UNASSIGNED`] when the field is absent, null,
/// or not a populated object.
pub fn assignee_name(fields: &Value) -> String {
    match &fields["assignee"] {
        Value::Object(assignee) if !assignee.is_empty() => {
            str_field(&fields["assignee"]["displayName"])
        }
        _ => UNASSIGNED.to_string(),
    }
}

/// Key of the parent issue, if the record carries one.
pub fn parent_key(raw: &Value) -> Option<&str> {
    raw["fields"]["parent"]["key"].as_str()
}

/// Due date, absent when null, missing or empty.
pub fn due_date(fields: &Value) -> Option<String> {
    fields["duedate"]
        .as_str()
        .filter(|d| !d.is_empty())
        .map(String::from)
}

pub fn str_field(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}

/// Convert one raw task record.
pub fn normalize_task(raw: &Value, base_url: &str) -> Result<Task> {
    let key = issue_key(raw, "task record")?;
    let fields = &raw["fields"];

    Ok(Task {
        key: key.to_string(),
        summary: str_field(&fields["summary"]),
        status: str_field(&fields["status"]["name"]),
        status_category: status_category(raw),
        assignee: assignee_name(fields),
        priority: str_field(&fields["priority"]["name"]),
        updated: str_field(&fields["updated"]),
        due_date: due_date(fields),
        web_url: browse_url(base_url, key),
    })
}

/// Convert the initiative record.
///
/// The configured key is authoritative; the record's own key is not required.
pub fn normalize_initiative(raw: &Value, key: &str, base_url: &str) -> Initiative {
    let fields = &raw["fields"];

    Initiative {
        key: key.to_string(),
        summary: str_field(&fields["summary"]),
        status: str_field(&fields["status"]["name"]),
        owner: assignee_name(fields),
        project: str_field(&fields["project"]["name"]),
        web_url: browse_url(base_url, key),
    }
}
