use serde::{Deserialize, Serialize};

pub const MAX_GOAL_PROGRESS: u8 = 100;
pub const MIN_MOOD: u8 = 1;
pub const MAX_MOOD: u8 = 10;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub category: String,
    pub created_at: String,
}

/// Task as submitted; `user_id` is overwritten with the caller's id at the HTTP edge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(default)]
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
    pub category: Option<String>,
}

impl Task {
    pub fn apply(&mut self, changes: TaskChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthEntry {
    pub id: String,
    pub user_id: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise: Option<String>,
    /// Self-rated, 1 to 10.
    pub mood: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHealthEntry {
    #[serde(default)]
    pub user_id: String,
    pub date: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub steps: Option<u32>,
    #[serde(default)]
    pub sleep: Option<f64>,
    #[serde(default)]
    pub water: Option<f64>,
    #[serde(default)]
    pub exercise: Option<String>,
    pub mood: u8,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FinanceKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinanceEntry {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub category: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: FinanceKind,
    /// `YYYY-MM-DD`
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFinanceEntry {
    #[serde(default)]
    pub user_id: String,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: FinanceKind,
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub target_date: String,
    pub progress: u8,
    pub milestones: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    #[serde(default)]
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub target_date: String,
    /// Any integer is accepted; stored clamped to 0..=100.
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub milestones: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub target_date: Option<String>,
    pub progress: Option<i64>,
    pub milestones: Option<Vec<String>>,
}

impl Goal {
    pub fn apply(&mut self, changes: GoalChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(target_date) = changes.target_date {
            self.target_date = target_date;
        }
        if let Some(progress) = changes.progress {
            self.progress = clamp_progress(progress);
        }
        if let Some(milestones) = changes.milestones {
            self.milestones = clean_milestones(milestones);
        }
    }
}

pub fn mood_in_range(mood: u8) -> bool {
    (MIN_MOOD..=MAX_MOOD).contains(&mood)
}

pub fn clamp_progress(progress: i64) -> u8 {
    // Bounded to 0..=100 so the cast cannot truncate
    progress.clamp(0, i64::from(MAX_GOAL_PROGRESS)) as u8
}

/// Drops the blank rows the goal form leaves behind.
pub fn clean_milestones(milestones: Vec<String>) -> Vec<String> {
    milestones
        .into_iter()
        .filter(|m| !m.trim().is_empty())
        .collect()
}

fn default_category() -> String {
    "personal".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal() -> Goal {
        Goal {
            id: "g-1".to_string(),
            user_id: "u1".to_string(),
            title: "Run a marathon".to_string(),
            description: String::new(),
            category: "health".to_string(),
            target_date: "2027-04-01".to_string(),
            progress: 10,
            milestones: vec!["5k".to_string()],
            created_at: "2026-10-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_goal_apply_clamps_progress() {
        let mut g = goal();
        g.apply(GoalChanges {
            progress: Some(250),
            ..Default::default()
        });
        assert_eq!(g.progress, 100);
    }

    #[test]
    fn test_clamp_progress() {
        assert_eq!(clamp_progress(-5), 0);
        assert_eq!(clamp_progress(42), 42);
        assert_eq!(clamp_progress(1000), 100);
        assert_eq!(clamp_progress(i64::MAX), 100);
    }

    #[test]
    fn test_large_progress_deserializes() {
        let new: NewGoal = serde_json::from_str(r#"{"title":"g","progress":300}"#).unwrap();
        assert_eq!(new.progress, 300);
        let changes: GoalChanges = serde_json::from_str(r#"{"progress":1000}"#).unwrap();
        assert_eq!(changes.progress, Some(1000));
    }

    #[test]
    fn test_mood_range() {
        assert!(mood_in_range(MIN_MOOD));
        assert!(mood_in_range(MAX_MOOD));
        assert!(!mood_in_range(0));
        assert!(!mood_in_range(200));
    }

    #[test]
    fn test_goal_apply_leaves_absent_fields() {
        let mut g = goal();
        g.apply(GoalChanges {
            milestones: Some(vec!["10k".to_string(), "  ".to_string()]),
            ..Default::default()
        });
        assert_eq!(g.title, "Run a marathon");
        assert_eq!(g.progress, 10);
        assert_eq!(g.milestones, vec!["10k".to_string()]);
    }

    #[test]
    fn test_new_task_defaults() {
        let new: NewTask = serde_json::from_str(r#"{"title":"Pay bills"}"#).unwrap();
        assert_eq!(new.priority, Priority::Medium);
        assert_eq!(new.category, "personal");
        assert!(!new.completed);
    }

    #[test]
    fn test_finance_kind_wire_format() {
        let entry: NewFinanceEntry = serde_json::from_str(
            r#"{"amount":12.5,"category":"food","type":"expense","date":"2026-10-02"}"#,
        )
        .unwrap();
        assert_eq!(entry.kind, FinanceKind::Expense);
        assert_eq!(entry.description, "");
    }
}
