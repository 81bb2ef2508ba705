//! Records served by the append/list resource endpoints.
//!
//! Every field a client may send is optional: payloads are stored as given and
//! absent fields stay absent in the JSON that comes back.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A kind of record stored by a `/api/<resource>` endpoint.
pub trait Record: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Path segment and storage name of the resource.
    const RESOURCE: &'static str;

    /// Client payload accepted by `POST /api/<resource>`.
    type Draft: DeserializeOwned + Debug + Send;

    fn from_draft(draft: Self::Draft, id: String, now: DateTime<Utc>) -> Self;

    fn id(&self) -> &str;

    /// Copy that is safe to hand back to a client.
    fn redacted(&self) -> Self {
        self.clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

impl Record for TaskRecord {
    const RESOURCE: &'static str = "tasks";
    type Draft = TaskDraft;

    fn from_draft(draft: TaskDraft, id: String, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            title: draft.title,
            description: draft.description,
            date: draft.date,
            completed: false,
            images: draft.images,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// `weight`, `activity`, `meal` or `other` as sent by the UI.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDraft {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

impl Record for HealthRecord {
    const RESOURCE: &'static str = "health";
    type Draft = HealthDraft;

    fn from_draft(draft: HealthDraft, id: String, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            kind: draft.kind,
            value: draft.value,
            date: draft.date,
            images: draft.images,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDraft {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

impl Record for ExpenseRecord {
    const RESOURCE: &'static str = "expenses";
    type Draft = ExpenseDraft;

    fn from_draft(draft: ExpenseDraft, id: String, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            amount: draft.amount,
            category: draft.category,
            description: draft.description,
            date: draft.date,
            images: draft.images,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmotionRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionDraft {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

impl Record for EmotionRecord {
    const RESOURCE: &'static str = "emotions";
    type Draft = EmotionDraft;

    // Emotions are stamped with the time they were logged.
    fn from_draft(draft: EmotionDraft, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            mood: draft.mood,
            note: draft.note,
            date: now.to_rfc3339(),
            images: draft.images,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Shared payload of journal entries and notes.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDraft {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl Record for JournalEntry {
    const RESOURCE: &'static str = "journal";
    type Draft = TextDraft;

    fn from_draft(draft: TextDraft, id: String, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            content: draft.content,
            date: draft.date,
            images: draft.images,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl Record for Note {
    const RESOURCE: &'static str = "notes";
    type Draft = TextDraft;

    fn from_draft(draft: TextDraft, id: String, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            content: draft.content,
            date: draft.date,
            images: draft.images,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationDraft {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

impl Record for Recommendation {
    const RESOURCE: &'static str = "recommendations";
    type Draft = RecommendationDraft;

    fn from_draft(draft: RecommendationDraft, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            kind: draft.kind,
            content: draft.content,
            created_at: now.to_rfc3339(),
            images: draft.images,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

const BUILT_IN_RECOMMENDATIONS: [(&str, &str, &str); 4] = [
    (
        "1",
        "health",
        "Try a 10-minute walk after lunch for better digestion.",
    ),
    (
        "2",
        "productivity",
        "Set a daily priority to boost your focus.",
    ),
    (
        "3",
        "emotion",
        "Reflect on your mood each evening for better self-awareness.",
    ),
    (
        "4",
        "expense",
        "Review your weekly spending to spot savings opportunities.",
    ),
];

/// Suggestions every user sees ahead of the stored ones, stamped with `now`.
pub fn built_in_recommendations(now: DateTime<Utc>) -> Vec<Recommendation> {
    let created_at = now.to_rfc3339();
    BUILT_IN_RECOMMENDATIONS
        .iter()
        .map(|(id, kind, content)| Recommendation {
            id: (*id).to_string(),
            user_id: Some("demo-user".to_string()),
            kind: Some((*kind).to_string()),
            content: Some((*content).to_string()),
            created_at: created_at.clone(),
            images: None,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub created_at: String,
}

/// Stored form of a user record; the presentation layer hashes the
/// submitted password before building one.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password_hash: Option<String>,
}

impl Record for UserRecord {
    const RESOURCE: &'static str = "users";
    type Draft = UserDraft;

    fn from_draft(draft: UserDraft, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            password_hash: draft.password_hash,
            created_at: now.to_rfc3339(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn redacted(&self) -> Self {
        Self {
            password_hash: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_draft_starts_incomplete_and_keeps_missing_fields_absent() {
        let draft: TaskDraft = serde_json::from_str(r#"{"title":"Pay bills"}"#).unwrap();
        let task = TaskRecord::from_draft(draft, "t-1".to_string(), Utc::now());

        assert!(!task.completed);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["title"], "Pay bills");
        assert!(json.get("description").is_none());
        assert!(json.get("userId").is_none());
    }

    #[test]
    fn test_emotion_is_stamped_with_server_time() {
        let now = Utc::now();
        let draft = EmotionDraft {
            mood: Some("calm".to_string()),
            ..Default::default()
        };
        let emotion = EmotionRecord::from_draft(draft, "e-1".to_string(), now);
        assert_eq!(emotion.date, now.to_rfc3339());
    }

    #[test]
    fn test_health_type_uses_wire_name() {
        let draft: HealthDraft =
            serde_json::from_str(r#"{"type":"weight","value":"72kg","userId":"u1"}"#).unwrap();
        let record = HealthRecord::from_draft(draft, "h-1".to_string(), Utc::now());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "weight");
        assert_eq!(json["userId"], "u1");
    }

    #[test]
    fn test_user_record_redaction_drops_hash() {
        let draft = UserDraft {
            name: Some("Ann".to_string()),
            email: Some("a@x.com".to_string()),
            password_hash: Some("$argon2id$stub".to_string()),
        };
        let record = UserRecord::from_draft(draft, "u-1".to_string(), Utc::now());
        let json = serde_json::to_value(record.redacted()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["name"], "Ann");
    }

    #[test]
    fn test_built_in_recommendations() {
        let recs = built_in_recommendations(Utc::now());
        let ids: Vec<&str> = recs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert_eq!(recs[1].kind.as_deref(), Some("productivity"));
    }
}
