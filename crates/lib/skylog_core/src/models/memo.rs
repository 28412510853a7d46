//! Travel memo checklist items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::ownership::Owned;
use crate::uuid::uuidv7;

/// A checklist item kept by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memo {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Memo {
    pub fn new(owner_id: Uuid, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuidv7(),
            owner_id,
            title,
            content,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Owned for Memo {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Partial update; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct MemoUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub completed: Option<bool>,
}

impl MemoUpdate {
    /// Apply to `memo` and bump `updated_at`. A blank title is ignored;
    /// content may be cleared.
    pub fn apply(self, memo: &mut Memo) {
        if let Some(title) = self.title.filter(|t| !t.trim().is_empty()) {
            memo.title = title;
        }
        if let Some(content) = self.content {
            memo.content = content;
        }
        if let Some(completed) = self.completed {
            memo.completed = completed;
        }
        memo.updated_at = Utc::now();
    }
}
