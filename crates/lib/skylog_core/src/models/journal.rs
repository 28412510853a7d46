//! Travel journal models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::ownership::Owned;
use crate::uuid::uuidv7;

/// A journal entry with its comments and likes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub location: Option<String>,
    /// Opaque image references; storage of the images themselves lives elsewhere.
    pub images: Vec<String>,
    /// Identity ids that liked this entry. Each id appears at most once.
    pub likes: Vec<Uuid>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Journal {
    pub fn new(owner_id: Uuid, draft: NewJournal) -> Self {
        let now = Utc::now();
        Self {
            id: uuidv7(),
            owner_id,
            title: draft.title,
            content: draft.content,
            location: draft.location,
            images: draft.images,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn comment(&self, comment_id: Uuid) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }
}

/// A comment on a journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub journal_id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(journal_id: Uuid, owner_id: Uuid, content: String) -> Self {
        Self {
            id: uuidv7(),
            journal_id,
            owner_id,
            content,
            created_at: Utc::now(),
        }
    }
}

/// Fields supplied when creating a journal entry.
#[derive(Debug, Clone, Default)]
pub struct NewJournal {
    pub title: String,
    pub content: String,
    pub location: Option<String>,
    pub images: Vec<String>,
}

/// Partial update; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct JournalUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub location: Option<String>,
    /// Replaces the whole list when present; `Some(vec![])` clears it.
    pub images: Option<Vec<String>>,
}

impl JournalUpdate {
    /// Apply non-empty fields to `journal` and bump `updated_at`.
    pub fn apply(self, journal: &mut Journal) {
        if let Some(title) = self.title.filter(|t| !t.trim().is_empty()) {
            journal.title = title;
        }
        if let Some(content) = self.content.filter(|c| !c.trim().is_empty()) {
            journal.content = content;
        }
        if let Some(location) = self.location.filter(|l| !l.trim().is_empty()) {
            journal.location = Some(location);
        }
        if let Some(images) = self.images {
            journal.images = images;
        }
        journal.updated_at = Utc::now();
    }
}

/// Result of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    pub liked: bool,
    pub count: usize,
}

impl Owned for Journal {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NewJournal {
        NewJournal {
            title: "Kyoto".into(),
            content: "Temples".into(),
            location: Some("Japan".into()),
            images: vec!["img-1".into()],
        }
    }

    #[test]
    fn update_keeps_fields_when_blank() {
        let mut journal = Journal::new(uuidv7(), draft());
        JournalUpdate {
            title: Some("   ".into()),
            content: Some("Shrines".into()),
            location: None,
            images: None,
        }
        .apply(&mut journal);
        assert_eq!(journal.title, "Kyoto");
        assert_eq!(journal.content, "Shrines");
        assert_eq!(journal.location.as_deref(), Some("Japan"));
        assert_eq!(journal.images, ["img-1"]);
    }

    #[test]
    fn update_replaces_images() {
        let mut journal = Journal::new(uuidv7(), draft());
        JournalUpdate {
            images: Some(vec!["img-2".into(), "img-3".into()]),
            ..Default::default()
        }
        .apply(&mut journal);
        assert_eq!(journal.images, ["img-2", "img-3"]);

        JournalUpdate {
            images: Some(Vec::new()),
            ..Default::default()
        }
        .apply(&mut journal);
        assert!(journal.images.is_empty());
    }

    #[test]
    fn comment_lookup() {
        let mut journal = Journal::new(uuidv7(), draft());
        let comment = Comment::new(journal.id, uuidv7(), "nice".into());
        let id = comment.id;
        journal.comments.push(comment);
        assert!(journal.comment(id).is_some());
        assert!(journal.comment(uuidv7()).is_none());
    }
}
