use serde::{Deserialize, Serialize};

/// Lifecycle event tag.
///
/// The set is closed: entity owners fire these and nothing else.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Before an entity's state is written.
    PreSave,
    /// After an entity's state was written (insert or update).
    PostSave,
    /// Before an entity is removed.
    PreDelete,
    /// After an entity was removed.
    PostDelete,
    /// After the first write of an entity.
    Created,
    /// After a non-first write of an entity.
    Updated,
    /// After an entity was removed (fired after `PostDelete`).
    Deleted,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::PreSave,
        EventKind::PostSave,
        EventKind::PreDelete,
        EventKind::PostDelete,
        EventKind::Created,
        EventKind::Updated,
        EventKind::Deleted,
    ];

    /// Stable event name (e.g. "entity.post_save").
    pub fn event_type(&self) -> &'static str {
        match self {
            EventKind::PreSave => "entity.pre_save",
            EventKind::PostSave => "entity.post_save",
            EventKind::PreDelete => "entity.pre_delete",
            EventKind::PostDelete => "entity.post_delete",
            EventKind::Created => "entity.created",
            EventKind::Updated => "entity.updated",
            EventKind::Deleted => "entity.deleted",
        }
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.event_type())
    }
}
