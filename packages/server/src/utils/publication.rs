use chrono::{DateTime, Utc};

/// Visibility state of a result.
///
/// `declared_date` records the first publication. Unpublishing keeps it as
/// history and publishing again does not move it, so toggling twice restores
/// both fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Publication {
    pub is_published: bool,
    pub declared_date: Option<DateTime<Utc>>,
}

impl Publication {
    pub fn publish(self, now: DateTime<Utc>) -> Self {
        Self {
            is_published: true,
            declared_date: self.declared_date.or(Some(now)),
        }
    }

    pub fn unpublish(self) -> Self {
        Self {
            is_published: false,
            ..self
        }
    }

    pub fn toggle(self, now: DateTime<Utc>) -> Self {
        if self.is_published {
            self.unpublish()
        } else {
            self.publish(now)
        }
    }
}
