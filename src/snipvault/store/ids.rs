use crate::error::{EntityKind, Result, SnipError};

/// The three independent auto-increment counters.
///
/// Each holds the next ID to issue for its kind. Counters only move forward;
/// deleting an entity never hands its ID back. Values read from disk are kept
/// verbatim, even when zero or negative; [`IdCounters::issue`] clamps to 1 so
/// an unassigned-looking ID is never handed out. A counter at `i64::MAX` has
/// nothing left to give and reports `IdsExhausted` instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdCounters {
    pub next_snippet_id: i64,
    pub next_category_id: i64,
    pub next_tag_id: i64,
}

impl Default for IdCounters {
    fn default() -> Self {
        Self {
            next_snippet_id: 1,
            next_category_id: 1,
            next_tag_id: 1,
        }
    }
}

impl IdCounters {
    pub fn get(&self, kind: EntityKind) -> i64 {
        match kind {
            EntityKind::Snippet => self.next_snippet_id,
            EntityKind::Category => self.next_category_id,
            EntityKind::Tag => self.next_tag_id,
        }
    }

    fn counter_mut(&mut self, kind: EntityKind) -> &mut i64 {
        match kind {
            EntityKind::Snippet => &mut self.next_snippet_id,
            EntityKind::Category => &mut self.next_category_id,
            EntityKind::Tag => &mut self.next_tag_id,
        }
    }

    /// Hands out the next ID for `kind` and advances that counter only.
    ///
    /// The counter is left untouched when it cannot advance.
    pub fn issue(&mut self, kind: EntityKind) -> Result<i64> {
        let counter = self.counter_mut(kind);
        let id = (*counter).max(1);
        *counter = id
            .checked_add(1)
            .ok_or(SnipError::IdsExhausted { kind })?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_one() {
        let ids = IdCounters::default();
        assert_eq!(ids.get(EntityKind::Snippet), 1);
        assert_eq!(ids.get(EntityKind::Category), 1);
        assert_eq!(ids.get(EntityKind::Tag), 1);
    }

    #[test]
    fn test_issue_is_monotonic_per_kind() {
        let mut ids = IdCounters::default();
        assert_eq!(ids.issue(EntityKind::Snippet).unwrap(), 1);
        assert_eq!(ids.issue(EntityKind::Snippet).unwrap(), 2);
        assert_eq!(ids.issue(EntityKind::Tag).unwrap(), 1);
        assert_eq!(ids.get(EntityKind::Snippet), 3);
        assert_eq!(ids.get(EntityKind::Category), 1);
    }

    #[test]
    fn test_issue_clamps_non_positive_counters() {
        let mut ids = IdCounters {
            next_snippet_id: -5,
            next_category_id: 0,
            next_tag_id: 9,
        };
        assert_eq!(ids.issue(EntityKind::Snippet).unwrap(), 1);
        assert_eq!(ids.issue(EntityKind::Category).unwrap(), 1);
        assert_eq!(ids.issue(EntityKind::Tag).unwrap(), 9);
        assert_eq!(ids.next_snippet_id, 2);
    }

    #[test]
    fn test_issue_at_upper_bound_fails_without_wrapping() {
        let mut ids = IdCounters {
            next_snippet_id: i64::MAX - 1,
            next_category_id: i64::MAX,
            next_tag_id: 1,
        };
        assert_eq!(ids.issue(EntityKind::Snippet).unwrap(), i64::MAX - 1);
        assert!(matches!(
            ids.issue(EntityKind::Snippet).unwrap_err(),
            SnipError::IdsExhausted {
                kind: EntityKind::Snippet
            }
        ));
        assert_eq!(ids.next_snippet_id, i64::MAX);

        assert!(ids.issue(EntityKind::Category).is_err());
        assert!(ids.issue(EntityKind::Category).is_err());
        assert_eq!(ids.next_category_id, i64::MAX);
        assert_eq!(ids.issue(EntityKind::Tag).unwrap(), 1);
    }
}
