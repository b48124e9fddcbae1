//! Posting lifecycle as an explicit state machine.
//!
//! Postings persist four independent columns (`is_approved`, `is_archived`,
//! `is_deleted`, `deleted_at`). Every transition goes through [`Lifecycle`], which
//! only admits meaningful combinations and is flattened back into
//! [`LifecycleFlags`] for storage. Expiry is never stored here: it is derived from
//! `expires_at` at evaluation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approval {
    Pending,
    Approved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Live {
        approval: Approval,
        archived: bool,
    },
    /// Soft-deleted. Approval and archival are retained so `restore` returns the
    /// posting to exactly where it was.
    Deleted {
        approval: Approval,
        archived: bool,
        deleted_at: DateTime<Utc>,
    },
}

/// Storage shape of a [`Lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleFlags {
    pub is_approved: bool,
    pub is_archived: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Approve,
    Reject,
    Archive,
    Unarchive,
    SoftDelete,
    Restore,
    Expire,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Approve => "approve",
            Transition::Reject => "reject",
            Transition::Archive => "archive",
            Transition::Unarchive => "unarchive",
            Transition::SoftDelete => "soft_delete",
            Transition::Restore => "restore",
            Transition::Expire => "expire",
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("cannot {} a deleted posting; restore it first", transition.as_str())]
pub struct TransitionError {
    pub transition: Transition,
}

impl Lifecycle {
    /// Initial state for employer submissions.
    pub fn pending() -> Self {
        Lifecycle::Live {
            approval: Approval::Pending,
            archived: false,
        }
    }

    /// Initial state for admin-created postings that skip review.
    pub fn pre_approved() -> Self {
        Lifecycle::Live {
            approval: Approval::Approved,
            archived: false,
        }
    }

    /// Rebuilds the state from stored flags. A deleted row missing its
    /// `deleted_at` gets `fallback_deleted_at`.
    pub fn from_flags(flags: LifecycleFlags, fallback_deleted_at: DateTime<Utc>) -> Self {
        let approval = if flags.is_approved {
            Approval::Approved
        } else {
            Approval::Pending
        };
        if flags.is_deleted {
            Lifecycle::Deleted {
                approval,
                archived: flags.is_archived,
                deleted_at: flags.deleted_at.unwrap_or(fallback_deleted_at),
            }
        } else {
            Lifecycle::Live {
                approval,
                archived: flags.is_archived,
            }
        }
    }

    pub fn flags(&self) -> LifecycleFlags {
        match *self {
            Lifecycle::Live { approval, archived } => LifecycleFlags {
                is_approved: approval == Approval::Approved,
                is_archived: archived,
                is_deleted: false,
                deleted_at: None,
            },
            Lifecycle::Deleted {
                approval,
                archived,
                deleted_at,
            } => LifecycleFlags {
                is_approved: approval == Approval::Approved,
                is_archived: archived,
                is_deleted: true,
                deleted_at: Some(deleted_at),
            },
        }
    }

    pub fn approval(&self) -> Approval {
        match *self {
            Lifecycle::Live { approval, .. } | Lifecycle::Deleted { approval, .. } => approval,
        }
    }

    pub fn is_archived(&self) -> bool {
        match *self {
            Lifecycle::Live { archived, .. } | Lifecycle::Deleted { archived, .. } => archived,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Lifecycle::Deleted { .. })
    }

    /// Approved and not soft-deleted. Archival does not hide a posting.
    pub fn is_publicly_visible(&self) -> bool {
        matches!(
            self,
            Lifecycle::Live {
                approval: Approval::Approved,
                ..
            }
        )
    }

    /// Publicly visible and not past `expires_at`. Expiry is authoritative over
    /// the archived flag.
    pub fn is_sitemap_eligible(
        &self,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        self.is_publicly_visible() && expires_at.map_or(true, |at| at > now)
    }

    pub fn apply(
        self,
        transition: Transition,
        now: DateTime<Utc>,
    ) -> Result<Self, TransitionError> {
        match transition {
            Transition::Approve => self.approve(),
            Transition::Reject => self.reject(),
            Transition::Archive => self.archive(),
            Transition::Unarchive => self.unarchive(),
            Transition::SoftDelete => Ok(self.soft_delete(now)),
            Transition::Restore => Ok(self.restore()),
            Transition::Expire => Ok(self.expire()),
        }
    }

    pub fn approve(self) -> Result<Self, TransitionError> {
        self.live_only(Transition::Approve, |_, archived| Lifecycle::Live {
            approval: Approval::Approved,
            archived,
        })
    }

    pub fn reject(self) -> Result<Self, TransitionError> {
        self.live_only(Transition::Reject, |_, archived| Lifecycle::Live {
            approval: Approval::Pending,
            archived,
        })
    }

    pub fn archive(self) -> Result<Self, TransitionError> {
        self.live_only(Transition::Archive, |approval, _| Lifecycle::Live {
            approval,
            archived: true,
        })
    }

    pub fn unarchive(self) -> Result<Self, TransitionError> {
        self.live_only(Transition::Unarchive, |approval, _| Lifecycle::Live {
            approval,
            archived: false,
        })
    }

    /// Deleting an already-deleted posting keeps the original `deleted_at`.
    pub fn soft_delete(self, now: DateTime<Utc>) -> Self {
        match self {
            Lifecycle::Live { approval, archived } => Lifecycle::Deleted {
                approval,
                archived,
                deleted_at: now,
            },
            deleted @ Lifecycle::Deleted { .. } => deleted,
        }
    }

    pub fn restore(self) -> Self {
        match self {
            Lifecycle::Deleted {
                approval, archived, ..
            } => Lifecycle::Live { approval, archived },
            live @ Lifecycle::Live { .. } => live,
        }
    }

    /// Sweep transition for a posting whose `expires_at` has passed. Deleted
    /// postings are left alone.
    pub fn expire(self) -> Self {
        match self {
            Lifecycle::Live { approval, .. } => Lifecycle::Live {
                approval,
                archived: true,
            },
            deleted @ Lifecycle::Deleted { .. } => deleted,
        }
    }

    fn live_only(
        self,
        transition: Transition,
        next: impl FnOnce(Approval, bool) -> Lifecycle,
    ) -> Result<Self, TransitionError> {
        match self {
            Lifecycle::Live { approval, archived } => Ok(next(approval, archived)),
            Lifecycle::Deleted { .. } => Err(TransitionError { transition }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn approval_makes_pending_posting_visible() {
        let state = Lifecycle::pending();
        assert!(!state.is_publicly_visible());
        let approved = state.approve().unwrap();
        assert!(approved.is_publicly_visible());
        assert_eq!(approved.approve().unwrap(), approved);
    }

    #[test]
    fn archived_posting_stays_visible() {
        let archived = Lifecycle::pre_approved().archive().unwrap();
        assert!(archived.is_archived());
        assert!(archived.is_publicly_visible());
        assert!(!archived.unarchive().unwrap().is_archived());
    }

    #[test]
    fn soft_delete_and_restore_round_trip_the_prior_state() {
        let now = Utc::now();
        let before = Lifecycle::pre_approved().archive().unwrap();
        let deleted = before.soft_delete(now);
        assert!(!deleted.is_publicly_visible());
        assert_eq!(deleted.flags().deleted_at, Some(now));

        let again = deleted.soft_delete(now + Duration::hours(1));
        assert_eq!(again, deleted);

        let restored = deleted.restore();
        assert_eq!(restored, before);
        assert_eq!(restored.flags().deleted_at, None);
    }

    #[test]
    fn review_transitions_are_rejected_on_deleted_postings() {
        let deleted = Lifecycle::pending().soft_delete(Utc::now());
        let err = deleted.approve().unwrap_err();
        assert_eq!(err.transition, Transition::Approve);
        assert!(deleted.archive().is_err());
        assert!(deleted.reject().is_err());
    }

    #[test]
    fn expiry_outranks_the_archived_flag_for_sitemap() {
        let now = Utc::now();
        let live = Lifecycle::pre_approved();
        assert!(live.is_sitemap_eligible(None, now));
        assert!(live.is_sitemap_eligible(Some(now + Duration::days(1)), now));
        assert!(!live.is_sitemap_eligible(Some(now - Duration::days(1)), now));

        let archived_not_expired = live.archive().unwrap();
        assert!(archived_not_expired.is_sitemap_eligible(None, now));
    }

    #[test]
    fn flags_round_trip_and_normalize_missing_deleted_at() {
        let fallback = Utc::now();
        let flags = LifecycleFlags {
            is_approved: false,
            is_archived: true,
            is_deleted: true,
            deleted_at: None,
        };
        let state = Lifecycle::from_flags(flags, fallback);
        assert_eq!(
            state,
            Lifecycle::Deleted {
                approval: Approval::Pending,
                archived: true,
                deleted_at: fallback,
            }
        );
        assert_eq!(Lifecycle::from_flags(state.flags(), fallback), state);
    }

    #[test]
    fn expire_archives_live_postings_only() {
        let now = Utc::now();
        assert!(Lifecycle::pending().expire().is_archived());
        let deleted = Lifecycle::pending().soft_delete(now);
        assert_eq!(deleted.expire(), deleted);
    }
}
