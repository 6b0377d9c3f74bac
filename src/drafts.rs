// src/drafts.rs

//! In-progress answers, kept per game session until the final submit.
//! Drafts are not persisted; only a committed submission reaches the
//! response store. A draft lives no longer than the session token it
//! belongs to.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;

use crate::{models::guest::SubmissionTarget, utils::answer::RawAnswer};

#[derive(Debug, Clone)]
pub struct Draft {
    pub target: SubmissionTarget,
    pub guest_name: String,
    /// Raw answers keyed by question id, exactly as the guest typed them.
    pub answers: BTreeMap<i64, RawAnswer>,
    pub started_at: DateTime<Utc>,
}

impl Draft {
    pub fn new(target: SubmissionTarget, guest_name: String) -> Self {
        Draft {
            target,
            guest_name,
            answers: BTreeMap::new(),
            started_at: Utc::now(),
        }
    }
}

/// Drafts keyed by session id.
#[derive(Debug)]
pub struct DraftStore {
    drafts: DashMap<String, Draft>,
    ttl: TimeDelta,
}

impl DraftStore {
    /// Drafts older than `ttl_seconds` are treated as gone.
    pub fn new(ttl_seconds: u64) -> Self {
        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);

        Self {
            drafts: DashMap::new(),
            ttl,
        }
    }

    fn is_expired(&self, draft: &Draft, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(draft.started_at) >= self.ttl
    }

    /// Drops the session's draft if it has expired.
    fn evict_if_expired(&self, session_id: &str) {
        let now = Utc::now();
        if self
            .drafts
            .remove_if(session_id, |_, draft| self.is_expired(draft, now))
            .is_some()
        {
            tracing::debug!(session = session_id, "expired draft evicted");
        }
    }

    /// Removes every expired draft. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.drafts.len();
        self.drafts.retain(|_, draft| !self.is_expired(draft, now));
        let purged = before.saturating_sub(self.drafts.len());

        if purged > 0 {
            tracing::info!(purged, "expired drafts purged");
        }
        purged
    }

    /// Opens a fresh draft, replacing any draft under the same session.
    /// Abandoned drafts are swept out at the same time.
    pub fn open(&self, session_id: &str, draft: Draft) {
        self.purge_expired();
        self.drafts.insert(session_id.to_string(), draft);
    }

    pub fn get(&self, session_id: &str) -> Option<Draft> {
        self.evict_if_expired(session_id);
        self.drafts.get(session_id).map(|d| d.value().clone())
    }

    /// Records an answer. Returns `false` when the session has no live draft.
    pub fn set_answer(&self, session_id: &str, question_id: i64, answer: RawAnswer) -> bool {
        self.evict_if_expired(session_id);
        match self.drafts.get_mut(session_id) {
            Some(mut draft) => {
                draft.answers.insert(question_id, answer);
                true
            }
            None => false,
        }
    }

    /// Removes and returns the draft. Only one caller can take a given draft,
    /// which keeps a double-clicked submit from committing twice.
    pub fn take(&self, session_id: &str) -> Option<Draft> {
        let now = Utc::now();
        self.drafts
            .remove(session_id)
            .map(|(_, draft)| draft)
            .filter(|draft| !self.is_expired(draft, now))
    }

    /// Puts a draft back after a failed submission so the guest can retry.
    pub fn restore(&self, session_id: &str, draft: Draft) {
        self.drafts.entry(session_id.to_string()).or_insert(draft);
    }

    /// Whether any live session belongs to this listed guest.
    pub fn is_in_progress(&self, guest_id: i64) -> bool {
        let now = Utc::now();
        self.drafts.iter().any(|entry| {
            entry.target == SubmissionTarget::Listed(guest_id) && !self.is_expired(&entry, now)
        })
    }

    pub fn clear(&self) {
        self.drafts.clear();
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}
