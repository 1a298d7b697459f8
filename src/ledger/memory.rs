use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use super::{clamp_count, LedgerError, VoteLedger};
use crate::feedback::FeedbackItem;
use crate::vote::{VoteAction, VoteStatus, VoteToggle};

#[derive(Default)]
struct State {
    items: HashMap<Uuid, FeedbackItem>,
    votes: HashSet<(Uuid, Uuid)>,
}

impl State {
    fn count_votes(&self, feedback_id: Uuid) -> i32 {
        clamp_count(
            self.votes
                .iter()
                .filter(|(item, _)| *item == feedback_id)
                .count() as i64,
        )
    }
}

/// In-process ledger. A single mutex stands in for the database transaction,
/// so every toggle sees the result of the one before it.
#[derive(Default)]
pub struct MemoryLedger {
    state: Mutex<State>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feedback(items: impl IntoIterator<Item = FeedbackItem>) -> Self {
        let ledger = Self::new();
        {
            let mut state = ledger.state.lock().unwrap_or_else(|p| p.into_inner());
            for item in items {
                state.items.insert(item.id, item);
            }
        }
        ledger
    }

    pub fn find_feedback(&self, feedback_id: Uuid) -> Result<FeedbackItem, LedgerError> {
        self.lock()?
            .items
            .get(&feedback_id)
            .cloned()
            .ok_or(LedgerError::NotFound)
    }

    /// Vote rows held for an item, counted directly.
    pub fn count_votes(&self, feedback_id: Uuid) -> Result<i32, LedgerError> {
        Ok(self.lock()?.count_votes(feedback_id))
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, LedgerError> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger lock poisoned".to_string()))
    }
}

impl VoteLedger for MemoryLedger {
    fn toggle_vote(&self, feedback_id: Uuid, user_id: Uuid) -> Result<VoteToggle, LedgerError> {
        let mut state = self.lock()?;

        if !state.items.contains_key(&feedback_id) {
            return Err(LedgerError::NotFound);
        }

        let action = if state.votes.remove(&(feedback_id, user_id)) {
            VoteAction::Removed
        } else {
            state.votes.insert((feedback_id, user_id));
            VoteAction::Added
        };

        let total = state.count_votes(feedback_id);
        let item = state
            .items
            .get_mut(&feedback_id)
            .ok_or(LedgerError::NotFound)?;
        item.vote_count = total;
        item.updated_at = Utc::now();

        Ok(VoteToggle {
            action,
            vote_count: total,
            feedback: item.clone(),
        })
    }

    fn vote_status(&self, feedback_id: Uuid, user_id: Uuid) -> Result<VoteStatus, LedgerError> {
        let state = self.lock()?;
        let item = state.items.get(&feedback_id).ok_or(LedgerError::NotFound)?;

        Ok(VoteStatus {
            voted: state.votes.contains(&(feedback_id, user_id)),
            vote_count: item.vote_count,
        })
    }
}
