//! Vote ledger.
//!
//! Keeps at most one vote per (feedback item, user) and the item's
//! `vote_count` equal to the number of its votes at every commit.
//! Handlers only see the [`VoteLedger`] trait; [`PgLedger`] is the
//! production store, [`MemoryLedger`] runs the same rules in process.

use thiserror::Error;
use uuid::Uuid;

use crate::vote::{VoteStatus, VoteToggle};

mod memory;
mod postgres;

pub use memory::MemoryLedger;
pub use postgres::PgLedger;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("feedback item not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

pub trait VoteLedger: Send + Sync {
    /// Adds the user's vote if absent, removes it if present, and rewrites
    /// the item's counter, all in one atomic step.
    fn toggle_vote(&self, feedback_id: Uuid, user_id: Uuid) -> Result<VoteToggle, LedgerError>;

    fn vote_status(&self, feedback_id: Uuid, user_id: Uuid) -> Result<VoteStatus, LedgerError>;
}

/// Saturates instead of wrapping; the column is an `INTEGER`.
pub(crate) fn clamp_count(count: i64) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}
