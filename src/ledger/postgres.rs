use chrono::Utc;
use diesel::prelude::*;
use diesel::PgConnection;
use log::error;
use uuid::Uuid;

use super::{clamp_count, LedgerError, VoteLedger};
use crate::feedback::FeedbackDB;
use crate::schema::{feedback, votes};
use crate::vote::{VoteAction, VoteDB, VoteStatus, VoteToggle};
use crate::DBPool;

/// Ledger backed by Postgres through a diesel connection pool.
#[derive(Clone)]
pub struct PgLedger {
    pool: DBPool,
}

impl PgLedger {
    pub fn new(pool: DBPool) -> Self {
        Self { pool }
    }
}

impl VoteLedger for PgLedger {
    fn toggle_vote(&self, feedback_id: Uuid, user_id: Uuid) -> Result<VoteToggle, LedgerError> {
        let mut conn = self.pool.get()?;
        toggle_vote(&mut conn, feedback_id, user_id).map_err(|err| {
            if !matches!(err, LedgerError::NotFound) {
                error!(
                    "vote toggle on feedback {} rolled back: {}",
                    feedback_id, err
                );
            }
            err
        })
    }

    fn vote_status(&self, feedback_id: Uuid, user_id: Uuid) -> Result<VoteStatus, LedgerError> {
        let mut conn = self.pool.get()?;
        vote_status(&mut conn, feedback_id, user_id)
    }
}

/// Runs the whole toggle in one transaction.
///
/// The feedback row is locked `FOR UPDATE` before the vote lookup, so two
/// toggles on the same item queue behind each other and the second one
/// always sees what the first committed.
pub fn toggle_vote(
    conn: &mut PgConnection,
    feedback_id: Uuid,
    user_id: Uuid,
) -> Result<VoteToggle, LedgerError> {
    conn.transaction::<_, LedgerError, _>(|conn| {
        feedback::table
            .find(feedback_id)
            .select(feedback::id)
            .for_update()
            .first::<Uuid>(conn)
            .optional()?
            .ok_or(LedgerError::NotFound)?;

        let existing = votes::table
            .filter(votes::feedback_id.eq(feedback_id))
            .filter(votes::user_id.eq(user_id))
            .select(votes::id)
            .first::<Uuid>(conn)
            .optional()?;

        let action = match existing {
            Some(vote_id) => {
                diesel::delete(votes::table.find(vote_id)).execute(conn)?;
                VoteAction::Removed
            }
            None => {
                diesel::insert_into(votes::table)
                    .values(&VoteDB::new(feedback_id, user_id))
                    .execute(conn)?;
                VoteAction::Added
            }
        };

        let total = count_votes(conn, feedback_id)?;

        let updated = diesel::update(feedback::table.find(feedback_id))
            .set((
                feedback::vote_count.eq(total),
                feedback::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<FeedbackDB>(conn)?;

        Ok(VoteToggle {
            action,
            vote_count: updated.vote_count,
            feedback: updated.to_feedback(),
        })
    })
}

pub fn vote_status(
    conn: &mut PgConnection,
    feedback_id: Uuid,
    user_id: Uuid,
) -> Result<VoteStatus, LedgerError> {
    let vote_count = feedback::table
        .find(feedback_id)
        .select(feedback::vote_count)
        .first::<i32>(conn)
        .optional()?
        .ok_or(LedgerError::NotFound)?;

    let voted = diesel::select(diesel::dsl::exists(
        votes::table
            .filter(votes::feedback_id.eq(feedback_id))
            .filter(votes::user_id.eq(user_id)),
    ))
    .get_result::<bool>(conn)?;

    Ok(VoteStatus { voted, vote_count })
}

/// Number of vote rows for an item, recomputed from scratch.
pub fn count_votes(conn: &mut PgConnection, feedback_id: Uuid) -> Result<i32, LedgerError> {
    let total = votes::table
        .filter(votes::feedback_id.eq(feedback_id))
        .count()
        .get_result::<i64>(conn)?;

    Ok(clamp_count(total))
}
