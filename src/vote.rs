use actix_web::web::{self, Data, Path};
use actix_web::{get, post, HttpResponse};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::constants::APPLICATION_JSON;
use crate::error::ApiError;
use crate::feedback::FeedbackItem;
use crate::ledger::VoteLedger;
use crate::response::Response;
use crate::schema::votes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    Added,
    Removed,
}

/// Outcome of a toggle, as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteToggle {
    pub action: VoteAction,
    pub vote_count: i32,
    pub feedback: FeedbackItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatus {
    pub voted: bool,
    pub vote_count: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = votes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VoteDB {
    pub id: Uuid,
    pub created_at: NaiveDateTime,
    pub feedback_id: Uuid,
    pub user_id: Uuid,
}

impl VoteDB {
    pub fn new(feedback_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now().naive_utc(),
            feedback_id,
            user_id,
        }
    }
}

// A path segment that is not a uuid cannot name a stored item.
fn parse_feedback_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

/// toggle the caller's vote on a feedback item `/api/feedback/{id}/vote`
#[post("/api/feedback/{id}/vote")]
pub async fn toggle(
    path: Path<String>,
    user: AuthenticatedUser,
    ledger: Data<dyn VoteLedger>,
) -> Result<HttpResponse, ApiError> {
    let feedback_id = parse_feedback_id(&path)?;
    let user_id = user.id;

    let toggled = web::block(move || ledger.toggle_vote(feedback_id, user_id)).await??;

    info!(
        "vote {:?} on feedback {} by user {}, count now {}",
        toggled.action, feedback_id, user_id, toggled.vote_count
    );

    Ok(HttpResponse::Ok()
        .content_type(APPLICATION_JSON)
        .json(Response::new(toggled)))
}

/// whether the caller has voted on a feedback item `/api/feedback/{id}/vote`
#[get("/api/feedback/{id}/vote")]
pub async fn status(
    path: Path<String>,
    user: AuthenticatedUser,
    ledger: Data<dyn VoteLedger>,
) -> Result<HttpResponse, ApiError> {
    let feedback_id = parse_feedback_id(&path)?;
    let user_id = user.id;

    let status = web::block(move || ledger.vote_status(feedback_id, user_id)).await??;

    Ok(HttpResponse::Ok()
        .content_type(APPLICATION_JSON)
        .json(Response::new(status)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_serialize_lowercase() {
        assert_eq!(serde_json::to_value(VoteAction::Added).unwrap(), "added");
        assert_eq!(serde_json::to_value(VoteAction::Removed).unwrap(), "removed");
    }

    #[test]
    fn toggle_serializes_vote_count_in_camel_case() {
        let feedback = FeedbackItem::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Tags".to_string(),
            "Let us tag feedback".to_string(),
        );
        let toggled = VoteToggle {
            action: VoteAction::Added,
            vote_count: 1,
            feedback,
        };
        let json = serde_json::to_value(&toggled).unwrap();

        assert_eq!(json["action"], "added");
        assert_eq!(json["voteCount"], 1);
        assert!(json["feedback"]["id"].is_string());
    }

    #[test]
    fn non_uuid_path_is_not_found() {
        assert!(matches!(parse_feedback_id("not-a-uuid"), Err(ApiError::NotFound)));
        let id = Uuid::new_v4();
        assert_eq!(parse_feedback_id(&id.to_string()).unwrap(), id);
    }
}
