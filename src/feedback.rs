use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::STATUS_OPEN;
use crate::schema::feedback;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub author_id: Uuid,
    pub board_id: Uuid,
    pub vote_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeedbackItem {
    pub fn new(board_id: Uuid, author_id: Uuid, title: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            status: STATUS_OPEN.to_string(),
            author_id,
            board_id,
            vote_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_feedback_db(&self) -> FeedbackDB {
        FeedbackDB {
            id: self.id,
            created_at: self.created_at.naive_utc(),
            updated_at: self.updated_at.naive_utc(),
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status.clone(),
            vote_count: self.vote_count,
            author_id: self.author_id,
            board_id: self.board_id,
        }
    }
}

/// Row of the `feedback` table. Field order follows the `table!` column order.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = feedback)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FeedbackDB {
    pub id: Uuid,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub title: String,
    pub description: String,
    pub status: String,
    pub vote_count: i32,
    pub author_id: Uuid,
    pub board_id: Uuid,
}

impl FeedbackDB {
    pub fn to_feedback(&self) -> FeedbackItem {
        FeedbackItem {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status.clone(),
            author_id: self.author_id,
            board_id: self.board_id,
            vote_count: self.vote_count,
            created_at: Utc.from_utc_datetime(&self.created_at),
            updated_at: Utc.from_utc_datetime(&self.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_feedback_starts_open_without_votes() {
        let item = FeedbackItem::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Dark mode".to_string(),
            "Please add a dark theme".to_string(),
        );

        assert_eq!(item.status, STATUS_OPEN);
        assert_eq!(item.vote_count, 0);
        assert_eq!(item.created_at, item.updated_at);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let item = FeedbackItem::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Export".to_string(),
            "CSV export for boards".to_string(),
        );
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["voteCount"], 0);
        assert_eq!(json["boardId"], item.board_id.to_string());
        assert_eq!(json["authorId"], item.author_id.to_string());
        assert!(json.get("vote_count").is_none());
    }

    #[test]
    fn db_row_keeps_counter_and_ids() {
        let mut item = FeedbackItem::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Webhooks".to_string(),
            "Notify on status change".to_string(),
        );
        item.vote_count = 7;

        let row = item.to_feedback_db();
        let back = row.to_feedback();

        assert_eq!(back.id, item.id);
        assert_eq!(back.vote_count, 7);
        assert_eq!(back.board_id, item.board_id);
    }
}
