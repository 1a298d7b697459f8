table! {
    users (id) {
        id -> Uuid,
        created_at -> Timestamp,
        email -> Text,
        first_name -> Text,
        last_name -> Text,
        role -> Text,
    }
}

table! {
    feedback (id) {
        id -> Uuid,
        created_at -> Timestamp,
        updated_at -> Timestamp,
        title -> Text,
        description -> Text,
        status -> Text,
        vote_count -> Int4,
        author_id -> Uuid,
        board_id -> Uuid,
    }
}

table! {
    votes (id) {
        id -> Uuid,
        created_at -> Timestamp,
        feedback_id -> Uuid,
        user_id -> Uuid,
    }
}

joinable!(feedback -> users (author_id));
joinable!(votes -> feedback (feedback_id));
joinable!(votes -> users (user_id));

allow_tables_to_appear_in_same_query!(users, feedback, votes);
