use chrono::NaiveDateTime;
use diesel::table;

table! {
    users {
        id -> Integer,
        email -> Text,
        password_hash -> Text,
        is_creator -> Bool,
        avatar_url -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

table! {
    friendships {
        id -> Integer,
        user_id -> Integer,
        friend_id -> Integer,
        status -> Text,
        created_at -> Timestamp,
    }
}

table! {
    chats {
        id -> Integer,
        created_at -> Timestamp,
    }
}

table! {
    chat_participants {
        id -> Integer,
        chat_id -> Integer,
        user_id -> Integer,
    }
}

table! {
    messages {
        id -> Integer,
        chat_id -> Integer,
        sender_id -> Integer,
        message_text -> Text,
        created_at -> Timestamp,
    }
}

table! {
    scam_reports {
        id -> Integer,
        username -> Text,
        is_scammer -> Bool,
        report_count -> Integer,
        description -> Text,
        evidence_url -> Text,
        likes -> Integer,
        dislikes -> Integer,
        reported_by -> Integer,
        created_at -> Timestamp,
        updated_at -> Nullable<Timestamp>,
    }
}

table! {
    report_evidence {
        id -> Integer,
        report_id -> Integer,
        evidence_url -> Text,
        uploaded_by -> Integer,
        created_at -> Timestamp,
    }
}

table! {
    user_ratings {
        id -> Integer,
        report_id -> Integer,
        user_id -> Integer,
        rating_type -> Text,
    }
}

table! {
    abuse_reports {
        id -> Integer,
        reporter_id -> Integer,
        reported_user_id -> Integer,
        reason -> Text,
        status -> Text,
        created_at -> Timestamp,
    }
}

allow_tables_to_appear_in_same_query!(
    users,
    friendships,
    chats,
    chat_participants,
    messages,
    scam_reports,
    report_evidence,
    user_ratings,
    abuse_reports
);

#[derive(Queryable, Debug, Identifiable, Clone)]
#[table_name = "users"]
#[primary_key(id)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub is_creator: bool,
    pub avatar_url: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Debug, Identifiable, Clone)]
#[table_name = "friendships"]
#[primary_key(id)]
pub struct Friendship {
    pub id: i32,
    pub user_id: i32,
    pub friend_id: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Debug, Identifiable, Clone)]
#[table_name = "chats"]
#[primary_key(id)]
pub struct Chat {
    pub id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Debug, Identifiable, Clone)]
#[table_name = "messages"]
#[primary_key(id)]
pub struct Message {
    pub id: i32,
    pub chat_id: i32,
    pub sender_id: i32,
    pub message_text: String,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Debug, Identifiable, Clone)]
#[table_name = "scam_reports"]
#[primary_key(id)]
pub struct ScamReport {
    pub id: i32,
    pub username: String,
    pub is_scammer: bool,
    pub report_count: i32,
    pub description: String,
    pub evidence_url: String,
    pub likes: i32,
    pub dislikes: i32,
    pub reported_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Queryable, Debug, Identifiable, Clone)]
#[table_name = "user_ratings"]
#[primary_key(id)]
pub struct UserRating {
    pub id: i32,
    pub report_id: i32,
    pub user_id: i32,
    pub rating_type: String,
}

#[derive(Queryable, Debug, Identifiable, Clone)]
#[table_name = "abuse_reports"]
#[primary_key(id)]
pub struct AbuseReport {
    pub id: i32,
    pub reporter_id: i32,
    pub reported_user_id: i32,
    pub reason: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[table_name = "users"]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
}
