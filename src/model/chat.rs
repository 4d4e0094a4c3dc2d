use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct CreateChatModel {
    pub friend_id: i32,
}

#[derive(Deserialize)]
pub struct SendMessageModel {
    pub chat_id: i32,
    pub message_text: String,
}

#[derive(Serialize, Debug)]
pub struct ChatCreatedModel {
    pub chat_id: i32,
}

#[derive(Serialize, Debug)]
pub struct MessageSentModel {
    pub message_id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize, Debug)]
pub struct ChatSummaryModel {
    pub chat_id: i32,
    pub friend_id: i32,
    pub friend_user_id: String,
    pub friend_email: String,
    pub friend_avatar: Option<String>,
    pub last_message: Option<String>,
    pub last_message_time: Option<NaiveDateTime>,
}

#[derive(Serialize, Debug)]
pub struct ChatListModel {
    pub chats: Vec<ChatSummaryModel>,
}

#[derive(Serialize, Debug)]
pub struct MessageModel {
    pub id: i32,
    pub sender_id: i32,
    pub text: String,
    pub created_at: NaiveDateTime,
    pub sender_email: String,
    pub sender_avatar: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct MessageListModel {
    pub messages: Vec<MessageModel>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn summary_serializes_missing_last_message_as_null() {
        let summary = ChatSummaryModel {
            chat_id: 3,
            friend_id: 2,
            friend_user_id: "#1001".to_string(),
            friend_email: "b@x.com".to_string(),
            friend_avatar: None,
            last_message: None,
            last_message_time: None,
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["last_message"], serde_json::Value::Null);
        assert_eq!(value["last_message_time"], serde_json::Value::Null);
    }

    #[test]
    fn timestamps_render_as_iso_8601() {
        let sent = MessageSentModel {
            message_id: 1,
            created_at: NaiveDate::from_ymd(2024, 5, 1).and_hms(12, 30, 0),
        };
        let value = serde_json::to_value(&sent).unwrap();
        assert_eq!(value["created_at"], "2024-05-01T12:30:00");
    }
}
