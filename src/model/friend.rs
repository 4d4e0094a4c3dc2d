use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct FriendRequestModel {
    pub friend_user_id: String,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn as_status(self) -> &'static str {
        match self {
            Decision::Accept => "accepted",
            Decision::Reject => "rejected",
        }
    }
}

#[derive(Deserialize)]
pub struct FriendDecisionModel {
    pub decision: Decision,
}

#[derive(Serialize, Debug)]
pub struct FriendModel {
    pub id: i32,
    pub user_id: String,
    pub email: String,
    pub is_creator: bool,
    pub avatar_url: Option<String>,
    pub status: String,
    pub friendship_id: i32,
}

#[derive(Serialize, Debug)]
pub struct FriendListModel {
    pub friends: Vec<FriendModel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_parses_from_lowercase() {
        let model: FriendDecisionModel =
            serde_json::from_str(r#"{ "decision": "accept" }"#).unwrap();
        assert_eq!(model.decision, Decision::Accept);
        let model: FriendDecisionModel =
            serde_json::from_str(r#"{ "decision": "reject" }"#).unwrap();
        assert_eq!(model.decision, Decision::Reject);
    }

    #[test]
    fn unknown_decision_is_a_deserialization_error() {
        assert!(serde_json::from_str::<FriendDecisionModel>(r#"{ "decision": "block" }"#).is_err());
    }

    #[test]
    fn decision_maps_onto_stored_status() {
        assert_eq!(Decision::Accept.as_status(), "accepted");
        assert_eq!(Decision::Reject.as_status(), "rejected");
    }
}
