use crate::schema;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The two rating choices a user can hold on a report. Anything else on the
/// wire is a validation error, not a deserialization failure, so the request
/// model carries the raw string and handlers parse it with [`RatingKind::from_str`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RatingKind {
    Like,
    Dislike,
}

impl RatingKind {
    pub fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "like" => Some(RatingKind::Like),
            "dislike" => Some(RatingKind::Dislike),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RatingKind::Like => "like",
            RatingKind::Dislike => "dislike",
        }
    }
}

#[derive(Deserialize)]
pub struct SubmitReportModel {
    pub username: String,
    #[serde(default)]
    pub is_scammer: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub evidence_url: String,
}

#[derive(Deserialize)]
pub struct SearchQueryModel {
    pub username: Option<String>,
}

#[derive(Deserialize)]
pub struct RatingModel {
    pub rating_type: String,
}

#[derive(Serialize, Debug)]
pub struct ScamReportModel {
    pub id: i32,
    pub username: String,
    pub is_scammer: bool,
    pub report_count: i32,
    pub description: String,
    pub evidence_url: String,
    pub likes: i32,
    pub dislikes: i32,
}

impl From<schema::ScamReport> for ScamReportModel {
    fn from(report: schema::ScamReport) -> Self {
        ScamReportModel {
            id: report.id,
            username: report.username,
            is_scammer: report.is_scammer,
            report_count: report.report_count,
            description: report.description,
            evidence_url: report.evidence_url,
            likes: report.likes,
            dislikes: report.dislikes,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct SearchResultsModel {
    pub results: Vec<ScamReportModel>,
}

#[derive(Serialize, Debug)]
pub struct RatingResultModel {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dislikes: Option<i32>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AdminActionModel {
    ToggleCreator { user_id: i32 },
    ResolveReport { report_id: i32 },
}

#[derive(Serialize, Debug)]
pub struct AdminActionResultModel {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_creator: Option<bool>,
}

#[derive(Serialize, Debug)]
pub struct AdminUserModel {
    pub id: i32,
    pub user_id: String,
    pub email: String,
    pub is_creator: bool,
    pub avatar_url: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize, Debug)]
pub struct AbuseReportModel {
    pub id: i32,
    pub reporter_id: i32,
    pub reported_user_id: i32,
    pub reason: String,
    pub created_at: NaiveDateTime,
    pub status: String,
    pub reporter_user_id: String,
    pub reporter_email: String,
    pub reported_user_id_str: String,
    pub reported_email: String,
}

#[derive(Serialize, Debug)]
pub struct AdminViewModel {
    pub users: Vec<AdminUserModel>,
    pub reports: Vec<AbuseReportModel>,
}

#[derive(Deserialize)]
pub struct AbuseSubmitModel {
    pub reported_user_id: i32,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_kind_accepts_only_like_and_dislike() {
        assert_eq!(RatingKind::from_str("like"), Some(RatingKind::Like));
        assert_eq!(RatingKind::from_str("dislike"), Some(RatingKind::Dislike));
        assert_eq!(RatingKind::from_str("LIKE"), None);
        assert_eq!(RatingKind::from_str("upvote"), None);
        assert_eq!(RatingKind::from_str(""), None);
    }

    #[test]
    fn admin_actions_parse_from_tagged_bodies() {
        let action: AdminActionModel =
            serde_json::from_str(r#"{ "action": "toggle_creator", "user_id": 5 }"#).unwrap();
        match action {
            AdminActionModel::ToggleCreator { user_id } => assert_eq!(user_id, 5),
            other => panic!("unexpected action: {:?}", other),
        }

        let action: AdminActionModel =
            serde_json::from_str(r#"{ "action": "resolve_report", "report_id": 9 }"#).unwrap();
        match action {
            AdminActionModel::ResolveReport { report_id } => assert_eq!(report_id, 9),
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn unknown_admin_action_is_rejected() {
        assert!(
            serde_json::from_str::<AdminActionModel>(r#"{ "action": "drop_tables" }"#).is_err()
        );
    }

    #[test]
    fn already_rated_body_has_no_counter_fields() {
        let body = RatingResultModel {
            success: true,
            message: Some("Already rated".to_string()),
            likes: None,
            dislikes: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "success": true, "message": "Already rated" })
        );
    }

    #[test]
    fn applied_rating_body_carries_both_counters() {
        let body = RatingResultModel {
            success: true,
            message: None,
            likes: Some(1),
            dislikes: Some(0),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, serde_json::json!({ "success": true, "likes": 1, "dislikes": 0 }));
    }
}
