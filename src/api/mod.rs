pub mod account;
pub mod chat;
pub mod friends;
pub mod reports;

use crate::model::ApiResult;

/// Fallback for any route or method no component claims.
pub async fn method_not_allowed() -> ApiResult<()> {
    ApiResult::err(405, "Method not allowed")
}
