use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Offset between the serial primary key and the public `#NNNN` handle.
/// The first account (id 1) is `#1000`.
const HANDLE_BASE: i32 = 999;

/// Public handle derived from the database-assigned id, so concurrent
/// registrations can never collide on it.
pub fn display_handle(id: i32) -> String {
    format!("#{}", HANDLE_BASE + id)
}

/// Inverse of [`display_handle`]. Returns the internal id, or `None` for
/// anything that is not a well-formed handle.
pub fn parse_handle(handle: &str) -> Option<i32> {
    let digits = handle.strip_prefix('#')?;
    let number = digits.parse::<i32>().ok()?;
    if number > HANDLE_BASE {
        Some(number - HANDLE_BASE)
    } else {
        None
    }
}

#[derive(Deserialize)]
pub struct CredentialsModel {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct AccountModel {
    pub id: i32,
    pub user_id: String,
    pub email: String,
    pub is_creator: bool,
}

#[derive(Serialize, Debug)]
pub struct ProfileModel {
    pub id: i32,
    pub user_id: String,
    pub email: String,
    pub is_creator: bool,
    pub avatar_url: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct AvatarUpdateModel {
    pub avatar_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_accounts_get_sequential_handles() {
        assert_eq!(display_handle(1), "#1000");
        assert_eq!(display_handle(2), "#1001");
        assert_eq!(display_handle(42), "#1041");
    }

    #[test]
    fn handles_round_trip() {
        for id in [1, 2, 7, 5000].iter() {
            assert_eq!(parse_handle(&display_handle(*id)), Some(*id));
        }
    }

    #[test]
    fn malformed_handles_are_rejected() {
        assert_eq!(parse_handle("1000"), None);
        assert_eq!(parse_handle("#abc"), None);
        assert_eq!(parse_handle("#999"), None);
        assert_eq!(parse_handle("#-5"), None);
        assert_eq!(parse_handle(""), None);
    }
}
