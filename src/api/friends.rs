use std::collections::HashMap;

use crate::{
    model::{
        account,
        friend::{FriendDecisionModel, FriendListModel, FriendModel, FriendRequestModel},
        AckModel, ApiResult,
    },
    schema, DbPool,
};
use actix_identity::Identity;
use actix_web::{error::BlockingError, web};
use diesel::prelude::*;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(list))
            .default_service(web::route().to(super::method_not_allowed)),
    );
    cfg.service(
        web::resource("/requests")
            .route(web::post().to(request))
            .default_service(web::route().to(super::method_not_allowed)),
    );
    cfg.service(
        web::resource("/requests/{friendship_id}")
            .route(web::put().to(respond))
            .default_service(web::route().to(super::method_not_allowed)),
    );
}

pub async fn list(identity: Identity, pool: web::Data<DbPool>) -> ApiResult<FriendListModel> {
    let conn = pool.get().expect("Failed to get db connection from pool.");
    match identity.identity() {
        Some(user_id_str) => {
            let self_user_id = user_id_str.parse::<i32>().unwrap();
            match web::block(move || -> Result<Vec<FriendModel>, diesel::result::Error> {
                let rows = schema::friendships::dsl::friendships
                    .filter(
                        schema::friendships::dsl::user_id
                            .eq(&self_user_id)
                            .or(schema::friendships::dsl::friend_id.eq(&self_user_id)),
                    )
                    .load::<schema::Friendship>(&conn)?;
                let other_ids = rows
                    .iter()
                    .map(|f| {
                        if f.user_id == self_user_id {
                            f.friend_id
                        } else {
                            f.user_id
                        }
                    })
                    .filter(|other| *other != self_user_id)
                    .collect::<Vec<_>>();
                let profiles = schema::users::dsl::users
                    .filter(schema::users::dsl::id.eq_any(&other_ids))
                    .load::<schema::User>(&conn)?
                    .into_iter()
                    .map(|u| (u.id, u))
                    .collect::<HashMap<_, _>>();
                Ok(rows
                    .iter()
                    .filter_map(|f| {
                        let other = if f.user_id == self_user_id {
                            f.friend_id
                        } else {
                            f.user_id
                        };
                        profiles.get(&other).map(|u| FriendModel {
                            id: u.id,
                            user_id: account::display_handle(u.id),
                            email: u.email.clone(),
                            is_creator: u.is_creator,
                            avatar_url: u.avatar_url.clone(),
                            status: f.status.clone(),
                            friendship_id: f.id,
                        })
                    })
                    .collect())
            })
            .await
            {
                Ok(friends) => ApiResult::Ok(FriendListModel { friends }),
                Err(BlockingError::Error(e)) => ApiResult::err(500, &e.to_string()),
                Err(BlockingError::Canceled) => {
                    ApiResult::err(500, "Operation has been cancelled.")
                }
            }
        }
        None => ApiResult::err(401, "Not logged in."),
    }
}

enum RequestOutcome {
    TargetMissing,
    Sent,
}

pub async fn request(
    web::Json(model): web::Json<FriendRequestModel>,
    identity: Identity,
    pool: web::Data<DbPool>,
) -> ApiResult<AckModel> {
    match identity.identity() {
        Some(user_id_str) => {
            let self_user_id = user_id_str.parse::<i32>().unwrap();
            let target_id = match account::parse_handle(&model.friend_user_id) {
                Some(id) => id,
                None => return ApiResult::err(404, "User not found"),
            };
            if target_id == self_user_id {
                return ApiResult::err(400, "Cannot add yourself as friend.");
            }
            let conn = pool.get().expect("Failed to get db connection from pool.");
            match web::block(move || -> Result<RequestOutcome, diesel::result::Error> {
                let target = schema::users::dsl::users
                    .find(target_id)
                    .first::<schema::User>(&conn)
                    .optional()?;
                if target.is_none() {
                    return Ok(RequestOutcome::TargetMissing);
                }
                use schema::friendships::dsl::*;
                conn.transaction(|| {
                    // The duplicate check covers both orderings of the pair;
                    // a reverse request from the other side is a no-op.
                    let existing = friendships
                        .filter(
                            user_id
                                .eq(&self_user_id)
                                .and(friend_id.eq(&target_id))
                                .or(user_id.eq(&target_id).and(friend_id.eq(&self_user_id))),
                        )
                        .select(id)
                        .first::<i32>(&conn)
                        .optional()?;
                    if existing.is_none() {
                        diesel::insert_into(friendships)
                            .values((
                                user_id.eq(&self_user_id),
                                friend_id.eq(&target_id),
                                status.eq("pending"),
                                created_at.eq(chrono::Utc::now().naive_utc()),
                            ))
                            .execute(&conn)?;
                    }
                    Ok(RequestOutcome::Sent)
                })
            })
            .await
            {
                Ok(RequestOutcome::Sent) => {
                    ApiResult::Ok(AckModel::with_message("Friend request sent"))
                }
                Ok(RequestOutcome::TargetMissing) => ApiResult::err(404, "User not found"),
                Err(BlockingError::Error(e)) => ApiResult::err(500, &e.to_string()),
                Err(BlockingError::Canceled) => {
                    ApiResult::err(500, "Operation has been cancelled.")
                }
            }
        }
        None => ApiResult::err(401, "Not logged in."),
    }
}

enum RespondOutcome {
    Missing,
    NotRecipient,
    Updated,
}

pub async fn respond(
    web::Path(friendship_id): web::Path<i32>,
    web::Json(model): web::Json<FriendDecisionModel>,
    identity: Identity,
    pool: web::Data<DbPool>,
) -> ApiResult<AckModel> {
    match identity.identity() {
        Some(user_id_str) => {
            let self_user_id = user_id_str.parse::<i32>().unwrap();
            let conn = pool.get().expect("Failed to get db connection from pool.");
            match web::block(move || -> Result<RespondOutcome, diesel::result::Error> {
                use schema::friendships::dsl::*;
                let row = friendships
                    .find(friendship_id)
                    .first::<schema::Friendship>(&conn)
                    .optional()?;
                match row {
                    None => Ok(RespondOutcome::Missing),
                    // Only the invited side of the stored row may answer.
                    Some(ref f) if f.friend_id != self_user_id => Ok(RespondOutcome::NotRecipient),
                    Some(f) => {
                        diesel::update(friendships.find(f.id))
                            .set(status.eq(model.decision.as_status()))
                            .execute(&conn)?;
                        Ok(RespondOutcome::Updated)
                    }
                }
            })
            .await
            {
                Ok(RespondOutcome::Updated) => ApiResult::Ok(AckModel::ok()),
                Ok(RespondOutcome::Missing) => ApiResult::err(404, "Friend request not found"),
                Ok(RespondOutcome::NotRecipient) => {
                    ApiResult::err(403, "Only the invited user can respond.")
                }
                Err(BlockingError::Error(e)) => ApiResult::err(500, &e.to_string()),
                Err(BlockingError::Canceled) => {
                    ApiResult::err(500, "Operation has been cancelled.")
                }
            }
        }
        None => ApiResult::err(401, "Not logged in."),
    }
}
