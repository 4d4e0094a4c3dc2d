use crate::{
    model::{
        account::{self, AccountModel, AvatarUpdateModel, CredentialsModel, ProfileModel},
        AckModel, ApiResult,
    },
    schema::{self, NewUser},
    DbPool,
};
use actix_identity::Identity;
use actix_web::{error::BlockingError, web};
use diesel::prelude::*;

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/register")
            .route(web::post().to(register))
            .default_service(web::route().to(super::method_not_allowed)),
    );
    cfg.service(
        web::resource("/login")
            .route(web::post().to(login))
            .default_service(web::route().to(super::method_not_allowed)),
    );
    cfg.service(
        web::resource("/logout")
            .route(web::post().to(logout))
            .default_service(web::route().to(super::method_not_allowed)),
    );
}

pub fn profile_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/avatar")
            .route(web::put().to(update_avatar))
            .default_service(web::route().to(super::method_not_allowed)),
    );
    cfg.service(
        web::resource("/{user_id}")
            .route(web::get().to(profile))
            .default_service(web::route().to(super::method_not_allowed)),
    );
}

fn account_body(user: schema::User) -> AccountModel {
    AccountModel {
        id: user.id,
        user_id: account::display_handle(user.id),
        email: user.email,
        is_creator: user.is_creator,
    }
}

fn profile_body(user: schema::User) -> ProfileModel {
    ProfileModel {
        id: user.id,
        user_id: account::display_handle(user.id),
        email: user.email,
        is_creator: user.is_creator,
        avatar_url: user.avatar_url,
        created_at: user.created_at,
    }
}

pub async fn register(
    model: web::Json<CredentialsModel>,
    identity: Identity,
    pool: web::Data<DbPool>,
) -> ApiResult<AccountModel> {
    let conn = pool.get().expect("Failed to get db connection from pool.");
    let result = web::block(move || {
        use schema::users::dsl::*;
        let hash = bcrypt::hash(&model.password, bcrypt::DEFAULT_COST).unwrap();
        conn.transaction(|| {
            let created = diesel::insert_into(users)
                .values(&NewUser {
                    email: &model.email,
                    password_hash: &hash,
                })
                .get_result::<schema::User>(&conn)?;
            // The very first account is the privileged one; the flag is
            // keyed off the database-assigned id.
            if created.id == 1 {
                diesel::update(users.find(created.id))
                    .set(is_creator.eq(true))
                    .get_result::<schema::User>(&conn)
            } else {
                Ok(created)
            }
        })
    })
    .await;
    match result {
        Ok(user) => {
            identity.remember(user.id.to_string());
            ApiResult::Ok(account_body(user))
        }
        Err(BlockingError::Error(e)) => ApiResult::err(500, &e.to_string()),
        Err(BlockingError::Canceled) => ApiResult::err(500, "Operation has been cancelled."),
    }
}

pub async fn login(
    model: web::Json<CredentialsModel>,
    identity: Identity,
    pool: web::Data<DbPool>,
) -> ApiResult<AccountModel> {
    let conn = pool.get().expect("Failed to get db connection from pool.");
    let model_email = model.email.clone();
    let result = web::block(move || {
        use schema::users::dsl::*;
        users
            .filter(email.eq(&model_email))
            .first::<schema::User>(&conn)
    })
    .await;
    match result {
        Ok(user) => match bcrypt::verify(&model.password, &user.password_hash) {
            Ok(true) => {
                identity.remember(user.id.to_string());
                ApiResult::Ok(account_body(user))
            }
            // A wrong password and an unknown email produce the same answer.
            _ => ApiResult::err(401, "Invalid credentials"),
        },
        Err(BlockingError::Error(_)) => ApiResult::err(401, "Invalid credentials"),
        Err(BlockingError::Canceled) => ApiResult::err(500, "Operation has been cancelled."),
    }
}

pub async fn logout(identity: Identity) -> ApiResult<AckModel> {
    identity.forget();
    ApiResult::Ok(AckModel::ok())
}

pub async fn profile(
    web::Path(user_id): web::Path<i32>,
    pool: web::Data<DbPool>,
) -> ApiResult<ProfileModel> {
    let conn = pool.get().expect("Failed to get db connection from pool.");
    match web::block(move || {
        use schema::users::dsl::*;
        users.filter(id.eq(&user_id)).first::<schema::User>(&conn)
    })
    .await
    {
        Ok(user) => ApiResult::Ok(profile_body(user)),
        Err(_) => ApiResult::err(404, "User not found"),
    }
}

pub async fn update_avatar(
    web::Json(model): web::Json<AvatarUpdateModel>,
    identity: Identity,
    pool: web::Data<DbPool>,
) -> ApiResult<ProfileModel> {
    let conn = pool.get().expect("Failed to get db connection from pool.");
    match identity.identity() {
        Some(user_id_str) => {
            let self_user_id = user_id_str.parse::<i32>().unwrap();
            match web::block(move || {
                use schema::users::dsl::*;
                diesel::update(users.find(self_user_id))
                    .set(avatar_url.eq(&model.avatar_url))
                    .get_result::<schema::User>(&conn)
            })
            .await
            {
                Ok(user) => ApiResult::Ok(profile_body(user)),
                Err(BlockingError::Error(e)) => ApiResult::err(500, &e.to_string()),
                Err(BlockingError::Canceled) => {
                    ApiResult::err(500, "Operation has been cancelled.")
                }
            }
        }
        None => ApiResult::err(401, "Not logged in."),
    }
}
