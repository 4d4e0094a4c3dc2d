use std::collections::HashMap;

use crate::{
    model::{
        account,
        chat::{
            ChatCreatedModel, ChatListModel, ChatSummaryModel, CreateChatModel, MessageListModel,
            MessageModel, MessageSentModel, SendMessageModel,
        },
        ApiResult,
    },
    schema, DbPool,
};
use actix_identity::Identity;
use actix_web::{error::BlockingError, web};
use chrono::Utc;
use diesel::prelude::*;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/chats")
            .route(web::get().to(chats))
            .route(web::post().to(create_chat))
            .default_service(web::route().to(super::method_not_allowed)),
    );
    cfg.service(
        web::resource("/chats/{chat_id}/messages")
            .route(web::get().to(messages))
            .default_service(web::route().to(super::method_not_allowed)),
    );
    cfg.service(
        web::resource("/messages")
            .route(web::post().to(send_message))
            .default_service(web::route().to(super::method_not_allowed)),
    );
}

pub async fn chats(identity: Identity, pool: web::Data<DbPool>) -> ApiResult<ChatListModel> {
    let conn = pool.get().expect("Failed to get db connection from pool.");
    match identity.identity() {
        Some(user_id_str) => {
            let self_user_id = user_id_str.parse::<i32>().unwrap();
            match web::block(move || -> Result<Vec<ChatSummaryModel>, diesel::result::Error> {
                use schema::chat_participants::dsl as cp;
                use schema::messages::dsl as m;
                use schema::users::dsl as u;
                let my_chat_ids = cp::chat_participants
                    .filter(cp::user_id.eq(&self_user_id))
                    .select(cp::chat_id)
                    .load::<i32>(&conn)?;
                let others = cp::chat_participants
                    .inner_join(u::users.on(cp::user_id.eq(u::id)))
                    .filter(
                        cp::chat_id
                            .eq_any(&my_chat_ids)
                            .and(cp::user_id.ne(&self_user_id)),
                    )
                    .select((cp::chat_id, u::id, u::email, u::avatar_url))
                    .load::<(i32, i32, String, Option<String>)>(&conn)?;
                let history = m::messages
                    .filter(m::chat_id.eq_any(&my_chat_ids))
                    .order(m::created_at.desc())
                    .load::<schema::Message>(&conn)?;
                // Newest message per chat: the rows arrive newest-first, so the
                // first one seen for a chat wins.
                let mut latest = HashMap::<i32, &schema::Message>::new();
                for msg in &history {
                    latest.entry(msg.chat_id).or_insert(msg);
                }
                let mut summaries = others
                    .into_iter()
                    .map(|(chat_id, friend_id, friend_email, friend_avatar)| ChatSummaryModel {
                        chat_id,
                        friend_id,
                        friend_user_id: account::display_handle(friend_id),
                        friend_email,
                        friend_avatar,
                        last_message: latest.get(&chat_id).map(|msg| msg.message_text.clone()),
                        last_message_time: latest.get(&chat_id).map(|msg| msg.created_at),
                    })
                    .collect::<Vec<_>>();
                // Most recently active first; chats with no messages sink to the end.
                summaries.sort_by(|a, b| b.last_message_time.cmp(&a.last_message_time));
                Ok(summaries)
            })
            .await
            {
                Ok(chats) => ApiResult::Ok(ChatListModel { chats }),
                Err(BlockingError::Error(e)) => ApiResult::err(500, &e.to_string()),
                Err(BlockingError::Canceled) => {
                    ApiResult::err(500, "Operation has been cancelled.")
                }
            }
        }
        None => ApiResult::err(401, "Not logged in."),
    }
}

enum CreateChatOutcome {
    FriendMissing,
    Chat(i32),
}

pub async fn create_chat(
    web::Json(model): web::Json<CreateChatModel>,
    identity: Identity,
    pool: web::Data<DbPool>,
) -> ApiResult<ChatCreatedModel> {
    match identity.identity() {
        Some(user_id_str) => {
            let self_user_id = user_id_str.parse::<i32>().unwrap();
            if model.friend_id == self_user_id {
                return ApiResult::err(400, "Cannot start a chat with yourself.");
            }
            let conn = pool.get().expect("Failed to get db connection from pool.");
            match web::block(move || -> Result<CreateChatOutcome, diesel::result::Error> {
                use schema::chat_participants::dsl as cp;
                use schema::chats::dsl as c;
                use schema::users::dsl as u;
                let friend = u::users
                    .find(model.friend_id)
                    .first::<schema::User>(&conn)
                    .optional()?;
                if friend.is_none() {
                    return Ok(CreateChatOutcome::FriendMissing);
                }
                // Two-sided membership check: a thread counts as existing only
                // if both users participate in it, regardless of who created it.
                let mine = cp::chat_participants
                    .filter(cp::user_id.eq(&self_user_id))
                    .select(cp::chat_id)
                    .load::<i32>(&conn)?;
                let existing = cp::chat_participants
                    .filter(
                        cp::user_id
                            .eq(&model.friend_id)
                            .and(cp::chat_id.eq_any(&mine)),
                    )
                    .select(cp::chat_id)
                    .first::<i32>(&conn)
                    .optional()?;
                if let Some(chat_id) = existing {
                    return Ok(CreateChatOutcome::Chat(chat_id));
                }
                conn.transaction(|| {
                    let chat = diesel::insert_into(c::chats)
                        .values(c::created_at.eq(Utc::now().naive_utc()))
                        .get_result::<schema::Chat>(&conn)?;
                    diesel::insert_into(cp::chat_participants)
                        .values(&vec![
                            (cp::chat_id.eq(chat.id), cp::user_id.eq(self_user_id)),
                            (cp::chat_id.eq(chat.id), cp::user_id.eq(model.friend_id)),
                        ])
                        .execute(&conn)?;
                    Ok(CreateChatOutcome::Chat(chat.id))
                })
            })
            .await
            {
                Ok(CreateChatOutcome::Chat(chat_id)) => {
                    ApiResult::Ok(ChatCreatedModel { chat_id })
                }
                Ok(CreateChatOutcome::FriendMissing) => ApiResult::err(404, "User not found"),
                Err(BlockingError::Error(e)) => ApiResult::err(500, &e.to_string()),
                Err(BlockingError::Canceled) => {
                    ApiResult::err(500, "Operation has been cancelled.")
                }
            }
        }
        None => ApiResult::err(401, "Not logged in."),
    }
}

enum SendOutcome {
    NotParticipant,
    Sent(schema::Message),
}

pub async fn send_message(
    web::Json(model): web::Json<SendMessageModel>,
    identity: Identity,
    pool: web::Data<DbPool>,
) -> ApiResult<MessageSentModel> {
    match identity.identity() {
        Some(user_id_str) => {
            let self_user_id = user_id_str.parse::<i32>().unwrap();
            let conn = pool.get().expect("Failed to get db connection from pool.");
            match web::block(move || -> Result<SendOutcome, diesel::result::Error> {
                use schema::chat_participants::dsl as cp;
                use schema::messages::dsl as m;
                let member = cp::chat_participants
                    .filter(
                        cp::chat_id
                            .eq(&model.chat_id)
                            .and(cp::user_id.eq(&self_user_id)),
                    )
                    .select(cp::id)
                    .first::<i32>(&conn)
                    .optional()?;
                if member.is_none() {
                    return Ok(SendOutcome::NotParticipant);
                }
                let sent = diesel::insert_into(m::messages)
                    .values((
                        m::chat_id.eq(&model.chat_id),
                        m::sender_id.eq(&self_user_id),
                        m::message_text.eq(&model.message_text),
                        m::created_at.eq(Utc::now().naive_utc()),
                    ))
                    .get_result::<schema::Message>(&conn)?;
                Ok(SendOutcome::Sent(sent))
            })
            .await
            {
                Ok(SendOutcome::Sent(sent)) => ApiResult::Ok(MessageSentModel {
                    message_id: sent.id,
                    created_at: sent.created_at,
                }),
                Ok(SendOutcome::NotParticipant) => {
                    ApiResult::err(403, "Not a participant of this chat.")
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

pub async fn messages(
    web::Path(chat_id): web::Path<i32>,
    pool: web::Data<DbPool>,
) -> ApiResult<MessageListModel> {
    let conn = pool.get().expect("Failed to get db connection from pool.");
    match web::block(move || {
        use schema::messages::dsl as m;
        use schema::users::dsl as u;
        m::messages
            .inner_join(u::users.on(m::sender_id.eq(u::id)))
            .filter(m::chat_id.eq(&chat_id))
            .order(m::created_at.asc())
            .select((
                m::id,
                m::sender_id,
                m::message_text,
                m::created_at,
                u::email,
                u::avatar_url,
            ))
            .load::<(
                i32,
                i32,
                String,
                chrono::NaiveDateTime,
                String,
                Option<String>,
            )>(&conn)
    })
    .await
    {
        Ok(rows) => ApiResult::Ok(MessageListModel {
            messages: rows
                .into_iter()
                .map(
                    |(id, sender_id, text, created_at, sender_email, sender_avatar)| {
                        MessageModel {
                            id,
                            sender_id,
                            text,
                            created_at,
                            sender_email,
                            sender_avatar,
                        }
                    },
                )
                .collect(),
        }),
        Err(BlockingError::Error(e)) => ApiResult::err(500, &e.to_string()),
        Err(BlockingError::Canceled) => ApiResult::err(500, "Operation has been cancelled."),
    }
}
