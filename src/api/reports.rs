use std::collections::HashMap;

use crate::{
    model::{
        account,
        report::{
            AbuseReportModel, AbuseSubmitModel, AdminActionModel, AdminActionResultModel,
            AdminUserModel, AdminViewModel, RatingKind, RatingModel, RatingResultModel,
            ScamReportModel, SearchQueryModel, SearchResultsModel, SubmitReportModel,
        },
        AckModel, ApiResult,
    },
    schema, DbPool,
};
use actix_identity::Identity;
use actix_web::{error::BlockingError, web};
use chrono::Utc;
use diesel::prelude::*;
use diesel::PgConnection;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::post().to(submit))
            .default_service(web::route().to(super::method_not_allowed)),
    );
    cfg.service(
        web::resource("/search")
            .route(web::get().to(search))
            .default_service(web::route().to(super::method_not_allowed)),
    );
    cfg.service(
        web::resource("/admin")
            .route(web::get().to(admin_view))
            .route(web::post().to(admin_action))
            .default_service(web::route().to(super::method_not_allowed)),
    );
    cfg.service(
        web::resource("/abuse")
            .route(web::post().to(file_abuse))
            .default_service(web::route().to(super::method_not_allowed)),
    );
    cfg.service(
        web::resource("/{report_id}/rating")
            .route(web::put().to(rate))
            .default_service(web::route().to(super::method_not_allowed)),
    );
}

pub async fn search(
    web::Query(query): web::Query<SearchQueryModel>,
    pool: web::Data<DbPool>,
) -> ApiResult<SearchResultsModel> {
    let pattern = query.username.unwrap_or_default();
    if pattern.is_empty() {
        return ApiResult::err(400, "Username required");
    }
    let conn = pool.get().expect("Failed to get db connection from pool.");
    match web::block(move || {
        use schema::scam_reports::dsl::*;
        scam_reports
            .filter(username.ilike(format!("%{}%", pattern)))
            .load::<schema::ScamReport>(&conn)
    })
    .await
    {
        Ok(rows) => ApiResult::Ok(SearchResultsModel {
            results: rows.into_iter().map(ScamReportModel::from).collect(),
        }),
        Err(BlockingError::Error(e)) => ApiResult::err(500, &e.to_string()),
        Err(BlockingError::Canceled) => ApiResult::err(500, "Operation has been cancelled."),
    }
}

pub async fn submit(
    web::Json(model): web::Json<SubmitReportModel>,
    identity: Identity,
    pool: web::Data<DbPool>,
) -> ApiResult<AckModel> {
    match identity.identity() {
        Some(user_id_str) => {
            let self_user_id = user_id_str.parse::<i32>().unwrap();
            if model.evidence_url.is_empty() {
                return ApiResult::err(400, "Evidence required");
            }
            let conn = pool.get().expect("Failed to get db connection from pool.");
            match web::block(move || -> Result<(), diesel::result::Error> {
                use schema::report_evidence::dsl as ev;
                use schema::scam_reports::dsl as sr;
                // Report mutation and evidence append commit together or not
                // at all: one report row per username, one evidence row per
                // submission.
                conn.transaction(|| {
                    let existing = sr::scam_reports
                        .filter(sr::username.eq(&model.username))
                        .first::<schema::ScamReport>(&conn)
                        .optional()?;
                    let target_report_id = match existing {
                        Some(report) => {
                            diesel::update(sr::scam_reports.find(report.id))
                                .set((
                                    sr::report_count.eq(report.report_count + 1),
                                    sr::is_scammer.eq(&model.is_scammer),
                                    sr::description.eq(&model.description),
                                    sr::evidence_url.eq(&model.evidence_url),
                                    sr::updated_at.eq(Utc::now().naive_utc()),
                                ))
                                .execute(&conn)?;
                            report.id
                        }
                        None => {
                            let created = diesel::insert_into(sr::scam_reports)
                                .values((
                                    sr::username.eq(&model.username),
                                    sr::is_scammer.eq(&model.is_scammer),
                                    sr::report_count.eq(1),
                                    sr::description.eq(&model.description),
                                    sr::evidence_url.eq(&model.evidence_url),
                                    sr::reported_by.eq(&self_user_id),
                                    sr::created_at.eq(Utc::now().naive_utc()),
                                ))
                                .get_result::<schema::ScamReport>(&conn)?;
                            created.id
                        }
                    };
                    diesel::insert_into(ev::report_evidence)
                        .values((
                            ev::report_id.eq(target_report_id),
                            ev::evidence_url.eq(&model.evidence_url),
                            ev::uploaded_by.eq(&self_user_id),
                            ev::created_at.eq(Utc::now().naive_utc()),
                        ))
                        .execute(&conn)?;
                    Ok(())
                })
            })
            .await
            {
                Ok(()) => ApiResult::Ok(AckModel::ok()),
                Err(BlockingError::Error(e)) => ApiResult::err(500, &e.to_string()),
                Err(BlockingError::Canceled) => {
                    ApiResult::err(500, "Operation has been cancelled.")
                }
            }
        }
        None => ApiResult::err(401, "Not logged in."),
    }
}

enum RatingOutcome {
    ReportMissing,
    Already,
    Applied { likes: i32, dislikes: i32 },
}

pub async fn rate(
    web::Path(report_id_path): web::Path<i32>,
    web::Json(model): web::Json<RatingModel>,
    identity: Identity,
    pool: web::Data<DbPool>,
) -> ApiResult<RatingResultModel> {
    match identity.identity() {
        Some(user_id_str) => {
            let self_user_id = user_id_str.parse::<i32>().unwrap();
            let kind = match RatingKind::from_str(&model.rating_type) {
                Some(kind) => kind,
                None => return ApiResult::err(400, "Invalid rating type"),
            };
            let conn = pool.get().expect("Failed to get db connection from pool.");
            match web::block(move || -> Result<RatingOutcome, diesel::result::Error> {
                use schema::scam_reports::dsl as sr;
                use schema::user_ratings::dsl as ur;
                conn.transaction(|| {
                    let report = sr::scam_reports
                        .find(report_id_path)
                        .first::<schema::ScamReport>(&conn)
                        .optional()?;
                    if report.is_none() {
                        return Ok(RatingOutcome::ReportMissing);
                    }
                    let existing = ur::user_ratings
                        .filter(
                            ur::report_id
                                .eq(&report_id_path)
                                .and(ur::user_id.eq(&self_user_id)),
                        )
                        .first::<schema::UserRating>(&conn)
                        .optional()?;
                    match existing {
                        // Same choice twice is a no-op.
                        Some(ref prior) if prior.rating_type == kind.as_str() => {
                            return Ok(RatingOutcome::Already);
                        }
                        Some(prior) => {
                            diesel::update(ur::user_ratings.find(prior.id))
                                .set(ur::rating_type.eq(kind.as_str()))
                                .execute(&conn)?;
                        }
                        None => {
                            diesel::insert_into(ur::user_ratings)
                                .values((
                                    ur::report_id.eq(&report_id_path),
                                    ur::user_id.eq(&self_user_id),
                                    ur::rating_type.eq(kind.as_str()),
                                ))
                                .execute(&conn)?;
                        }
                    }
                    // The counters must equal the counts over rating rows
                    // after every commit; rebuild both rather than increment.
                    let like_total = ur::user_ratings
                        .filter(
                            ur::report_id
                                .eq(&report_id_path)
                                .and(ur::rating_type.eq(RatingKind::Like.as_str())),
                        )
                        .count()
                        .get_result::<i64>(&conn)?;
                    let dislike_total = ur::user_ratings
                        .filter(
                            ur::report_id
                                .eq(&report_id_path)
                                .and(ur::rating_type.eq(RatingKind::Dislike.as_str())),
                        )
                        .count()
                        .get_result::<i64>(&conn)?;
                    let updated = diesel::update(sr::scam_reports.find(report_id_path))
                        .set((
                            sr::likes.eq(like_total as i32),
                            sr::dislikes.eq(dislike_total as i32),
                        ))
                        .get_result::<schema::ScamReport>(&conn)?;
                    Ok(RatingOutcome::Applied {
                        likes: updated.likes,
                        dislikes: updated.dislikes,
                    })
                })
            })
            .await
            {
                Ok(RatingOutcome::Applied { likes, dislikes }) => {
                    ApiResult::Ok(RatingResultModel {
                        success: true,
                        message: None,
                        likes: Some(likes),
                        dislikes: Some(dislikes),
                    })
                }
                Ok(RatingOutcome::Already) => ApiResult::Ok(RatingResultModel {
                    success: true,
                    message: Some("Already rated".to_string()),
                    likes: None,
                    dislikes: None,
                }),
                Ok(RatingOutcome::ReportMissing) => ApiResult::err(404, "Report not found"),
                Err(BlockingError::Error(e)) => ApiResult::err(500, &e.to_string()),
                Err(BlockingError::Canceled) => {
                    ApiResult::err(500, "Operation has been cancelled.")
                }
            }
        }
        None => ApiResult::err(401, "Not logged in."),
    }
}

/// The admin gate: the caller's verified session identity must map to an
/// account whose privileged flag is set.
fn is_privileged(conn: &PgConnection, caller_id: i32) -> Result<bool, diesel::result::Error> {
    use schema::users::dsl::*;
    users
        .find(caller_id)
        .select(is_creator)
        .first::<bool>(conn)
        .optional()
        .map(|flag| flag.unwrap_or(false))
}

enum AdminViewOutcome {
    Denied,
    View(AdminViewModel),
}

pub async fn admin_view(identity: Identity, pool: web::Data<DbPool>) -> ApiResult<AdminViewModel> {
    match identity.identity() {
        Some(user_id_str) => {
            let self_user_id = user_id_str.parse::<i32>().unwrap();
            let conn = pool.get().expect("Failed to get db connection from pool.");
            match web::block(move || -> Result<AdminViewOutcome, diesel::result::Error> {
                if !is_privileged(&conn, self_user_id)? {
                    return Ok(AdminViewOutcome::Denied);
                }
                use schema::abuse_reports::dsl as ar;
                use schema::users::dsl as u;
                let accounts = u::users
                    .order(u::created_at.desc())
                    .load::<schema::User>(&conn)?;
                let pending = ar::abuse_reports
                    .filter(ar::status.eq("pending"))
                    .order(ar::created_at.desc())
                    .load::<schema::AbuseReport>(&conn)?;
                let by_id = accounts
                    .iter()
                    .map(|account| (account.id, account))
                    .collect::<HashMap<_, _>>();
                let reports = pending
                    .iter()
                    .filter_map(|r| {
                        let reporter = by_id.get(&r.reporter_id)?;
                        let reported = by_id.get(&r.reported_user_id)?;
                        Some(AbuseReportModel {
                            id: r.id,
                            reporter_id: r.reporter_id,
                            reported_user_id: r.reported_user_id,
                            reason: r.reason.clone(),
                            created_at: r.created_at,
                            status: r.status.clone(),
                            reporter_user_id: account::display_handle(reporter.id),
                            reporter_email: reporter.email.clone(),
                            reported_user_id_str: account::display_handle(reported.id),
                            reported_email: reported.email.clone(),
                        })
                    })
                    .collect::<Vec<_>>();
                let users = accounts
                    .iter()
                    .map(|account| AdminUserModel {
                        id: account.id,
                        user_id: account::display_handle(account.id),
                        email: account.email.clone(),
                        is_creator: account.is_creator,
                        avatar_url: account.avatar_url.clone(),
                        created_at: account.created_at,
                    })
                    .collect::<Vec<_>>();
                Ok(AdminViewOutcome::View(AdminViewModel { users, reports }))
            })
            .await
            {
                Ok(AdminViewOutcome::View(view)) => ApiResult::Ok(view),
                Ok(AdminViewOutcome::Denied) => ApiResult::err(403, "Admin privileges required"),
                Err(BlockingError::Error(e)) => ApiResult::err(500, &e.to_string()),
                Err(BlockingError::Canceled) => {
                    ApiResult::err(500, "Operation has been cancelled.")
                }
            }
        }
        None => ApiResult::err(401, "Not logged in."),
    }
}

enum AdminActionOutcome {
    Denied,
    TargetMissing,
    Toggled(bool),
    Resolved,
}

pub async fn admin_action(
    web::Json(model): web::Json<AdminActionModel>,
    identity: Identity,
    pool: web::Data<DbPool>,
) -> ApiResult<AdminActionResultModel> {
    match identity.identity() {
        Some(user_id_str) => {
            let self_user_id = user_id_str.parse::<i32>().unwrap();
            let conn = pool.get().expect("Failed to get db connection from pool.");
            match web::block(move || -> Result<AdminActionOutcome, diesel::result::Error> {
                if !is_privileged(&conn, self_user_id)? {
                    return Ok(AdminActionOutcome::Denied);
                }
                match model {
                    AdminActionModel::ToggleCreator { user_id: target } => {
                        use schema::users::dsl::*;
                        conn.transaction(|| {
                            let current = users
                                .find(target)
                                .select(is_creator)
                                .first::<bool>(&conn)
                                .optional()?;
                            match current {
                                None => Ok(AdminActionOutcome::TargetMissing),
                                Some(flag) => {
                                    let updated = diesel::update(users.find(target))
                                        .set(is_creator.eq(!flag))
                                        .get_result::<schema::User>(&conn)?;
                                    Ok(AdminActionOutcome::Toggled(updated.is_creator))
                                }
                            }
                        })
                    }
                    AdminActionModel::ResolveReport { report_id } => {
                        use schema::abuse_reports::dsl::*;
                        let changed = diesel::update(abuse_reports.find(report_id))
                            .set(status.eq("resolved"))
                            .execute(&conn)?;
                        if changed == 0 {
                            Ok(AdminActionOutcome::TargetMissing)
                        } else {
                            Ok(AdminActionOutcome::Resolved)
                        }
                    }
                }
            })
            .await
            {
                Ok(AdminActionOutcome::Toggled(flag)) => ApiResult::Ok(AdminActionResultModel {
                    success: true,
                    is_creator: Some(flag),
                }),
                Ok(AdminActionOutcome::Resolved) => ApiResult::Ok(AdminActionResultModel {
                    success: true,
                    is_creator: None,
                }),
                Ok(AdminActionOutcome::TargetMissing) => ApiResult::err(404, "Target not found"),
                Ok(AdminActionOutcome::Denied) => ApiResult::err(403, "Admin privileges required"),
                Err(BlockingError::Error(e)) => ApiResult::err(500, &e.to_string()),
                Err(BlockingError::Canceled) => {
                    ApiResult::err(500, "Operation has been cancelled.")
                }
            }
        }
        None => ApiResult::err(401, "Not logged in."),
    }
}

enum AbuseOutcome {
    TargetMissing,
    Filed,
}

pub async fn file_abuse(
    web::Json(model): web::Json<AbuseSubmitModel>,
    identity: Identity,
    pool: web::Data<DbPool>,
) -> ApiResult<AckModel> {
    match identity.identity() {
        Some(user_id_str) => {
            let self_user_id = user_id_str.parse::<i32>().unwrap();
            let conn = pool.get().expect("Failed to get db connection from pool.");
            match web::block(move || -> Result<AbuseOutcome, diesel::result::Error> {
                use schema::abuse_reports::dsl as ar;
                use schema::users::dsl as u;
                let target = u::users
                    .find(model.reported_user_id)
                    .first::<schema::User>(&conn)
                    .optional()?;
                if target.is_none() {
                    return Ok(AbuseOutcome::TargetMissing);
                }
                diesel::insert_into(ar::abuse_reports)
                    .values((
                        ar::reporter_id.eq(&self_user_id),
                        ar::reported_user_id.eq(&model.reported_user_id),
                        ar::reason.eq(&model.reason),
                        ar::status.eq("pending"),
                        ar::created_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(&conn)?;
                Ok(AbuseOutcome::Filed)
            })
            .await
            {
                Ok(AbuseOutcome::Filed) => ApiResult::Ok(AckModel::ok()),
                Ok(AbuseOutcome::TargetMissing) => ApiResult::err(404, "User not found"),
                Err(BlockingError::Error(e)) => ApiResult::err(500, &e.to_string()),
                Err(BlockingError::Canceled) => {
                    ApiResult::err(500, "Operation has been cancelled.")
                }
            }
        }
        None => ApiResult::err(401, "Not logged in."),
    }
}
