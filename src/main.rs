#[macro_use]
extern crate diesel;
extern crate chrono;

mod api;
mod model;
mod schema;

use actix_cors::Cors;
use actix_identity::{CookieIdentityPolicy, IdentityService};
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use api::{account, chat, friends, reports};
use diesel::{r2d2, r2d2::ConnectionManager, PgConnection};

type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

fn cors() -> Cors {
    Cors::default()
        .send_wildcard()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE])
        .max_age(86400)
}

fn identity() -> IdentityService<CookieIdentityPolicy> {
    let secret = std::env::var("SESSION_SECRET")
        .unwrap_or_else(|_| "insecure-dev-session-secret-0123456789".to_string());
    IdentityService::new(
        CookieIdentityPolicy::new(secret.as_bytes())
            .name("scamwatch_user")
            .http_only(true)
            .secure(false),
    )
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let database_url = std::env::var("DATABASE_URL")
        .expect("No connection string specified in environment variable DATABASE_URL.");
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .build(manager)
        .expect("Failed to create pool.");
    log::info!("Listening on {}", bind_addr);
    HttpServer::new(move || {
        App::new()
            .data(pool.clone())
            .wrap(middleware::Logger::default())
            .wrap(identity())
            .wrap(cors())
            .service(
                web::scope("/api")
                    .service(web::scope("/auth").configure(account::auth_config))
                    .service(web::scope("/profile").configure(account::profile_config))
                    .service(web::scope("/friends").configure(friends::config))
                    .service(web::scope("/chat").configure(chat::config))
                    .service(web::scope("/reports").configure(reports::config))
                    .default_service(web::route().to(api::method_not_allowed)),
            )
            .route(
                "/",
                web::get().to(|| HttpResponse::Ok().body("Scam Watch backend")),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{Method, StatusCode};
    use actix_web::test;

    #[actix_rt::test]
    async fn preflight_carries_cors_headers() {
        let mut app = test::init_service(
            App::new()
                .wrap(cors())
                .route(
                    "/api/reports/search",
                    web::get().to(|| HttpResponse::Ok().finish()),
                ),
        )
        .await;
        let req = test::TestRequest::with_uri("/api/reports/search")
            .method(Method::OPTIONS)
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_MAX_AGE).unwrap(),
            "86400"
        );
    }

    #[actix_rt::test]
    async fn simple_responses_carry_the_wildcard_origin() {
        let mut app = test::init_service(
            App::new()
                .wrap(cors())
                .route("/", web::get().to(|| HttpResponse::Ok().finish())),
        )
        .await;
        let req = test::TestRequest::with_uri("/")
            .header(header::ORIGIN, "http://localhost:3000")
            .to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[actix_rt::test]
    async fn unsupported_method_yields_405_with_error_body() {
        let mut app = test::init_service(
            App::new().service(
                web::scope("/api")
                    .service(web::scope("/auth").configure(account::auth_config))
                    .default_service(web::route().to(api::method_not_allowed)),
            ),
        )
        .await;
        let req = test::TestRequest::with_uri("/api/auth/register")
            .method(Method::GET)
            .to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = test::read_body(resp).await;
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, serde_json::json!({ "error": "Method not allowed" }));
    }

    #[actix_rt::test]
    async fn unknown_paths_fall_through_to_405() {
        let mut app = test::init_service(
            App::new().service(
                web::scope("/api").default_service(web::route().to(api::method_not_allowed)),
            ),
        )
        .await;
        let req = test::TestRequest::with_uri("/api/nope").to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
