use actix_web::{
    App, HttpResponse,
    http::{StatusCode, header},
    middleware::from_fn,
    test, web,
};

use destino_ferias_admin::middleware::redirect_unauthorized;
use destino_ferias_admin::models::config::ServerConfig;

fn config_with_signin(signin_url: &str) -> ServerConfig {
    ServerConfig {
        domain: "localhost".to_string(),
        address: "127.0.0.1".to_string(),
        port: 8080,
        database_url: ":memory:".to_string(),
        templates_dir: "templates/**/*".to_string(),
        secret: "x".repeat(64),
        signin_url: signin_url.to_string(),
    }
}

#[actix_web::test]
async fn redirects_unauthorized_to_signin() {
    let app = test::init_service(
        App::new()
            .wrap(from_fn(redirect_unauthorized))
            .default_service(web::to(|| async { HttpResponse::Unauthorized().finish() })),
    )
    .await;

    let req = test::TestRequest::default().to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/auth/signin"
    );
}

#[actix_web::test]
async fn redirects_to_configured_signin_url() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(config_with_signin("https://auth.example.com/login")))
            .wrap(from_fn(redirect_unauthorized))
            .default_service(web::to(|| async { HttpResponse::Unauthorized().finish() })),
    )
    .await;

    let req = test::TestRequest::default().to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "https://auth.example.com/login"
    );
}

#[actix_web::test]
async fn success_response_passes_through() {
    let app = test::init_service(
        App::new()
            .wrap(from_fn(redirect_unauthorized))
            .default_service(web::to(|| async { HttpResponse::Ok().finish() })),
    )
    .await;

    let req = test::TestRequest::default().to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn forbidden_is_not_redirected() {
    let app = test::init_service(
        App::new()
            .wrap(from_fn(redirect_unauthorized))
            .default_service(web::to(|| async { HttpResponse::Forbidden().finish() })),
    )
    .await;

    let req = test::TestRequest::default().to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
