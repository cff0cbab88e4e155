//! HTTP handlers and the helpers they share.

use actix_web::HttpResponse;
use actix_web::http::header;
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use tera::{Context, Tera};

use crate::models::auth::AuthenticatedUser;
use crate::services::ServiceError;

pub mod bookings;
pub mod main;

pub type Alert = (String, &'static str);

/// Bootstrap alert class for a flash message level.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        Level::Info | Level::Debug => "info",
    }
}

pub fn alerts_from_flash(flash_messages: &IncomingFlashMessages) -> Vec<Alert> {
    flash_messages
        .iter()
        .map(|f| (f.content().to_string(), alert_level_to_str(&f.level())))
        .collect()
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Template context every page starts from.
pub fn base_context(alerts: &[Alert], user: &AuthenticatedUser, current_page: &str) -> Context {
    let mut context = Context::new();
    context.insert("alerts", alerts);
    context.insert("current_user", user);
    context.insert("current_page", current_page);
    context
}

/// Message shown to the user when an operation fails.
pub fn user_message(err: &ServiceError) -> String {
    match err {
        ServiceError::Unauthorized => "Acesso não autorizado.".to_string(),
        ServiceError::Configuration(_) => "Tipo de reserva desconhecido.".to_string(),
        ServiceError::Query(_) => "Erro ao consultar as reservas.".to_string(),
        ServiceError::Export(_) => "Erro ao exportar as reservas.".to_string(),
        ServiceError::Busy => "Uma exportação já está em andamento.".to_string(),
        ServiceError::Form(_) | ServiceError::TypeConstraint(_) => {
            "Valor de filtro inválido.".to_string()
        }
    }
}

/// Response for failures that leave no page to render.
pub fn error_response(err: &ServiceError) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => HttpResponse::Forbidden().body(user_message(err)),
        ServiceError::Configuration(_) => HttpResponse::NotFound().body(user_message(err)),
        _ => HttpResponse::InternalServerError().body(user_message(err)),
    }
}
