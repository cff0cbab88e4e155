use std::sync::Arc;

use actix_web::http::header::{
    Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::BookingRegistry;
use crate::domain::booking::BookingRoute;
use crate::forms::bookings::FilterForm;
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::{
    alerts_from_flash, base_context, error_response, redirect, render_template, user_message,
};
use crate::services::booking_list::BookingList;
use crate::services::bookings::{
    ensure_loaded, export_bookings, load_booking_list_page, navigate, open_booking_list,
    submit_filter,
};
use crate::services::errors::ServiceError;
use crate::services::export::CsvExport;
use crate::services::pagination::Direction;

type SharedList = Arc<BookingList<DieselRepository>>;

fn open_list(
    route: &str,
    user: &AuthenticatedUser,
    repo: &DieselRepository,
    registry: &BookingRegistry,
) -> Result<SharedList, HttpResponse> {
    let route: BookingRoute = route.parse().map_err(|err| {
        log::warn!("Rejected booking list route: {err}");
        error_response(&ServiceError::Configuration(err))
    })?;
    let context = user.booking_list_context(route).map_err(|err| {
        log::warn!("User {} cannot open {route} bookings: {err}", user.sub);
        error_response(&err)
    })?;
    let expires_at = i64::try_from(user.exp).unwrap_or(i64::MAX);
    Ok(open_booking_list(
        registry,
        repo,
        &user.sub,
        expires_at,
        context,
    ))
}

fn list_url(list: &SharedList) -> String {
    format!("/reservas/{}", list.route())
}

#[get("/reservas/{route}")]
pub async fn show_bookings(
    route: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    registry: web::Data<BookingRegistry>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let list = match open_list(&route, &user, &repo, &registry) {
        Ok(list) => list,
        Err(response) => return response,
    };

    let mut alerts = alerts_from_flash(&flash_messages);
    if let Err(err) = ensure_loaded(&list) {
        alerts.push((user_message(&err), "danger"));
    }

    let page = load_booking_list_page(&list);
    let mut context = base_context(&alerts, &user, list.route().slug());
    context.insert("page", &page);

    render_template(&tera, "bookings/index.html", &context)
}

fn step(
    route: &str,
    user: &AuthenticatedUser,
    repo: &DieselRepository,
    registry: &BookingRegistry,
    direction: Direction,
) -> HttpResponse {
    let list = match open_list(route, user, repo, registry) {
        Ok(list) => list,
        Err(response) => return response,
    };
    if let Err(err) = navigate(&list, direction) {
        FlashMessage::error(user_message(&err)).send();
    }
    redirect(&list_url(&list))
}

#[post("/reservas/{route}/next")]
pub async fn next_page(
    route: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    registry: web::Data<BookingRegistry>,
) -> impl Responder {
    step(&route, &user, &repo, &registry, Direction::Forward)
}

#[post("/reservas/{route}/prev")]
pub async fn previous_page(
    route: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    registry: web::Data<BookingRegistry>,
) -> impl Responder {
    step(&route, &user, &repo, &registry, Direction::Backward)
}

#[post("/reservas/{route}/filter")]
pub async fn filter_bookings(
    route: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    registry: web::Data<BookingRegistry>,
    web::Form(form): web::Form<FilterForm>,
) -> impl Responder {
    let list = match open_list(&route, &user, &repo, &registry) {
        Ok(list) => list,
        Err(response) => return response,
    };
    if let Err(err) = submit_filter(&list, form) {
        FlashMessage::error(user_message(&err)).send();
    }
    redirect(&list_url(&list))
}

fn csv_attachment(export: CsvExport) -> HttpResponse {
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::FilenameExt(ExtendedValue {
            charset: Charset::Ext("UTF-8".to_string()),
            language_tag: None,
            value: export.filename.into_bytes(),
        })],
    };
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(disposition)
        .body(export.content)
}

#[get("/reservas/{route}/export")]
pub async fn export_csv(
    route: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    registry: web::Data<BookingRegistry>,
) -> impl Responder {
    let list = match open_list(&route, &user, &repo, &registry) {
        Ok(list) => list,
        Err(response) => return response,
    };
    match export_bookings(&list) {
        Ok(export) => csv_attachment(export),
        Err(err) => {
            FlashMessage::error(user_message(&err)).send();
            redirect(&list_url(&list))
        }
    }
}
