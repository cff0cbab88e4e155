use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::middleware::Next;
use actix_web::{Error, HttpResponse, web};

use crate::models::config::{DEFAULT_SIGNIN_URL, ServerConfig};

/// Turns `401 Unauthorized` responses into a redirect to the sign-in page.
pub async fn redirect_unauthorized<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error>
where
    B: MessageBody + 'static,
{
    let signin_url = req
        .app_data::<web::Data<ServerConfig>>()
        .map(|config| config.signin_url.clone())
        .unwrap_or_else(|| DEFAULT_SIGNIN_URL.to_string());

    let res = next.call(req).await?;
    if res.status() != StatusCode::UNAUTHORIZED {
        return Ok(res.map_into_left_body());
    }

    let (req, _) = res.into_parts();
    let redirect = HttpResponse::SeeOther()
        .insert_header((header::LOCATION, signin_url))
        .finish();
    Ok(ServiceResponse::new(req, redirect).map_into_right_body())
}
