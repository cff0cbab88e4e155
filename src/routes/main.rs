use actix_identity::Identity;
use actix_web::{Responder, get, post, web};

use crate::BookingRegistry;
use crate::domain::booking::BookingRoute;
use crate::models::auth::AuthenticatedUser;
use crate::routes::redirect;

#[get("/")]
pub async fn index(_user: AuthenticatedUser) -> impl Responder {
    redirect(&format!("/reservas/{}", BookingRoute::Experiencias))
}

#[post("/logout")]
pub async fn logout(
    identity: Identity,
    user: AuthenticatedUser,
    registry: web::Data<BookingRegistry>,
) -> impl Responder {
    let dropped = registry.forget_owner(&user.sub);
    log::debug!(
        "Dropped {dropped} booking lists of {}, {} still held",
        user.sub,
        registry.list_count()
    );
    identity.logout();
    redirect("/")
}
