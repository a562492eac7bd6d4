use crate::handlers::users;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(users::get_users))
            .route("/me", web::get().to(users::get_me))
            .route("/me", web::put().to(users::update_me))
            .route("/me/push-token", web::put().to(users::register_push_token))
            .route("/me/push-token", web::delete().to(users::clear_push_token))
            .route("/{id}/status", web::put().to(users::update_user_status)),
    );
}
