use crate::handlers::notifications;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .route("", web::get().to(notifications::get_notifications))
            .route(
                "/unread-count",
                web::get().to(notifications::get_unread_count),
            )
            .route("/read-all", web::post().to(notifications::mark_all_as_read))
            .route(
                "/broadcast",
                web::post().to(notifications::broadcast_notification),
            )
            .route("/{id}/read", web::post().to(notifications::mark_as_read))
            .route(
                "/{id}",
                web::delete().to(notifications::delete_notification),
            ),
    );
}
