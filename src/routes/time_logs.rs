use crate::handlers::time_logs;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/time-logs")
            .route("", web::post().to(time_logs::clock_in))
            .route("", web::get().to(time_logs::get_time_logs))
            .route("/current", web::get().to(time_logs::get_current_time_log))
            .route("/{id}", web::get().to(time_logs::get_time_log))
            .route("/{id}/clock-out", web::post().to(time_logs::clock_out)),
    );
}
