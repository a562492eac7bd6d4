use actix_web::web;

pub mod events;
pub mod notifications;
pub mod shifts;
pub mod swaps;
pub mod time_logs;
pub mod time_off;
pub mod users;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(shifts::configure)
            .configure(time_off::configure)
            .configure(time_logs::configure)
            .configure(swaps::configure)
            .configure(notifications::configure)
            .configure(users::configure)
            .configure(events::configure),
    );
}
