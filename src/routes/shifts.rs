use crate::handlers::shifts;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/shifts")
            .route("", web::post().to(shifts::create_shift))
            .route("", web::get().to(shifts::get_shifts))
            .route("/{id}", web::get().to(shifts::get_shift))
            .route("/{id}", web::delete().to(shifts::delete_shift))
            .route("/{id}/status", web::post().to(shifts::update_shift_status))
            .route(
                "/{id}/occurrences",
                web::get().to(shifts::get_shift_occurrences),
            ),
    )
    .route(
        "/employees/{employee_id}/shifts",
        web::get().to(shifts::get_employee_shifts),
    );
}
