pub mod department;
pub mod employee;

use actix_web::{web, HttpResponseBuilder};

use crate::repository::Storage;
use crate::utils::header::Header;

/// Shared by every worker.
pub struct AppState {
    pub storage: Storage,
    pub app_name: String,
}

impl AppState {
    pub fn new(storage: Storage, app_name: impl Into<String>) -> Self {
        AppState {
            storage,
            app_name: app_name.into(),
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/employees")
            .route(web::post().to(employee::create_employee))
            .route(web::put().to(employee::update_employee))
            .route(web::get().to(employee::get_all_employees)),
    )
    .service(web::resource("/api/employees/count").route(web::get().to(employee::count_employees)))
    .service(
        web::resource("/api/employees/{id}")
            .route(web::get().to(employee::get_employee))
            .route(web::delete().to(employee::delete_employee)),
    )
    .service(
        web::resource("/api/departments")
            .route(web::post().to(department::create_department))
            .route(web::put().to(department::update_department))
            .route(web::get().to(department::get_all_departments)),
    )
    .service(web::resource("/api/departments/count").route(web::get().to(department::count_departments)))
    .service(
        web::resource("/api/departments/{id}")
            .route(web::get().to(department::get_department))
            .route(web::delete().to(department::delete_department)),
    )
    .service(
        web::resource("/api/departments/{id}/employees")
            .route(web::get().to(department::get_department_employees)),
    );
}

fn insert_headers<I>(builder: &mut HttpResponseBuilder, headers: I)
where
    I: IntoIterator<Item = Header>,
{
    for header in headers {
        builder.insert_header(header);
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> web::Data<AppState> {
    web::Data::new(AppState::new(Storage::memory(), "personnelApp"))
}
