use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use log::debug;
use serde::Deserialize;
use validator::Validate;

use super::{insert_headers, AppState};
use crate::criteria::{Criteria, EmployeeCriteria, QueryParams};
use crate::errors::AppError;
use crate::models::employee::NewEmployee;
use crate::query::Pageable;
use crate::utils::header::{entity_creation_alert, entity_deletion_alert, entity_update_alert};
use crate::utils::pagination::generate_pagination_headers;
use crate::utils::validation::validate_payload;

const ENTITY_NAME: &str = "employee";
const BASE_URL: &str = "/api/employees";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayload {
    id: Option<i64>,
    #[validate(required, length(max = 255))]
    name: Option<String>,
    age: Option<i32>,
    birthday: Option<DateTime<Utc>>,
    department_id: Option<i64>,
}

impl EmployeePayload {
    fn into_new(self) -> Result<NewEmployee, AppError> {
        validate_payload(&self)?;
        let name = self
            .name
            .ok_or_else(|| AppError::BadRequest("name: required".to_string()))?;
        Ok(NewEmployee {
            name,
            age: self.age,
            birthday: self.birthday,
            department_id: self.department_id,
        })
    }
}

async fn save_new(state: &AppState, payload: EmployeePayload) -> Result<HttpResponse, AppError> {
    let result = state.storage.insert_employee(payload.into_new()?).await?;
    let id = result.id.to_string();

    let mut response = HttpResponse::Created();
    response.insert_header((header::LOCATION, format!("{}/{}", BASE_URL, id)));
    insert_headers(&mut response, entity_creation_alert(&state.app_name, ENTITY_NAME, &id));
    Ok(response.json(result))
}

/// POST /api/employees
pub async fn create_employee(
    state: web::Data<AppState>,
    payload: web::Json<EmployeePayload>,
) -> Result<HttpResponse, AppError> {
    debug!("REST request to save Employee : {:?}", payload);
    let payload = payload.into_inner();
    if payload.id.is_some() {
        return Err(AppError::bad_request_alert(
            "A new employee cannot already have an ID",
            ENTITY_NAME,
            "idexists",
        ));
    }
    save_new(&state, payload).await
}

/// PUT /api/employees: an employee without an id is created instead.
pub async fn update_employee(
    state: web::Data<AppState>,
    payload: web::Json<EmployeePayload>,
) -> Result<HttpResponse, AppError> {
    debug!("REST request to update Employee : {:?}", payload);
    let payload = payload.into_inner();
    let Some(id) = payload.id else {
        return save_new(&state, payload).await;
    };

    let employee = payload.into_new()?.with_id(id);
    let result = state
        .storage
        .update_employee(employee)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    let mut response = HttpResponse::Ok();
    insert_headers(&mut response, entity_update_alert(&state.app_name, ENTITY_NAME, &id.to_string()));
    Ok(response.json(result))
}

/// GET /api/employees?<field>.<operator>=<value>&page=&size=&sort=
pub async fn get_all_employees(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let params = QueryParams::parse(req.query_string());
    let criteria = EmployeeCriteria::from_params(&params)?;
    let pageable = Pageable::from_pairs(params.pairs())?;
    debug!("REST request to get Employees by criteria: {:?}", criteria);

    let page = state.storage.find_employees(&criteria.to_predicate(), &pageable).await?;

    let mut response = HttpResponse::Ok();
    insert_headers(&mut response, generate_pagination_headers(&page, BASE_URL));
    Ok(response.json(&page.content))
}

/// GET /api/employees/count
pub async fn count_employees(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let criteria = EmployeeCriteria::from_params(&QueryParams::parse(req.query_string()))?;
    debug!("REST request to count Employees by criteria: {:?}", criteria);
    let count = state.storage.count_employees(&criteria.to_predicate()).await?;
    Ok(HttpResponse::Ok().json(count))
}

/// GET /api/employees/{id}
pub async fn get_employee(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    debug!("REST request to get Employee : {}", id);
    match state.storage.find_employee(id).await? {
        Some(employee) => Ok(HttpResponse::Ok().json(employee)),
        None => Err(AppError::NotFound("Employee not found".to_string())),
    }
}

/// DELETE /api/employees/{id}: succeeds whether or not the employee existed.
pub async fn delete_employee(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    debug!("REST request to delete Employee : {}", id);
    state.storage.delete_employee(id).await?;

    let mut response = HttpResponse::Ok();
    insert_headers(&mut response, entity_deletion_alert(&state.app_name, ENTITY_NAME, &id.to_string()));
    Ok(response.finish())
}
