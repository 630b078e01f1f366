use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use log::debug;
use serde::Deserialize;
use validator::Validate;

use super::{insert_headers, AppState};
use crate::criteria::{Criteria, DepartmentCriteria, EmployeeCriteria, QueryParams};
use crate::errors::AppError;
use crate::filter::LongFilter;
use crate::models::department::NewDepartment;
use crate::models::employee::EmployeeColumn;
use crate::query::{Pageable, Sort};
use crate::utils::header::{entity_creation_alert, entity_deletion_alert, entity_update_alert};
use crate::utils::pagination::generate_pagination_headers;
use crate::utils::validation::validate_payload;

const ENTITY_NAME: &str = "department";
const BASE_URL: &str = "/api/departments";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPayload {
    id: Option<i64>,
    #[validate(length(max = 255))]
    name: Option<String>,
    area: Option<i64>,
}

impl DepartmentPayload {
    fn into_new(self) -> Result<NewDepartment, AppError> {
        validate_payload(&self)?;
        Ok(NewDepartment {
            name: self.name,
            area: self.area,
        })
    }
}

async fn save_new(state: &AppState, payload: DepartmentPayload) -> Result<HttpResponse, AppError> {
    let result = state.storage.insert_department(payload.into_new()?).await?;
    let id = result.id.to_string();

    let mut response = HttpResponse::Created();
    response.insert_header((header::LOCATION, format!("{}/{}", BASE_URL, id)));
    insert_headers(&mut response, entity_creation_alert(&state.app_name, ENTITY_NAME, &id));
    Ok(response.json(result))
}

pub async fn create_department(
    state: web::Data<AppState>,
    payload: web::Json<DepartmentPayload>,
) -> Result<HttpResponse, AppError> {
    debug!("REST request to save Department : {:?}", payload);
    let payload = payload.into_inner();
    if payload.id.is_some() {
        return Err(AppError::bad_request_alert(
            "A new department cannot already have an ID",
            ENTITY_NAME,
            "idexists",
        ));
    }
    save_new(&state, payload).await
}

pub async fn update_department(
    state: web::Data<AppState>,
    payload: web::Json<DepartmentPayload>,
) -> Result<HttpResponse, AppError> {
    debug!("REST request to update Department : {:?}", payload);
    let payload = payload.into_inner();
    let Some(id) = payload.id else {
        return save_new(&state, payload).await;
    };

    let department = payload.into_new()?.with_id(id);
    let result = state
        .storage
        .update_department(department)
        .await?
        .ok_or_else(|| AppError::NotFound("Department not found".to_string()))?;

    let mut response = HttpResponse::Ok();
    insert_headers(&mut response, entity_update_alert(&state.app_name, ENTITY_NAME, &id.to_string()));
    Ok(response.json(result))
}

pub async fn get_all_departments(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let params = QueryParams::parse(req.query_string());
    let criteria = DepartmentCriteria::from_params(&params)?;
    let pageable = Pageable::from_pairs(params.pairs())?;
    debug!("REST request to get Departments by criteria: {:?}", criteria);

    let page = state.storage.find_departments(&criteria.to_predicate(), &pageable).await?;

    let mut response = HttpResponse::Ok();
    insert_headers(&mut response, generate_pagination_headers(&page, BASE_URL));
    Ok(response.json(&page.content))
}

pub async fn count_departments(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let criteria = DepartmentCriteria::from_params(&QueryParams::parse(req.query_string()))?;
    debug!("REST request to count Departments by criteria: {:?}", criteria);
    let count = state.storage.count_departments(&criteria.to_predicate()).await?;
    Ok(HttpResponse::Ok().json(count))
}

pub async fn get_department(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    debug!("REST request to get Department : {}", id);
    match state.storage.find_department(id).await? {
        Some(department) => Ok(HttpResponse::Ok().json(department)),
        None => Err(AppError::NotFound("Department not found".to_string())),
    }
}

/// Every employee of the department, unpaged, in id order.
pub async fn get_department_employees(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    debug!("REST request to get Employees of Department : {}", id);
    if state.storage.find_department(id).await?.is_none() {
        return Err(AppError::NotFound("Department not found".to_string()));
    }

    let criteria = EmployeeCriteria {
        department_id: Some(LongFilter::equals(id)),
        ..Default::default()
    };
    let employees = state
        .storage
        .find_all_employees(&criteria.to_predicate(), &[Sort::asc(EmployeeColumn::Id)])
        .await?;
    Ok(HttpResponse::Ok().json(employees))
}

/// Rejected with 409 while employees still belong to the department.
pub async fn delete_department(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    debug!("REST request to delete Department : {}", id);
    state.storage.delete_department(id).await?;

    let mut response = HttpResponse::Ok();
    insert_headers(&mut response, entity_deletion_alert(&state.app_name, ENTITY_NAME, &id.to_string()));
    Ok(response.finish())
}
