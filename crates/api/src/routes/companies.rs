//! Company CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, Path, State};
use axum::http::{StatusCode, header};
use common::{Company, CompanyId, CompanyType};
use company_store::CompanyStore;
use domain::{
    Capability, CompanyError, CompanyPatch, CompanyService, CreateCompany, DeleteCompany,
    GetCompany, UpdateCompany,
};
use publisher::EventPublisher;
use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::{Caller, JwtAuth};
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S, P> {
    pub service: CompanyService<S, P>,
    pub auth: JwtAuth,
}

impl<S, P> FromRef<Arc<AppState<S, P>>> for JwtAuth {
    fn from_ref(state: &Arc<AppState<S, P>>) -> Self {
        state.auth.clone()
    }
}

// -- Request types --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCompanyRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "number_of_employees")]
    pub employee_count: i32,
    #[serde(default, alias = "registered")]
    pub is_registered: bool,
    #[serde(default, rename = "type")]
    pub company_type: CompanyType,
}

impl From<CreateCompanyRequest> for CreateCompany {
    fn from(req: CreateCompanyRequest) -> Self {
        CreateCompany {
            name: req.name,
            description: req.description,
            employee_count: req.employee_count,
            is_registered: req.is_registered,
            company_type: req.company_type,
        }
    }
}

/// Partial update. Absent fields are left unchanged; `"description": null`
/// clears the description.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCompanyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, alias = "number_of_employees")]
    pub employee_count: Option<i32>,
    #[serde(default, alias = "registered")]
    pub is_registered: Option<bool>,
    #[serde(default, rename = "type")]
    pub company_type: Option<CompanyType>,
}

impl From<UpdateCompanyRequest> for CompanyPatch {
    fn from(req: UpdateCompanyRequest) -> Self {
        CompanyPatch {
            name: req.name,
            description: req.description,
            employee_count: req.employee_count,
            is_registered: req.is_registered,
            company_type: req.company_type,
        }
    }
}

// A present field, even `null`, becomes `Some`; `#[serde(default)]` covers absence.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct CompanyEnvelope {
    pub company: Company,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
    pub id: CompanyId,
}

// -- Handlers --

/// POST /companies: create a company.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: CompanyStore + 'static, P: EventPublisher + 'static>(
    State(state): State<Arc<AppState<S, P>>>,
    Caller(capability): Caller,
    payload: Result<Json<CreateCompanyRequest>, JsonRejection>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<CompanyEnvelope>), ApiError> {
    let req = read_body(capability, "create", payload)?;

    let company = state
        .service
        .create_company(capability, req.into())
        .await?;

    let location = format!("/companies/{}", company.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CompanyEnvelope { company }),
    ))
}

/// GET /companies/{id}: load a company.
#[tracing::instrument(skip(state))]
pub async fn get<S: CompanyStore + 'static, P: EventPublisher + 'static>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
) -> Result<Json<CompanyEnvelope>, ApiError> {
    let company = state.service.get_company(GetCompany::new(id)).await?;
    Ok(Json(CompanyEnvelope { company }))
}

/// PATCH /companies/{id}: change some fields of a company.
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: CompanyStore + 'static, P: EventPublisher + 'static>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
    Caller(capability): Caller,
    payload: Result<Json<UpdateCompanyRequest>, JsonRejection>,
) -> Result<Json<CompanyEnvelope>, ApiError> {
    let req = read_body(capability, "update", payload)?;

    let company = state
        .service
        .update_company(capability, UpdateCompany::new(id, req.into()))
        .await?;

    Ok(Json(CompanyEnvelope { company }))
}

/// DELETE /companies/{id}: delete a company.
#[tracing::instrument(skip(state))]
pub async fn delete<S: CompanyStore + 'static, P: EventPublisher + 'static>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
    Caller(capability): Caller,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = state
        .service
        .delete_company(capability, DeleteCompany::new(id))
        .await?;

    Ok(Json(DeletedResponse {
        message: "company successfully deleted",
        id,
    }))
}

// Unauthenticated callers get 401 even when the body is also malformed.
fn read_body<T>(
    capability: Capability,
    operation: &'static str,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(_) if !capability.can_write() => Err(CompanyError::Unauthorized { operation }.into()),
        Err(rejection) => Err(rejection.into()),
    }
}
