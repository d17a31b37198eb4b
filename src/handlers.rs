use crate::directory::UserRecord;
use crate::errors::AppError;
use crate::intent::{RoleIntent, UserId};
use crate::models::{EmployeeFlagResponse, EndpointsResponse};
use crate::resolver::RoleChange;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};

pub async fn get_endpoints(
    State(state): State<AppState>,
    Path(intent): Path<String>,
    headers: HeaderMap,
) -> Result<Json<EndpointsResponse>, AppError> {
    let intent = parse_intent(&intent)?;
    let entry = state.resolver.resolve_entry(intent, bearer_token(&headers)).await;
    Ok(Json(EndpointsResponse::new(intent, entry)))
}

pub async fn reset_endpoints(State(state): State<AppState>) -> StatusCode {
    state.resolver.reset().await;
    StatusCode::NO_CONTENT
}

pub async fn change_role(
    State(state): State<AppState>,
    Path((id, intent)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<RoleChange>, AppError> {
    let intent = parse_intent(&intent)?;
    let change = state
        .resolver
        .execute(intent, &UserId::from(id.trim()), bearer_token(&headers))
        .await?;
    Ok(Json(change))
}

pub async fn list_pending_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<UserRecord>>, AppError> {
    let users = state
        .resolver
        .directory()
        .pending_users(bearer_token(&headers))
        .await?;
    Ok(Json(users))
}

pub async fn ensure_employee(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<EmployeeFlagResponse>, AppError> {
    let bearer = bearer_token(&headers);
    let directory = state.resolver.directory();
    let profile = directory
        .current_profile(bearer)
        .await
        .ok_or_else(|| AppError::not_found("no profile endpoint answered"))?;

    if !directory.ensure_employee_flag(&profile.id, bearer).await {
        return Err(AppError::bad_gateway("backend refused the employee flag"));
    }
    Ok(Json(EmployeeFlagResponse {
        user_id: profile.id,
        is_employee: true,
    }))
}

pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserRecord>, AppError> {
    state
        .resolver
        .directory()
        .current_profile(bearer_token(&headers))
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found("no profile endpoint answered"))
}

fn parse_intent(raw: &str) -> Result<RoleIntent, AppError> {
    raw.parse::<RoleIntent>()
        .map_err(|err| AppError::bad_request(err.to_string()))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
