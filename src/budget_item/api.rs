//! JSON endpoints for budget items.
//!
//! These mirror the HTML pages for clients that want structured data. Errors
//! are returned as `{"error": "<message>"}` with the status code from
//! [Error::status_code].

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json,
    extract::{
        FromRef, Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, Error,
    budget_item::{
        BudgetItem, BudgetItemFilter, BudgetItemId, BudgetItemPatch, create_budget_item,
        delete_budget_item, get_budget_item, list_budget_items, update_budget_item,
    },
    endpoints,
};

/// The state needed for the JSON budget item endpoints.
#[derive(Debug, Clone)]
pub struct BudgetItemApiState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetItemApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

impl BudgetItemApiState {
    fn connection(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| ApiError(Error::ConnectionError))
    }
}

/// An [Error] rendered as a JSON body.
#[derive(Debug, PartialEq)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(Error::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(Error::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.0.status_code();

        if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self.0);
        }

        (status_code, Json(json!({ "error": self.0.client_message() }))).into_response()
    }
}

/// List the budget items matching the query's filters.
pub async fn list_budget_items_api(
    State(state): State<BudgetItemApiState>,
    Query(filter): Query<BudgetItemFilter>,
) -> Result<Json<Vec<BudgetItem>>, ApiError> {
    let connection = state.connection()?;
    let items = list_budget_items(&filter, &connection)?;

    Ok(Json(items))
}

/// Get a single budget item.
pub async fn get_budget_item_api(
    path: Result<Path<BudgetItemId>, PathRejection>,
    State(state): State<BudgetItemApiState>,
) -> Result<Json<BudgetItem>, ApiError> {
    let Path(budget_item_id) = path?;
    let connection = state.connection()?;
    let item = get_budget_item(budget_item_id, &connection)?;

    Ok(Json(item))
}

/// Create a budget item, responding with 201 and the stored item.
pub async fn create_budget_item_api(
    State(state): State<BudgetItemApiState>,
    payload: Result<Json<BudgetItem>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(item) = payload?;
    let connection = state.connection()?;
    let item = create_budget_item(item, &connection)?;

    tracing::info!("Created budget item {}", item.id);

    let location = endpoints::format_endpoint(endpoints::API_BUDGET_ITEM, item.id);

    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(item)).into_response())
}

/// Update the fields present in the body, responding with the updated item.
pub async fn patch_budget_item_api(
    path: Result<Path<BudgetItemId>, PathRejection>,
    State(state): State<BudgetItemApiState>,
    payload: Result<Json<BudgetItemPatch>, JsonRejection>,
) -> Result<Json<BudgetItem>, ApiError> {
    let Path(budget_item_id) = path?;
    let Json(patch) = payload?;
    let connection = state.connection()?;
    let item = update_budget_item(budget_item_id, patch, &connection)?;

    tracing::info!("Updated budget item {budget_item_id}");

    Ok(Json(item))
}

/// Delete a budget item, responding with 204.
pub async fn delete_budget_item_api(
    path: Result<Path<BudgetItemId>, PathRejection>,
    State(state): State<BudgetItemApiState>,
) -> Result<StatusCode, ApiError> {
    let Path(budget_item_id) = path?;
    let connection = state.connection()?;
    delete_budget_item(budget_item_id, &connection)?;

    tracing::info!("Deleted budget item {budget_item_id}");

    Ok(StatusCode::NO_CONTENT)
}
