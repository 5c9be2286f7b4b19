//! Budget item deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    budget_item::{BudgetItemId, delete_budget_item},
};

/// The state needed for deleting a budget item.
#[derive(Debug, Clone)]
pub struct DeleteBudgetItemEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteBudgetItemEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle budget item deletion. Returns success alert or error.
pub async fn delete_budget_item_endpoint(
    Path(budget_item_id): Path<BudgetItemId>,
    State(state): State<DeleteBudgetItemEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::ConnectionError.into_alert_response();
        }
    };

    match delete_budget_item(budget_item_id, &connection) {
        Ok(_) => {
            tracing::info!("Deleted budget item {budget_item_id}");

            Alert::SuccessSimple {
                message: format!("Budget item {budget_item_id} deleted successfully"),
            }
            .into_response()
        }
        Err(Error::NotFound) => Error::NotFound.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting budget item {budget_item_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
