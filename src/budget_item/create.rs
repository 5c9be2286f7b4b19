//! Budget item creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    budget_item::{
        create_budget_item,
        form::{BudgetItemFormData, FormMode, budget_item_form_view},
    },
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
};

/// The state needed for creating a budget item.
#[derive(Debug, Clone)]
pub struct CreateBudgetItemEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBudgetItemEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the budget item creation page.
pub async fn get_new_budget_item_page() -> Response {
    new_budget_item_view().into_response()
}

/// Handle budget item creation form submission.
///
/// Invalid input re-renders the form with the error message, a duplicate ID
/// is reported with an alert.
pub async fn create_budget_item_endpoint(
    State(state): State<CreateBudgetItemEndpointState>,
    Form(form_data): Form<BudgetItemFormData>,
) -> Response {
    let item = match form_data.to_new_item() {
        Ok(item) => item,
        Err(error) => {
            return (
                StatusCode::BAD_REQUEST,
                budget_item_form_view(FormMode::Create, &form_data, &format!("Error: {error}")),
            )
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::ConnectionError.into_alert_response();
        }
    };

    match create_budget_item(item, &connection) {
        Ok(item) => {
            tracing::info!("Created budget item {}", item.id);

            (
                HxRedirect(endpoints::BUDGET_ITEMS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::Validation(message)) => (
            StatusCode::BAD_REQUEST,
            budget_item_form_view(FormMode::Create, &form_data, &format!("Error: {message}")),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while creating a budget item: {error}");
            error.into_alert_response()
        }
    }
}

fn new_budget_item_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_BUDGET_ITEM_VIEW).into_html();
    let form = budget_item_form_view(FormMode::Create, &BudgetItemFormData::default(), "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "New Budget Item" }
            (form)
        }
    };

    base("Create Budget Item", &[dollar_input_styles()], &content)
}
