//! Budget item editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    budget_item::{
        BudgetItemId,
        form::{BudgetItemFormData, FormMode, budget_item_form_view},
        get_budget_item, update_budget_item,
    },
    endpoints,
    html::{FORM_CONTAINER_STYLE, LINK_STYLE, base, dollar_input_styles},
    navigation::NavBar,
};

/// The state needed for the edit budget item page.
#[derive(Debug, Clone)]
pub struct EditBudgetItemPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditBudgetItemPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for updating a budget item.
#[derive(Debug, Clone)]
pub struct UpdateBudgetItemEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateBudgetItemEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the budget item editing page, or the 404 page if the item does not exist.
pub async fn get_edit_budget_item_page(
    Path(budget_item_id): Path<BudgetItemId>,
    State(state): State<EditBudgetItemPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::ConnectionError)?;

    let item = get_budget_item(budget_item_id, &connection)?;
    let form_data = BudgetItemFormData::from_item(&item);

    Ok(edit_budget_item_view(budget_item_id, &form_data).into_response())
}

/// Handle budget item update form submission.
///
/// Every field except the ID is replaced with the submitted values.
pub async fn update_budget_item_endpoint(
    Path(budget_item_id): Path<BudgetItemId>,
    State(state): State<UpdateBudgetItemEndpointState>,
    Form(form_data): Form<BudgetItemFormData>,
) -> Response {
    let mode = FormMode::Edit(budget_item_id);
    // The ID input is disabled in the edit form, so show the ID from the path.
    let form_data = BudgetItemFormData {
        id: budget_item_id.to_string(),
        ..form_data
    };

    let patch = match form_data.to_patch() {
        Ok(patch) => patch,
        Err(error) => {
            return (
                StatusCode::BAD_REQUEST,
                budget_item_form_view(mode, &form_data, &format!("Error: {error}")),
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

    match update_budget_item(budget_item_id, patch, &connection) {
        Ok(_) => {
            tracing::info!("Updated budget item {budget_item_id}");

            (
                HxRedirect(endpoints::BUDGET_ITEMS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::Validation(message)) => (
            StatusCode::BAD_REQUEST,
            budget_item_form_view(mode, &form_data, &format!("Error: {message}")),
        )
            .into_response(),
        Err(Error::NotFound) => Error::NotFound.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating budget item {budget_item_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_budget_item_view(budget_item_id: BudgetItemId, form_data: &BudgetItemFormData) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_BUDGET_ITEM_VIEW, budget_item_id);
    let detail_endpoint = endpoints::format_endpoint(endpoints::BUDGET_ITEM_VIEW, budget_item_id);
    let nav_bar = NavBar::new(&edit_endpoint).into_html();
    let form = budget_item_form_view(FormMode::Edit(budget_item_id), form_data, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            div class="flex justify-between items-baseline w-full mb-4"
            {
                h1 class="text-xl font-bold" { "Edit Budget Item " (budget_item_id) }
                a href=(detail_endpoint) class=(LINK_STYLE) { "Cancel" }
            }

            (form)
        }
    };

    base("Edit Budget Item", &[dollar_input_styles()], &content)
}
