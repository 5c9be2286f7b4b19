//! The page showing a single budget item.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    budget_item::{BudgetItem, BudgetItemId, get_budget_item},
    endpoints,
    html::{
        FORM_CONTAINER_STYLE, LINK_STYLE, base, edit_delete_action_links, format_optional_currency,
    },
    navigation::NavBar,
};

/// The state needed for the budget item detail page.
#[derive(Debug, Clone)]
pub struct BudgetItemPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetItemPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render every field of a budget item, or the 404 page if it does not exist.
pub async fn get_budget_item_page(
    Path(budget_item_id): Path<BudgetItemId>,
    State(state): State<BudgetItemPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::ConnectionError)?;

    let item = get_budget_item(budget_item_id, &connection)?;

    Ok(budget_item_view(&item).into_response())
}

fn budget_item_view(item: &BudgetItem) -> Markup {
    let view_url = endpoints::format_endpoint(endpoints::BUDGET_ITEM_VIEW, item.id);
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_BUDGET_ITEM_VIEW, item.id);
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_BUDGET_ITEM, item.id);
    let nav_bar = NavBar::new(&view_url).into_html();
    let confirm_message = format!("Are you sure you want to delete the budget item {}?", item.id);
    let cabinet = if item.cabinet.is_empty() {
        "(none)"
    } else {
        item.cabinet.as_str()
    };

    let fields = [
        ("Cabinet", cabinet.to_owned()),
        ("Department", item.department.clone()),
        ("Program", item.program.clone()),
        ("Expense Category", item.expense_category.clone()),
        (
            "FY22 Actual Expense",
            format_optional_currency(item.fy22_actual_expense),
        ),
        (
            "FY23 Actual Expense",
            format_optional_currency(item.fy23_actual_expense),
        ),
        (
            "FY24 Appropriation",
            format_optional_currency(item.fy24_appropriation),
        ),
        ("FY25 Budget", format_optional_currency(item.fy25_budget)),
    ];

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            section class="w-full" data-budget-item-id=(item.id)
            {
                h1 class="text-xl font-bold mb-4" { "Budget Item " (item.id) }

                dl class="divide-y divide-gray-200 dark:divide-gray-700"
                {
                    @for (label, value) in fields {
                        div class="flex justify-between gap-4 py-2"
                        {
                            dt class="font-medium" { (label) }
                            dd class="text-right" { (value) }
                        }
                    }
                }

                div class="flex gap-4 mt-6"
                {
                    (edit_delete_action_links(
                        &edit_url,
                        &delete_url,
                        &confirm_message,
                        "closest section",
                        "delete",
                    ))
                }
            }

            a href=(endpoints::BUDGET_ITEMS_VIEW) class={ "mt-6 " (LINK_STYLE) }
            {
                "Back to budget items"
            }
        }
    };

    base(&format!("Budget Item {}", item.id), &[], &content)
}
