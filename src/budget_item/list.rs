//! Budget items listing page with filters.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    budget_item::{
        BudgetItem, BudgetItemFilter, FilterOptions, get_filter_options, list_budget_items,
    },
    endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        edit_delete_action_links, format_optional_currency,
    },
    navigation::NavBar,
};

/// The state needed for the budget items listing page.
#[derive(Debug, Clone)]
pub struct BudgetItemsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetItemsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the budget items matching the query's filters as a table.
pub async fn get_budget_items_page(
    State(state): State<BudgetItemsPageState>,
    Query(filter): Query<BudgetItemFilter>,
) -> Result<Response, Error> {
    let filter = filter.normalized();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::ConnectionError)?;

    let items = list_budget_items(&filter, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budget items: {error}"))?;

    let filter_options = get_filter_options(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve filter options: {error}"))?;

    Ok(budget_items_view(&items, &filter, &filter_options).into_response())
}

/// The URL of the listing page showing only the items that match `filter`.
fn filter_url(filter: &BudgetItemFilter) -> String {
    match serde_urlencoded::to_string(filter) {
        Ok(query) if !query.is_empty() => format!("{}?{query}", endpoints::BUDGET_ITEMS_VIEW),
        Ok(_) => endpoints::BUDGET_ITEMS_VIEW.to_owned(),
        Err(error) => {
            tracing::error!("Could not encode filter {filter:?} as a query string: {error}");
            endpoints::BUDGET_ITEMS_VIEW.to_owned()
        }
    }
}

fn budget_items_view(
    items: &[BudgetItem],
    filter: &BudgetItemFilter,
    filter_options: &FilterOptions,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGET_ITEMS_VIEW).into_html();
    let item_count_text = match items.len() {
        1 => "1 budget item".to_owned(),
        count => format!("{count} budget items"),
    };

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="relative w-full overflow-x-auto shadow-md sm:rounded-lg"
            {
                div class="flex justify-between flex-wrap items-end gap-4 p-4"
                {
                    h1 class="text-xl font-bold" { "Budget Items" }

                    a href=(endpoints::NEW_BUDGET_ITEM_VIEW) class=(LINK_STYLE)
                    {
                        "Create Budget Item"
                    }
                }

                (filter_form_view(filter, filter_options))

                p class="px-4 pb-2 text-sm text-gray-600 dark:text-gray-400"
                {
                    "Showing " (item_count_text)
                }

                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "ID" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Cabinet" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Department" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Program" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Expense Category" }
                            th scope="col" class="px-6 py-4 text-right" { "FY22 Actual" }
                            th scope="col" class="px-6 py-4 text-right" { "FY23 Actual" }
                            th scope="col" class="px-6 py-4 text-right" { "FY24 Appropriation" }
                            th scope="col" class="px-6 py-4 text-right" { "FY25 Budget" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for item in items {
                            (budget_item_row_view(item))
                        }

                        @if items.is_empty() {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td colspan="10" class="px-6 py-4 text-center"
                                {
                                    "No budget items found. "
                                    a href=(endpoints::NEW_BUDGET_ITEM_VIEW) class=(LINK_STYLE)
                                    {
                                        "Create a budget item"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Budget Items", &[], &content)
}

fn filter_form_view(filter: &BudgetItemFilter, filter_options: &FilterOptions) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::BUDGET_ITEMS_VIEW)
            class="grid grid-cols-1 md:grid-cols-4 gap-4 items-end px-4 pb-4"
        {
            (filter_select(
                "cabinet",
                "Cabinet",
                "All cabinets",
                &filter_options.cabinets,
                filter.cabinet.as_deref(),
            ))
            (filter_select(
                "department",
                "Department",
                "All departments",
                &filter_options.departments,
                filter.department.as_deref(),
            ))
            (filter_select(
                "program",
                "Program",
                "All programs",
                &filter_options.programs,
                filter.program.as_deref(),
            ))

            div class="flex gap-4 items-center"
            {
                button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Filter" }

                @if !filter.is_empty() {
                    a href=(endpoints::BUDGET_ITEMS_VIEW) class=(LINK_STYLE) { "Clear" }
                }
            }
        }
    }
}

fn filter_select(
    name: &str,
    label: &str,
    all_text: &str,
    options: &[String],
    selected: Option<&str>,
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            select id=(name) name=(name) class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" selected[selected.is_none()] { (all_text) }

                @for value in options {
                    option value=(value) selected[selected == Some(value.as_str())] { (value) }
                }
            }
        }
    }
}

fn budget_item_row_view(item: &BudgetItem) -> Markup {
    let view_url = endpoints::format_endpoint(endpoints::BUDGET_ITEM_VIEW, item.id);
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_BUDGET_ITEM_VIEW, item.id);
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_BUDGET_ITEM, item.id);
    let confirm_message = format!(
        "Are you sure you want to delete the budget item {} ({}, {}, {})?",
        item.id, item.department, item.program, item.expense_category
    );
    let cabinet_url = filter_url(&BudgetItemFilter {
        cabinet: Some(item.cabinet.clone()),
        ..Default::default()
    });
    let department_url = filter_url(&BudgetItemFilter {
        department: Some(item.department.clone()),
        ..Default::default()
    });
    let program_url = filter_url(&BudgetItemFilter {
        program: Some(item.program.clone()),
        ..Default::default()
    });

    html! {
        tr class=(TABLE_ROW_STYLE) data-budget-item-id=(item.id)
        {
            td class=(TABLE_CELL_STYLE)
            {
                a href=(view_url) class=(LINK_STYLE) { (item.id) }
            }
            td class=(TABLE_CELL_STYLE)
            {
                @if !item.cabinet.is_empty() {
                    a href=(cabinet_url) class="hover:underline" { (item.cabinet) }
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                a href=(department_url) class="hover:underline" { (item.department) }
            }
            td class=(TABLE_CELL_STYLE)
            {
                a href=(program_url) class="hover:underline" { (item.program) }
            }
            td class=(TABLE_CELL_STYLE) { (item.expense_category) }
            td class="px-6 py-4 text-right whitespace-nowrap" { (format_optional_currency(item.fy22_actual_expense)) }
            td class="px-6 py-4 text-right whitespace-nowrap" { (format_optional_currency(item.fy23_actual_expense)) }
            td class="px-6 py-4 text-right whitespace-nowrap" { (format_optional_currency(item.fy24_appropriation)) }
            td class="px-6 py-4 text-right whitespace-nowrap" { (format_optional_currency(item.fy25_budget)) }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(
                        &edit_url,
                        &delete_url,
                        &confirm_message,
                        "closest tr",
                        "delete",
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod filter_url_tests {
    use crate::budget_item::BudgetItemFilter;

    use super::filter_url;

    #[test]
    fn empty_filter_has_no_query() {
        assert_eq!(filter_url(&BudgetItemFilter::default()), "/budget_items");
    }

    #[test]
    fn encodes_spaces_and_symbols() {
        let filter = BudgetItemFilter {
            cabinet: Some("Public Safety".to_owned()),
            department: Some("Parks & Recreation".to_owned()),
            program: None,
        };

        assert_eq!(
            filter_url(&filter),
            "/budget_items?cabinet=Public+Safety&department=Parks+%26+Recreation"
        );
    }
}
