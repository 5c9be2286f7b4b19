//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/budget_items/{budget_item_id}', use [format_endpoint].

/// The root route which redirects to the budget items page.
pub const ROOT: &str = "/";
/// The page for listing budget items, optionally filtered.
pub const BUDGET_ITEMS_VIEW: &str = "/budget_items";
/// The page for creating a new budget item.
pub const NEW_BUDGET_ITEM_VIEW: &str = "/budget_items/new";
/// The page showing every field of a single budget item.
pub const BUDGET_ITEM_VIEW: &str = "/budget_items/{budget_item_id}";
/// The page for editing an existing budget item.
pub const EDIT_BUDGET_ITEM_VIEW: &str = "/budget_items/{budget_item_id}/edit";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route the create budget item form is submitted to.
pub const POST_BUDGET_ITEM: &str = "/api/budget_items";
/// The route the edit budget item form is submitted to.
pub const PUT_BUDGET_ITEM: &str = "/api/budget_items/{budget_item_id}";
/// The route to delete a budget item from the HTML pages.
pub const DELETE_BUDGET_ITEM: &str = "/api/budget_items/{budget_item_id}";

/// The JSON route for listing and creating budget items.
pub const API_BUDGET_ITEMS: &str = "/api/v1/budget_items";
/// The JSON route for getting, updating and deleting a single budget item.
pub const API_BUDGET_ITEM: &str = "/api/v1/budget_items/{budget_item_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
