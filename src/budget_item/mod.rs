//! Budget line items: storage, HTML pages and JSON endpoints.

mod api;
mod create;
pub(crate) mod db;
mod delete;
mod detail;
mod domain;
mod edit;
mod form;
mod list;
pub mod schema;

pub use api::{
    create_budget_item_api, delete_budget_item_api, get_budget_item_api, list_budget_items_api,
    patch_budget_item_api,
};
pub use create::{create_budget_item_endpoint, get_new_budget_item_page};
pub use db::{
    count_budget_items, create_budget_item, create_budget_item_table, delete_budget_item,
    get_budget_item, get_filter_options, list_budget_items, update_budget_item,
};
pub(crate) use db::insert_budget_item;
pub use delete::delete_budget_item_endpoint;
pub use detail::get_budget_item_page;
pub use domain::{Amount, BudgetItem, BudgetItemFilter, BudgetItemId, BudgetItemPatch, FilterOptions};
pub use edit::{get_edit_budget_item_page, update_budget_item_endpoint};
pub use list::get_budget_items_page;
