//! The form shared by the create and edit budget item pages.

use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error, endpoints,
    budget_item::{Amount, BudgetItem, BudgetItemId, BudgetItemPatch},
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// The raw form fields for creating or editing a budget item.
///
/// Every field is kept as text so the form can be shown again with the
/// user's input when it fails validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BudgetItemFormData {
    pub id: String,
    pub cabinet: String,
    pub department: String,
    pub program: String,
    pub expense_category: String,
    pub fy22_actual_expense: String,
    pub fy23_actual_expense: String,
    pub fy24_appropriation: String,
    pub fy25_budget: String,
}

impl BudgetItemFormData {
    /// Fill the form with the values of an existing budget item.
    pub fn from_item(item: &BudgetItem) -> Self {
        let amount_text = |amount: Option<Amount>| amount.map(|a| a.to_string()).unwrap_or_default();

        Self {
            id: item.id.to_string(),
            cabinet: item.cabinet.clone(),
            department: item.department.clone(),
            program: item.program.clone(),
            expense_category: item.expense_category.clone(),
            fy22_actual_expense: amount_text(item.fy22_actual_expense),
            fy23_actual_expense: amount_text(item.fy23_actual_expense),
            fy24_appropriation: amount_text(item.fy24_appropriation),
            fy25_budget: amount_text(item.fy25_budget),
        }
    }

    /// Parse the form as a new budget item.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if the ID is not a positive whole number,
    /// an amount is invalid or a required field is empty.
    pub fn to_new_item(&self) -> Result<BudgetItem, Error> {
        let id = parse_id(&self.id)?;

        BudgetItem {
            id,
            cabinet: self.cabinet.clone(),
            department: self.department.clone(),
            program: self.program.clone(),
            expense_category: self.expense_category.clone(),
            fy22_actual_expense: parse_amount(&self.fy22_actual_expense, "FY22 actual expense")?,
            fy23_actual_expense: parse_amount(&self.fy23_actual_expense, "FY23 actual expense")?,
            fy24_appropriation: parse_amount(&self.fy24_appropriation, "FY24 appropriation")?,
            fy25_budget: parse_amount(&self.fy25_budget, "FY25 budget")?,
        }
        .validated()
    }

    /// Parse the form as a replacement for every field except the ID.
    ///
    /// Blank amounts clear the stored value.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if an amount is invalid.
    pub fn to_patch(&self) -> Result<BudgetItemPatch, Error> {
        Ok(BudgetItemPatch {
            cabinet: Some(self.cabinet.clone()),
            department: Some(self.department.clone()),
            program: Some(self.program.clone()),
            expense_category: Some(self.expense_category.clone()),
            fy22_actual_expense: Some(parse_amount(
                &self.fy22_actual_expense,
                "FY22 actual expense",
            )?),
            fy23_actual_expense: Some(parse_amount(
                &self.fy23_actual_expense,
                "FY23 actual expense",
            )?),
            fy24_appropriation: Some(parse_amount(&self.fy24_appropriation, "FY24 appropriation")?),
            fy25_budget: Some(parse_amount(&self.fy25_budget, "FY25 budget")?),
        })
    }
}

fn parse_id(text: &str) -> Result<BudgetItemId, Error> {
    text.trim()
        .parse::<BudgetItemId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            Error::Validation(format!(
                "the ID must be a whole number greater than zero, got \"{text}\""
            ))
        })
}

fn parse_amount(text: &str, field_name: &str) -> Result<Option<Amount>, Error> {
    Amount::parse_optional(text).map_err(|error| Error::Validation(format!("{field_name}: {error}")))
}

/// Whether the form creates a new budget item or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(BudgetItemId),
}

/// Render the budget item form.
///
/// The form replaces itself with the response when the server rejects the
/// input (HTTP 400), other errors are shown in the alert container.
pub fn budget_item_form_view(
    mode: FormMode,
    values: &BudgetItemFormData,
    error_message: &str,
) -> Markup {
    let (submit_text, id_is_editable) = match mode {
        FormMode::Create => ("Create Budget Item", true),
        FormMode::Edit(_) => ("Update Budget Item", false),
    };
    let post_endpoint = match mode {
        FormMode::Create => Some(endpoints::POST_BUDGET_ITEM.to_owned()),
        FormMode::Edit(_) => None,
    };
    let put_endpoint = match mode {
        FormMode::Create => None,
        FormMode::Edit(id) => Some(endpoints::format_endpoint(endpoints::PUT_BUDGET_ITEM, id)),
    };

    html! {
        form
            hx-post=[post_endpoint]
            hx-put=[put_endpoint]
            hx-target-400="this"
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="id" class=(FORM_LABEL_STYLE) { "ID" }

                @if id_is_editable {
                    input
                        id="id"
                        type="number"
                        name="id"
                        min="1"
                        step="1"
                        placeholder="1"
                        value=(values.id)
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                } @else {
                    input
                        id="id"
                        type="number"
                        value=(values.id)
                        disabled
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            (text_input("cabinet", "Cabinet", &values.cabinet, false))
            (text_input("department", "Department", &values.department, true))
            (text_input("program", "Program", &values.program, true))
            (text_input("expense_category", "Expense Category", &values.expense_category, true))

            (amount_input("fy22_actual_expense", "FY22 Actual Expense", &values.fy22_actual_expense))
            (amount_input("fy23_actual_expense", "FY23 Actual Expense", &values.fy23_actual_expense))
            (amount_input("fy24_appropriation", "FY24 Appropriation", &values.fy24_appropriation))
            (amount_input("fy25_budget", "FY25 Budget", &values.fy25_budget))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) }
        }
    }
}

fn text_input(name: &str, label: &str, value: &str, required: bool) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                id=(name)
                type="text"
                name=(name)
                placeholder=(label)
                value=(value)
                required[required]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

fn amount_input(name: &str, label: &str, value: &str) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            div class="input-wrapper"
            {
                input
                    id=(name)
                    type="number"
                    name=(name)
                    min="0"
                    step="0.01"
                    placeholder="0.00"
                    value=(value)
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    }
}
