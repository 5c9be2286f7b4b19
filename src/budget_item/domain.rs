//! Core budget item domain types.

use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// Database identifier for a budget item.
///
/// IDs are assigned externally (e.g., by the source CSV), not by the database.
pub type BudgetItemId = i64;

/// A non-negative amount of money with exactly two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Amount(Decimal);

impl Amount {
    /// The number of decimal places every amount is stored with.
    pub const SCALE: u32 = 2;

    /// The largest amount that can be recorded, 999,999,999,999,999.99.
    ///
    /// Row sums stay far from the limits of [Decimal] and whole dollar
    /// amounts are exactly representable as `f64`.
    pub const MAX: Decimal = Decimal::from_parts(1_569_325_055, 23_283_064, 0, false, 2);

    /// Create an amount, normalizing it to two decimal places.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::Validation] if `value` is
    /// negative, greater than [Amount::MAX] or has non-zero digits past the
    /// second decimal place. Amounts are never rounded.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(Error::Validation(format!(
                "{value} is negative, amounts must be zero or greater"
            )));
        }

        if value > Self::MAX {
            return Err(Error::Validation(format!(
                "{value} is too large, amounts must be at most {}",
                Self::MAX
            )));
        }

        if value.normalize().scale() > Self::SCALE {
            return Err(Error::Validation(format!(
                "{value} has more than two decimal places"
            )));
        }

        let mut value = value;
        value.rescale(Self::SCALE);
        value.set_sign_positive(true);

        Ok(Self(value))
    }

    /// Parse an optional amount from user input.
    ///
    /// Blank input means the amount was not recorded and gives `Ok(None)`.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::Validation] if `text` is not a
    /// number or is not a valid amount.
    pub fn parse_optional(text: &str) -> Result<Option<Self>, Error> {
        let text = text.trim();

        if text.is_empty() {
            Ok(None)
        } else {
            text.parse().map(Some)
        }
    }

    /// The underlying decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| Error::Validation(format!("\"{s}\" is not a valid amount")))?;

        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Amounts are written as strings, e.g. `"1050.50"`, so JSON clients never
/// see a floating point value.
impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Accepts strings and numbers. JSON numbers are read from their original
/// digits, not through `f64`.
impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;

        Amount::new(value).map_err(serde::de::Error::custom)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let decimal = match value {
            ValueRef::Text(text) => {
                let text = std::str::from_utf8(text).map_err(|error| FromSqlError::Other(error.into()))?;
                Decimal::from_str(text).map_err(|error| FromSqlError::Other(error.into()))?
            }
            ValueRef::Integer(integer) => Decimal::from(integer),
            _ => return Err(FromSqlError::InvalidType),
        };

        Amount::new(decimal).map_err(|error| FromSqlError::Other(error.into()))
    }
}

/// One line of the municipal budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    /// The ID of the line in the source budget.
    pub id: BudgetItemId,
    /// The top-level organizational grouping, may be empty.
    #[serde(default)]
    pub cabinet: String,
    /// The department responsible for the spending.
    pub department: String,
    /// The program within the department.
    pub program: String,
    /// What the money is spent on, e.g., "Salaries".
    pub expense_category: String,
    /// Actual spending in fiscal year 2022.
    pub fy22_actual_expense: Option<Amount>,
    /// Actual spending in fiscal year 2023.
    pub fy23_actual_expense: Option<Amount>,
    /// The amount appropriated for fiscal year 2024.
    pub fy24_appropriation: Option<Amount>,
    /// The proposed budget for fiscal year 2025.
    pub fy25_budget: Option<Amount>,
}

impl BudgetItem {
    /// Check the fields that the type system does not, trimming the text fields.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::Validation] if the ID is not
    /// positive or if the department, program or expense category is empty.
    pub fn validated(self) -> Result<Self, Error> {
        if self.id <= 0 {
            return Err(Error::Validation(format!(
                "the ID must be a whole number greater than zero, got {}",
                self.id
            )));
        }

        Ok(Self {
            id: self.id,
            cabinet: self.cabinet.trim().to_owned(),
            department: required_text(&self.department, "department")?,
            program: required_text(&self.program, "program")?,
            expense_category: required_text(&self.expense_category, "expense category")?,
            fy22_actual_expense: self.fy22_actual_expense,
            fy23_actual_expense: self.fy23_actual_expense,
            fy24_appropriation: self.fy24_appropriation,
            fy25_budget: self.fy25_budget,
        })
    }
}

fn required_text(text: &str, field_name: &str) -> Result<String, Error> {
    let text = text.trim();

    if text.is_empty() {
        Err(Error::Validation(format!("the {field_name} cannot be empty")))
    } else {
        Ok(text.to_owned())
    }
}

/// A partial update to a budget item.
///
/// Fields set to `None` keep their current value. For amounts, `Some(None)`
/// clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[allow(missing_docs)]
pub struct BudgetItemPatch {
    pub cabinet: Option<String>,
    pub department: Option<String>,
    pub program: Option<String>,
    pub expense_category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub fy22_actual_expense: Option<Option<Amount>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub fy23_actual_expense: Option<Option<Amount>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub fy24_appropriation: Option<Option<Amount>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub fy25_budget: Option<Option<Amount>>,
}

impl BudgetItemPatch {
    /// Apply the changes to `item`, keeping the fields that are not set.
    pub fn apply(self, item: BudgetItem) -> BudgetItem {
        BudgetItem {
            id: item.id,
            cabinet: self.cabinet.unwrap_or(item.cabinet),
            department: self.department.unwrap_or(item.department),
            program: self.program.unwrap_or(item.program),
            expense_category: self.expense_category.unwrap_or(item.expense_category),
            fy22_actual_expense: self
                .fy22_actual_expense
                .unwrap_or(item.fy22_actual_expense),
            fy23_actual_expense: self
                .fy23_actual_expense
                .unwrap_or(item.fy23_actual_expense),
            fy24_appropriation: self.fy24_appropriation.unwrap_or(item.fy24_appropriation),
            fy25_budget: self.fy25_budget.unwrap_or(item.fy25_budget),
        }
    }
}

/// Distinguishes a field that is present but `null` from a missing field.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Exact match filters for listing budget items.
///
/// Empty values are treated the same as missing values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct BudgetItemFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cabinet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
}

impl BudgetItemFilter {
    /// Drop empty filter values.
    pub fn normalized(self) -> Self {
        let non_empty = |value: Option<String>| value.filter(|value| !value.trim().is_empty());

        Self {
            cabinet: non_empty(self.cabinet),
            department: non_empty(self.department),
            program: non_empty(self.program),
        }
    }

    /// Whether no filter value is set.
    pub fn is_empty(&self) -> bool {
        self.cabinet.is_none() && self.department.is_none() && self.program.is_none()
    }
}

/// The distinct values that budget items can be filtered by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// The cabinets in use.
    pub cabinets: Vec<String>,
    /// The departments in use.
    pub departments: Vec<String>,
    /// The programs in use.
    pub programs: Vec<String>,
}
