//! Bulk loading budget items from a CSV file.
//!
//! The CSV must have a header row naming the columns of
//! [schema::COLUMNS](crate::budget_item::schema::COLUMNS) in order. Monetary
//! cells that are empty or hold `#Missing` are loaded as missing amounts.

use std::io::Read;

use rusqlite::Connection;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    Error,
    budget_item::{Amount, BudgetItem, BudgetItemId, insert_budget_item, schema},
};

/// The placeholder the source data uses for monetary values that were not recorded.
pub const MISSING_MARKER: &str = "#Missing";

/// Controls how rows with missing or invalid values are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Replace missing amounts with the mean of the row's other amounts.
    pub fill_missing: bool,
    /// Log and skip invalid rows instead of aborting the load.
    pub skip_invalid: bool,
}

/// The outcome of a successful load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// The number of rows added to the database.
    pub inserted: usize,
    /// The number of invalid rows that were skipped.
    pub skipped: usize,
}

/// Load the budget items in the CSV `reader` into the database.
///
/// All rows are inserted in a single transaction, if an error is returned no
/// rows are inserted.
///
/// # Errors
///
/// Returns [Error::InvalidCSV] if the header does not match the table or if a
/// row is invalid and `options.skip_invalid` is not set. Rows that reuse an
/// existing ID are invalid.
pub fn load_budget_csv<R: Read>(
    reader: R,
    connection: &Connection,
    options: LoadOptions,
) -> Result<LoadSummary, Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header = csv_reader
        .headers()
        .map_err(|error| Error::InvalidCSV(format!("could not read the header: {error}")))?
        .clone();
    check_header(&header)?;

    let transaction = connection.unchecked_transaction()?;
    let mut summary = LoadSummary::default();

    for (index, record) in csv_reader.records().enumerate() {
        // The header is line 1.
        let line = index + 2;

        let result = record
            .map_err(|error| Error::InvalidCSV(error.to_string()))
            .and_then(|record| parse_row(&record, options.fill_missing))
            .and_then(|item| insert_budget_item(&item, &transaction));

        match result {
            Ok(()) => summary.inserted += 1,
            Err(error @ (Error::SqlError(_) | Error::ConnectionError)) => return Err(error),
            Err(error) if options.skip_invalid => {
                tracing::warn!("Skipping line {line}: {error}");
                summary.skipped += 1;
            }
            Err(error) => {
                return Err(Error::InvalidCSV(format!("line {line}: {error}")));
            }
        }
    }

    transaction.commit()?;

    tracing::info!(
        "Loaded {} budget items, skipped {}",
        summary.inserted,
        summary.skipped
    );

    Ok(summary)
}

fn check_header(header: &csv::StringRecord) -> Result<(), Error> {
    let matches = header.len() == schema::COLUMNS.len()
        && header
            .iter()
            .zip(schema::COLUMNS.iter())
            .all(|(cell, column)| schema::header_matches(cell, column));

    if matches {
        Ok(())
    } else {
        Err(Error::InvalidCSV(format!(
            "expected the header \"{}\", got \"{}\"",
            schema::column_list(),
            header.iter().collect::<Vec<_>>().join(", ")
        )))
    }
}

fn parse_row(record: &csv::StringRecord, fill_missing: bool) -> Result<BudgetItem, Error> {
    let cell = |index: usize| record.get(index).unwrap_or_default();

    let id = cell(0)
        .parse::<BudgetItemId>()
        .map_err(|_| Error::Validation(format!("\"{}\" is not a valid ID", cell(0))))?;

    let mut amounts = [
        parse_amount_cell(cell(5))?,
        parse_amount_cell(cell(6))?,
        parse_amount_cell(cell(7))?,
        parse_amount_cell(cell(8))?,
    ];

    if fill_missing {
        fill_with_mean(&mut amounts)?;
    }

    let [fy22_actual_expense, fy23_actual_expense, fy24_appropriation, fy25_budget] = amounts;

    BudgetItem {
        id,
        cabinet: cell(1).to_owned(),
        department: cell(2).to_owned(),
        program: cell(3).to_owned(),
        expense_category: cell(4).to_owned(),
        fy22_actual_expense,
        fy23_actual_expense,
        fy24_appropriation,
        fy25_budget,
    }
    .validated()
}

fn parse_amount_cell(text: &str) -> Result<Option<Amount>, Error> {
    if text == MISSING_MARKER {
        Ok(None)
    } else {
        Amount::parse_optional(text)
    }
}

/// Replace missing amounts with the mean of the present amounts, rounded
/// half-to-even to cents. Rows without any amounts are left as they are.
fn fill_with_mean(amounts: &mut [Option<Amount>]) -> Result<(), Error> {
    let present = amounts
        .iter()
        .flatten()
        .map(Amount::as_decimal)
        .collect::<Vec<_>>();

    if present.is_empty() {
        return Ok(());
    }

    let total = present
        .iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(*value))
        .ok_or_else(|| Error::Validation("the row's amounts are too large to average".to_owned()))?;
    let mean = total
        .checked_div(Decimal::from(present.len()))
        .ok_or_else(|| Error::Validation("the row's amounts are too large to average".to_owned()))?;
    let mean = Amount::new(
        mean.round_dp_with_strategy(Amount::SCALE, RoundingStrategy::MidpointNearestEven),
    )?;

    for amount in amounts.iter_mut().filter(|amount| amount.is_none()) {
        *amount = Some(mean);
    }

    Ok(())
}
