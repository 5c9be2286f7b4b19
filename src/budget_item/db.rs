//! Database operations for budget items.

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    budget_item::{
        BudgetItem, BudgetItemFilter, BudgetItemId, BudgetItemPatch, FilterOptions,
        schema::{self, TABLE},
    },
};

/// Initialize the budget item table and indexes.
pub fn create_budget_item_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(&schema::create_table_sql())
}

/// Retrieve the budget items matching every set field of `filter`, ordered by ID.
///
/// Filters are exact, case-sensitive matches. An empty filter returns every
/// budget item.
pub fn list_budget_items(
    filter: &BudgetItemFilter,
    connection: &Connection,
) -> Result<Vec<BudgetItem>, Error> {
    let filter = filter.clone().normalized();
    let query = format!(
        "SELECT {columns} FROM {TABLE}
        WHERE (?1 IS NULL OR {cabinet} = ?1)
            AND (?2 IS NULL OR {department} = ?2)
            AND (?3 IS NULL OR {program} = ?3)
        ORDER BY {id} ASC;",
        columns = schema::column_list(),
        cabinet = schema::CABINET.name,
        department = schema::DEPARTMENT.name,
        program = schema::PROGRAM.name,
        id = schema::ID.name,
    );

    connection
        .prepare(&query)?
        .query_map(
            params![filter.cabinet, filter.department, filter.program],
            map_row,
        )?
        .map(|maybe_item| maybe_item.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a single budget item by ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no budget item with the ID `id`.
pub fn get_budget_item(id: BudgetItemId, connection: &Connection) -> Result<BudgetItem, Error> {
    let query = format!(
        "SELECT {columns} FROM {TABLE} WHERE {id_column} = :id;",
        columns = schema::column_list(),
        id_column = schema::ID.name
    );

    connection
        .prepare(&query)?
        .query_row(&[(":id", &id)], map_row)
        .map_err(|error| error.into())
}

/// Validate and insert a new budget item, returning the stored item.
///
/// # Errors
///
/// Returns [Error::Validation] if the item is invalid and
/// [Error::DuplicateKey] if a budget item with the same ID already exists.
pub fn create_budget_item(item: BudgetItem, connection: &Connection) -> Result<BudgetItem, Error> {
    let item = item.validated()?;

    insert_budget_item(&item, connection)?;

    Ok(item)
}

/// Insert an already validated budget item.
pub(crate) fn insert_budget_item(item: &BudgetItem, connection: &Connection) -> Result<(), Error> {
    let query = format!(
        "INSERT INTO {TABLE} ({columns}) VALUES ({placeholders});",
        columns = schema::column_list(),
        placeholders = schema::placeholders()
    );

    connection
        .execute(
            &query,
            params![
                item.id,
                item.cabinet,
                item.department,
                item.program,
                item.expense_category,
                item.fy22_actual_expense,
                item.fy23_actual_expense,
                item.fy24_appropriation,
                item.fy25_budget,
            ],
        )
        .map_err(|error| match error {
            // Codes 1555 (PRIMARY KEY), 2579 (ROWID) and 2067 (UNIQUE).
            rusqlite::Error::SqliteFailure(sql_error, _)
                if matches!(sql_error.extended_code, 1555 | 2579 | 2067) =>
            {
                Error::DuplicateKey(item.id)
            }
            error => error.into(),
        })?;

    Ok(())
}

/// Apply `patch` to the budget item `id` and return the updated item.
///
/// Fields that are not set in `patch` keep their stored values. The read and
/// the write happen in one transaction so concurrent updates cannot
/// interleave.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no budget item with the ID `id` and
/// [Error::Validation] if the updated item is invalid. The stored item is
/// unchanged when an error is returned.
pub fn update_budget_item(
    id: BudgetItemId,
    patch: BudgetItemPatch,
    connection: &Connection,
) -> Result<BudgetItem, Error> {
    // Using unchecked_transaction because we only have &Connection from the MutexGuard.
    let transaction = connection.unchecked_transaction()?;

    let current = get_budget_item(id, &transaction)?;
    let updated = patch.apply(current).validated()?;

    let query = format!(
        "UPDATE {TABLE} SET {assignments} WHERE {id_column} = ?9;",
        assignments = schema::update_assignments(),
        id_column = schema::ID.name
    );

    let rows_affected = transaction.execute(
        &query,
        params![
            updated.cabinet,
            updated.department,
            updated.program,
            updated.expense_category,
            updated.fy22_actual_expense,
            updated.fy23_actual_expense,
            updated.fy24_appropriation,
            updated.fy25_budget,
            updated.id,
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    transaction.commit()?;

    Ok(updated)
}

/// Delete a budget item by ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no budget item with the ID `id`.
pub fn delete_budget_item(id: BudgetItemId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        &format!("DELETE FROM {TABLE} WHERE {} = ?1", schema::ID.name),
        [id],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the distinct, non-empty values of the filterable columns in ascending order.
pub fn get_filter_options(connection: &Connection) -> Result<FilterOptions, Error> {
    Ok(FilterOptions {
        cabinets: get_distinct_values(schema::CABINET.name, connection)?,
        departments: get_distinct_values(schema::DEPARTMENT.name, connection)?,
        programs: get_distinct_values(schema::PROGRAM.name, connection)?,
    })
}

fn get_distinct_values(column: &str, connection: &Connection) -> Result<Vec<String>, Error> {
    connection
        .prepare(&format!(
            "SELECT DISTINCT {column} FROM {TABLE} WHERE {column} != '' ORDER BY {column} ASC;"
        ))?
        .query_map([], |row| row.get(0))?
        .map(|maybe_value| maybe_value.map_err(|error| error.into()))
        .collect()
}

/// Count the stored budget items.
pub fn count_budget_items(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row(&format!("SELECT COUNT(*) FROM {TABLE};"), [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

fn map_row(row: &Row) -> Result<BudgetItem, rusqlite::Error> {
    Ok(BudgetItem {
        id: row.get(0)?,
        cabinet: row.get(1)?,
        department: row.get(2)?,
        program: row.get(3)?,
        expense_category: row.get(4)?,
        fy22_actual_expense: row.get(5)?,
        fy23_actual_expense: row.get(6)?,
        fy24_appropriation: row.get(7)?,
        fy25_budget: row.get(8)?,
    })
}


#[cfg(test)]
mod budget_item_query_tests {
    use rust_decimal_macros::dec;

    use crate::{
        Error,
        budget_item::{
            Amount, BudgetItem, BudgetItemFilter, BudgetItemPatch, FilterOptions,
            create_budget_item, delete_budget_item, get_budget_item, get_filter_options,
            list_budget_items, update_budget_item,
        },
    };

    use super::{
        count_budget_items,
        test_utils::{get_test_db_connection, library_branches_books, police_patrol_salaries},
    };

    #[test]
    fn create_then_get_returns_same_item() {
        let connection = get_test_db_connection();
        let item = police_patrol_salaries();

        let created = create_budget_item(item.clone(), &connection).expect("Could not create item");
        let got = get_budget_item(item.id, &connection);

        assert_eq!(created, item);
        assert_eq!(got, Ok(item));
    }

    #[test]
    fn create_preserves_missing_amounts() {
        let connection = get_test_db_connection();
        let item = library_branches_books();

        create_budget_item(item.clone(), &connection).unwrap();

        let got = get_budget_item(item.id, &connection).unwrap();
        assert_eq!(got.fy23_actual_expense, None);
    }

    #[test]
    fn create_stores_amount_with_two_decimal_places() {
        let connection = get_test_db_connection();
        let item = BudgetItem {
            fy22_actual_expense: Some(Amount::new(dec!(1000)).unwrap()),
            ..police_patrol_salaries()
        };

        create_budget_item(item, &connection).unwrap();

        let stored: String = connection
            .query_row(
                "SELECT FY22ActualExpense FROM BudgetData WHERE _id = 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stored, "1000.00");
    }

    #[test]
    fn create_fails_on_duplicate_id() {
        let connection = get_test_db_connection();
        create_budget_item(police_patrol_salaries(), &connection).unwrap();
        let duplicate = BudgetItem {
            department: "Fire".to_owned(),
            ..police_patrol_salaries()
        };

        let result = create_budget_item(duplicate, &connection);

        assert_eq!(result, Err(Error::DuplicateKey(1)));
        assert_eq!(count_budget_items(&connection), Ok(1));
        assert_eq!(
            get_budget_item(1, &connection).unwrap().department,
            "Police"
        );
    }

    #[test]
    fn create_fails_on_empty_department() {
        let connection = get_test_db_connection();
        let item = BudgetItem {
            department: " ".to_owned(),
            ..police_patrol_salaries()
        };

        let result = create_budget_item(item, &connection);

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(count_budget_items(&connection), Ok(0));
    }

    #[test]
    fn get_missing_item_returns_not_found() {
        let connection = get_test_db_connection();

        let result = get_budget_item(999999, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn list_without_filter_returns_all_in_id_order() {
        let connection = get_test_db_connection();
        create_budget_item(library_branches_books(), &connection).unwrap();
        create_budget_item(police_patrol_salaries(), &connection).unwrap();

        let got = list_budget_items(&BudgetItemFilter::default(), &connection);

        assert_eq!(
            got,
            Ok(vec![police_patrol_salaries(), library_branches_books()])
        );
    }

    #[test]
    fn list_with_filter_matches_exactly() {
        let connection = get_test_db_connection();
        create_budget_item(police_patrol_salaries(), &connection).unwrap();
        create_budget_item(library_branches_books(), &connection).unwrap();
        let filter = BudgetItemFilter {
            cabinet: Some("Public Safety".to_owned()),
            department: Some("Police".to_owned()),
            program: None,
        };

        let got = list_budget_items(&filter, &connection);

        assert_eq!(got, Ok(vec![police_patrol_salaries()]));
    }

    #[test]
    fn list_filter_is_case_sensitive() {
        let connection = get_test_db_connection();
        create_budget_item(police_patrol_salaries(), &connection).unwrap();
        let filter = BudgetItemFilter {
            department: Some("police".to_owned()),
            ..Default::default()
        };

        let got = list_budget_items(&filter, &connection);

        assert_eq!(got, Ok(vec![]));
    }

    #[test]
    fn list_treats_empty_filter_values_as_absent() {
        let connection = get_test_db_connection();
        create_budget_item(police_patrol_salaries(), &connection).unwrap();
        create_budget_item(library_branches_books(), &connection).unwrap();
        let filter = BudgetItemFilter {
            cabinet: Some(String::new()),
            department: Some(String::new()),
            program: Some(String::new()),
        };

        let got = list_budget_items(&filter, &connection).unwrap();

        assert_eq!(got.len(), 2);
    }

    #[test]
    fn update_changes_only_patched_fields() {
        let connection = get_test_db_connection();
        create_budget_item(police_patrol_salaries(), &connection).unwrap();
        let patch = BudgetItemPatch {
            fy25_budget: Some(Some(Amount::new(dec!(1200.00)).unwrap())),
            ..Default::default()
        };

        let updated = update_budget_item(1, patch, &connection).unwrap();

        let want = BudgetItem {
            fy25_budget: Some(Amount::new(dec!(1200.00)).unwrap()),
            ..police_patrol_salaries()
        };
        assert_eq!(updated, want);
        assert_eq!(get_budget_item(1, &connection), Ok(want));
    }

    #[test]
    fn update_with_empty_patch_changes_nothing() {
        let connection = get_test_db_connection();
        create_budget_item(police_patrol_salaries(), &connection).unwrap();

        let updated = update_budget_item(1, BudgetItemPatch::default(), &connection);

        assert_eq!(updated, Ok(police_patrol_salaries()));
    }

    #[test]
    fn update_missing_item_returns_not_found() {
        let connection = get_test_db_connection();

        let result = update_budget_item(42, BudgetItemPatch::default(), &connection);

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(count_budget_items(&connection), Ok(0));
    }

    #[test]
    fn invalid_update_leaves_item_unchanged() {
        let connection = get_test_db_connection();
        create_budget_item(police_patrol_salaries(), &connection).unwrap();
        let patch = BudgetItemPatch {
            program: Some("".to_owned()),
            fy25_budget: Some(None),
            ..Default::default()
        };

        let result = update_budget_item(1, patch, &connection);

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(get_budget_item(1, &connection), Ok(police_patrol_salaries()));
    }

    #[test]
    fn delete_removes_item() {
        let connection = get_test_db_connection();
        create_budget_item(police_patrol_salaries(), &connection).unwrap();

        delete_budget_item(1, &connection).expect("Could not delete item");

        assert_eq!(get_budget_item(1, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_item_returns_not_found() {
        let connection = get_test_db_connection();
        create_budget_item(police_patrol_salaries(), &connection).unwrap();

        let result = delete_budget_item(2, &connection);

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(count_budget_items(&connection), Ok(1));
    }

    #[test]
    fn filter_options_are_distinct_sorted_and_non_empty() {
        let connection = get_test_db_connection();
        create_budget_item(police_patrol_salaries(), &connection).unwrap();
        create_budget_item(library_branches_books(), &connection).unwrap();
        create_budget_item(
            BudgetItem {
                id: 3,
                cabinet: "".to_owned(),
                program: "Traffic".to_owned(),
                ..police_patrol_salaries()
            },
            &connection,
        )
        .unwrap();

        let got = get_filter_options(&connection);

        assert_eq!(
            got,
            Ok(FilterOptions {
                cabinets: vec!["Education".to_owned(), "Public Safety".to_owned()],
                departments: vec!["Library".to_owned(), "Police".to_owned()],
                programs: vec![
                    "Branches".to_owned(),
                    "Patrol".to_owned(),
                    "Traffic".to_owned()
                ],
            })
        );
    }

    #[test]
    fn public_safety_police_lifecycle() {
        let connection = get_test_db_connection();

        create_budget_item(police_patrol_salaries(), &connection).unwrap();
        let filter = BudgetItemFilter {
            cabinet: Some("Public Safety".to_owned()),
            ..Default::default()
        };
        assert_eq!(
            list_budget_items(&filter, &connection),
            Ok(vec![police_patrol_salaries()])
        );

        let patch = BudgetItemPatch {
            fy25_budget: Some(Some(Amount::new(dec!(1200.00)).unwrap())),
            ..Default::default()
        };
        let updated = update_budget_item(1, patch, &connection).unwrap();
        assert_eq!(updated.fy25_budget.unwrap().to_string(), "1200.00");
        assert_eq!(updated.fy24_appropriation.unwrap().to_string(), "1100.00");

        delete_budget_item(1, &connection).unwrap();
        assert_eq!(get_budget_item(1, &connection), Err(Error::NotFound));
        assert_eq!(list_budget_items(&filter, &connection), Ok(vec![]));
    }
}
