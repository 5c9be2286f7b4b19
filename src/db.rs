//! Database setup shared by the server and the bulk loader.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::budget_item::create_budget_item_table;

/// Create the application tables if they do not already exist.
///
/// Safe to call on an existing database, the tables and rows are left as
/// they are.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_budget_item_table(&transaction)?;

    transaction.commit()
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use crate::budget_item::{
        create_budget_item, db::test_utils::police_patrol_salaries, get_budget_item,
    };

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        create_budget_item(police_patrol_salaries(), &connection).unwrap();

        initialize(&connection).expect("Could not initialize database a second time");

        assert_eq!(
            get_budget_item(1, &connection),
            Ok(police_patrol_salaries())
        );
    }
}
