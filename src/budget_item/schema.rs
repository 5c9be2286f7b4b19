//! The single description of the `BudgetData` table.
//!
//! The table definition, the SQL used by the data access functions and the
//! CSV loader's header check are all derived from [COLUMNS], so the bulk load
//! file and the table cannot drift apart.

/// The name of the table holding budget line items.
pub const TABLE: &str = "BudgetData";

/// A column in [TABLE].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// The column name as it appears in the database.
    pub name: &'static str,
    /// The column type and constraints used in `CREATE TABLE`.
    pub definition: &'static str,
}

/// The columns of [TABLE], in the order they appear in the table and in the
/// bulk load CSV.
///
/// Monetary columns are stored as TEXT holding the two decimal place string,
/// SQLite has no fixed-point type and NUMERIC affinity would convert values
/// to floating point.
pub const COLUMNS: [Column; 9] = [
    Column {
        name: "_id",
        definition: "INTEGER PRIMARY KEY",
    },
    Column {
        name: "Cabinet",
        definition: "TEXT NOT NULL DEFAULT ''",
    },
    Column {
        name: "Dept",
        definition: "TEXT NOT NULL",
    },
    Column {
        name: "Program",
        definition: "TEXT NOT NULL",
    },
    Column {
        name: "ExpenseCategory",
        definition: "TEXT NOT NULL",
    },
    Column {
        name: "FY22ActualExpense",
        definition: "TEXT",
    },
    Column {
        name: "FY23ActualExpense",
        definition: "TEXT",
    },
    Column {
        name: "FY24Appropriation",
        definition: "TEXT",
    },
    Column {
        name: "FY25Budget",
        definition: "TEXT",
    },
];

/// The primary key column.
pub const ID: Column = COLUMNS[0];
/// Filterable column.
pub const CABINET: Column = COLUMNS[1];
/// Filterable column.
pub const DEPARTMENT: Column = COLUMNS[2];
/// Filterable column.
pub const PROGRAM: Column = COLUMNS[3];

/// The SQL to create [TABLE] and the indexes for the filterable columns.
pub fn create_table_sql() -> String {
    let column_definitions = COLUMNS
        .iter()
        .map(|column| format!("{} {}", column.name, column.definition))
        .collect::<Vec<_>>()
        .join(",\n            ");

    let indexes = [CABINET, DEPARTMENT, PROGRAM]
        .iter()
        .map(|column| {
            format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_{name} ON {table}({name});",
                table = TABLE,
                name = column.name
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "CREATE TABLE IF NOT EXISTS {TABLE} (
            {column_definitions}
        );
        {indexes}"
    )
}

/// All column names in table order, separated by commas, for `SELECT` and `INSERT`.
pub fn column_list() -> String {
    COLUMNS
        .iter()
        .map(|column| column.name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Numbered parameters for every column, e.g. "?1, ?2, ..., ?9".
pub fn placeholders() -> String {
    (1..=COLUMNS.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Assignments for every column except the ID, numbered from `?1`, for `UPDATE`.
///
/// The ID is expected in the parameter after the last assignment.
pub fn update_assignments() -> String {
    COLUMNS[1..]
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ?{}", column.name, i + 1))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether a CSV header cell names `column`.
///
/// Case and whitespace are ignored so that headers such as "Expense Category"
/// match the column "ExpenseCategory".
pub fn header_matches(header: &str, column: &Column) -> bool {
    let normalized = header
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>();

    normalized.eq_ignore_ascii_case(column.name)
}
