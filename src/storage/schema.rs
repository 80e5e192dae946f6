//! Schema for the `users` table.

use rusqlite::Connection;

/// Table definition. `IF NOT EXISTS` makes creation idempotent.
pub const CREATE_USERS_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY, name TEXT, email TEXT)";

/// Create the `users` table if it does not already exist.
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_USERS_TABLE)
}

/// Column names of the `users` table in declaration order.
pub fn user_columns(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('users') ORDER BY cid")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}
