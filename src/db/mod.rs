//! Storage layer: a SQLite-backed user store.
//!
//! One row per end user, keyed by the Google subject ID. The cached
//! transaction list is a JSON TEXT column, NULL until the first fetch.
//! Every operation is a single statement on a connection guarded by a
//! mutex; there are no multi-statement transactions.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension, Row};

use crate::error::{AppError, Result};
use crate::models::{Transaction, User};
use crate::sample_data;

/// Handles creation and retrieval of user rows.
#[derive(Clone)]
pub struct UserStore {
    connection: Arc<Mutex<Connection>>,
}

impl UserStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: &str) -> Result<Self> {
        let connection = Connection::open(path)?;
        Self::create_table(&connection)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        Self::create_table(&connection)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    fn create_table(connection: &Connection) -> std::result::Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS user (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL,
                    transactions TEXT
                    )",
            (),
        )?;

        Ok(())
    }

    /// Get the user with the given subject ID, or `None` if no row matches.
    pub fn get(&self, id: &str) -> Result<Option<User>> {
        self.connection
            .lock()
            .unwrap()
            .prepare("SELECT id, name, email, transactions FROM user WHERE id = :id")?
            .query_row(&[(":id", id)], map_user_row)
            .optional()
            .map_err(AppError::from)?
            .map(decode_user)
            .transpose()
    }

    /// Insert a new user row with no transactions.
    ///
    /// Fails with [AppError::Conflict] if the subject ID is already present.
    pub fn create(&self, id: &str, name: &str, email: &str) -> Result<()> {
        let result = self.connection.lock().unwrap().execute(
            "INSERT INTO user (id, name, email) VALUES (?1, ?2, ?3)",
            (id, name, email),
        );

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_constraint_violation(&err) => Err(AppError::Conflict(id.to_string())),
            Err(err) => Err(err.into()),
        }
    }

    /// Insert the user if absent, then return the stored row.
    ///
    /// A single `ON CONFLICT DO NOTHING` insert makes this atomic under
    /// concurrent first logins for the same subject.
    pub fn get_or_create(&self, id: &str, name: &str, email: &str) -> Result<User> {
        self.connection.lock().unwrap().execute(
            "INSERT INTO user (id, name, email) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO NOTHING",
            (id, name, email),
        )?;

        self.get(id)?.ok_or_else(|| {
            AppError::Database(format!("user {id} missing immediately after upsert"))
        })
    }

    /// Replace the stored transaction list for `id`.
    ///
    /// An unknown ID updates zero rows; callers must not rely on this to
    /// signal existence.
    pub fn set_transactions(&self, id: &str, transactions: &[Transaction]) -> Result<()> {
        let encoded = serde_json::to_string(transactions)
            .map_err(|e| AppError::Database(format!("failed to encode transactions: {e}")))?;

        let updated = self.connection.lock().unwrap().execute(
            "UPDATE user SET transactions = ?1 WHERE id = ?2",
            (&encoded, id),
        )?;

        if updated == 0 {
            tracing::warn!(user_id = id, "set_transactions matched no user row");
        }

        Ok(())
    }

    /// Reset the table to the fixed test user seeded with the bundled
    /// sample data. Debug-mode /login only.
    pub fn seed_sample_user(&self) -> Result<User> {
        let transactions = sample_data::transactions()?;
        let encoded = serde_json::to_string(&transactions)
            .map_err(|e| AppError::Database(format!("failed to encode sample data: {e}")))?;

        {
            let connection = self.connection.lock().unwrap();
            connection.execute("DELETE FROM user", ())?;
            connection.execute(
                "INSERT INTO user (id, name, email, transactions) VALUES (?1, ?2, ?3, ?4)",
                (
                    sample_data::TEST_USER_ID,
                    sample_data::TEST_USER_NAME,
                    sample_data::TEST_USER_EMAIL,
                    &encoded,
                ),
            )?;
        }

        Ok(User {
            id: sample_data::TEST_USER_ID.to_string(),
            name: sample_data::TEST_USER_NAME.to_string(),
            email: sample_data::TEST_USER_EMAIL.to_string(),
            transactions: Some(transactions),
        })
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ConstraintViolation)
    )
}

/// Raw row before the transactions column is decoded.
struct UserRow {
    id: String,
    name: String,
    email: String,
    transactions: Option<String>,
}

fn map_user_row(row: &Row) -> std::result::Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        transactions: row.get(3)?,
    })
}

fn decode_user(row: UserRow) -> Result<User> {
    let transactions = row
        .transactions
        .as_deref()
        .map(serde_json::from_str::<Vec<Transaction>>)
        .transpose()
        .map_err(|e| AppError::Database(format!("corrupt transactions for {}: {e}", row.id)))?;

    Ok(User {
        id: row.id,
        name: row.name,
        email: row.email,
        transactions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunningBalance;

    fn store() -> UserStore {
        UserStore::open_in_memory().unwrap()
    }

    fn transactions() -> Vec<Transaction> {
        vec![
            Transaction {
                timestamp: "2024-01-01T09:00:00Z".to_string(),
                description: "PAYROLL".to_string(),
                transaction_category: "CREDIT".to_string(),
                amount: 2000.0,
                running_balance: RunningBalance { amount: 2500.0 },
            },
            Transaction {
                timestamp: "2024-01-02T12:00:00Z".to_string(),
                description: "GROCERIES".to_string(),
                transaction_category: "PURCHASE".to_string(),
                amount: -55.20,
                running_balance: RunningBalance { amount: 2444.80 },
            },
        ]
    }

    #[test]
    fn test_create_then_get_round_trip() {
        let store = store();

        store.create("sub-1", "Ada", "ada@example.com").unwrap();

        let user = store.get("sub-1").unwrap().expect("user should exist");
        assert_eq!(user.id, "sub-1");
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.transactions, None);
        assert!(!user.has_data());
    }

    #[test]
    fn test_get_missing_user_is_none_not_error() {
        let store = store();
        assert_eq!(store.get("nobody").unwrap(), None);
    }

    #[test]
    fn test_create_duplicate_is_conflict() {
        let store = store();

        store.create("sub-1", "Ada", "ada@example.com").unwrap();
        let err = store.create("sub-1", "Ada", "ada@example.com").unwrap_err();

        assert!(matches!(err, AppError::Conflict(ref id) if id == "sub-1"));
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let store = store();

        let first = store.get_or_create("sub-1", "Ada", "ada@example.com").unwrap();
        // Second call must not fail and must not overwrite the original claims.
        let second = store.get_or_create("sub-1", "Other", "other@example.com").unwrap();

        assert_eq!(first, second);
        assert_eq!(second.name, "Ada");
    }

    #[test]
    fn test_set_transactions_round_trip() {
        let store = store();
        store.create("sub-1", "Ada", "ada@example.com").unwrap();

        let expected = transactions();
        store.set_transactions("sub-1", &expected).unwrap();

        let user = store.get("sub-1").unwrap().unwrap();
        assert_eq!(user.transactions, Some(expected));
        assert!(user.has_data());
    }

    #[test]
    fn test_set_transactions_replaces_whole_list() {
        let store = store();
        store.create("sub-1", "Ada", "ada@example.com").unwrap();

        store.set_transactions("sub-1", &transactions()).unwrap();
        let replacement = vec![transactions().remove(0)];
        store.set_transactions("sub-1", &replacement).unwrap();

        let user = store.get("sub-1").unwrap().unwrap();
        assert_eq!(user.transactions, Some(replacement));
    }

    #[test]
    fn test_set_transactions_unknown_id_is_silent() {
        let store = store();

        store.set_transactions("nobody", &transactions()).unwrap();

        assert_eq!(store.get("nobody").unwrap(), None);
    }

    #[test]
    fn test_get_or_create_concurrent_first_login() {
        let store = store();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.get_or_create("sub-1", "Ada", "ada@example.com"))
            })
            .collect();

        for handle in handles {
            let user = handle.join().unwrap().expect("no thread may fail");
            assert_eq!(user.id, "sub-1");
        }
    }

    #[test]
    fn test_seed_sample_user_replaces_table() {
        let store = store();
        store.create("sub-1", "Ada", "ada@example.com").unwrap();

        let seeded = store.seed_sample_user().unwrap();

        assert_eq!(seeded.id, sample_data::TEST_USER_ID);
        assert!(seeded.has_data());
        // Previous rows are gone, the sample user is retrievable.
        assert_eq!(store.get("sub-1").unwrap(), None);
        let stored = store.get(sample_data::TEST_USER_ID).unwrap().unwrap();
        assert_eq!(stored.transactions, seeded.transactions);
    }
}
