//! # Customer Repository
//!
//! Registration and authentication for shop customers.
//!
//! ## Password Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Credential Flow                                     │
//! │                                                                         │
//! │  register("alice", "s3cret")                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Argon2id hash with fresh random salt ──► stored in customers table    │
//! │                                                                         │
//! │  authenticate("alice", "s3cret")                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Fetch row ──► verify password against hash ──► Customer (no hash)     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The hash never crosses the repository boundary: `Customer` has no hash
//! field, and the row type that carries it is private to this module.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use vinylflow_core::{validation, CoreError, Customer, NewCustomer};

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

/// Full customer row including the password hash. Never leaves this module.
#[derive(Debug, sqlx::FromRow)]
struct AuthRow {
    id: i64,
    username: String,
    password_hash: String,
    email: Option<String>,
    full_name: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    registration_date: DateTime<Utc>,
    is_active: bool,
}

impl AuthRow {
    fn into_customer(self) -> Customer {
        Customer {
            id: self.id,
            username: self.username,
            email: self.email,
            full_name: self.full_name,
            address: self.address,
            phone: self.phone,
            registration_date: self.registration_date,
            is_active: self.is_active,
        }
    }
}

const CUSTOMER_COLUMNS: &str =
    "id, username, email, full_name, address, phone, registration_date, is_active";

fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            // A malformed stored hash means the row predates this scheme
            // or was tampered with; either way the login fails closed.
            warn!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Registers a new customer.
    ///
    /// The password is hashed with Argon2id and a fresh random salt; the
    /// plaintext is never stored. Usernames are unique.
    ///
    /// ## Returns
    /// The id of the new customer.
    ///
    /// ## Errors
    /// * `DuplicateUsername` - Username already taken
    /// * Validation errors for empty username/password
    pub async fn register(&self, customer: &NewCustomer) -> DbResult<i64> {
        validation::validate_username(&customer.username)?;
        validation::validate_password(&customer.password)?;

        let username = customer.username.trim();

        debug!(username = %username, "Registering customer");

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM customers WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(DbError::Core(CoreError::DuplicateUsername {
                username: username.to_string(),
            }));
        }

        let password_hash = hash_password(&customer.password)?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO customers
                (username, password_hash, email, full_name, address, phone,
                 registration_date, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)
            "#,
        )
        .bind(username)
        .bind(&password_hash)
        .bind(&customer.email)
        .bind(&customer.full_name)
        .bind(&customer.address)
        .bind(&customer.phone)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Authenticates a customer by username and password.
    ///
    /// ## Returns
    /// * `Ok(Some(customer))` - Credentials valid and the account is active
    /// * `Ok(None)` - Unknown username, wrong password, or deactivated
    ///   account; the three cases are deliberately indistinguishable
    pub async fn authenticate(&self, username: &str, password: &str) -> DbResult<Option<Customer>> {
        debug!(username = %username, "Authenticating customer");

        let row = sqlx::query_as::<_, AuthRow>(
            "SELECT id, username, password_hash, email, full_name, address, phone, \
             registration_date, is_active FROM customers WHERE username = ?1",
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;

        let row = match row {
            Some(r) => r,
            None => return Ok(None),
        };

        if !row.is_active {
            debug!(username = %username, "Login rejected: account deactivated");
            return Ok(None);
        }

        if !verify_password(password, &row.password_hash) {
            debug!(username = %username, "Login rejected: bad password");
            return Ok(None);
        }

        Ok(Some(row.into_customer()))
    }

    /// Gets a customer by id (password hash excluded).
    pub async fn get(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists customers ordered by username.
    pub async fn list(&self, limit: u32, offset: u32) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY username LIMIT ?1 OFFSET ?2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Activates or deactivates a customer account.
    ///
    /// Deactivated customers keep their data and sales history but cannot
    /// authenticate.
    ///
    /// ## Returns
    /// * `Ok(true)` - Flag updated
    /// * `Ok(false)` - No customer with that id
    pub async fn set_active(&self, id: i64, active: bool) -> DbResult<bool> {
        debug!(id = %id, active = %active, "Setting customer active flag");

        let result = sqlx::query("UPDATE customers SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn alice() -> NewCustomer {
        NewCustomer {
            username: "alice".to_string(),
            password: "s3cret".to_string(),
            email: Some("alice@example.com".to_string()),
            full_name: Some("Alice Jones".to_string()),
            address: None,
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let db = test_db().await;
        let customers = db.customers();

        let id = customers.register(&alice()).await.unwrap();

        let authed = customers
            .authenticate("alice", "s3cret")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(authed.id, id);
        assert_eq!(authed.username, "alice");
        assert_eq!(authed.email.as_deref(), Some("alice@example.com"));
        assert!(authed.is_active);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user() {
        let db = test_db().await;
        let customers = db.customers();

        customers.register(&alice()).await.unwrap();

        assert!(customers
            .authenticate("alice", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(customers
            .authenticate("nobody", "s3cret")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = test_db().await;
        let customers = db.customers();

        customers.register(&alice()).await.unwrap();

        let dup = customers.register(&alice()).await;
        assert!(matches!(
            dup,
            Err(DbError::Core(CoreError::DuplicateUsername { .. }))
        ));
    }

    #[tokio::test]
    async fn test_deactivated_account_cannot_authenticate() {
        let db = test_db().await;
        let customers = db.customers();

        let id = customers.register(&alice()).await.unwrap();

        assert!(customers.set_active(id, false).await.unwrap());
        assert!(customers
            .authenticate("alice", "s3cret")
            .await
            .unwrap()
            .is_none());

        // Data survives deactivation
        let fetched = customers.get(id).await.unwrap().unwrap();
        assert!(!fetched.is_active);

        // Reactivation restores login
        assert!(customers.set_active(id, true).await.unwrap());
        assert!(customers
            .authenticate("alice", "s3cret")
            .await
            .unwrap()
            .is_some());

        // Unknown id reports false
        assert!(!customers.set_active(id + 999, false).await.unwrap());
    }

    #[tokio::test]
    async fn test_register_validation() {
        let db = test_db().await;
        let customers = db.customers();

        let mut no_name = alice();
        no_name.username = "   ".to_string();
        assert!(customers.register(&no_name).await.is_err());

        let mut no_pass = alice();
        no_pass.password = String::new();
        assert!(customers.register(&no_pass).await.is_err());
    }

    #[tokio::test]
    async fn test_list_ordered_by_username() {
        let db = test_db().await;
        let customers = db.customers();

        for name in ["carol", "alice", "bob"] {
            let mut c = alice();
            c.username = name.to_string();
            c.email = None;
            customers.register(&c).await.unwrap();
        }

        let all = customers.list(10, 0).await.unwrap();
        let names: Vec<&str> = all.iter().map(|c| c.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_hash_round_trip() {
        let hash = hash_password("s3cret").unwrap();
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("other", &hash));
        assert!(!verify_password("s3cret", "not-a-phc-string"));

        // Fresh salt every time
        let again = hash_password("s3cret").unwrap();
        assert_ne!(hash, again);
    }
}
