//! # Owner Authentication
//!
//! The shop owner signs in with a single fixed credential pair, checked
//! verbatim. This is a deliberately distinct, lower-assurance path than
//! customer authentication: one operator account, no hashing, no account
//! table. Customer passwords go through the credential store's argon2
//! hashing instead.

/// The fixed operator credential pair.
///
/// Supplied by the embedding application (typically from its own
/// configuration); this crate never hardcodes the values.
///
/// ## Example
/// ```rust
/// use vinylflow_core::auth::OwnerCredentials;
///
/// let owner = OwnerCredentials::new("FP", "1539");
/// assert!(owner.verify("FP", "1539"));
/// assert!(!owner.verify("FP", "wrong"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerCredentials {
    username: String,
    password: String,
}

impl OwnerCredentials {
    /// Creates the operator credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        OwnerCredentials {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Verbatim comparison of both fields. Case-sensitive, no trimming.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}
