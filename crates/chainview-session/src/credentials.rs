//! Ephemeral credential scope for signing flows.
//!
//! A [`UserSession`] is a capability, not configuration: it is created for
//! one signing operation and dropped when that operation completes, success
//! or failure. The password is zeroized on drop and never appears in debug
//! output.

use zeroize::Zeroizing;

/// Credential-unlock context for a single signing operation.
pub struct UserSession {
    account_id: String,
    password: Zeroizing<String>,
}

impl UserSession {
    /// Creates a session for `account_id`, taking ownership of the password.
    pub fn new(account_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// The stored account this session unlocks.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for UserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSession")
            .field("account_id", &self.account_id)
            .field("password", &"<redacted>")
            .finish()
    }
}
