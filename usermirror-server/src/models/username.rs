//! Username newtype
//!
//! Only presence is checked here. Uniqueness and length limits belong
//! to whichever store holds the value.

use std::fmt;

use super::ValidationError;

/// A non-empty username.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Create a username, rejecting the empty string.
    ///
    /// # Example
    /// ```
    /// use usermirror_server::models::Username;
    ///
    /// assert!(Username::new("rudy").is_ok());
    /// assert!(Username::new("").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "username" });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
