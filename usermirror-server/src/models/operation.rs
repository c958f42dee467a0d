//! Logical operations accepted by the service

use std::fmt;

use serde::Serialize;

use super::Username;

/// Operation name used in reports and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Register,
    Clear,
    List,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Clear => "clear",
            Self::List => "list",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutation replayed against both stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Register(Username),
    Clear,
}

impl Mutation {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Register(_) => Operation::Register,
            Self::Clear => Operation::Clear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_lowercase() {
        assert_eq!(Operation::List.to_string(), "list");
        assert_eq!(serde_json::to_value(Operation::Clear).unwrap(), "clear");
    }

    #[test]
    fn mutation_maps_to_operation() {
        let name = Username::new("bob").unwrap();
        assert_eq!(Mutation::Register(name).operation(), Operation::Register);
        assert_eq!(Mutation::Clear.operation(), Operation::Clear);
    }
}
