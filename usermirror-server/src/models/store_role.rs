//! Store roles

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which of the two stores an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreRole {
    /// The store on this host; also serves reads
    Local,
    /// The store on the other host
    Peer,
}

impl StoreRole {
    pub const ALL: [StoreRole; 2] = [StoreRole::Local, StoreRole::Peer];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Peer => "peer",
        }
    }
}

impl fmt::Display for StoreRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
