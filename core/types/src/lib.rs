//! Core types shared by the OpenSocial connector crates
#![warn(missing_docs)]

pub mod model;

use thiserror::Error;

pub use model::{
    Account, Email, Group, Group20, Group20Entry, GroupEntry, GroupId, GroupMembersEntry, Name,
    Organization, Person, PersonEntry, PhoneNumber, Photo,
};

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Generic error
    #[error("{0}")]
    Generic(String),

    /// Invalid or incomplete configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Response body could not be parsed into the expected envelope
    #[error("Failed to parse {context}: {source}")]
    Parse {
        /// What was being parsed (e.g. "group members")
        context: &'static str,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Build a parse error for the given envelope
    pub fn parse(context: &'static str, source: serde_json::Error) -> Self {
        Error::Parse { context, source }
    }

    /// Returns true if this is a parse error
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, Error>;
