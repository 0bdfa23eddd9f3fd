//! Error types.
//!
//! Markup mistakes are never errors: they end up in the tree as
//! `span class="error"` nodes.  What remains here aborts a whole parse, or
//! rejects a configuration.

use std::io;

use crate::arena_tree::LinkError;

/// A fatal parse failure.  No document is produced.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The underlying reader failed, or produced invalid UTF-8.
    #[error("input error: {0}")]
    Io(#[from] io::Error),

    /// More characters were pushed back than the source can hold.  Only a
    /// pathologically long single line can cause this.
    #[error("pushback buffer overflow (limit {limit} characters)")]
    PushbackOverflow {
        /// The configured capacity.
        limit: usize,
    },

    /// A node could not be attached to the tree.
    #[error("cannot attach <{tag}>: {reason}")]
    Attach {
        /// The kind of node being attached.
        tag: String,
        /// Why the tree refused it.
        reason: LinkError,
    },
}

/// A configuration value that could not be understood.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A boolean property held something other than true/false/yes/no/on/off.
    #[error("{key}: expected a boolean, found {value:?}")]
    InvalidBool {
        /// The property key.
        key: String,
        /// The offending value.
        value: String,
    },

    /// A numeric property held something that is not a positive integer.
    #[error("{key}: expected a positive number, found {value:?}")]
    InvalidNumber {
        /// The property key.
        key: String,
        /// The offending value.
        value: String,
    },

    /// An image pattern is not a valid glob.
    #[error("invalid image pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The pattern as written.
        pattern: String,
        /// What the glob compiler said.
        reason: String,
    },
}
