//! Error types for chain access.

use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Key file or key JSON could not be loaded.
    Key(String),
    /// RPC communication error.
    Rpc(String),
    /// Transaction was accepted but the receipt failed on-chain.
    Execution(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Key(msg) => write!(f, "key error: {msg}"),
            Error::Rpc(msg) => write!(f, "rpc error: {msg}"),
            Error::Execution(msg) => write!(f, "execution error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
