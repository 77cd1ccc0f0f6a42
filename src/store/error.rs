//! Store failure taxonomy.

use std::io;

use thiserror::Error;

use crate::resilience::{Classify, ConnectivityCode, ErrorClass};
use crate::store::EntityKind;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("{kind} '{id}' already exists")]
    Conflict { kind: EntityKind, id: String },

    #[error("connection failure: {0}")]
    Connectivity(ConnectivityCode),

    #[error("corrupt record: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        StoreError::NotFound { kind, id: id.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl Classify for StoreError {
    fn classify(&self) -> ErrorClass {
        match self {
            StoreError::Connectivity(code) => ErrorClass::Transient(*code),
            StoreError::Io(err) => match err.kind() {
                io::ErrorKind::ConnectionRefused | io::ErrorKind::NotConnected => {
                    ErrorClass::Transient(ConnectivityCode::Unreachable)
                }
                io::ErrorKind::TimedOut => ErrorClass::Transient(ConnectivityCode::OperationTimeout),
                io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe
                | io::ErrorKind::UnexpectedEof => {
                    ErrorClass::Transient(ConnectivityCode::ConnectionClosed)
                }
                _ => ErrorClass::Permanent,
            },
            StoreError::NotFound { .. } | StoreError::Conflict { .. } | StoreError::Corrupt(_) => {
                ErrorClass::Permanent
            }
        }
    }
}
