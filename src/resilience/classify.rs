//! Failure classification.
//!
//! # Responsibilities
//! - Enumerate the connectivity codes worth retrying
//! - Map an error to Transient or Permanent
//! - Turn one attempt's result into an `AttemptOutcome`

use std::fmt;

/// Connectivity failures that are expected to clear up on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectivityCode {
    /// The persistence server could not be reached.
    Unreachable,
    /// Establishing the connection timed out.
    ConnectTimeout,
    /// The operation itself timed out.
    OperationTimeout,
    /// The server closed the connection mid-operation.
    ConnectionClosed,
}

impl ConnectivityCode {
    pub const ALL: [ConnectivityCode; 4] = [
        ConnectivityCode::Unreachable,
        ConnectivityCode::ConnectTimeout,
        ConnectivityCode::OperationTimeout,
        ConnectivityCode::ConnectionClosed,
    ];

    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectivityCode::Unreachable => "unreachable",
            ConnectivityCode::ConnectTimeout => "connect_timeout",
            ConnectivityCode::OperationTimeout => "operation_timeout",
            ConnectivityCode::ConnectionClosed => "connection_closed",
        }
    }
}

impl fmt::Display for ConnectivityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Retryability of a single failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Transient(ConnectivityCode),
    Permanent,
}

impl ErrorClass {
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorClass::Transient(_))
    }
}

/// Errors that know whether they are worth retrying.
///
/// Implementations must be pure: classifying the same error twice gives the
/// same answer.
pub trait Classify {
    fn classify(&self) -> ErrorClass;
}

/// Result of one invocation of a wrapped operation.
#[derive(Debug, PartialEq, Eq)]
pub enum AttemptOutcome<T, E> {
    Success(T),
    TransientFailure(E),
    PermanentFailure(E),
}

impl<T, E: Classify> AttemptOutcome<T, E> {
    /// Classify one attempt. A transient failure is only reported as such when
    /// attempts remain; on the last attempt it is already permanent.
    pub fn from_attempt(result: Result<T, E>, attempts_left: bool) -> Self {
        match result {
            Ok(value) => AttemptOutcome::Success(value),
            Err(err) if attempts_left && err.classify().is_transient() => {
                AttemptOutcome::TransientFailure(err)
            }
            Err(err) => AttemptOutcome::PermanentFailure(err),
        }
    }
}
