// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Results of a create-session attempt

use std::fmt;

/// Body returned to the client for every rejected or failed request
pub const ERROR_SENTINEL: &str = "error";

/// Why a create attempt did not produce a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A row for this identity already exists, or the insert hit the
    /// uniqueness constraint
    DuplicateIdentity,
    /// The lookup or insert failed for any other reason
    StorageFault,
}

/// Outcome of `SessionStore::create_session`
///
/// Both rejection kinds render as [`ERROR_SENTINEL`] on the wire; the
/// distinction exists for logging and tests only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created { session_id: String, ordinal: u64 },
    Rejected(RejectReason),
}

impl CreateOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, CreateOutcome::Created { .. })
    }

    /// Session id of a successful create
    pub fn session_id(&self) -> Option<&str> {
        match self {
            CreateOutcome::Created { session_id, .. } => Some(session_id),
            CreateOutcome::Rejected(_) => None,
        }
    }

    /// Ordinal of a successful create
    pub fn ordinal(&self) -> Option<u64> {
        match self {
            CreateOutcome::Created { ordinal, .. } => Some(*ordinal),
            CreateOutcome::Rejected(_) => None,
        }
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            CreateOutcome::Created { .. } => None,
            CreateOutcome::Rejected(reason) => Some(*reason),
        }
    }

    /// Response body: `<session_id>&n=<ordinal>` or `error`
    pub fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CreateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateOutcome::Created {
                session_id,
                ordinal,
            } => write!(f, "{}&n={}", session_id, ordinal),
            CreateOutcome::Rejected(_) => f.write_str(ERROR_SENTINEL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_wire_format() {
        let outcome = CreateOutcome::Created {
            session_id: "0123456789abcdef0123456789abcdef".to_string(),
            ordinal: 12,
        };
        assert_eq!(outcome.to_wire(), "0123456789abcdef0123456789abcdef&n=12");
        assert_eq!(outcome.ordinal(), Some(12));
        assert!(outcome.reject_reason().is_none());
    }

    #[test]
    fn test_rejections_share_the_sentinel() {
        let duplicate = CreateOutcome::Rejected(RejectReason::DuplicateIdentity);
        let fault = CreateOutcome::Rejected(RejectReason::StorageFault);
        assert_eq!(duplicate.to_wire(), ERROR_SENTINEL);
        assert_eq!(fault.to_wire(), ERROR_SENTINEL);
        assert_ne!(duplicate, fault);
        assert!(duplicate.session_id().is_none());
    }
}
