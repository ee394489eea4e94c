//! Role gate.
//!
//! Pure authorization lookup evaluated before any mutating call reaches
//! the engine. Role tags arrive as free strings from storage; parsing
//! happens here, and anything unrecognized collapses to [`UserRole::Unknown`],
//! the most restrictive case.

use encore_common::{AppError, AppResult};

/// Closed set of user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Editor,
    Viewer,
    Pending,
    /// Unrecognized or missing role tag.
    Unknown,
}

impl UserRole {
    /// Parse a stored role tag. Unrecognized tags never grant access.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "admin" => Self::Admin,
            "editor" => Self::Editor,
            "viewer" => Self::Viewer,
            "pending" => Self::Pending,
            _ => Self::Unknown,
        }
    }
}

/// Mutating operations guarded by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
    TriggerStatsUpdate,
    TriggerCleanup,
}

impl Operation {
    const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::TriggerStatsUpdate => "triggerStatsUpdate",
            Self::TriggerCleanup => "triggerCleanup",
        }
    }
}

/// Is this role allowed to perform this operation?
#[must_use]
pub const fn is_allowed(role: UserRole, operation: Operation) -> bool {
    match role {
        UserRole::Admin => true,
        UserRole::Editor => match operation {
            Operation::Add | Operation::Remove | Operation::TriggerStatsUpdate => true,
            Operation::TriggerCleanup => false,
        },
        UserRole::Viewer | UserRole::Pending | UserRole::Unknown => false,
    }
}

/// Authorize an operation or return [`AppError::Forbidden`].
///
/// A denial is non-retryable and must short-circuit before any other
/// component runs.
pub fn authorize(role: UserRole, operation: Operation) -> AppResult<()> {
    if is_allowed(role, operation) {
        Ok(())
    } else {
        Err(AppError::Forbidden(operation.name().to_string()))
    }
}
