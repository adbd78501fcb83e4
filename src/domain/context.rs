//! Operation Context
//!
//! Metadata about the current operation for audit and tracing. The acting
//! user id is carried here explicitly; nothing in the system reads it from
//! ambient state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for an operation, built by the identity middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationContext {
    /// Acting user id supplied by the trusted identity layer
    pub user_id: Uuid,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl OperationContext {
    /// Create a context for the given acting user
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            correlation_id: None,
        }
    }

    /// Attach a correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Generate a new correlation ID if not present
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }
}
