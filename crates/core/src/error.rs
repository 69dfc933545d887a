#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Absent, or not visible to the caller. Both cases look the same so
    /// that board existence stays hidden from non-members.
    #[error("Entity not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid position {position} for a {grid_size}x{grid_size} board")]
    InvalidPosition { position: i32, grid_size: i32 },

    #[error("Mini-goal percentages would total {requested}% (limit 100%, {allocated}% already allocated)")]
    QuotaExceeded { requested: i32, allocated: i32 },

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Existed once but can no longer be used, e.g. an expired invite.
    #[error("Gone: {0}")]
    Gone(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
