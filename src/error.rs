use thiserror::Error;

use crate::api_connection::ApiConnectionError;
use crate::store::StoreError;

/// Failure of a meal-plan operation, surfaced to the immediate caller.
#[derive(Debug, Error)]
pub enum MealPlanError {
    /// Rejected before any store or text-generation call.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The text-generation call failed or returned content of the wrong shape.
    #[error("text generation failed: {0}")]
    Collaborator(#[from] ApiConnectionError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl MealPlanError {
    pub fn not_found(entity: &'static str, id: &str) -> Self {
        MealPlanError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_collaborator(&self) -> bool {
        matches!(self, MealPlanError::Collaborator(_))
    }
}
