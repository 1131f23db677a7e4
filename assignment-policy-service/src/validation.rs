//! Input validation and sanitization functions

use common::types::{AudienceMode, NewAssignment};

use crate::errors::PolicyError;
use crate::models::AuthorizeAssignmentRequest;

/// Upper bound on audience size, defends against unbounded fan-out requests.
pub const MAX_AUDIENCE_SIZE: usize = 500;

/// Upper bound on any single identifier.
pub const MAX_ID_LENGTH: usize = 128;

/// Validate a user/form identifier for basic sanity.
fn validate_identifier(value: &str, field: &str) -> Result<(), PolicyError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PolicyError::validation(format!(
            "{field} must not be empty"
        )));
    }
    if trimmed.len() > MAX_ID_LENGTH {
        return Err(PolicyError::validation(format!("{field} is too long")));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(PolicyError::validation(format!(
            "{field} contains control characters"
        )));
    }
    Ok(())
}

fn validate_audience_ids(audience: &[String]) -> Result<(), PolicyError> {
    if audience.len() > MAX_AUDIENCE_SIZE {
        return Err(PolicyError::validation(format!(
            "audience exceeds the maximum of {MAX_AUDIENCE_SIZE} targets"
        )));
    }
    for id in audience {
        validate_identifier(id, "audience member id")?;
    }
    Ok(())
}

/// Validate input data for the advisory authorization check.
///
/// An empty audience is not rejected here; the engine answers it with a
/// denial so the caller still gets a decision object.
pub fn validate_authorize_input(body: &AuthorizeAssignmentRequest) -> Result<(), PolicyError> {
    validate_identifier(&body.actor_id, "actor_id")?;
    validate_audience_ids(&body.audience)?;
    Ok(())
}

/// Validate a deduplicated insert shape before it reaches the store.
///
/// The empty-audience check runs even though upstream UI validation should
/// have caught it; a zero-length list must never slip into persistence.
pub fn validate_new_assignment(new: &NewAssignment) -> Result<(), PolicyError> {
    validate_identifier(&new.form_id, "form id")?;
    validate_identifier(&new.assigned_by, "assigner id")?;
    if new.audience.is_empty() {
        return Err(PolicyError::validation(
            "assignment audience must not be empty",
        ));
    }
    validate_audience_ids(&new.audience)?;
    if new.mode == AudienceMode::Individual && new.audience.len() != 1 {
        return Err(PolicyError::validation(
            "individual assignments must target exactly one user",
        ));
    }
    Ok(())
}
