use super::domain::{FormDefinition, TenantId};
use super::error::FormError;

/// Only the owning tenant may mutate a form or read its submissions.
///
/// The public render and submit paths do not go through here.
pub fn authorize(definition: &FormDefinition, acting: &TenantId) -> Result<(), FormError> {
    if definition.is_owned_by(acting) {
        Ok(())
    } else {
        Err(FormError::AccessDenied)
    }
}
