//! Shared name normalization for registry entities.

use super::SchemaDomainError;

/// Trims a display name and rejects it when nothing is left.
pub(super) fn validated_name(
    kind: &'static str,
    value: impl Into<String>,
) -> Result<String, SchemaDomainError> {
    let raw = value.into();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SchemaDomainError::EmptyName(kind));
    }
    Ok(trimmed.to_owned())
}
