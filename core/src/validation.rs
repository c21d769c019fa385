//! Validation utilities for guest fingerprints

use crate::{
    constants::{MAX_FINGERPRINT_LEN, MIN_FINGERPRINT_LEN},
    errors::ValidationError,
    fingerprint::Fingerprint,
};

/// Check that a fingerprint is well formed before it is trusted
///
/// Checks run in order (empty, too short, too long, non-hex) so the error
/// names the first problem found. Length is counted in characters.
///
/// # Example
/// ```
/// # use invitely_core::validation::validate_fingerprint;
/// assert!(validate_fingerprint(&"a".repeat(40)).is_ok());
/// assert!(validate_fingerprint(&"g".repeat(40)).is_err());
/// ```
pub fn validate_fingerprint(fingerprint: &str) -> Result<(), ValidationError> {
    if fingerprint.is_empty() {
        return Err(ValidationError::EmptyFingerprint);
    }

    let len = fingerprint.chars().count();
    if len < MIN_FINGERPRINT_LEN {
        return Err(ValidationError::TooShort {
            len,
            min: MIN_FINGERPRINT_LEN,
        });
    }
    if len > MAX_FINGERPRINT_LEN {
        return Err(ValidationError::TooLong {
            len,
            max: MAX_FINGERPRINT_LEN,
        });
    }

    if let Some((position, found)) = fingerprint
        .chars()
        .enumerate()
        .find(|(_, c)| !c.is_ascii_hexdigit())
    {
        return Err(ValidationError::InvalidFormat { found, position });
    }

    Ok(())
}

/// Validate a client-supplied fingerprint and normalize it to lowercase
pub fn parse_fingerprint(fingerprint: &str) -> Result<Fingerprint, ValidationError> {
    validate_fingerprint(fingerprint)?;
    Ok(Fingerprint::from_validated(fingerprint.to_ascii_lowercase()))
}
