//! Validate command implementation

use anyhow::{anyhow, Result};
use invitely_core::parse_fingerprint;
use tracing::info;

use super::OutputFormat;

/// Check a client-supplied fingerprint
///
/// # Errors
/// Returns error if the fingerprint is empty, outside 32-64 characters or not hex
pub fn execute(fingerprint: &str, output_format: OutputFormat) -> Result<String> {
    let normalized =
        parse_fingerprint(fingerprint).map_err(|e| anyhow!("Invalid fingerprint: {e}"))?;
    info!(fingerprint = %normalized, "fingerprint accepted");

    match output_format {
        OutputFormat::Human => Ok(format!(
            "Valid fingerprint ({} characters): {normalized}",
            normalized.as_str().len()
        )),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
            "valid": true,
            "fingerprint": normalized,
        }))?),
    }
}
