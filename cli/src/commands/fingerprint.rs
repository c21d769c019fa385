//! Fingerprint command implementation

use anyhow::Result;
use invitely_core::{generate_fingerprint, FingerprintInputs};
use tracing::info;

use super::OutputFormat;

/// Derive the fingerprint for a set of browser signals
///
/// # Errors
/// Returns error if JSON serialization of the result fails
pub fn execute(inputs: &FingerprintInputs, output_format: OutputFormat) -> Result<String> {
    let fingerprint = generate_fingerprint(inputs);
    info!(%fingerprint, "generated fingerprint");

    match output_format {
        OutputFormat::Human => {
            let optional = [
                ("Canvas hash", inputs.canvas_hash.as_deref()),
                ("WebGL hash", inputs.webgl_hash.as_deref()),
                ("Fonts", inputs.fonts.as_deref()),
                ("Platform", inputs.platform.as_deref()),
            ];
            let mut output = format!(
                "Fingerprint: {fingerprint}\n\n\
                 User agent:        {}\n\
                 Screen resolution: {}\n\
                 Timezone offset:   {}\n\
                 Languages:         {}",
                inputs.user_agent,
                inputs.screen_resolution,
                inputs.timezone_offset,
                inputs.languages,
            );
            for (label, value) in optional {
                if let Some(value) = value {
                    output.push_str(&format!("\n{:<19}{value}", format!("{label}:")));
                }
            }
            Ok(output)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
            "fingerprint": fingerprint,
            "inputs": inputs,
        }))?),
    }
}
