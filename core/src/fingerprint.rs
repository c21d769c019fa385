//! Device fingerprint generation
//!
//! A fingerprint is the SHA-256 digest of the browser signals a guest's page
//! collects. Hashing the full signal set, instead of trusting an identifier
//! sent by the client, means changing one signal yields an unrelated identity
//! while an unchanged browser keeps the same one across visits.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Browser/device signals collected for one request
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintInputs {
    pub user_agent: String,
    pub screen_resolution: String,
    pub timezone_offset: String,
    /// Comma separated `navigator.languages`
    pub languages: String,
    #[serde(default)]
    pub canvas_hash: Option<String>,
    #[serde(default)]
    pub webgl_hash: Option<String>,
    #[serde(default)]
    pub fonts: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

impl FingerprintInputs {
    #[must_use]
    pub fn new(
        user_agent: &str,
        screen_resolution: &str,
        timezone_offset: &str,
        languages: &str,
    ) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            screen_resolution: screen_resolution.to_string(),
            timezone_offset: timezone_offset.to_string(),
            languages: languages.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_canvas_hash(mut self, value: &str) -> Self {
        self.canvas_hash = Some(value.to_string());
        self
    }

    #[must_use]
    pub fn with_webgl_hash(mut self, value: &str) -> Self {
        self.webgl_hash = Some(value.to_string());
        self
    }

    #[must_use]
    pub fn with_fonts(mut self, value: &str) -> Self {
        self.fonts = Some(value.to_string());
        self
    }

    #[must_use]
    pub fn with_platform(mut self, value: &str) -> Self {
        self.platform = Some(value.to_string());
        self
    }

    /// Canonical form: every field present, absent ones empty, keys sorted
    fn canonical_fields(&self) -> BTreeMap<&'static str, &str> {
        BTreeMap::from([
            ("user_agent", self.user_agent.as_str()),
            ("screen_resolution", self.screen_resolution.as_str()),
            ("timezone_offset", self.timezone_offset.as_str()),
            ("languages", self.languages.as_str()),
            ("canvas_hash", self.canvas_hash.as_deref().unwrap_or_default()),
            ("webgl_hash", self.webgl_hash.as_deref().unwrap_or_default()),
            ("fonts", self.fonts.as_deref().unwrap_or_default()),
            ("platform", self.platform.as_deref().unwrap_or_default()),
        ])
    }

    /// Serialized bytes that get hashed
    ///
    /// `BTreeMap` iterates in key order and the object is built in that
    /// order, so the JSON is the same no matter how the inputs were assembled.
    #[must_use]
    pub fn canonical_json(&self) -> String {
        let object: serde_json::Map<String, serde_json::Value> = self
            .canonical_fields()
            .into_iter()
            .map(|(key, value)| (key.to_string(), serde_json::Value::from(value)))
            .collect();
        serde_json::Value::Object(object).to_string()
    }
}

/// Lowercase hex identifier of a guest device
///
/// Generated fingerprints are 64-character SHA-256 digests; client-supplied
/// ones are accepted anywhere between 32 and 64 characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap a string that already passed [`crate::validate_fingerprint`]
    pub(crate) const fn from_validated(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the fingerprint for a set of signals
///
/// Pure and deterministic: equal inputs always give equal fingerprints.
///
/// # Example
/// ```
/// use invitely_core::fingerprint::{generate, FingerprintInputs};
///
/// let inputs = FingerprintInputs::new("Mozilla/5.0", "1920x1080", "-120", "en-US,en");
/// let fp = generate(&inputs);
/// assert_eq!(fp.as_str().len(), 64);
/// assert_eq!(fp, generate(&inputs.clone()));
/// ```
#[must_use]
pub fn generate(inputs: &FingerprintInputs) -> Fingerprint {
    let digest = Sha256::digest(inputs.canonical_json().as_bytes());
    Fingerprint(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FingerprintInputs {
        FingerprintInputs::new(
            "Mozilla/5.0 (X11; Linux x86_64)",
            "2560x1440",
            "-60",
            "de-DE,de,en",
        )
    }

    #[test]
    fn test_canonical_json_is_sorted_and_complete() {
        let json = sample().canonical_json();
        assert_eq!(
            json,
            "{\"canvas_hash\":\"\",\"fonts\":\"\",\"languages\":\"de-DE,de,en\",\
             \"platform\":\"\",\"screen_resolution\":\"2560x1440\",\
             \"timezone_offset\":\"-60\",\"user_agent\":\"Mozilla/5.0 (X11; Linux x86_64)\",\
             \"webgl_hash\":\"\"}"
        );
    }

    #[test]
    fn test_canonical_json_escapes_hostile_signals() {
        let inputs = FingerprintInputs::new("UA \"quoted\"\n\\", "1x1", "0", "ümlaut,\u{0}");
        let json = inputs.canonical_json();

        let decoded: BTreeMap<String, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded["user_agent"], inputs.user_agent);
        assert_eq!(decoded["languages"], inputs.languages);
        assert_eq!(decoded.len(), 8);

        let empty_digest = hex::encode(Sha256::digest(b""));
        assert_ne!(generate(&inputs).as_str(), empty_digest);
    }

    #[test]
    fn test_generate_is_lowercase_hex_of_fixed_length() {
        let fp = generate(&sample());
        assert_eq!(fp.as_str().len(), 64);
        assert!(fp
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_generate_matches_sha256_of_canonical_json() {
        let inputs = sample();
        let expected = hex::encode(Sha256::digest(inputs.canonical_json().as_bytes()));
        assert_eq!(generate(&inputs).as_str(), expected);
    }

    #[test]
    fn test_missing_optional_equals_empty_optional() {
        let absent = sample();
        let empty = sample().with_platform("").with_fonts("");
        assert_eq!(generate(&absent), generate(&empty));
    }

    #[test]
    fn test_optional_signal_changes_fingerprint() {
        let base = generate(&sample());
        assert_ne!(base, generate(&sample().with_canvas_hash("c4nv45")));
        assert_ne!(base, generate(&sample().with_webgl_hash("w3bgl")));
        assert_ne!(base, generate(&sample().with_platform("Linux x86_64")));
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let inputs: FingerprintInputs = serde_json::from_str(
            r#"{"user_agent":"UA","screen_resolution":"1x1","timezone_offset":"0","languages":"en"}"#,
        )
        .unwrap();
        assert_eq!(inputs, FingerprintInputs::new("UA", "1x1", "0", "en"));
    }
}
