use thiserror::Error;

use gatescope_types::FeatureGateEntry;

/// Errors from parsing a `--feature-gates` value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeatureGateError {
    /// A token had no `=` or an empty name
    #[error("malformed feature gate token {token:?}, expected name=value")]
    MalformedToken { token: String },
}

/// Parse a comma separated `name=value` list
///
/// Tokens are trimmed and empty tokens skipped. Only the first `=` of a token
/// separates name from value. A repeated name keeps its first position and
/// takes the last value.
pub fn parse_feature_gates(raw: &str) -> Result<Vec<FeatureGateEntry>, FeatureGateError> {
    let mut entries: Vec<FeatureGateEntry> = Vec::new();

    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let Some((key, value)) = token.split_once('=').filter(|(k, _)| !k.trim().is_empty())
        else {
            return Err(FeatureGateError::MalformedToken {
                token: token.to_string(),
            });
        };
        let (key, value) = (key.trim(), value.trim());

        match entries.iter_mut().find(|e| e.key == key) {
            Some(existing) => existing.value = value.to_string(),
            None => entries.push(FeatureGateEntry::new(key, value)),
        }
    }

    Ok(entries)
}

/// Render entries back into `--feature-gates` value form
pub fn render_feature_gates(entries: &[FeatureGateEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{}={}", e.key, e.value))
        .collect::<Vec<_>>()
        .join(",")
}
