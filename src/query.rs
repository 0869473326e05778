use crate::error::{Error, Result};
use crate::types::Setting;
use glob::Pattern;

/// Query settings by glob patterns (OR logic)
///
/// Returns the settings whose key matches any of the patterns, in their
/// original order.
pub fn query_settings<'a, I>(settings: I, patterns: &[&str]) -> Result<Vec<&'a Setting>>
where
    I: IntoIterator<Item = &'a Setting>,
{
    // Compile all patterns first to fail fast on invalid patterns
    let compiled: Vec<Pattern> = patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| Error::InvalidGlobPattern(format!("'{}': {}", p, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(settings
        .into_iter()
        .filter(|s| compiled.iter().any(|pattern| pattern.matches(&s.key)))
        .collect())
}
