use anyhow::{Context, Result, bail};
use std::collections::HashSet;

/// Longest range a single token may expand to.
const MAX_RANGE_LEN: u64 = 100_000;

pub const DEFAULT_SEED: u64 = 1337;

/// A seed together with the CLI token it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub token: String,
}

impl SeedInfo {
    #[must_use]
    pub fn new(seed: u64, token: impl Into<String>) -> Self {
        Self {
            seed,
            token: token.into(),
        }
    }
}

/// Resolve a list of CLI seed arguments into distinct seeds.
///
/// Supports literal integers (negative values use their magnitude) and
/// ranges written `start..end` or `start..=end`. Duplicates keep their
/// first position. An empty list falls back to [`DEFAULT_SEED`].
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut resolved = Vec::new();
    let mut seen = HashSet::new();

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        for seed in parse_token(token)? {
            if seen.insert(seed) {
                resolved.push(SeedInfo::new(seed, token));
            }
        }
    }

    if resolved.is_empty() {
        resolved.push(SeedInfo::new(DEFAULT_SEED, DEFAULT_SEED.to_string()));
    }

    Ok(resolved)
}

fn parse_token(token: &str) -> Result<Vec<u64>> {
    if let Ok(value) = token.parse::<i64>() {
        return Ok(vec![value.unsigned_abs()]);
    }

    if let Ok(value) = token.parse::<u64>() {
        return Ok(vec![value]);
    }

    if let Some((start, end)) = token.split_once("..") {
        let (end, inclusive) = match end.strip_prefix('=') {
            Some(end) => (end, true),
            None => (end, false),
        };
        let start: u64 = start
            .parse()
            .with_context(|| format!("invalid range start in seed token: {token}"))?;
        let end: u64 = end
            .parse()
            .with_context(|| format!("invalid range end in seed token: {token}"))?;
        let end = if inclusive { end.saturating_add(1) } else { end };
        if end <= start {
            bail!("Empty seed range: {token}");
        }
        if end - start > MAX_RANGE_LEN {
            bail!("Seed range too large ({} seeds): {token}", end - start);
        }
        return Ok((start..end).collect());
    }

    bail!("Unrecognized seed token: {token}");
}
