use anyhow::{Context, Result};
use std::str::FromStr;

/// Source of configuration values. Binaries use [`process_env`]; tests pass a
/// closure over a fixed map.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

pub fn env_or(lookup: EnvLookup<'_>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub fn parse_env_or<T>(lookup: EnvLookup<'_>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

/// Presence semantics: the variable disables something merely by existing.
pub fn env_is_set(lookup: EnvLookup<'_>, key: &str) -> bool {
    lookup(key).is_some()
}

pub fn env_flag(lookup: EnvLookup<'_>, key: &str) -> bool {
    lookup(key)
        .map(|val| val == "true" || val == "1")
        .unwrap_or(false)
}
