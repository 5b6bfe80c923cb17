//! Environment variable loading.
//!
//! Keeps the primary-key / alias fallback chain in one place. Every helper
//! reads through a caller-supplied [`Lookup`] so config can be built from a
//! fixed map in tests.

use std::env;

/// Key → value source. The process environment is [`process_env`].
pub type Lookup<'a> = dyn Fn(&str) -> Option<String> + 'a;

/// Reads a variable from the process environment.
pub fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Load `.env` from the current directory into the process environment.
/// Variables that are already set are not overridden.
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring malformed .env: {}", e),
    });
}

fn first_set(lookup: &Lookup<'_>, primary: &str, aliases: &[&str]) -> Option<String> {
    lookup(primary).or_else(|| aliases.iter().find_map(|a| lookup(a)))
}

/// Primary key or alias chain, falling back to `default` when unset or empty.
pub fn lookup_or<F>(lookup: &Lookup<'_>, primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    first_set(lookup, primary, aliases)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default)
}

/// Primary key or alias chain; blank values count as unset.
pub fn lookup_optional(lookup: &Lookup<'_>, primary: &str, aliases: &[&str]) -> Option<String> {
    first_set(lookup, primary, aliases).and_then(|s| {
        let s = s.trim().to_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    })
}

/// Boolean variable: 0/false/no/off are false, anything else set is true.
pub fn lookup_bool(lookup: &Lookup<'_>, primary: &str, aliases: &[&str], default: bool) -> bool {
    match first_set(lookup, primary, aliases).as_deref() {
        Some(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}
