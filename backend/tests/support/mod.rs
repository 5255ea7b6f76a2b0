//! Shared helpers for integration tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

/// Serializes tests that touch process environment variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Run `f` with the given environment overrides applied, restoring the
/// previous values afterwards (also on panic).
///
/// Each `(key, value)` sets `key` when `value` is `Some` and removes it
/// when `None`. Later entries for the same key win.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _restore = EnvRestore::apply(changes);
    f()
}

/// Previous values of overridden variables, put back on drop.
struct EnvRestore {
    previous: BTreeMap<String, Option<String>>,
}

impl EnvRestore {
    fn apply(changes: &[(&str, Option<&str>)]) -> Self {
        let mut previous = BTreeMap::new();
        for (key, value) in changes {
            previous
                .entry(key.to_string())
                .or_insert_with(|| std::env::var(key).ok());
            set_or_remove(key, *value);
        }
        Self { previous }
    }
}

impl Drop for EnvRestore {
    fn drop(&mut self) {
        for (key, value) in std::mem::take(&mut self.previous) {
            set_or_remove(&key, value.as_deref());
        }
    }
}

fn set_or_remove(key: &str, value: Option<&str>) {
    match value {
        Some(value) => std::env::set_var(key, value),
        None => std::env::remove_var(key),
    }
}
