//! Marker stamping on a service's environment list.
//!
//! Changing any environment entry makes the orchestrator recreate the
//! service's tasks, which is what forces them onto newly joined nodes.

/// Set `key=value` in `env`.
///
/// Returns `false` when the entry already carries `value` (nothing to
/// update). An existing entry for `key` is replaced in place; otherwise
/// the entry is appended.
pub fn stamp_marker(env: &mut Vec<String>, key: &str, value: &str) -> bool {
    let entry = format!("{key}={value}");
    let existing = env
        .iter()
        .position(|e| e.split_once('=').map_or(e.as_str(), |(k, _)| k) == key);

    match existing {
        Some(i) if env[i] == entry => false,
        Some(i) => {
            env[i] = entry;
            true
        }
        None => {
            env.push(entry);
            true
        }
    }
}
