//! Path resolution for a single [`RuntimeSetting`].
//!
//! Three strategies are tried in a fixed order and the first success wins:
//!
//! 1. `override_path`
//! 2. the directory named by `env_var`
//! 3. each entry of `paths`, as a literal directory or a glob pattern
//!
//! A literal entry is probed exactly once. Only entries that already contain
//! glob metacharacters are expanded, and their matches are tried in
//! descending lexical order.

use crate::config::RuntimeSetting;
use crate::environment::{expand_path, EnvProvider};
use crate::sys;
use std::path::PathBuf;

/// Check the expanded `override_path`.
pub fn try_override_path(
    setting: &RuntimeSetting,
    exe: &str,
    env: &dyn EnvProvider,
) -> Option<PathBuf> {
    let raw = setting.override_path.as_deref().filter(|p| !p.is_empty())?;
    let path = PathBuf::from(expand_path(raw, env));
    if sys::has_bin(&path, exe) {
        tracing::debug!(path = %path.display(), "override_path matched");
        return Some(path);
    }
    tracing::debug!(path = %path.display(), exe, "override_path has no bin/{}", exe);
    None
}

/// Check the directory stored in the environment variable `env_var`.
///
/// An unset or empty variable is skipped. The value is expanded before
/// checking.
pub fn try_env_var(setting: &RuntimeSetting, exe: &str, env: &dyn EnvProvider) -> Option<PathBuf> {
    let var = setting.env_var.as_deref().filter(|v| !v.is_empty())?;
    let raw = env.var(var).filter(|v| !v.is_empty())?;
    let path = PathBuf::from(expand_path(&raw, env));
    if sys::has_bin(&path, exe) {
        tracing::debug!(var, path = %path.display(), "env_var matched");
        return Some(path);
    }
    tracing::debug!(var, path = %path.display(), "env_var points at no runtime");
    None
}

/// Try each entry of `paths` in order.
pub fn try_paths(setting: &RuntimeSetting, exe: &str, env: &dyn EnvProvider) -> Option<PathBuf> {
    setting
        .paths
        .iter()
        .find_map(|pattern| try_path_pattern(&expand_path(pattern, env), exe))
}

/// Probe one expanded `paths` entry.
fn try_path_pattern(pattern: &str, exe: &str) -> Option<PathBuf> {
    if !sys::has_glob_meta(pattern) {
        let path = PathBuf::from(pattern);
        return sys::has_bin(&path, exe).then_some(path);
    }

    let mut candidates = sys::glob(pattern);
    sys::sort_descending_lexical(&mut candidates);
    tracing::debug!(pattern, count = candidates.len(), "glob candidates");
    candidates
        .into_iter()
        .find(|candidate| sys::exists_in_bin(candidate, exe))
}

/// Apply all strategies in order: override path, env var, paths.
///
/// Returns the first valid runtime home, or `None` if no strategy matched.
pub fn detect_path(setting: &RuntimeSetting, exe: &str, env: &dyn EnvProvider) -> Option<PathBuf> {
    try_override_path(setting, exe, env)
        .or_else(|| try_env_var(setting, exe, env))
        .or_else(|| try_paths(setting, exe, env))
}
