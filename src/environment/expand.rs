//! Path expansion: a leading `~` and `$VAR` / `${VAR}` references.

use super::provider::EnvProvider;
use regex::{Captures, Regex};
use std::path::PathBuf;
use std::sync::OnceLock;

fn env_reference() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([^}]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("valid env reference regex")
    })
}

/// Expand a configured path.
///
/// A leading `~` is replaced with the provider's home directory (left as-is
/// when no home is known). Variable references are then substituted; unset
/// variables expand to the empty string.
///
/// # Example
///
/// ```
/// use runtime_utils::environment::{expand_path, MapEnv};
///
/// let env = MapEnv::new()
///     .with_home("/home/svc")
///     .with_var("JDK", "jdk-17");
/// assert_eq!(expand_path("~/jvm/${JDK}", &env), "/home/svc/jvm/jdk-17");
/// assert_eq!(expand_path("/opt/$JDK/bin", &env), "/opt/jdk-17/bin");
/// ```
pub fn expand_path(raw: &str, env: &dyn EnvProvider) -> String {
    let mut path = raw.to_string();
    if let Some(rest) = raw.strip_prefix('~') {
        if let Some(home) = env.home_dir() {
            let rest = rest.trim_start_matches('/');
            let joined: PathBuf = if rest.is_empty() {
                home
            } else {
                home.join(rest)
            };
            path = joined.to_string_lossy().into_owned();
        }
    }
    expand_env(&path, env)
}

/// Substitute `$VAR` and `${VAR}` references.
pub fn expand_env(input: &str, env: &dyn EnvProvider) -> String {
    env_reference()
        .replace_all(input, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            env.var(name).unwrap_or_default()
        })
        .into_owned()
}
