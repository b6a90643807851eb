//! Java trust store ("cacerts") discovery.
//!
//! Search order:
//! 1. Under the Java home (symlinks resolved on the home itself):
//!    a) a symlink named `cacerts` pointing at a regular file (target returned)
//!    b) a regular file named `cacerts`
//!    c) `lib/security/cacerts`, then `jre/lib/security/cacerts`
//! 2. Known system paths (RHEL/CentOS, then Debian/Ubuntu)
//!
//! Tree walks are depth-first and visit directory entries in byte-lexical
//! order, so the first match is stable when several files qualify.

use crate::error::{Result, RuntimeError};
use crate::sys::{self, Walk};
use std::fs;
use std::path::{Path, PathBuf};

/// RHEL/CentOS extracted Java trust store.
pub const RHEL_CACERTS: &str = "/etc/pki/ca-trust/extracted/java/cacerts";

/// Debian/Ubuntu Java trust store.
pub const DEBIAN_CACERTS: &str = "/etc/ssl/certs/java/cacerts";

const CACERTS: &str = "cacerts";

/// Options for [`find_cacerts`].
#[derive(Debug, Clone, Default)]
pub struct CaCertsOptions {
    /// System fallback paths, in order. `None` uses [`default_system_paths`];
    /// an empty list disables the fallback.
    pub known_system_paths: Option<Vec<PathBuf>>,
}

impl CaCertsOptions {
    /// Options with an explicit fallback list.
    pub fn with_system_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            known_system_paths: Some(paths),
        }
    }

    /// Options with no system fallback.
    pub fn no_system_paths() -> Self {
        Self::with_system_paths(Vec::new())
    }

    fn system_paths(&self) -> Vec<PathBuf> {
        self.known_system_paths
            .clone()
            .unwrap_or_else(default_system_paths)
    }
}

/// The standard system trust store locations.
pub fn default_system_paths() -> Vec<PathBuf> {
    vec![PathBuf::from(RHEL_CACERTS), PathBuf::from(DEBIAN_CACERTS)]
}

/// Locate the Java trust store for `java_home` (may be empty).
///
/// # Errors
///
/// Returns `CaCertsEmptyHome` when `java_home` is empty and no system path
/// exists, and `CaCertsNotFound` when a home was searched without success.
pub fn find_cacerts(java_home: &Path, options: &CaCertsOptions) -> Result<PathBuf> {
    if let Some(found) = find_in_java_home(java_home) {
        return Ok(found);
    }

    if let Some(found) = options
        .system_paths()
        .into_iter()
        .find(|p| sys::is_file(p))
    {
        tracing::debug!(path = %found.display(), "using system cacerts");
        return Ok(found);
    }

    if java_home.as_os_str().is_empty() {
        return Err(RuntimeError::CaCertsEmptyHome);
    }
    Err(RuntimeError::CaCertsNotFound {
        home: java_home.to_path_buf(),
    })
}

fn find_in_java_home(java_home: &Path) -> Option<PathBuf> {
    if java_home.as_os_str().is_empty() {
        return None;
    }
    let home = sys::resolve_or_keep(java_home);

    find_symlink_named_cacerts(&home)
        .or_else(|| find_file_named_cacerts(&home))
        .or_else(|| first_existing_common_cacerts(&home))
}

fn is_cacerts_name(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().eq_ignore_ascii_case(CACERTS))
}

/// First symlink named `cacerts` whose target is a regular file.
fn find_symlink_named_cacerts(root: &Path) -> Option<PathBuf> {
    let mut found = None;
    sys::walk(root, &mut |path, file_type| {
        if file_type.is_some_and(|t| t.is_symlink()) && is_cacerts_name(path) {
            if let Ok(target) = fs::canonicalize(path) {
                if sys::is_file(&target) {
                    found = Some(target);
                    return Walk::Stop;
                }
            }
        }
        Walk::Continue
    });
    found
}

/// First regular file named `cacerts`.
fn find_file_named_cacerts(root: &Path) -> Option<PathBuf> {
    let mut found = None;
    sys::walk(root, &mut |path, file_type| {
        if file_type.is_some_and(|t| t.is_file()) && is_cacerts_name(path) {
            found = Some(path.to_path_buf());
            return Walk::Stop;
        }
        Walk::Continue
    });
    found
}

fn first_existing_common_cacerts(home: &Path) -> Option<PathBuf> {
    let candidates = [
        home.join("lib").join("security").join(CACERTS),
        home.join("jre").join("lib").join("security").join(CACERTS),
    ];
    for candidate in candidates {
        if sys::is_symlink(&candidate) {
            if let Ok(resolved) = fs::canonicalize(&candidate) {
                if sys::is_file(&resolved) {
                    return Some(resolved);
                }
            }
        }
        if sys::is_file(&candidate) {
            return Some(candidate);
        }
    }
    None
}
