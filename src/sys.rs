//! Filesystem primitives: glob expansion, ordered tree walks, and the
//! `bin/<exe>` probes used by runtime detection.
//!
//! Everything here is read-only and synchronous. Directory listings are
//! always sorted by byte-lexical file name so that searches which stop at
//! the first match are deterministic across platforms.

use std::fs;
use std::path::{Component, Path, PathBuf};

/// Characters that turn a path pattern into a glob.
pub const GLOB_META: &[char] = &['*', '?', '['];

/// Check whether a pattern contains glob metacharacters.
pub fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(GLOB_META)
}

/// Check whether `path` is a regular file, following symlinks.
pub fn is_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Check whether `path` itself is a symbolic link.
pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Resolve all symlinks in `path`, keeping the original on failure.
pub fn resolve_or_keep(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Check whether `<dir>/bin/<exe>` exists as a regular file.
pub fn has_bin(dir: &Path, exe: &str) -> bool {
    is_file(&dir.join("bin").join(exe))
}

/// Search `root` and every directory below it for `bin/<exe>`.
///
/// The root is followed if it is a symlink; symlinked directories below it
/// are not descended.
pub fn exists_in_bin(root: &Path, exe: &str) -> bool {
    if !root.is_dir() {
        return false;
    }
    let mut found = false;
    walk(root, &mut |path, file_type| {
        if (file_type.is_none() || file_type.is_some_and(|t| t.is_dir()))
            && has_bin(path, exe)
        {
            found = true;
            return Walk::Stop;
        }
        Walk::Continue
    });
    found
}

/// Control value returned by [`walk`] visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Continue,
    Stop,
}

/// Depth-first, pre-order walk of `root`.
///
/// The visitor receives each path with its (non-followed) file type; the
/// root itself is visited first with `None`. Entries of a directory are
/// visited in ascending byte-lexical order of their names. Unreadable
/// directories are skipped. Returns [`Walk::Stop`] if the visitor stopped
/// the walk.
pub fn walk<F>(root: &Path, visit: &mut F) -> Walk
where
    F: FnMut(&Path, Option<fs::FileType>) -> Walk,
{
    if visit(root, None) == Walk::Stop {
        return Walk::Stop;
    }
    walk_dir(root, visit)
}

fn walk_dir<F>(dir: &Path, visit: &mut F) -> Walk
where
    F: FnMut(&Path, Option<fs::FileType>) -> Walk,
{
    for (path, file_type) in sorted_entries(dir) {
        if visit(&path, Some(file_type)) == Walk::Stop {
            return Walk::Stop;
        }
        if file_type.is_dir() && walk_dir(&path, visit) == Walk::Stop {
            return Walk::Stop;
        }
    }
    Walk::Continue
}

fn sorted_entries(dir: &Path) -> Vec<(PathBuf, fs::FileType)> {
    let Ok(read) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut entries: Vec<_> = read
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_type().ok().map(|t| (e.file_name(), e.path(), t)))
        .collect();
    entries.sort_by(|a, b| a.0.as_encoded_bytes().cmp(b.0.as_encoded_bytes()));
    entries.into_iter().map(|(_, p, t)| (p, t)).collect()
}

/// Expand a glob pattern into the existing paths it matches.
///
/// Supports `*`, `?` and `[...]` classes (ranges, `^`/`!` negation) within
/// single path components; wildcards never match `/`. Malformed patterns
/// match nothing. Results come back in no particular order.
pub fn glob(pattern: &str) -> Vec<PathBuf> {
    let path = Path::new(pattern);
    let mut current: Vec<PathBuf> = vec![PathBuf::new()];

    for component in path.components() {
        let part = match component {
            Component::Normal(p) => p.to_string_lossy().into_owned(),
            other => {
                for base in &mut current {
                    base.push(other.as_os_str());
                }
                continue;
            }
        };

        if !has_glob_meta(&part) {
            for base in &mut current {
                base.push(&part);
            }
            continue;
        }

        let mut next = Vec::new();
        for base in &current {
            let dir = if base.as_os_str().is_empty() {
                Path::new(".")
            } else {
                base.as_path()
            };
            let Ok(read) = fs::read_dir(dir) else {
                continue;
            };
            for entry in read.filter_map(|e| e.ok()) {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if matches_component(&part, &name) == Some(true) {
                    next.push(base.join(name.as_ref()));
                }
            }
        }
        current = next;
    }

    current
        .into_iter()
        .filter(|p| !p.as_os_str().is_empty() && fs::symlink_metadata(p).is_ok())
        .collect()
}

/// Match one path component against a glob component.
///
/// Returns `None` for a malformed pattern.
pub fn matches_component(pattern: &str, name: &str) -> Option<bool> {
    let tokens = compile(pattern)?;
    let name: Vec<char> = name.chars().collect();
    Some(match_tokens(&tokens, &name))
}

#[derive(Debug, PartialEq)]
enum Token {
    Star,
    Any,
    Class { negated: bool, ranges: Vec<(char, char)> },
    Literal(char),
}

impl Token {
    fn matches(&self, c: char) -> bool {
        match self {
            Self::Star | Self::Any => true,
            Self::Class { negated, ranges } => {
                ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi) != *negated
            }
            Self::Literal(l) => *l == c,
        }
    }
}

fn compile(pattern: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let token = match chars[i] {
            '*' => Token::Star,
            '?' => Token::Any,
            '\\' => {
                i += 1;
                Token::Literal(*chars.get(i)?)
            }
            '[' => {
                let (token, consumed) = compile_class(&chars[i + 1..])?;
                i += consumed;
                token
            }
            c => Token::Literal(c),
        };
        tokens.push(token);
        i += 1;
    }
    Some(tokens)
}

/// Parse a `[...]` class (with the leading `[` already consumed).
///
/// Returns the class and how many pattern chars it used.
fn compile_class(class: &[char]) -> Option<(Token, usize)> {
    let mut i = 0;
    let negated = matches!(class.first(), Some('^') | Some('!'));
    if negated {
        i += 1;
    }
    let mut ranges = Vec::new();
    let mut first = true;
    loop {
        let &lo = class.get(i)?;
        if lo == ']' && !first {
            i += 1;
            break;
        }
        first = false;
        i += 1;
        if class.get(i) == Some(&'-') && class.get(i + 1).is_some_and(|&h| h != ']') {
            ranges.push((lo, class[i + 1]));
            i += 2;
        } else {
            ranges.push((lo, lo));
        }
    }
    Some((Token::Class { negated, ranges }, i))
}

/// Iterative star matching: on a mismatch, resume after the most recent `*`
/// with one more name char absorbed by it.
fn match_tokens(tokens: &[Token], name: &[char]) -> bool {
    let (mut t, mut n) = (0, 0);
    let mut last_star: Option<(usize, usize)> = None;

    while n < name.len() {
        match tokens.get(t) {
            Some(Token::Star) => {
                last_star = Some((t, n));
                t += 1;
                continue;
            }
            Some(token) if token.matches(name[n]) => {
                t += 1;
                n += 1;
                continue;
            }
            _ => {}
        }
        match last_star {
            Some((star, absorbed)) => {
                last_star = Some((star, absorbed + 1));
                t = star + 1;
                n = absorbed + 1;
            }
            None => return false,
        }
    }
    tokens[t..].iter().all(|token| *token == Token::Star)
}

/// Sort paths by their string form, greatest first.
///
/// This is plain byte order on the rendered path, so `jdk-9` sorts above
/// `jdk-17`.
pub fn sort_descending_lexical(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| {
        b.to_string_lossy()
            .as_bytes()
            .cmp(a.to_string_lossy().as_bytes())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_runtime(base: &Path, name: &str, exe: &str) -> PathBuf {
        let dir = base.join(name);
        fs::create_dir_all(dir.join("bin")).unwrap();
        fs::write(dir.join("bin").join(exe), "").unwrap();
        dir
    }

    #[test]
    fn has_glob_meta_detects_metacharacters() {
        assert!(has_glob_meta("/usr/lib/jvm/jdk-17*"));
        assert!(has_glob_meta("/opt/py3.?"));
        assert!(has_glob_meta("/opt/[ab]"));
        assert!(!has_glob_meta("/usr/lib/jvm/jdk-17"));
    }

    #[test]
    fn matches_component_star_and_question() {
        assert_eq!(matches_component("jdk-17*", "jdk-17.0.8"), Some(true));
        assert_eq!(matches_component("jdk-17*", "jdk-11"), Some(false));
        assert_eq!(matches_component("py3.?", "py3.9"), Some(true));
        assert_eq!(matches_component("py3.?", "py3.10"), Some(false));
        assert_eq!(matches_component("*", ""), Some(true));
    }

    #[test]
    fn matches_component_classes() {
        assert_eq!(matches_component("jdk[0-9]", "jdk8"), Some(true));
        assert_eq!(matches_component("jdk[^0-9]", "jdk8"), Some(false));
        assert_eq!(matches_component("jdk[!a]", "jdkb"), Some(true));
        assert_eq!(matches_component("[]]x", "]x"), Some(true));
    }

    #[test]
    fn matches_component_many_stars_is_linear() {
        let name = "a".repeat(120);
        let start = std::time::Instant::now();
        assert_eq!(matches_component("*a*a*a*a*a*a*b", &name), Some(false));
        assert_eq!(matches_component("*a*a*a*a*a*a*", &name), Some(true));
        assert!(start.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn matches_component_escapes_and_backtracking() {
        assert_eq!(matches_component(r"jdk\*", "jdk*"), Some(true));
        assert_eq!(matches_component(r"jdk\*", "jdk1"), Some(false));
        assert_eq!(matches_component("*-17*", "java-11-17-x"), Some(true));
        assert_eq!(matches_component("a*b?", "axxbyb"), Some(false));
        assert_eq!(matches_component("a*b?", "axbxbz"), Some(true));
        assert_eq!(matches_component("jdk\\", "jdk"), None);
    }

    #[test]
    fn matches_component_rejects_malformed_class() {
        assert_eq!(matches_component("jdk[0-9", "jdk8"), None);
    }

    #[test]
    fn glob_expands_wildcard_component() {
        let temp = TempDir::new().unwrap();
        make_runtime(temp.path(), "jdk-17.0.7", "java");
        make_runtime(temp.path(), "jdk-17.0.8", "java");
        make_runtime(temp.path(), "jdk-11", "java");

        let pattern = format!("{}/jdk-17*", temp.path().display());
        let mut found = glob(&pattern);
        found.sort();
        assert_eq!(
            found,
            vec![
                temp.path().join("jdk-17.0.7"),
                temp.path().join("jdk-17.0.8")
            ]
        );
    }

    #[test]
    fn glob_expands_middle_components() {
        let temp = TempDir::new().unwrap();
        make_runtime(&temp.path().join("a"), "venv", "python");
        make_runtime(&temp.path().join("b"), "venv", "python");

        let pattern = format!("{}/*/venv", temp.path().display());
        assert_eq!(glob(&pattern).len(), 2);
    }

    #[test]
    fn glob_returns_nothing_for_missing_literal() {
        let temp = TempDir::new().unwrap();
        let pattern = format!("{}/missing/*", temp.path().display());
        assert!(glob(&pattern).is_empty());
    }

    #[test]
    fn sort_descending_lexical_is_not_version_aware() {
        let mut paths = vec![
            PathBuf::from("/jvm/jdk-17"),
            PathBuf::from("/jvm/jdk-9"),
            PathBuf::from("/jvm/jdk-2"),
        ];
        sort_descending_lexical(&mut paths);
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/jvm/jdk-9"),
                PathBuf::from("/jvm/jdk-2"),
                PathBuf::from("/jvm/jdk-17"),
            ]
        );
    }

    #[test]
    fn exists_in_bin_checks_root_and_subtree() {
        let temp = TempDir::new().unwrap();
        let direct = make_runtime(temp.path(), "direct", "java");
        make_runtime(&temp.path().join("nested").join("deep"), "jre", "java");

        assert!(exists_in_bin(&direct, "java"));
        assert!(exists_in_bin(&temp.path().join("nested"), "java"));
        assert!(!exists_in_bin(&direct, "javac"));
        assert!(!exists_in_bin(&temp.path().join("no_such"), "java"));
    }

    #[cfg(unix)]
    #[test]
    fn is_file_and_is_symlink() {
        let temp = TempDir::new().unwrap();
        let f = temp.path().join("f");
        fs::write(&f, "x").unwrap();
        let link = temp.path().join("l");
        std::os::unix::fs::symlink(&f, &link).unwrap();

        assert!(is_file(&f));
        assert!(is_file(&link));
        assert!(is_symlink(&link));
        assert!(!is_symlink(&f));
        assert!(!is_file(temp.path()));
    }

    #[test]
    fn walk_visits_entries_in_lexical_order() {
        let temp = TempDir::new().unwrap();
        for name in ["b", "a", "c"] {
            fs::create_dir_all(temp.path().join(name)).unwrap();
        }
        fs::write(temp.path().join("a").join("z"), "").unwrap();

        let mut seen = Vec::new();
        walk(temp.path(), &mut |path, _| {
            seen.push(path.strip_prefix(temp.path()).unwrap().to_path_buf());
            Walk::Continue
        });
        assert_eq!(
            seen,
            vec![
                PathBuf::new(),
                PathBuf::from("a"),
                PathBuf::from("a/z"),
                PathBuf::from("b"),
                PathBuf::from("c"),
            ]
        );
    }
}
