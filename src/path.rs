//! Lexical path helpers shared by assets and the manager.
//!
//! Everything here is pure string/path arithmetic: nothing touches the
//! filesystem except [`absolute`], which only reads the working directory.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use md5::{Digest, Md5};

/// Lexically normalize a path.
///
/// Removes redundant separators and `.` segments and resolves `..` against
/// preceding normal segments. `..` above the root is dropped, `..` at the
/// start of a relative path is kept. An empty result becomes `.`.
pub fn clean(path: impl AsRef<Path>) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Anchor `current` under `base` when it is relative.
///
/// Absolute paths (or an empty `base`) are only cleaned.
pub fn rewrite_path(base: impl AsRef<Path>, current: impl AsRef<Path>) -> PathBuf {
    let (base, current) = (base.as_ref(), current.as_ref());
    if base.as_os_str().is_empty() || current.is_absolute() {
        clean(current)
    } else {
        clean(base.join(current))
    }
}

/// Insert `suffix` right before the extension of `filename`.
///
/// The extension starts at the last `.` of the file name, so a dotfile such
/// as `.htaccess` is all extension. Without a `.` the suffix is appended.
/// The result is cleaned.
///
/// ```ignore
/// assert_eq!(add_file_suffix("test/myfile.test", "SUFFIX"), Path::new("test/myfileSUFFIX.test"));
/// assert_eq!(add_file_suffix("myfile", "X"), Path::new("myfileX"));
/// assert_eq!(add_file_suffix(".htaccess", "X"), Path::new("X.htaccess"));
/// ```
pub fn add_file_suffix(filename: impl AsRef<Path>, suffix: &str) -> PathBuf {
    let filename = filename.as_ref();
    let Some(file_name) = filename.file_name() else {
        // `/`, `..` or empty: nothing to suffix
        return clean(filename);
    };

    let mut name = OsString::new();
    match file_name.to_str().and_then(|s| s.rfind('.').map(|i| s.split_at(i))) {
        Some((stem, ext)) => {
            name.push(stem);
            name.push(suffix);
            name.push(ext);
        }
        None => {
            name.push(file_name);
            name.push(suffix);
        }
    }

    let dir = filename.parent().unwrap_or_else(|| Path::new(""));
    clean(dir.join(name))
}

/// Make `path` absolute against the working directory, then clean it.
pub fn absolute(path: impl AsRef<Path>) -> std::io::Result<PathBuf> {
    let path = path.as_ref();
    if path.is_absolute() {
        Ok(clean(path))
    } else {
        Ok(clean(std::env::current_dir()?.join(path)))
    }
}

/// Hex-encoded MD5 digest of `content`.
pub fn md5_hex(content: &[u8]) -> String {
    hex::encode(Md5::digest(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean() {
        assert_eq!(clean("a//b/./c/"), Path::new("a/b/c"));
        assert_eq!(clean("a/b/../c"), Path::new("a/c"));
        assert_eq!(clean("/../a"), Path::new("/a"));
        assert_eq!(clean("../a"), Path::new("../a"));
        assert_eq!(clean("./"), Path::new("."));
        assert_eq!(clean(""), Path::new("."));
    }

    #[test]
    fn test_rewrite_path() {
        assert_eq!(rewrite_path("test", "/absolute"), Path::new("/absolute"));
        assert_eq!(rewrite_path("test", "////absolute/"), Path::new("/absolute"));
        assert_eq!(rewrite_path("test", "absolute"), Path::new("test/absolute"));
        assert_eq!(rewrite_path("/test", "absolute"), Path::new("/test/absolute"));
        assert_eq!(
            rewrite_path("./test////", "absolute////"),
            Path::new("test/absolute")
        );
        assert_eq!(rewrite_path("", "a/./b"), Path::new("a/b"));
    }

    #[test]
    fn test_add_file_suffix() {
        assert_eq!(add_file_suffix("myfile", "SUFFIX"), Path::new("myfileSUFFIX"));
        assert_eq!(
            add_file_suffix(".////myfile", "SUFFIX"),
            Path::new("myfileSUFFIX")
        );
        assert_eq!(
            add_file_suffix("test/myfile.test", "SUFFIX"),
            Path::new("test/myfileSUFFIX.test")
        );
        assert_eq!(add_file_suffix("/out/a.tar.gz", ".v1"), Path::new("/out/a.tar.v1.gz"));
        assert_eq!(add_file_suffix("/out/a1", ""), Path::new("/out/a1"));
    }

    #[test]
    fn test_add_file_suffix_dotfiles() {
        assert_eq!(add_file_suffix("/out/.htaccess", ".X"), Path::new("/out/.X.htaccess"));
        assert_eq!(
            add_file_suffix("/out/.hidden.ext", ".X"),
            Path::new("/out/.hidden.X.ext")
        );
        assert_eq!(add_file_suffix("/out/name.", "X"), Path::new("/out/nameX."));
    }

    #[test]
    fn test_absolute() {
        let abs = absolute("some/../rel").unwrap();
        assert!(abs.is_absolute());
        assert!(abs.ends_with("rel"));
        assert_eq!(absolute("/x/./y").unwrap(), Path::new("/x/y"));
    }

    #[test]
    fn test_md5_hex() {
        assert_eq!(md5_hex(b"testMd5"), "ef8efa55f449e3727c4df433ce7744c5");
        assert_eq!(md5_hex(b"pack-a1"), "df54fa5f220b244f5ed919c871fe56f0");
    }
}
