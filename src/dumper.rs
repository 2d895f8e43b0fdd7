//! Persisting published artifacts.
//!
//! Each artifact lands at its content-addressed path, and the stable path is
//! a symlink pointing at it:
//!
//! ```text
//! public/js/app.js                       → app.0cc175b9c0f1b6a831c399e269772661.js
//! public/js/app.0cc175b9c0f1b6a831c399e269772661.js
//! ```
//!
//! Both steps go through a temporary entry plus `rename`, so a concurrent
//! reader of the stable path sees either the previous artifact or the new
//! one, never a missing link or a half-written file.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::NamedTempFile;

use crate::debug;
use crate::error::{Error, IoContext, Result};

/// Persists final bytes and exposes them under a stable name.
pub trait Dumper: Send + Sync + fmt::Debug {
    /// Write `data` at `hashed`, then point `stable` at it.
    fn dump(&self, hashed: &Path, stable: &Path, data: &[u8]) -> Result<()>;
}

/// Filesystem dumper: content-addressed file + stable symlink.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDumper;

impl Dumper for FileDumper {
    fn dump(&self, hashed: &Path, stable: &Path, data: &[u8]) -> Result<()> {
        write_atomic(hashed, data)?;
        relink(hashed, stable)?;
        debug!("dump"; "{} -> {}", stable.display(), hashed.display());
        Ok(())
    }
}

/// Parent directory of `path`, `.` for bare file names.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Write through a sibling temp file, then rename into place.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = parent_dir(path);
    fs::create_dir_all(dir).at(dir)?;

    let mut tmp = NamedTempFile::new_in(dir).at(dir)?;
    tmp.write_all(data).at(path)?;
    set_readable(tmp.as_file()).at(path)?;
    tmp.persist(path).map_err(|err| Error::io(path, err.error))?;
    Ok(())
}

#[cfg(unix)]
fn set_readable(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_readable(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

/// Point `stable` at `hashed`, replacing whatever was there.
///
/// The link target is the bare file name when both live in the same
/// directory, which keeps the output tree relocatable.
fn relink(hashed: &Path, stable: &Path) -> Result<()> {
    static SEQ: AtomicUsize = AtomicUsize::new(0);

    let dir = parent_dir(stable);
    fs::create_dir_all(dir).at(dir)?;

    let target: PathBuf = match hashed.file_name() {
        Some(name) if parent_dir(hashed) == dir => PathBuf::from(name),
        _ => hashed.to_path_buf(),
    };

    let stem = stable
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_link = dir.join(format!(
        ".{stem}.{}-{}.link",
        std::process::id(),
        SEQ.fetch_add(1, Ordering::Relaxed)
    ));

    symlink(&target, &tmp_link).at(&tmp_link)?;
    if let Err(err) = fs::rename(&tmp_link, stable) {
        let _ = fs::remove_file(&tmp_link);
        return Err(Error::io(stable, err));
    }
    Ok(())
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
