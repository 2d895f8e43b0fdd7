//! Directory-scanned asset packs.
//!
//! Every file under `input` whose path matches `pattern` is published to the
//! mirrored location under `output`:
//!
//! ```text
//! assets/img/logo.png   → public/img/logo.png → logo.<md5>.png
//! assets/img/a/b.svg    → public/img/a/b.svg  → b.<md5>.svg
//! ```

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use jwalk::WalkDir;

use super::{apply_filters, hash_suffix};
use crate::debug;
use crate::dumper::{Dumper, FileDumper};
use crate::error::{Error, IoContext, Result};
use crate::manager::Filter;
use crate::path::{absolute, add_file_suffix, rewrite_path};
use crate::pattern::Pattern;
use crate::resource::{Resource, SharedAlteration, alter_all};

/// All files of a directory, filtered by pattern, sharing one alteration chain.
#[derive(Debug, Clone)]
pub struct AssetPack {
    pub input: PathBuf,
    pub output: PathBuf,
    pub pattern: Pattern,
    pub alterations: Vec<SharedAlteration>,
    dumper: Arc<dyn Dumper>,
}

impl AssetPack {
    /// Pack every file of `input`, mirrored under `output`.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            pattern: Pattern::default(),
            alterations: Vec::new(),
            dumper: Arc::new(FileDumper),
        }
    }

    /// Only keep input files whose path matches `pattern`.
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Append an alteration applied to every member, in declared order.
    pub fn with_alteration(mut self, alteration: SharedAlteration) -> Self {
        self.alterations.push(alteration);
        self
    }

    /// Replace the default [`FileDumper`].
    pub fn with_dumper(mut self, dumper: Arc<dyn Dumper>) -> Self {
        self.dumper = dumper;
        self
    }

    pub fn rewrite_paths(&self, input: &Path, output: &Path) -> Self {
        Self {
            input: rewrite_path(input, &self.input),
            output: rewrite_path(output, &self.output),
            pattern: self.pattern.clone(),
            alterations: self.alterations.clone(),
            dumper: Arc::clone(&self.dumper),
        }
    }

    /// Every non-directory entry under `input` matching the pattern.
    ///
    /// Entries are sorted per directory so the order is stable across runs.
    /// Hidden files are members like any other.
    pub fn input_files(&self) -> Result<Vec<PathBuf>> {
        let is_dir = fs::metadata(&self.input).is_ok_and(|meta| meta.is_dir());
        if !is_dir {
            return Err(Error::NotADirectory(self.input.clone()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.input).sort(true).skip_hidden(false) {
            let entry = entry.map_err(|source| Error::Walk {
                path: self.input.clone(),
                source,
            })?;
            if entry.file_type().is_dir() {
                continue;
            }
            let path = entry.path();
            if self.pattern.matches(&path.to_string_lossy()) {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// Output path of the member `filename`, with `suffix` before its extension.
    ///
    /// Fails when `filename` does not live under `input`.
    pub fn output_file(&self, filename: &Path, suffix: &str) -> Result<PathBuf> {
        let filename = absolute(filename).at(filename)?;
        let input = absolute(&self.input).at(&self.input)?;
        let rel = filename
            .strip_prefix(&input)
            .map_err(|_| Error::NotUnderInput {
                input: self.input.clone(),
                path: filename.clone(),
            })?;
        Ok(add_file_suffix(self.output.join(rel), suffix))
    }

    /// Stable path of a member given relative to the pack root.
    ///
    /// Pure path arithmetic: the member does not have to exist. A leading
    /// `/` is read as the pack root, not the filesystem root.
    pub fn symlink(&self, member: &Path) -> Result<PathBuf> {
        let rel: PathBuf = member
            .components()
            .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
            .collect();
        absolute(rewrite_path(&self.output, rel)).at(&self.output)
    }

    /// Publish every member. The first failing file aborts the whole pack.
    pub fn dump(&self, filters: &[Filter]) -> Result<usize> {
        let files = self.input_files()?;
        debug!("pack"; "{}: {} file(s)", self.input.display(), files.len());

        for filename in &files {
            let raw = Resource::bytes(fs::read(filename).at(filename)?);
            let altered = alter_all(&raw, &self.alterations)?;

            let stable = self.output_file(filename, "")?;
            let resource = apply_filters(&altered, &stable, filters)?;
            let content = resource.dump()?;

            let hashed = self.output_file(filename, &hash_suffix(&content))?;
            self.dumper.dump(&hashed, &stable, &content)?;
        }
        Ok(files.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::testing::{RecordingDumper, reverse_filter, upper};
    use crate::path::md5_hex;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        fs::create_dir_all(input.join("subDir")).unwrap();
        fs::write(input.join("a1"), "pack-a1").unwrap();
        fs::write(input.join("subDir/a2.ext"), "pack-a2").unwrap();
        fs::write(input.join(".hidden.ext"), "dot").unwrap();
        dir
    }

    #[test]
    fn test_input_files_sorted_and_filtered() {
        let dir = fixture();
        let input = dir.path().join("in");

        let all = AssetPack::new(&input, "out").input_files().unwrap();
        assert_eq!(
            all,
            vec![
                input.join(".hidden.ext"),
                input.join("a1"),
                input.join("subDir/a2.ext"),
            ]
        );

        let ext = AssetPack::new(&input, "out")
            .with_pattern(Pattern::new(r"a\d\.ext$"))
            .input_files()
            .unwrap();
        assert_eq!(ext, vec![input.join("subDir/a2.ext")]);
    }

    #[test]
    fn test_input_files_not_a_directory() {
        let dir = fixture();
        let err = AssetPack::new(dir.path().join("in/a1"), "out")
            .input_files()
            .unwrap_err();
        assert!(matches!(err, Error::NotADirectory(_)));

        let err = AssetPack::new(dir.path().join("missing"), "out")
            .input_files()
            .unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }

    #[test]
    fn test_output_file() {
        let pack = AssetPack::new("/in/js", "/out/js");
        assert_eq!(
            pack.output_file(Path::new("/in/js/lib/app.js"), ".v2").unwrap(),
            Path::new("/out/js/lib/app.v2.js")
        );
        assert_eq!(
            pack.output_file(Path::new("/in/js/README"), "").unwrap(),
            Path::new("/out/js/README")
        );
    }

    #[test]
    fn test_output_file_outside_input() {
        let pack = AssetPack::new("/in/js", "/out/js");
        let err = pack
            .output_file(Path::new("/elsewhere/app.js"), "")
            .unwrap_err();
        assert!(matches!(err, Error::NotUnderInput { .. }));

        // Sibling directory sharing a textual prefix is not under the input
        assert!(pack.output_file(Path::new("/in/jsx/app.js"), "").is_err());
    }

    #[test]
    fn test_symlink() {
        let pack = AssetPack::new("/in", "/out/dirOut");
        assert_eq!(
            pack.symlink(Path::new("subDir/a2.ext")).unwrap(),
            Path::new("/out/dirOut/subDir/a2.ext")
        );
        assert_eq!(
            pack.symlink(Path::new("/js/app.js")).unwrap(),
            Path::new("/out/dirOut/js/app.js")
        );
        assert_eq!(pack.symlink(Path::new("")).unwrap(), Path::new("/out/dirOut"));
    }

    #[test]
    fn test_debug_names_alterations() {
        let pack = AssetPack::new("/in", "/out")
            .with_alteration(Arc::new(crate::alteration::MinifyCss))
            .with_alteration(upper());
        let debug = format!("{pack:?}");
        assert!(debug.contains("[minify-css, alteration]"), "{debug}");
    }

    #[test]
    fn test_rewrite_paths_keeps_absolute() {
        let pack = AssetPack::new("dirIn", "/abs/out").with_alteration(upper());
        let rewritten = pack.rewrite_paths(Path::new("/base/in"), Path::new("/base/out"));
        assert_eq!(rewritten.input, Path::new("/base/in/dirIn"));
        assert_eq!(rewritten.output, Path::new("/abs/out"));
        assert_eq!(rewritten.alterations.len(), 1);
        assert_eq!(pack.input, Path::new("dirIn"));
    }

    #[test]
    fn test_dump_alterations_then_filters() {
        let dir = fixture();
        let dumper = Arc::new(RecordingDumper::default());
        let pack = AssetPack::new(dir.path().join("in"), "/out")
            .with_pattern(Pattern::new(r"/(a1|subDir/a2\.ext)$"))
            .with_alteration(upper())
            .with_dumper(dumper.clone());

        let count = pack
            .dump(&[reverse_filter(Pattern::extensions(["ext"]))])
            .unwrap();
        assert_eq!(count, 2);

        let calls = dumper.calls.lock();
        assert_eq!(calls[0].1, Path::new("/out/a1"));
        assert_eq!(calls[0].2, b"PACK-A1");
        assert_eq!(
            calls[0].0,
            PathBuf::from(format!("/out/a1.{}", md5_hex(b"PACK-A1")))
        );

        assert_eq!(calls[1].1, Path::new("/out/subDir/a2.ext"));
        assert_eq!(calls[1].2, b"2A-KCAP");
        assert_eq!(
            calls[1].0,
            PathBuf::from(format!("/out/subDir/a2.{}.ext", md5_hex(b"2A-KCAP")))
        );
    }

    #[test]
    fn test_dump_fails_fast() {
        let dir = fixture();
        let dumper = Arc::new(RecordingDumper::default());
        let failing: SharedAlteration = Arc::new(|r: &Resource| -> Result<Resource> {
            if r.dump()? == b"pack-a1" {
                return Err(Error::Alteration {
                    name: "test",
                    message: "refused".to_string(),
                });
            }
            Ok(r.clone())
        });
        let pack = AssetPack::new(dir.path().join("in"), "/out")
            .with_alteration(failing)
            .with_dumper(dumper.clone());

        assert!(pack.dump(&[]).is_err());
        // `.hidden.ext` sorts first and went through before `a1` failed
        assert_eq!(dumper.calls.lock().len(), 1);
    }
}
