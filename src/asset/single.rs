//! One resource published to one output path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{apply_filters, publish};
use crate::dumper::{Dumper, FileDumper};
use crate::error::{IoContext, Result};
use crate::manager::Filter;
use crate::path::{absolute, add_file_suffix, rewrite_path};
use crate::resource::Resource;

/// A single resource dumped to `output`.
///
/// Alterations specific to this asset are expressed in the resource itself
/// (see [`Resource::altered`]).
#[derive(Debug, Clone)]
pub struct SingleAsset {
    pub input: Resource,
    pub output: PathBuf,
    dumper: Arc<dyn Dumper>,
}

impl SingleAsset {
    pub fn new(input: Resource, output: impl Into<PathBuf>) -> Self {
        Self {
            input,
            output: output.into(),
            dumper: Arc::new(FileDumper),
        }
    }

    /// Replace the default [`FileDumper`].
    pub fn with_dumper(mut self, dumper: Arc<dyn Dumper>) -> Self {
        self.dumper = dumper;
        self
    }

    /// Absolute output path with `suffix` inserted before the extension.
    pub fn output_file(&self, suffix: &str) -> Result<PathBuf> {
        let output = absolute(&self.output).at(&self.output)?;
        Ok(add_file_suffix(output, suffix))
    }

    pub fn rewrite_paths(&self, input: &Path, output: &Path) -> Self {
        Self {
            input: self.input.in_dir(input),
            output: rewrite_path(output, &self.output),
            dumper: Arc::clone(&self.dumper),
        }
    }

    /// Apply matching filters, hash, and persist.
    pub fn dump(&self, filters: &[Filter]) -> Result<usize> {
        let stable = self.output_file("")?;
        let resource = apply_filters(&self.input, &stable, filters)?;
        let content = resource.dump()?;
        publish(self.dumper.as_ref(), &stable, &content)?;
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::testing::{RecordingDumper, reverse, reverse_filter, upper};
    use crate::pattern::Pattern;
    use crate::path::md5_hex;

    #[test]
    fn test_output_file() {
        let asset = SingleAsset::new(Resource::empty(), "/out/css/site.css");
        assert_eq!(
            asset.output_file(".abc").unwrap(),
            Path::new("/out/css/site.abc.css")
        );
        assert_eq!(asset.output_file("").unwrap(), Path::new("/out/css/site.css"));
    }

    #[test]
    fn test_rewrite_paths() {
        let asset = SingleAsset::new(Resource::file("js/app.js"), "app.js");
        let rewritten = asset.rewrite_paths(Path::new("/in"), Path::new("/out"));

        assert_eq!(rewritten.output, Path::new("/out/app.js"));
        assert_eq!(rewritten.input.path(), Some(Path::new("/in/js/app.js")));
        // Original untouched
        assert_eq!(asset.output, Path::new("app.js"));
        assert_eq!(asset.input.path(), Some(Path::new("js/app.js")));
    }

    #[test]
    fn test_dump_applies_matching_filters() {
        let dumper = Arc::new(RecordingDumper::default());
        let asset = SingleAsset::new(Resource::string("single"), "/out/single.ext")
            .with_dumper(dumper.clone());

        let filters = [
            reverse_filter(Pattern::extensions(["ext"])),
            Filter::new(Pattern::extensions(["css"]), upper()),
        ];
        assert_eq!(asset.dump(&filters).unwrap(), 1);

        let calls = dumper.calls.lock();
        let (hashed, stable, data) = &calls[0];
        assert_eq!(data, b"elgnis");
        assert_eq!(stable, Path::new("/out/single.ext"));
        assert_eq!(
            hashed,
            &PathBuf::from(format!("/out/single.{}.ext", md5_hex(b"elgnis")))
        );
    }

    #[test]
    fn test_dump_altered_input() {
        let dumper = Arc::new(RecordingDumper::default());
        let input = Resource::altered(Resource::string("abc"), [upper(), reverse()]);
        let asset = SingleAsset::new(input, "/out/x").with_dumper(dumper.clone());

        asset.dump(&[]).unwrap();
        assert_eq!(dumper.calls.lock()[0].2, b"CBA");
    }

    #[test]
    fn test_dump_propagates_resource_error() {
        let dumper = Arc::new(RecordingDumper::default());
        let asset = SingleAsset::new(Resource::file("/nonexistent/statix/in.js"), "/out/in.js")
            .with_dumper(dumper.clone());

        assert!(asset.dump(&[]).is_err());
        assert!(dumper.calls.lock().is_empty());
    }
}
