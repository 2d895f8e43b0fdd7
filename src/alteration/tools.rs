//! Alterations wrapping common front-end command-line tools.
//!
//! | Tool        | Invocation                                      | Result       |
//! |-------------|-------------------------------------------------|--------------|
//! | uglifyjs    | `uglifyjs <in>`                                 | stdout       |
//! | uglifycss   | `uglifycss <in>`                                | stdout       |
//! | tsc         | `tsc --outFile <out> <in.ts>`                   | output file  |
//! | stylus      | `stylus -o <out.css> <in.styl>`                 | output file  |
//! | optipng     | `optipng -o N -clobber -out <out> -keep <in>`   | output file  |
//! | jpegoptim   | `jpegoptim [--strip-all] -m N <in.jpg>`         | input file   |
//!
//! Compilers reading whole projects (tsc, stylus) are handed file resources
//! by path so that relative imports keep resolving.

use std::path::PathBuf;

use super::command::Cmd;
use crate::error::Result;
use crate::resource::{Alteration, Resource};

fn bin_or(bin: &str, default: &str) -> PathBuf {
    PathBuf::from(if bin.is_empty() { default } else { bin })
}

/// Minify JavaScript with `uglifyjs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UglifyJs {
    pub bin: String,
}

impl UglifyJs {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl Alteration for UglifyJs {
    fn name(&self) -> &'static str {
        "uglifyjs"
    }

    fn alter(&self, resource: &Resource) -> Result<Resource> {
        Cmd::new(bin_or(&self.bin, "uglifyjs"))
            .input(resource, ".js")
            .run()
    }
}

/// Minify CSS with `uglifycss`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UglifyCss {
    pub bin: String,
}

impl UglifyCss {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl Alteration for UglifyCss {
    fn name(&self) -> &'static str {
        "uglifycss"
    }

    fn alter(&self, resource: &Resource) -> Result<Resource> {
        Cmd::new(bin_or(&self.bin, "uglifycss"))
            .input(resource, ".css")
            .run()
    }
}

/// Compile TypeScript into a single JavaScript file with `tsc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeScript {
    pub bin: String,
}

impl TypeScript {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl Alteration for TypeScript {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn alter(&self, resource: &Resource) -> Result<Resource> {
        let cmd = Cmd::new(bin_or(&self.bin, "tsc"))
            .arg("--outFile")
            .output(".js");
        match resource {
            Resource::File(path) => cmd.arg(path).run(),
            other => cmd.input(other, ".ts").run(),
        }
    }
}

/// Compile Stylus sheets to CSS.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylus {
    pub bin: String,
}

impl Stylus {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl Alteration for Stylus {
    fn name(&self) -> &'static str {
        "stylus"
    }

    fn alter(&self, resource: &Resource) -> Result<Resource> {
        let cmd = Cmd::new(bin_or(&self.bin, "stylus"))
            .arg("-o")
            .output(".css");
        match resource {
            Resource::File(path) => cmd.arg(path).run(),
            other => cmd.input(other, ".styl").run(),
        }
    }
}

/// Lossless PNG optimization. `level` ranges from 0 to 7.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptiPng {
    pub bin: String,
    pub level: u8,
}

impl OptiPng {
    pub fn new(bin: impl Into<String>, level: u8) -> Self {
        Self {
            bin: bin.into(),
            level,
        }
    }
}

impl Default for OptiPng {
    fn default() -> Self {
        Self::new("", 2)
    }
}

impl Alteration for OptiPng {
    fn name(&self) -> &'static str {
        "optipng"
    }

    fn alter(&self, resource: &Resource) -> Result<Resource> {
        // The output file already exists, so optipng must be allowed to overwrite it
        Cmd::new(bin_or(&self.bin, "optipng"))
            .args(["-o", &self.level.min(7).to_string(), "-clobber", "-out"])
            .output(".png")
            .arg("-keep")
            .input(resource, ".png")
            .run()
    }
}

/// JPEG optimization, rewriting a temporary copy in place.
///
/// `max` is the maximum quality factor (0 to 100).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegOptim {
    pub bin: String,
    /// Strip comment and Exif markers.
    pub strip_all: bool,
    pub max: u8,
}

impl JpegOptim {
    pub fn new(bin: impl Into<String>, strip_all: bool, max: u8) -> Self {
        Self {
            bin: bin.into(),
            strip_all,
            max,
        }
    }
}

impl Default for JpegOptim {
    fn default() -> Self {
        Self::new("", true, 85)
    }
}

impl Alteration for JpegOptim {
    fn name(&self) -> &'static str {
        "jpegoptim"
    }

    fn alter(&self, resource: &Resource) -> Result<Resource> {
        let strip = if self.strip_all { "--strip-all" } else { "" };
        Cmd::new(bin_or(&self.bin, "jpegoptim"))
            .arg(strip)
            .args(["-m", &self.max.min(100).to_string()])
            .input_in_place(resource, ".jpg")
            .run()
    }
}
