//! Ready-made alterations.
//!
//! - [`command`]: run arbitrary programs over temporary files
//! - [`tools`]: wrappers for uglifyjs, uglifycss, tsc, stylus, optipng, jpegoptim
//! - [`minify`]: in-process JS/CSS minification

pub mod command;
pub mod minify;
pub mod tools;

pub use command::{Cmd, Exec};
pub use minify::{MinifyCss, MinifyJs};
pub use tools::{JpegOptim, OptiPng, Stylus, TypeScript, UglifyCss, UglifyJs};
