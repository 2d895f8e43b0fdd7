//! In-process minification, no external binary required.
//!
//! Uses oxc for JavaScript and lightningcss for CSS.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::error::{Error, Result};
use crate::resource::{Alteration, Resource};

/// Minify JavaScript (parsed as an ES module).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinifyJs;

impl Alteration for MinifyJs {
    fn name(&self) -> &'static str {
        "minify-js"
    }

    fn alter(&self, resource: &Resource) -> Result<Resource> {
        let source = utf8_source(self.name(), resource)?;
        minify_js(&source)
            .map(Resource::string)
            .map_err(|message| Error::Alteration {
                name: self.name(),
                message,
            })
    }
}

/// Minify CSS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinifyCss;

impl Alteration for MinifyCss {
    fn name(&self) -> &'static str {
        "minify-css"
    }

    fn alter(&self, resource: &Resource) -> Result<Resource> {
        let source = utf8_source(self.name(), resource)?;
        minify_css(&source)
            .map(Resource::string)
            .map_err(|message| Error::Alteration {
                name: self.name(),
                message,
            })
    }
}

fn utf8_source(name: &'static str, resource: &Resource) -> Result<String> {
    String::from_utf8(resource.dump()?).map_err(|err| Error::Alteration {
        name,
        message: format!("input is not valid UTF-8: {err}"),
    })
}

fn minify_js(source: &str) -> std::result::Result<String, String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if let Some(first) = ret.errors.first() {
        return Err(format!("parse error: {first}"));
    }

    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    Ok(Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code)
}

fn minify_css(source: &str) -> std::result::Result<String, String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|err| format!("parse error: {err}"))?;
    let printed = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|err| format!("print error: {err}"))?;
    Ok(printed.code)
}
