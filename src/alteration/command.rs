//! External command execution over temporary files.
//!
//! Most asset tools only accept file arguments. `Cmd` materializes a
//! resource into a temporary input file, optionally reserves a temporary
//! output file, runs the program and turns the result back into a resource.
//!
//! # Examples
//!
//! ```ignore
//! // stdout is the result
//! Cmd::new("uglifyjs").input(&resource, ".js").run()?;
//!
//! // result read from the output file
//! Cmd::new("tsc").arg("--outFile").output(".js").input(&resource, ".ts").run()?;
//!
//! // tool rewrites its input in place
//! Cmd::new("jpegoptim").args(["-m", "80"]).input_in_place(&resource, ".jpg").run()?;
//! ```

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;

use crate::debug;
use crate::error::{Error, IoContext, Result};
use crate::resource::{Alteration, Resource};

const TEMP_PREFIX: &str = "statix_filter_";

// ============================================================================
// Builder API
// ============================================================================

#[derive(Debug, Clone)]
enum Arg {
    Plain(OsString),
    Input {
        resource: Resource,
        suffix: String,
        in_place: bool,
    },
    Output {
        suffix: String,
    },
}

/// Command builder for alterations backed by an external program.
#[derive(Debug, Clone)]
pub struct Cmd {
    program: OsString,
    args: Vec<Arg>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            args: Vec::new(),
        }
    }

    /// Add a single argument. Empty arguments are skipped.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(Arg::Plain(arg.to_owned()));
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        args.into_iter().fold(self, Self::arg)
    }

    /// Pass a temporary file holding the dump of `resource`.
    ///
    /// `suffix` ends the temporary file name (tools often dispatch on it).
    pub fn input(mut self, resource: &Resource, suffix: &str) -> Self {
        self.args.push(Arg::Input {
            resource: resource.clone(),
            suffix: suffix.to_owned(),
            in_place: false,
        });
        self
    }

    /// Like [`input`](Self::input), but the tool rewrites the file and its
    /// final content is the result.
    pub fn input_in_place(mut self, resource: &Resource, suffix: &str) -> Self {
        self.args.push(Arg::Input {
            resource: resource.clone(),
            suffix: suffix.to_owned(),
            in_place: true,
        });
        self
    }

    /// Pass a temporary output file whose content becomes the result.
    pub fn output(mut self, suffix: &str) -> Self {
        self.args.push(Arg::Output {
            suffix: suffix.to_owned(),
        });
        self
    }

    /// Run the program and collect its result.
    ///
    /// The result is stdout, unless an output file or an in-place input was
    /// declared. Temporary files are removed when this returns.
    pub fn run(self) -> Result<Resource> {
        let name = self.program.to_string_lossy().into_owned();
        self.check_args()?;

        let mut argv = Vec::with_capacity(self.args.len());
        let mut input: Option<(NamedTempFile, bool)> = None;
        let mut output: Option<NamedTempFile> = None;

        for arg in self.args {
            match arg {
                Arg::Plain(arg) => argv.push(arg),
                Arg::Input {
                    resource,
                    suffix,
                    in_place,
                } => {
                    let mut file = temp_file(&suffix)?;
                    file.write_all(&resource.dump()?).at(file.path())?;
                    file.flush().at(file.path())?;
                    argv.push(file.path().as_os_str().to_owned());
                    input = Some((file, in_place));
                }
                Arg::Output { suffix } => {
                    let file = temp_file(&suffix)?;
                    argv.push(file.path().as_os_str().to_owned());
                    output = Some(file);
                }
            }
        }

        debug!("exec"; "{} {}", name, display_args(&argv));

        let out = Command::new(&self.program)
            .args(&argv)
            .output()
            .at(&name)?;

        if !out.status.success() {
            return Err(Error::Command {
                program: name,
                status: out.status,
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }

        let content = match (output, input) {
            (Some(file), _) | (None, Some((file, true))) => {
                fs::read(file.path()).at(file.path())?
            }
            _ => out.stdout,
        };
        Ok(Resource::bytes(content))
    }

    /// At most one temporary input and one temporary output; an in-place
    /// input already is the output.
    fn check_args(&self) -> Result<()> {
        let mut inputs = 0;
        let mut outputs = 0;
        for arg in &self.args {
            match arg {
                Arg::Input { in_place, .. } => {
                    inputs += 1;
                    outputs += usize::from(*in_place);
                }
                Arg::Output { .. } => outputs += 1,
                Arg::Plain(_) => {}
            }
        }

        if inputs > 1 {
            return Err(Error::CommandArgs(
                "only one temporary input file allowed".into(),
            ));
        }
        if outputs > 1 {
            return Err(Error::CommandArgs(
                "only one temporary output file allowed".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Templated command alteration
// ============================================================================

/// Alteration running `program` with templated arguments.
///
/// | Argument        | Replaced by                                  |
/// |-----------------|----------------------------------------------|
/// | `{input}`       | temporary file holding the resource          |
/// | `{input:.ts}`   | same, file name ending in `.ts`              |
/// | `{output}`      | temporary output file, read back as result   |
/// | `{output:.css}` | same, file name ending in `.css`             |
///
/// Any other argument is passed through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exec {
    pub program: String,
    pub args: Vec<String>,
}

impl Exec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build the concrete invocation for `resource`.
    pub fn command(&self, resource: &Resource) -> Cmd {
        self.args.iter().fold(Cmd::new(&self.program), |cmd, arg| {
            match placeholder(arg) {
                Some(("input", suffix)) => cmd.input(resource, suffix),
                Some(("output", suffix)) => cmd.output(suffix),
                _ => cmd.arg(arg),
            }
        })
    }
}

impl Alteration for Exec {
    fn name(&self) -> &'static str {
        "command"
    }

    fn alter(&self, resource: &Resource) -> Result<Resource> {
        self.command(resource).run()
    }
}

/// Split `{kind}` / `{kind:suffix}` into its parts.
fn placeholder(arg: &str) -> Option<(&str, &str)> {
    let inner = arg.strip_prefix('{')?.strip_suffix('}')?;
    let (kind, suffix) = inner.split_once(':').unwrap_or((inner, ""));
    matches!(kind, "input" | "output").then_some((kind, suffix))
}

// ============================================================================
// Helpers
// ============================================================================

fn temp_file(suffix: &str) -> Result<NamedTempFile> {
    tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(suffix)
        .tempfile()
        .at(std::env::temp_dir())
}

fn display_args(argv: &[OsString]) -> String {
    argv.iter()
        .map(|a| a.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Tests
// ============================================================================
