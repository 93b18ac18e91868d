//! Resolves the command line into what the binary should do, without exiting the process.
use crate::hardware::{Backing, ImageOptions, WriteBack};
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "lmvm",
    version,
    about = "LMC - little man computer virtual machine.",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Print a helpful message and exit.
    #[arg(short = 'h', short_alias = '?', long, action = ArgAction::Help)]
    #[allow(dead_code, reason = "handled by clap while parsing")]
    help: Option<bool>,
    /// Print version information and exit.
    #[arg(short = 'v', long, action = ArgAction::Version)]
    #[allow(dead_code, reason = "handled by clap while parsing")]
    version: Option<bool>,
    /// How the image is held in memory.
    #[arg(long, value_enum, default_value_t = BackingArg::Auto)]
    backing: BackingArg,
    /// Write changed mailboxes back into the image file when the run ends.
    #[arg(long)]
    write_back: bool,
    /// Binary image produced by the assembler.
    filename: PathBuf,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum BackingArg {
    /// Map the file, fall back to a heap copy if mapping fails.
    Auto,
    /// Map the file, fail if that is not possible.
    Mapped,
    /// Copy the file into a heap buffer.
    Buffered,
}

impl From<BackingArg> for Backing {
    fn from(arg: BackingArg) -> Self {
        match arg {
            BackingArg::Auto => Self::Auto,
            BackingArg::Mapped => Self::Mapped,
            BackingArg::Buffered => Self::Buffered,
        }
    }
}

/// Everything needed to start a run.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RunConfig {
    pub image: PathBuf,
    pub options: ImageOptions,
}

/// Outcome of resolving the command line.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Invocation {
    Run(RunConfig),
    /// Help text for stdout, exit status 0.
    ShowHelp(String),
    /// Name and version for stdout, exit status 0.
    ShowVersion(String),
    /// Wrong arguments: the reason is logged, the usage text goes to stdout with exit status 0.
    UsageError { reason: String, usage: String },
}

impl Invocation {
    /// Resolves `args`, the first element is the program name.
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Cli::try_parse_from(args) {
            Ok(cli) => Self::Run(RunConfig {
                image: cli.filename,
                options: ImageOptions {
                    backing: cli.backing.into(),
                    write_back: if cli.write_back {
                        WriteBack::Persist
                    } else {
                        WriteBack::Discard
                    },
                },
            }),
            Err(e) => match e.kind() {
                ErrorKind::DisplayHelp => Self::ShowHelp(e.to_string()),
                ErrorKind::DisplayVersion => Self::ShowVersion(e.to_string()),
                _ => Self::UsageError {
                    reason: e.to_string().lines().next().unwrap_or_default().to_owned(),
                    usage: Cli::command().render_help().to_string(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use yare::parameterized;

    #[gtest]
    pub fn test_run_with_defaults() {
        expect_that!(
            Invocation::from_args(["lmvm", "prog.bin"]),
            eq(&Invocation::Run(RunConfig {
                image: PathBuf::from("prog.bin"),
                options: ImageOptions::default(),
            }))
        );
    }
    #[gtest]
    pub fn test_run_with_options() {
        expect_that!(
            Invocation::from_args(["lmvm", "--backing", "buffered", "--write-back", "p.bin"]),
            eq(&Invocation::Run(RunConfig {
                image: PathBuf::from("p.bin"),
                options: ImageOptions {
                    backing: Backing::Buffered,
                    write_back: WriteBack::Persist,
                },
            }))
        );
    }

    #[parameterized(
        short = { "-h" },
        question_mark = { "-?" },
        long = { "--help" },
    )]
    fn test_help(flag: &str) {
        let Invocation::ShowHelp(text) = Invocation::from_args(["lmvm", flag]) else {
            panic!("expected help for {flag}");
        };
        assert_that!(text, contains_substring("LMC - little man computer virtual machine."));
        assert_that!(text, contains_substring("Usage: lmvm"));
    }

    #[parameterized(
        short = { "-v" },
        long = { "--version" },
    )]
    fn test_version(flag: &str) {
        assert_that!(
            Invocation::from_args(["lmvm", flag, "ignored.bin"]),
            eq(&Invocation::ShowVersion(format!(
                "lmvm {}\n",
                env!("CARGO_PKG_VERSION")
            )))
        );
    }

    #[parameterized(
        no_image = { &["lmvm"], "error: the following required arguments were not provided:" },
        two_images = { &["lmvm", "a.bin", "b.bin"], "error: unexpected argument 'b.bin' found" },
        unknown_option = { &["lmvm", "--fast", "a.bin"], "error: unexpected argument '--fast' found" },
        unknown_backing = { &["lmvm", "--backing", "disk", "a.bin"], "error: invalid value 'disk'" },
    )]
    fn test_usage_errors(args: &[&str], expected_reason: &str) {
        let invocation = Invocation::from_args(args.iter().copied());
        let Invocation::UsageError { reason, usage } = &invocation else {
            panic!("expected usage error for {args:?}, got {invocation:?}");
        };
        assert_that!(reason, starts_with(expected_reason));
        assert_that!(usage, contains_substring("Usage: lmvm"));
        assert_that!(usage, contains_substring("--write-back"));
        assert_that!(usage, not(contains_substring("error:")));
    }
}
