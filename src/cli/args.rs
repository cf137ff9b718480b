//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::ParseMode;

/// Binary tree toolkit: build, print, parse and render trees in prefix notation
#[derive(Parser, Debug)]
#[command(name = "bintree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Prefix reader mode (overrides config)
    #[arg(long, global = true, value_enum)]
    pub mode: Option<ModeArg>,

    /// Cap on nodes per tree (overrides config)
    #[arg(long, global = true)]
    pub node_limit: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the demonstration: fixed tree, then a tree read from input
    Demo {
        /// Read the second tree from this file instead of stdin
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
        /// Skip image rendering and the dump log
        #[arg(long)]
        no_render: bool,
    },

    /// Parse a tree and print it
    Print {
        /// Prefix notation file (default: stdin)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Output notation
        #[arg(short, long, value_enum, default_value_t = NotationArg::All)]
        notation: NotationArg,
    },

    /// Parse a tree and render it as an image
    Dump {
        /// Prefix notation file (default: stdin)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Print the Graphviz description instead of rendering
        #[arg(long)]
        dot: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Print an annotated config template
    Template,
    /// Show config file locations
    Path,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    Hardened,
    Reference,
}

impl From<ModeArg> for ParseMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Hardened => ParseMode::Hardened,
            ModeArg::Reference => ParseMode::Reference,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotationArg {
    /// Prefix, postfix and infix, one line each
    All,
    Prefix,
    Infix,
    Postfix,
    /// Indented outline
    Outline,
}
