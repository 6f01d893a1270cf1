use std::path::PathBuf;

use clap::{Args, ValueEnum};
use plmxml::{BuildOptions, RootPolicy};

pub mod accessors;
pub mod commands;
pub mod utils;

// Re-export plmxml for external use
pub use plmxml;

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum BomFormat {
    Text,
    Json,
    Csv,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum RootPolicyArg {
    /// Keep every root candidate
    #[default]
    All,
    /// Keep the first root candidate in document order
    First,
    /// Fail when more than one root candidate exists
    Single,
}

impl From<RootPolicyArg> for RootPolicy {
    fn from(arg: RootPolicyArg) -> Self {
        match arg {
            RootPolicyArg::All => RootPolicy::All,
            RootPolicyArg::First => RootPolicy::First,
            RootPolicyArg::Single => RootPolicy::Single,
        }
    }
}

/// Input file and tree building flags shared by every command
#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    /// PLMXML file to inspect (.xml, .plmxml, or .zst compressed)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Build from this ProductView / InstanceGraph id instead of the first one
    #[arg(long, value_name = "ID")]
    pub view: Option<String>,

    /// What to do when several root candidates exist
    #[arg(long, value_enum, default_value = "all")]
    pub root_policy: RootPolicyArg,
}

impl LoadArgs {
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            root_policy: self.root_policy.into(),
            view: self.view.clone(),
            ..BuildOptions::default()
        }
    }
}
