use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use px_model::Backend;

/// Translate one canonical proxy-fleet description into the native
/// configuration of a proxy client engine.
#[derive(Debug, Parser)]
#[command(name = "polyproxy", version, about)]
pub struct Args {
    /// Canonical configuration file (TOML, YAML or JSON; by extension).
    #[arg(short, long)]
    pub input: PathBuf,

    /// Target engine.
    #[arg(short, long, value_enum)]
    pub target: Target,

    /// Output file; stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip eager reference validation (duplicate names, dangling
    /// policies). Translation itself still rejects unsupported variants.
    #[arg(long)]
    pub no_validate: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Target {
    Clash,
    Surge,
    #[value(name = "sing-box", alias = "singbox")]
    SingBox,
}

impl Target {
    pub fn backend(self) -> Backend {
        match self {
            Target::Clash => Backend::Clash,
            Target::Surge => Backend::Surge,
            Target::SingBox => Backend::SingBox,
        }
    }
}
