//! polyproxy — entrypoint.
//!
//! Thin wrapper around the translation crates: read one canonical file,
//! validate references, translate for the requested engine, render, write.
//! Everything interesting happens in px-model and the backend crates;
//! this binary only does I/O and error reporting.

mod cli;

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use px_model::CanonicalConfig;

use crate::cli::{Args, Target};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let config = parse_canonical(&args.input, &text)?;

    if !args.no_validate {
        if let Err(issues) = config.validate() {
            for issue in &issues {
                tracing::error!(%issue, "validation failed");
            }
            bail!(
                "{} validation issue(s) in {}",
                issues.len(),
                args.input.display()
            );
        }
    }

    let rendered = translate(&config, args.target)?;

    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{rendered}"),
    }
    Ok(())
}

/// The authoring format is chosen by file extension; all three formats
/// deserialize into the same canonical model.
fn parse_canonical(path: &Path, text: &str) -> Result<CanonicalConfig> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let config = match ext {
        "toml" => toml::from_str(text).with_context(|| format!("parsing {}", path.display()))?,
        "yaml" | "yml" => {
            serde_yaml::from_str(text).with_context(|| format!("parsing {}", path.display()))?
        }
        "json" => {
            serde_json::from_str(text).with_context(|| format!("parsing {}", path.display()))?
        }
        other => bail!("unsupported input extension `{other}` (expected toml/yaml/json)"),
    };
    Ok(config)
}

fn translate(config: &CanonicalConfig, target: Target) -> Result<String> {
    let backend = target.backend();
    tracing::info!(%backend, "translating");
    let rendered = match target {
        Target::Clash => {
            let out = px_clash::config_from_canonical(config)?;
            serde_yaml::to_string(&out).context("rendering clash yaml")?
        }
        Target::Surge => px_surge::config_from_canonical(config)?.render(),
        Target::SingBox => {
            let out = px_singbox::config_from_canonical(config)?;
            let mut json =
                serde_json::to_string_pretty(&out).context("rendering sing-box json")?;
            json.push('\n');
            json
        }
    };
    Ok(rendered)
}
