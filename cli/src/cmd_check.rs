//! `clearsign check`: verify format keys against deployed contract ABIs.

use anyhow::{Context, Result};
use clearsign_core::Descriptor;
use clearsign_explorer::{EtherscanClient, ExplorerClient, ExplorerConfig, ProviderRegistry, SystemClock};
use clearsign_transform::IncludeResolver;
use clearsign_verify::{ChainSelection, Validator};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

pub async fn run(
    file: &Path,
    chain_id: Option<u64>,
    all_chains: bool,
    config: Option<&Path>,
    as_json: bool,
) -> Result<ExitCode> {
    let tree = IncludeResolver::new()
        .resolve_file(file)
        .with_context(|| format!("loading {}", file.display()))?;
    let descriptor = Descriptor::from_value(&tree).with_context(|| format!("parsing {}", file.display()))?;

    let config = match config {
        Some(path) => ExplorerConfig::from_file(path).with_context(|| format!("loading {}", path.display()))?,
        None => ExplorerConfig::default(),
    };
    tracing::debug!(
        providers = config.providers.len(),
        min_interval_ms = config.min_interval_ms,
        max_retries = config.max_retries,
        "explorer config loaded"
    );
    let selection = if all_chains {
        ChainSelection::All
    } else {
        ChainSelection::Single(chain_id)
    };

    let api = EtherscanClient::new(config.request_timeout())?;
    let client = ExplorerClient::new(api, config.throttle(Arc::new(SystemClock::new())));
    let validator = Validator::new(client, ProviderRegistry::from_config(&config));

    let report = validator.validate(&descriptor, selection).await?;
    let verdict = report.verdict();

    if as_json {
        let mut value = serde_json::to_value(&report)?;
        value["verdict"] = serde_json::to_value(verdict)?;
        value["totals"] = serde_json::to_value(report.totals())?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Checking {} ({} format keys)\n", file.display(), report.format_keys);
        print!("{}", report.render_text());
    }

    Ok(ExitCode::from(verdict.exit_code() as u8))
}
