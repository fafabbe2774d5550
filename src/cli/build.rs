//! `minwatch build`: one production pass.

use anyhow::{Result, bail};

use super::inputs::resolve_inputs;
use super::{Cli, native_dispatcher};
use crate::asset::ProductionRunner;
use crate::config::Config;
use crate::utils::format::plural_count;

pub async fn run_build(cli: &Cli, config: &Config) -> Result<()> {
    let inputs = resolve_inputs(&cli.input().paths);
    crate::debug!("build"; "{} resolved", plural_count(inputs.files.len(), "file"));

    let runner = ProductionRunner::new(native_dispatcher(config));
    let report = runner.run(inputs.files, cli.source_map()).await;

    let failed = report.failed();
    if failed > 0 {
        bail!("{} failed to build", plural_count(failed, "file"));
    }
    Ok(())
}
