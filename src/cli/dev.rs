//! `minwatch dev`: initial pass, then watch until Ctrl+C.

use anyhow::Result;

use super::inputs::resolve_inputs;
use super::{Cli, native_dispatcher};
use crate::config::Config;
use crate::watch::run_session;

pub async fn run_dev(cli: &Cli, config: &Config) -> Result<()> {
    let inputs = resolve_inputs(&cli.input().paths);
    if inputs.roots.is_empty() {
        crate::log!("watch"; "nothing to watch");
        return Ok(());
    }

    run_session(
        native_dispatcher(config),
        inputs.files,
        inputs.roots,
        config.watch,
        cli.source_map(),
    )
    .await
}
