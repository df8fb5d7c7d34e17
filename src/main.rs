use anyhow::Result;
use clap::Parser;
use rmx::{app, cli::Cli, infra};

fn main() -> Result<()> {
    infra::secrets::install_panic_redaction_hook();

    let cli = Cli::parse();
    app::run(cli)
}
