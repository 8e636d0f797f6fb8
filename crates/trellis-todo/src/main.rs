use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use trellis_config::ConfigLoader;
use trellis_todo::cli::Cli;
use trellis_todo::{logging, TodoApp};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;
    logging::init(&config.logging, cli.log_level);
    debug!(steps = cli.steps.len(), reconcile = ?config.render.reconcile, "starting");

    let app = TodoApp::new(&config)?;
    for (index, step) in cli.steps.iter().enumerate() {
        app.run(step)
            .with_context(|| format!("step {} (`{step}`) failed", index + 1))?;
    }

    println!("{}", app.html());
    Ok(())
}
