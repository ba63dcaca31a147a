mod app;
mod cli;
mod config;
mod db;
mod engine;
mod event;
mod logging;
mod tui;
mod types;
mod ui;

use anyhow::Result;
use clap::Parser;

use crate::config::Config;

fn main() -> Result<()> {
    let cli_opts = cli::Cli::parse();
    let config = Config::resolve(cli_opts.db, cli_opts.log_file, cli_opts.page_size)?;
    logging::init(&config.log_path)?;
    let conn = db::init(&config.db_path)?;
    if let Some(command) = cli_opts.command {
        return cli::run(command, &conn, &config);
    }

    let mut app = app::App::new(conn, config.db_path.clone(), config.page_size);
    let mut terminal = tui::init()?;
    let result = event::run(&mut app, &mut terminal);

    tui::restore()?;
    if let Err(err) = &result {
        log::error!("Trackview stopped with an error: {err:#}");
    }
    result
}
