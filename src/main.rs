mod config;
mod db;
mod ledger;
mod logging;
mod models;
mod rates;
mod replay;
mod run;
mod stats;
mod ui;

use anyhow::Result;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let paths = config::Paths::discover()?;
    let config = config::Config::load(&paths.config_file)?;
    logging::init_tracing(&paths.log_file(), &config.log_filter);

    let mut db = db::Database::open(&paths.database())?;

    match args.len() {
        1 => run::as_tui(&mut db, &config),
        2.. => run::as_cli(&args, &mut db, &config),
        _ => {
            eprintln!("Usage: moneyflow [command]");
            Ok(())
        }
    }
}
