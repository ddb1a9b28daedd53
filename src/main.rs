//! Binary entry point: read settings, start file logging, open the SQLite
//! store, and drive the Ratatui event loop until the user quits. Any error
//! that escapes is returned from `main` and printed on stderr.
use coffee_catalog::{logging, run_app, App, Config, SqliteStore};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    logging::init(&config.log_path()?, config.log_filter())?;

    let db_path = config.database_path()?;
    info!(path = %db_path.display(), "starting coffee catalog");
    let store = SqliteStore::open(&db_path)?;

    let mut app = App::new(store)?;
    run_app(&mut app)
}
