use clap::Parser;

use crime_dashboard::config::Args;
use crime_dashboard::server;
use crime_dashboard::state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    args.validate()?;

    // Load before binding: a missing or unreadable file ends the process here.
    let state = match AppState::load(&args.data) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Failed to load crime data: {e:#}");
            return Err(e);
        }
    };

    server::run(&args, state).await?;
    Ok(())
}
