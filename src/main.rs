use anyhow::Result;
use std::time::Duration;

use vitalwatch::{boot, cli, config::Config, daemon, tui};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::parse_args();
    boot::init_logging(&matches);

    let config = Config::from_args(&matches)?;

    if matches.get_flag("headless") {
        let interval = matches
            .get_one::<u64>("summary-interval")
            .copied()
            .unwrap_or(5);
        log::info!("Headless mode requested by argument");
        daemon::run(&config, Duration::from_secs(interval)).await
    } else {
        tui::start(&config).await
    }
}
