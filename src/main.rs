use anyhow::Result;
use geofacts::logger::{self, LogConfig};
use geofacts::{BotLauncher, PROCESS_NAME};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logger::init(PROCESS_NAME, LogConfig::from_env());

    let launcher = match BotLauncher::from_env() {
        Ok(launcher) => launcher,
        Err(err) => {
            error!(error = %err, "startup aborted");
            std::process::exit(1);
        }
    };

    info!(version = geofacts::VERSION, config = ?launcher.config(), "configuration loaded");
    launcher.launch().await;

    info!("bot stopped");
    Ok(())
}
