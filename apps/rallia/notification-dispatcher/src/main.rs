use core_config::tracing::{init_tracing, install_color_eyre};
use rallia_notification_dispatcher::{config::Config, run};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    run(config).await
}
