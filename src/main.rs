use dockmate::app::App;
use dockmate::config::Config;
use dockmate::container_management::DockerBackend;
use dockmate::io::handler::spawn_handler;
use dockmate::start_ui;
use eyre::Result;
use std::sync::Arc;

use log::{error, info};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;

fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d} {l} {t} - {m}{n}")))
        .build(&path)?;

    let log_config = log4rs::config::Config::builder()
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(
            Root::builder()
                .appender("logfile")
                .build(config.level_filter()),
        )?;

    log4rs::init_config(log_config)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_logging(&config)?;
    info!("Starting dockmate {}", env!("CARGO_PKG_VERSION"));

    let backend = match DockerBackend::connect() {
        Ok(backend) => backend,
        Err(e) => {
            error!("{}", e);
            eprintln!("dockmate: {}", e);
            std::process::exit(1);
        }
    };

    let io_tx = spawn_handler(Arc::new(backend));
    let mut app = App::new(io_tx);

    start_ui(&mut app, config.tick_rate()).await?;
    info!("Bye");
    Ok(())
}
