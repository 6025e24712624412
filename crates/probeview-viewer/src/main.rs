//! Probeview - native entry point

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;
    use std::path::PathBuf;
    use tracing::{info, Level};
    use tracing_subscriber::FmtSubscriber;

    #[derive(Parser, Debug)]
    #[command(name = "probeview")]
    #[command(about = "3D vehicle sensor marker viewer")]
    #[command(version)]
    struct Args {
        /// Path to configuration file
        #[arg(short, long, default_value = "probeview.toml")]
        config: PathBuf,

        /// Log level (trace, debug, info, warn, error)
        #[arg(short, long, default_value = "info")]
        log_level: String,

        /// Write the default configuration to the config path and exit
        #[arg(long)]
        init_config: bool,
    }

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Probeview v{}", env!("CARGO_PKG_VERSION"));

    if args.init_config {
        probeview_core::config::save_default_config(&args.config)?;
        info!(path = %args.config.display(), "Wrote default configuration");
        return Ok(());
    }

    let config = probeview_core::load_config(&args.config)?;
    info!(
        sensors = config.sensors.len(),
        model = %config.model.path,
        "Configuration loaded"
    );

    probeview_viewer::run(config);
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
