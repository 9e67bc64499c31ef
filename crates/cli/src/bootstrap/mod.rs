use emberdns_domain::{CliOverrides, Config};
use tracing_subscriber::EnvFilter;

pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    Config::load(path, overrides).map_err(|e| anyhow::anyhow!(e))
}

pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
