use anyhow::Context;
use companion_core::config::Config;
use std::path::Path;

pub fn run(config_path: Option<&Path>, port: Option<u16>, bind: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load(config_path).context("failed to load config")?;
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(bind) = bind {
        config.server.bind = bind;
    }

    for w in config.validate() {
        tracing::warn!("config: {}", w.message);
    }

    let bind = config.server.bind.clone();
    let port = config.server.port;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let state = companion_server::AppState::from_config(config).await?;
        companion_server::serve(state, &bind, port).await
    })
}
