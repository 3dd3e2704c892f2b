// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::future::Future;

use anyhow::{Context, Result};
use tracing::{Instrument, debug, info, span, warn};

use crate::build_info;
use crate::config::ConfigLoader;
use crate::runtime;
use videoin_config::component::Component;

/// Start every configured service, wait for `shutdown`, then stop them all
/// within the drain timeout.
pub async fn serve<F>(config: &mut ConfigLoader, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    info!(build_info = %build_info::BUILD_INFO);

    // Read drain timeout from runtime config
    let drain_timeout = config
        .runtime()
        .context("invalid runtime configuration")?
        .drain_timeout();

    // Load services
    let services = config.services().context("error loading services")?;

    // Start services
    for (id, service) in services.iter_mut() {
        debug!(service = %id, "service starting...");
        service
            .start()
            .await
            .with_context(|| format!("failed to start service {}", id))?;
        info!(service = %id, "service started");
    }

    // Wait for shutdown signal
    shutdown.await;
    debug!("Received shutdown signal");

    // Gracefully stop services within the drain timeout
    let shutdown_all = async {
        for (id, service) in services.iter_mut() {
            info!(service = %id, "stopping service");
            service
                .shutdown()
                .await
                .with_context(|| format!("failed to stop service {}", id))?;
        }
        Ok::<(), anyhow::Error>(())
    };

    match tokio::time::timeout(drain_timeout, shutdown_all).await {
        Ok(result) => result?,
        Err(_) => {
            warn!(timeout = ?drain_timeout, "Service shutdown timed out");
            anyhow::bail!("Service shutdown timed out after {:?}", drain_timeout);
        }
    }

    info!("all services stopped");
    Ok(())
}

/// Async body: tracing setup, then the service lifecycle until SIGINT/SIGTERM.
pub async fn run_services(mut config: ConfigLoader) -> Result<()> {
    // Setup tracing
    let tracing_conf = config.tracing().context("invalid tracing configuration")?;
    tracing_conf
        .setup_tracing_subscriber()
        .context("failed to set up tracing subscriber")?;
    debug!(?tracing_conf);

    let root_span = span!(tracing::Level::INFO, "application_lifecycle");

    serve(&mut config, videoin_signal::shutdown())
        .instrument(root_span)
        .await
}

/// Load config from `config_file`, build a Tokio runtime as specified by the
/// `runtime:` section, start all services, and block until a shutdown signal
/// is received.
///
/// This is a **synchronous** blocking call.
pub fn run(config_file: &str) -> Result<()> {
    let mut config = ConfigLoader::new(config_file).context("failed to load configuration")?;

    let videoin_runtime =
        runtime::build(config.runtime().context("invalid runtime configuration")?)
            .context("failed to build runtime")?;

    videoin_runtime.runtime.block_on(run_services(config))
}
