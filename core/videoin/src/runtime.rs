// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use duration_str::deserialize_duration;
use serde::Deserialize;
use std::time;
use tokio::runtime::{Builder, Runtime};
use tracing::{info, warn};

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfiguration {
    /// the number of cores to use for this runtime
    #[serde(default = "default_n_cores")]
    n_cores: usize,

    /// the thread name for the runtime
    #[serde(default = "default_thread_name")]
    thread_name: String,

    /// the timeout for draining the services
    #[serde(
        default = "default_drain_timeout",
        deserialize_with = "deserialize_duration"
    )]
    drain_timeout: time::Duration,
}

impl Default for RuntimeConfiguration {
    fn default() -> Self {
        RuntimeConfiguration {
            n_cores: default_n_cores(),
            thread_name: default_thread_name(),
            drain_timeout: default_drain_timeout(),
        }
    }
}

fn default_n_cores() -> usize {
    // 0 means use all available cores
    0
}

fn default_thread_name() -> String {
    "videoin".to_string()
}

fn default_drain_timeout() -> time::Duration {
    time::Duration::from_secs(10)
}

impl RuntimeConfiguration {
    pub fn new() -> Self {
        RuntimeConfiguration::default()
    }

    pub fn with_cores(self, n_cores: usize) -> Self {
        RuntimeConfiguration { n_cores, ..self }
    }

    pub fn with_thread_name(self, thread_name: &str) -> Self {
        RuntimeConfiguration {
            thread_name: thread_name.to_string(),
            ..self
        }
    }

    pub fn with_drain_timeout(self, drain_timeout: time::Duration) -> Self {
        RuntimeConfiguration {
            drain_timeout,
            ..self
        }
    }

    pub fn n_cores(&self) -> usize {
        self.n_cores
    }

    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    pub fn drain_timeout(&self) -> time::Duration {
        self.drain_timeout
    }
}

pub struct VideoInRuntime {
    // Configuration field
    pub config: RuntimeConfiguration,

    // The actual runtime
    pub runtime: Runtime,
}

#[cfg(feature = "multicore")]
fn available_cores() -> usize {
    num_cpus::get()
}

#[cfg(not(feature = "multicore"))]
fn available_cores() -> usize {
    1
}

/// Number of worker threads for the configured core count.
fn resolve_cores(requested: usize, available: usize) -> usize {
    if requested > available {
        warn!(
            "Requested number of cores ({}) is greater than available cores ({}). Using all available cores",
            requested, available
        );
        available
    } else if requested == 0 {
        info!(%available, "Using all available cores");
        available
    } else {
        requested
    }
}

fn current_thread(config: &RuntimeConfiguration) -> std::io::Result<Runtime> {
    info!("Using single-threaded runtime");
    Builder::new_current_thread()
        .enable_all()
        .thread_name(config.thread_name.as_str())
        .build()
}

#[cfg(feature = "multicore")]
fn multi_thread(config: &RuntimeConfiguration, cores: usize) -> std::io::Result<Runtime> {
    info!(%cores, "Using multi-threaded runtime");
    Builder::new_multi_thread()
        .enable_all()
        .thread_name(config.thread_name.as_str())
        .worker_threads(cores)
        .max_blocking_threads(cores)
        .build()
}

#[cfg(not(feature = "multicore"))]
fn multi_thread(config: &RuntimeConfiguration, _cores: usize) -> std::io::Result<Runtime> {
    current_thread(config)
}

pub fn build(config: &RuntimeConfiguration) -> std::io::Result<VideoInRuntime> {
    let cores = resolve_cores(config.n_cores, available_cores());

    let runtime = match cores {
        1 => current_thread(config)?,
        _ => multi_thread(config, cores)?,
    };

    Ok(VideoInRuntime {
        config: config.clone(),
        runtime,
    })
}
