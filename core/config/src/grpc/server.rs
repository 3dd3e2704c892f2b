// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;

use duration_str::deserialize_duration;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::errors::ConfigError;
use crate::component::configuration::Configuration;

// HTTP/2 caps frames at 16 MiB - 1
const MAX_FRAME_SIZE_MIB: u32 = 15;

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct KeepaliveServerParameters {
    /// max_connection_age sets the maximum amount of time a connection may exist before it will be closed.
    #[serde(
        default = "default_max_connection_age",
        deserialize_with = "deserialize_duration"
    )]
    pub max_connection_age: Duration,

    /// Time sets the frequency of the keepalive ping.
    #[serde(default = "default_time", deserialize_with = "deserialize_duration")]
    pub time: Duration,

    /// Timeout sets the amount of time the server waits for a keepalive ping ack.
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Default for KeepaliveServerParameters {
    fn default() -> Self {
        Self {
            max_connection_age: default_max_connection_age(),
            time: default_time(),
            timeout: default_timeout(),
        }
    }
}

fn default_max_connection_age() -> Duration {
    Duration::from_secs(2 * 3600)
}

fn default_time() -> Duration {
    Duration::from_secs(2 * 60)
}

fn default_timeout() -> Duration {
    Duration::from_secs(20)
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ServerConfig {
    /// Endpoint is the address to listen on.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Use HTTP 2 only.
    #[serde(default = "default_http2_only")]
    pub http2_only: bool,

    /// Maximum size (in MiB) of frames accepted by the server.
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: Option<u32>,

    /// Limit on the number of concurrent requests served on each connection.
    #[serde(default = "default_max_concurrent_streams")]
    pub max_concurrent_streams: Option<u32>,

    /// Max header list size
    #[serde(default)]
    pub max_header_list_size: Option<u32>,

    /// Keepalive anchor for all the settings related to keepalive.
    #[serde(default)]
    pub keepalive: KeepaliveServerParameters,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            http2_only: default_http2_only(),
            max_frame_size: default_max_frame_size(),
            max_concurrent_streams: default_max_concurrent_streams(),
            max_header_list_size: None,
            keepalive: KeepaliveServerParameters::default(),
        }
    }
}

fn default_endpoint() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_http2_only() -> bool {
    true
}

fn default_max_frame_size() -> Option<u32> {
    Some(4)
}

fn default_max_concurrent_streams() -> Option<u32> {
    Some(100)
}

impl std::fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ServerConfig {{ endpoint: {}, http2_only: {}, max_frame_size: {:?}, max_concurrent_streams: {:?}, max_header_list_size: {:?}, keepalive: {:?} }}",
            self.endpoint,
            self.http2_only,
            self.max_frame_size,
            self.max_concurrent_streams,
            self.max_header_list_size,
            self.keepalive,
        )
    }
}

impl Configuration for ServerConfig {
    type Error = ConfigError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }

        SocketAddr::from_str(&self.endpoint)?;

        if let Some(size) = self.max_frame_size {
            if size == 0 || size > MAX_FRAME_SIZE_MIB {
                return Err(ConfigError::InvalidMaxFrameSize(size));
            }
        }

        Ok(())
    }
}

/// Boxed future driving the server until it stops.
pub type ServerFuture = Pin<Box<dyn Future<Output = Result<(), tonic::transport::Error>> + Send>>;

/// A server spawned by [`ServerConfig::run_server`].
#[derive(Debug, Clone)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    token: CancellationToken,
}

impl ServerHandle {
    /// Address the server is actually bound to (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and let in-flight calls complete.
    pub fn stop(&self) {
        self.token.cancel();
    }
}

impl ServerConfig {
    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            ..Default::default()
        }
    }

    pub fn with_http2_only(self, http2_only: bool) -> Self {
        Self { http2_only, ..self }
    }

    pub fn with_max_frame_size(self, max_frame_size: Option<u32>) -> Self {
        Self {
            max_frame_size,
            ..self
        }
    }

    pub fn with_max_concurrent_streams(self, max_concurrent_streams: Option<u32>) -> Self {
        Self {
            max_concurrent_streams,
            ..self
        }
    }

    pub fn with_max_header_list_size(self, max_header_list_size: Option<u32>) -> Self {
        Self {
            max_header_list_size,
            ..self
        }
    }

    pub fn with_keepalive(self, keepalive: KeepaliveServerParameters) -> Self {
        Self { keepalive, ..self }
    }

    fn create_server_builder(&self) -> tonic::transport::Server {
        let builder = tonic::transport::Server::builder().accept_http1(!self.http2_only);

        let builder = match self.max_concurrent_streams {
            Some(max_concurrent_streams) => {
                builder.concurrency_limit_per_connection(max_concurrent_streams as usize)
            }
            None => builder,
        };

        let builder = match self.max_frame_size {
            Some(max_frame_size) => builder.max_frame_size(max_frame_size * 1024 * 1024),
            None => builder,
        };

        let builder = match self.max_header_list_size {
            Some(max_header_list_size) => builder.http2_max_header_list_size(max_header_list_size),
            None => builder,
        };

        builder
            .http2_keepalive_interval(Some(self.keepalive.time))
            .http2_keepalive_timeout(Some(self.keepalive.timeout))
            .max_connection_age(self.keepalive.max_connection_age)
    }

    /// Validate the configuration and bind the listening socket.
    pub async fn bind(&self) -> Result<TcpListener, ConfigError> {
        self.validate()?;

        let addr = SocketAddr::from_str(&self.endpoint)?;
        let listener = TcpListener::bind(addr).await?;

        Ok(listener)
    }

    /// Bind the endpoint and build the future serving `svc` on it. The
    /// future completes once `shutdown` resolves and in-flight calls finish.
    pub async fn to_server_future<S, F>(
        &self,
        svc: S,
        shutdown: F,
    ) -> Result<(ServerFuture, SocketAddr), ConfigError>
    where
        S: tower_service::Service<
                http::Request<tonic::body::Body>,
                Response = http::Response<tonic::body::Body>,
                Error = Infallible,
            >
            + tonic::server::NamedService
            + Clone
            + Send
            + Sync
            + 'static,
        S::Future: Send + 'static,
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.bind().await?;
        let local_addr = listener.local_addr()?;
        let incoming = TcpListenerStream::new(listener);

        let mut builder = self.create_server_builder();
        let router = builder.add_service(svc);

        Ok((
            Box::pin(router.serve_with_incoming_shutdown(incoming, shutdown)),
            local_addr,
        ))
    }

    /// Spawn the server on the current runtime. It stops when the drain
    /// signal fires or the returned handle is stopped.
    pub async fn run_server<S>(
        &self,
        svc: S,
        drain_rx: drain::Watch,
    ) -> Result<ServerHandle, ConfigError>
    where
        S: tower_service::Service<
                http::Request<tonic::body::Body>,
                Response = http::Response<tonic::body::Body>,
                Error = Infallible,
            >
            + tonic::server::NamedService
            + Clone
            + Send
            + Sync
            + 'static,
        S::Future: Send + 'static,
    {
        debug!(%self, "server configured: setting it up");

        let token = CancellationToken::new();
        let stop = token.clone();
        let shutdown = async move {
            tokio::select! {
                release = drain_rx.signaled() => {
                    debug!("drain signal received: shutting down server");
                    drop(release);
                }
                _ = stop.cancelled() => {
                    debug!("cancellation token triggered: shutting down server");
                }
            }
        };

        let (server_future, local_addr) = self.to_server_future(svc, shutdown).await?;

        tokio::spawn(async move {
            debug!("starting server main loop");
            match server_future.await {
                Ok(()) => info!("server shutdown"),
                Err(e) => error!(error = %e, "server error"),
            }
        });

        info!(%local_addr, "server listening");

        Ok(ServerHandle { local_addr, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keepalive_server_parameters() {
        let keepalive = KeepaliveServerParameters::default();
        assert_eq!(keepalive.max_connection_age, default_max_connection_age());
        assert_eq!(keepalive.time, default_time());
        assert_eq!(keepalive.timeout, default_timeout());
    }

    #[test]
    fn test_default_server_config() {
        let server_config = ServerConfig::default();
        assert_eq!(server_config.endpoint, "0.0.0.0:8080");
        assert!(server_config.http2_only);
        assert_eq!(server_config.max_frame_size, Some(4));
        assert_eq!(server_config.max_concurrent_streams, Some(100));
        assert_eq!(server_config.max_header_list_size, None);
        assert_eq!(
            server_config.keepalive,
            KeepaliveServerParameters::default()
        );
        assert!(server_config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let config = ServerConfig::with_endpoint("");
        assert!(matches!(config.validate(), Err(ConfigError::MissingEndpoint)));

        let config = ServerConfig::with_endpoint("0.0.0.0:123456");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EndpointParse(_))
        ));

        let config = ServerConfig::with_endpoint("127.0.0.1:0").with_max_frame_size(Some(64));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMaxFrameSize(64))
        ));

        let config = ServerConfig::with_endpoint("127.0.0.1:0").with_max_frame_size(None);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_bind_resolves_ephemeral_port() {
        let config = ServerConfig::with_endpoint("127.0.0.1:0");
        let listener = config.bind().await.expect("bind should succeed");
        assert_ne!(listener.local_addr().unwrap().port(), 0);

        let config = ServerConfig::with_endpoint("not-an-address");
        assert!(config.bind().await.is_err());
    }

    #[test]
    fn test_keepalive_durations_deserialize() {
        let yaml = r#"
endpoint: "127.0.0.1:50051"
keepalive:
  max_connection_age: 1h30m
  time: 5s
  timeout: 2s
"#;

        let cfg: ServerConfig = serde_yaml::from_str(yaml).expect("deserialization should succeed");
        assert_eq!(cfg.endpoint, "127.0.0.1:50051");
        assert_eq!(cfg.keepalive.max_connection_age, Duration::from_secs(90 * 60));
        assert_eq!(cfg.keepalive.time, Duration::from_secs(5));
        assert_eq!(cfg.keepalive.timeout, Duration::from_secs(2));
        assert_eq!(cfg.max_frame_size, Some(4));
    }

    #[test]
    fn test_invalid_keepalive_duration_strings_fail_deserialize() {
        let invalid_yaml_cases = [
            "keepalive:\n  time: zz\n",
            "keepalive:\n  max_connection_age: 10x\n",
        ];
        for yaml in invalid_yaml_cases {
            let res: Result<ServerConfig, _> = serde_yaml::from_str(yaml);
            assert!(res.is_err(), "expected error for yaml: {}", yaml);
        }
    }
}
