// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::net::SocketAddr;

use serde::Deserialize;
use tower::ServiceBuilder as LayerBuilder;
use tracing::{debug, info};

use videoin_config::component::configuration::Configuration;
use videoin_config::component::id::{ID, IdError, Kind};
use videoin_config::component::{Component, ComponentBuilder};
use videoin_config::grpc::errors::ConfigError;
use videoin_config::grpc::server::{ServerConfig, ServerHandle};

use crate::api::v1::video_in_service_server::VideoInServiceServer;
use crate::audit::{Audit, AuditLayer};
use crate::errors::ServiceError;
use crate::fixture::Fixtures;
use crate::grpc::VideoInGrpc;
use crate::stub::StubService;

// Define the kind of the component as static string
pub const KIND: &str = "videoin-stub";

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfiguration {
    /// gRPC server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Fixture file replacing the built-in dataset and greeting table
    #[serde(default)]
    pub fixtures: Option<String>,
}

impl ServiceConfiguration {
    pub fn new() -> Self {
        ServiceConfiguration::default()
    }

    pub fn with_server(self, server: ServerConfig) -> Self {
        ServiceConfiguration { server, ..self }
    }

    pub fn with_fixtures(self, fixtures: &str) -> Self {
        ServiceConfiguration {
            fixtures: Some(fixtures.to_string()),
            ..self
        }
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    pub fn fixtures(&self) -> Option<&str> {
        self.fixtures.as_deref()
    }

    /// Load the fixtures and build the service. Nothing is bound yet.
    pub fn build_server(&self, id: ID) -> Result<Service, ServiceError> {
        self.validate()?;

        let fixtures = match self.fixtures() {
            Some(path) => Fixtures::load(path)?,
            None => Fixtures::builtin(),
        };

        Ok(Service::new(id)
            .with_config(self.clone())
            .with_stub(StubService::new(fixtures)))
    }
}

impl Configuration for ServiceConfiguration {
    type Error = ConfigError;

    fn validate(&self) -> Result<(), Self::Error> {
        self.server.validate()
    }
}

pub type GrpcServer = VideoInServiceServer<VideoInGrpc<Audit<StubService>>>;

#[derive(Debug)]
pub struct Service {
    /// id of the service
    id: ID,

    /// the configuration of the service
    config: ServiceConfiguration,

    /// handlers answering the calls
    stub: StubService,

    /// signal to drain the running server
    signal: Option<drain::Signal>,

    /// handle of the running server
    handle: Option<ServerHandle>,
}

impl Service {
    /// Create a new Service answering from the built-in fixtures
    pub fn new(id: ID) -> Self {
        Service {
            id,
            config: ServiceConfiguration::new(),
            stub: StubService::default(),
            signal: None,
            handle: None,
        }
    }

    /// Set the configuration of the service
    pub fn with_config(self, config: ServiceConfiguration) -> Self {
        Service { config, ..self }
    }

    pub fn with_stub(self, stub: StubService) -> Self {
        Service { stub, ..self }
    }

    /// get the service configuration
    pub fn config(&self) -> &ServiceConfiguration {
        &self.config
    }

    pub fn stub(&self) -> &StubService {
        &self.stub
    }

    /// Address the server is bound to, once running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.handle.as_ref().map(ServerHandle::local_addr)
    }

    /// The gRPC service: every call is audited, then handled by the stub.
    pub fn grpc_server(&self) -> GrpcServer {
        let audited = LayerBuilder::new()
            .layer(AuditLayer::new())
            .service(self.stub.clone());

        VideoInServiceServer::new(VideoInGrpc::new(audited))
    }

    /// Run the service
    pub async fn run(&mut self) -> Result<(), ServiceError> {
        if self.signal.is_some() {
            return Err(ServiceError::ServerAlreadyRunning);
        }

        info!(endpoint = %self.config.server.endpoint, "starting server");

        let (signal, watch) = drain::channel();
        let handle = self
            .config
            .server
            .run_server(self.grpc_server(), watch)
            .await?;

        self.signal = Some(signal);
        self.handle = Some(handle);

        Ok(())
    }

    /// Drain the running server. Returns once the server released the
    /// drain watch; a service that is not running is left untouched.
    pub async fn stop(&mut self) {
        self.handle = None;

        match self.signal.take() {
            Some(signal) => {
                debug!(id = %self.id, "draining server");
                signal.drain().await;
                info!(id = %self.id, "server drained");
            }
            None => debug!(id = %self.id, "service not running"),
        }
    }
}

#[async_trait::async_trait]
impl Component for Service {
    type Error = ServiceError;

    fn identifier(&self) -> &ID {
        &self.id
    }

    async fn start(&mut self) -> Result<(), ServiceError> {
        info!(id = %self.id, "starting service");
        self.run().await
    }

    async fn shutdown(&mut self) -> Result<(), ServiceError> {
        info!(id = %self.id, "shutting down service");
        self.stop().await;
        Ok(())
    }
}

#[derive(PartialEq, Eq, Hash, Default)]
pub struct ServiceBuilder;

impl ServiceBuilder {
    pub fn new() -> Self {
        ServiceBuilder {}
    }

    pub fn kind() -> Result<Kind, IdError> {
        Kind::new(KIND)
    }
}

impl ComponentBuilder for ServiceBuilder {
    type Config = ServiceConfiguration;
    type Component = Service;

    // Kind of the component
    fn kind(&self) -> Result<Kind, IdError> {
        ServiceBuilder::kind()
    }

    // Build the component
    fn build(&self, name: String) -> Result<Self::Component, ServiceError> {
        let id = ID::new_with_name(ServiceBuilder::kind()?, &name)?;

        Ok(Service::new(id))
    }

    // Build the component with its configuration
    fn build_with_config(
        &self,
        name: &str,
        config: &Self::Config,
    ) -> Result<Self::Component, ServiceError> {
        let id = ID::new_with_name(ServiceBuilder::kind()?, name)?;

        config.build_server(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FixtureError;
    use std::time::Duration;
    use tokio::time;
    use tracing_test::traced_test;

    static TEST_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata");

    fn test_id() -> ID {
        ID::new_with_name(Kind::new(KIND).unwrap(), "test").unwrap()
    }

    #[test]
    fn test_service_configuration() {
        let config = ServiceConfiguration::new();
        assert_eq!(config.server().endpoint, "0.0.0.0:8080");
        assert_eq!(config.fixtures(), None);
        assert!(config.validate().is_ok());

        let config: ServiceConfiguration = serde_yaml::from_str(
            r#"
server:
  endpoint: "127.0.0.1:50051"
fixtures: /tmp/fixtures.yaml
"#,
        )
        .unwrap();
        assert_eq!(config.server().endpoint, "127.0.0.1:50051");
        assert_eq!(config.fixtures(), Some("/tmp/fixtures.yaml"));

        let res: Result<ServiceConfiguration, _> = serde_yaml::from_str("servers: []\n");
        assert!(res.is_err());
    }

    #[test]
    fn test_build_server_validates_and_loads_fixtures() {
        let config = ServiceConfiguration::new()
            .with_server(ServerConfig::with_endpoint("127.0.0.1:0"))
            .with_fixtures(&format!("{}/fixtures.yaml", TEST_PATH));
        let service = config.build_server(test_id()).unwrap();
        assert_eq!(
            service.stub().dataset().project_names().collect::<Vec<_>>(),
            ["Alpha", "Beta"]
        );

        let config = ServiceConfiguration::new().with_server(ServerConfig::with_endpoint("nope"));
        assert!(matches!(
            config.build_server(test_id()),
            Err(ServiceError::ConfigError(ConfigError::EndpointParse(_)))
        ));

        let config = ServiceConfiguration::new()
            .with_fixtures(&format!("{}/fixtures-duplicate.yaml", TEST_PATH));
        assert!(matches!(
            config.build_server(test_id()),
            Err(ServiceError::FixtureError(FixtureError::DuplicateProject(_)))
        ));
    }

    #[test]
    fn test_service_builder() {
        let builder = ServiceBuilder::new();
        assert_eq!(ComponentBuilder::kind(&builder).unwrap().to_string(), KIND);

        let service = builder.build("stub".to_string()).unwrap();
        assert_eq!(service.identifier().to_string(), "videoin-stub/stub");

        let config = ServiceConfiguration::new();
        let service = builder.build_with_config("other", &config).unwrap();
        assert_eq!(service.identifier().name(), "other");

        assert!(builder.build(String::new()).is_err());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_service_run_and_shutdown() {
        let config =
            ServiceConfiguration::new().with_server(ServerConfig::with_endpoint("127.0.0.1:0"));
        let mut service = config.build_server(test_id()).unwrap();
        assert!(service.local_addr().is_none());

        service.start().await.unwrap();
        let addr = service.local_addr().unwrap();
        assert_ne!(addr.port(), 0);

        assert!(matches!(
            service.run().await,
            Err(ServiceError::ServerAlreadyRunning)
        ));

        assert!(logs_contain("starting service"));
        assert!(logs_contain("server listening"));

        match time::timeout(Duration::from_secs(10), service.shutdown()).await {
            Ok(res) => res.unwrap(),
            Err(_) => panic!("timeout waiting for drain"),
        }
        assert!(service.local_addr().is_none());
        assert!(logs_contain("server drained"));

        // stopping twice is harmless
        service.shutdown().await.unwrap();
    }
}
