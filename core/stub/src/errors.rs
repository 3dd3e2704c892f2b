// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;
use tonic::{Code, Status};

use videoin_config::component::id::IdError;
use videoin_config::grpc::errors::ConfigError;

/// Failure of a single operation. Propagated untouched through the auditor
/// and mapped to a gRPC status at the transport boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// The request or the entity it names has no match.
    #[error("not_found: {0}")]
    NotFound(String),

    /// The operation is deliberately not built.
    #[error("unimplemented: {0}")]
    Unimplemented(String),
}

impl RpcError {
    pub fn code(&self) -> Code {
        match self {
            RpcError::NotFound(_) => Code::NotFound,
            RpcError::Unimplemented(_) => Code::Unimplemented,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            RpcError::NotFound(msg) | RpcError::Unimplemented(msg) => msg,
        }
    }
}

impl From<RpcError> for Status {
    fn from(err: RpcError) -> Self {
        Status::new(err.code(), err.message())
    }
}

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("cannot read fixture file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid fixture yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("duplicate project name: {0}")]
    DuplicateProject(String),
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("fixture error: {0}")]
    FixtureError(#[from] FixtureError),
    #[error("component id error: {0}")]
    IdError(#[from] IdError),
    #[error("server already running")]
    ServerAlreadyRunning,
}
