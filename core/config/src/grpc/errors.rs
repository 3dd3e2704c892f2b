// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors raised while validating or starting a gRPC server.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing grpc endpoint")]
    MissingEndpoint,
    #[error("endpoint parse error: {0}")]
    EndpointParse(#[from] std::net::AddrParseError),
    #[error("bind error: {0}")]
    Bind(#[from] std::io::Error),
    #[error("invalid max frame size: {0} MiB")]
    InvalidMaxFrameSize(u32),
}
