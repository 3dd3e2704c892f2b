// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

pub mod api;
pub mod audit;
pub mod call;
pub mod dataset;
pub mod errors;
pub mod fixture;
pub mod grpc;
pub mod mapping;
pub mod service;
pub mod stub;

pub use audit::{Audit, AuditLayer};
pub use call::{Operation, RpcCall, RpcReply};
pub use errors::{FixtureError, RpcError, ServiceError};
pub use fixture::Fixtures;
pub use service::{KIND, Service, ServiceBuilder, ServiceConfiguration};
pub use stub::StubService;
