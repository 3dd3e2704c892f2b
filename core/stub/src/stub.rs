// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::future::{Ready, ready};
use std::sync::Arc;
use std::task::{Context, Poll};

use tower_service::Service;
use tracing::debug;

use crate::api::v1;
use crate::call::{Operation, RpcCall, RpcReply};
use crate::dataset::Dataset;
use crate::errors::RpcError;
use crate::fixture::Fixtures;
use crate::mapping::{MappingTables, find_matching_response};

/// Handlers of every operation of the video-in API.
///
/// Cloning is cheap: the dataset and the mapping tables are shared and never
/// written after construction.
#[derive(Debug, Clone)]
pub struct StubService {
    dataset: Arc<Dataset>,
    tables: Arc<MappingTables>,
}

impl Default for StubService {
    fn default() -> Self {
        StubService::new(Fixtures::builtin())
    }
}

fn not_implemented<T>(op: Operation) -> Result<T, RpcError> {
    Err(RpcError::Unimplemented(format!(
        "{} is not implemented",
        op.method()
    )))
}

impl StubService {
    pub fn new(fixtures: Fixtures) -> Self {
        StubService {
            dataset: Arc::new(fixtures.dataset),
            tables: Arc::new(fixtures.tables),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn hello_world(
        &self,
        req: &v1::HelloWorldRequest,
    ) -> Result<v1::HelloWorldResponse, RpcError> {
        find_matching_response(req, &self.tables.hello_world)
    }

    pub fn project_list(
        &self,
        _req: &v1::ProjectListRequest,
    ) -> Result<v1::ProjectListResponse, RpcError> {
        Ok(v1::ProjectListResponse {
            projects: self.dataset.project_names().map(str::to_string).collect(),
        })
    }

    pub fn project_get(
        &self,
        req: &v1::ProjectGetRequest,
    ) -> Result<v1::ProjectGetResponse, RpcError> {
        self.dataset
            .find_project(&req.project)
            .map(Into::into)
            .ok_or_else(|| RpcError::NotFound(format!("project not found: {}", req.project)))
    }

    pub fn unclaimed_disc_dir_list(
        &self,
        _req: &v1::UnclaimedDiscDirListRequest,
    ) -> Result<v1::UnclaimedDiscDirListResponse, RpcError> {
        Ok(v1::UnclaimedDiscDirListResponse {
            dirs: self.dataset.unclaimed().to_vec(),
        })
    }

    pub fn movie_search(
        &self,
        req: &v1::MovieSearchRequest,
    ) -> Result<v1::MovieSearchResponse, RpcError> {
        Ok(v1::MovieSearchResponse {
            results: self
                .dataset
                .find_metadata(&req.partial_title)
                .map(Into::into)
                .collect(),
        })
    }

    pub fn project_new(
        &self,
        _req: &v1::ProjectNewRequest,
    ) -> Result<v1::ProjectNewResponse, RpcError> {
        not_implemented(Operation::ProjectNew)
    }

    pub fn project_assign_disk_dirs(
        &self,
        _req: &v1::ProjectAssignDiskDirsRequest,
    ) -> Result<v1::ProjectAssignDiskDirsResponse, RpcError> {
        not_implemented(Operation::ProjectAssignDiskDirs)
    }

    pub fn project_categorize_files(
        &self,
        _req: &v1::ProjectCategorizeFilesRequest,
    ) -> Result<v1::ProjectCategorizeFilesResponse, RpcError> {
        not_implemented(Operation::ProjectCategorizeFiles)
    }

    pub fn project_set_metadata(
        &self,
        _req: &v1::ProjectSetMetadataRequest,
    ) -> Result<v1::ProjectSetMetadataResponse, RpcError> {
        not_implemented(Operation::ProjectSetMetadata)
    }

    pub fn project_finish(
        &self,
        _req: &v1::ProjectFinishRequest,
    ) -> Result<v1::ProjectFinishResponse, RpcError> {
        not_implemented(Operation::ProjectFinish)
    }

    pub fn project_abandon(
        &self,
        _req: &v1::ProjectAbandonRequest,
    ) -> Result<v1::ProjectAbandonResponse, RpcError> {
        not_implemented(Operation::ProjectAbandon)
    }

    /// Route a call to the handler of its operation.
    pub fn handle(&self, call: &RpcCall) -> Result<RpcReply, RpcError> {
        debug!(operation = call.operation().method(), "handling call");

        match call {
            RpcCall::HelloWorld(req) => self.hello_world(req).map(Into::into),
            RpcCall::ProjectList(req) => self.project_list(req).map(Into::into),
            RpcCall::ProjectNew(req) => self.project_new(req).map(Into::into),
            RpcCall::ProjectGet(req) => self.project_get(req).map(Into::into),
            RpcCall::ProjectAssignDiskDirs(req) => {
                self.project_assign_disk_dirs(req).map(Into::into)
            }
            RpcCall::ProjectCategorizeFiles(req) => {
                self.project_categorize_files(req).map(Into::into)
            }
            RpcCall::ProjectSetMetadata(req) => self.project_set_metadata(req).map(Into::into),
            RpcCall::ProjectFinish(req) => self.project_finish(req).map(Into::into),
            RpcCall::ProjectAbandon(req) => self.project_abandon(req).map(Into::into),
            RpcCall::UnclaimedDiscDirList(req) => {
                self.unclaimed_disc_dir_list(req).map(Into::into)
            }
            RpcCall::MovieSearch(req) => self.movie_search(req).map(Into::into),
        }
    }
}

impl Service<RpcCall> for StubService {
    type Response = RpcReply;
    type Error = RpcError;
    type Future = Ready<Result<RpcReply, RpcError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, call: RpcCall) -> Self::Future {
        ready(self.handle(&call))
    }
}
