// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use tonic::{Request, Response, Status};
use tower::ServiceExt;
use tower_service::Service;

use crate::api::v1;
use crate::api::v1::video_in_service_server::VideoInService;
use crate::call::{RpcCall, RpcReply};

/// Exposes a service over [`RpcCall`] as the generated gRPC service trait.
#[derive(Debug, Clone)]
pub struct VideoInGrpc<S> {
    inner: S,
}

impl<S> VideoInGrpc<S> {
    pub fn new(inner: S) -> Self {
        VideoInGrpc { inner }
    }
}

impl<S> VideoInGrpc<S>
where
    S: Service<RpcCall, Response = RpcReply> + Clone + Send + Sync + 'static,
    S::Error: Into<Status>,
    S::Future: Send,
{
    async fn dispatch<Req, Resp>(&self, request: Request<Req>) -> Result<Response<Resp>, Status>
    where
        Req: Into<RpcCall>,
        Resp: TryFrom<RpcReply, Error = RpcReply>,
    {
        let call: RpcCall = request.into_inner().into();
        let operation = call.operation();

        let reply = self
            .inner
            .clone()
            .oneshot(call)
            .await
            .map_err(Into::<Status>::into)?;

        Resp::try_from(reply).map(Response::new).map_err(|reply| {
            Status::internal(format!(
                "unexpected {} reply to a {} call",
                reply.operation().method(),
                operation.method()
            ))
        })
    }
}

#[tonic::async_trait]
impl<S> VideoInService for VideoInGrpc<S>
where
    S: Service<RpcCall, Response = RpcReply> + Clone + Send + Sync + 'static,
    S::Error: Into<Status>,
    S::Future: Send,
{
    async fn hello_world(
        &self,
        request: Request<v1::HelloWorldRequest>,
    ) -> Result<Response<v1::HelloWorldResponse>, Status> {
        self.dispatch(request).await
    }

    async fn project_list(
        &self,
        request: Request<v1::ProjectListRequest>,
    ) -> Result<Response<v1::ProjectListResponse>, Status> {
        self.dispatch(request).await
    }

    async fn project_new(
        &self,
        request: Request<v1::ProjectNewRequest>,
    ) -> Result<Response<v1::ProjectNewResponse>, Status> {
        self.dispatch(request).await
    }

    async fn project_get(
        &self,
        request: Request<v1::ProjectGetRequest>,
    ) -> Result<Response<v1::ProjectGetResponse>, Status> {
        self.dispatch(request).await
    }

    async fn project_assign_disk_dirs(
        &self,
        request: Request<v1::ProjectAssignDiskDirsRequest>,
    ) -> Result<Response<v1::ProjectAssignDiskDirsResponse>, Status> {
        self.dispatch(request).await
    }

    async fn project_categorize_files(
        &self,
        request: Request<v1::ProjectCategorizeFilesRequest>,
    ) -> Result<Response<v1::ProjectCategorizeFilesResponse>, Status> {
        self.dispatch(request).await
    }

    async fn project_set_metadata(
        &self,
        request: Request<v1::ProjectSetMetadataRequest>,
    ) -> Result<Response<v1::ProjectSetMetadataResponse>, Status> {
        self.dispatch(request).await
    }

    async fn project_finish(
        &self,
        request: Request<v1::ProjectFinishRequest>,
    ) -> Result<Response<v1::ProjectFinishResponse>, Status> {
        self.dispatch(request).await
    }

    async fn project_abandon(
        &self,
        request: Request<v1::ProjectAbandonRequest>,
    ) -> Result<Response<v1::ProjectAbandonResponse>, Status> {
        self.dispatch(request).await
    }

    async fn unclaimed_disc_dir_list(
        &self,
        request: Request<v1::UnclaimedDiscDirListRequest>,
    ) -> Result<Response<v1::UnclaimedDiscDirListResponse>, Status> {
        self.dispatch(request).await
    }

    async fn movie_search(
        &self,
        request: Request<v1::MovieSearchRequest>,
    ) -> Result<Response<v1::MovieSearchResponse>, Status> {
        self.dispatch(request).await
    }
}
