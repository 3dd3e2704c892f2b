// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Tagged request and reply envelopes, one variant per operation.
//!
//! Handlers and middleware work on [`RpcCall`] / [`RpcReply`] so a single
//! `tower::Service` covers the whole API and layers such as the call auditor
//! apply uniformly to every operation.

use serde::Serialize;

use crate::api::v1;

pub const SERVICE_NAME: &str = "videoin.v1.VideoInService";

/// Shape of a call, as in the service description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamType {
    Unary,
    ClientStream,
    ServerStream,
    BidiStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    HelloWorld,
    ProjectList,
    ProjectNew,
    ProjectGet,
    ProjectAssignDiskDirs,
    ProjectCategorizeFiles,
    ProjectSetMetadata,
    ProjectFinish,
    ProjectAbandon,
    UnclaimedDiscDirList,
    MovieSearch,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Operation::HelloWorld,
        Operation::ProjectList,
        Operation::ProjectNew,
        Operation::ProjectGet,
        Operation::ProjectAssignDiskDirs,
        Operation::ProjectCategorizeFiles,
        Operation::ProjectSetMetadata,
        Operation::ProjectFinish,
        Operation::ProjectAbandon,
        Operation::UnclaimedDiscDirList,
        Operation::MovieSearch,
    ];

    /// Method name as declared in the service description.
    pub fn method(&self) -> &'static str {
        match self {
            Operation::HelloWorld => "HelloWorld",
            Operation::ProjectList => "ProjectList",
            Operation::ProjectNew => "ProjectNew",
            Operation::ProjectGet => "ProjectGet",
            Operation::ProjectAssignDiskDirs => "ProjectAssignDiskDirs",
            Operation::ProjectCategorizeFiles => "ProjectCategorizeFiles",
            Operation::ProjectSetMetadata => "ProjectSetMetadata",
            Operation::ProjectFinish => "ProjectFinish",
            Operation::ProjectAbandon => "ProjectAbandon",
            Operation::UnclaimedDiscDirList => "UnclaimedDiscDirList",
            Operation::MovieSearch => "MovieSearch",
        }
    }

    /// Fully qualified procedure path, e.g. `/videoin.v1.VideoInService/HelloWorld`.
    pub fn procedure(&self) -> String {
        format!("/{}/{}", SERVICE_NAME, self.method())
    }

    pub fn stream_type(&self) -> StreamType {
        StreamType::Unary
    }
}

/// A call the auditor can observe.
pub trait AuditedCall {
    /// Identifying name of the operation.
    fn procedure(&self) -> String;

    fn stream_type(&self) -> StreamType {
        StreamType::Unary
    }

    /// Human-readable rendering of the request message.
    fn render(&self) -> Result<String, serde_json::Error>;
}

macro_rules! envelopes {
    ($($op:ident($req:ident => $resp:ident)),+ $(,)?) => {
        /// Request of any operation.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(untagged)]
        pub enum RpcCall {
            $($op(v1::$req),)+
        }

        /// Successful reply of any operation.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(untagged)]
        pub enum RpcReply {
            $($op(v1::$resp),)+
        }

        impl RpcCall {
            pub fn operation(&self) -> Operation {
                match self {
                    $(RpcCall::$op(_) => Operation::$op,)+
                }
            }
        }

        impl RpcReply {
            pub fn operation(&self) -> Operation {
                match self {
                    $(RpcReply::$op(_) => Operation::$op,)+
                }
            }
        }

        $(
            impl From<v1::$req> for RpcCall {
                fn from(req: v1::$req) -> Self {
                    RpcCall::$op(req)
                }
            }

            impl From<v1::$resp> for RpcReply {
                fn from(resp: v1::$resp) -> Self {
                    RpcReply::$op(resp)
                }
            }

            impl TryFrom<RpcReply> for v1::$resp {
                type Error = RpcReply;

                fn try_from(reply: RpcReply) -> Result<Self, Self::Error> {
                    match reply {
                        RpcReply::$op(resp) => Ok(resp),
                        other => Err(other),
                    }
                }
            }
        )+
    };
}

envelopes! {
    HelloWorld(HelloWorldRequest => HelloWorldResponse),
    ProjectList(ProjectListRequest => ProjectListResponse),
    ProjectNew(ProjectNewRequest => ProjectNewResponse),
    ProjectGet(ProjectGetRequest => ProjectGetResponse),
    ProjectAssignDiskDirs(ProjectAssignDiskDirsRequest => ProjectAssignDiskDirsResponse),
    ProjectCategorizeFiles(ProjectCategorizeFilesRequest => ProjectCategorizeFilesResponse),
    ProjectSetMetadata(ProjectSetMetadataRequest => ProjectSetMetadataResponse),
    ProjectFinish(ProjectFinishRequest => ProjectFinishResponse),
    ProjectAbandon(ProjectAbandonRequest => ProjectAbandonResponse),
    UnclaimedDiscDirList(UnclaimedDiscDirListRequest => UnclaimedDiscDirListResponse),
    MovieSearch(MovieSearchRequest => MovieSearchResponse),
}

impl AuditedCall for RpcCall {
    fn procedure(&self) -> String {
        self.operation().procedure()
    }

    fn stream_type(&self) -> StreamType {
        self.operation().stream_type()
    }

    fn render(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procedure_names() {
        assert_eq!(
            Operation::HelloWorld.procedure(),
            "/videoin.v1.VideoInService/HelloWorld"
        );
        for op in Operation::ALL {
            assert!(op.procedure().ends_with(op.method()));
            assert_eq!(op.stream_type(), StreamType::Unary);
        }
    }

    #[test]
    fn test_call_envelope() {
        let call = RpcCall::from(v1::ProjectGetRequest {
            project: "Empty".to_string(),
        });
        assert_eq!(call.operation(), Operation::ProjectGet);
        assert_eq!(call.procedure(), "/videoin.v1.VideoInService/ProjectGet");
        assert_eq!(call.render().unwrap(), r#"{"project":"Empty"}"#);
    }

    #[test]
    fn test_reply_envelope() {
        let reply = RpcReply::from(v1::HelloWorldResponse {
            message: "Hello, test!".to_string(),
        });
        assert_eq!(reply.operation(), Operation::HelloWorld);

        let wrong = v1::ProjectListResponse::try_from(reply.clone());
        assert_eq!(wrong, Err(reply.clone()));

        let resp = v1::HelloWorldResponse::try_from(reply).unwrap();
        assert_eq!(resp.message, "Hello, test!");
    }

    #[test]
    fn test_render_uses_camel_case_fields() {
        let call = RpcCall::from(v1::MovieSearchRequest {
            partial_title: "Movie".to_string(),
        });
        assert_eq!(call.render().unwrap(), r#"{"partialTitle":"Movie"}"#);
    }
}
