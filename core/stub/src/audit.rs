// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Call auditing middleware.
//!
//! [`AuditLayer`] wraps any service taking an [`AuditedCall`] and emits one
//! `info!` record per unary call, after the inner service completes:
//!
//! ```text
//! RPC Call [/videoin.v1.VideoInService/HelloWorld] - Request: {"name":"test"} - Response: {"message":"Hello, test!"}
//! RPC Call [/videoin.v1.VideoInService/ProjectNew] - Request: {"project":"x"} - Error: unimplemented: ProjectNew is not implemented
//! ```
//!
//! The result of the inner service is returned untouched.

use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use pin_project::pin_project;
use serde::Serialize;
use tower_layer::Layer;
use tower_service::Service;
use tracing::{info, warn};

use crate::call::{AuditedCall, StreamType};

pub const AUDIT_TARGET: &str = "videoin::audit";

#[derive(Debug, Clone, Copy, Default)]
pub struct AuditLayer;

impl AuditLayer {
    pub fn new() -> Self {
        AuditLayer
    }
}

impl<S> Layer<S> for AuditLayer {
    type Service = Audit<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Audit::new(inner)
    }
}

#[derive(Debug, Clone)]
pub struct Audit<S> {
    inner: S,
}

impl<S> Audit<S> {
    pub fn new(inner: S) -> Self {
        Audit { inner }
    }
}

impl<S, C> Service<C> for Audit<S>
where
    S: Service<C>,
    S::Response: Serialize,
    S::Error: Display,
    C: AuditedCall,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = AuditFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, call: C) -> Self::Future {
        if call.stream_type() != StreamType::Unary {
            return AuditFuture {
                inner: self.inner.call(call),
                record: None,
            };
        }

        let record = Record {
            procedure: call.procedure(),
            request: call.render().unwrap_or_else(|e| {
                warn!(target: AUDIT_TARGET, error = %e, "cannot render request");
                String::new()
            }),
        };

        AuditFuture {
            inner: self.inner.call(call),
            record: Some(record),
        }
    }
}

#[derive(Debug)]
struct Record {
    procedure: String,
    request: String,
}

#[pin_project]
pub struct AuditFuture<F> {
    #[pin]
    inner: F,
    // none for calls that are not audited
    record: Option<Record>,
}

impl<F, T, E> Future for AuditFuture<F>
where
    F: Future<Output = Result<T, E>>,
    T: Serialize,
    E: Display,
{
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let result = std::task::ready!(this.inner.poll(cx));

        if let Some(record) = this.record.take() {
            match &result {
                Ok(resp) => {
                    let resp = serde_json::to_string(resp).unwrap_or_else(|e| {
                        warn!(target: AUDIT_TARGET, error = %e, "cannot render response");
                        String::new()
                    });
                    info!(
                        target: AUDIT_TARGET,
                        "RPC Call [{}] - Request: {} - Response: {}",
                        record.procedure,
                        record.request,
                        resp
                    );
                }
                Err(err) => {
                    info!(
                        target: AUDIT_TARGET,
                        "RPC Call [{}] - Request: {} - Error: {}",
                        record.procedure,
                        record.request,
                        err
                    );
                }
            }
        }

        Poll::Ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::v1;
    use crate::call::RpcCall;
    use crate::errors::RpcError;
    use crate::stub::StubService;
    use tower::{ServiceBuilder, ServiceExt, service_fn};
    use tracing::Instrument;
    use tracing_test::traced_test;

    struct OddCall {
        stream_type: StreamType,
        renders: bool,
    }

    impl AuditedCall for OddCall {
        fn procedure(&self) -> String {
            "/test.Odd/Call".to_string()
        }

        fn stream_type(&self) -> StreamType {
            self.stream_type
        }

        fn render(&self) -> Result<String, serde_json::Error> {
            if self.renders {
                Ok(r#"{"odd":true}"#.to_string())
            } else {
                Err(serde::ser::Error::custom("request cannot be rendered"))
            }
        }
    }

    struct Unrenderable;

    impl Serialize for Unrenderable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("response cannot be rendered"))
        }
    }

    fn audited_stub() -> Audit<StubService> {
        ServiceBuilder::new()
            .layer(AuditLayer::new())
            .service(StubService::default())
    }

    #[tokio::test]
    #[traced_test]
    async fn test_audit_successful_call() {
        let call = RpcCall::from(v1::HelloWorldRequest {
            name: "test".to_string(),
        });

        let reply = audited_stub().oneshot(call.clone()).await.unwrap();
        let direct = StubService::default().oneshot(call).await.unwrap();
        assert_eq!(reply, direct);

        assert!(logs_contain(
            r#"RPC Call [/videoin.v1.VideoInService/HelloWorld] - Request: {"name":"test"} - Response: {"message":"Hello, test!"}"#
        ));
        assert!(!logs_contain("- Error:"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_audit_failed_call() {
        let call = RpcCall::from(v1::ProjectGetRequest {
            project: "Missing".to_string(),
        });

        let err = audited_stub().oneshot(call).await.unwrap_err();
        assert_eq!(
            err,
            RpcError::NotFound("project not found: Missing".to_string())
        );

        assert!(logs_contain(
            r#"RPC Call [/videoin.v1.VideoInService/ProjectGet] - Request: {"project":"Missing"} - Error: not_found: project not found: Missing"#
        ));
        assert!(!logs_contain("- Response:"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_audit_unimplemented_call() {
        let call = RpcCall::from(v1::ProjectNewRequest {
            project: "New".to_string(),
        });

        let err = audited_stub().oneshot(call).await.unwrap_err();
        assert_eq!(err.message(), "ProjectNew is not implemented");

        assert!(logs_contain("RPC Call [/videoin.v1.VideoInService/ProjectNew]"));
        assert!(logs_contain("Error: unimplemented: ProjectNew is not implemented"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_audit_render_failures_do_not_fail_the_call() {
        let svc = Audit::new(service_fn(|_call: OddCall| async {
            Ok::<_, RpcError>(Unrenderable)
        }));

        let res = svc
            .oneshot(OddCall {
                stream_type: StreamType::Unary,
                renders: false,
            })
            .await;
        assert!(res.is_ok());

        assert!(logs_contain("RPC Call [/test.Odd/Call] - Request:  - Response:"));
        assert!(logs_contain("cannot render request"));
        assert!(logs_contain("cannot render response"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_audit_skips_streaming_calls() {
        let svc = Audit::new(service_fn(|_call: OddCall| async {
            Ok::<_, RpcError>("streamed")
        }));

        for stream_type in [
            StreamType::ClientStream,
            StreamType::ServerStream,
            StreamType::BidiStream,
        ] {
            let resp = svc
                .clone()
                .oneshot(OddCall {
                    stream_type,
                    renders: true,
                })
                .await
                .unwrap();
            assert_eq!(resp, "streamed");
        }

        assert!(!logs_contain("RPC Call"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_audit_one_record_per_call() {
        let mut svc = audited_stub();

        for name in ["", "test", "world", "unknown"] {
            let _ = (&mut svc)
                .oneshot(RpcCall::from(v1::HelloWorldRequest {
                    name: name.to_string(),
                }))
                .await;
        }

        logs_assert(|lines: &[&str]| {
            let records = lines.iter().filter(|l| l.contains("RPC Call [")).count();
            if records == 4 {
                Ok(())
            } else {
                Err(format!("expected 4 audit records, found {records}"))
            }
        });
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[traced_test]
    async fn test_audit_one_record_per_concurrent_call() {
        let svc = audited_stub();
        let mut calls = tokio::task::JoinSet::new();

        for i in 0..50 {
            let call = if i % 2 == 0 {
                RpcCall::from(v1::HelloWorldRequest {
                    name: "test".to_string(),
                })
            } else {
                RpcCall::from(v1::ProjectGetRequest {
                    project: "Missing".to_string(),
                })
            };
            calls.spawn(
                svc.clone()
                    .oneshot(call)
                    .instrument(tracing::Span::current()),
            );
        }

        let mut failed = 0;
        while let Some(result) = calls.join_next().await {
            if result.unwrap().is_err() {
                failed += 1;
            }
        }
        assert_eq!(failed, 25);

        logs_assert(|lines: &[&str]| {
            let records = lines.iter().filter(|l| l.contains("RPC Call [")).count();
            let errors = lines
                .iter()
                .filter(|l| l.contains("RPC Call [") && l.contains(" - Error: "))
                .count();
            if records == 50 && errors == 25 {
                Ok(())
            } else {
                Err(format!(
                    "expected 50 audit records with 25 errors, found {records} with {errors}"
                ))
            }
        });
    }
}
