use crate::proto::agro::v1::user_service_server::UserServiceServer;
use crate::services::health_service::HealthService;
use crate::services::user_service::UserService;
use axum::http::{HeaderName, Request, Response};
use axum::{Router, routing::get};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tower_http::classify::GrpcFailureClass;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{MakeSpan, TraceLayer};

pub mod health;
pub mod schemas;
pub mod users;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct MgmtState {
    pub health_service: HealthService,
}

#[derive(Debug)]
pub struct ServiceContainer {
    pub user_service: UserService,
}

/// Opens one span per RPC, named after the gRPC service and method in the path.
#[derive(Clone, Copy, Debug)]
struct RpcMakeSpan;

impl<B> MakeSpan<B> for RpcMakeSpan {
    fn make_span(&mut self, request: &Request<B>) -> tracing::Span {
        let request_id =
            request.headers().get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()).unwrap_or_default();

        // Paths look like `/agro.v1.UserService/CreateUser`.
        let (service, method) = request.uri().path().trim_start_matches('/').split_once('/').unwrap_or_default();

        tracing::info_span!(
            "rpc",
            "request_id" = %request_id,
            "rpc.system" = "grpc",
            "rpc.service" = %service,
            "rpc.method" = %method,
            "otel.kind" = "server",
        )
    }
}

/// Serves the gRPC API on `listener` until `shutdown_rx` flips to `true`.
///
/// # Errors
/// Returns the transport error if the server fails.
pub async fn serve_rpc(
    listener: TcpListener,
    services: ServiceContainer,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), tonic::transport::Error> {
    let user_handler = users::UserHandler::new(services.user_service);
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Server::builder()
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(request_id))
        .layer(
            TraceLayer::new_for_grpc()
                .make_span_with(RpcMakeSpan)
                .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
                    tracing::info!(
                        latency_ms = %latency.as_millis(),
                        status = %response.status().as_u16(),
                        "rpc completed"
                    );
                })
                .on_failure(|failure: GrpcFailureClass, latency: Duration, _span: &tracing::Span| {
                    tracing::warn!(error = %failure, latency_ms = %latency.as_millis(), "rpc failed");
                }),
        )
        .add_service(UserServiceServer::new(user_handler))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
            let _ = shutdown_rx.wait_for(|&s| s).await;
        })
        .await
}

pub fn mgmt_router(state: MgmtState) -> Router {
    Router::new().route("/livez", get(health::livez)).route("/readyz", get(health::readyz)).with_state(state)
}
