use crate::body::ResponseBody;
use crate::engine::Engine;
use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug)]
pub struct ServerBuilder {
    engine: Option<Engine>,
    address: Option<Vec<SocketAddr>>,
    address_error: Option<io::Error>,
    max_log_level: Level,
    max_body_size: usize,
}

/// Request bodies larger than this are answered with `413` unless configured otherwise
pub const DEFAULT_MAX_BODY_SIZE: usize = 4 * 1024 * 1024;

impl ServerBuilder {
    fn new() -> Self {
        Self {
            engine: None,
            address: None,
            address_error: None,
            max_log_level: Level::INFO,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        match address.to_socket_addrs() {
            Ok(addresses) => {
                self.address = Some(addresses.collect::<Vec<_>>());
                self.address_error = None;
            }
            Err(e) => self.address_error = Some(e),
        }
        self
    }

    pub fn engine(mut self, engine: Engine) -> Self {
        self.engine = Some(engine);
        self
    }

    /// The most verbose level the subscriber installed by [`Server::start`] lets through
    pub fn max_log_level(mut self, level: Level) -> Self {
        self.max_log_level = level;
        self
    }

    /// The largest request body, in bytes, buffered before dispatch
    pub fn max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        if let Some(source) = self.address_error {
            return Err(ServerBuildError::InvalidAddress { source });
        }
        let engine = self.engine.ok_or(ServerBuildError::MissingEngine)?;
        let address = self.address.filter(|address| !address.is_empty()).ok_or(ServerBuildError::MissingAddress)?;
        Ok(Server {
            engine: Arc::new(engine),
            address,
            max_log_level: self.max_log_level,
            max_body_size: self.max_body_size,
        })
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("engine must be set")]
    MissingEngine,
    #[error("address must be set")]
    MissingAddress,
    #[error("invalid address: {source}")]
    InvalidAddress { source: io::Error },
}

/// Serves an [`Engine`] over HTTP/1.1.
///
/// Every accepted connection runs on its own task, a failing connection never affects
/// the others.
#[derive(Debug)]
pub struct Server {
    engine: Arc<Engine>,
    address: Vec<SocketAddr>,
    max_log_level: Level,
    max_body_size: usize,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn address(&self) -> &[SocketAddr] {
        &self.address
    }

    /// Installs a global fmt subscriber, binds the address and serves until the process stops
    pub async fn start(self) {
        let subscriber = FmtSubscriber::builder().with_max_level(self.max_log_level).finish();
        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            warn!(cause = %e, "global subscriber already set, keep using it");
        }

        info!("start listening at {:?}", self.address);
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return;
            }
        };

        self.serve(tcp_listener).await;
    }

    /// Accepts connections from an already bound listener
    pub async fn serve(self, tcp_listener: TcpListener) {
        loop {
            let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let engine = Arc::clone(&self.engine);
            let max_body_size = self.max_body_size;

            tokio::spawn(async move {
                let service = service_fn(move |request: Request<Incoming>| {
                    let engine = Arc::clone(&engine);
                    async move { Ok::<_, Infallible>(dispatch(&engine, request, max_body_size).await) }
                });

                match http1::Builder::new().serve_connection(TokioIo::new(tcp_stream), service).await {
                    Ok(()) => {
                        debug!(%remote_addr, "finished process, connection shutdown");
                    }
                    Err(e) => {
                        error!(%remote_addr, cause = %e, "service has error, connection shutdown");
                    }
                }
            });
        }
    }
}

async fn dispatch(engine: &Engine, request: Request<Incoming>, max_body_size: usize) -> Response<ResponseBody> {
    let (parts, body) = request.into_parts();
    let body: Bytes = match Limited::new(body, max_body_size).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => {
            warn!(max_body_size, uri = %parts.uri, "request body too large");
            return plain_response(StatusCode::PAYLOAD_TOO_LARGE, "request body too large");
        }
        Err(e) => {
            warn!(cause = %e, "read request body error");
            return plain_response(StatusCode::BAD_REQUEST, "failed to read request body");
        }
    };

    engine.handle(Request::from_parts(parts, body)).await
}

fn plain_response(status: StatusCode, message: &'static str) -> Response<ResponseBody> {
    let mut response = Response::new(ResponseBody::from(message));
    *response.status_mut() = status;
    response
}
