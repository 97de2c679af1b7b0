//! The per-request context threaded through the handler chain.
//!
//! A [`Context`] is created by the [`Engine`](crate::Engine) for every inbound request and
//! dropped once the response has been produced. It carries:
//! - the request and the path parameters bound by the router
//! - the handler chain (group middleware followed by one route handler) and its cursor
//! - the response being written: status, headers and a body buffer
//!
//! [`Context::next`] drives the chain. Every handler receives the context as its only
//! argument and may call `next` itself to run the remainder of the chain before
//! continuing with its own work.

use crate::body::ResponseBody;
use crate::handler::{Handler, HandlerResult};
use crate::request::PathParams;
use bytes::{Bytes, BytesMut};
use http::header::{self, HeaderMap, HeaderValue, IntoHeaderName};
use http::{Method, Request, Response, StatusCode, Uri};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

pub struct Context {
    request: Request<Bytes>,
    path: String,
    method: Method,
    params: PathParams,

    handlers: Vec<Arc<dyn Handler>>,
    /// position of the next handler to run
    index: usize,
    aborted: bool,

    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
}

impl Context {
    /// Creates a context for `request` whose chain starts with `handlers`
    pub fn new(request: Request<Bytes>, handlers: Vec<Arc<dyn Handler>>) -> Self {
        let path = decode_path(request.uri().path());
        let method = request.method().clone();
        Self {
            request,
            path,
            method,
            params: PathParams::empty(),
            handlers,
            index: 0,
            aborted: false,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
        }
    }

    pub fn request(&self) -> &Request<Bytes> {
        &self.request
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The percent-decoded request path, without the query string.
    ///
    /// Routing and group prefix matching run on this path, [`Context::uri`] keeps the raw form.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Returns the path parameter bound to `key` by the matched route
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    /// Returns the first value of `key` in the URL query string
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.request.uri().query()?;
        first_value(query.as_bytes(), key)
    }

    /// Returns the first value of `key` in an `application/x-www-form-urlencoded` body,
    /// falling back to the URL query string
    pub fn post_form(&self, key: &str) -> Option<String> {
        if self.is_form_body()
            && let Some(value) = first_value(self.request.body(), key)
        {
            return Some(value);
        }
        self.query(key)
    }

    fn is_form_body(&self) -> bool {
        self.request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<mime::Mime>().ok())
            .is_some_and(|content_type| content_type.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str())
    }

    pub(crate) fn set_params(&mut self, params: PathParams) {
        self.params = params;
    }

    pub(crate) fn extend_handlers(&mut self, handlers: impl IntoIterator<Item = Arc<dyn Handler>>) {
        self.handlers.extend(handlers);
    }

    pub(crate) fn push_handler(&mut self, handler: Arc<dyn Handler>) {
        self.handlers.push(handler);
    }

    /// Runs the remaining handlers of the chain in order.
    ///
    /// The cursor moves past a handler before the handler is invoked, so a handler that
    /// calls `next` itself drains the rest of the chain and then resumes its own work.
    /// The first error stops the chain and is returned to the caller.
    pub async fn next(&mut self) -> HandlerResult {
        while let Some(handler) = self.handlers.get(self.index).map(Arc::clone) {
            self.index += 1;
            handler.call(self).await?;
        }
        Ok(())
    }

    /// Prevents every handler after the current one from running, including the route handler
    pub fn abort(&mut self) {
        self.index = self.handlers.len();
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Aborts the chain and writes `{"message": message}` with the given status
    pub fn fail(&mut self, code: StatusCode, message: impl AsRef<str>) {
        self.abort();
        self.json(code, &serde_json::json!({ "message": message.as_ref() }));
    }

    pub fn status(&mut self, code: StatusCode) {
        self.status = code;
    }

    /// The last status written to the response
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Sets a response header, replacing any previous value
    pub fn set_header<K: IntoHeaderName>(&mut self, key: K, value: HeaderValue) {
        self.headers.insert(key, value);
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Appends raw bytes to the response body
    pub fn write(&mut self, data: impl AsRef<[u8]>) {
        self.body.extend_from_slice(data.as_ref());
    }

    pub fn string(&mut self, code: StatusCode, text: impl AsRef<str>) {
        self.set_header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        self.status(code);
        self.write(text.as_ref());
    }

    /// Writes `value` as pretty printed json
    pub fn json<T: Serialize + ?Sized>(&mut self, code: StatusCode, value: &T) {
        match serde_json::to_vec_pretty(value) {
            Ok(json) => {
                self.set_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
                self.status(code);
                self.write(json);
            }
            Err(e) => {
                error!(cause = %e, path = %self.path, "serialize json response error");
                self.status(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }

    pub fn data(&mut self, code: StatusCode, data: impl AsRef<[u8]>) {
        self.status(code);
        self.write(data);
    }

    pub fn html(&mut self, code: StatusCode, html: impl AsRef<str>) {
        self.set_header(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
        self.status(code);
        self.write(html.as_ref());
    }

    /// Drops everything written to the response so far
    pub fn reset_response(&mut self) {
        self.status = StatusCode::OK;
        self.headers.clear();
        self.body.clear();
    }

    pub fn into_response(self) -> Response<ResponseBody> {
        let mut response = Response::new(ResponseBody::once(self.body.freeze()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Invalid UTF-8 sequences are replaced rather than rejected
fn decode_path(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

fn first_value(input: &[u8], key: &str) -> Option<String> {
    let pairs = serde_urlencoded::from_bytes::<Vec<(String, String)>>(input)
        .map_err(|e| debug!(cause = %e, "decode urlencoded values error"))
        .ok()?;
    pairs.into_iter().find(|(name, _)| name == key).map(|(_, value)| value)
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("params", &self.params)
            .field("handlers", &self.handlers.len())
            .field("index", &self.index)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
