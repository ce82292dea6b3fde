// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Blocking HTTP client
//!
//! Every call opens its own session, connection and request handles on the
//! engine, drives them through one exchange and releases them before
//! returning. Nothing is pooled across calls.

use tracing::{debug, warn};

use super::config::ClientConfig;
use super::request::merge_request_headers;
use super::response::{Diagnostic, Response, Step};
use crate::engine::{
    AutoDetect, AutoProxyOptions, Engine, HeaderMerge, HeaderQuery, ProxyInfo, ProxyMode,
    ReqwestEngine, RequestOption, SecurityFlags, SessionOptions, Timeouts,
};
use crate::error::{EngineError, EngineResult, ErrorCode, RequestAbort};

/// Consecutive failed chunk reads after which the body drain gives up
const MAX_CONSECUTIVE_READ_FAILURES: usize = 3;

/// HTTP client over an [`Engine`].
///
/// Configuration and [`last_error`](Self::last_error) are per instance and
/// every request takes `&mut self`; share one client across threads only
/// behind a lock, or give each thread its own.
pub struct HttpClient<E: Engine = ReqwestEngine> {
    engine: E,
    config: ClientConfig,
    last_error: ErrorCode,
}

impl HttpClient<ReqwestEngine> {
    /// Create a client with default configuration
    pub fn new(use_proxy: bool) -> Self {
        Self::with_config(ClientConfig::default().use_proxy(use_proxy))
    }

    /// Create a client with custom configuration
    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_engine(ReqwestEngine::new(), config)
    }
}

impl Default for HttpClient<ReqwestEngine> {
    fn default() -> Self {
        Self::new(false)
    }
}

impl<E: Engine> HttpClient<E> {
    /// Create a client driving a custom engine
    pub fn with_engine(engine: E, config: ClientConfig) -> Self {
        Self {
            engine,
            config,
            last_error: ErrorCode::SUCCESS,
        }
    }

    /// Get the engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Get client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Set proxy host and credentials
    pub fn set_proxy(
        &mut self,
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) {
        self.config.proxy_host = host.into();
        self.config.proxy_username = username.into();
        self.config.proxy_password = password.into();
    }

    /// Whether to use the configured proxy
    pub fn set_use_proxy(&mut self, use_proxy: bool) {
        self.config.use_proxy = use_proxy;
    }

    /// Set user agent
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.config.user_agent = user_agent.into();
    }

    /// Enable/disable certificate validation
    pub fn set_verify_tls(&mut self, verify: bool) {
        self.config.verify_tls = verify;
    }

    /// Set timeouts
    pub fn set_timeouts(&mut self, timeouts: Timeouts) {
        self.config.timeouts = timeouts;
    }

    /// Last error code recorded by a request.
    ///
    /// Kept across requests; each recorded failure overwrites it.
    pub fn last_error(&self) -> ErrorCode {
        self.last_error
    }

    /// Send a GET request
    pub fn get(&mut self, url: &str, extra_headers: &str) -> Response {
        self.request("GET", url, &[], extra_headers)
    }

    /// Send a POST request
    pub fn post(&mut self, url: &str, body: impl AsRef<[u8]>, extra_headers: &str) -> Response {
        self.request("POST", url, body.as_ref(), extra_headers)
    }

    /// Send a PUT request
    pub fn put(&mut self, url: &str, body: impl AsRef<[u8]>, extra_headers: &str) -> Response {
        self.request("PUT", url, body.as_ref(), extra_headers)
    }

    /// Send a PATCH request
    pub fn patch(&mut self, url: &str, body: impl AsRef<[u8]>, extra_headers: &str) -> Response {
        self.request("PATCH", url, body.as_ref(), extra_headers)
    }

    /// Send a DELETE request
    pub fn delete(&mut self, url: &str, body: impl AsRef<[u8]>, extra_headers: &str) -> Response {
        self.request("DELETE", url, body.as_ref(), extra_headers)
    }

    /// Send a request and read the whole response.
    ///
    /// An empty `url` or `method` only sets [`last_error`](Self::last_error)
    /// and returns an empty response without touching the engine. A fatal
    /// step failure leaves its tag in `Response::error` next to whatever was
    /// read before it.
    pub fn request(&mut self, method: &str, url: &str, body: &[u8], extra_headers: &str) -> Response {
        let mut response = Response::new();

        if url.is_empty() {
            warn!("request rejected: empty URL");
            self.last_error = ErrorCode::PATH_NOT_FOUND;
            return response;
        }
        if method.is_empty() {
            warn!(url, "request rejected: empty method");
            self.last_error = ErrorCode::INVALID_PARAMETER;
            return response;
        }

        let session = match self.engine.open_session(&self.session_options()) {
            Ok(session) => session,
            Err(e) => {
                warn!(url, code = %e.code, error = %e.message, "failed to open session");
                self.last_error = e.code;
                response.diagnostics.push(Diagnostic::new(Step::OpenSession, e));
                return response;
            }
        };

        let mut handles = Handles::new(&self.engine, session);
        let mut exchange = Exchange {
            engine: &self.engine,
            config: &self.config,
            last_error: &mut self.last_error,
            response: &mut response,
        };

        debug!(method, url, body_len = body.len(), "request started");
        if let Err(abort) = exchange.run(&mut handles, method, url, body, extra_headers) {
            let cause = abort.engine_error();
            warn!(method, url, code = %cause.code, error = %cause.message, "request aborted: {}", abort);
            response.error = abort.to_string();
        }
        drop(handles);

        debug!(
            method,
            url,
            status = response.status_code,
            content_length = response.content_length,
            "request finished"
        );
        response
    }

    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            user_agent: self.config.user_agent.clone(),
            proxy_mode: ProxyMode::Default,
            timeouts: self.config.timeouts,
        }
    }
}

/// Handles acquired by one request; dropped in request, connection, session order
struct Handles<'e, E: Engine> {
    engine: &'e E,
    session: Option<E::Session>,
    connection: Option<E::Connection>,
    request: Option<E::Request>,
}

impl<'e, E: Engine> Handles<'e, E> {
    fn new(engine: &'e E, session: E::Session) -> Self {
        Self {
            engine,
            session: Some(session),
            connection: None,
            request: None,
        }
    }
}

impl<E: Engine> Drop for Handles<'_, E> {
    fn drop(&mut self) {
        if let Some(request) = self.request.take() {
            self.engine.close_request(request);
        }
        if let Some(connection) = self.connection.take() {
            self.engine.close_connection(connection);
        }
        if let Some(session) = self.session.take() {
            self.engine.close_session(session);
        }
    }
}

fn live<H>(slot: &Option<H>) -> EngineResult<&H> {
    slot.as_ref()
        .ok_or_else(|| EngineError::handle_state("handle already released"))
}

/// State threaded through one request
struct Exchange<'a, E: Engine> {
    engine: &'a E,
    config: &'a ClientConfig,
    last_error: &'a mut ErrorCode,
    response: &'a mut Response,
}

impl<E: Engine> Exchange<'_, E> {
    fn run(
        &mut self,
        handles: &mut Handles<'_, E>,
        method: &str,
        url: &str,
        body: &[u8],
        extra_headers: &str,
    ) -> Result<(), RequestAbort> {
        let engine = self.engine;

        let parts = engine.crack_url(url).map_err(RequestAbort::CrackUrl)?;
        let secure = parts.scheme.is_secure();

        let connection = live(&handles.session)
            .and_then(|session| engine.connect(session, &parts.host, parts.port))
            .map_err(RequestAbort::Connect)?;
        let connection = handles.connection.insert(connection);

        let request = engine
            .open_request(connection, method, &parts.path, secure)
            .map_err(RequestAbort::OpenRequest)?;
        let request = handles.request.insert(request);

        if secure && !self.config.verify_tls {
            let flags = RequestOption::SecurityFlags(SecurityFlags::accept_all());
            if let Err(e) = engine.set_option(request, flags) {
                self.note(Step::SecurityFlags, e);
            }
        }

        if let Err(e) = engine.set_option(request, RequestOption::DisableRedirects) {
            self.note(Step::DisableRedirects, e);
        }

        let header_block = merge_request_headers(url, body.len(), extra_headers);
        if let Err(e) = engine.add_headers(request, &header_block, HeaderMerge::CoalesceWithSemicolon)
        {
            self.record(Step::AddHeaders, e);
        }

        if self.config.use_proxy {
            self.assign_configured_proxy(request);
        }

        if let Err(send_error) = engine.send(request) {
            self.note(Step::Send, send_error.clone());
            let sent = match live(&handles.session) {
                Ok(session) => self.send_via_system_proxy(session, request, url),
                Err(e) => {
                    self.record(Step::SystemProxyQuery, e);
                    false
                }
            };
            if !sent {
                return Err(RequestAbort::Send(send_error));
            }
        }

        if !body.is_empty() {
            match engine.write_data(request, body) {
                Ok(written) if written < body.len() => self.record(
                    Step::WriteBody,
                    EngineError::new(
                        ErrorCode::CONNECTION_ERROR,
                        format!("short write: {} of {} bytes", written, body.len()),
                    ),
                ),
                Ok(_) => {}
                Err(e) => self.record(Step::WriteBody, e),
            }
        }

        engine
            .receive_response(request)
            .map_err(RequestAbort::ReceiveResponse)?;

        match query_two_phase(engine, request, HeaderQuery::StatusCode) {
            Ok(raw) => match std::str::from_utf8(&raw)
                .ok()
                .and_then(|text| text.trim().parse::<u32>().ok())
            {
                Some(status) => self.response.status_code = status,
                None => self.note(
                    Step::QueryStatus,
                    EngineError::new(ErrorCode::INVALID_HEADER, "status code is not a number"),
                ),
            },
            Err(e) => self.note(Step::QueryStatus, e),
        }

        match query_two_phase(engine, request, HeaderQuery::RawHeadersCrlf) {
            Ok(raw) => self.response.raw_headers = String::from_utf8_lossy(&raw).into_owned(),
            Err(e) => self.note(Step::QueryHeaders, e),
        }

        self.drain_body(request);
        Ok(())
    }

    fn assign_configured_proxy(&mut self, request: &mut E::Request) {
        let engine = self.engine;
        let config = self.config;

        let proxy = RequestOption::Proxy(ProxyInfo::named(config.proxy_host.clone()));
        if let Err(e) = engine.set_option(request, proxy) {
            self.record(Step::ProxyAssign, e);
        }

        if config.proxy_username.is_empty() {
            return;
        }
        let username = RequestOption::ProxyUsername(config.proxy_username.clone());
        if let Err(e) = engine.set_option(request, username) {
            self.record(Step::ProxyUsername, e);
        }

        if !config.proxy_password.is_empty() {
            let password = RequestOption::ProxyPassword(config.proxy_password.clone());
            if let Err(e) = engine.set_option(request, password) {
                self.record(Step::ProxyPassword, e);
            }
        }
    }

    /// Retry path after a failed send. Only the auto-config branch resends;
    /// a static system proxy is assigned without resending.
    fn send_via_system_proxy(
        &mut self,
        session: &E::Session,
        request: &mut E::Request,
        url: &str,
    ) -> bool {
        let engine = self.engine;

        let system = match engine.current_user_proxy_config() {
            Ok(system) => system,
            Err(e) => {
                self.record(Step::SystemProxyQuery, e);
                return false;
            }
        };

        if let Some(auto_config_url) = system.auto_config_url {
            debug!(url, auto_config_url = %auto_config_url, "resolving proxy through auto-config");
            let options = AutoProxyOptions {
                auto_detect: AutoDetect::Dhcp,
                auto_config_url,
                auto_logon_if_challenged: true,
            };
            let resolved = match engine.proxy_for_url(session, url, &options) {
                Ok(resolved) => resolved,
                Err(e) => {
                    self.record(Step::AutoProxyResolve, e);
                    return false;
                }
            };
            if let Err(e) = engine.set_option(request, RequestOption::Proxy(resolved)) {
                self.record(Step::FallbackProxyAssign, e);
                return false;
            }
            match engine.send(request) {
                Ok(()) => true,
                Err(e) => {
                    self.record(Step::FallbackSend, e);
                    false
                }
            }
        } else if let Some(proxy) = system.proxy {
            debug!(url, proxy = %proxy, "assigning static system proxy");
            let info = ProxyInfo {
                proxy,
                bypass: system.proxy_bypass,
            };
            if let Err(e) = engine.set_option(request, RequestOption::Proxy(info)) {
                self.record(Step::FallbackProxyAssign, e);
            }
            false
        } else {
            false
        }
    }

    fn drain_body(&mut self, request: &mut E::Request) {
        let engine = self.engine;
        let mut failed_reads = 0;

        loop {
            let available = match engine.data_available(request) {
                Ok(available) => available,
                Err(e) => {
                    self.note(Step::DataAvailable, e);
                    break;
                }
            };
            if available == 0 {
                break;
            }

            let mut chunk = vec![0u8; available];
            match engine.read_data(request, &mut chunk) {
                Ok(read) if read > 0 => {
                    failed_reads = 0;
                    self.response.body.extend_from_slice(&chunk[..read]);
                    self.response.content_length += read;
                    continue;
                }
                Ok(_) => {}
                Err(e) => self.record(Step::ReadChunk, e),
            }

            failed_reads += 1;
            if failed_reads >= MAX_CONSECUTIVE_READ_FAILURES {
                warn!(failed_reads, "giving up on response body");
                break;
            }
        }
    }

    /// Keep a non-fatal failure and update `last_error`
    fn record(&mut self, step: Step, error: EngineError) {
        *self.last_error = error.code;
        self.note(step, error);
    }

    /// Keep a non-fatal failure without touching `last_error`
    fn note(&mut self, step: Step, error: EngineError) {
        warn!(step = %step, code = %error.code, error = %error.message, "non-fatal request failure");
        self.response.diagnostics.push(Diagnostic::new(step, error));
    }
}

/// Probe the size, then fetch into a buffer of that size
fn query_two_phase<E: Engine>(
    engine: &E,
    request: &E::Request,
    query: HeaderQuery,
) -> EngineResult<Vec<u8>> {
    let required = match engine.query_headers(request, query, &mut []) {
        Ok(len) => len,
        Err(e) if e.is_insufficient_buffer() => e.required_size.unwrap_or(0),
        Err(e) => return Err(e),
    };

    let mut buf = vec![0u8; required];
    let len = engine.query_headers(request, query, &mut buf)?;
    buf.truncate(len);
    Ok(buf)
}
