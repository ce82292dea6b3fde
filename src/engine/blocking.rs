// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Default engine on top of `reqwest::blocking`

use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::{Buf, Bytes, BytesMut};
use reqwest::blocking::{Client, Response as ReqwestResponse};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Method, NoProxy, Proxy};
use tracing::debug;
use url::{Position, Url};

use super::{
    AutoProxyOptions, Engine, Timeouts, HeaderMerge, HeaderQuery, ProxyInfo, ProxyMode,
    RequestOption, Scheme, SecurityFlags, SessionOptions, SystemProxyConfig, UrlParts,
};
use crate::error::{EngineError, EngineResult, ErrorCode};

/// Largest chunk pulled from the response body per availability poll
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Environment variable holding a proxy auto-config URL
pub const PAC_URL_ENV: &str = "SYNCHTTP_PAC_URL";

/// Header names whose conventional case is not plain Title-Case
const SPECIAL_CASE_NAMES: &[&str] = &[
    "ETag",
    "WWW-Authenticate",
    "TE",
    "DNT",
    "Content-MD5",
    "X-XSS-Protection",
    "X-UA-Compatible",
];

/// Engine backed by `reqwest::blocking`.
///
/// The reqwest client is built per request at send time, so TLS, redirect and
/// proxy options can be applied per request. `send` also opens a short TCP
/// probe to the first hop so unreachable endpoints fail at send time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestEngine;

impl ReqwestEngine {
    pub fn new() -> Self {
        Self
    }
}

/// Session handle
#[derive(Debug)]
pub struct ReqwestSession {
    options: SessionOptions,
}

/// Connection handle; connecting is logical, the socket opens at send time
#[derive(Debug)]
pub struct ReqwestConnection {
    options: SessionOptions,
    host: String,
    port: u16,
}

/// Request handle
pub struct ReqwestRequest {
    options: SessionOptions,
    method: Method,
    url: String,
    host: String,
    port: u16,
    secure: bool,
    headers: Vec<(String, String)>,
    security: SecurityFlags,
    follow_redirects: bool,
    proxy: Option<ProxyInfo>,
    proxy_username: Option<String>,
    proxy_password: Option<String>,
    body: BytesMut,
    state: RequestState,
}

enum RequestState {
    Opened,
    Sent(Client),
    Received {
        status: u16,
        raw_headers: String,
        reader: ReqwestResponse,
        pending: Bytes,
    },
    Failed,
}

impl RequestState {
    fn name(&self) -> &'static str {
        match self {
            RequestState::Opened => "opened",
            RequestState::Sent(_) => "sent",
            RequestState::Received { .. } => "received",
            RequestState::Failed => "failed",
        }
    }
}

impl Engine for ReqwestEngine {
    type Session = ReqwestSession;
    type Connection = ReqwestConnection;
    type Request = ReqwestRequest;

    fn open_session(&self, options: &SessionOptions) -> EngineResult<ReqwestSession> {
        if options.user_agent.is_empty() {
            return Err(EngineError::new(
                ErrorCode::INVALID_PARAMETER,
                "user agent must not be empty",
            ));
        }
        Ok(ReqwestSession {
            options: options.clone(),
        })
    }

    fn crack_url(&self, url: &str) -> EngineResult<UrlParts> {
        let parsed =
            Url::parse(url).map_err(|e| EngineError::new(ErrorCode::INVALID_URL, e.to_string()))?;

        let scheme = match parsed.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => {
                return Err(EngineError::new(
                    ErrorCode::UNRECOGNIZED_SCHEME,
                    format!("unsupported scheme '{}'", other),
                ))
            }
        };

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| EngineError::new(ErrorCode::INVALID_URL, "URL has no host"))?
            .to_string();

        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| EngineError::new(ErrorCode::INVALID_URL, "URL has no port"))?;

        Ok(UrlParts {
            scheme,
            host,
            port,
            path: parsed[Position::BeforePath..Position::AfterQuery].to_string(),
        })
    }

    fn connect(
        &self,
        session: &ReqwestSession,
        host: &str,
        port: u16,
    ) -> EngineResult<ReqwestConnection> {
        if host.is_empty() {
            return Err(EngineError::new(ErrorCode::INVALID_URL, "empty host"));
        }
        Ok(ReqwestConnection {
            options: session.options.clone(),
            host: host.to_string(),
            port,
        })
    }

    fn open_request(
        &self,
        connection: &ReqwestConnection,
        method: &str,
        path: &str,
        secure: bool,
    ) -> EngineResult<ReqwestRequest> {
        let method = Method::from_bytes(method.as_bytes()).map_err(|e| {
            EngineError::new(ErrorCode::INVALID_PARAMETER, format!("bad method: {}", e))
        })?;
        let scheme = if secure { Scheme::Https } else { Scheme::Http };
        let path = if path.is_empty() { "/" } else { path };
        let url = format!(
            "{}://{}:{}{}",
            scheme.as_str(),
            connection.host,
            connection.port,
            path
        );

        Ok(ReqwestRequest {
            options: connection.options.clone(),
            method,
            url,
            host: connection.host.clone(),
            port: connection.port,
            secure,
            headers: Vec::new(),
            security: SecurityFlags::empty(),
            follow_redirects: true,
            proxy: None,
            proxy_username: None,
            proxy_password: None,
            body: BytesMut::new(),
            state: RequestState::Opened,
        })
    }

    fn set_option(&self, request: &mut ReqwestRequest, option: RequestOption) -> EngineResult<()> {
        expect_state(request, matches!(request.state, RequestState::Opened))?;

        match option {
            RequestOption::SecurityFlags(flags) => request.security |= flags,
            RequestOption::DisableRedirects => request.follow_redirects = false,
            RequestOption::Proxy(info) => {
                Proxy::all(proxy_url(&info.proxy))
                    .map_err(|e| EngineError::new(ErrorCode::INVALID_OPTION, e.to_string()))?;
                request.proxy = Some(info);
            }
            RequestOption::ProxyUsername(username) => request.proxy_username = Some(username),
            RequestOption::ProxyPassword(password) => request.proxy_password = Some(password),
        }
        Ok(())
    }

    fn add_headers(
        &self,
        request: &mut ReqwestRequest,
        headers: &str,
        merge: HeaderMerge,
    ) -> EngineResult<()> {
        expect_state(request, matches!(request.state, RequestState::Opened))?;

        let parsed = parse_header_lines(headers)?;
        match merge {
            HeaderMerge::CoalesceWithSemicolon => {
                for (name, value) in parsed {
                    coalesce_header(&mut request.headers, name, value);
                }
            }
        }
        Ok(())
    }

    fn current_user_proxy_config(&self) -> EngineResult<SystemProxyConfig> {
        Ok(SystemProxyConfig {
            auto_config_url: lookup_any(&env_var, &[PAC_URL_ENV]),
            proxy: lookup_any(&env_var, &[
                "https_proxy",
                "HTTPS_PROXY",
                "http_proxy",
                "HTTP_PROXY",
                "all_proxy",
                "ALL_PROXY",
            ]),
            proxy_bypass: lookup_any(&env_var, &["no_proxy", "NO_PROXY"])
                .map(|list| list.replace(',', ";")),
        })
    }

    fn proxy_for_url(
        &self,
        _session: &ReqwestSession,
        url: &str,
        options: &AutoProxyOptions,
    ) -> EngineResult<ProxyInfo> {
        Err(EngineError::new(
            ErrorCode::AUTO_PROXY_SERVICE_ERROR,
            format!(
                "cannot evaluate auto-config script {} for {}",
                options.auto_config_url, url
            ),
        ))
    }

    fn send(&self, request: &mut ReqwestRequest) -> EngineResult<()> {
        expect_state(request, matches!(request.state, RequestState::Opened))?;

        let client = build_client(request)?;
        let (host, port) = match &request.proxy {
            Some(info) => proxy_endpoint(&info.proxy)?,
            None => {
                // reqwest routes through the environment proxy unless told otherwise
                let environment = match request.options.proxy_mode {
                    ProxyMode::Default => environment_hop(&request.host, request.secure, env_var),
                    ProxyMode::NoProxy => None,
                };
                environment.unwrap_or_else(|| (request.host.clone(), request.port))
            }
        };
        probe(&host, port, connect_timeout(&request.options.timeouts))?;

        debug!(url = %request.url, first_hop = %format!("{}:{}", host, port), "request sent");
        request.state = RequestState::Sent(client);
        Ok(())
    }

    fn write_data(&self, request: &mut ReqwestRequest, data: &[u8]) -> EngineResult<usize> {
        expect_state(request, matches!(request.state, RequestState::Sent(_)))?;
        request.body.extend_from_slice(data);
        Ok(data.len())
    }

    fn receive_response(&self, request: &mut ReqwestRequest) -> EngineResult<()> {
        let client = match std::mem::replace(&mut request.state, RequestState::Failed) {
            RequestState::Sent(client) => client,
            other => {
                request.state = other;
                return expect_state(request, false);
            }
        };

        let mut header_map = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| EngineError::new(ErrorCode::INVALID_HEADER, e.to_string()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| EngineError::new(ErrorCode::INVALID_HEADER, e.to_string()))?;
            header_map.insert(name, value);
        }

        let mut builder = client
            .request(request.method.clone(), request.url.as_str())
            .headers(header_map);
        if !request.body.is_empty() {
            builder = builder.body(request.body.split().freeze());
        }

        let response = builder.send().map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let raw_headers = render_raw_headers(&response);
        debug!(url = %request.url, status, "response received");

        request.state = RequestState::Received {
            status,
            raw_headers,
            reader: response,
            pending: Bytes::new(),
        };
        Ok(())
    }

    fn query_headers(
        &self,
        request: &ReqwestRequest,
        query: HeaderQuery,
        buf: &mut [u8],
    ) -> EngineResult<usize> {
        let (status, raw_headers) = match &request.state {
            RequestState::Received {
                status,
                raw_headers,
                ..
            } => (*status, raw_headers),
            other => {
                return Err(EngineError::handle_state(format!(
                    "no response yet, request is {}",
                    other.name()
                )))
            }
        };

        let status_text;
        let value = match query {
            HeaderQuery::StatusCode => {
                status_text = status.to_string();
                status_text.as_bytes()
            }
            HeaderQuery::RawHeadersCrlf => raw_headers.as_bytes(),
        };

        if buf.len() < value.len() {
            return Err(EngineError::insufficient_buffer(value.len()));
        }
        buf[..value.len()].copy_from_slice(value);
        Ok(value.len())
    }

    fn data_available(&self, request: &mut ReqwestRequest) -> EngineResult<usize> {
        let (reader, pending) = received_body(request)?;
        if !pending.is_empty() {
            return Ok(pending.len());
        }

        let mut chunk = BytesMut::zeroed(READ_CHUNK_SIZE);
        let read = reader.read(&mut chunk).map_err(|e| {
            let code = if e.kind() == std::io::ErrorKind::TimedOut {
                ErrorCode::TIMEOUT
            } else {
                ErrorCode::CONNECTION_ERROR
            };
            EngineError::new(code, e.to_string())
        })?;
        chunk.truncate(read);
        *pending = chunk.freeze();
        Ok(read)
    }

    fn read_data(&self, request: &mut ReqwestRequest, buf: &mut [u8]) -> EngineResult<usize> {
        let (_, pending) = received_body(request)?;
        let n = buf.len().min(pending.len());
        buf[..n].copy_from_slice(&pending[..n]);
        pending.advance(n);
        Ok(n)
    }

    fn close_request(&self, request: ReqwestRequest) {
        debug!(url = %request.url, state = request.state.name(), "request handle closed");
    }

    fn close_connection(&self, connection: ReqwestConnection) {
        debug!(host = %connection.host, port = connection.port, "connection handle closed");
    }

    fn close_session(&self, _session: ReqwestSession) {
        debug!("session handle closed");
    }
}

fn expect_state(request: &ReqwestRequest, ok: bool) -> EngineResult<()> {
    if ok {
        Ok(())
    } else {
        Err(EngineError::handle_state(format!(
            "operation not allowed, request is {}",
            request.state.name()
        )))
    }
}

fn received_body(request: &mut ReqwestRequest) -> EngineResult<(&mut ReqwestResponse, &mut Bytes)> {
    match &mut request.state {
        RequestState::Received {
            reader, pending, ..
        } => Ok((reader, pending)),
        other => Err(EngineError::handle_state(format!(
            "no response body, request is {}",
            other.name()
        ))),
    }
}

fn millis(ms: u32) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(u64::from(ms)))
}

/// Name resolution and TCP connect share one budget
fn connect_timeout(timeouts: &Timeouts) -> Option<Duration> {
    millis(timeouts.connect_ms)
        .map(|connect| connect + millis(timeouts.resolve_ms).unwrap_or_default())
}

fn build_client(request: &ReqwestRequest) -> EngineResult<Client> {
    let policy = if request.follow_redirects {
        Policy::default()
    } else {
        Policy::none()
    };

    let mut builder = Client::builder()
        .user_agent(request.options.user_agent.as_str())
        .redirect(policy)
        .danger_accept_invalid_certs(!request.security.is_empty())
        .timeout(millis(request.options.timeouts.receive_ms));

    if let Some(timeout) = connect_timeout(&request.options.timeouts) {
        builder = builder.connect_timeout(timeout);
    }

    match &request.proxy {
        Some(info) => {
            let mut proxy = Proxy::all(proxy_url(&info.proxy))
                .map_err(|e| EngineError::new(ErrorCode::INVALID_OPTION, e.to_string()))?;
            if let Some(bypass) = &info.bypass {
                proxy = proxy.no_proxy(NoProxy::from_string(&bypass.replace(';', ",")));
            }
            if let Some(username) = &request.proxy_username {
                let password = request.proxy_password.as_deref().unwrap_or("");
                proxy = proxy.basic_auth(username, password);
            }
            builder = builder.proxy(proxy);
        }
        None if request.options.proxy_mode == ProxyMode::NoProxy => {
            builder = builder.no_proxy();
        }
        None => {}
    }

    builder.build().map_err(map_reqwest_error)
}

fn map_reqwest_error(err: reqwest::Error) -> EngineError {
    let code = if err.is_timeout() {
        ErrorCode::TIMEOUT
    } else if err.is_connect() {
        ErrorCode::CANNOT_CONNECT
    } else if err.is_builder() {
        ErrorCode::INVALID_OPTION
    } else {
        ErrorCode::CONNECTION_ERROR
    };
    EngineError::new(code, err.to_string())
}

/// Proxies given as bare `host:port` are plain HTTP proxies
fn proxy_url(proxy: &str) -> String {
    if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{}", proxy)
    }
}

fn proxy_endpoint(proxy: &str) -> EngineResult<(String, u16)> {
    let parsed = Url::parse(&proxy_url(proxy))
        .map_err(|e| EngineError::new(ErrorCode::INVALID_OPTION, format!("bad proxy: {}", e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| EngineError::new(ErrorCode::INVALID_OPTION, "proxy has no host"))?;
    let port = parsed.port_or_known_default().unwrap_or(80);
    Ok((host.to_string(), port))
}

fn probe(host: &str, port: u16, timeout: Option<Duration>) -> EngineResult<()> {
    let bare_host = host.trim_start_matches('[').trim_end_matches(']');
    let addrs = (bare_host, port)
        .to_socket_addrs()
        .map_err(|e| EngineError::new(ErrorCode::NAME_NOT_RESOLVED, e.to_string()))?;

    let mut last_error = None;
    for addr in addrs {
        let attempt = match timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(_) => return Ok(()),
            Err(e) => last_error = Some(e),
        }
    }

    Err(match last_error {
        Some(e) if e.kind() == std::io::ErrorKind::TimedOut => {
            EngineError::new(ErrorCode::TIMEOUT, e.to_string())
        }
        Some(e) => EngineError::new(ErrorCode::CANNOT_CONNECT, e.to_string()),
        None => EngineError::new(
            ErrorCode::NAME_NOT_RESOLVED,
            format!("no addresses for {}", host),
        ),
    })
}

fn parse_header_lines(block: &str) -> EngineResult<Vec<(String, String)>> {
    let mut parsed = Vec::new();
    for line in block.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (name, value) = line.split_once(':').ok_or_else(|| {
            EngineError::new(ErrorCode::INVALID_HEADER, format!("malformed header '{}'", line))
        })?;
        let (name, value) = (name.trim(), value.trim());

        HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| EngineError::new(ErrorCode::INVALID_HEADER, e.to_string()))?;
        HeaderValue::from_str(value)
            .map_err(|e| EngineError::new(ErrorCode::INVALID_HEADER, e.to_string()))?;

        parsed.push((name.to_string(), value.to_string()));
    }
    Ok(parsed)
}

fn coalesce_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    match headers
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
    {
        Some((_, existing)) => {
            existing.push_str("; ");
            existing.push_str(&value);
        }
        None => headers.push((name, value)),
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn lookup_any(lookup: &impl Fn(&str) -> Option<String>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|&name| lookup(name))
        .find(|value| !value.trim().is_empty())
}

/// First hop reqwest takes for `host` when the environment names a proxy.
///
/// Follows reqwest's lookup: the scheme's own variable, then `ALL_PROXY`,
/// skipped when `NO_PROXY` covers the host.
fn environment_hop(
    host: &str,
    secure: bool,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<(String, u16)> {
    let names: &[&str] = if secure {
        &["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]
    } else {
        &["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]
    };
    let proxy = lookup_any(&lookup, names)?;

    let bypass = lookup_any(&lookup, &["NO_PROXY", "no_proxy"]).unwrap_or_default();
    if bypass_matches(&bypass, host) {
        return None;
    }
    proxy_endpoint(&proxy).ok()
}

/// `,` or `;` separated bypass list; `*` matches everything and `<local>`
/// matches dotless names
fn bypass_matches(list: &str, host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    list.split([',', ';'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .any(|entry| match entry {
            "*" => true,
            "<local>" => !host.contains('.'),
            _ => {
                let domain = entry.trim_start_matches("*.").trim_start_matches('.');
                host.eq_ignore_ascii_case(domain)
                    || host
                        .to_ascii_lowercase()
                        .ends_with(&format!(".{}", domain.to_ascii_lowercase()))
            }
        })
}

fn render_raw_headers(response: &ReqwestResponse) -> String {
    let status = response.status();
    let mut raw = format!(
        "{:?} {} {}\r\n",
        response.version(),
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    );
    for (name, value) in response.headers() {
        raw.push_str(&canonical_name(name.as_str()));
        raw.push_str(": ");
        raw.push_str(&String::from_utf8_lossy(value.as_bytes()));
        raw.push_str("\r\n");
    }
    raw.push_str("\r\n");
    raw
}

/// Received (lowercase) header name in its conventional case
fn canonical_name(name: &str) -> String {
    match SPECIAL_CASE_NAMES
        .iter()
        .find(|special| special.eq_ignore_ascii_case(name))
    {
        Some(special) => special.to_string(),
        None => title_case(name),
    }
}

/// `set-cookie` -> `Set-Cookie`
fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for ch in name.chars() {
        if upper {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        upper = ch == '-';
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn session() -> ReqwestSession {
        ReqwestEngine
            .open_session(&SessionOptions {
                user_agent: "test-agent".to_string(),
                proxy_mode: ProxyMode::Default,
                timeouts: Timeouts {
                    resolve_ms: 0,
                    connect_ms: 1000,
                    send_ms: 1000,
                    receive_ms: 1000,
                },
            })
            .unwrap()
    }

    fn open(method: &str) -> ReqwestRequest {
        let engine = ReqwestEngine;
        let connection = engine.connect(&session(), "example.com", 443).unwrap();
        engine.open_request(&connection, method, "/a?b=1", true).unwrap()
    }

    #[test]
    fn test_crack_url() {
        let parts = ReqwestEngine
            .crack_url("https://example.com/search?q=1#frag")
            .unwrap();
        assert_eq!(parts.scheme, Scheme::Https);
        assert_eq!(parts.host, "example.com");
        assert_eq!(parts.port, 443);
        assert_eq!(parts.path, "/search?q=1");

        let parts = ReqwestEngine.crack_url("http://127.0.0.1:8080").unwrap();
        assert_eq!(parts.port, 8080);
        assert_eq!(parts.path, "/");
    }

    #[test]
    fn test_crack_url_rejects() {
        let err = ReqwestEngine.crack_url("ftp://example.com/").unwrap_err();
        assert_eq!(err.code, ErrorCode::UNRECOGNIZED_SCHEME);

        let err = ReqwestEngine.crack_url("not a url").unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_URL);
    }

    #[test]
    fn test_open_request_url() {
        let request = open("PATCH");
        assert_eq!(request.url, "https://example.com:443/a?b=1");
        assert_eq!(request.method, Method::PATCH);
    }

    #[test]
    fn test_add_headers_coalesce() {
        let mut request = open("GET");
        ReqwestEngine
            .add_headers(
                &mut request,
                "Accept: text/html\r\nX-Trace: a\r\naccept: */*\r\n\r\n",
                HeaderMerge::CoalesceWithSemicolon,
            )
            .unwrap();

        assert_eq!(
            request.headers,
            vec![
                ("Accept".to_string(), "text/html; */*".to_string()),
                ("X-Trace".to_string(), "a".to_string()),
            ]
        );
    }

    #[test]
    fn test_add_headers_rejects_malformed() {
        let mut request = open("GET");
        let err = ReqwestEngine
            .add_headers(&mut request, "no colon here\r\n", HeaderMerge::CoalesceWithSemicolon)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_HEADER);
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_out_of_order_calls() {
        let mut request = open("POST");

        let err = ReqwestEngine.write_data(&mut request, b"body").unwrap_err();
        assert_eq!(err.code, ErrorCode::INCORRECT_HANDLE_STATE);

        let err = ReqwestEngine
            .query_headers(&request, HeaderQuery::StatusCode, &mut [])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INCORRECT_HANDLE_STATE);

        let err = ReqwestEngine.data_available(&mut request).unwrap_err();
        assert_eq!(err.code, ErrorCode::INCORRECT_HANDLE_STATE);
    }

    #[test]
    fn test_set_options() {
        let mut request = open("GET");
        let engine = ReqwestEngine;

        engine
            .set_option(&mut request, RequestOption::SecurityFlags(SecurityFlags::accept_all()))
            .unwrap();
        engine
            .set_option(&mut request, RequestOption::DisableRedirects)
            .unwrap();
        engine
            .set_option(
                &mut request,
                RequestOption::Proxy(ProxyInfo::named("proxy.local:3128")),
            )
            .unwrap();

        assert!(request.security.contains(SecurityFlags::IGNORE_UNKNOWN_CA));
        assert!(!request.follow_redirects);
        assert_eq!(request.proxy, Some(ProxyInfo::named("proxy.local:3128")));
    }

    #[test]
    fn test_proxy_endpoint() {
        assert_eq!(
            proxy_endpoint("proxy.local:3128").unwrap(),
            ("proxy.local".to_string(), 3128)
        );
        assert_eq!(
            proxy_endpoint("http://10.0.0.1:8080").unwrap(),
            ("10.0.0.1".to_string(), 8080)
        );
    }

    #[test]
    fn test_connect_timeout_budget() {
        let timeouts = Timeouts {
            resolve_ms: 500,
            connect_ms: 1000,
            send_ms: 0,
            receive_ms: 0,
        };
        assert_eq!(connect_timeout(&timeouts), Some(Duration::from_millis(1500)));

        let unlimited = Timeouts {
            connect_ms: 0,
            ..timeouts
        };
        assert_eq!(connect_timeout(&unlimited), None);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("set-cookie"), "Set-Cookie");
        assert_eq!(title_case("x-request-id"), "X-Request-Id");
        assert_eq!(title_case("etag"), "Etag");
    }

    #[test]
    fn test_canonical_name_special_cases() {
        assert_eq!(canonical_name("etag"), "ETag");
        assert_eq!(canonical_name("www-authenticate"), "WWW-Authenticate");
        assert_eq!(canonical_name("x-xss-protection"), "X-XSS-Protection");
        assert_eq!(canonical_name("content-type"), "Content-Type");
        assert_eq!(canonical_name("proxy-authenticate"), "Proxy-Authenticate");
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_environment_hop_uses_scheme_proxy() {
        let lookup = vars(&[("HTTPS_PROXY", "corp:8080")]);
        assert_eq!(
            environment_hop("example.com", true, &lookup),
            Some(("corp".to_string(), 8080))
        );
        assert_eq!(environment_hop("example.com", false, &lookup), None);
    }

    #[test]
    fn test_environment_hop_all_proxy_fallback() {
        let lookup = vars(&[("all_proxy", "http://10.0.0.9:3128")]);
        assert_eq!(
            environment_hop("example.com", false, &lookup),
            Some(("10.0.0.9".to_string(), 3128))
        );
        assert_eq!(environment_hop("example.com", false, vars(&[])), None);
    }

    #[test]
    fn test_environment_hop_honours_no_proxy() {
        let lookup = vars(&[
            ("HTTP_PROXY", "corp:8080"),
            ("NO_PROXY", "localhost,.internal"),
        ]);
        assert_eq!(environment_hop("api.internal", false, &lookup), None);
        assert_eq!(environment_hop("localhost", false, &lookup), None);
        assert_eq!(
            environment_hop("example.com", false, &lookup),
            Some(("corp".to_string(), 8080))
        );
    }

    #[test]
    fn test_bypass_matches() {
        assert!(bypass_matches("*", "example.com"));
        assert!(bypass_matches("*.local;<local>", "printer"));
        assert!(bypass_matches("*.local;<local>", "nas.local"));
        assert!(bypass_matches("Example.COM", "example.com"));
        assert!(!bypass_matches("*.local;<local>", "example.com"));
        assert!(!bypass_matches("ample.com", "example.com"));
        assert!(!bypass_matches("", "example.com"));
    }
}
