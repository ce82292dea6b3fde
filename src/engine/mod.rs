// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP engine boundary
//!
//! The [`Engine`] trait is the narrow set of primitives the request
//! orchestrator drives: session, connection and request handles, per-request
//! options, raw header attachment, send/receive, two-phase header queries and
//! chunked body reads. [`ReqwestEngine`] is the default implementation.

mod blocking;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

pub use blocking::{ReqwestConnection, ReqwestEngine, ReqwestRequest, ReqwestSession, PAC_URL_ENV};

/// Per-primitive timeouts in milliseconds, 0 means no limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub resolve_ms: u32,
    pub connect_ms: u32,
    pub send_ms: u32,
    pub receive_ms: u32,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            resolve_ms: 0,
            connect_ms: 60_000,
            send_ms: 30_000,
            receive_ms: 30_000,
        }
    }
}

/// How the session discovers its proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProxyMode {
    /// Engine's default proxy configuration
    #[default]
    Default,
    /// Never use a proxy
    NoProxy,
}

/// Session-level configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub user_agent: String,
    pub proxy_mode: ProxyMode,
    pub timeouts: Timeouts,
}

/// URL scheme understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, Scheme::Https)
    }
}

/// Components of a cracked URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    /// Path including the query string
    pub path: String,
}

bitflags! {
    /// Certificate conditions to ignore on a TLS request
    pub struct SecurityFlags: u32 {
        const IGNORE_UNKNOWN_CA = 0x0000_0100;
        const IGNORE_CERT_DATE_INVALID = 0x0000_2000;
        const IGNORE_CERT_CN_INVALID = 0x0000_1000;
    }
}

impl SecurityFlags {
    /// Accept any certificate chain, name and validity period
    pub fn accept_all() -> Self {
        Self::IGNORE_UNKNOWN_CA | Self::IGNORE_CERT_DATE_INVALID | Self::IGNORE_CERT_CN_INVALID
    }
}

/// Proxy assignment for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyInfo {
    /// Proxy server, `host:port` or a URL
    pub proxy: String,
    /// `;`-separated bypass list
    pub bypass: Option<String>,
}

impl ProxyInfo {
    pub fn named(proxy: impl Into<String>) -> Self {
        Self {
            proxy: proxy.into(),
            bypass: None,
        }
    }
}

/// Per-request option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOption {
    SecurityFlags(SecurityFlags),
    DisableRedirects,
    Proxy(ProxyInfo),
    ProxyUsername(String),
    ProxyPassword(String),
}

/// How attached headers combine with ones already present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMerge {
    /// Same-name values are joined on one line with `"; "`
    CoalesceWithSemicolon,
}

/// Current user's system proxy settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemProxyConfig {
    pub auto_config_url: Option<String>,
    pub proxy: Option<String>,
    pub proxy_bypass: Option<String>,
}

/// Auto-detection mechanism for proxy auto-configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoDetect {
    Dhcp,
}

/// Inputs for per-URL proxy resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoProxyOptions {
    pub auto_detect: AutoDetect,
    pub auto_config_url: String,
    pub auto_logon_if_challenged: bool,
}

/// Header query kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderQuery {
    /// Decimal status code text
    StatusCode,
    /// Status line plus all headers, CRLF separated, blank line terminated
    RawHeadersCrlf,
}

/// Platform HTTP engine driven step by step by the request orchestrator.
///
/// Every handle returned is released through the matching `close_*` call.
/// `query_headers` is two-phase: a call with a buffer that is too small fails
/// with [`EngineError::insufficient_buffer`](crate::error::EngineError::insufficient_buffer)
/// carrying the size to retry with.
pub trait Engine {
    type Session;
    type Connection;
    type Request;

    fn open_session(&self, options: &SessionOptions) -> EngineResult<Self::Session>;

    fn crack_url(&self, url: &str) -> EngineResult<UrlParts>;

    fn connect(
        &self,
        session: &Self::Session,
        host: &str,
        port: u16,
    ) -> EngineResult<Self::Connection>;

    fn open_request(
        &self,
        connection: &Self::Connection,
        method: &str,
        path: &str,
        secure: bool,
    ) -> EngineResult<Self::Request>;

    fn set_option(&self, request: &mut Self::Request, option: RequestOption) -> EngineResult<()>;

    fn add_headers(
        &self,
        request: &mut Self::Request,
        headers: &str,
        merge: HeaderMerge,
    ) -> EngineResult<()>;

    fn current_user_proxy_config(&self) -> EngineResult<SystemProxyConfig>;

    fn proxy_for_url(
        &self,
        session: &Self::Session,
        url: &str,
        options: &AutoProxyOptions,
    ) -> EngineResult<ProxyInfo>;

    fn send(&self, request: &mut Self::Request) -> EngineResult<()>;

    fn write_data(&self, request: &mut Self::Request, data: &[u8]) -> EngineResult<usize>;

    fn receive_response(&self, request: &mut Self::Request) -> EngineResult<()>;

    fn query_headers(
        &self,
        request: &Self::Request,
        query: HeaderQuery,
        buf: &mut [u8],
    ) -> EngineResult<usize>;

    /// Bytes ready to read; 0 once the body is exhausted
    fn data_available(&self, request: &mut Self::Request) -> EngineResult<usize>;

    fn read_data(&self, request: &mut Self::Request, buf: &mut [u8]) -> EngineResult<usize>;

    fn close_request(&self, request: Self::Request);

    fn close_connection(&self, connection: Self::Connection);

    fn close_session(&self, session: Self::Session);
}
