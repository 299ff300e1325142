//! `ConnectionContext`: what a proxy knows about a connection at match time.
//!
//! Addresses and SNI are known once the connection is accepted. Request
//! headers arrive later; until then header lookups are pending.

use std::collections::HashMap;
use std::net::SocketAddr;

/// Connection context for matching.
#[derive(Debug, Clone, Default)]
pub struct ConnectionContext {
    source: Option<SocketAddr>,
    destination: Option<SocketAddr>,
    server_name: Option<String>,
    /// `None` until request headers have been received.
    headers: Option<HashMap<String, String>>,
}

impl ConnectionContext {
    /// Create a builder for `ConnectionContext`.
    #[must_use]
    pub fn builder() -> ConnectionContextBuilder {
        ConnectionContextBuilder::default()
    }

    /// Downstream peer address.
    #[must_use]
    pub fn source(&self) -> Option<SocketAddr> {
        self.source
    }

    /// Local address the connection was accepted on.
    #[must_use]
    pub fn destination(&self) -> Option<SocketAddr> {
        self.destination
    }

    /// TLS server name indication, if any.
    #[must_use]
    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    /// Returns `true` once request headers have been received.
    #[must_use]
    pub fn has_headers(&self) -> bool {
        self.headers.is_some()
    }

    /// Get a request header by name (case-insensitive).
    ///
    /// Returns `None` both when the header is missing and when headers have
    /// not arrived yet; use [`has_headers`](Self::has_headers) to tell apart.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .get(&name.to_lowercase())
            .map(String::as_str)
    }

    /// Record request headers as they arrive on a live connection.
    pub fn receive_headers<I, K, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = self.headers.get_or_insert_with(HashMap::new);
        for (name, value) in headers {
            map.insert(name.into().to_lowercase(), value.into());
        }
    }
}

/// Builder for `ConnectionContext`.
#[derive(Debug, Default)]
pub struct ConnectionContextBuilder {
    ctx: ConnectionContext,
}

impl ConnectionContextBuilder {
    /// Set the downstream peer address.
    #[must_use]
    pub fn source(mut self, addr: SocketAddr) -> Self {
        self.ctx.source = Some(addr);
        self
    }

    /// Set the local address.
    #[must_use]
    pub fn destination(mut self, addr: SocketAddr) -> Self {
        self.ctx.destination = Some(addr);
        self
    }

    /// Set the TLS server name.
    #[must_use]
    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.ctx.server_name = Some(name.into());
        self
    }

    /// Add a request header (name is lowercased). Marks headers as received.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.ctx.receive_headers([(name.into(), value.into())]);
        self
    }

    /// Mark headers as received even if none were added.
    #[must_use]
    pub fn headers_received(mut self) -> Self {
        self.ctx.headers.get_or_insert_with(HashMap::new);
        self
    }

    /// Build the `ConnectionContext`.
    #[must_use]
    pub fn build(self) -> ConnectionContext {
        self.ctx
    }
}
