//! `DataInput` implementations for [`ConnectionContext`].

use mtree::prelude::*;

use crate::ConnectionContext;

/// Extracts the downstream peer IP address.
#[derive(Debug, Clone)]
pub struct SourceIpInput;

impl DataInput<ConnectionContext> for SourceIpInput {
    fn get(&self, ctx: &ConnectionContext) -> FieldValue {
        ctx.source().map(|addr| addr.ip().to_string()).into()
    }
}

/// Extracts the local IP address the connection was accepted on.
#[derive(Debug, Clone)]
pub struct DestinationIpInput;

impl DataInput<ConnectionContext> for DestinationIpInput {
    fn get(&self, ctx: &ConnectionContext) -> FieldValue {
        ctx.destination().map(|addr| addr.ip().to_string()).into()
    }
}

/// Extracts the local port as a decimal string.
#[derive(Debug, Clone)]
pub struct DestinationPortInput;

impl DataInput<ConnectionContext> for DestinationPortInput {
    fn get(&self, ctx: &ConnectionContext) -> FieldValue {
        ctx.destination().map(|addr| addr.port().to_string()).into()
    }
}

/// Extracts the TLS server name.
#[derive(Debug, Clone)]
pub struct ServerNameInput;

impl DataInput<ConnectionContext> for ServerNameInput {
    fn get(&self, ctx: &ConnectionContext) -> FieldValue {
        ctx.server_name().into()
    }
}

/// Extracts a request header by name (case-insensitive).
///
/// Pending until the connection has received its request headers.
#[derive(Debug, Clone)]
pub struct RequestHeaderInput {
    name: String,
}

impl RequestHeaderInput {
    /// Create a header input for the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
        }
    }
}

impl DataInput<ConnectionContext> for RequestHeaderInput {
    fn get(&self, ctx: &ConnectionContext) -> FieldValue {
        if !ctx.has_headers() {
            return FieldValue::Pending;
        }
        ctx.header(&self.name).into()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry support (feature = "registry")
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuration for [`RequestHeaderInput`].
#[cfg(feature = "registry")]
#[derive(serde::Deserialize)]
pub struct RequestHeaderInputConfig {
    /// The header name to extract.
    pub name: String,
}

#[cfg(feature = "registry")]
impl mtree::IntoDataInput<ConnectionContext> for SourceIpInput {
    type Config = mtree::UnitConfig;

    fn from_config(
        _: mtree::UnitConfig,
    ) -> Result<Box<dyn mtree::DataInput<ConnectionContext>>, mtree::MatcherError> {
        Ok(Box::new(SourceIpInput))
    }
}

#[cfg(feature = "registry")]
impl mtree::IntoDataInput<ConnectionContext> for DestinationIpInput {
    type Config = mtree::UnitConfig;

    fn from_config(
        _: mtree::UnitConfig,
    ) -> Result<Box<dyn mtree::DataInput<ConnectionContext>>, mtree::MatcherError> {
        Ok(Box::new(DestinationIpInput))
    }
}

#[cfg(feature = "registry")]
impl mtree::IntoDataInput<ConnectionContext> for DestinationPortInput {
    type Config = mtree::UnitConfig;

    fn from_config(
        _: mtree::UnitConfig,
    ) -> Result<Box<dyn mtree::DataInput<ConnectionContext>>, mtree::MatcherError> {
        Ok(Box::new(DestinationPortInput))
    }
}

#[cfg(feature = "registry")]
impl mtree::IntoDataInput<ConnectionContext> for ServerNameInput {
    type Config = mtree::UnitConfig;

    fn from_config(
        _: mtree::UnitConfig,
    ) -> Result<Box<dyn mtree::DataInput<ConnectionContext>>, mtree::MatcherError> {
        Ok(Box::new(ServerNameInput))
    }
}

#[cfg(feature = "registry")]
impl mtree::IntoDataInput<ConnectionContext> for RequestHeaderInput {
    type Config = RequestHeaderInputConfig;

    fn from_config(
        config: Self::Config,
    ) -> Result<Box<dyn mtree::DataInput<ConnectionContext>>, mtree::MatcherError> {
        if config.name.is_empty() {
            return Err(mtree::MatcherError::InvalidConfig {
                reason: "header name must not be empty".into(),
            });
        }
        Ok(Box::new(RequestHeaderInput::new(config.name)))
    }
}
