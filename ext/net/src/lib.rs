//! mtree-net: Connection domain for match trees
//!
//! Matches on what a proxy knows about a downstream connection: peer and
//! local addresses, TLS server name and, once they arrive, request headers.
//!
//! # Example
//!
//! ```
//! use mtree_net::prelude::*;
//!
//! let tree: MatchTree<ConnectionContext, &str> = MatchTree::ip_ranges(
//!     Box::new(SourceIpInput),
//!     vec![RangeGroup::new(vec!["10.0.0.0/8".parse().unwrap()], OnMatch::Action("internal"))],
//!     Some(OnMatch::Action("external")),
//! );
//!
//! let ctx = ConnectionContext::builder()
//!     .source("10.1.2.3:51000".parse().unwrap())
//!     .build();
//! assert_eq!(tree.evaluate(&ctx), MatchResult::Matched("internal"));
//! ```

mod context;
mod inputs;

pub use context::{ConnectionContext, ConnectionContextBuilder};
pub use inputs::*;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        ConnectionContext, ConnectionContextBuilder, DestinationIpInput, DestinationPortInput,
        RequestHeaderInput, ServerNameInput, SourceIpInput,
    };
    pub use mtree::prelude::*;
}

/// Register all mtree-net types with the given builder.
///
/// Registers core matcher kinds (`IpMatcher`) and connection inputs:
/// - `mtree.net.v1.SourceIpInput` → [`SourceIpInput`]
/// - `mtree.net.v1.DestinationIpInput` → [`DestinationIpInput`]
/// - `mtree.net.v1.DestinationPortInput` → [`DestinationPortInput`]
/// - `mtree.net.v1.ServerNameInput` → [`ServerNameInput`]
/// - `mtree.net.v1.RequestHeaderInput` → [`RequestHeaderInput`]
#[cfg(feature = "registry")]
#[must_use]
pub fn register<A>(
    builder: mtree::RegistryBuilder<ConnectionContext, A>,
) -> mtree::RegistryBuilder<ConnectionContext, A>
where
    A: Clone + Send + Sync + serde::de::DeserializeOwned + 'static,
{
    mtree::register_core_matchers(builder)
        .input::<SourceIpInput>("mtree.net.v1.SourceIpInput")
        .input::<DestinationIpInput>("mtree.net.v1.DestinationIpInput")
        .input::<DestinationPortInput>("mtree.net.v1.DestinationPortInput")
        .input::<ServerNameInput>("mtree.net.v1.ServerNameInput")
        .input::<RequestHeaderInput>("mtree.net.v1.RequestHeaderInput")
}
