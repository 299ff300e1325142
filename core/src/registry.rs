//! Type registry for config-driven match tree construction.
//!
//! The registry turns a [`MatchTreeConfig`] into a [`MatchTree`] without
//! domain-specific loading code.
//!
//! # Architecture (axum `BoxedIntoRoute` pattern)
//!
//! Each `DataInput` type registers itself via [`IntoDataInput`], each matcher
//! kind via [`IntoTreeMatcher`]. At registration time the concrete type `T` is
//! monomorphized into a closure and erased behind `Box<dyn Fn>`. Early type
//! erasure at registration, late invocation at load time.
//!
//! # Extension Seams (xDS-faithful)
//!
//! | Seam | Trait | Registry Method | Envoy Category |
//! |------|-------|-----------------|----------------|
//! | Inputs | [`IntoDataInput`] | `builder.input::<T>(url)` | `envoy.matching.common_inputs` |
//! | Matchers | [`IntoTreeMatcher`] | `builder.matcher::<T>(url)` | `envoy.matching.custom_matchers` |
//!
//! Exact and prefix maps are built in and need no registration. Actions are
//! deserialized directly as `A`.
//!
//! # Example
//!
//! ```ignore
//! let registry = register_core_matchers(RegistryBuilder::new())
//!     .input::<SourceIpInput>("mtree.net.v1.SourceIpInput")
//!     .build();
//!
//! let config: MatchTreeConfig<String> = serde_yaml::from_str(yaml)?;
//! let tree = registry.load(config)?;
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;

use crate::config::{MapConfig, MatchTreeConfig, MatcherKindConfig, OnMatchConfig, TypedConfig};
use crate::{
    DataInput, ExactMapMatcher, IpRangeMatcher, MatchTree, MatcherError, OnMatch,
    PrefixMapMatcher, TreeMatcher,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Traits
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait for `DataInput` types that can be constructed from configuration.
///
/// # Design (tower double dispatch)
///
/// `DataInput<Ctx>` describes *what* to extract. `IntoDataInput<Ctx>` describes *how* to
/// construct from config. The registry composes both: look up the `type_url` -> deserialize
/// config -> construct input.
pub trait IntoDataInput<Ctx: 'static>: Send + Sync + 'static {
    /// The configuration type deserialized from JSON/YAML.
    type Config: DeserializeOwned + Send + Sync;

    /// Construct a `DataInput` from deserialized configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidConfig`] if the config is semantically invalid
    /// (e.g., empty header name).
    fn from_config(config: Self::Config) -> Result<Box<dyn DataInput<Ctx>>, MatcherError>;
}

/// Trait for matcher kinds that can be constructed from configuration.
///
/// Maps to Envoy's `custom_match` extension point. Unlike [`IntoDataInput`],
/// this is generic over the action type: matcher configs embed outcomes,
/// which are loaded back through the registry.
///
/// # Example
///
/// ```ignore
/// impl<Ctx: 'static, A: Clone + Send + Sync + DeserializeOwned + 'static> IntoTreeMatcher<Ctx, A>
///     for SuffixMapMatcher<Ctx, A>
/// {
///     type Config = SuffixMapConfig<A>;
///     fn from_config(config: Self::Config, registry: &Registry<Ctx, A>) -> Result<Self, MatcherError> {
///         let entries = config.suffixes.into_iter()
///             .map(|(suffix, on_match)| Ok((suffix, registry.load_on_match(on_match)?)))
///             .collect::<Result<Vec<_>, MatcherError>>()?;
///         Ok(SuffixMapMatcher::new(entries))
///     }
/// }
/// ```
pub trait IntoTreeMatcher<Ctx: 'static, A: Clone + Send + Sync + 'static>:
    TreeMatcher<Ctx, A> + Sized + 'static
{
    /// The configuration type deserialized from JSON/YAML.
    type Config: DeserializeOwned;

    /// Construct the matcher from deserialized configuration.
    ///
    /// # Errors
    ///
    /// Any [`MatcherError`] raised while validating the config or loading
    /// nested outcomes.
    fn from_config(config: Self::Config, registry: &Registry<Ctx, A>) -> Result<Self, MatcherError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Type-erased factories
// ═══════════════════════════════════════════════════════════════════════════════

/// Type-erased input factory closure.
type BoxedInputFactory<Ctx> =
    Box<dyn Fn(&serde_json::Value) -> Result<Box<dyn DataInput<Ctx>>, MatcherError> + Send + Sync>;

/// Type-erased matcher factory closure.
type BoxedMatcherFactory<Ctx, A> = Box<
    dyn Fn(
            &serde_json::Value,
            &Registry<Ctx, A>,
        ) -> Result<Box<dyn TreeMatcher<Ctx, A>>, MatcherError>
        + Send
        + Sync,
>;

fn decode<T: DeserializeOwned>(value: &serde_json::Value) -> Result<T, MatcherError> {
    serde_json::from_value(value.clone()).map_err(|e| MatcherError::InvalidConfig {
        reason: e.to_string(),
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for constructing a [`Registry`].
///
/// Register `DataInput` types and matcher kinds with their type URLs, then call
/// [`build()`](Self::build) to produce an immutable `Registry`. No runtime
/// registration is possible after build.
pub struct RegistryBuilder<Ctx, A> {
    input_factories: HashMap<String, BoxedInputFactory<Ctx>>,
    matcher_factories: HashMap<String, BoxedMatcherFactory<Ctx, A>>,
}

impl<Ctx: 'static, A: Clone + Send + Sync + 'static> RegistryBuilder<Ctx, A> {
    /// Create a new empty registry builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            input_factories: HashMap::new(),
            matcher_factories: HashMap::new(),
        }
    }

    /// Register a `DataInput` type with a type URL.
    ///
    /// At load time, the registry deserializes config as `T::Config` and calls
    /// `T::from_config()` to produce the `DataInput`.
    #[must_use]
    pub fn input<T: IntoDataInput<Ctx>>(mut self, type_url: &str) -> Self {
        self.input_factories.insert(
            type_url.to_owned(),
            Box::new(|value: &serde_json::Value| T::from_config(decode(value)?)),
        );
        self
    }

    /// Register a matcher kind with a type URL, for use as `custom_match`.
    #[must_use]
    pub fn matcher<T: IntoTreeMatcher<Ctx, A>>(mut self, type_url: &str) -> Self {
        self.matcher_factories.insert(
            type_url.to_owned(),
            Box::new(|value: &serde_json::Value, registry: &Registry<Ctx, A>| {
                let matcher = T::from_config(decode(value)?, registry)?;
                Ok(Box::new(matcher) as Box<dyn TreeMatcher<Ctx, A>>)
            }),
        );
        self
    }

    /// Freeze the registry. No further registration is possible.
    #[must_use]
    pub fn build(self) -> Registry<Ctx, A> {
        Registry {
            input_factories: self.input_factories,
            matcher_factories: self.matcher_factories,
        }
    }
}

impl<Ctx: 'static, A: Clone + Send + Sync + 'static> Default for RegistryBuilder<Ctx, A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Register core built-in matcher kinds (`IpMatcher`).
///
/// Call this in domain `register()` functions; domain-specific inputs are
/// then added on top.
///
/// # Example
///
/// ```ignore
/// pub fn register<A>(builder: RegistryBuilder<MyCtx, A>) -> RegistryBuilder<MyCtx, A> {
///     mtree::register_core_matchers(builder)
///         .input::<MyInput>("mtree.my.v1.MyInput")
/// }
/// ```
#[must_use]
pub fn register_core_matchers<Ctx, A>(builder: RegistryBuilder<Ctx, A>) -> RegistryBuilder<Ctx, A>
where
    Ctx: 'static,
    A: Clone + Send + Sync + DeserializeOwned + 'static,
{
    builder.matcher::<IpRangeMatcher<Ctx, A>>("mtree.core.v1.IpMatcher")
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable registry of `DataInput` and matcher factories.
///
/// Constructed via [`RegistryBuilder`]. Use [`load()`](Self::load) to build a
/// runtime [`MatchTree`] from config.
pub struct Registry<Ctx, A> {
    input_factories: HashMap<String, BoxedInputFactory<Ctx>>,
    matcher_factories: HashMap<String, BoxedMatcherFactory<Ctx, A>>,
}

impl<Ctx: 'static, A: Clone + Send + Sync + 'static> Registry<Ctx, A> {
    /// Load a `MatchTree` from configuration.
    ///
    /// Resolves every input and matcher by type URL, builds all nested trees,
    /// and validates the depth of the result.
    ///
    /// # Errors
    ///
    /// - [`MatcherError::UnknownTypeUrl`] — input or matcher `type_url` not registered
    /// - [`MatcherError::InvalidConfig`] — config deserialization or construction failed
    /// - [`MatcherError::InvalidAddress`] / [`MatcherError::InvalidPrefixLength`] — bad CIDR range
    /// - [`MatcherError::DuplicateKey`] — repeated key in an exact or prefix map
    /// - [`MatcherError::DepthExceeded`] — nesting exceeds [`MAX_DEPTH`](crate::MAX_DEPTH)
    pub fn load(&self, config: MatchTreeConfig<A>) -> Result<MatchTree<Ctx, A>, MatcherError> {
        let tree = self.load_tree(config)?;
        tree.validate()?;
        tracing::debug!(depth = tree.depth(), "loaded match tree");
        Ok(tree)
    }

    /// Load an outcome: an action as-is, or a nested tree.
    ///
    /// Used by matcher kinds whose configs embed outcomes. Nested trees are
    /// not depth-checked here; [`load()`](Self::load) checks the whole tree.
    ///
    /// # Errors
    ///
    /// Any error of [`load()`](Self::load) raised by a nested tree.
    pub fn load_on_match(&self, config: OnMatchConfig<A>) -> Result<OnMatch<Ctx, A>, MatcherError> {
        match config {
            OnMatchConfig::Action { action } => Ok(OnMatch::Action(action)),
            OnMatchConfig::Tree { tree } => Ok(OnMatch::tree(self.load_tree(*tree)?)),
        }
    }

    /// Returns the number of registered input types.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.input_factories.len()
    }

    /// Returns the number of registered matcher kinds.
    #[must_use]
    pub fn matcher_count(&self) -> usize {
        self.matcher_factories.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input_factories.is_empty() && self.matcher_factories.is_empty()
    }

    /// Returns `true` if the given input type URL is registered.
    #[must_use]
    pub fn contains_input(&self, type_url: &str) -> bool {
        self.input_factories.contains_key(type_url)
    }

    /// Returns `true` if the given matcher type URL is registered.
    #[must_use]
    pub fn contains_matcher(&self, type_url: &str) -> bool {
        self.matcher_factories.contains_key(type_url)
    }

    /// Returns the registered input type URLs, sorted.
    #[must_use]
    pub fn input_type_urls(&self) -> Vec<&str> {
        sorted_keys(&self.input_factories)
    }

    /// Returns the registered matcher type URLs, sorted.
    #[must_use]
    pub fn matcher_type_urls(&self) -> Vec<&str> {
        sorted_keys(&self.matcher_factories)
    }

    fn load_tree(&self, config: MatchTreeConfig<A>) -> Result<MatchTree<Ctx, A>, MatcherError> {
        let input = self.load_input(&config.input)?;
        let matcher: Box<dyn TreeMatcher<Ctx, A>> = match config.matcher {
            MatcherKindConfig::ExactMatchMap(map) => {
                Box::new(ExactMapMatcher::new(self.load_entries(map)?)?)
            }
            MatcherKindConfig::PrefixMatchMap(map) => {
                Box::new(PrefixMapMatcher::new(self.load_entries(map)?)?)
            }
            MatcherKindConfig::CustomMatch(typed) => self.load_matcher(&typed)?,
        };
        let on_no_match = config
            .on_no_match
            .map(|fallback| self.load_on_match(fallback))
            .transpose()?;
        Ok(MatchTree::new(input, matcher, on_no_match))
    }

    fn load_input(&self, config: &TypedConfig) -> Result<Box<dyn DataInput<Ctx>>, MatcherError> {
        let factory = self.input_factories.get(&config.type_url).ok_or_else(|| {
            MatcherError::UnknownTypeUrl {
                type_url: config.type_url.clone(),
                registry: "input",
                available: self.input_factories.keys().cloned().collect(),
            }
        })?;
        factory(&config.config)
    }

    fn load_matcher(
        &self,
        config: &TypedConfig,
    ) -> Result<Box<dyn TreeMatcher<Ctx, A>>, MatcherError> {
        let factory = self.matcher_factories.get(&config.type_url).ok_or_else(|| {
            MatcherError::UnknownTypeUrl {
                type_url: config.type_url.clone(),
                registry: "matcher",
                available: self.matcher_factories.keys().cloned().collect(),
            }
        })?;
        factory(&config.config, self)
    }

    fn load_entries(
        &self,
        map: MapConfig<A>,
    ) -> Result<Vec<(String, OnMatch<Ctx, A>)>, MatcherError> {
        map.map
            .into_iter()
            .map(|(key, on_match)| -> Result<_, MatcherError> {
                Ok((key, self.load_on_match(on_match)?))
            })
            .collect()
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<&str> {
    let mut urls: Vec<&str> = map.keys().map(String::as_str).collect();
    urls.sort_unstable();
    urls
}

impl<Ctx, A> fmt::Debug for Registry<Ctx, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("inputs", &self.input_factories.keys().collect::<Vec<_>>())
            .field("matchers", &self.matcher_factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
