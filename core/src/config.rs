//! Config types for generic match tree construction.
//!
//! These types mirror the runtime tree types but are serde-deserializable,
//! enabling config-driven construction via [`Registry::load()`](crate::Registry::load).
//!
//! # Relationship to runtime types
//!
//! | Config type | Runtime type | Loader |
//! |-------------|-------------|--------|
//! | [`MatchTreeConfig`] | [`MatchTree`](crate::MatchTree) | `Registry::load()` |
//! | [`MatcherKindConfig`] | `Box<dyn TreeMatcher<Ctx, A>>` | built-in or via registry factory |
//! | [`OnMatchConfig`] | [`OnMatch`](crate::OnMatch) | `Registry::load_on_match()` |
//! | [`IpMatcherConfig`] | [`IpRangeMatcher`](crate::IpRangeMatcher) | `mtree.core.v1.IpMatcher` |
//! | [`TypedConfig`] | `Box<dyn DataInput<Ctx>>` | via registry factory |
//!
//! # Shape
//!
//! ```yaml
//! input: { type_url: mtree.test.v1.StringInput, config: { key: ip } }
//! custom_match:
//!   type_url: mtree.core.v1.IpMatcher
//!   config:
//!     range_matchers:
//!       - ranges: [{ address_prefix: 10.0.0.0, prefix_len: 8 }]
//!         on_match: { type: action, action: internal }
//! on_no_match: { type: action, action: external }
//! ```

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::marker::PhantomData;

/// Configuration for a [`MatchTree`](crate::MatchTree).
///
/// Exactly one matcher selector must be present: `exact_match_map`,
/// `prefix_match_map` or `custom_match`. Unknown fields are rejected.
#[derive(Debug, Clone)]
pub struct MatchTreeConfig<A> {
    /// The input to extract the lookup value from context.
    pub input: TypedConfig,

    /// The matcher kind and its entries.
    pub matcher: MatcherKindConfig<A>,

    /// Fallback when no candidate resolved.
    pub on_no_match: Option<OnMatchConfig<A>>,
}

/// The matcher selector of a [`MatchTreeConfig`].
#[derive(Debug, Clone)]
pub enum MatcherKindConfig<A> {
    /// Exact key lookup.
    ExactMatchMap(MapConfig<A>),
    /// Longest prefix first, inclusive fallback to shorter prefixes.
    PrefixMatchMap(MapConfig<A>),
    /// A registered matcher kind, resolved by type URL.
    CustomMatch(TypedConfig),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, bound(deserialize = "A: Deserialize<'de>"))]
struct RawMatchTreeConfig<A> {
    input: TypedConfig,
    #[serde(default)]
    exact_match_map: Option<MapConfig<A>>,
    #[serde(default)]
    prefix_match_map: Option<MapConfig<A>>,
    #[serde(default)]
    custom_match: Option<TypedConfig>,
    #[serde(default)]
    on_no_match: Option<OnMatchConfig<A>>,
}

impl<'de, A: Deserialize<'de>> Deserialize<'de> for MatchTreeConfig<A> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawMatchTreeConfig::<A>::deserialize(deserializer)?;
        let matcher = match (raw.exact_match_map, raw.prefix_match_map, raw.custom_match) {
            (Some(map), None, None) => MatcherKindConfig::ExactMatchMap(map),
            (None, Some(map), None) => MatcherKindConfig::PrefixMatchMap(map),
            (None, None, Some(custom)) => MatcherKindConfig::CustomMatch(custom),
            (None, None, None) => {
                return Err(de::Error::custom(
                    "match tree requires one of `exact_match_map`, `prefix_match_map` or `custom_match`",
                ))
            }
            _ => {
                return Err(de::Error::custom(
                    "match tree accepts exactly one of `exact_match_map`, `prefix_match_map` or `custom_match`",
                ))
            }
        };
        Ok(Self {
            input: raw.input,
            matcher,
            on_no_match: raw.on_no_match,
        })
    }
}

/// Entries of an exact or prefix map.
///
/// Entries keep document order and repeated keys are kept, so the loader can
/// reject them with [`MatcherError::DuplicateKey`](crate::MatcherError::DuplicateKey)
/// instead of silently keeping one.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>"))]
pub struct MapConfig<A> {
    /// `(key, outcome)` pairs in document order.
    #[serde(deserialize_with = "ordered_entries")]
    pub map: Vec<(String, OnMatchConfig<A>)>,
}

fn ordered_entries<'de, D, A>(deserializer: D) -> Result<Vec<(String, OnMatchConfig<A>)>, D::Error>
where
    D: Deserializer<'de>,
    A: Deserialize<'de>,
{
    struct EntriesVisitor<A>(PhantomData<A>);

    impl<'de, A: Deserialize<'de>> Visitor<'de> for EntriesVisitor<A> {
        type Value = Vec<(String, OnMatchConfig<A>)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map from keys to on_match configs")
        }

        fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
            let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(entry) = access.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor(PhantomData))
}

/// Configuration for [`OnMatch`](crate::OnMatch).
///
/// Either an action (leaf) or a nested tree. `OnMatch` exclusivity is
/// enforced by the enum: action XOR tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
#[serde(bound(deserialize = "A: Deserialize<'de>"))]
pub enum OnMatchConfig<A> {
    /// Return this action.
    #[serde(rename = "action")]
    Action {
        /// The action value.
        action: A,
    },

    /// Evaluate a nested tree.
    #[serde(rename = "tree")]
    Tree {
        /// The nested tree configuration.
        tree: Box<MatchTreeConfig<A>>,
    },
}

/// Configuration of the `mtree.core.v1.IpMatcher` matcher kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>"))]
pub struct IpMatcherConfig<A> {
    /// Range groups in priority order (ties at equal prefix length go to the earlier group).
    pub range_matchers: Vec<RangeMatcherConfig<A>>,
}

/// One range group.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>"))]
pub struct RangeMatcherConfig<A> {
    /// Ranges sharing the outcome.
    pub ranges: Vec<CidrRangeConfig>,

    /// Whether a nested miss stops the lookup instead of trying shorter prefixes.
    #[serde(default)]
    pub exclusive: bool,

    /// Outcome when any range contains the address.
    pub on_match: OnMatchConfig<A>,
}

/// A CIDR range as an address and a prefix length.
#[derive(Debug, Clone, Deserialize)]
pub struct CidrRangeConfig {
    /// IPv4 or IPv6 address. Host bits are masked off.
    pub address_prefix: String,

    /// Number of leading bits. Defaults to 0, which covers the whole family.
    #[serde(default)]
    pub prefix_len: u32,
}

/// Reference to a registered type with its configuration.
///
/// Maps to xDS `TypedExtensionConfig`:
/// - `type_url` identifies the registered type
/// - `config` carries the type-specific configuration payload
#[derive(Debug, Clone, Deserialize)]
pub struct TypedConfig {
    /// The type URL identifying the registered input or matcher type.
    pub type_url: String,

    /// Type-specific configuration payload, deserialized as the registered
    /// type's `Config`. A key repeated in any object of the payload is rejected.
    #[serde(default = "default_config", deserialize_with = "unique_keys")]
    pub config: serde_json::Value,
}

fn default_config() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn unique_keys<'de, D: Deserializer<'de>>(deserializer: D) -> Result<serde_json::Value, D::Error> {
    UniqueKeys::deserialize(deserializer).map(|payload| payload.0)
}

/// A payload value whose objects never repeat a key.
///
/// `serde_json::Value` keeps only the last of repeated keys, which would
/// silently drop entries of maps nested in a `custom_match` payload.
struct UniqueKeys(serde_json::Value);

impl<'de> Deserialize<'de> for UniqueKeys {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(UniqueKeysVisitor).map(UniqueKeys)
    }
}

struct UniqueKeysVisitor;

impl<'de> Visitor<'de> for UniqueKeysVisitor {
    type Value = serde_json::Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a config value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(v.into())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(v.into())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(v.into())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(serde_json::Number::from_f64(v).map_or(serde_json::Value::Null, Into::into))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(v.into())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(v.into())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(serde_json::Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(serde_json::Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        UniqueKeys::deserialize(deserializer).map(|payload| payload.0)
    }

    fn visit_seq<S: SeqAccess<'de>>(self, mut access: S) -> Result<Self::Value, S::Error> {
        let mut items = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(UniqueKeys(item)) = access.next_element()? {
            items.push(item);
        }
        Ok(serde_json::Value::Array(items))
    }

    fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
        let mut object = serde_json::Map::new();
        while let Some(key) = access.next_key::<String>()? {
            if object.contains_key(&key) {
                return Err(de::Error::custom(format_args!("duplicate key `{key}`")));
            }
            let UniqueKeys(value) = access.next_value()?;
            object.insert(key, value);
        }
        Ok(serde_json::Value::Object(object))
    }
}

/// Empty configuration for types that need no construction parameters.
///
/// Accepts any value (`{}`, `null`, etc.) and ignores it.
#[derive(Debug, Clone, Copy)]
pub struct UnitConfig;

impl<'de> Deserialize<'de> for UnitConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        de::IgnoredAny::deserialize(deserializer)?;
        Ok(UnitConfig)
    }
}
