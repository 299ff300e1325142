//! `IpRangeMatcher` — Longest-prefix CIDR dispatch over a binary trie.
//!
//! Range groups are inserted in configuration order into one trie per
//! address family. A lookup walks the address bits from the root, then
//! yields the entries of every covering node from the deepest (longest
//! prefix) to the root. Entries at one node keep configuration order.
//!
//! | Group | Nested tree misses | Effect |
//! |-------|--------------------|--------|
//! | inclusive | `NoMatch` | try the next shorter covering prefix |
//! | exclusive | `NoMatch` | stop, the tree reports `NoMatch` |

use crate::ip_trie::PrefixTrie;
use crate::{Candidate, MatcherError, OnMatch, TreeMatcher};
use ipnet::IpNet;
use std::fmt::Debug;
use std::net::IpAddr;

/// A set of CIDR ranges sharing one outcome.
///
/// The group matches an address if any of its ranges contains it.
pub struct RangeGroup<Ctx, A: Clone + Send + Sync + 'static> {
    ranges: Vec<IpNet>,
    exclusive: bool,
    on_match: OnMatch<Ctx, A>,
}

impl<Ctx, A: Clone + Send + Sync + 'static> RangeGroup<Ctx, A> {
    /// An inclusive group.
    pub fn new(ranges: Vec<IpNet>, on_match: OnMatch<Ctx, A>) -> Self {
        Self {
            ranges,
            exclusive: false,
            on_match,
        }
    }

    /// Set whether a nested miss stops the lookup.
    #[must_use]
    pub fn exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    /// The configured ranges.
    #[must_use]
    pub fn ranges(&self) -> &[IpNet] {
        &self.ranges
    }

    /// Returns `true` for an exclusive group.
    #[must_use]
    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    /// The outcome of this group.
    #[must_use]
    pub fn on_match(&self) -> &OnMatch<Ctx, A> {
        &self.on_match
    }
}

/// Parse an address prefix and a prefix length into a masked network.
///
/// Host bits past `prefix_len` are cleared, so `10.1.2.3` with length 8 is
/// `10.0.0.0/8`. A length of 0 covers the whole address family.
///
/// # Errors
///
/// - [`MatcherError::InvalidAddress`] if `address_prefix` is not an IP address
/// - [`MatcherError::InvalidPrefixLength`] if `prefix_len` exceeds 32 (IPv4) or 128 (IPv6)
///
/// # Example
///
/// ```
/// let net = mtree::parse_range("10.1.2.3", 8).unwrap();
/// assert_eq!(net.to_string(), "10.0.0.0/8");
/// assert!(mtree::parse_range("10.0.0.0", 33).is_err());
/// ```
pub fn parse_range(address_prefix: &str, prefix_len: u32) -> Result<IpNet, MatcherError> {
    let addr: IpAddr = address_prefix
        .parse()
        .map_err(|e: std::net::AddrParseError| MatcherError::InvalidAddress {
            address_prefix: address_prefix.to_owned(),
            reason: e.to_string(),
        })?;
    let max = if addr.is_ipv4() { 32 } else { 128 };
    let invalid_len = || MatcherError::InvalidPrefixLength {
        address_prefix: address_prefix.to_owned(),
        prefix_len,
        max,
    };
    let len = u8::try_from(prefix_len).map_err(|_| invalid_len())?;
    IpNet::new(addr, len)
        .map(|net| net.trunc())
        .map_err(|_| invalid_len())
}

/// Trie node entry: which group, and which of its ranges put it there.
#[derive(Debug, Clone, Copy)]
struct RangeEntry {
    group: usize,
    range: usize,
}

struct StoredGroup<Ctx, A: Clone + Send + Sync + 'static> {
    labels: Vec<String>,
    exclusive: bool,
    on_match: OnMatch<Ctx, A>,
}

/// Matches textual IP addresses against CIDR range groups.
///
/// Values that do not parse as an IPv4 or IPv6 address yield no candidates.
/// IPv4-mapped IPv6 addresses are looked up as IPv6.
pub struct IpRangeMatcher<Ctx, A: Clone + Send + Sync + 'static> {
    groups: Vec<StoredGroup<Ctx, A>>,
    v4: PrefixTrie<RangeEntry>,
    v6: PrefixTrie<RangeEntry>,
    ranges: usize,
}

impl<Ctx, A: Clone + Send + Sync + 'static> IpRangeMatcher<Ctx, A> {
    /// Build the tries from groups in configuration order.
    ///
    /// A group listing the same prefix twice is stored once at that node.
    pub fn new(groups: Vec<RangeGroup<Ctx, A>>) -> Self {
        let mut v4 = PrefixTrie::new(32);
        let mut v6 = PrefixTrie::new(128);
        let mut stored = Vec::with_capacity(groups.len());
        let mut ranges = 0;

        for (group, range_group) in groups.into_iter().enumerate() {
            let RangeGroup {
                ranges: nets,
                exclusive,
                on_match,
            } = range_group;
            let mut labels = Vec::with_capacity(nets.len());
            for (range, net) in nets.iter().map(IpNet::trunc).enumerate() {
                let entries = match net {
                    IpNet::V4(n) => v4.entry(u128::from(u32::from(n.network())), n.prefix_len()),
                    IpNet::V6(n) => v6.entry(u128::from(n.network()), n.prefix_len()),
                };
                if entries.last().map(|e: &RangeEntry| e.group) != Some(group) {
                    entries.push(RangeEntry { group, range });
                }
                labels.push(net.to_string());
            }
            ranges += labels.len();
            stored.push(StoredGroup {
                labels,
                exclusive,
                on_match,
            });
        }

        tracing::debug!(groups = stored.len(), ranges, "built ip range matcher");
        Self {
            groups: stored,
            v4,
            v6,
            ranges,
        }
    }
}

impl<Ctx, A: Clone + Send + Sync + 'static> TreeMatcher<Ctx, A> for IpRangeMatcher<Ctx, A> {
    fn candidates<'a>(&'a self, value: &str) -> Vec<Candidate<'a, Ctx, A>> {
        if value.is_empty() {
            return Vec::new();
        }
        let Ok(addr) = value.parse::<IpAddr>() else {
            tracing::trace!(value, "not an ip address, no ranges apply");
            return Vec::new();
        };
        let (trie, bits) = match addr {
            IpAddr::V4(a) => (&self.v4, u128::from(u32::from(a))),
            IpAddr::V6(a) => (&self.v6, u128::from(a)),
        };

        trie.matching(bits)
            .into_iter()
            .flatten()
            .map(|entry| {
                let group = &self.groups[entry.group];
                Candidate {
                    key: &group.labels[entry.range],
                    on_match: &group.on_match,
                    exclusive: group.exclusive,
                }
            })
            .collect()
    }

    fn depth(&self) -> usize {
        self.groups
            .iter()
            .map(|g| g.on_match.depth())
            .max()
            .unwrap_or(0)
    }

    fn len(&self) -> usize {
        self.ranges
    }
}

impl<Ctx, A: Clone + Send + Sync + 'static> Debug for IpRangeMatcher<Ctx, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpRangeMatcher")
            .field("groups", &self.groups.len())
            .field("ranges", &self.ranges)
            .finish()
    }
}

#[cfg(feature = "registry")]
impl<Ctx: 'static, A> crate::IntoTreeMatcher<Ctx, A> for IpRangeMatcher<Ctx, A>
where
    A: Clone + Send + Sync + serde::de::DeserializeOwned + 'static,
{
    type Config = crate::IpMatcherConfig<A>;

    fn from_config(
        config: Self::Config,
        registry: &crate::Registry<Ctx, A>,
    ) -> Result<Self, MatcherError> {
        let groups = config
            .range_matchers
            .into_iter()
            .map(|group| -> Result<RangeGroup<Ctx, A>, MatcherError> {
                let ranges = group
                    .ranges
                    .iter()
                    .map(|r| parse_range(&r.address_prefix, r.prefix_len))
                    .collect::<Result<Vec<_>, _>>()?;
                let on_match = registry.load_on_match(group.on_match)?;
                Ok(RangeGroup::new(ranges, on_match).exclusive(group.exclusive))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(groups))
    }
}
