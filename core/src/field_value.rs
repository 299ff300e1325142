//! `FieldValue` — Tri-state value that flows from a `DataInput` into a matcher
//!
//! A field is either available (possibly empty) or pending. "Absent" and
//! "will never be available" collapse into `Available("")`: an empty value
//! simply fails to match any configured key or range.

/// The value of one named request field at evaluation time.
///
/// # Variants
///
/// - `Available` — A concrete value is present. May be empty.
/// - `Pending` — The value cannot be produced yet (e.g. headers still streaming).
///   Evaluation suspends and reports [`MatchResult::Indeterminate`](crate::MatchResult::Indeterminate).
///
/// # Example
///
/// ```
/// use mtree::FieldValue;
///
/// let value = FieldValue::from("10.0.0.1");
/// assert_eq!(value.as_str(), Some("10.0.0.1"));
/// assert!(FieldValue::Pending.is_pending());
/// assert_eq!(FieldValue::from(None::<String>), FieldValue::absent());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    /// A concrete value. Empty when the field is absent from the request.
    Available(String),

    /// The value is not available yet.
    Pending,
}

impl FieldValue {
    /// An available but empty value (the field is absent).
    #[inline]
    #[must_use]
    pub fn absent() -> Self {
        Self::Available(String::new())
    }

    /// Returns `true` if this is the `Pending` variant.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns `true` if a value (possibly empty) is available.
    #[inline]
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Returns `true` if the value is available and empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Available(s) if s.is_empty())
    }

    /// The available value, or `None` while pending.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Available(s) => Some(s.as_str()),
            Self::Pending => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Available(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Available(value)
    }
}

/// `None` means the field is absent, not pending.
impl<T: Into<String>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::absent, |v| Self::Available(v.into()))
    }
}
