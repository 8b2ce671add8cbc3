//! Capability tags declared by producers, consumers and stages.
//!
//! Caps are a lightweight type contract checked when two endpoints are
//! attached. A tag is a `/`-separated path such as `text/line`; a consumer
//! accepting `text` accepts anything produced as `text` or `text/...`.
//!
//! ```rust
//! use sluice::caps::Caps;
//!
//! let line = Caps::new("text/line");
//! assert!(Caps::new("text").accepts(&line));
//! assert!(!Caps::new("bytes").accepts(&line));
//! assert!(Caps::any().accepts(&line));
//! ```

use std::borrow::Cow;
use std::fmt;

const ANY: &str = "*";

/// A declared capability tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Caps {
    tag: Cow<'static, str>,
}

impl Caps {
    /// Create caps from a tag.
    pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
        Self { tag: tag.into() }
    }

    /// Caps that accept, and are accepted by, anything.
    pub const fn any() -> Self {
        Self {
            tag: Cow::Borrowed(ANY),
        }
    }

    /// The tag string.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Check if these are the unconstrained caps.
    pub fn is_any(&self) -> bool {
        self.tag == ANY
    }

    /// Check whether a consumer declaring `self` accepts items declared as `produced`.
    pub fn accepts(&self, produced: &Caps) -> bool {
        if self.is_any() || produced.is_any() {
            return true;
        }
        match produced.tag.strip_prefix(self.tag.as_ref()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl fmt::Display for Caps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

impl From<&'static str> for Caps {
    fn from(tag: &'static str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for Caps {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

/// Check a producer/consumer pairing.
///
/// Undeclared caps on either side always pass.
pub(crate) fn check(produced: Option<Caps>, accepted: Option<Caps>) -> crate::Result<()> {
    match (produced, accepted) {
        (Some(produced), Some(accepted)) if !accepted.accepts(&produced) => {
            Err(crate::Error::TypeMismatch { produced, accepted })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_tags_match() {
        assert!(Caps::new("bytes").accepts(&Caps::new("bytes")));
        assert!(!Caps::new("bytes").accepts(&Caps::new("text")));
    }

    #[test]
    fn test_refinement_is_accepted() {
        let text = Caps::new("text");
        assert!(text.accepts(&Caps::new("text/line")));
        assert!(!Caps::new("text/line").accepts(&text));
        // Prefix without a separator is a different tag
        assert!(!text.accepts(&Caps::new("textual")));
    }

    #[test]
    fn test_any_matches_both_ways() {
        assert!(Caps::any().accepts(&Caps::new("anything")));
        assert!(Caps::new("anything").accepts(&Caps::any()));
        assert!(Caps::any().is_any());
    }

    #[test]
    fn test_check_only_rejects_declared_mismatch() {
        assert!(check(None, Some(Caps::new("a"))).is_ok());
        assert!(check(Some(Caps::new("a")), None).is_ok());
        assert!(check(Some(Caps::new("a")), Some(Caps::new("a"))).is_ok());

        let err = check(Some(Caps::new("a")), Some(Caps::new("b"))).unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(
            err.to_string(),
            "type mismatch: a cannot flow into a consumer accepting b"
        );
    }
}
