//! Text sanitizers applied to outgoing report fields.
//!
//! A sanitizer rewrites a string before it leaves the process. Sanitizers are
//! collected into a [`SanitizerChain`], which applies them in registration
//! order, each one operating on the output of the previous.

use regex::{NoExpand, Regex};
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Rewrites text before it is sent to the error tracking service.
pub trait Sanitizer: Send + Sync {
    /// Return the sanitized form of `original`.
    fn sanitize(&self, original: &str) -> String;
}

impl<F> Sanitizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn sanitize(&self, original: &str) -> String {
        self(original)
    }
}

/// Replaces every match of a regular expression with a fixed string.
///
/// Matching is global, non-overlapping and leftmost-first. The replacement is
/// inserted literally: `$1` or `${name}` are not expanded.
#[derive(Debug, Clone)]
pub struct RegexSanitizer {
    pattern: Regex,
    replacement: String,
}

impl RegexSanitizer {
    /// Compile a new sanitizer.
    ///
    /// # Errors
    /// Returns the regex compilation error if `pattern` is invalid.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self::from_regex(Regex::new(pattern)?, replacement))
    }

    /// Build a sanitizer from an already compiled regex.
    pub fn from_regex(pattern: Regex, replacement: impl Into<String>) -> Self {
        Self {
            pattern,
            replacement: replacement.into(),
        }
    }

    /// The pattern this sanitizer matches.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Sanitizer for RegexSanitizer {
    fn sanitize(&self, original: &str) -> String {
        self.pattern
            .replace_all(original, NoExpand(&self.replacement))
            .into_owned()
    }
}

/// Four dot-separated groups of one to three digits. Octet ranges are not
/// validated, so `999.999.999.999` matches as well.
static IPV4_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[0-9]{1,3}\.){3}[0-9]{1,3}").expect("IPv4 pattern is valid")
});

const IPV4_REPLACEMENT: &str = "???.???.???.???";

/// Masks everything that looks like an IPv4 address with `???.???.???.???`.
#[derive(Debug, Clone)]
pub struct Ipv4Sanitizer {
    inner: RegexSanitizer,
}

impl Ipv4Sanitizer {
    /// Create a new IPv4 sanitizer.
    pub fn new() -> Self {
        Self {
            inner: RegexSanitizer::from_regex(IPV4_PATTERN.clone(), IPV4_REPLACEMENT),
        }
    }
}

impl Default for Ipv4Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer for Ipv4Sanitizer {
    fn sanitize(&self, original: &str) -> String {
        self.inner.sanitize(original)
    }
}

/// Ordered sequence of sanitizers.
#[derive(Clone, Default)]
pub struct SanitizerChain {
    rules: Vec<Arc<dyn Sanitizer>>,
}

impl SanitizerChain {
    /// Create an empty chain. An empty chain returns its input unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sanitizer. It runs after every sanitizer already registered.
    pub fn push(&mut self, sanitizer: Arc<dyn Sanitizer>) {
        self.rules.push(sanitizer);
    }

    /// Run every sanitizer in registration order.
    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for rule in &self.rules {
            result = rule.sanitize(&result);
        }
        result
    }

    /// Number of registered sanitizers.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if no sanitizer is registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for SanitizerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SanitizerChain")
            .field("rules", &self.rules.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ips_at_beginning() {
        let sanitizer = Ipv4Sanitizer::new();
        for input in [
            "1.1.1.1 b",
            "11.1.1.1 b",
            "111.1.1.1 b",
            "111.11.1.1 b",
            "111.111.1.1 b",
            "111.111.11.1 b",
            "111.111.111.1 b",
            "111.111.111.11 b",
            "111.111.111.111 b",
        ] {
            assert_eq!(sanitizer.sanitize(input), "???.???.???.??? b", "{}", input);
        }
    }

    #[test]
    fn test_ip_at_end() {
        assert_eq!(
            Ipv4Sanitizer::new().sanitize("a 1.1.1.1"),
            "a ???.???.???.???"
        );
    }

    #[test]
    fn test_ip_in_middle() {
        assert_eq!(
            Ipv4Sanitizer::new().sanitize("a 1.1.1.1 b"),
            "a ???.???.???.??? b"
        );
    }

    #[test]
    fn test_multiple_ips() {
        assert_eq!(
            Ipv4Sanitizer::new().sanitize("a 1.1.1.1 b 2.2.2.2 c"),
            "a ???.???.???.??? b ???.???.???.??? c"
        );
    }

    #[test]
    fn test_out_of_range_octets_still_match() {
        assert_eq!(
            Ipv4Sanitizer::new().sanitize("from 999.999.999.999"),
            "from ???.???.???.???"
        );
    }

    #[test]
    fn test_no_match_is_noop() {
        let text = "nothing to hide here, version 1.2.3";
        assert_eq!(Ipv4Sanitizer::new().sanitize(text), text);
    }

    #[test]
    fn test_regex_replacement_is_literal() {
        let sanitizer = RegexSanitizer::new(r"(\w+)@example\.com", "$1 <redacted>").unwrap();
        assert_eq!(
            sanitizer.sanitize("mail bob@example.com now"),
            "mail $1 <redacted> now"
        );
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(RegexSanitizer::new("(unclosed", "x").is_err());
    }

    #[test]
    fn test_chain_applies_in_order() {
        let mut chain = SanitizerChain::new();
        chain.push(Arc::new(Ipv4Sanitizer::new()));
        chain.push(Arc::new(RegexSanitizer::new("bob", "bubba").unwrap()));

        assert_eq!(
            chain.apply("Message containing an ip of 192.168.0.1 and an ip of 10.65.1.1 with bob"),
            "Message containing an ip of ???.???.???.??? and an ip of ???.???.???.??? with bubba"
        );
    }

    #[test]
    fn test_chain_order_matters() {
        let first = RegexSanitizer::new("a", "b").unwrap();
        let second = RegexSanitizer::new("b", "c").unwrap();

        let mut forward = SanitizerChain::new();
        forward.push(Arc::new(first.clone()));
        forward.push(Arc::new(second.clone()));

        let mut reverse = SanitizerChain::new();
        reverse.push(Arc::new(second));
        reverse.push(Arc::new(first));

        assert_eq!(forward.apply("a"), "c");
        assert_eq!(reverse.apply("a"), "b");
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let chain = SanitizerChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.apply("10.0.0.1"), "10.0.0.1");
    }

    #[test]
    fn test_closure_sanitizer() {
        let mut chain = SanitizerChain::new();
        chain.push(Arc::new(|s: &str| s.to_uppercase()));
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.apply("secret"), "SECRET");
    }
}
