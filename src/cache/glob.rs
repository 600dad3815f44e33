//! Glob Pattern Module
//!
//! Compiles `*` glob patterns into a literal-segment matcher for bulk key
//! deletion. Key families like `product:category:<id>:*` need mid-string
//! wildcard support, and keys may embed arbitrary entity identifiers, so
//! patterns are never interpreted as regular expressions.

// == Glob Pattern ==
/// A compiled glob pattern where `*` matches any substring (including empty).
///
/// The pattern is split on `*` into literal segments which must appear in the
/// key in order; the first and last segments are anchored unless the pattern
/// begins or ends with a wildcard.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    raw: String,
    segments: Vec<String>,
    anchored_start: bool,
    anchored_end: bool,
    has_wildcard: bool,
}

impl GlobPattern {
    // == Compile ==
    /// Compiles a pattern string into a matcher.
    pub fn compile(pattern: &str) -> Self {
        let has_wildcard = pattern.contains('*');
        let segments = pattern
            .split('*')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
            anchored_start: !pattern.starts_with('*'),
            anchored_end: !pattern.ends_with('*'),
            has_wildcard,
        }
    }

    // == Matches ==
    /// Tests a key against the pattern.
    pub fn matches(&self, key: &str) -> bool {
        // Without a wildcard the pattern is a literal key.
        if !self.has_wildcard {
            return key == self.raw;
        }

        let total = self.segments.len();
        let mut rest = key;

        for (index, segment) in self.segments.iter().enumerate() {
            let is_first = index == 0;
            let is_last = index + 1 == total;

            if is_first && self.anchored_start {
                match rest.strip_prefix(segment.as_str()) {
                    Some(stripped) => rest = stripped,
                    None => return false,
                }
            } else if is_last && self.anchored_end {
                // Final segment must terminate the key after the position
                // reached by the preceding segments.
                if rest.len() < segment.len() || !rest.ends_with(segment.as_str()) {
                    return false;
                }
                rest = "";
            } else {
                match rest.find(segment.as_str()) {
                    Some(at) => rest = &rest[at + segment.len()..],
                    None => return false,
                }
            }
        }

        true
    }
}
