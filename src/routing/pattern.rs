//! Glob-style path patterns.
//!
//! # Syntax
//! - `**` matches zero or more whole segments
//! - `*` matches zero or more characters inside one segment
//! - `?` matches exactly one character
//! - `{name}` matches one non-empty segment (or a run of characters when
//!   embedded in a larger segment, e.g. `app-{hash}.js`)
//!
//! # Design Decisions
//! - Patterns compile once at startup; matching allocates only the segment list
//! - Matching is case-sensitive and works on the raw (still percent-encoded) path
//! - A single trailing slash on the path is optional

use thiserror::Error;

/// Errors raised while compiling a [`PathPattern`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern {0:?} must start with '/'")]
    MissingLeadingSlash(String),

    #[error("pattern {0:?} has an unclosed '{{'")]
    UnclosedCapture(String),

    #[error("pattern {0:?} uses '**' inside a segment")]
    EmbeddedDoubleWildcard(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Glob(Vec<u8>),
    Capture,
    AnyDepth,
}

impl Segment {
    fn parse(raw: &str, pattern: &str) -> Result<Self, PatternError> {
        if raw == "**" {
            return Ok(Segment::AnyDepth);
        }
        if raw.contains("**") {
            return Err(PatternError::EmbeddedDoubleWildcard(pattern.to_string()));
        }
        if raw.len() > 2 && raw.starts_with('{') && raw.ends_with('}') && !raw[1..].contains('{') {
            return Ok(Segment::Capture);
        }

        // Embedded captures behave like '*'.
        let mut glob = Vec::with_capacity(raw.len());
        let mut chars = raw.bytes();
        while let Some(b) = chars.next() {
            if b == b'{' {
                if !chars.by_ref().any(|c| c == b'}') {
                    return Err(PatternError::UnclosedCapture(pattern.to_string()));
                }
                glob.push(b'*');
            } else {
                glob.push(b);
            }
        }

        if glob.iter().any(|&b| b == b'*' || b == b'?') {
            Ok(Segment::Glob(glob))
        } else {
            Ok(Segment::Literal(raw.to_string()))
        }
    }

    fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::Literal(lit) => lit == segment,
            Segment::Glob(glob) => wildcard_match(glob, segment.as_bytes()),
            Segment::Capture => !segment.is_empty(),
            Segment::AnyDepth => true,
        }
    }
}

/// A compiled path pattern such as `/console/**`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
    prefix: String,
}

impl PathPattern {
    /// Compile a pattern.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let Some(body) = pattern.strip_prefix('/') else {
            return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
        };

        let segments = body
            .split('/')
            .map(|raw| Segment::parse(raw, pattern))
            .collect::<Result<Vec<_>, _>>()?;

        let mut literals: Vec<&str> = segments
            .iter()
            .map_while(|s| match s {
                Segment::Literal(lit) if !lit.is_empty() => Some(lit.as_str()),
                _ => None,
            })
            .collect();
        // A pattern without wildcards keeps its last segment for the upstream path.
        if segments.iter().all(|s| matches!(s, Segment::Literal(_))) {
            literals.pop();
        }
        let prefix = if literals.is_empty() {
            String::new()
        } else {
            format!("/{}", literals.join("/"))
        };

        Ok(Self {
            source: pattern.to_string(),
            segments,
            prefix,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The literal leading segments, e.g. `/console` for `/console/**`.
    /// Empty when the pattern starts with a wildcard. For a pattern without
    /// wildcards the last segment is left out: `/console/index.html` gives
    /// `/console`.
    pub fn static_prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if `path` matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let Some(body) = path.strip_prefix('/') else {
            return false;
        };
        let parts: Vec<&str> = body.split('/').collect();
        if match_segments(&self.segments, &parts) {
            return true;
        }
        // Optional trailing slash
        parts.len() > 1
            && parts.last() == Some(&"")
            && match_segments(&self.segments, &parts[..parts.len() - 1])
    }

    /// Remove the static prefix from `path`, keeping the leading slash.
    ///
    /// Paths that do not start with the prefix on a segment boundary are
    /// returned unchanged.
    pub fn strip_static_prefix<'a>(&self, path: &'a str) -> &'a str {
        if self.prefix.is_empty() {
            return path;
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => path,
        }
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((segment, rest)) => match path.split_first() {
            Some((head, tail)) => segment.matches(head) && match_segments(rest, tail),
            None => false,
        },
    }
}

/// Single-segment wildcard match supporting `*` and `?`.
fn wildcard_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut star: Option<usize> = None;
    let mut resume = 0;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == b'?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == b'*' {
            star = Some(p);
            resume = t;
            p += 1;
        } else if let Some(s) = star {
            p = s + 1;
            resume += 1;
            t = resume;
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&b| b == b'*')
}
