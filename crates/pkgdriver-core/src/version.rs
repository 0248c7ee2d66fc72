//! Resilient parsing of tool-emitted version strings.
//!
//! The wrapped tool's version format has drifted across its own releases:
//! plain `major.minor.build`, preview-tagged strings, qualifier suffixes
//! like `-beta2`. [`Version::parse`] extracts as much numeric information as
//! possible and never fails; the worst case is `0.0`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 2- to 4-component numeric version.
///
/// `build` and `revision` are `None` when that component was not present or
/// not resolvable, which is distinct from a value of zero. Revision can
/// never be present without build; [`Version::new`] normalizes that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub build: Option<u32>,
    pub revision: Option<u32>,
}

impl Version {
    /// Construct a version, dropping `revision` if `build` is absent.
    pub fn new(major: u32, minor: u32, build: Option<u32>, revision: Option<u32>) -> Self {
        let revision = if build.is_some() { revision } else { None };
        Version {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parse an arbitrary version token. Total: every input yields a value.
    ///
    /// Clean dot-separated digit strings (1 to 4 components) parse exactly.
    /// Anything else goes through segment-wise recovery: each dot-separated
    /// segment is resolved independently, with qualifier suffixes stripped
    /// and trailing letters discarded. Segments past the fourth are ignored.
    pub fn parse(text: &str) -> Version {
        if text.trim().is_empty() {
            return Version::new(0, 0, None, None);
        }

        if let Some(version) = Self::parse_strict(text) {
            return version;
        }

        let mut segments = text.split('.');
        let major = segments.next().and_then(resolve_segment).unwrap_or(0);
        let minor = segments.next().and_then(resolve_segment).unwrap_or(0);
        let build = segments.next().and_then(resolve_segment);
        let revision = segments.next().and_then(resolve_segment);

        Version::new(major, minor, build, revision)
    }

    /// Exact path: 1-4 dot-separated non-negative integers, nothing else.
    fn parse_strict(text: &str) -> Option<Version> {
        let segments: Vec<&str> = text.split('.').collect();
        if segments.is_empty() || segments.len() > 4 {
            return None;
        }

        let mut values = [None; 4];
        for (i, segment) in segments.iter().enumerate() {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            values[i] = Some(segment.parse::<u32>().ok()?);
        }

        Some(Version::new(
            values[0].unwrap_or(0),
            values[1].unwrap_or(0),
            values[2],
            values[3],
        ))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{}", build)?;
            if let Some(revision) = self.revision {
                write!(f, ".{}", revision)?;
            }
        }
        Ok(())
    }
}

/// Resolve one dot-separated segment to a number, or `None` if unparsable.
///
/// Order of attempts: strict digit parse, then appendix stripping (drop
/// everything from the first `-`, discarding qualifiers like `-preview`),
/// then digit cleanup. Cleanup keeps the leading digit run and tolerates
/// trailing letters (`123ABC` resolves to 123), but a digit appearing after
/// a letter (`3AB4C`) means real interleaving; guessing a number there would
/// lose too much, so the segment is abandoned as unparsable.
fn resolve_segment(segment: &str) -> Option<u32> {
    if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
        return segment.parse().ok();
    }

    let stripped = segment.split('-').next().unwrap_or("");

    let mut digits = String::new();
    let mut seen_letter = false;
    for ch in stripped.chars() {
        if ch.is_ascii_digit() {
            if seen_letter {
                return None;
            }
            digits.push(ch);
        } else if ch.is_alphabetic() {
            seen_letter = true;
        }
    }

    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// Whether a version token marks a preview release: at least as long as
/// `PREVIEW` and ending with it, case-insensitively.
pub fn is_preview_release(text: &str) -> bool {
    const TAG: &str = "PREVIEW";
    let len = text.len();
    len >= TAG.len()
        && text.is_char_boundary(len - TAG.len())
        && text[len - TAG.len()..].eq_ignore_ascii_case(TAG)
}
