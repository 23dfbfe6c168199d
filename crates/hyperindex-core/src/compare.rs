use alloy_primitives::Address;
use std::fmt;

/// Case-insensitive hex address comparison.
///
/// Accepts an optional `0x`/`0X` prefix and ignores surrounding whitespace,
/// so checksummed, lowercase and uppercase renderings compare equal.
pub fn addresses_match(a: &str, b: &str) -> bool {
    normalize(a).eq_ignore_ascii_case(normalize(b))
}

fn normalize(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Result of comparing a derived address with an independently observed one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    pub derived: Address,
    pub expected: Address,
    pub matches: bool,
}

pub fn compare(derived: Address, expected: Address) -> Comparison {
    Comparison {
        derived,
        expected,
        matches: addresses_match(&derived.to_string(), &expected.to_string()),
    }
}

impl Comparison {
    pub fn verdict(&self) -> Verdict {
        if self.matches {
            Verdict::Match
        } else {
            Verdict::Mismatch(MismatchWarning {
                derived: self.derived,
                expected: self.expected,
            })
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matches {
            write!(f, "MATCH derived={} expected={}", self.derived, self.expected)
        } else {
            write!(
                f,
                "MISMATCH derived={} expected={}",
                self.derived, self.expected
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Mismatch(MismatchWarning),
}

/// Derived and expected addresses disagree.
///
/// Not an error: the run continues. A mismatch between the address derived
/// from the live factory hash and the address the router computes means the
/// router's pair library was built with a stale init-code hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MismatchWarning {
    pub derived: Address,
    pub expected: Address,
}

impl MismatchWarning {
    pub fn recommendation(&self) -> &'static str {
        "redeploy the router with a pair library compiled against the factory's pairCodeHash"
    }
}

impl fmt::Display for MismatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "derived address {} does not match expected {}; {}",
            self.derived,
            self.expected,
            self.recommendation()
        )
    }
}
