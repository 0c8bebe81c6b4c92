//! The `Depth` request header (RFC 4918 §10.2).

use std::fmt;

/// How far below the target a method reaches. A missing header means
/// `infinity` for PROPFIND, COPY, MOVE and LOCK alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Depth {
    Zero,
    One,
    #[default]
    Infinity,
}

impl Depth {
    /// `None` for anything but `0`, `1` or `infinity` (any case).
    #[must_use]
    pub fn from_header(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("infinity") {
            return Some(Self::Infinity);
        }
        match value {
            "0" => Some(Self::Zero),
            "1" => Some(Self::One),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
            Self::Infinity => "infinity",
        }
    }

    #[must_use]
    pub const fn descends(self) -> bool {
        !matches!(self, Self::Zero)
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
