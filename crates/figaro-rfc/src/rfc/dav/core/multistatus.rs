//! The `DAV:multistatus` document model.

use super::property::DavProperty;

/// Href as it goes on the wire. Callers encode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Href(String);

impl Href {
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Status code of a propstat, rendered as an HTTP/1.1 status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(pub u16);

impl Status {
    pub const OK: Self = Self(200);
    pub const FORBIDDEN: Self = Self(403);
    pub const NOT_FOUND: Self = Self(404);

    const fn reason(self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            403 => "Forbidden",
            404 => "Not Found",
            409 => "Conflict",
            423 => "Locked",
            424 => "Failed Dependency",
            507 => "Insufficient Storage",
            _ => "Internal Server Error",
        }
    }

    #[must_use]
    pub fn status_line(self) -> String {
        format!("HTTP/1.1 {} {}", self.0, self.reason())
    }
}

#[derive(Debug, Clone)]
pub struct Propstat {
    pub properties: Vec<DavProperty>,
    pub status: Status,
}

/// One `D:response`: an href and its properties grouped by status.
#[derive(Debug, Clone)]
pub struct PropstatResponse {
    pub href: Href,
    pub propstats: Vec<Propstat>,
}

impl PropstatResponse {
    fn empty(href: Href) -> Self {
        Self {
            href,
            propstats: Vec::new(),
        }
    }

    /// Adds a group unless it holds no properties.
    fn group(mut self, properties: Vec<DavProperty>, status: Status) -> Self {
        if !properties.is_empty() {
            self.propstats.push(Propstat { properties, status });
        }
        self
    }

    #[must_use]
    pub fn ok(href: Href, found: Vec<DavProperty>) -> Self {
        Self::with_status(href, found, Status::OK)
    }

    /// 200 group first, then 404. Either may be left out when empty.
    #[must_use]
    pub fn with_found_and_not_found(href: Href, found: Vec<DavProperty>, missing: Vec<DavProperty>) -> Self {
        Self::empty(href)
            .group(found, Status::OK)
            .group(missing, Status::NOT_FOUND)
    }

    /// Single group, kept even when empty so the response is never bare.
    #[must_use]
    pub fn with_status(href: Href, properties: Vec<DavProperty>, status: Status) -> Self {
        Self {
            href,
            propstats: vec![Propstat { properties, status }],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Multistatus {
    pub responses: Vec<PropstatResponse>,
}

impl Multistatus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_response(&mut self, response: PropstatResponse) {
        self.responses.push(response);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}
