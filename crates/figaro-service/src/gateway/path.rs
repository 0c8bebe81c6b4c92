//! Request paths relative to a gateway root.

use std::fmt;
use std::path::{Path, PathBuf};

use super::error::{FsError, FsResult};

/// A decoded path below a gateway root. Never contains `..`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DavPath {
    segments: Vec<String>,
}

impl DavPath {
    /// The root itself.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Parses a raw (percent-encoded) path tail.
    ///
    /// Empty and `.` segments are dropped.
    ///
    /// ## Errors
    /// Returns `Forbidden` for `..` segments, segments that decode to
    /// something containing a separator or NUL, and undecodable segments.
    pub fn parse(raw: &str) -> FsResult<Self> {
        let mut segments = Vec::new();
        for segment in raw.split('/') {
            let decoded = urlencoding::decode(segment).map_err(|_utf8| FsError::Forbidden)?;
            match decoded.as_ref() {
                "" | "." => {}
                ".." => return Err(FsError::Forbidden),
                name if name.contains(['/', '\\', '\0']) => return Err(FsError::Forbidden),
                name => segments.push(name.to_string()),
            }
        }
        Ok(Self { segments })
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Whether any segment names a dot-entry.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.segments.iter().any(|s| s.starts_with('.'))
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.segments.split_last()?;
        Some(Self {
            segments: parent.to_vec(),
        })
    }

    #[must_use]
    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// Whether `self` equals `ancestor` or lies below it.
    #[must_use]
    pub fn starts_with(&self, ancestor: &Self) -> bool {
        self.segments.starts_with(&ancestor.segments)
    }

    /// The remainder of `self` below `ancestor`.
    #[must_use]
    pub fn strip_prefix(&self, ancestor: &Self) -> Option<Self> {
        let rest = self.segments.strip_prefix(ancestor.segments.as_slice())?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    #[must_use]
    pub fn to_fs_path(&self, root: &Path) -> PathBuf {
        self.segments
            .iter()
            .fold(root.to_path_buf(), |path, segment| path.join(segment))
    }

    /// Percent-encoded href under `base`; collections end with `/`.
    #[must_use]
    pub fn to_href(&self, base: &str, is_collection: bool) -> String {
        let mut href = base.trim_end_matches('/').to_string();
        for segment in &self.segments {
            href.push('/');
            href.push_str(&urlencoding::encode(segment));
        }
        if is_collection || self.is_root() {
            href.push('/');
        }
        href
    }
}

impl fmt::Display for DavPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}
