use std::fmt;

/// A property path referencing a (possibly nested) feature property.
///
/// Compound properties are addressed with dotted paths, e.g.
/// `address.street`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    pub fn new(segments: Vec<String>) -> Path {
        Path { segments }
    }

    /// Parses a dotted path string.
    pub fn parse(path: &str) -> Path {
        Path {
            segments: path.split('.').map(str::to_string).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The first segment and the remainder of the path.
    pub fn split_first(&self) -> Option<(&str, &[String])> {
        let (first, rest) = self.segments.split_first()?;
        Some((first, rest))
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl From<&str> for Path {
    fn from(src: &str) -> Path {
        Path::parse(src)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}
