//! Repository paths.

use crate::{CoreError, CoreResult, Name, NamespaceContext};
use std::fmt;

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// `.`
    Current,
    /// `..`
    Parent,
    /// A named step with its same-name-sibling index (1-based).
    Named { name: Name, index: u32 },
}

impl Segment {
    pub fn named(name: Name) -> Self {
        Segment::Named { name, index: 1 }
    }

    pub fn name(&self) -> Option<&Name> {
        match self {
            Segment::Named { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// An absolute or relative path made of resolved segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    absolute: bool,
    segments: Vec<Segment>,
}

impl Path {
    /// The root path `/`.
    pub fn root() -> Self {
        Self {
            absolute: true,
            segments: Vec::new(),
        }
    }

    pub fn new(absolute: bool, segments: Vec<Segment>) -> Self {
        Self { absolute, segments }
    }

    /// Parse a slash-separated path, resolving each segment's prefix through
    /// `context`. A trailing slash is ignored.
    pub fn parse(text: &str, context: &dyn NamespaceContext) -> CoreResult<Path> {
        if text.is_empty() {
            return Err(CoreError::invalid_path(text, "empty path"));
        }
        let absolute = text.starts_with('/');
        let body = text.trim_start_matches('/').trim_end_matches('/');
        if absolute && text.starts_with("//") {
            return Err(CoreError::invalid_path(text, "empty segment"));
        }

        let mut segments = Vec::new();
        if !body.is_empty() {
            for raw in body.split('/') {
                segments.push(parse_segment(text, raw, context)?);
            }
        }
        if !absolute && segments.is_empty() {
            return Err(CoreError::invalid_path(text, "empty path"));
        }
        Ok(Path { absolute, segments })
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn is_root(&self) -> bool {
        self.absolute && self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn last_segment(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Remove `.` steps and fold `..` steps into their predecessors.
    pub fn normalize(&self) -> CoreResult<Path> {
        let mut out: Vec<Segment> = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Current => {}
                Segment::Parent => match out.last() {
                    Some(Segment::Named { .. }) => {
                        out.pop();
                    }
                    _ if self.absolute => {
                        return Err(CoreError::invalid_path(
                            self.to_string(),
                            "navigates above the root",
                        ));
                    }
                    _ => out.push(Segment::Parent),
                },
                named => out.push(named.clone()),
            }
        }
        Ok(Path {
            absolute: self.absolute,
            segments: out,
        })
    }

    /// True when `self` equals `ancestor` or lies below it. Both paths are
    /// compared in normalized form.
    pub fn is_at_or_below(&self, ancestor: &Path) -> bool {
        let (Ok(this), Ok(ancestor)) = (self.normalize(), ancestor.normalize()) else {
            return false;
        };
        this.absolute == ancestor.absolute
            && this.segments.len() >= ancestor.segments.len()
            && this.segments[..ancestor.segments.len()] == ancestor.segments[..]
    }

    /// Render in `prefix:local` form using the current prefix mapping.
    pub fn to_prefixed(&self, context: &dyn NamespaceContext) -> CoreResult<String> {
        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            parts.push(match segment {
                Segment::Current => ".".to_string(),
                Segment::Parent => "..".to_string(),
                Segment::Named { name, index } if *index > 1 => {
                    format!("{}[{}]", name.to_prefixed(context)?, index)
                }
                Segment::Named { name, .. } => name.to_prefixed(context)?,
            });
        }
        let joined = parts.join("/");
        Ok(if self.absolute {
            format!("/{}", joined)
        } else {
            joined
        })
    }
}

fn parse_segment(path: &str, raw: &str, context: &dyn NamespaceContext) -> CoreResult<Segment> {
    match raw {
        "" => Err(CoreError::invalid_path(path, "empty segment")),
        "." => Ok(Segment::Current),
        ".." => Ok(Segment::Parent),
        _ => {
            let (name_part, index) = match raw.strip_suffix(']') {
                Some(rest) => {
                    let (name_part, index) = rest
                        .rsplit_once('[')
                        .ok_or_else(|| CoreError::invalid_path(path, "unbalanced index"))?;
                    let index: u32 = index
                        .parse()
                        .ok()
                        .filter(|i| *i > 0)
                        .ok_or_else(|| CoreError::invalid_path(path, "invalid index"))?;
                    (name_part, index)
                }
                None => (raw, 1),
            };
            let name = Name::parse(name_part, context)
                .map_err(|e| CoreError::invalid_path(path, e.to_string()))?;
            Ok(Segment::Named { name, index })
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            write!(f, "/")?;
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            match segment {
                Segment::Current => write!(f, ".")?,
                Segment::Parent => write!(f, "..")?,
                Segment::Named { name, index } if *index > 1 => write!(f, "{}[{}]", name, index)?,
                Segment::Named { name, .. } => write!(f, "{}", name)?,
            }
        }
        Ok(())
    }
}
