//! Purpose: Resolve dotted key paths (`a.b.0.c`) against classified values.
//! Exports: `KeyPath`, `Segment`.
//! Role: Convenience over repeated `decode::<Data>` / `element` calls; used by the CLI.
//! Invariants: Numeric segments index arrays; on dictionaries they are plain keys.
//! Invariants: Resolution stops at the first failing segment and returns its error.
use std::borrow::Cow;
use std::fmt;

use crate::core::decode::{Decodable, GetChecked, describe};
use crate::core::error::{DecodeError, Error, ErrorKind};
use crate::core::value::Data;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Segment(String);

impl Segment {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn index(&self) -> Option<usize> {
        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyPath {
    parents: Vec<Segment>,
    last: Segment,
}

impl KeyPath {
    pub fn parse(path: &str) -> Result<Self, Error> {
        let mut segments = Vec::new();
        for part in path.split('.') {
            if part.is_empty() {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(format!("invalid key path `{path}`"))
                    .with_hint("Use dot-separated keys like `result.0.entity_id`."));
            }
            segments.push(Segment(part.to_string()));
        }
        let last = segments.pop().ok_or_else(|| {
            Error::new(ErrorKind::Usage).with_message("key path must not be empty")
        })?;
        Ok(Self {
            parents: segments,
            last,
        })
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.parents.iter().chain(std::iter::once(&self.last))
    }

    /// Decode the value at this path as `T`.
    pub fn decode<T: Decodable>(&self, root: &Data) -> Result<T, DecodeError> {
        let parent = self.parent(root)?;
        match (parent.as_ref(), self.last.index()) {
            (Data::Array(items), Some(index)) => {
                let raw = items.get_checked(index)?;
                T::from_raw(raw).ok_or_else(|| {
                    DecodeError::incorrect_type(self.last.as_str(), T::descriptor(), describe(raw))
                })
            }
            (parent, _) => parent.decode(self.last.as_str()),
        }
    }

    fn parent<'a>(&self, root: &'a Data) -> Result<Cow<'a, Data>, DecodeError> {
        let mut current = Cow::Borrowed(root);
        for segment in &self.parents {
            tracing::trace!(
                segment = segment.as_str(),
                shape = current.shape().as_str(),
                "descending key path"
            );
            let next = match (current.as_ref(), segment.index()) {
                (Data::Array(_), Some(index)) => current.element(index)?,
                (data, _) => data.decode::<Data>(segment.as_str())?,
            };
            current = Cow::Owned(next);
        }
        Ok(current)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.parents {
            write!(f, "{}.", segment.as_str())?;
        }
        f.write_str(self.last.as_str())
    }
}
