// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use thiserror::Error;

const KIND_SEPARATOR: char = '/';

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IdError {
    #[error("empty component kind")]
    EmptyKind,
    #[error("invalid component kind: {0}")]
    InvalidKind(String),
    #[error("empty component name")]
    EmptyName,
    #[error("invalid component id: {0}")]
    InvalidId(String),
}

/// Kind of a component, e.g. `videoin-stub`.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Kind(String);

impl Kind {
    pub fn new(kind: &str) -> Result<Self, IdError> {
        if kind.is_empty() {
            return Err(IdError::EmptyKind);
        }

        if kind.contains(KIND_SEPARATOR) {
            return Err(IdError::InvalidKind(kind.to_string()));
        }

        Ok(Kind(kind.to_string()))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a configured component instance: `<kind>/<name>`.
/// The name part may be empty, in which case the id renders as the kind only.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct ID {
    kind: Kind,
    name: String,
}

impl ID {
    pub fn new(kind: Kind) -> Self {
        ID {
            kind,
            name: String::new(),
        }
    }

    pub fn new_with_name(kind: Kind, name: &str) -> Result<Self, IdError> {
        if name.is_empty() {
            return Err(IdError::EmptyName);
        }

        Ok(ID {
            kind,
            name: name.to_string(),
        })
    }

    /// Parse an id from its string form (`kind` or `kind/name`).
    pub fn new_with_str(id: &str) -> Result<Self, IdError> {
        match id.split_once(KIND_SEPARATOR) {
            Some((kind, name)) => {
                if name.contains(KIND_SEPARATOR) {
                    return Err(IdError::InvalidId(id.to_string()));
                }
                ID::new_with_name(Kind::new(kind)?, name)
            }
            None => Ok(ID::new(Kind::new(id)?)),
        }
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}{}{}", self.kind, KIND_SEPARATOR, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(Kind::new("videoin-stub").unwrap().to_string(), "videoin-stub");
        assert_eq!(Kind::new(""), Err(IdError::EmptyKind));
        assert!(matches!(Kind::new("a/b"), Err(IdError::InvalidKind(_))));
    }

    #[test]
    fn test_id_from_str() {
        let id = ID::new_with_str("videoin-stub/main").unwrap();
        assert_eq!(id.kind().to_string(), "videoin-stub");
        assert_eq!(id.name(), "main");
        assert_eq!(id.to_string(), "videoin-stub/main");

        let id = ID::new_with_str("videoin-stub").unwrap();
        assert_eq!(id.name(), "");
        assert_eq!(id.to_string(), "videoin-stub");

        assert_eq!(ID::new_with_str("videoin-stub/"), Err(IdError::EmptyName));
        assert!(matches!(
            ID::new_with_str("a/b/c"),
            Err(IdError::InvalidId(_))
        ));
    }
}
