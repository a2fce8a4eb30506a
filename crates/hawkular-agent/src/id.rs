//! Resource identifiers and canonical inventory paths.
//!
//! A resource id names the managed server that owns the resource followed by
//! a protocol-specific part, for example `feed~Local DMR~/subsystem=datasources`
//! or `Local JMX~java.lang:type=Memory`. Clients may instead send a canonical
//! inventory path such as `/t;tenant/f;feed/r;feed~Local%20DMR~%2F`, whose
//! last resource segment carries the id.

use std::fmt;

use percent_encoding::percent_decode_str;
use thiserror::Error;

const ID_SEPARATOR: char = '~';
const SEGMENT_SEPARATOR: char = '/';
const TYPE_SEPARATOR: char = ';';
const RESOURCE_SEGMENT: &str = "r";

/// Failure to interpret a resource id or path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The id was empty or blank.
    #[error("Invalid resource ID - cannot be empty")]
    Empty,
    /// The id lacks a managed-server part.
    #[error("Cannot parse invalid ID: {raw}")]
    Invalid {
        /// The rejected id.
        raw: String,
    },
    /// A canonical path is malformed or names no resource.
    #[error("Bad resource path specified in command: {raw}")]
    BadResourcePath {
        /// The rejected path.
        raw: String,
    },
}

/// The pieces of a resource id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdParts {
    feed_id: Option<String>,
    managed_server_name: String,
    id_part: String,
}

impl ResourceIdParts {
    /// Splits `<server>~<id-part>` or `<feed>~<server>~<id-part>`.
    ///
    /// The three-part form splits at most twice, so the id part may contain
    /// `~` itself. Any id with two or more separators is read as the
    /// three-part form: `server~a~b` names feed `server` and server `a`.
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        if raw.trim().is_empty() {
            return Err(IdError::Empty);
        }
        let invalid = || IdError::Invalid {
            raw: raw.to_owned(),
        };
        let parts: Vec<&str> = raw.splitn(3, ID_SEPARATOR).collect();
        let (feed_id, server, id_part) = match parts.as_slice() {
            [server, id_part] => (None, *server, *id_part),
            [feed, server, id_part] => (Some((*feed).to_owned()), *server, *id_part),
            _ => return Err(invalid()),
        };
        if server.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            feed_id,
            managed_server_name: server.to_owned(),
            id_part: id_part.to_owned(),
        })
    }

    /// Joins the pieces back into a three-part id.
    #[must_use]
    pub fn build(feed_id: &str, managed_server_name: &str, id_part: &str) -> String {
        format!("{feed_id}{ID_SEPARATOR}{managed_server_name}{ID_SEPARATOR}{id_part}")
    }

    /// Feed prefix, present only in the three-part form.
    #[must_use]
    pub fn feed_id(&self) -> Option<&str> {
        self.feed_id.as_deref()
    }

    /// Name of the managed server owning the resource.
    #[must_use]
    pub fn managed_server_name(&self) -> &str {
        &self.managed_server_name
    }

    /// Protocol-specific remainder: a DMR address or a JMX object name.
    #[must_use]
    pub fn id_part(&self) -> &str {
        &self.id_part
    }
}

/// A parsed hierarchical inventory path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPath {
    segments: Vec<(String, String)>,
}

impl CanonicalPath {
    /// Parses `/type;id/type;id/...`, percent-decoding each id.
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let bad = || IdError::BadResourcePath {
            raw: raw.to_owned(),
        };
        let body = raw.strip_prefix(SEGMENT_SEPARATOR).ok_or_else(bad)?;
        let segments = body
            .split(SEGMENT_SEPARATOR)
            .map(|segment| {
                let (kind, encoded) = segment.split_once(TYPE_SEPARATOR).ok_or_else(bad)?;
                if kind.is_empty() || encoded.is_empty() {
                    return Err(bad());
                }
                let id = percent_decode_str(encoded)
                    .decode_utf8()
                    .map_err(|_| bad())?
                    .into_owned();
                Ok((kind.to_owned(), id))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    /// `(type, id)` pairs in order.
    #[must_use]
    pub fn segments(&self) -> &[(String, String)] {
        &self.segments
    }

    /// Id of the deepest resource segment.
    #[must_use]
    pub fn resource_id(&self) -> Option<&str> {
        self.segments
            .iter()
            .rev()
            .find(|(kind, _)| kind == RESOURCE_SEGMENT)
            .map(|(_, id)| id.as_str())
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (kind, id) in &self.segments {
            write!(f, "{SEGMENT_SEPARATOR}{kind}{TYPE_SEPARATOR}{id}")?;
        }
        Ok(())
    }
}

/// Reduces whatever a client sent as the target to a resource id.
///
/// Canonical paths (leading `/`) yield their leaf resource id; anything else
/// is already an id.
pub fn resolve_resource_id(raw: &str) -> Result<String, IdError> {
    if raw.starts_with(SEGMENT_SEPARATOR) {
        let path = CanonicalPath::parse(raw)?;
        path.resource_id()
            .map(str::to_owned)
            .ok_or_else(|| IdError::BadResourcePath {
                raw: raw.to_owned(),
            })
    } else {
        Ok(raw.to_owned())
    }
}
