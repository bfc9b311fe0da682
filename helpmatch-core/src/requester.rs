//! Requesters: the volunteers that task pools are ranked for.
//!
//! A [`Requester`] is a read-only snapshot taken for one ranking request. Its
//! identifier is validated up front so malformed ids are rejected before any
//! source or oracle is consulted.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use geo::Coord;
use thiserror::Error;

/// Longest identifier accepted by [`RequesterId::new`].
pub const MAX_REQUESTER_ID_LEN: usize = 64;

/// Opaque, validated requester identifier.
///
/// Identifiers are non-empty, at most [`MAX_REQUESTER_ID_LEN`] characters, and
/// consist of ASCII letters, digits, `-` or `_`.
///
/// # Examples
/// ```
/// use helpmatch_core::RequesterId;
///
/// let id: RequesterId = "65f1c0ffee".parse()?;
/// assert_eq!(id.as_str(), "65f1c0ffee");
/// assert!("not valid!".parse::<RequesterId>().is_err());
/// # Ok::<(), helpmatch_core::RequesterIdError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct RequesterId(String);

/// Errors returned by [`RequesterId::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequesterIdError {
    /// The identifier was empty.
    #[error("requester id must not be empty")]
    Empty,
    /// The identifier was longer than allowed.
    #[error("requester id must be at most {max} characters")]
    TooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The identifier contained a character outside the accepted set.
    #[error("requester id contains invalid character {found:?}")]
    InvalidCharacter {
        /// First offending character.
        found: char,
    },
}

impl RequesterId {
    /// Validate and wrap a raw identifier.
    ///
    /// # Errors
    /// Returns [`RequesterIdError`] when the identifier is empty, too long, or
    /// contains characters other than ASCII alphanumerics, `-` and `_`.
    pub fn new(raw: impl Into<String>) -> Result<Self, RequesterIdError> {
        let value = raw.into();
        if value.is_empty() {
            return Err(RequesterIdError::Empty);
        }
        if value.chars().count() > MAX_REQUESTER_ID_LEN {
            return Err(RequesterIdError::TooLong {
                max: MAX_REQUESTER_ID_LEN,
            });
        }
        if let Some(found) = value.chars().find(|ch| !is_id_char(*ch)) {
            return Err(RequesterIdError::InvalidCharacter { found });
        }
        Ok(Self(value))
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

const fn is_id_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_')
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RequesterId {
    type Err = RequesterIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RequesterId {
    type Error = RequesterIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RequesterId> for String {
    fn from(id: RequesterId) -> Self {
        id.0
    }
}

/// The volunteer for whom tasks are ranked.
///
/// Skills form an order-irrelevant set; a requester without skills is valid
/// and simply tends to receive low similarity scores.
///
/// # Examples
/// ```
/// use helpmatch_core::{Requester, RequesterId, lat_lon};
///
/// let requester = Requester::new(RequesterId::new("vol-1")?)
///     .with_skills(["first aid", "driving"])
///     .with_location(lat_lon(51.5, -0.1));
/// assert!(requester.skills.contains("driving"));
/// assert_eq!(requester.skill_list(), vec!["driving", "first aid"]);
/// # Ok::<(), helpmatch_core::RequesterIdError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Requester {
    /// Identity of the requester.
    pub id: RequesterId,
    /// Declared skill labels.
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills: BTreeSet<String>,
    /// Home location, when the requester shared one.
    #[cfg_attr(
        feature = "serde",
        serde(default, with = "crate::location::lat_lon_serde")
    )]
    pub location: Option<Coord<f64>>,
}

impl Requester {
    /// Create a requester with no skills and no location.
    #[must_use]
    pub const fn new(id: RequesterId) -> Self {
        Self {
            id,
            skills: BTreeSet::new(),
            location: None,
        }
    }

    /// Add skills while returning `self` for chaining.
    #[must_use]
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills.extend(skills.into_iter().map(Into::into));
        self
    }

    /// Set the requester's location while returning `self` for chaining.
    #[must_use]
    pub const fn with_location(mut self, location: Coord<f64>) -> Self {
        self.location = Some(location);
        self
    }

    /// Skills as an ordered list, suitable for prompting a similarity oracle.
    #[must_use]
    pub fn skill_list(&self) -> Vec<String> {
        self.skills.iter().cloned().collect()
    }
}
