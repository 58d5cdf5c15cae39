//! Core domain types for the social graph.
//!
//! `RemoteProfile` is what the source API hands back; `NewPerson` is the
//! creation payload sent to the graph store; `Person` is what the store
//! returns once it has assigned an identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ── Identity ──────────────────────────────────────────────────────

/// Store-assigned identifier of a persisted Person (e.g. `0x3`).
///
/// Opaque to this crate: it is never generated locally, only read back
/// from the graph store after a successful create.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PersonId(pub String);

impl PersonId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PersonId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PersonId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ── Source ────────────────────────────────────────────────────────

/// The external API a profile originated from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Twitter,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "twitter" => Ok(Self::Twitter),
            other => Err(ConfigError::UnknownSource(other.to_string())),
        }
    }
}

// ── Person ────────────────────────────────────────────────────────

/// A user node persisted in the graph store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Person {
    pub id: PersonId,
    pub source_id: String,
    pub source: Source,
    pub screen_name: String,
    pub name: String,
    /// Optional in the store schema; null reads back as empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub friends_count: i64,
    #[serde(default)]
    pub friends: Vec<Person>,
}

impl Person {
    /// Attach a store-assigned identity to a creation payload.
    pub fn from_new(id: PersonId, new: NewPerson) -> Self {
        Self {
            id,
            source_id: new.source_id,
            source: new.source,
            screen_name: new.screen_name,
            name: new.name,
            location: new.location,
            friends_count: new.friends_count,
            friends: new.friends,
        }
    }

    /// True when every field except `id` equals the given payload.
    pub fn matches(&self, new: &NewPerson) -> bool {
        self.source_id == new.source_id
            && self.source == new.source
            && self.screen_name == new.screen_name
            && self.name == new.name
            && self.location == new.location
            && self.friends_count == new.friends_count
            && self.friends == new.friends
    }
}

/// Creation payload for a Person: every field except the store identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewPerson {
    pub source_id: String,
    pub source: Source,
    pub screen_name: String,
    pub name: String,
    pub location: String,
    pub friends_count: i64,
    #[serde(default)]
    pub friends: Vec<Person>,
}

// ── Remote Profile ────────────────────────────────────────────────

/// A user record as returned by the source API, keyed by the source's own
/// integer identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteProfile {
    pub id: u64,
    pub screen_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default)]
    pub friends_count: i64,
}

impl RemoteProfile {
    /// Translate into a store creation payload. Pure mapping, no I/O.
    pub fn to_new_person(&self, source: Source) -> NewPerson {
        NewPerson {
            source_id: self.id.to_string(),
            source,
            screen_name: self.screen_name.clone(),
            name: self.name.clone(),
            location: self.location.clone(),
            friends_count: self.friends_count,
            friends: Vec::new(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
