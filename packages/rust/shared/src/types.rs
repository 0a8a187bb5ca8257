//! Core domain types: officials, politicians, family members and their
//! education records.

use serde::{Deserialize, Serialize};

use crate::error::{EdutrackError, Result};

/// Placeholder for an unresolved degree level or university.
pub const UNKNOWN: &str = "Unknown";

/// Education location assumed when nothing else is known.
pub const DEFAULT_LOCATION: &str = "India";

// ---------------------------------------------------------------------------
// EducationInfo
// ---------------------------------------------------------------------------

/// Structured education record shared by every entity.
///
/// Fields missing from input are filled with [`UNKNOWN`] / [`DEFAULT_LOCATION`],
/// so a stored record never carries an undefined field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationInfo {
    #[serde(default = "unknown")]
    pub degree_level: String,
    #[serde(default = "unknown")]
    pub university: String,
    #[serde(default = "default_location")]
    pub education_location: String,
}

impl Default for EducationInfo {
    fn default() -> Self {
        Self {
            degree_level: unknown(),
            university: unknown(),
            education_location: default_location(),
        }
    }
}

impl EducationInfo {
    pub fn new(
        degree_level: impl Into<String>,
        university: impl Into<String>,
        education_location: impl Into<String>,
    ) -> Self {
        Self {
            degree_level: degree_level.into(),
            university: university.into(),
            education_location: education_location.into(),
        }
    }
}

fn unknown() -> String {
    UNKNOWN.into()
}
fn default_location() -> String {
    DEFAULT_LOCATION.into()
}

/// Anything that carries an education record (used by the chart aggregations).
pub trait Educated {
    fn education(&self) -> &EducationInfo;
}

// ---------------------------------------------------------------------------
// Parent kinds
// ---------------------------------------------------------------------------

/// The two entity kinds that own family members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentKind {
    Official,
    Politician,
}

impl ParentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Official => "official",
            Self::Politician => "politician",
        }
    }
}

impl std::fmt::Display for ParentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Officials
// ---------------------------------------------------------------------------

/// A public official as submitted for insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOfficial {
    pub name: String,
    pub department: String,
    pub joining_year: i32,
    #[serde(flatten)]
    pub education: EducationInfo,
}

impl NewOfficial {
    /// Reject records without a name.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(EdutrackError::validation("official name must not be empty"));
        }
        Ok(())
    }
}

/// A stored public official.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Official {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub joining_year: i32,
    #[serde(flatten)]
    pub education: EducationInfo,
}

impl Educated for Official {
    fn education(&self) -> &EducationInfo {
        &self.education
    }
}

// ---------------------------------------------------------------------------
// Politicians
// ---------------------------------------------------------------------------

/// A politician as submitted for insertion. `(name, party)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPolitician {
    pub name: String,
    pub party: String,
    pub position: String,
    #[serde(flatten)]
    pub education: EducationInfo,
}

impl NewPolitician {
    /// Reject records without a name or a party.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.party.trim().is_empty() {
            return Err(EdutrackError::validation(
                "politician name and party must not be empty",
            ));
        }
        Ok(())
    }
}

/// A stored politician.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Politician {
    pub id: i64,
    pub name: String,
    pub party: String,
    pub position: String,
    #[serde(flatten)]
    pub education: EducationInfo,
}

impl Educated for Politician {
    fn education(&self) -> &EducationInfo {
        &self.education
    }
}

// ---------------------------------------------------------------------------
// Family members
// ---------------------------------------------------------------------------

/// A family member as submitted for insertion under an existing parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFamilyMember {
    pub name: String,
    pub relation_type: String,
    #[serde(flatten)]
    pub education: EducationInfo,
}

/// A stored family member, flattened with its parent's id and name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: i64,
    pub parent_id: i64,
    pub parent_name: String,
    pub name: String,
    pub relation_type: String,
    #[serde(flatten)]
    pub education: EducationInfo,
}

impl Educated for FamilyMember {
    fn education(&self) -> &EducationInfo {
        &self.education
    }
}

// ---------------------------------------------------------------------------
// Listings and datasets
// ---------------------------------------------------------------------------

/// Flattened read model: parent entities plus every family row joined to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing<T> {
    pub entries: Vec<T>,
    pub family: Vec<FamilyMember>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            family: Vec::new(),
        }
    }
}

impl<T> Listing<T> {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Family rows belonging to `parent_id`.
    pub fn family_of(&self, parent_id: i64) -> impl Iterator<Item = &FamilyMember> {
        self.family.iter().filter(move |m| m.parent_id == parent_id)
    }
}

/// An official together with the family members to insert alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficialEntry {
    #[serde(flatten)]
    pub record: NewOfficial,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub family: Vec<NewFamilyMember>,
}

/// A politician together with the family members to insert alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoliticianEntry {
    #[serde(flatten)]
    pub record: NewPolitician,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub family: Vec<NewFamilyMember>,
}

/// Initial data loaded in bulk into an empty store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub officials: Vec<OfficialEntry>,
    #[serde(default)]
    pub politicians: Vec<PoliticianEntry>,
}
