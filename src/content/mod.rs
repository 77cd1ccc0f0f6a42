//! Portfolio content.
//!
//! # Responsibilities
//! - Define the persisted entities (projects, skills, experience, messages)
//! - Validate request payloads before anything touches the store
//! - Build new records and apply edits to existing ones
//!
//! # Design Decisions
//! - JSON field names are camelCase, matching the admin UI forms
//! - Numeric form fields accept numbers or numeric strings
//! - Validation is pure and runs before persistence; a 400 is never retried

pub mod contact;
pub mod experience;
pub mod fields;
pub mod project;
pub mod skill;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::store::Record;

pub use contact::{Contact, ContactFilter, ContactInput, ContactStatus, StatusUpdate};
pub use experience::{Experience, ExperienceInput};
pub use project::{Project, ProjectFilter, ProjectInput};
pub use skill::{Skill, SkillInput};

/// A payload rejected by the route layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields")]
    MissingFields(Vec<&'static str>),

    #[error("All fields are required")]
    IncompleteMessage,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Invalid URL for {0}")]
    InvalidUrl(&'static str),

    #[error("Invalid date for {0}")]
    InvalidDate(&'static str),

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    #[error("End date is before start date")]
    EndBeforeStart,
}

/// Payloads that can be checked without touching the store.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Records managed through the generic CRUD endpoints.
pub trait Editable: Record {
    /// Display name in error bodies, e.g. "Project not found".
    const LABEL: &'static str;
    /// Singular and plural nouns for failure messages.
    const NOUN: &'static str;
    const PLURAL: &'static str;

    type Create: DeserializeOwned + Validate + Send + 'static;
    type Update: DeserializeOwned + Validate + Send + 'static;
    type Filter: DeserializeOwned + Default + Send + Sync + 'static;

    /// Build a new record from a validated payload.
    fn create(input: Self::Create, id: String, now: DateTime<Utc>) -> Self;

    /// Apply a validated edit, keeping identity and creation time.
    fn update(&self, input: Self::Update, now: DateTime<Utc>) -> Self;

    fn matches(&self, filter: &Self::Filter) -> bool;
}

/// Query type for collections without filters.
#[derive(Debug, Default, serde::Deserialize)]
pub struct NoFilter {}
