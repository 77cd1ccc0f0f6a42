//! Contact-form messages and the admin inbox.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::fields::is_valid_email;
use crate::content::{Editable, Validate, ValidationError};
use crate::store::{EntityKind, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContactStatus {
    New,
    Read,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public contact form submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Inbox triage from the dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: ContactStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactFilter {
    pub status: Option<ContactStatus>,
}

impl Validate for ContactInput {
    fn validate(&self) -> Result<(), ValidationError> {
        let fields = [&self.name, &self.email, &self.subject, &self.message];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ValidationError::IncompleteMessage);
        }
        if !is_valid_email(self.email.trim()) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}

impl Validate for StatusUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Record for Contact {
    const KIND: EntityKind = EntityKind::Contact;

    fn id(&self) -> &str {
        &self.id
    }

    /// Newest first.
    fn listing_cmp(&self, other: &Self) -> Ordering {
        other.created_at.cmp(&self.created_at)
    }
}

impl Editable for Contact {
    const LABEL: &'static str = "Contact";
    const NOUN: &'static str = "contact";
    const PLURAL: &'static str = "contacts";

    type Create = ContactInput;
    type Update = StatusUpdate;
    type Filter = ContactFilter;

    fn create(input: ContactInput, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            subject: input.subject.trim().to_string(),
            message: input.message.trim().to_string(),
            status: ContactStatus::New,
            created_at: now,
            updated_at: now,
        }
    }

    fn update(&self, input: StatusUpdate, now: DateTime<Utc>) -> Self {
        Self {
            status: input.status,
            updated_at: now,
            ..self.clone()
        }
    }

    fn matches(&self, filter: &ContactFilter) -> bool {
        filter.status.map_or(true, |status| self.status == status)
    }
}
