//! Portfolio projects.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::fields::{check_url, lenient_i64, non_blank, require};
use crate::content::{Editable, Validate, ValidationError};
use crate::store::{EntityKind, Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub long_desc: Option<String>,
    pub image_url: String,
    pub demo_url: Option<String>,
    pub github_url: Option<String>,
    pub technologies: Vec<String>,
    pub featured: bool,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload from the admin form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectInput {
    pub title: String,
    pub description: String,
    pub long_desc: Option<String>,
    pub image_url: String,
    pub demo_url: Option<String>,
    pub github_url: Option<String>,
    pub technologies: Vec<String>,
    pub featured: bool,
    #[serde(deserialize_with = "lenient_i64")]
    pub order: i64,
}

/// `?featured=true` narrows the listing to featured projects.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectFilter {
    pub featured: Option<String>,
}

impl Validate for ProjectInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&[
            ("title", self.title.as_str()),
            ("description", self.description.as_str()),
            ("imageUrl", self.image_url.as_str()),
        ])?;
        check_url("demoUrl", self.demo_url.as_deref())?;
        check_url("githubUrl", self.github_url.as_deref())
    }
}

impl Record for Project {
    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> &str {
        &self.id
    }

    fn listing_cmp(&self, other: &Self) -> Ordering {
        self.order
            .cmp(&other.order)
            .then_with(|| self.created_at.cmp(&other.created_at))
    }
}

impl Editable for Project {
    const LABEL: &'static str = "Project";
    const NOUN: &'static str = "project";
    const PLURAL: &'static str = "projects";

    type Create = ProjectInput;
    type Update = ProjectInput;
    type Filter = ProjectFilter;

    fn create(input: ProjectInput, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            long_desc: non_blank(input.long_desc),
            image_url: input.image_url.trim().to_string(),
            demo_url: non_blank(input.demo_url),
            github_url: non_blank(input.github_url),
            technologies: clean_list(input.technologies),
            featured: input.featured,
            order: input.order,
            created_at: now,
            updated_at: now,
        }
    }

    fn update(&self, input: ProjectInput, now: DateTime<Utc>) -> Self {
        Self {
            created_at: self.created_at,
            ..Self::create(input, self.id.clone(), now)
        }
    }

    fn matches(&self, filter: &ProjectFilter) -> bool {
        filter.featured.as_deref() != Some("true") || self.featured
    }
}

/// Trim entries and drop blanks.
pub(crate) fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
