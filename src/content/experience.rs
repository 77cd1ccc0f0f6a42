//! Work experience timeline.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::content::fields::{lenient_i64, non_blank, parse_date, require};
use crate::content::project::clean_list;
use crate::content::{Editable, NoFilter, Validate, ValidationError};
use crate::store::{EntityKind, Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub position: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub location: Option<String>,
    pub technologies: Vec<String>,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceInput {
    pub company: String,
    pub position: String,
    pub description: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub current: bool,
    pub location: Option<String>,
    pub technologies: Vec<String>,
    #[serde(deserialize_with = "lenient_i64")]
    pub order: i64,
}

impl ExperienceInput {
    fn dates(&self) -> Result<(NaiveDate, Option<NaiveDate>), ValidationError> {
        let start = parse_date("startDate", &self.start_date)?;
        let end = match self.end_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_date("endDate", raw)?),
        };
        Ok((start, end))
    }
}

impl Validate for ExperienceInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&[
            ("company", self.company.as_str()),
            ("position", self.position.as_str()),
            ("description", self.description.as_str()),
            ("startDate", self.start_date.as_str()),
        ])?;
        match self.dates()? {
            (start, Some(end)) if end < start => Err(ValidationError::EndBeforeStart),
            _ => Ok(()),
        }
    }
}

impl Record for Experience {
    const KIND: EntityKind = EntityKind::Experience;

    fn id(&self) -> &str {
        &self.id
    }

    /// Current positions first, then most recent start date.
    fn listing_cmp(&self, other: &Self) -> Ordering {
        other
            .current
            .cmp(&self.current)
            .then_with(|| other.start_date.cmp(&self.start_date))
    }
}

impl Editable for Experience {
    const LABEL: &'static str = "Experience";
    const NOUN: &'static str = "experience";
    const PLURAL: &'static str = "experiences";

    type Create = ExperienceInput;
    type Update = ExperienceInput;
    type Filter = NoFilter;

    fn create(input: ExperienceInput, id: String, now: DateTime<Utc>) -> Self {
        // Validated input always has parsable dates.
        let (start_date, end_date) = input
            .dates()
            .unwrap_or((now.date_naive(), None));
        Self {
            id,
            company: input.company.trim().to_string(),
            position: input.position.trim().to_string(),
            description: input.description.trim().to_string(),
            start_date,
            end_date: if input.current { None } else { end_date },
            current: input.current,
            location: non_blank(input.location),
            technologies: clean_list(input.technologies),
            order: input.order,
            created_at: now,
            updated_at: now,
        }
    }

    fn update(&self, input: ExperienceInput, now: DateTime<Utc>) -> Self {
        Self {
            created_at: self.created_at,
            ..Self::create(input, self.id.clone(), now)
        }
    }

    fn matches(&self, _filter: &NoFilter) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(start: &str, end: Option<&str>, current: bool) -> ExperienceInput {
        ExperienceInput {
            company: "Acme".into(),
            position: "Engineer".into(),
            description: "Built things".into(),
            start_date: start.into(),
            end_date: end.map(Into::into),
            current,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_ranges() {
        assert_eq!(input("2020-01-01", Some("2021-06-30"), false).validate(), Ok(()));
        assert_eq!(input("2020-01-01", Some(""), true).validate(), Ok(()));
        assert_eq!(input("2020-01-01", None, true).validate(), Ok(()));
    }

    #[test]
    fn test_end_before_start() {
        assert_eq!(
            input("2021-01-01", Some("2020-01-01"), false).validate(),
            Err(ValidationError::EndBeforeStart)
        );
    }

    #[test]
    fn test_missing_start_date() {
        assert_eq!(
            input("", None, false).validate(),
            Err(ValidationError::MissingFields(vec!["startDate"]))
        );
    }

    #[test]
    fn test_current_role_drops_end_date() {
        let exp = Experience::create(
            input("2022-02-01", Some("2023-01-01"), true),
            "e1".into(),
            Utc::now(),
        );
        assert!(exp.current);
        assert_eq!(exp.end_date, None);
    }

    #[test]
    fn test_timeline_order() {
        let now = Utc::now();
        let mut list = vec![
            Experience::create(input("2018-01-01", Some("2019-01-01"), false), "old".into(), now),
            Experience::create(input("2015-01-01", None, true), "current".into(), now),
            Experience::create(input("2020-01-01", Some("2021-01-01"), false), "recent".into(), now),
        ];
        list.sort_by(Experience::listing_cmp);
        let ids: Vec<_> = list.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["current", "recent", "old"]);
    }
}
