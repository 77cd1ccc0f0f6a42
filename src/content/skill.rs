//! Skills shown on the skills page.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::fields::{lenient_i64, non_blank, require};
use crate::content::{Editable, NoFilter, Validate, ValidationError};
use crate::store::{EntityKind, Record};

pub const MAX_LEVEL: i64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub category: String,
    pub level: i64,
    pub icon: Option<String>,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillInput {
    pub name: String,
    pub category: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub level: i64,
    pub icon: Option<String>,
    #[serde(deserialize_with = "lenient_i64")]
    pub order: i64,
}

impl Validate for SkillInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&[("name", self.name.as_str()), ("category", self.category.as_str())])?;
        if !(0..=MAX_LEVEL).contains(&self.level) {
            return Err(ValidationError::OutOfRange {
                field: "level",
                min: 0,
                max: MAX_LEVEL,
            });
        }
        Ok(())
    }
}

impl Record for Skill {
    const KIND: EntityKind = EntityKind::Skill;

    fn id(&self) -> &str {
        &self.id
    }

    fn listing_cmp(&self, other: &Self) -> Ordering {
        self.order
            .cmp(&other.order)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl Editable for Skill {
    const LABEL: &'static str = "Skill";
    const NOUN: &'static str = "skill";
    const PLURAL: &'static str = "skills";

    type Create = SkillInput;
    type Update = SkillInput;
    type Filter = NoFilter;

    fn create(input: SkillInput, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name.trim().to_string(),
            category: input.category.trim().to_string(),
            level: input.level,
            icon: non_blank(input.icon),
            order: input.order,
            created_at: now,
            updated_at: now,
        }
    }

    fn update(&self, input: SkillInput, now: DateTime<Utc>) -> Self {
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

    #[test]
    fn test_string_level_and_order() {
        let input: SkillInput = serde_json::from_str(
            r#"{"name": "Rust", "category": "Backend", "level": "85", "order": "1"}"#,
        )
        .unwrap();
        assert_eq!(input.validate(), Ok(()));
        assert_eq!((input.level, input.order), (85, 1));
    }

    #[test]
    fn test_level_range() {
        let input = SkillInput {
            name: "Rust".into(),
            category: "Backend".into(),
            level: 140,
            ..Default::default()
        };
        assert!(matches!(
            input.validate(),
            Err(ValidationError::OutOfRange { field: "level", .. })
        ));
    }

    #[test]
    fn test_missing_category() {
        let input = SkillInput {
            name: "Rust".into(),
            ..Default::default()
        };
        assert_eq!(
            input.validate(),
            Err(ValidationError::MissingFields(vec!["category"]))
        );
    }

    #[test]
    fn test_listing_order() {
        let now = Utc::now();
        let mk = |name: &str, order| {
            Skill::create(
                SkillInput {
                    name: name.into(),
                    category: "c".into(),
                    order,
                    ..Default::default()
                },
                name.into(),
                now,
            )
        };
        let mut skills = vec![mk("b", 1), mk("z", 0), mk("a", 1)];
        skills.sort_by(Skill::listing_cmp);
        let names: Vec<_> = skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "b"]);
    }
}
