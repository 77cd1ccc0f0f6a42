//! Field-level parsing and checks shared by the payload types.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::content::ValidationError;

/// Deserialize a number that may arrive as a JSON number or a numeric string.
///
/// Missing, null or unparsable values become 0.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => parse_leading_int(&s),
        _ => 0,
    })
}

// Leading-digits parse: "12px" is 12, "abc" is 0.
fn parse_leading_int(s: &str) -> i64 {
    let s = s.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

/// Names of the required fields that are blank.
pub fn missing<'a>(fields: &[(&'static str, &'a str)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect()
}

pub fn require(fields: &[(&'static str, &str)]) -> Result<(), ValidationError> {
    let blank = missing(fields);
    if blank.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(blank))
    }
}

/// `local@domain.tld`, no whitespace, exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Optional link fields: blank is fine, anything else must be an absolute URL.
pub fn check_url(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(()),
        Some(raw) => url::Url::parse(raw)
            .map(|_| ())
            .map_err(|_| ValidationError::InvalidUrl(field)),
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| ValidationError::InvalidDate(field))
}

/// Blank optional strings are stored as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "lenient_i64")]
        order: i64,
    }

    fn order(json: &str) -> i64 {
        serde_json::from_str::<Form>(json).unwrap().order
    }

    #[test]
    fn test_lenient_numbers() {
        assert_eq!(order(r#"{"order": 4}"#), 4);
        assert_eq!(order(r#"{"order": "7"}"#), 7);
        assert_eq!(order(r#"{"order": "-2"}"#), -2);
        assert_eq!(order(r#"{"order": "12px"}"#), 12);
        assert_eq!(order(r#"{"order": "abc"}"#), 0);
        assert_eq!(order(r#"{"order": null}"#), 0);
        assert_eq!(order(r#"{"order": 3.9}"#), 3);
        assert_eq!(order(r#"{}"#), 0);
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada example@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@@example.com"));
        assert!(!is_valid_email("ada@.com"));
        assert!(!is_valid_email("ada@example."));
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(require(&[("title", "x"), ("description", "y")]), Ok(()));
        assert_eq!(
            require(&[("title", " "), ("description", "y"), ("imageUrl", "")]),
            Err(ValidationError::MissingFields(vec!["title", "imageUrl"]))
        );
    }

    #[test]
    fn test_urls() {
        assert!(check_url("demoUrl", None).is_ok());
        assert!(check_url("demoUrl", Some("")).is_ok());
        assert!(check_url("demoUrl", Some("https://example.com/demo")).is_ok());
        assert_eq!(
            check_url("githubUrl", Some("not a url")),
            Err(ValidationError::InvalidUrl("githubUrl"))
        );
    }

    #[test]
    fn test_dates() {
        assert_eq!(
            parse_date("startDate", "2021-03-01"),
            Ok(NaiveDate::from_ymd_opt(2021, 3, 1).unwrap())
        );
        assert_eq!(
            parse_date("startDate", "2021-03-01T10:00:00Z"),
            Ok(NaiveDate::from_ymd_opt(2021, 3, 1).unwrap())
        );
        assert_eq!(
            parse_date("endDate", "March 2021"),
            Err(ValidationError::InvalidDate("endDate"))
        );
    }
}
