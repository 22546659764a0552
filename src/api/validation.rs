use crate::normalize::normalize_url;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

/// One failed check on a request field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub value: Value,
    pub msg: String,
    pub param: String,
    pub location: &'static str,
}

impl FieldError {
    pub fn body(param: &str, value: Option<&str>, msg: impl Into<String>) -> Self {
        Self {
            value: value.map_or(Value::Null, |v| Value::String(v.to_string())),
            msg: msg.into(),
            param: param.to_string(),
            location: "body",
        }
    }
}

/// Collects every failing field so the client sees all problems at once
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Non-blank text, trimmed
    pub fn required(&mut self, param: &str, value: Option<&str>, msg: &str) -> Option<String> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => Some(v.to_string()),
            None => {
                self.push(FieldError::body(param, value, msg));
                None
            }
        }
    }

    /// Parse a date if one was supplied; blank counts as absent
    pub fn optional_date(
        &mut self,
        param: &str,
        value: Option<&str>,
        msg: &str,
    ) -> Option<DateTime<Utc>> {
        let raw = value.map(str::trim).filter(|v| !v.is_empty())?;
        let parsed = parse_date(raw);
        if parsed.is_none() {
            self.push(FieldError::body(param, value, msg));
        }
        parsed
    }

    /// Normalized https URL; blank counts as absent
    pub fn optional_url(&mut self, param: &str, value: Option<&str>) -> Option<String> {
        let raw = value.map(str::trim).filter(|v| !v.is_empty())?;
        match normalize_url(raw) {
            Ok(url) => Some(url),
            Err(_) => {
                self.push(FieldError::body(
                    param,
                    value,
                    format!("{param} is not a valid URL"),
                ));
                None
            }
        }
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Accepts `YYYY-MM-DD` (midnight UTC) or RFC 3339
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Trimmed text, blank becomes `None`
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_plain_and_rfc3339_dates() {
        assert_eq!(
            parse_date("2021-03-04"),
            Some(Utc.with_ymd_and_hms(2021, 3, 4, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_date("2021-03-04T10:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2021, 3, 4, 8, 0, 0).unwrap())
        );
        assert_eq!(parse_date("March 4th"), None);
    }

    #[test]
    fn collects_all_failures() {
        let mut v = Validator::new();
        assert_eq!(
            v.required("title", Some("  Dev "), "Title is required").as_deref(),
            Some("Dev")
        );
        assert!(v.required("company", Some("   "), "Company is required").is_none());
        assert!(v.required("status", None, "Status is required").is_none());
        assert!(v.optional_date("to", Some("soon"), "bad date").is_none());
        assert!(v.optional_date("to", Some(""), "bad date").is_none());

        let errors = v.finish().unwrap_err();
        let params: Vec<_> = errors.iter().map(|e| e.param.as_str()).collect();
        assert_eq!(params, ["company", "status", "to"]);
        assert_eq!(errors[1].value, Value::Null);
        assert_eq!(errors[2].value, Value::String("soon".to_string()));
    }

    #[test]
    fn url_fields_are_normalized_or_reported() {
        let mut v = Validator::new();
        assert_eq!(
            v.optional_url("website", Some("http://www.ada.dev/")).as_deref(),
            Some("https://ada.dev")
        );
        assert!(v.optional_url("youtube", Some("ftp://nope")).is_none());
        assert!(v.optional_url("twitter", None).is_none());

        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].msg, "youtube is not a valid URL");
    }
}
