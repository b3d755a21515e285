use crate::data::student::{Patch, StudentDraft, StudentPatch};
use email_address::EmailAddress;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::{collections::BTreeMap, str::FromStr, sync::LazyLock};

static DATE_OF_BIRTH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

/// Every rejected field, each with human-readable reasons, keyed the way the
/// JSON API reports them.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    #[serde(rename = "fieldErrors")]
    field_errors: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationFailure {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.field_errors.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }

    pub fn first_message(&self, field: &str) -> Option<&str> {
        self.field_errors
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }
}

enum Provided<'a> {
    Absent,
    Null,
    Value(&'a Value),
}

fn provided<'a>(payload: &'a Value, field: &str) -> Provided<'a> {
    match payload.get(field) {
        None => Provided::Absent,
        Some(Value::Null) => Provided::Null,
        Some(value) => Provided::Value(value),
    }
}

fn check_text(value: &Value, label: &str, max: usize) -> Result<String, String> {
    let Value::String(text) = value else {
        return Err(format!("{label} must be a string"));
    };
    if text.chars().count() > max {
        return Err(format!("{label} must be at most {max} characters"));
    }
    Ok(text.clone())
}

fn check_email(value: &Value) -> Result<EmailAddress, String> {
    let Value::String(text) = value else {
        return Err("Invalid email".to_string());
    };
    if text.chars().count() > 255 {
        return Err("Email must be at most 255 characters".to_string());
    }
    EmailAddress::from_str(text).map_err(|_| "Invalid email".to_string())
}

fn check_date_of_birth(value: &Value) -> Result<String, String> {
    match value {
        Value::String(text) if DATE_OF_BIRTH_PATTERN.is_match(text) => Ok(text.clone()),
        _ => Err("Date of birth must be YYYY-MM-DD".to_string()),
    }
}

fn check_year(value: &Value) -> Result<i32, String> {
    let year = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };
    let Some(year) = year else {
        return Err("Year must be an integer".to_string());
    };
    if year < 1 {
        return Err("Year must be at least 1".to_string());
    }
    if year > 8 {
        return Err("Year must be at most 8".to_string());
    }
    i32::try_from(year).map_err(|_| "Year must be an integer".to_string())
}

fn require_name(
    failure: &mut ValidationFailure,
    payload: &Value,
    field: &'static str,
    label: &str,
) -> Option<String> {
    match provided(payload, field) {
        Provided::Value(value) => match check_text(value, label, 100) {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => {
                failure.add(field, format!("{label} is required"));
                None
            }
            Err(message) => {
                failure.add(field, message);
                None
            }
        },
        Provided::Absent | Provided::Null => {
            failure.add(field, format!("{label} is required"));
            None
        }
    }
}

fn optional_for_draft<T>(
    failure: &mut ValidationFailure,
    payload: &Value,
    field: &'static str,
    check: impl Fn(&Value) -> Result<T, String>,
) -> Option<T> {
    match provided(payload, field) {
        Provided::Absent | Provided::Null => None,
        Provided::Value(value) => match check(value) {
            Ok(checked) => Some(checked),
            Err(message) => {
                failure.add(field, message);
                None
            }
        },
    }
}

fn optional_for_patch<T>(
    failure: &mut ValidationFailure,
    payload: &Value,
    field: &'static str,
    check: impl Fn(&Value) -> Result<T, String>,
) -> Patch<T> {
    match provided(payload, field) {
        Provided::Absent => Patch::Missing,
        Provided::Null => Patch::Clear,
        Provided::Value(value) => match check(value) {
            Ok(checked) => Patch::Set(checked),
            Err(message) => {
                failure.add(field, message);
                Patch::Missing
            }
        },
    }
}

fn require_name_in_patch(
    failure: &mut ValidationFailure,
    payload: &Value,
    field: &'static str,
    label: &str,
) -> Patch<String> {
    match provided(payload, field) {
        Provided::Absent => Patch::Missing,
        Provided::Null => {
            failure.add(field, format!("{label} is required"));
            Patch::Missing
        }
        Provided::Value(value) => match check_text(value, label, 100) {
            Ok(text) if !text.is_empty() => Patch::Set(text),
            Ok(_) => {
                failure.add(field, format!("{label} is required"));
                Patch::Missing
            }
            Err(message) => {
                failure.add(field, message);
                Patch::Missing
            }
        },
    }
}

pub fn validate_new_student(payload: &Value) -> Result<StudentDraft, ValidationFailure> {
    let mut failure = ValidationFailure::default();

    let first_name = require_name(&mut failure, payload, "first_name", "First name");
    let last_name = require_name(&mut failure, payload, "last_name", "Last name");
    let email = match provided(payload, "email") {
        Provided::Value(value) => match check_email(value) {
            Ok(email) => Some(email),
            Err(message) => {
                failure.add("email", message);
                None
            }
        },
        Provided::Absent | Provided::Null => {
            failure.add("email", "Invalid email");
            None
        }
    };

    let phone = optional_for_draft(&mut failure, payload, "phone", |value| {
        check_text(value, "Phone", 50)
    });
    let date_of_birth = optional_for_draft(&mut failure, payload, "date_of_birth", check_date_of_birth);
    let course = optional_for_draft(&mut failure, payload, "course", |value| {
        check_text(value, "Course", 150)
    });
    let year = optional_for_draft(&mut failure, payload, "year", check_year);
    let address = optional_for_draft(&mut failure, payload, "address", |value| {
        check_text(value, "Address", 255)
    });
    let notes = optional_for_draft(&mut failure, payload, "notes", |value| {
        check_text(value, "Notes", 1000)
    });

    match (first_name, last_name, email) {
        (Some(first_name), Some(last_name), Some(email)) if failure.is_empty() => Ok(StudentDraft {
            first_name,
            last_name,
            email,
            phone,
            date_of_birth,
            course,
            year,
            address,
            notes,
        }),
        _ => Err(failure),
    }
}

pub fn validate_student_patch(payload: &Value) -> Result<StudentPatch, ValidationFailure> {
    let mut failure = ValidationFailure::default();

    let first_name = require_name_in_patch(&mut failure, payload, "first_name", "First name");
    let last_name = require_name_in_patch(&mut failure, payload, "last_name", "Last name");
    let email = match provided(payload, "email") {
        Provided::Absent => Patch::Missing,
        Provided::Null => {
            failure.add("email", "Invalid email");
            Patch::Missing
        }
        Provided::Value(value) => match check_email(value) {
            Ok(email) => Patch::Set(email),
            Err(message) => {
                failure.add("email", message);
                Patch::Missing
            }
        },
    };

    let phone = optional_for_patch(&mut failure, payload, "phone", |value| {
        check_text(value, "Phone", 50)
    });
    let date_of_birth = optional_for_patch(&mut failure, payload, "date_of_birth", check_date_of_birth);
    let course = optional_for_patch(&mut failure, payload, "course", |value| {
        check_text(value, "Course", 150)
    });
    let year = optional_for_patch(&mut failure, payload, "year", check_year);
    let address = optional_for_patch(&mut failure, payload, "address", |value| {
        check_text(value, "Address", 255)
    });
    let notes = optional_for_patch(&mut failure, payload, "notes", |value| {
        check_text(value, "Notes", 1000)
    });

    if failure.is_empty() {
        Ok(StudentPatch {
            first_name,
            last_name,
            email,
            phone,
            date_of_birth,
            course,
            year,
            address,
            notes,
        })
    } else {
        Err(failure)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    FirstName,
    LastName,
    Email,
    Course,
    Year,
    #[default]
    CreatedAt,
}

impl SortField {
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Course => "course",
            Self::Year => "year",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }

    pub const fn as_query(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

pub fn validate_sort(field: Option<&str>, direction: Option<&str>) -> (SortField, SortDirection) {
    let field = match field {
        Some("first_name") => SortField::FirstName,
        Some("last_name") => SortField::LastName,
        Some("email") => SortField::Email,
        Some("course") => SortField::Course,
        Some("year") => SortField::Year,
        _ => SortField::CreatedAt,
    };
    let direction = match direction {
        Some("asc") => SortDirection::Ascending,
        _ => SortDirection::Descending,
    };

    (field, direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> Value {
        json!({
            "first_name": "Alice",
            "last_name": "Johnson",
            "email": "alice.johnson@example.com",
            "phone": "555-0101",
            "date_of_birth": "2002-03-15",
            "course": "Computer Science",
            "year": 2,
            "address": "123 Maple St",
            "notes": "Enjoys algorithms.",
        })
    }

    #[test]
    fn full_create_payload_is_accepted() {
        let draft = validate_new_student(&full_payload()).expect("payload should validate");

        assert_eq!(draft.first_name, "Alice");
        assert_eq!(draft.last_name, "Johnson");
        assert_eq!(draft.email.as_str(), "alice.johnson@example.com");
        assert_eq!(draft.phone.as_deref(), Some("555-0101"));
        assert_eq!(draft.date_of_birth.as_deref(), Some("2002-03-15"));
        assert_eq!(draft.course.as_deref(), Some("Computer Science"));
        assert_eq!(draft.year, Some(2));
        assert_eq!(draft.address.as_deref(), Some("123 Maple St"));
        assert_eq!(draft.notes.as_deref(), Some("Enjoys algorithms."));
    }

    #[test]
    fn minimal_create_payload_leaves_optionals_empty() {
        let payload = json!({
            "first_name": "Bob",
            "last_name": "Smith",
            "email": "bob.smith@example.com",
        });
        let draft = validate_new_student(&payload).expect("payload should validate");

        assert_eq!(draft.phone, None);
        assert_eq!(draft.date_of_birth, None);
        assert_eq!(draft.course, None);
        assert_eq!(draft.year, None);
        assert_eq!(draft.address, None);
        assert_eq!(draft.notes, None);
    }

    #[test]
    fn explicit_nulls_are_accepted_for_optionals() {
        let payload = json!({
            "first_name": "Bob",
            "last_name": "Smith",
            "email": "bob.smith@example.com",
            "phone": null,
            "date_of_birth": null,
            "year": null,
        });

        assert!(validate_new_student(&payload).is_ok());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut payload = full_payload();
        payload["favourite_colour"] = json!("purple");

        assert!(validate_new_student(&payload).is_ok());
    }

    #[test]
    fn missing_required_fields_are_each_reported() {
        let failure = validate_new_student(&json!({})).expect_err("empty payload must fail");

        assert_eq!(failure.first_message("first_name"), Some("First name is required"));
        assert_eq!(failure.first_message("last_name"), Some("Last name is required"));
        assert_eq!(failure.first_message("email"), Some("Invalid email"));
    }

    #[test]
    fn empty_required_strings_are_rejected() {
        let mut payload = full_payload();
        payload["first_name"] = json!("");
        payload["email"] = json!("");

        let failure = validate_new_student(&payload).expect_err("empty strings must fail");
        assert_eq!(failure.first_message("first_name"), Some("First name is required"));
        assert_eq!(failure.first_message("email"), Some("Invalid email"));
        assert_eq!(failure.first_message("last_name"), None);
    }

    #[test]
    fn overlong_fields_are_rejected_with_limits() {
        let mut payload = full_payload();
        payload["first_name"] = json!("x".repeat(101));
        payload["notes"] = json!("y".repeat(1001));

        let failure = validate_new_student(&payload).expect_err("overlong fields must fail");
        assert_eq!(
            failure.first_message("first_name"),
            Some("First name must be at most 100 characters")
        );
        assert_eq!(
            failure.first_message("notes"),
            Some("Notes must be at most 1000 characters")
        );
    }

    #[test]
    fn length_limits_count_characters_not_bytes() {
        let mut payload = full_payload();
        payload["first_name"] = json!("å".repeat(100));

        assert!(validate_new_student(&payload).is_ok());
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut payload = full_payload();
        payload["email"] = json!("not-an-email");

        let failure = validate_new_student(&payload).expect_err("bad email must fail");
        assert_eq!(failure.first_message("email"), Some("Invalid email"));
    }

    #[test]
    fn date_of_birth_is_pattern_checked_only() {
        let mut payload = full_payload();
        payload["date_of_birth"] = json!("2021-02-30");
        assert!(validate_new_student(&payload).is_ok(), "calendar validity is not checked");

        payload["date_of_birth"] = json!("15-03-2002");
        let failure = validate_new_student(&payload).expect_err("wrong shape must fail");
        assert_eq!(
            failure.first_message("date_of_birth"),
            Some("Date of birth must be YYYY-MM-DD")
        );

        payload["date_of_birth"] = json!("2002-3-15");
        assert!(validate_new_student(&payload).is_err(), "single-digit month must fail");
    }

    #[test]
    fn year_is_coerced_from_numeric_strings() {
        let mut payload = full_payload();
        payload["year"] = json!("3");

        let draft = validate_new_student(&payload).expect("numeric string should coerce");
        assert_eq!(draft.year, Some(3));
    }

    #[test]
    fn year_bounds_are_enforced() {
        let mut payload = full_payload();

        payload["year"] = json!(0);
        let failure = validate_new_student(&payload).expect_err("year 0 must fail");
        assert_eq!(failure.first_message("year"), Some("Year must be at least 1"));

        payload["year"] = json!(9);
        let failure = validate_new_student(&payload).expect_err("year 9 must fail");
        assert_eq!(failure.first_message("year"), Some("Year must be at most 8"));

        payload["year"] = json!("eight");
        let failure = validate_new_student(&payload).expect_err("non-numeric year must fail");
        assert_eq!(failure.first_message("year"), Some("Year must be an integer"));
    }

    #[test]
    fn multiple_failures_are_enumerated_together() {
        let payload = json!({
            "first_name": "",
            "email": "nope",
            "year": 12,
        });

        let failure = validate_new_student(&payload).expect_err("payload must fail");
        assert!(failure.first_message("first_name").is_some());
        assert!(failure.first_message("last_name").is_some());
        assert!(failure.first_message("email").is_some());
        assert!(failure.first_message("year").is_some());
    }

    #[test]
    fn failure_serializes_with_camel_case_field_errors() {
        let failure = validate_new_student(&json!({})).expect_err("empty payload must fail");
        let body = serde_json::to_value(&failure).expect("failure should serialize");

        assert_eq!(body["fieldErrors"]["first_name"][0], "First name is required");
    }

    #[test]
    fn empty_update_payload_is_an_empty_patch() {
        let patch = validate_student_patch(&json!({})).expect("empty payload is valid");
        assert!(patch.is_empty());
    }

    #[test]
    fn update_distinguishes_clearing_from_leaving_alone() {
        let payload = json!({
            "phone": null,
            "course": "History",
        });
        let patch = validate_student_patch(&payload).expect("payload should validate");

        assert_eq!(patch.phone, Patch::Clear);
        assert_eq!(patch.course, Patch::Set("History".to_string()));
        assert_eq!(patch.notes, Patch::Missing);
        assert!(!patch.is_empty());
    }

    #[test]
    fn update_rejects_clearing_required_fields() {
        let failure =
            validate_student_patch(&json!({ "first_name": null })).expect_err("null name must fail");
        assert_eq!(failure.first_message("first_name"), Some("First name is required"));

        let failure =
            validate_student_patch(&json!({ "email": null })).expect_err("null email must fail");
        assert_eq!(failure.first_message("email"), Some("Invalid email"));
    }

    #[test]
    fn update_applies_create_rules_to_present_fields() {
        let failure = validate_student_patch(&json!({ "year": "11" })).expect_err("year 11 must fail");
        assert_eq!(failure.first_message("year"), Some("Year must be at most 8"));

        let patch = validate_student_patch(&json!({ "email": "new@example.com" }))
            .expect("valid email should validate");
        assert_eq!(patch.email, Patch::Set("new@example.com".parse().unwrap()));
    }

    #[test]
    fn sort_falls_back_to_created_at_descending() {
        assert_eq!(validate_sort(None, None), (SortField::CreatedAt, SortDirection::Descending));
        assert_eq!(
            validate_sort(Some("id; DROP TABLE students"), Some("up")),
            (SortField::CreatedAt, SortDirection::Descending)
        );
        assert_eq!(
            validate_sort(Some("password"), Some("desc")),
            (SortField::CreatedAt, SortDirection::Descending)
        );
    }

    #[test]
    fn sort_accepts_allow_listed_fields() {
        assert_eq!(
            validate_sort(Some("last_name"), Some("asc")),
            (SortField::LastName, SortDirection::Ascending)
        );
        assert_eq!(
            validate_sort(Some("year"), Some("desc")),
            (SortField::Year, SortDirection::Descending)
        );
        assert_eq!(
            validate_sort(Some("email"), None),
            (SortField::Email, SortDirection::Descending)
        );
    }

    #[test]
    fn sort_direction_toggles() {
        assert_eq!(SortDirection::Ascending.toggled(), SortDirection::Descending);
        assert_eq!(SortDirection::Descending.toggled(), SortDirection::Ascending);
    }
}
