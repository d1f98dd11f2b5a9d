//! The canonical schema checkpoint.
//!
//! Mappers do not self-validate; every constraint on the canonical record
//! (non-empty strings, URL shape, numeric ranges, enum membership,
//! UUID-shaped id) is enforced here, once, against the declarative schema
//! in `schemas/feed_item.v1.json`. Violations are aggregated: the error
//! lists every failing field, not just the first.

use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::fmt;

use crate::domain::FeedItem;

static FEED_ITEM_SCHEMA: Lazy<JSONSchema> = Lazy::new(|| {
    let schema_json: Value = serde_json::from_str(include_str!("../../schemas/feed_item.v1.json"))
        .expect("embedded feed item schema is valid JSON");
    // jsonschema 0.17 expects a schema with 'static lifetime; leak the
    // parsed document for process lifetime
    let schema_static: &'static Value = Box::leak(Box::new(schema_json));
    JSONSchema::options()
        .compile(schema_static)
        .expect("embedded feed item schema compiles")
});

/// A single schema violation, located by its instance path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer into the candidate, e.g. `/display/mainImageUrl`
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Aggregated validation failure listing every violated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "feed item failed validation ({} violation{}): ",
            self.violations.len(),
            if self.violations.len() == 1 { "" } else { "s" }
        )?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    fn single(path: &str, message: String) -> Self {
        Self {
            violations: vec![Violation {
                path: path.to_string(),
                message,
            }],
        }
    }

    /// True when some violation touches the given instance path fragment.
    pub fn names_field(&self, fragment: &str) -> bool {
        self.violations.iter().any(|v| v.path.contains(fragment))
    }
}

fn check_schema(candidate: &Value) -> Result<(), ValidationError> {
    let result = FEED_ITEM_SCHEMA.validate(candidate);
    match result {
        Ok(()) => Ok(()),
        Err(errors) => {
            let violations = errors
                .map(|error| Violation {
                    path: error.instance_path.to_string(),
                    message: error.to_string(),
                })
                .collect();
            Err(ValidationError { violations })
        }
    }
}

/// Validate an already-typed candidate; the orchestrator's checkpoint for
/// freshly mapped records.
pub fn validate_item(item: &FeedItem) -> Result<(), ValidationError> {
    let value = serde_json::to_value(item)
        .map_err(|e| ValidationError::single("", format!("candidate is not serializable: {e}")))?;
    check_schema(&value)
}

/// Validate an untyped candidate and deserialize it into the canonical
/// shape. Tolerant on input (`tags` defaults to an empty list when absent),
/// strict on output. Usable standalone, e.g. by a persistence adapter
/// re-validating rows read back from storage.
pub fn validate_feed_item(candidate: Value) -> Result<FeedItem, ValidationError> {
    let mut candidate = candidate;
    if let Some(obj) = candidate.as_object_mut() {
        obj.entry("tags").or_insert_with(|| Value::Array(vec![]));
    }
    check_schema(&candidate)?;
    serde_json::from_value(candidate)
        .map_err(|e| ValidationError::single("", format!("candidate does not deserialize: {e}")))
}

/// Outcome of the non-raising validation variant.
#[derive(Debug)]
pub struct ValidationOutcome {
    pub success: bool,
    pub data: Option<FeedItem>,
    pub error: Option<ValidationError>,
}

/// Non-raising counterpart of [`validate_feed_item`].
pub fn safe_validate_feed_item(candidate: Value) -> ValidationOutcome {
    match validate_feed_item(candidate) {
        Ok(item) => ValidationOutcome {
            success: true,
            data: Some(item),
            error: None,
        },
        Err(error) => ValidationOutcome {
            success: false,
            data: None,
            error: Some(error),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_candidate() -> Value {
        json!({
            "id": "3f1a2b4c-5d6e-4f70-8192-a3b4c5d6e7f8",
            "externalId": "B09XS7JWHH",
            "sourcePlatform": "marketplace",
            "detectedAt": "2025-08-15T12:00:00Z",
            "display": {
                "title": "Sony WH-1000XM5",
                "description": "Noise canceling headphones",
                "mainImageUrl": "https://img.example.com/a.jpg",
                "thumbnailUrl": "https://img.example.com/a-thumb.jpg",
                "actionUrl": "https://amazon.com/dp/B09XS7JWHH",
                "contentType": "physical_product"
            },
            "commerce": {
                "currency": "USD",
                "currentPrice": 348.0,
                "originalPrice": 399.0,
                "isOnSale": true,
                "merchantName": "Amazon"
            },
            "metrics": {
                "ratingScore": 4.8,
                "reviewCount": 10420,
                "engagementScore": 136.0
            },
            "tags": ["electronics"]
        })
    }

    #[test]
    fn valid_candidate_round_trips() {
        let item = validate_feed_item(valid_candidate()).unwrap();
        assert_eq!(item.external_id, "B09XS7JWHH");
        assert!(validate_item(&item).is_ok());
    }

    #[test]
    fn missing_tags_defaulted_before_checking() {
        let mut candidate = valid_candidate();
        candidate.as_object_mut().unwrap().remove("tags");
        let item = validate_feed_item(candidate).unwrap();
        assert!(item.tags.is_empty());
    }

    #[test]
    fn bad_url_rejected_naming_the_field() {
        let mut candidate = valid_candidate();
        candidate["display"]["mainImageUrl"] = json!("not-a-url");
        let err = validate_feed_item(candidate).unwrap_err();
        assert!(err.names_field("mainImageUrl"), "error was: {err}");
    }

    #[test]
    fn violations_are_aggregated_not_fail_fast() {
        let mut candidate = valid_candidate();
        candidate["display"]["mainImageUrl"] = json!("not-a-url");
        candidate["externalId"] = json!("");
        candidate["metrics"]["ratingScore"] = json!(9.5);
        let err = validate_feed_item(candidate).unwrap_err();
        assert!(err.violations.len() >= 3, "error was: {err}");
        assert!(err.names_field("mainImageUrl"));
        assert!(err.names_field("externalId"));
        assert!(err.names_field("ratingScore"));
    }

    #[test]
    fn non_uuid_id_rejected() {
        let mut candidate = valid_candidate();
        candidate["id"] = json!("item-42");
        assert!(validate_feed_item(candidate).is_err());
    }

    #[test]
    fn unknown_platform_tag_rejected() {
        let mut candidate = valid_candidate();
        candidate["sourcePlatform"] = json!("myspace");
        assert!(validate_feed_item(candidate).is_err());
    }

    #[test]
    fn wrong_currency_length_rejected() {
        let mut candidate = valid_candidate();
        candidate["commerce"]["currency"] = json!("DOLLARS");
        assert!(validate_feed_item(candidate).is_err());
    }

    #[test]
    fn null_commerce_accepted() {
        let mut candidate = valid_candidate();
        candidate["commerce"] = json!(null);
        assert!(validate_feed_item(candidate).is_ok());
    }

    #[test]
    fn missing_commerce_key_rejected() {
        // nullable is not the same as omitted
        let mut candidate = valid_candidate();
        candidate.as_object_mut().unwrap().remove("commerce");
        assert!(validate_feed_item(candidate).is_err());
    }

    #[test]
    fn negative_engagement_rejected() {
        let mut candidate = valid_candidate();
        candidate["metrics"]["engagementScore"] = json!(-1.0);
        assert!(validate_feed_item(candidate).is_err());
    }

    #[test]
    fn safe_variant_reports_instead_of_raising() {
        let outcome = safe_validate_feed_item(valid_candidate());
        assert!(outcome.success);
        assert!(outcome.data.is_some());

        let mut bad = valid_candidate();
        bad["display"]["actionUrl"] = json!("nope");
        let outcome = safe_validate_feed_item(bad);
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().names_field("actionUrl"));
    }
}
