//! Custom field values
//!
//! A custom field value binds one patient to one custom field definition.
//! Storage keeps two nullable columns (`text_value`, `number_value`) and the
//! definition's declared type decides which one may be populated. In-process
//! the value is a tagged variant, [`FieldValue`], so the type travels with
//! the value instead of being re-derived from the definition at every read.
//!
//! The invariant is enforced here, at write time, before anything reaches
//! storage: exactly one column populated, and it must be the column matching
//! the declared type. Violations are reported as field-scoped errors so the
//! HTTP layer can key them to the offending form field.

use super::custom_field::CustomFieldType;
use super::errors::ValidationError;
use super::ids::CustomFieldId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest admissible magnitude: NUMERIC(15,2) leaves 13 integral digits.
const MAX_INTEGRAL: i64 = 10_000_000_000_000;

/// A validated, typed custom field value
///
/// The tag mirrors the referenced definition's [`CustomFieldType`]; a
/// `FieldValue` can only be obtained through [`FieldValue::validate`], so
/// holding one means the discriminated-storage invariant holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Non-empty text, stored in `text_value`
    Text(String),
    /// Fixed-point number (at most 2 fractional digits), stored in `number_value`
    Number(Decimal),
}

impl FieldValue {
    /// Validates and normalizes a proposed value against a definition's type
    ///
    /// Rules:
    /// - empty-string text counts as absent, same as null
    /// - a number of exactly 0 is a present value
    /// - the column not matching the declared type must be null
    /// - numbers are normalized to 2 fractional digits and must fit
    ///   NUMERIC(15,2)
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming `text_value` or `number_value`.
    pub fn validate(
        field_type: CustomFieldType,
        text: Option<String>,
        number: Option<Decimal>,
    ) -> Result<Self, ValidationError> {
        // Empty text is indistinguishable from absent text.
        let text = text.filter(|t| !t.is_empty());

        match field_type {
            CustomFieldType::Text => {
                if number.is_some() {
                    return Err(ValidationError::must_be_null("number_value"));
                }
                text.map(FieldValue::Text)
                    .ok_or_else(|| ValidationError::required("text_value"))
            }
            CustomFieldType::Number => {
                if text.is_some() {
                    return Err(ValidationError::must_be_null("text_value"));
                }
                let number = number.ok_or_else(|| ValidationError::required("number_value"))?;
                let number = number.round_dp(2);
                if number.abs() >= Decimal::from(MAX_INTEGRAL) {
                    return Err(ValidationError::invalid(
                        "number_value",
                        "must have at most 13 digits before the decimal point",
                    ));
                }
                Ok(FieldValue::Number(number))
            }
        }
    }

    /// The type tag carried by this value
    pub fn field_type(&self) -> CustomFieldType {
        match self {
            FieldValue::Text(_) => CustomFieldType::Text,
            FieldValue::Number(_) => CustomFieldType::Number,
        }
    }

    /// Splits the value back into its storage columns
    ///
    /// Exactly one side is `Some`, by construction.
    pub fn columns(&self) -> (Option<&str>, Option<Decimal>) {
        match self {
            FieldValue::Text(t) => (Some(t), None),
            FieldValue::Number(n) => (None, Some(*n)),
        }
    }

    /// Renders the single effective scalar for the list view
    ///
    /// Numbers render with trailing zero scale trimmed, so `0.00` renders as
    /// `"0"` rather than being omitted or coerced to null.
    pub fn render(&self) -> serde_json::Value {
        match self {
            FieldValue::Text(t) => serde_json::Value::String(t.clone()),
            FieldValue::Number(n) => serde_json::Value::String(n.normalize().to_string()),
        }
    }
}

/// A custom field value attached to a patient
///
/// Child value object of the patient aggregate. Identity across updates is
/// not stable: the aggregate replaces its whole value collection on update,
/// so values are compared by fields, never by storage id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldValue {
    /// The definition this value instantiates
    pub custom_field: CustomFieldId,

    /// The validated value
    pub value: FieldValue,
}

/// Raw two-column value payload as submitted by a caller
///
/// This is the create/update wire shape; it becomes a [`CustomFieldValue`]
/// only after validation against the referenced definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueSubmission {
    /// Referenced custom field definition
    pub custom_field: CustomFieldId,

    /// Proposed text column
    #[serde(default)]
    pub text_value: Option<String>,

    /// Proposed number column
    #[serde(default)]
    pub number_value: Option<Decimal>,
}

impl ValueSubmission {
    /// Validates this submission against the definition's declared type
    ///
    /// # Errors
    ///
    /// Returns a field-scoped [`ValidationError`] on any invariant violation.
    pub fn into_value(
        self,
        field_type: CustomFieldType,
    ) -> Result<CustomFieldValue, ValidationError> {
        let value = FieldValue::validate(field_type, self.text_value, self.number_value)?;
        Ok(CustomFieldValue {
            custom_field: self.custom_field,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ValidationReason;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use test_case::test_case;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_text_value_accepted() {
        let v = FieldValue::validate(
            CustomFieldType::Text,
            Some("Dr. Smith".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(v, FieldValue::Text("Dr. Smith".to_string()));
        assert_eq!(v.columns(), (Some("Dr. Smith"), None));
    }

    #[test]
    fn test_number_value_accepted() {
        let v = FieldValue::validate(CustomFieldType::Number, None, Some(dec("12.5"))).unwrap();
        assert_eq!(v, FieldValue::Number(dec("12.5")));
        assert_eq!(v.columns(), (None, Some(dec("12.5"))));
    }

    #[test]
    fn test_zero_is_a_present_number() {
        let v = FieldValue::validate(CustomFieldType::Number, None, Some(Decimal::ZERO)).unwrap();
        assert_eq!(v, FieldValue::Number(Decimal::ZERO));
        assert_eq!(v.render(), serde_json::Value::String("0".to_string()));
    }

    // The wrong-column cases must point at the column that has to stay
    // null, not at the one that is missing.
    #[test_case(CustomFieldType::Text, None, None, "text_value", ValidationReason::Required ; "text definition with nothing submitted")]
    #[test_case(CustomFieldType::Text, Some(""), None, "text_value", ValidationReason::Required ; "empty text counts as absent")]
    #[test_case(CustomFieldType::Number, None, None, "number_value", ValidationReason::Required ; "number definition with nothing submitted")]
    #[test_case(CustomFieldType::Text, None, Some("5"), "number_value", ValidationReason::MustBeNull ; "number submitted against a text definition")]
    #[test_case(CustomFieldType::Number, Some("five"), Some("5"), "text_value", ValidationReason::MustBeNull ; "text populated beside a number")]
    #[test_case(CustomFieldType::Text, Some("five"), Some("5"), "number_value", ValidationReason::MustBeNull ; "both columns against a text definition")]
    fn test_invalid_submission_rejected(
        field_type: CustomFieldType,
        text: Option<&str>,
        number: Option<&str>,
        expected_field: &str,
        expected_reason: ValidationReason,
    ) {
        let err = FieldValue::validate(field_type, text.map(String::from), number.map(dec))
            .unwrap_err();
        assert_eq!(err.field, expected_field);
        assert_eq!(err.reason, expected_reason);
    }

    #[test]
    fn test_empty_text_beside_number_is_ignored() {
        // An empty text column is absent, so a NUMBER submission carrying
        // text_value = "" still validates.
        let v = FieldValue::validate(
            CustomFieldType::Number,
            Some(String::new()),
            Some(dec("3")),
        )
        .unwrap();
        assert_eq!(v, FieldValue::Number(dec("3")));
    }

    #[test]
    fn test_number_scale_normalized() {
        let v = FieldValue::validate(CustomFieldType::Number, None, Some(dec("1.005"))).unwrap();
        assert_eq!(v, FieldValue::Number(dec("1.00")));
    }

    #[test]
    fn test_number_overflow_rejected() {
        let err = FieldValue::validate(
            CustomFieldType::Number,
            None,
            Some(dec("10000000000000")),
        )
        .unwrap_err();
        assert_eq!(err.field, "number_value");
        assert!(matches!(err.reason, ValidationReason::Invalid(_)));
    }

    #[test]
    fn test_render_text() {
        let v = FieldValue::Text("hello".to_string());
        assert_eq!(v.render(), serde_json::Value::String("hello".to_string()));
    }

    #[test]
    fn test_render_number_trims_scale() {
        let v = FieldValue::Number(dec("20.50"));
        assert_eq!(v.render(), serde_json::Value::String("20.5".to_string()));
    }

    #[test]
    fn test_submission_into_value() {
        let sub = ValueSubmission {
            custom_field: CustomFieldId::new(9).unwrap(),
            text_value: Some("Dr. Smith".to_string()),
            number_value: None,
        };
        let value = sub.into_value(CustomFieldType::Text).unwrap();
        assert_eq!(value.custom_field.as_i64(), 9);
        assert_eq!(value.value.field_type(), CustomFieldType::Text);
    }
}
