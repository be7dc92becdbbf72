//! Resolution of raw operational cells into typed excerpt fields.

use chrono::NaiveDateTime;
use serde_json::Value;

use super::model::{OperationalTableField, OperationalTableFieldType};
use super::result_set::RawCellValue;

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Policy turning a raw cell into a stringified value and semantic type.
///
/// Implementations must be deterministic and total: every [`RawCellValue`]
/// yields a field, nothing panics.
#[cfg_attr(test, mockall::automock)]
pub trait OperationalFieldResolver: Send + Sync {
    /// Resolve one operational cell.
    fn resolve(&self, value: &RawCellValue) -> OperationalTableField;
}

/// Default resolution policy covering every raw value shape.
///
/// # Examples
///
/// ```
/// use history_excerptor::domain::history::{
///     DefaultFieldResolver, OperationalFieldResolver, OperationalTableFieldType, RawCellValue,
/// };
///
/// let field = DefaultFieldResolver.resolve(&RawCellValue::Integer(7));
/// assert_eq!(field.value(), Some("7"));
/// assert_eq!(field.field_type(), OperationalTableFieldType::Numeric);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFieldResolver;

impl OperationalFieldResolver for DefaultFieldResolver {
    fn resolve(&self, value: &RawCellValue) -> OperationalTableField {
        OperationalTableField::new(render_text(value), field_type_of(value))
    }
}

fn field_type_of(value: &RawCellValue) -> OperationalTableFieldType {
    match value {
        RawCellValue::Null | RawCellValue::Text(_) => OperationalTableFieldType::Text,
        RawCellValue::Integer(_) | RawCellValue::Decimal(_) | RawCellValue::Float(_) => {
            OperationalTableFieldType::Numeric
        }
        RawCellValue::Boolean(_) => OperationalTableFieldType::Boolean,
        RawCellValue::Uuid(_) => OperationalTableFieldType::Uuid,
        RawCellValue::Date(_) => OperationalTableFieldType::Date,
        RawCellValue::Timestamp(_) | RawCellValue::TimestampTz(_) => {
            OperationalTableFieldType::DateTime
        }
        RawCellValue::Json(Value::Array(_)) | RawCellValue::Array(_) => {
            OperationalTableFieldType::Array
        }
        RawCellValue::Json(_) => OperationalTableFieldType::JsonObject,
    }
}

/// Render a cell as text, `None` for SQL `NULL`.
///
/// Temporal values use ISO-8601 local date-time text; zoned timestamps are
/// normalised to UTC first. Arrays render as JSON arrays of their rendered
/// elements.
pub fn render_text(value: &RawCellValue) -> Option<String> {
    match value {
        RawCellValue::Null => None,
        RawCellValue::Text(text) | RawCellValue::Decimal(text) => Some(text.clone()),
        RawCellValue::Integer(number) => Some(number.to_string()),
        RawCellValue::Float(number) => Some(number.to_string()),
        RawCellValue::Boolean(flag) => Some(flag.to_string()),
        RawCellValue::Uuid(id) => Some(id.to_string()),
        RawCellValue::Date(date) => Some(date.format("%Y-%m-%d").to_string()),
        RawCellValue::Timestamp(timestamp) => Some(format_date_time(*timestamp)),
        RawCellValue::TimestampTz(timestamp) => Some(format_date_time(timestamp.naive_utc())),
        RawCellValue::Json(document) => Some(document.to_string()),
        RawCellValue::Array(items) => {
            let rendered = items
                .iter()
                .map(|item| render_text(item).map_or(Value::Null, Value::String))
                .collect::<Vec<_>>();
            Some(Value::Array(rendered).to_string())
        }
    }
}

/// Canonical date-time text: seconds always present, fraction only when
/// non-zero.
pub fn format_date_time(value: NaiveDateTime) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn timestamp(millis: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|date| date.and_hms_milli_opt(10, 15, 0, millis))
            .expect("valid timestamp")
    }

    #[rstest]
    #[case::null(RawCellValue::Null, None, OperationalTableFieldType::Text)]
    #[case::text(RawCellValue::Text("Ada".into()), Some("Ada"), OperationalTableFieldType::Text)]
    #[case::integer(RawCellValue::Integer(-4), Some("-4"), OperationalTableFieldType::Numeric)]
    #[case::decimal(RawCellValue::Decimal("10.50".into()), Some("10.50"), OperationalTableFieldType::Numeric)]
    #[case::float(RawCellValue::Float(1.5), Some("1.5"), OperationalTableFieldType::Numeric)]
    #[case::boolean(RawCellValue::Boolean(true), Some("true"), OperationalTableFieldType::Boolean)]
    #[case::date(
        RawCellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 9).expect("valid date")),
        Some("2024-01-09"),
        OperationalTableFieldType::Date
    )]
    #[case::timestamp(RawCellValue::Timestamp(timestamp(0)), Some("2024-03-01T10:15:00"), OperationalTableFieldType::DateTime)]
    #[case::json_object(RawCellValue::Json(json!({"a": 1})), Some("{\"a\":1}"), OperationalTableFieldType::JsonObject)]
    #[case::json_array(RawCellValue::Json(json!([1, 2])), Some("[1,2]"), OperationalTableFieldType::Array)]
    #[case::array(
        RawCellValue::Array(vec![RawCellValue::Text("x".into()), RawCellValue::Null, RawCellValue::Integer(3)]),
        Some("[\"x\",null,\"3\"]"),
        OperationalTableFieldType::Array
    )]
    fn resolves_every_value_shape(
        #[case] raw: RawCellValue,
        #[case] expected_value: Option<&str>,
        #[case] expected_type: OperationalTableFieldType,
    ) {
        let field = DefaultFieldResolver.resolve(&raw);

        assert_eq!(field.value(), expected_value);
        assert_eq!(field.field_type(), expected_type);
    }

    #[rstest]
    fn uuid_cells_keep_hyphenated_form() {
        let id = Uuid::new_v4();
        let field = DefaultFieldResolver.resolve(&RawCellValue::Uuid(id));

        assert_eq!(field.value(), Some(id.to_string().as_str()));
        assert_eq!(field.field_type(), OperationalTableFieldType::Uuid);
    }

    #[rstest]
    fn fractional_seconds_are_kept() {
        assert_eq!(format_date_time(timestamp(250)), "2024-03-01T10:15:00.250");
    }

    #[rstest]
    fn zoned_timestamps_render_in_utc() {
        let zoned = Utc
            .with_ymd_and_hms(2024, 3, 1, 22, 0, 5)
            .single()
            .expect("valid time");

        assert_eq!(
            render_text(&RawCellValue::TimestampTz(zoned)).as_deref(),
            Some("2024-03-01T22:00:05")
        );
    }

    #[rstest]
    fn resolution_is_deterministic() {
        let raw = RawCellValue::Json(json!({"nested": {"b": [1, null]}}));

        assert_eq!(DefaultFieldResolver.resolve(&raw), DefaultFieldResolver.resolve(&raw));
    }
}
