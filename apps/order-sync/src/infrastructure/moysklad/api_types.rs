//! MoySklad API response types.
//!
//! Rows are kept as raw JSON and projected into `OrderRow` one at a time, so
//! the untouched row can travel with the order as its `raw_response`.

use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{Order, RawResponse};

use super::error::MoySkladError;

/// Timestamp format of `created` and `deliveryPlannedMoment`,
/// e.g. `2024-01-15 10:30:00.000000`.
///
/// `%.f` alone would also accept a missing fraction or nanoseconds, so the
/// fraction is checked separately to be one to six digits.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Most fractional digits a timestamp may carry (microseconds).
const MAX_FRACTION_DIGITS: usize = 6;

/// Scale of the `payed_sum` column.
const MONEY_SCALE: u32 = 2;

/// Envelope of the order listing.
#[derive(Debug, Deserialize)]
pub struct OrderListResponse {
    /// One JSON object per order, in listing order.
    pub rows: Vec<Value>,
}

/// Typed projection of one listing row.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderRow {
    id: String,
    account_id: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    created: NaiveDateTime,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    delivery_planned_moment: Option<NaiveDateTime>,
    #[serde(default)]
    external_code: Option<String>,
    name: String,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    payed_sum: Option<Decimal>,
    #[serde(default)]
    shipment_address: Option<String>,
}

/// Map every row of a listing, stopping at the first bad one.
pub fn map_rows(rows: Vec<Value>) -> Result<Vec<Order>, MoySkladError> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| map_row(index, row))
        .collect()
}

/// Map one row into an `Order`, keeping the row itself as `raw_response`.
pub fn map_row(index: usize, row: Value) -> Result<Order, MoySkladError> {
    let parsed = OrderRow::deserialize(&row).map_err(|e| MoySkladError::MalformedRow {
        index,
        message: e.to_string(),
    })?;

    Ok(Order {
        order_id: parsed.id,
        account_id: parsed.account_id,
        created: parsed.created,
        delivery_planned_moment: parsed.delivery_planned_moment,
        external_code: parsed.external_code,
        name: parsed.name,
        payed_sum: parsed.payed_sum,
        shipment_address: parsed.shipment_address,
        raw_response: RawResponse::new(row),
    })
}

fn parse_timestamp<E: de::Error>(value: &str) -> Result<NaiveDateTime, E> {
    let fraction_ok = value.rsplit_once('.').is_some_and(|(_, fraction)| {
        (1..=MAX_FRACTION_DIGITS).contains(&fraction.len())
            && fraction.bytes().all(|b| b.is_ascii_digit())
    });
    if !fraction_ok {
        return Err(E::custom(format!(
            "invalid timestamp {value:?}: expected YYYY-MM-DD HH:MM:SS.ffffff"
        )));
    }

    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map_err(|e| E::custom(format!("invalid timestamp {value:?}: {e}")))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_timestamp(&value)
}

fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|value| parse_timestamp(&value))
        .transpose()
}

/// Accepts a JSON number or a numeric string, rescaled to two places.
fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(de::Error::custom(format!(
                "invalid amount {other}: expected a number"
            )));
        }
    };

    let mut amount = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| <D::Error as de::Error>::custom(format!("invalid amount {text:?}: {e}")))?;
    amount.rescale(MONEY_SCALE);
    Ok(Some(amount))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Timelike};
    use rust_decimal_macros::dec;
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    fn full_row() -> Value {
        json!({
            "meta": { "type": "customerorder" },
            "id": "abc-1",
            "accountId": "acc-9",
            "created": "2024-01-15 10:30:00.000000",
            "deliveryPlannedMoment": "2024-01-20 18:00:00.000",
            "externalCode": "ext-1",
            "name": "Order #1",
            "payedSum": 150.50,
            "shipmentAddress": "Moscow, Tverskaya 1",
            "applicable": true
        })
    }

    #[test]
    fn maps_every_typed_field() {
        let order = map_row(0, full_row()).unwrap();

        assert_eq!(order.order_id, "abc-1");
        assert_eq!(order.account_id, "acc-9");
        assert_eq!(
            order.created,
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap()
        );
        assert_eq!(
            order.delivery_planned_moment,
            NaiveDate::from_ymd_opt(2024, 1, 20)
                .unwrap()
                .and_hms_opt(18, 0, 0)
        );
        assert_eq!(order.external_code.as_deref(), Some("ext-1"));
        assert_eq!(order.name, "Order #1");
        assert_eq!(order.payed_sum, Some(dec!(150.50)));
        assert_eq!(order.payed_sum.unwrap().to_string(), "150.50");
        assert_eq!(order.shipment_address.as_deref(), Some("Moscow, Tverskaya 1"));
    }

    #[test]
    fn raw_response_is_the_unmodified_row() {
        let row = full_row();
        let order = map_row(0, row.clone()).unwrap();

        assert_eq!(order.raw_response.as_value(), &row);
        for (key, value) in row.as_object().unwrap() {
            assert_eq!(order.raw_response.get(key), Some(value), "field {key}");
        }
    }

    #[test]
    fn timestamp_keeps_microseconds() {
        let mut row = full_row();
        row["created"] = json!("2024-01-15 10:30:00.123456");

        let order = map_row(0, row).unwrap();

        assert_eq!(order.created.nanosecond(), 123_456_000);
    }

    #[test_case("2024-01-15 10:30:00.5", 500_000_000 ; "one digit")]
    #[test_case("2024-01-15 10:30:00.123", 123_000_000 ; "milliseconds")]
    #[test_case("2024-01-15 10:30:00.000001", 1_000 ; "microseconds")]
    fn fraction_of_one_to_six_digits_is_accepted(created: &str, nanos: u32) {
        let mut row = full_row();
        row["created"] = json!(created);

        let order = map_row(0, row).unwrap();

        assert_eq!(order.created.nanosecond(), nanos);
    }

    #[test]
    fn optional_fields_may_be_absent_or_null() {
        let row = json!({
            "id": "abc-2",
            "accountId": "acc-9",
            "created": "2024-01-15 10:30:00.000000",
            "deliveryPlannedMoment": null,
            "name": "Order #2"
        });

        let order = map_row(0, row).unwrap();

        assert!(order.delivery_planned_moment.is_none());
        assert!(order.external_code.is_none());
        assert!(order.payed_sum.is_none());
        assert!(order.shipment_address.is_none());
    }

    #[test_case("payedSum", json!("99.999"), "100.00" ; "numeric string rounds to scale")]
    #[test_case("payedSum", json!(0), "0.00" ; "integer zero")]
    #[test_case("payedSum", json!(1234567.5), "1234567.50" ; "large amount")]
    fn amount_is_rescaled(field: &str, value: Value, expected: &str) {
        let mut row = full_row();
        row[field] = value;

        let order = map_row(0, row).unwrap();

        assert_eq!(order.payed_sum.unwrap().to_string(), expected);
    }

    #[test_case("created", json!("15.01.2024 10:30") ; "wrong timestamp format")]
    #[test_case("created", json!("2024-01-15 10:30:00") ; "timestamp without fraction")]
    #[test_case("created", json!("2024-01-15 10:30:00.123456789") ; "nanosecond fraction")]
    #[test_case("created", json!("2024-01-15 10:30:00.") ; "empty fraction")]
    #[test_case("created", json!(null) ; "null required timestamp")]
    #[test_case("deliveryPlannedMoment", json!("tomorrow") ; "bad optional timestamp")]
    #[test_case("payedSum", json!({"value": 1}) ; "amount is an object")]
    #[test_case("id", json!(42) ; "id is not a string")]
    fn malformed_field_is_rejected(field: &str, value: Value) {
        let mut row = full_row();
        row[field] = value;

        let err = map_row(7, row).unwrap_err();

        assert!(
            matches!(err, MoySkladError::MalformedRow { index: 7, .. }),
            "{err:?}"
        );
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let mut row = full_row();
        row.as_object_mut().unwrap().remove("created");

        let err = map_row(0, row).unwrap_err();

        let MoySkladError::MalformedRow { message, .. } = err else {
            panic!("expected MalformedRow");
        };
        assert!(message.contains("created"), "{message}");
    }

    #[test]
    fn map_rows_preserves_order() {
        let rows = (0..5)
            .map(|i| {
                let mut row = full_row();
                row["id"] = json!(format!("id-{i}"));
                row
            })
            .collect();

        let orders = map_rows(rows).unwrap();

        let ids: Vec<_> = orders.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, ["id-0", "id-1", "id-2", "id-3", "id-4"]);
    }

    #[test]
    fn map_rows_aborts_on_first_bad_row() {
        let mut bad = full_row();
        bad["created"] = json!("not a date");

        let err = map_rows(vec![full_row(), bad, full_row()]).unwrap_err();

        assert!(matches!(err, MoySkladError::MalformedRow { index: 1, .. }));
    }

    #[test]
    fn listing_without_rows_is_rejected() {
        let result = serde_json::from_value::<OrderListResponse>(json!({ "meta": {} }));
        assert!(result.is_err());
    }
}
