//! Per-provider extraction: raw provider JSON in, canonical record out.
//!
//! Extraction is pure. No network or storage access happens here; the
//! pipeline owns fetching and persistence, the extractor only maps fields.

use bigdecimal::BigDecimal;
use chrono::Utc;
use serde_json::Value;

use crate::error::ExtractionError;
use crate::model::{ProductRecord, Source};
use crate::normalization::price::parse_price_string;

/// Provider-keyed extractor. Both variants share the output shape and the
/// validation step (`ProductRecord::validate`, run by the pipeline); only the
/// field lookup differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    Flipkart,
    Amazon,
}

impl Extractor {
    pub fn source(&self) -> Source {
        match self {
            Extractor::Flipkart => Source::Flipkart,
            Extractor::Amazon => Source::Amazon,
        }
    }

    /// Map a raw payload to a canonical record.
    ///
    /// `external_id` is the pid/asin the payload was fetched for; detail
    /// payloads do not reliably echo it. `created_at` is stamped at the
    /// extraction instant and `source` is fixed by the variant.
    pub fn extract(
        &self,
        external_id: &str,
        raw: &Value,
    ) -> Result<ProductRecord, ExtractionError> {
        if external_id.trim().is_empty() {
            return Err(ExtractionError::MissingField {
                field: match self {
                    Extractor::Flipkart => "pid",
                    Extractor::Amazon => "asin",
                },
            });
        }

        let (name, price) = match self {
            Extractor::Flipkart => extract_flipkart(raw)?,
            Extractor::Amazon => extract_amazon(raw)?,
        };

        Ok(ProductRecord {
            id: None,
            external_id: external_id.to_string(),
            name,
            price,
            source: self.source(),
            created_at: Utc::now(),
        })
    }
}

/// Flipkart payloads carry a string `title` and an integer `price`.
/// The integer is promoted exactly to decimal. A `-1` price (the list
/// endpoint's "absent" sentinel) passes extraction and is rejected by
/// validation, which keeps the skip accounting in one place.
fn extract_flipkart(raw: &Value) -> Result<(String, BigDecimal), ExtractionError> {
    let title = raw
        .get("title")
        .and_then(Value::as_str)
        .ok_or(ExtractionError::MissingField { field: "title" })?;

    let price = raw
        .get("price")
        .and_then(Value::as_i64)
        .ok_or(ExtractionError::MissingField { field: "price" })?;

    Ok((title.to_string(), BigDecimal::from(price)))
}

/// Amazon payloads wrap the product in a `data` object behind a `status`
/// field. On any status other than "OK" no further field access is
/// attempted. `product_price` is a formatted string handled by
/// `parse_price_string`.
fn extract_amazon(raw: &Value) -> Result<(String, BigDecimal), ExtractionError> {
    let status = raw
        .get("status")
        .and_then(Value::as_str)
        .ok_or(ExtractionError::MissingField { field: "status" })?;

    if status != "OK" {
        return Err(ExtractionError::UpstreamError {
            detail: status.to_string(),
        });
    }

    let data = raw
        .get("data")
        .filter(|v| v.is_object())
        .ok_or(ExtractionError::MissingField { field: "data" })?;

    let title = data
        .get("product_title")
        .and_then(Value::as_str)
        .ok_or(ExtractionError::MissingField {
            field: "product_title",
        })?;

    let price_raw = data
        .get("product_price")
        .and_then(Value::as_str)
        .ok_or(ExtractionError::MissingField {
            field: "product_price",
        })?;

    Ok((title.to_string(), parse_price_string(price_raw)?))
}

/// Pull the provider-assigned id out of a Flipkart list item. Items without
/// a usable `pid` cannot be keyed and are skipped by the batch pipeline.
pub fn batch_external_id(item: &Value) -> Result<&str, ExtractionError> {
    item.get("pid")
        .and_then(Value::as_str)
        .filter(|pid| !pid.trim().is_empty())
        .ok_or(ExtractionError::MissingField { field: "pid" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn flipkart_promotes_integer_price_exactly() {
        let raw = json!({ "title": "SmartPhone X", "price": 12999 });
        let rec = Extractor::Flipkart.extract("ITM123", &raw).unwrap();

        assert_eq!(rec.source, Source::Flipkart);
        assert_eq!(rec.external_id, "ITM123");
        assert_eq!(rec.name, "SmartPhone X");
        assert_eq!(rec.price, BigDecimal::from(12999));
        assert!(rec.id.is_none());
        assert!(rec.validate().is_ok());
    }

    #[test]
    fn flipkart_missing_title_is_reported_by_field() {
        let raw = json!({ "price": 500 });
        assert_eq!(
            Extractor::Flipkart.extract("ITM123", &raw),
            Err(ExtractionError::MissingField { field: "title" })
        );
    }

    #[test]
    fn flipkart_missing_price_is_reported_by_field() {
        let raw = json!({ "title": "Widget" });
        assert_eq!(
            Extractor::Flipkart.extract("ITM123", &raw),
            Err(ExtractionError::MissingField { field: "price" })
        );
    }

    #[test]
    fn flipkart_absent_sentinel_extracts_but_fails_validation() {
        let raw = json!({ "title": "Widget", "price": -1 });
        let rec = Extractor::Flipkart.extract("ITM123", &raw).unwrap();
        assert!(rec.validate().is_err());
    }

    #[test]
    fn amazon_parses_formatted_price() {
        let raw = json!({
            "status": "OK",
            "data": { "product_title": "Laptop Pro", "product_price": "₹1,23,456" }
        });
        let rec = Extractor::Amazon.extract("B0ABC", &raw).unwrap();

        assert_eq!(rec.source, Source::Amazon);
        assert_eq!(rec.price, BigDecimal::from(123_456));
        assert_eq!(rec.name, "Laptop Pro");
    }

    #[test]
    fn amazon_error_status_short_circuits_before_data_access() {
        // No `data` object at all: the status check must fire first.
        let raw = json!({ "status": "RATE_LIMITED" });
        assert_eq!(
            Extractor::Amazon.extract("B0ABC", &raw),
            Err(ExtractionError::UpstreamError {
                detail: "RATE_LIMITED".to_string()
            })
        );
    }

    #[test]
    fn amazon_malformed_price_string_is_rejected() {
        let raw = json!({
            "status": "OK",
            "data": { "product_title": "Laptop Pro", "product_price": "N/A" }
        });
        assert_eq!(
            Extractor::Amazon.extract("B0ABC", &raw),
            Err(ExtractionError::MalformedNumber {
                raw: "N/A".to_string()
            })
        );
    }

    #[test]
    fn amazon_decimal_price_survives_exactly() {
        let raw = json!({
            "status": "OK",
            "data": { "product_title": "Cable", "product_price": "$12.49" }
        });
        let rec = Extractor::Amazon.extract("B0ABC", &raw).unwrap();
        assert_eq!(rec.price, BigDecimal::from_str("12.49").unwrap());
    }

    #[test]
    fn empty_external_id_is_rejected() {
        let raw = json!({ "title": "Widget", "price": 10 });
        assert_eq!(
            Extractor::Flipkart.extract("  ", &raw),
            Err(ExtractionError::MissingField { field: "pid" })
        );
    }

    #[test]
    fn batch_external_id_requires_non_empty_pid() {
        assert_eq!(batch_external_id(&json!({ "pid": "ITM9" })).unwrap(), "ITM9");
        assert!(batch_external_id(&json!({ "pid": "" })).is_err());
        assert!(batch_external_id(&json!({ "title": "no pid" })).is_err());
    }
}
