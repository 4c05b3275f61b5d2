//! Boundary input parsing.
//!
//! Payloads that arrive as JSON text (attachments, entries) are parsed
//! strictly: the whole value deserializes or the request is rejected.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tallybook_shared::error::FieldError;
use tallybook_shared::types::{CurrencyCode, UserId};

use super::error::VoucherError;
use super::header::VoucherHeader;

/// Parses a JSON-encoded field.
///
/// # Errors
///
/// Returns a `Validation` error naming `field` if the text is not a valid
/// encoding of `T`.
pub fn parse_json_field<T: DeserializeOwned>(field: &str, raw: &str) -> Result<T, VoucherError> {
    serde_json::from_str(raw.trim())
        .map_err(|e| VoucherError::invalid(field, format!("invalid JSON: {e}")))
}

/// Header fields a caller may supply on creation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderInput {
    /// Accounting date; defaults to now.
    pub voucher_date: Option<DateTime<Utc>>,
    /// ISO currency code; defaults to the bank account's or the configured one.
    pub currency: Option<String>,
    /// Exchange rate; defaults to 1.
    pub exchange_rate: Option<Decimal>,
    /// External reference.
    pub reference_number: Option<String>,
    /// Transaction id; generated when absent.
    pub transaction_id: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

impl HeaderInput {
    /// Builds an unnumbered header, pushing any problem into `problems`.
    pub fn build(
        &self,
        created_by: UserId,
        fallback_currency: &CurrencyCode,
        problems: &mut Vec<FieldError>,
    ) -> VoucherHeader {
        let currency = match self.currency.as_deref() {
            Some(code) => CurrencyCode::parse(code).unwrap_or_else(|message| {
                problems.push(FieldError::new("currency", message));
                fallback_currency.clone()
            }),
            None => fallback_currency.clone(),
        };

        let exchange_rate = self.exchange_rate.unwrap_or(Decimal::ONE);
        if exchange_rate <= Decimal::ZERO {
            problems.push(FieldError::new("exchange_rate", "must be greater than zero"));
        }

        if self
            .transaction_id
            .as_deref()
            .is_some_and(|id| id.trim().is_empty())
        {
            problems.push(FieldError::new("transaction_id", "must not be blank"));
        }

        let mut header = VoucherHeader::new(
            created_by,
            self.voucher_date.unwrap_or_else(Utc::now),
            currency,
            exchange_rate,
        );
        header.reference_number = non_blank(self.reference_number.as_deref());
        header.description = non_blank(self.description.as_deref());
        header
    }

    /// Returns the caller-supplied transaction id, trimmed.
    #[must_use]
    pub fn transaction_id(&self) -> Option<String> {
        non_blank(self.transaction_id.as_deref())
    }
}

/// Header fields a caller may change while a voucher is still mutable.
///
/// Voucher number, transaction id, refer code and currency are fixed at
/// creation and have no counterpart here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderPatch {
    /// New accounting date. The voucher number is kept.
    pub voucher_date: Option<DateTime<Utc>>,
    /// New exchange rate.
    pub exchange_rate: Option<Decimal>,
    /// New external reference; blank clears it.
    pub reference_number: Option<String>,
    /// New description; blank clears it.
    pub description: Option<String>,
}

impl HeaderPatch {
    /// Applies the patch to `header`, pushing any problem into `problems`.
    pub fn apply(&self, header: &mut VoucherHeader, problems: &mut Vec<FieldError>) {
        if let Some(date) = self.voucher_date {
            header.voucher_date = date;
        }
        if let Some(rate) = self.exchange_rate {
            if rate <= Decimal::ZERO {
                problems.push(FieldError::new("exchange_rate", "must be greater than zero"));
            } else {
                header.exchange_rate = rate;
            }
        }
        if let Some(reference) = &self.reference_number {
            header.reference_number = non_blank(Some(reference));
        }
        if let Some(description) = &self.description {
            header.description = non_blank(Some(description));
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}
