//! Identifier generator.
//!
//! Produces three kinds of identifiers per entity kind:
//! - a sequential serial (`serial:<kind>` counter)
//! - a refer code `PREFIX-0001` (`refer:<kind>` counter)
//! - a day-scoped voucher number `PFX-YYMMDD-0001`
//!   (`voucher:<kind>:<YYMMDD>[:<scope>]` counter)
//!
//! Every counter bump is a single atomic call on the `CounterStore`.

use std::sync::Arc;

use chrono::NaiveDate;
use tallybook_shared::config::NumberingConfig;
use tracing::debug;

use super::counter::CounterStore;
use super::error::NumberingError;
use super::prefix::{EntityKind, PrefixTable};

/// Default zero-padding width.
pub const DEFAULT_SEQUENCE_WIDTH: usize = 4;

/// Generates serials, refer codes, voucher numbers and transaction ids.
pub struct IdentifierGenerator<C> {
    counters: Arc<C>,
    prefixes: PrefixTable,
    width: usize,
}

impl<C> Clone for IdentifierGenerator<C> {
    fn clone(&self) -> Self {
        Self {
            counters: Arc::clone(&self.counters),
            prefixes: self.prefixes.clone(),
            width: self.width,
        }
    }
}

impl<C: CounterStore> IdentifierGenerator<C> {
    /// Creates a generator.
    #[must_use]
    pub fn new(counters: Arc<C>, prefixes: PrefixTable, width: usize) -> Self {
        Self {
            counters,
            prefixes,
            width: width.max(1),
        }
    }

    /// Creates a generator from the numbering configuration.
    #[must_use]
    pub fn from_config(counters: Arc<C>, config: &NumberingConfig) -> Self {
        Self::new(
            counters,
            PrefixTable::from_config(config),
            config.sequence_width,
        )
    }

    /// Returns the prefix table.
    #[must_use]
    pub fn prefixes(&self) -> &PrefixTable {
        &self.prefixes
    }

    /// Returns the next sequential id for `kind`.
    pub async fn next_serial(&self, kind: EntityKind) -> Result<u64, NumberingError> {
        let key = format!("serial:{kind}");
        let value = self.counters.increment(&key).await?;
        debug!(counter = %key, value, "Counter incremented");
        Ok(value)
    }

    /// Returns the next refer code, e.g. `SPAY-0007`.
    pub async fn next_refer_code(&self, kind: EntityKind) -> Result<String, NumberingError> {
        let prefix = self.prefixes.prefix(kind)?;
        let key = format!("refer:{kind}");
        let value = self.counters.increment(&key).await?;
        debug!(counter = %key, value, "Counter incremented");
        Ok(format!("{prefix}-{}", format_sequence(value, self.width)))
    }

    /// Returns the next voucher number for `date`, e.g. `CPV-250314-0003`.
    ///
    /// `scope` narrows the daily sequence (bank reconciliations use the
    /// bank account code) and is embedded in the number. `existing` is the
    /// number of vouchers of this kind and scope already created that day;
    /// the sequence never goes below it.
    pub async fn next_voucher_number(
        &self,
        kind: EntityKind,
        date: NaiveDate,
        scope: Option<&str>,
        existing: u64,
    ) -> Result<String, NumberingError> {
        let prefix = self.prefixes.prefix(kind)?;
        let day = date.format("%y%m%d").to_string();
        let key = match scope {
            Some(scope) => format!("voucher:{kind}:{day}:{scope}"),
            None => format!("voucher:{kind}:{day}"),
        };
        let value = self.counters.increment_from(&key, existing).await?;
        debug!(counter = %key, value, existing, "Counter incremented");
        Ok(format_voucher_number(prefix, date, scope, value, self.width))
    }

    /// Returns a transaction id `TXN-<PFX>-YYMMDD-<serial>`.
    pub fn transaction_id(
        &self,
        kind: EntityKind,
        date: NaiveDate,
        serial: u64,
    ) -> Result<String, NumberingError> {
        let prefix = self.prefixes.prefix(kind)?;
        Ok(format!("TXN-{prefix}-{}-{serial}", date.format("%y%m%d")))
    }
}

/// Zero-pads `value` to `width` digits without truncating.
#[must_use]
pub fn format_sequence(value: u64, width: usize) -> String {
    format!("{value:0width$}")
}

/// Formats a voucher number.
#[must_use]
pub fn format_voucher_number(
    prefix: &str,
    date: NaiveDate,
    scope: Option<&str>,
    value: u64,
    width: usize,
) -> String {
    let day = date.format("%y%m%d");
    let sequence = format_sequence(value, width);
    match scope {
        Some(scope) => format!("{prefix}-{day}-{scope}-{sequence}"),
        None => format!("{prefix}-{day}-{sequence}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sequence() {
        assert_eq!(format_sequence(1, 4), "0001");
        assert_eq!(format_sequence(12345, 4), "12345");
        assert_eq!(format_sequence(7, 1), "7");
    }

    #[test]
    fn test_format_voucher_number() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(
            format_voucher_number("CPV", date, None, 3, 4),
            "CPV-250314-0003"
        );
        assert_eq!(
            format_voucher_number("BRV", date, Some("BA-001"), 1, 4),
            "BRV-250314-BA-001-0001"
        );
    }
}
