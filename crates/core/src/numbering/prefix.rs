//! Entity kinds and their number prefixes.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tallybook_shared::config::NumberingConfig;

use super::error::NumberingError;

/// Every entity that receives generated identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Bank account transfer voucher.
    BankTransfer,
    /// Cash payment voucher.
    CashPayment,
    /// Bank payment voucher.
    BankPayment,
    /// Journal voucher.
    Journal,
    /// Opening balance voucher.
    OpeningBalance,
    /// Bank reconciliation voucher.
    BankReconciliation,
    /// Derived supplier payment.
    SupplierPayment,
    /// Derived customer payment.
    CustomerPayment,
    /// Derived financial payment.
    FinancialPayment,
    /// Balance journey entry.
    Journey,
}

impl EntityKind {
    /// Every entity kind.
    pub const ALL: [Self; 10] = [
        Self::BankTransfer,
        Self::CashPayment,
        Self::BankPayment,
        Self::Journal,
        Self::OpeningBalance,
        Self::BankReconciliation,
        Self::SupplierPayment,
        Self::CustomerPayment,
        Self::FinancialPayment,
        Self::Journey,
    ];

    /// Returns the snake_case name, also used in counter keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BankTransfer => "bank_transfer",
            Self::CashPayment => "cash_payment",
            Self::BankPayment => "bank_payment",
            Self::Journal => "journal",
            Self::OpeningBalance => "opening_balance",
            Self::BankReconciliation => "bank_reconciliation",
            Self::SupplierPayment => "supplier_payment",
            Self::CustomerPayment => "customer_payment",
            Self::FinancialPayment => "financial_payment",
            Self::Journey => "journey",
        }
    }

    /// Parses a snake_case name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Built-in prefix.
    #[must_use]
    pub const fn default_prefix(self) -> &'static str {
        match self {
            Self::BankTransfer => "BTV",
            Self::CashPayment => "CPV",
            Self::BankPayment => "BPV",
            Self::Journal => "JV",
            Self::OpeningBalance => "OBV",
            Self::BankReconciliation => "BRV",
            Self::SupplierPayment => "SPAY",
            Self::CustomerPayment => "CPAY",
            Self::FinancialPayment => "FPAY",
            Self::Journey => "JRN",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping from entity kind to number prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixTable {
    prefixes: HashMap<EntityKind, String>,
}

impl Default for PrefixTable {
    fn default() -> Self {
        Self {
            prefixes: EntityKind::ALL
                .into_iter()
                .map(|kind| (kind, kind.default_prefix().to_string()))
                .collect(),
        }
    }
}

impl PrefixTable {
    /// Creates an empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            prefixes: HashMap::new(),
        }
    }

    /// Builds the default table with configured overrides applied.
    ///
    /// An empty override removes the mapping. Unknown kinds are skipped.
    #[must_use]
    pub fn from_config(config: &NumberingConfig) -> Self {
        let mut table = Self::default();
        for (name, prefix) in &config.prefixes {
            let Some(kind) = EntityKind::parse(name) else {
                tracing::warn!(kind = %name, "Ignoring prefix override for unknown entity kind");
                continue;
            };
            table = table.with(kind, prefix);
        }
        table
    }

    /// Sets or, for an empty prefix, removes the mapping for `kind`.
    #[must_use]
    pub fn with(mut self, kind: EntityKind, prefix: &str) -> Self {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            self.prefixes.remove(&kind);
        } else {
            self.prefixes.insert(kind, prefix.to_ascii_uppercase());
        }
        self
    }

    /// Looks up the prefix for `kind`.
    ///
    /// # Errors
    ///
    /// Returns `NumberingError::MissingPrefix` when no mapping exists.
    pub fn prefix(&self, kind: EntityKind) -> Result<&str, NumberingError> {
        self.prefixes
            .get(&kind)
            .map(String::as_str)
            .ok_or(NumberingError::MissingPrefix(kind))
    }
}
