//! Polymorphic account and payee references.
//!
//! A reference is a tagged pair `{kind, id}`: the tag decides which
//! directory resolves the id.

use serde::{Deserialize, Serialize};
use std::fmt;
use tallybook_shared::types::{CustomerId, SupplierId};
use uuid::Uuid;

/// Kind of account an entry or payee points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    /// A bank account.
    BankAccount,
    /// The cash book.
    CashBook,
    /// A supplier ledger account.
    Supplier,
    /// A customer ledger account.
    Customer,
    /// An employee account.
    Employee,
    /// An asset account.
    Asset,
    /// An income account.
    Income,
    /// An expense account.
    Expense,
    /// A liability account.
    Liability,
    /// The capital account.
    Capital,
    /// An owner account.
    Owner,
    /// A partner account.
    PartnerAccount,
    /// A property account.
    PropertyAccount,
}

impl AccountKind {
    /// Every account kind.
    pub const ALL: [Self; 13] = [
        Self::BankAccount,
        Self::CashBook,
        Self::Supplier,
        Self::Customer,
        Self::Employee,
        Self::Asset,
        Self::Income,
        Self::Expense,
        Self::Liability,
        Self::Capital,
        Self::Owner,
        Self::PartnerAccount,
        Self::PropertyAccount,
    ];

    /// Returns the canonical model tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BankAccount => "BankAccount",
            Self::CashBook => "CashBook",
            Self::Supplier => "Supplier",
            Self::Customer => "Customer",
            Self::Employee => "Employee",
            Self::Asset => "Asset",
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::Liability => "Liability",
            Self::Capital => "Capital",
            Self::Owner => "Owner",
            Self::PartnerAccount => "PartnerAccount",
            Self::PropertyAccount => "PropertyAccount",
        }
    }

    /// Resolves a model tag alias, ignoring case, `_`, `-` and spaces.
    ///
    /// Returns `None` for unknown aliases.
    #[must_use]
    pub fn normalize(alias: &str) -> Option<Self> {
        let key: String = alias
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let kind = match key.as_str() {
            "bankaccount" | "bank" => Self::BankAccount,
            "cashbook" | "cash" | "cashaccount" => Self::CashBook,
            "supplier" | "vendor" => Self::Supplier,
            "customer" | "client" => Self::Customer,
            "employee" | "staff" => Self::Employee,
            "asset" | "assetaccount" | "assets" => Self::Asset,
            "income" | "incomeaccount" | "revenue" => Self::Income,
            "expense" | "expenseaccount" | "expenses" => Self::Expense,
            "liability" | "liabilityaccount" | "liabilities" => Self::Liability,
            "capital" | "capitalaccount" => Self::Capital,
            "owner" | "owneraccount" => Self::Owner,
            "partneraccount" | "partner" => Self::PartnerAccount,
            "propertyaccount" | "property" => Self::PropertyAccount,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns true for internal account categories that receive
    /// financial payments.
    #[must_use]
    pub const fn is_financial_category(self) -> bool {
        matches!(
            self,
            Self::Asset
                | Self::Income
                | Self::Liability
                | Self::PartnerAccount
                | Self::CashBook
                | Self::Capital
                | Self::Owner
                | Self::Employee
                | Self::PropertyAccount
        )
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged reference to an account of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountRef {
    /// Which directory resolves `id`.
    pub kind: AccountKind,
    /// Identifier within that directory.
    pub id: Uuid,
}

impl AccountRef {
    /// Creates a reference.
    #[must_use]
    pub const fn new(kind: AccountKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Coarse payee category of a payment voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayeeType {
    /// A supplier.
    Supplier,
    /// A customer.
    Customer,
    /// An employee.
    Employee,
    /// An internal financial account.
    Financial,
    /// Anyone else (free text).
    Other,
}

impl PayeeType {
    /// Returns the snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Supplier => "supplier",
            Self::Customer => "customer",
            Self::Employee => "employee",
            Self::Financial => "financial",
            Self::Other => "other",
        }
    }
}

/// Who a payment voucher pays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "payee_type", content = "payee", rename_all = "snake_case")]
pub enum Payee {
    /// Payment to a supplier.
    Supplier(SupplierId),
    /// Payment to (or refund of) a customer.
    Customer(CustomerId),
    /// Payment against an internal account (employee, asset, owner, ...).
    Financial(AccountRef),
    /// Free-text payee with no derived record.
    Other(String),
}

impl Payee {
    /// Returns the coarse payee category.
    #[must_use]
    pub fn payee_type(&self) -> PayeeType {
        match self {
            Self::Supplier(_) => PayeeType::Supplier,
            Self::Customer(_) => PayeeType::Customer,
            Self::Financial(account) if account.kind == AccountKind::Employee => {
                PayeeType::Employee
            }
            Self::Financial(_) => PayeeType::Financial,
            Self::Other(_) => PayeeType::Other,
        }
    }

    /// Returns the payee as an account reference, if it has one.
    #[must_use]
    pub fn account_ref(&self) -> Option<AccountRef> {
        match self {
            Self::Supplier(id) => Some(AccountRef::new(AccountKind::Supplier, id.into_inner())),
            Self::Customer(id) => Some(AccountRef::new(AccountKind::Customer, id.into_inner())),
            Self::Financial(account) => Some(*account),
            Self::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("bankaccount", AccountKind::BankAccount)]
    #[case("BankAccount", AccountKind::BankAccount)]
    #[case("bank_account", AccountKind::BankAccount)]
    #[case("cashbook", AccountKind::CashBook)]
    #[case("Partner-Account", AccountKind::PartnerAccount)]
    #[case("partneraccount", AccountKind::PartnerAccount)]
    #[case("EXPENSE", AccountKind::Expense)]
    fn test_normalize_aliases(#[case] alias: &str, #[case] expected: AccountKind) {
        assert_eq!(AccountKind::normalize(alias), Some(expected));
    }

    #[test]
    fn test_normalize_rejects_unknown() {
        assert_eq!(AccountKind::normalize("inventory"), None);
        assert_eq!(AccountKind::normalize(""), None);
    }

    #[test]
    fn test_canonical_names_round_trip() {
        for kind in AccountKind::ALL {
            assert_eq!(AccountKind::normalize(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_financial_categories() {
        assert!(AccountKind::Employee.is_financial_category());
        assert!(AccountKind::CashBook.is_financial_category());
        assert!(!AccountKind::Supplier.is_financial_category());
        assert!(!AccountKind::BankAccount.is_financial_category());
    }

    #[test]
    fn test_payee_type() {
        let employee = Payee::Financial(AccountRef::new(AccountKind::Employee, Uuid::nil()));
        assert_eq!(employee.payee_type(), PayeeType::Employee);
        let owner = Payee::Financial(AccountRef::new(AccountKind::Owner, Uuid::nil()));
        assert_eq!(owner.payee_type(), PayeeType::Financial);
        assert_eq!(Payee::Other("Landlord".into()).account_ref(), None);
    }

    #[test]
    fn test_payee_serde_is_tagged() {
        let payee = Payee::Supplier(SupplierId::from_uuid(Uuid::nil()));
        let json = serde_json::to_value(&payee).unwrap();
        assert_eq!(json["payee_type"], "supplier");
    }
}
