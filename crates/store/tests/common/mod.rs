//! Shared fixture for the store integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use tallybook_core::directory::BankAccountInfo;
use tallybook_core::ledger::EntryInput;
use tallybook_core::service::{JournalInput, PaymentInput, VoucherServices};
use tallybook_core::voucher::{AccountKind, AccountRef, HeaderInput, Payee, PaymentChannel};
use tallybook_shared::config::AppConfig;
use tallybook_shared::types::{CurrencyCode, CustomerId, SupplierId, UserId};
use tallybook_store::{InMemoryBackend, Purchase};

/// A seeded backend with the services wired over it.
pub struct Fixture {
    pub backend: InMemoryBackend,
    pub services: VoucherServices<InMemoryBackend>,
    pub actor: UserId,
    pub operating: BankAccountInfo,
    pub savings: BankAccountInfo,
    pub capital: AccountRef,
    pub supplier: SupplierId,
    pub customer: CustomerId,
    pub purchase: Purchase,
}

impl Fixture {
    pub fn new() -> Self {
        let backend = InMemoryBackend::in_memory().expect("memory storage");
        let directory = backend.directory_ref();
        let operating = directory.add_bank_account("BA-001", "Operating", CurrencyCode::default());
        let savings = directory.add_bank_account("BA-002", "Savings", CurrencyCode::default());
        let capital = directory.add_account_of(AccountKind::Capital, "Owner capital");
        let supplier = directory.add_supplier("Acme Supplies");
        let customer = directory.add_customer("Globex");
        let purchase = backend.add_purchase(supplier, Decimal::from(1500));

        let services =
            VoucherServices::new(&backend, &AppConfig::default()).expect("services from defaults");

        Self {
            backend,
            services,
            actor: UserId::new(),
            operating,
            savings,
            capital,
            supplier,
            customer,
            purchase,
        }
    }

    /// Journal input debiting the operating account and crediting capital.
    pub fn journal(&self, debit: Decimal, credit: Decimal) -> JournalInput {
        JournalInput {
            header: dated(noon()),
            entries: vec![
                EntryInput {
                    account: self.operating.id.into_inner(),
                    account_model: "bankaccount".into(),
                    account_name: None,
                    debit,
                    credit: Decimal::ZERO,
                    description: None,
                },
                EntryInput {
                    account: self.capital.id,
                    account_model: "capital".into(),
                    account_name: None,
                    debit: Decimal::ZERO,
                    credit,
                    description: None,
                },
            ],
            ..JournalInput::default()
        }
    }

    /// Payment input with no explicit status.
    pub fn payment(&self, channel: PaymentChannel, payee: Payee, amount: Decimal) -> PaymentInput {
        PaymentInput {
            header: dated(noon()),
            channel,
            bank_account: (channel == PaymentChannel::Bank).then_some(self.operating.id),
            payee,
            amount,
            payment_method: Default::default(),
            related_purchase: None,
            related_sale: None,
            status: None,
            attachments: Vec::new(),
            uploads: Vec::new(),
        }
    }
}

/// Fixed voucher date used across the tests.
pub fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
}

/// Header input carrying only a voucher date.
pub fn dated(at: DateTime<Utc>) -> HeaderInput {
    HeaderInput {
        voucher_date: Some(at),
        ..HeaderInput::default()
    }
}
