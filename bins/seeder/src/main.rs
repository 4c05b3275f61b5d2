//! Ledger seeder for Tallybook development.
//!
//! Seeds bank accounts, a supplier, a customer and an open purchase into an
//! in-memory backend, then drives one voucher of each kind through its
//! workflow and logs every outcome.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tallybook_core::ledger::EntryInput;
use tallybook_core::reconciliation::Adjustments;
use tallybook_core::service::{
    JournalInput, PaymentInput, ReconciliationInput, TransferInput, VoucherServices,
};
use tallybook_core::storage::{StorageConfig, StorageService};
use tallybook_core::voucher::{
    AccountKind, HeaderInput, JournalKind, Payee, PaymentChannel, PaymentMethod, TransferMethod,
};
use tallybook_shared::AppConfig;
use tallybook_shared::config::LoggingConfig;
use tallybook_shared::types::{CurrencyCode, UserId};
use tallybook_store::InMemoryBackend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    let storage = StorageService::from_config(StorageConfig::from_settings(&config.storage))?;
    info!(provider = storage.provider_name(), "Attachment storage ready");

    let backend = InMemoryBackend::new(storage);
    let services = VoucherServices::new(&backend, &config)?;
    let actor = UserId::new();

    let directory = backend.directory_ref();
    let currency =
        CurrencyCode::parse(&config.ledger.default_currency).map_err(anyhow::Error::msg)?;
    let operating = directory.add_bank_account("BA-001", "Operating account", currency.clone());
    let savings = directory.add_bank_account("BA-002", "Savings account", currency);
    let capital = directory.add_account_of(AccountKind::Capital, "Owner capital");
    let supplier = directory.add_supplier("Acme Supplies");
    directory.add_customer("Globex");
    let purchase = backend.add_purchase(supplier, Decimal::from(1500));
    info!(purchase = %purchase.id, total = %purchase.total, "Seeded directory");

    // Transfer: draft -> pending -> completed
    let transfer = services
        .transfers
        .create(
            TransferInput {
                header: HeaderInput::default(),
                from_bank_account: operating.id,
                to_bank_account: savings.id,
                amount: Decimal::from(1000),
                transfer_fee: Decimal::new(250, 2),
                transfer_method: TransferMethod::Online,
                status: None,
                attachments: Vec::new(),
                uploads: Vec::new(),
            },
            actor,
        )
        .await?
        .voucher;
    services.transfers.approve(transfer.header.id, actor).await?;
    let transfer = services.transfers.complete(transfer.header.id, actor).await?;
    info!(
        voucher_number = %transfer.header.voucher_number,
        status = %transfer.status,
        total = %transfer.total_amount,
        "Transfer completed"
    );

    // Cash payment settles the purchase in part.
    let payment = services
        .payments
        .create(
            PaymentInput {
                header: HeaderInput::default(),
                channel: PaymentChannel::Cash,
                bank_account: None,
                payee: Payee::Supplier(supplier),
                amount: Decimal::from(500),
                payment_method: PaymentMethod::Cash,
                related_purchase: Some(purchase.id),
                related_sale: None,
                status: None,
                attachments: Vec::new(),
                uploads: Vec::new(),
            },
            actor,
        )
        .await?;
    if let Some(error) = &payment.transaction_error {
        warn!(error = %error, "Derived payment was not created");
    }
    info!(
        voucher_number = %payment.voucher.header.voucher_number,
        status = %payment.voucher.status,
        derived = ?payment.derived.as_ref().map(|record| record.payment_id()),
        "Cash payment recorded"
    );
    for journey in backend.ledger_ref().journeys().await {
        info!(refer_code = %journey.refer_code, narrative = %journey.narrative, "Journey entry");
    }

    // Journal: capital injection into the operating account.
    let entries = vec![
        EntryInput {
            account: operating.id.into_inner(),
            account_model: "bankaccount".into(),
            account_name: None,
            debit: Decimal::from(5000),
            credit: Decimal::ZERO,
            description: Some("Capital injection".into()),
        },
        EntryInput {
            account: capital.id,
            account_model: "capital".into(),
            account_name: None,
            debit: Decimal::ZERO,
            credit: Decimal::from(5000),
            description: None,
        },
    ];
    let journal = services
        .journals
        .create(
            JournalKind::Journal,
            JournalInput {
                entries,
                ..JournalInput::default()
            },
            actor,
        )
        .await?
        .voucher;
    let journal = services.journals.post(journal.header.id, actor).await?;
    info!(
        voucher_number = %journal.header.voucher_number,
        status = %journal.status,
        total_debit = %journal.total_debit,
        "Journal posted"
    );

    // Reconciliation against a statement that matches the books.
    let reconciliation = services
        .reconciliations
        .create(
            ReconciliationInput {
                header: HeaderInput::default(),
                bank_account: operating.id,
                statement_date: Utc::now().date_naive(),
                opening_balance: Decimal::from(900),
                closing_balance: Decimal::from(1145),
                book_balance: Decimal::from(1000),
                statement_balance: None,
                entries: Vec::new(),
                adjustments: Some(Adjustments {
                    outstanding_deposits: Decimal::from(200),
                    outstanding_withdrawals: Decimal::from(50),
                    bank_charges: Decimal::from(10),
                    interest_earned: Decimal::from(5),
                    ..Adjustments::default()
                }),
                attachments: Vec::new(),
                uploads: Vec::new(),
            },
            actor,
        )
        .await?
        .voucher;
    let (reconciliation, result) = services
        .reconciliations
        .reconcile(reconciliation.header.id, actor)
        .await?;
    info!(
        voucher_number = %reconciliation.header.voucher_number,
        state = ?result.state,
        difference = %result.difference,
        "Reconciliation finished"
    );

    info!("Seeding complete");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter.as_str()));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
