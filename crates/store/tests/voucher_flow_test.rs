//! End-to-end voucher flows over the in-memory backend.
//!
//! Each test seeds a fresh backend and drives the services the way a
//! request handler would.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::too_many_lines)]

mod common;

use chrono::{NaiveDate, TimeDelta};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tallybook_core::reconciliation::{Adjustments, ReconciliationState};
use tallybook_core::repository::VoucherFilter;
use tallybook_core::service::{
    AttachmentChanges, JournalPatch, ReconciliationInput, TransferInput, TransferPatch,
};
use tallybook_core::settlement::{DerivedRecord, SalePaymentStatus};
use tallybook_core::storage::AttachmentUpload;
use tallybook_core::voucher::{
    AccountKind, HeaderInput, JournalKind, Payee, PaymentChannel, VoucherError,
};
use tallybook_core::workflow::{
    JournalStatus, PaymentStatus, ReconcileStatus, TransferStatus,
};
use tallybook_shared::types::{PageRequest, VoucherId};

use common::{Fixture, dated, noon};

fn transfer_input(fx: &Fixture, amount: Decimal) -> TransferInput {
    TransferInput {
        header: dated(noon()),
        from_bank_account: fx.operating.id,
        to_bank_account: fx.savings.id,
        amount,
        transfer_fee: dec!(2.50),
        transfer_method: Default::default(),
        status: None,
        attachments: Vec::new(),
        uploads: Vec::new(),
    }
}

fn reconciliation_input(fx: &Fixture, closing: Decimal) -> ReconciliationInput {
    ReconciliationInput {
        header: dated(noon()),
        bank_account: fx.operating.id,
        statement_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        opening_balance: dec!(900),
        closing_balance: closing,
        book_balance: dec!(1000),
        statement_balance: None,
        entries: Vec::new(),
        adjustments: Some(Adjustments {
            outstanding_deposits: dec!(200),
            outstanding_withdrawals: dec!(50),
            bank_charges: dec!(10),
            interest_earned: dec!(5),
            ..Adjustments::default()
        }),
        attachments: Vec::new(),
        uploads: Vec::new(),
    }
}

fn assert_state_error<T: std::fmt::Debug>(result: Result<T, VoucherError>) {
    match result {
        Err(VoucherError::State { .. }) => {}
        other => panic!("Expected State error, got {other:?}"),
    }
}

// ============================================================================
// Journal vouchers
// ============================================================================

#[tokio::test]
async fn test_unbalanced_journal_reports_both_totals() {
    let fx = Fixture::new();

    let result = fx
        .services
        .journals
        .create(JournalKind::Journal, fx.journal(dec!(5000), dec!(4000)), fx.actor)
        .await;

    let err = result.expect_err("unbalanced journal must be rejected");
    assert!(matches!(err, VoucherError::Validation(_)));
    let message = err.to_string();
    assert!(message.contains("5000"), "missing debit total: {message}");
    assert!(message.contains("4000"), "missing credit total: {message}");
    assert_eq!(fx.backend.counters_ref().current("serial:journal"), 0);
}

#[tokio::test]
async fn test_journal_numbers_follow_the_day() {
    let fx = Fixture::new();

    let mut numbers = Vec::new();
    for _ in 0..3 {
        let outcome = fx
            .services
            .journals
            .create(JournalKind::Journal, fx.journal(dec!(100), dec!(100)), fx.actor)
            .await
            .unwrap();
        numbers.push(outcome.voucher.header.voucher_number);
    }
    assert_eq!(numbers, vec!["JV-250314-0001", "JV-250314-0002", "JV-250314-0003"]);

    let mut next_day = fx.journal(dec!(100), dec!(100));
    next_day.header = dated(noon() + TimeDelta::days(1));
    let outcome = fx
        .services
        .journals
        .create(JournalKind::Journal, next_day, fx.actor)
        .await
        .unwrap();
    assert_eq!(outcome.voucher.header.voucher_number, "JV-250315-0001");
}

#[tokio::test]
async fn test_journal_fills_account_names_and_posts() {
    let fx = Fixture::new();

    let created = fx
        .services
        .journals
        .create(JournalKind::Journal, fx.journal(dec!(250), dec!(250)), fx.actor)
        .await
        .unwrap()
        .voucher;
    assert_eq!(created.status, JournalStatus::Draft);
    assert_eq!(created.entries[0].account_name, "Operating");
    assert_eq!(created.entries[1].account_name, "Owner capital");
    assert!(created.header.transaction_id.starts_with("TXN-JV-250314-"));

    let posted = fx.services.journals.post(created.header.id, fx.actor).await.unwrap();
    assert_eq!(posted.status, JournalStatus::Posted);

    assert_state_error(fx.services.journals.post(created.header.id, fx.actor).await);
    assert_state_error(
        fx.services
            .journals
            .update(created.header.id, JournalPatch::default(), fx.actor)
            .await,
    );
}

#[tokio::test]
async fn test_journal_update_replaces_entries() {
    let fx = Fixture::new();
    let created = fx
        .services
        .journals
        .create(JournalKind::Journal, fx.journal(dec!(100), dec!(100)), fx.actor)
        .await
        .unwrap()
        .voucher;

    let unbalanced = JournalPatch {
        entries: Some(fx.journal(dec!(300), dec!(200)).entries),
        ..JournalPatch::default()
    };
    let err = fx
        .services
        .journals
        .update(created.header.id, unbalanced, fx.actor)
        .await
        .unwrap_err();
    assert!(matches!(err, VoucherError::Validation(_)));

    let balanced = JournalPatch {
        entries: Some(fx.journal(dec!(300), dec!(300)).entries),
        ..JournalPatch::default()
    };
    let updated = fx
        .services
        .journals
        .update(created.header.id, balanced, fx.actor)
        .await
        .unwrap();
    assert_eq!(updated.total_debit, dec!(300));
    assert_eq!(updated.total_credit, dec!(300));
    assert_eq!(updated.header.version, created.header.version + 1);
}

#[tokio::test]
async fn test_opening_balance_accepts_one_sided_entries() {
    let fx = Fixture::new();
    let mut input = fx.journal(dec!(750), Decimal::ZERO);
    input.entries.truncate(1);

    let outcome = fx
        .services
        .journals
        .create(JournalKind::OpeningBalance, input, fx.actor)
        .await
        .unwrap();
    assert!(outcome.voucher.header.voucher_number.starts_with("OBV-250314-"));
    assert_eq!(outcome.voucher.total_debit, dec!(750));
}

#[tokio::test]
async fn test_journal_and_opening_balance_sequences_are_separate() {
    let fx = Fixture::new();
    let journal = fx
        .services
        .journals
        .create(JournalKind::Journal, fx.journal(dec!(100), dec!(100)), fx.actor)
        .await
        .unwrap()
        .voucher;

    let mut input = fx.journal(dec!(750), Decimal::ZERO);
    input.entries.truncate(1);
    let opening = fx
        .services
        .journals
        .create(JournalKind::OpeningBalance, input, fx.actor)
        .await
        .unwrap()
        .voucher;

    assert_eq!(journal.header.voucher_number, "JV-250314-0001");
    assert_eq!(opening.header.voucher_number, "OBV-250314-0001");
}

// ============================================================================
// Bank transfers
// ============================================================================

#[tokio::test]
async fn test_same_account_transfer_consumes_no_numbers() {
    let fx = Fixture::new();
    let mut input = transfer_input(&fx, dec!(1000));
    input.to_bank_account = fx.operating.id;

    let err = fx.services.transfers.create(input, fx.actor).await.unwrap_err();

    match err {
        VoucherError::Validation(problems) => {
            assert!(problems.iter().any(|p| p.message.contains("cannot be the same")));
        }
        other => panic!("Expected Validation error, got {other:?}"),
    }
    assert_eq!(fx.backend.counters_ref().current("serial:bank_transfer"), 0);
}

#[tokio::test]
async fn test_transfer_lifecycle_and_terminal_guard() {
    let fx = Fixture::new();
    let created = fx
        .services
        .transfers
        .create(transfer_input(&fx, dec!(1000)), fx.actor)
        .await
        .unwrap()
        .voucher;
    assert_eq!(created.status, TransferStatus::Draft);
    assert_eq!(created.total_amount, dec!(1002.50));
    assert_eq!(created.header.voucher_number, "BTV-250314-0001");
    let id = created.header.id;

    let approved = fx.services.transfers.approve(id, fx.actor).await.unwrap();
    assert_eq!(approved.status, TransferStatus::Pending);
    assert!(approved.initiated_at.is_some());

    let completed = fx.services.transfers.complete(id, fx.actor).await.unwrap();
    assert_eq!(completed.status, TransferStatus::Completed);
    assert!(completed.completed_at.is_some());

    assert_state_error(fx.services.transfers.approve(id, fx.actor).await);
    assert_state_error(fx.services.transfers.reject(id, fx.actor, None).await);
    assert_state_error(fx.services.transfers.cancel(id, fx.actor, None).await);
    assert_state_error(fx.services.transfers.delete(id, fx.actor).await);
    assert_state_error(
        fx.services
            .transfers
            .update(id, TransferPatch::default(), fx.actor)
            .await,
    );
}

#[tokio::test]
async fn test_failed_transfer_counts_retries() {
    let fx = Fixture::new();
    let id = fx
        .services
        .transfers
        .create(transfer_input(&fx, dec!(50)), fx.actor)
        .await
        .unwrap()
        .voucher
        .header
        .id;

    fx.services.transfers.fail(id, fx.actor, "bank offline").await.unwrap();
    let failed = fx.services.transfers.fail(id, fx.actor, "bank offline").await.unwrap();
    let details = failed.failure_details.unwrap();
    assert_eq!(details.retry_attempts, 2);
    assert_eq!(details.reason, "bank offline");
}

#[tokio::test]
async fn test_unknown_and_inactive_bank_accounts() {
    let fx = Fixture::new();

    let mut input = transfer_input(&fx, dec!(10));
    input.to_bank_account = tallybook_shared::types::BankAccountId::new();
    let err = fx.services.transfers.create(input, fx.actor).await.unwrap_err();
    assert!(matches!(err, VoucherError::NotFound { .. }));

    fx.backend.directory_ref().deactivate_bank_account(fx.savings.id);
    let err = fx
        .services
        .transfers
        .create(transfer_input(&fx, dec!(10)), fx.actor)
        .await
        .unwrap_err();
    assert!(matches!(err, VoucherError::Validation(_)));
}

#[tokio::test]
async fn test_duplicate_transaction_id_conflicts() {
    let fx = Fixture::new();
    let header = HeaderInput {
        transaction_id: Some("EXT-42".into()),
        ..dated(noon())
    };

    let mut first = transfer_input(&fx, dec!(10));
    first.header = header.clone();
    let created = fx.services.transfers.create(first, fx.actor).await.unwrap();
    assert_eq!(created.voucher.header.transaction_id, "EXT-42");

    let mut second = transfer_input(&fx, dec!(20));
    second.header = header;
    let err = fx.services.transfers.create(second, fx.actor).await.unwrap_err();
    assert!(matches!(err, VoucherError::Conflict { field: "transaction_id", .. }));
}

#[tokio::test]
async fn test_soft_deleted_voucher_is_hidden() {
    let fx = Fixture::new();
    let id = fx
        .services
        .transfers
        .create(transfer_input(&fx, dec!(10)), fx.actor)
        .await
        .unwrap()
        .voucher
        .header
        .id;

    let deleted = fx.services.transfers.delete(id, fx.actor).await.unwrap();
    assert!(!deleted.header.is_active);

    let err = fx.services.transfers.get(id).await.unwrap_err();
    assert!(matches!(err, VoucherError::NotFound { .. }));

    let page = fx
        .services
        .transfers
        .list(&VoucherFilter::default(), &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 0);

    let all = VoucherFilter {
        include_inactive: true,
        ..VoucherFilter::default()
    };
    let page = fx
        .services
        .transfers
        .list(&all, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 1);
}

#[tokio::test]
async fn test_missing_voucher_is_not_found() {
    let fx = Fixture::new();
    let err = fx.services.payments.get(VoucherId::new()).await.unwrap_err();
    assert!(matches!(err, VoucherError::NotFound { .. }));
}

// ============================================================================
// Payments and derived records
// ============================================================================

#[tokio::test]
async fn test_cash_payment_to_supplier_settles_on_create() {
    let fx = Fixture::new();
    let mut input = fx.payment(PaymentChannel::Cash, Payee::Supplier(fx.supplier), dec!(500));
    input.related_purchase = Some(fx.purchase.id);

    let outcome = fx.services.payments.create(input, fx.actor).await.unwrap();

    assert!(outcome.transaction_error.is_none());
    assert_eq!(outcome.voucher.status, PaymentStatus::Completed);
    assert_eq!(outcome.voucher.payee_name, "Acme Supplies");
    let Some(DerivedRecord::Supplier { payment, journey }) = outcome.derived else {
        panic!("Expected a supplier payment");
    };
    assert_eq!(payment.record.amount, dec!(500));
    assert_eq!(payment.related_purchase, Some(fx.purchase.id));
    assert_eq!(journey.total_amount, dec!(1500));
    assert_eq!(journey.remaining_balance, dec!(1000));
    assert_eq!(outcome.voucher.related_supplier_payment(), Some(payment.record.id));

    let ledger = fx.backend.ledger_ref();
    assert_eq!(ledger.supplier_payments().await.len(), 1);
    assert_eq!(ledger.journeys().await.len(), 1);
}

#[tokio::test]
async fn test_overpayment_is_recorded_as_advance() {
    let fx = Fixture::new();
    for amount in [dec!(500), dec!(1200)] {
        let mut input = fx.payment(PaymentChannel::Cash, Payee::Supplier(fx.supplier), amount);
        input.related_purchase = Some(fx.purchase.id);
        fx.services.payments.create(input, fx.actor).await.unwrap();
    }

    let journeys = fx.backend.ledger_ref().journeys().await;
    let last = journeys.last().unwrap();
    assert_eq!(last.remaining_balance, dec!(-200));
    assert!(last.narrative.contains("Advanced payment of 200.00"));
}

#[tokio::test]
async fn test_cash_and_bank_payment_sequences_are_separate() {
    let fx = Fixture::new();
    let cash = fx
        .services
        .payments
        .create(
            fx.payment(PaymentChannel::Cash, Payee::Other("Courier".into()), dec!(15)),
            fx.actor,
        )
        .await
        .unwrap()
        .voucher;
    let bank = fx
        .services
        .payments
        .create(
            fx.payment(PaymentChannel::Bank, Payee::Other("Landlord".into()), dec!(900)),
            fx.actor,
        )
        .await
        .unwrap()
        .voucher;

    assert_eq!(cash.header.voucher_number, "CPV-250314-0001");
    assert_eq!(bank.header.voucher_number, "BPV-250314-0001");
}

#[tokio::test]
async fn test_bank_payment_settles_once() {
    let fx = Fixture::new();
    let input = fx.payment(PaymentChannel::Bank, Payee::Supplier(fx.supplier), dec!(300));

    let created = fx.services.payments.create(input, fx.actor).await.unwrap();
    assert_eq!(created.voucher.status, PaymentStatus::Draft);
    assert!(created.derived.is_none());
    let id = created.voucher.header.id;

    let completed = fx.services.payments.complete(id, fx.actor).await.unwrap();
    assert_eq!(completed.voucher.status, PaymentStatus::Completed);
    assert!(completed.derived.is_some());

    assert_state_error(fx.services.payments.complete(id, fx.actor).await);
    let again = fx
        .services
        .payments
        .settle(completed.voucher.clone(), fx.actor)
        .await;
    assert!(again.derived.is_none());
    assert!(again.transaction_error.is_none());

    assert_eq!(fx.backend.ledger_ref().supplier_payments().await.len(), 1);
}

#[tokio::test]
async fn test_customer_payment_updates_sale_status() {
    let fx = Fixture::new();
    let sale = fx.backend.add_sale(fx.customer, dec!(300));
    let mut input = fx.payment(PaymentChannel::Bank, Payee::Customer(fx.customer), dec!(300));
    input.related_sale = Some(sale.id);
    let id = fx
        .services
        .payments
        .create(input, fx.actor)
        .await
        .unwrap()
        .voucher
        .header
        .id;

    let approved = fx.services.payments.approve(id, fx.actor).await.unwrap();

    let Some(DerivedRecord::Customer { sale_status, .. }) = approved.derived else {
        panic!("Expected a customer payment");
    };
    assert_eq!(sale_status, Some(SalePaymentStatus::Paid));
    assert_eq!(
        fx.backend.ledger_ref().sale(sale.id).unwrap().payment_status,
        SalePaymentStatus::Paid
    );
    assert!(approved.voucher.related_payment().is_some());
}

#[tokio::test]
async fn test_financial_payee_gets_financial_payment() {
    let fx = Fixture::new();
    let employee = fx
        .backend
        .directory_ref()
        .add_account_of(AccountKind::Employee, "J. Doe");
    let input = fx.payment(PaymentChannel::Cash, Payee::Financial(employee), dec!(80));

    let outcome = fx.services.payments.create(input, fx.actor).await.unwrap();

    let Some(DerivedRecord::Financial { payment }) = outcome.derived else {
        panic!("Expected a financial payment");
    };
    assert_eq!(payment.category, AccountKind::Employee);
    assert_eq!(payment.account_id, employee.id);
    assert!(fx.backend.ledger_ref().journeys().await.is_empty());
}

#[tokio::test]
async fn test_free_text_payee_derives_nothing() {
    let fx = Fixture::new();
    let input = fx.payment(PaymentChannel::Cash, Payee::Other("  Window cleaner ".into()), dec!(40));

    let outcome = fx.services.payments.create(input, fx.actor).await.unwrap();

    assert_eq!(outcome.voucher.payee_name, "Window cleaner");
    assert!(outcome.derived.is_none());
    assert!(outcome.voucher.derived.is_none());
}

#[tokio::test]
async fn test_unknown_purchase_is_rejected() {
    let fx = Fixture::new();
    let mut input = fx.payment(PaymentChannel::Cash, Payee::Supplier(fx.supplier), dec!(10));
    input.related_purchase = Some(tallybook_shared::types::PurchaseId::new());

    let err = fx.services.payments.create(input, fx.actor).await.unwrap_err();
    assert!(matches!(err, VoucherError::NotFound { .. }));
    assert!(fx.backend.ledger_ref().supplier_payments().await.is_empty());
}

#[tokio::test]
async fn test_payment_attachments_are_uploaded() {
    let fx = Fixture::new();
    let mut input = fx.payment(PaymentChannel::Bank, Payee::Supplier(fx.supplier), dec!(10));
    input.uploads = vec![
        AttachmentUpload::new("receipt.pdf", "application/pdf", b"%PDF-1.7".to_vec()),
        AttachmentUpload::new("run.exe", "application/x-msdownload", b"MZ".to_vec()),
    ];

    let voucher = fx.services.payments.create(input, fx.actor).await.unwrap().voucher;

    assert_eq!(voucher.header.attachments.len(), 1);
    let attachment = &voucher.header.attachments[0];
    assert_eq!(attachment.name, "receipt.pdf");
    assert!(attachment.url.starts_with("memory://vouchers/bank_payment/"));

    let patch = tallybook_core::service::PaymentPatch {
        attachments: AttachmentChanges {
            add: Vec::new(),
            remove: vec![attachment.url.clone()],
        },
        ..Default::default()
    };
    let updated = fx
        .services
        .payments
        .update(voucher.header.id, patch, fx.actor)
        .await
        .unwrap();
    assert!(updated.header.attachments.is_empty());
}

// ============================================================================
// Bank reconciliation
// ============================================================================

#[tokio::test]
async fn test_matching_statement_reconciles_and_completes() {
    let fx = Fixture::new();
    let created = fx
        .services
        .reconciliations
        .create(reconciliation_input(&fx, dec!(1145)), fx.actor)
        .await
        .unwrap()
        .voucher;
    assert_eq!(created.header.voucher_number, "BRV-250314-BA-001-0001");
    assert_eq!(created.reconciliation_status, ReconciliationState::Pending);

    let (voucher, result) = fx
        .services
        .reconciliations
        .reconcile(created.header.id, fx.actor)
        .await
        .unwrap();

    assert_eq!(result.state, ReconciliationState::Reconciled);
    assert_eq!(result.adjusted_balance, dec!(1145));
    assert_eq!(result.difference, Decimal::ZERO);
    assert_eq!(voucher.status, ReconcileStatus::Completed);
    assert!(voucher.reconciled.is_some());

    assert_state_error(
        fx.services
            .reconciliations
            .reconcile(created.header.id, fx.actor)
            .await,
    );
}

#[tokio::test]
async fn test_mismatched_statement_reports_discrepancy() {
    let fx = Fixture::new();
    let id = fx
        .services
        .reconciliations
        .create(reconciliation_input(&fx, dec!(1200)), fx.actor)
        .await
        .unwrap()
        .voucher
        .header
        .id;

    let (voucher, result) = fx.services.reconciliations.reconcile(id, fx.actor).await.unwrap();

    assert_eq!(result.state, ReconciliationState::Discrepancy);
    assert_eq!(result.difference, dec!(55));
    assert_eq!(voucher.difference, Some(dec!(55)));
    assert_eq!(voucher.status, ReconcileStatus::Draft);
}

#[tokio::test]
async fn test_reconciliation_numbers_are_scoped_per_account() {
    let fx = Fixture::new();
    let first = fx
        .services
        .reconciliations
        .create(reconciliation_input(&fx, dec!(1145)), fx.actor)
        .await
        .unwrap()
        .voucher;

    let mut other = reconciliation_input(&fx, dec!(1145));
    other.bank_account = fx.savings.id;
    let second = fx
        .services
        .reconciliations
        .create(other, fx.actor)
        .await
        .unwrap()
        .voucher;

    assert!(first.header.voucher_number.ends_with("-BA-001-0001"));
    assert!(second.header.voucher_number.ends_with("-BA-002-0001"));
}
