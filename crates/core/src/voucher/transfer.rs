//! Bank account transfer voucher.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallybook_shared::error::FieldError;
use tallybook_shared::types::BankAccountId;

use super::header::VoucherHeader;
use super::{Voucher, VoucherKind};
use crate::workflow::{TransferStatus, WorkflowEvent};

/// How the funds are moved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMethod {
    /// Internal bank transfer.
    #[default]
    BankTransfer,
    /// Wire transfer.
    Wire,
    /// Cheque.
    Cheque,
    /// Online banking.
    Online,
    /// Anything else.
    Other,
}

/// Record of the last failed execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetails {
    /// Reported reason.
    pub reason: String,
    /// Time of the last failure.
    pub failed_at: DateTime<Utc>,
    /// Number of failures recorded so far.
    pub retry_attempts: u32,
}

/// Transfer of funds between two bank accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTransferVoucher {
    /// Shared attributes.
    pub header: VoucherHeader,
    /// Workflow status.
    pub status: TransferStatus,
    /// Source account.
    pub from_bank_account: BankAccountId,
    /// Destination account, never equal to the source.
    pub to_bank_account: BankAccountId,
    /// Transferred amount.
    pub amount: Decimal,
    /// Bank fee.
    pub transfer_fee: Decimal,
    /// `amount + transfer_fee`.
    pub total_amount: Decimal,
    /// Transfer method.
    pub transfer_method: TransferMethod,
    /// First approval time.
    pub initiated_at: Option<DateTime<Utc>>,
    /// Completion time.
    pub completed_at: Option<DateTime<Utc>>,
    /// Last failure, if any.
    pub failure_details: Option<FailureDetails>,
}

impl BankTransferVoucher {
    /// Sets amount and fee and recomputes the total.
    pub fn set_amounts(&mut self, amount: Decimal, transfer_fee: Decimal) {
        self.amount = amount;
        self.transfer_fee = transfer_fee;
        self.total_amount = amount + transfer_fee;
    }

    /// Checks the transfer-specific field rules.
    pub fn validate_fields(
        from: BankAccountId,
        to: BankAccountId,
        amount: Decimal,
        transfer_fee: Decimal,
        problems: &mut Vec<FieldError>,
    ) {
        if from == to {
            problems.push(FieldError::new(
                "to_bank_account",
                "From and to bank accounts cannot be the same",
            ));
        }
        if amount <= Decimal::ZERO {
            problems.push(FieldError::new("amount", "must be greater than zero"));
        }
        if transfer_fee < Decimal::ZERO {
            problems.push(FieldError::new("transfer_fee", "must not be negative"));
        }
    }
}

impl Voucher for BankTransferVoucher {
    type Status = TransferStatus;

    fn kind(&self) -> VoucherKind {
        VoucherKind::BankTransfer
    }

    fn header(&self) -> &VoucherHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut VoucherHeader {
        &mut self.header
    }

    fn status(&self) -> TransferStatus {
        self.status
    }

    fn set_status(&mut self, status: TransferStatus) {
        self.status = status;
    }

    fn bank_account(&self) -> Option<BankAccountId> {
        Some(self.from_bank_account)
    }

    fn on_event(&mut self, event: &WorkflowEvent<TransferStatus>) {
        match event {
            WorkflowEvent::Approved { stamp, .. } => {
                self.initiated_at.get_or_insert(stamp.at);
            }
            WorkflowEvent::Completed { stamp, .. } => {
                self.initiated_at.get_or_insert(stamp.at);
                self.completed_at = Some(stamp.at);
            }
            WorkflowEvent::Failed { stamp, reason, .. } => {
                let retry_attempts = self
                    .failure_details
                    .as_ref()
                    .map_or(0, |details| details.retry_attempts)
                    + 1;
                self.failure_details = Some(FailureDetails {
                    reason: reason.clone(),
                    failed_at: stamp.at,
                    retry_attempts,
                });
            }
            WorkflowEvent::Rejected { .. } | WorkflowEvent::Cancelled { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{Stamp, WorkflowService};
    use rust_decimal_macros::dec;
    use tallybook_shared::types::{CurrencyCode, UserId};

    fn transfer() -> BankTransferVoucher {
        let mut voucher = BankTransferVoucher {
            header: VoucherHeader::new(UserId::new(), Utc::now(), CurrencyCode::default(), dec!(1)),
            status: TransferStatus::Draft,
            from_bank_account: BankAccountId::new(),
            to_bank_account: BankAccountId::new(),
            amount: Decimal::ZERO,
            transfer_fee: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            transfer_method: TransferMethod::default(),
            initiated_at: None,
            completed_at: None,
            failure_details: None,
        };
        voucher.set_amounts(dec!(1000), dec!(2.50));
        voucher
    }

    #[test]
    fn test_total_is_recomputed() {
        let mut voucher = transfer();
        assert_eq!(voucher.total_amount, dec!(1002.50));
        voucher.set_amounts(dec!(10), dec!(0));
        assert_eq!(voucher.total_amount, dec!(10));
    }

    #[test]
    fn test_same_accounts_rejected() {
        let account = BankAccountId::new();
        let mut problems = Vec::new();
        BankTransferVoucher::validate_fields(account, account, dec!(5), dec!(0), &mut problems);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].message.contains("cannot be the same"));
    }

    #[test]
    fn test_failures_count_retries() {
        let mut voucher = transfer();
        for expected in 1..=2 {
            let event = WorkflowService::fail(
                voucher.status,
                Stamp::now(UserId::new()),
                "insufficient funds".into(),
            )
            .unwrap();
            voucher.apply(&event);
            assert_eq!(voucher.status, TransferStatus::Failed);
            assert_eq!(
                voucher.failure_details.as_ref().map(|d| d.retry_attempts),
                Some(expected)
            );
        }

        let event = WorkflowService::complete(voucher.status, Stamp::now(UserId::new())).unwrap();
        voucher.apply(&event);
        assert_eq!(voucher.status, TransferStatus::Completed);
        assert!(voucher.completed_at.is_some());
        assert!(voucher.header.completion.is_some());
    }
}
