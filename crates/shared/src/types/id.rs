//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `SupplierId` where a `VoucherId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a user (voucher creator or approver).");
typed_id!(VoucherId, "Unique identifier for a voucher of any variant.");
typed_id!(BankAccountId, "Unique identifier for a bank account.");
typed_id!(SupplierId, "Unique identifier for a supplier.");
typed_id!(CustomerId, "Unique identifier for a customer.");
typed_id!(PurchaseId, "Unique identifier for a purchase document.");
typed_id!(SaleId, "Unique identifier for a sale document.");
typed_id!(PaymentId, "Unique identifier for a derived payment record.");
typed_id!(JourneyId, "Unique identifier for a balance journey entry.");
typed_id!(AttachmentId, "Unique identifier for a stored attachment.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_id_creation() {
        let id = VoucherId::new();
        assert!(!id.to_string().is_empty());
    }

    #[test]
    fn test_typed_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = SupplierId::from_uuid(uuid);
        assert_eq!(id.into_inner(), uuid);
        assert_eq!(SupplierId::from(uuid), id);
    }

    #[test]
    fn test_typed_id_is_time_ordered() {
        let first = VoucherId::new();
        let second = VoucherId::new();
        assert!(first <= second);
    }

    #[test]
    fn test_typed_id_from_str() {
        let uuid = Uuid::new_v4();
        let id = BankAccountId::from_str(&uuid.to_string()).unwrap();
        assert_eq!(id.into_inner(), uuid);
        assert!(BankAccountId::from_str("invalid").is_err());
    }

    #[test]
    fn test_typed_id_serde_transparent() {
        let uuid = Uuid::new_v4();
        let json = serde_json::to_string(&UserId::from_uuid(uuid)).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }
}
