//! Identifier generation: serials, refer codes, voucher numbers.

pub mod counter;
pub mod error;
pub mod prefix;
pub mod service;

#[cfg(test)]
mod format_props;

pub use counter::CounterStore;
pub use error::NumberingError;
pub use prefix::{EntityKind, PrefixTable};
pub use service::{
    DEFAULT_SEQUENCE_WIDTH, IdentifierGenerator, format_sequence, format_voucher_number,
};
