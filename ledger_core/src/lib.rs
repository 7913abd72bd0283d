//! Credit/listen ledger: atomic balance metering, play-session
//! de-duplication and idempotent payment top-ups.

mod error;
mod session;

pub mod ledger;
pub mod payment;
pub mod store;

pub use error::LedgerError;
pub use ledger::{Ledger, TopUpKind};
pub use payment::{
    verify_webhook, CheckoutSession, CompletedCheckout, PaymentMetadata, PaymentProvider,
    SessionStatus, StripePayment,
};
pub use store::{JewelAccount, LedgerStore, MemoryLedger, Recording};
