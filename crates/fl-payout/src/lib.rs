//! Payout trigger for FeedLedger.
//!
//! When a like pushes a post over its popularity line, the trigger builds a
//! payment transaction, signs it with the configured source account and
//! submits it through a [`PaymentGateway`].
//!
//! Two independent policies shape a payout:
//! - [`TriggerPolicy`] decides *whether* a committed like pays out
//! - [`PayoutPlan`] decides *whom* it pays and how many operations are sent
//!
//! Gateways: [`InMemoryPaymentGateway`] for tests and local runs,
//! [`HttpPaymentGateway`] for a JSON HTTP payment API.

pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod policy;
pub mod transaction;
pub mod trigger;

pub use error::{PayoutError, PayoutResult};
pub use gateway::PaymentGateway;
pub use http::{HttpGatewayConfig, HttpPaymentGateway};
pub use memory::InMemoryPaymentGateway;
pub use policy::{PayoutPlan, TriggerPolicy};
pub use transaction::{
    Account, Asset, PaymentOperation, PaymentReceipt, SignedTransaction, Transaction,
};
pub use trigger::{PayoutConfig, PayoutTrigger};
