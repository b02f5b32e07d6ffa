// dealdrop-api: Async Rust clients for the deals marketplace backend,
// Paystack, and Resend.

pub mod auth;
pub mod client;
pub mod commerce;
pub mod comments;
pub mod deals;
pub mod error;
pub mod models;
pub mod paystack;
pub mod resend;
pub mod transport;
pub mod vendors;

pub use client::{IDEMPOTENCY_HEADER, MarketClient};
pub use error::Error;
pub use paystack::{PaystackClient, TransactionStatus};
pub use resend::{Email, ResendClient};
pub use transport::{TlsMode, TransportConfig};
