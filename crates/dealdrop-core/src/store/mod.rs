// ── Client-side state ──
//
// `DealCatalog` caches the fetched deal listing; `ClientStore` owns the
// persisted client document.

mod catalog;
mod client_store;
mod persist;
mod state;

pub(crate) use catalog::DealCatalog;
pub use catalog::DealSnapshot;
pub use client_store::ClientStore;
pub use state::{ClientState, STATE_VERSION, STORAGE_QUOTA_BYTES};
