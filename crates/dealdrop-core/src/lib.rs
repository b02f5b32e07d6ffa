// dealdrop-core: Business logic and client state between dealdrop-api and
// the CLI.

pub mod checkout;
pub mod comments;
pub mod config;
pub mod convert;
pub mod engagement;
pub mod error;
pub mod market;
pub mod model;
pub mod notify;
pub mod query;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use checkout::{
    Checkout, CheckoutStage, Purchase, VendorApplication, reference_for, to_minor_units,
};
pub use comments::{CommentTree, ThreadEntry};
pub use config::{
    DEFAULT_CURRENCY, EmailConfig, MarketConfig, PAYSTACK_API_URL, PaymentsConfig, RESEND_API_URL,
    TlsVerification,
};
pub use engagement::{LikeOutcome, SaveState, VoteDirection, VoteOutcome};
pub use error::CoreError;
pub use market::{Market, Moderated};
pub use notify::Notice;
pub use query::{
    DEFAULT_PAGE_SIZE, FilterCriteria, FilterInput, FilterToolbar, Page, Range, SortBy,
};
pub use store::{ClientState, ClientStore};
pub use stream::{Subscription, SubscriptionStream};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    CartItem, Comment, CommentId, Coupon, Deal, DealId, DealStatus, GroupDeal, OnboardingStep,
    Order, Role, Session, Slot, StagedUpload, UserId, Vendor, VendorDraft, VendorId, VendorPlan,
    VendorStatus,
};
