// ── Domain model ──
//
// Canonical types consumed by the CLI. Built from backend wire types in
// `convert.rs`; never deserialized from the network directly.

mod comment;
mod commerce;
mod deal;
mod session;
mod vendor;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use comment::Comment;
pub use commerce::{CartItem, Coupon, GroupDeal, Order, Slot};
pub use deal::{Deal, DealStatus};
pub use session::{Role, Session};
pub use vendor::{
    OnboardingStep, StagedUpload, Vendor, VendorDraft, VendorPlan, VendorStatus,
};

/// Backend identifiers are opaque strings (Mongo-style object ids).
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_id!(
    /// Deal identifier.
    DealId
);
string_id!(
    /// User identifier.
    UserId
);
string_id!(
    /// Vendor identifier.
    VendorId
);
string_id!(
    /// Comment identifier.
    CommentId
);
