// ── Vendor domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::VendorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum VendorStatus {
    #[default]
    Pending,
    Active,
    Suspended,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: VendorId,
    pub business_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub status: VendorStatus,
    pub plan_id: Option<String>,
}

/// Subscription plan a vendor pays for before listing deals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorPlan {
    pub id: String,
    pub name: String,
    /// Price in major currency units.
    pub price: f64,
    pub duration_days: Option<u32>,
    pub max_deals: Option<u32>,
    pub features: Vec<String>,
}

/// Steps of the multi-page vendor registration form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum OnboardingStep {
    #[default]
    BusinessInfo,
    Contact,
    Documents,
    Plan,
    Payment,
}

impl OnboardingStep {
    /// The step after this one; `Payment` is terminal.
    pub fn next(self) -> Self {
        match self {
            Self::BusinessInfo => Self::Contact,
            Self::Contact => Self::Documents,
            Self::Documents => Self::Plan,
            Self::Plan | Self::Payment => Self::Payment,
        }
    }
}

/// A document staged locally until the vendor application is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedUpload {
    pub file_name: String,
    pub content_type: String,
    /// Base64-encoded contents.
    pub data: String,
}

/// In-progress vendor application, persisted between CLI invocations.
///
/// Replaces the `vendorData` and `vendorUploads` local-storage keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorDraft {
    pub step: OnboardingStep,
    pub business_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub plan_id: Option<String>,
    #[serde(default)]
    pub uploads: Vec<StagedUpload>,
}

impl VendorDraft {
    /// Fields still required before the application can be paid for.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.business_name.as_deref().is_none_or(str::is_empty) {
            missing.push("business_name");
        }
        if self.email.as_deref().is_none_or(str::is_empty) {
            missing.push("email");
        }
        if self.plan_id.is_none() {
            missing.push("plan_id");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onboarding_steps_advance_and_stop() {
        let mut step = OnboardingStep::default();
        for _ in 0..10 {
            step = step.next();
        }
        assert_eq!(step, OnboardingStep::Payment);
        assert_eq!(OnboardingStep::BusinessInfo.next(), OnboardingStep::Contact);
    }

    #[test]
    fn draft_reports_missing_fields() {
        let mut draft = VendorDraft::default();
        assert_eq!(draft.missing_fields(), vec!["business_name", "email", "plan_id"]);
        draft.business_name = Some("Acme".into());
        draft.email = Some("acme@example.com".into());
        draft.plan_id = Some("basic".into());
        assert!(draft.is_complete());
    }
}
