// Marketplace backend wire types
//
// The backend is a loosely-typed JSON service: prices arrive as numbers or
// strings, ids as `_id` or `id`, user references as bare ids or embedded
// objects. Fields use `#[serde(default)]` and lenient deserializers liberally
// so one odd record never fails a whole listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ── Envelopes ────────────────────────────────────────────────────────

/// List endpoints answer with either a bare array or `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListBody<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListBody<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(v) | Self::Wrapped { data: v } => v,
        }
    }
}

/// Single-object endpoints sometimes wrap the payload in `{ "data": {...} }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ItemBody<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> ItemBody<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Self::Bare(v) | Self::Wrapped { data: v } => v,
        }
    }
}

/// Error body. The backend's only convention is a `message` field.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Deals ────────────────────────────────────────────────────────────

/// Deal record as served by `GET /deals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDeal {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub original_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub discounted_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub discount_percentage: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "user_refs")]
    pub likes: Vec<String>,
    #[serde(default, alias = "vendorId", deserialize_with = "lenient_ref")]
    pub vendor: Option<String>,
    /// Catch-all for fields we don't model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body of `PATCH /deals/{id}/status`.
#[derive(Debug, Clone, Serialize)]
pub struct DealStatusUpdate {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Response of `POST /deals/{id}/like`: the authoritative like list.
#[derive(Debug, Clone, Deserialize)]
pub struct LikeResponse {
    #[serde(default, deserialize_with = "user_refs")]
    pub likes: Vec<String>,
}

/// Response of `POST /deals/{id}/vote`.
#[derive(Debug, Clone, Deserialize)]
pub struct VoteResponse {
    #[serde(default, alias = "votes")]
    pub score: i64,
}

// ── Coupons ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCoupon {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "deal", deserialize_with = "lenient_ref")]
    pub deal_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub discount_percentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub expires_at: Option<DateTime<Utc>>,
}

// ── Users & auth ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUser {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Response of `POST /auth/verify`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: ApiUser,
}

// ── Vendors ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVendor {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(alias = "name")]
    pub business_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "plan", deserialize_with = "lenient_ref")]
    pub plan_id: Option<String>,
}

/// A staged document attached to a vendor application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadPayload {
    pub file_name: String,
    pub content_type: String,
    /// Base64-encoded file contents.
    pub data: String,
}

/// Body of `POST /vendors`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVendor {
    pub business_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub documents: Vec<UploadPayload>,
    pub payment_reference: String,
}

/// Body of `PATCH /vendors/{id}/status`.
#[derive(Debug, Clone, Serialize)]
pub struct VendorStatusUpdate {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorPlan {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    /// Price in major currency units.
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub max_deals: Option<u32>,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Body of `POST /vendor-subscriptions`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    pub vendor_id: String,
    pub plan_id: String,
    pub payment_reference: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSubscription {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default, alias = "vendor", deserialize_with = "lenient_ref")]
    pub vendor_id: Option<String>,
    #[serde(default, alias = "plan", deserialize_with = "lenient_ref")]
    pub plan_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub expires_at: Option<DateTime<Utc>>,
}

// ── Orders & group deals ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub deal_id: String,
    pub quantity: u32,
    pub unit_price: f64,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub payment_reference: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOrder {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total: Option<f64>,
    #[serde(default)]
    pub payment_reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSlot {
    #[serde(alias = "user", deserialize_with = "required_ref")]
    pub user_id: String,
    #[serde(default)]
    pub payment_reference: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub reserved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGroupDeal {
    #[serde(alias = "deal", deserialize_with = "required_ref")]
    pub deal_id: String,
    pub total_slots: u32,
    /// Price of one slot in major currency units.
    #[serde(default, alias = "slotPrice", deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(default)]
    pub slots: Vec<ApiSlot>,
}

/// Body of `POST /group-deals/{id}/slots`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRequest {
    pub user_id: String,
    pub payment_reference: String,
}

// ── Comments ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiComment {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default, alias = "parent", deserialize_with = "lenient_ref")]
    pub parent_id: Option<String>,
    #[serde(default, alias = "author", deserialize_with = "lenient_ref")]
    pub author_id: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default, alias = "content", alias = "text")]
    pub body: String,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub replies: Vec<ApiComment>,
}

/// Body of `POST /deals/{id}/comments`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub author_id: String,
}

// ── Lenient deserializers ────────────────────────────────────────────

/// Accept a JSON number or a numeric string; anything else becomes `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

pub(crate) fn number_from_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Accept an RFC 3339 timestamp; malformed values become `None`.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    })
}

/// A reference is either a bare id string or an embedded object with `_id`/`id`.
fn ref_from_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) => map
            .get("_id")
            .or_else(|| map.get("id"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned),
        _ => None,
    }
}

fn lenient_ref<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(ref_from_value))
}

fn required_ref<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    ref_from_value(&value).ok_or_else(|| serde::de::Error::custom("expected an id or an object with _id"))
}

fn user_refs<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .iter()
        .filter_map(ref_from_value)
        .collect())
}
