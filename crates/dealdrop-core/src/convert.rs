// ── API-to-domain type conversions ──
//
// Bridges raw `dealdrop_api` wire types into canonical `dealdrop_core::model`
// types. Status strings are parsed into enums (unknown values fall back to
// the enum default) and nested comment replies are flattened.

use secrecy::SecretString;

use dealdrop_api::models::{
    ApiComment, ApiCoupon, ApiDeal, ApiGroupDeal, ApiOrder, ApiSlot, ApiVendor, AuthSession,
    VendorPlan as ApiVendorPlan,
};

use crate::model::{
    Comment, CommentId, Coupon, Deal, DealId, DealStatus, GroupDeal, Order, Role, Session, Slot,
    UserId, Vendor, VendorId, VendorPlan, VendorStatus,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse an optional status string, falling back to the default variant.
fn parse_or_default<T: std::str::FromStr + Default>(raw: Option<&str>) -> T {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or_default()
}

// ── Deal ───────────────────────────────────────────────────────────

impl From<ApiDeal> for Deal {
    fn from(d: ApiDeal) -> Self {
        Deal {
            id: DealId::from(d.id),
            title: d.title,
            description: d.description,
            category: d.category.filter(|c| !c.is_empty()),
            original_price: d.original_price,
            discounted_price: d.discounted_price,
            discount_percentage: d.discount_percentage,
            images: d.images,
            created_at: d.created_at,
            expires_at: d.expires_at,
            brand: d.brand,
            platform: d.platform,
            status: parse_or_default::<DealStatus>(d.status.as_deref()),
            likes: d.likes.into_iter().map(UserId::from).collect(),
            vendor_id: d.vendor.map(VendorId::from),
        }
    }
}

impl From<ApiCoupon> for Coupon {
    fn from(c: ApiCoupon) -> Self {
        Coupon {
            id: c.id,
            code: c.code,
            description: c.description,
            deal_id: c.deal_id.map(DealId::from),
            discount_percentage: c.discount_percentage,
            expires_at: c.expires_at,
        }
    }
}

// ── Identity ───────────────────────────────────────────────────────

impl From<AuthSession> for Session {
    fn from(s: AuthSession) -> Self {
        Session {
            user_id: UserId::from(s.user.id),
            email: s.user.email,
            name: s.user.name,
            role: parse_or_default::<Role>(s.user.role.as_deref()),
            token: SecretString::from(s.token),
        }
    }
}

// ── Vendors ────────────────────────────────────────────────────────

impl From<ApiVendor> for Vendor {
    fn from(v: ApiVendor) -> Self {
        Vendor {
            id: VendorId::from(v.id),
            business_name: v.business_name,
            email: v.email,
            phone: v.phone,
            category: v.category,
            description: v.description,
            status: parse_or_default::<VendorStatus>(v.status.as_deref()),
            plan_id: v.plan_id,
        }
    }
}

impl From<ApiVendorPlan> for VendorPlan {
    fn from(p: ApiVendorPlan) -> Self {
        VendorPlan {
            id: p.id,
            name: p.name,
            price: p.price.unwrap_or(0.0),
            duration_days: p.duration_days,
            max_deals: p.max_deals,
            features: p.features,
        }
    }
}

// ── Commerce ───────────────────────────────────────────────────────

impl From<ApiOrder> for Order {
    fn from(o: ApiOrder) -> Self {
        Order {
            id: o.id,
            total: o.total,
            payment_reference: o.payment_reference,
        }
    }
}

impl From<ApiSlot> for Slot {
    fn from(s: ApiSlot) -> Self {
        Slot {
            user_id: UserId::from(s.user_id),
            payment_reference: s.payment_reference,
            reserved_at: s.reserved_at,
        }
    }
}

impl From<ApiGroupDeal> for GroupDeal {
    fn from(g: ApiGroupDeal) -> Self {
        GroupDeal {
            deal_id: DealId::from(g.deal_id),
            total_slots: g.total_slots,
            slot_price: g.price,
            slots: g.slots.into_iter().map(Slot::from).collect(),
        }
    }
}

// ── Comments ───────────────────────────────────────────────────────

/// Flatten a comment listing that may mix `parentId` links and embedded
/// `replies`. Embedded replies inherit their container as parent when
/// they carry no explicit one.
pub(crate) fn flatten_comments(raw: Vec<ApiComment>) -> Vec<Comment> {
    let mut out = Vec::new();
    let mut stack: Vec<(ApiComment, Option<CommentId>)> =
        raw.into_iter().rev().map(|c| (c, None)).collect();

    while let Some((mut api, inherited)) = stack.pop() {
        let replies = std::mem::take(&mut api.replies);
        let comment = comment_from_api(api, inherited);
        let id = comment.id.clone();
        out.push(comment);
        stack.extend(replies.into_iter().rev().map(|r| (r, Some(id.clone()))));
    }
    out
}

pub(crate) fn comment_from_api(c: ApiComment, inherited: Option<CommentId>) -> Comment {
    Comment {
        id: CommentId::from(c.id),
        parent_id: c.parent_id.map(CommentId::from).or(inherited),
        author_id: c.author_id.map(UserId::from),
        author_name: c.author_name,
        body: c.body,
        created_at: c.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_comment(id: &str, replies: Vec<ApiComment>) -> ApiComment {
        ApiComment {
            id: id.into(),
            parent_id: None,
            author_id: None,
            author_name: None,
            body: format!("body {id}"),
            created_at: None,
            replies,
        }
    }

    #[test]
    fn nested_replies_are_flattened_in_thread_order() {
        let raw = vec![
            api_comment("a", vec![api_comment("a1", vec![api_comment("a1x", vec![])])]),
            api_comment("b", vec![]),
        ];
        let flat = flatten_comments(raw);
        let ids: Vec<&str> = flat.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a1", "a1x", "b"]);
        assert_eq!(flat[1].parent_id, Some(CommentId::new("a")));
        assert_eq!(flat[2].parent_id, Some(CommentId::new("a1")));
        assert_eq!(flat[3].parent_id, None);
    }

    #[test]
    fn unknown_status_falls_back_to_pending() {
        let api: ApiDeal = serde_json::from_value(serde_json::json!({
            "_id": "d1",
            "title": "Shoes",
            "status": "archived",
            "originalPrice": "100",
            "discountedPrice": 60
        }))
        .expect("deal");
        let deal = Deal::from(api);
        assert_eq!(deal.status, DealStatus::Pending);
        assert_eq!(deal.original_price, Some(100.0));
        assert_eq!(deal.computed_discount(), Some(40.0));
    }
}
