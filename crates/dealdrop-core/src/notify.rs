// ── Moderation notifications ──
//
// Transactional emails sent after moderation actions. Delivery is best
// effort: failures are logged and never propagate to the caller.

use dealdrop_api::{Email, ResendClient};
use tracing::{debug, warn};

/// What happened, with the details the email needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    DealApproved {
        title: String,
    },
    DealRejected {
        title: String,
        reason: Option<String>,
    },
    VendorSuspended {
        business_name: String,
        reason: Option<String>,
    },
    VendorReinstated {
        business_name: String,
    },
}

impl Notice {
    pub fn subject(&self) -> String {
        match self {
            Self::DealApproved { title } => format!("Your deal \"{title}\" is live"),
            Self::DealRejected { title, .. } => format!("Your deal \"{title}\" was not approved"),
            Self::VendorSuspended { .. } => "Your vendor account has been suspended".into(),
            Self::VendorReinstated { .. } => "Your vendor account is active again".into(),
        }
    }

    pub fn html(&self) -> String {
        let (lead, reason) = match self {
            Self::DealApproved { title } => (
                format!(
                    "Good news! Your deal <strong>{}</strong> has been approved and is now visible to shoppers.",
                    escape_html(title)
                ),
                None,
            ),
            Self::DealRejected { title, reason } => (
                format!(
                    "Your deal <strong>{}</strong> was reviewed and could not be approved.",
                    escape_html(title)
                ),
                reason.as_deref(),
            ),
            Self::VendorSuspended {
                business_name,
                reason,
            } => (
                format!(
                    "The vendor account for <strong>{}</strong> has been suspended.",
                    escape_html(business_name)
                ),
                reason.as_deref(),
            ),
            Self::VendorReinstated { business_name } => (
                format!(
                    "The vendor account for <strong>{}</strong> has been reinstated.",
                    escape_html(business_name)
                ),
                None,
            ),
        };

        let mut html = format!("<p>{lead}</p>");
        if let Some(reason) = reason.filter(|r| !r.trim().is_empty()) {
            html.push_str(&format!("<p>Reason: {}</p>", escape_html(reason)));
        }
        html
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Sends notices through Resend when configured; otherwise a no-op.
pub(crate) struct Notifier {
    client: Option<ResendClient>,
    from: String,
}

impl Notifier {
    pub(crate) fn new(client: Option<ResendClient>, from: String) -> Self {
        Self { client, from }
    }

    pub(crate) fn disabled() -> Self {
        Self::new(None, String::new())
    }

    /// Send a notice. Returns the provider message id when delivered.
    pub(crate) async fn send(&self, to: &str, notice: &Notice) -> Option<String> {
        let Some(client) = &self.client else {
            debug!(to, "email not configured, skipping notice");
            return None;
        };

        let email = Email {
            from: self.from.clone(),
            to: vec![to.to_owned()],
            subject: notice.subject(),
            html: notice.html(),
        };

        match client.send(&email).await {
            Ok(id) => {
                debug!(to, id = %id, "notice delivered");
                Some(id)
            }
            Err(e) => {
                warn!(to, error = %e, "failed to send moderation email");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_is_escaped_and_optional() {
        let notice = Notice::DealRejected {
            title: "Cheap <TVs>".into(),
            reason: Some("Images & prices don't match".into()),
        };
        let html = notice.html();
        assert!(html.contains("Cheap &lt;TVs&gt;"));
        assert!(html.contains("Images &amp; prices don&#39;t match"));

        let approved = Notice::DealApproved {
            title: "Shoes".into(),
        };
        assert!(!approved.html().contains("Reason"));
        assert_eq!(approved.subject(), "Your deal \"Shoes\" is live");
    }
}
