//! # Merchant Identity
//!
//! The merchant account and the explicit session object that replaces the
//! ambient "logged-in user" context.
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Dashboard call ──► MerchantSession ──► require_merchant()             │
//! │                          │                    │                         │
//! │                          │                    ├── Some → &Merchant      │
//! │                          │                    └── None → NotAuthenticated│
//! │                          ▼                                              │
//! │                 passed explicitly to every store mutation               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

/// Path segment under which the public widget is served.
pub const WIDGET_ROUTE: &str = "#/help-button";

/// A merchant account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    /// Opaque merchant id, the key for every stored record.
    pub uid: String,
    pub email: String,
    pub business_name: String,
    /// Public routing key for the widget link.
    pub business_slug: String,
}

impl Merchant {
    /// Shareable widget link for this merchant.
    pub fn widget_url(&self, base_url: &str) -> String {
        widget_url(base_url, &self.business_slug)
    }
}

/// Caller context for dashboard operations.
///
/// Holding this by value (instead of reading a global) keeps the editor
/// and the stores testable in isolation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MerchantSession {
    merchant: Option<Merchant>,
}

impl MerchantSession {
    /// A session with nobody signed in.
    pub fn anonymous() -> Self {
        MerchantSession { merchant: None }
    }

    /// A session bound to `merchant`.
    pub fn authenticated(merchant: Merchant) -> Self {
        MerchantSession {
            merchant: Some(merchant),
        }
    }

    /// The bound merchant, if any.
    pub fn merchant(&self) -> Option<&Merchant> {
        self.merchant.as_ref()
    }

    /// The bound merchant, or `NotAuthenticated`.
    pub fn require_merchant(&self) -> CoreResult<&Merchant> {
        self.merchant.as_ref().ok_or(CoreError::NotAuthenticated)
    }

    pub fn is_authenticated(&self) -> bool {
        self.merchant.is_some()
    }

    /// Drops the bound identity.
    pub fn sign_out(&mut self) {
        self.merchant = None;
    }
}

/// Derives a URL slug from a business name.
///
/// ASCII letters and digits are lowercased; every other run of characters
/// collapses into a single `-`, with none at either end.
///
/// ## Example
/// ```rust
/// use fitbell_core::merchant::slugify;
///
/// assert_eq!(slugify("My Awesome Store"), "my-awesome-store");
/// assert_eq!(slugify("  Shoes & More!! "), "shoes-more");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Builds the shareable widget link for `slug`.
pub fn widget_url(base_url: &str, slug: &str) -> String {
    format!("{}/{}/{}", base_url.trim_end_matches('/'), WIDGET_ROUTE, slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merchant() -> Merchant {
        Merchant {
            uid: "xyz-123".to_string(),
            email: "owner@shop.test".to_string(),
            business_name: "My Awesome Store".to_string(),
            business_slug: "my-awesome-store".to_string(),
        }
    }

    #[test]
    fn test_anonymous_session_is_rejected() {
        let session = MerchantSession::anonymous();
        assert!(matches!(
            session.require_merchant(),
            Err(CoreError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_sign_out_unbinds_merchant() {
        let mut session = MerchantSession::authenticated(merchant());
        assert_eq!(session.require_merchant().unwrap().uid, "xyz-123");

        session.sign_out();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("My Awesome Store"), "my-awesome-store");
        assert_eq!(slugify("--Zapatos--2024--"), "zapatos-2024");
        assert_eq!(slugify("Tienda Ñandú"), "tienda-and");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn test_widget_url() {
        assert_eq!(
            merchant().widget_url("https://shop.test/"),
            "https://shop.test/#/help-button/my-awesome-store"
        );
    }
}
