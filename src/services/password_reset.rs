//! Password reset by emailed 6-digit code.
//!
//! Per parent row: no token, then issued (code + expiry stored). A later request
//! supersedes the code, and a successful reset consumes it. An expired code stays on
//! the row and keeps answering `TokenExpired` until superseded or consumed.

use chrono::{Duration, Utc};
use rand::Rng;
use tracing::{debug, error, info, warn};

use super::{metrics, non_empty, parse_id, FbiService};
use crate::{
    db::PARENT_RESET_TOKEN_KEY,
    error::{ApiError, ApiResult},
};

pub const RESET_CODE_TTL_MINUTES: i64 = 15;

/// Draws allowed when a code collides with another parent's live code.
pub const MAX_CODE_DRAWS: usize = 5;

pub fn generate_reset_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(100000..=999999);
    code.to_string()
}

impl FbiService {
    /// Issue a reset code for the account behind `email` and send it there.
    ///
    /// With `child_id`, the parent must be linked to that child. If delivery fails the
    /// stored code is kept (and stays redeemable); the caller still gets
    /// `EmailDeliveryFailed`.
    pub async fn request_password_reset(
        &self,
        email: &str,
        child_id: Option<&str>,
    ) -> ApiResult<bool> {
        let Some(parent) = self.store.find_parent_by_email(email).await? else {
            warn!("Password reset requested for an email with no account");
            return Err(ApiError::NoAccountForEmail);
        };

        if let Some(raw) = non_empty(child_id) {
            let linked = match parse_id(raw) {
                Some(child_id) => self.store.link_exists(parent.id, child_id).await?,
                None => false,
            };
            if !linked {
                warn!(
                    "Password reset denied: parent {} is not linked to child {:?}",
                    parent.id, raw
                );
                return Err(ApiError::NotLinkedToChild);
            }
        }

        let code = self.issue_reset_code(parent.id).await?;
        metrics::PASSWORD_RESETS_COUNTER
            .with_label_values(&["requested"])
            .inc();

        if let Err(e) = self.notifier.send_reset_code(&parent.email, &code).await {
            error!("Error sending reset code to parent {}: {:#}", parent.id, e);
            metrics::PASSWORD_RESETS_COUNTER
                .with_label_values(&["email_failed"])
                .inc();
            return Err(ApiError::EmailDeliveryFailed(e.to_string()));
        }

        info!("Password reset code sent for parent {}", parent.id);
        Ok(true)
    }

    async fn issue_reset_code(&self, parent_id: i32) -> ApiResult<String> {
        let expires_at = Utc::now() + Duration::minutes(RESET_CODE_TTL_MINUTES);
        let mut draws = 1;
        loop {
            let code = (self.codes)();
            match self.store.store_reset_token(parent_id, &code, expires_at).await {
                Ok(()) => return Ok(code),
                Err(e) if e.violates_unique(PARENT_RESET_TOKEN_KEY) && draws < MAX_CODE_DRAWS => {
                    debug!("Reset code collided with a live code, drawing again");
                    draws += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Redeem a reset code. The new hash and the cleared token are written together.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> ApiResult<bool> {
        let parent = self
            .store
            .find_parent_by_reset_token(token)
            .await?
            .ok_or(ApiError::InvalidOrExpiredToken)?;

        // Expiry alone does not clear the token.
        let expired = parent
            .reset_token_expiry
            .map_or(true, |expires_at| Utc::now() > expires_at);
        if expired {
            return Err(ApiError::TokenExpired);
        }

        let password_hash = self.hasher.hash(new_password)?;
        if !self
            .store
            .consume_reset_token(parent.id, token, &password_hash)
            .await?
        {
            // Redeemed or superseded between lookup and update.
            return Err(ApiError::InvalidOrExpiredToken);
        }

        metrics::PASSWORD_RESETS_COUNTER
            .with_label_values(&["completed"])
            .inc();
        info!("Password reset successful for parent {}", parent.id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use chrono::{Duration, Utc};

    use super::*;
    use crate::{
        db::StoreError,
        services::{
            test_support::{harness, Harness},
            CodeSource,
        },
    };

    /// Hands out `codes` in order, then a fixed fallback.
    fn scripted(codes: &[&str]) -> CodeSource {
        let queue: VecDeque<String> = codes.iter().map(|c| c.to_string()).collect();
        let queue = Mutex::new(queue);
        Arc::new(move || {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| "999999".to_string())
        })
    }

    async fn register(h: &Harness) -> i32 {
        let parent = h
            .service
            .create_parent("alice", "alice@x.com", "old-password", None)
            .await
            .unwrap();
        parent.id.parse().unwrap()
    }

    #[test]
    fn codes_are_six_decimal_digits() {
        for _ in 0..1000 {
            let code = generate_reset_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            let n: u32 = code.parse().unwrap();
            assert!((100000..=999999).contains(&n));
        }
    }

    #[tokio::test]
    async fn request_stores_code_with_fifteen_minute_expiry_and_sends_it() {
        let h = harness();
        let parent_id = register(&h).await;

        let before = Utc::now();
        assert!(h.service.request_password_reset("alice@x.com", None).await.unwrap());

        let (token, expiry) = h.store.reset_state(parent_id);
        let token = token.expect("token stored");
        let expiry = expiry.expect("expiry stored");
        assert_eq!(h.notifier.last_code(), Some(token.clone()));
        assert_eq!(
            h.notifier.sent.lock().unwrap()[0].0,
            "alice@x.com".to_string()
        );
        assert!(expiry >= before + Duration::minutes(15));
        assert!(expiry <= Utc::now() + Duration::minutes(15));
    }

    #[tokio::test]
    async fn unknown_email_is_reported() {
        let h = harness();
        let err = h
            .service
            .request_password_reset("ghost@x.com", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NoAccountForEmail));
        assert!(h.notifier.last_code().is_none());
    }

    #[tokio::test]
    async fn child_scope_requires_a_link() {
        let h = harness();
        let parent_id = register(&h).await;
        let child = h.service.create_child("sleuth", None).await.unwrap();

        let err = h
            .service
            .request_password_reset("alice@x.com", Some(&child.id))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotLinkedToChild));
        assert_eq!(h.store.reset_state(parent_id), (None, None));

        h.service
            .link_parent_child(&parent_id.to_string(), &child.id)
            .await
            .unwrap();
        assert!(h
            .service
            .request_password_reset("alice@x.com", Some(&child.id))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn delivery_failure_surfaces_but_keeps_the_code() {
        let h = harness();
        let parent_id = register(&h).await;
        h.notifier.fail("Email service unavailable");

        let err = h
            .service
            .request_password_reset("alice@x.com", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::EmailDeliveryFailed(_)));
        assert!(err.to_string().starts_with("Failed to send reset code email"));
        assert!(err.to_string().contains("Email service unavailable"));

        let (token, _) = h.store.reset_state(parent_id);
        let token = token.expect("token kept after failed delivery");
        assert!(h.service.reset_password(&token, "new-password").await.unwrap());
    }

    #[tokio::test]
    async fn valid_code_resets_once() {
        let h = harness();
        let parent_id = register(&h).await;
        h.service.request_password_reset("alice@x.com", None).await.unwrap();
        let code = h.notifier.last_code().unwrap();

        assert!(h.service.reset_password(&code, "new-password").await.unwrap());
        assert_eq!(h.store.reset_state(parent_id), (None, None));

        let err = h.service.reset_password(&code, "again").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidOrExpiredToken));

        assert!(h.service.login_parent("alice", "new-password").await.is_ok());
        let err = h.service.login_parent("alice", "old-password").await.unwrap_err();
        assert!(matches!(err, ApiError::IncorrectPassword));
    }

    #[tokio::test]
    async fn expired_code_fails_and_is_not_cleared() {
        let h = harness();
        let parent_id = register(&h).await;
        h.service.request_password_reset("alice@x.com", None).await.unwrap();
        let code = h.notifier.last_code().unwrap();
        h.store
            .set_reset_expiry(parent_id, Utc::now() - Duration::seconds(1));

        let err = h.service.reset_password(&code, "new-password").await.unwrap_err();
        assert!(matches!(err, ApiError::TokenExpired));

        // Still found on the next attempt, still expired.
        assert_eq!(h.store.reset_state(parent_id).0, Some(code.clone()));
        let err = h.service.reset_password(&code, "new-password").await.unwrap_err();
        assert!(matches!(err, ApiError::TokenExpired));

        assert!(h.service.login_parent("alice", "old-password").await.is_ok());
    }

    #[tokio::test]
    async fn new_request_supersedes_previous_code() {
        let h = harness();
        register(&h).await;

        h.service.request_password_reset("alice@x.com", None).await.unwrap();
        let first = h.notifier.last_code().unwrap();
        loop {
            h.service.request_password_reset("alice@x.com", None).await.unwrap();
            if h.notifier.last_code().unwrap() != first {
                break;
            }
        }
        let second = h.notifier.last_code().unwrap();

        let err = h.service.reset_password(&first, "pw").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidOrExpiredToken));
        assert!(h.service.reset_password(&second, "pw").await.unwrap());
    }

    #[tokio::test]
    async fn unknown_code_is_invalid() {
        let h = harness();
        register(&h).await;
        let err = h.service.reset_password("000000", "pw").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidOrExpiredToken));
        assert_eq!(err.to_string(), "Invalid or expired reset token");
    }

    #[tokio::test]
    async fn colliding_code_is_redrawn() {
        let h = harness();
        let alice = register(&h).await;
        let bob = h
            .service
            .create_parent("bob", "bob@x.com", "pw", None)
            .await
            .unwrap();
        let bob: i32 = bob.id.parse().unwrap();

        h.service
            .clone()
            .with_code_source(scripted(&["111111"]))
            .request_password_reset("alice@x.com", None)
            .await
            .unwrap();

        let service = h
            .service
            .clone()
            .with_code_source(scripted(&["111111", "222222"]));
        assert!(service.request_password_reset("bob@x.com", None).await.unwrap());

        assert_eq!(h.store.reset_state(bob).0.as_deref(), Some("222222"));
        assert_eq!(h.store.reset_state(alice).0.as_deref(), Some("111111"));
        assert_eq!(h.notifier.last_code().as_deref(), Some("222222"));
        assert!(service.reset_password("222222", "bob-new").await.unwrap());
        assert!(service.reset_password("111111", "alice-new").await.unwrap());
    }

    #[tokio::test]
    async fn gives_up_after_repeated_collisions() {
        let h = harness();
        register(&h).await;
        let bob = h
            .service
            .create_parent("bob", "bob@x.com", "pw", None)
            .await
            .unwrap();
        let bob: i32 = bob.id.parse().unwrap();

        h.service
            .clone()
            .with_code_source(scripted(&["111111"]))
            .request_password_reset("alice@x.com", None)
            .await
            .unwrap();

        let draws = Arc::new(AtomicUsize::new(0));
        let counter = draws.clone();
        let service = h.service.clone().with_code_source(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "111111".to_string()
        }));

        let err = service
            .request_password_reset("bob@x.com", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Store(StoreError::UniqueViolation { ref constraint })
                if constraint == PARENT_RESET_TOKEN_KEY
        ));
        assert_eq!(draws.load(Ordering::SeqCst), MAX_CODE_DRAWS);
        assert_eq!(h.notifier.sent.lock().unwrap().len(), 1);
        assert_eq!(h.store.reset_state(bob), (None, None));
    }
}
