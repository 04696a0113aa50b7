pub mod accounts;
pub mod email;
pub mod feelings;
pub mod linkage;
pub mod metrics;
pub mod notifier;
pub mod password;
pub mod password_reset;

use std::sync::Arc;

use crate::db::Store;
use notifier::Notifier;
use password::PasswordHasher;

/// Produces a candidate password-reset code.
pub type CodeSource = Arc<dyn Fn() -> String + Send + Sync>;

/// One method per query/mutation of the API. Holds the request-independent collaborators:
/// the store (wrapping the shared pool), the reset-code notifier, the password hasher and
/// the reset-code generator.
#[derive(Clone)]
pub struct FbiService {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    hasher: PasswordHasher,
    codes: CodeSource,
}

impl FbiService {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            hasher: PasswordHasher::default(),
            codes: Arc::new(password_reset::generate_reset_code),
        }
    }

    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_code_source(mut self, codes: CodeSource) -> Self {
        self.codes = codes;
        self
    }
}

/// Ids travel as strings and are stored as integers.
pub(crate) fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

/// Optional string arguments: an empty string counts as absent.
pub(crate) fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.is_empty())
}
