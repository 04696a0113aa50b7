use bcrypt::BcryptError;

/// Work factor used for every stored credential.
pub const BCRYPT_COST: u32 = 10;

/// Salted one-way hashing for parent passwords. Plaintext is never stored or logged.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: BCRYPT_COST }
    }
}

impl PasswordHasher {
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, BcryptError> {
        bcrypt::hash(plaintext, self.cost)
    }

    /// Errors only when `hash` is not a bcrypt hash; a wrong password is `Ok(false)`.
    pub fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, BcryptError> {
        bcrypt::verify(plaintext, hash)
    }
}
