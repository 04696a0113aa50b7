use async_trait::async_trait;
use tracing::info;

/// Delivers a password-reset code to a parent. An `Err` means the code did not go out.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_reset_code(&self, email: &str, code: &str) -> anyhow::Result<()>;
}

/// Development notifier used when SMTP is not configured: the code goes to the log.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send_reset_code(&self, email: &str, code: &str) -> anyhow::Result<()> {
        info!("========== PASSWORD RESET EMAIL ==========");
        info!("To: {}", email);
        info!("Reset Code: {}", code);
        info!("==========================================");
        Ok(())
    }
}
