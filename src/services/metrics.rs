use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_int_counter, CounterVec, IntCounter};

lazy_static! {
    pub static ref REGISTRATIONS_COUNTER: CounterVec = register_counter_vec!(
        "api_parent_registrations_total",
        "Parent registrations by outcome",
        &["status"]
    ).unwrap();

    pub static ref LOGINS_COUNTER: CounterVec = register_counter_vec!(
        "api_logins_total",
        "Parent login attempts by outcome",
        &["status"]
    ).unwrap();

    pub static ref PASSWORD_RESETS_COUNTER: CounterVec = register_counter_vec!(
        "api_password_resets_total",
        "Password reset lifecycle events (requested, email_failed, completed)",
        &["stage"]
    ).unwrap();

    pub static ref FEELING_LOGS_COUNTER: IntCounter = register_int_counter!(
        "api_feeling_logs_total",
        "Feeling logs recorded"
    ).unwrap();
}

/// Label for an operation outcome: "ok", or the error kind in snake case.
pub fn outcome<T>(result: &crate::error::ApiResult<T>) -> &'static str {
    use crate::error::ApiError;
    match result {
        Ok(_) => "ok",
        Err(ApiError::UsernameTaken) => "username_taken",
        Err(ApiError::EmailTaken) => "email_taken",
        Err(ApiError::ParentNotFound | ApiError::UnknownUsername) => "not_found",
        Err(ApiError::IncorrectPassword) => "incorrect_password",
        Err(_) => "error",
    }
}
