#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Daily draw exhausted after {attempts} attempts with only {found} distinct values")]
    DrawExhausted { attempts: u32, found: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}
