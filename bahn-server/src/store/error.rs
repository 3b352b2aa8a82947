//! Store error types.

/// Errors from the rail data store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Query or connection failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row that does not fit the data model
    #[error("corrupt {table} row: {message}")]
    Corrupt {
        table: &'static str,
        message: String,
    },
}

impl StoreError {
    pub(crate) fn corrupt(table: &'static str, message: impl Into<String>) -> Self {
        StoreError::Corrupt {
            table,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::corrupt("stations", "invalid EVA number: must be positive");
        assert_eq!(
            err.to_string(),
            "corrupt stations row: invalid EVA number: must be positive"
        );

        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(err.to_string().starts_with("database error"));
    }
}
