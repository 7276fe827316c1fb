use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        LmdbError::Heed(e.to_string())
    }
}

impl From<LmdbError> for vestlock_store::StoreError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::InvalidKey(key) => vestlock_store::StoreError::Corruption(key),
            other => vestlock_store::StoreError::Backend(other.to_string()),
        }
    }
}
