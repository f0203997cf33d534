use sea_orm::DbErr;

/// Gateway failures are always real database errors: absence of a row
/// is reported by the DAO as `Ok(None)`/`Ok(false)`, never as an error.
#[derive(Debug, thiserror::Error)]
pub enum DaoLayerError {
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

pub type DaoResult<T> = Result<T, DaoLayerError>;
