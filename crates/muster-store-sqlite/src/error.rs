//! Error type for `muster-store-sqlite`.

use muster_core::InvalidWorkbook;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] muster_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("personal number {0:?} is already taken")]
  DuplicatePersonalNumber(String),

  #[error("person not found: {0}")]
  PersonNotFound(uuid::Uuid),

  #[error(transparent)]
  InvalidWorkbook(#[from] InvalidWorkbook),
}

impl From<muster_core::ImportError<Error>> for Error {
  fn from(err: muster_core::ImportError<Error>) -> Self {
    match err {
      muster_core::ImportError::Invalid(invalid) => Error::InvalidWorkbook(invalid),
      muster_core::ImportError::Store(err) => err,
    }
  }
}

impl Error {
  /// Failures of the database itself, as opposed to a rejected value.
  ///
  /// Constraint, type and size violations are attributed to the data being
  /// written; every other SQLite failure means the store is unusable.
  pub fn is_infrastructure(&self) -> bool {
    use rusqlite::ErrorCode;
    match self {
      Error::Database(_) => true,
      Error::Sqlite(rusqlite::Error::SqliteFailure(e, _)) => !matches!(
        e.code,
        ErrorCode::ConstraintViolation | ErrorCode::TypeMismatch | ErrorCode::TooBig
      ),
      _ => false,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
