//! Error types for `muster-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown rank: {0:?}")]
  UnknownRank(String),

  #[error("unknown status: {0:?}")]
  UnknownStatus(String),

  #[error("unknown movement kind: {0:?}")]
  UnknownMovementKind(String),

  #[error("unknown fitness category: {0:?}")]
  UnknownFitnessCategory(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
