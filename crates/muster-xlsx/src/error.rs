//! Error types for the muster-xlsx codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot open workbook: {0}")]
  Open(#[source] calamine::Error),

  #[error("cannot read sheet {sheet:?}: {source}")]
  Sheet {
    sheet:  String,
    #[source]
    source: calamine::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
