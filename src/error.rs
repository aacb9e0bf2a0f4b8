use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("command {index} has indent {indent} but follows indent {previous}")]
  MalformedIndent {
    index: usize,
    indent: usize,
    previous: usize,
  },
  #[error("no label named '{0}'")]
  UnknownLabel(String),
  #[error("invalid params for {command}: {source}")]
  InvalidParams {
    command: String,
    source: serde_json::Error,
  },
  #[error("script error: {0}")]
  Script(String),
  #[error("division by zero")]
  DivisionByZero,
  #[error("calls nested deeper than {0} levels")]
  CallDepth(usize),
  #[error("slot {0} is out of range")]
  SlotOutOfRange(usize),
  #[error("no scene with uid '{0}'")]
  MissingScene(String),
  #[error("project has no scenes")]
  EmptyProject,
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
