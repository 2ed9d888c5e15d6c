use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The identity string was absent, as opposed to present and empty.
    #[error("missing external identity")]
    MissingInput,

    #[error("malformed identifier: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("plan has {0} conflicting rows, refusing to apply")]
    Conflicts(usize),

    #[error("stale plan: row {0} changed since planning")]
    Stale(String),
}
