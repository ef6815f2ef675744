use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("no candidate endpoints to select from")]
    EmptyCandidates,

    #[error("hash.nodes must be a positive multiple of 4, got `{0}`")]
    MisconfiguredHashNodes(i64),
}
