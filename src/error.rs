/// Failure modes surfaced by the advisor and its components.
///
/// Deadline expiry and external cancellation are not failures. Both end a
/// search early and are reported on the partial [`crate::search::Report`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested action is illegal in the current table state.
    #[error("illegal action: {0}")]
    BadAction(String),
    /// The table state broke a structural rule and cannot be trusted.
    #[error("corrupt table state: {0}")]
    Invariant(String),
    /// Showdown equities were requested with fewer than two live seats.
    #[error("fewer than two live seats at showdown")]
    TooFewPlayers,
    /// A card string failed to parse or a card appears twice.
    #[error("invalid cards: {0}")]
    InvalidCards(String),
    /// The action log holds no hands matching the query.
    #[error("no matching hands in the log")]
    NoData,
}

impl Error {
    pub fn bad_action(what: impl std::fmt::Display) -> Self {
        Self::BadAction(what.to_string())
    }
    pub fn invariant(what: impl std::fmt::Display) -> Self {
        Self::Invariant(what.to_string())
    }
    pub fn cards(what: impl std::fmt::Display) -> Self {
        Self::InvalidCards(what.to_string())
    }
}
