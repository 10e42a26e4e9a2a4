use crate::id::PosetHandle;

/// Why a poset operation did not apply.
///
/// Every variant but [`PosetError::InvariantViolated`] is an ordinary
/// rejection: the caller asked for something the current state does not
/// allow, and nothing was changed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PosetError {
    #[error("poset {0} does not exist")]
    PosetNotFound(PosetHandle),

    #[error("invalid element name")]
    InvalidName,

    #[error("element {0:?} already exists")]
    ElementExists(String),

    #[error("element {0:?} does not exist")]
    ElementNotFound(String),

    /// Adding the pair would be redundant (`a <= b` already holds) or would
    /// close a cycle (`b <= a` holds).
    #[error("elements {0:?} and {1:?} are already comparable")]
    AlreadyComparable(String, String),

    #[error("element {0:?} is always related to itself")]
    Reflexive(String),

    #[error("relation ({0:?}, {1:?}) does not exist")]
    RelationNotFound(String, String),

    /// The pair would still follow by transitivity through `via`.
    #[error("relation ({lesser:?}, {greater:?}) is implied through {via:?}")]
    Deducible {
        lesser: String,
        greater: String,
        via: String,
    },

    #[error("internal invariant violated: {0}")]
    InvariantViolated(String),
}

impl PosetError {
    /// `false` only for internal-consistency failures.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        !matches!(self, PosetError::InvariantViolated(_))
    }
}
