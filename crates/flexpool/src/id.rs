use core::fmt;

/// Identity of a worker within a single pool.
///
/// Identities are minted by the pool, start at 1 and increase strictly. An
/// identity is never handed out twice, even after its worker was removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(u64);

impl WorkerId {
    /// Wraps a raw identity. Useful for looking up a worker by a number that
    /// came from outside the pool (logs, configuration).
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identity.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<WorkerId> for u64 {
    fn from(id: WorkerId) -> Self {
        id.0
    }
}
