use super::{
    contest::{Contest, ContestHeader},
    round::Round,
};

/// Everything a client needs to catch up from a given version vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncDiff {
    pub header: ContestHeader,
    /// Versions of every round at the time of the diff.
    pub versions: Vec<u64>,
    /// Full snapshots of the rounds that changed, ascending by number.
    pub rounds: Vec<Round>,
}

impl Contest {
    /// Snapshot every round newer than the caller's `known` versions.
    ///
    /// `known[i]` is the version the caller holds for round `i + 1`; missing
    /// entries count as 0 and extra entries are ignored.
    pub fn changed_rounds(&self, known: &[u64]) -> Vec<Round> {
        self.rounds()
            .iter()
            .enumerate()
            .filter(|(index, round)| round.version() > known.get(*index).copied().unwrap_or(0))
            .map(|(_, round)| round.clone())
            .collect()
    }

    /// Changed rounds plus the header and version vector they were read with.
    pub fn diff(&self, known: &[u64]) -> SyncDiff {
        SyncDiff {
            header: self.header(),
            versions: self.versions(),
            rounds: self.changed_rounds(known),
        }
    }
}
