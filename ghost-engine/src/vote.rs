//! Plurality vote counting with abstention skip.
//!
//! Used for both the ghosts' start vote and the public lynch vote; the only
//! difference between the two is which ballots are handed in.

use crate::types::{Ballot, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Why a round did not elect anyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoElection {
    /// Enough of the electorate abstained to skip the round.
    Skipped,
    /// Two or more targets share the highest count.
    Tied,
    /// Nobody voted.
    NoVotes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TallyResult {
    Elected(PlayerId),
    NoElection(NoElection),
}

impl TallyResult {
    pub fn elected(&self) -> Option<&PlayerId> {
        match self {
            TallyResult::Elected(id) => Some(id),
            TallyResult::NoElection(_) => None,
        }
    }
}

/// Vote counts for one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    counts: HashMap<PlayerId, usize>,
    abstains: usize,
    electorate: usize,
}

impl Tally {
    pub fn count<'a, I>(ballots: I) -> Self
    where
        I: IntoIterator<Item = &'a Ballot>,
    {
        let mut tally = Tally::default();
        for ballot in ballots {
            tally.electorate += 1;
            match ballot {
                Ballot::Player(id) => *tally.counts.entry(id.clone()).or_insert(0) += 1,
                Ballot::Abstain => tally.abstains += 1,
            }
        }
        tally
    }

    pub fn electorate(&self) -> usize {
        self.electorate
    }

    pub fn abstains(&self) -> usize {
        self.abstains
    }

    pub fn votes_for(&self, id: &PlayerId) -> usize {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// Targets with their counts, highest first; ties ordered by identity.
    pub fn ranking(&self) -> Vec<(PlayerId, usize)> {
        let mut ranking: Vec<_> = self
            .counts
            .iter()
            .map(|(id, count)| (id.clone(), *count))
            .collect();
        ranking.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranking
    }

    /// Abstentions skip the round once they reach half the electorate
    /// (floor). A round with no abstentions is never skipped, so a lone
    /// voter can still elect someone.
    pub fn is_skipped(&self) -> bool {
        self.abstains > 0 && self.abstains >= self.electorate / 2
    }

    pub fn result(&self) -> TallyResult {
        if self.electorate == 0 {
            return TallyResult::NoElection(NoElection::NoVotes);
        }
        if self.is_skipped() {
            return TallyResult::NoElection(NoElection::Skipped);
        }

        let Some(max) = self.counts.values().copied().max() else {
            return TallyResult::NoElection(NoElection::NoVotes);
        };

        let mut leaders = self.counts.iter().filter(|(_, count)| **count == max);
        match (leaders.next(), leaders.next()) {
            (Some((id, _)), None) => TallyResult::Elected(id.clone()),
            _ => TallyResult::NoElection(NoElection::Tied),
        }
    }
}

/// Count `ballots` and resolve the round.
pub fn tally<'a, I>(ballots: I) -> TallyResult
where
    I: IntoIterator<Item = &'a Ballot>,
{
    Tally::count(ballots).result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(name: &str) -> PlayerId {
        PlayerId::new(name).unwrap()
    }

    fn vote(name: &str) -> Ballot {
        Ballot::Player(id(name))
    }

    #[test]
    fn test_unique_plurality_is_elected() {
        let ballots = vec![vote("a"), vote("a"), vote("b")];
        assert_eq!(tally(&ballots), TallyResult::Elected(id("a")));
    }

    #[test]
    fn test_tie_elects_nobody() {
        let ballots = vec![vote("a"), vote("b"), vote("a"), vote("b")];
        assert_eq!(tally(&ballots), TallyResult::NoElection(NoElection::Tied));
    }

    #[test]
    fn test_abstain_threshold_skips() {
        // 2 of 5 abstain: 2 >= 5 / 2
        let ballots = vec![
            Ballot::Abstain,
            Ballot::Abstain,
            vote("a"),
            vote("a"),
            vote("a"),
        ];
        assert_eq!(tally(&ballots), TallyResult::NoElection(NoElection::Skipped));

        // 1 of 5 abstains: below threshold
        let ballots = vec![Ballot::Abstain, vote("a"), vote("a"), vote("b"), vote("c")];
        assert_eq!(tally(&ballots), TallyResult::Elected(id("a")));
    }

    #[test]
    fn test_lone_voter_elects() {
        let ballots = vec![vote("x")];
        assert_eq!(tally(&ballots), TallyResult::Elected(id("x")));

        let ballots = vec![Ballot::Abstain];
        assert_eq!(tally(&ballots), TallyResult::NoElection(NoElection::Skipped));
    }

    #[test]
    fn test_empty_round() {
        let ballots: Vec<Ballot> = Vec::new();
        assert_eq!(tally(&ballots), TallyResult::NoElection(NoElection::NoVotes));
    }

    #[test]
    fn test_ranking_and_counts() {
        let ballots = vec![vote("b"), vote("a"), vote("b"), Ballot::Abstain];
        let counted = Tally::count(&ballots);
        assert_eq!(counted.electorate(), 4);
        assert_eq!(counted.abstains(), 1);
        assert_eq!(counted.votes_for(&id("b")), 2);
        assert_eq!(counted.votes_for(&id("zzz")), 0);
        assert_eq!(counted.ranking(), vec![(id("b"), 2), (id("a"), 1)]);
    }

    fn ballot_strategy() -> impl Strategy<Value = Ballot> {
        prop_oneof![
            Just(Ballot::Abstain),
            (0u8..5).prop_map(|n| Ballot::Player(PlayerId::new(format!("p{}", n)).unwrap())),
        ]
    }

    proptest! {
        #[test]
        fn prop_abstain_threshold_always_skips(
            votes in prop::collection::vec(ballot_strategy(), 1..12),
        ) {
            let counted = Tally::count(&votes);
            if counted.abstains() > 0 && counted.abstains() >= counted.electorate() / 2 {
                prop_assert_eq!(counted.result(), TallyResult::NoElection(NoElection::Skipped));
            }
        }

        #[test]
        fn prop_elected_holds_strict_maximum(
            votes in prop::collection::vec(ballot_strategy(), 1..12),
        ) {
            let counted = Tally::count(&votes);
            if let TallyResult::Elected(winner) = counted.result() {
                let top = counted.votes_for(&winner);
                for (other, count) in counted.ranking() {
                    if other != winner {
                        prop_assert!(count < top);
                    }
                }
            }
        }

        #[test]
        fn prop_exact_tie_elects_nobody(
            count in 1usize..4,
            targets in 2usize..4,
        ) {
            let mut votes = Vec::new();
            for t in 0..targets {
                for _ in 0..count {
                    votes.push(Ballot::Player(PlayerId::new(format!("p{}", t)).unwrap()));
                }
            }
            prop_assert_eq!(tally(&votes), TallyResult::NoElection(NoElection::Tied));
        }
    }
}
