use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::serde::{Deserialize, Serialize};
use near_sdk::{AccountId, BorshStorageKey};

/// Poll identifier. Assigned sequentially, the first poll gets 1.
pub type PollId = u64;
/// 1-based position of a candidate within its poll.
pub type CandidateId = u32;

/// 1 minute in milliseconds.
pub const MINUTE_MS: u64 = 60_000;
pub const DEFAULT_MAX_CANDIDATES: u32 = 64;
pub const DEFAULT_MAX_TEXT_LEN: u32 = 1024;

/// Helper structure for keys of the persistent collections.
#[derive(BorshSerialize, BorshStorageKey)]
pub enum StorageKey {
    Polls,
    Voters,
}

#[derive(BorshSerialize, BorshDeserialize, Serialize, Deserialize, Clone)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq))]
#[serde(crate = "near_sdk::serde")]
pub struct Config {
    /// max number of candidates a single poll can carry
    pub max_candidates: u32,
    /// max length in bytes of the poll title, description and candidate names
    pub max_text_len: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_candidates: DEFAULT_MAX_CANDIDATES,
            max_text_len: DEFAULT_MAX_TEXT_LEN,
        }
    }
}

#[derive(BorshSerialize, BorshDeserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
pub struct Candidate {
    pub name: String,
    pub vote_count: u64,
}

#[derive(BorshSerialize, BorshDeserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
pub struct Poll {
    pub title: String,
    pub description: String,
    pub creator: AccountId,
    /// time in milliseconds
    pub created_at: u64,
    /// time in milliseconds, the poll accepts registrations and votes up to and including it
    pub ends_at: u64,
    /// cleared only by an explicit `end_poll`
    pub active: bool,
    /// fixed at creation, candidate `id` is `index + 1`
    pub candidates: Vec<Candidate>,
    pub registered_voters: u64,
}

impl Poll {
    /// Poll accepts registrations and votes only while the `active` flag is set and the
    /// deadline has not passed.
    pub fn is_open(&self, now_ms: u64) -> bool {
        self.active && now_ms <= self.ends_at
    }

    pub fn status(&self, now_ms: u64) -> Status {
        if self.is_open(now_ms) {
            Status::Active
        } else {
            Status::Finished
        }
    }

    /// Sum of all candidate votes. Every recorded vote marks exactly one voter as voted, so
    /// this is also the number of voters who voted.
    pub fn total_votes(&self) -> u64 {
        self.candidates.iter().map(|c| c.vote_count).sum()
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        let idx = (id as usize).checked_sub(1)?;
        self.candidates.get(idx)
    }

    pub fn candidate_mut(&mut self, id: CandidateId) -> Option<&mut Candidate> {
        let idx = (id as usize).checked_sub(1)?;
        self.candidates.get_mut(idx)
    }

    pub fn tally(&self) -> Vec<CandidateView> {
        self.candidates
            .iter()
            .enumerate()
            .map(|(i, c)| CandidateView::new(i as CandidateId + 1, c))
            .collect()
    }

    pub fn info(&self) -> PollInfo {
        PollInfo {
            title: self.title.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
            ends_at: self.ends_at,
            active: self.active,
            creator: self.creator.clone(),
            candidate_count: self.candidates.len() as u32,
            total_votes: self.total_votes(),
            registered_voters: self.registered_voters,
        }
    }
}

/// Voter record stored per (poll, account). An account without a record is not registered.
#[derive(BorshSerialize, BorshDeserialize, PartialEq)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, Clone))]
pub enum VoterStatus {
    Registered,
    Voted,
}

#[derive(Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
#[serde(crate = "near_sdk::serde")]
pub struct PollInfo {
    pub title: String,
    pub description: String,
    pub created_at: u64,
    pub ends_at: u64,
    /// the stored flag, it doesn't account for the deadline. Use `poll_status` for that.
    pub active: bool,
    pub creator: AccountId,
    pub candidate_count: u32,
    pub total_votes: u64,
    pub registered_voters: u64,
}

#[derive(Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
#[serde(crate = "near_sdk::serde")]
pub struct CandidateView {
    pub id: CandidateId,
    pub name: String,
    pub vote_count: u64,
}

impl CandidateView {
    pub fn new(id: CandidateId, c: &Candidate) -> Self {
        Self {
            id,
            name: c.name.clone(),
            vote_count: c.vote_count,
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, Clone, Copy))]
#[serde(crate = "near_sdk::serde")]
pub enum Status {
    Active,
    Finished,
}

#[derive(Serialize, Deserialize)]
#[cfg_attr(not(target_arch = "wasm32"), derive(Debug, PartialEq, Clone))]
#[serde(crate = "near_sdk::serde")]
pub struct Results {
    pub status: Status,
    pub total_votes: u64,
    pub registered_voters: u64,
    pub tally: Vec<CandidateView>,
}

#[cfg(test)]
mod tests {
    use near_sdk::test_utils::test_env::alice;
    use pretty_assertions::assert_eq;

    use super::*;

    fn poll(votes: &[u64]) -> Poll {
        Poll {
            title: "t".to_owned(),
            description: "d".to_owned(),
            creator: alice(),
            created_at: 100,
            ends_at: 200,
            active: true,
            candidates: votes
                .iter()
                .enumerate()
                .map(|(i, v)| Candidate {
                    name: format!("c{}", i + 1),
                    vote_count: *v,
                })
                .collect(),
            registered_voters: 10,
        }
    }

    #[test]
    fn open_window() {
        let mut p = poll(&[0, 0]);
        assert!(p.is_open(100));
        assert!(p.is_open(200));
        assert!(!p.is_open(201));
        assert_eq!(p.status(201), Status::Finished);
        p.active = false;
        assert!(!p.is_open(150));
        assert_eq!(p.status(150), Status::Finished);
    }

    #[test]
    fn candidate_ids_are_one_based() {
        let p = poll(&[3, 4, 5]);
        assert!(p.candidate(0).is_none());
        assert_eq!(p.candidate(1).map(|c| c.vote_count), Some(3));
        assert_eq!(p.candidate(3).map(|c| c.name.as_str()), Some("c3"));
        assert!(p.candidate(4).is_none());
        assert!(p.candidate(u32::MAX).is_none());

        let ids: Vec<CandidateId> = p.tally().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn info_derives_total_votes() {
        let p = poll(&[3, 4, 5]);
        let info = p.info();
        assert_eq!(info.total_votes, 12);
        assert_eq!(info.candidate_count, 3);
        assert_eq!(info.registered_voters, 10);
        assert!(info.active);
    }
}
