use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::collections::LookupMap;
use near_sdk::{env, near_bindgen, require, AccountId, Balance, PanicOnDefault, Promise};

pub use crate::errors::*;
pub use crate::events::*;
pub use crate::policy::*;
pub use crate::storage::*;

mod errors;
mod events;
mod policy;
mod storage;

#[near_bindgen]
#[derive(BorshDeserialize, BorshSerialize, PanicOnDefault)]
pub struct Contract {
    /// map of poll id -> poll with its candidates
    pub polls: LookupMap<PollId, Poll>,
    /// registered voters, keyed by (poll id, voter account)
    pub voters: LookupMap<(PollId, AccountId), VoterStatus>,
    /// id of the most recently created poll, 0 when no poll exists
    pub last_poll_id: PollId,
    pub config: Config,
}

// Implement the contract structure
#[near_bindgen]
impl Contract {
    /// @max_candidates: max number of candidates per poll, default 64.
    /// @max_text_len: max length in bytes of title, description and candidate names,
    ///   default 1024.
    #[init]
    pub fn new(max_candidates: Option<u32>, max_text_len: Option<u32>) -> Self {
        let mut config = Config::default();
        if let Some(m) = max_candidates {
            config.max_candidates = m;
        }
        if let Some(m) = max_text_len {
            config.max_text_len = m;
        }
        require!(
            config.max_candidates >= 2,
            "max_candidates must be at least 2"
        );
        require!(config.max_text_len > 0, "max_text_len must be positive");
        Self {
            polls: LookupMap::new(StorageKey::Polls),
            voters: LookupMap::new(StorageKey::Voters),
            last_poll_id: 0,
            config,
        }
    }

    /**********
     * QUERIES
     **********/

    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Number of polls created so far. Poll ids are `1..=polls_count`.
    pub fn polls_count(&self) -> u64 {
        self.last_poll_id
    }

    /// Returns poll ids in creation order, starting from `from_index` (a poll id,
    /// default 1). Returns all remaining ids when `limit` is not set.
    pub fn list_polls(&self, from_index: Option<PollId>, limit: Option<u32>) -> Vec<PollId> {
        let start = from_index.unwrap_or(1).max(1);
        let limit = limit.map(|l| l as usize).unwrap_or(usize::MAX);
        (start..=self.last_poll_id).take(limit).collect()
    }

    #[handle_result]
    pub fn poll_info(&self, poll_id: PollId) -> Result<PollInfo, PollError> {
        Ok(self.get_poll(poll_id)?.info())
    }

    /// Derived status: a poll is `Finished` once ended by the creator or once its deadline
    /// passed.
    #[handle_result]
    pub fn poll_status(&self, poll_id: PollId) -> Result<Status, PollError> {
        Ok(self
            .get_poll(poll_id)?
            .status(env::block_timestamp_ms()))
    }

    #[handle_result]
    pub fn candidate(
        &self,
        poll_id: PollId,
        candidate_id: CandidateId,
    ) -> Result<CandidateView, PollError> {
        let poll = self.get_poll(poll_id)?;
        poll.candidate(candidate_id)
            .map(|c| CandidateView::new(candidate_id, c))
            .ok_or(PollError::CandidateNotFound)
    }

    /// Returns all candidates of the poll ordered by id.
    #[handle_result]
    pub fn candidates(&self, poll_id: PollId) -> Result<Vec<CandidateView>, PollError> {
        Ok(self.get_poll(poll_id)?.tally())
    }

    #[handle_result]
    pub fn results(&self, poll_id: PollId) -> Result<Results, PollError> {
        let poll = self.get_poll(poll_id)?;
        Ok(Results {
            status: poll.status(env::block_timestamp_ms()),
            total_votes: poll.total_votes(),
            registered_voters: poll.registered_voters,
            tally: poll.tally(),
        })
    }

    #[handle_result]
    pub fn is_voter_registered(
        &self,
        poll_id: PollId,
        voter: AccountId,
    ) -> Result<bool, PollError> {
        self.assert_poll_exists(poll_id)?;
        Ok(self.voters.contains_key(&(poll_id, voter)))
    }

    #[handle_result]
    pub fn has_voted(&self, poll_id: PollId, voter: AccountId) -> Result<bool, PollError> {
        self.assert_poll_exists(poll_id)?;
        Ok(self.voters.get(&(poll_id, voter)) == Some(VoterStatus::Voted))
    }

    /**********
     * TRANSACTIONS
     **********/

    /// Creates a new poll owned by the caller and returns its id. The poll accepts
    /// registrations and votes for `duration_minutes` from now, or until ended by the
    /// caller.
    /// Fails with `Validation` when title or description is empty, duration is zero,
    /// there are less than 2 candidates or any candidate name is empty.
    /// Caller must attach a deposit covering the poll storage, the excess is refunded.
    #[payable]
    #[handle_result]
    pub fn create_poll(
        &mut self,
        title: String,
        description: String,
        duration_minutes: u64,
        candidates: Vec<String>,
    ) -> Result<PollId, PollError> {
        self.validate_text("title", &title)?;
        self.validate_text("description", &description)?;
        if duration_minutes == 0 {
            return Err(PollError::Validation(
                "duration must be positive".to_owned(),
            ));
        }
        if candidates.len() < 2 {
            return Err(PollError::Validation(
                "need at least 2 candidates".to_owned(),
            ));
        }
        if candidates.len() > self.config.max_candidates as usize {
            return Err(PollError::Validation(format!(
                "at most {} candidates allowed",
                self.config.max_candidates
            )));
        }
        for name in &candidates {
            self.validate_text("candidate name", name)?;
        }

        let now_ms = env::block_timestamp_ms();
        let ends_at = duration_minutes
            .checked_mul(MINUTE_MS)
            .and_then(|d| now_ms.checked_add(d))
            .ok_or_else(|| PollError::Validation("duration too long".to_owned()))?;

        let creator = env::predecessor_account_id();
        let poll_id = self.last_poll_id + 1;
        let poll = Poll {
            title,
            description,
            creator,
            created_at: now_ms,
            ends_at,
            active: true,
            candidates: candidates
                .into_iter()
                .map(|name| Candidate {
                    name,
                    vote_count: 0,
                })
                .collect(),
            registered_voters: 0,
        };
        let storage_start = env::storage_usage();
        self.polls.insert(&poll_id, &poll);
        if let Err(e) = self.charge_storage(storage_start) {
            self.polls.remove(&poll_id);
            return Err(e);
        }
        self.last_poll_id = poll_id;

        emit_poll_created(poll_id, &poll.creator, &poll.title);
        Ok(poll_id)
    }

    /// Adds `voter` to the poll voter list. The poll creator can register any account,
    /// other accounts can only register themselves.
    /// Caller must attach a deposit covering the voter record storage, the excess is
    /// refunded.
    #[payable]
    #[handle_result]
    pub fn register_voter(
        &mut self,
        poll_id: PollId,
        voter: AccountId,
    ) -> Result<(), PollError> {
        let caller = env::predecessor_account_id();
        let mut poll = self.get_poll(poll_id)?;
        if !poll.is_open(env::block_timestamp_ms()) {
            return Err(PollError::PollClosed);
        }
        if !can_register(&caller, &poll, &voter) {
            return Err(PollError::Forbidden(
                "only the poll creator or the voter can register the voter".to_owned(),
            ));
        }
        let key = (poll_id, voter);
        if self.voters.contains_key(&key) {
            return Err(PollError::AlreadyRegistered);
        }

        let storage_start = env::storage_usage();
        self.voters.insert(&key, &VoterStatus::Registered);
        if let Err(e) = self.charge_storage(storage_start) {
            self.voters.remove(&key);
            return Err(e);
        }
        poll.registered_voters += 1;
        self.polls.insert(&poll_id, &poll);

        emit_voter_registered(poll_id, &key.1);
        Ok(())
    }

    /// Records the caller vote for `candidate_id`. Each registered voter can vote once.
    #[handle_result]
    pub fn vote(&mut self, poll_id: PollId, candidate_id: CandidateId) -> Result<(), PollError> {
        let voter = env::predecessor_account_id();
        let mut poll = self.get_poll(poll_id)?;
        if !poll.is_open(env::block_timestamp_ms()) {
            return Err(PollError::PollClosed);
        }
        let key = (poll_id, voter);
        match self.voters.get(&key) {
            None => return Err(PollError::NotRegistered),
            Some(VoterStatus::Voted) => return Err(PollError::AlreadyVoted),
            Some(VoterStatus::Registered) => (),
        }
        let candidate = poll
            .candidate_mut(candidate_id)
            .ok_or(PollError::InvalidCandidate)?;
        candidate.vote_count += 1;

        // voter status and the candidate counter are written in the same call
        self.voters.insert(&key, &VoterStatus::Voted);
        self.polls.insert(&poll_id, &poll);

        emit_voted(poll_id, &key.1, candidate_id);
        Ok(())
    }

    /// Closes the poll for good. Only the poll creator can end it, also after the deadline.
    #[handle_result]
    pub fn end_poll(&mut self, poll_id: PollId, memo: Option<String>) -> Result<(), PollError> {
        let caller = env::predecessor_account_id();
        let mut poll = self.get_poll(poll_id)?;
        if !can_end(&caller, &poll) {
            return Err(PollError::Forbidden(
                "only creator can end the poll".to_owned(),
            ));
        }
        if !poll.active {
            return Err(PollError::AlreadyEnded);
        }
        if let Some(memo) = &memo {
            if memo.len() > self.config.max_text_len as usize {
                return Err(PollError::Validation(format!(
                    "memo longer than {} bytes",
                    self.config.max_text_len
                )));
            }
        }

        poll.active = false;
        self.polls.insert(&poll_id, &poll);

        if let Some(memo) = memo {
            env::log_str(&format!("end poll memo: {}", memo));
        }
        emit_poll_ended(poll_id);
        Ok(())
    }

    /**********
     * INTERNAL
     **********/

    fn get_poll(&self, poll_id: PollId) -> Result<Poll, PollError> {
        self.polls.get(&poll_id).ok_or(PollError::PollNotFound)
    }

    fn assert_poll_exists(&self, poll_id: PollId) -> Result<(), PollError> {
        if self.polls.contains_key(&poll_id) {
            Ok(())
        } else {
            Err(PollError::PollNotFound)
        }
    }

    /// Requires the attached deposit to cover the storage used since `storage_start` and
    /// refunds the rest to the caller.
    fn charge_storage(&self, storage_start: u64) -> Result<(), PollError> {
        let used = env::storage_usage().saturating_sub(storage_start);
        let required = used as Balance * env::storage_byte_cost();
        let attached = env::attached_deposit();
        if attached < required {
            return Err(PollError::RequiredDeposit(required));
        }
        let refund = attached - required;
        if refund > 0 {
            Promise::new(env::predecessor_account_id()).transfer(refund);
        }
        Ok(())
    }

    fn validate_text(&self, field: &str, value: &str) -> Result<(), PollError> {
        if value.trim().is_empty() {
            return Err(PollError::Validation(format!("{} must not be empty", field)));
        }
        if value.len() > self.config.max_text_len as usize {
            return Err(PollError::Validation(format!(
                "{} longer than {} bytes",
                field, self.config.max_text_len
            )));
        }
        Ok(())
    }
}
