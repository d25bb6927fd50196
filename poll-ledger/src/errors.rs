use near_sdk::env::panic_str;
use near_sdk::FunctionError;

/// Contract errors. Every error aborts the call, so no state change of a failed call
/// is persisted.
#[cfg_attr(not(target_arch = "wasm32"), derive(PartialEq, Debug))]
pub enum PollError {
    /// malformed create_poll input
    Validation(String),
    PollNotFound,
    /// returned by queries for an out of range candidate id
    CandidateNotFound,
    Forbidden(String),
    /// poll was ended or its deadline passed
    PollClosed,
    AlreadyRegistered,
    NotRegistered,
    AlreadyVoted,
    /// returned by `vote` for an out of range candidate id
    InvalidCandidate,
    AlreadyEnded,
    /// attached deposit doesn't cover the storage, holds the required amount
    RequiredDeposit(u128),
}

impl FunctionError for PollError {
    fn panic(&self) -> ! {
        match self {
            PollError::Validation(msg) => panic_str(&format!("invalid poll: {}", msg)),
            PollError::PollNotFound => panic_str("poll not found"),
            PollError::CandidateNotFound => panic_str("candidate not found"),
            PollError::Forbidden(msg) => panic_str(&format!("not authorized: {}", msg)),
            PollError::PollClosed => panic_str("poll is not active"),
            PollError::AlreadyRegistered => panic_str("already registered"),
            PollError::NotRegistered => panic_str("not registered to vote"),
            PollError::AlreadyVoted => panic_str("already voted"),
            PollError::InvalidCandidate => panic_str("invalid candidate"),
            PollError::AlreadyEnded => panic_str("poll already ended"),
            PollError::RequiredDeposit(min_deposit) => {
                panic_str(&format!("deposit must be at least {}yN", min_deposit))
            }
        }
    }
}
