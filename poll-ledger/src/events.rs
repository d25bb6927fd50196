use std::fmt;

use near_sdk::serde::Serialize;
use near_sdk::{env, AccountId};

use crate::{CandidateId, PollId};

pub const STANDARD_NAME: &str = "poll-ledger";
pub const EVENT_VERSION: &str = "1.0.0";

/// NEP-297 event envelope.
#[derive(Serialize)]
#[serde(crate = "near_sdk::serde")]
pub struct NearEvent<T: Serialize> {
    pub standard: &'static str,
    pub version: &'static str,
    pub event: &'static str,
    pub data: T,
}

impl<T: Serialize> fmt::Display for NearEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "EVENT_JSON:{}",
            &serde_json::to_string(self).map_err(|_| fmt::Error)?
        ))
    }
}

impl<T: Serialize> NearEvent<T> {
    pub fn emit(&self) {
        env::log_str(&self.to_string());
    }
}

fn emit_event<T: Serialize>(event: &'static str, data: T) {
    NearEvent {
        standard: STANDARD_NAME,
        version: EVENT_VERSION,
        event,
        data,
    }
    .emit();
}

#[derive(Serialize)]
#[serde(crate = "near_sdk::serde")]
struct PollCreated<'a> {
    poll_id: PollId,
    creator: &'a AccountId,
    title: &'a str,
}

#[derive(Serialize)]
#[serde(crate = "near_sdk::serde")]
struct VoterRegistered<'a> {
    poll_id: PollId,
    voter: &'a AccountId,
}

#[derive(Serialize)]
#[serde(crate = "near_sdk::serde")]
struct Voted<'a> {
    poll_id: PollId,
    voter: &'a AccountId,
    candidate_id: CandidateId,
}

#[derive(Serialize)]
#[serde(crate = "near_sdk::serde")]
struct PollEnded {
    poll_id: PollId,
}

pub(crate) fn emit_poll_created(poll_id: PollId, creator: &AccountId, title: &str) {
    emit_event(
        "poll_created",
        PollCreated {
            poll_id,
            creator,
            title,
        },
    );
}

pub(crate) fn emit_voter_registered(poll_id: PollId, voter: &AccountId) {
    emit_event("voter_registered", VoterRegistered { poll_id, voter });
}

pub(crate) fn emit_voted(poll_id: PollId, voter: &AccountId, candidate_id: CandidateId) {
    emit_event(
        "voted",
        Voted {
            poll_id,
            voter,
            candidate_id,
        },
    );
}

pub(crate) fn emit_poll_ended(poll_id: PollId) {
    emit_event("poll_ended", PollEnded { poll_id });
}

#[cfg(test)]
mod unit_tests {
    use near_sdk::test_utils::{self, test_env::alice};

    use super::*;

    #[test]
    fn log_events() {
        let expected1 = r#"EVENT_JSON:{"standard":"poll-ledger","version":"1.0.0","event":"poll_created","data":{"poll_id":21,"creator":"alice.near","title":"Best language"}}"#;
        let expected2 = r#"EVENT_JSON:{"standard":"poll-ledger","version":"1.0.0","event":"voter_registered","data":{"poll_id":21,"voter":"alice.near"}}"#;
        let expected3 = r#"EVENT_JSON:{"standard":"poll-ledger","version":"1.0.0","event":"voted","data":{"poll_id":21,"voter":"alice.near","candidate_id":2}}"#;
        let expected4 = r#"EVENT_JSON:{"standard":"poll-ledger","version":"1.0.0","event":"poll_ended","data":{"poll_id":21}}"#;

        emit_poll_created(21, &alice(), "Best language");
        assert_eq!(vec![expected1], test_utils::get_logs());
        emit_voter_registered(21, &alice());
        emit_voted(21, &alice(), 2);
        emit_poll_ended(21);
        assert_eq!(
            vec![expected1, expected2, expected3, expected4],
            test_utils::get_logs()
        );
    }

    #[test]
    fn title_is_json_escaped() {
        emit_poll_created(1, &alice(), r#"say "hi""#);
        assert_eq!(
            vec![
                r#"EVENT_JSON:{"standard":"poll-ledger","version":"1.0.0","event":"poll_created","data":{"poll_id":1,"creator":"alice.near","title":"say \"hi\""}}"#
            ],
            test_utils::get_logs()
        );
    }
}
