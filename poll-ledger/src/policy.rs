//! Access rules for poll mutations.

use near_sdk::AccountId;

use crate::Poll;

/// The poll creator may register any account, everyone else may only register themselves.
pub fn can_register(caller: &AccountId, poll: &Poll, target: &AccountId) -> bool {
    caller == &poll.creator || caller == target
}

/// Only the poll creator may end the poll.
pub fn can_end(caller: &AccountId, poll: &Poll) -> bool {
    caller == &poll.creator
}

#[cfg(test)]
mod tests {
    use near_sdk::test_utils::test_env::{alice, bob, carol};

    use super::*;
    use crate::Candidate;

    fn poll_by(creator: AccountId) -> Poll {
        Poll {
            title: "t".to_owned(),
            description: "d".to_owned(),
            creator,
            created_at: 0,
            ends_at: 1,
            active: true,
            candidates: vec![
                Candidate {
                    name: "a".to_owned(),
                    vote_count: 0,
                },
                Candidate {
                    name: "b".to_owned(),
                    vote_count: 0,
                },
            ],
            registered_voters: 0,
        }
    }

    #[test]
    fn register_rule() {
        let p = poll_by(alice());
        // creator registers someone else
        assert!(can_register(&alice(), &p, &bob()));
        // creator registers their own account
        assert!(can_register(&alice(), &p, &alice()));
        // self registration
        assert!(can_register(&bob(), &p, &bob()));
        // third party
        assert!(!can_register(&carol(), &p, &bob()));
        assert!(!can_register(&bob(), &p, &alice()));
    }

    #[test]
    fn end_rule() {
        let p = poll_by(alice());
        assert!(can_end(&alice(), &p));
        assert!(!can_end(&bob(), &p));
    }
}
