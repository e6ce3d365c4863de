//! Submission lifecycle.
//!
//! ```text
//! DRAFT -> SUBMITTED -> VERIFIED -> APPROVED -> ARCHIVED
//!              |            |
//!              +------------+--> REJECTED
//! ```
//!
//! Transitions only move forward. REJECTED and ARCHIVED are terminal.

use thiserror::Error;

use super::models::SubmissionStatus;
use crate::auth::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("perubahan status dari {from} ke {to} tidak diizinkan")]
pub struct InvalidStateTransitionError {
    pub from: SubmissionStatus,
    pub to: SubmissionStatus,
}

/// Statuses reachable in one step from `from`.
pub fn next_states(from: SubmissionStatus) -> &'static [SubmissionStatus] {
    use SubmissionStatus::*;
    match from {
        Draft => &[Submitted],
        Submitted => &[Verified, Rejected],
        Verified => &[Approved, Rejected],
        Approved => &[Archived],
        Rejected | Archived => &[],
    }
}

pub fn check_transition(
    from: SubmissionStatus,
    to: SubmissionStatus,
) -> Result<(), InvalidStateTransitionError> {
    if next_states(from).contains(&to) {
        Ok(())
    } else {
        Err(InvalidStateTransitionError { from, to })
    }
}

/// Who may move a submission into `to`.
pub fn required_role(to: SubmissionStatus) -> Role {
    match to {
        SubmissionStatus::Draft | SubmissionStatus::Submitted => Role::Warga,
        SubmissionStatus::Verified
        | SubmissionStatus::Approved
        | SubmissionStatus::Rejected
        | SubmissionStatus::Archived => Role::Admin,
    }
}

pub fn is_terminal(status: SubmissionStatus) -> bool {
    next_states(status).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use SubmissionStatus::*;

    const ALL: [SubmissionStatus; 6] = [Draft, Submitted, Verified, Approved, Rejected, Archived];

    #[test]
    fn test_happy_path() {
        assert!(check_transition(Draft, Submitted).is_ok());
        assert!(check_transition(Submitted, Verified).is_ok());
        assert!(check_transition(Verified, Approved).is_ok());
        assert!(check_transition(Approved, Archived).is_ok());
    }

    #[test]
    fn test_backwards_is_rejected() {
        assert_eq!(
            check_transition(Approved, Submitted),
            Err(InvalidStateTransitionError {
                from: Approved,
                to: Submitted
            })
        );
        assert!(check_transition(Verified, Draft).is_err());
        assert!(check_transition(Submitted, Approved).is_err());
    }

    #[test]
    fn test_terminal_states() {
        for to in ALL {
            assert!(check_transition(Rejected, to).is_err());
            assert!(check_transition(Archived, to).is_err());
        }
        assert!(is_terminal(Rejected));
        assert!(is_terminal(Archived));
        assert!(!is_terminal(Approved));
    }

    #[test]
    fn test_transitions_never_reenter_earlier_state() {
        let rank = |s: SubmissionStatus| ALL.iter().position(|x| *x == s).unwrap();
        for from in ALL {
            for to in next_states(from) {
                assert!(rank(*to) > rank(from), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_roles() {
        assert_eq!(required_role(Submitted), Role::Warga);
        assert_eq!(required_role(Approved), Role::Admin);
        assert_eq!(required_role(Rejected), Role::Admin);
    }
}
