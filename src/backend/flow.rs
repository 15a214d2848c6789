//! Login flow state machine.
//!
//! `Login → NewPasswordRequired` on a password challenge, `Login → Done` on
//! immediate success, `NewPasswordRequired → Done` on a successful password
//! submission. Nothing leaves `Done`; the only way back to `Login` is a fresh
//! page load that fails the gate's token check.

use super::AuthOutcome;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginFlow {
    Login,
    NewPasswordRequired { session: String, user_id: String },
    Done { groups: Vec<String> },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FlowError {
    #[error("login flow already complete")]
    AlreadyDone,
    #[error("unexpected password challenge")]
    UnexpectedChallenge,
}

impl LoginFlow {
    /// Advance the flow with a backend outcome.
    pub fn advance(self, outcome: AuthOutcome) -> Result<Self, FlowError> {
        match (self, outcome) {
            (Self::Done { .. }, _) => Err(FlowError::AlreadyDone),
            (_, AuthOutcome::Success { groups, .. }) => Ok(Self::Done { groups }),
            (Self::Login, AuthOutcome::NewPasswordRequired { session, user_id }) => {
                Ok(Self::NewPasswordRequired { session, user_id })
            }
            // The backend re-issuing a challenge mid-challenge has no UI state.
            (Self::NewPasswordRequired { .. }, AuthOutcome::NewPasswordRequired { .. }) => {
                Err(FlowError::UnexpectedChallenge)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success() -> AuthOutcome {
        AuthOutcome::Success {
            token: Some("t1".to_string()),
            groups: vec!["admins".to_string()],
        }
    }

    fn challenge() -> AuthOutcome {
        AuthOutcome::NewPasswordRequired {
            session: "s1".to_string(),
            user_id: "u1".to_string(),
        }
    }

    #[test]
    fn test_login_to_done_on_success() {
        let flow = LoginFlow::Login.advance(success()).expect("transition");
        assert_eq!(
            flow,
            LoginFlow::Done {
                groups: vec!["admins".to_string()]
            }
        );
    }

    #[test]
    fn test_login_to_new_password_required() {
        let flow = LoginFlow::Login.advance(challenge()).expect("transition");
        assert_eq!(
            flow,
            LoginFlow::NewPasswordRequired {
                session: "s1".to_string(),
                user_id: "u1".to_string(),
            }
        );
    }

    #[test]
    fn test_new_password_required_to_done() {
        let flow = LoginFlow::NewPasswordRequired {
            session: "s1".to_string(),
            user_id: "u1".to_string(),
        };
        let flow = flow.advance(success()).expect("transition");
        assert!(matches!(flow, LoginFlow::Done { .. }));
    }

    #[test]
    fn test_no_transition_leaves_done() {
        let done = LoginFlow::Done { groups: vec![] };
        assert_eq!(done.clone().advance(success()), Err(FlowError::AlreadyDone));
        assert_eq!(done.advance(challenge()), Err(FlowError::AlreadyDone));
    }

    #[test]
    fn test_repeated_challenge_is_rejected() {
        let pending = LoginFlow::NewPasswordRequired {
            session: "s1".to_string(),
            user_id: "u1".to_string(),
        };
        assert_eq!(pending.advance(challenge()), Err(FlowError::UnexpectedChallenge));
    }
}
