//! Re-authentication budget of a single call.

/// Status returned by Salt API when it refuses a session token.
pub const UNAUTHORIZED: u16 = 401;

/// State of one call with regard to token rejection.
///
/// A call starts [`Fresh`](AuthRetry::Fresh). The first 401 moves it to
/// [`Reauthenticated`](AuthRetry::Reauthenticated) and asks for a new token
/// and one more attempt; a 401 in that state ends the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthRetry {
    #[default]
    Fresh,
    Reauthenticated,
}

/// What to do with the response of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Hand the response to the decoder.
    Accept,
    /// Drop the token, log in again and resend once.
    Reauthenticate,
    /// The fresh token was refused as well.
    GiveUp,
}

impl AuthRetry {
    /// State of a call that has not been sent yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance on the status of the latest attempt.
    pub fn on_status(&mut self, status: u16) -> Step {
        if status != UNAUTHORIZED {
            return Step::Accept;
        }
        match self {
            AuthRetry::Fresh => {
                *self = AuthRetry::Reauthenticated;
                Step::Reauthenticate
            }
            AuthRetry::Reauthenticated => Step::GiveUp,
        }
    }

    /// Number of the attempt about to be sent (1 or 2).
    pub fn attempt(&self) -> u8 {
        match self {
            AuthRetry::Fresh => 1,
            AuthRetry::Reauthenticated => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_accepted_immediately() {
        let mut policy = AuthRetry::new();
        assert_eq!(policy.on_status(200), Step::Accept);
        assert_eq!(policy, AuthRetry::Fresh);
    }

    #[test]
    fn other_errors_are_not_retried() {
        let mut policy = AuthRetry::new();
        assert_eq!(policy.on_status(500), Step::Accept);
        assert_eq!(policy.on_status(403), Step::Accept);
        assert_eq!(policy.attempt(), 1);
    }

    #[test]
    fn single_reauthentication_budget() {
        let mut policy = AuthRetry::new();
        assert_eq!(policy.on_status(401), Step::Reauthenticate);
        assert_eq!(policy.attempt(), 2);
        assert_eq!(policy.on_status(401), Step::GiveUp);
        assert_eq!(policy.on_status(401), Step::GiveUp);
    }

    #[test]
    fn retry_may_succeed() {
        let mut policy = AuthRetry::new();
        assert_eq!(policy.on_status(401), Step::Reauthenticate);
        assert_eq!(policy.on_status(200), Step::Accept);
    }
}
