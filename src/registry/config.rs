//! Registry configuration

use std::time::Duration;

/// What happens when a participant answers the same question more than once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerPolicy {
    /// Every correct submission scores; participants may change their answer
    /// and be re-awarded each time
    ScoreEverySubmission,
    /// Only the first submission per question can score; repeats still get
    /// feedback but never change the score
    LockFirstAnswer,
}

/// Configuration for the session registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Points awarded for a correct answer
    pub answer_award: u32,

    /// Repeat-submission policy for answers
    pub answer_policy: AnswerPolicy,

    /// How long a session may go without activity before the sweep removes it
    pub idle_session_timeout: Duration,

    /// Interval between sweep runs
    pub sweep_interval: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            answer_award: 10,
            answer_policy: AnswerPolicy::ScoreEverySubmission,
            idle_session_timeout: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl RegistryConfig {
    /// Set the points awarded for a correct answer
    pub fn answer_award(mut self, award: u32) -> Self {
        self.answer_award = award;
        self
    }

    /// Set the repeat-submission policy
    pub fn answer_policy(mut self, policy: AnswerPolicy) -> Self {
        self.answer_policy = policy;
        self
    }

    /// Set the idle timeout after which sessions are swept
    pub fn idle_session_timeout(mut self, timeout: Duration) -> Self {
        self.idle_session_timeout = timeout;
        self
    }

    /// Set the sweep interval
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}
