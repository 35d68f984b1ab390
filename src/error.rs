use thiserror::Error;

/// Errors produced while configuring or running an agent
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Greedy selection found no action leading to a state valued at or above zero
    #[error("no improving action: best successor value is {best}")]
    NoImprovingAction { best: f32 },

    /// The episode reached its step cap without entering a terminal state
    #[error("episode exceeded the step limit of {limit} without terminating")]
    StepLimitExceeded { limit: u32 },

    #[error("invalid decay schedule: `vi - vf` ({vi} - {vf}) must have the same sign as `rate` ({rate})")]
    InvalidDecay { rate: f32, vi: f32, vf: f32 },
}

pub type Result<T> = std::result::Result<T, Error>;
