use pop_core::CoreError;
use pop_ipq::IpqError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("timetable error: {0}")]
    Timetable(#[from] IpqError),

    #[error("driver configuration error: {0}")]
    Config(String),

    #[error("the population crashed: no agents remain")]
    PopulationCrashed,

    #[error("queued delete for an agent that is not present in the population")]
    AgentNotFound,
}

pub type SimResult<T> = Result<T, SimError>;
