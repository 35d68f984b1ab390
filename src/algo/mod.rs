pub mod tabular;

pub use tabular::value_table::{EpisodeSummary, Fallback, ValueTableAgent, ValueTableAgentConfig};
