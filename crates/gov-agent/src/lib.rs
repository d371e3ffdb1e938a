#![deny(warnings)]

//! City management agent.
//!
//! Keeps cities on their governor parameter: every time a managed city
//! changes, the agent queries the [`Governor`](gov_solver::Governor) and
//! applies the result through primitive worker and specialist changes. A
//! city whose parameter cannot be met, or that keeps diverging from the
//! computed assignment, is released back to the player.

mod agent;
mod apply;
mod presets;

pub use agent::{AgentEvent, ApplyStats, CityAgent, HandleOutcome, ReleaseReason, MAX_ATTEMPTS};
pub use apply::{apply, CityControl, LocalCity};
pub use presets::{Preset, PresetList, MAX_PRESET_NAME_LEN};

use gov_core::{CityId, Specialist};
use gov_solver::GovernorError;
use thiserror::Error;

/// Errors produced by the agent and its city controls.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Governor(#[from] GovernorError),
    /// A worker toggle named a tile the city cannot work.
    #[error("tile {0} cannot be worked")]
    TileNotUsable(usize),
    /// A tile was to be worked but no entertainer was free to work it.
    #[error("no entertainer available to work tile {0}")]
    NoFreeCitizen(usize),
    #[error("no {} to reassign", .0.name())]
    NoSpecialist(Specialist),
    /// The city may not employ this kind of specialist.
    #[error("city cannot employ {}s", .0.name())]
    SpecialistNotAllowed(Specialist),
    /// The parameter could not be stored or read back.
    #[error("parameter of city {city}: {reason}")]
    Parameter { city: CityId, reason: String },
    #[error("reading presets: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing presets: {0}")]
    Presets(#[from] serde_yaml::Error),
}
