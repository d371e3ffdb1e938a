use crate::apply::{apply, CityControl};
use crate::AgentError;
use gov_core::{CityId, CmResult, Parameter};
use gov_econ::Economy;
use gov_solver::{Governor, GovernorConfig};
use persistence::{Attribute, AttributeStore};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Query-and-apply rounds before a city that keeps changing is released.
pub const MAX_ATTEMPTS: usize = 5;

/// Why the agent gave a city back to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseReason {
    /// No assignment satisfies the parameter.
    CannotFulfil,
    /// Every computed result failed to apply.
    ChangedRepeatedly,
}

/// Notifications for the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentEvent {
    Released {
        city: CityId,
        name: String,
        reason: ReleaseReason,
    },
    /// The first computed result did not apply cleanly.
    Retrying { city: CityId, name: String },
}

impl fmt::Display for AgentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentEvent::Released {
                name,
                reason: ReleaseReason::CannotFulfil,
                ..
            } => write!(
                f,
                "The governor can't fulfill the requirements for {name}. Passing back control."
            ),
            AgentEvent::Released {
                name,
                reason: ReleaseReason::ChangedRepeatedly,
                ..
            } => write!(
                f,
                "{name} has changed multiple times. The governor will detach itself from the city now."
            ),
            AgentEvent::Retrying { name, .. } => write!(
                f,
                "{name} has changed and the calculated result can't be applied. Will retry."
            ),
        }
    }
}

/// What [`CityAgent::handle_city`] did with a city.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandleOutcome {
    /// The city has no governor parameter.
    NotManaged,
    /// The city now follows this assignment.
    Applied(CmResult),
    Released(ReleaseReason),
}

/// How often applying was skipped because the city already matched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub ignored: u64,
    pub applied: u64,
    pub failed: u64,
}

impl ApplyStats {
    /// Share of handled cities that already matched, in percent. Zero
    /// before any city was handled.
    pub fn ignored_share(&self) -> f64 {
        let total = self.ignored + self.applied + self.failed;
        if total == 0 {
            0.0
        } else {
            self.ignored as f64 * 100.0 / total as f64
        }
    }
}

/// Keeps managed cities on their governor parameter.
///
/// The parameter of each managed city lives in the attribute store, so a
/// saved store restores management on load.
#[derive(Debug, Default)]
pub struct CityAgent {
    governor: Governor,
    attributes: AttributeStore,
    stats: ApplyStats,
    events: Vec<AgentEvent>,
}

impl CityAgent {
    pub fn new(config: GovernorConfig) -> Self {
        Self::with_attributes(config, AttributeStore::new())
    }

    pub fn with_attributes(config: GovernorConfig, attributes: AttributeStore) -> Self {
        Self {
            governor: Governor::new(config),
            attributes,
            stats: ApplyStats::default(),
            events: Vec::new(),
        }
    }

    pub fn governor(&self) -> &Governor {
        &self.governor
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    pub fn into_attributes(self) -> AttributeStore {
        self.attributes
    }

    pub fn stats(&self) -> ApplyStats {
        self.stats
    }

    pub fn events(&self) -> &[AgentEvent] {
        &self.events
    }

    /// Turn boundary hook. Reports apply and governor counters.
    pub fn new_turn(&mut self) {
        let query = self.governor.stats();
        debug!(
            ignored = self.stats.ignored,
            applied = self.stats.applied,
            failed = self.stats.failed,
            queries = query.queries,
            oracle_calls = query.oracle_calls,
            "apply: {:.1}% ignored | results: {:.1}% hits | secondary: {:.1}% hits",
            self.stats.ignored_share(),
            query.results.hit_rate(),
            query.secondary.hit_rate(),
        );
    }

    pub fn drain_events(&mut self) -> Vec<AgentEvent> {
        std::mem::take(&mut self.events)
    }

    /// Put `city` under management. Call [`CityAgent::handle_city`]
    /// afterwards to bring it onto the parameter.
    pub fn attach(&mut self, city: CityId, parameter: &Parameter) -> Result<(), AgentError> {
        self.attributes
            .set_parameter(Attribute::GovernorParameter, city, parameter)
            .map_err(|e| AgentError::Parameter {
                city,
                reason: format!("{e:#}"),
            })?;
        self.governor.invalidate(city);
        info!(city = %city, "city put under governor");
        Ok(())
    }

    pub fn release(&mut self, city: CityId) {
        if self
            .attributes
            .remove(Attribute::GovernorParameter, city)
            .is_some()
        {
            info!(city = %city, "city released");
        }
        self.governor.invalidate(city);
    }

    pub fn is_managed(&self, city: CityId) -> bool {
        self.attributes
            .get(Attribute::GovernorParameter, city)
            .is_some()
    }

    /// Parameter the city is managed with.
    pub fn parameter(&self, city: CityId) -> Result<Option<Parameter>, AgentError> {
        self.attributes
            .parameter(Attribute::GovernorParameter, city)
            .map_err(|e| AgentError::Parameter {
                city,
                reason: format!("{e:#}"),
            })
    }

    /// Parameter to show in a front end: the managed one if there is one,
    /// else the last one edited, else the default.
    pub fn front_end_parameter(&mut self, city: CityId) -> Result<Parameter, AgentError> {
        let parameter = match self.parameter(city)? {
            Some(p) => p,
            None => self
                .attributes
                .parameter(Attribute::FrontEndParameter, city)
                .ok()
                .flatten()
                .unwrap_or_default(),
        };
        self.set_front_end_parameter(city, &parameter)?;
        Ok(parameter)
    }

    pub fn set_front_end_parameter(
        &mut self,
        city: CityId,
        parameter: &Parameter,
    ) -> Result<(), AgentError> {
        self.attributes
            .set_parameter(Attribute::FrontEndParameter, city, parameter)
            .map_err(|e| AgentError::Parameter {
                city,
                reason: format!("{e:#}"),
            })
    }

    /// Either bring the city onto its parameter or release it.
    pub fn handle_city<E, C>(
        &mut self,
        economy: &E,
        control: &mut C,
    ) -> Result<HandleOutcome, AgentError>
    where
        E: Economy,
        C: CityControl,
    {
        let id = control.city().id;
        let name = control.city().name.clone();
        debug!(city = %id, "handling city");

        for attempt in 0..MAX_ATTEMPTS {
            let Some(parameter) = self.parameter(id)? else {
                return Ok(HandleOutcome::NotManaged);
            };

            let Some(result) = self
                .governor
                .query(economy, control.city_mut(), &parameter)?
            else {
                self.release(id);
                self.event(AgentEvent::Released {
                    city: id,
                    name,
                    reason: ReleaseReason::CannotFulfil,
                });
                return Ok(HandleOutcome::Released(ReleaseReason::CannotFulfil));
            };

            if CmResult::from_city(control.city()).same_assignment(&result) {
                self.stats.ignored += 1;
                return Ok(HandleOutcome::Applied(result));
            }
            self.stats.applied += 1;
            if apply(control, &result) {
                info!(city = %id, "applied: {}", result);
                return Ok(HandleOutcome::Applied(result));
            }

            self.stats.failed += 1;
            self.governor.invalidate(id);
            debug!(city = %id, attempt, "result did not apply cleanly");
            if attempt == 0 {
                self.event(AgentEvent::Retrying {
                    city: id,
                    name: name.clone(),
                });
            }
        }

        error!(city = %id, "city changed on every attempt, releasing");
        self.release(id);
        self.event(AgentEvent::Released {
            city: id,
            name,
            reason: ReleaseReason::ChangedRepeatedly,
        });
        Ok(HandleOutcome::Released(ReleaseReason::ChangedRepeatedly))
    }

    /// The city changed outside the agent.
    pub fn city_changed<E, C>(
        &mut self,
        economy: &E,
        control: &mut C,
    ) -> Result<HandleOutcome, AgentError>
    where
        E: Economy,
        C: CityControl,
    {
        self.governor.invalidate(control.city().id);
        self.handle_city(economy, control)
    }

    pub fn city_removed(&mut self, city: CityId) {
        self.release(city);
    }

    fn event(&mut self, event: AgentEvent) {
        match &event {
            AgentEvent::Released { .. } => warn!("{}", event),
            AgentEvent::Retrying { .. } => info!("{}", event),
        }
        self.events.push(event);
    }
}
