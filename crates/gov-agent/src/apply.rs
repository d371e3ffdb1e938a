use crate::AgentError;
use gov_core::{City, CmResult, Specialist, TileState};
use gov_econ::Economy;
use tracing::{debug, warn};

/// Primitive changes a player can make to one of their cities.
pub trait CityControl {
    fn city(&self) -> &City;

    /// Mutable access for the governor's trial evaluations, which restore
    /// whatever they change.
    fn city_mut(&mut self) -> &mut City;

    /// Moves a worker off `tile` (it becomes an entertainer), or puts an
    /// entertainer to work on the empty `tile`.
    fn toggle_worker(&mut self, tile: usize) -> Result<(), AgentError>;

    /// Turns one specialist of role `from` into role `to`.
    fn change_specialist(&mut self, from: Specialist, to: Specialist) -> Result<(), AgentError>;

    /// Recompute the city's derived stats.
    fn refresh(&mut self);
}

/// [`CityControl`] over a city held in memory.
pub struct LocalCity<'a, E> {
    city: &'a mut City,
    economy: &'a E,
}

impl<'a, E: Economy> LocalCity<'a, E> {
    pub fn new(city: &'a mut City, economy: &'a E) -> Self {
        Self { city, economy }
    }
}

impl<E: Economy> CityControl for LocalCity<'_, E> {
    fn city(&self) -> &City {
        &*self.city
    }

    fn city_mut(&mut self) -> &mut City {
        &mut *self.city
    }

    fn toggle_worker(&mut self, tile: usize) -> Result<(), AgentError> {
        let state = self
            .city
            .tiles
            .get(tile)
            .map(|t| t.state)
            .ok_or(AgentError::TileNotUsable(tile))?;
        match state {
            TileState::Worker => {
                self.city.tiles[tile].state = TileState::Empty;
                self.city.specialists.entertainers += 1;
            }
            TileState::Empty => {
                if self.city.specialists.entertainers == 0 {
                    return Err(AgentError::NoFreeCitizen(tile));
                }
                self.city.specialists.entertainers -= 1;
                self.city.tiles[tile].state = TileState::Worker;
            }
            TileState::Unavailable => return Err(AgentError::TileNotUsable(tile)),
        }
        Ok(())
    }

    fn change_specialist(&mut self, from: Specialist, to: Specialist) -> Result<(), AgentError> {
        if !self.economy.can_use_specialist(&*self.city, to) {
            return Err(AgentError::SpecialistNotAllowed(to));
        }
        let available = self.city.specialists.get(from);
        if available == 0 {
            return Err(AgentError::NoSpecialist(from));
        }
        self.city.specialists.set(from, available - 1);
        let target = self.city.specialists.get(to);
        self.city.specialists.set(to, target + 1);
        Ok(())
    }

    fn refresh(&mut self) {
        self.economy.refresh(&mut *self.city);
    }
}

fn apply_steps<C: CityControl>(control: &mut C, result: &CmResult) -> Result<(), AgentError> {
    const PAID: [Specialist; 2] = [Specialist::Scientist, Specialist::Taxman];

    let current = control.city().workers();
    for tile in current.iter().filter(|&i| !result.workers.contains(i)) {
        debug!(tile, "removing worker");
        control.toggle_worker(tile)?;
    }

    for role in PAID {
        let have = control.city().specialists.get(role);
        for _ in result.specialists.get(role)..have {
            control.change_specialist(role, Specialist::Entertainer)?;
        }
    }

    // Every citizen not wanted on a tile is now an entertainer.
    for tile in result.workers.iter().filter(|&i| !current.contains(i)) {
        debug!(tile, "placing worker");
        control.toggle_worker(tile)?;
    }

    for role in PAID {
        let have = control.city().specialists.get(role);
        for _ in have..result.specialists.get(role) {
            control.change_specialist(Specialist::Entertainer, role)?;
        }
    }
    Ok(())
}

/// Moves the city onto `result` and reports whether it now matches it
/// exactly, stats included.
pub fn apply<C: CityControl>(control: &mut C, result: &CmResult) -> bool {
    if CmResult::from_city(control.city()).same_assignment(result) {
        return true;
    }
    let size = control.city().size;
    if result.worker_count() + result.specialist_count() != size {
        warn!(
            city = %control.city().id,
            size,
            "result does not account for every citizen"
        );
        return false;
    }

    let outcome = apply_steps(control, result);
    control.refresh();
    if let Err(e) = outcome {
        warn!(city = %control.city().id, "applying result failed: {e}");
        return false;
    }
    let matched = CmResult::from_city(control.city()).same_assignment(result);
    if !matched {
        debug!(city = %control.city().id, "city differs from the applied result");
    }
    matched
}
