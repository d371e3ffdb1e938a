use gov_core::{CmResult, FactorTarget, Fitness, Parameter, Stat};

/// Score of `result` under `parameter`, ignoring validity.
pub fn fitness(parameter: &Parameter, result: &CmResult) -> Fitness {
    let mut major: i64 = 0;
    let mut minor: i64 = 0;
    for stat in Stat::ALL {
        let surplus = i64::from(result.surplus[stat]);
        let base = match parameter.factor_target {
            FactorTarget::Surplus => surplus,
            FactorTarget::Extra => i64::from(parameter.minimal_surplus[stat]) - surplus,
        };
        major = major.saturating_add(i64::from(parameter.factor[stat]).saturating_mul(base));
        minor = minor.saturating_add(surplus);
    }
    if result.happy {
        major = major.saturating_add(i64::from(parameter.happy_factor));
    }
    Fitness { major, minor }
}

/// Validity check and scoring for one city and parameter.
#[derive(Clone, Copy, Debug)]
pub struct FitnessEvaluator<'a> {
    parameter: &'a Parameter,
    /// Citizens that must be specialists because there are not enough
    /// usable tiles for all of them.
    unavoidable_specialists: u32,
}

impl<'a> FitnessEvaluator<'a> {
    pub fn new(parameter: &'a Parameter, size: u32, usable_tiles: usize) -> Self {
        Self {
            parameter,
            unavoidable_specialists: size.saturating_sub(usable_tiles as u32),
        }
    }

    pub fn parameter(&self) -> &Parameter {
        self.parameter
    }

    pub fn is_valid(&self, result: &CmResult) -> bool {
        let p = self.parameter;
        if result.disorder && !p.allow_disorder {
            return false;
        }
        if p.require_happy && !result.happy {
            return false;
        }
        if Stat::ALL
            .iter()
            .any(|&s| result.surplus[s] < p.minimal_surplus[s])
        {
            return false;
        }
        p.allow_specialists || result.specialist_count() <= self.unavoidable_specialists
    }

    /// Fitness of a valid result; `None` when `result` is invalid.
    pub fn score(&self, result: &CmResult) -> Option<Fitness> {
        self.is_valid(result)
            .then(|| fitness(self.parameter, result))
    }
}
