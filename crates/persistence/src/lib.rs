#![deny(warnings)]

//! Persistence layer: saved governor parameters and per-city attributes.
//!
//! A parameter is stored as a fixed 29-byte bincode record that starts with
//! a format version. Records live in an [`AttributeStore`] keyed by
//! attribute kind and city, which is saved to disk as a whole.

use anyhow::{bail, Context, Result};
use gov_core::{CityId, FactorTarget, Parameter, Stat, NUM_STATS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Current format version of [`SavedParameter`].
pub const PARAMETER_VERSION: u8 = 2;

/// Encoded size of a [`SavedParameter`].
pub const SAVED_PARAMETER_SIZE: usize = 29;

/// On-disk form of a [`Parameter`].
///
/// `allow_disorder` and `allow_specialists` are not stored; they are only
/// meaningful for automated players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedParameter {
    pub version: u8,
    /// (minimal surplus, factor) per stat.
    pub stats: [(i16, i16); NUM_STATS],
    pub happy_factor: i16,
    pub factor_target: u8,
    pub require_happy: bool,
}

fn narrow(value: i32, what: &str, stat: Stat) -> Result<i16> {
    i16::try_from(value).with_context(|| format!("{what} of {stat} ({value}) does not fit in 16 bits"))
}

impl SavedParameter {
    pub fn from_parameter(p: &Parameter) -> Result<Self> {
        let mut stats = [(0, 0); NUM_STATS];
        for stat in Stat::ALL {
            stats[stat.index()] = (
                narrow(p.minimal_surplus[stat], "minimal surplus", stat)?,
                narrow(p.factor[stat], "factor", stat)?,
            );
        }
        Ok(Self {
            version: PARAMETER_VERSION,
            stats,
            happy_factor: i16::try_from(p.happy_factor)
                .with_context(|| format!("happy factor {} does not fit in 16 bits", p.happy_factor))?,
            factor_target: match p.factor_target {
                FactorTarget::Surplus => 0,
                FactorTarget::Extra => 1,
            },
            require_happy: p.require_happy,
        })
    }

    pub fn into_parameter(self) -> Result<Parameter> {
        if self.version != PARAMETER_VERSION {
            bail!("unsupported parameter version {}", self.version);
        }
        let mut p = Parameter {
            happy_factor: i32::from(self.happy_factor),
            factor_target: match self.factor_target {
                0 => FactorTarget::Surplus,
                1 => FactorTarget::Extra,
                other => bail!("unknown factor target {other}"),
            },
            require_happy: self.require_happy,
            allow_disorder: false,
            allow_specialists: true,
            ..Parameter::default()
        };
        for stat in Stat::ALL {
            let (minimal, factor) = self.stats[stat.index()];
            p.minimal_surplus[stat] = i32::from(minimal);
            p.factor[stat] = i32::from(factor);
        }
        Ok(p)
    }
}

/// Encode `p` as a versioned record.
pub fn encode_parameter(p: &Parameter) -> Result<Vec<u8>> {
    let saved = SavedParameter::from_parameter(p)?;
    bincode::serialize(&saved).context("encoding parameter")
}

/// Decode a record written by [`encode_parameter`].
pub fn decode_parameter(bytes: &[u8]) -> Result<Parameter> {
    match bytes.first() {
        None => bail!("empty parameter record"),
        Some(&v) if v != PARAMETER_VERSION => bail!("unsupported parameter version {v}"),
        Some(_) => {}
    }
    if bytes.len() != SAVED_PARAMETER_SIZE {
        bail!(
            "parameter record is {} bytes, expected {}",
            bytes.len(),
            SAVED_PARAMETER_SIZE
        );
    }
    let saved: SavedParameter = bincode::deserialize(bytes).context("decoding parameter")?;
    saved.into_parameter()
}

/// Kinds of per-city data kept by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// Parameter the agent is managing the city with.
    GovernorParameter,
    /// Last parameter edited in a front end for the city.
    FrontEndParameter,
}

/// Opaque byte blobs keyed by attribute and city.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeStore {
    entries: BTreeMap<(Attribute, CityId), Vec<u8>>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, attr: Attribute, city: CityId, data: Vec<u8>) {
        self.entries.insert((attr, city), data);
    }

    pub fn get(&self, attr: Attribute, city: CityId) -> Option<&[u8]> {
        self.entries.get(&(attr, city)).map(Vec::as_slice)
    }

    pub fn remove(&mut self, attr: Attribute, city: CityId) -> Option<Vec<u8>> {
        self.entries.remove(&(attr, city))
    }

    /// Drop every attribute of `city`.
    pub fn clear_city(&mut self, city: CityId) {
        self.entries.retain(|(_, c), _| *c != city);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, CityId, &[u8])> {
        self.entries
            .iter()
            .map(|((a, c), v)| (*a, *c, v.as_slice()))
    }

    pub fn set_parameter(&mut self, attr: Attribute, city: CityId, p: &Parameter) -> Result<()> {
        let bytes = encode_parameter(p)?;
        self.set(attr, city, bytes);
        Ok(())
    }

    /// The stored parameter, if any.
    pub fn parameter(&self, attr: Attribute, city: CityId) -> Result<Option<Parameter>> {
        self.get(attr, city)
            .map(|b| decode_parameter(b).with_context(|| format!("{attr:?} of city {city}")))
            .transpose()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).context("encoding attribute store")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).context("decoding attribute store")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(path, self.to_bytes()?).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), entries = self.len(), "saved attributes");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let store = Self::from_bytes(&bytes)?;
        debug!(path = %path.display(), entries = store.len(), "loaded attributes");
        Ok(store)
    }
}
