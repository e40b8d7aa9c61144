//! Chemical species tracked by mass fraction

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Gas constituents a fluid node mixture can carry
///
/// Resolved once when a test is configured; nothing downstream dispatches on
/// species names. Parsing ignores case everywhere, whether through
/// [`FromStr`](std::str::FromStr) or serde; serialization always writes the
/// formula spelling.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(try_from = "String")]
#[strum(ascii_case_insensitive)]
pub enum Species {
    /// Carbon monoxide
    #[serde(rename = "CO")]
    #[strum(serialize = "CO")]
    Co,
    /// Carbon dioxide
    #[serde(rename = "CO2")]
    #[strum(serialize = "CO2")]
    Co2,
    /// Water vapor
    #[serde(rename = "H2O")]
    #[strum(serialize = "H2O")]
    H2o,
    /// Nitrogen
    #[serde(rename = "N2")]
    #[strum(serialize = "N2")]
    N2,
    /// Oxygen
    #[serde(rename = "O2")]
    #[strum(serialize = "O2")]
    O2,
    /// Ammonia
    #[serde(rename = "NH3")]
    #[strum(serialize = "NH3")]
    Nh3,
    /// Hydrogen
    #[serde(rename = "H2")]
    #[strum(serialize = "H2")]
    H2,
    /// Methane
    #[serde(rename = "CH4")]
    #[strum(serialize = "CH4")]
    Ch4,
    /// Helium
    #[serde(rename = "He")]
    #[strum(serialize = "He")]
    He,
}

impl Species {
    /// The four constituents of a standard cabin atmosphere
    pub const AIR: [Species; 4] = [Species::N2, Species::O2, Species::H2o, Species::Co2];
}

impl TryFrom<String> for Species {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse().map_err(|_| format!("Unknown species '{}'", name))
    }
}
