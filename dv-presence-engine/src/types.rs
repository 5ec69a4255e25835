//! Core types for the presence engine
//!
//! This module defines the read-only views of the host simulation that the
//! trackers consume (jobs, cars, consists) and the presence record the engine
//! hands to its sink. None of these types own any host state - they are plain
//! data copied out of the game at the start of a tick.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds since the Unix epoch, as the presence sink expects them
pub type EpochSeconds = i64;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while loading or validating host snapshots
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Failed to parse world snapshot: {0}")]
    SnapshotParseError(#[from] serde_json::Error),

    #[error("Invalid world snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Unknown consist: {0}")]
    UnknownConsist(ConsistId),

    #[error("Car {car} is not part of consist {consist}")]
    CarNotInConsist { car: CarId, consist: ConsistId },
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Stable identity of a job for the lifetime of the job
    JobId
);
string_id!(
    /// Identity of a single car (locomotive, tender or wagon)
    CarId
);
string_id!(
    /// Identity of a coupled group of cars
    ConsistId
);

/// Job categories the host simulation hands out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    ShuntingLoad,
    ShuntingUnload,
    Transport,
    EmptyHaul,
    /// Any job type the engine has no phrase for
    #[serde(other)]
    Other,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::ShuntingLoad => write!(f, "ShuntingLoad"),
            JobKind::ShuntingUnload => write!(f, "ShuntingUnload"),
            JobKind::Transport => write!(f, "Transport"),
            JobKind::EmptyHaul => write!(f, "EmptyHaul"),
            JobKind::Other => write!(f, "Other"),
        }
    }
}

/// An active job as seen by the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedJob {
    pub id: JobId,
    pub kind: JobKind,
    /// Only used to rank jobs against each other
    pub base_payment: f64,
    /// Seconds since the job was taken
    pub time_on_job: f64,
    /// Bonus window in seconds
    pub time_limit: f64,
    /// Yard id of the chain origin
    pub origin_id: String,
    /// Yard id of the chain destination
    pub destination_id: String,
}

/// Locomotive and tender models
///
/// Tenders count as part of the locomotive: they are excluded from consist
/// weight and length the same way the engine unit is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocoKind {
    SteamHeavy,
    SteamHeavyBlue,
    Tender,
    TenderBlue,
    Diesel,
    Shunter,
    /// Any other powered vehicle (handcars, mods...)
    Other,
}

impl LocoKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            LocoKind::SteamHeavy => "Steam Heavy",
            LocoKind::SteamHeavyBlue => "Steam Heavy Blue",
            LocoKind::Tender => "Tender",
            LocoKind::TenderBlue => "Tender Blue",
            LocoKind::Diesel => "Diesel",
            LocoKind::Shunter => "Shunter",
            LocoKind::Other => "Locomotive",
        }
    }
}

/// What a car is, as far as presence is concerned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CarType {
    /// Locomotive or tender
    Locomotive { model: LocoKind },
    /// Any freight or passenger wagon, identified by its display name
    /// (e.g. "Boxcar Brown", "Tank Orange")
    Wagon { display_name: String },
}

impl CarType {
    pub fn wagon(display_name: impl Into<String>) -> Self {
        CarType::Wagon {
            display_name: display_name.into(),
        }
    }

    pub fn locomotive(model: LocoKind) -> Self {
        CarType::Locomotive { model }
    }

    /// True for locomotives and tenders
    pub fn is_locomotive(&self) -> bool {
        matches!(self, CarType::Locomotive { .. })
    }

    pub fn display_name(&self) -> &str {
        match self {
            CarType::Locomotive { model } => model.display_name(),
            CarType::Wagon { display_name } => display_name,
        }
    }
}

/// A cargo type loaded in a wagon
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CargoType {
    pub id: String,
    /// Human readable cargo name ("Logs", "Crude Oil", ...)
    pub name: String,
}

impl CargoType {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A single car in a consist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: CarId,
    pub car_type: CarType,
    #[serde(default)]
    pub derailed: bool,
    /// Cargo currently loaded, `None` when empty
    #[serde(default)]
    pub cargo: Option<CargoType>,
    /// Mass of the car itself in kg
    #[serde(default)]
    pub empty_mass: f64,
    /// Mass of the loaded cargo in kg
    #[serde(default)]
    pub cargo_mass: f64,
    /// Coupler-to-coupler length in meters
    pub length: f64,
}

impl Car {
    pub fn is_locomotive(&self) -> bool {
        self.car_type.is_locomotive()
    }

    /// Car mass plus loaded cargo, in kg
    pub fn total_mass(&self) -> f64 {
        self.empty_mass + self.cargo_mass
    }
}

/// Handle to a vehicle the player is associated with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRef {
    pub car: CarId,
    pub consist: ConsistId,
}

impl VehicleRef {
    pub fn new(car: impl Into<String>, consist: impl Into<String>) -> Self {
        Self {
            car: CarId::new(car),
            consist: ConsistId::new(consist),
        }
    }
}

/// The payload handed to the presence sink
///
/// Replaced wholesale on every publish.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceRecord {
    /// Short status line (consist summary)
    pub state: String,
    /// Detail line (current job)
    pub details: String,
    pub start_timestamp: EpochSeconds,
    /// 0 when there is no countdown to show
    pub end_timestamp: EpochSeconds,
    pub small_image_key: String,
    pub small_image_text: String,
    pub large_image_key: String,
}

impl PresenceRecord {
    /// The record sent when presence is switched off
    ///
    /// Everything is blank except the large icon, which never changes.
    pub fn cleared() -> Self {
        Self {
            large_image_key: crate::config::LARGE_ICON_KEY.to_string(),
            ..Self::default()
        }
    }

    pub fn has_countdown(&self) -> bool {
        self.end_timestamp != 0
    }
}

impl fmt::Display for PresenceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.details, self.state)?;
        if !self.small_image_text.is_empty() {
            write!(f, " [{}]", self.small_image_text)?;
        }
        Ok(())
    }
}
