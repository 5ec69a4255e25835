//! Owned world snapshots
//!
//! [`WorldSnapshot`] is plain data implementing [`HostWorld`]. Hosts that can
//! copy their state out once per tick (or a recorded scenario file) feed the
//! engine through it.

use crate::config::MAX_JOB_TIMER_SECS;
use crate::types::{Car, ConsistId, EngineError, ObservedJob, Result, VehicleRef};
use crate::world::HostWorld;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A copy of everything the engine reads from the host during one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Active jobs, in host iteration order
    #[serde(default)]
    pub jobs: Vec<ObservedJob>,

    /// Yard id -> station display name
    #[serde(default)]
    pub stations: BTreeMap<String, String>,

    /// The car the player is in
    #[serde(default)]
    pub player: Option<VehicleRef>,

    /// The last locomotive the player entered
    #[serde(default)]
    pub last_loco: Option<VehicleRef>,

    /// Consist id -> cars, front to back
    #[serde(default)]
    pub consists: BTreeMap<ConsistId, Vec<Car>>,
}

impl WorldSnapshot {
    /// Create an empty snapshot: no jobs, no vehicles
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: WorldSnapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Builder method: add an active job
    pub fn with_job(mut self, job: ObservedJob) -> Self {
        self.jobs.push(job);
        self
    }

    /// Builder method: register a station display name
    pub fn with_station(mut self, yard_id: impl Into<String>, name: impl Into<String>) -> Self {
        self.stations.insert(yard_id.into(), name.into());
        self
    }

    /// Builder method: add a consist
    pub fn with_consist(mut self, id: impl Into<String>, cars: Vec<Car>) -> Self {
        self.consists.insert(ConsistId::new(id), cars);
        self
    }

    /// Builder method: put the player in a car
    pub fn with_player(mut self, car: impl Into<String>, consist: impl Into<String>) -> Self {
        self.player = Some(VehicleRef::new(car, consist));
        self
    }

    /// Builder method: set the last entered locomotive
    pub fn with_last_loco(mut self, car: impl Into<String>, consist: impl Into<String>) -> Self {
        self.last_loco = Some(VehicleRef::new(car, consist));
        self
    }

    /// Check that the snapshot is internally consistent
    ///
    /// Vehicle handles must point at a car inside the consist they name, car
    /// and job ids must be unique, physical quantities must be finite and
    /// non-negative, and job timers must stay within a year.
    pub fn validate(&self) -> Result<()> {
        let mut job_ids = HashSet::new();
        for job in &self.jobs {
            if !job_ids.insert(&job.id) {
                return Err(EngineError::InvalidSnapshot(format!(
                    "duplicate job id {}",
                    job.id
                )));
            }
            let timers = [job.time_on_job, job.time_limit];
            if timers
                .iter()
                .any(|t| !t.is_finite() || *t < 0.0 || *t > MAX_JOB_TIMER_SECS)
            {
                return Err(EngineError::InvalidSnapshot(format!(
                    "job {} has a negative, non-finite or out of range timer",
                    job.id
                )));
            }
        }

        let mut car_ids = HashSet::new();
        for (consist_id, cars) in &self.consists {
            for car in cars {
                if !car_ids.insert(&car.id) {
                    return Err(EngineError::InvalidSnapshot(format!(
                        "car {} appears more than once",
                        car.id
                    )));
                }
                let quantities = [car.length, car.empty_mass, car.cargo_mass];
                if quantities.iter().any(|q| !q.is_finite() || *q < 0.0) {
                    return Err(EngineError::InvalidSnapshot(format!(
                        "car {} in consist {} has an invalid length or mass",
                        car.id, consist_id
                    )));
                }
            }
        }

        for handle in [&self.player, &self.last_loco].into_iter().flatten() {
            self.check_handle(handle)?;
        }

        if let Some(loco) = &self.last_loco {
            let is_loco = self
                .consist(&loco.consist)
                .and_then(|cars| cars.iter().find(|c| c.id == loco.car))
                .map(Car::is_locomotive)
                .unwrap_or(false);
            if !is_loco {
                return Err(EngineError::InvalidSnapshot(format!(
                    "last entered locomotive {} is not a locomotive",
                    loco.car
                )));
            }
        }

        Ok(())
    }

    fn check_handle(&self, handle: &VehicleRef) -> Result<()> {
        let cars = self
            .consists
            .get(&handle.consist)
            .ok_or_else(|| EngineError::UnknownConsist(handle.consist.clone()))?;
        if cars.iter().any(|c| c.id == handle.car) {
            Ok(())
        } else {
            Err(EngineError::CarNotInConsist {
                car: handle.car.clone(),
                consist: handle.consist.clone(),
            })
        }
    }
}

impl HostWorld for WorldSnapshot {
    fn active_jobs(&self) -> &[ObservedJob] {
        &self.jobs
    }

    fn station_display_name(&self, station_id: &str) -> Option<&str> {
        self.stations.get(station_id).map(String::as_str)
    }

    fn player_vehicle(&self) -> Option<&VehicleRef> {
        self.player.as_ref()
    }

    fn last_entered_locomotive(&self) -> Option<&VehicleRef> {
        self.last_loco.as_ref()
    }

    fn consist(&self, id: &ConsistId) -> Option<&[Car]> {
        self.consists.get(id).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CarId, CarType, JobId, JobKind, LocoKind};

    fn loco(id: &str) -> Car {
        Car {
            id: CarId::new(id),
            car_type: CarType::locomotive(LocoKind::Diesel),
            derailed: false,
            cargo: None,
            empty_mass: 120_000.0,
            cargo_mass: 0.0,
            length: 18.0,
        }
    }

    #[test]
    fn test_empty_snapshot_is_valid() {
        let world = WorldSnapshot::new();
        assert!(world.validate().is_ok());
        assert!(world.active_jobs().is_empty());
        assert!(world.player_vehicle().is_none());
    }

    #[test]
    fn test_handles_must_point_into_consist() {
        let world = WorldSnapshot::new()
            .with_consist("T1", vec![loco("L1")])
            .with_player("L2", "T1");
        assert!(matches!(
            world.validate(),
            Err(EngineError::CarNotInConsist { .. })
        ));

        let world = WorldSnapshot::new().with_player("L1", "T9");
        assert!(matches!(
            world.validate(),
            Err(EngineError::UnknownConsist(_))
        ));
    }

    #[test]
    fn test_last_loco_must_be_locomotive() {
        let mut wagon = loco("W1");
        wagon.car_type = CarType::wagon("Boxcar Brown");
        let world = WorldSnapshot::new()
            .with_consist("T1", vec![loco("L1"), wagon])
            .with_last_loco("W1", "T1");
        assert!(matches!(world.validate(), Err(EngineError::InvalidSnapshot(_))));
    }

    #[test]
    fn test_job_timers_must_be_in_range() {
        let job = ObservedJob {
            id: JobId::new("J1"),
            kind: JobKind::Transport,
            base_payment: 100.0,
            time_on_job: 30.0,
            time_limit: 600.0,
            origin_id: "STA".to_string(),
            destination_id: "STB".to_string(),
        };
        assert!(WorldSnapshot::new().with_job(job.clone()).validate().is_ok());

        let bad = [(-1e19, 600.0), (30.0, 1e19), (-1.0, 600.0), (30.0, f64::NAN)];
        for (time_on_job, time_limit) in bad {
            let world = WorldSnapshot::new().with_job(ObservedJob {
                time_on_job,
                time_limit,
                ..job.clone()
            });
            assert!(
                matches!(world.validate(), Err(EngineError::InvalidSnapshot(_))),
                "accepted timers {} / {}",
                time_on_job,
                time_limit
            );
        }
    }

    #[test]
    fn test_duplicate_car_rejected() {
        let world = WorldSnapshot::new()
            .with_consist("T1", vec![loco("L1")])
            .with_consist("T2", vec![loco("L1")]);
        assert!(world.validate().is_err());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "stations": { "HB": "Harbor" },
            "consists": {
                "T1": [
                    {
                        "id": "L1",
                        "car_type": { "kind": "locomotive", "model": "shunter" },
                        "length": 8.0
                    }
                ]
            },
            "player": { "car": "L1", "consist": "T1" },
            "last_loco": { "car": "L1", "consist": "T1" }
        }"#;
        let world = WorldSnapshot::from_json(json).unwrap();
        assert_eq!(world.station_display_name("HB"), Some("Harbor"));
        assert_eq!(world.consist(&ConsistId::new("T1")).map(|c| c.len()), Some(1));
    }

    #[test]
    fn test_from_json_reports_parse_errors() {
        let result = WorldSnapshot::from_json("{ not json");
        assert!(matches!(result, Err(EngineError::SnapshotParseError(_))));
    }
}
