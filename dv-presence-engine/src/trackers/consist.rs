//! Consist tracking
//!
//! Decides which consist the presence line talks about and summarises it:
//! wagon count, cargo, weight, length, derailment and the lead locomotive.

use crate::config::{STATE_DERAILED, STATE_IDLE, STATE_NO_CARGO};
use crate::format::{cargo_label, consist_state_line, empty_car_label};
use crate::types::{Car, CarId, CarType, CargoType, ConsistId, LocoKind};
use crate::world::HostWorld;

/// Small icon shown next to the presence card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SmallIcon {
    pub key: &'static str,
    pub text: &'static str,
}

impl SmallIcon {
    /// No small icon
    pub const NONE: SmallIcon = SmallIcon { key: "", text: "" };

    pub fn is_none(&self) -> bool {
        self.key.is_empty()
    }
}

impl LocoKind {
    /// Icon for a lead locomotive
    pub fn icon(self) -> SmallIcon {
        match self {
            LocoKind::SteamHeavy
            | LocoKind::SteamHeavyBlue
            | LocoKind::Tender
            | LocoKind::TenderBlue => SmallIcon {
                key: "locosteamgray",
                text: "SH 2-8-2",
            },
            LocoKind::Diesel => SmallIcon {
                key: "locodiesel",
                text: "DE6 Diesel",
            },
            LocoKind::Shunter => SmallIcon {
                key: "locoshunteryellow",
                text: "DE2 Shunter",
            },
            LocoKind::Other => SmallIcon::NONE,
        }
    }
}

/// Summary of one pass over a consist's cars
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistAggregate {
    /// Every car, locomotives and tenders included
    pub car_count: usize,
    /// Cars that are not locomotives or tenders
    pub wagon_count: usize,
    /// Any car derailed, locomotives included
    pub derailed: bool,
    pub lead: Option<LocoKind>,
    /// Display name of the first wagon
    pub first_wagon: Option<String>,
    /// First cargo found on a wagon
    pub cargo: Option<CargoType>,
    /// A later wagon carries something other than `cargo`
    pub mixed: bool,
    /// Wagon length in meters
    pub length: f64,
    /// Wagon mass including cargo, in kg
    pub weight: f64,
}

impl ConsistAggregate {
    /// Summarise `cars`
    ///
    /// `known_lead` is the locomotive the player entered; when it is part of
    /// the consist it wins over the first locomotive found.
    pub fn from_cars(cars: &[Car], known_lead: Option<&CarId>) -> Self {
        let mut lead = known_lead.and_then(|id| {
            cars.iter().find(|c| &c.id == id).and_then(|c| match c.car_type {
                CarType::Locomotive { model } => Some(model),
                CarType::Wagon { .. } => None,
            })
        });
        let mut wagon_count = 0;
        let mut derailed = false;
        let mut first_wagon: Option<&str> = None;
        let mut cargo: Option<&CargoType> = None;
        let mut mixed = false;
        let mut length = 0.0;
        let mut weight = 0.0;

        for car in cars {
            derailed = derailed || car.derailed;
            match &car.car_type {
                CarType::Locomotive { model } => {
                    if lead.is_none() {
                        lead = Some(*model);
                    }
                }
                CarType::Wagon { display_name } => {
                    if cargo.is_none() {
                        cargo = car.cargo.as_ref();
                    }
                    mixed = mixed || (cargo.is_some() && cargo != car.cargo.as_ref());
                    if first_wagon.is_none() {
                        first_wagon = Some(display_name.as_str());
                    }
                    wagon_count += 1;
                    length += car.length;
                    weight += car.total_mass();
                }
            }
        }

        Self {
            car_count: cars.len(),
            wagon_count,
            derailed,
            lead,
            first_wagon: first_wagon.map(str::to_string),
            cargo: cargo.cloned(),
            mixed,
            length,
            weight,
        }
    }

    /// The state line for this consist
    pub fn state_line(&self) -> String {
        if self.wagon_count == 0 {
            return if self.derailed {
                STATE_DERAILED.to_string()
            } else {
                STATE_NO_CARGO.to_string()
            };
        }
        let label = match &self.cargo {
            Some(cargo) => cargo_label(cargo, self.mixed),
            None => empty_car_label(
                self.first_wagon.as_deref().unwrap_or_default(),
                self.wagon_count > 1,
            ),
        };
        consist_state_line(&label, self.weight, self.length, self.derailed)
    }
}

/// Last reported values, compared against on every pass
#[derive(Debug, Clone, PartialEq)]
struct ConsistMemo {
    car_count: i64,
    length: f64,
    weight: f64,
    derailed: bool,
}

impl ConsistMemo {
    const UNSET: ConsistMemo = ConsistMemo {
        car_count: -1,
        length: -1.0,
        weight: -1.0,
        derailed: false,
    };

    fn differs_from(&self, aggregate: &ConsistAggregate) -> bool {
        self.car_count != aggregate.car_count as i64
            || self.length != aggregate.length
            || self.weight != aggregate.weight
            || self.derailed != aggregate.derailed
    }
}

/// What the consist tracker currently reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentConsistView {
    pub state: String,
    pub small_icon: SmallIcon,
}

impl CurrentConsistView {
    fn idle() -> Self {
        Self {
            state: STATE_IDLE.to_string(),
            small_icon: SmallIcon::NONE,
        }
    }
}

/// Tracks the consist the player is working with
#[derive(Debug, Clone)]
pub struct ConsistTracker {
    tracked: Option<ConsistId>,
    lead: Option<CarId>,
    memo: ConsistMemo,
    view: CurrentConsistView,
}

impl ConsistTracker {
    pub fn new() -> Self {
        Self {
            tracked: None,
            lead: None,
            memo: ConsistMemo::UNSET,
            view: CurrentConsistView::idle(),
        }
    }

    pub fn view(&self) -> &CurrentConsistView {
        &self.view
    }

    pub fn tracked_consist(&self) -> Option<&ConsistId> {
        self.tracked.as_ref()
    }

    /// Run one detector pass; returns true when the state line needs publishing
    ///
    /// `job_active` keeps the tracked consist alive while the player is out of
    /// any vehicle.
    pub fn update<W: HostWorld + ?Sized>(&mut self, world: &W, job_active: bool) -> bool {
        match world.player_vehicle() {
            None if !job_active => return self.reset_idle(),
            None => {}
            Some(player) => {
                if let Some(loco) = world.last_entered_locomotive() {
                    if loco.consist == player.consist {
                        self.track(&loco.consist, &loco.car);
                    }
                }
            }
        }

        let Some(tracked) = &self.tracked else {
            return false;
        };
        let Some(cars) = world.consist(tracked) else {
            log::trace!("Tracked consist {} not found, keeping last state", tracked);
            return false;
        };

        let aggregate = ConsistAggregate::from_cars(cars, self.lead.as_ref());
        let changed = self.memo.differs_from(&aggregate);
        self.memo = ConsistMemo {
            car_count: aggregate.car_count as i64,
            length: aggregate.length,
            weight: aggregate.weight,
            derailed: aggregate.derailed,
        };

        if changed {
            self.view = CurrentConsistView {
                state: aggregate.state_line(),
                small_icon: aggregate.lead.map(LocoKind::icon).unwrap_or(SmallIcon::NONE),
            };
            log::trace!("Consist {} state: {}", tracked, self.view.state);
        }

        changed
    }

    /// Follow `consist`, led by `loco`
    ///
    /// Change detection starts over when the consist is a different one.
    fn track(&mut self, consist: &ConsistId, loco: &CarId) {
        if self.tracked.as_ref() != Some(consist) {
            log::debug!("Tracking consist {} (lead {})", consist, loco);
            self.tracked = Some(consist.clone());
            self.memo = ConsistMemo::UNSET;
        }
        self.lead = Some(loco.clone());
    }

    /// Drop the tracked consist; true if there was one
    fn reset_idle(&mut self) -> bool {
        let had_consist = self.tracked.is_some();
        if had_consist {
            log::debug!("Player left the consist with no job active, going idle");
        }
        self.tracked = None;
        self.lead = None;
        self.memo = ConsistMemo::UNSET;
        self.view = CurrentConsistView::idle();
        had_consist
    }
}

impl Default for ConsistTracker {
    fn default() -> Self {
        Self::new()
    }
}
