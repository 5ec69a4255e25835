//! Human readable labels for presence lines
//!
//! Pure functions only: everything here takes raw values copied out of the
//! host and returns the text that ends up in a presence record.

use crate::types::CargoType;

/// General category names keyed by the first word of a wagon's display name
const GENERAL_CAR_NAMES: &[(&str, &str)] = &[
    ("FlatbedMilitary", "Military Flatbed"),
    ("Flatbed", "Flatbed"),
    ("Autorack", "Autorack"),
    ("Tank", "Tank Car"),
    ("Boxcar", "Boxcar"),
    ("Hopper", "Hopper"),
    ("Passenger", "Passenger Car"),
    ("Nuclear", "Nuclear Flask"),
];

/// Map a wagon display name ("Tank Orange") to its general category ("Tank Car")
///
/// Unknown types fall back to the first word of the display name.
pub fn general_car_name(display_name: &str) -> &str {
    let first_word = display_name.split(' ').next().unwrap_or(display_name);
    GENERAL_CAR_NAMES
        .iter()
        .find(|(key, _)| *key == first_word)
        .map(|(_, name)| *name)
        .unwrap_or(first_word)
}

/// Label for a consist that carries no cargo, e.g. "Empty Boxcars"
pub fn empty_car_label(display_name: &str, plural: bool) -> String {
    format!(
        "Empty {}{}",
        general_car_name(display_name),
        if plural { "s" } else { "" }
    )
}

/// Cargo name, with ", etc." appended when the consist carries more than one type
pub fn cargo_label(cargo: &CargoType, mixed: bool) -> String {
    format!("{}{}", cargo.name, if mixed { ", etc." } else { "" })
}

/// The full consist state line
///
/// `"<label>: <tons> tons; <meters> meters[; derailed]"`, both numbers with
/// two decimals.
pub fn consist_state_line(label: &str, weight_kg: f64, length_m: f64, derailed: bool) -> String {
    format!(
        "{}: {:.2} tons; {:.2} meters{}",
        label,
        weight_kg / 1000.0,
        length_m,
        if derailed { "; derailed" } else { "" }
    )
}
