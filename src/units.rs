//! Linear unit handling.
//!
//! Projected and geocentric coordinates carry a linear unit selected with
//! `+units=<name>` or an explicit `+to_meter=<factor>`; heights use
//! `+vunits`/`+vto_meter` and default to the horizontal unit. Factors are
//! stored as metres per unit.

use crate::error::ParseError;
use crate::params::ParamList;

struct Unit {
    id: &'static str,
    to_metre: f64,
    name: &'static str,
}

#[rustfmt::skip]
const UNITS: &[Unit] = &[
    Unit { id: "km",     to_metre: 1000.0,                name: "Kilometer" },
    Unit { id: "m",      to_metre: 1.0,                   name: "Meter" },
    Unit { id: "dm",     to_metre: 0.1,                   name: "Decimeter" },
    Unit { id: "cm",     to_metre: 0.01,                  name: "Centimeter" },
    Unit { id: "mm",     to_metre: 0.001,                 name: "Millimeter" },
    Unit { id: "kmi",    to_metre: 1852.0,                name: "International Nautical Mile" },
    Unit { id: "in",     to_metre: 0.0254,                name: "International Inch" },
    Unit { id: "ft",     to_metre: 0.3048,                name: "International Foot" },
    Unit { id: "yd",     to_metre: 0.9144,                name: "International Yard" },
    Unit { id: "mi",     to_metre: 1609.344,              name: "International Statute Mile" },
    Unit { id: "fath",   to_metre: 1.8288,                name: "International Fathom" },
    Unit { id: "ch",     to_metre: 20.1168,               name: "International Chain" },
    Unit { id: "link",   to_metre: 0.201_168,             name: "International Link" },
    Unit { id: "us-in",  to_metre: 1.0 / 39.37,           name: "U.S. Surveyor's Inch" },
    Unit { id: "us-ft",  to_metre: 0.304_800_609_601_219, name: "U.S. Surveyor's Foot" },
    Unit { id: "us-yd",  to_metre: 0.914_401_828_803_658, name: "U.S. Surveyor's Yard" },
    Unit { id: "us-ch",  to_metre: 20.116_840_233_680_47, name: "U.S. Surveyor's Chain" },
    Unit { id: "us-mi",  to_metre: 1609.347_218_694_437,  name: "U.S. Surveyor's Statute Mile" },
    Unit { id: "ind-yd", to_metre: 0.914_395_23,          name: "Indian Yard" },
    Unit { id: "ind-ft", to_metre: 0.304_798_41,          name: "Indian Foot" },
    Unit { id: "ind-ch", to_metre: 20.116_695_06,         name: "Indian Chain" },
];

/// Metres per unit for a named linear unit.
pub fn named(id: &str) -> Result<f64, ParseError> {
    UNITS
        .iter()
        .find(|u| u.id == id)
        .map(|u| u.to_metre)
        .ok_or_else(|| ParseError::InvalidParameter(format!("units={id}: unknown unit")))
}

/// Full name of a linear unit, for diagnostics.
pub fn describe(id: &str) -> Option<&'static str> {
    UNITS.iter().find(|u| u.id == id).map(|u| u.name)
}

/// Parses a `to_meter` style factor, including the `a/b` ratio form.
fn parse_factor(key: &str, text: &str) -> Result<f64, ParseError> {
    let factor = match text.split_once('/') {
        Some((num, den)) => {
            let num = parse_number(key, text, num)?;
            let den = parse_number(key, text, den)?;
            num / den
        }
        None => parse_number(key, text, text)?,
    };
    if !factor.is_finite() || factor <= 0.0 {
        return Err(ParseError::InvalidParameter(format!(
            "{key}={text}: conversion factor must be positive"
        )));
    }
    Ok(factor)
}

fn parse_number(key: &str, whole: &str, part: &str) -> Result<f64, ParseError> {
    part.trim().parse::<f64>().map_err(|_| {
        ParseError::InvalidParameter(format!("{key}={whole}: expected a number or ratio"))
    })
}

fn resolve_pair(
    params: &ParamList,
    unit_key: &'static str,
    factor_key: &'static str,
) -> Result<Option<f64>, ParseError> {
    if let Some(id) = params.value(unit_key) {
        return named(id).map(Some);
    }
    match params.value(factor_key) {
        Some(text) => parse_factor(factor_key, text).map(Some),
        None => Ok(None),
    }
}

/// Horizontal metres-per-unit factor of a definition. `+units` wins over
/// `+to_meter`; the default is metres.
pub fn resolve_horizontal(params: &ParamList) -> Result<f64, ParseError> {
    Ok(resolve_pair(params, "units", "to_meter")?.unwrap_or(1.0))
}

/// Vertical metres-per-unit factor, defaulting to the horizontal factor.
pub fn resolve_vertical(params: &ParamList, horizontal: f64) -> Result<f64, ParseError> {
    Ok(resolve_pair(params, "vunits", "vto_meter")?.unwrap_or(horizontal))
}
