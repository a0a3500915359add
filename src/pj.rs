//! Resolved coordinate reference systems.
//!
//! A [`Pj`] is a definition string resolved into transform-ready form:
//! the parsed parameter list, the reference ellipsoid, the datum shift,
//! prime meridian, axis orientation, linear units, and, for projected
//! systems, the projection itself. Resolution happens once; a `Pj` either
//! exists completely or not at all.

use std::fmt;

use crate::axis::{AxisDirection, AxisOrder};
use crate::datum::{self, DatumShift};
use crate::error::ParseError;
use crate::params::ParamList;
use crate::proj::{self, ellipsoid, Projection};
use crate::units;

/// Coordinate system family of a [`Pj`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PjType {
    Geographic,
    Projected,
    Geocentric,
    /// Reserved for families the engine does not model; no resolution
    /// path produces it today.
    Other,
}

impl fmt::Display for PjType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PjType::Geographic => "geographic",
            PjType::Projected => "projected",
            PjType::Geocentric => "geocentric",
            PjType::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// What the horizontal components of a tuple mean.
#[derive(Debug)]
pub(crate) enum PjKind {
    /// Longitude and latitude in radians.
    Geographic,
    /// Earth-centred X, Y, Z in the linear unit.
    Geocentric,
    /// Easting and northing in the linear unit.
    Projected(Box<dyn Projection>),
}

/// A resolved coordinate reference system.
#[derive(Debug)]
pub struct Pj {
    definition: String,
    params: ParamList,
    pub(crate) kind: PjKind,
    pub(crate) ellipsoid: ellipsoid::Ellipsoid,
    pub(crate) datum: DatumShift,
    pub(crate) prime_meridian: f64,
    pub(crate) axes: AxisOrder,
    pub(crate) to_metre: f64,
    pub(crate) vto_metre: f64,
}

impl Pj {
    /// Resolves a definition string such as
    /// `+proj=utm +zone=33 +datum=WGS84`.
    pub fn from_definition(definition: &str) -> Result<Self, ParseError> {
        let params = ParamList::parse(definition)?;
        let name = params.value("proj").ok_or(ParseError::Missing("proj"))?;

        let datum_resolution = datum::resolve(&params)?;
        let ellipsoid = ellipsoid::resolve(&params, datum_resolution.ellipsoid_hint)?;
        let to_metre = units::resolve_horizontal(&params)?;
        let vto_metre = units::resolve_vertical(&params, to_metre)?;
        let axes = AxisOrder::resolve(&params)?;
        let prime_meridian = datum::resolve_prime_meridian(&params)?;

        let kind = match name {
            "longlat" | "latlong" | "lonlat" | "latlon" => PjKind::Geographic,
            "geocent" => PjKind::Geocentric,
            projected => PjKind::Projected(proj::from_params(projected, &params, ellipsoid)?),
        };

        Ok(Pj {
            definition: params.to_definition(),
            params,
            kind,
            ellipsoid,
            datum: datum_resolution.shift,
            prime_meridian,
            axes,
            to_metre,
            vto_metre,
        })
    }

    /// The canonical definition text.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Coordinate system family.
    pub fn pj_type(&self) -> PjType {
        match self.kind {
            PjKind::Geographic => PjType::Geographic,
            PjKind::Geocentric => PjType::Geocentric,
            PjKind::Projected(_) => PjType::Projected,
        }
    }

    /// Semi-major axis of the reference ellipsoid in metres.
    pub fn semi_major_axis(&self) -> f64 {
        self.ellipsoid.a
    }

    /// Semi-minor axis of the reference ellipsoid in metres.
    pub fn semi_minor_axis(&self) -> f64 {
        self.ellipsoid.b
    }

    /// First eccentricity squared of the reference ellipsoid.
    pub fn eccentricity_squared(&self) -> f64 {
        self.ellipsoid.e2
    }

    /// Longitude of the prime meridian, in radians east of Greenwich.
    pub fn greenwich_longitude(&self) -> f64 {
        self.prime_meridian
    }

    /// Native axis directions, in axis order.
    pub fn axis_directions(&self) -> [AxisDirection; 3] {
        self.axes.directions()
    }

    /// Metres per linear unit, for the vertical or horizontal axes.
    ///
    /// Geographic systems answer for their height axis as well; the
    /// angular axes have no linear unit.
    pub fn linear_unit_to_metre(&self, vertical: bool) -> f64 {
        if vertical {
            self.vto_metre
        } else {
            self.to_metre
        }
    }

    /// Derives the geographic system on the same datum and ellipsoid.
    ///
    /// Datum, figure, and prime meridian tokens ride along verbatim so
    /// the derived definition resolves identically; linear units and axis
    /// order do not apply to the geographic form and are dropped. A
    /// definition with no figure information at all derives onto WGS84,
    /// matching how it resolved in the first place.
    pub fn geographic(&self) -> Result<Pj, ParseError> {
        let mut defn = String::from("+proj=longlat");
        let mut has_figure = false;

        // Datum block, in resolution precedence order.
        if let Some(text) = self.params.value("nadgrids") {
            push_token(&mut defn, "nadgrids", text);
        } else if let Some(text) = self.params.value("towgs84") {
            push_token(&mut defn, "towgs84", text);
        } else if let Some(text) = self.params.value("datum") {
            push_token(&mut defn, "datum", text);
            has_figure = true;
        }

        // Every explicit figure token is copied; re-parsing applies the
        // same precedence they had in the source definition.
        for key in ["R", "ellps", "a", "es", "e", "rf", "f", "b"] {
            if let Some(text) = self.params.value(key) {
                push_token(&mut defn, key, text);
                has_figure = true;
            }
        }
        if !has_figure {
            push_token(&mut defn, "ellps", "WGS84");
        }

        if let Some(text) = self.params.value("pm") {
            push_token(&mut defn, "pm", text);
        }

        Pj::from_definition(&defn)
    }
}

fn push_token(defn: &mut String, key: &str, value: &str) {
    defn.push_str(" +");
    defn.push_str(key);
    defn.push('=');
    defn.push_str(value);
}

impl fmt::Display for Pj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.pj_type(), self.definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_projected_resolution() {
        let pj = Pj::from_definition("+proj=merc +ellps=WGS84").unwrap();
        assert_eq!(pj.pj_type(), PjType::Projected);
        assert_eq!(pj.semi_major_axis(), 6_378_137.0);
        assert_relative_eq!(pj.semi_minor_axis(), 6_356_752.314_245, epsilon = 1e-3);
        assert_relative_eq!(pj.eccentricity_squared(), 0.006_694_379_990_14, epsilon = 1e-12);
        assert_eq!(pj.greenwich_longitude(), 0.0);
        assert_eq!(pj.linear_unit_to_metre(false), 1.0);
        assert_eq!(pj.linear_unit_to_metre(true), 1.0);
        assert_eq!(
            pj.axis_directions(),
            [AxisDirection::East, AxisDirection::North, AxisDirection::Up]
        );
    }

    #[test]
    fn test_geographic_aliases() {
        for def in [
            "+proj=longlat +ellps=WGS84",
            "+proj=latlong +ellps=WGS84",
            "+proj=lonlat +ellps=WGS84",
            "+proj=latlon +ellps=WGS84",
        ] {
            assert_eq!(Pj::from_definition(def).unwrap().pj_type(), PjType::Geographic);
        }
        let pj = Pj::from_definition("+proj=geocent +datum=WGS84").unwrap();
        assert_eq!(pj.pj_type(), PjType::Geocentric);
    }

    #[test]
    fn test_missing_projection_name() {
        for def in ["", "+ellps=WGS84", "+proj", "+proj +ellps=WGS84"] {
            assert!(matches!(
                Pj::from_definition(def),
                Err(ParseError::Missing("proj"))
            ));
        }
    }

    #[test]
    fn test_unknown_projection_name() {
        assert!(matches!(
            Pj::from_definition("+proj=wink2 +ellps=WGS84"),
            Err(ParseError::UnknownProjection(_))
        ));
    }

    #[test]
    fn test_definition_is_canonical() {
        let pj = Pj::from_definition("  +proj=utm   +zone=33 +datum=WGS84 ").unwrap();
        assert_eq!(pj.definition(), "+proj=utm +zone=33 +datum=WGS84");
        assert_eq!(pj.to_string(), "projected (+proj=utm +zone=33 +datum=WGS84)");
    }

    #[test]
    fn test_units_and_axes() {
        let pj = Pj::from_definition("+proj=utm +zone=19 +datum=NAD83 +units=ft +vunits=us-ft")
            .unwrap();
        assert_eq!(pj.linear_unit_to_metre(false), 0.3048);
        assert_relative_eq!(pj.linear_unit_to_metre(true), 0.304_800_609_601_219);

        let pj = Pj::from_definition("+proj=utm +zone=30 +ellps=WGS84 +axis=neu").unwrap();
        assert_eq!(
            pj.axis_directions(),
            [AxisDirection::North, AxisDirection::East, AxisDirection::Up]
        );
    }

    #[test]
    fn test_prime_meridian() {
        let pj = Pj::from_definition("+proj=longlat +ellps=clrk80ign +pm=paris").unwrap();
        assert_relative_eq!(
            pj.greenwich_longitude(),
            2.337_229_166_666_666_7_f64.to_radians(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_geographic_from_projected() {
        let utm = Pj::from_definition("+proj=utm +zone=33 +datum=WGS84").unwrap();
        let geo = utm.geographic().unwrap();
        assert_eq!(geo.pj_type(), PjType::Geographic);
        assert_eq!(geo.semi_major_axis(), utm.semi_major_axis());
        assert_eq!(geo.eccentricity_squared(), utm.eccentricity_squared());
        assert_eq!(geo.datum, utm.datum);
        assert!(geo.definition().contains("+datum=WGS84"));
    }

    #[test]
    fn test_geographic_carries_shift_and_meridian() {
        let src = Pj::from_definition(
            "+proj=tmerc +ellps=bessel +towgs84=598.1,73.7,418.2,0.202,0.045,-2.455,6.7 +pm=2.5",
        )
        .unwrap();
        let geo = src.geographic().unwrap();
        assert_eq!(geo.semi_major_axis(), src.semi_major_axis());
        assert_eq!(geo.datum, src.datum);
        assert!(geo.datum.has_parameters());
        assert_relative_eq!(geo.greenwich_longitude(), 2.5_f64.to_radians());
    }

    #[test]
    fn test_geographic_defaults_to_wgs84() {
        let src = Pj::from_definition("+proj=eqc").unwrap();
        let geo = src.geographic().unwrap();
        assert_eq!(geo.definition(), "+proj=longlat +ellps=WGS84");
        assert_eq!(geo.semi_major_axis(), 6_378_137.0);
    }

    #[test]
    fn test_geographic_drops_units_and_axes() {
        let src =
            Pj::from_definition("+proj=utm +zone=17 +datum=NAD83 +units=us-ft +axis=neu").unwrap();
        let geo = src.geographic().unwrap();
        assert_eq!(geo.linear_unit_to_metre(false), 1.0);
        assert!(geo.axes.is_enu());
    }

    #[test]
    fn test_geographic_of_geographic() {
        let src = Pj::from_definition("+proj=longlat +datum=GGRS87").unwrap();
        let geo = src.geographic().unwrap();
        assert_eq!(geo.pj_type(), PjType::Geographic);
        assert_eq!(geo.datum, src.datum);
        assert_eq!(geo.semi_major_axis(), src.semi_major_axis());
    }

    #[test]
    fn test_geographic_explicit_figure_overrides() {
        // An explicit sphere keeps its radius through derivation.
        let src = Pj::from_definition("+proj=sinu +R=6371007.181").unwrap();
        let geo = src.geographic().unwrap();
        assert!(geo.ellipsoid.is_sphere());
        assert_eq!(geo.semi_major_axis(), 6_371_007.181);
    }
}
