//! Named places and closest-place lookup.
//!
//! Lookups are linear scans; candidate lists are expected to be small (the
//! built-in table has twenty cities). Distances are measured on the WGS84
//! ellipsoid.

use serde::Serialize;

use crate::logger;
use crate::math::{geodesic_distance, GeoPoint};

/// Anything with a display name and a position.
pub trait Place {
    fn name(&self) -> &str;
    fn location(&self) -> GeoPoint;
}

/// A point with a display name and its fixed region / time zone association.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedPlace {
    pub name: String,
    pub region: Option<String>,
    pub time_zone: Option<String>,
    pub location: GeoPoint,
}

impl NamedPlace {
    pub fn new(name: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            name: name.into(),
            region: None,
            time_zone: None,
            location,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }
}

impl Place for NamedPlace {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> GeoPoint {
        self.location
    }
}

/// The candidate closest to `point`.
///
/// When several candidates share the minimum distance the earliest one in
/// `candidates` wins. Returns `None` for an empty list or an invalid point.
///
/// Distances are geodesic on the WGS84 ellipsoid, not the spherical model
/// used by [`crate::math::project_point`].
pub fn nearest_place<'a, P: Place>(point: &GeoPoint, candidates: &'a [P]) -> Option<&'a P> {
    if !point.is_valid() {
        return None;
    }

    let mut closest = None;
    let mut shortest = f64::MAX;
    for candidate in candidates {
        let distance = geodesic_distance(point, &candidate.location());
        if distance < shortest {
            closest = Some(candidate);
            shortest = distance;
        }
    }
    closest
}

/// Every candidate paired with its distance in metres, closest first.
///
/// Equal distances are ordered by name, so the result does not depend on
/// the order of `candidates`. Candidates without a valid location sort last.
/// An invalid point gives an empty list. Distances are WGS84 geodesic, as
/// in [`nearest_place`].
pub fn rank_with_distances<'a, P: Place>(
    point: &GeoPoint,
    candidates: &'a [P],
) -> Vec<(&'a P, f64)> {
    if !point.is_valid() {
        return Vec::new();
    }

    let mut ranked: Vec<(&P, f64)> = candidates
        .iter()
        .map(|candidate| (candidate, geodesic_distance(point, &candidate.location())))
        .collect();
    ranked.sort_by(|(a, a_dist), (b, b_dist)| {
        a_dist
            .total_cmp(b_dist)
            .then_with(|| a.name().cmp(b.name()))
    });
    ranked
}

/// Candidates sorted by distance from `point`, ties broken by name.
pub fn rank_places_by_distance<'a, P: Place>(point: &GeoPoint, candidates: &'a [P]) -> Vec<&'a P> {
    rank_with_distances(point, candidates)
        .into_iter()
        .map(|(place, _)| place)
        .collect()
}

/// Provinces and territories of Canada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Province {
    Ontario,
    Quebec,
    NovaScotia,
    NewBrunswick,
    Manitoba,
    BritishColumbia,
    PrinceEdwardIsland,
    Saskatchewan,
    Alberta,
    NewfoundlandAndLabrador,
    NorthwestTerritories,
    Yukon,
    Nunavut,
}

impl Province {
    pub const ALL: [Province; 13] = [
        Province::Ontario,
        Province::Quebec,
        Province::NovaScotia,
        Province::NewBrunswick,
        Province::Manitoba,
        Province::BritishColumbia,
        Province::PrinceEdwardIsland,
        Province::Saskatchewan,
        Province::Alberta,
        Province::NewfoundlandAndLabrador,
        Province::NorthwestTerritories,
        Province::Yukon,
        Province::Nunavut,
    ];

    pub fn capital(self) -> City {
        match self {
            Province::Ontario => City::Toronto,
            Province::Quebec => City::Quebec,
            Province::NovaScotia => City::Halifax,
            Province::NewBrunswick => City::Fredericton,
            Province::Manitoba => City::Winnipeg,
            Province::BritishColumbia => City::Victoria,
            Province::PrinceEdwardIsland => City::Charlottetown,
            Province::Saskatchewan => City::Regina,
            Province::Alberta => City::Edmonton,
            Province::NewfoundlandAndLabrador => City::StJohns,
            Province::NorthwestTerritories => City::Yellowknife,
            Province::Yukon => City::Whitehorse,
            Province::Nunavut => City::Iqaluit,
        }
    }

    /// Two-letter postal abbreviation.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Province::Ontario => "ON",
            Province::Quebec => "QC",
            Province::NovaScotia => "NS",
            Province::NewBrunswick => "NB",
            Province::Manitoba => "MB",
            Province::BritishColumbia => "BC",
            Province::PrinceEdwardIsland => "PE",
            Province::Saskatchewan => "SK",
            Province::Alberta => "AB",
            Province::NewfoundlandAndLabrador => "NL",
            Province::NorthwestTerritories => "NT",
            Province::Yukon => "YT",
            Province::Nunavut => "NU",
        }
    }

    /// Case-insensitive lookup by postal abbreviation.
    pub fn from_abbreviation(abbreviation: &str) -> Option<Province> {
        let abbreviation = abbreviation.trim();
        if abbreviation.is_empty() {
            return None;
        }
        let found = Self::ALL
            .into_iter()
            .find(|p| p.abbreviation().eq_ignore_ascii_case(abbreviation));
        if found.is_none() {
            logger::warn(&format!("Unknown province abbreviation: {}", abbreviation));
        }
        found
    }
}

/// Large Canadian cities: provincial capitals plus a few others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum City {
    StJohns,
    Charlottetown,
    Halifax,
    SaintJohn,
    Fredericton,
    Quebec,
    Montreal,
    Ottawa,
    Toronto,
    ThunderBay,
    Winnipeg,
    Regina,
    Saskatoon,
    Edmonton,
    Calgary,
    Vancouver,
    Victoria,
    Whitehorse,
    Yellowknife,
    Iqaluit,
}

impl City {
    pub const ALL: [City; 20] = [
        City::StJohns,
        City::Charlottetown,
        City::Halifax,
        City::SaintJohn,
        City::Fredericton,
        City::Quebec,
        City::Montreal,
        City::Ottawa,
        City::Toronto,
        City::ThunderBay,
        City::Winnipeg,
        City::Regina,
        City::Saskatoon,
        City::Edmonton,
        City::Calgary,
        City::Vancouver,
        City::Victoria,
        City::Whitehorse,
        City::Yellowknife,
        City::Iqaluit,
    ];

    /// English display name.
    pub fn name(self) -> &'static str {
        match self {
            City::StJohns => "St. John's",
            City::Charlottetown => "Charlottetown",
            City::Halifax => "Halifax",
            City::SaintJohn => "Saint John",
            City::Fredericton => "Fredericton",
            City::Quebec => "Québec City",
            City::Montreal => "Montreal",
            City::Ottawa => "Ottawa",
            City::Toronto => "Toronto",
            City::ThunderBay => "Thunder Bay",
            City::Winnipeg => "Winnipeg",
            City::Regina => "Regina",
            City::Saskatoon => "Saskatoon",
            City::Edmonton => "Edmonton",
            City::Calgary => "Calgary",
            City::Vancouver => "Vancouver",
            City::Victoria => "Victoria",
            City::Whitehorse => "Whitehorse",
            City::Yellowknife => "Yellowknife",
            City::Iqaluit => "Iqaluit",
        }
    }

    pub fn french_name(self) -> Option<&'static str> {
        match self {
            City::Quebec => Some("Ville de Québec"),
            City::Montreal => Some("Montréal"),
            _ => None,
        }
    }

    /// The French name when requested and one exists, otherwise the English one.
    pub fn localized_name(self, french: bool) -> &'static str {
        match self.french_name() {
            Some(name) if french => name,
            _ => self.name(),
        }
    }

    pub fn province(self) -> Province {
        match self {
            City::StJohns => Province::NewfoundlandAndLabrador,
            City::Charlottetown => Province::PrinceEdwardIsland,
            City::Halifax => Province::NovaScotia,
            City::SaintJohn | City::Fredericton => Province::NewBrunswick,
            City::Quebec | City::Montreal => Province::Quebec,
            City::Ottawa | City::Toronto | City::ThunderBay => Province::Ontario,
            City::Winnipeg => Province::Manitoba,
            City::Regina | City::Saskatoon => Province::Saskatchewan,
            City::Edmonton | City::Calgary => Province::Alberta,
            City::Vancouver | City::Victoria => Province::BritishColumbia,
            City::Whitehorse => Province::Yukon,
            City::Yellowknife => Province::NorthwestTerritories,
            City::Iqaluit => Province::Nunavut,
        }
    }

    /// City centre.
    pub fn center(self) -> GeoPoint {
        let (latitude, longitude) = match self {
            City::StJohns => (47.5675, -52.707222),
            City::Charlottetown => (46.233333, -63.15),
            City::Halifax => (44.854444, -63.199167),
            City::SaintJohn => (45.280556, -66.076111),
            City::Fredericton => (45.957319, -66.647818),
            City::Quebec => (46.816667, -71.216667),
            City::Montreal => (45.5, -73.566667),
            City::Ottawa => (45.417, -75.7),
            City::Toronto => (43.7, -79.4),
            City::ThunderBay => (48.382222, -89.246111),
            City::Winnipeg => (49.899444, -97.139167),
            City::Regina => (50.454722, -104.606667),
            City::Saskatoon => (52.133333, -106.683333),
            City::Edmonton => (53.533333, -113.5),
            City::Calgary => (51.05, -114.066667),
            City::Vancouver => (49.25, -123.1),
            City::Victoria => (48.422151, -123.3657),
            City::Whitehorse => (60.716667, -135.05),
            City::Yellowknife => (62.442222, -114.3975),
            City::Iqaluit => (63.748611, -68.519722),
        };
        GeoPoint::new(latitude, longitude)
    }

    /// IANA time zone identifier.
    pub fn time_zone(self) -> &'static str {
        match self {
            City::StJohns => "America/St_Johns",
            City::Charlottetown | City::Halifax => "America/Halifax",
            City::SaintJohn | City::Fredericton => "America/Moncton",
            City::Quebec | City::Ottawa | City::Toronto => "America/Toronto",
            City::Montreal => "America/Montreal",
            City::ThunderBay => "America/Thunder_Bay",
            City::Winnipeg => "America/Winnipeg",
            City::Regina | City::Saskatoon => "America/Regina",
            City::Edmonton | City::Calgary => "America/Edmonton",
            City::Vancouver | City::Victoria => "America/Vancouver",
            City::Whitehorse => "America/Whitehorse",
            City::Yellowknife => "America/Yellowknife",
            City::Iqaluit => "America/Iqaluit",
        }
    }

    pub fn as_place(self) -> NamedPlace {
        NamedPlace::new(self.name(), self.center())
            .with_region(self.province().abbreviation())
            .with_time_zone(self.time_zone())
    }

    /// Every city as a [`NamedPlace`], in table order.
    pub fn all_places() -> Vec<NamedPlace> {
        Self::ALL.into_iter().map(City::as_place).collect()
    }

    pub fn closest_to(point: &GeoPoint) -> Option<City> {
        nearest_place(point, &Self::ALL).copied()
    }

    pub fn ranked_by_distance(point: &GeoPoint) -> Vec<City> {
        rank_places_by_distance(point, &Self::ALL)
            .into_iter()
            .copied()
            .collect()
    }
}

impl Place for City {
    fn name(&self) -> &str {
        City::name(*self)
    }

    fn location(&self) -> GeoPoint {
        self.center()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twins() -> Vec<NamedPlace> {
        let spot = GeoPoint::new(10.0, 10.0);
        vec![
            NamedPlace::new("Beta", spot),
            NamedPlace::new("Alpha", spot),
            NamedPlace::new("Far", GeoPoint::new(20.0, 20.0)),
        ]
    }

    #[test]
    fn test_nearest_place_empty_is_none() {
        let empty: Vec<NamedPlace> = Vec::new();
        assert!(nearest_place(&GeoPoint::new(0.0, 0.0), &empty).is_none());
    }

    #[test]
    fn test_nearest_place_invalid_point_is_none() {
        assert!(nearest_place(&GeoPoint::unset(), &twins()).is_none());
        assert!(rank_places_by_distance(&GeoPoint::new(95.0, 0.0), &twins()).is_empty());
    }

    #[test]
    fn test_tie_policies_differ() {
        let candidates = twins();
        let point = GeoPoint::new(11.0, 11.0);

        // First of the tied minima in input order.
        let nearest = nearest_place(&point, &candidates).unwrap();
        assert_eq!(nearest.name, "Beta");

        // Ties ordered by name instead.
        let ranked = rank_places_by_distance(&point, &candidates);
        let names: Vec<&str> = ranked.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Far"]);
    }

    #[test]
    fn test_rank_is_independent_of_input_order() {
        let mut candidates = twins();
        let point = GeoPoint::new(11.0, 11.0);
        let forward: Vec<String> = rank_places_by_distance(&point, &candidates)
            .iter()
            .map(|p| p.name.clone())
            .collect();
        candidates.reverse();
        let backward: Vec<String> = rank_places_by_distance(&point, &candidates)
            .iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_rank_puts_unlocated_candidates_last() {
        let candidates = vec![
            NamedPlace::new("Nowhere", GeoPoint::unset()),
            NamedPlace::new("Somewhere", GeoPoint::new(1.0, 1.0)),
        ];
        let ranked = rank_with_distances(&GeoPoint::new(0.0, 0.0), &candidates);
        assert_eq!(ranked[0].0.name, "Somewhere");
        assert!(ranked[0].1 > 150_000.0 && ranked[0].1 < 160_000.0);
        assert!(ranked[1].1.is_nan());

        let nearest = nearest_place(&GeoPoint::new(0.0, 0.0), &candidates).unwrap();
        assert_eq!(nearest.name, "Somewhere");
    }

    #[test]
    fn test_rank_distances_are_ellipsoidal() {
        use crate::math::spherical_distance;

        let origin = City::Ottawa.center();
        let places = [City::Montreal.as_place()];
        let ranked = rank_with_distances(&origin, &places);
        let montreal = City::Montreal.center();
        assert_eq!(ranked[0].1, geodesic_distance(&origin, &montreal));
        assert!((ranked[0].1 - spherical_distance(&origin, &montreal)).abs() > 1.0);
    }

    #[test]
    fn test_closest_city() {
        // Kanata, just west of Ottawa.
        let kanata = GeoPoint::new(45.3, -75.9);
        assert_eq!(City::closest_to(&kanata), Some(City::Ottawa));

        let laval = GeoPoint::new(45.57, -73.7);
        assert_eq!(City::closest_to(&laval), Some(City::Montreal));
    }

    #[test]
    fn test_ranked_cities_start_with_closest() {
        let ranked = City::ranked_by_distance(&City::Ottawa.center());
        assert_eq!(ranked.len(), City::ALL.len());
        assert_eq!(ranked[0], City::Ottawa);
        assert_eq!(ranked[1], City::Montreal);
    }

    #[test]
    fn test_city_names_and_places() {
        assert_eq!(City::Montreal.localized_name(true), "Montréal");
        assert_eq!(City::Montreal.localized_name(false), "Montreal");
        assert_eq!(City::Toronto.localized_name(true), "Toronto");

        let place = City::Whitehorse.as_place();
        assert_eq!(place.name, "Whitehorse");
        assert_eq!(place.region.as_deref(), Some("YT"));
        assert_eq!(place.time_zone.as_deref(), Some("America/Whitehorse"));
        assert_eq!(City::all_places().len(), 20);
    }

    #[test]
    fn test_every_city_center_is_valid() {
        for city in City::ALL {
            assert!(city.center().is_valid(), "{:?}", city);
        }
    }

    #[test]
    fn test_every_capital_is_in_its_province() {
        for province in Province::ALL {
            assert_eq!(province.capital().province(), province);
        }
    }

    #[test]
    fn test_province_from_abbreviation() {
        assert_eq!(Province::from_abbreviation("on"), Some(Province::Ontario));
        assert_eq!(Province::from_abbreviation("QC"), Some(Province::Quebec));
        assert_eq!(Province::from_abbreviation(" nu "), Some(Province::Nunavut));
        assert_eq!(Province::from_abbreviation("XX"), None);
        assert_eq!(Province::from_abbreviation(""), None);
    }
}
