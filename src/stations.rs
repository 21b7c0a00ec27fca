//! # NOAA Station Registry
//!
//! Static mapping of the coastal locations offered by the front end to their
//! NOAA CO-OPS station ids. The table is ordered the way the location picker
//! lists it and never changes at runtime.
//!
//! Lookup is total: any name that is not in the table resolves to the
//! default location's station, so resolving a location can never fail.

use serde::Serialize;

/// Location used when a request names no location or an unknown one.
pub const DEFAULT_LOCATION: &str = "San Francisco Bay";

/// A known coastal location and its NOAA station.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Station {
    /// Human readable location name, as shown in the location picker
    pub name: &'static str,
    /// NOAA CO-OPS station id
    pub id: &'static str,
}

/// All supported locations. The first entry is the default.
pub static STATIONS: &[Station] = &[
    Station {
        name: "San Francisco Bay",
        id: "9414290", // San Francisco, CA
    },
    Station {
        name: "Los Angeles",
        id: "9410660", // Los Angeles, CA
    },
    Station {
        name: "Seattle",
        id: "9447130", // Seattle, WA
    },
    Station {
        name: "Miami",
        id: "8723214", // Virginia Key, FL
    },
    Station {
        name: "New York",
        id: "8518750", // The Battery, NY
    },
    Station {
        name: "Boston",
        id: "8443970", // Boston, MA
    },
    Station {
        name: "San Diego",
        id: "9410170", // San Diego, CA
    },
    Station {
        name: "Portland",
        id: "9439040",
    },
    Station {
        name: "Charleston",
        id: "8665530", // Charleston, SC
    },
    Station {
        name: "Honolulu",
        id: "1612340", // Honolulu, HI
    },
];

/// Find a station by exact (case sensitive) location name.
pub fn find(location: &str) -> Option<&'static Station> {
    STATIONS.iter().find(|station| station.name == location)
}

/// Resolve a location name to a NOAA station id, falling back to the
/// default location's station for unknown names.
///
/// # Example
/// ```
/// use tide_forecast_lib::stations::station_id;
///
/// assert_eq!(station_id("Boston"), "8443970");
/// assert_eq!(station_id("Atlantis"), "9414290");
/// ```
pub fn station_id(location: &str) -> &'static str {
    find(location).map_or(STATIONS[0].id, |station| station.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_location_is_first_entry() {
        assert_eq!(STATIONS[0].name, DEFAULT_LOCATION);
        assert_eq!(station_id(DEFAULT_LOCATION), "9414290");
    }

    #[test]
    fn test_known_locations_resolve() {
        assert_eq!(station_id("Seattle"), "9447130");
        assert_eq!(station_id("Honolulu"), "1612340");
        assert_eq!(station_id("Charleston"), "8665530");
    }

    #[test]
    fn test_unknown_location_falls_back_to_default() {
        for name in ["", "Atlantis", "boston", " Boston", "San Francisco"] {
            assert_eq!(
                station_id(name),
                station_id(DEFAULT_LOCATION),
                "{name:?} should resolve to the default station"
            );
        }
    }

    #[test]
    fn test_table_entries_are_unique_and_non_empty() {
        let names: HashSet<_> = STATIONS.iter().map(|s| s.name).collect();
        let ids: HashSet<_> = STATIONS.iter().map(|s| s.id).collect();
        assert_eq!(names.len(), STATIONS.len());
        assert_eq!(ids.len(), STATIONS.len());

        for station in STATIONS {
            assert!(!station.id.is_empty());
            assert!(station.id.chars().all(|c| c.is_ascii_digit()));
            // Same input, same answer
            assert_eq!(station_id(station.name), station_id(station.name));
            assert_eq!(station_id(station.name), station.id);
        }
    }
}
