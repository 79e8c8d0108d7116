pub mod geocode;
pub mod open_meteo;
pub mod sample;

pub use geocode::{GeocodeClient, GeocodedPlace, parse_geocode_body};
pub use open_meteo::{ArchiveClient, parse_archive_body};
pub use sample::{generate_series, weibull_draws};
