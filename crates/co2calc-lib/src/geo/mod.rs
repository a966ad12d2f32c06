//! Place-name geocoding: provider abstraction, coordinate cache, and the
//! [`GeoLookup`] front door that combines them with timeouts and retries.

mod cache;
mod lookup;
mod provider;

pub use cache::{CoordinateCache, LruCoordinateCache};
pub use lookup::{GeoLookup, ResolvedPlace};
pub use provider::{parse_search_response, GeocodingProvider, NominatimProvider};

pub(crate) use provider::build_client as provider_client;
