//! Geometry decoding: zipped shapefile archives into feature collections.

mod decode;
mod feature;
mod loader;
mod polygon;
mod source;

pub use decode::decode_archive;
pub use feature::{
    Feature, FeatureCollection, Geometry, LEGISLATIVE_DISTRICT, POPULATION, PRECINCT_NAME, PRECINCT_NUMBER,
    Properties,
};
pub use loader::{GeometryLoader, LoadEvent, LoadHandle, LoadSequence, LoadTicket};
pub use source::GeometrySource;
