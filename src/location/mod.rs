//! Feature locations: model, parser and coordinate transforms

pub mod parser;
pub mod transform;
pub mod types;

pub use parser::parse_location;
pub use transform::{clip, feature_span, rebase, remap, try_rebase, Window};
pub use types::{
    CompoundKind, FPosition, FRange, FeatureLocation, LocationShape, PositionType, Strand,
};
