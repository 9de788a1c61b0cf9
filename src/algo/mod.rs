// =#====#=
// Tree algorithms: distances, rerooting, canonical ordering
// =#====#=

pub mod canonical;
pub mod metric;
pub mod reroot;

pub use canonical::{NID_ATTR, UltrametricStrategy};
pub use metric::DistanceMode;
