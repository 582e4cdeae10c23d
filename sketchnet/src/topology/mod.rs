//! Wire topology: normalization of raw drawn segments into a canonical
//! disjoint set, and junction-inferred connectivity graphs over it.

pub mod graph;
pub mod normalize;
