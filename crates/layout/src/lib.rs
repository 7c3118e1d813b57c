//! Placement and connector geometry for mind-map editors.
//!
//! Everything here is a pure function over a snapshot of nodes, edges and the
//! viewport. Committing the results is the caller's job.

pub mod config;
pub mod geometry;
pub mod placement;
pub mod routing;
pub mod types;

pub use config::LayoutConfig;
pub use geometry::{
    Rect, euclidean_distance, handle_positions, is_position_occupied, node_size, visible_rect,
};
pub use placement::{Placement, PlacementStrategy, RADIAL_ANGLES, find_available_position};
pub use routing::{
    NodeIndex, closest_handles, compute_closest_handles, needs_reoptimization,
    reoptimize_in_place,
};
pub use types::*;
