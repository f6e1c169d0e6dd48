pub mod graph;
pub mod router;

pub use self::graph::{classify_tile, Edge, NavGraph, TileKind};
pub use self::router::{
    nearest_node, path_cost, search_tiles, shortest_path, step_toward, step_toward_nearest_node,
    TileSearch,
};
