pub mod constants;
pub mod engine;
pub mod ghost;
pub mod maze;
pub mod motion;
pub mod nav;
pub mod player;
pub mod render;
pub mod rng;
pub mod types;
