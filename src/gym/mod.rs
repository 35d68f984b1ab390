pub mod grid_world;

pub use grid_world::{render_board, render_values, Action, GridConfig, GridWorld, Pos};
