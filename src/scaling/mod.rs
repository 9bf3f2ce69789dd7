pub mod grid;
pub mod problem_size;

pub use grid::{
    cube_grid, nearest_cube_root, nearest_square_root, square_grid, Grid2, Grid3, GridShape,
};
pub use problem_size::problem_size;
