// Process grid factorization for the distributed matrix multiply kernels.
// 2D grids feed Cannon/SUMMA/ScaLAPACK, 3D grids feed Johnson.

use serde::Serialize;
use tracing::debug;

/// Logical 2D arrangement of processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grid2 {
    pub gx: u64,
    pub gy: u64,
}

impl Grid2 {
    pub fn product(&self) -> u64 {
        self.gx * self.gy
    }

    /// Same grid with the two axes exchanged.
    pub fn transposed(&self) -> Grid2 {
        Grid2 {
            gx: self.gy,
            gy: self.gx,
        }
    }
}

/// Logical 3D arrangement of processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grid3 {
    pub gx: u64,
    pub gy: u64,
    pub gz: u64,
}

impl Grid3 {
    pub fn product(&self) -> u64 {
        self.gx * self.gy * self.gz
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GridShape {
    Plane(Grid2),
    Cube(Grid3),
}

impl GridShape {
    pub fn product(&self) -> u64 {
        match self {
            GridShape::Plane(g) => g.product(),
            GridShape::Cube(g) => g.product(),
        }
    }
}

// Largest v with v^exp <= p. Starts from the float estimate and corrects it,
// so exact powers and everything in between go through the same floor rule.
fn floor_root(p: u64, exp: u32, estimate: f64) -> u64 {
    let fits = |v: u64| v.checked_pow(exp).map_or(false, |x| x <= p);

    let mut v = estimate as u64;
    while v > 0 && !fits(v) {
        v -= 1;
    }
    while fits(v + 1) {
        v += 1;
    }
    v
}

/// Largest `v` such that `v * v <= p`.
pub fn nearest_square_root(p: u64) -> u64 {
    floor_root(p, 2, (p as f64).sqrt())
}

/// Largest `v` such that `v * v * v <= p`.
pub fn nearest_cube_root(p: u64) -> u64 {
    floor_root(p, 3, (p as f64).cbrt())
}

/// 2D grid for `procs` processes.
///
/// Perfect squares give a square grid. Anything else falls back to
/// `gx = nearest_square_root(procs / 2)` and `gy = procs / gx`, which is exact
/// for powers of two (`2 * k^2`) and only approximate otherwise.
pub fn square_grid(procs: u64) -> Grid2 {
    let root = nearest_square_root(procs);
    let gx = if root * root == procs {
        root
    } else {
        nearest_square_root(procs / 2)
    };
    let grid = Grid2 {
        gx,
        gy: procs.checked_div(gx).unwrap_or(0),
    };
    if grid.product() != procs {
        debug!(procs, gx = grid.gx, gy = grid.gy, "approximate 2D grid");
    }
    grid
}

/// 3D grid for `procs` processes. Only exact for perfect cubes.
pub fn cube_grid(procs: u64) -> Grid3 {
    let c = nearest_cube_root(procs);
    let grid = Grid3 { gx: c, gy: c, gz: c };
    if grid.product() != procs {
        debug!(procs, gdim = c, "approximate 3D grid");
    }
    grid
}
