// Weak-scaling problem size: keep per-process work of an N^3 multiply constant
// as the process count grows along three dimensions.

use super::grid::nearest_cube_root;

/// Matrix dimension for a run on `procs` processes, starting from
/// `initial_size` on one process. Always even.
pub fn problem_size(initial_size: u64, procs: u64) -> u64 {
    let root = nearest_cube_root(procs);
    let size = if root * root * root == procs {
        initial_size.saturating_mul(root)
    } else {
        (initial_size as f64 * (procs as f64).cbrt()) as u64
    };
    size & !1
}
