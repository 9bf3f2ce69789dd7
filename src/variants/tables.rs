// Per-binary launch layouts, tuned for Lassen (IBM AC922: 2 sockets x 20 cores,
// 4 V100s per node). Everything here is data; `super::Benchmark` fills in the
// placeholders for a given process count.

use crate::config::LibraryRoot;

/// One argument token, either literal or filled in per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    Lit(&'static str),
    /// Process count.
    Procs,
    /// Two resource sets (one per socket) per process.
    RankSets,
    /// Weak-scaled matrix dimension.
    Size,
    Gx,
    Gy,
    /// Edge of a cubic 3D grid.
    Gdim,
    /// `gx,gy`
    GridPair,
    Gpus,
    /// Path below a library install root.
    Path(LibraryRoot, &'static str),
}

/// Value of an environment assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvValue {
    Lit(&'static str),
    /// Inherited loader path with the root's directory appended.
    AppendLibraryPath(LibraryRoot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridPolicy {
    None,
    Square,
    /// Square grid with the axes exchanged so x gets the larger extent.
    /// Cheaper with several GPUs per node.
    SquareTransposed,
    Cube,
}

#[derive(Debug)]
pub struct Layout {
    pub env: &'static [(&'static str, EnvValue)],
    pub header: &'static [Arg],
    /// Binary followed by its size and grid flags.
    pub program: &'static [Arg],
    /// Fixed runtime flags for the binary's execution model.
    pub tuning: &'static [Arg],
    pub grid: GridPolicy,
    pub roots: &'static [LibraryRoot],
    pub needs_gpus: bool,
}

use Arg::*;

// jsrun with one resource set per node owning every core and GPU.
const LASSEN_HEADER: &[Arg] = &[
    Lit("jsrun"), Lit("-b"), Lit("none"),
    Lit("-c"), Lit("ALL_CPUS"),
    Lit("-g"), Lit("ALL_GPUS"),
    Lit("-r"), Lit("1"),
    Lit("-n"), Procs,
];

// jsrun with a 20-core resource set per socket.
const SOCKET_HEADER: &[Arg] = &[
    Lit("jsrun"), Lit("-b"), Lit("rs"),
    Lit("-c"), Lit("20"),
    Lit("-r"), Lit("2"),
    Lit("-n"), RankSets,
];

const LEGION_CPU: &[Arg] = &[
    Lit("-ll:ocpu"), Lit("2"),
    Lit("-ll:othr"), Lit("18"),
    Lit("-ll:onuma"), Lit("1"),
    Lit("-ll:csize"), Lit("50000"),
    Lit("-ll:util"), Lit("2"),
    Lit("-dm:replicate"), Lit("1"),
];

const LEGION_GPU: &[Arg] = &[
    Lit("-ll:ocpu"), Lit("1"),
    Lit("-ll:othr"), Lit("16"),
    Lit("-ll:csize"), Lit("50000"),
    Lit("-ll:util"), Lit("4"),
    Lit("-dm:replicate"), Lit("1"),
    Lit("-ll:gpu"), Gpus,
    Lit("-ll:fsize"), Lit("15000"),
];

pub static CANNON: Layout = Layout {
    env: &[],
    header: LASSEN_HEADER,
    program: &[
        Lit("bin/cannonMM"),
        Lit("-n"), Size,
        Lit("-gx"), Gx,
        Lit("-gy"), Gy,
    ],
    tuning: LEGION_CPU,
    grid: GridPolicy::Square,
    roots: &[],
    needs_gpus: false,
};

pub static SUMMA: Layout = Layout {
    env: &[],
    header: LASSEN_HEADER,
    program: &[
        Lit("bin/summaMM"),
        Lit("-n"), Size,
        Lit("-gx"), Gx,
        Lit("-gy"), Gy,
    ],
    tuning: LEGION_CPU,
    grid: GridPolicy::Square,
    roots: &[],
    needs_gpus: false,
};

pub static CANNON_GPU: Layout = Layout {
    env: &[],
    header: LASSEN_HEADER,
    program: &[
        Lit("bin/cannonMM-cuda"),
        Lit("-n"), Size,
        Lit("-gx"), Gx,
        Lit("-gy"), Gy,
        Lit("-dm:exact_region"),
        Lit("-tm:fill_cpu"),
        Lit("-tm:validate_cpu"),
        Lit("-tm:untrack_valid_regions"),
    ],
    tuning: LEGION_GPU,
    grid: GridPolicy::SquareTransposed,
    roots: &[],
    needs_gpus: true,
};

pub static JOHNSON: Layout = Layout {
    env: &[],
    header: LASSEN_HEADER,
    program: &[
        Lit("bin/johnsonMM"),
        Lit("-n"), Size,
        Lit("-gdim"), Gdim,
    ],
    tuning: LEGION_CPU,
    grid: GridPolicy::Cube,
    roots: &[],
    needs_gpus: false,
};

// TODO: make the OpenMP thread counts of COSMA and ScaLAPACK configurable.
pub static COSMA: Layout = Layout {
    env: &[("COSMA_OVERLAP_COMM_AND_COMP", EnvValue::Lit("ON"))],
    header: SOCKET_HEADER,
    program: &[
        Path(LibraryRoot::Cosma, "build/miniapp/cosma_miniapp"),
        Lit("-r"), Lit("10"),
        Lit("-m"), Size,
        Lit("-n"), Size,
        Lit("-k"), Size,
    ],
    tuning: &[],
    grid: GridPolicy::None,
    roots: &[LibraryRoot::Cosma],
    needs_gpus: false,
};

pub static SCALAPACK: Layout = Layout {
    env: &[("OMP_NUM_THREADS", EnvValue::Lit("20"))],
    header: LASSEN_HEADER,
    program: &[
        Path(LibraryRoot::CosmaScalapack, "build/miniapp/pxgemm_miniapp"),
        Lit("-r"), Lit("10"),
        Lit("--algorithm"), Lit("scalapack"),
        Lit("-n"), Size,
        Lit("-m"), Size,
        Lit("-k"), Size,
    ],
    tuning: &[
        Lit("--block_a"), Lit("1024,1024"),
        Lit("--block_b"), Lit("1024,1024"),
        Lit("--block_c"), Lit("1024,1024"),
        Lit("-p"), GridPair,
    ],
    grid: GridPolicy::Square,
    roots: &[LibraryRoot::CosmaScalapack],
    needs_gpus: false,
};

// Legate launches through jsrun itself, so there is no header.
pub static LEGATE: Layout = Layout {
    env: &[],
    header: &[],
    program: &[
        Path(LibraryRoot::Legate, "bin/legate"),
        Path(LibraryRoot::LegateNumpy, "examples/gemm.py"),
        Lit("-n"), Size,
        Lit("-p"), Lit("64"),
        Lit("-i"), Lit("10"),
        Lit("--num_nodes"), Procs,
    ],
    tuning: &[
        Lit("--omps"), Lit("2"),
        Lit("--ompthreads"), Lit("18"),
        Lit("--nodes"), Procs,
        Lit("--numamem"), Lit("30000"),
        Lit("--eager-alloc-percentage"), Lit("1"),
        Lit("--launcher"), Lit("jsrun"),
        Lit("--cores-per-node"), Lit("40"),
        Lit("--verbose"),
    ],
    grid: GridPolicy::None,
    roots: &[LibraryRoot::Legate, LibraryRoot::LegateNumpy],
    needs_gpus: false,
};

pub static LEGATE_GPU: Layout = Layout {
    env: &[],
    header: &[],
    program: &[
        Path(LibraryRoot::Legate, "bin/legate"),
        Path(LibraryRoot::LegateNumpy, "examples/gemm.py"),
        Lit("-n"), Size,
        Lit("-p"), Lit("64"),
        Lit("-i"), Lit("10"),
    ],
    tuning: &[
        Lit("--omps"), Lit("1"),
        Lit("--ompthreads"), Lit("10"),
        Lit("--nodes"), Procs,
        Lit("--sysmem"), Lit("75000"),
        Lit("--eager-alloc-percentage"), Lit("1"),
        Lit("--fbmem"), Lit("15000"),
        Lit("--gpus"), Gpus,
        Lit("--verbose"),
        Lit("--launcher"), Lit("jsrun"),
        Lit("--cores-per-node"), Lit("40"),
    ],
    grid: GridPolicy::None,
    roots: &[LibraryRoot::Legate, LibraryRoot::LegateNumpy],
    needs_gpus: true,
};

pub static CTF: Layout = Layout {
    env: &[(
        "LD_LIBRARY_PATH",
        EnvValue::AppendLibraryPath(LibraryRoot::OpenblasLib),
    )],
    header: SOCKET_HEADER,
    program: &[
        Path(LibraryRoot::Ctf, "bin/matmul"),
        Lit("-m"), Size,
        Lit("-n"), Size,
        Lit("-k"), Size,
    ],
    tuning: &[
        Lit("-niter"), Lit("10"),
        Lit("-sp_A"), Lit("1"),
        Lit("-sp_B"), Lit("1"),
        Lit("-sp_C"), Lit("1"),
        Lit("-test"), Lit("0"),
    ],
    grid: GridPolicy::None,
    roots: &[LibraryRoot::OpenblasLib, LibraryRoot::Ctf],
    needs_gpus: false,
};
