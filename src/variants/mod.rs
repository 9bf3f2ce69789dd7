// Benchmark programs and how each one is launched for a given process count.

pub mod command;
pub mod tables;

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::Serialize;
use tracing::debug;

use crate::config::{LibraryRoot, LibraryRoots};
use crate::error::ConfigError;
use crate::scaling::{cube_grid, problem_size, square_grid, GridShape};

pub use command::Command;
use tables::{Arg, EnvValue, GridPolicy, Layout};

/// Supported benchmark programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BenchKind {
    Cannon,
    CannonGpu,
    Johnson,
    Cosma,
    Summa,
    Scalapack,
    Legate,
    LegateGpu,
    Ctf,
}

impl BenchKind {
    pub const ALL: [BenchKind; 9] = [
        BenchKind::Cannon,
        BenchKind::CannonGpu,
        BenchKind::Johnson,
        BenchKind::Cosma,
        BenchKind::Summa,
        BenchKind::Scalapack,
        BenchKind::Legate,
        BenchKind::LegateGpu,
        BenchKind::Ctf,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BenchKind::Cannon => "cannon",
            BenchKind::CannonGpu => "cannon-gpu",
            BenchKind::Johnson => "johnson",
            BenchKind::Cosma => "cosma",
            BenchKind::Summa => "summa",
            BenchKind::Scalapack => "scalapack",
            BenchKind::Legate => "legate",
            BenchKind::LegateGpu => "legate-gpu",
            BenchKind::Ctf => "ctf",
        }
    }

    pub fn layout(&self) -> &'static Layout {
        match self {
            BenchKind::Cannon => &tables::CANNON,
            BenchKind::CannonGpu => &tables::CANNON_GPU,
            BenchKind::Johnson => &tables::JOHNSON,
            BenchKind::Cosma => &tables::COSMA,
            BenchKind::Summa => &tables::SUMMA,
            BenchKind::Scalapack => &tables::SCALAPACK,
            BenchKind::Legate => &tables::LEGATE,
            BenchKind::LegateGpu => &tables::LEGATE_GPU,
            BenchKind::Ctf => &tables::CTF,
        }
    }

    /// Library roots that must be set to build this benchmark's commands.
    pub fn required_roots(&self) -> &'static [LibraryRoot] {
        self.layout().roots
    }

    pub fn needs_gpus(&self) -> bool {
        self.layout().needs_gpus
    }
}

/// Size and grid chosen for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunShape {
    pub procs: u64,
    pub size: u64,
    pub grid: Option<GridShape>,
}

/// A configured benchmark. Immutable once built; `command_for` depends only on
/// the process count and this configuration.
#[derive(Debug, Clone)]
pub struct Benchmark {
    kind: BenchKind,
    initial_size: u64,
    gpus: Option<u32>,
    roots: BTreeMap<LibraryRoot, PathBuf>,
    library_path: Option<String>,
}

impl Benchmark {
    /// Validate the configuration for `kind` up front: every library root it
    /// needs must be set, and GPU benchmarks need a GPU count.
    pub fn new(
        kind: BenchKind,
        initial_size: u64,
        gpus: Option<u32>,
        roots: &LibraryRoots,
    ) -> Result<Self, ConfigError> {
        let layout = kind.layout();

        let mut resolved = BTreeMap::new();
        for &root in layout.roots {
            let dir = roots.get(root).ok_or(ConfigError::MissingRoot {
                var: root.var(),
                bench: kind.name(),
            })?;
            resolved.insert(root, dir.to_path_buf());
        }

        let gpus = if layout.needs_gpus {
            Some(gpus.ok_or(ConfigError::MissingGpus { bench: kind.name() })?)
        } else {
            if gpus.is_some() {
                debug!(bench = kind.name(), "ignoring --gpus for a CPU benchmark");
            }
            None
        };

        Ok(Benchmark {
            kind,
            initial_size,
            gpus,
            roots: resolved,
            library_path: roots.ld_library_path.clone(),
        })
    }

    pub fn kind(&self) -> BenchKind {
        self.kind
    }

    pub fn initial_size(&self) -> u64 {
        self.initial_size
    }

    pub fn gpus(&self) -> Option<u32> {
        self.gpus
    }

    pub fn shape(&self, procs: u64) -> RunShape {
        let grid = match self.kind.layout().grid {
            GridPolicy::None => None,
            GridPolicy::Square => Some(GridShape::Plane(square_grid(procs))),
            GridPolicy::SquareTransposed => Some(GridShape::Plane(square_grid(procs).transposed())),
            GridPolicy::Cube => Some(GridShape::Cube(cube_grid(procs))),
        };
        RunShape {
            procs,
            size: problem_size(self.initial_size, procs),
            grid,
        }
    }

    pub fn command_for(&self, procs: u64) -> Command {
        let layout = self.kind.layout();
        let shape = self.shape(procs);

        let env = layout
            .env
            .iter()
            .map(|(name, value)| (name.to_string(), self.env_value(value)))
            .collect();

        let argv = layout
            .header
            .iter()
            .chain(layout.program)
            .chain(layout.tuning)
            .map(|arg| self.render(arg, &shape))
            .collect();

        Command { env, argv }
    }

    fn root_dir(&self, root: LibraryRoot) -> PathBuf {
        // Roots are checked in `new`, an absent one only happens for a
        // layout that forgot to list it.
        self.roots.get(&root).cloned().unwrap_or_default()
    }

    fn env_value(&self, value: &EnvValue) -> String {
        match value {
            EnvValue::Lit(s) => s.to_string(),
            EnvValue::AppendLibraryPath(root) => {
                let dir = self.root_dir(*root);
                match &self.library_path {
                    Some(inherited) => format!("{}:{}", inherited, dir.display()),
                    None => dir.display().to_string(),
                }
            }
        }
    }

    fn render(&self, arg: &Arg, shape: &RunShape) -> String {
        let (gx, gy, gz) = match shape.grid {
            Some(GridShape::Plane(g)) => (g.gx, g.gy, 1),
            Some(GridShape::Cube(g)) => (g.gx, g.gy, g.gz),
            None => (0, 0, 0),
        };
        match arg {
            Arg::Lit(s) => s.to_string(),
            Arg::Procs => shape.procs.to_string(),
            Arg::RankSets => shape.procs.saturating_mul(2).to_string(),
            Arg::Size => shape.size.to_string(),
            Arg::Gx => gx.to_string(),
            Arg::Gy => gy.to_string(),
            Arg::Gdim => gz.to_string(),
            Arg::GridPair => format!("{},{}", gx, gy),
            Arg::Gpus => self.gpus.unwrap_or_default().to_string(),
            Arg::Path(root, rel) => self.root_dir(*root).join(rel).display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(cmd: &Command) -> Vec<&str> {
        cmd.argv.iter().map(String::as_str).collect()
    }

    fn flag<'a>(cmd: &'a Command, name: &str) -> &'a str {
        let pos = cmd
            .argv
            .iter()
            .position(|a| a == name)
            .unwrap_or_else(|| panic!("{} missing from {}", name, cmd));
        &cmd.argv[pos + 1]
    }

    fn all_roots() -> LibraryRoots {
        LibraryRoots {
            cosma_dir: Some(PathBuf::from("/opt/cosma")),
            cosma_scalapack_dir: Some(PathBuf::from("/opt/cosma-scalapack")),
            legate_dir: Some(PathBuf::from("/opt/legate")),
            legate_numpy_dir: Some(PathBuf::from("/opt/legate.numpy")),
            openblas_lib_dir: Some(PathBuf::from("/opt/openblas/lib")),
            ctf_dir: Some(PathBuf::from("/opt/ctf")),
            ld_library_path: Some("/usr/lib64".to_string()),
        }
    }

    fn bench(kind: BenchKind, size: u64) -> Benchmark {
        Benchmark::new(kind, size, Some(2), &all_roots()).unwrap()
    }

    #[test]
    fn test_cannon_command() {
        let cmd = bench(BenchKind::Cannon, 1000).command_for(4);
        assert!(cmd.env.is_empty());
        assert_eq!(
            strs(&cmd),
            vec![
                "jsrun", "-b", "none", "-c", "ALL_CPUS", "-g", "ALL_GPUS", "-r", "1", "-n", "4",
                "bin/cannonMM", "-n", "1586", "-gx", "2", "-gy", "2",
                "-ll:ocpu", "2", "-ll:othr", "18", "-ll:onuma", "1", "-ll:csize", "50000",
                "-ll:util", "2", "-dm:replicate", "1",
            ]
        );
    }

    #[test]
    fn test_summa_uses_half_square_fallback() {
        let cmd = bench(BenchKind::Summa, 1000).command_for(8);
        assert_eq!(cmd.program(), Some("jsrun"));
        assert!(cmd.argv.contains(&"bin/summaMM".to_string()));
        assert_eq!(flag(&cmd, "-gx"), "2");
        assert_eq!(flag(&cmd, "-gy"), "4");
        // "-n" appears in the header first
        assert_eq!(cmd.argv[10], "8");
        assert_eq!(cmd.argv[13], "2000");
    }

    #[test]
    fn test_cannon_gpu_swaps_axes() {
        let cpu = bench(BenchKind::Cannon, 1000).command_for(8);
        let gpu = Benchmark::new(BenchKind::CannonGpu, 1000, Some(2), &LibraryRoots::default())
            .unwrap()
            .command_for(8);

        assert_eq!((flag(&cpu, "-gx"), flag(&cpu, "-gy")), ("2", "4"));
        assert_eq!((flag(&gpu, "-gx"), flag(&gpu, "-gy")), ("4", "2"));
        assert_eq!(flag(&gpu, "-ll:gpu"), "2");
        assert_eq!(flag(&gpu, "-ll:fsize"), "15000");
        assert!(gpu.argv.contains(&"bin/cannonMM-cuda".to_string()));
        assert!(gpu.argv.contains(&"-tm:untrack_valid_regions".to_string()));
    }

    #[test]
    fn test_johnson_cube_grid() {
        let b = bench(BenchKind::Johnson, 1000);
        let cmd = b.command_for(27);
        assert_eq!(flag(&cmd, "-gdim"), "3");
        assert!(cmd.argv.contains(&"3000".to_string()));
        assert_eq!(b.shape(27).grid.map(|g| g.product()), Some(27));
    }

    #[test]
    fn test_cosma_command() {
        let cmd = bench(BenchKind::Cosma, 1000).command_for(8);
        assert_eq!(
            cmd.to_string(),
            "env COSMA_OVERLAP_COMM_AND_COMP=ON jsrun -b rs -c 20 -r 2 -n 16 \
             /opt/cosma/build/miniapp/cosma_miniapp -r 10 -m 2000 -n 2000 -k 2000"
        );
    }

    #[test]
    fn test_rank_sets_saturate_for_huge_counts() {
        let cmd = bench(BenchKind::Cosma, 1000).command_for(1u64 << 63);
        assert_eq!(flag(&cmd, "-n"), u64::MAX.to_string());

        let cmd = bench(BenchKind::Ctf, 1000).command_for(u64::MAX);
        assert_eq!(flag(&cmd, "-n"), u64::MAX.to_string());
    }

    #[test]
    fn test_scalapack_command() {
        let cmd = bench(BenchKind::Scalapack, 1000).command_for(8);
        assert_eq!(
            cmd.env,
            vec![("OMP_NUM_THREADS".to_string(), "20".to_string())]
        );
        assert_eq!(cmd.argv[11], "/opt/cosma-scalapack/build/miniapp/pxgemm_miniapp");
        assert_eq!(flag(&cmd, "--algorithm"), "scalapack");
        assert_eq!(flag(&cmd, "--block_c"), "1024,1024");
        assert_eq!(flag(&cmd, "-p"), "2,4");
    }

    #[test]
    fn test_legate_commands() {
        let cpu = bench(BenchKind::Legate, 1000).command_for(2);
        assert_eq!(cpu.program(), Some("/opt/legate/bin/legate"));
        assert_eq!(cpu.argv[1], "/opt/legate.numpy/examples/gemm.py");
        assert_eq!(flag(&cpu, "--num_nodes"), "2");
        assert_eq!(flag(&cpu, "--nodes"), "2");
        assert_eq!(flag(&cpu, "--launcher"), "jsrun");
        assert_eq!(cpu.argv.last().map(String::as_str), Some("--verbose"));

        let gpu = Benchmark::new(BenchKind::LegateGpu, 1000, Some(4), &all_roots())
            .unwrap()
            .command_for(2);
        assert_eq!(flag(&gpu, "--gpus"), "4");
        assert_eq!(flag(&gpu, "--fbmem"), "15000");
        assert!(!gpu.argv.contains(&"--num_nodes".to_string()));
        assert_eq!(gpu.argv.last().map(String::as_str), Some("40"));
    }

    #[test]
    fn test_ctf_library_path() {
        let cmd = bench(BenchKind::Ctf, 1000).command_for(1);
        assert_eq!(
            cmd.env,
            vec![(
                "LD_LIBRARY_PATH".to_string(),
                "/usr/lib64:/opt/openblas/lib".to_string()
            )]
        );
        assert_eq!(flag(&cmd, "-n"), "2");
        assert!(cmd.argv.contains(&"/opt/ctf/bin/matmul".to_string()));
        assert_eq!(flag(&cmd, "-test"), "0");

        let roots = LibraryRoots {
            ld_library_path: None,
            ..all_roots()
        };
        let cmd = Benchmark::new(BenchKind::Ctf, 1000, None, &roots)
            .unwrap()
            .command_for(1);
        assert_eq!(cmd.env[0].1, "/opt/openblas/lib");
    }

    #[test]
    fn test_missing_root_fails_before_any_command() {
        let roots = LibraryRoots {
            legate_numpy_dir: None,
            ..all_roots()
        };
        let err = Benchmark::new(BenchKind::Legate, 1000, None, &roots).unwrap_err();
        match err {
            ConfigError::MissingRoot { var, bench } => {
                assert_eq!(var, "LEGATE_NUMPY_DIR");
                assert_eq!(bench, "legate");
            }
            other => panic!("unexpected error: {}", other),
        }

        for kind in BenchKind::ALL {
            let result = Benchmark::new(kind, 1000, Some(1), &LibraryRoots::default());
            assert_eq!(
                result.is_err(),
                !kind.required_roots().is_empty(),
                "{}",
                kind.name()
            );
        }
    }

    #[test]
    fn test_gpu_benchmarks_need_gpu_count() {
        for kind in [BenchKind::CannonGpu, BenchKind::LegateGpu] {
            assert!(kind.needs_gpus());
            let err = Benchmark::new(kind, 1000, None, &all_roots()).unwrap_err();
            assert!(matches!(err, ConfigError::MissingGpus { .. }));
        }
        let cannon = Benchmark::new(BenchKind::Cannon, 1000, Some(4), &all_roots()).unwrap();
        assert_eq!(cannon.gpus(), None);
        assert_eq!(cannon.initial_size(), 1000);
        assert!(!BenchKind::Cannon.needs_gpus());
    }

    #[test]
    fn test_command_for_is_idempotent() {
        for kind in BenchKind::ALL {
            let b = bench(kind, 2048);
            for procs in [1, 2, 4, 8, 16, 27, 64] {
                assert_eq!(b.command_for(procs), b.command_for(procs), "{}", kind.name());
            }
        }
    }

    #[test]
    fn test_grid_products_match_procs() {
        for kind in BenchKind::ALL {
            let b = bench(kind, 1000);
            let counts: &[u64] = match kind.layout().grid {
                GridPolicy::Cube => &[1, 8, 27, 64, 125, 512],
                _ => &[1, 2, 4, 8, 16, 32, 64, 128, 256],
            };
            for &procs in counts {
                if let Some(grid) = b.shape(procs).grid {
                    assert_eq!(grid.product(), procs, "{} at {}", kind.name(), procs);
                }
            }
        }
    }

    #[test]
    fn test_layouts_only_use_their_grid() {
        let uses = |layout: &Layout, wanted: &[Arg]| {
            layout
                .header
                .iter()
                .chain(layout.program)
                .chain(layout.tuning)
                .any(|a| wanted.contains(a))
        };
        for kind in BenchKind::ALL {
            let layout = kind.layout();
            let plane = uses(layout, &[Arg::Gx, Arg::Gy, Arg::GridPair]);
            let cube = uses(layout, &[Arg::Gdim]);
            match layout.grid {
                GridPolicy::None => assert!(!plane && !cube, "{}", kind.name()),
                GridPolicy::Square | GridPolicy::SquareTransposed => {
                    assert!(plane && !cube, "{}", kind.name())
                }
                GridPolicy::Cube => assert!(cube && !plane, "{}", kind.name()),
            }
            assert_eq!(uses(layout, &[Arg::Gpus]), kind.needs_gpus(), "{}", kind.name());
        }
    }

    #[test]
    fn test_layouts_list_every_root_they_use() {
        for kind in BenchKind::ALL {
            let layout = kind.layout();
            let paths = layout
                .header
                .iter()
                .chain(layout.program)
                .chain(layout.tuning)
                .filter_map(|a| match a {
                    Arg::Path(root, _) => Some(*root),
                    _ => None,
                });
            let env = layout.env.iter().filter_map(|(_, v)| match v {
                EnvValue::AppendLibraryPath(root) => Some(*root),
                EnvValue::Lit(_) => None,
            });
            for root in paths.chain(env) {
                assert!(layout.roots.contains(&root), "{} uses {:?}", kind.name(), root);
            }
        }
    }

    #[test]
    fn test_names_match_cli_values() {
        for kind in BenchKind::ALL {
            let parsed = BenchKind::from_str(kind.name(), false).unwrap();
            assert_eq!(parsed, kind);
        }
    }
}
