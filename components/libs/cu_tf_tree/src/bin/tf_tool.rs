use clap::{Parser, Subcommand};
use cu_tf_tree::{
    read_configuration, BufferConfig, BufferTree, FormatLoader, RonStaticLoader, StampedIsometry,
    TfResult, TransformType,
};
use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::panic;
use std::path::{Path, PathBuf};
use std::thread::ScopedJoinHandle;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(author, version, about)]
struct TfToolCli {
    /// RON buffer configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load static edges and write the frame graph as DOT (and PDF if graphviz is around)
    Dot { edges: PathBuf },
    /// Load static edges and print the transform between two frames
    Lookup {
        edges: PathBuf,
        from: String,
        to: String,
        /// Query time in nanoseconds, latest values when omitted
        #[arg(short, long, allow_negative_numbers = true)]
        time: Option<i64>,
    },
    /// Time lookups on a chain of frames while a writer keeps updating it
    Bench {
        #[arg(long, default_value_t = 100)]
        frames: usize,
        #[arg(long, default_value_t = 10_000)]
        lookups: usize,
        #[arg(long, default_value_t = 8)]
        threads: usize,
    },
}

/// Lookups performed by one `bench` run and how long each phase took.
#[derive(Debug)]
struct BenchReport {
    single_threaded: usize,
    single_elapsed: Duration,
    multi_threaded: usize,
    multi_elapsed: Duration,
}

fn load_tree(config: BufferConfig, edges: &Path) -> TfResult<BufferTree> {
    let tree = BufferTree::with_config(config);
    RonStaticLoader::new().load_into_buffer(edges, &tree)?;
    info!("Loaded {} frames from {}", tree.frames().len(), edges.display());
    Ok(tree)
}

/// DOT text of the loaded graph and the path it was saved to.
fn dot(config: BufferConfig, edges: &Path) -> TfResult<(String, PathBuf)> {
    let tree = load_tree(config, edges)?;
    let path = tree.save_visualization()?;
    Ok((tree.visualize(), path))
}

fn lookup(
    config: BufferConfig,
    edges: &Path,
    from: &str,
    to: &str,
    time: Option<i64>,
) -> TfResult<StampedIsometry> {
    let tree = load_tree(config, edges)?;
    match time {
        Some(time) => tree.lookup_transform(from, to, time),
        None => tree.lookup_latest_transform(from, to),
    }
}

fn frame_name(i: usize) -> String {
    if i == 0 {
        "base".to_string()
    } else {
        format!("frame{i}")
    }
}

/// Join every worker. A panicked worker is re-raised on the calling thread.
fn join_all<'scope, I>(handles: I) -> TfResult<()>
where
    I: IntoIterator<Item = ScopedJoinHandle<'scope, TfResult<()>>>,
{
    let results: Vec<TfResult<()>> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
        .collect();
    results.into_iter().collect()
}

fn bench(
    config: BufferConfig,
    num_frames: usize,
    num_lookups: usize,
    num_threads: usize,
) -> TfResult<BenchReport> {
    let num_frames = num_frames.max(1);
    let num_threads = num_threads.max(1);
    let tree = BufferTree::with_config(config);

    info!("Setting up {num_frames} frames in a chain");
    for i in 0..num_frames {
        let kind = if i + 1 == num_frames {
            TransformType::Dynamic
        } else {
            TransformType::Static
        };
        tree.update(
            &frame_name(i),
            &frame_name(i + 1),
            StampedIsometry::new([1.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0], 0),
            kind,
        )?;
    }
    let tip = frame_name(num_frames);
    let last = frame_name(num_frames - 1);
    tree.update(
        &last,
        &tip,
        StampedIsometry::new([1.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0], 1_000_000),
        TransformType::Dynamic,
    )?;

    let start = Instant::now();
    for _ in 0..num_lookups {
        tree.lookup_transform("base", &tip, 500_000)?;
    }
    let single_elapsed = start.elapsed();

    let lookups_per_thread = num_lookups / num_threads;
    let start = Instant::now();
    std::thread::scope(|s| {
        let writer = s.spawn(|| -> TfResult<()> {
            for i in 0..lookups_per_thread as i64 {
                tree.update(
                    &last,
                    &tip,
                    StampedIsometry::new([1.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0], 1_000_000 + i),
                    TransformType::Dynamic,
                )?;
            }
            Ok(())
        });
        let readers: Vec<_> = (0..num_threads)
            .map(|t| {
                let tree = &tree;
                s.spawn(move || -> TfResult<()> {
                    for i in 0..lookups_per_thread {
                        let frame = if i % 2 == 0 {
                            frame_name(num_frames.saturating_sub(t % 10).max(1))
                        } else {
                            frame_name(num_frames)
                        };
                        tree.lookup_transform("base", &frame, 500_000)?;
                    }
                    Ok(())
                })
            })
            .collect();
        join_all(std::iter::once(writer).chain(readers))
    })?;

    Ok(BenchReport {
        single_threaded: num_lookups,
        single_elapsed,
        multi_threaded: lookups_per_thread * num_threads,
        multi_elapsed: start.elapsed(),
    })
}

fn print_timing(lookups: usize, elapsed: Duration) {
    println!("  {lookups} lookups in {elapsed:?}");
    if lookups > 0 {
        println!("  Avg: {:?} per lookup", elapsed / lookups as u32);
    }
}

fn main() -> TfResult<()> {
    let args = TfToolCli::parse();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    // A second logger in the same process is the only failure here, keep the first one.
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto);

    let config = match &args.config {
        Some(path) => read_configuration(path)?,
        None => BufferConfig::default(),
    };

    match args.command {
        Command::Dot { edges } => {
            let (text, path) = dot(config, &edges)?;
            print!("{text}");
            info!("Graph written to {}", path.display());
        }
        Command::Lookup {
            edges,
            from,
            to,
            time,
        } => {
            let transform = lookup(config, &edges, &from, &to, time)?;
            println!("{from} -> {to}: {transform}");
        }
        Command::Bench {
            frames,
            lookups,
            threads,
        } => {
            let report = bench(config, frames, lookups, threads)?;
            println!("Single-threaded lookup benchmark:");
            print_timing(report.single_threaded, report.single_elapsed);
            println!("\nMulti-threaded lookup benchmark ({threads}x threads, 1 writer):");
            print_timing(report.multi_threaded, report.multi_elapsed);
        }
    }
    Ok(())
}
