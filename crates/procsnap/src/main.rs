//! procsnap - one-shot process and machine snapshot.
//!
//! Runs a single refresh over `/proc` and prints the machine facts followed by
//! the busiest processes, as text or JSON.

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[cfg(target_os = "linux")]
use procsnap_core::collector::RealFs;
#[cfg(not(target_os = "linux"))]
use procsnap_core::collector::mock::MockFs;
use procsnap_core::collector::{Collector, CollectorConfig};
use procsnap_core::model::SystemSnapshot;

/// Point-in-time process and machine statistics.
#[derive(Parser)]
#[command(name = "procsnap", about = "Point-in-time process and machine statistics", version)]
struct Args {
    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Release metadata file providing PRETTY_NAME.
    #[arg(long, default_value = "/etc/os-release")]
    os_release: String,

    /// User database used to resolve UIDs to names.
    #[arg(long, default_value = "/etc/passwd")]
    passwd: String,

    /// Kernel clock ticks per second (USER_HZ).
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u64).range(1..))]
    clock_ticks: u64,

    /// Number of processes to print (0 prints all).
    #[arg(short = 'n', long, default_value = "20")]
    limit: usize,

    /// Print the snapshot as JSON.
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Logs go to stderr so they never mix with the snapshot on stdout.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("procsnap={}", level).parse().expect("valid directive"))
        .add_directive(format!("procsnap_core={}", level).parse().expect("valid directive"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_text(snapshot: &SystemSnapshot, limit: usize) {
    let machine = &snapshot.machine;
    println!("OS:        {}", machine.operating_system);
    println!("Kernel:    {}", machine.kernel);
    println!("CPU:       {:.1}%", machine.cpu_utilization * 100.0);
    println!("Memory:    {:.1}%", machine.memory_utilization * 100.0);
    println!(
        "Processes: {} total, {} running",
        machine.total_processes, machine.running_processes
    );
    println!("Uptime:    {}s", machine.uptime);
    println!();
    println!(
        "{:>7}  {:<10}  {:>6}  {:>10}  {:>9}  COMMAND",
        "PID", "USER", "CPU%", "RAM(kB)", "UPTIME"
    );

    let shown = if limit == 0 {
        snapshot.processes.len()
    } else {
        limit
    };
    for process in snapshot.processes.iter().take(shown) {
        let uptime = process
            .uptime
            .map(|s| format!("{}s", s))
            .unwrap_or_default();
        println!(
            "{:>7}  {:<10}  {:>6.2}  {:>10}  {:>9}  {}",
            process.pid,
            process.user,
            process.cpu_utilization,
            process.ram(),
            uptime,
            process.command
        );
    }
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let config = CollectorConfig::default()
        .with_proc_path(&args.proc_path)
        .with_os_release_path(&args.os_release)
        .with_passwd_path(&args.passwd)
        .with_clock_ticks(args.clock_ticks);

    info!(
        "procsnap {} reading proc={}, passwd={}",
        env!("CARGO_PKG_VERSION"),
        args.proc_path,
        args.passwd
    );

    #[cfg(target_os = "linux")]
    let collector = Collector::new(RealFs::new(), config);
    #[cfg(not(target_os = "linux"))]
    let collector = {
        tracing::warn!("Not running on Linux, using mock filesystem");
        Collector::new(MockFs::typical_system(), config)
    };

    let snapshot = collector.refresh();
    info!("Collected {} processes", snapshot.processes.len());

    if args.json {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize snapshot");
                std::process::exit(1);
            }
        }
    } else {
        print_text(&snapshot, args.limit);
    }
}
