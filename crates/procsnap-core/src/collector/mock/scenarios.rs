//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` filesystem states
//! for testing various system conditions.

use super::filesystem::MockFs;

/// Builds a `/proc/[pid]/stat` line with the fields the readers consume
/// (utime, stime, starttime) and plausible values elsewhere.
fn stat_line(pid: u32, comm: &str, state: char, utime: u64, stime: u64, starttime: u64) -> String {
    format!(
        "{pid} ({comm}) {state} 1 {pid} {pid} 0 -1 4194304 1000 0 10 0 {utime} {stime} 0 0 20 0 1 0 \
         {starttime} 25000000 2000 18446744073709551615 1 1 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0\n"
    )
}

fn status(name: &str, state: &str, rss_kb: Option<u64>, uid: u32) -> String {
    let mut content = format!("Name:\t{name}\nUmask:\t0022\nState:\t{state}\nTgid:\t1\n");
    content.push_str(&format!("Uid:\t{uid}\t{uid}\t{uid}\t{uid}\n"));
    content.push_str(&format!("Gid:\t{uid}\t{uid}\t{uid}\t{uid}\n"));
    if let Some(rss) = rss_kb {
        content.push_str("VmPeak:\t   30000 kB\n");
        content.push_str(&format!("VmRSS:\t{:>8} kB\n", rss));
    }
    content.push_str("Threads:\t1\n");
    content
}

impl MockFs {
    /// Creates a typical system with a few processes.
    ///
    /// Includes: init (PID 1), bash shell owned by `alice`, and a busy
    /// python process whose UID has no passwd entry.
    ///
    /// Aggregate CPU line sums to 94800 jiffies, of which 13800 are active.
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        fs.add_file(
            "/etc/os-release",
            "\
NAME=\"Ubuntu\"
VERSION=\"20.04.6 LTS (Focal Fossa)\"
ID=ubuntu
ID_LIKE=debian
PRETTY_NAME=\"Ubuntu 20.04.6 LTS\"
VERSION_ID=\"20.04\"
",
        );

        // /etc/passwd for user name resolution
        fs.add_file(
            "/etc/passwd",
            "\
root:x:0:0:root:/root:/bin/bash
daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin
nobody:x:65534:65534:nobody:/nonexistent:/usr/sbin/nologin
alice:x:1000:1000:Alice:/home/alice:/bin/bash
",
        );

        // System-wide files
        fs.add_file(
            "/proc/version",
            "Linux version 5.15.0-91-generic (buildd@lcy02-amd64-045) \
             (gcc (Ubuntu 9.4.0-1ubuntu1~20.04.2) 9.4.0) #101-Ubuntu SMP Tue Nov 14 13:30:08 UTC 2023\n",
        );
        fs.add_file("/proc/uptime", "12345.67 98765.43\n");
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
",
        );
        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );

        // Non-process entries that must not be mistaken for PIDs
        fs.add_dir("/proc/self");
        fs.add_dir("/proc/sys");

        // PID 1: init
        fs.add_process(
            1,
            &stat_line(1, "systemd", 'S', 200, 100, 1),
            &status("systemd", "S (sleeping)", Some(12000), 0),
            "/sbin/init\0splash\0",
        );

        // PID 1000: interactive shell
        fs.add_process(
            1000,
            &stat_line(1000, "bash", 'S', 100, 50, 100000),
            &status("bash", "S (sleeping)", Some(8000), 1000),
            "-bash\0",
        );

        // PID 1001: busy worker, owner unknown to /etc/passwd
        fs.add_process(
            1001,
            &stat_line(1001, "python3", 'R', 5000, 1000, 200000),
            &status("python3", "R (running)", Some(100000), 2000),
            "python3\0-m\0http.server\0",
        );

        fs
    }

    /// Creates a system with processes that have special characters in names.
    pub fn with_special_names() -> Self {
        let mut fs = Self::typical_system();

        // Process with spaces in name (like Firefox's "Web Content")
        fs.add_process(
            5000,
            &stat_line(5000, "Web Content", 'S', 700, 300, 500000),
            &status("Web Content", "S (sleeping)", Some(250000), 1000),
            "/usr/lib/firefox/firefox\0-contentproc\0",
        );

        // Process with parentheses and spaces in name
        fs.add_process(
            5001,
            &stat_line(5001, "test (1)", 'S', 10, 5, 500100),
            &status("test (1)", "S (sleeping)", Some(1000), 0),
            "./test\0",
        );

        fs
    }

    /// Creates a system where processes exit between listing and inspection.
    ///
    /// PID 4000 is listed but all its files are gone; PID 4001 still has its
    /// stat file but lost `status` and `cmdline`.
    pub fn with_vanishing_process() -> Self {
        let mut fs = Self::typical_system();

        fs.add_dir("/proc/4000");

        fs.add_process(
            4001,
            &stat_line(4001, "cc1", 'R', 9000, 1000, 300000),
            &status("cc1", "R (running)", Some(50000), 1000),
            "cc1\0",
        );
        fs.remove_file("/proc/4001/status");
        fs.remove_file("/proc/4001/cmdline");

        fs
    }

    /// Creates a system whose meminfo reports zero total memory.
    pub fn with_zero_memtotal() -> Self {
        let mut fs = Self::typical_system();
        fs.add_file("/proc/meminfo", "MemTotal:              0 kB\nMemFree:               0 kB\n");
        fs
    }

    /// Creates a system with CPU usage ties.
    ///
    /// Aggregate CPU line sums to 10000 jiffies, so PIDs 10..=50 use
    /// 1%, 5%, 3%, 3% and 1% respectively.
    pub fn with_cpu_ties() -> Self {
        let mut fs = Self::typical_system();
        fs.add_file("/proc/stat", "cpu  4000 0 1000 5000 0 0 0 0 0 0\n");

        for (pid, active) in [(10, 100), (20, 500), (30, 300), (40, 300), (50, 100)] {
            fs.add_process(
                pid,
                &stat_line(pid, "worker", 'S', active, 0, 1000),
                &status("worker", "S (sleeping)", Some(1024), 1000),
                "worker\0",
            );
        }

        fs
    }

    /// Creates a system with kernel threads: no cmdline content and no VmRSS.
    pub fn with_kernel_threads() -> Self {
        let mut fs = Self::typical_system();
        fs.add_process(
            2,
            &stat_line(2, "kthreadd", 'S', 0, 20, 0),
            &status("kthreadd", "S (sleeping)", None, 0),
            "",
        );
        fs
    }
}
