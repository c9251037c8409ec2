//! Parsers for `/proc` and `/etc` text records.
//!
//! These are pure functions that parse lines of various kernel and
//! user-database files into structured data. They are designed to be easily
//! testable with string inputs.

use std::str::FromStr;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Returns the whitespace-separated token at `index`, converted to `T`.
pub fn field<T: FromStr>(line: &str, index: usize) -> Result<T, ParseError> {
    let token = line
        .split_whitespace()
        .nth(index)
        .ok_or_else(|| ParseError::new(format!("missing field {} in {:?}", index, line)))?;
    token
        .parse()
        .map_err(|_| ParseError::new(format!("invalid field {}: {:?}", index, token)))
}

/// Returns field `index` of `line` when its first token is exactly `key`.
///
/// `Ok(None)` means the line carries some other key.
pub fn keyed_field<T: FromStr>(
    line: &str,
    key: &str,
    index: usize,
) -> Result<Option<T>, ParseError> {
    match line.split_whitespace().next() {
        Some(first) if first == key => field(line, index).map(Some),
        _ => Ok(None),
    }
}

/// Scans `label: value ...` lines and returns the value of the first line
/// labeled `label` (label includes the colon, e.g. `"VmRSS:"`).
pub fn labeled_value<T, I>(lines: I, label: &str) -> Result<Option<T>, ParseError>
where
    T: FromStr,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for line in lines {
        if let Some(value) = keyed_field(line.as_ref(), label, 1)? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

// ============ /etc/os-release ============

/// Extracts the value of `key` from one `KEY="value with spaces"` line.
///
/// Spaces are swapped for underscores before splitting on `=` and quotes,
/// then swapped back in the extracted value. Underscores that were already
/// in the value also come back as spaces.
pub fn os_release_value(line: &str, key: &str) -> Option<String> {
    let normalized: String = line
        .chars()
        .map(|c| match c {
            ' ' => '_',
            '=' | '"' => ' ',
            other => other,
        })
        .collect();

    let mut tokens = normalized.split_whitespace();
    let found_key = tokens.next()?;
    let value = tokens.next()?;
    (found_key == key).then(|| value.replace('_', " "))
}

// ============ /proc/version, /proc/uptime ============

/// Kernel release is the third token of `/proc/version`.
pub fn parse_kernel_release(line: &str) -> Result<String, ParseError> {
    field(line, 2)
}

/// Seconds since boot from the first token of `/proc/uptime`, truncated.
pub fn parse_uptime(line: &str) -> Result<u64, ParseError> {
    let seconds: f64 = field(line, 0)?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ParseError::new(format!("invalid uptime {}", seconds)));
    }
    Ok(seconds as u64)
}

// ============ /proc/meminfo ============

/// Parsed data from `/proc/meminfo`, in kB.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemInfo {
    pub mem_total: u64,
    pub mem_free: u64,
}

impl MemInfo {
    /// Fraction of memory in use: `(total - free) / total`.
    pub fn utilization(&self) -> Result<f64, ParseError> {
        if self.mem_total == 0 {
            return Err(ParseError::new("MemTotal is zero"));
        }
        let total = self.mem_total as f64;
        Ok((total - self.mem_free as f64) / total)
    }
}

/// Parses `MemTotal:` and `MemFree:` out of `/proc/meminfo` lines.
///
/// Stops consuming lines once both are found.
pub fn parse_meminfo<I>(lines: I) -> Result<MemInfo, ParseError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut total: Option<u64> = None;
    let mut free: Option<u64> = None;

    for line in lines {
        let line = line.as_ref();
        if let Some(v) = keyed_field(line, "MemTotal:", 1)? {
            total = Some(v);
        } else if let Some(v) = keyed_field(line, "MemFree:", 1)? {
            free = Some(v);
        }
        if total.is_some() && free.is_some() {
            break;
        }
    }

    match (total, free) {
        (Some(mem_total), Some(mem_free)) => Ok(MemInfo {
            mem_total,
            mem_free,
        }),
        (None, _) => Err(ParseError::new("MemTotal not found in meminfo")),
        (_, None) => Err(ParseError::new("MemFree not found in meminfo")),
    }
}

// ============ /proc/stat ============

/// Aggregate CPU counters from the `cpu` line of `/proc/stat`, in jiffies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
    pub guest: u64,
    pub guest_nice: u64,
}

impl CpuTimes {
    /// Sum of every field on the line.
    ///
    /// Fails if the counters do not fit in a `u64` together.
    pub fn total(&self) -> Result<u64, ParseError> {
        [
            self.user,
            self.nice,
            self.system,
            self.idle,
            self.iowait,
            self.irq,
            self.softirq,
            self.steal,
            self.guest,
            self.guest_nice,
        ]
        .into_iter()
        .try_fold(0u64, u64::checked_add)
        .ok_or_else(|| ParseError::new("cpu counters overflow"))
    }

    /// Everything except idle and iowait.
    pub fn active(&self) -> Result<u64, ParseError> {
        Ok(self.total()? - self.idle - self.iowait)
    }

    /// Idle only; iowait is counted in neither active nor idle.
    pub fn idle(&self) -> u64 {
        self.idle
    }
}

/// Finds the aggregate `cpu` line (not `cpuN`) and parses its counters.
///
/// Older kernels print fewer than ten columns; missing trailing columns
/// read as zero. At least user, nice, system and idle must be present.
pub fn parse_cpu_times<I>(lines: I) -> Result<CpuTimes, ParseError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for line in lines {
        let line = line.as_ref();
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("cpu") {
            continue;
        }

        let values = tokens
            .take(10)
            .map(|t| {
                t.parse::<u64>()
                    .map_err(|_| ParseError::new(format!("invalid cpu counter {:?}", t)))
            })
            .collect::<Result<Vec<u64>, ParseError>>()?;

        if values.len() < 4 {
            return Err(ParseError::new(format!(
                "not enough fields in cpu line: expected 4+, got {}",
                values.len()
            )));
        }

        let get = |idx: usize| values.get(idx).copied().unwrap_or(0);
        return Ok(CpuTimes {
            user: get(0),
            nice: get(1),
            system: get(2),
            idle: get(3),
            iowait: get(4),
            irq: get(5),
            softirq: get(6),
            steal: get(7),
            guest: get(8),
            guest_nice: get(9),
        });
    }

    Err(ParseError::new("aggregate cpu line not found in stat"))
}

// ============ /proc/[pid]/stat ============

/// Parsed data from `/proc/[pid]/stat`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcStat {
    /// Field 14.
    pub utime: u64,
    /// Field 15.
    pub stime: u64,
    /// Field 22, jiffies after boot. Absent on truncated lines.
    pub starttime: Option<u64>,
}

impl ProcStat {
    /// Jiffies spent in user and kernel mode.
    pub fn active_jiffies(&self) -> Result<u64, ParseError> {
        self.utime
            .checked_add(self.stime)
            .ok_or_else(|| ParseError::new("utime + stime overflows"))
    }
}

/// Parses `/proc/[pid]/stat` content.
///
/// The comm field can contain spaces and parentheses, so it is cut out
/// between the first `(` and the last `)` before the remaining fields are
/// split on whitespace. Field numbers stay those of proc(5).
pub fn parse_proc_stat(content: &str) -> Result<ProcStat, ParseError> {
    let content = content.trim();

    let open_paren = content
        .find('(')
        .ok_or_else(|| ParseError::new("missing '(' in stat"))?;
    let close_paren = content
        .rfind(')')
        .ok_or_else(|| ParseError::new("missing ')' in stat"))?;

    if close_paren <= open_paren {
        return Err(ParseError::new("invalid parentheses in stat"));
    }

    content[..open_paren]
        .trim()
        .parse::<u32>()
        .map_err(|_| ParseError::new("invalid pid"))?;

    // fields[0] is field 3 (state)
    let fields: Vec<&str> = content[close_paren + 1..].split_whitespace().collect();

    if fields.len() < 13 {
        return Err(ParseError::new(format!(
            "not enough fields in stat: expected 15+, got {}",
            fields.len() + 2
        )));
    }

    let parse_u64 = |idx: usize, name: &str| -> Result<u64, ParseError> {
        fields[idx]
            .parse()
            .map_err(|_| ParseError::new(format!("invalid {}", name)))
    };

    let starttime = match fields.get(19) {
        Some(_) => Some(parse_u64(19, "starttime")?),
        None => None,
    };

    Ok(ProcStat {
        utime: parse_u64(11, "utime")?,
        stime: parse_u64(12, "stime")?,
        starttime,
    })
}

// ============ /proc/[pid]/status, cmdline ============

/// True when the first `State:` line reads `R (running)`.
pub fn is_running<I>(status_lines: I) -> bool
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    status_lines
        .into_iter()
        .find(|line| line.as_ref().starts_with("State:"))
        .is_some_and(|line| line.as_ref().contains("R (running)"))
}

/// Renders a NUL-separated argument list with single spaces.
pub fn parse_cmdline(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches('\0')
        .replace('\0', " ")
}

// ============ /etc/passwd ============

/// Returns the name on the first `name:password:uid:...` row whose uid
/// column equals `uid`.
pub fn passwd_user<I>(lines: I, uid: u32) -> Option<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    lines.into_iter().find_map(|line| {
        let line = line.as_ref().trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let mut parts = line.split(':');
        let name = parts.next()?;
        let _password = parts.next()?;
        let row_uid: u32 = parts.next()?.parse().ok()?;
        (row_uid == uid).then(|| name.to_string())
    })
}
