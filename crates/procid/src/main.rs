//! procid - process identity inspector.
//!
//! Prints pid, parent, command, cgroups, container id and the
//! namespace-independent unique id of processes read from a proc filesystem.

use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use procid_core::collector::procfs::parser;
use procid_core::collector::{
    Cgroup, ErrorKind, ErrorPolicy, FileSystem, ProcError, ProcFs, ProcessStatus, RealFs,
};
use procid_core::config::{DEFAULT_MOUNT_POINT, ProcConfig};

/// Process identity inspector.
#[derive(Parser)]
#[command(name = "procid", about = "Process identity inspector", version)]
struct Args {
    /// Process ids to inspect. Defaults to procid's own pid.
    pids: Vec<i32>,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = DEFAULT_MOUNT_POINT)]
    proc_path: String,

    /// Skip the check that the proc path belongs to this process.
    /// Needed when inspecting a host /proc bind-mounted into a container.
    #[arg(long)]
    no_verify: bool,

    /// Error kinds that abort instead of reporting the process as absent.
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = [FatalKind::Malformed, FatalKind::SourceUnavailable]
    )]
    fatal: Vec<FatalKind>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is warn level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FatalKind {
    NotFound,
    PermissionDenied,
    Malformed,
    SourceUnavailable,
}

impl From<FatalKind> for ErrorKind {
    fn from(kind: FatalKind) -> Self {
        match kind {
            FatalKind::NotFound => ErrorKind::NotFound,
            FatalKind::PermissionDenied => ErrorKind::PermissionDenied,
            FatalKind::Malformed => ErrorKind::MalformedRecord,
            FatalKind::SourceUnavailable => ErrorKind::SourceUnavailable,
        }
    }
}

/// Everything known about one process.
#[derive(Debug, Serialize)]
struct ProcessReport {
    pid: i32,
    ppid: i32,
    command: String,
    start_time: u64,
    start_stack: u64,
    unique_id: String,
    container_id: Option<String>,
    command_line: Option<Vec<String>>,
    cgroups: Option<Vec<Cgroup>>,
}

/// Result for one requested pid.
#[derive(Debug, Serialize)]
struct Entry {
    requested: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    process: Option<ProcessReport>,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is WARN so reports stay readable on stdout.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["procid", "procid_core"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

type StatFields = (i32, i32, String, u64, u64, String);

fn stat_fields<F: FileSystem>(
    procfs: &ProcFs<F>,
    status: &ProcessStatus,
) -> Result<StatFields, ProcError> {
    let boot_id = procfs.boot_id()?;
    Ok((
        status.pid()?,
        status.parent_pid()?,
        status.command()?.to_string(),
        status.start_time()?,
        status.start_stack()?,
        status.unique_id(boot_id)?.to_string(),
    ))
}

/// Builds the report for `pid`.
///
/// The stat record and the unique id are required; command line, cgroups
/// and container id are optional and go through `policy` on their own, so
/// an unreadable cmdline does not hide an otherwise readable process.
fn inspect<F: FileSystem>(
    procfs: &ProcFs<F>,
    policy: &ErrorPolicy,
    pid: i32,
) -> Result<Option<ProcessReport>, ProcError> {
    let Some(status) = policy.absorb(procfs.stat(pid))? else {
        warn!(pid, "process not readable");
        return Ok(None);
    };

    let required = stat_fields(procfs, &status);
    let Some((pid, ppid, command, start_time, start_stack, unique_id)) = policy.absorb(required)?
    else {
        warn!(pid, "stat record unusable");
        return Ok(None);
    };

    let command_line = policy.absorb(procfs.command_line(pid))?;
    let cgroups = policy.absorb(procfs.cgroups(pid))?;
    let container_id = cgroups
        .as_deref()
        .and_then(parser::container_id)
        .map(str::to_string);

    debug!(pid, unique_id = %unique_id, "inspected process");

    Ok(Some(ProcessReport {
        pid,
        ppid,
        command,
        start_time,
        start_stack,
        unique_id,
        container_id,
        command_line,
        cgroups,
    }))
}

fn print_text(entries: &[Entry]) {
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let Some(p) = &entry.process else {
            println!("pid {}: not available", entry.requested);
            continue;
        };

        println!("pid:          {}", p.pid);
        println!("ppid:         {}", p.ppid);
        println!("command:      {}", p.command);
        println!("start time:   {}", p.start_time);
        println!("start stack:  {:#x}", p.start_stack);
        println!("unique id:    {}", p.unique_id);
        println!("container id: {}", p.container_id.as_deref().unwrap_or("-"));
        match &p.command_line {
            Some(args) => println!("command line: {}", args.join(" ")),
            None => println!("command line: -"),
        }
        match &p.cgroups {
            Some(cgroups) if !cgroups.is_empty() => {
                println!("cgroups:");
                for c in cgroups {
                    println!("  {}:{}:{}", c.id, c.controllers.join(","), c.path);
                }
            }
            _ => println!("cgroups:      -"),
        }
    }
}

fn run(args: &Args) -> Result<Vec<Entry>, ProcError> {
    let policy = ErrorPolicy::new(args.fatal.iter().copied().map(ErrorKind::from));
    let config = ProcConfig::new(&args.proc_path, !args.no_verify);
    let procfs = ProcFs::from_config(RealFs::new(), &config)?;

    let pids = if args.pids.is_empty() {
        vec![std::process::id() as i32]
    } else {
        args.pids.clone()
    };

    info!(
        "procid {} inspecting {} pid(s) under {}",
        env!("CARGO_PKG_VERSION"),
        pids.len(),
        args.proc_path
    );

    pids.into_iter()
        .map(|pid| {
            Ok(Entry {
                requested: pid,
                process: inspect(&procfs, &policy, pid)?,
            })
        })
        .collect()
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let entries = match run(&args) {
        Ok(entries) => entries,
        Err(e) => {
            error!(kind = %e.kind(), "{}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&entries) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_text(&entries);
    }

    if entries.iter().any(|e| e.process.is_none()) {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procid_core::collector::MockFs;
    use procid_core::collector::mock::{SCENARIO_BOOT_ID, SCENARIO_CONTAINER_ID};
    use procid_core::identity::derive_unique_id;

    fn procfs() -> ProcFs<MockFs> {
        ProcFs::new(MockFs::typical_host(), "/proc")
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["procid"]);
        assert!(args.pids.is_empty());
        assert_eq!(args.proc_path, "/proc");
        assert_eq!(
            args.fatal,
            vec![FatalKind::Malformed, FatalKind::SourceUnavailable]
        );
        assert!(!args.json);
    }

    #[test]
    fn test_args_fatal_list() {
        let args = Args::parse_from(["procid", "--fatal", "not-found,permission-denied", "1", "2"]);
        assert_eq!(args.pids, vec![1, 2]);
        assert_eq!(
            args.fatal,
            vec![FatalKind::NotFound, FatalKind::PermissionDenied]
        );
    }

    #[test]
    fn test_inspect_container_process() {
        let report = inspect(&procfs(), &ErrorPolicy::default(), 4242)
            .unwrap()
            .unwrap();

        assert_eq!(report.pid, 4242);
        assert_eq!(report.ppid, 4200);
        assert_eq!(report.command, "nginx");
        assert_eq!(report.container_id.as_deref(), Some(SCENARIO_CONTAINER_ID));
        assert_eq!(
            report.unique_id,
            derive_unique_id(SCENARIO_BOOT_ID, 140722222222222, 250000)
        );
        assert_eq!(report.cgroups.map(|c| c.len()), Some(4));
    }

    #[test]
    fn test_inspect_missing_process() {
        let policy = ErrorPolicy::default();
        assert!(inspect(&procfs(), &policy, 99).unwrap().is_none());

        let strict = ErrorPolicy::strict();
        let err = inspect(&procfs(), &strict, 99).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_inspect_denied_cmdline_keeps_report() {
        let mut fs = MockFs::typical_host();
        fs.deny("/proc/1/cmdline");
        let procfs = ProcFs::new(fs, "/proc");

        let report = inspect(&procfs, &ErrorPolicy::default(), 1)
            .unwrap()
            .unwrap();
        assert_eq!(report.command, "systemd");
        assert!(report.command_line.is_none());
        assert!(report.container_id.is_none());
    }

    #[test]
    fn test_inspect_malformed_is_fatal_by_default() {
        let mut fs = MockFs::typical_host();
        fs.add_file("/proc/9/stat", "9 (x) S notanumber\n");
        let procfs = ProcFs::new(fs, "/proc");

        let err = inspect(&procfs, &ErrorPolicy::default(), 9).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRecord);

        assert!(inspect(&procfs, &ErrorPolicy::lenient(), 9).unwrap().is_none());
    }

    #[test]
    fn test_entry_json() {
        let entry = Entry {
            requested: 99,
            process: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({ "requested": 99 }));

        let entry = Entry {
            requested: 1234,
            process: inspect(&procfs(), &ErrorPolicy::default(), 1234).unwrap(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["process"]["command"], "bash");
        assert_eq!(json["process"]["container_id"], serde_json::Value::Null);
        assert_eq!(json["process"]["cgroups"][0]["id"], 12);
    }
}
