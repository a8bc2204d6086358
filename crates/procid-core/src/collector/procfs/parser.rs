//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions over file contents, so they can be tested with
//! string and byte inputs and no filesystem at all.

use serde::Serialize;

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

// ============ /proc/[pid]/stat ============

/// Splits `/proc/[pid]/stat` content into positional fields.
///
/// Field 2 (index 1) keeps its surrounding parentheses. The command name runs
/// from the first `(` to the last `)`, so spaces or parentheses inside it do
/// not shift the fields that follow. Content without parentheses falls back
/// to plain whitespace splitting.
pub fn tokenize_stat(content: &str) -> Vec<String> {
    let content = content.trim();

    let (Some(open), Some(close)) = (content.find('('), content.rfind(')')) else {
        return content.split_whitespace().map(str::to_string).collect();
    };
    if close < open {
        return content.split_whitespace().map(str::to_string).collect();
    }

    let mut fields: Vec<String> = content[..open]
        .split_whitespace()
        .map(str::to_string)
        .collect();
    fields.push(content[open..=close].to_string());
    fields.extend(content[close + 1..].split_whitespace().map(str::to_string));
    fields
}

/// Strips a single layer of surrounding parentheses from the command field.
pub fn strip_comm(field: &str) -> &str {
    let field = field.strip_prefix('(').unwrap_or(field);
    field.strip_suffix(')').unwrap_or(field)
}

/// Parses a signed 32-bit stat field such as the pid or ppid.
pub fn parse_i32_field(fields: &[String], idx: usize, name: &str) -> Result<i32, ParseError> {
    let raw = stat_field(fields, idx, name)?;
    raw.parse()
        .map_err(|_| ParseError::new(format!("invalid {}: {:?}", name, raw)))
}

/// Parses an unsigned 64-bit stat field such as starttime or startstack.
pub fn parse_u64_field(fields: &[String], idx: usize, name: &str) -> Result<u64, ParseError> {
    let raw = stat_field(fields, idx, name)?;
    raw.parse()
        .map_err(|_| ParseError::new(format!("invalid {}: {:?}", name, raw)))
}

/// Returns the raw stat field at `idx` (0-based).
pub fn stat_field<'a>(fields: &'a [String], idx: usize, name: &str) -> Result<&'a str, ParseError> {
    fields.get(idx).map(String::as_str).ok_or_else(|| {
        ParseError::new(format!(
            "missing field {} (position {}, got {} fields)",
            name,
            idx + 1,
            fields.len()
        ))
    })
}

// ============ /proc/[pid]/cmdline ============

/// Parses `/proc/[pid]/cmdline` content.
///
/// Arguments are NUL-separated; a trailing NUL (or none, when the buffer was
/// cut at EOF) does not produce an extra empty argument.
pub fn parse_cmdline(content: &[u8]) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }

    let content = content.strip_suffix(&[0u8]).unwrap_or(content);
    content
        .split(|&b| b == 0)
        .map(|arg| String::from_utf8_lossy(arg).into_owned())
        .collect()
}

// ============ /proc/[pid]/cgroup ============

/// One line of `/proc/[pid]/cgroup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cgroup {
    /// Unique hierarchy ID.
    pub id: i32,
    /// Controllers (subsystems) bound to the hierarchy, in file order.
    pub controllers: Vec<String>,
    /// Control group path, relative to the hierarchy's mount point.
    pub path: String,
}

/// Parses `/proc/[pid]/cgroup` content.
///
/// Format: `hierarchy-id:controller[,controller...]:path`, one line per
/// hierarchy. Only the first two `:` delimit fields; the path may contain
/// more. An empty controller list (the v2 `0::/path` line) yields no
/// controllers.
pub fn parse_cgroups(content: &str) -> Result<Vec<Cgroup>, ParseError> {
    let mut cgroups = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let mut parts = line.splitn(3, ':');
        let (Some(id), Some(controllers), Some(path)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(ParseError::new(format!("invalid cgroup line: {:?}", line)));
        };

        let id: i32 = id
            .parse()
            .map_err(|_| ParseError::new(format!("invalid cgroup id in line: {:?}", line)))?;

        let controllers = if controllers.is_empty() {
            Vec::new()
        } else {
            controllers.split(',').map(str::to_string).collect()
        };

        cgroups.push(Cgroup {
            id,
            controllers,
            path: path.to_string(),
        });
    }

    Ok(cgroups)
}

/// Prefix of the legacy Docker cgroup path convention.
pub const DOCKER_CGROUP_PREFIX: &str = "/docker";

/// Extracts the Docker container id from cgroup membership.
///
/// Looks at the first record whose path starts with `/docker` and returns
/// the component after `/docker/`. Only the legacy cgroup v1 layout is
/// recognised; systemd `docker-<id>.scope` units and other runtimes are not.
pub fn container_id(cgroups: &[Cgroup]) -> Option<&str> {
    let cgroup = cgroups
        .iter()
        .find(|c| c.path.starts_with(DOCKER_CGROUP_PREFIX))?;

    cgroup.path.split('/').nth(2).filter(|id| !id.is_empty())
}

// ============ /proc/sys/kernel/random/boot_id ============

/// Parses the boot id file, trimming surrounding whitespace.
pub fn parse_boot_id(content: &str) -> Result<String, ParseError> {
    let boot_id = content.trim();
    if boot_id.is_empty() {
        return Err(ParseError::new("empty boot id"));
    }
    Ok(boot_id.to_string())
}

// ============ /proc/self ============

/// Parses the pid from the target of the `/proc/self` link.
pub fn parse_self_link(target: &std::path::Path) -> Result<u32, ParseError> {
    let name = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ParseError::new(format!("invalid self link: {}", target.display())))?;
    name.parse()
        .map_err(|_| ParseError::new(format!("couldn't parse {:?} as pid", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_tokenize_stat_basic() {
        let content = "1234 (bash) S 1233 1234 1234 34816 1235 4194304 5000 50000 10 20 100 50 200 100 20 0 1 0 100000 25000000 2000 18446744073709551615 0 0 140736000000000 0 0 0 65536 3670020 1266777851 0 0 0 17 2 0 0 5 0 0 0 0 0 0 0 0 0 0\n";
        let fields = tokenize_stat(content);

        assert_eq!(fields[0], "1234");
        assert_eq!(fields[1], "(bash)");
        assert_eq!(fields[2], "S");
        assert_eq!(fields[3], "1233");
        assert_eq!(fields[21], "100000");
        assert_eq!(fields[27], "140736000000000");
    }

    #[test]
    fn test_tokenize_stat_with_spaces_in_comm() {
        let content = "5000 (Web Content) S 4999 5000 4999 0 -1";
        let fields = tokenize_stat(content);

        assert_eq!(fields[1], "(Web Content)");
        assert_eq!(fields[3], "4999");
        assert_eq!(fields.len(), 8);
    }

    #[test]
    fn test_tokenize_stat_with_parentheses_in_comm() {
        let fields = tokenize_stat("5001 (test(1)) S 1 5001");
        assert_eq!(fields[1], "(test(1))");
        assert_eq!(strip_comm(&fields[1]), "test(1)");
        assert_eq!(fields[3], "1");

        let fields = tokenize_stat("5002 (a) S 1 (b) R 7");
        assert_eq!(strip_comm(&fields[1]), "a) S 1 (b");
        assert_eq!(fields[2], "R");
        assert_eq!(fields[3], "7");
    }

    #[test]
    fn test_tokenize_stat_without_parentheses() {
        let fields = tokenize_stat("10 kworker S 2");
        assert_eq!(fields, vec!["10", "kworker", "S", "2"]);
        assert_eq!(strip_comm(&fields[1]), "kworker");
    }

    #[test]
    fn test_strip_comm_single_layer() {
        assert_eq!(strip_comm("(bash)"), "bash");
        assert_eq!(strip_comm("((x))"), "(x)");
        assert_eq!(strip_comm("()"), "");
    }

    #[test]
    fn test_comm_recovered_between_parentheses() {
        for comm in ["bash", "Web Content", "kworker/0:1H", "x", "a b  c", "systemd-journal"] {
            let line = format!("42 ({}) S 1 42 42 0 -1", comm);
            let fields = tokenize_stat(&line);
            assert_eq!(strip_comm(&fields[1]), comm);
            assert_eq!(fields[3], "1");
        }
    }

    #[test]
    fn test_parse_fields() {
        let fields = tokenize_stat("77 (sh) S -5 x");
        assert_eq!(parse_i32_field(&fields, 0, "pid"), Ok(77));
        assert_eq!(parse_i32_field(&fields, 3, "ppid"), Ok(-5));

        let err = parse_u64_field(&fields, 4, "starttime").unwrap_err();
        assert!(err.message.contains("invalid starttime"));

        let err = parse_u64_field(&fields, 21, "starttime").unwrap_err();
        assert!(err.message.contains("missing field starttime"));
        assert!(err.message.contains("position 22"));
    }

    #[test]
    fn test_parse_i32_field_rejects_out_of_range() {
        let fields = tokenize_stat("4294967296 (sh) S 1");
        assert!(parse_i32_field(&fields, 0, "pid").is_err());
    }

    #[test]
    fn test_parse_cmdline() {
        assert_eq!(parse_cmdline(b"ls\0-la\0"), vec!["ls", "-la"]);
        assert!(parse_cmdline(b"").is_empty());
    }

    #[test]
    fn test_parse_cmdline_unterminated_and_empty_args() {
        assert_eq!(parse_cmdline(b"sleep\x0010"), vec!["sleep", "10"]);
        assert_eq!(parse_cmdline(b"env\0\0x\0"), vec!["env", "", "x"]);
        assert_eq!(parse_cmdline(b"nginx: master process\0"), vec!["nginx: master process"]);
    }

    #[test]
    fn test_parse_cmdline_invalid_utf8() {
        let args = parse_cmdline(b"caf\xe9\0");
        assert_eq!(args, vec!["caf\u{fffd}"]);
    }

    #[test]
    fn test_parse_cgroups() {
        let cgroups = parse_cgroups("1:cpu,cpuacct:/\n2:pids:/user.slice\n").unwrap();

        assert_eq!(
            cgroups,
            vec![
                Cgroup {
                    id: 1,
                    controllers: vec!["cpu".to_string(), "cpuacct".to_string()],
                    path: "/".to_string(),
                },
                Cgroup {
                    id: 2,
                    controllers: vec!["pids".to_string()],
                    path: "/user.slice".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_cgroups_v2_and_colons_in_path() {
        let cgroups = parse_cgroups("1:name=systemd:/a:b\n0::/init.scope\n").unwrap();

        assert_eq!(cgroups[0].controllers, vec!["name=systemd"]);
        assert_eq!(cgroups[0].path, "/a:b");
        assert_eq!(cgroups[1].id, 0);
        assert!(cgroups[1].controllers.is_empty());
        assert_eq!(cgroups[1].path, "/init.scope");
    }

    #[test]
    fn test_parse_cgroups_malformed() {
        let err = parse_cgroups("x:cpu:/\n").unwrap_err();
        assert!(err.message.contains("invalid cgroup id"));

        assert!(parse_cgroups("1:cpu\n").is_err());
        assert_eq!(parse_cgroups("").unwrap(), Vec::new());
    }

    #[test]
    fn test_container_id() {
        let cgroups =
            parse_cgroups("2:pids:/user.slice\n1:cpu:/docker/abc123def456/init.scope\n").unwrap();
        assert_eq!(container_id(&cgroups), Some("abc123def456"));

        let cgroups = parse_cgroups("1:cpu,cpuacct:/\n2:pids:/user.slice\n").unwrap();
        assert_eq!(container_id(&cgroups), None);
    }

    #[test]
    fn test_container_id_uses_first_docker_path() {
        let cgroups = parse_cgroups("3:cpu:/docker\n2:pids:/docker/later\n").unwrap();
        assert_eq!(container_id(&cgroups), None);

        let cgroups =
            parse_cgroups("0::/system.slice/docker-abc.scope\n").unwrap();
        assert_eq!(container_id(&cgroups), None);
    }

    #[test]
    fn test_parse_boot_id() {
        assert_eq!(
            parse_boot_id("  6f1d2c3b-8a4e\n").unwrap(),
            "6f1d2c3b-8a4e"
        );
        assert!(parse_boot_id("\n").is_err());
    }

    #[test]
    fn test_parse_self_link() {
        assert_eq!(parse_self_link(Path::new("4242")), Ok(4242));
        assert_eq!(parse_self_link(Path::new("/proc/4242")), Ok(4242));
        assert!(parse_self_link(Path::new("self")).is_err());
    }
}
