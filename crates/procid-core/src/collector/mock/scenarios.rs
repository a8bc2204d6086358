//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` filesystem states
//! for testing identity lookups on hosts and inside containers.

use super::filesystem::MockFs;

/// Boot id used by all scenarios.
pub const SCENARIO_BOOT_ID: &str = "6f1d2c3b-8a4e-4b5f-9c7d-2e1f0a9b8c7d";

/// Docker container id used by the containerised process in `typical_host`.
pub const SCENARIO_CONTAINER_ID: &str =
    "3f9a8e7c6b5d4a3f2e1d0c9b8a7f6e5d4c3b2a1f0e9d8c7b6a5f4e3d2c1b0a9f";

/// Builds a full 52-field `/proc/[pid]/stat` line.
///
/// Fields not passed in are filled with plausible constants.
pub fn stat_line(pid: i32, comm: &str, ppid: i32, start_time: u64, start_stack: u64) -> String {
    format!(
        "{pid} ({comm}) S {ppid} {pid} {pid} 0 -1 4194560 1200 0 3 0 15 7 0 0 20 0 1 0 \
         {start_time} 12345678 900 18446744073709551615 94000000000000 94000000100000 \
         {start_stack} 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0 94000000200000 94000000300000 \
         94000000400000 140730000000000 140730000000100 140730000000100 140730000000200 0\n"
    )
}

impl MockFs {
    /// Creates a typical host with a few processes.
    ///
    /// Includes: init (PID 1), a login shell (PID 1234) and an nginx master
    /// running inside a Docker container (PID 4242).
    pub fn typical_host() -> Self {
        let mut fs = Self::new();
        fs.set_boot_id(SCENARIO_BOOT_ID);
        fs.link_self();

        fs.add_process(
            1,
            &stat_line(1, "systemd", 0, 1, 140724000000000),
            "\
12:pids:/init.scope
11:cpu,cpuacct:/init.scope
10:memory:/init.scope
1:name=systemd:/init.scope
0::/init.scope
",
            b"/sbin/init\0splash\0",
        );

        fs.add_process(
            1234,
            &stat_line(1234, "bash", 1, 100000, 140735111111111),
            "\
12:pids:/user.slice/user-1000.slice/session-2.scope
11:cpu,cpuacct:/user.slice
10:memory:/user.slice/user-1000.slice/session-2.scope
1:name=systemd:/user.slice/user-1000.slice/session-2.scope
0::/user.slice/user-1000.slice/session-2.scope
",
            b"-bash\0",
        );

        let docker = format!("/docker/{}", SCENARIO_CONTAINER_ID);
        fs.add_process(
            4242,
            &stat_line(4242, "nginx", 4200, 250000, 140722222222222),
            &format!(
                "12:pids:{docker}\n11:cpu,cpuacct:{docker}\n10:memory:{docker}\n1:name=systemd:{docker}\n"
            ),
            b"nginx: master process nginx -g daemon off;\0",
        );

        fs
    }

    /// Creates a system with processes that have unusual command names.
    pub fn with_special_names() -> Self {
        let mut fs = Self::new();
        fs.set_boot_id(SCENARIO_BOOT_ID);
        fs.link_self();

        fs.add_process(
            5000,
            &stat_line(5000, "Web Content", 4999, 500000, 140733333333333),
            "0::/user.slice\n",
            b"/usr/lib/firefox/firefox\0-contentproc\0",
        );
        fs.add_process(
            5001,
            &stat_line(5001, "test(1)", 1, 500100, 140733333334444),
            "0::/user.slice\n",
            b"./test(1)\0",
        );
        fs.add_process(
            5002,
            &stat_line(5002, "a) S 1 (b", 1, 500200, 140733333335555),
            "0::/user.slice\n",
            b"",
        );

        fs
    }
}
