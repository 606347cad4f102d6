use std::fmt;

use clap::{Parser, ValueEnum};

use crate::error::{Error, Result};

/// Which [`crate::policy::AdmissionPolicy`] implementation to run.
///
/// Corresponds to `node_monitor.policy` in spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    Fifo,
    Bounded,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PolicyKind::Fifo => "fifo",
            PolicyKind::Bounded => "bounded",
        };
        fmt::Display::fmt(s, f)
    }
}

/// Node-monitor configuration, recognizing the options named in spec §6.
#[derive(Debug, Clone, Parser)]
#[command(name = "node-monitor", about = "Per-worker task-admission engine")]
pub struct Config {
    /// `node_monitor.cpu_cores` — number of launcher workers. Defaults to
    /// the detected CPU count.
    #[arg(long = "cpu-cores")]
    pub cpu_cores: Option<usize>,

    /// `node_monitor.capacity.mem` — capacity vector memory component, bytes.
    #[arg(long = "capacity-mem", default_value_t = 0)]
    pub capacity_mem: u64,

    /// `node_monitor.capacity.cpu` — capacity vector cpu component, millicores.
    #[arg(long = "capacity-cpu", default_value_t = 0)]
    pub capacity_cpu: u64,

    /// `node_monitor.policy` — `fifo` or `bounded`.
    #[arg(long = "policy", value_enum, default_value_t = PolicyKind::Fifo)]
    pub policy: PolicyKind,

    /// `node_monitor.port` — port on which the node monitor serves intake.
    #[arg(long = "port", default_value_t = 7070)]
    pub port: u16,

    /// `get_task.port` — well-known port on which schedulers serve `getTask`.
    /// Used by [`Config::resolve_scheduler_address`] as the default port when
    /// a reservation's `schedulerAddress` carries no explicit port.
    #[arg(long = "get-task-port", default_value_t = 7071)]
    pub get_task_port: u16,

    /// Bound on the runnable queue. Not named in spec.md's configuration
    /// table; added per the REDESIGN FLAGS recommendation to bound what the
    /// reference leaves unbounded (see SPEC_FULL.md §9).
    #[arg(long = "runnable-queue-capacity", default_value_t = 1024)]
    pub runnable_queue_capacity: usize,

    /// Bind address for the intake/completion RPC server.
    #[arg(long = "bind-address", default_value = "0.0.0.0")]
    pub bind_address: String,
}

impl Config {
    /// Resolves [`Self::cpu_cores`], falling back to the detected CPU count.
    pub fn launcher_count(&self) -> usize {
        self.cpu_cores.unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
    }

    pub fn validate(&self) -> Result<()> {
        if self.runnable_queue_capacity == 0 {
            return Err(Error::Config("runnable-queue-capacity must be > 0".into()));
        }
        if self.launcher_count() == 0 {
            return Err(Error::Config("cpu-cores must be > 0".into()));
        }
        Ok(())
    }

    /// Resolves the address the Task Puller actually dials for `getTask`
    /// (spec §4.3 point 1), appending `get_task_port` when `address` carries
    /// no explicit port of its own.
    pub fn resolve_scheduler_address(&self, address: &str) -> String {
        if address.contains(':') {
            address.to_string()
        } else {
            format!("{address}:{}", self.get_task_port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launcher_count_falls_back_to_detected_cpus() {
        let cfg = Config { cpu_cores: None, ..Config::parse_from(["node-monitor"]) };
        assert!(cfg.launcher_count() >= 1);
    }

    #[test]
    fn validate_rejects_zero_queue_capacity() {
        let mut cfg = Config::parse_from(["node-monitor"]);
        cfg.runnable_queue_capacity = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn resolve_scheduler_address_appends_default_port_when_bare() {
        let mut cfg = Config::parse_from(["node-monitor"]);
        cfg.get_task_port = 7071;
        assert_eq!(cfg.resolve_scheduler_address("scheduler-1"), "scheduler-1:7071");
    }

    #[test]
    fn resolve_scheduler_address_leaves_an_explicit_port_alone() {
        let cfg = Config::parse_from(["node-monitor"]);
        assert_eq!(cfg.resolve_scheduler_address("scheduler-1:9000"), "scheduler-1:9000");
    }
}
