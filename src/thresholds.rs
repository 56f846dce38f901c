// Threshold evaluation over collected snapshots

use crate::config::Thresholds;
use crate::models::{ContainerSnapshot, HostSnapshot};
use std::fmt;

/// Whose metric crossed a threshold.
#[derive(Debug, Clone, PartialEq)]
pub enum Subject {
    Server,
    Container(String),
}

/// Metric that crossed its threshold, with the observed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Breach {
    Cpu(f64),
    Memory(f64),
    Restarts(u64),
}

/// One line of an alert, e.g. `Container web: Memory 91.24%`.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub subject: Subject,
    pub breach: Breach,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subject {
            Subject::Server => write!(f, "Server: ")?,
            Subject::Container(name) => write!(f, "Container {}: ", name)?,
        }
        match self.breach {
            // Observed value as measured, e.g. `91.24`; whole numbers keep `.0`.
            Breach::Cpu(v) => write!(f, "CPU {:?}%", v),
            Breach::Memory(v) => write!(f, "Memory {:?}%", v),
            Breach::Restarts(n) => write!(f, "Restarts {}", n),
        }
    }
}

/// CPU and memory strictly above their ceilings. Disk is never alerted on.
pub fn evaluate_host(snapshot: &HostSnapshot, thresholds: &Thresholds) -> Vec<Issue> {
    let mut issues = Vec::new();
    if snapshot.cpu_percent > thresholds.cpu_threshold {
        issues.push(Issue {
            subject: Subject::Server,
            breach: Breach::Cpu(snapshot.cpu_percent),
        });
    }
    if snapshot.memory_percent > thresholds.memory_threshold {
        issues.push(Issue {
            subject: Subject::Server,
            breach: Breach::Memory(snapshot.memory_percent),
        });
    }
    issues
}

/// Per container: cpu, memory, and restarts when the snapshot carries them.
pub fn evaluate_containers(
    containers: &[ContainerSnapshot],
    thresholds: &Thresholds,
) -> Vec<Issue> {
    let mut issues = Vec::new();
    for c in containers {
        let subject = || Subject::Container(c.name.clone());
        if c.cpu_percent > thresholds.cpu_threshold {
            issues.push(Issue {
                subject: subject(),
                breach: Breach::Cpu(c.cpu_percent),
            });
        }
        if c.memory_percent > thresholds.memory_threshold {
            issues.push(Issue {
                subject: subject(),
                breach: Breach::Memory(c.memory_percent),
            });
        }
        if let Some(restarts) = c.restart_count()
            && restarts > thresholds.restart_threshold
        {
            issues.push(Issue {
                subject: subject(),
                breach: Breach::Restarts(restarts),
            });
        }
    }
    issues
}
