// Threshold evaluation tests

use infrahealth::config::Thresholds;
use infrahealth::models::{
    ContainerDetail, ContainerSnapshot, ContainerState, HostSnapshot,
};
use infrahealth::thresholds::{Breach, Subject, evaluate_containers, evaluate_host};

fn host(cpu: f64, memory: f64, disk: f64) -> HostSnapshot {
    HostSnapshot {
        cpu_percent: cpu,
        memory_percent: memory,
        disk_percent: disk,
        detail: None,
    }
}

fn container(name: &str, cpu: f64, memory: f64, restarts: Option<u64>) -> ContainerSnapshot {
    ContainerSnapshot {
        name: name.to_string(),
        status: ContainerState::Running,
        cpu_percent: cpu,
        memory_percent: memory,
        detail: restarts.map(|restart_count| ContainerDetail {
            network_bytes_sent: 0,
            network_bytes_received: 0,
            restart_count,
        }),
        app_health: None,
    }
}

#[test]
fn host_cpu_over_default_threshold_gives_one_issue() {
    let issues = evaluate_host(&host(85.0, 50.0, 10.0), &Thresholds::default());
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].subject, Subject::Server);
    assert_eq!(issues[0].breach, Breach::Cpu(85.0));
    assert_eq!(issues[0].to_string(), "Server: CPU 85.0%");
}

#[test]
fn host_values_equal_to_threshold_do_not_trigger() {
    let issues = evaluate_host(&host(80.0, 80.0, 10.0), &Thresholds::default());
    assert!(issues.is_empty());
}

#[test]
fn host_disk_is_never_alerted() {
    let issues = evaluate_host(&host(1.0, 1.0, 99.9), &Thresholds::default());
    assert!(issues.is_empty());
}

#[test]
fn host_both_cpu_and_memory_in_order() {
    let issues = evaluate_host(&host(90.0, 95.5, 0.0), &Thresholds::default());
    let lines: Vec<_> = issues.iter().map(ToString::to_string).collect();
    assert_eq!(lines, ["Server: CPU 90.0%", "Server: Memory 95.5%"]);
}

#[test]
fn custom_thresholds_apply() {
    let limits = Thresholds {
        cpu_threshold: 5.0,
        memory_threshold: 99.0,
        restart_threshold: 0,
    };
    let issues = evaluate_host(&host(10.0, 50.0, 0.0), &limits);
    assert_eq!(issues.len(), 1);
}

#[test]
fn containers_memory_and_restarts() {
    let list = [
        container("web", 10.0, 91.24, Some(7)),
        container("db", 10.0, 10.0, Some(5)),
    ];
    let lines: Vec<_> = evaluate_containers(&list, &Thresholds::default())
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        lines,
        ["Container web: Memory 91.24%", "Container web: Restarts 7"]
    );
}

#[test]
fn containers_without_restart_count_skip_restart_check() {
    let list = [container("web", 10.0, 10.0, None)];
    let limits = Thresholds {
        restart_threshold: 0,
        ..Thresholds::default()
    };
    assert!(evaluate_containers(&list, &limits).is_empty());
}

#[test]
fn empty_container_list_has_no_issues() {
    assert!(evaluate_containers(&[], &Thresholds::default()).is_empty());
}
