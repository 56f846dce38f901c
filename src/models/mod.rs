// Domain models

mod container;
mod host;

pub use container::{
    AppHealth, ContainerDetail, ContainerHandle, ContainerMetadata, ContainerSnapshot,
    ContainerState, InterfaceCounters, RawContainerStats,
};
pub use host::{HostDetail, HostSnapshot, LoadAverages};
