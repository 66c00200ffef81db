//! Accelerator support.
//!
//! Uses wgpu adapters (Metal, Vulkan, DX12) through burn's `Wgpu` backend.
//! [`ClusterResolver`] turns an address into a device; [`DistributionStrategy`]
//! spreads each batch over the accelerator's cores.

pub mod resolver;
pub mod strategy;

pub use resolver::{AcceleratorAddress, AcceleratorKind, ClusterResolver};
pub use strategy::{DistributionStrategy, DEFAULT_CORES};

/// Environment variable a notebook runtime sets to the attached accelerator.
pub const ACCELERATOR_ADDR_ENV: &str = "ACCELERATOR_ADDR";
