//! Accelerator addresses and adapter lookup.
//!
//! An address names one `wgpu` adapter: `[wgpu://]<kind>[:<index>]`, where
//! kind is `discrete`, `integrated`, `virtual`, `cpu` or `default`.
//! Resolution only succeeds if a matching adapter is present on this host.

use std::fmt;
use std::str::FromStr;

use burn::backend::wgpu::WgpuDevice;

use crate::error::{Error, Result};

const SCHEME: &str = "wgpu";

/// Adapter class an address selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceleratorKind {
    Discrete,
    Integrated,
    Virtual,
    Cpu,
    /// Whatever adapter the backend would pick on its own.
    Default,
}

impl AcceleratorKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Discrete => "discrete",
            Self::Integrated => "integrated",
            Self::Virtual => "virtual",
            Self::Cpu => "cpu",
            Self::Default => "default",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "discrete" => Some(Self::Discrete),
            "integrated" => Some(Self::Integrated),
            "virtual" => Some(Self::Virtual),
            "cpu" => Some(Self::Cpu),
            "default" => Some(Self::Default),
            _ => None,
        }
    }

    fn matches(&self, device_type: wgpu::DeviceType) -> bool {
        match self {
            Self::Discrete => device_type == wgpu::DeviceType::DiscreteGpu,
            Self::Integrated => device_type == wgpu::DeviceType::IntegratedGpu,
            Self::Virtual => device_type == wgpu::DeviceType::VirtualGpu,
            Self::Cpu => device_type == wgpu::DeviceType::Cpu,
            Self::Default => true,
        }
    }
}

/// Parsed accelerator address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceleratorAddress {
    pub kind: AcceleratorKind,
    /// Position among adapters of the same kind.
    pub index: usize,
}

impl AcceleratorAddress {
    /// burn device this address maps to.
    pub fn device(&self) -> WgpuDevice {
        match self.kind {
            AcceleratorKind::Discrete => WgpuDevice::DiscreteGpu(self.index),
            AcceleratorKind::Integrated => WgpuDevice::IntegratedGpu(self.index),
            AcceleratorKind::Virtual => WgpuDevice::VirtualGpu(self.index),
            AcceleratorKind::Cpu => WgpuDevice::Cpu,
            AcceleratorKind::Default => WgpuDevice::DefaultDevice,
        }
    }
}

impl FromStr for AcceleratorAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidAcceleratorAddress {
            address: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid("address is empty".into()));
        }

        let rest = match trimmed.split_once("://") {
            Some((scheme, rest)) if scheme == SCHEME => rest,
            Some((scheme, _)) => {
                return Err(invalid(format!(
                    "unsupported scheme '{}', expected {}://",
                    scheme, SCHEME
                )))
            }
            None => trimmed,
        };

        let (kind_name, index) = match rest.split_once(':') {
            Some((kind, index)) => (kind, Some(index)),
            None => (rest, None),
        };

        let kind = AcceleratorKind::from_name(kind_name)
            .ok_or_else(|| invalid(format!("unknown adapter kind '{}'", kind_name)))?;

        let index = match index {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| invalid(format!("bad adapter index '{}'", raw)))?,
            None => 0,
        };

        if index != 0 && matches!(kind, AcceleratorKind::Cpu | AcceleratorKind::Default) {
            return Err(invalid(format!("'{}' takes no index", kind.name())));
        }

        Ok(Self { kind, index })
    }
}

impl fmt::Display for AcceleratorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AcceleratorKind::Cpu | AcceleratorKind::Default => {
                write!(f, "{}://{}", SCHEME, self.kind.name())
            }
            _ => write!(f, "{}://{}:{}", SCHEME, self.kind.name(), self.index),
        }
    }
}

/// Maps an address onto a live adapter.
#[derive(Debug, Clone)]
pub struct ClusterResolver {
    address: AcceleratorAddress,
}

impl ClusterResolver {
    pub fn new(address: AcceleratorAddress) -> Self {
        Self { address }
    }

    /// Parse `address` and build a resolver for it.
    pub fn from_address(address: &str) -> Result<Self> {
        Ok(Self::new(address.parse()?))
    }

    pub fn address(&self) -> AcceleratorAddress {
        self.address
    }

    /// Look the address up among the adapters `wgpu` reports.
    pub fn resolve(&self) -> Result<WgpuDevice> {
        let adapters = available_adapters();
        self.resolve_among(&adapters)
    }

    fn resolve_among(&self, adapters: &[wgpu::AdapterInfo]) -> Result<WgpuDevice> {
        let mut matching = adapters
            .iter()
            .filter(|info| self.address.kind.matches(info.device_type));
        let available = matching.clone().count();

        let Some(info) = matching.nth(self.address.index) else {
            return Err(Error::AcceleratorNotFound {
                kind: self.address.kind.name().to_string(),
                index: self.address.index,
                available,
            });
        };

        tracing::info!(
            adapter = %info.name,
            backend = ?info.backend,
            address = %self.address,
            "resolved accelerator"
        );
        Ok(self.address.device())
    }
}

/// Adapters visible to `wgpu` on any backend.
pub fn available_adapters() -> Vec<wgpu::AdapterInfo> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    instance
        .enumerate_adapters(wgpu::Backends::all())
        .into_iter()
        .map(|adapter| adapter.get_info())
        .collect()
}
