//! Accelerator memory abstraction
//!
//! Every device operation returns a `DeviceResult`, so the status of an
//! allocation or copy is checked right where the call is made instead of
//! through a process-wide "last error".

pub mod dense;
pub mod host;

pub use dense::DenseMatrixDevice;
pub use host::{HostBuffer, HostDevice};

use thiserror::Error;

/// Plain-old-data types that can be copied byte-for-byte to a device
pub trait DeviceElement: bytemuck::Pod + Send + Sync {}

impl<T: bytemuck::Pod + Send + Sync> DeviceElement for T {}

/// Errors reported by a device backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// Allocation exceeds the memory left on the device.
    #[error("out of device memory: requested {requested} bytes, {available} available")]
    OutOfMemory { requested: usize, available: usize },

    /// Host and device extents of a copy differ.
    #[error("copy extent mismatch: host has {host} elements, device buffer has {device}")]
    LengthMismatch { host: usize, device: usize },

    /// The device cannot service requests.
    #[error("device unavailable: {0}")]
    Unavailable(String),
}

/// Result type for device operations.
pub type DeviceResult<T> = std::result::Result<T, DeviceError>;

/// A buffer living in device memory.
pub trait DeviceBuffer<T> {
    /// Number of elements
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes occupied on the device
    fn size_in_bytes(&self) -> usize {
        self.len() * std::mem::size_of::<T>()
    }
}

/// An accelerator able to hold buffers and exchange them with host memory.
///
/// Transfers are synchronous: a copy has completed, or failed, when the call
/// returns. Buffers are owned by whoever receives them and release their
/// device memory when dropped.
pub trait Device {
    type Buffer<T: DeviceElement>: DeviceBuffer<T>;

    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Allocates a zero-filled buffer of `len` elements
    fn alloc<T: DeviceElement>(&self, len: usize) -> DeviceResult<Self::Buffer<T>>;

    /// Copies `host` into `dst`; extents must match exactly
    fn copy_host_to_device<T: DeviceElement>(&self, host: &[T], dst: &mut Self::Buffer<T>) -> DeviceResult<()>;

    /// Copies `src` into `host`; extents must match exactly
    fn copy_device_to_host<T: DeviceElement>(&self, src: &Self::Buffer<T>, host: &mut [T]) -> DeviceResult<()>;
}
