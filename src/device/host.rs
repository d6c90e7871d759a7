//! Host-emulated accelerator
//!
//! Buffers are cache-line aligned host allocations. An optional memory
//! limit makes the backend behave like a device with finite memory, so
//! allocation failures can be exercised without hardware.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use aligned_vec::AVec;

use super::{Device, DeviceBuffer, DeviceElement, DeviceError, DeviceResult};

/// Alignment of emulated device allocations, in bytes
const DEVICE_ALIGNMENT: usize = 128;

/// Device backend that keeps "device" memory in aligned host allocations
#[derive(Debug, Clone)]
pub struct HostDevice {
    memory_limit: Option<usize>,
    allocated: Arc<AtomicUsize>,
}

/// Buffer owned by a [`HostDevice`] allocation
///
/// The allocation is returned to the device's ledger on drop, even when the
/// device handle itself has already been dropped.
pub struct HostBuffer<T> {
    data: AVec<T>,
    ledger: Arc<AtomicUsize>,
    bytes: usize,
}

impl<T> DeviceBuffer<T> for HostBuffer<T> {
    fn len(&self) -> usize {
        self.data.len()
    }
}

impl<T> Drop for HostBuffer<T> {
    fn drop(&mut self) {
        self.ledger.fetch_sub(self.bytes, Ordering::SeqCst);
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for HostBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostBuffer")
            .field("len", &self.data.len())
            .field("bytes", &self.bytes)
            .finish()
    }
}

impl HostDevice {
    /// Device without a memory limit
    pub fn new() -> Self {
        log::info!("Host-emulated device initialized");
        Self {
            memory_limit: None,
            allocated: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Device that refuses allocations beyond `bytes` in total
    pub fn with_memory_limit(bytes: usize) -> Self {
        log::info!("Host-emulated device initialized with {} bytes", bytes);
        Self {
            memory_limit: Some(bytes),
            allocated: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Bytes currently held by live buffers
    pub fn allocated_bytes(&self) -> usize {
        self.allocated.load(Ordering::SeqCst)
    }

    fn reserve(&self, requested: usize) -> DeviceResult<()> {
        let Some(limit) = self.memory_limit else {
            self.allocated.fetch_add(requested, Ordering::SeqCst);
            return Ok(());
        };

        self.allocated
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                used.checked_add(requested).filter(|&total| total <= limit)
            })
            .map(|_| ())
            .map_err(|used| DeviceError::OutOfMemory {
                requested,
                available: limit.saturating_sub(used),
            })
    }
}

impl Default for HostDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for HostDevice {
    type Buffer<T: DeviceElement> = HostBuffer<T>;

    fn name(&self) -> &str {
        "host-emulated"
    }

    fn alloc<T: DeviceElement>(&self, len: usize) -> DeviceResult<HostBuffer<T>> {
        let bytes = len
            .checked_mul(std::mem::size_of::<T>())
            .ok_or(DeviceError::OutOfMemory {
                requested: usize::MAX,
                available: 0,
            })?;
        self.reserve(bytes)?;

        Ok(HostBuffer {
            data: AVec::from_iter(DEVICE_ALIGNMENT, (0..len).map(|_| T::zeroed())),
            ledger: Arc::clone(&self.allocated),
            bytes,
        })
    }

    fn copy_host_to_device<T: DeviceElement>(&self, host: &[T], dst: &mut HostBuffer<T>) -> DeviceResult<()> {
        if host.len() != dst.data.len() {
            return Err(DeviceError::LengthMismatch {
                host: host.len(),
                device: dst.data.len(),
            });
        }
        dst.data.copy_from_slice(host);
        Ok(())
    }

    fn copy_device_to_host<T: DeviceElement>(&self, src: &HostBuffer<T>, host: &mut [T]) -> DeviceResult<()> {
        if host.len() != src.data.len() {
            return Err(DeviceError::LengthMismatch {
                host: host.len(),
                device: src.data.len(),
            });
        }
        host.copy_from_slice(&src.data);
        Ok(())
    }
}
