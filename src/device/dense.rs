//! Dense connectivity with a device-resident mirror
//!
//! The presence mask is built on the host by [`DenseMatrix`] and then copied
//! to the device. Numeric payloads attached to the matrix (one value per
//! cell, present or not) are transferred on demand and handed to the caller.

use std::mem::size_of;

use crate::device::{Device, DeviceBuffer, DeviceElement, DeviceError};
use crate::error::{ConnectivityError, Result};
use crate::matrix::dense::DenseMatrix;
use crate::matrix::index::RankIndex;

/// Dense connectivity whose mask is mirrored into accelerator memory
pub struct DenseMatrixDevice<I, D: Device> {
    host: DenseMatrix<I>,
    device: D,
    mask_on_device: Option<D::Buffer<u64>>,
}

impl<I: RankIndex, D: Device> DenseMatrixDevice<I, D> {
    pub fn new(num_rows: usize, num_columns: usize, device: D) -> Self {
        log::debug!(
            "DenseMatrixDevice::new: {} x {} on {}",
            num_rows,
            num_columns,
            device.name()
        );
        Self {
            host: DenseMatrix::new(num_rows, num_columns),
            device,
            mask_on_device: None,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.host.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.host.num_columns()
    }

    /// The host-side mask
    pub fn host(&self) -> &DenseMatrix<I> {
        &self.host
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Device mirror of the mask words, present after a successful build
    pub fn mask_on_device(&self) -> Option<&D::Buffer<u64>> {
        self.mask_on_device.as_ref()
    }

    /// Builds the host mask from row/column lists, then mirrors it to the device.
    ///
    /// Blocks until the transfer completed. If the transfer fails the host
    /// mask is kept and no device mirror is held.
    pub fn init_matrix_from_lil(&mut self, row_indices: &[I], column_indices: &[Vec<I>]) -> Result<()> {
        log::debug!("DenseMatrixDevice::init_matrix_from_lil");

        // Initialization on host side
        self.host.init_matrix_from_lil(row_indices, column_indices)?;

        // transfer to device
        self.host_to_device()
    }

    fn host_to_device(&mut self) -> Result<()> {
        log::debug!("DenseMatrixDevice::host_to_device");
        self.mask_on_device = None;

        let words = self.host.mask_words();
        let mut buffer = self
            .device
            .alloc::<u64>(words.len())
            .map_err(|err| report("DenseMatrixDevice::host_to_device (alloc)", err))?;
        self.device
            .copy_host_to_device(words, &mut buffer)
            .map_err(|err| report("DenseMatrixDevice::host_to_device (copy)", err))?;

        self.mask_on_device = Some(buffer);
        Ok(())
    }

    /// Allocates a device buffer for a per-cell variable and fills it from `host_variable`.
    ///
    /// The returned buffer belongs to the caller; clearing or dropping the
    /// matrix does not affect it.
    ///
    /// # Panics
    ///
    /// Panics if `host_variable.len()` is not `num_rows * num_columns`. The
    /// check happens before any device call.
    pub fn init_matrix_variable_gpu<T: DeviceElement>(&self, host_variable: &[T]) -> Result<D::Buffer<T>> {
        log::debug!("DenseMatrixDevice::init_matrix_variable_gpu");

        let num_dense_elem = self.host.num_cells();
        assert_eq!(
            num_dense_elem,
            host_variable.len(),
            "host variable must hold num_rows * num_columns elements"
        );

        let mut gpu_variable = self
            .device
            .alloc::<T>(num_dense_elem)
            .map_err(|err| report("DenseMatrixDevice::init_matrix_variable_gpu (alloc)", err))?;
        self.device
            .copy_host_to_device(host_variable, &mut gpu_variable)
            .map_err(|err| report("DenseMatrixDevice::init_matrix_variable_gpu (copy)", err))?;

        Ok(gpu_variable)
    }

    /// Copies a per-cell device variable back into a host vector
    pub fn read_matrix_variable<T: DeviceElement>(&self, gpu_variable: &D::Buffer<T>) -> Result<Vec<T>> {
        let mut host = vec![T::zeroed(); gpu_variable.len()];
        self.device
            .copy_device_to_host(gpu_variable, &mut host)
            .map_err(|err| report("DenseMatrixDevice::read_matrix_variable", err))?;
        Ok(host)
    }

    /// Releases the device mirror.
    ///
    /// The host mask is kept and can be mirrored again by the next build.
    /// Variables handed out by [`init_matrix_variable_gpu`](Self::init_matrix_variable_gpu)
    /// are not affected.
    pub fn clear(&mut self) {
        log::debug!("DenseMatrixDevice::clear");
        self.mask_on_device = None;
    }

    /// Size in bytes of the stored connectivity.
    ///
    /// Device memory of handed-out variables is not included.
    pub fn size_in_bytes(&self) -> usize {
        let mut size = 2 * size_of::<I>(); // scalar values

        size += self.host.size_in_bytes();

        size
    }
}

fn report(op: &'static str, source: DeviceError) -> ConnectivityError {
    log::error!("{}: {}", op, source);
    ConnectivityError::Device { op, source }
}
