use conngraph::{
    to_sprs_forward, ConnectivityConfig, CsrcMatrix, DenseMatrixDevice, Device, DeviceBuffer,
    HostDevice,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    println!("conngraph {}: dual-view connectivity storage", conngraph::VERSION);

    // Worked example: rows 0 and 2 of a 3 x 3 pattern
    let mut m = CsrcMatrix::<u32>::with_config(3, 3, ConnectivityConfig::verified());
    if let Err(err) = m.init_matrix_from_lil(&[0, 2], &[vec![1, 2], vec![0]]) {
        eprintln!("build failed: {}", err);
        return;
    }

    println!("\nSmall matrix:");
    println!("{:?}", m);
    println!("  col_ptr: {:?}", m.col_ptr());
    println!("  row_idx: {:?}", m.row_idx());
    println!("  inv_idx: {:?}", m.inv_idx());

    // Random pattern
    let config = ConnectivityConfig::default();
    let mut rng = StdRng::seed_from_u64(1234);
    let ranks: Vec<u32> = (0..1000).collect();
    let mut random = CsrcMatrix::with_config(1000, 1000, config.clone());

    if let Err(err) = random.fixed_probability_pattern(&ranks, &ranks, 0.05, false, &mut rng) {
        eprintln!("pattern generation failed: {}", err);
        return;
    }

    println!("\nRandom pattern (p = 0.05):");
    println!("  Non-zeros: {}", random.num_non_zeros());
    println!("  Size in bytes: {}", random.size_in_bytes());
    println!("  Backward view reliable: {}", random.is_backward_view_reliable());
    println!("  Verification threads: {}", config.n_threads);
    println!("  Distinct cells: {}", to_sprs_forward(&random).nnz());

    // Dense connectivity mirrored to the emulated device
    let device = HostDevice::new();
    let mut dense = DenseMatrixDevice::<u32, _>::new(64, 64, device.clone());
    let rows: Vec<u32> = (0..64).collect();
    let cols: Vec<Vec<u32>> = rows.iter().map(|&r| vec![(r + 1) % 64]).collect();

    if let Err(err) = dense.init_matrix_from_lil(&rows, &cols) {
        eprintln!("dense build failed: {}", err);
        return;
    }

    match dense.init_matrix_variable_gpu(&vec![0.0f64; 64 * 64]) {
        Ok(weights) => {
            println!("\nDense matrix on {}:", device.name());
            println!("  Present cells: {}", dense.host().nb_synapses());
            println!("  Host bytes: {}", dense.size_in_bytes());
            println!("  Weight buffer elements: {}", weights.len());
            println!("  Device bytes in use: {}", device.allocated_bytes());
        }
        Err(err) => eprintln!("variable transfer failed: {}", err),
    }
}

