// benches/propagation.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dna_quantum_sim::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn benchmark_propagation(c: &mut Criterion) {
    c.bench_function("lattice_exact_12_sites_50_steps", |b| {
        let seq = Sequence::new("ATCGGCTAATCG");
        let initial = lattice_state(&seq).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let hamiltonian =
            Hamiltonian::tight_binding(seq.len(), &LatticeParams::default(), &mut rng).unwrap();
        let config = EvolutionConfig {
            num_steps: 50,
            record_mode: RecordMode::Observables,
            constants: PhysicalConstants::ev_lattice(),
            ..EvolutionConfig::default()
        };

        b.iter(|| {
            let trajectory = evolve(
                black_box(&initial),
                &hamiltonian,
                None,
                Integrator::DirectExact,
                &config,
            )
            .unwrap();
            black_box(trajectory.final_state.norm())
        });
    });

    c.bench_function("spectral_double_well_128_points_50_steps", |b| {
        let grid = SpatialGrid::centered(128, 5.0e-12).unwrap();
        let well = DoubleWell::for_pair(BasePair::AT);
        let constants = PhysicalConstants::si_proton();
        let hamiltonian = Hamiltonian::double_well_on_grid(&grid, &well, &constants).unwrap();
        let initial = gaussian_packet(&grid, -well.half_separation, 3.0e-11).unwrap();
        let drive = PerturbationTerm::sinusoidal(ev_to_joules(0.005), 1.0e13)
            .with_noise(ev_to_joules(0.0005));
        let config = EvolutionConfig {
            dt: 1.0e-17,
            num_steps: 50,
            record_mode: RecordMode::Observables,
            constants,
            ..EvolutionConfig::default()
        };

        b.iter(|| {
            let trajectory = evolve(
                black_box(&initial),
                &hamiltonian,
                Some(&drive),
                Integrator::Spectral,
                &config,
            )
            .unwrap();
            black_box(trajectory.mean_right_well())
        });
    });

    c.bench_function("entanglement_entropy_12_base_regions", |b| {
        let seq_a = Sequence::new("ATCGGCTAATCG");
        let seq_b = Sequence::new("CGTACGTACGTA");

        b.iter(|| entanglement_entropy(black_box(&seq_a), black_box(&seq_b)).unwrap());
    });
}

criterion_group!(benches, benchmark_propagation);
criterion_main!(benches);
