//! Grid lookup vs linear scan for detector coverage queries

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use cloak_sim::core::types::{ActorId, CellPos, FactionId};
use cloak_sim::detection::{DetectionRegistry, DetectorUnit};

const MAP_SIZE: i32 = 256;

fn populated(count: u32, rng: &mut ChaCha8Rng) -> DetectionRegistry {
    let mut registry = DetectionRegistry::new(8);
    for i in 0..count {
        registry.queue_add(DetectorUnit {
            actor: ActorId(i),
            owner: FactionId(i % 4),
            position: CellPos::new(rng.gen_range(0..MAP_SIZE), rng.gen_range(0..MAP_SIZE)),
            range: rng.gen_range(2..8),
        });
    }
    registry.apply_pending();
    registry
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detector_coverage");
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for count in [100u32, 1_000, 10_000] {
        let registry = populated(count, &mut rng);
        let targets: Vec<CellPos> = (0..256)
            .map(|_| CellPos::new(rng.gen_range(0..MAP_SIZE), rng.gen_range(0..MAP_SIZE)))
            .collect();
        let hostile = |d: &DetectorUnit| d.owner != FactionId(0);

        group.bench_with_input(BenchmarkId::new("grid", count), &targets, |b, targets| {
            b.iter(|| {
                targets
                    .iter()
                    .filter(|t| registry.any_in_range(black_box(**t), hostile))
                    .count()
            })
        });

        group.bench_with_input(BenchmarkId::new("scan", count), &targets, |b, targets| {
            b.iter(|| {
                targets
                    .iter()
                    .filter(|t| registry.any_in_range_scan(black_box(**t), hostile))
                    .count()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_detection);
criterion_main!(benches);
