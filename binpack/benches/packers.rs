use binpack::{
    GuillotineOptions, GuillotinePacker, InputItem, MaxRectsHeuristic, MaxRectsPacker, MetaPacker,
    MetaRect, ShelfChoice, ShelfPacker, SkylineHeuristic, SkylinePacker,
};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

const BIN: (u32, u32) = (512, 512);

fn sizes(count: usize, max: u32) -> Vec<(u32, u32)> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0x5eed);

    (0..count)
        .map(|_| (rng.gen_range(1..=max), rng.gen_range(1..=max)))
        .collect()
}

fn single_inserts(c: &mut Criterion) {
    let sizes = sizes(300, 48);
    let mut group = c.benchmark_group("insert");

    group.bench_function("guillotine", |b| {
        b.iter(|| {
            let mut packer = GuillotinePacker::new(BIN.0, BIN.1);
            for &size in &sizes {
                black_box(packer.insert(size, GuillotineOptions::default()));
            }
        })
    });

    group.bench_function("shelf", |b| {
        b.iter(|| {
            let mut packer = ShelfPacker::new(BIN.0, BIN.1, true);
            for &size in &sizes {
                black_box(packer.insert(size, ShelfChoice::BestAreaFit));
            }
        })
    });

    group.bench_function("maxrects", |b| {
        b.iter(|| {
            let mut packer = MaxRectsPacker::new(BIN.0, BIN.1);
            for &size in &sizes {
                black_box(packer.insert(size, MaxRectsHeuristic::BestShortSideFit));
            }
        })
    });

    group.bench_function("skyline", |b| {
        b.iter(|| {
            let mut packer = SkylinePacker::new(BIN.0, BIN.1, true);
            for &size in &sizes {
                black_box(packer.insert(size, SkylineHeuristic::MinWasteFit));
            }
        })
    });

    group.finish();
}

fn batch_inserts(c: &mut Criterion) {
    let sizes = sizes(120, 48);
    let items = || sizes.iter().map(|&size| InputItem::new(size)).collect::<Vec<_>>();
    let mut group = c.benchmark_group("insert_batch");

    group.bench_function("maxrects", |b| {
        b.iter_batched(
            items,
            |items| {
                let mut packer = MaxRectsPacker::new(BIN.0, BIN.1);
                black_box(packer.insert_batch(items, MaxRectsHeuristic::BestAreaFit))
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("skyline", |b| {
        b.iter_batched(
            items,
            |items| {
                let mut packer = SkylinePacker::new(BIN.0, BIN.1, false);
                black_box(packer.insert_batch(items, SkylineHeuristic::BottomLeft))
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn meta(c: &mut Criterion) {
    let sizes = sizes(200, 64);

    c.bench_function("meta_pack", |b| {
        b.iter_batched(
            || sizes.iter().map(|&size| MetaRect::new(size)).collect::<Vec<_>>(),
            |mut rects| {
                let mut packer = MetaPacker::new();
                black_box(packer.pack(&mut rects)).ok();
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, single_inserts, batch_inserts, meta);
criterion_main!(benches);
