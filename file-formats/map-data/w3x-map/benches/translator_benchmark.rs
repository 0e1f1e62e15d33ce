//! translator benchmarks

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use w3_data::FourCC;
use w3x_map::{
    Modification, ObjectCategory, ObjectKey, ObjectModificationTable, ObjectTranslator, Terrain,
    TerrainTranslator, Translator,
};

fn sample_table(entries: u32) -> ObjectModificationTable {
    let mut table = ObjectModificationTable::new();
    for i in 0..entries {
        let digits = format!("{:03}", i % 1000);
        let [a, b, c] = [digits.as_bytes()[0], digits.as_bytes()[1], digits.as_bytes()[2]];
        let code = FourCC::new([b'A', a, b, c]);
        let data = (1..=4)
            .map(|level| Modification::leveled(FourCC::new(*b"Hbz1"), level * 10, level, 1))
            .chain(std::iter::once(Modification::leveled(
                FourCC::new(*b"anam"),
                "Blizzard",
                0,
                0,
            )))
            .collect();
        let _ = table.insert_custom(ObjectKey::new(code, FourCC::new(*b"AHbz")), data);
    }
    table
}

fn bench_terrain(c: &mut Criterion) {
    let mut group = c.benchmark_group("terrain");
    for size in [64usize, 256] {
        let terrain = Terrain::flat('L', size, size);
        let bytes = TerrainTranslator.encode(&terrain).unwrap();

        group.bench_with_input(BenchmarkId::new("decode", size), &bytes, |b, bytes| {
            b.iter(|| TerrainTranslator.decode(black_box(bytes)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("encode", size), &terrain, |b, terrain| {
            b.iter(|| TerrainTranslator.encode(black_box(terrain)).unwrap());
        });
    }
    group.finish();
}

fn bench_object_table(c: &mut Criterion) {
    let translator = ObjectTranslator::new(ObjectCategory::Abilities);
    let table = sample_table(500);
    let bytes = translator.encode(&table).unwrap();

    c.bench_function("ability_table_decode", |b| {
        b.iter(|| translator.decode(black_box(&bytes)).unwrap());
    });
    c.bench_function("ability_table_encode", |b| {
        b.iter(|| translator.encode(black_box(&table)).unwrap());
    });
}

criterion_group!(benches, bench_terrain, bench_object_table);
criterion_main!(benches);
