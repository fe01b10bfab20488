//! Benchmarks for tabula-partition.
//!
//! Target: a single-record batch against a 10k-record tree stays well under 1ms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::rc::Rc;
use tabula_core::{Entity, Order, SortDescriptor, SortDescriptors, Value};
use tabula_partition::{PartitionTree, Section, SectionDef};

const TIERS: [&str; 4] = ["waitlist", "reserved", "seated", "finished"];

fn make_entity(id: u64, tier: &str, score: i64) -> Entity {
    Entity::new(id, vec![Value::from(tier), Value::Int64(score)])
}

fn make_tree() -> PartitionTree<Entity> {
    let defs: Vec<SectionDef<Entity>> = TIERS
        .iter()
        .map(|&tier| {
            SectionDef::new(tier, move |e: &Entity| {
                e.get(0).and_then(|v| v.as_str()) == Some(tier)
            })
        })
        .collect();
    let by_score = SortDescriptors::new().with(SortDescriptor::field(1, Order::Asc));
    PartitionTree::from_defs(&defs, Rc::new(by_score))
}

fn populated_tree(size: u64) -> PartitionTree<Entity> {
    let mut tree = make_tree();
    tree.load((0..size).map(|i| make_entity(i, TIERS[(i % 4) as usize], (i * 7 % 1000) as i64)));
    tree
}

fn bench_section_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("section_commit");

    for size in [10u64, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("stage_commit", size), &size, |b, &size| {
            let by_score: Rc<dyn tabula_core::Comparator<Entity>> =
                Rc::new(SortDescriptors::new().with(SortDescriptor::field(1, Order::Asc)));
            b.iter(|| {
                let mut section: Section<Entity> =
                    SectionDef::new("all", |_: &Entity| true).build(0, Rc::clone(&by_score));
                for i in 0..size {
                    section.stage(make_entity(i, "all", (size - i) as i64));
                }
                section.commit();
                black_box(section.len())
            })
        });
    }

    group.finish();
}

fn bench_single_record_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_record_batch");

    for size in [100u64, 1000, 10000] {
        let mut tree = populated_tree(size);
        let mut score = 0i64;

        group.bench_function(BenchmarkId::new("move_across_sections", size), |b| {
            b.iter(|| {
                score += 1;
                let tier = TIERS[(score % 4) as usize];
                let outcome = tree.process_changed_records(vec![make_entity(0, tier, score)]);
                black_box(outcome.len())
            })
        });
    }

    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for size in [1000u64, 10000] {
        let records: Vec<Entity> = (0..size)
            .map(|i| make_entity(i, TIERS[(i % 4) as usize], i as i64))
            .collect();
        let mut tree = make_tree();

        group.bench_with_input(BenchmarkId::new("full_reload", size), &records, |b, records| {
            b.iter(|| black_box(tree.load(records.iter().cloned())))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_section_commit,
    bench_single_record_batch,
    bench_load
);
criterion_main!(benches);
