use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::NaiveDate;
use larder_core::Branch;
use larder_infra::{CsvRepository, LarderService, Repository};
use larder_inventory::{
    InventoryLedger, ItemKey, LogMovement, MovementType, NegativeStockPolicy, UsagePeriod,
};
use rust_decimal::Decimal;

const CATEGORIES: [&str; 4] = ["Vegetable", "Meat", "Sauce", "Spice"];

fn key(i: usize) -> ItemKey {
    ItemKey::new(
        Branch::ALL[i % Branch::ALL.len()],
        CATEGORIES[i % CATEGORIES.len()],
        format!("item-{}", i % 200),
    )
}

fn movement(i: usize) -> LogMovement {
    LogMovement {
        date: NaiveDate::from_ymd_opt(2024, 1 + (i % 12) as u32, 1 + (i % 28) as u32).unwrap(),
        key: key(i),
        unit: "kg".to_string(),
        movement_type: if i % 3 == 0 { MovementType::In } else { MovementType::Out },
        qty: Decimal::new(1 + (i % 50) as i64, 1),
    }
}

/// Ledger with `count` movements already applied.
fn ledger_with_history(count: usize) -> InventoryLedger {
    let mut ledger = InventoryLedger::new(NegativeStockPolicy::Allow);
    for i in 0..count {
        let mut cmd = movement(i);
        // Seed every key with an IN so later OUTs hit an existing row.
        if i < 1400 {
            cmd.movement_type = MovementType::In;
        }
        ledger.log_movement(cmd).unwrap();
    }
    ledger
}

fn bench_movement_application(c: &mut Criterion) {
    let mut group = c.benchmark_group("movement_application");
    group.throughput(Throughput::Elements(1));

    for history in [0usize, 1_000, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::new("log_movement", history),
            history,
            |b, &size| {
                let base = ledger_with_history(size);
                let mut i = 0usize;
                b.iter_batched(
                    || base.clone(),
                    |mut ledger| {
                        i += 1;
                        black_box(ledger.log_movement(movement(i)).unwrap());
                    },
                    criterion::BatchSize::LargeInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_usage_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("usage_aggregation");

    for count in [1_000usize, 10_000, 50_000].iter() {
        let ledger = ledger_with_history(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("month", count), &ledger, |b, ledger| {
            let period = UsagePeriod::month(2024, 6);
            b.iter(|| black_box(ledger.usage_summary(&period).unwrap()));
        });
    }

    group.finish();
}

fn bench_file_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_round_trip");
    group.sample_size(20);

    for count in [1_000usize, 10_000].iter() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CsvRepository::new(dir.path());
        let (records, movements) = ledger_with_history(*count).into_parts();
        repo.save_inventory(&records).unwrap();
        repo.save_movements(&movements).unwrap();

        group.bench_with_input(BenchmarkId::new("load_movements", count), &repo, |b, repo| {
            b.iter(|| black_box(repo.load_movements().unwrap()));
        });

        let service = LarderService::new(repo.clone(), NegativeStockPolicy::Allow);
        group.bench_with_input(
            BenchmarkId::new("service_log_movement", count),
            &service,
            |b, service| {
                let mut i = 0usize;
                b.iter(|| {
                    i += 1;
                    black_box(service.log_movement(movement(i)).unwrap());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_movement_application,
    bench_usage_aggregation,
    bench_file_round_trip
);
criterion_main!(benches);
