//! Dispenser benchmarks
//!
//! - Reservation: all-or-nothing debit across a recipe's stocks
//! - Dispense: gate admission plus brewing on one task
//! - Contention: concurrent dispenses sharing a few outlets
//!
//! Run with: `cargo bench`

#![allow(missing_docs)] // Benchmarks don't need extensive docs
#![allow(clippy::expect_used)] // Benchmarks can use expect for setup

use beverage_dispenser_core::{BeverageKind, IngredientKind, InventoryStore, Recipe};
use beverage_dispenser_testing::water_only_dispenser;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;

/// Stock deep enough that no benchmark iteration runs it dry.
const BOTTOMLESS: i64 = i64::MAX / 2;

fn benchmark_reservation(c: &mut Criterion) {
    let mut group = c.benchmark_group("reservation");
    group.throughput(Throughput::Elements(1));

    let store = InventoryStore::from_levels(IngredientKind::ALL.map(|kind| (kind, BOTTOMLESS)))
        .expect("Failed to build store");

    let single = Recipe::from_quantities([(IngredientKind::Water, 1)]).expect("valid recipe");
    group.bench_function("one_ingredient", |b| {
        b.iter(|| store.reserve_all(black_box(&single)));
    });

    let tea = Recipe::from_quantities([
        (IngredientKind::Water, 2),
        (IngredientKind::Milk, 1),
        (IngredientKind::TeaLeavesSyrup, 1),
        (IngredientKind::ElaichiSyrup, 1),
        (IngredientKind::SugarSyrup, 1),
    ])
    .expect("valid recipe");
    group.bench_function("five_ingredients", |b| {
        b.iter(|| store.reserve_all(black_box(&tea)));
    });

    let empty = InventoryStore::from_levels([(IngredientKind::Water, 0)]).expect("valid store");
    group.bench_function("shortage", |b| {
        b.iter(|| empty.reserve_all(black_box(&single)));
    });

    group.finish();
}

fn benchmark_dispense(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispense");
    group.throughput(Throughput::Elements(1));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime");

    group.bench_function("uncontended", |b| {
        let dispenser = water_only_dispenser(3, BOTTOMLESS, 1);

        b.to_async(&runtime).iter(|| async {
            let _ = dispenser.dispense(black_box(BeverageKind::HotWater)).await;
        });
    });

    group.bench_function("named", |b| {
        let dispenser = water_only_dispenser(3, BOTTOMLESS, 1);

        b.to_async(&runtime).iter(|| async {
            let _ = dispenser.dispense_named(black_box("green_tea")).await;
        });
    });

    group.finish();
}

fn benchmark_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention");
    group.throughput(Throughput::Elements(10));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .expect("Failed to build runtime");

    group.bench_function("10_concurrent_dispenses_3_outlets", |b| {
        let dispenser = Arc::new(water_only_dispenser(3, BOTTOMLESS, 1));

        b.to_async(&runtime).iter(|| async {
            let handles: Vec<_> = (0..10)
                .map(|_| {
                    let dispenser = Arc::clone(&dispenser);
                    tokio::spawn(async move {
                        let _ = dispenser.dispense(BeverageKind::HotWater).await;
                    })
                })
                .collect();

            for handle in handles {
                handle.await.expect("Task failed");
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_reservation,
    benchmark_dispense,
    benchmark_contention,
);
criterion_main!(benches);
