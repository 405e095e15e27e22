use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use strata_formula::{calculate_buy_for_sell, purchase_return, sale_amount, sale_return};
use strata_types::bip_to_pip;

fn bench_sale_return(c: &mut Criterion) {
    let mut group = c.benchmark_group("sale_return");
    let volume = bip_to_pip(1_000_000);
    let reserve = bip_to_pip(500_000);

    for crr in [10u32, 50, 80, 100] {
        group.bench_with_input(BenchmarkId::new("crr", crr), &crr, |b, &crr| {
            b.iter(|| {
                black_box(sale_return(
                    black_box(volume),
                    black_box(reserve),
                    crr,
                    black_box(bip_to_pip(1_234)),
                ))
            });
        });
    }

    group.finish();
}

fn bench_purchase_return(c: &mut Criterion) {
    let volume = bip_to_pip(1_000_000);
    let reserve = bip_to_pip(500_000);

    c.bench_function("purchase_return", |b| {
        b.iter(|| {
            black_box(purchase_return(
                black_box(volume),
                black_box(reserve),
                70,
                black_box(bip_to_pip(4_321)),
            ))
        });
    });
}

fn bench_sale_amount(c: &mut Criterion) {
    let volume = bip_to_pip(1_000_000);
    let reserve = bip_to_pip(500_000);

    c.bench_function("sale_amount", |b| {
        b.iter(|| {
            black_box(sale_amount(
                black_box(volume),
                black_box(reserve),
                30,
                black_box(bip_to_pip(17)),
            ))
        });
    });
}

fn bench_pool_swap(c: &mut Criterion) {
    c.bench_function("calculate_buy_for_sell", |b| {
        b.iter(|| {
            black_box(calculate_buy_for_sell(
                black_box(bip_to_pip(1_000_000)),
                black_box(bip_to_pip(2_000_000)),
                black_box(bip_to_pip(10)),
            ))
        });
    });
}

criterion_group!(
    benches,
    bench_sale_return,
    bench_purchase_return,
    bench_sale_amount,
    bench_pool_swap,
);
criterion_main!(benches);
