use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use satcompare::generators::{DEFAULT_K, pigeonhole, random_ksat};
use satcompare::sat::assignment::{Assignment, HashMapAssignment, VecAssignment};
use satcompare::sat::cdcl::Cdcl;
use satcompare::sat::cnf::Cnf;
use satcompare::sat::literal::{DoubleLiteral, Literal, PackedLiteral};
use satcompare::sat::propagation::{UnitSearch, WatchedLiterals};
use satcompare::sat::restarter::{Fixed, Geometric, Luby, Never};
use satcompare::sat::solver::{Algorithm, Configured, Solver, SolverConfig, solve};
use satcompare::sat::variable_selection::{FixedOrder, MostFrequent, Vsids, VsidsHeap};
use std::fmt::Debug;
use std::hint::black_box;
use std::marker::PhantomData;
use std::time::Duration;

#[derive(Debug, Clone)]
struct LayoutConfig<L: Literal, A: Assignment>(PhantomData<(L, A)>);

impl<L: Literal + Debug, A: Assignment + Debug> SolverConfig for LayoutConfig<L, A> {
    type Literal = L;
    type Assignment = A;
    type VariableSelector = VsidsHeap;
    type Propagator = WatchedLiterals;
    type Restarter = Luby<100>;
}

fn random_3sat_cnfs(n: usize, count: u64) -> Vec<Cnf> {
    (0..count)
        .map(|seed| {
            random_ksat(3 * n, 5 * n, DEFAULT_K, seed)
                .and_then(|i| i.to_cnf())
                .unwrap()
        })
        .collect()
}

fn cdcl_all<C: SolverConfig>(cnfs: &[Cnf<C::Literal>]) {
    for cnf in cnfs {
        let mut state: Cdcl<C> = Solver::new(cnf.clone());
        black_box(state.solve());
    }
}

fn bench_pigeonhole(c: &mut Criterion) {
    let mut group = c.benchmark_group("pigeonhole - algorithm");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    for n in 2..=5 {
        let cnf = pigeonhole(n).unwrap().to_cnf().unwrap();
        for algorithm in Algorithm::ALL {
            // DP's clause set explodes past PHP(4).
            if algorithm == Algorithm::Dp && n > 4 {
                continue;
            }
            group.bench_with_input(BenchmarkId::new(algorithm.name(), n), &cnf, |b, cnf| {
                b.iter(|| black_box(solve(cnf, algorithm)));
            });
        }
    }

    group.finish();
}

fn bench_random_3sat(c: &mut Criterion) {
    let mut group = c.benchmark_group("3sat - algorithm");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    for n in [2, 4, 6] {
        let cnfs = random_3sat_cnfs(n, 20);
        for algorithm in Algorithm::ALL {
            group.bench_with_input(BenchmarkId::new(algorithm.name(), n), &cnfs, |b, cnfs| {
                b.iter(|| {
                    for cnf in cnfs {
                        black_box(solve(cnf, algorithm));
                    }
                });
            });
        }
    }

    group.finish();
}

fn bench_cdcl_components(c: &mut Criterion) {
    let cnfs = random_3sat_cnfs(20, 50);

    let mut group = c.benchmark_group("3sat - variable selection");
    group.sample_size(20);
    group.bench_function("VSIDS heap", |b| {
        b.iter(|| cdcl_all::<Configured<VsidsHeap, WatchedLiterals, Luby<100>>>(&cnfs));
    });
    group.bench_function("VSIDS scan", |b| {
        b.iter(|| cdcl_all::<Configured<Vsids, WatchedLiterals, Luby<100>>>(&cnfs));
    });
    group.bench_function("Most frequent", |b| {
        b.iter(|| cdcl_all::<Configured<MostFrequent, WatchedLiterals, Luby<100>>>(&cnfs));
    });
    group.bench_function("Fixed order", |b| {
        b.iter(|| cdcl_all::<Configured<FixedOrder, WatchedLiterals, Luby<100>>>(&cnfs));
    });
    group.finish();

    let mut group = c.benchmark_group("3sat - propagator");
    group.sample_size(20);
    group.bench_function("Watched literals", |b| {
        b.iter(|| cdcl_all::<Configured<VsidsHeap, WatchedLiterals, Luby<100>>>(&cnfs));
    });
    group.bench_function("Unit search", |b| {
        b.iter(|| cdcl_all::<Configured<VsidsHeap, UnitSearch, Luby<100>>>(&cnfs));
    });
    group.finish();

    let mut group = c.benchmark_group("3sat - restarter");
    group.sample_size(20);
    group.bench_function("Luby", |b| {
        b.iter(|| cdcl_all::<Configured<VsidsHeap, WatchedLiterals, Luby<100>>>(&cnfs));
    });
    group.bench_function("Geometric", |b| {
        b.iter(|| cdcl_all::<Configured<VsidsHeap, WatchedLiterals, Geometric<2>>>(&cnfs));
    });
    group.bench_function("Fixed", |b| {
        b.iter(|| cdcl_all::<Configured<VsidsHeap, WatchedLiterals, Fixed<100>>>(&cnfs));
    });
    group.bench_function("Never", |b| {
        b.iter(|| cdcl_all::<Configured<VsidsHeap, WatchedLiterals, Never>>(&cnfs));
    });
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let cnfs = random_3sat_cnfs(20, 50);
    let packed: Vec<Cnf<PackedLiteral>> = cnfs.iter().map(|c| c.convert()).collect();

    let mut group = c.benchmark_group("3sat - literal and assignment layout");
    group.sample_size(20);
    group.bench_function("Double / vec", |b| {
        b.iter(|| cdcl_all::<LayoutConfig<DoubleLiteral, VecAssignment>>(&cnfs));
    });
    group.bench_function("Packed / vec", |b| {
        b.iter(|| cdcl_all::<LayoutConfig<PackedLiteral, VecAssignment>>(&packed));
    });
    group.bench_function("Double / hash map", |b| {
        b.iter(|| cdcl_all::<LayoutConfig<DoubleLiteral, HashMapAssignment>>(&cnfs));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_pigeonhole,
    bench_random_3sat,
    bench_cdcl_components,
    bench_layout
);
criterion_main!(benches);
