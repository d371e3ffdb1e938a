use criterion::{criterion_group, criterion_main, Criterion};
use gov_core::Parameter;
use gov_econ::{random_city, RulesetEconomy};
use gov_solver::{Governor, GovernorConfig};

fn bench_query(c: &mut Criterion) {
    let eco = RulesetEconomy::default();
    let parameter = Parameter::default();
    let config = GovernorConfig {
        strict_invariants: false,
        ..GovernorConfig::default()
    };

    c.bench_function("query_cold", |b| {
        let mut city = random_city(42, 8, 20);
        b.iter(|| {
            let mut gov = Governor::new(config.clone());
            let _ = gov.query(&eco, &mut city, &parameter);
        })
    });

    c.bench_function("query_warm", |b| {
        let mut city = random_city(42, 8, 20);
        let mut gov = Governor::new(config.clone());
        let _ = gov.query(&eco, &mut city, &parameter);
        b.iter(|| {
            let _ = gov.query(&eco, &mut city, &parameter);
        })
    });
}

criterion_group!(benches, bench_query);
criterion_main!(benches);
