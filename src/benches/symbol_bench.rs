use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mootdx::core::frequency::Frequency;
use mootdx::core::symbol::market_of;

fn bench_market_of(c: &mut Criterion) {
    let symbols = ["600036", "000001", "300750", "688981", "430047"];

    c.bench_function("market_of", |b| {
        b.iter(|| {
            for symbol in &symbols {
                let _ = market_of(black_box(symbol));
            }
        })
    });
}

fn bench_frequency_parse(c: &mut Criterion) {
    let inputs = ["day", "15m", "1h", "week", "9"];

    c.bench_function("frequency_parse", |b| {
        b.iter(|| {
            for input in &inputs {
                let _ = Frequency::parse(black_box(input));
            }
        })
    });
}

criterion_group!(benches, bench_market_of, bench_frequency_parse);
criterion_main!(benches);
