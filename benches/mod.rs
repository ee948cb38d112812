use criterion::{criterion_group, criterion_main};


use sequential_file::register_benchmarks as register_sequential_file_benchmarks;

criterion_group!(benches, register_sequential_file_benchmarks);

criterion_main!(benches);
