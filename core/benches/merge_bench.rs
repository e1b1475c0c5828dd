use criterion::{criterion_group, criterion_main, Criterion};
use ordering_core::{merge, Pointer, Post};
use std::collections::HashMap;

fn bench_merge(c: &mut Criterion) {
    let defaults: Vec<Post> = (0..500).map(|id| Post::new(id, format!("Post {id}"))).collect();
    let pointers: Vec<Pointer> = (0..25).map(|i| Pointer::new(i * 17 + 3, (i as usize) * 3 + 1)).collect();
    let known = HashMap::new();
    c.bench_function("merge_500_defaults_25_pointers", |b| b.iter(|| merge(&defaults, &pointers, &known)));
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
