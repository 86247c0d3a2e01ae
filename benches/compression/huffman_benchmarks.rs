use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use huffpack::{huffman_decode, huffman_encode};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn text_input(size: usize) -> Vec<u8> {
    b"It was the best of times, it was the worst of times, it was the age of wisdom. "
        .iter()
        .copied()
        .cycle()
        .take(size)
        .collect()
}

fn random_input(size: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    (0..size).map(|_| rng.gen()).collect()
}

fn bench_huffman(c: &mut Criterion) {
    let mut group = c.benchmark_group("huffman");

    for size in [1 << 10, 1 << 14, 1 << 18] {
        for (name, input) in [("text", text_input(size)), ("random", random_input(size))] {
            group.throughput(Throughput::Bytes(size as u64));

            group.bench_with_input(
                BenchmarkId::new(format!("encode/{}", name), size),
                &input,
                |b, input| b.iter(|| huffman_encode(black_box(input)).unwrap()),
            );

            let compressed = huffman_encode(&input).unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("decode/{}", name), size),
                &compressed,
                |b, compressed| b.iter(|| huffman_decode(black_box(compressed)).unwrap()),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_huffman);
criterion_main!(benches);
