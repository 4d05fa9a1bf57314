use keyseal_crypto::{
    derive_shared_key, generate_key_pair, generate_symmetric_key, open, seal, Salt,
};

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_seal(bencher: divan::Bencher, size: usize) {
    let key = generate_symmetric_key().unwrap();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| seal(divan::black_box(&data), divan::black_box(&key)).unwrap());
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_open(bencher: divan::Bencher, size: usize) {
    let key = generate_symmetric_key().unwrap();
    let envelope = seal(&make_data(size), &key).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| open(divan::black_box(&envelope), divan::black_box(&key)).unwrap());
}

#[divan::bench]
fn bench_derive_shared_key(bencher: divan::Bencher) {
    let alice = generate_key_pair().unwrap();
    let bob = generate_key_pair().unwrap();
    let salt = Salt::from_bytes([0xABu8; 16].to_vec());
    bencher.bench(|| {
        derive_shared_key(
            divan::black_box(alice.private_key()),
            divan::black_box(bob.public_key()),
            divan::black_box(&salt),
        )
        .unwrap()
    });
}

fn main() {
    divan::main();
}
