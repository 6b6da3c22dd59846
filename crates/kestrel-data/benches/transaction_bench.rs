use criterion::{criterion_group, criterion_main, Criterion};
use kestrel_core::math::{BoundingSphere, Vec3};
use kestrel_core::scene::{ItemPayload, Scene, Transaction, TAG_BITS_0};
use kestrel_data::ItemScene;
use std::hint::black_box;

fn bench_transactions(c: &mut Criterion) {
    let scene = ItemScene::new();
    let ids: Vec<_> = (0..10_000).map(|_| scene.allocate_id()).collect();

    let mut setup = Transaction::new();
    for (i, id) in ids.iter().enumerate() {
        setup.reset_item(
            *id,
            TAG_BITS_0,
            BoundingSphere::new(Vec3::new(i as f32, 0.0, 0.0), 1.0),
            ItemPayload::Mesh {
                name: "cube".into(),
                triangles: 12,
            },
        );
    }
    scene.enqueue_transaction(setup);
    scene.process_transaction_queue();

    let mut group = c.benchmark_group("Scene Transactions");

    group.bench_function("Update 10k bounds", |b| {
        b.iter(|| {
            let mut tx = Transaction::new();
            for id in &ids {
                tx.update_bound(*id, BoundingSphere::new(Vec3::ONE, 2.0));
            }
            scene.enqueue_transaction(tx);
            black_box(scene.process_transaction_queue());
        });
    });

    group.bench_function("Visit 10k items", |b| {
        b.iter(|| {
            let mut count = 0u32;
            scene.visit_items(&mut |item| count += item.id.index() & 1);
            black_box(count);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_transactions);
criterion_main!(benches);
