use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use todoit_core::proto::{CreateToDoRequest, ListToDoRequest, ReadToDoRequest};
use todoit_store::MemoryStore;
use todoit_tonic_server::server::service::handler::ToDoService;
use tokio::runtime::Builder;

fn create_request(i: usize) -> CreateToDoRequest {
    CreateToDoRequest {
        title: format!("task {i}"),
        description: "benchmark".into(),
    }
}

fn service_bench(c: &mut Criterion) {
    let rt = Builder::new_multi_thread().enable_all().build().unwrap();

    let mut group = c.benchmark_group("service/memory");
    group.throughput(Throughput::Elements(1));

    group.bench_function("create", |b| {
        let service = ToDoService::new(MemoryStore::new());
        let mut i = 0;
        b.to_async(&rt).iter(|| {
            i += 1;
            let service = service.clone();
            let req = create_request(i);
            async move { black_box(service.create(req).await.unwrap()) }
        });
    });

    group.bench_function("read", |b| {
        let service = ToDoService::new(MemoryStore::new());
        let id = rt
            .block_on(service.create(create_request(0)))
            .unwrap()
            .id;
        b.to_async(&rt).iter(|| {
            let service = service.clone();
            async move { black_box(service.read(ReadToDoRequest { id }).await.unwrap()) }
        });
    });

    for size in [10, 1_000] {
        group.bench_function(format!("list/{size}"), |b| {
            let service = ToDoService::new(MemoryStore::new());
            rt.block_on(async {
                for i in 0..size {
                    service.create(create_request(i)).await.unwrap();
                }
            });
            b.to_async(&rt).iter(|| {
                let service = service.clone();
                async move { black_box(service.list(ListToDoRequest {}).await.unwrap()) }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, service_bench);
criterion_main!(benches);
