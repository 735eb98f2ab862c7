use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use restroute::{Context, Dispatcher, Request, ResourceHandler, Result, RouteGroup};

struct Zoo;

impl ResourceHandler for Zoo {
    fn get(&self, ctx: &mut Context) -> Result {
        ctx.status(200);
        Ok(())
    }

    fn post(&self, ctx: &mut Context) -> Result {
        ctx.status(201);
        Ok(())
    }
}

fn zoo_dispatcher(use_cache: bool) -> Dispatcher {
    let zoo: Arc<dyn ResourceHandler> = Arc::new(Zoo);

    let mut animals = RouteGroup::new("/animals");
    animals.add("/", Arc::clone(&zoo));
    animals.add("/:id", Arc::clone(&zoo));
    animals.add("/:id/toys/:toy_id", Arc::clone(&zoo));

    let mut habitats = RouteGroup::new("/:category/animals/:id/habitats");
    habitats.add("/:habitat_id/sections/:section_id", Arc::clone(&zoo));

    let mut zoo_group = RouteGroup::new("/zoo");
    zoo_group.add("/health", Arc::clone(&zoo));
    zoo_group.add_group(animals);
    zoo_group.add_group(habitats);

    let mut inventory = RouteGroup::new("/inventory/:warehouse_id");
    inventory.add("/feeds/:feed_id/items/:item_id/batches/:batch_id", Arc::clone(&zoo));

    Dispatcher::builder()
        .use_cache(use_cache)
        .add("/", Arc::clone(&zoo))
        .add_group(zoo_group)
        .add_group(inventory)
        .add("/complex/:a/:b/:c/:d/:e/:f/:g/:h/:i", zoo)
        .build()
}

const PATHS: [(Method, &str); 5] = [
    (Method::GET, "/zoo/animals/123"),
    (Method::GET, "/zoo/animals/123/toys/456"),
    (Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
    (Method::POST, "/inventory/1/feeds/2/items/3/batches/4"),
    (Method::GET, "/complex/1/2/3/4/5/6/7/8/9"),
];

fn bench_dispatch(c: &mut Criterion, name: &str, use_cache: bool) {
    let dispatcher = zoo_dispatcher(use_cache);
    c.bench_function(name, |b| {
        b.iter(|| {
            for (method, path) in PATHS.iter() {
                let res = dispatcher.serve(Request::new(method.clone(), path));
                black_box(&res);
            }
        })
    });
}

fn bench_route_throughput(c: &mut Criterion) {
    bench_dispatch(c, "dispatch_cached", true);
    bench_dispatch(c, "dispatch_uncached", false);
}

criterion_group!(benches, bench_route_throughput);
criterion_main!(benches);
