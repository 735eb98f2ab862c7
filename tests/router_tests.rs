use std::sync::Arc;

use http::Method;
use restroute::router::{normalize, Pattern, Segment};
use restroute::{Context, Dispatcher, Request, ResourceHandler, Result, Route, RouteGroup, Router};

mod common;
use common::{get, EchoParams, Named, Trace};

fn path_of(dispatcher: &Dispatcher, path: &str) -> Option<String> {
    let mut ctx = Context::new(get(path));
    dispatcher
        .root()
        .matches(path, &mut ctx)
        .then(|| ctx.route().map(|r| r.path().to_string()))
        .flatten()
}

#[test]
fn test_separator_variants_match_the_same_route() {
    let trace = Trace::new();
    let dispatcher = Dispatcher::builder()
        .add("/zoo/animals", Named::new("animals", &trace))
        .build();

    for path in ["/zoo/animals", "/zoo/animals/", "zoo/animals", "//zoo///animals//"] {
        let res = dispatcher.serve(get(path));
        assert_eq!(res.status(), 200, "{path}");
        assert_eq!(res.body_str(), "animals");
    }
}

#[test]
fn test_param_needs_a_segment() {
    let dispatcher = Dispatcher::builder()
        .add("/a/:id", Arc::new(EchoParams))
        .build();

    assert_eq!(dispatcher.serve(get("/a/x")).body_str(), "id=x;");
    assert_eq!(dispatcher.serve(get("/a/")).status(), 404);
    assert_eq!(dispatcher.serve(get("/a")).status(), 404);
    assert_eq!(dispatcher.serve(get("/a/x/y")).status(), 404);
}

#[test]
fn test_optional_param_by_double_registration() {
    let handler: Arc<dyn ResourceHandler> = Arc::new(EchoParams);
    let dispatcher = Dispatcher::builder()
        .add("/pets", Arc::clone(&handler))
        .add("/pets/:id", handler)
        .build();

    let res = dispatcher.serve(get("/pets"));
    assert_eq!(res.status(), 200);
    assert_eq!(res.body_str(), "");
    assert_eq!(dispatcher.serve(get("/pets/3")).body_str(), "id=3;");
}

#[test]
fn test_wildcard_inside_group() {
    let trace = Trace::new();
    let mut assets = RouteGroup::new("/static");
    assets.add("/*", Named::new("asset", &trace));
    let dispatcher = Dispatcher::builder().add_group(assets).build();

    for path in ["/static", "/static/app.js", "/static/img/logo/big.png"] {
        assert_eq!(dispatcher.serve(get(path)).status(), 200, "{path}");
    }
    assert_eq!(dispatcher.serve(get("/other/app.js")).status(), 404);
}

#[test]
fn test_mid_pattern_star_is_literal() {
    let trace = Trace::new();
    let dispatcher = Dispatcher::builder()
        .add("/a/*/b", Named::new("star", &trace))
        .build();

    assert_eq!(dispatcher.serve(get("/a/*/b")).status(), 200);
    assert_eq!(dispatcher.serve(get("/a/x/b")).status(), 404);

    let pattern = Pattern::parse("/a/*/b");
    assert_eq!(pattern.segments()[1], Segment::Literal(Arc::from("*")));
}

#[test]
fn test_deep_nesting_and_reported_paths() {
    let trace = Trace::new();
    let mut items = RouteGroup::new("/items");
    items.add("/:item", Named::new("item", &trace));
    let mut shops = RouteGroup::new("/shops/:shop");
    shops.add_group(items);
    let mut v1 = RouteGroup::new("/v1");
    v1.add_group(shops);
    let mut api = RouteGroup::new("/api");
    api.add_group(v1);
    let dispatcher = Dispatcher::builder().add_group(api).build();

    let mut ctx = Context::new(get("/api/v1/shops/s1/items/i9"));
    assert!(dispatcher.root().matches("/api/v1/shops/s1/items/i9", &mut ctx));
    // root, api, v1, shops, items, route
    assert_eq!(ctx.matched().len(), 6);
    assert_eq!(ctx.param("shop"), "s1");
    assert_eq!(ctx.param("item"), "i9");
    assert_eq!(
        ctx.matched().iter().map(Router::path).collect::<Vec<_>>(),
        ["", "/api", "/v1", "/shops/:shop", "/items", "/items/:item"]
    );
}

#[test]
fn test_group_order_matters() {
    let trace = Trace::new();
    let mut broad = RouteGroup::new("/api");
    broad.add("/*", Named::new("broad", &trace));
    let mut narrow = RouteGroup::new("/api/users");
    narrow.add("/:id", Named::new("narrow", &trace));
    let dispatcher = Dispatcher::builder()
        .add_group(broad)
        .add_group(narrow)
        .build();

    assert_eq!(dispatcher.serve(get("/api/users/1")).body_str(), "broad");
    assert_eq!(path_of(&dispatcher, "/api/users/1").as_deref(), Some("/api/*"));
}

#[test]
fn test_group_without_routes_never_matches() {
    let dispatcher = Dispatcher::builder()
        .add_group(RouteGroup::new("/empty"))
        .build();
    assert_eq!(dispatcher.serve(get("/empty")).status(), 404);
    assert!(dispatcher.cache().is_empty());
}

#[test]
fn test_route_matched_directly() {
    struct Upper;
    impl ResourceHandler for Upper {
        fn get(&self, ctx: &mut Context) -> Result {
            let name = ctx.param("name").to_uppercase();
            ctx.render(&name);
            Ok(())
        }
    }

    let route = Router::from(Route::new("/hi/:name", Arc::new(Upper)));
    let mut ctx = Context::new(Request::new(Method::GET, "/hi/bob"));
    assert!(route.matches("/hi/bob", &mut ctx));
    assert!(route.dispatch(&mut ctx).is_ok());
    assert_eq!(ctx.response.body_str(), "BOB");
}

#[test]
fn test_normalize_is_public() {
    assert_eq!(normalize("//x/y//").as_slice(), ["x", "y"]);
}
