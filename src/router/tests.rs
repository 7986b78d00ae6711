use super::{GroupContext, Router};
use crate::handler::{Handler, RouteData};
use http::Method;
use serde_json::json;

fn noop() -> Handler {
    Handler::func(|_| ())
}

fn paths(router: &Router, method: &Method) -> Vec<String> {
    router
        .routes_for(method)
        .iter()
        .map(|r| r.path.clone())
        .collect()
}

#[test]
fn test_paths_are_normalized() {
    let mut router = Router::new();
    router.get("hello/", noop());
    router.get("", noop());
    router.get("//nested//", noop());

    assert_eq!(paths(&router, &Method::GET), vec!["/hello", "/", "/nested"]);
}

#[test]
fn test_registration_order_kept_per_method() {
    let mut router = Router::new();
    router.get("/a", noop());
    router.post("/b", noop());
    router.get("/c", noop());

    assert_eq!(paths(&router, &Method::GET), vec!["/a", "/c"]);
    assert_eq!(paths(&router, &Method::POST), vec!["/b"]);

    let all: Vec<String> = router
        .routes()
        .map(|r| format!("{} {}", r.method, r.path))
        .collect();
    assert_eq!(all, vec!["GET /a", "POST /b", "GET /c"]);
    assert_eq!(router.len(), 3);
}

#[test]
fn test_duplicate_routes_both_kept() {
    let mut router = Router::new();
    router.get("/dup", noop());
    router.get("/dup", noop());
    assert_eq!(router.routes_for(&Method::GET).len(), 2);
}

#[test]
fn test_group_prefix_applied() {
    let mut router = Router::new();
    router.group("/admin", &["auth"], |r| {
        r.get("/dashboard", noop());
        r.get("/", noop());
    });

    assert_eq!(paths(&router, &Method::GET), vec!["/admin/dashboard", "/admin"]);
    assert_eq!(router.route_middleware(&Method::GET, "/admin/dashboard"), ["auth"]);
    assert_eq!(router.route_middleware(&Method::GET, "/admin"), ["auth"]);
}

#[test]
fn test_nested_groups_compose() {
    let mut router = Router::new();
    router.group("/admin", &["auth"], |r| {
        r.group("users/", &["audit", "auth"], |r| {
            assert_eq!(
                r.current_group(),
                GroupContext {
                    prefix: "admin/users".to_string(),
                    middleware: vec!["auth".into(), "audit".into(), "auth".into()],
                }
            );
            r.get("/{id}", noop());
        });
        r.get("/settings", noop());
    });

    assert_eq!(
        paths(&router, &Method::GET),
        vec!["/admin/users/{id}", "/admin/settings"]
    );
    assert_eq!(
        router.route_middleware(&Method::GET, "/admin/users/{id}"),
        ["auth", "audit", "auth"]
    );
    assert_eq!(router.route_middleware(&Method::GET, "/admin/settings"), ["auth"]);
}

#[test]
fn test_group_context_restored() {
    let mut router = Router::new();
    router.group("/a", &["m1"], |r| {
        r.group("/b", &["m2"], |_| {});
        assert_eq!(r.current_group().prefix, "a");
        assert_eq!(r.current_group().middleware, vec!["m1".to_string()]);
    });
    assert_eq!(router.current_group(), GroupContext::default());

    router.get("/outside", noop());
    assert!(router.route_middleware(&Method::GET, "/outside").is_empty());
}

#[test]
fn test_group_context_restored_on_error() {
    let mut router = Router::new();
    let result: Result<(), String> = router.group("/api", &["auth"], |r| {
        r.get("/ok", noop());
        Err("bad route".to_string())
    });

    assert!(result.is_err());
    assert_eq!(router.current_group(), GroupContext::default());
}

#[test]
fn test_group_context_restored_on_panic() {
    let mut router = Router::new();
    let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        router.group("/api", &["auth"], |_| panic!("boom"));
    }));

    assert!(caught.is_err());
    assert_eq!(router.current_group(), GroupContext::default());
}

#[test]
fn test_builder_middleware_overwrites_group() {
    let mut router = Router::new();
    router.group("/admin", &["auth"], |r| {
        r.get("/public", noop()).middleware(&["log"]);
    });
    assert_eq!(router.route_middleware(&Method::GET, "/admin/public"), ["log"]);
}

#[test]
fn test_attach_middleware_overwrites() {
    let mut router = Router::new();
    router.get("/x", noop()).middleware(&["a", "b"]);
    router.attach_middleware(Method::GET, "/x/", &["c"]);
    assert_eq!(router.route_middleware(&Method::GET, "/x"), ["c"]);
    assert!(router.route_middleware(&Method::POST, "/x").is_empty());
}

#[test]
fn test_named_routes_last_wins() {
    let mut router = Router::new();
    router.get("/first", noop()).name("page");
    router.get("/second", noop()).name("page");
    router.group("/blog", &[] as &[&str], |r| {
        r.get("/{slug}", noop()).name("blog.show");
    });

    assert_eq!(router.named_route("page"), Some("/second"));
    assert_eq!(router.named_route("blog.show"), Some("/blog/{slug}"));
    assert_eq!(router.named_route("missing"), None);
}

#[test]
fn test_with_sets_route_data() {
    let mut router = Router::new();
    let builder = router
        .get("/users", "users/index")
        .with("title", "Users")
        .with("per_page", 20)
        .with("title", "All users");
    let route = builder.route().cloned().unwrap();

    assert_eq!(route.data.get("title"), Some(&json!("All users")));
    assert_eq!(route.data.get("per_page"), Some(&json!(20)));
}

#[test]
fn test_match_methods_binds_last() {
    let mut router = Router::new();
    let builder = router
        .match_methods(&[Method::GET, Method::POST], "/form", noop(), RouteData::new())
        .unwrap()
        .middleware(&["csrf"]);
    assert_eq!(builder.method(), &Method::POST);

    assert_eq!(paths(&router, &Method::GET), vec!["/form"]);
    assert_eq!(paths(&router, &Method::POST), vec!["/form"]);
    assert!(router.route_middleware(&Method::GET, "/form").is_empty());
    assert_eq!(router.route_middleware(&Method::POST, "/form"), ["csrf"]);

    assert!(router.match_methods(&[], "/none", noop(), RouteData::new()).is_none());
}

#[test]
fn test_match_methods_copies_data_to_every_route() {
    let mut data = RouteData::new();
    data.insert("title".to_string(), json!("Feedback"));

    let mut router = Router::new();
    router
        .match_methods(&[Method::GET, Method::POST, Method::PUT], "/feedback", noop(), data)
        .unwrap()
        .with("extra", 1);

    for method in [Method::GET, Method::POST, Method::PUT] {
        let route = &router.routes_for(&method)[0];
        assert_eq!(route.data.get("title"), Some(&json!("Feedback")), "{method}");
    }
    assert!(router.routes_for(&Method::GET)[0].data.get("extra").is_none());
    assert_eq!(router.routes_for(&Method::PUT)[0].data.get("extra"), Some(&json!(1)));
}

#[test]
fn test_string_handlers_parsed() {
    let mut router = Router::new();
    router.get("/users", "UserController@index");
    router.get("/about", "pages/about");

    let handlers: Vec<String> = router.routes().map(|r| r.handler.describe()).collect();
    assert_eq!(handlers, vec!["UserController@index", "view:pages/about"]);
}

#[test]
fn test_base_path_normalized() {
    let mut router = Router::new();
    router.set_base_path("app/");
    assert_eq!(router.base_path(), "/app");
    router.set_base_path("/");
    assert_eq!(router.base_path(), "");
}
