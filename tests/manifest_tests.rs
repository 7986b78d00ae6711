use mrouter::handler::{HandlerResponse, RouteData, RouteParams};
use mrouter::manifest::{load_manifest, Manifest};
use mrouter::registry::Controller;
use mrouter::router::Router;

use http::Method;
use serde_json::json;
use std::io::Write;

const MANIFEST: &str = r#"
base_path = "/app"

[[routes]]
method = "GET"
path = "/"
handler = "home"
name = "home"
data = { title = "Home" }

[[routes]]
methods = ["GET", "POST"]
path = "/contact"
handler = "ContactController@form"

[[groups]]
prefix = "/admin"
middleware = ["auth"]

[[groups.routes]]
method = "GET"
path = "/dashboard"
handler = "admin/dashboard"
name = "admin.dashboard"

[[groups.routes]]
method = "GET"
path = "/health"
handler = "admin/health"
middleware = []

[[groups.groups]]
prefix = "users"
middleware = ["audit"]

[[groups.groups.routes]]
method = "delete"
path = "/{id}"
handler = "UserController@destroy"
"#;

struct ContactController;

impl Controller for ContactController {
    fn call(&self, action: &str, _params: &RouteParams) -> Option<HandlerResponse> {
        (action == "form").then(|| "contact form".into())
    }
}

fn write_manifest(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_manifest_from_file() {
    let file = write_manifest(MANIFEST);
    let manifest = load_manifest(file.path()).unwrap();

    assert_eq!(manifest.base_path.as_deref(), Some("/app"));
    assert_eq!(manifest.routes.len(), 2);
    assert_eq!(manifest.groups.len(), 1);
    assert_eq!(manifest.groups[0].groups[0].prefix, "users");
}

#[test]
fn test_apply_registers_routes_in_order() {
    let manifest = Manifest::from_toml_str(MANIFEST).unwrap();
    let mut router = Router::new();
    let count = manifest.apply(&mut router).unwrap();

    assert_eq!(count, 6);
    let routes: Vec<String> = router
        .routes()
        .map(|r| format!("{} {}", r.method, r.path))
        .collect();
    assert_eq!(
        routes,
        vec![
            "GET /",
            "GET /contact",
            "POST /contact",
            "GET /admin/dashboard",
            "GET /admin/health",
            "DELETE /admin/users/{id}",
        ]
    );
    assert_eq!(router.base_path(), "/app");
}

#[test]
fn test_apply_group_and_route_middleware() {
    let manifest = Manifest::from_toml_str(MANIFEST).unwrap();
    let router = manifest.to_router().unwrap();

    assert_eq!(router.route_middleware(&Method::GET, "/admin/dashboard"), ["auth"]);
    assert!(router.route_middleware(&Method::GET, "/admin/health").is_empty());
    assert_eq!(
        router.route_middleware(&Method::DELETE, "/admin/users/{id}"),
        ["auth", "audit"]
    );
}

#[test]
fn test_apply_names_and_data() {
    let router = Manifest::from_toml_str(MANIFEST).unwrap().to_router().unwrap();

    assert_eq!(router.named_route("home"), Some("/"));
    assert_eq!(router.named_route("admin.dashboard"), Some("/admin/dashboard"));

    let home = router.routes_for(&Method::GET).first().unwrap();
    assert_eq!(home.data.get("title"), Some(&json!("Home")));
}

#[test]
fn test_manifest_routes_dispatch() {
    let mut router = Router::new();
    router.register_controller("ContactController", || ContactController);
    router.register_middleware("auth", || false);
    router.set_view_renderer(|template: &str, data: &RouteData| -> Result<String, String> {
        let title = data.get("title").and_then(|v| v.as_str()).unwrap_or("");
        Ok(format!("{template}:{title}"))
    });
    Manifest::from_toml_str(MANIFEST)
        .unwrap()
        .apply(&mut router)
        .unwrap();
    let d = router.into_dispatcher();

    assert_eq!(d.dispatch(&Method::GET, "/app/").unwrap().body(), "home:Home");
    assert_eq!(
        d.dispatch(&Method::POST, "/app/contact").unwrap().body(),
        "contact form"
    );
    assert!(d
        .dispatch(&Method::GET, "/app/admin/dashboard")
        .unwrap()
        .is_aborted());
    assert_eq!(
        d.dispatch(&Method::GET, "/app/admin/health").unwrap().body(),
        "admin/health:"
    );
    assert_eq!(d.url_for("admin.dashboard", &[]).unwrap(), "/app/admin/dashboard");
}

#[test]
fn test_invalid_manifests_rejected() {
    let cases = [
        (
            r#"
            [[routes]]
            method = "GET"
            path = ""
            handler = "x"
            "#,
            "empty path",
        ),
        (
            r#"
            [[routes]]
            method = "GET"
            path = "/user/{id"
            handler = "x"
            "#,
            "Unclosed",
        ),
        (
            r#"
            [[routes]]
            path = "/x"
            handler = "x"
            "#,
            "has no method",
        ),
        (
            r#"
            [[groups]]
            prefix = "/admin"

            [[groups.routes]]
            method = "TELEPORT"
            path = "/x"
            handler = "x"
            "#,
            "unknown method",
        ),
    ];

    for (content, expected) in cases {
        let err = Manifest::from_toml_str(content).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains(expected), "{message}");
    }
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = load_manifest(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.toml"));
}

#[test]
fn test_invalid_manifest_registers_nothing() {
    let manifest = Manifest {
        routes: vec![mrouter::manifest::RouteEntry {
            method: Some("GET".to_string()),
            path: "/bad/{".to_string(),
            handler: "x".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    };
    let mut router = Router::new();
    assert!(manifest.apply(&mut router).is_err());
    assert!(router.is_empty());
}

#[test]
fn test_multi_method_entry_protects_every_method() {
    let manifest = Manifest::from_toml_str(
        r#"
        [[routes]]
        methods = ["GET", "POST"]
        path = "/secret"
        handler = "secret_view"
        middleware = ["auth"]
        data = { title = "Secret" }
        "#,
    )
    .unwrap();

    let mut router = Router::new();
    router.register_middleware("auth", || false);
    router.set_view_renderer(|template: &str, data: &RouteData| -> Result<String, String> {
        let title = data.get("title").and_then(|v| v.as_str()).unwrap_or("");
        Ok(format!("{template}:{title}"))
    });
    assert_eq!(manifest.apply(&mut router).unwrap(), 2);

    for method in [Method::GET, Method::POST] {
        assert_eq!(router.route_middleware(&method, "/secret"), ["auth"], "{method}");
        let route = &router.routes_for(&method)[0];
        assert_eq!(route.data.get("title"), Some(&json!("Secret")), "{method}");
    }

    let d = router.into_dispatcher();
    assert!(d.dispatch(&Method::GET, "/secret").unwrap().is_aborted());
    assert!(d.dispatch(&Method::POST, "/secret").unwrap().is_aborted());
}

#[test]
fn test_multi_method_entry_carries_data_without_middleware() {
    let manifest = Manifest::from_toml_str(
        r#"
        [[routes]]
        methods = ["GET", "PUT"]
        path = "/page"
        handler = "page"
        name = "page"
        data = { title = "Page" }
        "#,
    )
    .unwrap();

    let mut router = Router::new();
    router.set_view_renderer(|template: &str, data: &RouteData| -> Result<String, String> {
        let title = data.get("title").and_then(|v| v.as_str()).unwrap_or("");
        Ok(format!("{template}:{title}"))
    });
    manifest.apply(&mut router).unwrap();
    assert_eq!(router.named_route("page"), Some("/page"));

    let d = router.into_dispatcher();
    assert_eq!(d.dispatch(&Method::GET, "/page").unwrap().body(), "page:Page");
    assert_eq!(d.dispatch(&Method::PUT, "/page").unwrap().body(), "page:Page");
}
