use mrouter::handler::{Handler, HandlerResponse};
use mrouter::middleware::{ChainResult, Flow, Middleware, MiddlewareRegistry};
use mrouter::router::Router;
use mrouter::Outcome;

use http::Method;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Records its name into a shared log and returns a fixed flow
struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
    flow: fn() -> Flow,
}

impl Middleware for Recorder {
    fn handle(&self) -> Flow {
        self.log.lock().unwrap().push(self.name);
        (self.flow)()
    }
}

fn recorder(
    router: &mut Router,
    name: &'static str,
    log: &Arc<Mutex<Vec<&'static str>>>,
    flow: fn() -> Flow,
) {
    router.register_middleware(
        name,
        Recorder {
            name,
            log: Arc::clone(log),
            flow,
        },
    );
}

#[test]
fn test_chain_runs_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut router = Router::new();
    recorder(&mut router, "a", &log, || Flow::Continue);
    recorder(&mut router, "b", &log, || Flow::Continue);
    router
        .get("/x", Handler::func(|_| "handled"))
        .middleware(&["a", "b"]);

    let outcome = router.into_dispatcher().dispatch(&Method::GET, "/x").unwrap();
    assert_eq!(outcome.body(), "handled");
    assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
}

#[test]
fn test_halt_stops_chain_and_handler() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let handler_calls = Arc::clone(&calls);

    let mut router = Router::new();
    recorder(&mut router, "first", &log, || Flow::Continue);
    recorder(&mut router, "gate", &log, || Flow::Halt);
    recorder(&mut router, "never", &log, || Flow::Continue);
    router
        .get(
            "/guarded",
            Handler::func(move |_| {
                handler_calls.fetch_add(1, Ordering::SeqCst);
                "secret"
            }),
        )
        .middleware(&["first", "gate", "never"]);

    let outcome = router
        .into_dispatcher()
        .dispatch(&Method::GET, "/guarded")
        .unwrap();

    assert_eq!(outcome, Outcome::Aborted(None));
    assert_eq!(*log.lock().unwrap(), vec!["first", "gate"]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unknown_middleware_skipped() {
    let mut router = Router::new();
    router
        .get("/x", Handler::func(|_| "ok"))
        .middleware(&["not-registered"]);

    let outcome = router.into_dispatcher().dispatch(&Method::GET, "/x").unwrap();
    assert_eq!(outcome.body(), "ok");
}

#[test]
fn test_unit_and_true_continue() {
    let mut router = Router::new();
    router.register_middleware("unit", || ());
    router.register_middleware("yes", || true);
    router
        .get("/x", Handler::func(|_| "ok"))
        .middleware(&["unit", "yes"]);

    let outcome = router.into_dispatcher().dispatch(&Method::GET, "/x").unwrap();
    assert_eq!(outcome.body(), "ok");
}

#[test]
fn test_respond_produces_output() {
    let mut router = Router::new();
    router.register_middleware("login", || HandlerResponse::redirect("/login"));
    router.group("/account", &["login"], |r| {
        r.get("/settings", Handler::func(|_| "settings"));
    });

    let outcome = router
        .into_dispatcher()
        .dispatch(&Method::GET, "/account/settings")
        .unwrap();

    assert!(outcome.is_aborted());
    let response = outcome.into_response().unwrap();
    assert_eq!(response.status, 302);
    assert_eq!(response.get_header("Location"), Some("/login"));
}

#[test]
fn test_middleware_replaced_by_name() {
    let mut router = Router::new();
    router.register_middleware("gate", || false);
    router.register_middleware("gate", || true);
    router
        .get("/x", Handler::func(|_| "ok"))
        .middleware(&["gate"]);

    let outcome = router.into_dispatcher().dispatch(&Method::GET, "/x").unwrap();
    assert_eq!(outcome.body(), "ok");
}

#[test]
fn test_duplicate_group_middleware_runs_twice() {
    let counter = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&counter);

    let mut router = Router::new();
    router.register_middleware("count", move || {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    router.group("/a", &["count"], |r| {
        r.group("/b", &["count"], |r| {
            r.get("/c", Handler::func(|_| "ok"));
        });
    });

    let outcome = router
        .into_dispatcher()
        .dispatch(&Method::GET, "/a/b/c")
        .unwrap();
    assert_eq!(outcome.body(), "ok");
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_registry_run_directly() {
    let mut registry = MiddlewareRegistry::new();
    registry.register("ok", || true);
    registry.register("deny", || false);

    assert_eq!(registry.run(&["ok"]), ChainResult::Proceed);
    assert_eq!(registry.run::<&str>(&[]), ChainResult::Proceed);
    match registry.run(&["ok", "deny", "ok"]) {
        ChainResult::Halted { by, response } => {
            assert_eq!(by, "deny");
            assert!(response.is_none());
        }
        ChainResult::Proceed => panic!("expected the chain to halt"),
    }
}
