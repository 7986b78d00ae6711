//! Unit tests for CLI commands

use crate::cli::{execute, Cli, Commands};
use crate::runtime_config::RuntimeConfig;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

const MANIFEST: &str = r#"
[[routes]]
method = "GET"
path = "/users/{id}"
handler = "UserController@show"
name = "users.show"

[[groups]]
prefix = "/admin"
middleware = ["auth"]

[[groups.routes]]
method = "GET"
path = "/dashboard"
handler = "admin/dashboard"
"#;

fn manifest_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(MANIFEST.as_bytes()).unwrap();
    file
}

fn run(command: &Commands) -> String {
    let mut out = Vec::new();
    execute(command, &RuntimeConfig::default(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_routes_command_parses() {
    let cli = Cli::try_parse_from(["mrouter", "routes", "--manifest", "routes.toml"]).unwrap();

    match cli.command {
        Commands::Routes { manifest } => {
            assert_eq!(manifest, Some(PathBuf::from("routes.toml")));
        }
        _ => panic!("Expected Routes command"),
    }
}

#[test]
fn test_match_command_parses() {
    let cli = Cli::try_parse_from(["mrouter", "match", "-m", "routes.toml", "GET", "/users/42"])
        .unwrap();

    match cli.command {
        Commands::Match {
            manifest,
            method,
            path,
        } => {
            assert_eq!(manifest, Some(PathBuf::from("routes.toml")));
            assert_eq!(method, "GET");
            assert_eq!(path, "/users/42");
        }
        _ => panic!("Expected Match command"),
    }
}

#[test]
fn test_global_log_flags() {
    let cli = Cli::try_parse_from([
        "mrouter",
        "routes",
        "--log-level",
        "debug",
        "--log-format",
        "pretty",
    ])
    .unwrap();

    assert_eq!(cli.log_level.as_deref(), Some("debug"));
    let config = cli.log_config();
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.format, crate::logging::LogFormat::Pretty);
}

#[test]
fn test_match_requires_method_and_path() {
    assert!(Cli::try_parse_from(["mrouter", "match", "--manifest", "routes.toml"]).is_err());
}

#[test]
fn test_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["mrouter", "serve"]).is_err());
}

#[test]
fn test_routes_output() {
    let file = manifest_file();
    let output = run(&Commands::Routes {
        manifest: Some(file.path().to_path_buf()),
    });

    assert!(output.starts_with("2 route(s), base path /"));
    assert!(output.contains("GET /users/{id} -> UserController@show (users.show)"));
    assert!(output.contains("GET /admin/dashboard -> view:admin/dashboard [auth]"));
}

#[test]
fn test_match_output() {
    let file = manifest_file();
    let output = run(&Commands::Match {
        manifest: Some(file.path().to_path_buf()),
        method: "get".to_string(),
        path: "/users/42?tab=posts".to_string(),
    });

    assert!(output.contains("GET /users/{id} -> UserController@show"));
    assert!(output.contains("param id = 42"));
    assert!(output.contains("name: users.show"));
}

#[test]
fn test_match_no_route() {
    let file = manifest_file();
    let output = run(&Commands::Match {
        manifest: Some(file.path().to_path_buf()),
        method: "POST".to_string(),
        path: "/users/42/".to_string(),
    });

    assert_eq!(output.trim(), "no route for POST /users/42");
}

#[test]
fn test_missing_manifest_is_an_error() {
    let mut out = Vec::new();
    let result = execute(
        &Commands::Routes { manifest: None },
        &RuntimeConfig::default(),
        &mut out,
    );
    assert!(result.is_err());
}
