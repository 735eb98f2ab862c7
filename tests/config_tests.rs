use std::io::Write;
use std::sync::Arc;

use restroute::{Dispatcher, DispatcherConfig};

mod common;
use common::{get, Failing};

fn boom() -> restroute::Error {
    restroute::Error::msg("boom details")
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "use_cache = false").unwrap();
    writeln!(file, "debug = true").unwrap();

    let cfg = DispatcherConfig::load(file.path()).unwrap();
    assert_eq!(
        cfg,
        DispatcherConfig {
            use_cache: false,
            debug: true,
            silent: false,
        }
    );
}

#[test]
fn test_load_missing_file_has_context() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = DispatcherConfig::load(&missing).unwrap_err();
    assert!(format!("{err:#}").contains("nope.toml"));
}

#[test]
fn test_load_invalid_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "debug = \"very\"").unwrap();
    assert!(DispatcherConfig::load(file.path()).is_err());
}

#[test]
fn test_config_drives_dispatcher() {
    let cfg = DispatcherConfig::from_toml_str("use_cache = false\ndebug = true").unwrap();
    let dispatcher = Dispatcher::builder()
        .config(cfg)
        .add("/boom", Arc::new(Failing(boom)))
        .build();

    let res = dispatcher.serve(get("/boom"));
    assert_eq!(res.status(), 500);
    assert!(res.body_str().contains("boom details"));
    assert!(dispatcher.cache().is_empty());
}

#[test]
fn test_setters_override_config() {
    let dispatcher = Dispatcher::builder()
        .config(DispatcherConfig {
            use_cache: false,
            debug: true,
            silent: false,
        })
        .use_cache(true)
        .silent(true)
        .build();

    assert_eq!(
        *dispatcher.config(),
        DispatcherConfig {
            use_cache: true,
            debug: true,
            silent: true,
        }
    );
}

#[test]
fn test_from_env() {
    // Only test in this binary that touches the environment.
    std::env::set_var("RESTROUTE_USE_CACHE", "off");
    std::env::set_var("RESTROUTE_DEBUG", "YES");
    std::env::set_var("RESTROUTE_SILENT", "not-a-bool");

    let cfg = DispatcherConfig::from_env();
    assert!(!cfg.use_cache);
    assert!(cfg.debug);
    assert!(!cfg.silent);

    std::env::remove_var("RESTROUTE_USE_CACHE");
    std::env::remove_var("RESTROUTE_DEBUG");
    std::env::remove_var("RESTROUTE_SILENT");
}
