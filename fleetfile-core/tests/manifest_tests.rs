//! Manifest loading: error messages and YAML/JSON acceptance.

use assert_fs::prelude::*;
use fleetfile_core::{manifest, AppId, BackendState, ManifestError};
use predicates::prelude::predicate;

const MANIFEST: &str = r#"
- id: web
  protocol: tcp
  service_port: 80
  backends:
    - { host: 10.0.0.1, port: 9000, state: running }
    - { host: 10.0.0.2, port: 9000, state: running }
- id: dns
  protocol: udp
  service_port: 53
  health_check:
    protocol: TCP
    port: 53
  labels:
    proto: DNS
"#;

#[test]
fn load_yaml_manifest() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("services.yaml");
    file.write_str(MANIFEST).expect("write");

    let apps = manifest::load_at(file.path()).expect("load");
    assert_eq!(apps.len(), 2);
    assert_eq!(apps[0].id, AppId::from("web"));
    assert_eq!(apps[0].backends.len(), 2);
    assert_eq!(apps[0].backends[1].host, "10.0.0.2");
    assert_eq!(apps[0].backends[1].state, BackendState::Running);
    assert_eq!(apps[1].health_check_protocol(), Some("TCP"));
    assert_eq!(apps[1].labels.get("proto").map(String::as_str), Some("DNS"));
}

#[test]
fn load_json_manifest() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let apps = serde_json::json!([
        { "id": "api", "protocol": "tcp", "service_port": 8080,
          "backends": [{ "host": "api-1", "port": 31000 }] }
    ]);
    let file = dir.child("services.json");
    file.write_str(&apps.to_string()).expect("write");

    let loaded = manifest::load_at(file.path()).expect("load");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].backends[0].state, BackendState::Staging);
}

#[test]
fn empty_manifest_is_empty_set() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("services.yaml");
    file.write_str("").expect("write");
    assert!(manifest::load_at(file.path()).expect("load").is_empty());
}

#[test]
fn missing_manifest_returns_not_found() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = manifest::load_at(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ManifestError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn malformed_manifest_returns_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("broken.yaml");
    file.write_str("- id: web\n  service_port: [unclosed").expect("write");

    let err = manifest::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ManifestError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("broken.yaml"));
}

#[test]
fn duplicate_ids_are_rejected_on_load() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("dup.yaml");
    file.write_str("- { id: web, service_port: 80 }\n- { id: web, service_port: 81 }\n")
        .expect("write");

    let err = manifest::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ManifestError::DuplicateId(_)), "got: {err}");
    file.assert(predicate::str::contains("service_port: 81"));
}
