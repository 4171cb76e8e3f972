//! Artifact naming and content.
//!
//! ```text
//! Service-Name: web\r\n
//! Service-Port: 80\r\n
//! Service-Transport-Proto: tcp\r\n
//! Service-Application-Proto: http\r\n
//! Health-Check-Proto: http\r\n          (only with a health check protocol)
//! \r\n
//! 10.0.0.1:9000\n                       (one line per backend, in order)
//! ```

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use fleetfile_core::{AppCluster, AppId};

/// Artifact file extension, without the dot.
pub const ARTIFACT_EXTENSION: &str = "instances";

/// Suffix appended to the artifact path while its replacement is staged.
pub const TMP_SUFFIX: &str = ".tmp";

/// Application protocol used when nothing else names one.
pub const FALLBACK_PROTOCOL: &str = "tcp";

/// `<base>/<id>.instances` — pure, no I/O.
pub fn artifact_path(base: &Path, id: &AppId) -> PathBuf {
    base.join(format!("{id}.{ARTIFACT_EXTENSION}"))
}

/// `<artifact>.tmp`, the sibling a new artifact is staged in.
pub fn tmp_path(artifact: &Path) -> PathBuf {
    let mut name = artifact.as_os_str().to_owned();
    name.push(TMP_SUFFIX);
    PathBuf::from(name)
}

/// Resolve the application protocol advertised for `app`.
///
/// First match wins: the `proto` label, the health check protocol, the
/// transport protocol, then [`FALLBACK_PROTOCOL`]. Always lower-case.
pub fn application_protocol(app: &AppCluster) -> String {
    if let Some(proto) = app.labels.get("proto").filter(|p| !p.is_empty()) {
        return proto.to_lowercase();
    }
    if let Some(proto) = app.health_check_protocol() {
        return proto.to_lowercase();
    }
    if !app.protocol.is_empty() {
        return app.protocol.to_lowercase();
    }
    FALLBACK_PROTOCOL.to_string()
}

/// Render the full artifact for `app`.
pub fn render(app: &AppCluster) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write!(out, "Service-Name: {}\r\n", app.id);
    let _ = write!(out, "Service-Port: {}\r\n", app.service_port);
    let _ = write!(out, "Service-Transport-Proto: {}\r\n", app.protocol);
    let _ = write!(
        out,
        "Service-Application-Proto: {}\r\n",
        application_protocol(app)
    );
    if let Some(proto) = app.health_check_protocol() {
        let _ = write!(out, "Health-Check-Proto: {}\r\n", proto.to_lowercase());
    }
    out.push_str("\r\n");

    for backend in &app.backends {
        let _ = writeln!(out, "{}:{}", backend.host, backend.port);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetfile_core::{AppBackend, BackendState, HealthCheck};
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn cluster(label: Option<&str>, health: Option<&str>, transport: &str) -> AppCluster {
        AppCluster {
            id: AppId::from("svc"),
            protocol: transport.to_string(),
            service_port: 80,
            labels: label
                .map(|p| BTreeMap::from([("proto".to_string(), p.to_string())]))
                .unwrap_or_default(),
            health_check: health.map(|p| HealthCheck {
                protocol: p.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[rstest]
    #[case::label_wins(Some("HTTP"), Some("tcp"), "udp", "http")]
    #[case::health_check_next(None, Some("HTTPS"), "tcp", "https")]
    #[case::empty_label_skipped(Some(""), Some("Http"), "tcp", "http")]
    #[case::empty_health_check_skipped(None, Some(""), "UDP", "udp")]
    #[case::transport_last(None, None, "TCP", "tcp")]
    #[case::fallback(None, None, "", "tcp")]
    fn protocol_resolution(
        #[case] label: Option<&str>,
        #[case] health: Option<&str>,
        #[case] transport: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(
            application_protocol(&cluster(label, health, transport)),
            expected
        );
    }

    #[test]
    fn artifact_and_tmp_paths() {
        let base = Path::new("/var/run/fleetfile");
        let target = artifact_path(base, &AppId::from("web"));
        assert_eq!(target, PathBuf::from("/var/run/fleetfile/web.instances"));
        assert_eq!(
            tmp_path(&target),
            PathBuf::from("/var/run/fleetfile/web.instances.tmp")
        );
    }

    #[test]
    fn renders_web_without_health_check() {
        let app = AppCluster {
            id: AppId::from("web"),
            protocol: "tcp".into(),
            service_port: 80,
            backends: vec![
                AppBackend::new("10.0.0.1", 9000, BackendState::Running),
                AppBackend::new("10.0.0.2", 9000, BackendState::Running),
            ],
            ..Default::default()
        };
        assert_eq!(
            render(&app),
            "Service-Name: web\r\n\
             Service-Port: 80\r\n\
             Service-Transport-Proto: tcp\r\n\
             Service-Application-Proto: tcp\r\n\
             \r\n\
             10.0.0.1:9000\n\
             10.0.0.2:9000\n"
        );
    }

    #[test]
    fn renders_health_check_line_lowercased() {
        let mut app = cluster(None, Some("HTTP"), "tcp");
        app.backends = vec![AppBackend::new("a", 1, BackendState::Staging)];
        let out = render(&app);
        assert!(out.contains("Service-Application-Proto: http\r\n"));
        assert!(out.contains("Health-Check-Proto: http\r\n\r\na:1\n"));
    }

    #[test]
    fn transport_header_keeps_original_case() {
        let app = cluster(None, None, "TCP");
        assert!(render(&app).contains("Service-Transport-Proto: TCP\r\n"));
    }

    #[test]
    fn backend_order_is_preserved() {
        let mut app = cluster(None, None, "tcp");
        app.backends = vec![
            AppBackend::new("b", 2, BackendState::Running),
            AppBackend::new("a", 1, BackendState::Draining),
        ];
        assert!(render(&app).ends_with("\r\n\r\nb:2\na:1\n"));
    }
}
