use std::collections::HashSet;

use extsmith::config::{resolve, RawOptions};
use extsmith::naming::DerivedIdentifiers;
use extsmith::plan::{ArtifactRequest, Listing, Planner, Section, Stage};
use extsmith::renderer::MiniJinjaRenderer;

fn options(kind: &str) -> RawOptions {
    RawOptions {
        name: Some("Generic Hello World".to_string()),
        description: Some("Says hello".to_string()),
        vendor: Some("Acme".to_string()),
        author_name: Some("Jane Doe".to_string()),
        author_url: Some("https://example.com".to_string()),
        copyright_holder: Some("Acme Ltd".to_string()),
        creation_month: Some("March".to_string()),
        creation_year: Some("2024".to_string()),
        package_version: Some("1.0.0".to_string()),
        kind: Some(kind.to_string()),
        ..RawOptions::default()
    }
}

fn plan(raw: RawOptions) -> Vec<ArtifactRequest> {
    let renderer = MiniJinjaRenderer::new();
    let config = resolve(raw).unwrap();
    let ids = DerivedIdentifiers::derive(&config).unwrap();
    let planner = Planner::new(&config, &ids, &renderer);
    let mut requests = Vec::new();
    for stage in Stage::ALL {
        requests.extend(planner.requests(stage).unwrap());
    }
    requests
}

fn parent(path: &str) -> Option<&str> {
    path.rfind('/').map(|index| &path[..index])
}

#[test]
fn test_no_path_is_requested_twice() {
    let mut raw = options("component");
    raw.include_sql = true;
    raw.include_api = true;
    raw.controllers = Some("Reports,Settings".to_string());
    raw.extra_folders = Some("media".to_string());

    let mut seen = HashSet::new();
    for request in plan(raw) {
        assert!(seen.insert(request.path().to_string()), "{} twice", request.path());
    }
}

#[test]
fn test_directories_come_before_their_files() {
    for kind in ["component", "plugin", "module"] {
        let mut raw = options(kind);
        raw.include_sql = true;
        let mut directories = HashSet::new();
        for request in plan(raw) {
            match request {
                ArtifactRequest::Directory { path, .. } => {
                    directories.insert(path);
                }
                ArtifactRequest::File { path, .. } => {
                    if let Some(parent) = parent(&path) {
                        assert!(directories.contains(parent), "{path} before {parent}");
                    }
                }
            }
        }
    }
}

#[test]
fn test_optional_stages() {
    let config = resolve(options("component")).unwrap();
    assert!(Stage::Layout.applies_to(&config));
    assert!(Stage::AdminMvc.applies_to(&config));
    assert!(!Stage::Sql.applies_to(&config));
    assert!(!Stage::Api.applies_to(&config));
    assert!(!Stage::Extension.applies_to(&config));
    assert!(!Stage::ExtraControllers.applies_to(&config));

    let config = resolve(options("plugin")).unwrap();
    assert!(!Stage::SiteMvc.applies_to(&config));
    assert!(Stage::Extension.applies_to(&config));
    assert!(Stage::Services.applies_to(&config));
}

#[test]
fn test_sql_hooks_point_into_the_admin_section() {
    let mut raw = options("component");
    raw.include_sql = true;
    let hooks: Vec<_> = plan(raw)
        .into_iter()
        .filter(|r| matches!(r.listing(), Listing::Hook { .. }))
        .map(|r| r.path().to_string())
        .collect();
    assert_eq!(
        hooks,
        vec![
            "admin/sql/install.mysql.utf8.sql",
            "admin/sql/uninstall.mysql.utf8.sql",
            "admin/sql/updates/mysql",
        ]
    );
}

#[test]
fn test_plugin_layout_is_rooted() {
    let entries: Vec<_> = plan(options("plugin"))
        .into_iter()
        .filter(|r| r.listing() == &Listing::Entry(Section::Root))
        .map(|r| r.path().to_string())
        .collect();
    assert_eq!(entries, vec!["language", "services", "src"]);
}
