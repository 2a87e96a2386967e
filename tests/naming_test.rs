use extsmith::config::{resolve, RawOptions};
use extsmith::naming::{namespace_token, slug, table_prefix, validate_name, DerivedIdentifiers};

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

#[test]
fn test_name_transformations() {
    assert_eq!(slug("Generic Hello World"), "generichelloworld");
    assert_eq!(namespace_token("Generic Hello World"), "GenericHelloWorld");
    assert_eq!(table_prefix("Generic Hello World"), "generic_hello_world");
    assert_eq!(table_prefix("Generic   Hello"), "generic_hello");
}

#[test]
fn test_validate_name() {
    assert_eq!(validate_name("  Hello World ", "name").unwrap(), "Hello World");
    assert!(validate_name("", "name").is_err());
    assert!(validate_name("   ", "name").is_err());
    assert!(validate_name("9 Lives", "name").is_err());
    assert!(validate_name("Hello-World", "name").is_err());
    assert!(validate_name("Héllo", "name").is_err());
}

#[test]
fn test_component_identifiers() {
    let mut raw = options("component");
    raw.initial_view = Some("Hello List".to_string());
    raw.controllers = Some("Monthly Reports".to_string());
    let ids = DerivedIdentifiers::derive(&resolve(raw).unwrap()).unwrap();

    assert_eq!(ids.slug, "generichelloworld");
    assert_eq!(ids.namespace, "GenericHelloWorld");
    assert_eq!(ids.manifest_key, "com_generichelloworld");
    assert_eq!(ids.package_dir(), "com_generichelloworld");
    assert_eq!(ids.language_prefix, "COM_GENERICHELLOWORLD");
    assert_eq!(ids.table_prefix, "generic_hello_world");
    assert_eq!(ids.manifest_file, "generichelloworld.xml");
    assert_eq!(ids.view, "HelloList");
    assert_eq!(ids.view_slug, "hellolist");
    assert_eq!(ids.controllers.len(), 1);
    assert_eq!(ids.controllers[0].namespace, "MonthlyReports");
    assert_eq!(ids.controllers[0].slug, "monthlyreports");
}

#[test]
fn test_manifest_keys_per_kind() {
    let mut plugin = options("plugin");
    plugin.plugin_group = Some("content".to_string());
    let ids = DerivedIdentifiers::derive(&resolve(plugin).unwrap()).unwrap();
    assert_eq!(ids.manifest_key, "plg_content_generichelloworld");
    assert_eq!(ids.manifest_file, "generichelloworld.xml");

    let ids = DerivedIdentifiers::derive(&resolve(options("module")).unwrap()).unwrap();
    assert_eq!(ids.manifest_key, "mod_generichelloworld");
    assert_eq!(ids.manifest_file, "mod_generichelloworld.xml");

    let mut custom = options("component");
    custom.kind = None;
    custom.custom_kind = Some("library".to_string());
    let ids = DerivedIdentifiers::derive(&resolve(custom).unwrap()).unwrap();
    assert_eq!(ids.manifest_key, "library_generichelloworld");
}

#[test]
fn test_derivation_is_deterministic() {
    let config = resolve(options("component")).unwrap();
    assert_eq!(
        DerivedIdentifiers::derive(&config).unwrap(),
        DerivedIdentifiers::derive(&config.clone()).unwrap()
    );
}
