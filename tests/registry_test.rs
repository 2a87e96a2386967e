use extsmith::config::{
    resolve as resolve_config, ControllerDesign, ExtensionKind, ModuleClient, PluginGroup,
    RawOptions,
};
use extsmith::error::Error;
use extsmith::manifest::ManifestAssembler;
use extsmith::naming::DerivedIdentifiers;
use extsmith::registry::{base_context, extend_context, resolve, Artifact};
use extsmith::renderer::MiniJinjaRenderer;
use serde_json::json;

fn all_kinds() -> Vec<ExtensionKind> {
    let mut kinds = Vec::new();
    for controller in [ControllerDesign::Display, ControllerDesign::Form] {
        for api in [false, true] {
            kinds.push(ExtensionKind::Component { controller, api });
        }
    }
    kinds.push(ExtensionKind::Plugin { group: PluginGroup::System });
    kinds.push(ExtensionKind::Plugin { group: PluginGroup::Content });
    kinds.push(ExtensionKind::Plugin { group: PluginGroup::Other("finder".to_string()) });
    kinds.push(ExtensionKind::Module { client: ModuleClient::Site });
    kinds.push(ExtensionKind::Module { client: ModuleClient::Administrator });
    kinds.push(ExtensionKind::Custom("library".to_string()));
    kinds
}

fn options_for(kind: &ExtensionKind) -> RawOptions {
    let mut raw = RawOptions {
        name: Some("Generic Hello World".to_string()),
        description: Some("Says <hello> & goodbye".to_string()),
        vendor: Some("Acme".to_string()),
        author_name: Some("Jane Doe".to_string()),
        author_url: Some("https://example.com".to_string()),
        copyright_holder: Some("Acme Ltd".to_string()),
        creation_month: Some("March".to_string()),
        creation_year: Some("2024".to_string()),
        package_version: Some("1.0.0".to_string()),
        include_sql: true,
        ..RawOptions::default()
    };
    match kind {
        ExtensionKind::Component { controller, api } => {
            raw.kind = Some("component".to_string());
            raw.include_api = *api;
            raw.controllers = Some("Reports".to_string());
            if *controller == ControllerDesign::Form {
                raw.controller_design = Some("form".to_string());
            }
        }
        ExtensionKind::Plugin { group } => {
            raw.kind = Some("plugin".to_string());
            raw.plugin_group = Some(group.as_str().to_string());
        }
        ExtensionKind::Module { client } => {
            raw.kind = Some("module".to_string());
            if *client == ModuleClient::Administrator {
                raw.module_client = Some("administrator".to_string());
            }
        }
        ExtensionKind::Custom(custom) => raw.custom_kind = Some(custom.clone()),
    }
    raw
}

#[test]
fn test_resolution_is_total() {
    for kind in all_kinds() {
        for artifact in Artifact::ALL {
            match resolve(artifact, &kind) {
                Ok(template) => {
                    assert!(!template.source.trim().is_empty(), "{artifact} for {kind} is empty")
                }
                Err(Error::UnsupportedVariantError { artifact: a, kind: k }) => {
                    assert_eq!(a, artifact.to_string());
                    assert_eq!(k, kind.to_string());
                }
                Err(e) => panic!("Unexpected error for {artifact} / {kind}: {e}"),
            }
        }
    }
}

#[test]
fn test_every_kind_has_manifest_and_language_templates() {
    for kind in all_kinds() {
        for artifact in [
            Artifact::Manifest,
            Artifact::Language,
            Artifact::SystemLanguage,
            Artifact::SqlInstall,
            Artifact::SqlUninstall,
            Artifact::SqlUpdate,
        ] {
            assert!(resolve(artifact, &kind).is_ok(), "{artifact} missing for {kind}");
        }
    }
}

#[test]
fn test_flag_specializations() {
    let display = ExtensionKind::Component { controller: ControllerDesign::Display, api: false };
    let form = ExtensionKind::Component { controller: ControllerDesign::Form, api: false };
    assert_eq!(
        resolve(Artifact::AdminDisplayController, &display).unwrap().name,
        "component/admin_display_controller.php"
    );
    assert_eq!(
        resolve(Artifact::AdminDisplayController, &form).unwrap().name,
        "component/admin_form_controller.php"
    );
    assert_eq!(
        resolve(Artifact::SiteDisplayController, &form).unwrap().name,
        "component/site_form_controller.php"
    );

    let content = ExtensionKind::Plugin { group: PluginGroup::Content };
    let other = ExtensionKind::Plugin { group: PluginGroup::Other("finder".to_string()) };
    assert_eq!(
        resolve(Artifact::PluginExtension, &content).unwrap().name,
        "plugin/content_extension.php"
    );
    assert_eq!(resolve(Artifact::PluginExtension, &other).unwrap().name, "plugin/extension.php");

    let admin = ExtensionKind::Module { client: ModuleClient::Administrator };
    assert_eq!(resolve(Artifact::ModuleLayout, &admin).unwrap().name, "module/admin_layout.php");
}

#[test]
fn test_unsupported_variants() {
    let no_api = ExtensionKind::Component { controller: ControllerDesign::Display, api: false };
    assert!(matches!(
        resolve(Artifact::ApiController, &no_api),
        Err(Error::UnsupportedVariantError { .. })
    ));

    let custom = ExtensionKind::Custom("library".to_string());
    assert!(matches!(
        resolve(Artifact::ServiceProvider, &custom),
        Err(Error::UnsupportedVariantError { .. })
    ));

    let plugin = ExtensionKind::Plugin { group: PluginGroup::System };
    assert!(matches!(
        resolve(Artifact::SiteModel, &plugin),
        Err(Error::UnsupportedVariantError { .. })
    ));
}

#[test]
fn test_every_template_renders() {
    let renderer = MiniJinjaRenderer::new();
    for kind in all_kinds() {
        let config = resolve_config(options_for(&kind)).unwrap();
        let ids = DerivedIdentifiers::derive(&config).unwrap();
        let base = base_context(&config, &ids);
        let with_controller = extend_context(&base, "controller", json!(ids.controllers.first()));
        let manifest = ManifestAssembler::new(base.clone(), config.kind.clone());
        let context = extend_context(&with_controller, "manifest", manifest.model());

        for artifact in Artifact::ALL {
            if let Ok(template) = resolve(artifact, &config.kind) {
                let rendered = template.render(&renderer, &context);
                assert!(rendered.is_ok(), "{} failed: {:?}", template.name, rendered.err());
                assert!(rendered.unwrap().ends_with('\n'), "{} lacks a final newline", template.name);
            }
        }
    }
}

#[test]
fn test_sql_templates() {
    let renderer = MiniJinjaRenderer::new();
    let kind = ExtensionKind::Plugin { group: PluginGroup::System };
    let config = resolve_config(options_for(&kind)).unwrap();
    let ids = DerivedIdentifiers::derive(&config).unwrap();
    let context = base_context(&config, &ids);

    let uninstall = resolve(Artifact::SqlUninstall, &config.kind)
        .unwrap()
        .render(&renderer, &context)
        .unwrap();
    assert_eq!(uninstall, "DROP TABLE IF EXISTS `#__generic_hello_world_storage_table_1`;\n");

    let install = resolve(Artifact::SqlInstall, &config.kind)
        .unwrap()
        .render(&renderer, &context)
        .unwrap();
    // Reinstalling over an existing table starts from a clean one.
    assert!(install.starts_with(
        "DROP TABLE IF EXISTS `#__generic_hello_world_storage_table_1`;\n\n\
         CREATE TABLE `#__generic_hello_world_storage_table_1`("
    ));
}

#[test]
fn test_namespaces_per_kind() {
    let expected = [
        (
            ExtensionKind::Component { controller: ControllerDesign::Display, api: false },
            "Acme\\Component\\GenericHelloWorld",
        ),
        (
            ExtensionKind::Plugin { group: PluginGroup::Content },
            "Acme\\Plugin\\Content\\GenericHelloWorld",
        ),
        (
            ExtensionKind::Module { client: ModuleClient::Site },
            "Acme\\Module\\GenericHelloWorld",
        ),
        (ExtensionKind::Custom("library".to_string()), "Acme\\Library\\GenericHelloWorld"),
    ];
    for (kind, namespace) in expected {
        let config = resolve_config(options_for(&kind)).unwrap();
        let ids = DerivedIdentifiers::derive(&config).unwrap();
        assert_eq!(base_context(&config, &ids)["namespace"], namespace);
    }
}
