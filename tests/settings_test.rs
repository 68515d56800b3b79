mod common;

use assert2::check;
use common::TempWorkspace;
use doxsearch::config::{Config, SettingsBackend};
use doxsearch::layout::{PageLayout, SidebarLayout, WIDTH_KEY};
use doxsearch::settings::Settings;
use rstest::rstest;

fn config(workspace: &TempWorkspace, backend: SettingsBackend) -> Config {
    Config {
        settings_backend: backend,
        settings_file: Some(workspace.path().join("state/settings")),
        ..Config::default()
    }
}

#[rstest]
#[case::web_storage(SettingsBackend::WebStorage)]
#[case::cookies(SettingsBackend::Cookies)]
fn durable_settings_survive_restart(#[case] backend: SettingsBackend) {
    let workspace = TempWorkspace::new();
    let config = config(&workspace, backend);

    let mut settings = Settings::from_config(&config);
    settings.write_setting_default("width", "312").unwrap();
    settings.write_setting("search_grp", "Classes", 0).unwrap();
    drop(settings);

    let settings = Settings::from_config(&config);
    check!(settings.read_setting("width", "250") == "312");
    check!(settings.read_setting("search_grp", "All") == "All");
}

#[rstest]
#[case::web_storage(SettingsBackend::WebStorage)]
#[case::cookies(SettingsBackend::Cookies)]
fn erase_is_persisted(#[case] backend: SettingsBackend) {
    let workspace = TempWorkspace::new();
    let config = config(&workspace, backend);

    let mut settings = Settings::from_config(&config);
    settings.write_setting_default("width", "312").unwrap();
    settings.erase_setting("width").unwrap();
    drop(settings);

    let settings = Settings::from_config(&config);
    check!(settings.read_setting("width", "250") == "250");
}

#[rstest]
#[case::web_storage(SettingsBackend::WebStorage)]
#[case::cookies(SettingsBackend::Cookies)]
fn session_write_replaces_durable(#[case] backend: SettingsBackend) {
    let workspace = TempWorkspace::new();
    let config = config(&workspace, backend);

    let mut settings = Settings::from_config(&config);
    settings.write_setting("search_grp", "Classes", 10).unwrap();
    settings.write_setting("search_grp", "Functions", 0).unwrap();
    check!(settings.read_setting("search_grp", "All") == "Functions");
    drop(settings);

    let settings = Settings::from_config(&config);
    check!(settings.read_setting("search_grp", "All") == "All");
}

#[rstest]
#[case::web_storage(SettingsBackend::WebStorage)]
#[case::cookies(SettingsBackend::Cookies)]
fn values_with_separators_survive_restart(#[case] backend: SettingsBackend) {
    let workspace = TempWorkspace::new();
    let config = config(&workspace, backend);

    let mut settings = Settings::from_config(&config);
    settings.write_setting_default("width", "312").unwrap();
    settings.write_setting_default("note", "a;b=c\nline2\tend").unwrap();
    check!(settings.read_setting("note", "") == "a;b=c\nline2\tend");
    drop(settings);

    let settings = Settings::from_config(&config);
    check!(settings.read_setting("width", "250") == "312");
    check!(settings.read_setting("note", "") == "a;b=c\nline2\tend");
}

#[rstest]
#[case::web_storage(SettingsBackend::WebStorage)]
#[case::cookies(SettingsBackend::Cookies)]
fn namespace_is_applied(#[case] backend: SettingsBackend) {
    let workspace = TempWorkspace::new();
    let mut first = config(&workspace, backend);
    first.namespace = "site_a_".to_string();
    let mut second = first.clone();
    second.namespace = "site_b_".to_string();

    let mut settings = Settings::from_config(&first);
    settings.write_setting_default("width", "400").unwrap();
    drop(settings);

    check!(Settings::from_config(&second).read_setting("width", "250") == "250");
    check!(Settings::from_config(&first).read_setting("width", "250") == "400");
}

#[test]
fn sidebar_width_round_trips_through_settings() {
    let workspace = TempWorkspace::new();
    let config = config(&workspace, SettingsBackend::WebStorage);
    let layout = SidebarLayout::from_config(&config, PageLayout::IndexDisabled);

    let mut settings = Settings::from_config(&config);
    let placed = layout.resize_width(346, &mut settings).unwrap();
    check!(placed.sidebar_width == 340);
    check!(placed.footer_margin == Some(346));
    drop(settings);

    let settings = Settings::from_config(&config);
    check!(settings.read_parsed(WIDTH_KEY, 0u32) == 340);
    let restored = layout.restore_saved(&settings);
    check!(restored.content_margin == 346);
    check!(restored.sidebar_width == 340);
}

#[test]
fn config_file_selects_backend() {
    let workspace = TempWorkspace::new();
    workspace.create_file(
        "config.toml",
        "settings_backend = \"cookies\"\nnamespace = \"docs_\"\ndebounce_ms = 250\n",
    );
    let config = Config::load(Some(&workspace.path().join("config.toml"))).unwrap();
    check!(config.settings_backend == SettingsBackend::Cookies);
    check!(config.namespace == "docs_");
    check!(config.debounce_ms == 250);
    check!(config.load_timeout_ms == 5000);
}
