mod common;

use assert2::{check, let_assert};
use common::{DocsSite, docs_site};
use doxsearch::config::Config;
use doxsearch::session::{Event, SEARCH_GROUP_KEY, SearchSession, SessionDriver, SessionOutput};
use doxsearch::settings::{Settings, WebStorage};
use rstest::rstest;

fn fast_config() -> Config {
    Config {
        debounce_ms: 200,
        ..Config::default()
    }
}

#[rstest]
#[tokio::test]
async fn driver_renders_after_typing_pauses(docs_site: DocsSite) {
    let docs = docs_site.open().await;
    let config = fast_config();
    let session = SearchSession::init(docs.index().clone(), Settings::in_memory("doxygen_"), &config);
    let (driver, mut outputs) = SessionDriver::spawn(session, docs.store().clone());

    driver.send(Event::Focus(true)).await.unwrap();
    for value in ["f", "fo", "foo_"] {
        driver.send(Event::Input(value.to_string())).await.unwrap();
    }

    let_assert!(Some(SessionOutput::Render(result)) = outputs.recv().await);
    check!(result.term == "foo_");
    check!(result.outcome.match_count == 2);

    driver.send(Event::Escape).await.unwrap();
    let_assert!(Some(SessionOutput::Hide) = outputs.recv().await);

    let session = driver.dispose().await.unwrap();
    check!(!session.is_active());
}

#[rstest]
#[tokio::test]
async fn driver_switches_category(docs_site: DocsSite) {
    let docs = docs_site.open().await;
    let session =
        SearchSession::init(docs.index().clone(), Settings::in_memory("doxygen_"), &fast_config());
    let (driver, mut outputs) = SessionDriver::spawn(session, docs.store().clone());

    driver.send(Event::Focus(true)).await.unwrap();
    driver.send(Event::Input("m".to_string())).await.unwrap();
    let_assert!(Some(SessionOutput::Render(all)) = outputs.recv().await);
    check!(all.outcome.match_count == 1);

    // Functions has no shard for "m", so the switch renders nothing.
    driver.send(Event::SelectCategory(2)).await.unwrap();
    let_assert!(Some(SessionOutput::Render(functions)) = outputs.recv().await);
    check!(functions.category == "functions");
    check!(functions.shard.is_none());
    check!(functions.outcome.match_count == 0);

    let session = driver.dispose().await.unwrap();
    check!(session.settings().read_setting(SEARCH_GROUP_KEY, "") == "Functions");
}

#[rstest]
#[tokio::test]
async fn selected_category_is_session_scoped(docs_site: DocsSite) {
    let docs = docs_site.open().await;
    let settings_path = docs_site.workspace.path().join("settings.json");

    let settings = Settings::new("doxygen_", Box::new(WebStorage::open(&settings_path)));
    let mut session = SearchSession::init(docs.index().clone(), settings, &Config::default());
    session.handle(Event::SelectCategory(1));
    check!(session.selected_category().label == "Classes");
    drop(session);

    // search_grp is written with a session lifetime, so a new store forgets it.
    let settings = Settings::new("doxygen_", Box::new(WebStorage::open(&settings_path)));
    let session = SearchSession::init(docs.index().clone(), settings, &Config::default());
    check!(session.selected_category().label == "All");
}

#[rstest]
#[tokio::test]
async fn shards_are_shared_between_sessions(docs_site: DocsSite) {
    let docs = docs_site.open().await;
    let config = fast_config();

    for _ in 0..2 {
        let session =
            SearchSession::init(docs.index().clone(), Settings::in_memory("doxygen_"), &config);
        let (driver, mut outputs) = SessionDriver::spawn(session, docs.store().clone());
        driver.send(Event::Input("widget".to_string())).await.unwrap();
        let_assert!(Some(SessionOutput::Render(result)) = outputs.recv().await);
        check!(result.outcome.match_count == 1);
        driver.dispose().await.unwrap();
    }

    // Removing the file after the first load does not matter: the store kept it.
    std::fs::remove_file(docs_site.shard_path("all_3.js")).unwrap();
    let result = docs
        .query()
        .run("wid", docs.index().default_category())
        .await;
    check!(result.outcome.match_count == 1);
    let_assert!(Some(shard) = &result.shard);
    check!(docs.store().cached(shard).await.is_some());
}
