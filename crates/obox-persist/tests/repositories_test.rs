use chrono::Duration;
use obox_persist::{
    keys, CredentialStore, KeyValueStore, Message, PersistClient, PersistClientBuilder,
    PersistError, Section, Theme,
};
use std::sync::Arc;

fn section(hash: &str) -> Section {
    Section {
        hash: hash.to_string(),
        title: format!("Title {}", hash),
        text: format!("Body {}", hash),
        created_at: "2025-05-01".to_string(),
        url: format!("https://example.com/{}", hash),
    }
}

#[test]
fn test_threads_sorted_by_updated_at_desc() {
    let client = PersistClient::in_memory();
    let first = client.threads().create_thread("  first  ").unwrap();
    let second = client.threads().create_thread("second").unwrap();

    std::thread::sleep(std::time::Duration::from_millis(5));
    client.threads().touch_thread(&first.id).unwrap();

    let listed = client.threads().list_threads().unwrap();
    let ids: Vec<&str> = listed.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);
    assert_eq!(listed[0].title, "first");
}

#[test]
fn test_touch_missing_thread() {
    let client = PersistClient::in_memory();

    assert!(matches!(
        client.threads().touch_thread("nope"),
        Err(PersistError::ThreadNotFound(_))
    ));
}

#[test]
fn test_messages_round_trip_in_order() {
    let client = PersistClient::in_memory();
    let thread = client.threads().create_thread("q").unwrap();
    let messages = vec![Message::user(&thread.id, "q"), Message::placeholder(&thread.id)];

    client.messages().save_messages(&thread.id, &messages).unwrap();

    assert_eq!(client.messages().get_messages(&thread.id).unwrap(), messages);
    assert!(client.messages().get_messages("other").unwrap().is_empty());
}

#[test]
fn test_delete_thread_cascades() {
    let store: Arc<dyn KeyValueStore> = Arc::new(obox_persist::MemoryStore::new());
    let client = PersistClient::new(store.clone());

    let keep = client.threads().create_thread("keep").unwrap();
    let doomed = client.threads().create_thread("doomed").unwrap();

    let mut answer = Message::placeholder(&doomed.id);
    answer.search_id = Some("s-doomed".to_string());
    client
        .messages()
        .save_messages(&doomed.id, &[Message::user(&doomed.id, "q"), answer])
        .unwrap();
    client.searches().save_sections("s-doomed", &[section("a")]).unwrap();
    client.searches().save_sections("s-keep", &[section("b")]).unwrap();

    client.delete_thread(&doomed.id).unwrap();

    assert!(store.get(&keys::messages(&doomed.id)).unwrap().is_none());
    assert!(store.get(&keys::search("s-doomed")).unwrap().is_none());
    assert!(client.searches().get_sections("s-keep").unwrap().is_some());

    let remaining = client.threads().list_threads().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep.id);
}

#[test]
fn test_theme_defaults_to_auto() {
    let client = PersistClient::in_memory();
    assert_eq!(client.preferences().theme(), Theme::Auto);

    client.preferences().set_theme(Theme::Dark).unwrap();
    assert_eq!(client.preferences().theme(), Theme::Dark);
}

#[test]
fn test_credential_expiry() {
    let client = PersistClient::in_memory();
    let credentials = client.credentials();

    credentials.set(" user-key ", None).unwrap();
    assert_eq!(credentials.get().unwrap().as_deref(), Some("user-key"));

    credentials.set("short-lived", Some(Duration::seconds(-1))).unwrap();
    assert!(credentials.get().unwrap().is_none());

    credentials.set("again", Some(Duration::hours(1))).unwrap();
    credentials.expire().unwrap();
    assert!(credentials.get().unwrap().is_none());
}

#[test]
fn test_file_backend_persists_threads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("obox.json");

    let thread = {
        let client = PersistClientBuilder::new().path(&path).build().unwrap();
        client.threads().create_thread("durable").unwrap()
    };

    let client = PersistClientBuilder::new().path(&path).build().unwrap();
    let listed = client.threads().list_threads().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, thread.id);
}

#[test]
fn test_theme_stored_as_bare_name() {
    let store: Arc<dyn KeyValueStore> = Arc::new(obox_persist::MemoryStore::new());
    let client = PersistClient::new(store.clone());

    client.preferences().set_theme(Theme::Light).unwrap();
    assert_eq!(store.get(keys::THEME).unwrap().as_deref(), Some("light"));

    store.set(keys::THEME, "sepia".to_string()).unwrap();
    assert_eq!(client.preferences().theme(), Theme::Auto);
}
