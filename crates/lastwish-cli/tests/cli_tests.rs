//! Command flows against a temporary store directory.

use async_trait::async_trait;
use lastwish_cli::{
    build_demo, check_report, load_config, load_session, pin_document, render_document,
    resolved_profile, write_document, DemoOptions, OutputFormat,
};
use lastwish_core::{FileStore, GenerationPolicy, KeyValueStore, LastWishConfig, Session};
use lastwish_document::DocumentMeta;
use lastwish_services::{local_cid, DocumentPinner, NameResolver, PinnedDocument, ServiceError};
use lastwish_test_utils::{fixed_time, session_with};

struct FixedResolver(Option<&'static str>);

#[async_trait]
impl NameResolver for FixedResolver {
    async fn resolve(&self, _name: &str) -> Result<Option<String>, ServiceError> {
        Ok(self.0.map(str::to_string))
    }
}

struct DownPinner;

#[async_trait]
impl DocumentPinner for DownPinner {
    async fn pin(&self, _document: &serde_json::Value) -> Result<PinnedDocument, ServiceError> {
        Err(ServiceError::Status {
            endpoint: "ipfs-pin".into(),
            status: 503,
        })
    }
}

fn meta() -> DocumentMeta {
    DocumentMeta::fixed("CLI000001", fixed_time())
}

#[tokio::test]
async fn demo_session_is_ready_and_reloadable() {
    let dir = tempfile::tempdir().unwrap();
    let config = LastWishConfig::default();

    let built = build_demo(dir.path(), &config, &DemoOptions::default())
        .await
        .unwrap();
    let stored = load_session(&FileStore::open(dir.path()).unwrap(), &config).unwrap();
    assert_eq!(stored, built);

    let (ready, report) = check_report(&stored);
    assert!(ready, "{report}");
    assert!(report.contains("[x] payment confirmed"));
}

#[tokio::test]
async fn unpaid_demo_blocks_strict_generation() {
    let dir = tempfile::tempdir().unwrap();
    let config = LastWishConfig::default();
    let options = DemoOptions {
        unpaid: true,
        ..DemoOptions::default()
    };
    let state = build_demo(dir.path(), &config, &options).await.unwrap();

    let err = render_document(&state, GenerationPolicy::Strict, OutputFormat::Text, meta())
        .unwrap_err();
    assert!(err.to_string().contains("payment confirmed"));

    let (document, text) =
        render_document(&state, GenerationPolicy::Advisory, OutputFormat::Text, meta()).unwrap();
    assert_eq!(document.warnings, vec!["payment confirmed".to_string()]);
    assert!(text.contains("DRAFT - UNMET REQUIREMENTS:"));
}

#[test]
fn generate_writes_into_directory() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = session_with(&["Alice"]);
    let (document, json) =
        render_document(&state, GenerationPolicy::Advisory, OutputFormat::Json, meta()).unwrap();

    let path = write_document(dir.path(), &document, &json).unwrap();
    assert_eq!(path.file_name().unwrap(), "lastwish-will-2026-10-18.txt");
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(written["meta"]["document_id"], "CLI000001");
}

#[test]
fn missing_session_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    let err = load_session(&store, &LastWishConfig::default()).unwrap_err();
    assert!(err.to_string().contains("no session stored"));
}

#[test]
fn config_file_selects_storage_key() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("lastwish.toml");
    std::fs::write(&config_path, "storage_key = \"estate\"\ngeneration_policy = \"advisory\"\n")
        .unwrap();
    let config = load_config(Some(&config_path)).unwrap();
    assert_eq!(config.storage_key, "estate");
    assert_eq!(config.generation_policy, GenerationPolicy::Advisory);

    let store = FileStore::open(dir.path().join("store")).unwrap();
    let session = Session::open(store, &config);
    session.save().unwrap();
    assert!(session.store().get("estate").unwrap().is_some());
}

#[tokio::test]
async fn resolved_ens_name_is_recorded_on_profile() {
    let resolver = FixedResolver(Some("0x2222222222222222222222222222222222222222"));
    let profile = resolved_profile(Some(&resolver), "Alice Doe", "alice.eth", "Daughter").await;
    assert_eq!(
        profile.address_or_ens.as_deref(),
        Some("0x2222222222222222222222222222222222222222")
    );
    assert_eq!(profile.relationship.as_deref(), Some("Daughter"));

    let unresolved =
        resolved_profile(Some(&FixedResolver(None)), "Alice Doe", "alice.eth", "Daughter").await;
    assert_eq!(unresolved.address_or_ens.as_deref(), Some("alice.eth"));

    let offline = resolved_profile(None::<&FixedResolver>, "Bob Doe", "bob.eth", "Son").await;
    assert_eq!(offline.address_or_ens.as_deref(), Some("bob.eth"));
}

#[tokio::test]
async fn unreachable_pinner_yields_local_cid() {
    let (state, _) = session_with(&["Alice"]);
    let (document, _) =
        render_document(&state, GenerationPolicy::Advisory, OutputFormat::Json, meta()).unwrap();

    let pinned = pin_document(&DownPinner, &document).await.unwrap();
    assert!(pinned.local);
    assert_eq!(pinned.cid, local_cid(&serde_json::to_value(&document).unwrap()));
}
