//! LastWish CLI - command implementations
//!
//! The binary in `main.rs` only parses arguments and prints; everything it
//! runs lives here so it can be driven from tests.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

use anyhow::{anyhow, bail, Context, Result};
use lastwish_core::{
    load_state, Action, BeneficiaryProfile, FileStore, GenerationPolicy, KeyValueStore,
    LastWishConfig, NewWallet, OwnerPatch, Payment, Session, SessionState,
};
use lastwish_document::{generate, DocumentMeta, DocumentSummary, EstateDocument, Readiness};
use lastwish_services::{
    demo_assets, discover_or_demo, pin_or_local, resolve_or_none, DocumentPinner, HttpBackend,
    MockPaymentProcessor, NameResolver, OperationTracker, PaymentQuote, PinnedDocument,
};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Output format for generated documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("unknown format `{other}` (expected text or json)")),
        }
    }
}

/// Config from an optional TOML path, defaults otherwise
///
/// # Errors
/// Fails if the file cannot be read or holds invalid settings
pub fn load_config(path: Option<&Path>) -> Result<LastWishConfig> {
    match path {
        Some(path) => LastWishConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(LastWishConfig::default()),
    }
}

/// Stored session under the configured key
///
/// # Errors
/// Fails if nothing is stored or the blob does not decode
pub fn load_session<S: KeyValueStore + ?Sized>(
    store: &S,
    config: &LastWishConfig,
) -> Result<SessionState> {
    load_state(store, &config.storage_key)
        .context("reading stored session")?
        .ok_or_else(|| anyhow!("no session stored under key `{}`", config.storage_key))
}

/// Readiness checklist and summary as printable text
#[must_use]
pub fn check_report(state: &SessionState) -> (bool, String) {
    let readiness = Readiness::evaluate(state);
    let summary = DocumentSummary::of(state);
    let mut out = String::new();
    for (requirement, met) in readiness.iter() {
        let mark = if met { "x" } else { " " };
        let _ = writeln!(out, "[{mark}] {}", requirement.description());
    }
    let _ = writeln!(
        out,
        "\n{} wallet(s), {} token(s), {} NFT(s), {} beneficiary(ies), {} assignment(s)",
        summary.wallets, summary.tokens, summary.nfts, summary.beneficiaries, summary.assignments
    );
    let incomplete = state.assignments.incomplete_keys();
    if !incomplete.is_empty() {
        let _ = writeln!(out, "incomplete: {}", incomplete.len());
        for key in incomplete {
            let _ = writeln!(
                out,
                "  {key}: {}%",
                lastwish_document::format_percentage(state.assignments.total_percentage(&key))
            );
        }
    }
    (readiness.is_ready(), out)
}

/// Generate and render the final document
///
/// # Errors
/// Fails when the policy is strict and the plan is not ready
pub fn render_document(
    state: &SessionState,
    policy: GenerationPolicy,
    format: OutputFormat,
    meta: DocumentMeta,
) -> Result<(EstateDocument, String)> {
    let document = generate(state, policy, meta)?;
    let rendered = match format {
        OutputFormat::Text => document.render_text(),
        OutputFormat::Json => document.to_json()?,
    };
    Ok((document, rendered))
}

/// Write `contents` to `out`; a directory gets the suggested file name
///
/// # Errors
/// Fails if the file cannot be written
pub fn write_document(out: &Path, document: &EstateDocument, contents: &str) -> Result<PathBuf> {
    let path = if out.is_dir() {
        out.join(document.suggested_file_name())
    } else {
        out.to_path_buf()
    };
    std::fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), fingerprint = %document.fingerprint(), "document written");
    Ok(path)
}

/// Pin the document JSON, falling back to a local content id
///
/// # Errors
/// Fails only if the document cannot be encoded
pub async fn pin_document<P>(pinner: &P, document: &EstateDocument) -> Result<PinnedDocument>
where
    P: DocumentPinner + ?Sized,
{
    let value = serde_json::to_value(document).context("encoding document for pinning")?;
    Ok(pin_or_local(pinner, &value).await)
}

/// Beneficiary profile whose ENS name is replaced by its resolved address
///
/// Without a resolver, or when the name does not resolve, the address is
/// kept as given.
pub async fn resolved_profile<R>(
    resolver: Option<&R>,
    name: &str,
    address: &str,
    relationship: &str,
) -> BeneficiaryProfile
where
    R: NameResolver + ?Sized,
{
    let resolved = match resolver {
        Some(resolver) => resolve_or_none(resolver, address).await,
        None => None,
    };
    if let Some(resolved) = &resolved {
        tracing::info!(name, address, %resolved, "beneficiary name resolved");
    }
    BeneficiaryProfile::new(name)
        .with_address(resolved.as_deref().unwrap_or(address))
        .with_relationship(relationship)
}

const OWNER_WALLET: &str = "0x742d35cc6634c0532925a3b844bc454e4438f44e";

const DEMO_BENEFICIARIES: [(&str, &str, &str); 2] = [
    ("Alice Doe", "alice.eth", "Daughter"),
    ("Bob Doe", "0x1111111111111111111111111111111111111111", "Son"),
];

/// Options for building a demo session
#[derive(Debug, Clone, Default)]
pub struct DemoOptions {
    /// Address to run discovery against; demo inventory when `None`
    pub discover: Option<String>,
    /// Skip the simulated payment
    pub unpaid: bool,
}

/// Build a complete sample plan and persist it in `store_dir`
///
/// # Errors
/// Fails if the store cannot be opened or written, or an action is rejected
pub async fn build_demo(
    store_dir: &Path,
    config: &LastWishConfig,
    options: &DemoOptions,
) -> Result<SessionState> {
    let store = FileStore::open(store_dir)?;
    let mut session = Session::open(store, config);
    session.clear()?;

    let online = match options.discover {
        Some(_) => Some(HttpBackend::from_config(&config.services)?),
        None => None,
    };

    session.dispatch(Action::SetOwner(
        OwnerPatch::name("Jane Doe")
            .with_primary_wallet(OWNER_WALLET)
            .with_instructions("Seed phrase backup is with my attorney."),
    ))?;
    session.dispatch(Action::AddWallet(
        NewWallet::new(OWNER_WALLET)
            .with_ens("janedoe.eth")
            .with_blockchain("ethereum")
            .with_wallet_type("MetaMask"),
    ))?;

    let assets = match (&online, &options.discover) {
        (Some(backend), Some(address)) => discover_or_demo(backend, address).await,
        _ => demo_assets(),
    };
    for action in assets.into_actions() {
        session.dispatch(action)?;
    }

    for (name, address, relationship) in DEMO_BENEFICIARIES {
        let profile = resolved_profile(online.as_ref(), name, address, relationship).await;
        session.dispatch(Action::AddBeneficiary(profile))?;
    }

    let draft = session.state().draft();
    session.dispatch(Action::CommitDraft(draft))?;

    if !options.unpaid {
        let quote = PaymentQuote::new(&config.payment);
        let amount = quote.quote(true);
        let processor = MockPaymentProcessor::new(Duration::ZERO);
        let mut tracker = OperationTracker::new("payment");
        let tx_hash = tracker.run(processor.pay(amount)).await?;
        session.dispatch(Action::SetPayment(Payment {
            transaction_hash: Some(tx_hash),
            confirmed: Some(true),
            amount: Some(amount),
        }))?;
    }

    if session.state().asset_keys().is_empty() {
        bail!("demo session has no assets");
    }
    Ok(session.into_state())
}
