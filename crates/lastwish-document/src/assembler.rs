//! Document assembler
//!
//! [`assemble`] turns a session into an [`EstateDocument`]: a sectioned,
//! legal-style addendum covering the asset inventory, beneficiaries, the
//! per-asset splits, and the usual disclaimers. It is a pure function of
//! the session and the supplied [`DocumentMeta`]; it never checks that the
//! splits add up, it just writes down what it is given.

use chrono::{DateTime, Utc};
use lastwish_core::{Asset, Assignment, Beneficiary, SessionState, Wallet};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Marker written wherever a collection or field is empty
pub const NONE_SPECIFIED: &str = "None specified.";

const TITLE: &str = "Digital Asset Inheritance Addendum";
const PLATFORM: &str = "LastWish.eth Platform";
const DOCUMENT_ID_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const DISTRIBUTION: &str = "Upon my death, I direct that my digital assets be distributed to the \
above-named beneficiaries according to the specified percentages. The distribution should be \
made to their designated addresses.";

const DISCLAIMER_INTRO: &str = "This addendum is intended to supplement, not replace, my primary \
Last Will and Testament. I acknowledge that:";

const DISCLAIMERS: [&str; 5] = [
    "Digital asset laws vary by jurisdiction and continue to evolve",
    "Technical challenges may affect asset recovery",
    "Private keys or seed phrases may be required for asset access",
    "Professional legal and technical assistance is recommended",
    "The LastWish.eth platform provides tools but not legal advice",
];

const NOTICE: &str = "IMPORTANT NOTICE: This document is generated by LastWish.eth, a digital \
asset inheritance planning tool. This is not a substitute for professional legal advice. Please \
consult with an attorney familiar with digital asset inheritance laws in your jurisdiction.";

/// Identity and timestamp of one generated document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Short random identifier, uppercase base-36
    pub document_id: String,
    /// Generation time
    pub generated_at: DateTime<Utc>,
}

impl DocumentMeta {
    /// Fresh random id stamped with the current time
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let document_id = (0..DOCUMENT_ID_LEN)
            .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
            .collect();
        Self {
            document_id,
            generated_at: Utc::now(),
        }
    }

    /// Fixed meta, for reproducible output
    #[inline]
    #[must_use]
    pub fn fixed(document_id: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            document_id: document_id.into(),
            generated_at,
        }
    }

    /// Date as written in the document, e.g. `October 18, 2026`
    #[must_use]
    pub fn long_date(&self) -> String {
        self.generated_at.format("%B %-d, %Y").to_string()
    }
}

/// One numbered section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub number: u8,
    pub heading: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    pub lines: Vec<String>,
}

impl Section {
    fn new(number: u8, heading: &str) -> Self {
        Self {
            number,
            heading: heading.to_string(),
            intro: None,
            lines: Vec::new(),
        }
    }

    fn with_intro(mut self, intro: &str) -> Self {
        self.intro = Some(intro.to_string());
        self
    }

    fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }
}

/// Closing date and testator lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBlock {
    pub date: String,
    pub testator: String,
}

/// A fully assembled estate document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstateDocument {
    pub title: String,
    pub platform: String,
    pub meta: DocumentMeta,
    pub preamble: String,
    pub sections: Vec<Section>,
    pub signature: SignatureBlock,
    pub notice: String,
    /// Unmet requirements when generated under the advisory policy
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EstateDocument {
    /// Section by number
    #[must_use]
    pub fn section(&self, number: u8) -> Option<&Section> {
        self.sections.iter().find(|s| s.number == number)
    }

    /// Plain-text rendering
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "{}", self.platform);
        let _ = writeln!(out, "Generated on: {}", self.meta.long_date());
        if !self.warnings.is_empty() {
            out.push('\n');
            let _ = writeln!(out, "DRAFT - UNMET REQUIREMENTS:");
            for warning in &self.warnings {
                let _ = writeln!(out, "  ! {warning}");
            }
        }
        let _ = writeln!(out, "\n{}", self.preamble);
        for section in &self.sections {
            let _ = writeln!(out, "\nSECTION {}: {}", section.number, section.heading);
            if let Some(intro) = &section.intro {
                let _ = writeln!(out, "{intro}");
            }
            for line in &section.lines {
                let _ = writeln!(out, "{line}");
            }
        }
        let _ = writeln!(out, "\nDate: {}", self.signature.date);
        let _ = writeln!(out, "Testator: {}", self.signature.testator);
        let _ = writeln!(out, "\n---");
        let _ = writeln!(out, "{}", self.notice);
        let _ = writeln!(out, "Document ID: {}", self.meta.document_id);
        out
    }

    /// JSON rendering
    ///
    /// # Errors
    /// Returns the serializer error, which cannot happen for this type in
    /// practice
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// SHA-256 of the text rendering, hex encoded
    #[must_use]
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.render_text().as_bytes()))
    }

    /// Download name, e.g. `lastwish-will-2026-10-18.txt`
    #[must_use]
    pub fn suggested_file_name(&self) -> String {
        format!("lastwish-will-{}.txt", self.meta.generated_at.format("%Y-%m-%d"))
    }
}

/// Build the document for a session
#[must_use]
pub fn assemble(state: &SessionState, meta: DocumentMeta) -> EstateDocument {
    let owner_name = state.owner.full_name.trim();
    let preamble_name = if owner_name.is_empty() {
        "[name not specified]"
    } else {
        owner_name
    };
    let preamble = format!(
        "I, {preamble_name}, being of sound mind and disposing memory, do hereby make this \
         Digital Asset Inheritance Addendum to supplement my Last Will and Testament regarding \
         the distribution of my cryptocurrency and digital assets."
    );

    let sections = vec![
        inventory_section(state),
        beneficiary_section(state),
        assignment_section(state),
        {
            let mut s = Section::new(4, "DISTRIBUTION INSTRUCTIONS");
            s.line(DISTRIBUTION);
            s
        },
        {
            let mut s = Section::new(5, "SPECIAL INSTRUCTIONS");
            s.line(
                state
                    .owner
                    .special_instructions
                    .as_deref()
                    .filter(|i| !i.trim().is_empty())
                    .unwrap_or(NONE_SPECIFIED),
            );
            s
        },
        {
            let mut s = Section::new(6, "LEGAL DISCLAIMERS").with_intro(DISCLAIMER_INTRO);
            for (i, d) in DISCLAIMERS.iter().enumerate() {
                s.line(format!("{}. {d}", i + 1));
            }
            s
        },
    ];

    let signature = SignatureBlock {
        date: meta.long_date(),
        testator: if owner_name.is_empty() {
            NONE_SPECIFIED.to_string()
        } else {
            owner_name.to_string()
        },
    };

    tracing::debug!(
        document_id = %meta.document_id,
        assignments = state.assignments.len(),
        "document assembled"
    );

    EstateDocument {
        title: TITLE.to_string(),
        platform: PLATFORM.to_string(),
        meta,
        preamble,
        sections,
        signature,
        notice: NOTICE.to_string(),
        warnings: Vec::new(),
    }
}

fn inventory_section(state: &SessionState) -> Section {
    let mut s = Section::new(1, "DIGITAL ASSET INVENTORY").with_intro(
        "I hereby declare that I own and control the following digital assets through verified \
         wallet addresses:",
    );

    s.line("Wallets:");
    if state.wallets.is_empty() {
        s.line(format!("  {NONE_SPECIFIED}"));
    }
    for (i, wallet) in state.wallets.iter().enumerate() {
        wallet_lines(&mut s, i + 1, wallet);
    }

    s.line("Tokens:");
    if state.tokens.is_empty() {
        s.line(format!("  {NONE_SPECIFIED}"));
    }
    for token in &state.tokens {
        let name = token
            .name
            .as_deref()
            .map(|n| format!(" ({n})"))
            .unwrap_or_default();
        s.line(format!("  • {} {}{name}", token.balance, token.symbol));
    }

    s.line("NFTs:");
    if state.nfts.is_empty() {
        s.line(format!("  {NONE_SPECIFIED}"));
    }
    for nft in &state.nfts {
        s.line(format!("  • {}", Asset::Nft(nft.clone()).display_name()));
    }
    s
}

fn wallet_lines(s: &mut Section, index: usize, wallet: &Wallet) {
    let chain = wallet
        .blockchain
        .as_deref()
        .unwrap_or("ethereum")
        .to_uppercase();
    s.line(format!("  {index}. {chain} WALLET"));
    s.line(format!("     Address: {}", wallet.address));
    if let Some(ens) = &wallet.ens_name {
        s.line(format!("     ENS: {ens}"));
    }
    if let Some(kind) = &wallet.wallet_type {
        s.line(format!("     Wallet Type: {kind}"));
    }
}

fn beneficiary_section(state: &SessionState) -> Section {
    let mut s = Section::new(2, "BENEFICIARY DESIGNATIONS").with_intro(
        "I hereby designate the following individuals as beneficiaries of my digital assets:",
    );
    if state.beneficiaries.is_empty() {
        s.line(NONE_SPECIFIED);
    }
    for (i, b) in state.beneficiaries.iter().enumerate() {
        beneficiary_lines(&mut s, i + 1, b);
    }
    s
}

fn beneficiary_lines(s: &mut Section, index: usize, b: &Beneficiary) {
    s.line(format!("{index}. {}", b.name));
    let fields = [
        ("Address", &b.address_or_ens),
        ("Email", &b.email),
        ("Relationship", &b.relationship),
        ("Phone", &b.phone_number),
        ("Physical Address", &b.physical_address),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            s.line(format!("   {label}: {value}"));
        }
    }
}

fn assignment_section(state: &SessionState) -> Section {
    let mut s = Section::new(3, "ASSET ASSIGNMENTS").with_intro(
        "The following assets shall be distributed according to the specified percentages:",
    );
    if state.assignments.is_empty() {
        s.line(NONE_SPECIFIED);
    }
    for assignment in state.assignments.iter() {
        s.line(assignment_line(state, assignment));
    }
    s
}

fn assignment_line(state: &SessionState, assignment: &Assignment) -> String {
    let label = match state.asset(&assignment.asset_key) {
        Some(asset) => format!("{} [{}]", asset.display_name(), assignment.asset_key),
        None => assignment.asset_key.to_string(),
    };
    let splits = if assignment.splits.is_empty() {
        "no beneficiaries assigned".to_string()
    } else {
        assignment
            .splits
            .iter()
            .map(|split| {
                let name = state
                    .beneficiaries
                    .name_of(split.beneficiary_id)
                    .unwrap_or("Unknown");
                format!("{name}: {}%", format_percentage(split.percentage))
            })
            .collect::<Vec<_>>()
            .join(", ")
    };
    if assignment.is_complete() {
        format!("• {label}: {splits}")
    } else {
        format!(
            "• {label}: {splits} (total {}%, incomplete)",
            format_percentage(assignment.total())
        )
    }
}

/// Percentage with at most two decimals and no trailing zeros
#[must_use]
pub fn format_percentage(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
