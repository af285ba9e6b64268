//! Final generation gated by the readiness checklist

use crate::assembler::{assemble, DocumentMeta, EstateDocument};
use crate::error::GenerationError;
use crate::readiness::Readiness;
use lastwish_core::{GenerationPolicy, SessionState};

/// Assemble without consulting the checklist
///
/// Used for the in-progress preview, which is always available.
#[inline]
#[must_use]
pub fn preview(state: &SessionState, meta: DocumentMeta) -> EstateDocument {
    assemble(state, meta)
}

/// Produce the final document under the given policy
///
/// # Errors
/// [`GenerationError::NotReady`] when the policy is strict and any
/// requirement is unmet. Advisory generation never fails; unmet
/// requirements land in [`EstateDocument::warnings`].
pub fn generate(
    state: &SessionState,
    policy: GenerationPolicy,
    meta: DocumentMeta,
) -> Result<EstateDocument, GenerationError> {
    let readiness = Readiness::evaluate(state);
    let missing = readiness.missing();

    if missing.is_empty() {
        tracing::info!(document_id = %meta.document_id, "generating final document");
        return Ok(assemble(state, meta));
    }

    match policy {
        GenerationPolicy::Strict => {
            tracing::warn!(missing = missing.len(), "final generation blocked");
            Err(GenerationError::NotReady { missing })
        }
        GenerationPolicy::Advisory => {
            tracing::warn!(
                missing = missing.len(),
                "generating document with unmet requirements"
            );
            let mut doc = assemble(state, meta);
            doc.warnings = missing.iter().map(|r| r.description().to_string()).collect();
            Ok(doc)
        }
    }
}
