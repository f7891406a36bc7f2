//! crates/wedding_site_core/src/guestbook.rs
//!
//! The guestbook composer: a draft phase (relationship, tone, generated message)
//! followed by a commit that prepends an entry to the session's ledger.

use tracing::{error, warn};
use crate::{
    domain::{GuestbookDraft, GuestbookEntry, Ledger, Tone},
    ports::MessageGenerationService,
};

const FAILED_GENERATION_TEXT: &str =
    "Wishing you both a lifetime of love and happiness! So excited to celebrate with you.";
const EMPTY_GENERATION_TEXT: &str = "Wishing you both a lifetime of love and happiness!";

/// Builds the instruction sent to the text-generation provider.
pub fn build_prompt(couple: &str, relationship: &str, tone: Tone) -> String {
    format!(
        "Write a wedding guestbook message for a couple named {couple}.\n\
         The message is from a person who is the \"{relationship}\" of the couple.\n\
         The tone should be \"{tone}\".\n\
         Keep it under 40 words.\n\
         Be specific to the relationship if possible.\n\
         Do not include \"Dear...\" or \"Sincerely...\", just the body of the message."
    )
}

//=========================================================================================
// Generation Outcome
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    MissingCredential,
    ProviderFailed(String),
    EmptyResponse,
}

/// Both arms carry editable text; `reason` is kept for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Generated(String),
    FallbackUsed { text: String, reason: FallbackReason },
}

impl GenerationOutcome {
    pub fn text(&self) -> &str {
        match self {
            GenerationOutcome::Generated(text) => text,
            GenerationOutcome::FallbackUsed { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, GenerationOutcome::FallbackUsed { .. })
    }
}

/// Asks the provider for a message. `provider` is `None` when no credential is
/// configured. Never fails: every error path yields deterministic fallback text.
pub async fn generate_message(
    provider: Option<&dyn MessageGenerationService>,
    prompt: &str,
    couple: &str,
) -> GenerationOutcome {
    let Some(provider) = provider else {
        warn!("No generation credential configured, using fallback message.");
        return GenerationOutcome::FallbackUsed {
            text: format!("Wishing you a lifetime of happiness, {}! (AI Key missing)", couple),
            reason: FallbackReason::MissingCredential,
        };
    };

    match provider.generate_message(prompt).await {
        Ok(text) if !text.trim().is_empty() => GenerationOutcome::Generated(text.trim().to_string()),
        Ok(_) => GenerationOutcome::FallbackUsed {
            text: EMPTY_GENERATION_TEXT.to_string(),
            reason: FallbackReason::EmptyResponse,
        },
        Err(e) => {
            error!("Message generation failed: {}", e);
            GenerationOutcome::FallbackUsed {
                text: FAILED_GENERATION_TEXT.to_string(),
                reason: FallbackReason::ProviderFailed(e.to_string()),
            }
        }
    }
}

//=========================================================================================
// Composer
//=========================================================================================

#[derive(Debug, Clone)]
pub struct GuestbookComposer {
    draft: GuestbookDraft,
    generating: bool,
    ledger: Ledger,
}

impl Default for GuestbookComposer {
    fn default() -> Self {
        Self::new(Ledger::seeded())
    }
}

impl GuestbookComposer {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            draft: GuestbookDraft::default(),
            generating: false,
            ledger,
        }
    }

    pub fn draft(&self) -> &GuestbookDraft {
        &self.draft
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn set_relationship(&mut self, relationship: impl Into<String>) {
        self.draft.relationship = relationship.into();
    }

    pub fn set_tone(&mut self, tone: Tone) {
        self.draft.tone = tone;
    }

    pub fn set_author_name(&mut self, name: impl Into<String>) {
        self.draft.author_name = name.into();
    }

    pub fn edit_message(&mut self, text: impl Into<String>) {
        self.draft.generated_text = text.into();
    }

    pub fn can_generate(&self) -> bool {
        !self.generating && !self.draft.relationship.trim().is_empty()
    }

    /// Marks the composer busy and returns the prompt to send, or `None` when
    /// generation is unavailable.
    pub fn begin_generation(&mut self, couple: &str) -> Option<String> {
        if !self.can_generate() {
            return None;
        }
        self.generating = true;
        Some(build_prompt(couple, self.draft.relationship.trim(), self.draft.tone))
    }

    /// Replaces the editable text with the outcome and clears the busy flag.
    pub fn finish_generation(&mut self, outcome: &GenerationOutcome) {
        self.draft.generated_text = outcome.text().to_string();
        self.generating = false;
    }

    pub fn can_sign(&self) -> bool {
        !self.draft.author_name.trim().is_empty() && !self.draft.generated_text.trim().is_empty()
    }

    /// Commits the draft as a new entry at the front of the ledger, then clears the
    /// draft except for the tone. A no-op when the name or message is empty.
    pub fn sign(&mut self, id: impl Into<String>) -> Option<GuestbookEntry> {
        if !self.can_sign() {
            return None;
        }
        let entry = GuestbookEntry::new(
            id,
            self.draft.author_name.trim(),
            self.draft.generated_text.trim(),
        );
        self.ledger.prepend(entry.clone());

        self.draft.relationship.clear();
        self.draft.generated_text.clear();
        self.draft.author_name.clear();
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;

    const COUPLE: &str = "Lourens and Ané";

    struct FixedProvider(PortResult<String>);

    #[async_trait]
    impl MessageGenerationService for FixedProvider {
        async fn generate_message(&self, _prompt: &str) -> PortResult<String> {
            self.0.clone()
        }
    }

    #[test]
    fn prompt_embeds_relationship_and_tone() {
        let prompt = build_prompt(COUPLE, "Best Friend", Tone::Poetic);
        assert!(prompt.contains("couple named Lourens and Ané"));
        assert!(prompt.contains("\"Best Friend\""));
        assert!(prompt.contains("\"Poetic\""));
        assert!(prompt.contains("under 40 words"));
    }

    #[tokio::test]
    async fn missing_credential_yields_deterministic_fallback() {
        let first = generate_message(None, "prompt", COUPLE).await;
        let second = generate_message(None, "prompt", COUPLE).await;

        assert_eq!(first, second);
        assert!(!first.text().is_empty());
        assert!(matches!(
            first,
            GenerationOutcome::FallbackUsed {
                reason: FallbackReason::MissingCredential,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn provider_failure_yields_distinct_fallback() {
        let provider: &dyn MessageGenerationService =
            &FixedProvider(Err(PortError::Unexpected("quota exceeded".into())));
        let outcome = generate_message(Some(provider), "prompt", COUPLE).await;
        let missing = generate_message(None, "prompt", COUPLE).await;

        assert_eq!(outcome.text(), FAILED_GENERATION_TEXT);
        assert_ne!(outcome.text(), missing.text());
        assert!(outcome.is_fallback());
    }

    #[tokio::test]
    async fn blank_response_falls_back() {
        let provider: &dyn MessageGenerationService = &FixedProvider(Ok("   \n".into()));
        let outcome = generate_message(Some(provider), "prompt", COUPLE).await;
        assert_eq!(
            outcome,
            GenerationOutcome::FallbackUsed {
                text: EMPTY_GENERATION_TEXT.to_string(),
                reason: FallbackReason::EmptyResponse
            }
        );
    }

    #[tokio::test]
    async fn generated_text_is_trimmed() {
        let provider: &dyn MessageGenerationService =
            &FixedProvider(Ok("  So proud of you two!\n".into()));
        let outcome = generate_message(Some(provider), "prompt", COUPLE).await;
        assert_eq!(outcome, GenerationOutcome::Generated("So proud of you two!".into()));
    }

    #[test]
    fn generation_requires_relationship_and_blocks_duplicates() {
        let mut composer = GuestbookComposer::default();
        assert!(composer.begin_generation(COUPLE).is_none());

        composer.set_relationship("Cousin");
        assert!(composer.begin_generation(COUPLE).is_some());
        assert!(composer.is_generating());
        assert!(composer.begin_generation(COUPLE).is_none());

        composer.finish_generation(&GenerationOutcome::Generated("Hi".into()));
        assert!(!composer.is_generating());
        assert_eq!(composer.draft().generated_text, "Hi");
    }

    #[test]
    fn regeneration_replaces_edits() {
        let mut composer = GuestbookComposer::default();
        composer.set_relationship("Colleague");
        composer.begin_generation(COUPLE);
        composer.finish_generation(&GenerationOutcome::Generated("First".into()));
        composer.edit_message("First, edited");

        composer.begin_generation(COUPLE);
        composer.finish_generation(&GenerationOutcome::Generated("Second".into()));
        assert_eq!(composer.draft().generated_text, "Second");
    }

    #[test]
    fn sign_without_author_leaves_ledger_untouched() {
        let mut composer = GuestbookComposer::default();
        composer.edit_message("Congratulations!");
        let before = composer.ledger().clone();

        assert!(composer.sign("42").is_none());
        assert_eq!(composer.ledger(), &before);
        assert_eq!(composer.draft().generated_text, "Congratulations!");
    }

    #[test]
    fn sign_without_message_is_a_no_op() {
        let mut composer = GuestbookComposer::default();
        composer.set_author_name("Uncle Bob");
        composer.edit_message("   ");
        assert!(!composer.can_sign());
        assert!(composer.sign("42").is_none());
        assert_eq!(composer.ledger().len(), 1);
    }

    #[test]
    fn sign_prepends_entry_and_clears_draft_but_keeps_tone() {
        let mut composer = GuestbookComposer::default();
        let previous_first = composer.ledger().entries()[0].clone();
        composer.set_relationship("Best Friend");
        composer.set_tone(Tone::Funny);
        composer.set_author_name("Jamie");
        composer.edit_message("Cheers to you both!");

        let entry = composer.sign("1700000000000").unwrap();

        let entries = composer.ledger().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], entry);
        assert_eq!(entries[0].id(), "1700000000000");
        assert_eq!(entries[0].author_name(), "Jamie");
        assert_eq!(entries[1], previous_first);

        let draft = composer.draft();
        assert!(draft.relationship.is_empty());
        assert!(draft.generated_text.is_empty());
        assert!(draft.author_name.is_empty());
        assert_eq!(draft.tone, Tone::Funny);
    }
}
