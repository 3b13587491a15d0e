// Core types for the wizard step sequence

/// What kind of inbound payload a step accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A document upload; only PDFs are accepted.
    File,
    /// Any non-empty text message.
    FreeText,
    /// A text message holding an EVM wallet address.
    WalletAddress,
}

/// External verification applied to a raw answer before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichKind {
    None,
    /// Move the uploaded document to long-term storage, store the public link.
    RelocateDocument,
    /// Check the on-chain token balance of the address, store the address.
    VerifyWalletBalance,
}

/// Immutable definition of one question in the sequence.
#[derive(Debug, Clone)]
pub struct StepSpec {
    pub index: usize,
    /// Display text. `{min}` and `{symbol}` are substituted from the wallet
    /// policy when the prompt is rendered.
    pub prompt: &'static str,
    pub input: InputKind,
    pub skippable: bool,
    /// Answer recorded when the step is skipped.
    pub skip_placeholder: &'static str,
    pub enrich: EnrichKind,
}

static STEPS: [StepSpec; 5] = [
    StepSpec {
        index: 0,
        prompt: "Welcome to PitchDesk! We collect a short application to assess \
                 whether our fund is a fit for your project.\n\n\
                 [1/5] First, please upload your pitch deck as a PDF.",
        input: InputKind::File,
        skippable: true,
        skip_placeholder: "Not provided",
        enrich: EnrichKind::RelocateDocument,
    },
    StepSpec {
        index: 1,
        prompt: "[2/5] What is your LinkedIn profile? Please send the full URL \
                 (e.g. https://www.linkedin.com/in/username).",
        input: InputKind::FreeText,
        skippable: true,
        skip_placeholder: "Not provided",
        enrich: EnrichKind::None,
    },
    StepSpec {
        index: 2,
        prompt: "[3/5] What is your GitHub profile? Please send the full URL \
                 (e.g. https://github.com/username).",
        input: InputKind::FreeText,
        skippable: true,
        skip_placeholder: "Not provided",
        enrich: EnrichKind::None,
    },
    StepSpec {
        index: 3,
        prompt: "[4/5] We require that your wallet holds at least {min} {symbol}. \
                 Please send the wallet address holding your tokens:",
        input: InputKind::WalletAddress,
        skippable: false,
        skip_placeholder: "Not provided",
        enrich: EnrichKind::VerifyWalletBalance,
    },
    StepSpec {
        index: 4,
        prompt: "[5/5] Do you have any additional materials to share? For example \
                 a whitepaper or tokenomics. (Upload a PDF if you do.)",
        input: InputKind::File,
        skippable: true,
        skip_placeholder: "None",
        enrich: EnrichKind::RelocateDocument,
    },
];

/// Static ordered lookup table for the five questions.
///
/// Indices are dense `0..count()`; `step_at` never fails for an in-range
/// index.
#[derive(Debug, Clone, Default)]
pub struct StepRegistry;

impl StepRegistry {
    pub fn new() -> Self {
        Self
    }

    pub fn step_at(&self, index: usize) -> &'static StepSpec {
        &STEPS[index]
    }

    pub fn count(&self) -> usize {
        STEPS.len()
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 == STEPS.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_dense() {
        let registry = StepRegistry::new();
        for i in 0..registry.count() {
            assert_eq!(registry.step_at(i).index, i);
        }
    }

    #[test]
    fn only_wallet_step_is_unskippable() {
        let registry = StepRegistry::new();
        for i in 0..registry.count() {
            let step = registry.step_at(i);
            assert_eq!(step.skippable, i != 3, "step {i}");
            if i == 3 {
                assert_eq!(step.input, InputKind::WalletAddress);
                assert_eq!(step.enrich, EnrichKind::VerifyWalletBalance);
            }
        }
    }

    #[test]
    fn is_last_matches_count() {
        let registry = StepRegistry::new();
        assert!(registry.is_last(registry.count() - 1));
        assert!(!registry.is_last(0));
    }
}
