//! Checkout step state machine.
//!
//! Steps advance billing → shipping → payment → review. Each step's form
//! registers its own validator, so the controller gates advancement
//! without knowing form internals. Validation never mutates the draft.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use super::CheckoutDraft;

/// A checkout step. Indices are 1-based to match the step indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Billing,
    Shipping,
    Payment,
    Review,
}

impl CheckoutStep {
    /// All steps in flow order.
    pub const ALL: [Self; 4] = [Self::Billing, Self::Shipping, Self::Payment, Self::Review];

    /// 1-based position in the flow.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Billing => 1,
            Self::Shipping => 2,
            Self::Payment => 3,
            Self::Review => 4,
        }
    }

    /// Step for a 1-based index, if in bounds.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Self::Billing),
            2 => Some(Self::Shipping),
            3 => Some(Self::Payment),
            4 => Some(Self::Review),
            _ => None,
        }
    }

    /// Stable key used for validator registration and logging.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Billing => "billing",
            Self::Shipping => "shipping",
            Self::Payment => "payment",
            Self::Review => "review",
        }
    }

    /// The following step, or `None` at the end of the flow.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// The preceding step, or `None` at the start of the flow.
    #[must_use]
    pub const fn back(self) -> Option<Self> {
        match self {
            Self::Billing => None,
            Self::Shipping => Some(Self::Billing),
            Self::Payment => Some(Self::Shipping),
            Self::Review => Some(Self::Payment),
        }
    }

    /// Whether this is the final (review) step.
    #[must_use]
    pub const fn is_last(self) -> bool {
        matches!(self, Self::Review)
    }
}

/// Outcome of a step validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepVerdict {
    Valid,
    /// The step stays put; `focus` optionally names the field the UI
    /// should focus.
    Invalid { focus: Option<String> },
}

impl StepVerdict {
    /// An invalid verdict focusing the given field.
    pub fn invalid(focus: impl Into<String>) -> Self {
        Self::Invalid {
            focus: Some(focus.into()),
        }
    }

    /// Whether the step may advance.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl From<bool> for StepVerdict {
    fn from(valid: bool) -> Self {
        if valid {
            Self::Valid
        } else {
            Self::Invalid { focus: None }
        }
    }
}

/// Per-step validation contributed by the step's form.
///
/// `validate` returns a boxed future so a validator may run a remote
/// check (e.g. delivery availability for the entered area).
pub trait StepValidator: Send + Sync {
    fn validate<'a>(
        &'a self,
        draft: &'a CheckoutDraft,
    ) -> Pin<Box<dyn Future<Output = StepVerdict> + Send + 'a>>;
}

struct FnValidator<F>(F);

impl<F> StepValidator for FnValidator<F>
where
    F: Fn(&CheckoutDraft) -> StepVerdict + Send + Sync,
{
    fn validate<'a>(
        &'a self,
        draft: &'a CheckoutDraft,
    ) -> Pin<Box<dyn Future<Output = StepVerdict> + Send + 'a>> {
        let verdict = (self.0)(draft);
        Box::pin(std::future::ready(verdict))
    }
}

/// Wrap a synchronous closure as a [`StepValidator`].
pub fn validator_fn<F>(f: F) -> Box<dyn StepValidator>
where
    F: Fn(&CheckoutDraft) -> StepVerdict + Send + Sync + 'static,
{
    Box::new(FnValidator(f))
}

/// Result of [`StepController::go_next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Validation passed (or no validator was registered); now on this
    /// step.
    Moved(CheckoutStep),
    /// Validation failed; the active step is unchanged.
    Blocked { focus: Option<String> },
}

/// The step state machine.
#[derive(Default)]
pub struct StepController {
    active: CheckoutStep,
    validators: HashMap<CheckoutStep, Box<dyn StepValidator>>,
}

impl StepController {
    /// A controller at the first step with no validators.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A controller resuming at the given step (e.g. from a hydrated
    /// draft).
    #[must_use]
    pub fn starting_at(step: CheckoutStep) -> Self {
        Self {
            active: step,
            validators: HashMap::new(),
        }
    }

    /// The current step.
    #[must_use]
    pub const fn active(&self) -> CheckoutStep {
        self.active
    }

    /// Register (or replace) the validator for a step.
    pub fn register_validator(&mut self, step: CheckoutStep, validator: Box<dyn StepValidator>) {
        self.validators.insert(step, validator);
    }

    /// Remove a step's validator, returning whether one was registered.
    pub fn unregister_validator(&mut self, step: CheckoutStep) -> bool {
        self.validators.remove(&step).is_some()
    }

    /// Validate the current step and advance on success (clamped at the
    /// final step). On failure the step is unchanged and the verdict's
    /// focus target is surfaced.
    pub async fn go_next(&mut self, draft: &CheckoutDraft) -> Advance {
        if let Some(validator) = self.validators.get(&self.active) {
            if let StepVerdict::Invalid { focus } = validator.validate(draft).await {
                return Advance::Blocked { focus };
            }
        }

        self.active = self.active.next().unwrap_or(self.active);
        Advance::Moved(self.active)
    }

    /// Step back without validation (clamped at the first step).
    pub fn go_back(&mut self) -> CheckoutStep {
        self.active = self.active.back().unwrap_or(self.active);
        self.active
    }

    /// Jump directly to a step, bypassing validation.
    ///
    /// Intended for step-indicator clicks on already-completed steps; the
    /// caller enforces that restriction.
    pub fn set_step(&mut self, step: CheckoutStep) -> CheckoutStep {
        self.active = step;
        self.active
    }
}
