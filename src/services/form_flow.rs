use chrono::NaiveDate;
use tracing::{debug, info};

use crate::api::KycBackend;
use crate::errors::{AppError, Result};
use crate::models::form::{FormField, KycForm, WizardTab};
use crate::models::kyc::KycSubmission;
use crate::services::kyc_store::{KycState, KycStore};
use crate::utils::validation::{self, FieldErrors, Validator};

/// Whether the wizard creates a submission or resends a rejected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowMode {
    NewSubmission,
    Resubmission { kyc_id: u64 },
}

/// Where the lawyer is, combining the local tab with store progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    Editing(WizardTab),
    Resubmitting(WizardTab),
    Submitting,
    Submitted,
}

/// Four-tab KYC wizard.
///
/// Holds the draft across tab switches, validates a tab before moving past
/// it and sends exactly one submission once the declaration is confirmed.
#[derive(Debug, Clone)]
pub struct KycWizard {
    tab: WizardTab,
    form: KycForm,
    errors: FieldErrors,
    mode: FlowMode,
    today: NaiveDate,
    sent: bool,
}

impl Default for KycWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl KycWizard {
    pub fn new() -> Self {
        Self::starting_on(validation::today())
    }

    /// Same as [`KycWizard::new`] with a fixed "today" for the age check.
    pub fn starting_on(today: NaiveDate) -> Self {
        Self {
            tab: WizardTab::Personal,
            form: KycForm::default(),
            errors: FieldErrors::new(),
            mode: FlowMode::NewSubmission,
            today,
            sent: false,
        }
    }

    /// Re-opens a rejected submission for editing.
    pub fn resume(submission: &KycSubmission) -> Result<Self> {
        Self::resume_on(submission, validation::today())
    }

    pub fn resume_on(submission: &KycSubmission, today: NaiveDate) -> Result<Self> {
        submission.status.resubmit()?;
        info!(kyc_id = submission.id, "reopening rejected KYC for resubmission");
        Ok(Self {
            form: KycForm::from_submission(submission),
            mode: FlowMode::Resubmission { kyc_id: submission.id },
            ..Self::starting_on(today)
        })
    }

    pub fn tab(&self) -> WizardTab {
        self.tab
    }

    pub fn mode(&self) -> FlowMode {
        self.mode
    }

    pub fn form(&self) -> &KycForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: FormField) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn has_been_sent(&self) -> bool {
        self.sent
    }

    /// Applies an edit to `field` and re-validates it.
    pub fn edit(&mut self, field: FormField, change: impl FnOnce(&mut KycForm)) -> Option<&str> {
        change(&mut self.form);
        self.validate_field(field)
    }

    /// Blur-time check of a single field.
    pub fn validate_field(&mut self, field: FormField) -> Option<&str> {
        match Validator::check_field(&self.form, field, self.today) {
            Some(message) => self.errors.insert(field, message),
            None => {
                self.errors.remove(field);
            }
        }
        self.errors.get(field)
    }

    /// Validates the current tab and moves to the next one if it is clean.
    /// On the last tab a clean result leaves the wizard where it is.
    pub fn advance(&mut self) -> std::result::Result<WizardTab, FieldErrors> {
        self.check_tab(self.tab)?;
        if let Some(next) = self.tab.next() {
            debug!(from = self.tab.key(), to = next.key(), "wizard advanced");
            self.tab = next;
        }
        Ok(self.tab)
    }

    /// Steps back one tab without touching any entered value.
    pub fn back(&mut self) -> WizardTab {
        if let Some(previous) = self.tab.previous() {
            self.tab = previous;
        }
        self.tab
    }

    /// Jumps to `target`. Going back is always allowed; going forward walks
    /// through each intermediate tab and stops on the first one that fails.
    pub fn select_tab(&mut self, target: WizardTab) -> std::result::Result<WizardTab, FieldErrors> {
        while self.tab < target {
            self.advance()?;
        }
        self.tab = target;
        Ok(self.tab)
    }

    /// Validates every tab and sends the form through `store`: a first
    /// submission, or an update when resubmitting.
    pub async fn submit<B: KycBackend>(&mut self, store: &KycStore<B>) -> Result<KycSubmission> {
        if self.sent {
            return Err(AppError::ValidationError("KYC has already been submitted".to_string()));
        }
        if self.in_flight(&store.state().await) {
            return Err(AppError::ValidationError("Submission already in progress".to_string()));
        }

        for tab in WizardTab::ALL {
            if let Err(errors) = self.check_tab(tab) {
                self.tab = tab;
                return Err(AppError::ValidationError(errors.to_string()));
            }
        }

        let result = match self.mode {
            FlowMode::NewSubmission => store.submit_on(&self.form, self.today).await,
            FlowMode::Resubmission { .. } => store.update_on(&self.form, self.today).await,
        };
        let submission = result?;
        self.sent = true;
        info!(kyc_id = submission.id, status = %submission.status, "KYC sent for review");
        Ok(submission)
    }

    pub fn phase(&self, state: &KycState) -> FlowPhase {
        if self.in_flight(state) {
            return FlowPhase::Submitting;
        }
        if self.sent {
            return FlowPhase::Submitted;
        }
        match self.mode {
            FlowMode::NewSubmission => FlowPhase::Editing(self.tab),
            FlowMode::Resubmission { .. } => FlowPhase::Resubmitting(self.tab),
        }
    }

    fn in_flight(&self, state: &KycState) -> bool {
        match self.mode {
            FlowMode::NewSubmission => state.submit.is_loading(),
            FlowMode::Resubmission { .. } => state.update.is_loading(),
        }
    }

    fn check_tab(&mut self, tab: WizardTab) -> std::result::Result<(), FieldErrors> {
        let errors = Validator::validate_tab(&self.form, tab, self.today);
        self.errors.clear_tab(tab);
        if errors.is_empty() {
            return Ok(());
        }
        debug!(tab = tab.key(), invalid = errors.len(), "tab has invalid fields");
        self.errors.extend(errors.clone());
        Err(errors)
    }
}
