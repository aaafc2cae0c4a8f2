//! Step controller for the training form.
//!
//! The wizard owns the current step and the entered values. Everything visible
//! goes through a [`FormView`], so the same controller drives the TUI and the tests.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{FieldError, FormError};
use crate::profile::{Profile, Style};
use crate::store::ProfileStore;
use crate::validation::{validate_field, Feedback, FieldName};

pub const TOTAL_STEPS: usize = 6;

const STEPS: [&[FieldName]; TOTAL_STEPS] = [
    &[FieldName::Name],
    &[FieldName::Field],
    &[FieldName::Approach],
    &[FieldName::Tools],
    &[FieldName::Style],
    &[FieldName::Example],
];

pub const INCOMPLETE_MESSAGE: &str = "Please complete all required fields correctly.";
pub const SUCCESS_MESSAGE: &str = "Training completed successfully!";
pub const SAVE_FAILED_MESSAGE: &str = "Could not save your training data.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Success,
    Error,
}

/// Which forward control the current step offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Next,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub prev_enabled: bool,
    pub action: StepAction,
}

/// Rendering surface the wizard drives.
pub trait FormView {
    fn show_step(&mut self, step: usize, fields: &[FieldName]);
    fn set_progress(&mut self, percent: u16, completed: usize, total: usize);
    fn set_feedback(&mut self, field: FieldName, feedback: Feedback);
    fn set_navigation(&mut self, navigation: Navigation);
    fn set_submitting(&mut self, submitting: bool);
    fn show_success(&mut self);
    fn notify(&mut self, message: &str, level: NotifyLevel);
}

/// Fields shown on a 1-based step.
pub fn step_fields(step: usize) -> &'static [FieldName] {
    step.checked_sub(1)
        .and_then(|i| STEPS.get(i))
        .copied()
        .unwrap_or(&[])
}

#[derive(Debug, Clone)]
pub struct FormWizard {
    current_step: usize,
    values: HashMap<FieldName, String>,
    submitting: bool,
}

impl Default for FormWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl FormWizard {
    pub fn new() -> Self {
        Self {
            current_step: 1,
            values: HashMap::new(),
            submitting: false,
        }
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        TOTAL_STEPS
    }

    pub fn is_final_step(&self) -> bool {
        self.current_step == TOTAL_STEPS
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn current_fields(&self) -> &'static [FieldName] {
        step_fields(self.current_step)
    }

    pub fn value(&self, field: FieldName) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn set_value(&mut self, field: FieldName, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Push the current step, progress, and navigation to the view.
    pub fn render(&self, view: &mut impl FormView) {
        view.show_step(self.current_step, self.current_fields());

        let completed = self.current_step - 1;
        let percent = (completed * 100 / TOTAL_STEPS) as u16;
        view.set_progress(percent, completed, TOTAL_STEPS);

        view.set_navigation(Navigation {
            prev_enabled: self.current_step > 1,
            action: if self.is_final_step() {
                StepAction::Submit
            } else {
                StepAction::Next
            },
        });
    }

    /// Validate one field and show the outcome in its feedback slot.
    pub fn validate(&self, field: FieldName, view: &mut impl FormView) -> Result<(), FieldError> {
        let result = validate_field(field, self.value(field));
        view.set_feedback(field, Feedback::for_result(field, result));
        result
    }

    /// Leaving a field validates it straight away.
    pub fn blur(&self, field: FieldName, view: &mut impl FormView) -> Result<(), FieldError> {
        self.validate(field, view)
    }

    /// Debounced check after typing settles: clear, then validate whatever is there now.
    pub fn recheck(&self, field: FieldName, view: &mut impl FormView) {
        view.set_feedback(field, Feedback::None);
        if !self.value(field).trim().is_empty() {
            let _ = self.validate(field, view);
        }
    }

    fn validate_fields(
        &self,
        fields: &[FieldName],
        view: &mut impl FormView,
    ) -> Vec<(FieldName, FieldError)> {
        fields
            .iter()
            .filter_map(|&field| self.validate(field, view).err().map(|e| (field, e)))
            .collect()
    }

    /// Advance one step if every field on the current step is valid.
    ///
    /// Returns the new step. On failure the step is unchanged.
    pub fn next(&mut self, view: &mut impl FormView) -> Result<usize, FormError> {
        let errors = self.validate_fields(self.current_fields(), view);
        if !errors.is_empty() {
            debug!(step = self.current_step, invalid = errors.len(), "step blocked");
            return Err(FormError::InvalidStep {
                step: self.current_step,
                errors,
            });
        }

        if self.current_step < TOTAL_STEPS {
            self.current_step += 1;
            self.render(view);
        }
        Ok(self.current_step)
    }

    /// Go back one step without validating. Returns false at step 1.
    pub fn previous(&mut self, view: &mut impl FormView) -> bool {
        if self.current_step <= 1 {
            return false;
        }
        self.current_step -= 1;
        self.render(view);
        true
    }

    /// First half of submit: validate everything and build the record.
    ///
    /// Nothing is written here. The view is put into its submitting state so
    /// the caller can hold it there before calling [`complete_submission`].
    ///
    /// [`complete_submission`]: FormWizard::complete_submission
    pub fn prepare_submission(
        &mut self,
        view: &mut impl FormView,
        now: DateTime<Utc>,
    ) -> Result<Profile, FormError> {
        if !self.is_final_step() {
            return Err(FormError::NotAtFinalStep);
        }

        let errors = self.validate_fields(&FieldName::all(), view);
        if !errors.is_empty() {
            warn!(invalid = errors.len(), "submission rejected");
            view.notify(INCOMPLETE_MESSAGE, NotifyLevel::Error);
            return Err(FormError::IncompleteForm { errors });
        }

        self.submitting = true;
        view.set_submitting(true);

        Ok(Profile {
            name: self.value(FieldName::Name).to_string(),
            field: self.value(FieldName::Field).to_string(),
            approach: self.value(FieldName::Approach).to_string(),
            tools: self.value(FieldName::Tools).to_string(),
            style: Style::from_str(self.value(FieldName::Style)),
            example: self.value(FieldName::Example).to_string(),
            timestamp: now,
            trained: true,
        })
    }

    /// Second half of submit: persist the record and show the success view.
    pub fn complete_submission(
        &mut self,
        profile: &Profile,
        store: &mut dyn ProfileStore,
        view: &mut impl FormView,
    ) -> Result<(), FormError> {
        self.submitting = false;
        view.set_submitting(false);

        if let Err(e) = store.save(profile) {
            warn!(error = %e, "failed to save profile");
            view.notify(SAVE_FAILED_MESSAGE, NotifyLevel::Error);
            return Err(e.into());
        }

        info!(name = %profile.name, "training complete");
        view.show_success();
        view.notify(SUCCESS_MESSAGE, NotifyLevel::Success);
        Ok(())
    }

    /// Validate, persist, and show success with no pause in between.
    pub fn submit(
        &mut self,
        view: &mut impl FormView,
        store: &mut dyn ProfileStore,
        now: DateTime<Utc>,
    ) -> Result<Profile, FormError> {
        let profile = self.prepare_submission(view, now)?;
        self.complete_submission(&profile, store, view)?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryProfileStore;

    /// Records every call the wizard makes.
    #[derive(Default)]
    struct RecordingView {
        step: usize,
        progress: (u16, usize, usize),
        feedback: HashMap<FieldName, Feedback>,
        navigation: Option<Navigation>,
        submitting: bool,
        success: bool,
        notices: Vec<(String, NotifyLevel)>,
    }

    impl FormView for RecordingView {
        fn show_step(&mut self, step: usize, _fields: &[FieldName]) {
            self.step = step;
        }
        fn set_progress(&mut self, percent: u16, completed: usize, total: usize) {
            self.progress = (percent, completed, total);
        }
        fn set_feedback(&mut self, field: FieldName, feedback: Feedback) {
            self.feedback.insert(field, feedback);
        }
        fn set_navigation(&mut self, navigation: Navigation) {
            self.navigation = Some(navigation);
        }
        fn set_submitting(&mut self, submitting: bool) {
            self.submitting = submitting;
        }
        fn show_success(&mut self) {
            self.success = true;
        }
        fn notify(&mut self, message: &str, level: NotifyLevel) {
            self.notices.push((message.to_string(), level));
        }
    }

    struct FailingStore;

    impl ProfileStore for FailingStore {
        fn load(&self) -> crate::error::Result<Option<Profile>> {
            Ok(None)
        }
        fn save(&mut self, _profile: &Profile) -> crate::error::Result<()> {
            Err(StoreError::NoDataDir)
        }
    }

    fn valid_value(field: FieldName) -> String {
        match field {
            FieldName::Name => "Jordan Lee".to_string(),
            FieldName::Field => "Design".to_string(),
            FieldName::Approach => {
                "I start by sketching, then work through it in a systematic way".to_string()
            }
            FieldName::Tools => "Figma, whiteboards".to_string(),
            FieldName::Style => "casual".to_string(),
            FieldName::Example => "x".repeat(120),
        }
    }

    fn filled_wizard() -> FormWizard {
        let mut wizard = FormWizard::new();
        for field in FieldName::all() {
            wizard.set_value(field, valid_value(field));
        }
        wizard
    }

    fn now() -> DateTime<Utc> {
        "2025-03-04T05:06:07Z".parse().unwrap()
    }

    #[test]
    fn test_initial_render() {
        let wizard = FormWizard::new();
        let mut view = RecordingView::default();
        wizard.render(&mut view);

        assert_eq!(view.step, 1);
        assert_eq!(view.progress, (0, 0, 6));
        assert_eq!(
            view.navigation,
            Some(Navigation { prev_enabled: false, action: StepAction::Next })
        );
    }

    #[test]
    fn test_next_blocks_on_invalid_step() {
        let mut wizard = FormWizard::new();
        let mut view = RecordingView::default();
        wizard.set_value(FieldName::Name, "J");

        let err = wizard.next(&mut view).unwrap_err();
        match err {
            FormError::InvalidStep { step, errors } => {
                assert_eq!(step, 1);
                assert_eq!(
                    errors,
                    vec![(FieldName::Name, FieldError::TooShort { min: 2, actual: 1 })]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(wizard.current_step(), 1);
        assert_eq!(
            view.feedback[&FieldName::Name],
            Feedback::Invalid("Please enter your full name (at least 2 characters)")
        );
    }

    #[test]
    fn test_next_succeeds_iff_step_valid() {
        for step in 1..TOTAL_STEPS {
            let mut wizard = filled_wizard();
            let mut view = RecordingView::default();
            wizard.current_step = step;

            assert_eq!(wizard.next(&mut view).unwrap(), step + 1);

            let field = step_fields(step)[0];
            wizard.current_step = step;
            wizard.set_value(field, "");
            assert!(wizard.next(&mut view).is_err());
            assert_eq!(wizard.current_step(), step);
        }
    }

    #[test]
    fn test_next_only_checks_current_step() {
        let mut wizard = FormWizard::new();
        let mut view = RecordingView::default();
        wizard.set_value(FieldName::Name, "Jordan");

        assert_eq!(wizard.next(&mut view).unwrap(), 2);
        assert!(!view.feedback.contains_key(&FieldName::Field));
    }

    #[test]
    fn test_next_at_final_step_stays() {
        let mut wizard = filled_wizard();
        let mut view = RecordingView::default();
        wizard.current_step = TOTAL_STEPS;
        assert_eq!(wizard.next(&mut view).unwrap(), TOTAL_STEPS);
    }

    #[test]
    fn test_previous_never_validates() {
        let mut wizard = FormWizard::new();
        let mut view = RecordingView::default();
        assert!(!wizard.previous(&mut view));
        assert_eq!(wizard.current_step(), 1);

        wizard.current_step = 4;
        assert!(wizard.previous(&mut view));
        assert_eq!(wizard.current_step(), 3);
        assert!(view.feedback.is_empty());
        assert_eq!(view.progress, (33, 2, 6));
    }

    #[test]
    fn test_final_step_offers_submit() {
        let mut wizard = filled_wizard();
        let mut view = RecordingView::default();
        for _ in 1..TOTAL_STEPS {
            wizard.next(&mut view).unwrap();
        }
        assert!(wizard.is_final_step());
        assert_eq!(
            view.navigation,
            Some(Navigation { prev_enabled: true, action: StepAction::Submit })
        );
        assert_eq!(view.progress, (83, 5, 6));
    }

    #[test]
    fn test_submit_before_final_step() {
        let mut wizard = filled_wizard();
        let mut view = RecordingView::default();
        let mut store = MemoryProfileStore::new();

        let err = wizard.submit(&mut view, &mut store, now()).unwrap_err();
        assert!(matches!(err, FormError::NotAtFinalStep));
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_submit_persists_exact_values() {
        let mut wizard = filled_wizard();
        wizard.current_step = TOTAL_STEPS;
        let mut view = RecordingView::default();
        let mut store = MemoryProfileStore::new();

        wizard.submit(&mut view, &mut store, now()).unwrap();

        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.name, "Jordan Lee");
        assert_eq!(saved.field, "Design");
        assert_eq!(saved.approach, valid_value(FieldName::Approach));
        assert_eq!(saved.tools, "Figma, whiteboards");
        assert_eq!(saved.style, Some(Style::Casual));
        assert_eq!(saved.example, "x".repeat(120));
        assert_eq!(saved.timestamp, now());
        assert!(saved.trained);

        assert!(view.success);
        assert!(!view.submitting);
        assert_eq!(view.notices, vec![(SUCCESS_MESSAGE.to_string(), NotifyLevel::Success)]);
    }

    #[test]
    fn test_submit_rechecks_every_step() {
        let mut wizard = filled_wizard();
        wizard.current_step = TOTAL_STEPS;
        wizard.set_value(FieldName::Tools, "pen");
        let mut view = RecordingView::default();
        let mut store = MemoryProfileStore::new();

        let err = wizard.submit(&mut view, &mut store, now()).unwrap_err();
        match err {
            FormError::IncompleteForm { errors } => {
                assert_eq!(
                    errors,
                    vec![(FieldName::Tools, FieldError::TooShort { min: 5, actual: 3 })]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.writes(), 0);
        assert!(!view.success);
        assert_eq!(view.notices, vec![(INCOMPLETE_MESSAGE.to_string(), NotifyLevel::Error)]);
    }

    #[test]
    fn test_two_phase_submit_holds_submitting_state() {
        let mut wizard = filled_wizard();
        wizard.current_step = TOTAL_STEPS;
        let mut view = RecordingView::default();
        let mut store = MemoryProfileStore::new();

        let profile = wizard.prepare_submission(&mut view, now()).unwrap();
        assert!(wizard.is_submitting());
        assert!(view.submitting);
        assert_eq!(store.writes(), 0);

        wizard.complete_submission(&profile, &mut store, &mut view).unwrap();
        assert!(!wizard.is_submitting());
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_store_failure_reports_error() {
        let mut wizard = filled_wizard();
        wizard.current_step = TOTAL_STEPS;
        let mut view = RecordingView::default();

        let err = wizard.submit(&mut view, &mut FailingStore, now()).unwrap_err();
        assert!(matches!(err, FormError::Store(_)));
        assert!(!view.success);
        assert_eq!(view.notices, vec![(SAVE_FAILED_MESSAGE.to_string(), NotifyLevel::Error)]);
    }

    #[test]
    fn test_recheck_clears_then_validates() {
        let mut wizard = FormWizard::new();
        let mut view = RecordingView::default();

        wizard.recheck(FieldName::Field, &mut view);
        assert_eq!(view.feedback[&FieldName::Field], Feedback::None);

        wizard.set_value(FieldName::Field, "Law");
        wizard.recheck(FieldName::Field, &mut view);
        assert_eq!(view.feedback[&FieldName::Field], Feedback::Valid);
    }

    #[test]
    fn test_blur_flags_empty_field() {
        let wizard = FormWizard::new();
        let mut view = RecordingView::default();

        assert_eq!(wizard.blur(FieldName::Style, &mut view), Err(FieldError::Required));
        assert_eq!(
            view.feedback[&FieldName::Style],
            Feedback::Invalid("Please select your communication style")
        );
    }

    #[test]
    fn test_step_fields_bounds() {
        assert_eq!(step_fields(0), &[] as &[FieldName]);
        assert_eq!(step_fields(1), &[FieldName::Name]);
        assert_eq!(step_fields(6), &[FieldName::Example]);
        assert_eq!(step_fields(7), &[] as &[FieldName]);
    }
}
