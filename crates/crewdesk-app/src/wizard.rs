// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! One state machine shared by every multi-step dialog.

use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Choice(Vec<String>),
}

/// A single input as the shell should render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    pub required: bool,
    pub kind: FieldKind,
}

impl FormField {
    pub fn text(key: &'static str, label: &'static str, value: &str) -> Self {
        Self {
            key,
            label,
            value: value.to_owned(),
            required: false,
            kind: FieldKind::Text,
        }
    }

    pub fn date(key: &'static str, label: &'static str, value: &str) -> Self {
        Self {
            kind: FieldKind::Date,
            ..Self::text(key, label, value)
        }
    }

    pub fn choice(
        key: &'static str,
        label: &'static str,
        value: &str,
        options: &[impl AsRef<str>],
    ) -> Self {
        Self {
            kind: FieldKind::Choice(
                options
                    .iter()
                    .map(|option| option.as_ref().to_owned())
                    .collect(),
            ),
            ..Self::text(key, label, value)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Next (or previous) option of a choice field, wrapping. An unknown
    /// current value starts from the first option.
    pub fn cycle_choice(&self, delta: isize) -> Option<String> {
        let FieldKind::Choice(options) = &self.kind else {
            return None;
        };
        if options.is_empty() {
            return None;
        }
        let len = options.len() as isize;
        let next = match options.iter().position(|option| *option == self.value) {
            Some(current) => (current as isize + delta).rem_euclid(len),
            None if delta < 0 => len - 1,
            None => 0,
        };
        Some(options[next as usize].clone())
    }
}

/// Field set of one dialog. Steps are 1-based.
pub trait WizardForm: Clone {
    type Output;

    fn step_count(&self) -> usize;

    /// Required-field predicate for `step`.
    fn step_complete(&self, step: usize) -> bool;

    fn fields(&self, step: usize) -> Vec<FormField>;

    /// Returns false for keys the form does not know.
    fn set_field(&mut self, key: &str, value: &str) -> bool;

    /// `None` when the values do not convert into an output.
    fn output(&self) -> Option<Self::Output>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardCommand {
    Open,
    Close,
    Advance,
    Retreat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    Opened,
    Closed,
    StepChanged { step: usize, total: usize },
    AdvanceRefused { step: usize },
    CommitRefused { step: usize },
    CommitFailed(String),
    Committed,
}

impl WizardEvent {
    pub fn message(&self) -> String {
        match self {
            Self::Opened => "dialog open".to_owned(),
            Self::Closed => "dialog closed".to_owned(),
            Self::StepChanged { step, total } => format!("step {step} of {total}"),
            Self::AdvanceRefused { step } => {
                format!("step {step} incomplete -- fill the required fields")
            }
            Self::CommitRefused { step } => {
                format!("cannot submit from step {step} -- complete every step first")
            }
            Self::CommitFailed(error) => format!("submit failed: {error}"),
            Self::Committed => "submitted".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wizard<F> {
    defaults: F,
    form: F,
    step: usize,
    open: bool,
}

impl<F: WizardForm> Wizard<F> {
    pub fn new(defaults: F) -> Self {
        Self {
            form: defaults.clone(),
            defaults,
            step: 1,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn total_steps(&self) -> usize {
        self.form.step_count()
    }

    pub fn is_last_step(&self) -> bool {
        self.step >= self.total_steps()
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    /// Mutable access to the in-progress values; `None` while closed.
    pub fn form_mut(&mut self) -> Option<&mut F> {
        self.open.then_some(&mut self.form)
    }

    pub fn can_advance(&self) -> bool {
        self.open && !self.is_last_step() && self.form.step_complete(self.step)
    }

    pub fn can_commit(&self) -> bool {
        self.open
            && self.is_last_step()
            && (1..=self.total_steps()).all(|step| self.form.step_complete(step))
    }

    pub fn current_fields(&self) -> Vec<FormField> {
        self.form.fields(self.step)
    }

    pub fn set_field(&mut self, key: &str, value: &str) -> bool {
        self.open && self.form.set_field(key, value)
    }

    pub fn dispatch(&mut self, command: WizardCommand) -> Vec<WizardEvent> {
        match command {
            WizardCommand::Open => {
                if self.open {
                    return Vec::new();
                }
                self.open = true;
                vec![WizardEvent::Opened, self.step_changed()]
            }
            WizardCommand::Close => {
                if !self.open {
                    return Vec::new();
                }
                self.reset();
                vec![WizardEvent::Closed]
            }
            WizardCommand::Advance => {
                if !self.open {
                    return Vec::new();
                }
                if !self.can_advance() {
                    return vec![WizardEvent::AdvanceRefused { step: self.step }];
                }
                self.step += 1;
                vec![self.step_changed()]
            }
            WizardCommand::Retreat => {
                if !self.open || self.step <= 1 {
                    return Vec::new();
                }
                self.step -= 1;
                vec![self.step_changed()]
            }
        }
    }

    /// Opens with dialog-specific defaults, e.g. a status form preset to the
    /// lead's current status. The defaults also become the reset target.
    pub fn open_with(&mut self, defaults: F) -> Vec<WizardEvent> {
        self.defaults = defaults;
        self.form = self.defaults.clone();
        self.step = 1;
        self.open = false;
        self.dispatch(WizardCommand::Open)
    }

    /// Hands the output to `on_commit`. On success the wizard resets and
    /// closes; on failure it stays open on the last step with every value
    /// intact.
    pub fn commit<T>(
        &mut self,
        on_commit: impl FnOnce(F::Output) -> Result<T>,
    ) -> (Vec<WizardEvent>, Option<T>) {
        if !self.can_commit() {
            return (vec![WizardEvent::CommitRefused { step: self.step }], None);
        }
        let Some(output) = self.form.output() else {
            return (vec![WizardEvent::CommitRefused { step: self.step }], None);
        };

        match on_commit(output) {
            Ok(value) => {
                self.reset();
                (vec![WizardEvent::Committed, WizardEvent::Closed], Some(value))
            }
            Err(error) => (vec![WizardEvent::CommitFailed(format!("{error:#}"))], None),
        }
    }

    fn reset(&mut self) {
        self.form = self.defaults.clone();
        self.step = 1;
        self.open = false;
    }

    fn step_changed(&self) -> WizardEvent {
        WizardEvent::StepChanged {
            step: self.step,
            total: self.total_steps(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldKind, FormField, Wizard, WizardCommand, WizardEvent, WizardForm};
    use anyhow::bail;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct TwoStep {
        first: String,
        second: String,
    }

    impl WizardForm for TwoStep {
        type Output = (String, String);

        fn step_count(&self) -> usize {
            2
        }

        fn step_complete(&self, step: usize) -> bool {
            match step {
                1 => !self.first.trim().is_empty(),
                _ => true,
            }
        }

        fn fields(&self, step: usize) -> Vec<FormField> {
            match step {
                1 => vec![FormField::text("first", "First", &self.first).required()],
                _ => vec![FormField::text("second", "Second", &self.second)],
            }
        }

        fn set_field(&mut self, key: &str, value: &str) -> bool {
            match key {
                "first" => self.first = value.to_owned(),
                "second" => self.second = value.to_owned(),
                _ => return false,
            }
            true
        }

        fn output(&self) -> Option<Self::Output> {
            Some((self.first.clone(), self.second.clone()))
        }
    }

    fn opened() -> Wizard<TwoStep> {
        let mut wizard = Wizard::new(TwoStep::default());
        wizard.dispatch(WizardCommand::Open);
        wizard
    }

    #[test]
    fn starts_closed_on_step_one() {
        let wizard = Wizard::new(TwoStep::default());
        assert!(!wizard.is_open());
        assert_eq!(wizard.step(), 1);
        assert_eq!(wizard.total_steps(), 2);
    }

    #[test]
    fn advance_refused_until_required_fields_filled() {
        let mut wizard = opened();
        let events = wizard.dispatch(WizardCommand::Advance);
        assert_eq!(events, vec![WizardEvent::AdvanceRefused { step: 1 }]);
        assert_eq!(wizard.step(), 1);

        wizard.set_field("first", "value");
        let events = wizard.dispatch(WizardCommand::Advance);
        assert_eq!(events, vec![WizardEvent::StepChanged { step: 2, total: 2 }]);
    }

    #[test]
    fn retreat_keeps_values_and_stops_at_first_step() {
        let mut wizard = opened();
        wizard.set_field("first", "kept");
        wizard.dispatch(WizardCommand::Advance);
        wizard.set_field("second", "also kept");

        wizard.dispatch(WizardCommand::Retreat);
        assert_eq!(wizard.step(), 1);
        assert!(wizard.dispatch(WizardCommand::Retreat).is_empty());

        wizard.dispatch(WizardCommand::Advance);
        assert_eq!(wizard.form().first, "kept");
        assert_eq!(wizard.form().second, "also kept");
    }

    #[test]
    fn advance_past_last_step_is_refused() {
        let mut wizard = opened();
        wizard.set_field("first", "x");
        wizard.dispatch(WizardCommand::Advance);
        let events = wizard.dispatch(WizardCommand::Advance);
        assert_eq!(events, vec![WizardEvent::AdvanceRefused { step: 2 }]);
    }

    #[test]
    fn commit_only_from_last_step() {
        let mut wizard = opened();
        wizard.set_field("first", "x");
        let (events, value) = wizard.commit(|output| Ok(output));
        assert_eq!(events, vec![WizardEvent::CommitRefused { step: 1 }]);
        assert!(value.is_none());
        assert!(wizard.is_open());
    }

    #[test]
    fn commit_hands_output_then_resets() {
        let mut wizard = opened();
        wizard.set_field("first", "a");
        wizard.dispatch(WizardCommand::Advance);
        wizard.set_field("second", "b");

        let (events, value) = wizard.commit(|output| Ok(output));
        assert_eq!(events, vec![WizardEvent::Committed, WizardEvent::Closed]);
        assert_eq!(value, Some(("a".to_owned(), "b".to_owned())));
        assert!(!wizard.is_open());

        wizard.dispatch(WizardCommand::Open);
        assert_eq!(wizard.step(), 1);
        assert_eq!(wizard.form(), &TwoStep::default());
    }

    #[test]
    fn failed_commit_keeps_dialog_open_with_values() {
        let mut wizard = opened();
        wizard.set_field("first", "a");
        wizard.dispatch(WizardCommand::Advance);

        let (events, value) = wizard.commit(|_| -> anyhow::Result<()> { bail!("store offline") });
        assert_eq!(
            events,
            vec![WizardEvent::CommitFailed("store offline".to_owned())]
        );
        assert!(value.is_none());
        assert!(wizard.is_open());
        assert_eq!(wizard.step(), 2);
        assert_eq!(wizard.form().first, "a");
    }

    #[test]
    fn close_discards_progress() {
        let mut wizard = opened();
        wizard.set_field("first", "draft");
        wizard.dispatch(WizardCommand::Advance);

        assert_eq!(
            wizard.dispatch(WizardCommand::Close),
            vec![WizardEvent::Closed]
        );
        wizard.dispatch(WizardCommand::Open);
        assert_eq!(wizard.step(), 1);
        assert!(wizard.form().first.is_empty());
    }

    #[test]
    fn closed_wizard_ignores_edits_and_transitions() {
        let mut wizard = Wizard::new(TwoStep::default());
        assert!(!wizard.set_field("first", "x"));
        assert!(wizard.form_mut().is_none());
        assert!(wizard.dispatch(WizardCommand::Advance).is_empty());
        assert!(wizard.dispatch(WizardCommand::Close).is_empty());
    }

    #[test]
    fn open_with_replaces_defaults() {
        let mut wizard = Wizard::new(TwoStep::default());
        let preset = TwoStep {
            first: "preset".to_owned(),
            second: String::new(),
        };
        wizard.open_with(preset.clone());
        wizard.set_field("first", "changed");
        wizard.dispatch(WizardCommand::Close);
        wizard.dispatch(WizardCommand::Open);
        assert_eq!(wizard.form(), &preset);
    }

    #[test]
    fn choice_fields_cycle_and_wrap() {
        let field = FormField::choice("status", "Status", "b", &["a", "b", "c"]);
        assert_eq!(field.cycle_choice(1).as_deref(), Some("c"));
        assert_eq!(field.cycle_choice(2).as_deref(), Some("a"));

        let unset = FormField::choice("status", "Status", "", &["a", "b"]);
        assert_eq!(unset.cycle_choice(1).as_deref(), Some("a"));
        assert_eq!(unset.cycle_choice(-1).as_deref(), Some("b"));

        let text = FormField::text("name", "Name", "");
        assert_eq!(text.kind, FieldKind::Text);
        assert!(text.cycle_choice(1).is_none());
    }
}
