use crate::charset::{CharacterClass, ClassSet};
use crate::generator::{self, GenerateError, GenerationRequest};
use crate::validation::{self, LengthError, PasswordLength};
use log::debug;
use rand::Rng;
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error(transparent)]
    Length(#[from] LengthError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

#[derive(Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Generated(Zeroizing<String>),
}

impl fmt::Debug for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => f.write_str("Idle"),
            Phase::Generated(_) => f.write_str("Generated(<redacted>)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ToggleClass(CharacterClass),
    SetLength(String),
    Submit,
    Reset,
}

/// State of the password form: the raw length field, the class toggles and
/// the last generated password.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState {
    length_input: String,
    classes: ClassSet,
    phase: Phase,
    error: Option<FormError>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn length_input(&self) -> &str {
        &self.length_input
    }

    pub fn classes(&self) -> ClassSet {
        self.classes
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn password(&self) -> Option<&str> {
        match &self.phase {
            Phase::Generated(password) => Some(password.as_str()),
            Phase::Idle => None,
        }
    }

    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    /// Whether the length field currently passes validation.
    pub fn is_valid(&self) -> bool {
        validation::validate_length(&self.length_input).is_ok()
    }

    pub fn toggle_class(&mut self, class: CharacterClass) -> bool {
        let enabled = self.classes.toggle(class);
        debug!("{} {}", class, if enabled { "enabled" } else { "disabled" });
        enabled
    }

    pub fn set_length(&mut self, input: impl Into<String>) {
        self.length_input = input.into();
        self.error = None;
    }

    pub fn request(&self) -> Result<GenerationRequest, LengthError> {
        let length: PasswordLength = validation::validate_length(&self.length_input)?;
        Ok(GenerationRequest::new(length, self.classes))
    }

    /// Validates the form and generates a new password.
    ///
    /// On failure the error is kept for display and the previous phase is
    /// left untouched.
    pub fn submit<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&str, FormError> {
        let outcome = self
            .request()
            .map_err(FormError::from)
            .and_then(|request| generator::generate(&request, rng).map_err(FormError::from));

        match outcome {
            Ok(password) => {
                self.error = None;
                self.phase = Phase::Generated(password);
                Ok(self.password().unwrap_or_default())
            }
            Err(err) => {
                debug!("submit rejected: {}", err);
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn dispatch<R: Rng + ?Sized>(
        &mut self,
        action: Action,
        rng: &mut R,
    ) -> Result<(), FormError> {
        match action {
            Action::ToggleClass(class) => {
                self.toggle_class(class);
            }
            Action::SetLength(input) => self.set_length(input),
            Action::Submit => {
                self.submit(rng)?;
            }
            Action::Reset => self.reset(),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assert_reset_state(form: &FormState) {
        let classes = form.classes();
        assert!(classes.contains(CharacterClass::Lowercase));
        assert!(!classes.contains(CharacterClass::Uppercase));
        assert!(!classes.contains(CharacterClass::Digit));
        assert!(!classes.contains(CharacterClass::Symbol));
        assert_eq!(form.password(), None);
        assert_eq!(form.phase(), &Phase::Idle);
        assert_eq!(form.length_input(), "");
        assert!(form.error().is_none());
    }

    #[test]
    fn test_initial_state() {
        assert_reset_state(&FormState::new());
        assert!(!FormState::new().is_valid());
    }

    #[test]
    fn test_submit_generates_password() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut form = FormState::new();
        form.set_length("8");
        assert!(form.is_valid());

        let password = form.submit(&mut rng).unwrap().to_string();
        assert_eq!(password.len(), 8);
        assert!(password.chars().all(|c| c.is_ascii_lowercase()));
        assert_eq!(form.password(), Some(password.as_str()));
    }

    #[test]
    fn test_submit_with_invalid_length_keeps_phase() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut form = FormState::new();
        form.set_length("6");
        form.submit(&mut rng).unwrap();
        let previous = form.password().map(str::to_string);

        form.set_length("20");
        let err = form.submit(&mut rng).unwrap_err();
        assert_eq!(err, FormError::Length(LengthError::TooLong(20)));
        assert_eq!(form.error(), Some(&err));
        assert_eq!(form.password().map(str::to_string), previous);
    }

    #[test]
    fn test_submit_without_classes() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut form = FormState::new();
        form.set_length("8");
        form.toggle_class(CharacterClass::Lowercase);

        let err = form.submit(&mut rng).unwrap_err();
        assert_eq!(err, FormError::Generate(GenerateError::NoCharacterClass));
        assert_eq!(form.phase(), &Phase::Idle);
    }

    #[test]
    fn test_set_length_clears_error() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut form = FormState::new();
        assert!(form.submit(&mut rng).is_err());
        assert_eq!(form.error(), Some(&FormError::Length(LengthError::Missing)));

        form.set_length("10");
        assert!(form.error().is_none());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut form = FormState::new();

        let actions = vec![
            Action::ToggleClass(CharacterClass::Uppercase),
            Action::ToggleClass(CharacterClass::Symbol),
            Action::ToggleClass(CharacterClass::Lowercase),
            Action::SetLength("12".to_string()),
            Action::Submit,
            Action::ToggleClass(CharacterClass::Digit),
        ];
        for action in actions {
            form.dispatch(action, &mut rng).unwrap();
        }
        assert!(form.password().is_some());

        form.dispatch(Action::Reset, &mut rng).unwrap();
        assert_reset_state(&form);

        form.reset();
        assert_reset_state(&form);
        assert_eq!(form, FormState::new());
    }

    #[test]
    fn test_toggle_order_does_not_change_request() {
        let mut a = FormState::new();
        a.set_length("10");
        a.toggle_class(CharacterClass::Digit);
        a.toggle_class(CharacterClass::Uppercase);

        let mut b = FormState::new();
        b.set_length("10");
        b.toggle_class(CharacterClass::Uppercase);
        b.toggle_class(CharacterClass::Symbol);
        b.toggle_class(CharacterClass::Digit);
        b.toggle_class(CharacterClass::Symbol);

        let request_a = a.request().unwrap();
        let request_b = b.request().unwrap();
        assert_eq!(request_a, request_b);
        assert_eq!(request_a.classes.alphabet(), request_b.classes.alphabet());
    }

    #[test]
    fn test_dispatch_propagates_submit_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut form = FormState::new();
        let set_length = Action::SetLength("abc".to_string());
        form.dispatch(set_length, &mut rng).unwrap();

        let err = form.dispatch(Action::Submit, &mut rng).unwrap_err();
        assert!(matches!(err, FormError::Length(LengthError::NotANumber(_))));
    }

    #[test]
    fn test_debug_output_hides_password() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut form = FormState::new();
        form.set_length("16");
        let password = form.submit(&mut rng).unwrap().to_string();

        let debug = format!("{:?}", form);
        assert!(!debug.contains(&password), "Debug output leaks the password");
        assert!(debug.contains("Generated(<redacted>)"));
        assert_eq!(format!("{:?}", Phase::Idle), "Idle");
    }
}
