//! Field rules for the two editable forms.
//!
//! Failures are keyed by field so the shell can highlight the offending
//! input. Nothing here touches the network.

use std::collections::BTreeMap;

use validator::ValidateEmail;

use crate::model::{PinField, PinForm, ProfileField, ProfileForm};

pub const MIN_PIN_LENGTH: usize = 4;

pub const MSG_INVALID_EMAIL: &str = "Invalid email address";
pub const MSG_CURRENT_PIN_REQUIRED: &str = "Current PIN is required";
pub const MSG_PIN_TOO_SHORT: &str = "PIN must be at least 4 characters";
pub const MSG_CONFIRM_PIN_REQUIRED: &str = "Please confirm your new PIN";
pub const MSG_PIN_MISMATCH: &str = "PINs don't match";

pub type FieldErrors<F> = BTreeMap<F, String>;

pub fn validate_profile(form: &ProfileForm) -> Result<(), FieldErrors<ProfileField>> {
    let mut errors = FieldErrors::new();

    if !form.email.is_empty() && !form.email.validate_email() {
        errors.insert(ProfileField::Email, MSG_INVALID_EMAIL.to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_pin(form: &PinForm) -> Result<(), FieldErrors<PinField>> {
    let mut errors = FieldErrors::new();

    if form.current_pin.is_empty() {
        errors.insert(PinField::CurrentPin, MSG_CURRENT_PIN_REQUIRED.to_string());
    }

    if form.new_pin.char_count() < MIN_PIN_LENGTH {
        errors.insert(PinField::NewPin, MSG_PIN_TOO_SHORT.to_string());
    }

    // The mismatch lands on confirmPin, never as a form-level error.
    if form.confirm_pin.is_empty() {
        errors.insert(PinField::ConfirmPin, MSG_CONFIRM_PIN_REQUIRED.to_string());
    } else if form.new_pin != form.confirm_pin {
        errors.insert(PinField::ConfirmPin, MSG_PIN_MISMATCH.to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pin_form(current: &str, new: &str, confirm: &str) -> PinForm {
        let mut form = PinForm::default();
        form.set(PinField::CurrentPin, current.into());
        form.set(PinField::NewPin, new.into());
        form.set(PinField::ConfirmPin, confirm.into());
        form
    }

    fn profile_form(email: &str) -> ProfileForm {
        ProfileForm {
            email: email.to_string(),
            ..ProfileForm::default()
        }
    }

    #[test]
    fn empty_email_is_valid() {
        assert!(validate_profile(&profile_form("")).is_ok());
    }

    #[test]
    fn well_formed_email_is_valid() {
        assert!(validate_profile(&profile_form("jane@x.com")).is_ok());
        assert!(validate_profile(&profile_form("first.last+tag@example.co.uk")).is_ok());
    }

    #[test]
    fn malformed_email_is_rejected_on_email_field() {
        for email in ["not-an-email", "jane@", "@x.com", "jane x@x.com"] {
            let errors = validate_profile(&profile_form(email)).unwrap_err();
            assert_eq!(
                errors.get(&ProfileField::Email).map(String::as_str),
                Some(MSG_INVALID_EMAIL),
                "expected {email} to be rejected"
            );
        }
    }

    #[test]
    fn name_and_mobile_are_unconstrained() {
        let form = ProfileForm {
            full_name: String::new(),
            mobile: "not a number at all".into(),
            ..ProfileForm::default()
        };
        assert!(validate_profile(&form).is_ok());
    }

    #[test]
    fn valid_pin_form_passes() {
        assert!(validate_pin(&pin_form("0000", "1234", "1234")).is_ok());
    }

    #[test]
    fn empty_pin_form_reports_every_field() {
        let errors = validate_pin(&PinForm::default()).unwrap_err();
        assert_eq!(errors[&PinField::CurrentPin], MSG_CURRENT_PIN_REQUIRED);
        assert_eq!(errors[&PinField::NewPin], MSG_PIN_TOO_SHORT);
        assert_eq!(errors[&PinField::ConfirmPin], MSG_CONFIRM_PIN_REQUIRED);
    }

    #[test]
    fn short_new_pin_is_rejected() {
        let errors = validate_pin(&pin_form("0000", "123", "123")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[&PinField::NewPin], MSG_PIN_TOO_SHORT);
    }

    #[test]
    fn mismatch_attaches_to_confirm_pin() {
        let errors = validate_pin(&pin_form("0000", "1234", "1235")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[&PinField::ConfirmPin], MSG_PIN_MISMATCH);
    }

    proptest! {
        #[test]
        fn any_mismatched_pins_fail_on_confirm(
            new in "[0-9]{4,8}",
            confirm in "[0-9]{1,8}",
        ) {
            prop_assume!(new != confirm);
            let errors = validate_pin(&pin_form("0000", &new, &confirm)).unwrap_err();
            prop_assert_eq!(errors.get(&PinField::ConfirmPin).map(String::as_str), Some(MSG_PIN_MISMATCH));
        }

        #[test]
        fn any_matching_long_enough_pins_pass(pin in "[0-9]{4,12}", current in "[0-9]{1,8}") {
            prop_assert!(validate_pin(&pin_form(&current, &pin, &pin)).is_ok());
        }

        #[test]
        fn emails_without_at_sign_fail(local in "[a-z0-9.]{1,20}") {
            let errors = validate_profile(&profile_form(&local)).unwrap_err();
            prop_assert!(errors.contains_key(&ProfileField::Email));
        }
    }
}
