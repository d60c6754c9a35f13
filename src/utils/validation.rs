use chrono::{Months, NaiveDate, Utc};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::{AppError, Result};
use crate::models::form::{
    DeclarationForm, DocumentsForm, FormField, KycForm, PersonalForm, ProfessionalForm, WizardTab,
};

pub const MINIMUM_AGE_YEARS: u32 = 18;

/// Field-keyed validation messages, ordered as the form lays fields out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn remove(&mut self, field: FormField) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn first(&self) -> Option<(FormField, &str)> {
        self.0.iter().next().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    /// Drops every error belonging to `tab`.
    pub fn clear_tab(&mut self, tab: WizardTab) {
        self.0.retain(|field, _| field.tab() != tab);
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationError(self.to_string()))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(field, msg)| format!("{}: {}", field, msg)).collect();
        f.write_str(&parts.join("; "))
    }
}

pub struct Validator;

impl Validator {
    pub fn validate_email(email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::ValidationError("Email is required".to_string()));
        }

        let email_regex = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .map_err(|e| AppError::InternalError(format!("Regex error: {}", e)))?;

        if !email_regex.is_match(email) || email.len() > 254 {
            return Err(AppError::ValidationError("Please enter a valid email address".to_string()));
        }

        Ok(())
    }

    /// Loose international format: optional leading `+`, then digits, spaces,
    /// parentheses and hyphens, with at least ten digits overall.
    pub fn validate_phone(phone: &str) -> Result<()> {
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(AppError::ValidationError("Phone number is required".to_string()));
        }

        let phone_regex = Regex::new(r"^\+?[\d\s()\-]+$")
            .map_err(|e| AppError::InternalError(format!("Regex error: {}", e)))?;
        let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();

        if !phone_regex.is_match(phone) || digits < 10 {
            return Err(AppError::ValidationError("Please enter a valid phone number".to_string()));
        }

        Ok(())
    }

    /// Parses `YYYY-MM-DD` and checks the applicant is an adult on `today`.
    pub fn validate_date_of_birth(dob: &str, today: NaiveDate) -> Result<NaiveDate> {
        let date = NaiveDate::parse_from_str(dob.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::ValidationError("Date of birth is required".to_string()))?;

        // Month arithmetic clamps Feb 29 to Feb 28.
        let cutoff = today
            .checked_sub_months(Months::new(MINIMUM_AGE_YEARS * 12))
            .ok_or_else(|| AppError::InternalError("Date out of range".to_string()))?;

        if date > cutoff {
            return Err(AppError::ValidationError("You must be at least 18 years old".to_string()));
        }

        Ok(date)
    }

    pub fn validate_full_name(name: &str) -> Result<()> {
        let len = name.trim().chars().count();
        if len == 0 {
            return Err(AppError::ValidationError("Full name is required".to_string()));
        }
        if len < 2 {
            return Err(AppError::ValidationError("Full name must be at least 2 characters".to_string()));
        }
        if len > 100 {
            return Err(AppError::ValidationError("Full name must not exceed 100 characters".to_string()));
        }
        Ok(())
    }

    pub fn validate_address(label: &str, address: &str) -> Result<()> {
        let len = address.trim().chars().count();
        if len == 0 {
            return Err(AppError::ValidationError(format!("{} is required", label)));
        }
        if len < 5 {
            return Err(AppError::ValidationError(format!("{} must be at least 5 characters", label)));
        }
        Ok(())
    }

    pub fn validate_bar_council_number(number: &str) -> Result<()> {
        let len = number.trim().chars().count();
        if len == 0 {
            return Err(AppError::ValidationError("Bar Council number is required".to_string()));
        }
        if len < 5 {
            return Err(AppError::ValidationError(
                "Bar Council number must be at least 5 characters".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_consultation_fee(fee: &str) -> Result<f64> {
        let fee = fee.trim();
        if fee.is_empty() {
            return Err(AppError::ValidationError("Consultation fee is required".to_string()));
        }
        let value: f64 = fee
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
            .ok_or_else(|| AppError::ValidationError("Consultation fee must be a valid number".to_string()))?;
        if value <= 0.0 {
            return Err(AppError::ValidationError("Consultation fee must be greater than 0".to_string()));
        }
        Ok(value)
    }

    /// Checks one field against the current values (blur/change validation).
    pub fn check_field(form: &KycForm, field: FormField, today: NaiveDate) -> Option<String> {
        let personal = &form.personal;
        let professional = &form.professional;
        let declaration = &form.declaration;

        let outcome: Result<()> = match field {
            FormField::FullName => Self::validate_full_name(&personal.full_name),
            FormField::Email => Self::validate_email(&personal.email),
            FormField::Phone => Self::validate_phone(&personal.phone),
            FormField::Dob => Self::validate_date_of_birth(&personal.dob, today).map(|_| ()),
            FormField::Gender => match personal.gender {
                Some(_) => Ok(()),
                None => Err(AppError::ValidationError("Gender is required".to_string())),
            },
            FormField::PermanentAddress => {
                Self::validate_address("Permanent address", &personal.permanent_address)
            }
            FormField::CurrentAddress => Self::validate_address("Current address", &personal.current_address),
            FormField::BarCouncilNumber => Self::validate_bar_council_number(&professional.bar_council_number),
            FormField::LawFirmName => Ok(()),
            FormField::YearsOfExperience => {
                required(&professional.years_of_experience, "Years of experience is required")
            }
            FormField::ConsultationFee => {
                Self::validate_consultation_fee(&professional.consultation_fee).map(|_| ())
            }
            FormField::Specializations => {
                non_empty(&professional.specializations, "Select at least one specialization")
            }
            FormField::AvailabilityDays => {
                non_empty(&professional.availability_days, "Select at least one availability day")
            }
            FormField::AvailableFrom => {
                required(&professional.available_from, "Available from time is required")
            }
            FormField::AvailableUntil => {
                required(&professional.available_until, "Available until time is required")
            }
            FormField::CitizenshipFront
            | FormField::CitizenshipBack
            | FormField::LawyerLicense
            | FormField::PassportPhoto
            | FormField::LawDegree
            | FormField::ExperienceCertificate => match form.documents.slot(field) {
                Some(slot) if slot.is_present() => Ok(()),
                _ => Err(AppError::ValidationError(format!("{} is required", field.label()))),
            },
            FormField::ConfirmAccuracy => {
                confirmed(declaration.confirm_accuracy, "You must confirm the accuracy")
            }
            FormField::AuthorizeVerification => {
                confirmed(declaration.authorize_verification, "You must authorize verification")
            }
            FormField::AgreeTerms => {
                confirmed(declaration.agree_terms, "You must agree to terms and conditions")
            }
        };

        outcome.err().map(into_message)
    }

    pub fn validate_tab(form: &KycForm, tab: WizardTab, today: NaiveDate) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for field in tab.fields() {
            if let Some(message) = Self::check_field(form, *field, today) {
                errors.insert(*field, message);
            }
        }
        errors
    }

    pub fn validate_form(form: &KycForm, today: NaiveDate) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for tab in WizardTab::ALL {
            errors.extend(Self::validate_tab(form, tab, today));
        }
        errors
    }

    pub fn validate_personal(personal: &PersonalForm, today: NaiveDate) -> FieldErrors {
        let form = KycForm { personal: personal.clone(), ..KycForm::default() };
        Self::validate_tab(&form, WizardTab::Personal, today)
    }

    pub fn validate_professional(professional: &ProfessionalForm) -> FieldErrors {
        let form = KycForm { professional: professional.clone(), ..KycForm::default() };
        Self::validate_tab(&form, WizardTab::Professional, today())
    }

    pub fn validate_documents(documents: &DocumentsForm) -> FieldErrors {
        let form = KycForm { documents: documents.clone(), ..KycForm::default() };
        Self::validate_tab(&form, WizardTab::Identity, today())
    }

    pub fn validate_declaration(declaration: &DeclarationForm) -> FieldErrors {
        let form = KycForm { declaration: declaration.clone(), ..KycForm::default() };
        Self::validate_tab(&form, WizardTab::Declaration, today())
    }
}

/// Current UTC date, the reference point for the age rule.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn required(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(message.to_string()));
    }
    Ok(())
}

fn non_empty(values: &[String], message: &str) -> Result<()> {
    if values.is_empty() {
        return Err(AppError::ValidationError(message.to_string()));
    }
    Ok(())
}

fn confirmed(value: bool, message: &str) -> Result<()> {
    if !value {
        return Err(AppError::ValidationError(message.to_string()));
    }
    Ok(())
}

fn into_message(err: AppError) -> String {
    match err {
        AppError::ValidationError(message) => message,
        other => other.to_string(),
    }
}
