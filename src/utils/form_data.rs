use reqwest::multipart::{Form, Part};

use crate::errors::{AppError, Result};
use crate::models::document::DocumentFile;
use crate::models::form::{FormField, KycForm};

/// One multipart entry.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    Text(String),
    File(DocumentFile),
}

/// The form flattened to backend field names, ready to become a multipart body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPayload {
    entries: Vec<(&'static str, PayloadValue)>,
}

impl FormPayload {
    /// Maps every field through the camelCase -> snake_case table.
    /// Lists become JSON text; documents already held by the backend and
    /// unset values are left out.
    pub fn from_form(form: &KycForm) -> Result<Self> {
        let mut entries = Vec::new();
        for field in FormField::all() {
            if let Some(value) = value_of(form, field)? {
                entries.push((field.wire_name(), value));
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, wire_name: &str) -> Option<&PayloadValue> {
        self.entries.iter().find(|(name, _)| *name == wire_name).map(|(_, v)| v)
    }

    pub fn text(&self, wire_name: &str) -> Option<&str> {
        match self.get(wire_name) {
            Some(PayloadValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn file_count(&self) -> usize {
        self.entries.iter().filter(|(_, v)| matches!(v, PayloadValue::File(_))).count()
    }

    pub fn into_multipart(self) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in self.entries {
            form = match value {
                PayloadValue::Text(text) => form.text(name, text),
                PayloadValue::File(file) => {
                    let part = Part::bytes(file.bytes)
                        .file_name(file.file_name)
                        .mime_str(&file.content_type)
                        .map_err(|e| AppError::InternalError(format!("Invalid content type: {}", e)))?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

fn value_of(form: &KycForm, field: FormField) -> Result<Option<PayloadValue>> {
    let p = &form.personal;
    let pro = &form.professional;
    let d = &form.declaration;
    let text = |s: &str| Some(PayloadValue::Text(s.trim().to_string()));
    let flag = |b: bool| Some(PayloadValue::Text(b.to_string()));

    let value = match field {
        FormField::FullName => text(&p.full_name),
        FormField::Email => text(&p.email),
        FormField::Phone => text(&p.phone),
        FormField::Dob => text(&p.dob),
        FormField::Gender => p.gender.map(|g| PayloadValue::Text(g.to_string())),
        FormField::PermanentAddress => text(&p.permanent_address),
        FormField::CurrentAddress => text(&p.current_address),
        FormField::BarCouncilNumber => text(&pro.bar_council_number),
        FormField::LawFirmName => text(&pro.law_firm_name),
        FormField::YearsOfExperience => text(&pro.years_of_experience),
        FormField::ConsultationFee => text(&pro.consultation_fee),
        FormField::Specializations => Some(PayloadValue::Text(serde_json::to_string(&pro.specializations)?)),
        FormField::AvailabilityDays => {
            Some(PayloadValue::Text(serde_json::to_string(&pro.availability_days)?))
        }
        FormField::AvailableFrom => text(&pro.available_from),
        FormField::AvailableUntil => text(&pro.available_until),
        FormField::CitizenshipFront
        | FormField::CitizenshipBack
        | FormField::LawyerLicense
        | FormField::PassportPhoto
        | FormField::LawDegree
        | FormField::ExperienceCertificate => form
            .documents
            .slot(field)
            .and_then(|slot| slot.upload())
            .map(|file| PayloadValue::File(file.clone())),
        FormField::ConfirmAccuracy => flag(d.confirm_accuracy),
        FormField::AuthorizeVerification => flag(d.authorize_verification),
        FormField::AgreeTerms => flag(d.agree_terms),
    };
    Ok(value)
}
