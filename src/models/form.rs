use std::fmt;

use crate::models::document::DocumentSlot;
use crate::models::kyc::{Gender, KycSubmission};

pub const SPECIALIZATIONS: [&str; 10] = [
    "Criminal Law",
    "Civil Law",
    "Family Law",
    "Property Law",
    "Corporate Law",
    "Labor Law",
    "Constitutional Law",
    "Environmental Law",
    "Tax Law",
    "Immigration Law",
];

pub const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const EXPERIENCE_BANDS: [&str; 5] = ["0-1", "1-3", "3-5", "5-10", "10+"];

/// The four wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardTab {
    Personal,
    Professional,
    Identity,
    Declaration,
}

impl WizardTab {
    pub const ALL: [WizardTab; 4] = [
        WizardTab::Personal,
        WizardTab::Professional,
        WizardTab::Identity,
        WizardTab::Declaration,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            WizardTab::Personal => "personal",
            WizardTab::Professional => "professional",
            WizardTab::Identity => "identity",
            WizardTab::Declaration => "declaration",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardTab::Personal => "Personal Information",
            WizardTab::Professional => "Professional Information",
            WizardTab::Identity => "Identity Documents",
            WizardTab::Declaration => "Declaration & Submit",
        }
    }

    pub fn next(&self) -> Option<WizardTab> {
        match self {
            WizardTab::Personal => Some(WizardTab::Professional),
            WizardTab::Professional => Some(WizardTab::Identity),
            WizardTab::Identity => Some(WizardTab::Declaration),
            WizardTab::Declaration => None,
        }
    }

    pub fn previous(&self) -> Option<WizardTab> {
        match self {
            WizardTab::Personal => None,
            WizardTab::Professional => Some(WizardTab::Personal),
            WizardTab::Identity => Some(WizardTab::Professional),
            WizardTab::Declaration => Some(WizardTab::Identity),
        }
    }

    pub fn fields(&self) -> &'static [FormField] {
        match self {
            WizardTab::Personal => &[
                FormField::FullName,
                FormField::Email,
                FormField::Phone,
                FormField::Dob,
                FormField::Gender,
                FormField::PermanentAddress,
                FormField::CurrentAddress,
            ],
            WizardTab::Professional => &[
                FormField::BarCouncilNumber,
                FormField::LawFirmName,
                FormField::YearsOfExperience,
                FormField::ConsultationFee,
                FormField::Specializations,
                FormField::AvailabilityDays,
                FormField::AvailableFrom,
                FormField::AvailableUntil,
            ],
            WizardTab::Identity => &FormField::DOCUMENTS,
            WizardTab::Declaration => &[
                FormField::ConfirmAccuracy,
                FormField::AuthorizeVerification,
                FormField::AgreeTerms,
            ],
        }
    }
}

impl fmt::Display for WizardTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Every field the form collects, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    FullName,
    Email,
    Phone,
    Dob,
    Gender,
    PermanentAddress,
    CurrentAddress,
    BarCouncilNumber,
    LawFirmName,
    YearsOfExperience,
    ConsultationFee,
    Specializations,
    AvailabilityDays,
    AvailableFrom,
    AvailableUntil,
    CitizenshipFront,
    CitizenshipBack,
    LawyerLicense,
    PassportPhoto,
    LawDegree,
    ExperienceCertificate,
    ConfirmAccuracy,
    AuthorizeVerification,
    AgreeTerms,
}

impl FormField {
    pub const DOCUMENTS: [FormField; 6] = [
        FormField::CitizenshipFront,
        FormField::CitizenshipBack,
        FormField::LawyerLicense,
        FormField::PassportPhoto,
        FormField::LawDegree,
        FormField::ExperienceCertificate,
    ];

    pub fn all() -> impl Iterator<Item = FormField> {
        WizardTab::ALL.into_iter().flat_map(|tab| tab.fields().iter().copied())
    }

    /// Key used by the form and in error maps.
    pub fn client_name(&self) -> &'static str {
        self.names().0
    }

    /// Multipart field name expected by the backend.
    pub fn wire_name(&self) -> &'static str {
        self.names().1
    }

    fn names(&self) -> (&'static str, &'static str) {
        match self {
            FormField::FullName => ("fullName", "full_name"),
            FormField::Email => ("email", "email"),
            FormField::Phone => ("phone", "phone"),
            FormField::Dob => ("dob", "dob"),
            FormField::Gender => ("gender", "gender"),
            FormField::PermanentAddress => ("permanentAddress", "permanent_address"),
            FormField::CurrentAddress => ("currentAddress", "current_address"),
            FormField::BarCouncilNumber => ("barCouncilNumber", "bar_council_number"),
            FormField::LawFirmName => ("lawFirmName", "law_firm_name"),
            FormField::YearsOfExperience => ("yearsOfExperience", "years_of_experience"),
            FormField::ConsultationFee => ("consultationFee", "consultation_fee"),
            FormField::Specializations => ("specializations", "specializations"),
            FormField::AvailabilityDays => ("availabilityDays", "availability_days"),
            FormField::AvailableFrom => ("availableFrom", "available_from"),
            FormField::AvailableUntil => ("availableUntil", "available_until"),
            FormField::CitizenshipFront => ("citizenshipFront", "citizenship_front"),
            FormField::CitizenshipBack => ("citizenshipBack", "citizenship_back"),
            FormField::LawyerLicense => ("lawyerLicense", "lawyer_license"),
            FormField::PassportPhoto => ("passportPhoto", "passport_photo"),
            FormField::LawDegree => ("lawDegree", "law_degree"),
            FormField::ExperienceCertificate => ("experienceCertificate", "experience_certificate"),
            FormField::ConfirmAccuracy => ("confirmAccuracy", "confirm_accuracy"),
            FormField::AuthorizeVerification => ("authorizeVerification", "authorize_verification"),
            FormField::AgreeTerms => ("agreeTerms", "agree_terms"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::FullName => "Full name",
            FormField::Email => "Email",
            FormField::Phone => "Phone number",
            FormField::Dob => "Date of birth",
            FormField::Gender => "Gender",
            FormField::PermanentAddress => "Permanent address",
            FormField::CurrentAddress => "Current address",
            FormField::BarCouncilNumber => "Bar Council number",
            FormField::LawFirmName => "Law firm name",
            FormField::YearsOfExperience => "Years of experience",
            FormField::ConsultationFee => "Consultation fee",
            FormField::Specializations => "Specializations",
            FormField::AvailabilityDays => "Availability days",
            FormField::AvailableFrom => "Available from",
            FormField::AvailableUntil => "Available until",
            FormField::CitizenshipFront => "Citizenship (front)",
            FormField::CitizenshipBack => "Citizenship (back)",
            FormField::LawyerLicense => "Lawyer license",
            FormField::PassportPhoto => "Passport photo",
            FormField::LawDegree => "Law degree",
            FormField::ExperienceCertificate => "Experience certificate",
            FormField::ConfirmAccuracy => "Confirm accuracy",
            FormField::AuthorizeVerification => "Authorize verification",
            FormField::AgreeTerms => "Agree to terms",
        }
    }

    pub fn tab(&self) -> WizardTab {
        WizardTab::ALL
            .into_iter()
            .find(|tab| tab.fields().contains(self))
            .unwrap_or(WizardTab::Personal)
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.client_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    /// As typed, `YYYY-MM-DD`.
    pub dob: String,
    pub gender: Option<Gender>,
    pub permanent_address: String,
    pub current_address: String,
}

impl Default for PersonalForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            dob: String::new(),
            gender: Some(Gender::Female),
            permanent_address: String::new(),
            current_address: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfessionalForm {
    pub bar_council_number: String,
    pub law_firm_name: String,
    pub years_of_experience: String,
    pub consultation_fee: String,
    pub specializations: Vec<String>,
    pub availability_days: Vec<String>,
    pub available_from: String,
    pub available_until: String,
}

impl ProfessionalForm {
    pub fn toggle_specialization(&mut self, tag: &str) {
        toggle(&mut self.specializations, tag);
    }

    pub fn toggle_day(&mut self, day: &str) {
        toggle(&mut self.availability_days, day);
    }
}

fn toggle(values: &mut Vec<String>, value: &str) {
    if let Some(pos) = values.iter().position(|v| v == value) {
        values.remove(pos);
    } else {
        values.push(value.to_string());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentsForm {
    pub citizenship_front: DocumentSlot,
    pub citizenship_back: DocumentSlot,
    pub lawyer_license: DocumentSlot,
    pub passport_photo: DocumentSlot,
    pub law_degree: DocumentSlot,
    pub experience_certificate: DocumentSlot,
}

impl DocumentsForm {
    pub fn slot(&self, field: FormField) -> Option<&DocumentSlot> {
        match field {
            FormField::CitizenshipFront => Some(&self.citizenship_front),
            FormField::CitizenshipBack => Some(&self.citizenship_back),
            FormField::LawyerLicense => Some(&self.lawyer_license),
            FormField::PassportPhoto => Some(&self.passport_photo),
            FormField::LawDegree => Some(&self.law_degree),
            FormField::ExperienceCertificate => Some(&self.experience_certificate),
            _ => None,
        }
    }

    pub fn slot_mut(&mut self, field: FormField) -> Option<&mut DocumentSlot> {
        match field {
            FormField::CitizenshipFront => Some(&mut self.citizenship_front),
            FormField::CitizenshipBack => Some(&mut self.citizenship_back),
            FormField::LawyerLicense => Some(&mut self.lawyer_license),
            FormField::PassportPhoto => Some(&mut self.passport_photo),
            FormField::LawDegree => Some(&mut self.law_degree),
            FormField::ExperienceCertificate => Some(&mut self.experience_certificate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationForm {
    pub confirm_accuracy: bool,
    pub authorize_verification: bool,
    pub agree_terms: bool,
}

/// Values accumulated across all four wizard tabs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KycForm {
    pub personal: PersonalForm,
    pub professional: ProfessionalForm,
    pub documents: DocumentsForm,
    pub declaration: DeclarationForm,
}

impl KycForm {
    /// Pre-fills the form from an existing submission so it can be edited and resent.
    /// Documents stay on the server and are referenced, not downloaded.
    /// Declarations are not carried over; they must be re-confirmed.
    pub fn from_submission(submission: &KycSubmission) -> Self {
        let mut form = KycForm::default();

        if let Some(p) = &submission.personal_info {
            form.personal = PersonalForm {
                full_name: p.full_name.clone(),
                email: p.email.clone(),
                phone: p.phone.clone(),
                dob: p.dob.format("%Y-%m-%d").to_string(),
                gender: Some(p.gender),
                permanent_address: p.permanent_address.clone(),
                current_address: p.current_address.clone(),
            };
        }

        if let Some(p) = &submission.professional_info {
            form.professional = ProfessionalForm {
                bar_council_number: p.bar_council_number.clone(),
                law_firm_name: p.law_firm_name.clone().unwrap_or_default(),
                years_of_experience: p.years_of_experience.clone(),
                consultation_fee: p.consultation_fee.clone(),
                specializations: p.specializations.clone(),
                availability_days: p.availability_days.clone(),
                available_from: p.available_from.clone(),
                available_until: p.available_until.clone(),
            };
        }

        if let Some(docs) = &submission.identity_documents {
            let stored = |url: &Option<String>| match url {
                Some(u) if !u.is_empty() => DocumentSlot::Stored(u.clone()),
                _ => DocumentSlot::Empty,
            };
            form.documents = DocumentsForm {
                citizenship_front: stored(&docs.citizenship_front),
                citizenship_back: stored(&docs.citizenship_back),
                lawyer_license: stored(&docs.lawyer_license),
                passport_photo: stored(&docs.passport_photo),
                law_degree: stored(&docs.law_degree),
                experience_certificate: stored(&docs.experience_certificate),
            };
        }

        form
    }
}
