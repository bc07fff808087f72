// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;
use time::Date;

use crate::{
    CompanyInfo, FormField, LeadDraft, LeadStatus, MEMBER_ROLES, ParsedImport, WizardForm,
    parse_date, parse_delimited, parse_money_cents,
};

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Comma-separated input into trimmed, non-empty entries in input order.
fn comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Two steps: contact, then property.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeadEntryForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service_type: String,
    pub address: String,
    pub property_size: String,
    pub notes: String,
    service_types: Vec<String>,
}

impl LeadEntryForm {
    pub fn new(service_types: &[String]) -> Self {
        Self {
            service_types: service_types.to_vec(),
            ..Self::default()
        }
    }
}

impl WizardForm for LeadEntryForm {
    type Output = LeadDraft;

    fn step_count(&self) -> usize {
        2
    }

    fn step_complete(&self, step: usize) -> bool {
        match step {
            1 => filled(&self.name) && filled(&self.email) && filled(&self.phone),
            _ => filled(&self.address) && filled(&self.property_size),
        }
    }

    fn fields(&self, step: usize) -> Vec<FormField> {
        match step {
            1 => vec![
                FormField::text("name", "Full name", &self.name).required(),
                FormField::text("email", "Email", &self.email).required(),
                FormField::text("phone", "Phone", &self.phone).required(),
                FormField::choice(
                    "service_type",
                    "Service type",
                    &self.service_type,
                    &self.service_types,
                ),
            ],
            _ => vec![
                FormField::text("address", "Address", &self.address).required(),
                FormField::text("property_size", "Property size", &self.property_size).required(),
                FormField::text("notes", "Notes", &self.notes),
            ],
        }
    }

    fn set_field(&mut self, key: &str, value: &str) -> bool {
        let target = match key {
            "name" => &mut self.name,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "service_type" => &mut self.service_type,
            "address" => &mut self.address,
            "property_size" => &mut self.property_size,
            "notes" => &mut self.notes,
            _ => return false,
        };
        *target = value.to_owned();
        true
    }

    fn output(&self) -> Option<Self::Output> {
        Some(LeadDraft {
            name: self.name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            service_type: self.service_type.trim().to_owned(),
            address: self.address.trim().to_owned(),
            property_size: self.property_size.trim().to_owned(),
            notes: self.notes.trim().to_owned(),
            status: None,
            date: None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Applied,
    Stale,
    Failed,
}

/// Single step: pasted text or an uploaded file, re-parsed on every change.
/// File reads are asynchronous; at most one may be outstanding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CsvImportForm {
    pub text: String,
    pub file_path: String,
    parsed: ParsedImport,
    pending_read: Option<u64>,
    read_error: Option<String>,
}

impl CsvImportForm {
    pub fn parsed(&self) -> &ParsedImport {
        &self.parsed
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_owned();
        self.parsed = parse_delimited(&self.text);
    }

    pub fn read_pending(&self) -> bool {
        self.pending_read.is_some()
    }

    pub fn read_error(&self) -> Option<&str> {
        self.read_error.as_deref()
    }

    /// Claims the read slot for `token`. Refused while another read is
    /// outstanding.
    pub fn begin_read(&mut self, token: u64) -> bool {
        if self.pending_read.is_some() {
            return false;
        }
        self.pending_read = Some(token);
        self.read_error = None;
        true
    }

    /// Applies a finished read. Completions for any token other than the
    /// outstanding one are ignored.
    pub fn complete_read(&mut self, token: u64, result: Result<String, String>) -> ReadOutcome {
        if self.pending_read != Some(token) {
            return ReadOutcome::Stale;
        }
        self.pending_read = None;
        match result {
            Ok(text) => {
                self.set_text(&text);
                ReadOutcome::Applied
            }
            Err(error) => {
                self.read_error = Some(error);
                ReadOutcome::Failed
            }
        }
    }
}

impl WizardForm for CsvImportForm {
    type Output = Vec<LeadDraft>;

    fn step_count(&self) -> usize {
        1
    }

    fn step_complete(&self, _step: usize) -> bool {
        self.pending_read.is_none() && !self.parsed.is_empty()
    }

    fn fields(&self, _step: usize) -> Vec<FormField> {
        vec![
            FormField::text("file_path", "File", &self.file_path),
            FormField::text("text", "Paste CSV/TSV", &self.text),
        ]
    }

    fn set_field(&mut self, key: &str, value: &str) -> bool {
        match key {
            "file_path" => self.file_path = value.to_owned(),
            "text" => self.set_text(value),
            _ => return false,
        }
        true
    }

    fn output(&self) -> Option<Self::Output> {
        Some(self.parsed.lead_drafts())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EstimatedDuration {
    ThirtyMinutes,
    OneHour,
    NinetyMinutes,
    TwoHours,
    ThreeHours,
}

impl EstimatedDuration {
    pub const ALL: [Self; 5] = [
        Self::ThirtyMinutes,
        Self::OneHour,
        Self::NinetyMinutes,
        Self::TwoHours,
        Self::ThreeHours,
    ];

    pub const fn minutes(self) -> u32 {
        match self {
            Self::ThirtyMinutes => 30,
            Self::OneHour => 60,
            Self::NinetyMinutes => 90,
            Self::TwoHours => 120,
            Self::ThreeHours => 180,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ThirtyMinutes => "30 minutes",
            Self::OneHour => "1 hour",
            Self::NinetyMinutes => "1.5 hours",
            Self::TwoHours => "2 hours",
            Self::ThreeHours => "3 hours",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|duration| duration.label() == value || duration.minutes().to_string() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledService {
    pub date: Date,
    pub time: String,
    pub service_type: String,
    pub duration: EstimatedDuration,
    pub crew: Option<String>,
    pub notes: String,
}

/// Four steps: date, slot and service, duration and crew, notes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScheduleServiceForm {
    pub date: String,
    pub time: String,
    pub service_type: String,
    pub duration: String,
    pub crew: String,
    pub notes: String,
    time_slots: Vec<String>,
    service_types: Vec<String>,
    crews: Vec<String>,
}

impl ScheduleServiceForm {
    pub fn new(
        time_slots: &[impl AsRef<str>],
        service_types: &[String],
        crews: &[String],
    ) -> Self {
        Self {
            time_slots: time_slots
                .iter()
                .map(|slot| slot.as_ref().to_owned())
                .collect(),
            service_types: service_types.to_vec(),
            crews: crews.to_vec(),
            ..Self::default()
        }
    }

    /// Preselects the lead's requested service.
    pub fn with_service_type(mut self, service_type: &str) -> Self {
        self.service_type = service_type.to_owned();
        self
    }
}

impl WizardForm for ScheduleServiceForm {
    type Output = ScheduledService;

    fn step_count(&self) -> usize {
        4
    }

    fn step_complete(&self, step: usize) -> bool {
        match step {
            1 => parse_date(&self.date).is_some(),
            2 => filled(&self.time) && filled(&self.service_type),
            3 => EstimatedDuration::parse(&self.duration).is_some(),
            _ => true,
        }
    }

    fn fields(&self, step: usize) -> Vec<FormField> {
        match step {
            1 => vec![FormField::date("date", "Date (YYYY-MM-DD)", &self.date).required()],
            2 => vec![
                FormField::choice("time", "Time", &self.time, &self.time_slots).required(),
                FormField::choice(
                    "service_type",
                    "Service type",
                    &self.service_type,
                    &self.service_types,
                )
                .required(),
            ],
            3 => {
                let durations = EstimatedDuration::ALL.map(EstimatedDuration::label);
                vec![
                    FormField::choice("duration", "Estimated duration", &self.duration, &durations)
                        .required(),
                    FormField::choice("crew", "Crew", &self.crew, &self.crews),
                ]
            }
            _ => vec![FormField::text("notes", "Notes", &self.notes)],
        }
    }

    fn set_field(&mut self, key: &str, value: &str) -> bool {
        let target = match key {
            "date" => &mut self.date,
            "time" => &mut self.time,
            "service_type" => &mut self.service_type,
            "duration" => &mut self.duration,
            "crew" => &mut self.crew,
            "notes" => &mut self.notes,
            _ => return false,
        };
        *target = value.to_owned();
        true
    }

    fn output(&self) -> Option<Self::Output> {
        let crew = self.crew.trim();
        Some(ScheduledService {
            date: parse_date(&self.date)?,
            time: self.time.trim().to_owned(),
            service_type: self.service_type.trim().to_owned(),
            duration: EstimatedDuration::parse(&self.duration)?,
            crew: (!crew.is_empty()).then(|| crew.to_owned()),
            notes: self.notes.trim().to_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: LeadStatus,
    pub notes: String,
    pub follow_up: Option<Date>,
}

/// Three steps: status, notes, optional follow-up date.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusUpdateForm {
    pub status: String,
    pub notes: String,
    pub follow_up: String,
}

impl StatusUpdateForm {
    pub fn for_status(current: LeadStatus) -> Self {
        Self {
            status: current.as_str().to_owned(),
            ..Self::default()
        }
    }
}

impl WizardForm for StatusUpdateForm {
    type Output = StatusUpdate;

    fn step_count(&self) -> usize {
        3
    }

    fn step_complete(&self, step: usize) -> bool {
        match step {
            1 => LeadStatus::parse(&self.status).is_some(),
            3 => !filled(&self.follow_up) || parse_date(&self.follow_up).is_some(),
            _ => true,
        }
    }

    fn fields(&self, step: usize) -> Vec<FormField> {
        match step {
            1 => {
                let statuses = LeadStatus::ALL.map(LeadStatus::as_str);
                vec![FormField::choice("status", "Status", &self.status, &statuses).required()]
            }
            2 => vec![FormField::text("notes", "Notes", &self.notes)],
            _ => vec![FormField::date(
                "follow_up",
                "Follow-up date (YYYY-MM-DD)",
                &self.follow_up,
            )],
        }
    }

    fn set_field(&mut self, key: &str, value: &str) -> bool {
        let target = match key {
            "status" => &mut self.status,
            "notes" => &mut self.notes,
            "follow_up" => &mut self.follow_up,
            _ => return false,
        };
        *target = value.to_owned();
        true
    }

    fn output(&self) -> Option<Self::Output> {
        let follow_up = if filled(&self.follow_up) {
            Some(parse_date(&self.follow_up)?)
        } else {
            None
        };
        Some(StatusUpdate {
            status: LeadStatus::parse(&self.status)?,
            notes: self.notes.trim().to_owned(),
            follow_up,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCrewMember {
    pub name: String,
    pub role: String,
    pub phone: String,
    pub email: String,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCrew {
    pub name: String,
    pub specialties: BTreeSet<String>,
    pub leader: NewCrewMember,
}

/// Two steps: crew, then leader.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddCrewForm {
    pub name: String,
    pub specialties: String,
    pub leader_name: String,
    pub leader_role: String,
    pub leader_phone: String,
    pub leader_email: String,
}

impl WizardForm for AddCrewForm {
    type Output = NewCrew;

    fn step_count(&self) -> usize {
        2
    }

    fn step_complete(&self, step: usize) -> bool {
        match step {
            1 => filled(&self.name),
            _ => filled(&self.leader_name),
        }
    }

    fn fields(&self, step: usize) -> Vec<FormField> {
        match step {
            1 => vec![
                FormField::text("name", "Crew name", &self.name).required(),
                FormField::text(
                    "specialties",
                    "Specialties (comma separated)",
                    &self.specialties,
                ),
            ],
            _ => vec![
                FormField::text("leader_name", "Leader name", &self.leader_name).required(),
                FormField::text("leader_role", "Leader role", &self.leader_role),
                FormField::text("leader_phone", "Leader phone", &self.leader_phone),
                FormField::text("leader_email", "Leader email", &self.leader_email),
            ],
        }
    }

    fn set_field(&mut self, key: &str, value: &str) -> bool {
        let target = match key {
            "name" => &mut self.name,
            "specialties" => &mut self.specialties,
            "leader_name" => &mut self.leader_name,
            "leader_role" => &mut self.leader_role,
            "leader_phone" => &mut self.leader_phone,
            "leader_email" => &mut self.leader_email,
            _ => return false,
        };
        *target = value.to_owned();
        true
    }

    fn output(&self) -> Option<Self::Output> {
        Some(NewCrew {
            name: self.name.trim().to_owned(),
            specialties: comma_list(&self.specialties).into_iter().collect(),
            leader: NewCrewMember {
                name: self.leader_name.trim().to_owned(),
                role: self.leader_role.trim().to_owned(),
                phone: self.leader_phone.trim().to_owned(),
                email: self.leader_email.trim().to_owned(),
                skills: Vec::new(),
                certifications: Vec::new(),
            },
        })
    }
}

/// Single step. The role is picked from the fixed trade list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddMemberForm {
    pub name: String,
    pub role: String,
    pub phone: String,
    pub email: String,
    pub skills: String,
    pub certifications: String,
}

impl WizardForm for AddMemberForm {
    type Output = NewCrewMember;

    fn step_count(&self) -> usize {
        1
    }

    fn step_complete(&self, _step: usize) -> bool {
        filled(&self.name) && MEMBER_ROLES.contains(&self.role.trim())
    }

    fn fields(&self, _step: usize) -> Vec<FormField> {
        vec![
            FormField::text("name", "Name", &self.name).required(),
            FormField::choice("role", "Role", &self.role, &MEMBER_ROLES).required(),
            FormField::text("phone", "Phone", &self.phone),
            FormField::text("email", "Email", &self.email),
            FormField::text("skills", "Skills (comma separated)", &self.skills),
            FormField::text(
                "certifications",
                "Certifications (comma separated)",
                &self.certifications,
            ),
        ]
    }

    fn set_field(&mut self, key: &str, value: &str) -> bool {
        let target = match key {
            "name" => &mut self.name,
            "role" => &mut self.role,
            "phone" => &mut self.phone,
            "email" => &mut self.email,
            "skills" => &mut self.skills,
            "certifications" => &mut self.certifications,
            _ => return false,
        };
        *target = value.to_owned();
        true
    }

    fn output(&self) -> Option<Self::Output> {
        Some(NewCrewMember {
            name: self.name.trim().to_owned(),
            role: self.role.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            email: self.email.trim().to_owned(),
            skills: comma_list(&self.skills),
            certifications: comma_list(&self.certifications),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProperty {
    pub address: String,
    pub size: String,
    pub kind: String,
    pub budget_cents: Option<i64>,
    pub features: Vec<String>,
    pub notes: String,
}

/// Two steps: project details, then features and notes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddPropertyForm {
    pub address: String,
    pub size: String,
    pub kind: String,
    pub budget: String,
    pub features: String,
    pub notes: String,
}

impl WizardForm for AddPropertyForm {
    type Output = NewProperty;

    fn step_count(&self) -> usize {
        2
    }

    fn step_complete(&self, step: usize) -> bool {
        match step {
            1 => {
                filled(&self.address)
                    && (!filled(&self.budget) || parse_money_cents(&self.budget).is_some())
            }
            _ => true,
        }
    }

    fn fields(&self, step: usize) -> Vec<FormField> {
        match step {
            1 => vec![
                FormField::text("address", "Address", &self.address).required(),
                FormField::text("size", "Size", &self.size),
                FormField::text("kind", "Project type", &self.kind),
                FormField::text("budget", "Budget", &self.budget),
            ],
            _ => vec![
                FormField::text("features", "Features (comma separated)", &self.features),
                FormField::text("notes", "Project notes", &self.notes),
            ],
        }
    }

    fn set_field(&mut self, key: &str, value: &str) -> bool {
        let target = match key {
            "address" => &mut self.address,
            "size" => &mut self.size,
            "kind" => &mut self.kind,
            "budget" => &mut self.budget,
            "features" => &mut self.features,
            "notes" => &mut self.notes,
            _ => return false,
        };
        *target = value.to_owned();
        true
    }

    fn output(&self) -> Option<Self::Output> {
        let budget_cents = if filled(&self.budget) {
            Some(parse_money_cents(&self.budget)?)
        } else {
            None
        };
        Some(NewProperty {
            address: self.address.trim().to_owned(),
            size: self.size.trim().to_owned(),
            kind: self.kind.trim().to_owned(),
            budget_cents,
            features: comma_list(&self.features),
            notes: self.notes.trim().to_owned(),
        })
    }
}

/// Single step over the company block shown on the settings page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompanyInfoForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

impl CompanyInfoForm {
    pub fn from_company(company: &CompanyInfo) -> Self {
        Self {
            name: company.name.clone(),
            phone: company.phone.clone(),
            email: company.email.clone(),
            address: company.address.clone(),
        }
    }
}

impl WizardForm for CompanyInfoForm {
    type Output = CompanyInfo;

    fn step_count(&self) -> usize {
        1
    }

    fn step_complete(&self, _step: usize) -> bool {
        filled(&self.name)
    }

    fn fields(&self, _step: usize) -> Vec<FormField> {
        vec![
            FormField::text("name", "Company name", &self.name).required(),
            FormField::text("phone", "Phone", &self.phone),
            FormField::text("email", "Email", &self.email),
            FormField::text("address", "Address", &self.address),
        ]
    }

    fn set_field(&mut self, key: &str, value: &str) -> bool {
        let target = match key {
            "name" => &mut self.name,
            "phone" => &mut self.phone,
            "email" => &mut self.email,
            "address" => &mut self.address,
            _ => return false,
        };
        *target = value.to_owned();
        true
    }

    fn output(&self) -> Option<Self::Output> {
        Some(CompanyInfo {
            name: self.name.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            email: self.email.trim().to_owned(),
            address: self.address.trim().to_owned(),
        })
    }
}
