// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use std::collections::BTreeMap;
use time::Date;

use crate::{
    FormField, Lead, LeadId, LeadSection, LeadStatus, PropertyDetails, format_money, parse_date,
    parse_money_cents,
};

/// A validated section save, ready to apply to its lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionEdit {
    Contact {
        email: String,
        phone: String,
        address: String,
    },
    Service {
        date: Date,
        time: String,
        property_size: String,
        estimated_cost_cents: Option<i64>,
    },
    Notes(String),
    PropertyDetails(PropertyDetails),
    Status(LeadStatus),
}

impl SectionEdit {
    pub fn section(&self) -> LeadSection {
        match self {
            Self::Contact { .. } => LeadSection::Contact,
            Self::Service { .. } => LeadSection::Service,
            Self::Notes(_) => LeadSection::Notes,
            Self::PropertyDetails(_) => LeadSection::PropertyDetails,
            Self::Status(_) => LeadSection::Status,
        }
    }

    pub fn apply(self, lead: &mut Lead) {
        match self {
            Self::Contact {
                email,
                phone,
                address,
            } => {
                lead.email = email;
                lead.phone = phone;
                lead.address = address;
            }
            Self::Service {
                date,
                time,
                property_size,
                estimated_cost_cents,
            } => {
                lead.date = date;
                lead.time = time;
                lead.property_size = property_size;
                lead.estimated_cost_cents = estimated_cost_cents;
            }
            Self::Notes(notes) => lead.notes = notes,
            Self::PropertyDetails(details) => lead.property_details = details,
            Self::Status(status) => lead.status = status,
        }
    }
}

/// `(key, label)` pairs of each section, in display order.
pub fn section_keys(section: LeadSection) -> &'static [(&'static str, &'static str)] {
    match section {
        LeadSection::Contact => &[
            ("email", "Email"),
            ("phone", "Phone"),
            ("address", "Address"),
        ],
        LeadSection::Service => &[
            ("date", "Date (YYYY-MM-DD)"),
            ("time", "Time"),
            ("property_size", "Property size"),
            ("estimated_cost", "Estimated cost"),
        ],
        LeadSection::Notes => &[("notes", "Notes")],
        LeadSection::PropertyDetails => &[
            ("lawn_type", "Lawn type"),
            ("obstacles", "Obstacles"),
            ("slope", "Slope"),
            ("fencing", "Fencing"),
            ("pets", "Pets"),
            ("special_instructions", "Special instructions"),
        ],
        LeadSection::Status => &[("status", "Status")],
    }
}

fn lead_value(lead: &Lead, key: &str) -> String {
    let details = &lead.property_details;
    match key {
        "email" => lead.email.clone(),
        "phone" => lead.phone.clone(),
        "address" => lead.address.clone(),
        "date" => lead.date.to_string(),
        "time" => lead.time.clone(),
        "property_size" => lead.property_size.clone(),
        "estimated_cost" => lead
            .estimated_cost_cents
            .map(format_money)
            .unwrap_or_default(),
        "notes" => lead.notes.clone(),
        "lawn_type" => details.lawn_type.clone(),
        "obstacles" => details.obstacles.clone(),
        "slope" => details.slope.clone(),
        "fencing" => details.fencing.clone(),
        "pets" => details.pets.clone(),
        "special_instructions" => details.special_instructions.clone(),
        "status" => lead.status.as_str().to_owned(),
        _ => String::new(),
    }
}

/// Per-section edit drafts for one lead. Sections edit independently; any
/// number may be open at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadDetailEditor {
    lead_id: LeadId,
    drafts: BTreeMap<LeadSection, BTreeMap<&'static str, String>>,
}

impl LeadDetailEditor {
    pub fn new(lead_id: LeadId) -> Self {
        Self {
            lead_id,
            drafts: BTreeMap::new(),
        }
    }

    pub fn lead_id(&self) -> &LeadId {
        &self.lead_id
    }

    pub fn is_editing(&self, section: LeadSection) -> bool {
        self.drafts.contains_key(&section)
    }

    pub fn editing_sections(&self) -> impl Iterator<Item = LeadSection> + '_ {
        self.drafts.keys().copied()
    }

    /// Snapshots the lead's current values. Re-entering an open section keeps
    /// its draft.
    pub fn begin_edit(&mut self, section: LeadSection, lead: &Lead) {
        self.drafts.entry(section).or_insert_with(|| {
            section_keys(section)
                .iter()
                .map(|(key, _)| (*key, lead_value(lead, key)))
                .collect()
        });
    }

    pub fn set_field(&mut self, section: LeadSection, key: &str, value: &str) -> bool {
        let Some(draft) = self.drafts.get_mut(&section) else {
            return false;
        };
        match draft.get_mut(key) {
            Some(slot) => {
                *slot = value.to_owned();
                true
            }
            None => false,
        }
    }

    /// Draft values while editing, otherwise the lead's own.
    pub fn fields(&self, section: LeadSection, lead: &Lead) -> Vec<FormField> {
        section_keys(section)
            .iter()
            .map(|&(key, label)| {
                let value = self
                    .drafts
                    .get(&section)
                    .and_then(|draft| draft.get(key).cloned())
                    .unwrap_or_else(|| lead_value(lead, key));
                match key {
                    "status" => {
                        let statuses = LeadStatus::ALL.map(LeadStatus::as_str);
                        FormField::choice(key, label, &value, &statuses)
                    }
                    "date" => FormField::date(key, label, &value).required(),
                    _ => FormField::text(key, label, &value),
                }
            })
            .collect()
    }

    pub fn cancel(&mut self, section: LeadSection) -> bool {
        self.drafts.remove(&section).is_some()
    }

    /// Validates the section's draft. The draft is closed only when it
    /// validates.
    pub fn save(&mut self, section: LeadSection) -> Result<SectionEdit> {
        let draft = self
            .drafts
            .get(&section)
            .ok_or_else(|| anyhow!("{} is not being edited", section.label()))?;
        let value = |key: &str| {
            draft
                .get(key)
                .map(|value| value.trim().to_owned())
                .unwrap_or_default()
        };

        let edit = match section {
            LeadSection::Contact => SectionEdit::Contact {
                email: value("email"),
                phone: value("phone"),
                address: value("address"),
            },
            LeadSection::Service => {
                let raw_date = value("date");
                let Some(date) = parse_date(&raw_date) else {
                    bail!("service date {raw_date:?} is not YYYY-MM-DD -- fix the date and retry");
                };
                let raw_cost = value("estimated_cost");
                let estimated_cost_cents = if raw_cost.is_empty() {
                    None
                } else {
                    Some(parse_money_cents(&raw_cost).ok_or_else(|| {
                        anyhow!("estimated cost {raw_cost:?} is not an amount -- fix and retry")
                    })?)
                };
                SectionEdit::Service {
                    date,
                    time: value("time"),
                    property_size: value("property_size"),
                    estimated_cost_cents,
                }
            }
            LeadSection::Notes => SectionEdit::Notes(value("notes")),
            LeadSection::PropertyDetails => SectionEdit::PropertyDetails(PropertyDetails {
                lawn_type: value("lawn_type"),
                obstacles: value("obstacles"),
                slope: value("slope"),
                fencing: value("fencing"),
                pets: value("pets"),
                special_instructions: value("special_instructions"),
            }),
            LeadSection::Status => {
                let raw = value("status");
                let status = LeadStatus::parse(&raw).ok_or_else(|| {
                    anyhow!("unknown status {raw:?} -- choose one of the listed statuses")
                })?;
                SectionEdit::Status(status)
            }
        };

        self.drafts.remove(&section);
        Ok(edit)
    }
}
