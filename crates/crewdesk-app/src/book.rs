// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use time::Date;

use crate::{
    Crew, CrewId, CrewMember, CrewMemberId, HistoryEntry, Lead, LeadId, LeadStatus, MemberStatus,
    NewCrew, NewCrewMember, NewProperty, ProjectStatus, Property, PropertyId, ScheduledService,
    SectionEdit, StatusUpdate, next_numeric_id, parse_date,
};

/// Lead fields as entered by hand or read from an import row. `status` and
/// `date` stay raw until the book resolves them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeadDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service_type: String,
    pub address: String,
    pub property_size: String,
    pub notes: String,
    pub status: Option<String>,
    pub date: Option<String>,
}

/// The one owner of every record collection. Views borrow the slices; all
/// mutation goes through the methods below.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordBook {
    leads: Vec<Lead>,
    crews: Vec<Crew>,
    properties: Vec<Property>,
}

impl RecordBook {
    pub fn new(leads: Vec<Lead>, crews: Vec<Crew>, properties: Vec<Property>) -> Self {
        Self {
            leads,
            crews,
            properties,
        }
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn crews(&self) -> &[Crew] {
        &self.crews
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn find_lead(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|lead| lead.id.as_str() == id)
    }

    pub fn find_crew(&self, id: &str) -> Option<&Crew> {
        self.crews.iter().find(|crew| crew.id.as_str() == id)
    }

    pub fn find_property(&self, id: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|property| property.id.as_str() == id)
    }

    pub fn crew_names(&self) -> Vec<String> {
        self.crews.iter().map(|crew| crew.name.clone()).collect()
    }

    /// Appends one lead per draft, in order. Unrecognized draft statuses fall
    /// back to `default_status`; missing or unparseable dates to `today`.
    pub fn add_leads(
        &mut self,
        drafts: Vec<LeadDraft>,
        default_status: LeadStatus,
        today: Date,
    ) -> Vec<LeadId> {
        let mut added = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = LeadId::new(next_numeric_id(
                self.leads.iter().map(|lead| lead.id.as_str()),
            ));
            let date = draft
                .date
                .as_deref()
                .and_then(parse_date)
                .unwrap_or(today);
            let status = draft
                .status
                .as_deref()
                .and_then(LeadStatus::parse)
                .unwrap_or(default_status);

            let mut lead = Lead::blank(id.clone(), date);
            lead.name = draft.name;
            lead.email = draft.email;
            lead.phone = draft.phone;
            lead.service_type = draft.service_type;
            lead.address = draft.address;
            lead.property_size = draft.property_size;
            lead.notes = draft.notes;
            lead.status = status;
            lead.history.push(HistoryEntry {
                date: today,
                action: "Lead created".to_owned(),
                notes: String::new(),
            });

            self.leads.push(lead);
            added.push(id);
        }
        added
    }

    pub fn apply_status_update(
        &mut self,
        id: &str,
        update: StatusUpdate,
        today: Date,
    ) -> Result<()> {
        let lead = self.lead_mut(id)?;
        lead.status = update.status;
        if update.follow_up.is_some() {
            lead.follow_up = update.follow_up;
        }
        lead.history.push(HistoryEntry {
            date: today,
            action: format!("Status changed to {}", update.status.label()),
            notes: update.notes,
        });
        Ok(())
    }

    pub fn schedule_service(
        &mut self,
        id: &str,
        service: ScheduledService,
        today: Date,
    ) -> Result<()> {
        let lead = self.lead_mut(id)?;
        lead.status = LeadStatus::Scheduled;
        lead.date = service.date;
        lead.time = service.time.clone();
        lead.service_type = service.service_type.clone();
        lead.engagement.next_service = Some(service.date);

        let mut notes = format!(
            "{} on {} at {} ({})",
            service.service_type,
            service.date,
            service.time,
            service.duration.label()
        );
        if let Some(crew) = &service.crew {
            notes.push_str(&format!(", crew {crew}"));
        }
        if !service.notes.is_empty() {
            notes.push_str(&format!(". {}", service.notes));
        }
        lead.history.push(HistoryEntry {
            date: today,
            action: "Service scheduled".to_owned(),
            notes,
        });
        Ok(())
    }

    pub fn save_lead_section(&mut self, id: &str, edit: SectionEdit) -> Result<()> {
        let lead = self.lead_mut(id)?;
        edit.apply(lead);
        Ok(())
    }

    pub fn add_crew(&mut self, crew: NewCrew) -> CrewId {
        let id = CrewId::new(next_numeric_id(
            self.crews.iter().map(|crew| crew.id.as_str()),
        ));
        let leader = crew_member(self.next_member_id(), crew.leader);

        self.crews.push(Crew {
            id: id.clone(),
            name: crew.name,
            leader,
            members: Vec::new(),
            current_job: None,
            next_job: None,
            rating: 0.0,
            specialties: crew.specialties,
            completed_jobs: 0,
            active_jobs: 0,
        });
        id
    }

    /// Appends an active member to an existing crew. Member ids are unique
    /// across every crew, leaders included.
    pub fn add_crew_member(
        &mut self,
        crew_id: &str,
        member: NewCrewMember,
    ) -> Result<CrewMemberId> {
        let member_id = self.next_member_id();
        let crew = self
            .crews
            .iter_mut()
            .find(|crew| crew.id.as_str() == crew_id)
            .ok_or_else(|| anyhow!("crew {crew_id} not found -- reopen it from the crews list"))?;
        crew.members.push(crew_member(member_id.clone(), member));
        Ok(member_id)
    }

    /// New properties start in planning with no service dates or images.
    pub fn add_property(&mut self, property: NewProperty) -> PropertyId {
        let id = PropertyId::new(next_numeric_id(
            self.properties.iter().map(|property| property.id.as_str()),
        ));
        self.properties.push(Property {
            id: id.clone(),
            address: property.address,
            size: property.size,
            kind: property.kind,
            features: property.features,
            last_service: None,
            next_service: None,
            project_status: ProjectStatus::PlanningPhase,
            budget_cents: property.budget_cents,
            notes: property.notes,
            images: Vec::new(),
            public_gallery_url: None,
        });
        id
    }

    fn next_member_id(&self) -> CrewMemberId {
        CrewMemberId::new(next_numeric_id(self.crews.iter().flat_map(|crew| {
            std::iter::once(crew.leader.id.as_str())
                .chain(crew.members.iter().map(|member| member.id.as_str()))
        })))
    }

    fn lead_mut(&mut self, id: &str) -> Result<&mut Lead> {
        self.leads
            .iter_mut()
            .find(|lead| lead.id.as_str() == id)
            .ok_or_else(|| anyhow!("lead {id} not found -- reopen it from the leads list"))
    }
}

fn crew_member(id: CrewMemberId, member: NewCrewMember) -> CrewMember {
    CrewMember {
        id,
        name: member.name,
        role: member.role,
        phone: member.phone,
        email: member.email,
        status: MemberStatus::Active,
        skills: member.skills,
        certifications: member.certifications,
    }
}

#[cfg(test)]
mod tests {
    use super::{LeadDraft, RecordBook};
    use crate::{
        EstimatedDuration, LeadStatus, MemberStatus, NewCrew, NewCrewMember, NewProperty,
        ProjectStatus, ScheduledService, StatusUpdate,
    };
    use time::macros::date;

    fn member(name: &str) -> NewCrewMember {
        NewCrewMember {
            name: name.to_owned(),
            role: String::new(),
            phone: String::new(),
            email: String::new(),
            skills: Vec::new(),
            certifications: Vec::new(),
        }
    }

    fn draft(name: &str) -> LeadDraft {
        LeadDraft {
            name: name.to_owned(),
            ..LeadDraft::default()
        }
    }

    #[test]
    fn added_leads_get_sequential_ids_and_defaults() {
        let mut book = RecordBook::default();
        let today = date!(2024 - 03 - 01);
        let ids = book.add_leads(vec![draft("A"), draft("B")], LeadStatus::New, today);

        assert_eq!(
            ids.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
            ["1", "2"]
        );
        let lead = book.find_lead("2").expect("lead 2");
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.date, today);
        assert_eq!(lead.history.len(), 1);
    }

    #[test]
    fn draft_status_and_date_override_defaults_when_valid() {
        let mut book = RecordBook::default();
        let today = date!(2024 - 03 - 01);
        let drafts = vec![
            LeadDraft {
                status: Some("Follow-Up".to_owned()),
                date: Some("2023-12-20".to_owned()),
                ..draft("A")
            },
            LeadDraft {
                status: Some("lost".to_owned()),
                date: Some("yesterday".to_owned()),
                ..draft("B")
            },
        ];
        book.add_leads(drafts, LeadStatus::Contacted, today);

        let first = book.find_lead("1").expect("lead 1");
        assert_eq!(first.status, LeadStatus::FollowUp);
        assert_eq!(first.date, date!(2023 - 12 - 20));
        let second = book.find_lead("2").expect("lead 2");
        assert_eq!(second.status, LeadStatus::Contacted);
        assert_eq!(second.date, today);
    }

    #[test]
    fn status_update_records_history_and_follow_up() {
        let mut book = RecordBook::default();
        let today = date!(2024 - 03 - 01);
        book.add_leads(vec![draft("A")], LeadStatus::New, today);

        book.apply_status_update(
            "1",
            StatusUpdate {
                status: LeadStatus::Contacted,
                notes: "left voicemail".to_owned(),
                follow_up: Some(date!(2024 - 03 - 05)),
            },
            today,
        )
        .expect("update applies");

        let lead = book.find_lead("1").expect("lead");
        assert_eq!(lead.status, LeadStatus::Contacted);
        assert_eq!(lead.follow_up, Some(date!(2024 - 03 - 05)));
        let entry = lead.history.last().expect("history entry");
        assert_eq!(entry.action, "Status changed to Contacted");
        assert_eq!(entry.notes, "left voicemail");
    }

    #[test]
    fn updates_to_unknown_leads_fail() {
        let mut book = RecordBook::default();
        let error = book
            .apply_status_update(
                "9",
                StatusUpdate {
                    status: LeadStatus::New,
                    notes: String::new(),
                    follow_up: None,
                },
                date!(2024 - 03 - 01),
            )
            .expect_err("missing lead");
        assert!(error.to_string().contains("lead 9 not found"));
    }

    #[test]
    fn scheduling_marks_lead_scheduled() {
        let mut book = RecordBook::default();
        let today = date!(2024 - 03 - 01);
        book.add_leads(vec![draft("A")], LeadStatus::New, today);

        book.schedule_service(
            "1",
            ScheduledService {
                date: date!(2024 - 03 - 10),
                time: "9:00 AM".to_owned(),
                service_type: "Lawn Mowing".to_owned(),
                duration: EstimatedDuration::OneHour,
                crew: Some("Team A".to_owned()),
                notes: String::new(),
            },
            today,
        )
        .expect("scheduled");

        let lead = book.find_lead("1").expect("lead");
        assert_eq!(lead.status, LeadStatus::Scheduled);
        assert_eq!(lead.date, date!(2024 - 03 - 10));
        assert_eq!(lead.time, "9:00 AM");
        assert_eq!(lead.engagement.next_service, Some(date!(2024 - 03 - 10)));
        assert_eq!(
            lead.history.last().map(|entry| entry.notes.as_str()),
            Some("Lawn Mowing on 2024-03-10 at 9:00 AM (1 hour), crew Team A")
        );
    }

    #[test]
    fn new_crews_get_fresh_ids() {
        let mut book = RecordBook::default();
        let first = book.add_crew(NewCrew {
            name: "Team A".to_owned(),
            specialties: ["Roofing".to_owned()].into_iter().collect(),
            leader: NewCrewMember {
                role: "Lead".to_owned(),
                ..member("Ana")
            },
        });
        let second = book.add_crew(NewCrew {
            name: "Team B".to_owned(),
            specialties: Default::default(),
            leader: member("Bo"),
        });

        assert_eq!(first.as_str(), "1");
        assert_eq!(second.as_str(), "2");
        let crew = book.find_crew("2").expect("crew 2");
        assert_eq!(crew.leader.id.as_str(), "2");
        assert_eq!(book.crew_names(), ["Team A", "Team B"]);
    }

    #[test]
    fn crew_members_get_ids_unique_across_crews() {
        let mut book = RecordBook::default();
        for name in ["Team A", "Team B"] {
            book.add_crew(NewCrew {
                name: name.to_owned(),
                specialties: Default::default(),
                leader: member("Lead"),
            });
        }

        let id = book
            .add_crew_member(
                "1",
                NewCrewMember {
                    role: "Plumber".to_owned(),
                    skills: vec!["Repipes".to_owned()],
                    ..member("Cy")
                },
            )
            .expect("crew 1 exists");
        assert_eq!(id.as_str(), "3");

        let crew = book.find_crew("1").expect("crew 1");
        assert_eq!(crew.headcount(), 2);
        let added = &crew.members[0];
        assert_eq!(added.status, MemberStatus::Active);
        assert_eq!(added.role, "Plumber");
        assert_eq!(added.skills, ["Repipes"]);
        assert_eq!(book.find_crew("2").expect("crew 2").members.len(), 0);
    }

    #[test]
    fn adding_member_to_unknown_crew_fails() {
        let mut book = RecordBook::default();
        let error = book
            .add_crew_member("4", member("Cy"))
            .expect_err("missing crew");
        assert!(error.to_string().contains("crew 4 not found"));
    }

    #[test]
    fn new_properties_start_in_planning() {
        let mut book = RecordBook::default();
        let id = book.add_property(NewProperty {
            address: "9 Bay Rd".to_owned(),
            size: "2,000 sqft".to_owned(),
            kind: "Renovation".to_owned(),
            budget_cents: Some(45_000_000),
            features: vec!["Deck".to_owned()],
            notes: String::new(),
        });

        assert_eq!(id.as_str(), "1");
        let property = book.find_property("1").expect("property 1");
        assert_eq!(property.project_status, ProjectStatus::PlanningPhase);
        assert_eq!(property.budget_cents, Some(45_000_000));
        assert!(property.images.is_empty());
        assert!(property.next_service.is_none());
    }
}
