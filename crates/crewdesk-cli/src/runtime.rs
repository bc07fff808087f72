// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use crewdesk_app::{
    CompanyInfo, Crew, CrewId, CrewMemberId, Lead, LeadDraft, LeadId, LeadStatus, NewCrew,
    NewCrewMember, NewProperty, ParsedImport, Property, PropertyId, RecordBook, ScheduledService,
    SectionEdit, Settings, StatusUpdate, parse_delimited,
};
use crewdesk_tui::AppRuntime;
use std::fs;
use std::path::Path;
use time::{Date, OffsetDateTime};

/// In-memory book behind the TUI. Nothing outlives the process.
pub struct BookRuntime {
    book: RecordBook,
    settings: Settings,
    default_status: LeadStatus,
    today: fn() -> Date,
}

impl BookRuntime {
    pub fn new(book: RecordBook, settings: Settings, default_status: LeadStatus) -> Self {
        Self {
            book,
            settings,
            default_status,
            today: utc_today,
        }
    }

    #[cfg(test)]
    fn with_today(mut self, today: fn() -> Date) -> Self {
        self.today = today;
        self
    }

    pub fn book(&self) -> &RecordBook {
        &self.book
    }

    /// Reads and commits a CSV/TSV file in one go, returning the parse so the
    /// caller can report on it.
    pub fn import_file(&mut self, path: &Path) -> Result<(ParsedImport, Vec<LeadId>)> {
        let raw = fs::read_to_string(path).with_context(|| {
            format!(
                "read import file {} -- check the path and retry",
                path.display()
            )
        })?;
        let parsed = parse_delimited(&raw);
        if parsed.is_empty() {
            bail!(
                "import file {} has no data rows -- add a header line and at least one row",
                path.display()
            );
        }
        let ids = self.add_leads(parsed.lead_drafts())?;
        Ok((parsed, ids))
    }
}

fn utc_today() -> Date {
    OffsetDateTime::now_utc().date()
}

impl AppRuntime for BookRuntime {
    fn load_leads(&mut self) -> Result<Vec<Lead>> {
        Ok(self.book.leads().to_vec())
    }

    fn load_crews(&mut self) -> Result<Vec<Crew>> {
        Ok(self.book.crews().to_vec())
    }

    fn load_properties(&mut self) -> Result<Vec<Property>> {
        Ok(self.book.properties().to_vec())
    }

    fn load_settings(&mut self) -> Result<Settings> {
        Ok(self.settings.clone())
    }

    fn add_leads(&mut self, drafts: Vec<LeadDraft>) -> Result<Vec<LeadId>> {
        let today = (self.today)();
        Ok(self.book.add_leads(drafts, self.default_status, today))
    }

    fn apply_status_update(&mut self, lead_id: &str, update: StatusUpdate) -> Result<()> {
        self.book.apply_status_update(lead_id, update, (self.today)())
    }

    fn schedule_service(&mut self, lead_id: &str, service: ScheduledService) -> Result<()> {
        self.book.schedule_service(lead_id, service, (self.today)())
    }

    fn save_lead_section(&mut self, lead_id: &str, edit: SectionEdit) -> Result<()> {
        self.book.save_lead_section(lead_id, edit)
    }

    fn add_crew(&mut self, crew: NewCrew) -> Result<CrewId> {
        Ok(self.book.add_crew(crew))
    }

    fn add_crew_member(&mut self, crew_id: &str, member: NewCrewMember) -> Result<CrewMemberId> {
        self.book.add_crew_member(crew_id, member)
    }

    fn add_property(&mut self, property: NewProperty) -> Result<PropertyId> {
        Ok(self.book.add_property(property))
    }

    /// Applies to this session only; the config file is not rewritten.
    fn save_company(&mut self, company: CompanyInfo) -> Result<()> {
        self.settings.company = company;
        Ok(())
    }

    fn add_service_type(&mut self, name: &str) -> Result<bool> {
        Ok(self.settings.services.add(name))
    }

    fn remove_service_type(&mut self, index: usize) -> Result<Option<String>> {
        Ok(self.settings.services.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::BookRuntime;
    use anyhow::Result;
    use crewdesk_app::{CompanyInfo, LeadStatus, RecordBook, Settings, StatusUpdate};
    use crewdesk_testkit::{demo_book, fixture_date, temp_import_file};
    use crewdesk_tui::AppRuntime;

    fn runtime(book: RecordBook, status: LeadStatus) -> BookRuntime {
        BookRuntime::new(book, Settings::default(), status).with_today(fixture_date)
    }

    #[test]
    fn import_file_commits_every_row_with_default_status() -> Result<()> {
        let (_dir, path) = temp_import_file(
            "name\temail\nAda\tada@example.com\nBo\tbo@example.com\nCy\tcy@example.com\n",
            "tsv",
        )?;
        let mut runtime = runtime(RecordBook::default(), LeadStatus::Contacted);

        let (parsed, ids) = runtime.import_file(&path)?;
        assert_eq!(parsed.summary(), "3 rows parsed (tsv)");
        assert_eq!(ids.len(), 3);
        let leads = runtime.load_leads()?;
        assert!(leads.iter().all(|lead| lead.status == LeadStatus::Contacted));
        assert!(leads.iter().all(|lead| lead.date == fixture_date()));
        Ok(())
    }

    #[test]
    fn import_file_reports_missing_file() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut runtime = runtime(RecordBook::default(), LeadStatus::New);
        let error = runtime
            .import_file(&temp.path().join("nope.csv"))
            .expect_err("missing file should fail");
        assert!(error.to_string().contains("check the path and retry"));
        Ok(())
    }

    #[test]
    fn import_file_rejects_header_only_file() -> Result<()> {
        let (_dir, path) = temp_import_file("name,email\n", "csv")?;
        let mut runtime = runtime(RecordBook::default(), LeadStatus::New);
        let error = runtime
            .import_file(&path)
            .expect_err("header-only file should fail");
        assert!(error.to_string().contains("no data rows"));
        assert!(runtime.book().leads().is_empty());
        Ok(())
    }

    #[test]
    fn status_update_is_stamped_with_today() -> Result<()> {
        let mut runtime = runtime(demo_book(), LeadStatus::New);
        runtime.apply_status_update(
            "2",
            StatusUpdate {
                status: LeadStatus::Contacted,
                notes: "left voicemail".to_owned(),
                follow_up: None,
            },
        )?;
        let lead = runtime.book().find_lead("2").expect("lead 2");
        let entry = lead.history.last().expect("history entry");
        assert_eq!(entry.date, fixture_date());
        assert_eq!(entry.notes, "left voicemail");
        Ok(())
    }

    #[test]
    fn unknown_lead_update_fails() {
        let mut runtime = runtime(demo_book(), LeadStatus::New);
        let result = runtime.apply_status_update(
            "99",
            StatusUpdate {
                status: LeadStatus::Contacted,
                notes: String::new(),
                follow_up: None,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn service_types_round_trip_through_settings() -> Result<()> {
        let mut runtime = runtime(RecordBook::default(), LeadStatus::New);
        assert!(runtime.add_service_type("Decks")?);
        assert!(!runtime.add_service_type("decks")?);
        let last = runtime.load_settings()?.services.types().len() - 1;
        assert_eq!(runtime.remove_service_type(last)?.as_deref(), Some("Decks"));
        Ok(())
    }

    #[test]
    fn company_edit_replaces_session_settings() -> Result<()> {
        let mut runtime = runtime(RecordBook::default(), LeadStatus::New);
        runtime.save_company(CompanyInfo {
            name: "Bayou Builders".to_owned(),
            ..CompanyInfo::default()
        })?;
        assert_eq!(runtime.load_settings()?.company.name, "Bayou Builders");
        Ok(())
    }
}
