// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crewdesk_app::{
    CsvImportForm, Delimiter, LeadCounts, LeadStatus, RecordBook, SortDirection, Wizard,
    WizardCommand, WizardEvent, lead_table,
};
use crewdesk_testkit::{LeadFaker, demo_book, fixture_date};

fn import_wizard(text: &str) -> Wizard<CsvImportForm> {
    let mut wizard = Wizard::new(CsvImportForm::default());
    wizard.dispatch(WizardCommand::Open);
    wizard.set_field("text", text);
    wizard
}

#[test]
fn committing_an_import_adds_one_lead_per_row() {
    let mut book = RecordBook::default();
    let mut wizard =
        import_wizard("name,email,phone,serviceType\nJ. Doe,j@x.com,555-1111,Lawn Mowing");

    let (events, added) =
        wizard.commit(|drafts| Ok(book.add_leads(drafts, LeadStatus::New, fixture_date())));
    assert_eq!(events, vec![WizardEvent::Committed, WizardEvent::Closed]);
    assert_eq!(added.map(|ids| ids.len()), Some(1));

    assert_eq!(book.leads().len(), 1);
    let lead = &book.leads()[0];
    assert_eq!(lead.name, "J. Doe");
    assert_eq!(lead.email, "j@x.com");
    assert_eq!(lead.phone, "555-1111");
    assert_eq!(lead.service_type, "Lawn Mowing");
    assert_eq!(lead.status, LeadStatus::New);
}

#[test]
fn configured_default_status_applies_to_imports() {
    let mut book = RecordBook::default();
    let mut wizard = import_wizard("name\nA\nB");
    wizard.commit(|drafts| Ok(book.add_leads(drafts, LeadStatus::Contacted, fixture_date())));
    assert!(
        book.leads()
            .iter()
            .all(|lead| lead.status == LeadStatus::Contacted)
    );
}

#[test]
fn commit_imports_every_row_not_just_preview() {
    let text = LeadFaker::new(11).delimited(12, Delimiter::Tab);
    let mut book = demo_book();
    let before = book.leads().len();
    let mut wizard = import_wizard(&text);
    assert_eq!(wizard.form().parsed().preview().rows.len(), 5);
    assert_eq!(wizard.form().parsed().preview().remaining, 7);

    wizard.commit(|drafts| Ok(book.add_leads(drafts, LeadStatus::New, fixture_date())));
    assert_eq!(book.leads().len(), before + 12);
    assert_eq!(book.leads().last().map(|lead| lead.id.as_str()), Some("17"));
}

#[test]
fn imported_leads_show_up_in_the_table_without_refresh() {
    let mut book = demo_book();
    let mut table = lead_table(10);
    table.set_sort("name", Some(SortDirection::Asc));
    table.set_query("zed");
    assert_eq!(table.visible_rows(book.leads()).filtered_rows, 0);

    let mut wizard = import_wizard("name,email\nZed Zimmer,zed@example.com");
    wizard.commit(|drafts| Ok(book.add_leads(drafts, LeadStatus::New, fixture_date())));

    let page = table.visible_rows(book.leads());
    assert_eq!(page.filtered_rows, 1);
    assert_eq!(page.rows[0].name, "Zed Zimmer");
    assert_eq!(LeadCounts::from_leads(book.leads()).new, 2);
}

#[test]
fn empty_import_cannot_be_committed() {
    let mut book = RecordBook::default();
    let mut wizard = import_wizard("name,email\n\n");
    let (events, added) =
        wizard.commit(|drafts| Ok(book.add_leads(drafts, LeadStatus::New, fixture_date())));
    assert_eq!(events, vec![WizardEvent::CommitRefused { step: 1 }]);
    assert!(added.is_none());
    assert!(wizard.is_open());
    assert!(book.leads().is_empty());
}
