// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use crate::{
    Cell, Column, Crew, FieldColumn, Lead, Property, Record, RecordKind, SortDirection, TableView,
};

impl Record for Lead {
    const KIND: RecordKind = RecordKind::Lead;

    fn record_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Record for Crew {
    const KIND: RecordKind = RecordKind::Crew;

    fn record_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Record for Property {
    const KIND: RecordKind = RecordKind::Property;

    fn record_id(&self) -> &str {
        self.id.as_str()
    }
}

/// Orders by pipeline position rather than by label text.
struct LeadStatusColumn;

impl Column<Lead> for LeadStatusColumn {
    fn key(&self) -> &'static str {
        "status"
    }

    fn label(&self) -> &'static str {
        "Status"
    }

    fn render_cell(&self, lead: &Lead) -> Cell {
        Cell::status(lead.status.as_str(), lead.status.color())
    }

    fn compare(&self, left: &Lead, right: &Lead) -> Ordering {
        left.status.rank().cmp(&right.status.rank())
    }
}

fn lead_name(lead: &Lead) -> Cell {
    Cell::text(lead.name.as_str())
}

fn lead_service(lead: &Lead) -> Cell {
    Cell::text(lead.service_type.as_str())
}

fn lead_date(lead: &Lead) -> Cell {
    Cell::Date(Some(lead.date))
}

pub fn lead_columns() -> Vec<Box<dyn Column<Lead>>> {
    vec![
        FieldColumn::new("name", "Name", lead_name).searchable().boxed(),
        FieldColumn::new("email", "Email", |lead: &Lead| Cell::text(lead.email.as_str()))
            .searchable()
            .unsortable()
            .boxed(),
        FieldColumn::new("phone", "Phone", |lead: &Lead| Cell::text(lead.phone.as_str()))
            .unsortable()
            .boxed(),
        FieldColumn::new("service_type", "Service", lead_service)
            .searchable()
            .boxed(),
        Box::new(LeadStatusColumn),
        FieldColumn::new("date", "Date", lead_date).boxed(),
        FieldColumn::new("property_size", "Size", |lead: &Lead| {
            Cell::text(lead.property_size.as_str())
        })
        .unsortable()
        .boxed(),
    ]
}

pub fn lead_table(page_size: usize) -> TableView<Lead> {
    TableView::new("leads", lead_columns()).with_page_size(page_size)
}

/// Newest first.
pub fn recent_leads_table(page_size: usize) -> TableView<Lead> {
    let mut table = TableView::new(
        "recent leads",
        vec![
            FieldColumn::new("name", "Name", lead_name).boxed(),
            FieldColumn::new("service_type", "Service", lead_service).boxed(),
            Box::new(LeadStatusColumn),
            FieldColumn::new("date", "Date", lead_date).boxed(),
        ],
    )
    .with_page_size(page_size);
    table.set_sort("date", Some(SortDirection::Desc));
    table
}

pub fn crew_columns() -> Vec<Box<dyn Column<Crew>>> {
    vec![
        FieldColumn::new("name", "Crew", |crew: &Crew| Cell::text(crew.name.as_str()))
            .searchable()
            .boxed(),
        FieldColumn::new("leader", "Leader", |crew: &Crew| {
            Cell::text(crew.leader.name.as_str())
        })
        .boxed(),
        FieldColumn::new("leader_status", "Leader status", |crew: &Crew| {
            Cell::status(crew.leader.status.as_str(), crew.leader.status.color())
        })
        .boxed(),
        FieldColumn::new("rating", "Rating", |crew: &Crew| {
            Cell::Decimal(Some(crew.rating))
        })
        .boxed(),
        FieldColumn::new("specialties", "Specialties", |crew: &Crew| {
            Cell::List(crew.specialties.iter().cloned().collect())
        })
        .searchable()
        .unsortable()
        .boxed(),
        FieldColumn::new("active_jobs", "Active", |crew: &Crew| {
            Cell::Integer(i64::from(crew.active_jobs))
        })
        .boxed(),
        FieldColumn::new("completed_jobs", "Completed", |crew: &Crew| {
            Cell::Integer(i64::from(crew.completed_jobs))
        })
        .boxed(),
    ]
}

pub fn crew_table(page_size: usize) -> TableView<Crew> {
    TableView::new("crews", crew_columns()).with_page_size(page_size)
}

pub fn property_columns() -> Vec<Box<dyn Column<Property>>> {
    vec![
        FieldColumn::new("address", "Address", |property: &Property| {
            Cell::text(property.address.as_str())
        })
        .searchable()
        .boxed(),
        FieldColumn::new("kind", "Type", |property: &Property| {
            Cell::text(property.kind.as_str())
        })
        .searchable()
        .boxed(),
        FieldColumn::new("size", "Size", |property: &Property| {
            Cell::text(property.size.as_str())
        })
        .unsortable()
        .boxed(),
        FieldColumn::new("project_status", "Project status", |property: &Property| {
            Cell::status(
                property.project_status.as_str(),
                property.project_status.color(),
            )
        })
        .boxed(),
        FieldColumn::new("budget", "Budget", |property: &Property| {
            Cell::Money(property.budget_cents)
        })
        .boxed(),
        FieldColumn::new("next_service", "Next service", |property: &Property| {
            Cell::Date(property.next_service)
        })
        .boxed(),
    ]
}

pub fn property_table(page_size: usize) -> TableView<Property> {
    TableView::new("properties", property_columns()).with_page_size(page_size)
}
