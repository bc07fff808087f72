// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crewdesk_app::{
    Crew, CrewId, CrewMember, CrewMemberId, Delimiter, EngagementMetrics, HistoryEntry, ImageId,
    Lead, LeadDocument, LeadDraft, LeadId, LeadStatus, MemberStatus, ProjectStatus, Property,
    PropertyDetails, PropertyId, PropertyImage, RecordBook,
};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use time::macros::date;
use time::{Date, Duration};

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];
const STREET_NAMES: [&str; 12] = [
    "Cedar", "Maple", "Oak", "Pine", "Willow", "Elm", "Birch", "Juniper", "Sunset", "Ridge",
    "Valley", "Meadow",
];
const SERVICE_TYPES: [&str; 6] = [
    "Lawn Mowing",
    "Landscaping",
    "Tree Trimming",
    "Fertilization",
    "Kitchen Remodel",
    "Room Addition",
];
const PROPERTY_SIZES: [&str; 6] = [
    "0.25 acres",
    "0.3 acres",
    "0.5 acres",
    "0.75 acres",
    "1 acre",
    "2,200 sqft",
];

/// Date the demo data set is anchored to.
pub fn fixture_date() -> Date {
    date!(2023 - 12 - 26)
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator of plausible leads and import files.
#[derive(Debug, Clone)]
pub struct LeadFaker {
    rng: DeterministicRng,
}

impl LeadFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn lead_draft(&mut self) -> LeadDraft {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        LeadDraft {
            name: format!("{first} {last}"),
            email: format!(
                "{}.{}@example.com",
                first.to_ascii_lowercase(),
                last.to_ascii_lowercase()
            ),
            phone: format!(
                "({:03}) 555-{:04}",
                200 + self.int_n(800),
                self.int_n(10_000)
            ),
            service_type: self.pick(&SERVICE_TYPES).to_owned(),
            address: format!("{} {} St", 100 + self.int_n(9_900), self.pick(&STREET_NAMES)),
            property_size: self.pick(&PROPERTY_SIZES).to_owned(),
            notes: String::new(),
            status: None,
            date: None,
        }
    }

    /// `count` leads with ids `1..=count`, dated backwards from `newest`.
    pub fn leads(&mut self, count: usize, newest: Date) -> Vec<Lead> {
        (0..count)
            .map(|index| {
                let draft = self.lead_draft();
                let date = newest - Duration::days(self.int_n(60) as i64);
                let mut lead = Lead::blank(LeadId::new((index + 1).to_string()), date);
                lead.name = draft.name;
                lead.email = draft.email;
                lead.phone = draft.phone;
                lead.service_type = draft.service_type;
                lead.address = draft.address;
                lead.property_size = draft.property_size;
                lead.status = LeadStatus::ALL[self.int_n(LeadStatus::ALL.len())];
                lead
            })
            .collect()
    }

    /// Header plus `rows` lines in the given delimiter. Values never contain
    /// the delimiter.
    pub fn delimited(&mut self, rows: usize, delimiter: Delimiter) -> String {
        let separator = char::from(delimiter.byte()).to_string();
        let mut text = ["name", "email", "phone", "serviceType", "propertySize"].join(&separator);
        text.push('\n');
        for _ in 0..rows {
            let draft = self.lead_draft();
            let line = [
                draft.name,
                draft.email,
                draft.phone,
                draft.service_type,
                draft.property_size,
            ]
            .join(&separator);
            text.push_str(&line);
            text.push('\n');
        }
        text
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.int_n(items.len())]
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

fn demo_lead(id: &str, name: &str, status: LeadStatus, date: Date) -> Lead {
    let mut lead = Lead::blank(LeadId::new(id), date);
    lead.name = name.to_owned();
    let first = name.split_whitespace().next().unwrap_or_default();
    lead.email = format!("{}@example.com", first.to_ascii_lowercase());
    lead.status = status;
    lead
}

pub fn demo_leads() -> Vec<Lead> {
    let mut john = Lead {
        phone: "(337) 555-0123".to_owned(),
        service_type: "Lawn Mowing".to_owned(),
        property_size: "0.5 acres".to_owned(),
        ..demo_lead("1", "John Smith", LeadStatus::Scheduled, date!(2023 - 12 - 26))
    };
    john.address = "123 Main St, Anytown, USA".to_owned();
    john.time = "10:00 AM".to_owned();
    john.estimated_cost_cents = Some(15_000);
    john.notes = "Customer prefers morning appointments. \
                  Has a dog that needs to be kept inside during service."
        .to_owned();
    john.property_details = PropertyDetails {
        lawn_type: "Bermuda".to_owned(),
        obstacles: "Sprinkler system, garden beds".to_owned(),
        slope: "Slight".to_owned(),
        fencing: "Full perimeter".to_owned(),
        pets: "1 dog".to_owned(),
        special_instructions: "Gate code: 1234".to_owned(),
    };
    john.documents = vec![
        LeadDocument {
            name: "Property Photos".to_owned(),
            kind: "image".to_owned(),
            date: date!(2023 - 12 - 20),
            size_bytes: 2_300_000,
        },
        LeadDocument {
            name: "Service Agreement".to_owned(),
            kind: "pdf".to_owned(),
            date: date!(2023 - 12 - 22),
            size_bytes: 156_000,
        },
    ];
    john.history = vec![
        HistoryEntry {
            date: date!(2023 - 12 - 20),
            action: "Initial Contact".to_owned(),
            notes: "Customer inquired about lawn mowing services".to_owned(),
        },
        HistoryEntry {
            date: date!(2023 - 12 - 22),
            action: "Quote Sent".to_owned(),
            notes: "Provided estimate for bi-weekly mowing".to_owned(),
        },
        HistoryEntry {
            date: date!(2023 - 12 - 23),
            action: "Quote Accepted".to_owned(),
            notes: "Customer agreed to the proposed rate".to_owned(),
        },
    ];
    john.engagement = EngagementMetrics {
        total_services: 5,
        last_service: Some(date!(2023 - 12 - 12)),
        next_service: Some(date!(2023 - 12 - 26)),
        average_rating: Some(4.8),
        total_spent_cents: 75_000,
        preferred_day: "Monday".to_owned(),
        preferred_time: "Morning".to_owned(),
    };

    vec![
        john,
        Lead {
            phone: "(337) 555-0124".to_owned(),
            service_type: "Landscaping".to_owned(),
            property_size: "0.25 acres".to_owned(),
            ..demo_lead("2", "Sarah Johnson", LeadStatus::New, date!(2023 - 12 - 25))
        },
        Lead {
            phone: "(337) 555-0125".to_owned(),
            service_type: "Tree Trimming".to_owned(),
            property_size: "0.75 acres".to_owned(),
            ..demo_lead("3", "Michael Brown", LeadStatus::Completed, date!(2023 - 12 - 24))
        },
        Lead {
            phone: "(337) 555-0126".to_owned(),
            service_type: "Lawn Mowing".to_owned(),
            property_size: "0.3 acres".to_owned(),
            ..demo_lead("4", "Emily Davis", LeadStatus::Contacted, date!(2023 - 12 - 23))
        },
        Lead {
            phone: "(337) 555-0127".to_owned(),
            service_type: "Fertilization".to_owned(),
            property_size: "0.4 acres".to_owned(),
            ..demo_lead("5", "David Wilson", LeadStatus::FollowUp, date!(2023 - 12 - 22))
        },
    ]
}

fn member(id: &str, name: &str, role: &str, status: MemberStatus) -> CrewMember {
    let first = name.split_whitespace().next().unwrap_or_default();
    CrewMember {
        id: CrewMemberId::new(id),
        name: name.to_owned(),
        role: role.to_owned(),
        phone: String::new(),
        email: format!("{}@example.com", first.to_ascii_lowercase()),
        status,
        skills: Vec::new(),
        certifications: Vec::new(),
    }
}

pub fn demo_crews() -> Vec<Crew> {
    vec![
        Crew {
            id: CrewId::new("1"),
            name: "Construction Team A".to_owned(),
            leader: CrewMember {
                phone: "(555) 123-4567".to_owned(),
                skills: strings(&["Project Management", "Custom Homes", "Remodeling"]),
                certifications: strings(&[
                    "PMP Certified",
                    "OSHA Safety",
                    "General Contractor License",
                ]),
                ..member("l1", "Robert Mason", "Project Manager", MemberStatus::Active)
            },
            members: vec![
                CrewMember {
                    phone: "(555) 234-5678".to_owned(),
                    skills: strings(&["Framing", "Finish Carpentry", "Cabinet Installation"]),
                    certifications: strings(&["Master Carpenter", "OSHA Safety"]),
                    ..member("m1", "Mike Builder", "Lead Carpenter", MemberStatus::Active)
                },
                CrewMember {
                    phone: "(555) 345-6789".to_owned(),
                    skills: strings(&[
                        "Electrical Systems",
                        "Smart Home Integration",
                        "Code Compliance",
                    ]),
                    certifications: strings(&[
                        "Master Electrician License",
                        "Smart Home Certified",
                    ]),
                    ..member("m2", "Sarah Electric", "Master Electrician", MemberStatus::Active)
                },
            ],
            current_job: Some("123 Main St - Custom Home Construction".to_owned()),
            next_job: Some("456 Oak Ave - Kitchen Remodel".to_owned()),
            rating: 4.8,
            specialties: strings(&["Custom Homes", "Major Renovations"])
                .into_iter()
                .collect(),
            completed_jobs: 156,
            active_jobs: 3,
        },
        Crew {
            id: CrewId::new("2"),
            name: "Remodeling Team B".to_owned(),
            leader: CrewMember {
                phone: "(555) 456-7890".to_owned(),
                skills: strings(&[
                    "Kitchen Remodels",
                    "Bathroom Remodels",
                    "Project Coordination",
                ]),
                certifications: strings(&["Certified Remodeler", "Plumbing License"]),
                ..member(
                    "l2",
                    "Emily Plumber",
                    "Renovation Supervisor",
                    MemberStatus::Active,
                )
            },
            members: vec![CrewMember {
                phone: "(555) 567-8901".to_owned(),
                skills: strings(&["Tile Installation", "Stone Work", "Waterproofing"]),
                certifications: strings(&["Certified Tile Installer"]),
                ..member("m3", "Tom Tile", "Tile Specialist", MemberStatus::OnLeave)
            }],
            current_job: Some("789 Pine St - Master Bath Renovation".to_owned()),
            next_job: Some("321 Elm St - Kitchen Upgrade".to_owned()),
            rating: 4.6,
            specialties: strings(&["Kitchen Remodels", "Bathroom Remodels"])
                .into_iter()
                .collect(),
            completed_jobs: 100,
            active_jobs: 2,
        },
    ]
}

fn image(id: &str, url: &str, caption: &str, is_public: bool) -> PropertyImage {
    PropertyImage {
        id: ImageId::new(id),
        url: url.to_owned(),
        caption: caption.to_owned(),
        is_public,
    }
}

pub fn demo_properties() -> Vec<Property> {
    vec![
        Property {
            id: PropertyId::new("1"),
            address: "123 Main St, Anytown, USA".to_owned(),
            size: "3,500 sqft".to_owned(),
            kind: "Custom Home".to_owned(),
            features: strings(&[
                "4 Bedrooms",
                "3.5 Bathrooms",
                "Open Concept",
                "Custom Kitchen",
            ]),
            last_service: Some(date!(2024 - 01 - 01)),
            next_service: Some(date!(2024 - 03 - 15)),
            project_status: ProjectStatus::UnderConstruction,
            budget_cents: Some(85_000_000),
            notes: "Modern farmhouse design with high-end finishes".to_owned(),
            images: vec![
                image(
                    "img1",
                    "https://images.unsplash.com/photo-1600596542815-ffad4c1539a9",
                    "Front Elevation",
                    true,
                ),
                image(
                    "img2",
                    "https://images.unsplash.com/photo-1600607687939-ce8a6c25118c",
                    "Kitchen Progress",
                    true,
                ),
                image(
                    "img3",
                    "https://images.unsplash.com/photo-1600566753376-12c8ab7fb75b",
                    "Master Suite",
                    false,
                ),
            ],
            public_gallery_url: Some("https://gallery.example.com/project1".to_owned()),
        },
        Property {
            id: PropertyId::new("2"),
            address: "456 Oak Ave, Somewhere, USA".to_owned(),
            size: "2,200 sqft".to_owned(),
            kind: "Kitchen Remodel".to_owned(),
            features: strings(&["Custom Cabinets", "Island", "High-End Appliances"]),
            last_service: Some(date!(2024 - 01 - 02)),
            next_service: Some(date!(2024 - 01 - 20)),
            project_status: ProjectStatus::PlanningPhase,
            budget_cents: Some(12_500_000),
            notes: "Client requested modern design with smart appliances".to_owned(),
            images: vec![
                image(
                    "img4",
                    "https://images.unsplash.com/photo-1556911220-bff31c812dba",
                    "Before - Kitchen",
                    true,
                ),
                image(
                    "img5",
                    "https://images.unsplash.com/photo-1556912173-3bb406ef7e77",
                    "Design Mockup",
                    true,
                ),
            ],
            public_gallery_url: Some("https://gallery.example.com/project2".to_owned()),
        },
        Property {
            id: PropertyId::new("3"),
            address: "789 Business Pkwy, Elsewhere, USA".to_owned(),
            size: "15,000 sqft".to_owned(),
            kind: "Commercial Renovation".to_owned(),
            features: strings(&[
                "Office Spaces",
                "Conference Rooms",
                "Break Room",
                "Reception Area",
            ]),
            last_service: Some(date!(2024 - 01 - 03)),
            next_service: Some(date!(2024 - 02 - 28)),
            project_status: ProjectStatus::Permitting,
            budget_cents: Some(250_000_000),
            notes: "Complete interior renovation with modern amenities".to_owned(),
            images: vec![
                image(
                    "img6",
                    "https://images.unsplash.com/photo-1497366216548-37526070297c",
                    "Current Office Space",
                    true,
                ),
                image(
                    "img7",
                    "https://images.unsplash.com/photo-1497366811353-6870744d04b2",
                    "3D Rendering",
                    true,
                ),
            ],
            public_gallery_url: Some("https://gallery.example.com/project3".to_owned()),
        },
    ]
}

/// Writes `contents` to `leads.<ext>` in a fresh temp dir. Keep the dir
/// alive for as long as the path is used.
pub fn temp_import_file(contents: &str, ext: &str) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join(format!("leads.{ext}"));
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok((dir, path))
}

pub fn demo_book() -> RecordBook {
    RecordBook::new(demo_leads(), demo_crews(), demo_properties())
}

#[cfg(test)]
mod tests {
    use super::{LeadFaker, demo_book, fixture_date, temp_import_file};
    use crewdesk_app::{Delimiter, parse_delimited};
    use std::collections::BTreeSet;

    #[test]
    fn new_deterministic_seed() {
        let mut first = LeadFaker::new(42);
        let mut second = LeadFaker::new(42);
        assert_eq!(first.lead_draft(), second.lead_draft());
    }

    #[test]
    fn variety_across_seeds() {
        let names: BTreeSet<_> = (1..=10)
            .map(|seed| LeadFaker::new(seed).lead_draft().name)
            .collect();
        assert!(names.len() > 1);
    }

    #[test]
    fn leads_have_sequential_ids_and_past_dates() {
        let leads = LeadFaker::new(7).leads(12, fixture_date());
        assert_eq!(leads.len(), 12);
        assert_eq!(leads[11].id.as_str(), "12");
        assert!(leads.iter().all(|lead| lead.date <= fixture_date()));
    }

    #[test]
    fn delimited_output_parses_back() {
        for delimiter in [Delimiter::Comma, Delimiter::Tab] {
            let text = LeadFaker::new(3).delimited(6, delimiter);
            let parsed = parse_delimited(&text);
            assert_eq!(parsed.delimiter, delimiter);
            assert_eq!(parsed.drafts.len(), 6);
            assert_eq!(parsed.short_rows, 0);
        }
    }

    #[test]
    fn demo_book_is_populated() {
        let book = demo_book();
        assert_eq!(book.leads().len(), 5);
        assert_eq!(book.crews().len(), 2);
        assert_eq!(book.properties().len(), 3);
        let john = book.find_lead("1").expect("demo lead");
        assert_eq!(john.property_details.lawn_type, "Bermuda");
        let gallery = book.find_property("1").expect("demo property");
        assert_eq!(gallery.public_images().count(), 2);
    }

    #[test]
    fn temp_import_file_round_trips() -> anyhow::Result<()> {
        let (_dir, path) = temp_import_file("name\nAlice\n", "csv")?;
        assert_eq!(std::fs::read_to_string(&path)?, "name\nAlice\n");
        assert!(path.ends_with("leads.csv"));
        Ok(())
    }

    #[test]
    fn int_n() {
        let mut faker = LeadFaker::new(9);
        for _ in 0..50 {
            assert!(faker.int_n(5) < 5);
        }
        assert_eq!(faker.int_n(1), 0);
        assert_eq!(faker.int_n(0), 0);
    }
}
