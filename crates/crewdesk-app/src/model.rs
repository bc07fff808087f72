// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::Date;
use time::macros::format_description;

use crate::ids::*;

pub const DEFAULT_SERVICE_TYPES: [&str; 10] = [
    "Custom Home Build",
    "Kitchen Remodel",
    "Bathroom Remodel",
    "Room Addition",
    "Whole House Renovation",
    "Outdoor Living Space",
    "Basement Finishing",
    "Commercial Build-Out",
    "Historic Restoration",
    "Green Building Project",
];

pub const TIME_SLOTS: [&str; 9] = [
    "08:00 AM", "09:00 AM", "10:00 AM", "11:00 AM", "12:00 PM", "01:00 PM", "02:00 PM",
    "03:00 PM", "04:00 PM",
];

pub const MEMBER_ROLES: [&str; 3] = ["Carpenter", "Electrician", "Plumber"];

/// Color token a front end maps to its own palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusColor {
    Blue,
    Purple,
    Green,
    Yellow,
    Red,
    Neutral,
}

impl StatusColor {
    pub const fn token(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeadStatus {
    New,
    Contacted,
    Scheduled,
    Completed,
    FollowUp,
}

impl LeadStatus {
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::Contacted,
        Self::Scheduled,
        Self::Completed,
        Self::FollowUp,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::FollowUp => "follow-up",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "new" => Some(Self::New),
            "contacted" => Some(Self::Contacted),
            "scheduled" => Some(Self::Scheduled),
            "completed" => Some(Self::Completed),
            "follow-up" | "follow_up" | "followup" => Some(Self::FollowUp),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New Lead",
            Self::Contacted => "Contacted",
            Self::Scheduled => "Service Scheduled",
            Self::Completed => "Service Completed",
            Self::FollowUp => "Needs Follow-up",
        }
    }

    pub const fn color(self) -> StatusColor {
        match self {
            Self::New => StatusColor::Blue,
            Self::Contacted => StatusColor::Yellow,
            Self::Scheduled => StatusColor::Purple,
            Self::Completed => StatusColor::Green,
            Self::FollowUp => StatusColor::Red,
        }
    }

    /// Position in the sales pipeline, used for status-column ordering.
    pub const fn rank(self) -> u8 {
        match self {
            Self::New => 0,
            Self::Contacted => 1,
            Self::Scheduled => 2,
            Self::Completed => 3,
            Self::FollowUp => 4,
        }
    }
}

/// Color for a raw status string; unknown values get the neutral fallback.
pub fn lead_status_color(raw: &str) -> StatusColor {
    LeadStatus::parse(raw)
        .map(LeadStatus::color)
        .unwrap_or(StatusColor::Neutral)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberStatus {
    Active,
    OnLeave,
    Unavailable,
}

impl MemberStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OnLeave => "on-leave",
            Self::Unavailable => "unavailable",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "on-leave" => Some(Self::OnLeave),
            "unavailable" => Some(Self::Unavailable),
            _ => None,
        }
    }

    pub const fn color(self) -> StatusColor {
        match self {
            Self::Active => StatusColor::Green,
            Self::OnLeave => StatusColor::Yellow,
            Self::Unavailable => StatusColor::Red,
        }
    }
}

/// Project status is an open set: anything outside the known phases is kept
/// verbatim and rendered with the fallback color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    PlanningPhase,
    Permitting,
    UnderConstruction,
    Completed,
    Other(String),
}

impl ProjectStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::PlanningPhase => "Planning Phase",
            Self::Permitting => "Permitting",
            Self::UnderConstruction => "Under Construction",
            Self::Completed => "Completed",
            Self::Other(value) => value,
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "Planning Phase" => Self::PlanningPhase,
            "Permitting" => Self::Permitting,
            "Under Construction" => Self::UnderConstruction,
            "Completed" => Self::Completed,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn color(&self) -> StatusColor {
        match self {
            Self::PlanningPhase => StatusColor::Blue,
            Self::Permitting => StatusColor::Purple,
            Self::UnderConstruction => StatusColor::Yellow,
            Self::Completed => StatusColor::Green,
            Self::Other(_) => StatusColor::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PropertyDetails {
    pub lawn_type: String,
    pub obstacles: String,
    pub slope: String,
    pub fencing: String,
    pub pets: String,
    pub special_instructions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: Date,
    pub action: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadDocument {
    pub name: String,
    pub kind: String,
    pub date: Date,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub total_services: u32,
    pub last_service: Option<Date>,
    pub next_service: Option<Date>,
    pub average_rating: Option<f64>,
    pub total_spent_cents: i64,
    pub preferred_day: String,
    pub preferred_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub service_type: String,
    pub status: LeadStatus,
    pub date: Date,
    pub time: String,
    pub property_size: String,
    pub estimated_cost_cents: Option<i64>,
    pub notes: String,
    pub follow_up: Option<Date>,
    pub property_details: PropertyDetails,
    pub history: Vec<HistoryEntry>,
    pub documents: Vec<LeadDocument>,
    pub engagement: EngagementMetrics,
}

impl Lead {
    /// A lead with only its identity and intake date set.
    pub fn blank(id: LeadId, date: Date) -> Self {
        Self {
            id,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            service_type: String::new(),
            status: LeadStatus::New,
            date,
            time: String::new(),
            property_size: String::new(),
            estimated_cost_cents: None,
            notes: String::new(),
            follow_up: None,
            property_details: PropertyDetails::default(),
            history: Vec::new(),
            documents: Vec::new(),
            engagement: EngagementMetrics::default(),
        }
    }

    pub fn initials(&self) -> String {
        initials(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: CrewMemberId,
    pub name: String,
    pub role: String,
    pub phone: String,
    pub email: String,
    pub status: MemberStatus,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crew {
    pub id: CrewId,
    pub name: String,
    pub leader: CrewMember,
    pub members: Vec<CrewMember>,
    pub current_job: Option<String>,
    pub next_job: Option<String>,
    pub rating: f64,
    pub specialties: BTreeSet<String>,
    pub completed_jobs: u32,
    pub active_jobs: u32,
}

impl Crew {
    pub fn headcount(&self) -> usize {
        self.members.len() + 1
    }

    pub fn available_members(&self) -> usize {
        self.members
            .iter()
            .filter(|member| member.status == MemberStatus::Active)
            .count()
    }

    pub fn specialties_label(&self) -> String {
        self.specialties
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" • ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyImage {
    pub id: ImageId,
    pub url: String,
    pub caption: String,
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub address: String,
    pub size: String,
    pub kind: String,
    pub features: Vec<String>,
    pub last_service: Option<Date>,
    pub next_service: Option<Date>,
    pub project_status: ProjectStatus,
    pub budget_cents: Option<i64>,
    pub notes: String,
    pub images: Vec<PropertyImage>,
    pub public_gallery_url: Option<String>,
}

impl Property {
    pub fn public_images(&self) -> impl Iterator<Item = &PropertyImage> {
        self.images.iter().filter(|image| image.is_public)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Page {
    Dashboard,
    Leads,
    Crews,
    Properties,
    Settings,
}

impl Page {
    pub const ALL: [Self; 5] = [
        Self::Dashboard,
        Self::Leads,
        Self::Crews,
        Self::Properties,
        Self::Settings,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Leads => "leads",
            Self::Crews => "crews",
            Self::Properties => "properties",
            Self::Settings => "settings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogKind {
    AddLead,
    ImportLeads,
    ScheduleService,
    StatusUpdate,
    AddCrew,
    AddMember,
    AddProperty,
    CompanySettings,
}

impl DialogKind {
    pub const fn title(self) -> &'static str {
        match self {
            Self::AddLead => "add lead",
            Self::ImportLeads => "import leads",
            Self::ScheduleService => "schedule service",
            Self::StatusUpdate => "update status",
            Self::AddCrew => "add crew",
            Self::AddMember => "add member",
            Self::AddProperty => "add property",
            Self::CompanySettings => "company settings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LeadSection {
    Contact,
    Service,
    Notes,
    PropertyDetails,
    Status,
}

impl LeadSection {
    pub const ALL: [Self; 5] = [
        Self::Contact,
        Self::Service,
        Self::Notes,
        Self::PropertyDetails,
        Self::Status,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Service => "service",
            Self::Notes => "notes",
            Self::PropertyDetails => "property details",
            Self::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    Nav,
    Search,
    Dialog(DialogKind),
    EditSection(LeadSection),
}

pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// Parses `$1,250.50`, `1250.5` or `850000` into cents.
pub fn parse_money_cents(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };
    if fraction.len() > 2 || !fraction.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let dollars: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    let total = dollars.checked_mul(100)?.checked_add(cents)?;
    Some(if negative { -total } else { total })
}

/// `$850,000` for whole dollars, `$150.50` otherwise.
pub fn format_money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let absolute = cents.unsigned_abs();
    let dollars = group_thousands(absolute / 100);
    let remainder = absolute % 100;
    if remainder == 0 {
        format!("{sign}${dollars}")
    } else {
        format!("{sign}${dollars}.{remainder:02}")
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .collect()
}
