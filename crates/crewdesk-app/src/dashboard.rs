// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Lead, LeadStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LeadCounts {
    pub total: usize,
    pub new: usize,
    pub contacted: usize,
    pub scheduled: usize,
    pub completed: usize,
    pub follow_up: usize,
}

impl LeadCounts {
    pub fn from_leads(leads: &[Lead]) -> Self {
        leads.iter().fold(Self::default(), |mut counts, lead| {
            counts.total += 1;
            match lead.status {
                LeadStatus::New => counts.new += 1,
                LeadStatus::Contacted => counts.contacted += 1,
                LeadStatus::Scheduled => counts.scheduled += 1,
                LeadStatus::Completed => counts.completed += 1,
                LeadStatus::FollowUp => counts.follow_up += 1,
            }
            counts
        })
    }

    pub fn for_status(&self, status: LeadStatus) -> usize {
        match status {
            LeadStatus::New => self.new,
            LeadStatus::Contacted => self.contacted,
            LeadStatus::Scheduled => self.scheduled,
            LeadStatus::Completed => self.completed,
            LeadStatus::FollowUp => self.follow_up,
        }
    }

    /// Completed share of all leads, in whole percent.
    pub fn conversion_percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed * 100) / self.total) as u8
    }
}
