// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{AppMode, DialogKind, LeadSection, NavigationIntent, Page, RecordKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub active_page: Page,
    pub detail: Option<NavigationIntent>,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            active_page: Page::Dashboard,
            detail: None,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextPage,
    PrevPage,
    GoTo(Page),
    Navigate(NavigationIntent),
    Back,
    EnterSearch,
    OpenDialog(DialogKind),
    EditSection(LeadSection),
    ExitToNav,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    PageChanged(Page),
    DetailOpened(NavigationIntent),
    DetailClosed,
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextPage => self.rotate_page(1),
            AppCommand::PrevPage => self.rotate_page(-1),
            AppCommand::GoTo(page) => self.go_to(page),
            AppCommand::Navigate(intent) => {
                let page = match intent.kind {
                    RecordKind::Lead => Page::Leads,
                    RecordKind::Crew => Page::Crews,
                    RecordKind::Property => Page::Properties,
                };
                let mut events = Vec::new();
                if self.active_page != page {
                    self.active_page = page;
                    events.push(AppEvent::PageChanged(page));
                }
                if self.mode != AppMode::Nav {
                    self.mode = AppMode::Nav;
                    events.push(AppEvent::ModeChanged(self.mode));
                }
                let path = intent.path();
                self.detail = Some(intent.clone());
                events.push(AppEvent::DetailOpened(intent));
                events.push(self.set_status(&path));
                events
            }
            AppCommand::Back => {
                if self.mode != AppMode::Nav {
                    self.mode = AppMode::Nav;
                    return vec![AppEvent::ModeChanged(self.mode)];
                }
                if self.detail.take().is_some() {
                    return vec![AppEvent::DetailClosed];
                }
                Vec::new()
            }
            AppCommand::EnterSearch => {
                self.mode = AppMode::Search;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::OpenDialog(kind) => {
                self.mode = AppMode::Dialog(kind);
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::EditSection(section) => {
                self.mode = AppMode::EditSection(section);
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ExitToNav => {
                self.mode = AppMode::Nav;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    pub fn lead_detail_id(&self) -> Option<&str> {
        self.detail
            .as_ref()
            .filter(|intent| intent.kind == RecordKind::Lead)
            .map(|intent| intent.id.as_str())
    }

    fn go_to(&mut self, page: Page) -> Vec<AppEvent> {
        let mut events = Vec::new();
        if self.detail.take().is_some() {
            events.push(AppEvent::DetailClosed);
        }
        self.mode = AppMode::Nav;
        self.active_page = page;
        events.push(AppEvent::PageChanged(page));
        events
    }

    fn rotate_page(&mut self, delta: isize) -> Vec<AppEvent> {
        let pages = Page::ALL;
        let current = pages
            .iter()
            .position(|page| *page == self.active_page)
            .unwrap_or(0) as isize;
        let len = pages.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.go_to(pages[next])
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState};
    use crate::{AppMode, DialogKind, NavigationIntent, Page, RecordKind};

    fn lead_intent(id: &str) -> NavigationIntent {
        NavigationIntent {
            kind: RecordKind::Lead,
            id: id.to_owned(),
        }
    }

    #[test]
    fn page_rotation_wraps() {
        let mut state = AppState {
            active_page: Page::Settings,
            ..AppState::default()
        };

        let events = state.dispatch(AppCommand::NextPage);
        assert_eq!(state.active_page, Page::Dashboard);
        assert_eq!(events, vec![AppEvent::PageChanged(Page::Dashboard)]);

        state.dispatch(AppCommand::PrevPage);
        assert_eq!(state.active_page, Page::Settings);
    }

    #[test]
    fn navigation_intent_opens_lead_detail() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::Navigate(lead_intent("3")));

        assert_eq!(state.active_page, Page::Leads);
        assert_eq!(state.lead_detail_id(), Some("3"));
        assert_eq!(
            events,
            vec![
                AppEvent::PageChanged(Page::Leads),
                AppEvent::DetailOpened(lead_intent("3")),
                AppEvent::StatusUpdated("/leads/3".to_owned()),
            ]
        );
    }

    #[test]
    fn back_leaves_mode_before_detail() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::Navigate(lead_intent("3")));
        state.dispatch(AppCommand::OpenDialog(DialogKind::StatusUpdate));

        state.dispatch(AppCommand::Back);
        assert_eq!(state.mode, AppMode::Nav);
        assert!(state.detail.is_some());

        assert_eq!(state.dispatch(AppCommand::Back), vec![AppEvent::DetailClosed]);
        assert!(state.detail.is_none());
        assert!(state.dispatch(AppCommand::Back).is_empty());
    }

    #[test]
    fn changing_page_closes_detail() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::Navigate(lead_intent("1")));
        let events = state.dispatch(AppCommand::NextPage);
        assert_eq!(
            events,
            vec![AppEvent::DetailClosed, AppEvent::PageChanged(Page::Crews)]
        );
    }

    #[test]
    fn status_set_and_clear() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::SetStatus("1 lead added".to_owned()));
        assert_eq!(state.status_line.as_deref(), Some("1 lead added"));
        assert_eq!(
            state.dispatch(AppCommand::ClearStatus),
            vec![AppEvent::StatusCleared]
        );
        assert!(state.status_line.is_none());
    }
}
