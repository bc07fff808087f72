// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crewdesk_app::{
    AddCrewForm, AddMemberForm, AddPropertyForm, AppCommand, AppEvent, AppMode, AppState,
    CompanyInfo, CompanyInfoForm, Crew, CrewId, CrewMemberId, CsvImportForm, DialogKind,
    FieldKind, FormField, Lead, LeadCounts, LeadDetailEditor, LeadDraft, LeadEntryForm, LeadId,
    LeadSection, LeadStatus, NavigationIntent, NewCrew, NewCrewMember, NewProperty, Page,
    Property, PropertyId, ReadOutcome, Record, RecordKind, ScheduleServiceForm, ScheduledService,
    SectionEdit, Settings, StatusColor, StatusUpdate, StatusUpdateForm, TIME_SLOTS, TableStatus,
    TableView, Wizard, WizardCommand, WizardEvent, WizardForm, crew_table, format_money,
    lead_table, property_table, recent_leads_table,
};
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyModifiers,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const FILTER_MARK: &str = "▼";
const FILTER_MARK_INVERTED: &str = "▲";

/// Data seam between the shell and whatever owns the records.
pub trait AppRuntime {
    fn load_leads(&mut self) -> Result<Vec<Lead>>;
    fn load_crews(&mut self) -> Result<Vec<Crew>>;
    fn load_properties(&mut self) -> Result<Vec<Property>>;
    fn load_settings(&mut self) -> Result<Settings>;
    fn add_leads(&mut self, drafts: Vec<LeadDraft>) -> Result<Vec<LeadId>>;
    fn apply_status_update(&mut self, lead_id: &str, update: StatusUpdate) -> Result<()>;
    fn schedule_service(&mut self, lead_id: &str, service: ScheduledService) -> Result<()>;
    fn save_lead_section(&mut self, lead_id: &str, edit: SectionEdit) -> Result<()>;
    fn add_crew(&mut self, crew: NewCrew) -> Result<CrewId>;
    fn add_crew_member(&mut self, crew_id: &str, member: NewCrewMember) -> Result<CrewMemberId>;
    fn add_property(&mut self, property: NewProperty) -> Result<PropertyId>;
    fn save_company(&mut self, company: CompanyInfo) -> Result<()>;
    fn add_service_type(&mut self, name: &str) -> Result<bool>;
    fn remove_service_type(&mut self, index: usize) -> Result<Option<String>>;

    /// Reads `path` off the UI thread and reports back through `tx`.
    fn spawn_import_read(
        &mut self,
        token: u64,
        path: PathBuf,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        thread::Builder::new()
            .name("import-read".to_owned())
            .spawn(move || {
                let result = fs::read_to_string(&path)
                    .map_err(|error| format!("read {}: {error}", path.display()));
                let _ = tx.send(InternalEvent::ImportFileRead { token, result });
            })
            .context("spawn import reader")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiOptions {
    pub page_size: usize,
    pub recent_leads_page_size: usize,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            page_size: 10,
            recent_leads_page_size: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    ImportFileRead {
        token: u64,
        result: std::result::Result<String, String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableCommand {
    MoveRow(isize),
    MoveColumn(isize),
    CycleSort,
    ClearSort,
    TogglePin,
    ClearPin,
    ToggleInvert,
    NextPage,
    PrevPage,
    ToggleSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct TableCursor {
    row: usize,
    col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum WizardKey {
    Ignored,
    Status(String),
    Cancel,
    Submit,
    ReadFile,
}

struct ViewData {
    leads: Vec<Lead>,
    crews: Vec<Crew>,
    properties: Vec<Property>,
    settings: Settings,
    lead_table: TableView<Lead>,
    recent_leads: TableView<Lead>,
    crew_table: TableView<Crew>,
    property_table: TableView<Property>,
    cursor: TableCursor,
    search_input: String,
    add_lead: Wizard<LeadEntryForm>,
    import: Wizard<CsvImportForm>,
    schedule: Wizard<ScheduleServiceForm>,
    status_update: Wizard<StatusUpdateForm>,
    add_crew: Wizard<AddCrewForm>,
    add_member: Wizard<AddMemberForm>,
    add_property: Wizard<AddPropertyForm>,
    company: Wizard<CompanyInfoForm>,
    dialog_lead: Option<LeadId>,
    dialog_crew: Option<CrewId>,
    field_index: usize,
    editor: Option<LeadDetailEditor>,
    section_index: usize,
    settings_cursor: usize,
    service_input: Option<String>,
    help_visible: bool,
    status_token: u64,
    read_token: u64,
}

impl ViewData {
    fn new(options: UiOptions) -> Self {
        Self {
            leads: Vec::new(),
            crews: Vec::new(),
            properties: Vec::new(),
            settings: Settings::default(),
            lead_table: lead_table(options.page_size),
            recent_leads: recent_leads_table(options.recent_leads_page_size),
            crew_table: crew_table(options.page_size),
            property_table: property_table(options.page_size),
            cursor: TableCursor::default(),
            search_input: String::new(),
            add_lead: Wizard::new(LeadEntryForm::default()),
            import: Wizard::new(CsvImportForm::default()),
            schedule: Wizard::new(ScheduleServiceForm::default()),
            status_update: Wizard::new(StatusUpdateForm::default()),
            add_crew: Wizard::new(AddCrewForm::default()),
            add_member: Wizard::new(AddMemberForm::default()),
            add_property: Wizard::new(AddPropertyForm::default()),
            company: Wizard::new(CompanyInfoForm::default()),
            dialog_lead: None,
            dialog_crew: None,
            field_index: 0,
            editor: None,
            section_index: 0,
            settings_cursor: 0,
            service_input: None,
            help_visible: false,
            status_token: 0,
            read_token: 0,
        }
    }

    fn find_lead(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|lead| lead.id.as_str() == id)
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    options: UiOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, EnableBracketedPaste)
        .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(options);
    let (internal_tx, internal_rx) = mpsc::channel();

    if let Err(error) = refresh_view_data(runtime, &mut view_data) {
        state.dispatch(AppCommand::SetStatus(format!("load failed: {error:#}")));
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Paste(text) => handle_paste(state, &mut view_data, &text),
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(
        io::stdout(),
        DisableBracketedPaste,
        terminal::LeaveAlternateScreen
    )
    .context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::ImportFileRead { token, result } => {
                // Closing the dialog drops the pending read, so late results
                // land nowhere.
                let Some(form) = view_data.import.form_mut() else {
                    continue;
                };
                match form.complete_read(token, result) {
                    ReadOutcome::Applied => {
                        let summary = form.parsed().summary();
                        emit_status(state, view_data, tx, summary);
                    }
                    ReadOutcome::Failed => {
                        let error = form.read_error().unwrap_or_default().to_owned();
                        emit_status(
                            state,
                            view_data,
                            tx,
                            format!("{error} -- check the path and retry"),
                        );
                    }
                    ReadOutcome::Stale => {}
                }
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
            emit_status(state, view_data, internal_tx, "help hidden");
        }
        return false;
    }

    if view_data.service_input.is_some() {
        handle_service_input_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    match state.mode {
        AppMode::Dialog(kind) => {
            handle_dialog_key(state, runtime, view_data, internal_tx, kind, key);
        }
        AppMode::Search => handle_search_key(state, view_data, internal_tx, key),
        AppMode::EditSection(section) => {
            handle_section_edit_key(state, runtime, view_data, internal_tx, section, key);
        }
        AppMode::Nav => handle_nav_key(state, runtime, view_data, internal_tx, key),
    }
    false
}

/// Bracketed paste goes into the focused dialog field verbatim, newlines
/// included, so a CSV block can be pasted whole.
fn handle_paste(state: &mut AppState, view_data: &mut ViewData, text: &str) {
    let AppMode::Dialog(kind) = state.mode else {
        return;
    };
    let index = view_data.field_index;
    match kind {
        DialogKind::AddLead => paste_into(&mut view_data.add_lead, index, text),
        DialogKind::ImportLeads => paste_into(&mut view_data.import, index, text),
        DialogKind::ScheduleService => paste_into(&mut view_data.schedule, index, text),
        DialogKind::StatusUpdate => paste_into(&mut view_data.status_update, index, text),
        DialogKind::AddCrew => paste_into(&mut view_data.add_crew, index, text),
        DialogKind::AddMember => paste_into(&mut view_data.add_member, index, text),
        DialogKind::AddProperty => paste_into(&mut view_data.add_property, index, text),
        DialogKind::CompanySettings => paste_into(&mut view_data.company, index, text),
    }
}

fn paste_into<F: WizardForm>(wizard: &mut Wizard<F>, field_index: usize, text: &str) {
    let Some(field) = wizard.current_fields().into_iter().nth(field_index) else {
        return;
    };
    if matches!(field.kind, FieldKind::Choice(_)) {
        return;
    }
    wizard.set_field(field.key, &format!("{}{text}", field.value));
}

fn handle_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
            emit_status(state, view_data, internal_tx, "help open");
            return;
        }
        (KeyCode::Tab, KeyModifiers::NONE) => {
            change_page(state, view_data, internal_tx, AppCommand::NextPage);
            return;
        }
        (KeyCode::BackTab, _) => {
            change_page(state, view_data, internal_tx, AppCommand::PrevPage);
            return;
        }
        (KeyCode::Esc, _) => {
            let events = state.dispatch(AppCommand::Back);
            if events.contains(&AppEvent::DetailClosed) {
                view_data.editor = None;
                emit_status(state, view_data, internal_tx, "detail closed");
            } else {
                state.dispatch(AppCommand::ClearStatus);
            }
            return;
        }
        _ => {}
    }

    if state.detail.is_some() {
        handle_detail_key(state, view_data, internal_tx, key);
        return;
    }

    if state.active_page == Page::Settings {
        handle_settings_key(state, runtime, view_data, internal_tx, key);
        return;
    }

    if let Some(command) = table_command_for_key(key) {
        if let Some(status) = apply_table_command(state.active_page, view_data, command) {
            emit_status(state, view_data, internal_tx, status.message());
        }
        return;
    }

    let page = state.active_page;
    match (key.code, key.modifiers) {
        (KeyCode::Enter, _) => open_selected_detail(state, view_data, internal_tx),
        (KeyCode::Char('/'), _) if page != Page::Dashboard => {
            view_data.search_input = active_query(page, view_data);
            state.dispatch(AppCommand::EnterSearch);
        }
        (KeyCode::Char('a'), KeyModifiers::NONE)
            if matches!(page, Page::Dashboard | Page::Leads) =>
        {
            open_dialog(state, view_data, internal_tx, DialogKind::AddLead);
        }
        (KeyCode::Char('i'), KeyModifiers::NONE)
            if matches!(page, Page::Dashboard | Page::Leads) =>
        {
            open_dialog(state, view_data, internal_tx, DialogKind::ImportLeads);
        }
        (KeyCode::Char('u'), KeyModifiers::NONE)
            if matches!(page, Page::Dashboard | Page::Leads) =>
        {
            open_dialog(state, view_data, internal_tx, DialogKind::StatusUpdate);
        }
        (KeyCode::Char('c'), KeyModifiers::NONE)
            if matches!(page, Page::Dashboard | Page::Leads) =>
        {
            open_dialog(state, view_data, internal_tx, DialogKind::ScheduleService);
        }
        (KeyCode::Char('A'), _) if page == Page::Crews => {
            open_dialog(state, view_data, internal_tx, DialogKind::AddCrew);
        }
        (KeyCode::Char('m'), KeyModifiers::NONE) if page == Page::Crews => {
            open_dialog(state, view_data, internal_tx, DialogKind::AddMember);
        }
        (KeyCode::Char('a'), KeyModifiers::NONE) if page == Page::Properties => {
            open_dialog(state, view_data, internal_tx, DialogKind::AddProperty);
        }
        _ => {}
    }
}

fn change_page(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    state.dispatch(command);
    view_data.cursor = TableCursor::default();
    view_data.editor = None;
    view_data.section_index = 0;
    let label = state.active_page.label();
    emit_status(state, view_data, internal_tx, label);
}

fn handle_detail_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    if state
        .detail
        .as_ref()
        .is_some_and(|intent| intent.kind == RecordKind::Crew)
    {
        if (key.code, key.modifiers) == (KeyCode::Char('m'), KeyModifiers::NONE) {
            open_dialog(state, view_data, internal_tx, DialogKind::AddMember);
        }
        return;
    }
    let Some(lead_id) = state.lead_detail_id().map(str::to_owned) else {
        return;
    };
    let last_section = LeadSection::ALL.len() - 1;
    match (key.code, key.modifiers) {
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => {
            view_data.section_index = (view_data.section_index + 1).min(last_section);
        }
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => {
            view_data.section_index = view_data.section_index.saturating_sub(1);
        }
        (KeyCode::Char('e'), KeyModifiers::NONE) => {
            let section = LeadSection::ALL[view_data.section_index.min(last_section)];
            let Some(lead) = view_data.find_lead(&lead_id).cloned() else {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("lead {lead_id} not found -- reopen it from the leads list"),
                );
                return;
            };
            let editor = view_data
                .editor
                .get_or_insert_with(|| LeadDetailEditor::new(lead.id.clone()));
            editor.begin_edit(section, &lead);
            view_data.field_index = 0;
            state.dispatch(AppCommand::EditSection(section));
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("editing {}", section.label()),
            );
        }
        (KeyCode::Char('u'), KeyModifiers::NONE) => {
            open_dialog(state, view_data, internal_tx, DialogKind::StatusUpdate);
        }
        (KeyCode::Char('c'), KeyModifiers::NONE) => {
            open_dialog(state, view_data, internal_tx, DialogKind::ScheduleService);
        }
        _ => {}
    }
}

fn open_selected_detail(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let row = view_data.cursor.row;
    let intent = match state.active_page {
        Page::Dashboard => view_data.recent_leads.row_click(&view_data.leads, row),
        Page::Leads => view_data.lead_table.row_click(&view_data.leads, row),
        Page::Crews => view_data.crew_table.row_click(&view_data.crews, row),
        Page::Properties => view_data.property_table.row_click(&view_data.properties, row),
        Page::Settings => None,
    };
    let Some(intent) = intent else {
        emit_status(state, view_data, internal_tx, "no row selected");
        return;
    };
    open_intent(state, view_data, internal_tx, intent);
}

fn open_intent(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    intent: NavigationIntent,
) {
    view_data.editor = None;
    view_data.section_index = 0;
    if intent.kind == RecordKind::Lead {
        view_data.editor = Some(LeadDetailEditor::new(LeadId::new(intent.id.as_str())));
    }
    let events = state.dispatch(AppCommand::Navigate(intent));
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

/// The lead a status or schedule dialog acts on: the open detail, else the
/// row under the cursor.
fn target_lead(state: &AppState, view_data: &ViewData) -> Option<Lead> {
    if let Some(id) = state.lead_detail_id() {
        return view_data.find_lead(id).cloned();
    }
    let row = view_data.cursor.row;
    let page = match state.active_page {
        Page::Dashboard => view_data.recent_leads.visible_rows(&view_data.leads),
        Page::Leads => view_data.lead_table.visible_rows(&view_data.leads),
        _ => return None,
    };
    page.rows.get(row).map(|lead| (*lead).clone())
}

/// The crew an add-member dialog acts on: the open crew detail, else the
/// crew row under the cursor.
fn target_crew(state: &AppState, view_data: &ViewData) -> Option<CrewId> {
    if let Some(intent) = &state.detail {
        return (intent.kind == RecordKind::Crew).then(|| CrewId::new(intent.id.as_str()));
    }
    if state.active_page != Page::Crews {
        return None;
    }
    let page = view_data.crew_table.visible_rows(&view_data.crews);
    page.rows
        .get(view_data.cursor.row)
        .map(|crew| crew.id.clone())
}

fn open_dialog(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    kind: DialogKind,
) {
    let services = view_data.settings.services.types().to_vec();
    let events = match kind {
        DialogKind::AddLead => view_data
            .add_lead
            .open_with(LeadEntryForm::new(&services)),
        DialogKind::ImportLeads => view_data.import.open_with(CsvImportForm::default()),
        DialogKind::AddCrew => view_data.add_crew.open_with(AddCrewForm::default()),
        DialogKind::AddProperty => view_data
            .add_property
            .open_with(AddPropertyForm::default()),
        DialogKind::CompanySettings => view_data
            .company
            .open_with(CompanyInfoForm::from_company(&view_data.settings.company)),
        DialogKind::AddMember => {
            let Some(crew_id) = target_crew(state, view_data) else {
                emit_status(state, view_data, internal_tx, "no crew selected");
                return;
            };
            view_data.dialog_crew = Some(crew_id);
            view_data.add_member.open_with(AddMemberForm::default())
        }
        DialogKind::StatusUpdate | DialogKind::ScheduleService => {
            let Some(lead) = target_lead(state, view_data) else {
                emit_status(state, view_data, internal_tx, "no lead selected");
                return;
            };
            view_data.dialog_lead = Some(lead.id.clone());
            if kind == DialogKind::StatusUpdate {
                view_data
                    .status_update
                    .open_with(StatusUpdateForm::for_status(lead.status))
            } else {
                let crews = view_data
                    .crews
                    .iter()
                    .map(|crew| crew.name.clone())
                    .collect::<Vec<_>>();
                view_data.schedule.open_with(
                    ScheduleServiceForm::new(&TIME_SLOTS, &services, &crews)
                        .with_service_type(&lead.service_type),
                )
            }
        }
    };
    view_data.field_index = 0;
    state.dispatch(AppCommand::OpenDialog(kind));
    let step = events
        .last()
        .map(WizardEvent::message)
        .unwrap_or_default();
    emit_status(
        state,
        view_data,
        internal_tx,
        format!("{}: {step}", kind.title()),
    );
}

fn handle_dialog_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    kind: DialogKind,
    key: KeyEvent,
) {
    let field_index = &mut view_data.field_index;
    let outcome = match kind {
        DialogKind::AddLead => wizard_key(&mut view_data.add_lead, field_index, key),
        DialogKind::ImportLeads => wizard_key(&mut view_data.import, field_index, key),
        DialogKind::ScheduleService => wizard_key(&mut view_data.schedule, field_index, key),
        DialogKind::StatusUpdate => wizard_key(&mut view_data.status_update, field_index, key),
        DialogKind::AddCrew => wizard_key(&mut view_data.add_crew, field_index, key),
        DialogKind::AddMember => wizard_key(&mut view_data.add_member, field_index, key),
        DialogKind::AddProperty => wizard_key(&mut view_data.add_property, field_index, key),
        DialogKind::CompanySettings => wizard_key(&mut view_data.company, field_index, key),
    };

    match outcome {
        WizardKey::Ignored => {}
        WizardKey::Status(message) => emit_status(state, view_data, internal_tx, message),
        WizardKey::Cancel => close_dialog(state, view_data, internal_tx, kind),
        WizardKey::Submit => submit_dialog(state, runtime, view_data, internal_tx, kind),
        WizardKey::ReadFile if kind == DialogKind::ImportLeads => {
            start_import_read(state, runtime, view_data, internal_tx);
        }
        WizardKey::ReadFile => {}
    }
}

fn wizard_key<F: WizardForm>(
    wizard: &mut Wizard<F>,
    field_index: &mut usize,
    key: KeyEvent,
) -> WizardKey {
    let fields = wizard.current_fields();
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => WizardKey::Cancel,
        (KeyCode::Char('r'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            WizardKey::ReadFile
        }
        (KeyCode::Char('b'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            step_outcome(wizard.dispatch(WizardCommand::Retreat), field_index)
        }
        (KeyCode::Enter, _) if wizard.is_last_step() => WizardKey::Submit,
        (KeyCode::Enter, _) => step_outcome(wizard.dispatch(WizardCommand::Advance), field_index),
        (KeyCode::Tab, _) => move_field_cursor(field_index, &fields, 1),
        (KeyCode::BackTab, _) => move_field_cursor(field_index, &fields, -1),
        _ => {
            let Some(field) = fields.get(*field_index) else {
                return WizardKey::Ignored;
            };
            match edited_value(field, key) {
                Some(value) => {
                    wizard.set_field(field.key, &value);
                    WizardKey::Ignored
                }
                None => WizardKey::Ignored,
            }
        }
    }
}

fn step_outcome(events: Vec<WizardEvent>, field_index: &mut usize) -> WizardKey {
    if events
        .iter()
        .any(|event| matches!(event, WizardEvent::StepChanged { .. }))
    {
        *field_index = 0;
    }
    match events.last() {
        Some(event) => WizardKey::Status(event.message()),
        None => WizardKey::Ignored,
    }
}

fn move_field_cursor(field_index: &mut usize, fields: &[FormField], delta: isize) -> WizardKey {
    if fields.is_empty() {
        return WizardKey::Ignored;
    }
    let len = fields.len() as isize;
    *field_index = (*field_index as isize + delta).rem_euclid(len) as usize;
    WizardKey::Status(format!("field: {}", fields[*field_index].label))
}

/// The field's value after `key`, or `None` when the key does not edit it.
fn edited_value(field: &FormField, key: KeyEvent) -> Option<String> {
    if let FieldKind::Choice(_) = field.kind {
        return match key.code {
            KeyCode::Right => field.cycle_choice(1),
            KeyCode::Left => field.cycle_choice(-1),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Backspace => {
            let mut value = field.value.clone();
            value.pop();
            Some(value)
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(format!("{}{ch}", field.value))
        }
        _ => None,
    }
}

fn close_dialog(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    kind: DialogKind,
) {
    let command = WizardCommand::Close;
    match kind {
        DialogKind::AddLead => view_data.add_lead.dispatch(command),
        DialogKind::ImportLeads => view_data.import.dispatch(command),
        DialogKind::ScheduleService => view_data.schedule.dispatch(command),
        DialogKind::StatusUpdate => view_data.status_update.dispatch(command),
        DialogKind::AddCrew => view_data.add_crew.dispatch(command),
        DialogKind::AddMember => view_data.add_member.dispatch(command),
        DialogKind::AddProperty => view_data.add_property.dispatch(command),
        DialogKind::CompanySettings => view_data.company.dispatch(command),
    };
    view_data.dialog_lead = None;
    view_data.dialog_crew = None;
    view_data.field_index = 0;
    state.dispatch(AppCommand::ExitToNav);
    emit_status(state, view_data, internal_tx, "dialog closed");
}

fn submit_dialog<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    kind: DialogKind,
) {
    let lead_id = view_data.dialog_lead.clone();
    let (events, message) = match kind {
        DialogKind::AddLead => {
            let (events, added) = view_data
                .add_lead
                .commit(|draft| runtime.add_leads(vec![draft]));
            (events, added.map(|ids| lead_count_message(ids.len(), "added")))
        }
        DialogKind::ImportLeads => {
            let (events, added) = view_data
                .import
                .commit(|drafts| runtime.add_leads(drafts));
            (
                events,
                added.map(|ids| lead_count_message(ids.len(), "imported")),
            )
        }
        DialogKind::StatusUpdate => {
            let Some(lead_id) = lead_id else {
                emit_status(state, view_data, internal_tx, "no lead selected");
                return;
            };
            let (events, done) = view_data
                .status_update
                .commit(|update| runtime.apply_status_update(lead_id.as_str(), update));
            (events, done.map(|()| format!("lead {lead_id} status updated")))
        }
        DialogKind::ScheduleService => {
            let Some(lead_id) = lead_id else {
                emit_status(state, view_data, internal_tx, "no lead selected");
                return;
            };
            let (events, done) = view_data
                .schedule
                .commit(|service| runtime.schedule_service(lead_id.as_str(), service));
            (events, done.map(|()| format!("service scheduled for lead {lead_id}")))
        }
        DialogKind::AddCrew => {
            let (events, added) = view_data.add_crew.commit(|crew| runtime.add_crew(crew));
            (events, added.map(|id| format!("crew {id} added")))
        }
        DialogKind::AddMember => {
            let Some(crew_id) = view_data.dialog_crew.clone() else {
                emit_status(state, view_data, internal_tx, "no crew selected");
                return;
            };
            let (events, added) = view_data
                .add_member
                .commit(|member| runtime.add_crew_member(crew_id.as_str(), member));
            (events, added.map(|id| format!("member {id} added to crew {crew_id}")))
        }
        DialogKind::AddProperty => {
            let (events, added) = view_data
                .add_property
                .commit(|property| runtime.add_property(property));
            (events, added.map(|id| format!("property {id} added")))
        }
        DialogKind::CompanySettings => {
            let (events, saved) = view_data
                .company
                .commit(|company| runtime.save_company(company));
            (events, saved.map(|()| "company settings saved".to_owned()))
        }
    };
    finish_commit(state, runtime, view_data, internal_tx, &events, message);
}

fn lead_count_message(count: usize, verb: &str) -> String {
    let noun = if count == 1 { "lead" } else { "leads" };
    format!("{count} {noun} {verb}")
}

fn finish_commit<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    events: &[WizardEvent],
    message: Option<String>,
) {
    let Some(message) = message else {
        let message = events
            .last()
            .map(WizardEvent::message)
            .unwrap_or_default();
        emit_status(state, view_data, internal_tx, message);
        return;
    };

    view_data.dialog_lead = None;
    view_data.dialog_crew = None;
    view_data.field_index = 0;
    state.dispatch(AppCommand::ExitToNav);
    if let Err(error) = refresh_view_data(runtime, view_data) {
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("reload failed: {error:#}"),
        );
        return;
    }
    emit_status(state, view_data, internal_tx, message);
}

fn start_import_read<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let token = view_data.read_token.saturating_add(1);
    let Some(form) = view_data.import.form_mut() else {
        return;
    };
    let path = form.file_path.trim().to_owned();
    if path.is_empty() {
        emit_status(
            state,
            view_data,
            internal_tx,
            "file path empty -- type a path and retry",
        );
        return;
    }
    if !form.begin_read(token) {
        emit_status(state, view_data, internal_tx, "file read already in progress");
        return;
    }
    view_data.read_token = token;

    if let Err(error) = runtime.spawn_import_read(token, PathBuf::from(&path), internal_tx.clone())
    {
        if let Some(form) = view_data.import.form_mut() {
            form.complete_read(token, Err(format!("{error:#}")));
        }
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("read failed: {error:#}"),
        );
        return;
    }
    emit_status(state, view_data, internal_tx, format!("reading {path}"));
}

fn handle_search_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.search_input.clear();
            apply_search(state.active_page, view_data);
            state.dispatch(AppCommand::ExitToNav);
            emit_status(state, view_data, internal_tx, "search cleared");
        }
        KeyCode::Enter => {
            state.dispatch(AppCommand::ExitToNav);
            let count = active_filtered_count(state.active_page, view_data);
            emit_status(state, view_data, internal_tx, format!("{count} matching"));
        }
        KeyCode::Backspace => {
            view_data.search_input.pop();
            apply_search(state.active_page, view_data);
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.search_input.push(ch);
            apply_search(state.active_page, view_data);
        }
        _ => {}
    }
}

fn apply_search(page: Page, view_data: &mut ViewData) {
    let query = view_data.search_input.clone();
    match page {
        Page::Dashboard => view_data.recent_leads.set_query(&query),
        Page::Leads => view_data.lead_table.set_query(&query),
        Page::Crews => view_data.crew_table.set_query(&query),
        Page::Properties => view_data.property_table.set_query(&query),
        Page::Settings => return,
    };
    view_data.cursor.row = 0;
}

fn active_query(page: Page, view_data: &ViewData) -> String {
    let filter = match page {
        Page::Dashboard => &view_data.recent_leads.state().filter,
        Page::Leads => &view_data.lead_table.state().filter,
        Page::Crews => &view_data.crew_table.state().filter,
        Page::Properties => &view_data.property_table.state().filter,
        Page::Settings => return String::new(),
    };
    filter.query.clone()
}

fn active_filtered_count(page: Page, view_data: &ViewData) -> usize {
    match page {
        Page::Dashboard => view_data.recent_leads.filtered_count(&view_data.leads),
        Page::Leads => view_data.lead_table.filtered_count(&view_data.leads),
        Page::Crews => view_data.crew_table.filtered_count(&view_data.crews),
        Page::Properties => view_data
            .property_table
            .filtered_count(&view_data.properties),
        Page::Settings => 0,
    }
}

fn handle_section_edit_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    section: LeadSection,
    key: KeyEvent,
) {
    let fields = section_fields(view_data, section);
    match key.code {
        KeyCode::Esc => {
            if let Some(editor) = view_data.editor.as_mut() {
                editor.cancel(section);
            }
            view_data.field_index = 0;
            state.dispatch(AppCommand::ExitToNav);
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("{} edit canceled", section.label()),
            );
        }
        KeyCode::Enter => save_section(state, runtime, view_data, internal_tx, section),
        KeyCode::Tab => {
            if let WizardKey::Status(message) =
                move_field_cursor(&mut view_data.field_index, &fields, 1)
            {
                emit_status(state, view_data, internal_tx, message);
            }
        }
        KeyCode::BackTab => {
            if let WizardKey::Status(message) =
                move_field_cursor(&mut view_data.field_index, &fields, -1)
            {
                emit_status(state, view_data, internal_tx, message);
            }
        }
        _ => {
            let Some(field) = fields.get(view_data.field_index) else {
                return;
            };
            if let Some(value) = edited_value(field, key)
                && let Some(editor) = view_data.editor.as_mut()
            {
                editor.set_field(section, field.key, &value);
            }
        }
    }
}

fn section_fields(view_data: &ViewData, section: LeadSection) -> Vec<FormField> {
    let Some(editor) = &view_data.editor else {
        return Vec::new();
    };
    match view_data.find_lead(editor.lead_id().as_str()) {
        Some(lead) => editor.fields(section, lead),
        None => Vec::new(),
    }
}

fn save_section<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    section: LeadSection,
) {
    let Some(editor) = view_data.editor.as_mut() else {
        state.dispatch(AppCommand::ExitToNav);
        return;
    };
    let lead_id = editor.lead_id().clone();
    let edit = match editor.save(section) {
        Ok(edit) => edit,
        Err(error) => {
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("save failed: {error:#}"),
            );
            return;
        }
    };
    if let Err(error) = runtime.save_lead_section(lead_id.as_str(), edit) {
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("save failed: {error:#}"),
        );
        return;
    }

    view_data.field_index = 0;
    state.dispatch(AppCommand::ExitToNav);
    if let Err(error) = refresh_view_data(runtime, view_data) {
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("reload failed: {error:#}"),
        );
        return;
    }
    emit_status(
        state,
        view_data,
        internal_tx,
        format!("{} saved", section.label()),
    );
}

fn handle_settings_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let count = view_data.settings.services.types().len();
    match (key.code, key.modifiers) {
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => {
            view_data.settings_cursor =
                (view_data.settings_cursor + 1).min(count.saturating_sub(1));
        }
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => {
            view_data.settings_cursor = view_data.settings_cursor.saturating_sub(1);
        }
        (KeyCode::Char('a'), KeyModifiers::NONE) => {
            view_data.service_input = Some(String::new());
            emit_status(state, view_data, internal_tx, "new service type");
        }
        (KeyCode::Char('e'), KeyModifiers::NONE) => {
            open_dialog(state, view_data, internal_tx, DialogKind::CompanySettings);
        }
        (KeyCode::Char('d'), KeyModifiers::NONE) => {
            match runtime.remove_service_type(view_data.settings_cursor) {
                Ok(Some(name)) => {
                    reload_with_status(
                        state,
                        runtime,
                        view_data,
                        internal_tx,
                        format!("removed {name}"),
                    );
                }
                Ok(None) => emit_status(state, view_data, internal_tx, "no service type selected"),
                Err(error) => emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("remove failed: {error:#}"),
                ),
            }
        }
        _ => {}
    }
}

fn handle_service_input_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(input) = view_data.service_input.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => {
            view_data.service_input = None;
            emit_status(state, view_data, internal_tx, "add canceled");
        }
        KeyCode::Backspace => {
            input.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.push(ch),
        KeyCode::Enter => {
            let name = input.clone();
            view_data.service_input = None;
            match runtime.add_service_type(&name) {
                Ok(true) => reload_with_status(
                    state,
                    runtime,
                    view_data,
                    internal_tx,
                    format!("added {}", name.trim()),
                ),
                Ok(false) => emit_status(
                    state,
                    view_data,
                    internal_tx,
                    "service type empty or already listed",
                ),
                Err(error) => emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("add failed: {error:#}"),
                ),
            }
        }
        _ => {}
    }
}

fn reload_with_status<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: String,
) {
    match refresh_view_data(runtime, view_data) {
        Ok(()) => emit_status(state, view_data, internal_tx, message),
        Err(error) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("reload failed: {error:#}"),
        ),
    }
}

fn table_command_for_key(key: KeyEvent) -> Option<TableCommand> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(TableCommand::MoveRow(1)),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(TableCommand::MoveRow(-1)),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => Some(TableCommand::MoveColumn(-1)),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => Some(TableCommand::MoveColumn(1)),
        (KeyCode::Char('s'), KeyModifiers::NONE) => Some(TableCommand::CycleSort),
        (KeyCode::Char('S'), _) => Some(TableCommand::ClearSort),
        (KeyCode::Char('n'), KeyModifiers::NONE) => Some(TableCommand::TogglePin),
        (KeyCode::Char('N'), _) => Some(TableCommand::ClearPin),
        (KeyCode::Char('!'), _) => Some(TableCommand::ToggleInvert),
        (KeyCode::Char(']'), _) | (KeyCode::PageDown, _) => Some(TableCommand::NextPage),
        (KeyCode::Char('['), _) | (KeyCode::PageUp, _) => Some(TableCommand::PrevPage),
        (KeyCode::Char(' '), _) => Some(TableCommand::ToggleSelection),
        _ => None,
    }
}

fn apply_table_command(
    page: Page,
    view_data: &mut ViewData,
    command: TableCommand,
) -> Option<TableStatus> {
    let cursor = &mut view_data.cursor;
    match page {
        Page::Dashboard => {
            run_table_command(&mut view_data.recent_leads, &view_data.leads, cursor, command)
        }
        Page::Leads => {
            run_table_command(&mut view_data.lead_table, &view_data.leads, cursor, command)
        }
        Page::Crews => {
            run_table_command(&mut view_data.crew_table, &view_data.crews, cursor, command)
        }
        Page::Properties => run_table_command(
            &mut view_data.property_table,
            &view_data.properties,
            cursor,
            command,
        ),
        Page::Settings => None,
    }
}

fn run_table_command<R: Record>(
    table: &mut TableView<R>,
    records: &[R],
    cursor: &mut TableCursor,
    command: TableCommand,
) -> Option<TableStatus> {
    let status = match command {
        TableCommand::MoveRow(delta) => {
            cursor.row = (cursor.row as isize + delta).max(0) as usize;
            None
        }
        TableCommand::MoveColumn(delta) => {
            let last = table.column_count().saturating_sub(1) as isize;
            cursor.col = (cursor.col as isize + delta).clamp(0, last) as usize;
            None
        }
        TableCommand::CycleSort => {
            let key = table.column_key(cursor.col)?;
            cursor.row = 0;
            Some(table.toggle_sort(key))
        }
        TableCommand::ClearSort => {
            cursor.row = 0;
            Some(table.clear_sort())
        }
        TableCommand::TogglePin => {
            let page = table.visible_rows(records);
            let Some(record) = page.rows.get(cursor.row) else {
                return Some(TableStatus::PinUnavailable);
            };
            let key = table.column_key(cursor.col)?;
            let value = table.cell_at(record, cursor.col)?;
            cursor.row = 0;
            Some(table.toggle_pin(key, value))
        }
        TableCommand::ClearPin => {
            cursor.row = 0;
            Some(table.clear_pin())
        }
        TableCommand::ToggleInvert => {
            cursor.row = 0;
            Some(table.toggle_inverted())
        }
        TableCommand::NextPage => {
            cursor.row = 0;
            Some(table.next_page(records))
        }
        TableCommand::PrevPage => {
            cursor.row = 0;
            Some(table.prev_page(records))
        }
        TableCommand::ToggleSelection => {
            let page = table.visible_rows(records);
            let id = page.rows.get(cursor.row)?.record_id().to_owned();
            Some(table.toggle_selection(&id))
        }
    };
    let visible = table.visible_rows(records).rows.len();
    cursor.row = cursor.row.min(visible.saturating_sub(1));
    status
}

fn refresh_view_data<R: AppRuntime>(runtime: &mut R, view_data: &mut ViewData) -> Result<()> {
    view_data.leads = runtime.load_leads().context("load leads")?;
    view_data.crews = runtime.load_crews().context("load crews")?;
    view_data.properties = runtime.load_properties().context("load properties")?;
    view_data.settings = runtime.load_settings().context("load settings")?;
    let services = view_data.settings.services.types().len();
    view_data.settings_cursor = view_data.settings_cursor.min(services.saturating_sub(1));
    Ok(())
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = Page::ALL
        .iter()
        .position(|page| *page == state.active_page)
        .unwrap_or(0);
    let titles = Page::ALL
        .iter()
        .map(|page| page_title(*page, state, view_data))
        .collect::<Vec<_>>();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title(view_data.settings.company.name.as_str())
                .borders(Borders::ALL),
        )
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let body = layout[1];
    match (&state.detail, state.active_page) {
        (Some(intent), _) => {
            let detail = Paragraph::new(render_detail_text(state, view_data, intent))
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title(intent.path()));
            frame.render_widget(detail, body);
        }
        (None, Page::Dashboard) => {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(6), Constraint::Min(3)])
                .split(body);
            let counts = Paragraph::new(render_dashboard_text(view_data))
                .block(Block::default().borders(Borders::ALL).title("dashboard"));
            frame.render_widget(counts, parts[0]);
            render_table(
                frame,
                parts[1],
                &view_data.recent_leads,
                &view_data.leads,
                view_data.cursor,
            );
        }
        (None, Page::Leads) => render_table(
            frame,
            body,
            &view_data.lead_table,
            &view_data.leads,
            view_data.cursor,
        ),
        (None, Page::Crews) => render_table(
            frame,
            body,
            &view_data.crew_table,
            &view_data.crews,
            view_data.cursor,
        ),
        (None, Page::Properties) => render_table(
            frame,
            body,
            &view_data.property_table,
            &view_data.properties,
            view_data.cursor,
        ),
        (None, Page::Settings) => {
            let settings = Paragraph::new(render_settings_text(view_data))
                .block(Block::default().borders(Borders::ALL).title("settings"));
            frame.render_widget(settings, body);
        }
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let AppMode::Dialog(kind) = state.mode {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let dialog = Paragraph::new(render_dialog_text(kind, view_data))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(kind.title())
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(dialog, area);
    }

    if view_data.help_visible {
        let area = centered_rect(80, 72, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn page_title(page: Page, state: &AppState, view_data: &ViewData) -> String {
    if state.active_page != page {
        return format!(" {} ", page.label());
    }
    let filter = match page {
        Page::Dashboard => Some(&view_data.recent_leads.state().filter),
        Page::Leads => Some(&view_data.lead_table.state().filter),
        Page::Crews => Some(&view_data.crew_table.state().filter),
        Page::Properties => Some(&view_data.property_table.state().filter),
        Page::Settings => None,
    };
    match filter {
        Some(filter) if filter.is_active() => {
            let marker = if filter.inverted {
                FILTER_MARK_INVERTED
            } else {
                FILTER_MARK
            };
            format!(" {} {marker} ", page.label())
        }
        _ => format!(" {} ", page.label()),
    }
}

fn render_table<R: Record>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    table: &TableView<R>,
    records: &[R],
    cursor: TableCursor,
) {
    let page = table.visible_rows(records);
    let cells = table.render_rows(&page);

    let header = Row::new(
        std::iter::once(String::new())
            .chain(table.header_labels())
            .map(|label| {
                Cell::from(label).style(
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
            }),
    );

    let rows = if page.rows.is_empty() {
        vec![Row::new(vec![
            Cell::from(""),
            Cell::from(empty_table_message(page.source_rows))
                .style(Style::default().fg(Color::DarkGray)),
        ])]
    } else {
        page.rows
            .iter()
            .zip(cells)
            .enumerate()
            .map(|(row_index, (record, row))| {
                let marker = if table.is_selected(record.record_id()) {
                    "*"
                } else {
                    ""
                };
                let selected_row = row_index == cursor.row;
                let mut line = vec![Cell::from(marker)];
                line.extend(row.into_iter().enumerate().map(|(column, value)| {
                    let mut style = Style::default();
                    if let Some(color) = value.color() {
                        style = style.fg(status_color(color));
                    }
                    if selected_row {
                        style = style.bg(Color::DarkGray);
                    }
                    if selected_row && column == cursor.col {
                        style = Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD);
                    }
                    Cell::from(value.display()).style(style)
                }));
                Row::new(line)
            })
            .collect()
    };

    let mut widths = vec![Constraint::Length(1)];
    widths.extend(vec![Constraint::Min(8); table.column_count().max(1)]);
    let widget = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table.summary(&page))
                .borders(Borders::ALL),
        );
    frame.render_widget(widget, area);
}

fn empty_table_message(source_rows: usize) -> &'static str {
    if source_rows == 0 {
        "no records yet"
    } else {
        "no matching records"
    }
}

fn status_color(color: StatusColor) -> Color {
    match color {
        StatusColor::Blue => Color::Blue,
        StatusColor::Purple => Color::Magenta,
        StatusColor::Green => Color::Green,
        StatusColor::Yellow => Color::Yellow,
        StatusColor::Red => Color::Red,
        StatusColor::Neutral => Color::Gray,
    }
}

fn render_dashboard_text(view_data: &ViewData) -> String {
    let counts = LeadCounts::from_leads(&view_data.leads);
    let per_status = LeadStatus::ALL
        .iter()
        .map(|status| format!("{}: {}", status.label(), counts.for_status(*status)))
        .collect::<Vec<_>>()
        .join(" | ");
    [
        format!("total leads: {}", counts.total),
        per_status,
        format!("conversion: {}%", counts.conversion_percent()),
        format!(
            "crews: {} | properties: {}",
            view_data.crews.len(),
            view_data.properties.len()
        ),
    ]
    .join("\n")
}

fn render_detail_text(state: &AppState, view_data: &ViewData, intent: &NavigationIntent) -> String {
    let id = intent.id.as_str();
    let text = match intent.kind {
        RecordKind::Lead => view_data
            .find_lead(id)
            .map(|lead| render_lead_detail_text(state, view_data, lead)),
        RecordKind::Crew => view_data
            .crews
            .iter()
            .find(|crew| crew.id.as_str() == id)
            .map(render_crew_detail_text),
        RecordKind::Property => view_data
            .properties
            .iter()
            .find(|property| property.id.as_str() == id)
            .map(render_property_detail_text),
    };
    text.unwrap_or_else(|| {
        let kind = match intent.kind {
            RecordKind::Lead => "lead",
            RecordKind::Crew => "crew",
            RecordKind::Property => "property",
        };
        format!("{kind} {id} not found -- press esc to go back")
    })
}

fn render_lead_detail_text(state: &AppState, view_data: &ViewData, lead: &Lead) -> String {
    let mut lines = vec![
        format!(
            "[{}] {} | {} | since {}",
            lead.initials(),
            lead.name,
            lead.status.label(),
            lead.date
        ),
        String::new(),
    ];

    for (index, section) in LeadSection::ALL.iter().enumerate() {
        let cursor = if index == view_data.section_index {
            ">"
        } else {
            " "
        };
        let editing = view_data
            .editor
            .as_ref()
            .is_some_and(|editor| editor.is_editing(*section));
        let fields = match &view_data.editor {
            Some(editor) => editor.fields(*section, lead),
            None => LeadDetailEditor::new(lead.id.clone()).fields(*section, lead),
        };
        lines.push(format!(
            "{cursor} {}{}",
            section.label(),
            if editing { " (editing)" } else { "" }
        ));
        let focused =
            (state.mode == AppMode::EditSection(*section)).then_some(view_data.field_index);
        for (field_index, field) in fields.iter().enumerate() {
            let marker = if focused == Some(field_index) {
                "›"
            } else {
                " "
            };
            lines.push(format!("   {marker} {}: {}", field.label, field.value));
        }
    }

    if !lead.history.is_empty() {
        lines.push(String::new());
        lines.push("history".to_owned());
        for entry in &lead.history {
            let mut line = format!("  {} {}", entry.date, entry.action);
            if !entry.notes.is_empty() {
                line.push_str(&format!(": {}", entry.notes));
            }
            lines.push(line);
        }
    }
    if !lead.documents.is_empty() {
        lines.push(String::new());
        lines.push("documents".to_owned());
        for document in &lead.documents {
            lines.push(format!(
                "  {} ({}, {})",
                document.name, document.kind, document.date
            ));
        }
    }

    let engagement = &lead.engagement;
    lines.push(String::new());
    lines.push(format!(
        "engagement: {} services | total spent {}",
        engagement.total_services,
        format_money(engagement.total_spent_cents)
    ));
    if let Some(next) = engagement.next_service {
        lines.push(format!("next service: {next}"));
    }
    lines.join("\n")
}

fn render_crew_detail_text(crew: &Crew) -> String {
    let mut lines = vec![
        format!("{} | rating {:.1}", crew.name, crew.rating),
        format!("specialties: {}", crew.specialties_label()),
        format!(
            "jobs: {} active, {} completed | {} of {} members available",
            crew.active_jobs,
            crew.completed_jobs,
            crew.available_members(),
            crew.members.len()
        ),
    ];
    if let Some(job) = &crew.current_job {
        lines.push(format!("current job: {job}"));
    }
    if let Some(job) = &crew.next_job {
        lines.push(format!("next job: {job}"));
    }
    lines.push(String::new());
    lines.push(format!(
        "leader: {} - {} [{}]",
        crew.leader.name,
        crew.leader.role,
        crew.leader.status.as_str()
    ));
    for member in &crew.members {
        lines.push(format!(
            "  {} - {} [{}]",
            member.name,
            member.role,
            member.status.as_str()
        ));
    }
    lines.join("\n")
}

fn render_property_detail_text(property: &Property) -> String {
    let mut lines = vec![
        property.address.clone(),
        format!(
            "{} | {} | {}",
            property.kind,
            property.size,
            property.project_status.as_str()
        ),
    ];
    if let Some(budget) = property.budget_cents {
        lines.push(format!("budget: {}", format_money(budget)));
    }
    if !property.features.is_empty() {
        lines.push(format!("features: {}", property.features.join(", ")));
    }
    if !property.notes.is_empty() {
        lines.push(format!("notes: {}", property.notes));
    }
    lines.push(String::new());
    lines.push(format!("images: {}", property.images.len()));
    let public = property.public_images().collect::<Vec<_>>();
    if !public.is_empty() {
        lines.push("public gallery".to_owned());
        for image in public {
            lines.push(format!("  {} ({})", image.caption, image.url));
        }
        if let Some(url) = &property.public_gallery_url {
            lines.push(format!("  share: {url}"));
        }
    }
    lines.join("\n")
}

fn render_settings_text(view_data: &ViewData) -> String {
    let company = &view_data.settings.company;
    let mut lines = vec![
        format!("company: {}", company.name),
        format!("phone: {}", company.phone),
        format!("email: {}", company.email),
        format!("address: {}", company.address),
        String::new(),
        "service types".to_owned(),
    ];
    for (index, name) in view_data.settings.services.types().iter().enumerate() {
        let cursor = if index == view_data.settings_cursor {
            ">"
        } else {
            " "
        };
        lines.push(format!("{cursor} {name}"));
    }
    if let Some(input) = &view_data.service_input {
        lines.push(format!("+ {input}_"));
    }
    lines.join("\n")
}

fn render_dialog_text(kind: DialogKind, view_data: &ViewData) -> String {
    let index = view_data.field_index;
    match kind {
        DialogKind::AddLead => render_wizard_text(&view_data.add_lead, index),
        DialogKind::ScheduleService => render_wizard_text(&view_data.schedule, index),
        DialogKind::StatusUpdate => render_wizard_text(&view_data.status_update, index),
        DialogKind::AddCrew => render_wizard_text(&view_data.add_crew, index),
        DialogKind::AddMember => render_wizard_text(&view_data.add_member, index),
        DialogKind::AddProperty => render_wizard_text(&view_data.add_property, index),
        DialogKind::CompanySettings => render_wizard_text(&view_data.company, index),
        DialogKind::ImportLeads => {
            let mut text = render_wizard_text(&view_data.import, index);
            text.push('\n');
            text.push_str(&render_import_preview_text(view_data.import.form()));
            text
        }
    }
}

fn render_wizard_text<F: WizardForm>(wizard: &Wizard<F>, field_index: usize) -> String {
    let mut lines = vec![
        format!("step {} of {}", wizard.step(), wizard.total_steps()),
        String::new(),
    ];
    for (index, field) in wizard.current_fields().iter().enumerate() {
        let marker = if index == field_index { "›" } else { " " };
        let required = if field.required { "*" } else { "" };
        let mut line = format!("{marker} {}{required}: {}", field.label, field.value);
        if let FieldKind::Choice(options) = &field.kind
            && !options.is_empty()
        {
            line.push_str(&format!("  (←/→ {})", options.join(" | ")));
        }
        lines.push(line);
    }
    lines.push(String::new());
    let submit = if wizard.is_last_step() {
        "enter submit"
    } else {
        "enter next"
    };
    lines.push(format!(
        "{submit} | ctrl+b back | tab field | esc cancel"
    ));
    lines.join("\n")
}

fn render_import_preview_text(form: &CsvImportForm) -> String {
    let mut lines = Vec::new();
    if form.read_pending() {
        lines.push("reading file...".to_owned());
    }
    if let Some(error) = form.read_error() {
        lines.push(format!("read failed: {error}"));
    }
    let parsed = form.parsed();
    if parsed.is_empty() {
        lines.push("no rows yet -- paste CSV/TSV or ctrl+r to read the file".to_owned());
        return lines.join("\n");
    }
    lines.push(parsed.summary());
    lines.push(parsed.headers.join(" | "));
    let preview = parsed.preview();
    for row in preview.rows {
        lines.push(
            parsed
                .headers
                .iter()
                .map(|header| row.get(header).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(" | "),
        );
    }
    if preview.remaining > 0 {
        lines.push(format!("... and {} more", preview.remaining));
    }
    lines.join("\n")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
nav: tab/shift+tab pages | j/k rows | h/l columns | enter open | esc back\n\
table: s sort column | S clear sort | / search | n pin cell | N clear pin | ! invert\n\
table: ]/[ next/prev page | space select row\n\
leads: a add | i import | u update status | c schedule service\n\
crews: A add crew | m add member to crew\n\
properties: a add property\n\
detail: j/k section | e edit section | u status | c schedule | m add member | esc close\n\
dialog: tab/shift+tab field | ←/→ choose | enter next/submit | ctrl+b back | esc cancel\n\
import: ctrl+r read file path | paste text directly\n\
settings: j/k move | a add service type | d remove | e edit company"
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }
    let (mode, hints) = match state.mode {
        AppMode::Nav if state.detail.is_some() => ("NAV", "j/k e u c m | esc back | ? help"),
        AppMode::Nav => (
            "NAV",
            "tab pages | j/k/h/l | s/S / n/N ! | ]/[ | enter | a i u c A m e | ? | ctrl+q",
        ),
        AppMode::Search => ("SEARCH", "type to filter | enter keep | esc clear"),
        AppMode::Dialog(_) => ("FORM", "tab field | enter next | ctrl+b back | esc cancel"),
        AppMode::EditSection(_) => ("EDIT", "tab field | enter save | esc cancel"),
    };
    let mut prefix = mode.to_owned();
    if state.mode == AppMode::Search {
        prefix = format!("{mode} /{}", view_data.search_input);
    }
    match &state.status_line {
        Some(status) => format!("{prefix} | {status} | {hints}"),
        None => format!("{prefix} | {hints}"),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
