// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Sorted, filtered, paginated views over caller-owned record slices.
//!
//! A [`TableView`] never stores records. Every query takes the current slice
//! and re-derives the view in a fixed order: filter, then sort, then
//! paginate. Sorting is stable, so rows that compare equal keep the order
//! they had in the input.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use time::Date;

use crate::{StatusColor, format_money};

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Lead,
    Crew,
    Property,
}

impl RecordKind {
    pub const fn route_prefix(self) -> &'static str {
        match self {
            Self::Lead => "/leads",
            Self::Crew => "/crews",
            Self::Property => "/properties",
        }
    }
}

/// Anything the engine can show: it only needs an opaque id. Ids are assumed
/// unique within one collection but the engine does not check.
pub trait Record {
    const KIND: RecordKind;

    fn record_id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NavigationIntent {
    pub kind: RecordKind,
    pub id: String,
}

impl NavigationIntent {
    pub fn path(&self) -> String {
        format!("{}/{}", self.kind.route_prefix(), self.id)
    }

    pub fn parse_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        [RecordKind::Lead, RecordKind::Crew, RecordKind::Property]
            .into_iter()
            .find_map(|kind| {
                let id = trimmed.strip_prefix(kind.route_prefix())?.strip_prefix('/')?;
                if id.is_empty() || id.contains('/') {
                    return None;
                }
                Some(Self {
                    kind,
                    id: id.to_owned(),
                })
            })
    }
}

/// Display value of one cell. Also serves as the default sort key.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Decimal(Option<f64>),
    Money(Option<i64>),
    Date(Option<Date>),
    Status { label: String, color: StatusColor },
    List(Vec<String>),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn status(label: impl Into<String>, color: StatusColor) -> Self {
        Self::Status {
            label: label.into(),
            color,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Decimal(Some(value)) => format!("{value:.1}"),
            Self::Money(Some(cents)) => format_money(*cents),
            Self::Date(Some(value)) => value.to_string(),
            Self::Decimal(None) | Self::Money(None) | Self::Date(None) => String::new(),
            Self::Status { label, .. } => label.clone(),
            Self::List(items) => items.join(", "),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Self::Decimal(None) | Self::Money(None) | Self::Date(None)
        )
    }

    pub fn color(&self) -> Option<StatusColor> {
        match self {
            Self::Status { color, .. } => Some(*color),
            _ => None,
        }
    }

    /// Total order used for sorting. Nulls sort below every value so that a
    /// descending sort is the exact reverse of an ascending one.
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }

        match (self, other) {
            (Self::Integer(left), Self::Integer(right)) => left.cmp(right),
            (Self::Decimal(Some(left)), Self::Decimal(Some(right))) => left.total_cmp(right),
            (Self::Money(left), Self::Money(right)) => left.cmp(right),
            (Self::Date(left), Self::Date(right)) => left.cmp(right),
            (Self::Text(left), Self::Text(right)) => {
                left.to_lowercase().cmp(&right.to_lowercase())
            }
            _ => self
                .display()
                .to_lowercase()
                .cmp(&other.display().to_lowercase()),
        }
    }

    /// `needle` must already be lowercased.
    pub fn matches_query(&self, needle: &str) -> bool {
        match self {
            Self::List(items) => items
                .iter()
                .any(|item| item.to_lowercase().contains(needle)),
            _ => self.display().to_lowercase().contains(needle),
        }
    }

    pub fn matches_pin(&self, pin: &Self) -> bool {
        match (self, pin) {
            (Self::Text(value), Self::Text(pin)) => {
                value.trim().to_lowercase() == pin.trim().to_lowercase()
            }
            (Self::Status { label, .. }, Self::Status { label: pin, .. }) => {
                label.eq_ignore_ascii_case(pin)
            }
            _ => self == pin,
        }
    }
}

/// Column descriptor. Only rendering is required; ordering defaults to
/// comparing rendered cells and can be overridden per column.
pub trait Column<R> {
    fn key(&self) -> &'static str;

    fn label(&self) -> &'static str;

    fn render_cell(&self, record: &R) -> Cell;

    fn sort_value(&self, record: &R) -> Cell {
        self.render_cell(record)
    }

    fn compare(&self, left: &R, right: &R) -> Ordering {
        self.sort_value(left).cmp_value(&self.sort_value(right))
    }

    fn sortable(&self) -> bool {
        true
    }

    fn searchable(&self) -> bool {
        false
    }
}

/// Column backed by a plain render function.
pub struct FieldColumn<R> {
    key: &'static str,
    label: &'static str,
    render: fn(&R) -> Cell,
    sortable: bool,
    searchable: bool,
}

impl<R> FieldColumn<R> {
    pub fn new(key: &'static str, label: &'static str, render: fn(&R) -> Cell) -> Self {
        Self {
            key,
            label,
            render,
            sortable: true,
            searchable: false,
        }
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn boxed(self) -> Box<dyn Column<R>>
    where
        R: 'static,
    {
        Box::new(self)
    }
}

impl<R> Column<R> for FieldColumn<R> {
    fn key(&self) -> &'static str {
        self.key
    }

    fn label(&self) -> &'static str {
        self.label
    }

    fn render_cell(&self, record: &R) -> Cell {
        (self.render)(record)
    }

    fn sortable(&self) -> bool {
        self.sortable
    }

    fn searchable(&self) -> bool {
        self.searchable
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: usize,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PinnedCell {
    pub column: usize,
    pub value: Cell,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableFilter {
    pub query: String,
    pub pin: Option<PinnedCell>,
    pub inverted: bool,
}

impl TableFilter {
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty() || self.pin.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    pub sort: Option<SortSpec>,
    pub filter: TableFilter,
    pub page: usize,
    pub page_size: usize,
    pub selected: BTreeSet<String>,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            sort: None,
            filter: TableFilter::default(),
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            selected: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    SortAsc(&'static str),
    SortDesc(&'static str),
    SortCleared,
    SortUnavailable(String),
    FilterOn,
    FilterOff,
    PinOn(String),
    PinOff,
    PinUnavailable,
    InvertOn,
    InvertOff,
    Page { page: usize, total: usize },
    Selected(usize),
    SelectionCleared,
}

impl TableStatus {
    pub fn message(&self) -> String {
        match self {
            Self::SortAsc(column) => format!("sort {column} asc"),
            Self::SortDesc(column) => format!("sort {column} desc"),
            Self::SortCleared => "sort cleared".to_owned(),
            Self::SortUnavailable(column) => format!("sort unavailable for {column}"),
            Self::FilterOn => "filter on".to_owned(),
            Self::FilterOff => "filter off".to_owned(),
            Self::PinOn(value) => format!("pin on ({value})"),
            Self::PinOff => "pin off".to_owned(),
            Self::PinUnavailable => "pin unavailable".to_owned(),
            Self::InvertOn => "filter inverted on".to_owned(),
            Self::InvertOff => "filter inverted off".to_owned(),
            Self::Page { page, total } => format!("page {} of {total}", page + 1),
            Self::Selected(count) => format!("{count} selected"),
            Self::SelectionCleared => "selection cleared".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TablePage<'a, R> {
    pub rows: Vec<&'a R>,
    pub page: usize,
    pub total_pages: usize,
    pub filtered_rows: usize,
    pub source_rows: usize,
}

impl<R> TablePage<'_, R> {
    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }
}

pub struct TableView<R> {
    title: &'static str,
    columns: Vec<Box<dyn Column<R>>>,
    state: TableState,
}

impl<R: Record> TableView<R> {
    pub fn new(title: &'static str, columns: Vec<Box<dyn Column<R>>>) -> Self {
        Self {
            title,
            columns,
            state: TableState::default(),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.state.page_size = page_size.max(1);
        self
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_key(&self, index: usize) -> Option<&'static str> {
        self.columns.get(index).map(|column| column.key())
    }

    pub fn column_label(&self, index: usize) -> Option<&'static str> {
        self.columns.get(index).map(|column| column.label())
    }

    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.key() == key)
    }

    /// Replaces any active sort. `None` clears sorting.
    pub fn set_sort(&mut self, key: &str, direction: Option<SortDirection>) -> TableStatus {
        let Some(index) = self.column_index(key) else {
            return TableStatus::SortUnavailable(key.to_owned());
        };
        let column = &self.columns[index];
        if !column.sortable() {
            return TableStatus::SortUnavailable(column.label().to_owned());
        }
        let label = column.label();

        self.state.page = 0;
        match direction {
            Some(direction) => {
                self.state.sort = Some(SortSpec {
                    column: index,
                    direction,
                });
                match direction {
                    SortDirection::Asc => TableStatus::SortAsc(label),
                    SortDirection::Desc => TableStatus::SortDesc(label),
                }
            }
            None => {
                self.state.sort = None;
                TableStatus::SortCleared
            }
        }
    }

    /// none -> asc -> desc -> none on one column; a different column starts
    /// over at asc.
    pub fn toggle_sort(&mut self, key: &str) -> TableStatus {
        let current = self
            .state
            .sort
            .filter(|sort| self.column_key(sort.column) == Some(key))
            .map(|sort| sort.direction);
        let next = match current {
            None => Some(SortDirection::Asc),
            Some(SortDirection::Asc) => Some(SortDirection::Desc),
            Some(SortDirection::Desc) => None,
        };
        self.set_sort(key, next)
    }

    pub fn clear_sort(&mut self) -> TableStatus {
        self.state.sort = None;
        self.state.page = 0;
        TableStatus::SortCleared
    }

    pub fn set_filter(&mut self, filter: TableFilter) -> TableStatus {
        self.state.filter = filter;
        self.state.page = 0;
        if self.state.filter.is_active() {
            TableStatus::FilterOn
        } else {
            TableStatus::FilterOff
        }
    }

    pub fn set_query(&mut self, query: &str) -> TableStatus {
        let filter = TableFilter {
            query: query.to_owned(),
            ..self.state.filter.clone()
        };
        self.set_filter(filter)
    }

    /// Pins `value` in column `key`; pinning the same value again unpins.
    pub fn toggle_pin(&mut self, key: &str, value: Cell) -> TableStatus {
        let Some(column) = self.column_index(key) else {
            return TableStatus::PinUnavailable;
        };

        let mut filter = self.state.filter.clone();
        if let Some(existing) = &filter.pin
            && existing.column == column
            && existing.value.matches_pin(&value)
        {
            filter.pin = None;
            filter.inverted = false;
            self.set_filter(filter);
            return TableStatus::PinOff;
        }

        let label = value.display();
        filter.pin = Some(PinnedCell { column, value });
        self.set_filter(filter);
        TableStatus::PinOn(label)
    }

    pub fn clear_pin(&mut self) -> TableStatus {
        let filter = TableFilter {
            pin: None,
            inverted: false,
            ..self.state.filter.clone()
        };
        self.set_filter(filter);
        TableStatus::PinOff
    }

    pub fn toggle_inverted(&mut self) -> TableStatus {
        let filter = TableFilter {
            inverted: !self.state.filter.inverted,
            ..self.state.filter.clone()
        };
        self.set_filter(filter);
        if self.state.filter.inverted {
            TableStatus::InvertOn
        } else {
            TableStatus::InvertOff
        }
    }

    pub fn filtered_count(&self, records: &[R]) -> usize {
        let query = self.normalized_query();
        records
            .iter()
            .filter(|record| self.matches_filter(record, &query))
            .count()
    }

    /// Never zero: an empty view still has one (empty) page.
    pub fn total_pages(&self, records: &[R]) -> usize {
        self.filtered_count(records)
            .div_ceil(self.state.page_size)
            .max(1)
    }

    /// Clamps into `[0, total_pages - 1]`; out-of-range requests are not
    /// errors.
    pub fn set_page(&mut self, page: isize, records: &[R]) -> TableStatus {
        let total = self.total_pages(records);
        let last = total - 1;
        self.state.page = usize::try_from(page).unwrap_or(0).min(last);
        TableStatus::Page {
            page: self.state.page,
            total,
        }
    }

    pub fn next_page(&mut self, records: &[R]) -> TableStatus {
        let current = self.current_page(records) as isize;
        self.set_page(current + 1, records)
    }

    pub fn prev_page(&mut self, records: &[R]) -> TableStatus {
        let current = self.current_page(records) as isize;
        self.set_page(current - 1, records)
    }

    /// The stored page re-clamped against `records`, which may have shrunk
    /// since the page was set.
    pub fn current_page(&self, records: &[R]) -> usize {
        self.state.page.min(self.total_pages(records) - 1)
    }

    pub fn visible_rows<'a>(&self, records: &'a [R]) -> TablePage<'a, R> {
        let rows = self.derive(records);
        let filtered_rows = rows.len();
        let total_pages = filtered_rows.div_ceil(self.state.page_size).max(1);
        let page = self.state.page.min(total_pages - 1);
        let start = page * self.state.page_size;
        let rows = rows
            .into_iter()
            .skip(start)
            .take(self.state.page_size)
            .collect();

        TablePage {
            rows,
            page,
            total_pages,
            filtered_rows,
            source_rows: records.len(),
        }
    }

    pub fn render_rows(&self, page: &TablePage<'_, R>) -> Vec<Vec<Cell>> {
        page.rows
            .iter()
            .map(|record| {
                self.columns
                    .iter()
                    .map(|column| column.render_cell(record))
                    .collect()
            })
            .collect()
    }

    pub fn header_labels(&self) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .map(|(index, column)| match self.state.sort {
                Some(sort) if sort.column == index => {
                    let arrow = match sort.direction {
                        SortDirection::Asc => "↑",
                        SortDirection::Desc => "↓",
                    };
                    format!("{} {arrow}", column.label())
                }
                _ => column.label().to_owned(),
            })
            .collect()
    }

    pub fn cell_at(&self, record: &R, column: usize) -> Option<Cell> {
        self.columns
            .get(column)
            .map(|column| column.render_cell(record))
    }

    /// Navigation intent for the `visible_index`-th row of the current page.
    pub fn row_click(&self, records: &[R], visible_index: usize) -> Option<NavigationIntent> {
        let page = self.visible_rows(records);
        let record = page.rows.get(visible_index)?;
        Some(NavigationIntent {
            kind: R::KIND,
            id: record.record_id().to_owned(),
        })
    }

    pub fn toggle_selection(&mut self, id: &str) -> TableStatus {
        if !self.state.selected.remove(id) {
            self.state.selected.insert(id.to_owned());
        }
        TableStatus::Selected(self.state.selected.len())
    }

    pub fn select_visible(&mut self, records: &[R]) -> TableStatus {
        let ids = self
            .visible_rows(records)
            .rows
            .iter()
            .map(|record| record.record_id().to_owned())
            .collect::<Vec<_>>();
        self.state.selected.extend(ids);
        TableStatus::Selected(self.state.selected.len())
    }

    pub fn clear_selection(&mut self) -> TableStatus {
        self.state.selected.clear();
        TableStatus::SelectionCleared
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.state.selected.contains(id)
    }

    pub fn selected_records<'a>(&self, records: &'a [R]) -> Vec<&'a R> {
        records
            .iter()
            .filter(|record| self.is_selected(record.record_id()))
            .collect()
    }

    pub fn summary(&self, page: &TablePage<'_, R>) -> String {
        let mut parts = vec![format!(
            "{} {}/{} | page {}/{}",
            self.title,
            page.filtered_rows,
            page.source_rows,
            page.page + 1,
            page.total_pages
        )];
        if let Some(sort) = self.state.sort
            && let Some(label) = self.column_label(sort.column)
        {
            parts.push(format!("sort {label}:{}", sort.direction.label()));
        }
        let query = self.state.filter.query.trim();
        if !query.is_empty() {
            parts.push(format!("search \"{query}\""));
        }
        if let Some(pin) = &self.state.filter.pin
            && let Some(label) = self.column_label(pin.column)
        {
            parts.push(format!("pin {label}={}", pin.value.display()));
        }
        if self.state.filter.inverted {
            parts.push("invert on".to_owned());
        }
        if !self.state.selected.is_empty() {
            parts.push(format!("sel {}", self.state.selected.len()));
        }
        parts.join(" | ")
    }

    fn normalized_query(&self) -> String {
        self.state.filter.query.trim().to_lowercase()
    }

    fn derive<'a>(&self, records: &'a [R]) -> Vec<&'a R> {
        let query = self.normalized_query();
        let mut rows = records
            .iter()
            .filter(|record| self.matches_filter(record, &query))
            .collect::<Vec<_>>();

        if let Some(sort) = self.state.sort
            && let Some(column) = self.columns.get(sort.column)
        {
            rows.sort_by(|left, right| {
                let order = column.compare(left, right);
                match sort.direction {
                    SortDirection::Asc => order,
                    SortDirection::Desc => order.reverse(),
                }
            });
        }
        rows
    }

    fn matches_filter(&self, record: &R, query: &str) -> bool {
        let query_match = query.is_empty()
            || self
                .columns
                .iter()
                .filter(|column| column.searchable())
                .any(|column| column.render_cell(record).matches_query(query));
        if !query_match {
            return false;
        }

        match &self.state.filter.pin {
            Some(pin) => {
                let pin_match = self
                    .columns
                    .get(pin.column)
                    .map(|column| column.render_cell(record).matches_pin(&pin.value))
                    .unwrap_or(false);
                pin_match != self.state.filter.inverted
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Cell, FieldColumn, NavigationIntent, Record, RecordKind, SortDirection, TableFilter,
        TableStatus, TableView,
    };
    use crate::StatusColor;
    use std::cmp::Ordering;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: &'static str,
        name: &'static str,
        group: &'static str,
        score: Option<i64>,
    }

    impl Record for Row {
        const KIND: RecordKind = RecordKind::Lead;

        fn record_id(&self) -> &str {
            self.id
        }
    }

    fn row(id: &'static str, name: &'static str, group: &'static str, score: i64) -> Row {
        Row {
            id,
            name,
            group,
            score: Some(score),
        }
    }

    fn view() -> TableView<Row> {
        TableView::new(
            "rows",
            vec![
                FieldColumn::new("name", "Name", |row: &Row| Cell::text(row.name))
                    .searchable()
                    .boxed(),
                FieldColumn::new("group", "Group", |row: &Row| Cell::text(row.group))
                    .searchable()
                    .boxed(),
                FieldColumn::new("score", "Score", |row: &Row| Cell::Money(row.score)).boxed(),
                FieldColumn::new("actions", "", |_: &Row| Cell::text(""))
                    .unsortable()
                    .boxed(),
            ],
        )
        .with_page_size(2)
    }

    fn ids<'a>(rows: &[&'a Row]) -> Vec<&'a str> {
        rows.iter().map(|row| row.id).collect()
    }

    fn sample() -> Vec<Row> {
        vec![
            row("1", "delta", "b", 40),
            row("2", "alpha", "a", 10),
            row("3", "charlie", "b", 30),
            row("4", "bravo", "a", 20),
            row("5", "echo", "c", 50),
        ]
    }

    #[test]
    fn descending_sort_is_reverse_of_ascending_without_ties() {
        let records = sample();
        let mut table = view().with_page_size(10);

        table.set_sort("name", Some(SortDirection::Asc));
        let mut ascending = ids(&table.visible_rows(&records).rows);
        table.set_sort("name", Some(SortDirection::Desc));
        let descending = ids(&table.visible_rows(&records).rows);

        ascending.reverse();
        assert_eq!(ascending, descending);
    }

    #[test]
    fn sort_is_stable_for_equal_keys_in_both_directions() {
        let records = vec![
            row("1", "a", "x", 1),
            row("2", "b", "y", 1),
            row("3", "c", "x", 1),
            row("4", "d", "y", 1),
        ];
        let mut table = view().with_page_size(10);

        table.set_sort("group", Some(SortDirection::Asc));
        assert_eq!(ids(&table.visible_rows(&records).rows), ["1", "3", "2", "4"]);

        table.set_sort("group", Some(SortDirection::Desc));
        assert_eq!(ids(&table.visible_rows(&records).rows), ["2", "4", "1", "3"]);
    }

    #[test]
    fn only_one_sort_column_is_active() {
        let records = sample();
        let mut table = view().with_page_size(10);
        table.set_sort("group", Some(SortDirection::Asc));
        table.set_sort("score", Some(SortDirection::Desc));

        let sort = table.state().sort.expect("sort set");
        assert_eq!(table.column_key(sort.column), Some("score"));
        assert_eq!(
            ids(&table.visible_rows(&records).rows),
            ["5", "1", "3", "4", "2"]
        );
    }

    #[test]
    fn toggle_sort_cycles_through_none() {
        let mut table = view();
        assert_eq!(table.toggle_sort("name"), TableStatus::SortAsc("Name"));
        assert_eq!(table.toggle_sort("name"), TableStatus::SortDesc("Name"));
        assert_eq!(table.toggle_sort("name"), TableStatus::SortCleared);
        assert!(table.state().sort.is_none());
        assert_eq!(table.toggle_sort("group"), TableStatus::SortAsc("Group"));
    }

    #[test]
    fn unsortable_and_unknown_columns_refuse_sort() {
        let mut table = view();
        assert_eq!(
            table.set_sort("actions", Some(SortDirection::Asc)),
            TableStatus::SortUnavailable(String::new())
        );
        assert!(matches!(
            table.set_sort("missing", Some(SortDirection::Asc)),
            TableStatus::SortUnavailable(_)
        ));
        assert!(table.state().sort.is_none());
    }

    #[test]
    fn nulls_sort_below_values() {
        let mut records = sample();
        records[1].score = None;
        let mut table = view().with_page_size(10);

        table.set_sort("score", Some(SortDirection::Asc));
        assert_eq!(table.visible_rows(&records).rows[0].id, "2");
        table.set_sort("score", Some(SortDirection::Desc));
        assert_eq!(table.visible_rows(&records).rows[4].id, "2");
    }

    #[test]
    fn filter_applies_before_pagination() {
        let records = sample();
        let mut table = view();
        table.set_sort("score", Some(SortDirection::Asc));
        table.set_filter(TableFilter::search("b"));

        let page = table.visible_rows(&records);
        assert_eq!(page.filtered_rows, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(ids(&page.rows), ["4", "3"]);

        table.set_page(1, &records);
        assert_eq!(ids(&table.visible_rows(&records).rows), ["1"]);
    }

    #[test]
    fn search_is_case_insensitive_and_limited_to_searchable_columns() {
        let records = sample();
        let mut table = view().with_page_size(10);

        table.set_query("ALPHA");
        assert_eq!(ids(&table.visible_rows(&records).rows), ["2"]);

        table.set_query("40");
        assert!(table.visible_rows(&records).rows.is_empty());
    }

    #[test]
    fn set_page_clamps_both_directions() {
        let records = sample();
        let mut table = view();
        assert_eq!(table.total_pages(&records), 3);

        assert_eq!(
            table.set_page(-1, &records),
            TableStatus::Page { page: 0, total: 3 }
        );
        assert_eq!(
            table.set_page(3, &records),
            TableStatus::Page { page: 2, total: 3 }
        );
        assert_eq!(ids(&table.visible_rows(&records).rows), ["5"]);
    }

    #[test]
    fn empty_collection_has_one_empty_page() {
        let records: Vec<Row> = Vec::new();
        let mut table = view();
        assert_eq!(table.total_pages(&records), 1);
        table.set_page(4, &records);
        let page = table.visible_rows(&records);
        assert_eq!(page.page, 0);
        assert!(page.rows.is_empty());
        assert!(!page.has_next());
        assert!(!page.has_prev());
    }

    #[test]
    fn page_is_reclamped_after_collection_shrinks() {
        let mut records = sample();
        let mut table = view();
        table.set_page(2, &records);

        records.truncate(2);
        let page = table.visible_rows(&records);
        assert_eq!(page.page, 0);
        assert_eq!(ids(&page.rows), ["1", "2"]);
    }

    #[test]
    fn view_reflects_external_mutation_without_refresh() {
        let mut records = sample();
        let table = view().with_page_size(10);
        assert_eq!(table.visible_rows(&records).filtered_rows, 5);

        records.push(row("6", "foxtrot", "c", 60));
        assert_eq!(table.visible_rows(&records).filtered_rows, 6);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let records = sample();
        let mut table = view();
        table.set_sort("group", Some(SortDirection::Desc));
        table.set_query("a");
        table.set_page(1, &records);

        let first = ids(&table.visible_rows(&records).rows);
        let second = ids(&table.visible_rows(&records).rows);
        assert_eq!(first, second);
    }

    #[test]
    fn pin_filters_and_inverts() {
        let records = sample();
        let mut table = view().with_page_size(10);

        assert_eq!(
            table.toggle_pin("group", Cell::text("A")),
            TableStatus::PinOn("A".to_owned())
        );
        assert_eq!(ids(&table.visible_rows(&records).rows), ["2", "4"]);

        table.toggle_inverted();
        assert_eq!(ids(&table.visible_rows(&records).rows), ["1", "3", "5"]);

        assert_eq!(table.toggle_pin("group", Cell::text("a")), TableStatus::PinOff);
        assert_eq!(table.visible_rows(&records).filtered_rows, 5);
        assert!(!table.state().filter.inverted);
    }

    #[test]
    fn row_click_emits_navigation_for_visible_row() {
        let records = sample();
        let mut table = view();
        table.set_sort("name", Some(SortDirection::Asc));
        table.set_page(1, &records);

        let intent = table.row_click(&records, 1).expect("row on page");
        assert_eq!(intent.id, "1");
        assert_eq!(intent.path(), "/leads/1");
        assert!(table.row_click(&records, 2).is_none());
    }

    #[test]
    fn navigation_paths_parse_back() {
        let intent = NavigationIntent::parse_path("/properties/7").expect("property path");
        assert_eq!(intent.kind, RecordKind::Property);
        assert_eq!(intent.id, "7");
        assert!(NavigationIntent::parse_path("/leads/").is_none());
        assert!(NavigationIntent::parse_path("/leads/1/extra").is_none());
        assert!(NavigationIntent::parse_path("/settings").is_none());
    }

    #[test]
    fn selection_is_keyed_by_id_so_duplicates_select_together() {
        let records = vec![row("1", "a", "x", 1), row("1", "b", "y", 2)];
        let mut table = view();

        assert_eq!(table.toggle_selection("1"), TableStatus::Selected(1));
        assert_eq!(table.selected_records(&records).len(), 2);

        table.toggle_selection("1");
        assert!(table.selected_records(&records).is_empty());
    }

    #[test]
    fn select_visible_only_takes_current_page() {
        let records = sample();
        let mut table = view();
        table.set_page(1, &records);
        assert_eq!(table.select_visible(&records), TableStatus::Selected(2));
        assert!(table.is_selected("3"));
        assert!(!table.is_selected("1"));
        assert_eq!(table.clear_selection(), TableStatus::SelectionCleared);
    }

    #[test]
    fn filter_change_resets_page() {
        let records = sample();
        let mut table = view();
        table.set_page(2, &records);
        table.set_query("e");
        assert_eq!(table.state().page, 0);
    }

    #[test]
    fn headers_mark_active_sort() {
        let mut table = view();
        table.set_sort("score", Some(SortDirection::Desc));
        assert_eq!(table.header_labels()[2], "Score ↓");
        assert_eq!(table.header_labels()[0], "Name");
    }

    #[test]
    fn status_cells_compare_by_label_and_keep_color() {
        let scheduled = Cell::status("scheduled", StatusColor::Purple);
        let new = Cell::status("new", StatusColor::Blue);
        assert_eq!(new.cmp_value(&scheduled), Ordering::Less);
        assert_eq!(scheduled.color(), Some(StatusColor::Purple));
        assert!(scheduled.matches_pin(&Cell::status("Scheduled", StatusColor::Neutral)));
    }

    #[test]
    fn list_cells_match_any_item() {
        let cell = Cell::List(vec!["Custom Homes".to_owned(), "Remodels".to_owned()]);
        assert!(cell.matches_query("remod"));
        assert!(!cell.matches_query("roof"));
        assert_eq!(cell.display(), "Custom Homes, Remodels");
    }
}
