use std::collections::HashSet;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::domain::{DeskError, TableConfig};
use crate::filter::Filter;
use crate::records::{FieldValue, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Ascending,
    Descending,
}

impl Order {
    pub fn toggle(self) -> Self {
        match self {
            Order::Ascending => Order::Descending,
            Order::Descending => Order::Ascending,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Ascending => write!(f, "▲"),
            Order::Descending => write!(f, "▼"),
        }
    }
}

/// Searched, filtered, sorted and paginated view over a collection of records.
///
/// The derived rows are kept as an index mapping into `records`. Every mutation
/// recomputes that mapping and clamps the current page to the new page count.
/// Selection is keyed by record id, so it survives search, sort and paging.
pub struct TableViewController<R: Record> {
    records: Vec<R>,
    rows: Arc<Vec<usize>>, // Mapping of view position to record index
    order: Order,
    order_by: Option<String>,
    selected: HashSet<R::Id>,
    page: usize,
    rows_per_page: usize,
    search_query: String,
    filters: Vec<Filter>,
}

impl<R: Record> TableViewController<R> {
    pub fn new(records: Vec<R>, config: &TableConfig) -> Self {
        let mut table = TableViewController {
            records,
            rows: Arc::new(Vec::new()),
            order: Order::Ascending,
            order_by: None,
            selected: HashSet::new(),
            page: 1,
            rows_per_page: config.rows_per_page.max(1),
            search_query: String::new(),
            filters: Vec::new(),
        };
        table.recompute();
        table
    }

    // -------------------------- Read access ------------------------------- //

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn order_by(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    pub fn selected(&self) -> &HashSet<R::Id> {
        &self.selected
    }

    pub fn is_selected(&self, record: &R) -> bool {
        self.selected.contains(&record.id())
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn filtered_len(&self) -> usize {
        self.rows.len()
    }

    /// All records after search, filters and sort, before pagination.
    pub fn filtered_rows(&self) -> Vec<&R> {
        self.rows.iter().map(|&idx| &self.records[idx]).collect()
    }

    /// The rows of the current page.
    pub fn paginated_rows(&self) -> Vec<&R> {
        self.page_rows(self.page)
    }

    /// Rows of an arbitrary page. Pages outside of `1..=total_pages` are empty.
    pub fn page_rows(&self, page: usize) -> Vec<&R> {
        self.rows[self.page_range(page)]
            .iter()
            .map(|&idx| &self.records[idx])
            .collect()
    }

    pub fn total_pages(&self) -> usize {
        self.rows.len().div_ceil(self.rows_per_page).max(1)
    }

    /// Page-relative positions of the selected rows on the current page.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.paginated_rows()
            .iter()
            .enumerate()
            .filter(|(_, r)| self.is_selected(r))
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Selected records in collection order, including ones hidden by search or filters.
    pub fn selected_records(&self) -> Vec<&R> {
        self.records.iter().filter(|r| self.is_selected(r)).collect()
    }

    fn page_range(&self, page: usize) -> Range<usize> {
        let len = self.rows.len();
        if page == 0 {
            return 0..0;
        }
        let begin = std::cmp::min((page - 1).saturating_mul(self.rows_per_page), len);
        let end = std::cmp::min(begin.saturating_add(self.rows_per_page), len);
        begin..end
    }

    // Record index behind a page-relative position on the current page.
    fn record_at(&self, page_index: usize) -> Option<usize> {
        let range = self.page_range(self.page);
        let pos = range.start.checked_add(page_index)?;
        if pos < range.end { Some(self.rows[pos]) } else { None }
    }

    // ---------------------------- Handlers -------------------------------- //

    pub fn handle_search_change(&mut self, query: &str) {
        debug!("Search changed to \"{}\"", query);
        self.search_query = query.to_string();
        self.page = 1;
        self.recompute();
    }

    /// Same field toggles the direction, a new field starts ascending.
    /// Unknown fields are ignored.
    pub fn handle_request_sort(&mut self, field: &str) {
        if let Err(e) = self.try_request_sort(field) {
            warn!("Ignoring sort request: {}", e);
        }
    }

    pub fn try_request_sort(&mut self, field: &str) -> Result<(), DeskError> {
        if !R::has_field(field) {
            return Err(DeskError::UnknownSortField(field.to_string()));
        }
        if self.order_by.as_deref() == Some(field) {
            self.order = self.order.toggle();
        } else {
            self.order_by = Some(field.to_string());
            self.order = Order::Ascending;
        }
        debug!("Sorting by {} {:?}", field, self.order);
        self.recompute();
        Ok(())
    }

    /// Toggles the selection of the row at `index` on the current page.
    pub fn handle_click(&mut self, index: usize) {
        let Some(ridx) = self.record_at(index) else {
            debug!("Click on row {} outside of page {}", index, self.page);
            return;
        };
        let id = self.records[ridx].id();
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// `checked` selects exactly `rows_in_scope`, otherwise the selection is cleared.
    pub fn handle_select_all_click<'a>(
        &mut self,
        checked: bool,
        rows_in_scope: impl IntoIterator<Item = &'a R>,
    ) {
        self.selected.clear();
        if checked {
            self.selected
                .extend(rows_in_scope.into_iter().map(|r| r.id()));
        }
        debug!("Selected {} rows", self.selected.len());
    }

    /// Selects the current page, or clears the selection.
    pub fn select_page(&mut self, checked: bool) {
        let ids: Vec<R::Id> = self.paginated_rows().iter().map(|r| r.id()).collect();
        self.selected.clear();
        if checked {
            self.selected.extend(ids);
        }
    }

    /// Out of range pages are clamped to `1..=total_pages`.
    pub fn handle_change_page(&mut self, new_page: usize) {
        if let Err(e) = self.try_change_page(new_page) {
            debug!("Clamping: {}", e);
            self.page = new_page.clamp(1, self.total_pages());
        }
    }

    pub fn try_change_page(&mut self, new_page: usize) -> Result<(), DeskError> {
        let total = self.total_pages();
        if new_page == 0 || new_page > total {
            return Err(DeskError::InvalidPage {
                requested: new_page,
                total,
            });
        }
        self.page = new_page;
        Ok(())
    }

    pub fn next_page(&mut self) {
        self.handle_change_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.handle_change_page(self.page.saturating_sub(1));
    }

    pub fn handle_change_rows_per_page(&mut self, new_size: usize) {
        self.rows_per_page = new_size.max(1);
        self.page = 1;
        debug!("Rows per page set to {}", self.rows_per_page);
    }

    /// Removes the row at a page-relative position. Misses are a no-op.
    pub fn delete_by_index(&mut self, page_index: usize) -> Option<R> {
        let removed = match self.record_at(page_index) {
            Some(ridx) => Ok(self.remove_record(ridx)),
            None => Err(DeskError::DeleteMiss(format!("page index {page_index}"))),
        };
        self.log_delete(removed)
    }

    /// Removes the record with the given id. Misses are a no-op.
    pub fn delete_by_id(&mut self, id: &R::Id) -> Option<R> {
        let removed = match self.records.iter().position(|r| &r.id() == id) {
            Some(ridx) => Ok(self.remove_record(ridx)),
            None => Err(DeskError::DeleteMiss(format!("id {id}"))),
        };
        self.log_delete(removed)
    }

    fn log_delete(&self, removed: Result<R, DeskError>) -> Option<R> {
        match removed {
            Ok(record) => {
                debug!("Deleted record {}", record.id());
                Some(record)
            }
            Err(e) => {
                debug!("Delete was a no-op: {}", e);
                None
            }
        }
    }

    fn remove_record(&mut self, ridx: usize) -> R {
        let record = self.records.remove(ridx);
        self.selected.remove(&record.id());
        self.recompute();
        record
    }

    pub fn set_filters(&mut self, filters: Vec<Filter>) {
        self.filters = filters;
        self.page = 1;
        self.recompute();
    }

    pub fn add_filter(&mut self, filter: Filter) {
        self.filters.push(filter);
        self.page = 1;
        self.recompute();
    }

    /// Resets search, filters, sort and page. The selection is kept.
    pub fn clear_filters(&mut self) {
        self.search_query.clear();
        self.filters.clear();
        self.order_by = None;
        self.order = Order::Ascending;
        self.page = 1;
        self.recompute();
    }

    /// Replaces the backing collection and drops selected ids that no longer exist.
    pub fn set_records(&mut self, records: Vec<R>) {
        let ids: HashSet<R::Id> = records.iter().map(|r| r.id()).collect();
        self.selected.retain(|id| ids.contains(id));
        self.records = records;
        self.recompute();
    }

    // ----------------------- Builder style views -------------------------- //

    pub fn with_search(mut self, query: &str) -> Self {
        self.handle_search_change(query);
        self
    }

    pub fn with_sort(mut self, field: &str) -> Self {
        self.handle_request_sort(field);
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.handle_change_page(page);
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.add_filter(filter);
        self
    }

    // ---------------------------- Pipeline -------------------------------- //

    fn recompute(&mut self) {
        let needle = self.search_query.to_lowercase();
        let searchable = R::searchable_fields();
        let filters = &self.filters;

        // Search, then categorical filters. Collect keeps collection order.
        let mut rows: Vec<usize> = self
            .records
            .par_iter()
            .enumerate()
            .filter(|(_, r)| {
                needle.is_empty()
                    || searchable
                        .iter()
                        .any(|f| r.field(f).is_some_and(|v| v.contains_folded(&needle)))
            })
            .filter(|(_, r)| filters.iter().all(|f| f.matches(*r)))
            .map(|(idx, _)| idx)
            .collect();

        if let Some(key) = self.order_by.as_deref() {
            let ascending = self.order == Order::Ascending;
            let mut keyed: Vec<(usize, FieldValue)> = rows
                .into_iter()
                .map(|idx| {
                    let value = self.records[idx].field(key).unwrap_or(FieldValue::Missing);
                    (idx, value)
                })
                .collect();
            // sort_by is stable, equal keys keep collection order
            keyed.sort_by(|(_, a), (_, b)| a.compare_directed(b, ascending));
            rows = keyed.into_iter().map(|(idx, _)| idx).collect();
        }

        self.rows = Arc::new(rows);
        self.page = self.page.clamp(1, self.total_pages());
        trace!(
            "Recomputed {}: {} of {} rows, page {}/{}, sort {:?} {:?}",
            R::KIND,
            self.rows.len(),
            self.records.len(),
            self.page,
            self.total_pages(),
            self.order_by,
            self.order
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::FieldValue;

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        id: u32,
        name: &'static str,
        amount: f64,
    }

    impl Record for Person {
        type Id = u32;
        const KIND: &'static str = "People";

        fn id(&self) -> u32 {
            self.id
        }

        fn columns() -> &'static [&'static str] {
            &["id", "name", "amount"]
        }

        fn searchable_fields() -> &'static [&'static str] {
            &["name"]
        }

        fn field(&self, name: &str) -> Option<FieldValue> {
            match name {
                "id" => Some(self.id.into()),
                "name" => Some(self.name.into()),
                "amount" => Some(self.amount.into()),
                _ => None,
            }
        }
    }

    fn people() -> Vec<Person> {
        vec![
            Person { id: 1, name: "Alice", amount: 10.0 },
            Person { id: 2, name: "bob", amount: 5.0 },
            Person { id: 3, name: "Cara", amount: 10.0 },
        ]
    }

    fn names(rows: Vec<&Person>) -> Vec<&'static str> {
        rows.into_iter().map(|p| p.name).collect()
    }

    fn table(rows_per_page: usize) -> TableViewController<Person> {
        TableViewController::new(people(), &TableConfig::default().rows_per_page(rows_per_page))
    }

    #[test]
    fn search_keeps_rows_matching_any_searchable_field() {
        let mut t = table(2);
        t.handle_search_change("a");
        assert_eq!(names(t.filtered_rows()), vec!["Alice", "Cara"]);
        t.handle_search_change("B");
        assert_eq!(names(t.filtered_rows()), vec!["bob"]);
        t.handle_search_change("");
        assert_eq!(names(t.paginated_rows()), vec!["Alice", "bob"]);
    }

    #[test]
    fn search_does_not_match_non_searchable_fields() {
        let mut t = table(10);
        t.handle_search_change("10");
        assert!(t.filtered_rows().is_empty());
        assert_eq!(t.page(), 1);
        assert_eq!(t.total_pages(), 1);
    }

    #[test]
    fn search_resets_page() {
        let mut t = table(1);
        t.handle_change_page(3);
        assert_eq!(t.page(), 3);
        t.handle_search_change("c");
        assert_eq!(t.page(), 1);
        assert_eq!(names(t.paginated_rows()), vec!["Cara"]);
    }

    #[test]
    fn sort_is_stable_and_numeric() {
        let mut t = table(10);
        t.handle_request_sort("amount");
        assert_eq!(names(t.filtered_rows()), vec!["bob", "Alice", "Cara"]);
        t.handle_request_sort("amount");
        assert_eq!(t.order(), Order::Descending);
        assert_eq!(names(t.filtered_rows()), vec!["Alice", "Cara", "bob"]);
    }

    #[test]
    fn sort_text_ignores_case() {
        let mut t = table(10);
        t.handle_request_sort("name");
        assert_eq!(names(t.filtered_rows()), vec!["Alice", "bob", "Cara"]);
    }

    #[test]
    fn sort_toggle_and_field_switch() {
        let mut t = table(10);
        t.handle_request_sort("name");
        assert_eq!(t.order(), Order::Ascending);
        t.handle_request_sort("name");
        assert_eq!(t.order(), Order::Descending);
        t.handle_request_sort("name");
        assert_eq!(t.order(), Order::Ascending);
        t.handle_request_sort("name");
        t.handle_request_sort("amount");
        assert_eq!(t.order(), Order::Ascending);
        assert_eq!(t.order_by(), Some("amount"));
    }

    #[test]
    fn unknown_sort_field_keeps_previous_sort() {
        let mut t = table(10);
        t.handle_request_sort("amount");
        t.handle_request_sort("salary");
        assert_eq!(t.order_by(), Some("amount"));
        assert!(matches!(
            t.try_request_sort("salary"),
            Err(DeskError::UnknownSortField(_))
        ));
    }

    #[test]
    fn pages_cover_filtered_rows() {
        let mut t = table(2);
        t.handle_request_sort("amount");
        let all: Vec<u32> = (1..=t.total_pages())
            .flat_map(|p| t.page_rows(p))
            .map(|p| p.id)
            .collect();
        let filtered: Vec<u32> = t.filtered_rows().iter().map(|p| p.id).collect();
        assert_eq!(all, filtered);
        assert!(t.page_rows(t.total_pages() + 1).is_empty());
        assert!(t.page_rows(0).is_empty());
    }

    #[test]
    fn rows_per_page_change_resets_page() {
        let mut t = table(1);
        t.handle_change_page(2);
        t.handle_change_rows_per_page(2);
        assert_eq!(t.page(), 1);
        assert!(t.paginated_rows().len() <= 2);
        t.handle_change_rows_per_page(0);
        assert_eq!(t.rows_per_page(), 1);
    }

    #[test]
    fn page_changes_are_clamped() {
        let mut t = table(1);
        t.handle_change_page(99);
        assert_eq!(t.page(), 3);
        t.handle_change_page(0);
        assert_eq!(t.page(), 1);
        assert!(matches!(
            t.try_change_page(4),
            Err(DeskError::InvalidPage { requested: 4, total: 3 })
        ));
        t.next_page();
        t.next_page();
        t.next_page();
        assert_eq!(t.page(), 3);
        t.prev_page();
        assert_eq!(t.page(), 2);
    }

    #[test]
    fn scenario_sort_paginate() {
        let mut t = table(2).with_sort("amount");
        t.handle_change_rows_per_page(1);
        assert_eq!(t.page(), 1);
        assert_eq!(names(t.paginated_rows()), vec!["bob"]);
        t.handle_change_page(3);
        assert_eq!(names(t.paginated_rows()), vec!["Cara"]);
    }

    #[test]
    fn click_toggles_selection_by_identity() {
        let mut t = table(10);
        t.handle_click(1);
        assert_eq!(t.selected_indices(), vec![1]);
        // bob stays selected after the row moves
        t.handle_request_sort("amount");
        assert_eq!(t.selected_indices(), vec![0]);
        t.handle_click(0);
        assert!(t.selected().is_empty());
        t.handle_click(7);
        assert!(t.selected().is_empty());
    }

    #[test]
    fn select_all_selects_exactly_scope() {
        let mut t = table(2);
        let page: Vec<Person> = t.paginated_rows().into_iter().cloned().collect();
        t.handle_select_all_click(true, &page);
        let expected: HashSet<u32> = [1, 2].into_iter().collect();
        assert_eq!(t.selected(), &expected);
        t.handle_select_all_click(false, &page);
        assert!(t.selected().is_empty());
        t.select_page(true);
        assert_eq!(t.selected_indices(), vec![0, 1]);
    }

    #[test]
    fn delete_by_id_prunes_selection() {
        let mut t = table(2);
        t.handle_click(1);
        t.handle_click(0);
        let removed = t.delete_by_id(&2);
        assert_eq!(removed.map(|p| p.name), Some("bob"));
        assert_eq!(t.records().len(), 2);
        let expected: HashSet<u32> = [1].into_iter().collect();
        assert_eq!(t.selected(), &expected);
        assert!(t.delete_by_id(&2).is_none());
        assert_eq!(t.records().len(), 2);
    }

    #[test]
    fn delete_by_index_is_page_relative_and_clamps_page() {
        let mut t = table(1);
        t.handle_change_page(3);
        assert_eq!(t.delete_by_index(0).map(|p| p.id), Some(3));
        assert_eq!(t.page(), 2);
        assert!(t.delete_by_index(5).is_none());
        assert_eq!(t.records().len(), 2);
    }

    #[test]
    fn filters_run_before_sort_and_reset_page() {
        let mut t = table(1).with_sort("amount");
        t.handle_change_page(2);
        t.add_filter(Filter::number_range("amount", Some(10.0), None));
        assert_eq!(t.page(), 1);
        assert_eq!(names(t.filtered_rows()), vec!["Alice", "Cara"]);
        t.clear_filters();
        assert_eq!(t.order_by(), None);
        assert_eq!(t.filtered_len(), 3);
    }

    #[test]
    fn set_records_drops_stale_selection() {
        let mut t = table(10);
        t.select_page(true);
        t.set_records(people().into_iter().filter(|p| p.id != 3).collect());
        assert_eq!(t.selected().len(), 2);
        assert_eq!(t.selected_records().len(), 2);
    }
}
