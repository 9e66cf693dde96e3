use std::time::Instant;

use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, error, info, trace};

use crate::domain::{AppConfig, CMDMode, DeskError, HELP_TEXT, Message};
use crate::export;
use crate::inputter::{InputResult, Inputter};
use crate::records::Record;
use crate::table::{Order, TableViewController};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
    CMDINPUT,
}

/// Everything the UI needs to draw one frame.
pub struct UIData {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub selected_rows: Vec<usize>,
    pub cursor_row: usize,
    pub cursor_column: usize,
    pub sort_column: Option<usize>,
    pub order: Order,
    pub page: usize,
    pub total_pages: usize,
    pub rows_per_page: usize,
    pub nrows: usize, // Rows after search and filters
    pub nrecords: usize,
    pub nselected: usize,
    pub search_query: String,
    pub filters: Vec<String>,
    pub show_popup: bool,
    pub popup_message: String,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CMDMode>,
    pub active_cmdinput: bool,
    pub status_message: String,
    pub last_status_message_update: Instant,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            headers: Vec::new(),
            rows: Vec::new(),
            selected_rows: Vec::new(),
            cursor_row: 0,
            cursor_column: 0,
            sort_column: None,
            order: Order::Ascending,
            page: 1,
            total_pages: 1,
            rows_per_page: 0,
            nrows: 0,
            nrecords: 0,
            nselected: 0,
            search_query: String::new(),
            filters: Vec::new(),
            show_popup: false,
            popup_message: String::new(),
            cmdinput: InputResult::default(),
            cmd_mode: None,
            active_cmdinput: false,
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        }
    }
}

pub struct Model<R: Record> {
    config: AppConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    table: TableViewController<R>,
    cursor_row: usize,
    cursor_column: usize,
    uidata: UIData,
    clipboard: Option<Clipboard>,
    input: Inputter,
    cmd_mode: Option<CMDMode>,
    active_cmdinput: bool,
    query_before_input: String,
    status_message: String,
    last_status_message_update: Instant,
}

impl<R: Record> Model<R> {
    pub fn init(config: &AppConfig, records: Vec<R>) -> Self {
        let table = TableViewController::new(records, &config.table);
        let mut model = Model {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            table,
            cursor_row: 0,
            cursor_column: 0,
            uidata: UIData::empty(),
            clipboard: None,
            input: Inputter::default(),
            cmd_mode: None,
            active_cmdinput: false,
            query_before_input: String::new(),
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        };
        let loaded = format!("Loaded {} {}", model.table.records().len(), R::KIND);
        model.set_status_message(loaded);
        model.update_uidata();
        model
    }

    pub fn table(&self) -> &TableViewController<R> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableViewController<R> {
        &mut self.table
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    /// While the search prompt is open every key goes to the input line.
    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_column)
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), DeskError> {
        if let Some(msg) = message {
            trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveDown => self.move_cursor_down(),
                    Message::MoveUp => self.move_cursor_up(),
                    Message::MoveLeft => self.cursor_column = self.cursor_column.saturating_sub(1),
                    Message::MoveRight => {
                        self.cursor_column = (self.cursor_column + 1).min(R::columns().len() - 1)
                    }
                    Message::NextPage => self.table.next_page(),
                    Message::PrevPage => self.table.prev_page(),
                    Message::FirstPage => self.table.handle_change_page(1),
                    Message::LastPage => {
                        let last = self.table.total_pages();
                        self.table.handle_change_page(last)
                    }
                    Message::GrowPage => self.cycle_page_size(true),
                    Message::ShrinkPage => self.cycle_page_size(false),
                    Message::Search => self.enter_cmd_mode(CMDMode::Search),
                    Message::Sort => self.sort_current_column(),
                    Message::ToggleSelect => self.table.handle_click(self.cursor_row),
                    Message::SelectPage => self.table.select_page(true),
                    Message::ClearSelection => self.table.select_page(false),
                    Message::Delete => self.delete_current_row(),
                    Message::Copy => self.copy_rows(),
                    Message::ClearFilters => {
                        self.table.clear_filters();
                        self.set_status_message("Cleared search, filters and sort");
                    }
                    Message::Help => self.show_help(),
                    Message::Exit => self.exit(),
                    Message::Resize(width, height) => {
                        trace!("UI was resized to {}x{}", width, height)
                    }
                    Message::RawKey(_) => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Exit | Message::Help => self.exit(),
                    _ => (),
                },
                Modus::CMDINPUT => {
                    if let Message::RawKey(key) = msg {
                        self.raw_input(key)
                    }
                }
            }
        }

        self.clamp_cursor();
        self.update_uidata();
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
        debug!("Status: {}", self.status_message);
    }

    fn page_len(&self) -> usize {
        self.table.paginated_rows().len()
    }

    fn clamp_cursor(&mut self) {
        self.cursor_row = self.cursor_row.min(self.page_len().saturating_sub(1));
    }

    fn move_cursor_down(&mut self) {
        if self.cursor_row + 1 < self.page_len() {
            self.cursor_row += 1;
        } else if self.table.page() < self.table.total_pages() {
            self.table.next_page();
            self.cursor_row = 0;
        }
    }

    fn move_cursor_up(&mut self) {
        if self.cursor_row > 0 {
            self.cursor_row -= 1;
        } else if self.table.page() > 1 {
            self.table.prev_page();
            self.cursor_row = self.page_len().saturating_sub(1);
        }
    }

    fn cycle_page_size(&mut self, grow: bool) {
        let current = self.table.rows_per_page();
        let options = &self.config.table.page_size_options;
        let next = if grow {
            options.iter().copied().find(|&o| o > current)
        } else {
            options.iter().copied().rev().find(|&o| o < current)
        };
        if let Some(size) = next {
            self.table.handle_change_rows_per_page(size);
            self.cursor_row = 0;
            self.set_status_message(format!("{size} rows per page"));
        }
    }

    fn sort_current_column(&mut self) {
        let field = R::columns()[self.cursor_column];
        self.table.handle_request_sort(field);
        let order = self.table.order();
        self.set_status_message(format!("Sorted by {field} {order}"));
    }

    fn delete_current_row(&mut self) {
        match self.table.delete_by_index(self.cursor_row) {
            Some(record) => {
                info!("Deleted {} {}", R::KIND, record.id());
                self.set_status_message(format!("Deleted record {}", record.id()));
            }
            None => self.set_status_message("Nothing to delete"),
        }
    }

    /// Csv of the selection, or of the row under the cursor when nothing is
    /// selected, with the number of rows it holds.
    pub fn copy_payload(&self) -> Result<(String, usize), DeskError> {
        let selected = self.table.selected_records();
        if selected.is_empty() {
            let page = self.table.paginated_rows();
            export::to_csv(page.get(self.cursor_row).copied())
        } else {
            export::to_csv(selected)
        }
    }

    fn copy_rows(&mut self) {
        let (content, nrows) = match self.copy_payload() {
            Ok(payload) => payload,
            Err(e) => {
                error!("Error building csv: {}", e);
                self.set_status_message("Copy failed!");
                return;
            }
        };

        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => error!("Clipboard not available: {:?}", e),
            }
        }
        let result = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(content).map_err(|e| e.to_string()),
            None => Err("no clipboard".to_string()),
        };
        match result {
            Ok(_) => self.set_status_message(format!("Copied {nrows} rows")),
            Err(e) => {
                error!("Error copying to clipboard: {}", e);
                self.set_status_message("Copy failed!");
            }
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn exit(&mut self) {
        match self.modus {
            Modus::TABLE => {
                if !self.table.search_query().is_empty() {
                    self.table.handle_search_change("");
                    self.set_status_message("Search cleared");
                }
            }
            Modus::POPUP => {
                trace!("Close popup ...");
                self.modus = self.previous_modus;
                self.previous_modus = Modus::POPUP;
            }
            Modus::CMDINPUT => {}
        }
    }

    fn enter_cmd_mode(&mut self, mode: CMDMode) {
        trace!("Entering command mode ...");
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);
        self.active_cmdinput = true;
        self.query_before_input = self.table.search_query().to_string();

        self.input.clear();
        self.input.set(&self.query_before_input);
    }

    fn raw_input(&mut self, key: KeyEvent) {
        if !self.active_cmdinput {
            return;
        }
        let result = self.input.read(key);
        match self.cmd_mode {
            Some(CMDMode::Search) => {
                // Search as you type, escape restores the previous query
                if result.canceled {
                    let previous = self.query_before_input.clone();
                    self.table.handle_search_change(&previous);
                } else if result.input != self.table.search_query() {
                    self.table.handle_search_change(&result.input);
                    self.cursor_row = 0;
                }
            }
            None => info!("Cmd mode is none!"),
        }
        if result.finished {
            self.leave_cmd_mode();
        }
    }

    fn leave_cmd_mode(&mut self) {
        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;
        self.cmd_mode = None;
        let found = self.table.filtered_len();
        if self.table.search_query().is_empty() {
            self.set_status_message(format!("{found} rows"));
        } else {
            self.set_status_message(format!("Found {found} matches"));
        }
    }

    fn update_uidata(&mut self) {
        let table = &self.table;
        let columns = R::columns();
        let selected = table.selected_indices();

        self.uidata = UIData {
            name: R::KIND.to_string(),
            headers: columns.iter().map(|c| c.to_string()).collect(),
            rows: table.paginated_rows().iter().map(|r| r.cells()).collect(),
            selected_rows: selected,
            cursor_row: self.cursor_row,
            cursor_column: self.cursor_column,
            sort_column: table
                .order_by()
                .and_then(|key| columns.iter().position(|c| *c == key)),
            order: table.order(),
            page: table.page(),
            total_pages: table.total_pages(),
            rows_per_page: table.rows_per_page(),
            nrows: table.filtered_len(),
            nrecords: table.records().len(),
            nselected: table.selected().len(),
            search_query: table.search_query().to_string(),
            filters: table.filters().iter().map(|f| f.to_string()).collect(),
            show_popup: self.modus == Modus::POPUP,
            popup_message: HELP_TEXT.to_string(),
            cmdinput: self.input.get(),
            cmd_mode: self.cmd_mode,
            active_cmdinput: self.active_cmdinput,
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
        };
    }
}
