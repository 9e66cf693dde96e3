use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState},
};

use crate::domain::{AppConfig, CMDMode};
use crate::model::UIData;

pub const CMDLINE_HEIGH: u16 = 1;
pub const TITLE_HEIGHT: u16 = 1;
pub const COLUMN_WIDTH_MARGIN: usize = 1;
pub const MAX_COLUMN_WIDTH: usize = 28;
pub const SELECTION_MARKER: &str = "●";

pub struct TableUI {
    status_timeout: Duration,
}

impl TableUI {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            status_timeout: Duration::from_secs(config.status_timeout),
        }
    }

    pub fn draw(&mut self, uidata: &UIData, frame: &mut Frame) {
        let [title_area, table_area, status_area] = Layout::vertical([
            Constraint::Length(TITLE_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(CMDLINE_HEIGH),
        ])
        .areas(frame.area());

        frame.render_widget(Paragraph::new(Self::title_line(uidata)), title_area);
        self.draw_table(uidata, frame, table_area);
        self.draw_status_line(uidata, frame, status_area);

        if uidata.show_popup {
            Self::draw_popup(&uidata.popup_message, frame);
        }
    }

    fn title_line(uidata: &UIData) -> Line<'static> {
        let mut spans = vec![format!(" {} ", uidata.name).bold().reversed()];
        if !uidata.search_query.is_empty() {
            spans.push(format!(" search: \"{}\"", uidata.search_query).yellow());
        }
        for filter in uidata.filters.iter() {
            spans.push(format!(" [{filter}]").cyan());
        }
        Line::from(spans)
    }

    pub fn column_widths(uidata: &UIData) -> Vec<usize> {
        uidata
            .headers
            .iter()
            .enumerate()
            .map(|(cidx, name)| {
                let data_width = uidata
                    .rows
                    .iter()
                    .map(|r| r.get(cidx).map(|c| c.chars().count()).unwrap_or(0))
                    .max()
                    .unwrap_or(0);
                // Room for the sort marker
                let header_width = name.chars().count() + 2;
                std::cmp::min(
                    std::cmp::max(header_width, data_width) + COLUMN_WIDTH_MARGIN,
                    MAX_COLUMN_WIDTH,
                )
            })
            .collect()
    }

    fn draw_table(&mut self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let header_cells = std::iter::once(Cell::from(""))
            .chain(uidata.headers.iter().enumerate().map(|(cidx, name)| {
                let label = match uidata.sort_column {
                    Some(sc) if sc == cidx => format!("{name} {}", uidata.order),
                    _ => name.clone(),
                };
                Cell::from(label)
            }));
        let header = Row::new(header_cells).style(Style::new().add_modifier(Modifier::BOLD));

        let rows = uidata.rows.iter().enumerate().map(|(ridx, row)| {
            let marker = if uidata.selected_rows.contains(&ridx) {
                SELECTION_MARKER
            } else {
                ""
            };
            let cells = std::iter::once(Cell::from(marker))
                .chain(row.iter().map(|value| Cell::from(value.clone())));
            let style = if uidata.selected_rows.contains(&ridx) {
                Style::new().fg(Color::Green)
            } else {
                Style::new()
            };
            Row::new(cells).style(style)
        });

        let widths = std::iter::once(Constraint::Length(1)).chain(
            Self::column_widths(uidata)
                .into_iter()
                .map(|w| Constraint::Length(w as u16)),
        );

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(Style::new().add_modifier(Modifier::REVERSED))
            .column_highlight_style(Style::new().add_modifier(Modifier::UNDERLINED))
            .block(Block::bordered());

        let mut state = TableState::default()
            .with_selected(Some(uidata.cursor_row))
            .with_selected_column(Some(uidata.cursor_column + 1));

        if uidata.rows.is_empty() {
            let empty = Paragraph::new("No matching records")
                .centered()
                .block(Block::bordered());
            frame.render_widget(empty, area);
        } else {
            frame.render_stateful_widget(table, area, &mut state);
        }
    }

    fn draw_status_line(&mut self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let summary = format!(
            "Page {}/{} | {} rows/page | {} of {} rows | {} selected ",
            uidata.page,
            uidata.total_pages,
            uidata.rows_per_page,
            uidata.nrows,
            uidata.nrecords,
            uidata.nselected
        );
        let summary_width = summary.chars().count() as u16;
        let [left, right] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(summary_width)])
                .areas(area);

        if uidata.active_cmdinput {
            let prompt = match uidata.cmd_mode {
                Some(CMDMode::Search) | None => "/",
            };
            let line = Line::from(vec![
                Span::from(prompt).bold(),
                Span::from(uidata.cmdinput.input.clone()),
            ]);
            frame.render_widget(Paragraph::new(line), left);
            let x = left.x + (prompt.len() + uidata.cmdinput.cursor) as u16;
            frame.set_cursor_position((x.min(left.right().saturating_sub(1)), left.y));
        } else if uidata.last_status_message_update.elapsed() < self.status_timeout {
            frame.render_widget(Paragraph::new(uidata.status_message.clone().italic()), left);
        } else {
            frame.render_widget(Paragraph::new("? for help".dark_gray()), left);
        }
        frame.render_widget(Paragraph::new(summary).right_aligned(), right);
    }

    fn draw_popup(message: &str, frame: &mut Frame) {
        let area = frame.area();
        let width = message
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0) as u16
            + 4;
        let height = message.lines().count() as u16 + 2;
        let popup = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width.min(area.width),
            height.min(area.height),
        );
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(message.to_string()).block(Block::bordered().title(" Help ")),
            popup,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Message;
    use crate::model::Model;
    use crate::records::LeaveRequest;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(uidata: &UIData) -> String {
        let mut terminal = Terminal::new(TestBackend::new(200, 20)).unwrap();
        let mut ui = TableUI::new(&AppConfig::default());
        terminal.draw(|f| ui.draw(uidata, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn renders_page_and_summary() {
        let mut config = AppConfig::default();
        config.table.rows_per_page = 5;
        let model = Model::init(&config, LeaveRequest::sample());
        let screen = render(model.get_uidata());
        assert!(screen.contains("Leave requests"));
        assert!(screen.contains("Amelia Hart"));
        assert!(!screen.contains("Farah Nasser"));
        assert!(screen.contains("Page 1/3"));
    }

    #[test]
    fn renders_empty_state_and_help() {
        let mut model = Model::init(&AppConfig::default(), LeaveRequest::sample());
        model.table_mut().handle_search_change("nobody");
        model.update(None).unwrap();
        let screen = render(model.get_uidata());
        assert!(screen.contains("No matching records"));
        assert!(screen.contains("Page 1/1"));

        model.update(Some(Message::Help)).unwrap();
        let screen = render(model.get_uidata());
        assert!(screen.contains("Navigation"));
    }

    #[test]
    fn column_widths_are_capped() {
        let mut uidata = UIData::empty();
        uidata.headers = vec!["id".into(), "reason".into()];
        uidata.rows = vec![vec!["1".into(), "x".repeat(80)]];
        assert_eq!(TableUI::column_widths(&uidata), vec![5, MAX_COLUMN_WIDTH]);
    }
}
