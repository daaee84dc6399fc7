//! Frame rendering for every UI mode.

use chrono::{DateTime, Local, Utc};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, FormFocus, Mode};

const SEARCH_PROMPT: &str = "/ ";
const HIGHLIGHT_SYMBOL: &str = "▶ ";
const KEY_HELP: &str =
	"enter connect · ctrl+a add · ctrl+e edit · ctrl+d delete · ctrl+r import · esc clear/quit";
/// Table border rows plus header row and its margin.
const TABLE_CHROME_ROWS: u16 = 4;

fn accent() -> Style {
	Style::default().fg(Color::Green)
}

fn dim() -> Style {
	Style::default().fg(Color::DarkGray)
}

impl App<'_> {
	pub(crate) fn draw(&mut self, frame: &mut Frame) {
		match self.mode.clone() {
			Mode::List => self.draw_list(frame),
			Mode::Add => self.draw_form(frame, "Add host"),
			Mode::Edit { .. } => self.draw_form(frame, "Edit host"),
			Mode::ConfirmDelete { host, .. } => self.draw_confirm(frame, &host),
		}
	}

	fn draw_list(&mut self, frame: &mut Frame) {
		let layout = Layout::default()
			.direction(Direction::Vertical)
			.constraints([
				Constraint::Length(1),
				Constraint::Min(1),
				Constraint::Length(1),
			])
			.split(frame.area());

		self.draw_search_input(frame, layout[0]);
		self.draw_table(frame, layout[1]);

		let status = if self.status.is_empty() {
			Line::from(Span::styled(KEY_HELP, dim()))
		} else {
			Line::from(vec![
				Span::styled(self.status.clone(), accent()),
				Span::raw("  "),
				Span::styled(KEY_HELP, dim()),
			])
		};
		frame.render_widget(Paragraph::new(status), layout[2]);
	}

	fn draw_search_input(&self, frame: &mut Frame, area: Rect) {
		let input = Line::from(vec![
			Span::styled(SEARCH_PROMPT, accent().add_modifier(Modifier::BOLD)),
			Span::raw(self.query.clone()),
		]);
		frame.render_widget(Paragraph::new(input), area);

		let cursor_x = area.x + (SEARCH_PROMPT.width() + self.query.width()) as u16;
		frame.set_cursor_position(Position::new(cursor_x.min(area.right()), area.y));
	}

	fn draw_table(&mut self, frame: &mut Frame, area: Rect) {
		self.page_size = area.height.saturating_sub(TABLE_CHROME_ROWS).max(1) as usize;

		let title = format!(
			" hosts {}/{} ",
			self.filtered.len(),
			self.snapshot.len()
		);
		let block = Block::default()
			.borders(Borders::ALL)
			.border_set(ratatui::symbols::border::ROUNDED)
			.title(title);

		let header = Row::new(["Host", "Note", "Last used", "Uses"])
			.style(accent().add_modifier(Modifier::BOLD))
			.bottom_margin(1);

		let rows: Vec<Row> = self
			.filtered
			.iter()
			.filter_map(|&index| self.snapshot.get(index))
			.map(|record| {
				Row::new(vec![
					Cell::from(record.host.clone()),
					Cell::from(record.note.clone()),
					Cell::from(format_last_used(record.last_used_at)),
					Cell::from(record.use_count.to_string()),
				])
			})
			.collect();

		let widths = [
			Constraint::Min(24),
			Constraint::Fill(1),
			Constraint::Length(16),
			Constraint::Length(5),
		];
		let table = Table::new(rows, widths)
			.header(header)
			.block(block)
			.column_spacing(1)
			.row_highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
			.highlight_symbol(HIGHLIGHT_SYMBOL);

		frame.render_stateful_widget(table, area, &mut self.table_state);

		if self.filtered.is_empty() && area.height > TABLE_CHROME_ROWS {
			let inner = Rect {
				x: area.x + 1,
				y: area.y + 3,
				width: area.width.saturating_sub(2),
				height: 1,
			};
			frame.render_widget(
				Paragraph::new(Span::styled("no matching hosts", dim())).centered(),
				inner,
			);
		}
	}

	fn draw_form(&self, frame: &mut Frame, title: &str) {
		let layout = Layout::default()
			.direction(Direction::Vertical)
			.constraints([Constraint::Length(7), Constraint::Length(1)])
			.split(frame.area());

		let block = Block::default()
			.borders(Borders::ALL)
			.border_set(ratatui::symbols::border::ROUNDED)
			.title(format!(" {title} "));
		let inner = block.inner(layout[0]);
		frame.render_widget(block, layout[0]);

		let field = |label: &str, value: &str, focused: bool| {
			let marker = if focused { "▶ " } else { "  " };
			Line::from(vec![
				Span::styled(marker, accent()),
				Span::styled(format!("{label:6}"), dim()),
				Span::raw(value.to_string()),
			])
		};
		let lines = vec![
			field("Host:", &self.form.host, self.form.focus == Some(FormFocus::Host)),
			Line::default(),
			field("Note:", &self.form.note, self.form.focus == Some(FormFocus::Note)),
		];
		frame.render_widget(Paragraph::new(lines), inner);

		let (value, row): (&str, u16) = match self.form.focus {
			Some(FormFocus::Note) => (&self.form.note, 2),
			_ => (&self.form.host, 0),
		};
		let cursor_x = inner.x + (2 + 6 + value.width()) as u16;
		if inner.height > row {
			frame.set_cursor_position(Position::new(cursor_x.min(inner.right()), inner.y + row));
		}

		let hint = if self.status.is_empty() {
			"enter next/save · tab switch field · esc cancel".to_string()
		} else {
			format!("{}  (enter next/save, esc cancel)", self.status)
		};
		frame.render_widget(Paragraph::new(Span::styled(hint, dim())), layout[1]);
	}

	fn draw_confirm(&self, frame: &mut Frame, host: &str) {
		let layout = Layout::default()
			.direction(Direction::Vertical)
			.constraints([Constraint::Length(3), Constraint::Length(1)])
			.split(frame.area());

		let block = Block::default()
			.borders(Borders::ALL)
			.border_set(ratatui::symbols::border::ROUNDED)
			.title(" Confirm ");
		let inner = block.inner(layout[0]);
		frame.render_widget(block, layout[0]);
		frame.render_widget(
			Paragraph::new(Line::from(vec![
				Span::raw("Delete "),
				Span::styled(host.to_string(), accent().add_modifier(Modifier::BOLD)),
				Span::raw("? y/N"),
			])),
			inner,
		);
		frame.render_widget(
			Paragraph::new(Span::styled("y delete · n/esc keep", dim())),
			layout[1],
		);
	}
}

fn format_last_used(at: Option<DateTime<Utc>>) -> String {
	match at {
		Some(at) => at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
		None => "-".to_string(),
	}
}
