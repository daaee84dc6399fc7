//! Application state, key handling, and the event loop.

use std::time::Duration;

use anyhow::{Context, Result};
use hop_engine::{CatalogSnapshot, HostRecord, ImportOutcome, ScanReport, rank};
use hop_store::{HostStore, IMPORT_DONE_KEY};
use ratatui::DefaultTerminal;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::widgets::TableState;

/// How the interactive session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
	/// The user picked a host; it has already been marked used.
	Selected(String),
	/// The user left without picking anything.
	Cancelled,
}

/// History-import callback supplied by the binary, which owns file discovery.
pub type Importer<'a> = Box<dyn FnMut(&mut HostStore) -> ScanReport + 'a>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Mode {
	List,
	Add,
	Edit { id: i64 },
	ConfirmDelete { id: i64, host: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormFocus {
	Host,
	Note,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Form {
	pub host: String,
	pub note: String,
	pub focus: Option<FormFocus>,
}

impl Form {
	fn for_record(record: Option<&HostRecord>) -> Self {
		Self {
			host: record.map(|r| r.host.clone()).unwrap_or_default(),
			note: record.map(|r| r.note.clone()).unwrap_or_default(),
			focus: Some(FormFocus::Host),
		}
	}

	fn focused_mut(&mut self) -> Option<&mut String> {
		match self.focus? {
			FormFocus::Host => Some(&mut self.host),
			FormFocus::Note => Some(&mut self.note),
		}
	}
}

/// Full state of one picker session.
pub struct App<'a> {
	store: &'a mut HostStore,
	import: Importer<'a>,
	pub(crate) snapshot: CatalogSnapshot,
	pub(crate) filtered: Vec<usize>,
	pub(crate) query: String,
	pub(crate) table_state: TableState,
	pub(crate) mode: Mode,
	pub(crate) form: Form,
	pub(crate) status: String,
	/// Rows visible in the table viewport, refreshed on every draw.
	pub(crate) page_size: usize,
}

/// Run the picker against `store` until the user selects a host or quits.
pub fn run<'a>(store: &'a mut HostStore, import: Importer<'a>) -> Result<Outcome> {
	let mut app = App::new(store, import)?;
	let terminal = ratatui::init();
	let result = app.event_loop(terminal);
	ratatui::restore();
	result
}

impl<'a> App<'a> {
	pub fn new(store: &'a mut HostStore, import: Importer<'a>) -> Result<Self> {
		let mut app = Self {
			store,
			import,
			snapshot: CatalogSnapshot::default(),
			filtered: Vec::new(),
			query: String::new(),
			table_state: TableState::default(),
			mode: Mode::List,
			form: Form::default(),
			status: String::new(),
			page_size: 1,
		};
		app.reload()?;
		Ok(app)
	}

	fn event_loop(&mut self, mut terminal: DefaultTerminal) -> Result<Outcome> {
		loop {
			terminal
				.draw(|frame| self.draw(frame))
				.context("failed to draw frame")?;

			if !event::poll(Duration::from_millis(50)).context("failed to poll input")? {
				continue;
			}
			match event::read().context("failed to read input")? {
				Event::Key(key) if key.kind == KeyEventKind::Press => {
					if let Some(outcome) = self.handle_key(key)? {
						return Ok(outcome);
					}
				}
				_ => {}
			}
		}
	}

	/// Refresh the snapshot from the store and re-rank the current query.
	fn reload(&mut self) -> Result<()> {
		self.snapshot = self.store.snapshot()?;
		self.apply_filter(false);
		Ok(())
	}

	/// Re-rank and repair the cursor; `reset_cursor` jumps back to the top,
	/// as after every query edit.
	pub(crate) fn apply_filter(&mut self, reset_cursor: bool) {
		self.filtered = rank(&self.snapshot, &self.query);
		if self.filtered.is_empty() {
			self.table_state.select(None);
			return;
		}
		let cursor = if reset_cursor {
			0
		} else {
			self.table_state
				.selected()
				.unwrap_or(0)
				.min(self.filtered.len() - 1)
		};
		self.table_state.select(Some(cursor));
	}

	pub(crate) fn current_selection(&self) -> Option<&HostRecord> {
		let row = self.table_state.selected()?;
		let index = *self.filtered.get(row)?;
		self.snapshot.get(index)
	}

	fn handle_key(&mut self, key: KeyEvent) -> Result<Option<Outcome>> {
		if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
			return Ok(Some(Outcome::Cancelled));
		}
		match self.mode.clone() {
			Mode::List => self.handle_list_key(key),
			Mode::Add => self.handle_form_key(key, None),
			Mode::Edit { id } => self.handle_form_key(key, Some(id)),
			Mode::ConfirmDelete { id, .. } => self.handle_confirm_key(key, id),
		}
	}

	fn handle_list_key(&mut self, key: KeyEvent) -> Result<Option<Outcome>> {
		if key.modifiers.contains(KeyModifiers::CONTROL) {
			match key.code {
				KeyCode::Char('q') => return Ok(Some(Outcome::Cancelled)),
				KeyCode::Char('a') => {
					self.form = Form::for_record(None);
					self.mode = Mode::Add;
					self.status.clear();
				}
				KeyCode::Char('e') => {
					if let Some(selected) = self.current_selection() {
						let id = selected.id;
						let form = Form::for_record(Some(selected));
						self.form = form;
						self.mode = Mode::Edit { id };
						self.status.clear();
					}
				}
				KeyCode::Char('d') => {
					if let Some(selected) = self.current_selection() {
						let (id, host) = (selected.id, selected.host.clone());
						self.mode = Mode::ConfirmDelete { id, host };
					}
				}
				KeyCode::Char('r') => {
					let report = (self.import)(self.store);
					// A manual scan counts as the first-run import too.
					self.store.set_setting(IMPORT_DONE_KEY, "1")?;
					self.reload()?;
					self.status = if report.errors.is_empty() {
						format!("imported from history: +{}", report.imported)
					} else {
						format!(
							"imported from history: +{} ({} sources failed)",
							report.imported,
							report.errors.len()
						)
					};
				}
				_ => {}
			}
			return Ok(None);
		}

		match key.code {
			KeyCode::Esc => {
				if self.query.is_empty() {
					return Ok(Some(Outcome::Cancelled));
				}
				self.query.clear();
				self.apply_filter(true);
			}
			KeyCode::Enter => {
				if let Some(selected) = self.current_selection() {
					let id = selected.id;
					let host = selected.host.clone();
					self.store.mark_used(id)?;
					return Ok(Some(Outcome::Selected(host)));
				}
			}
			KeyCode::Up => self.move_cursor(-1),
			KeyCode::Down => self.move_cursor(1),
			KeyCode::PageUp => self.move_cursor(-(self.page_size as isize)),
			KeyCode::PageDown => self.move_cursor(self.page_size as isize),
			KeyCode::Backspace => {
				self.query.pop();
				self.apply_filter(true);
			}
			KeyCode::Char(ch) => {
				self.query.push(ch);
				self.apply_filter(true);
			}
			_ => {}
		}
		Ok(None)
	}

	fn handle_form_key(&mut self, key: KeyEvent, edit_id: Option<i64>) -> Result<Option<Outcome>> {
		match key.code {
			KeyCode::Esc => {
				self.mode = Mode::List;
				self.status.clear();
			}
			KeyCode::Tab => {
				self.form.focus = Some(match self.form.focus {
					Some(FormFocus::Host) => FormFocus::Note,
					_ => FormFocus::Host,
				});
			}
			KeyCode::Enter => {
				if self.form.focus == Some(FormFocus::Host) {
					self.form.focus = Some(FormFocus::Note);
				} else {
					self.save_form(edit_id)?;
				}
			}
			KeyCode::Backspace => {
				if let Some(field) = self.form.focused_mut() {
					field.pop();
				}
			}
			KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
				if let Some(field) = self.form.focused_mut() {
					field.push(ch);
				}
			}
			_ => {}
		}
		Ok(None)
	}

	fn save_form(&mut self, edit_id: Option<i64>) -> Result<()> {
		if self.form.host.trim().is_empty() {
			self.status = "host cannot be empty".to_string();
			return Ok(());
		}

		let result = match edit_id {
			None => self
				.store
				.insert(&self.form.host, &self.form.note)
				.map(|outcome| match outcome {
					ImportOutcome::Inserted => "saved",
					ImportOutcome::AlreadyCatalogued => "host already exists",
				}),
			Some(id) => self
				.store
				.update(id, &self.form.host, &self.form.note)
				.map(|()| "saved"),
		};

		match result {
			Ok(message) => {
				self.reload()?;
				self.mode = Mode::List;
				self.status = message.to_string();
			}
			// Validation and constraint failures stay in the form so the
			// input can be corrected.
			Err(error) => self.status = format!("error: {error}"),
		}
		Ok(())
	}

	fn handle_confirm_key(&mut self, key: KeyEvent, id: i64) -> Result<Option<Outcome>> {
		match key.code {
			KeyCode::Char('y') | KeyCode::Char('Y') => {
				self.store.delete(id)?;
				self.reload()?;
				self.mode = Mode::List;
				self.status = "deleted".to_string();
			}
			KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Enter => {
				self.mode = Mode::List;
				self.status.clear();
			}
			_ => {}
		}
		Ok(None)
	}

	fn move_cursor(&mut self, delta: isize) {
		if self.filtered.is_empty() || delta == 0 {
			return;
		}
		let current = self.table_state.selected().unwrap_or(0) as isize;
		let last = (self.filtered.len() - 1) as isize;
		let next = (current + delta).clamp(0, last);
		self.table_state.select(Some(next as usize));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn no_import<'a>() -> Importer<'a> {
		Box::new(|_| ScanReport::default())
	}

	fn seeded_store() -> HostStore {
		let store = HostStore::open_in_memory().unwrap();
		store.insert("alpha.example", "first").unwrap();
		store.insert("beta.example", "second").unwrap();
		store.insert("gamma.example", "third").unwrap();
		store
	}

	#[test]
	fn starts_with_full_catalog_and_cursor_on_top() {
		let mut store = seeded_store();
		let app = App::new(&mut store, no_import()).unwrap();
		assert_eq!(app.filtered.len(), 3);
		assert_eq!(app.table_state.selected(), Some(0));
	}

	#[test]
	fn query_edits_filter_and_reset_cursor() {
		let mut store = seeded_store();
		let mut app = App::new(&mut store, no_import()).unwrap();
		app.move_cursor(2);
		assert_eq!(app.table_state.selected(), Some(2));

		app.query.push_str("beta");
		app.apply_filter(true);
		assert_eq!(app.filtered.len(), 1);
		assert_eq!(app.table_state.selected(), Some(0));
		assert_eq!(app.current_selection().unwrap().host, "beta.example");
	}

	#[test]
	fn cursor_clamps_to_both_ends() {
		let mut store = seeded_store();
		let mut app = App::new(&mut store, no_import()).unwrap();
		app.move_cursor(-5);
		assert_eq!(app.table_state.selected(), Some(0));
		app.move_cursor(50);
		assert_eq!(app.table_state.selected(), Some(2));
	}

	#[test]
	fn empty_filter_clears_selection() {
		let mut store = seeded_store();
		let mut app = App::new(&mut store, no_import()).unwrap();
		app.query.push_str("no-such-host");
		app.apply_filter(true);
		assert!(app.filtered.is_empty());
		assert_eq!(app.table_state.selected(), None);
		assert!(app.current_selection().is_none());
	}

	#[test]
	fn manual_reimport_sets_the_first_run_marker() {
		let mut store = seeded_store();
		let mut app = App::new(
			&mut store,
			Box::new(|store: &mut HostStore| {
				let mut report = ScanReport::default();
				if let Ok(ImportOutcome::Inserted) = store.insert("hist.example", "imported") {
					report.imported = 1;
				}
				report
			}),
		)
		.unwrap();
		assert_eq!(app.store.get_setting(IMPORT_DONE_KEY).unwrap(), None);

		let outcome = app
			.handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL))
			.unwrap();
		assert!(outcome.is_none());
		assert_eq!(app.snapshot.len(), 4);
		assert_eq!(
			app.store.get_setting(IMPORT_DONE_KEY).unwrap().as_deref(),
			Some("1")
		);
		assert_eq!(app.status, "imported from history: +1");
	}

	#[test]
	fn save_form_inserts_and_reports_duplicates() {
		let mut store = seeded_store();
		let mut app = App::new(&mut store, no_import()).unwrap();

		app.form = Form {
			host: "delta.example".to_string(),
			note: "fourth".to_string(),
			focus: Some(FormFocus::Note),
		};
		app.mode = Mode::Add;
		app.save_form(None).unwrap();
		assert_eq!(app.mode, Mode::List);
		assert_eq!(app.status, "saved");
		assert_eq!(app.snapshot.len(), 4);

		app.form = Form {
			host: "delta.example".to_string(),
			note: String::new(),
			focus: Some(FormFocus::Note),
		};
		app.mode = Mode::Add;
		app.save_form(None).unwrap();
		assert_eq!(app.status, "host already exists");
		assert_eq!(app.snapshot.len(), 4);
	}

	#[test]
	fn save_form_keeps_invalid_host_in_form() {
		let mut store = seeded_store();
		let mut app = App::new(&mut store, no_import()).unwrap();

		app.form = Form {
			host: "bad host".to_string(),
			note: String::new(),
			focus: Some(FormFocus::Host),
		};
		app.mode = Mode::Add;
		app.save_form(None).unwrap();
		assert_eq!(app.mode, Mode::Add);
		assert!(app.status.starts_with("error:"));
		assert_eq!(app.snapshot.len(), 3);
	}
}
