//! List synchronization controller for the product list/edit surface.
//!
//! # Design
//! The controller is a plain state object with one transition function,
//! `handle(event, now)`. It performs no I/O: every side effect is returned as
//! a `Command` for the host to execute, and every completion comes back as
//! an `Event`. Time is injected through `now`, and the host delivers
//! `Event::Tick` once `next_deadline()` has passed.
//!
//! Each issued fetch carries a `FetchTicket` with a monotonically increasing
//! generation. Only the ticket with the latest generation may update the
//! list; anything older is dropped on arrival. In-flight requests are never
//! aborted.
//!
//! Creates and updates carry a `MutationTicket` the same way. A settled
//! mutation always refreshes the list, but it only closes or flags the
//! editor whose in-flight submission matches its ticket.

use std::time::{Duration, Instant};

use crate::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::error::ApiError;
use crate::types::{ListQuery, ListResult, Product, ProductFields, DEFAULT_PAGE_SIZE};

const LOAD_FAILED: &str = "Failed to load products";

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub page_size: u32,
    pub debounce: Duration,
    /// When an applied page comes back empty past the end of the list,
    /// fetch the last non-empty page instead of showing an empty page.
    pub step_back_on_empty_page: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce: SEARCH_DEBOUNCE,
            step_back_on_empty_page: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading,
    Error,
}

/// Identity of an issued list fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    query: ListQuery,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A user-visible message (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit { product_id: String },
}

/// Identity of a submitted create or update. Echoed back in
/// `Event::MutationSettled` so a result only touches the editor that sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationTicket {
    id: u64,
    mode: EditorMode,
}

impl MutationTicket {
    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }
}

/// State of the create/edit modal. The draft is a local copy and never
/// touches the displayed list.
#[derive(Debug, Clone, PartialEq)]
pub struct Editor {
    pub mode: EditorMode,
    pub draft: ProductFields,
    /// Set while a submission from this editor is in flight.
    pub submission: Option<MutationTicket>,
    pub error: Option<String>,
}

impl Editor {
    fn new(mode: EditorMode, draft: ProductFields) -> Self {
        Self {
            mode,
            draft,
            submission: None,
            error: None,
        }
    }

    pub fn submitting(&self) -> bool {
        self.submission.is_some()
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    /// Fetch the current query again (initial load, manual reload).
    Refresh,
    SearchTyped(String),
    /// The debounce deadline may have passed.
    Tick,
    PageChanged {
        page: u32,
        limit: u32,
    },
    FetchSettled {
        ticket: FetchTicket,
        outcome: Result<ListResult, ApiError>,
    },
    OpenCreate,
    OpenEdit(Product),
    EditDraft(ProductFields),
    CloseEditor,
    Submit,
    MutationSettled {
        ticket: MutationTicket,
        outcome: Result<Product, ApiError>,
    },
    DeleteRequested(String),
    DeleteSettled {
        product_id: String,
        outcome: Result<(), ApiError>,
    },
}

/// Side effects the host must perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Fetch(FetchTicket),
    Create {
        ticket: MutationTicket,
        fields: ProductFields,
    },
    Update {
        ticket: MutationTicket,
        product_id: String,
        fields: ProductFields,
    },
    Delete {
        product_id: String,
    },
    Notify(Notice),
}

#[derive(Debug, Clone)]
pub struct ListController {
    config: ControllerConfig,
    query: ListQuery,
    settled: Option<ListQuery>,
    results: Option<ListResult>,
    status: Status,
    search_draft: String,
    debouncer: Debouncer,
    generation: u64,
    last_error: Option<String>,
    editor: Option<Editor>,
    mutations: u64,
}

impl ListController {
    pub fn new(config: ControllerConfig) -> Self {
        let query = ListQuery {
            limit: config.page_size.max(1),
            ..ListQuery::default()
        };
        Self {
            debouncer: Debouncer::new(config.debounce),
            config,
            query,
            settled: None,
            results: None,
            status: Status::Idle,
            search_draft: String::new(),
            generation: 0,
            last_error: None,
            editor: None,
            mutations: 0,
        }
    }

    /// The most recently issued query.
    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    /// The query behind the currently displayed results.
    pub fn settled(&self) -> Option<&ListQuery> {
        self.settled.as_ref()
    }

    pub fn results(&self) -> Option<&ListResult> {
        self.results.as_ref()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn search_draft(&self) -> &str {
        &self.search_draft
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    /// When the host should deliver `Event::Tick`.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn handle(&mut self, event: Event, now: Instant) -> Vec<Command> {
        match event {
            Event::Refresh => vec![self.issue_fetch(self.query.clone())],
            Event::SearchTyped(text) => {
                self.debouncer.schedule(text.clone(), now);
                self.search_draft = text;
                Vec::new()
            }
            Event::Tick => self.on_tick(now),
            Event::PageChanged { page, limit } => {
                let next = self.query.with_page(page, limit);
                if next == self.query {
                    return Vec::new();
                }
                vec![self.issue_fetch(next)]
            }
            Event::FetchSettled { ticket, outcome } => self.on_fetch_settled(ticket, outcome),
            Event::OpenCreate => {
                self.editor = Some(Editor::new(EditorMode::Create, ProductFields::default()));
                Vec::new()
            }
            Event::OpenEdit(product) => {
                let mode = EditorMode::Edit {
                    product_id: product.product_id.clone(),
                };
                self.editor = Some(Editor::new(mode, ProductFields::from(&product)));
                Vec::new()
            }
            Event::EditDraft(fields) => {
                if let Some(editor) = self.editor.as_mut().filter(|e| !e.submitting()) {
                    editor.draft = fields;
                    editor.error = None;
                }
                Vec::new()
            }
            Event::CloseEditor => {
                self.editor = None;
                Vec::new()
            }
            Event::Submit => self.on_submit(),
            Event::MutationSettled { ticket, outcome } => self.on_mutation_settled(ticket, outcome),
            Event::DeleteRequested(product_id) => {
                if product_id.trim().is_empty() {
                    return vec![Command::Notify(Notice::error("product_id is required"))];
                }
                vec![Command::Delete { product_id }]
            }
            Event::DeleteSettled {
                product_id,
                outcome,
            } => match outcome {
                Ok(()) => {
                    tracing::debug!(%product_id, "product deleted, refreshing list");
                    vec![
                        Command::Notify(Notice::success("Product deleted")),
                        self.issue_fetch(self.query.clone()),
                    ]
                }
                Err(e) => vec![Command::Notify(Notice::error(format!(
                    "Failed to delete product: {e}"
                )))],
            },
        }
    }

    fn issue_fetch(&mut self, query: ListQuery) -> Command {
        self.generation += 1;
        self.query = query.clone();
        self.status = Status::Loading;
        Command::Fetch(FetchTicket {
            generation: self.generation,
            query,
        })
    }

    fn on_tick(&mut self, now: Instant) -> Vec<Command> {
        let Some(term) = self.debouncer.poll(now) else {
            return Vec::new();
        };
        if term == self.query.search {
            return Vec::new();
        }
        let next = self.query.with_search(term);
        vec![self.issue_fetch(next)]
    }

    fn on_fetch_settled(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<ListResult, ApiError>,
    ) -> Vec<Command> {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding superseded list fetch"
            );
            return Vec::new();
        }

        match outcome {
            Ok(mut result) => {
                self.status = Status::Idle;
                self.last_error = None;
                let query = ticket.query;
                // Services that answer with only items and total echo no paging.
                if result.limit == 0 {
                    result.page = query.page;
                    result.limit = query.limit;
                }
                let past_end = result.items.is_empty() && query.page > 1 && result.total > 0;
                let last_page = result.total_pages();
                self.results = Some(result);
                self.settled = Some(query.clone());

                if self.config.step_back_on_empty_page && past_end {
                    let last_page = u32::try_from(last_page).unwrap_or(u32::MAX).max(1);
                    if last_page < query.page {
                        return vec![self.issue_fetch(query.with_page(last_page, query.limit))];
                    }
                }
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "list fetch failed");
                self.status = Status::Error;
                self.last_error = Some(e.to_string());
                vec![Command::Notify(Notice::error(LOAD_FAILED))]
            }
        }
    }

    fn on_submit(&mut self) -> Vec<Command> {
        let Some(editor) = self.editor.as_mut() else {
            return Vec::new();
        };
        if editor.submitting() {
            return Vec::new();
        }
        if let Err(e) = editor.draft.validate() {
            editor.error = Some(e.to_string());
            return Vec::new();
        }

        self.mutations += 1;
        let ticket = MutationTicket {
            id: self.mutations,
            mode: editor.mode.clone(),
        };
        editor.submission = Some(ticket.clone());
        editor.error = None;
        let fields = editor.draft.clone();
        match &editor.mode {
            EditorMode::Create => vec![Command::Create { ticket, fields }],
            EditorMode::Edit { product_id } => vec![Command::Update {
                ticket,
                product_id: product_id.clone(),
                fields,
            }],
        }
    }

    /// Every successful mutation refreshes the list. Only the editor that
    /// issued `ticket` is closed or marked failed; a result for a closed or
    /// replaced editor leaves the open one alone.
    fn on_mutation_settled(
        &mut self,
        ticket: MutationTicket,
        outcome: Result<Product, ApiError>,
    ) -> Vec<Command> {
        let owner = self
            .editor
            .as_ref()
            .is_some_and(|e| e.submission.as_ref() == Some(&ticket));

        match outcome {
            Ok(product) => {
                tracing::debug!(product_id = %product.product_id, "product saved, refreshing list");
                if owner {
                    self.editor = None;
                }
                let message = match ticket.mode {
                    EditorMode::Create => "Product created",
                    EditorMode::Edit { .. } => "Product updated",
                };
                vec![
                    Command::Notify(Notice::success(message)),
                    self.issue_fetch(self.query.clone()),
                ]
            }
            Err(e) => {
                if let Some(editor) = self.editor.as_mut().filter(|_| owner) {
                    editor.submission = None;
                    editor.error = Some(e.to_string());
                }
                vec![Command::Notify(Notice::error(format!(
                    "Failed to save product: {e}"
                )))]
            }
        }
    }
}

impl Default for ListController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}
