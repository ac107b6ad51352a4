//! Drives `ListController` against the live proxy and mock product service.
//!
//! # Design
//! Both servers run on random ports in a background runtime. The test plays
//! the UI host: it feeds events to the controller, executes the returned
//! commands over real HTTP with ureq through `CatalogClient`, and feeds the
//! outcomes back. Time is a virtual clock advanced by hand.

use std::time::{Duration, Instant};

use catalog_core::{
    CatalogClient, Command, Event, HttpMethod, HttpRequest, HttpResponse, ListController,
    ListQuery, Notice, NoticeLevel, Product, ProductFields, Status,
};
use catalog_proxy::ProxyConfig;

/// Execute an `HttpRequest` using ureq, returning 4xx/5xx as data.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();
    let url = req.url();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&url).call(),
        (HttpMethod::Delete, _) => agent.delete(&url).call(),
        (HttpMethod::Post, Some(body)) => {
            agent.post(&url).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Post, None) => agent.post(&url).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            agent.put(&url).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Put, None) => agent.put(&url).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

/// Start the mock service and the proxy in front of it; returns the proxy
/// base URL.
fn start_stack() -> String {
    let upstream = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let upstream_addr = upstream.local_addr().unwrap();
    upstream.set_nonblocking(true).unwrap();

    let proxy = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let proxy_addr = proxy.local_addr().unwrap();
    proxy.set_nonblocking(true).unwrap();

    let config = ProxyConfig::from_lookup(|key| {
        (key == "EXTERNAL_API_URL").then(|| format!("http://{upstream_addr}"))
    })
    .unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let upstream = tokio::net::TcpListener::from_std(upstream).unwrap();
            tokio::spawn(mock_server::run(upstream));
            let proxy = tokio::net::TcpListener::from_std(proxy).unwrap();
            catalog_proxy::run(proxy, &config).await
        })
        .unwrap();
    });

    format!("http://{proxy_addr}/api")
}

/// The UI side: a controller plus the commands' executor.
struct Host {
    client: CatalogClient,
    ctl: ListController,
    notices: Vec<Notice>,
}

impl Host {
    fn new(base_url: &str) -> Self {
        Self {
            client: CatalogClient::new(base_url),
            ctl: ListController::default(),
            notices: Vec::new(),
        }
    }

    /// Handle an event and run every resulting command to completion.
    fn dispatch(&mut self, event: Event, now: Instant) {
        let mut pending = vec![event];
        while let Some(event) = pending.pop() {
            for command in self.ctl.handle(event, now) {
                if let Some(next) = self.run(command) {
                    pending.push(next);
                }
            }
        }
    }

    fn run(&mut self, command: Command) -> Option<Event> {
        let c = &self.client;
        match command {
            Command::Fetch(ticket) => {
                let outcome = c.parse_list_products(execute(c.build_list_products(ticket.query())));
                Some(Event::FetchSettled { ticket, outcome })
            }
            Command::Create { ticket, fields } => {
                let outcome = c
                    .build_create_product(&fields)
                    .and_then(|req| c.parse_create_product(execute(req)));
                Some(Event::MutationSettled { ticket, outcome })
            }
            Command::Update {
                ticket,
                product_id,
                fields,
            } => {
                let outcome = c
                    .build_update_product(&product_id, &fields)
                    .and_then(|req| c.parse_update_product(execute(req)));
                Some(Event::MutationSettled { ticket, outcome })
            }
            Command::Delete { product_id } => {
                let outcome = c
                    .build_delete_product(&product_id)
                    .and_then(|req| c.parse_delete_product(execute(req)));
                Some(Event::DeleteSettled {
                    product_id,
                    outcome,
                })
            }
            Command::Notify(notice) => {
                self.notices.push(notice);
                None
            }
        }
    }

    fn create(&mut self, fields: ProductFields, now: Instant) {
        self.dispatch(Event::OpenCreate, now);
        self.dispatch(Event::EditDraft(fields), now);
        self.dispatch(Event::Submit, now);
    }

    fn items(&self) -> Vec<Product> {
        self.ctl.results().map(|r| r.items.clone()).unwrap_or_default()
    }

    fn total(&self) -> u64 {
        self.ctl.results().map_or(0, |r| r.total)
    }

    fn last_notice(&self) -> &Notice {
        self.notices.last().expect("expected a notice")
    }
}

#[test]
fn list_edit_lifecycle() {
    let mut host = Host::new(&start_stack());
    let t0 = Instant::now();

    // Step 1: initial load of an empty catalog.
    host.dispatch(Event::Refresh, t0);
    assert_eq!(host.ctl.status(), Status::Idle);
    assert_eq!(host.total(), 0);
    assert_eq!(host.ctl.settled(), Some(&ListQuery::default()));

    // Step 2: create a product; the list refreshes with the settled query.
    let mut mug = ProductFields::new("Mug", 10.0);
    mug.product_category = Some("Kitchen".to_string());
    host.create(mug, t0);
    assert!(host.ctl.editor().is_none());
    assert_eq!(host.last_notice().level, NoticeLevel::Success);
    assert_eq!(host.total(), 1);
    let created = host.items()[0].clone();
    assert_eq!(created.product_title, "Mug");
    assert!(!created.product_id.is_empty());

    // Step 3: fill two more pages.
    for i in 1..=11 {
        host.create(ProductFields::new(format!("Item {i}"), f64::from(i)), t0);
    }
    assert_eq!(host.total(), 12);
    assert_eq!(host.items().len(), 10);

    // Step 4: paginate.
    host.dispatch(Event::PageChanged { page: 2, limit: 10 }, t0);
    assert_eq!(host.ctl.settled(), Some(&ListQuery::new(2, 10, "").unwrap()));
    assert_eq!(host.items().len(), 2);

    // Step 5: debounced search resets to page 1.
    let mut now = t0;
    for draft in ["m", "mu", "mug"] {
        host.dispatch(Event::SearchTyped(draft.to_string()), now);
        now += Duration::from_millis(100);
        host.dispatch(Event::Tick, now);
    }
    assert_eq!(host.ctl.settled().unwrap().search, "");
    host.dispatch(Event::Tick, host.ctl.next_deadline().unwrap());
    assert_eq!(host.ctl.settled(), Some(&ListQuery::new(1, 10, "mug").unwrap()));
    assert_eq!(host.total(), 1);

    // Step 6: editing a product the service does not know keeps the editor open.
    let mut ghost = created.clone();
    ghost.product_id = "missing-id".to_string();
    host.dispatch(Event::OpenEdit(ghost), now);
    host.dispatch(Event::Submit, now);
    let editor = host.ctl.editor().expect("editor stays open");
    assert!(!editor.submitting());
    assert!(editor.error.as_deref().unwrap().contains("404"));
    assert_eq!(host.last_notice().level, NoticeLevel::Error);
    host.dispatch(Event::CloseEditor, now);

    // Step 7: rename the real product.
    host.dispatch(Event::OpenEdit(created.clone()), now);
    let mut renamed = ProductFields::from(&created);
    renamed.product_title = "Big mug".to_string();
    host.dispatch(Event::EditDraft(renamed), now);
    host.dispatch(Event::Submit, now);
    assert_eq!(host.items()[0].product_title, "Big mug");
    assert_eq!(host.ctl.settled().unwrap().search, "mug");

    // Step 8: delete it; the search page is refetched, not reset.
    host.dispatch(Event::DeleteRequested(created.product_id.clone()), now);
    assert_eq!(host.total(), 0);
    assert_eq!(host.ctl.settled(), Some(&ListQuery::new(1, 10, "mug").unwrap()));

    // Step 9: deleting it again surfaces the upstream 404.
    host.dispatch(Event::DeleteRequested(created.product_id), now);
    assert_eq!(host.last_notice().level, NoticeLevel::Error);
    assert_eq!(host.ctl.status(), Status::Idle);
}

#[test]
fn late_response_for_superseded_page_is_dropped() {
    let mut host = Host::new(&start_stack());
    let t0 = Instant::now();
    for i in 1..=25 {
        host.create(ProductFields::new(format!("Item {i}"), 1.0), t0);
    }

    // Two page changes in flight; the newer one completes first.
    let first = host.ctl.handle(Event::PageChanged { page: 2, limit: 10 }, t0);
    let second = host.ctl.handle(Event::PageChanged { page: 3, limit: 10 }, t0);
    let [Command::Fetch(older)] = first.as_slice() else {
        panic!("expected a single fetch, got {first:?}");
    };
    let [Command::Fetch(newer)] = second.as_slice() else {
        panic!("expected a single fetch, got {second:?}");
    };

    let newer_event = host.run(Command::Fetch(newer.clone())).unwrap();
    let older_event = host.run(Command::Fetch(older.clone())).unwrap();
    host.dispatch(newer_event, t0);
    host.dispatch(older_event, t0);

    assert_eq!(host.ctl.settled(), Some(&ListQuery::new(3, 10, "").unwrap()));
    let titles: Vec<String> = host.items().into_iter().map(|p| p.product_title).collect();
    assert_eq!(titles, ["Item 21", "Item 22", "Item 23", "Item 24", "Item 25"]);
}
