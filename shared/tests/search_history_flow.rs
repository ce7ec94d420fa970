mod common;

use common::{
    http_requests, json_response, kv_requests, resolve_http, resolve_kv, send, MemoryKv, Tester,
};
use serde_json::json;
use crux_kv::KeyValueOperation;
use shared::filter::{CaseItem, NO_MATCHING_CASES};
use shared::search::{SearchEvent, SEARCH_INPUT_ID};
use shared::{Event, Model};

fn started(app: &Tester, kv: &mut MemoryKv) -> Model {
    let mut model = Model::default();
    let mut requests = kv_requests(send(app, &mut model, Event::AppStarted));
    assert_eq!(requests.len(), 1);
    assert!(matches!(
        &requests[0].operation,
        KeyValueOperation::Get { key } if key == "recentSearches"
    ));
    resolve_kv(app, &mut model, &mut requests[0], kv);
    model
}

fn search_for(app: &Tester, model: &mut Model, kv: &mut MemoryKv, query: &str) {
    send(app, model, Event::Search(SearchEvent::InputChanged(query.into())));
    let effects = send(app, model, Event::Search(SearchEvent::Submitted));
    for mut request in kv_requests(effects) {
        resolve_kv(app, model, &mut request, kv);
    }
}

fn case_list() -> Vec<CaseItem> {
    vec![
        CaseItem::new("1", "Robbery in Downtown"),
        CaseItem::new("2", "Fraud Investigation"),
        CaseItem::new("3", "Kidnapping Case"),
    ]
}

#[test]
fn history_loads_from_storage() {
    let app = Tester::default();
    let mut kv = MemoryKv::default();
    kv.values
        .insert("recentSearches".into(), br#"["arson", "fraud"]"#.to_vec());

    let model = started(&app, &mut kv);
    assert_eq!(model.search.history.entries(), ["arson", "fraud"]);

    let view = app.view(&model);
    assert!(view.search.history_panel_visible);
    assert_eq!(view.search.history, vec!["arson", "fraud"]);
}

#[test]
fn query_submitted_before_history_loads_is_merged() {
    let app = Tester::default();
    let mut kv = MemoryKv::default();
    kv.values.insert("recentSearches".into(), br#"["a", "b"]"#.to_vec());
    let mut model = Model::default();

    let mut loads = kv_requests(send(&app, &mut model, Event::AppStarted));
    assert_eq!(loads.len(), 1);

    send(&app, &mut model, Event::Search(SearchEvent::InputChanged("x".into())));
    let effects = send(&app, &mut model, Event::Search(SearchEvent::Submitted));
    assert!(kv_requests(effects).is_empty(), "no write before the stored list is known");
    assert_eq!(kv.strings("recentSearches").unwrap(), ["a", "b"]);

    let effects = resolve_kv(&app, &mut model, &mut loads[0], &mut kv);
    let mut writes = kv_requests(effects);
    assert_eq!(writes.len(), 1);
    assert!(matches!(&writes[0].operation, KeyValueOperation::Set { .. }));
    resolve_kv(&app, &mut model, &mut writes[0], &mut kv);

    assert_eq!(model.search.history.entries(), ["x", "a", "b"]);
    assert_eq!(kv.strings("recentSearches").unwrap(), ["x", "a", "b"]);
    assert!(model.search.pending_records.is_empty());
}

#[test]
fn unreadable_storage_starts_empty() {
    let app = Tester::default();
    let mut kv = MemoryKv::default();
    kv.values.insert("recentSearches".into(), b"{broken".to_vec());

    let model = started(&app, &mut kv);
    assert!(model.search.history.is_empty());
    assert!(!app.view(&model).search.history_panel_visible);
}

#[test]
fn submitted_queries_are_recorded_and_persisted() {
    let app = Tester::default();
    let mut kv = MemoryKv::default();
    let mut model = started(&app, &mut kv);

    for query in ["a", "b", "c", "a", "d", "e", "f"] {
        search_for(&app, &mut model, &mut kv, query);
    }

    let expected = ["f", "e", "d", "a", "c"];
    assert_eq!(model.search.history.entries(), expected);
    assert_eq!(kv.strings("recentSearches").unwrap(), expected);
    assert!(model.search.panel_visible);
}

#[test]
fn blank_query_filters_but_is_not_recorded() {
    let app = Tester::default();
    let mut kv = MemoryKv::default();
    let mut model = started(&app, &mut kv);
    send(
        &app,
        &mut model,
        Event::Search(SearchEvent::CaseListLoaded { items: case_list() }),
    );

    search_for(&app, &mut model, &mut kv, "xyz123");
    let list = model.search.case_list.as_ref().unwrap();
    assert_eq!(list.visible_count(), 0);
    assert_eq!(list.advisory(), Some(NO_MATCHING_CASES));

    search_for(&app, &mut model, &mut kv, "   ");
    let list = model.search.case_list.as_ref().unwrap();
    assert_eq!(list.visible_count(), 0, "whitespace is a literal filter");

    search_for(&app, &mut model, &mut kv, "");
    let list = model.search.case_list.as_ref().unwrap();
    assert_eq!(list.visible_count(), 3);
    assert_eq!(list.advisory(), Some(""));

    assert_eq!(model.search.history.entries(), ["xyz123"]);
}

#[test]
fn filter_is_case_insensitive() {
    let app = Tester::default();
    let mut kv = MemoryKv::default();
    let mut model = started(&app, &mut kv);
    send(
        &app,
        &mut model,
        Event::Search(SearchEvent::CaseListLoaded { items: case_list() }),
    );

    search_for(&app, &mut model, &mut kv, "FRAUD");
    let view = app.view(&model);
    let list = view.search.case_list.unwrap();
    let visible: Vec<_> = list.items.iter().filter(|i| i.visible).map(|i| i.id.as_str()).collect();
    assert_eq!(visible, ["2"]);
    assert_eq!(list.advisory.as_deref(), Some(""));
}

#[test]
fn selecting_history_entry_fills_input_and_filters() {
    let app = Tester::default();
    let mut kv = MemoryKv::default();
    kv.values
        .insert("recentSearches".into(), br#"["kidnapping"]"#.to_vec());
    let mut model = started(&app, &mut kv);
    send(
        &app,
        &mut model,
        Event::Search(SearchEvent::CaseListLoaded { items: case_list() }),
    );

    send(
        &app,
        &mut model,
        Event::Search(SearchEvent::HistoryEntrySelected {
            query: "kidnapping".into(),
        }),
    );
    assert_eq!(model.search.input, "kidnapping");
    assert_eq!(model.search.case_list.as_ref().unwrap().visible_count(), 1);
}

#[test]
fn clicks_outside_the_input_hide_the_panel() {
    let app = Tester::default();
    let mut kv = MemoryKv::default();
    kv.values.insert("recentSearches".into(), br#"["fraud"]"#.to_vec());
    let mut model = started(&app, &mut kv);
    assert!(model.search.panel_visible);

    send(
        &app,
        &mut model,
        Event::Search(SearchEvent::DocumentClicked {
            target_id: Some(SEARCH_INPUT_ID.into()),
        }),
    );
    assert!(model.search.panel_visible);

    send(
        &app,
        &mut model,
        Event::Search(SearchEvent::DocumentClicked { target_id: None }),
    );
    assert!(!model.search.panel_visible);

    send(&app, &mut model, Event::Search(SearchEvent::InputFocused));
    assert!(model.search.panel_visible);
}

#[test]
fn filter_without_case_list_is_a_no_op() {
    let app = Tester::default();
    let mut kv = MemoryKv::default();
    let mut model = started(&app, &mut kv);

    search_for(&app, &mut model, &mut kv, "fraud");
    assert!(model.search.case_list.is_none());
    assert_eq!(model.search.history.entries(), ["fraud"]);
}

#[test]
fn remote_search_replaces_the_list() {
    let app = Tester::default();
    let mut kv = MemoryKv::default();
    let mut model = started(&app, &mut kv);
    send(
        &app,
        &mut model,
        Event::Search(SearchEvent::CaseListLoaded { items: case_list() }),
    );
    send(
        &app,
        &mut model,
        Event::Search(SearchEvent::InputChanged("bank".into())),
    );

    let mut requests = http_requests(send(
        &app,
        &mut model,
        Event::Search(SearchEvent::RemoteSearchRequested),
    ));
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].operation.method, "GET");
    assert_eq!(requests[0].operation.url, "http://127.0.0.1:5000/Search?q=bank");
    assert!(app.view(&model).search.searching);

    let reply = json!({"cases": [{"id": 4, "title": "Bank Fraud", "description": "Cheques", "status": "Open"}]});
    resolve_http(&app, &mut model, &mut requests[0], json_response(200, reply));

    let list = model.search.case_list.as_ref().unwrap();
    assert_eq!(list.items().len(), 1);
    assert_eq!(list.items()[0].id, "4");
    assert!(!model.search.remote_in_flight);
}
