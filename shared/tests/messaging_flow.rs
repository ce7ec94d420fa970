mod common;

use common::{
    header, http_requests, json_response, renders, resolve_http, send, transport_error, Tester,
};
use crux_http::protocol::{HttpResponse, HttpResult};
use serde_json::json;
use shared::messaging::{MessagingEvent, Speaker, TurnContent};
use shared::{AppConfig, Event, MessagingMode, Model};

fn type_and_submit(app: &Tester, model: &mut Model, text: &str) -> Vec<shared::Effect> {
    send(app, model, Event::Messaging(MessagingEvent::InputChanged(text.into())));
    send(app, model, Event::Messaging(MessagingEvent::Submitted))
}

#[test]
fn lookup_reply_appends_summary_after_user_turn() {
    let app = Tester::default();
    let mut model = Model::default();

    let effects = type_and_submit(&app, &mut model, "  bank fraud ");
    assert!(renders(&effects));
    assert_eq!(model.chat.input, "");
    assert_eq!(model.chat.transcript.len(), 1);
    assert_eq!(
        model.chat.transcript[0].content,
        TurnContent::Text { text: "bank fraud".into() }
    );

    let mut requests = http_requests(effects);
    assert_eq!(requests.len(), 1);
    let request = &mut requests[0];
    assert_eq!(request.operation.method, "GET");
    assert_eq!(
        request.operation.url,
        "http://127.0.0.1:5000/get_case?title=bank+fraud"
    );

    let reply = json!({"title": "Bank Fraud", "description": "Forged cheques", "status": "Open"});
    let effects = resolve_http(&app, &mut model, request, json_response(200, reply));
    assert!(renders(&effects));

    assert_eq!(model.chat.transcript.len(), 2);
    let bot = &model.chat.transcript[1];
    assert_eq!(bot.speaker, Speaker::Bot);
    assert_eq!(
        bot.content,
        TurnContent::CaseSummary {
            title: "Bank Fraud".into(),
            description: "Forged cheques".into(),
            status: "Open".into(),
        }
    );
    assert_eq!(app.view(&model).chat.bot_turns, 1);
    assert_eq!(model.chat.pending_replies, 0);
}

#[test]
fn lookup_message_renders_not_found_notice() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut requests = http_requests(type_and_submit(&app, &mut model, "nothing"));
    let reply = json!({"message": "No case found with that title"});
    resolve_http(&app, &mut model, &mut requests[0], json_response(404, reply));

    let view = app.view(&model);
    assert_eq!(view.chat.turns.len(), 2);
    assert_eq!(view.chat.turns[1].lines[0].value, "🔍 No case found with that title");
}

#[test]
fn blank_input_sends_nothing() {
    let app = Tester::default();
    let mut model = Model::default();

    let effects = type_and_submit(&app, &mut model, "   \t ");
    assert!(http_requests(effects).is_empty());
    assert!(model.chat.transcript.is_empty());
}

#[test]
fn enter_key_submits_other_keys_do_not() {
    let app = Tester::default();
    let mut model = Model::default();
    send(&app, &mut model, Event::Messaging(MessagingEvent::InputChanged("hello".into())));

    let effects = send(
        &app,
        &mut model,
        Event::Messaging(MessagingEvent::KeyPressed { key: "a".into() }),
    );
    assert!(http_requests(effects).is_empty());
    assert_eq!(model.chat.input, "hello");

    let effects = send(
        &app,
        &mut model,
        Event::Messaging(MessagingEvent::KeyPressed { key: "Enter".into() }),
    );
    assert_eq!(http_requests(effects).len(), 1);
    assert_eq!(model.chat.input, "");
}

#[test]
fn chat_mode_posts_and_renders_text_and_detail() {
    let app = Tester::default();
    let mut model = Model::default();
    send(
        &app,
        &mut model,
        Event::Configure(AppConfig {
            messaging_mode: MessagingMode::Chat,
            ..AppConfig::default()
        }),
    );

    let mut requests = http_requests(type_and_submit(&app, &mut model, "hello"));
    let request = &mut requests[0];
    assert_eq!(request.operation.method, "POST");
    assert_eq!(request.operation.url, "http://127.0.0.1:5000/chat");
    assert_eq!(header(&request.operation, "content-type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_slice(&request.operation.body).unwrap();
    assert_eq!(body, json!({"message": "hello"}));

    let reply = json!({"response": "Hello! How can I assist you today?"});
    resolve_http(&app, &mut model, request, json_response(200, reply));
    assert_eq!(
        model.chat.transcript[1].content,
        TurnContent::Text {
            text: "Hello! How can I assist you today?".into()
        }
    );

    let mut requests = http_requests(type_and_submit(&app, &mut model, "case 12"));
    let reply = json!({"response": {"Case Title": "Arson", "Suspect Name": "R. Kumar", "Status": "Closed"}});
    resolve_http(&app, &mut model, &mut requests[0], json_response(200, reply));

    let view = app.view(&model);
    let lines = &view.chat.turns[3].lines;
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[1].label.as_deref(), Some("Suspect Name"));
    assert_eq!(lines[1].value, "R. Kumar");
    assert_eq!(lines[2].value, "");
}

#[test]
fn failures_are_logged_without_bot_turn() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut requests = http_requests(type_and_submit(&app, &mut model, "first"));
    resolve_http(
        &app,
        &mut model,
        &mut requests[0],
        transport_error("connection refused"),
    );

    let mut requests = http_requests(type_and_submit(&app, &mut model, "second"));
    resolve_http(
        &app,
        &mut model,
        &mut requests[0],
        HttpResult::Ok(HttpResponse::ok().body(b"<html>".to_vec()).build()),
    );

    let speakers: Vec<_> = model.chat.transcript.iter().map(|t| t.speaker).collect();
    assert_eq!(speakers, vec![Speaker::User, Speaker::User]);
    assert_eq!(model.chat.input, "");
    assert_eq!(app.view(&model).chat.bot_turns, 0);
}

#[test]
fn bot_turn_count_grows_with_each_reply() {
    let app = Tester::default();
    let mut model = Model::default();

    for (expected, title) in [(1, "Arson"), (2, "Heist")] {
        let mut requests = http_requests(type_and_submit(&app, &mut model, title));
        let reply = json!({"title": title, "description": "", "status": "Open"});
        resolve_http(&app, &mut model, &mut requests[0], json_response(200, reply));
        assert_eq!(app.view(&model).chat.bot_turns, expected);
    }

    // a user turn alone does not move the counter
    type_and_submit(&app, &mut model, "third");
    assert_eq!(app.view(&model).chat.bot_turns, 2);
}
