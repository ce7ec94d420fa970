#![allow(dead_code)]

use std::collections::HashMap;

use crux_core::testing::AppTester;
use crux_core::Request;
use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};
use crux_kv::{KeyValueOperation, KeyValueResponse, KeyValueResult};
use shared::capabilities::NoticeOperation;
use shared::{App, Effect, Event, Model};

pub type Tester = AppTester<App, Effect>;

/// Services `KeyValue` requests from a map, standing in for localStorage.
#[derive(Default)]
pub struct MemoryKv {
    pub values: HashMap<String, Vec<u8>>,
}

impl MemoryKv {
    pub fn handle(&mut self, operation: &KeyValueOperation) -> KeyValueResult {
        let response = match operation {
            KeyValueOperation::Get { key } => KeyValueResponse::Get {
                value: self.values.get(key).cloned().into(),
            },
            KeyValueOperation::Set { key, value } => KeyValueResponse::Set {
                previous: self.values.insert(key.clone(), value.clone()).into(),
            },
            other => panic!("unexpected storage operation {other:?}"),
        };
        KeyValueResult::Ok { response }
    }

    pub fn strings(&self, key: &str) -> Option<Vec<String>> {
        self.values
            .get(key)
            .map(|raw| serde_json::from_slice(raw).expect("stored value is a JSON list"))
    }
}

pub fn json_response(status: u16, body: serde_json::Value) -> HttpResult {
    HttpResult::Ok(HttpResponse::status(status).json(body).build())
}

pub fn transport_error(message: &str) -> HttpResult {
    HttpResult::Err(crux_http::Error::Io(message.to_string()))
}

/// Header lookup on an outgoing request; names reach the shell lowercased.
pub fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Feeds follow-up events back through `update` and collects every effect.
pub fn settle(app: &Tester, model: &mut Model, effects: Vec<Effect>, events: Vec<Event>) -> Vec<Effect> {
    let mut all = effects;
    for event in events {
        let update = app.update(event, model);
        all.extend(settle(app, model, update.effects, update.events));
    }
    all
}

pub fn send(app: &Tester, model: &mut Model, event: Event) -> Vec<Effect> {
    let update = app.update(event, model);
    settle(app, model, update.effects, update.events)
}

pub fn resolve_http(
    app: &Tester,
    model: &mut Model,
    request: &mut Request<HttpRequest>,
    result: HttpResult,
) -> Vec<Effect> {
    let update = app.resolve(request, result).expect("http request resolves");
    settle(app, model, update.effects, update.events)
}

pub fn resolve_kv(
    app: &Tester,
    model: &mut Model,
    request: &mut Request<KeyValueOperation>,
    kv: &mut MemoryKv,
) -> Vec<Effect> {
    let output = kv.handle(&request.operation);
    let update = app.resolve(request, output).expect("kv request resolves");
    settle(app, model, update.effects, update.events)
}

pub fn http_requests(effects: Vec<Effect>) -> Vec<Request<HttpRequest>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => Some(request),
            _ => None,
        })
        .collect()
}

pub fn kv_requests(effects: Vec<Effect>) -> Vec<Request<KeyValueOperation>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::KeyValue(request) => Some(request),
            _ => None,
        })
        .collect()
}

pub fn alerts(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Notice(request) => match &request.operation {
                NoticeOperation::Alert { message } => Some(message.clone()),
            },
            _ => None,
        })
        .collect()
}

pub fn renders(effects: &[Effect]) -> bool {
    effects.iter().any(|effect| matches!(effect, Effect::Render(_)))
}

pub fn http_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::Http(_)))
        .count()
}
