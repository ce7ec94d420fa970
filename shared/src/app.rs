use tracing::{debug, error, info};

use crate::capabilities::Capabilities;
use crate::event::Event;
use crate::model::Model;
use crate::view::ViewModel;
use crate::{cases, messaging, navigation, search, voice};

#[derive(Default)]
pub struct App;

impl App {
    fn configure(config: crate::config::AppConfig, model: &mut Model, caps: &Capabilities) {
        if let Err(e) = config.validate() {
            error!(error = %e, "configuration rejected, keeping the previous one");
            return;
        }

        let key_changed = config.history_key != model.config.history_key;
        model.search.history.set_limit(config.history_limit);
        info!(
            mode = ?config.messaging_mode,
            base_url = config.base_url.as_str(),
            "configuration applied"
        );
        model.config = config;

        if key_changed {
            search::load_history(model, caps);
        }
        caps.render.render();
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(event = event.name(), "update");

        match event {
            Event::AppStarted => {
                search::load_history(model, caps);
                caps.render.render();
            }
            Event::Configure(config) => Self::configure(config, model, caps),
            Event::Navigation(event) => navigation::update(event, model, caps),
            Event::Messaging(event) => messaging::update(event, model, caps),
            Event::Cases(event) => cases::update(event, model, caps),
            Event::Search(event) => search::update(event, model, caps),
            Event::Voice(event) => voice::update(event, model, caps),
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::build(model)
    }
}
