//! In-page section switching, sidebar links, theme and user settings.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::capabilities::Capabilities;
use crate::model::Model;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub notifications: bool,
    pub sound_alerts: bool,
    pub custom_status: String,
}

impl Settings {
    pub fn confirmation(&self) -> String {
        let on_off = |flag: bool| if flag { "ON" } else { "OFF" };
        let status = if self.custom_status.is_empty() {
            "None"
        } else {
            self.custom_status.as_str()
        };
        format!(
            "Settings Saved!\n\nNotifications: {}\nSound Alerts: {}\nCustom Status: {status}",
            on_off(self.notifications),
            on_off(self.sound_alerts),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    /// Page ids in document order.
    pub sections: Vec<String>,
    /// The one visible page; `None` hides every page.
    pub active_section: Option<String>,
    pub sidebar_open: bool,
    pub dark_mode: bool,
    pub settings: Settings,
}

impl NavigationState {
    pub fn has_section(&self, id: &str) -> bool {
        self.sections.iter().any(|s| s == id)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.active_section.as_deref() == Some(id)
    }

    /// Shows exactly the page named `id`. An unknown id leaves every page
    /// hidden.
    pub fn navigate_section(&mut self, id: &str) {
        if self.has_section(id) {
            self.active_section = Some(id.to_string());
        } else {
            error!(section = id, "section not found");
            self.active_section = None;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationEvent {
    PagesDiscovered { sections: Vec<String> },
    LinkActivated { section_id: Option<String>, href: String },
    SectionRequested { section_id: String },
    SidebarToggled,
    DarkModeToggled,
    SettingsSaved(Settings),
}

impl NavigationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PagesDiscovered { .. } => "pages_discovered",
            Self::LinkActivated { .. } => "link_activated",
            Self::SectionRequested { .. } => "section_requested",
            Self::SidebarToggled => "sidebar_toggled",
            Self::DarkModeToggled => "dark_mode_toggled",
            Self::SettingsSaved(_) => "settings_saved",
        }
    }
}

pub fn update(event: NavigationEvent, model: &mut Model, caps: &Capabilities) {
    let nav = &mut model.navigation;
    match event {
        NavigationEvent::PagesDiscovered { sections } => {
            debug!(count = sections.len(), "pages registered");
            if let Some(active) = &nav.active_section {
                if !sections.contains(active) {
                    nav.active_section = None;
                }
            }
            nav.sections = sections;
        }

        NavigationEvent::LinkActivated { section_id, href } => {
            match section_id.filter(|id| nav.has_section(id)) {
                Some(id) => nav.navigate_section(&id),
                None => {
                    info!(href, "loading page");
                    caps.navigator.load(href);
                    return;
                }
            }
        }

        NavigationEvent::SectionRequested { section_id } => nav.navigate_section(&section_id),

        NavigationEvent::SidebarToggled => nav.sidebar_open = !nav.sidebar_open,

        NavigationEvent::DarkModeToggled => nav.dark_mode = !nav.dark_mode,

        NavigationEvent::SettingsSaved(settings) => {
            caps.notice.alert(settings.confirmation());
            nav.settings = settings;
        }
    }

    caps.render.render();
}
