//! Shared core of the CaseDesk web client: case lookup chat, case creation
//! with photo uploads, search history and the case list filter. The browser
//! shell renders the `ViewModel` and carries out the `Effect`s.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]

pub mod app;
pub mod capabilities;
pub mod cases;
pub mod config;
pub mod error;
pub mod event;
pub mod filter;
pub mod history;
pub mod messaging;
pub mod model;
pub mod multipart;
pub mod navigation;
pub mod search;
pub mod view;
pub mod voice;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::{AppConfig, MessagingMode};
pub use error::{AppError, AppResult, ErrorKind};
pub use event::Event;
pub use model::Model;
pub use view::ViewModel;
