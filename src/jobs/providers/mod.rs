// src/jobs/providers/mod.rs
pub mod careers_page;
pub mod widget;

pub use self::careers_page::CareersPageProvider;
pub use self::widget::{WidgetProvider, WidgetSource};
