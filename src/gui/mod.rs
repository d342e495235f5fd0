mod app;
mod config;
mod fps_limit;
mod observer;
mod text;

pub use app::App;
pub use config::Config;
use fps_limit::FpsLimiter;
pub use observer::{run_observed, ViewerEvent, WindowObserver};
pub use text::TextObserver;
