mod app;
mod command;
mod feeders;
mod input;
mod styles;
mod transcript;
mod view;

pub use app::{Flow, TuiApp, TuiMsg, run};
pub use transcript::{Transcript, TranscriptLine};
