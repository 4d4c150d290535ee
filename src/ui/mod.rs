//! Terminal feedback while long-running commands fetch market data

pub mod progress;

pub use progress::ProgressPrinter;
