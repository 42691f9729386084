use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/"])
        .template("{msg} {spinner}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Await `request` behind a spinner, clearing it whatever the outcome.
pub async fn with_spinner<F: Future>(message: &str, request: F) -> F::Output {
    let spinner = create_spinner(message.to_string());
    let output = request.await;
    spinner.finish_and_clear();
    output
}
