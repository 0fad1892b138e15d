use crate::ui::{self, Stream};
use std::time::{Duration, Instant};

/// Prints each step of a command as it starts and finishes
pub struct ProgressTracker {
    operation_name: String,
    start_time: Instant,
    steps: Vec<String>,
    current_step: usize,
    stream: Stream,
}

impl ProgressTracker {
    /// Starts a tracker that prints every line to `stream`
    pub fn on(stream: Stream, operation_name: &str) -> Self {
        ui::section_header_to(stream, operation_name);
        Self {
            operation_name: operation_name.to_string(),
            start_time: Instant::now(),
            steps: Vec::new(),
            current_step: 0,
            stream,
        }
    }

    pub fn with_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps = steps.into_iter().map(Into::into).collect();
        self
    }

    pub fn start_step(&self) {
        if let Some(step) = self.steps.get(self.current_step) {
            ui::status_message_to(self.stream, step);
        }
    }

    pub fn complete_step(&mut self) {
        if let Some(step) = self.steps.get(self.current_step) {
            ui::success_message_to(self.stream, step);
            self.current_step += 1;
        }
    }

    /// Completes the current step, appending `detail` to its name
    pub fn complete_step_with(&mut self, detail: &str) {
        if let Some(step) = self.steps.get(self.current_step) {
            ui::success_message_to(self.stream, &format!("{step} ({detail})"));
            self.current_step += 1;
        }
    }

    pub fn skip_step(&mut self, reason: &str) {
        if let Some(step) = self.steps.get(self.current_step) {
            ui::warning_message_to(self.stream, &format!("Skipped: {step} ({reason})"));
            self.current_step += 1;
        }
    }

    pub fn complete(&self) {
        ui::success_message_to(
            self.stream,
            &format!(
                "{} completed in {}",
                self.operation_name,
                format_duration(self.start_time.elapsed())
            ),
        );
    }

    pub const fn stream(&self) -> Stream {
        self.stream
    }
}

fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        return format!("{millis} ms");
    }
    let seconds = duration.as_secs();
    if seconds < 60 {
        format!("{seconds} seconds")
    } else {
        format!("{} minutes {} seconds", seconds / 60, seconds % 60)
    }
}
