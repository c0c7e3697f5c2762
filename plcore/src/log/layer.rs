// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt::{self, Write};

use tracing::{
    field::{Field, Visit},
    Event, Level, Subscriber,
};
use tracing_subscriber::{layer::Context, Layer};

use super::{LogLevel, SharedLog};

/// A [`Layer`] which writes [`tracing`] events into a [`Log`](super::Log).
///
/// The event's `message` becomes the text, with any other fields appended as
/// `name=value`. Levels map to `ERROR` → [`LogLevel::ERROR`], `WARN` →
/// [`LogLevel::WARNING`], `INFO` → [`LogLevel::INFO`], `DEBUG` →
/// [`LogLevel::DEBUG`] and `TRACE` → `LogLevel::debug(1)`. The log's own level
/// filter still applies.
///
/// Events must not be emitted while the same thread holds the log's lock.
pub struct LogLayer {
    log: SharedLog,
}

impl LogLayer {
    pub fn new(log: SharedLog) -> LogLayer {
        LogLayer { log }
    }
}

fn log_level_for(level: Level) -> LogLevel {
    if level == Level::ERROR {
        LogLevel::ERROR
    } else if level == Level::WARN {
        LogLevel::WARNING
    } else if level == Level::INFO {
        LogLevel::INFO
    } else if level == Level::DEBUG {
        LogLevel::DEBUG
    } else {
        LogLevel::debug(1)
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn into_text(mut self) -> String {
        self.message.push_str(&self.fields);
        self.message
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

impl<S: Subscriber> Layer<S> for LogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let level = log_level_for(*event.metadata().level());
        // A log that can't write has no better place to report that.
        let _ = self.log.lock().output(level, &visitor.into_text());
    }
}
