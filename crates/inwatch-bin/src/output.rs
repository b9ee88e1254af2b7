use std::path::Path;

use chrono::{DateTime, Utc};
use colored::Colorize;
use inwatch_core::{Event, EventMask};
use serde::Serialize;

/// One event as printed, with the watched path resolved.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub time:   DateTime<Utc>,
    pub wd:     i32,
    /// Watched path joined with the entry name, when both are known.
    pub path:   Option<String>,
    pub name:   Option<String>,
    pub events: Vec<&'static str>,
    pub mask:   u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub cookie: u32,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl EventRecord {
    pub fn new(event: &Event, watched: Option<&Path>) -> Self {
        let path = watched.map(|dir| match event.name() {
            Some(name) => dir.join(name).to_string_lossy().into_owned(),
            None => dir.to_string_lossy().into_owned(),
        });

        Self {
            time: Utc::now(),
            wd: event.watch_ref(),
            path,
            name: event.name().map(|name| name.to_string_lossy().into_owned()),
            events: event.mask().flag_names(),
            mask: event.mask().bits(),
            cookie: event.cookie(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_text(&self, use_colors: bool) -> String {
        let target = self.path.clone().unwrap_or_else(|| format!("<wd {}>", self.wd));
        let names = self
            .events
            .iter()
            .map(|name| paint(name, use_colors))
            .collect::<Vec<_>>()
            .join("|");

        let mut line = format!("{}  {:<8}  {}", self.time.format("%H:%M:%S%.3f"), names, target);
        if self.cookie != 0 {
            line.push_str(&format!("  cookie={}", self.cookie));
        }
        line
    }
}

fn paint(name: &str, use_colors: bool) -> String {
    if !use_colors {
        return name.to_string();
    }

    let Some(flag) = EventMask::from_name(name) else {
        return name.to_string();
    };

    if flag.intersects(EventMask::CREATE) {
        name.green().to_string()
    } else if flag.intersects(EventMask::DELETE | EventMask::DELETE_SELF) {
        name.red().to_string()
    } else if flag.intersects(EventMask::MOVE | EventMask::MOVE_SELF) {
        name.yellow().to_string()
    } else if flag.intersects(EventMask::IGNORED | EventMask::Q_OVERFLOW | EventMask::UNMOUNT) {
        name.magenta().bold().to_string()
    } else if flag.intersects(EventMask::ISDIR) {
        name.blue().to_string()
    } else {
        name.cyan().to_string()
    }
}
