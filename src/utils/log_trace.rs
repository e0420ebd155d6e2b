//! カテゴリ付きトレースログ
//! 永続化まわりのイベントとエラーを記録し、後から確認できるようにする

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const MAX_LOG_ENTRIES: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String, // "debug", "info", "warn", "error"
    pub category: String, // "form-persist", "ui-action" など
    pub message: String,
}

pub struct LogTrace {
    logs: VecDeque<LogEntry>,
}

impl LogTrace {
    pub fn new() -> Self {
        LogTrace {
            logs: VecDeque::with_capacity(MAX_LOG_ENTRIES),
        }
    }

    pub fn log(&mut self, level: &str, category: &str, message: &str) {
        console_output(level, category, message);

        if self.logs.len() >= MAX_LOG_ENTRIES {
            self.logs.pop_front();
        }
        self.logs.push_back(LogEntry {
            timestamp: now_iso(),
            level: level.to_string(),
            category: category.to_string(),
            message: message.to_string(),
        });
    }

    pub fn get_logs(&self) -> Vec<LogEntry> {
        self.logs.iter().cloned().collect()
    }

    pub fn get_logs_json(&self) -> String {
        serde_json::to_string_pretty(&self.get_logs()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn clear(&mut self) {
        self.logs.clear();
    }
}

#[cfg(target_arch = "wasm32")]
fn now_iso() -> String {
    js_sys::Date::new_0()
        .to_iso_string()
        .as_string()
        .unwrap_or_default()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_iso() -> String {
    String::new()
}

#[cfg(target_arch = "wasm32")]
fn console_output(level: &str, category: &str, message: &str) {
    let line = format!("[{}] {}", category, message);
    match level {
        "error" => web_sys::console::error_1(&line.into()),
        "warn" => web_sys::console::warn_1(&line.into()),
        _ => web_sys::console::log_1(&line.into()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn console_output(level: &str, category: &str, message: &str) {
    eprintln!("[{}] [{}] {}", level, category, message);
}

thread_local! {
    static LOG_TRACE: std::cell::RefCell<LogTrace> = std::cell::RefCell::new(LogTrace::new());
}

pub fn log_debug(category: &str, message: &str) {
    LOG_TRACE.with(|trace| trace.borrow_mut().log("debug", category, message));
}

pub fn log_info(category: &str, message: &str) {
    LOG_TRACE.with(|trace| trace.borrow_mut().log("info", category, message));
}

pub fn log_warn(category: &str, message: &str) {
    LOG_TRACE.with(|trace| trace.borrow_mut().log("warn", category, message));
}

pub fn log_error(category: &str, message: &str) {
    LOG_TRACE.with(|trace| trace.borrow_mut().log("error", category, message));
}

pub fn get_logs_json() -> String {
    LOG_TRACE.with(|trace| trace.borrow().get_logs_json())
}

pub fn clear_logs() {
    LOG_TRACE.with(|trace| trace.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_caps_entries() {
        let mut trace = LogTrace::new();
        for i in 0..(MAX_LOG_ENTRIES + 10) {
            trace.log("info", "test", &format!("entry {}", i));
        }
        let logs = trace.get_logs();
        assert_eq!(logs.len(), MAX_LOG_ENTRIES);
        // 古いエントリから押し出される
        assert_eq!(logs[0].message, "entry 10");
    }

    #[test]
    fn test_get_logs_json_is_valid_json() {
        let mut trace = LogTrace::new();
        trace.log("error", "form-persist", "保存失敗");
        let parsed: Vec<LogEntry> = serde_json::from_str(&trace.get_logs_json()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].level, "error");
        assert_eq!(parsed[0].category, "form-persist");
    }

    #[test]
    fn test_clear_empties_buffer() {
        let mut trace = LogTrace::new();
        trace.log("info", "test", "a");
        trace.clear();
        assert!(trace.get_logs().is_empty());
    }
}
