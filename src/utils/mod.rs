//! ユーティリティモジュール

pub mod log_trace;
