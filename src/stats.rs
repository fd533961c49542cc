//! 변환 통계 모듈
//!
//! 워커가 돌려준 `ConvertResult`를 모아 요약을 출력합니다.

use colored::Colorize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::processor::ConvertResult;

/// 변환 통계
#[derive(Debug)]
pub struct Statistics {
    /// 변환 대상 파일 수
    pub total_files: usize,
    /// 이미 JPEG가 있어 건너뛴 수
    pub skipped: usize,
    converted: AtomicUsize,
    failed: AtomicUsize,
    bytes_read: AtomicU64,
    bytes_written: AtomicU64,
    started: Instant,
}

impl Statistics {
    pub fn new(total_files: usize, skipped: usize) -> Self {
        Self {
            total_files,
            skipped,
            converted: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            bytes_read: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// 변환 결과 하나를 통계에 반영
    pub fn record(&self, result: &ConvertResult) {
        self.bytes_read.fetch_add(result.file_size, Ordering::Relaxed);
        if result.is_success() {
            self.converted.fetch_add(1, Ordering::Relaxed);
            self.bytes_written
                .fetch_add(result.bytes_written, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// (성공, 실패)
    pub fn counts(&self) -> (usize, usize) {
        (
            self.converted.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
        )
    }

    /// (읽은 바이트, 쓴 바이트)
    pub fn bytes(&self) -> (u64, u64) {
        (
            self.bytes_read.load(Ordering::Relaxed),
            self.bytes_written.load(Ordering::Relaxed),
        )
    }

    /// 변환 요약 출력
    pub fn print_summary(&self) {
        let (converted, failed) = self.counts();
        let (read, written) = self.bytes();
        let line = "─".repeat(50).bright_blue();

        println!("\n{}", line);
        println!("{}", " 📊 변환 결과".bright_white().bold());
        println!("{}", line);
        println!(
            "  {} 대상 {} / 건너뜀 {}",
            "📁".bright_cyan(),
            self.total_files,
            self.skipped
        );

        let failed_text = if failed > 0 {
            failed.to_string().red()
        } else {
            "0".green()
        };
        println!(
            "  {} 성공 {} / 실패 {}",
            "🖼️".bright_green(),
            converted.to_string().green(),
            failed_text
        );
        println!(
            "  {} NEF {} → JPEG {}",
            "💾".bright_yellow(),
            format_bytes(read),
            format_bytes(written)
        );
        println!(
            "  {} {}",
            "⏱️".bright_cyan(),
            format_duration(self.started.elapsed())
        );
        println!("{}", line);
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Examples
/// ```
/// use nefconvert::stats::format_bytes;
///
/// assert_eq!(format_bytes(900), "900 B");
/// assert_eq!(format_bytes(25 * 1024 * 1024), "25.0 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}분 {}초", secs / 60, secs % 60)
    } else {
        format!("{:.2}초", duration.as_secs_f64())
    }
}
