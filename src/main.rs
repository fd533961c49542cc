//! nefconvert - NEF TO JPEG CONVERTER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use nefconvert::{
    cli::Args,
    config::ConvertConfig,
    dispatcher::{dispatch, ensure_output_dir},
    error::ConvertError,
    processor::ConvertResult,
    selector::select,
    stats::Statistics,
};

fn main() -> Result<()> {
    let args = Args::parse();

    // 워커 수는 여기서 한 번 정하고 아래로 넘김
    let config = ConvertConfig::new();

    // 헤더 출력
    print_header(&args, &config);

    // 출력 폴더 준비 (변환 시작 전)
    ensure_output_dir(&args.output).context("출력 폴더 준비 실패")?;

    // 입력 폴더 확인
    validate_input(&args)?;

    println!("\n{}", "📁 파일 검색 중...".bright_cyan());

    let selection = select(&args.input).context("입력 폴더 검색 실패")?;
    let skipped = selection.skipped();

    println!(
        "  {} 발견된 NEF 파일: {} (건너뜀: {})",
        "📋".bright_white(),
        selection.raw_total.to_string().bright_green(),
        skipped.to_string().yellow()
    );

    if selection.candidates.is_empty() {
        println!("{}", "⚠️ 변환할 NEF 파일이 없습니다.".yellow());
        return Ok(());
    }

    run_conversion(&args, &config, selection.candidates, skipped)
}

/// 입력 경로 유효성 검사
fn validate_input(args: &Args) -> Result<()> {
    if !args.input.exists() {
        return Err(ConvertError::InputNotFound {
            path: args.input.clone(),
        }
        .into());
    }

    if !args.input.is_dir() {
        return Err(ConvertError::NotADirectory {
            path: args.input.clone(),
        }
        .into());
    }

    Ok(())
}

/// 헤더 출력
fn print_header(args: &Args, config: &ConvertConfig) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!("{}", " 🚀 NEF TO JPEG CONVERTER".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 입력 폴더: {:?}", "📂".bright_cyan(), args.input);
    println!("  {} 출력 폴더: {:?}", "📄".bright_green(), args.output);
    println!("  {} 워커 수: {}", "⚙️".bright_yellow(), config.workers);
    println!("  {} 밝기 배율: {}", "☀️".bright_yellow(), config.brightness);
    println!("{}", "═".repeat(50).bright_blue());
}

/// 변환 실행
fn run_conversion(
    args: &Args,
    config: &ConvertConfig,
    candidates: Vec<PathBuf>,
    skipped: usize,
) -> Result<()> {
    let stats = Statistics::new(candidates.len(), skipped);
    let pb = create_progress_bar(candidates.len());

    println!("\n{}", "⚡ 병렬 변환 중...".bright_cyan());

    let results = dispatch(&candidates, &args.output, config, &pb)?;

    pb.finish_with_message("완료!");

    let mut errors: Vec<&ConvertResult> = Vec::new();
    for result in &results {
        stats.record(result);
        if !result.is_success() {
            errors.push(result);
        }
    }

    print_errors(&errors);

    stats.print_summary();

    println!("\n{} 저장 위치: {:?}\n", "✅".bright_green(), args.output);

    Ok(())
}

/// 진행률 바 생성
fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░"),
    );
    pb
}

/// 실패 목록 출력
fn print_errors(errors: &[&ConvertResult]) {
    if errors.is_empty() {
        return;
    }

    println!("\n{}", "❌ 변환 실패 파일:".bright_red());
    for result in errors {
        println!(
            "  {} {:?}",
            "•".red(),
            result.path.file_name().unwrap_or_default()
        );
        if let Some(ref error) = result.error {
            println!("    {}", error.dimmed());
        }
    }
}
