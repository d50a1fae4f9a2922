// ============================================================================
// clipscreen-cli/src/output.rs
// ============================================================================
//
// TERMINAL OUTPUT: Sections, status lines and run summaries
//
// Everything the CLI prints for a human goes through here so the styling
// stays consistent. Logging goes to stderr; these functions write to stdout.
//
// AI-ASSISTANT-INFO: Styled summary printing with the console crate

use std::time::Duration;

use clipscreen_core::pipeline::{BatchReport, HealthReport, ProcessingResult};
use clipscreen_core::{format_duration, format_elapsed};
use console::style;

/// Styling constants for terminal output
pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const ERROR_SYMBOL: &str = "✗";
    pub const FLAG_SYMBOL: &str = "⚑";

    pub const SECTION_PREFIX: &str = "===== ";
    pub const SECTION_SUFFIX: &str = " =====";

    pub const STATUS_INDENT: &str = "  ";
    pub const LABEL_WIDTH: usize = 18;
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!(
        "{}",
        style(format!(
            "{}{}{}",
            styling::SECTION_PREFIX,
            title.to_uppercase(),
            styling::SECTION_SUFFIX
        ))
        .cyan()
        .bold()
    );
}

/// Print an aligned "label: value" line, optionally with the value in bold.
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let label = format!("{label}:");
    let value = if highlight {
        style(value).bold().to_string()
    } else {
        value.to_string()
    };
    println!(
        "{}{:<width$} {}",
        styling::STATUS_INDENT,
        label,
        value,
        width = styling::LABEL_WIDTH
    );
}

pub fn print_success(message: &str) {
    println!("{} {}", style(styling::SUCCESS_SYMBOL).green().bold(), message);
}

pub fn print_error(title: &str, message: &str) {
    eprintln!(
        "{} {}: {}",
        style(styling::ERROR_SYMBOL).red().bold(),
        style(title).red().bold(),
        message
    );
}

/// Average processing time over `results`, zero for none.
pub fn average_time(results: &[ProcessingResult]) -> Duration {
    if results.is_empty() {
        return Duration::ZERO;
    }
    let total: Duration = results.iter().map(|r| r.processing_time).sum();
    total / results.len() as u32
}

fn clip_label(result: &ProcessingResult) -> String {
    format!("{} ({})", result.clip_id, result.clip_title)
}

fn print_successful_clip(result: &ProcessingResult) {
    let flag = if result.flagged {
        format!(" {}", style(format!("{} flagged", styling::FLAG_SYMBOL)).yellow().bold())
    } else {
        String::new()
    };
    println!(
        "{}{} {} - {} frames in {}{}",
        styling::STATUS_INDENT,
        style(styling::SUCCESS_SYMBOL).green(),
        clip_label(result),
        result.frames_extracted,
        format_elapsed(result.processing_time),
        flag
    );
}

fn print_failed_clip(result: &ProcessingResult) {
    println!(
        "{}{} {} [{}] {}",
        styling::STATUS_INDENT,
        style(styling::ERROR_SYMBOL).red(),
        clip_label(result),
        result.stage,
        result.error_message.as_deref().unwrap_or("unknown error")
    );
}

/// Prints the outcome of a single clip.
pub fn print_clip_result(result: &ProcessingResult) {
    print_section("Clip Result");
    print_status("Clip", &clip_label(result), true);
    if result.success {
        print_status("Status", &style("succeeded").green().to_string(), false);
    } else {
        print_status("Status", &style(format!("failed while {}", result.stage)).red().to_string(), false);
        if let Some(message) = &result.error_message {
            print_status("Error", message, false);
        }
    }
    print_status("Frames", &result.frames_extracted.to_string(), false);
    for path in &result.frame_paths {
        println!("{}{}{}", styling::STATUS_INDENT, styling::STATUS_INDENT, path.display());
    }
    if !result.moderation.is_empty() {
        let verdict = if result.flagged {
            style("flagged").yellow().bold().to_string()
        } else {
            "clean".to_string()
        };
        print_status("Moderation", &verdict, false);
    }
    if let Some(report) = &result.report_path {
        print_status("Report", &report.display().to_string(), false);
    }
    print_status("Time", &format_elapsed(result.processing_time), false);
}

/// Prints the batch summary: counters, then the successful and failed clips.
pub fn print_batch_summary(report: &BatchReport, total_elapsed: Duration) {
    let stats = report.statistics;

    print_section("Processing Summary");
    print_status("Total clips", &stats.total.to_string(), false);
    print_status("Successful", &style(stats.successful).green().to_string(), false);
    print_status(
        "Failed",
        &if stats.failed > 0 {
            style(stats.failed).red().bold().to_string()
        } else {
            stats.failed.to_string()
        },
        false,
    );
    print_status("Success rate", &format!("{:.1}%", stats.success_rate_rounded()), true);
    print_status("Frames extracted", &report.total_frames().to_string(), false);
    print_status("Average time", &format_elapsed(average_time(&report.results)), false);

    let flagged = report.flagged().count();
    if flagged > 0 {
        print_status("Flagged clips", &style(flagged).yellow().bold().to_string(), false);
    }
    if report.cancelled {
        print_status("Cancelled", &style("yes").yellow().to_string(), false);
    }

    let successful: Vec<&ProcessingResult> = report.successful().collect();
    if !successful.is_empty() {
        print_section("Successful Clips");
        for result in successful {
            print_successful_clip(result);
        }
    }

    let failed: Vec<&ProcessingResult> = report.failed().collect();
    if !failed.is_empty() {
        print_section("Failed Clips");
        for result in failed {
            print_failed_clip(result);
        }
    }

    println!();
    print_status("Total time", &format_duration(total_elapsed.as_secs_f64()), true);
}

/// Prints one line per component.
pub fn print_health(report: &HealthReport) {
    print_section("Health Check");
    for (component, healthy) in report.components() {
        let status = if healthy {
            format!("{} healthy", style(styling::SUCCESS_SYMBOL).green())
        } else {
            format!("{} unhealthy", style(styling::ERROR_SYMBOL).red())
        };
        print_status(component, &status, false);
    }
    println!();
    if report.all_healthy() {
        print_success("All components healthy");
    } else {
        print_error(
            "Unhealthy components",
            &report.unhealthy_components().join(", "),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipscreen_core::pipeline::ClipStage;

    fn result(secs: u64) -> ProcessingResult {
        ProcessingResult {
            clip_id: "c1".to_string(),
            clip_title: "Clip".to_string(),
            success: true,
            stage: ClipStage::Succeeded,
            frame_paths: Vec::new(),
            error_message: None,
            error_kind: None,
            processing_time: Duration::from_secs(secs),
            frames_extracted: 3,
            moderation: Vec::new(),
            flagged: false,
            report_path: None,
        }
    }

    #[test]
    fn average_time_of_nothing_is_zero() {
        assert_eq!(average_time(&[]), Duration::ZERO);
    }

    #[test]
    fn average_time_divides_total() {
        assert_eq!(average_time(&[result(2), result(4)]), Duration::from_secs(3));
    }
}
