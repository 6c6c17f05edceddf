use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::MatchReporter;
use crate::domain::MatchRecord;

/// 终端输出：匹配路径写到标准输出，未找到的提示写到标准错误
pub struct ConsoleReporter {
    program: String,
    show_progress: bool,
    progress: Option<ProgressBar>,
}

impl ConsoleReporter {
    pub fn new(program: impl Into<String>, show_progress: bool) -> Self {
        Self {
            program: program.into(),
            show_progress,
            progress: None,
        }
    }

    /// 结束并清除进度显示
    pub fn finish(&mut self) {
        if let Some(progress) = self.progress.take() {
            progress.finish_and_clear();
        }
    }

    fn spinner(&mut self) -> &ProgressBar {
        self.progress.get_or_insert_with(|| {
            let progress = ProgressBar::new_spinner();
            progress.set_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            progress.enable_steady_tick(Duration::from_millis(100));
            progress
        })
    }
}

impl MatchReporter for ConsoleReporter {
    fn found(&mut self, _command: &str, path: &Path) {
        let print = || {
            let _ = writeln!(io::stdout().lock(), "{}", path.display());
        };

        match &self.progress {
            Some(progress) => progress.suspend(print),
            None => print(),
        }
    }

    fn entering(&mut self, dir: &Path) {
        if self.show_progress {
            self.spinner().set_message(format!("正在搜索 {}", dir.display()));
        }
    }

    fn missing(&mut self, command: &str, searched: &[PathBuf]) {
        self.finish();
        eprintln!(
            "\n{}: 未找到 {:?}，已搜索: {}\n",
            self.program,
            command,
            format_locations(searched)
        );
    }
}

impl Drop for ConsoleReporter {
    fn drop(&mut self) {
        self.finish();
    }
}

/// 以 `[a, b, c]` 的形式列出位置
pub fn format_locations(locations: &[PathBuf]) -> String {
    let joined = locations
        .iter()
        .map(|location| location.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", joined)
}

/// 输出完整的匹配结果
pub fn write_match_record(out: &mut impl Write, record: &MatchRecord) -> Result<()> {
    writeln!(out, "\n查找结果:")?;
    writeln!(out, "----------------------------")?;

    for (command, paths) in record.iter() {
        writeln!(out, "{}:", command)?;
        for path in paths {
            writeln!(out, "  {}", path.display())?;
        }
    }

    Ok(())
}

pub fn print_match_record(record: &MatchRecord) -> Result<()> {
    write_match_record(&mut io::stdout().lock(), record)
}
