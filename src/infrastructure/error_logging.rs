use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Local;

use crate::domain::{ChildEntry, EntryMeta, FileSystem};

/// 错误类型分类
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// 获取文件元数据失败
    Metadata,
    /// 读取目录失败
    ReadDir,
    /// 无法确定程序所在目录
    CurrentExe,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Metadata => "元数据读取",
            ErrorType::ReadDir => "目录读取",
            ErrorType::CurrentExe => "程序路径",
        }
    }
}

/// 错误日志记录器
///
/// 文件系统探测错误不会中断查找，只在这里计数和记录。
pub struct ErrorLogger {
    error_file: Arc<Mutex<Option<File>>>,
    error_path: PathBuf,
    enabled: bool,
    error_counts: Arc<Mutex<HashMap<ErrorType, usize>>>,
}

impl ErrorLogger {
    /// 创建新的错误日志记录器，日志文件写在当前目录
    pub fn new(enabled: bool) -> Result<Self> {
        Self::in_dir(enabled, Path::new("."))
    }

    /// 在指定目录下创建错误日志记录器
    pub fn in_dir(enabled: bool, dir: &Path) -> Result<Self> {
        if !enabled {
            return Ok(Self {
                error_file: Arc::new(Mutex::new(None)),
                error_path: PathBuf::new(),
                enabled: false,
                error_counts: Arc::new(Mutex::new(HashMap::new())),
            });
        }

        let now = Local::now();
        let timestamp = now.format("%Y%m%d_%H%M%S");

        let error_path = dir.join(format!("findcommand_error_{}.log", timestamp));

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(true)
            .open(&error_path)
            .with_context(|| format!("无法创建错误日志文件: {}", error_path.display()))?;

        // 写入UTF-8 BOM以确保文件被正确识别为UTF-8
        let mut file_clone = file.try_clone()?;
        file_clone.write_all(&[0xEF, 0xBB, 0xBF])?;

        writeln!(file_clone, "# FindCommand 错误日志")?;
        writeln!(file_clone, "# 开始时间: {}", now.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(file_clone, "# ============================================")?;
        writeln!(file_clone)?;

        Ok(Self {
            error_file: Arc::new(Mutex::new(Some(file))),
            error_path,
            enabled: true,
            error_counts: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// 记录错误
    pub fn log_error(
        &self,
        error_type: ErrorType,
        file_path: Option<&Path>,
        message: &str,
        details: Option<&str>,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

        if let Ok(mut counts) = self.error_counts.lock() {
            *counts.entry(error_type.clone()).or_insert(0) += 1;
        }

        if let Ok(mut file_guard) = self.error_file.lock() {
            if let Some(ref mut file) = *file_guard {
                writeln!(file, "[{}] {} - {}", timestamp, error_type.as_str(), message)?;

                if let Some(path) = file_path {
                    writeln!(file, "  路径: {}", path.display())?;
                }

                if let Some(detail) = details {
                    writeln!(file, "  详细信息: {}", detail)?;
                }

                writeln!(file)?;
                file.flush()?;
            }
        }

        Ok(())
    }

    /// 获取错误统计信息
    pub fn get_error_summary(&self) -> HashMap<ErrorType, usize> {
        self.error_counts
            .lock()
            .map(|counts| counts.clone())
            .unwrap_or_default()
    }

    /// 获取总错误数
    pub fn get_total_errors(&self) -> usize {
        self.error_counts
            .lock()
            .map(|counts| counts.values().sum())
            .unwrap_or(0)
    }

    pub fn has_errors(&self) -> bool {
        self.get_total_errors() > 0
    }

    pub fn error_path(&self) -> &Path {
        &self.error_path
    }

    /// 完成错误日志记录
    pub fn finalize(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if let Ok(mut file_guard) = self.error_file.lock() {
            if let Some(ref mut file) = *file_guard {
                writeln!(file, "# ============================================")?;
                writeln!(file, "# 结束时间: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;

                let summary = self.get_error_summary();
                if summary.is_empty() {
                    writeln!(file, "# 无错误记录")?;
                } else {
                    writeln!(file, "# 错误统计:")?;
                    for (error_type, count) in &summary {
                        writeln!(file, "#   {}: {} 次", error_type.as_str(), count)?;
                    }
                    writeln!(file, "#   总计: {} 个错误", self.get_total_errors())?;
                }

                file.flush()?;
            }
        }

        Ok(())
    }

    /// 打印错误摘要到标准错误
    pub fn print_error_summary(&self) {
        if !self.has_errors() {
            return;
        }

        eprintln!("\n⚠️  查找过程中发生文件系统错误:");
        eprintln!("----------------------------");

        for (error_type, count) in &self.get_error_summary() {
            eprintln!("  {}: {} 次", error_type.as_str(), count);
        }

        eprintln!("  总计: {} 个错误", self.get_total_errors());
        eprintln!("  详细错误信息请查看: {}", self.error_path.display());
    }
}

/// 记录探测错误的文件系统包装
///
/// 不存在的路径是正常的探测结果，不计为错误。
pub struct LoggedFileSystem<'a> {
    inner: &'a dyn FileSystem,
    errors: &'a ErrorLogger,
}

impl<'a> LoggedFileSystem<'a> {
    pub fn new(inner: &'a dyn FileSystem, errors: &'a ErrorLogger) -> Self {
        Self { inner, errors }
    }

    fn record<T>(&self, error_type: ErrorType, path: &Path, result: io::Result<T>) -> io::Result<T> {
        if let Err(err) = &result {
            if err.kind() != io::ErrorKind::NotFound {
                let _ = self.errors.log_error(
                    error_type,
                    Some(path),
                    "文件系统探测失败，已跳过",
                    Some(&err.to_string()),
                );
            }
        }
        result
    }
}

impl FileSystem for LoggedFileSystem<'_> {
    fn metadata(&self, path: &Path) -> io::Result<EntryMeta> {
        self.record(ErrorType::Metadata, path, self.inner.metadata(path))
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<EntryMeta> {
        self.record(ErrorType::Metadata, path, self.inner.symlink_metadata(path))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<ChildEntry>> {
        self.record(ErrorType::ReadDir, path, self.inner.read_dir(path))
    }
}
