use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread;

use crossbeam_channel::bounded;

use crate::application::search_plan::SearchPlan;
use crate::domain::matcher::{extension_of, matches, probe_candidates};
use crate::domain::{walk, EntryMeta, FileSystem, MatchRecord, RecognizedExtensions, WalkSignal};
use crate::infrastructure::LoggerTrait;

/// 匹配结果的输出端
pub trait MatchReporter {
    /// 发现新的匹配，按发现顺序调用
    fn found(&mut self, command: &str, path: &Path);

    /// 开始递归搜索某个目录
    fn entering(&mut self, _dir: &Path) {}

    /// 命令在所有位置都没有找到
    fn missing(&mut self, command: &str, searched: &[PathBuf]);
}

/// 查找选项
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    /// 显示每个命令的全部匹配，关闭所有提前结束
    pub show_all: bool,
    /// 并行遍历递归目录
    pub parallel: bool,
}

/// 一次查找的结果
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub matches: MatchRecord,
    /// 按发现顺序报告过的路径
    pub reported: Vec<PathBuf>,
    /// 搜索过的全部位置
    pub searched: Vec<PathBuf>,
    /// 没有找到的命令
    pub unmatched: Vec<String>,
}

/// 并行工作线程发回当前线程的事件
enum WorkerEvent {
    Entering(PathBuf),
    Found(String, PathBuf),
}

/// 递归阶段对单个条目的判断
struct RecursiveVisit<'a> {
    fs: &'a dyn FileSystem,
    commands: &'a [String],
    extensions: &'a RecognizedExtensions,
    show_all: bool,
}

impl RecursiveVisit<'_> {
    fn visit(
        &self,
        path: &Path,
        meta: io::Result<EntryMeta>,
        record: &mut MatchRecord,
        on_match: &mut dyn FnMut(&str, &Path),
    ) -> WalkSignal {
        let meta = match meta {
            Ok(meta) => meta,
            Err(_) => return WalkSignal::SkipSubtree,
        };

        if meta.is_dir {
            return WalkSignal::Continue;
        }

        if let Some(name) = path.file_name().map(|name| name.to_string_lossy()) {
            if self.extensions.contains(extension_of(&name).unwrap_or("")) {
                for command in self.commands {
                    // 目录项不跟随符号链接，指向目录的链接在这里排除
                    if (self.show_all || !record.has_match(command))
                        && matches(command, &name, self.extensions)
                        && self.fs.is_file(path)
                        && record.add(command, path)
                    {
                        on_match(command.as_str(), path);
                    }
                }
            }
        }

        if !self.show_all && record.is_fully_satisfied(self.commands.len()) {
            WalkSignal::Abort
        } else {
            WalkSignal::Continue
        }
    }
}

/// 查找调度：平铺阶段、递归阶段、报告阶段
pub struct Locator<'a> {
    fs: &'a dyn FileSystem,
    logger: &'a dyn LoggerTrait,
}

impl<'a> Locator<'a> {
    pub fn new(fs: &'a dyn FileSystem, logger: &'a dyn LoggerTrait) -> Self {
        Self { fs, logger }
    }

    /// 按计划查找命令，匹配一经发现立即报告
    pub fn locate(
        &self,
        commands: &[String],
        plan: &SearchPlan,
        options: SearchOptions,
        reporter: &mut dyn MatchReporter,
    ) -> SearchOutcome {
        let commands = dedup_commands(commands);
        let mut outcome = SearchOutcome {
            searched: plan.searched_locations(),
            ..SearchOutcome::default()
        };

        self.flat_phase(&commands, plan, options, reporter, &mut outcome);

        if options.show_all || !outcome.matches.is_fully_satisfied(commands.len()) {
            if options.parallel {
                self.recursive_phase_parallel(&commands, plan, options, reporter, &mut outcome);
            } else {
                self.recursive_phase(&commands, plan, options, reporter, &mut outcome);
            }
        } else if self.logger.is_enabled() {
            let _ = self.logger.log_message("所有命令已在平铺目录中找到，跳过递归搜索");
        }

        for command in outcome.matches.unsatisfied(&commands) {
            reporter.missing(command, &outcome.searched);
            outcome.unmatched.push(command.to_string());
        }

        outcome
    }

    fn flat_phase(
        &self,
        commands: &[String],
        plan: &SearchPlan,
        options: SearchOptions,
        reporter: &mut dyn MatchReporter,
        outcome: &mut SearchOutcome,
    ) {
        let needs_search = |record: &MatchRecord, command: &str| options.show_all || !record.has_match(command);

        for dir in &plan.flat_dirs {
            if self.logger.is_enabled() {
                let _ = self.logger.log_dir(dir, "平铺探测");
            }

            for command in commands {
                for candidate in probe_candidates(dir, command, &plan.extensions) {
                    if !needs_search(&outcome.matches, command) {
                        break;
                    }

                    if self.fs.is_file(&candidate) && outcome.matches.add(command, candidate.clone()) {
                        self.record_found(command, &candidate, reporter, outcome);
                    }
                }
            }
        }
    }

    fn recursive_phase(
        &self,
        commands: &[String],
        plan: &SearchPlan,
        options: SearchOptions,
        reporter: &mut dyn MatchReporter,
        outcome: &mut SearchOutcome,
    ) {
        let visitor = RecursiveVisit {
            fs: self.fs,
            commands,
            extensions: &plan.extensions,
            show_all: options.show_all,
        };

        for dir in &plan.recursive_dirs {
            if !options.show_all && outcome.matches.is_fully_satisfied(commands.len()) {
                break;
            }

            if self.logger.is_enabled() {
                let _ = self.logger.log_dir(dir, "递归搜索");
            }
            reporter.entering(dir);

            let mut found = Vec::new();
            let mut on_match = |command: &str, path: &Path| {
                reporter.found(command, path);
                found.push((command.to_string(), path.to_path_buf()));
            };
            let signal = walk(self.fs, dir, |path, meta| {
                visitor.visit(path, meta, &mut outcome.matches, &mut on_match)
            });

            for (command, path) in found {
                self.log_found(&command, &path);
                outcome.reported.push(path);
            }

            if signal == WalkSignal::Abort && self.logger.is_enabled() {
                let _ = self.logger.log_dir(dir, "所有命令已找到，提前结束");
            }
        }
    }

    /// 每个工作线程负责一部分递归目录，共享结果并通过通道把匹配交回当前线程报告
    fn recursive_phase_parallel(
        &self,
        commands: &[String],
        plan: &SearchPlan,
        options: SearchOptions,
        reporter: &mut dyn MatchReporter,
        outcome: &mut SearchOutcome,
    ) {
        if plan.recursive_dirs.is_empty() {
            return;
        }

        let visitor = RecursiveVisit {
            fs: self.fs,
            commands,
            extensions: &plan.extensions,
            show_all: options.show_all,
        };
        let workers = num_cpus::get().clamp(1, plan.recursive_dirs.len());
        let per_worker = plan.recursive_dirs.len().div_ceil(workers);

        let shared = Mutex::new(std::mem::take(&mut outcome.matches));
        let satisfied = AtomicBool::new(false);
        let (tx, rx) = bounded::<WorkerEvent>(100);

        thread::scope(|scope| {
            for chunk in plan.recursive_dirs.chunks(per_worker) {
                let tx = tx.clone();
                let (fs, visitor, shared, satisfied) = (self.fs, &visitor, &shared, &satisfied);

                scope.spawn(move || {
                    for dir in chunk {
                        if satisfied.load(Ordering::Relaxed) {
                            break;
                        }
                        let _ = tx.send(WorkerEvent::Entering(dir.clone()));

                        walk(fs, dir, |path, meta| {
                            if satisfied.load(Ordering::Relaxed) {
                                return WalkSignal::Abort;
                            }

                            let mut record = match shared.lock() {
                                Ok(guard) => guard,
                                Err(poisoned) => poisoned.into_inner(),
                            };
                            let signal = visitor.visit(path, meta, &mut record, &mut |command: &str, found: &Path| {
                                let _ = tx.send(WorkerEvent::Found(command.to_string(), found.to_path_buf()));
                            });

                            if signal == WalkSignal::Abort {
                                satisfied.store(true, Ordering::Relaxed);
                            }
                            signal
                        });
                    }
                });
            }

            // 只保留工作线程中的发送端，全部结束后接收循环退出
            drop(tx);

            for event in rx {
                match event {
                    WorkerEvent::Entering(dir) => {
                        if self.logger.is_enabled() {
                            let _ = self.logger.log_dir(&dir, "递归搜索");
                        }
                        reporter.entering(&dir);
                    }
                    WorkerEvent::Found(command, path) => {
                        reporter.found(&command, &path);
                        self.log_found(&command, &path);
                        outcome.reported.push(path);
                    }
                }
            }
        });

        outcome.matches = match shared.into_inner() {
            Ok(record) => record,
            Err(poisoned) => poisoned.into_inner(),
        };
    }

    fn record_found(&self, command: &str, path: &Path, reporter: &mut dyn MatchReporter, outcome: &mut SearchOutcome) {
        reporter.found(command, path);
        self.log_found(command, path);
        outcome.reported.push(path.to_path_buf());
    }

    fn log_found(&self, command: &str, path: &Path) {
        if self.logger.is_enabled() {
            let _ = self.logger.log_message(&format!("找到 {}: {}", command, path.display()));
        }
    }
}

/// 去掉重复的命令，保留首次出现的位置
fn dedup_commands(commands: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(commands.len());
    for command in commands {
        if !unique.contains(command) {
            unique.push(command.clone());
        }
    }
    unique
}
