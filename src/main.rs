use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use find_command::application::{Config, Locator, SearchOptions, SearchPlan};
use find_command::domain::OsFileSystem;
use find_command::infrastructure::{ErrorLogger, ErrorType, LoggedFileSystem, Logger, LoggerTrait};
use find_command::presentation::{print_match_record, ConsoleReporter};

/// 在搜索路径中查找可执行文件
#[derive(Parser, Debug)]
#[clap(author, about, long_about = None, disable_version_flag = true)]
struct Args {
    /// 要查找的命令名
    commands: Vec<String>,

    /// 显示每个命令的全部匹配
    #[clap(short = 'a')]
    all: bool,

    /// 同时递归搜索 Program Files 等安装目录
    #[clap(short = 'p')]
    program_files: bool,

    /// 打印程序名和版本后退出
    #[clap(short = 'v')]
    version: bool,

    /// 启用详细日志记录，日志文件保存到当前目录
    #[clap(long)]
    log: bool,

    /// 配置文件路径 (默认为程序目录下的 config.toml)
    #[clap(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// 在程序目录下生成默认配置文件后退出
    #[clap(long)]
    init_config: bool,

    /// 并行搜索递归目录
    #[clap(long)]
    parallel: bool,

    /// 不打印最后的完整结果
    #[clap(short, long)]
    quiet: bool,
}

/// 当前程序名
fn program_name() -> String {
    env::args_os()
        .next()
        .and_then(|arg0| Path::new(&arg0).file_name().map(|name| name.to_string_lossy().into_owned()))
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

/// 用法说明，无参数运行时写到标准错误
fn usage() -> String {
    Args::command().render_help().to_string()
}

fn run(args: Args) -> Result<ExitCode> {
    let program = program_name();

    if args.version {
        println!("{} {}", program, env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    if args.init_config {
        let config_path = Config::default_config_path()?;
        Config::load_or_create(&config_path)?;
        println!("配置文件: {}", config_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    if args.commands.is_empty() {
        eprint!("{}", usage());
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::load(args.config.as_deref())?;

    // 初始化日志记录器
    let logger = Logger::new(args.log)?;
    let error_logger = ErrorLogger::new(args.log)?;

    let exe_dir = if config.search.include_exe_dir {
        match SearchPlan::exe_dir() {
            Ok(dir) => Some(dir),
            Err(err) => {
                error_logger.log_error(
                    ErrorType::CurrentExe,
                    None,
                    "无法确定程序所在目录，跳过该目录",
                    Some(&err.to_string()),
                )?;
                None
            }
        }
    } else {
        None
    };

    let plan = SearchPlan::from_env(&config.search, args.program_files, exe_dir);
    let options = SearchOptions {
        show_all: args.all,
        parallel: args.parallel,
    };

    if logger.is_enabled() {
        logger.log_message(&format!("查找命令: {}", args.commands.join(" ")))?;
        logger.log_message(&format!("显示全部匹配: {}", options.show_all))?;
        logger.log_message(&format!("并行搜索: {}", options.parallel))?;
        logger.log_message(&format!(
            "可识别扩展名: {}",
            plan.extensions.iter().collect::<Vec<_>>().join(" ")
        ))?;
    }

    let fs = LoggedFileSystem::new(&OsFileSystem, &error_logger);
    let locator = Locator::new(&fs, &logger);
    let mut reporter = ConsoleReporter::new(program, config.display.show_progress);

    let start_time = Instant::now();
    let outcome = locator.locate(&args.commands, &plan, options, &mut reporter);
    reporter.finish();

    if config.display.print_summary && !args.quiet {
        print_match_record(&outcome.matches)?;
    }

    logger.finalize(
        args.commands.len(),
        outcome.matches.len(),
        outcome.matches.total_matches(),
        start_time.elapsed(),
    )?;
    error_logger.finalize()?;
    error_logger.print_error_summary();

    if outcome.unmatched.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("错误: {:#}", err);
            ExitCode::from(2)
        }
    }
}
