use std::env;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use crate::application::config::SearchConfig;
use crate::domain::RecognizedExtensions;

/// 一次查找要访问的目录和扩展名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
    /// 平铺目录，只探测直接子文件
    pub flat_dirs: Vec<PathBuf>,
    /// 递归目录，完整遍历
    pub recursive_dirs: Vec<PathBuf>,
    pub extensions: RecognizedExtensions,
}

impl SearchPlan {
    /// 根据配置和当前进程环境构建
    pub fn from_env(config: &SearchConfig, include_extra_roots: bool, exe_dir: Option<PathBuf>) -> Self {
        Self::build(config, include_extra_roots, exe_dir, |name| env::var_os(name))
    }

    /// 根据配置构建，环境变量通过 `lookup` 读取
    ///
    /// 平铺目录依次为程序所在目录和搜索路径；递归目录依次为额外根目录（仅
    /// `include_extra_roots` 时）和配置中的 `extra_dirs`。
    pub fn build<F>(
        config: &SearchConfig,
        include_extra_roots: bool,
        exe_dir: Option<PathBuf>,
        lookup: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let mut flat_dirs: Vec<PathBuf> = exe_dir.into_iter().collect();
        flat_dirs.extend(split_dirs(lookup(&config.path_var)));

        let mut recursive_dirs = Vec::new();
        if include_extra_roots {
            for var in &config.extra_root_vars {
                recursive_dirs.extend(split_dirs(lookup(var)));
            }
        }
        recursive_dirs.extend(config.extra_dirs.iter().cloned());

        // 非 Windows 平台上可执行文件通常没有扩展名，优先匹配裸文件名
        let mut extensions = if cfg!(windows) {
            RecognizedExtensions::new(&config.default_extensions)
        } else {
            let mut extensions = RecognizedExtensions::new([""]);
            extensions.extend(&config.default_extensions);
            extensions
        };

        if let Some(value) = lookup(&config.extensions_var) {
            for ext in env::split_paths(&value) {
                extensions.insert(&ext.to_string_lossy());
            }
        }

        Self {
            flat_dirs,
            recursive_dirs,
            extensions,
        }
    }

    /// 程序自身所在的目录
    pub fn exe_dir() -> io::Result<PathBuf> {
        let exe = env::current_exe()?;
        exe.parent()
            .map(|dir| dir.to_path_buf())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "程序路径没有父目录"))
    }

    /// 按搜索顺序列出全部位置
    pub fn searched_locations(&self) -> Vec<PathBuf> {
        self.flat_dirs
            .iter()
            .chain(&self.recursive_dirs)
            .cloned()
            .collect()
    }
}

/// 按平台路径分隔符拆分，丢弃空项
fn split_dirs(value: Option<OsString>) -> Vec<PathBuf> {
    value
        .map(|value| {
            env::split_paths(&value)
                .filter(|dir| !dir.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default()
}
