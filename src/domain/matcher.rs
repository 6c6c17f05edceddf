use std::path::{is_separator, Path, PathBuf};

use indexmap::IndexSet;

/// 内置的可执行文件扩展名
pub const DEFAULT_EXTENSIONS: [&str; 4] = [".com", ".exe", ".bat", ".cmd"];

/// 可识别的可执行文件扩展名集合（统一为小写，保持插入顺序）
///
/// 空字符串表示"没有扩展名"，用于匹配不带后缀的可执行文件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedExtensions {
    extensions: IndexSet<String>,
}

impl RecognizedExtensions {
    /// 创建扩展名集合
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self {
            extensions: IndexSet::new(),
        };
        set.extend(extensions);
        set
    }

    /// 添加扩展名，已存在时返回 false
    pub fn insert(&mut self, extension: &str) -> bool {
        self.extensions.insert(extension.to_lowercase())
    }

    pub fn contains(&self, extension: &str) -> bool {
        self.extensions.contains(&extension.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl Default for RecognizedExtensions {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

impl<S: AsRef<str>> Extend<S> for RecognizedExtensions {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for extension in iter {
            self.insert(extension.as_ref());
        }
    }
}

/// 取文件名的扩展名（包含点）
///
/// 从最后一个路径分隔符之后的最后一个 `.` 开始截取：
/// `"a.b.exe"` 得到 `".exe"`，`".profile"` 得到 `".profile"`，`"ls"` 没有扩展名。
pub fn extension_of(name: &str) -> Option<&str> {
    let file_name = name.rsplit(is_separator).next().unwrap_or(name);
    file_name.rfind('.').map(|idx| &file_name[idx..])
}

/// 命令本身是否带扩展名
pub fn has_extension(command: &str) -> bool {
    extension_of(command).is_some()
}

/// 判断候选文件名是否满足查询的命令（不区分大小写）
///
/// 命令带扩展名时要求完全相同；否则候选的扩展名必须可识别，
/// 且等于命令名加上该扩展名。
pub fn matches(command: &str, candidate: &str, extensions: &RecognizedExtensions) -> bool {
    let candidate = candidate.to_lowercase();
    let command = command.to_lowercase();

    if has_extension(&command) {
        return candidate == command;
    }

    let extension = extension_of(&candidate).unwrap_or("");
    extensions.contains(extension) && candidate == format!("{}{}", command, extension)
}

/// 在平铺目录中直接探测的候选路径，按扩展名集合的顺序
pub fn probe_candidates(
    dir: &Path,
    command: &str,
    extensions: &RecognizedExtensions,
) -> Vec<PathBuf> {
    if has_extension(command) {
        return vec![dir.join(command)];
    }

    extensions
        .iter()
        .map(|extension| dir.join(format!("{}{}", command, extension)))
        .collect()
}
