use std::io;
use std::path::{Path, PathBuf};

use super::filesystem::{EntryMeta, FileSystem};

/// 访问回调返回的遍历信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkSignal {
    /// 继续遍历
    Continue,
    /// 不进入当前目录
    SkipSubtree,
    /// 终止整个遍历
    Abort,
}

/// 显式栈中等待展开的目录
struct Frame {
    path: PathBuf,
    meta: EntryMeta,
}

/// 深度优先遍历目录树，使用显式栈代替递归
///
/// 根路径不存在或不是目录时，只调用一次 `visit` 并直接返回它的信号。
/// 目录子项压栈稍后访问，其他子项立即访问。列目录失败视为没有子项。
/// 遍历被中止时返回 [`WalkSignal::Abort`]，否则返回 [`WalkSignal::Continue`]。
pub fn walk<F>(fs: &dyn FileSystem, root: &Path, mut visit: F) -> WalkSignal
where
    F: FnMut(&Path, io::Result<EntryMeta>) -> WalkSignal,
{
    let meta = match fs.symlink_metadata(root) {
        Ok(meta) if meta.is_dir => meta,
        other => return visit(root, other),
    };

    let mut stack = vec![Frame {
        path: root.to_path_buf(),
        meta,
    }];

    while let Some(frame) = stack.pop() {
        match visit(&frame.path, Ok(frame.meta)) {
            WalkSignal::Abort => return WalkSignal::Abort,
            WalkSignal::SkipSubtree => continue,
            WalkSignal::Continue => {}
        }

        let children = fs.read_dir(&frame.path).unwrap_or_default();

        for child in children {
            if child.meta.is_dir {
                stack.push(Frame {
                    path: child.path,
                    meta: child.meta,
                });
            } else if visit(&child.path, Ok(child.meta)) == WalkSignal::Abort {
                return WalkSignal::Abort;
            }
        }
    }

    WalkSignal::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filesystem::testing::MemoryFileSystem;
    use crate::domain::filesystem::OsFileSystem;
    use tempfile::tempdir;

    fn sample_tree() -> MemoryFileSystem {
        MemoryFileSystem::new()
            .with_file("/root/a.exe")
            .with_file("/root/bin/b.exe")
            .with_file("/root/bin/deep/c.exe")
            .with_file("/root/lib/d.dll")
    }

    #[test]
    fn test_visits_every_entry() {
        let fs = sample_tree();
        let mut visited = Vec::new();

        let signal = walk(&fs, Path::new("/root"), |path, meta| {
            assert!(meta.is_ok());
            visited.push(path.to_path_buf());
            WalkSignal::Continue
        });

        assert_eq!(signal, WalkSignal::Continue);
        // 根目录、3 个子目录、4 个文件
        assert_eq!(visited.len(), 8);
        assert_eq!(visited[0], PathBuf::from("/root"));
        assert!(visited.contains(&PathBuf::from("/root/bin/deep/c.exe")));
    }

    #[test]
    fn test_directories_visited_in_stack_order() {
        let fs = sample_tree();
        let mut dirs = Vec::new();

        walk(&fs, Path::new("/root"), |path, meta| {
            if meta.map_or(false, |m| m.is_dir) {
                dirs.push(path.to_path_buf());
            }
            WalkSignal::Continue
        });

        // bin 先入栈，lib 后入栈，所以 lib 先被访问
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/root"),
                PathBuf::from("/root/lib"),
                PathBuf::from("/root/bin"),
                PathBuf::from("/root/bin/deep"),
            ]
        );
    }

    #[test]
    fn test_skip_subtree() {
        let fs = sample_tree();
        let mut visited = Vec::new();

        walk(&fs, Path::new("/root"), |path, _| {
            visited.push(path.to_path_buf());
            if path == Path::new("/root/bin") {
                WalkSignal::SkipSubtree
            } else {
                WalkSignal::Continue
            }
        });

        assert!(visited.contains(&PathBuf::from("/root/bin")));
        assert!(!visited.contains(&PathBuf::from("/root/bin/b.exe")));
        assert!(!visited.contains(&PathBuf::from("/root/bin/deep")));
        assert!(visited.contains(&PathBuf::from("/root/lib/d.dll")));
        assert!(!fs.listed().contains(&PathBuf::from("/root/bin")));
    }

    #[test]
    fn test_abort_on_file_stops_walk() {
        let fs = sample_tree();
        let mut visited = 0;

        let signal = walk(&fs, Path::new("/root"), |path, _| {
            visited += 1;
            if path == Path::new("/root/a.exe") {
                WalkSignal::Abort
            } else {
                WalkSignal::Continue
            }
        });

        assert_eq!(signal, WalkSignal::Abort);
        // 根目录和 a.exe
        assert_eq!(visited, 2);
        assert_eq!(fs.listed(), vec![PathBuf::from("/root")]);
    }

    #[test]
    fn test_abort_on_root() {
        let fs = sample_tree();
        let signal = walk(&fs, Path::new("/root"), |_, _| WalkSignal::Abort);

        assert_eq!(signal, WalkSignal::Abort);
        assert!(fs.listed().is_empty());
    }

    #[test]
    fn test_missing_root_visited_once_with_error() {
        let fs = sample_tree();
        let mut calls = 0;

        let signal = walk(&fs, Path::new("/nowhere"), |path, meta| {
            calls += 1;
            assert_eq!(path, Path::new("/nowhere"));
            assert_eq!(meta.unwrap_err().kind(), io::ErrorKind::NotFound);
            WalkSignal::SkipSubtree
        });

        assert_eq!(calls, 1);
        assert_eq!(signal, WalkSignal::SkipSubtree);
    }

    #[test]
    fn test_file_root_visited_once() {
        let fs = sample_tree();
        let mut calls = 0;

        let signal = walk(&fs, Path::new("/root/a.exe"), |_, meta| {
            calls += 1;
            assert!(!meta.unwrap().is_dir);
            WalkSignal::Continue
        });

        assert_eq!(calls, 1);
        assert_eq!(signal, WalkSignal::Continue);
        assert!(fs.listed().is_empty());
    }

    #[test]
    fn test_unreadable_directory_yields_no_children() {
        let fs = MemoryFileSystem::new()
            .with_unreadable("/root/locked")
            .with_file("/root/open/tool.exe");
        let mut visited = Vec::new();

        let signal = walk(&fs, Path::new("/root"), |path, _| {
            visited.push(path.to_path_buf());
            WalkSignal::Continue
        });

        assert_eq!(signal, WalkSignal::Continue);
        assert!(visited.contains(&PathBuf::from("/root/locked")));
        assert!(visited.contains(&PathBuf::from("/root/open/tool.exe")));
    }

    #[test]
    fn test_deep_tree_on_disk() {
        let temp_dir = tempdir().unwrap();
        let mut deep = temp_dir.path().to_path_buf();
        for i in 0..64 {
            deep.push(format!("level{}", i));
        }
        std::fs::create_dir_all(&deep).unwrap();
        std::fs::write(deep.join("tool.exe"), b"").unwrap();

        let mut found = None;
        walk(&OsFileSystem, temp_dir.path(), |path, _| {
            if path.file_name().map_or(false, |n| n == "tool.exe") {
                found = Some(path.to_path_buf());
                return WalkSignal::Abort;
            }
            WalkSignal::Continue
        });

        assert_eq!(found, Some(deep.join("tool.exe")));
    }
}
