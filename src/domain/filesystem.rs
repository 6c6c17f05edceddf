use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 查找过程需要的文件元数据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    pub is_dir: bool,
}

/// 目录中的一个子项
#[derive(Debug, Clone)]
pub struct ChildEntry {
    pub path: PathBuf,
    pub meta: EntryMeta,
}

/// 文件系统能力抽象，便于在测试中替换
pub trait FileSystem: Send + Sync {
    /// 获取元数据，跟随符号链接
    fn metadata(&self, path: &Path) -> io::Result<EntryMeta>;

    /// 获取元数据，不跟随符号链接
    fn symlink_metadata(&self, path: &Path) -> io::Result<EntryMeta>;

    /// 列出目录的直接子项
    fn read_dir(&self, path: &Path) -> io::Result<Vec<ChildEntry>>;

    /// 路径存在且不是目录
    fn is_file(&self, path: &Path) -> bool {
        self.metadata(path).map_or(false, |meta| !meta.is_dir)
    }
}

/// 基于 std::fs 的实现
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn metadata(&self, path: &Path) -> io::Result<EntryMeta> {
        let meta = fs::metadata(path)?;
        Ok(EntryMeta { is_dir: meta.is_dir() })
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<EntryMeta> {
        let meta = fs::symlink_metadata(path)?;
        Ok(EntryMeta { is_dir: meta.is_dir() })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<ChildEntry>> {
        let mut children = Vec::new();

        for entry in fs::read_dir(path)? {
            // 单个条目读取失败时跳过它，不影响同目录的其他条目
            let Ok(entry) = entry else { continue };
            let Ok(file_type) = entry.file_type() else { continue };

            children.push(ChildEntry {
                path: entry.path(),
                meta: EntryMeta { is_dir: file_type.is_dir() },
            });
        }

        Ok(children)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_os_is_file() {
        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("tool.exe");
        fs::write(&file, b"").unwrap();

        let fs = OsFileSystem;
        assert!(fs.is_file(&file));
        assert!(!fs.is_file(temp_dir.path()));
        assert!(!fs.is_file(&temp_dir.path().join("missing")));
    }

    #[test]
    fn test_os_read_dir() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"").unwrap();

        let mut children = OsFileSystem.read_dir(temp_dir.path()).unwrap();
        children.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(children.len(), 2);
        assert!(!children[0].meta.is_dir);
        assert!(children[1].meta.is_dir);
    }

    #[test]
    fn test_memory_unreadable() {
        let fs = testing::MemoryFileSystem::new()
            .with_unreadable("/locked")
            .with_file("/open/a.exe");

        assert_eq!(
            fs.read_dir(Path::new("/locked")).unwrap_err().kind(),
            io::ErrorKind::PermissionDenied
        );
        assert_eq!(fs.read_dir(Path::new("/open")).unwrap().len(), 1);
        assert!(fs.is_file(Path::new("/open/a.exe")));
    }
}
