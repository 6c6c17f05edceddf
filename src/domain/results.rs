use std::path::PathBuf;

use indexmap::{IndexMap, IndexSet};

/// 命令到匹配路径的映射
///
/// 每个命令的路径去重并保持发现顺序，命令之间按首次匹配的顺序排列。
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    entries: IndexMap<String, IndexSet<PathBuf>>,
}

impl MatchRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次匹配，该 (命令, 路径) 首次出现时返回 true
    pub fn add(&mut self, command: &str, path: impl Into<PathBuf>) -> bool {
        self.entries
            .entry(command.to_string())
            .or_default()
            .insert(path.into())
    }

    pub fn has_match(&self, command: &str) -> bool {
        self.entries.get(command).map_or(false, |paths| !paths.is_empty())
    }

    /// 所有不同的命令是否都至少有一个匹配
    pub fn is_fully_satisfied(&self, total_commands: usize) -> bool {
        self.entries.len() >= total_commands
    }

    /// 没有任何匹配的命令，保持查询顺序
    pub fn unsatisfied<'a>(&self, commands: &'a [String]) -> Vec<&'a str> {
        commands
            .iter()
            .filter(|command| !self.has_match(command))
            .map(String::as_str)
            .collect()
    }

    pub fn matches_for(&self, command: &str) -> Option<&IndexSet<PathBuf>> {
        self.entries.get(command)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<PathBuf>)> {
        self.entries
            .iter()
            .map(|(command, paths)| (command.as_str(), paths))
    }

    /// 有匹配的命令数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 所有命令的匹配路径总数
    pub fn total_matches(&self) -> usize {
        self.entries.values().map(IndexSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_add_is_idempotent() {
        let mut record = MatchRecord::new();

        assert!(record.add("ls", "/bin/ls"));
        assert!(!record.add("ls", "/bin/ls"));
        assert_eq!(record.matches_for("ls").map(IndexSet::len), Some(1));

        assert!(record.add("ls", "/usr/bin/ls"));
        assert_eq!(record.total_matches(), 2);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut record = MatchRecord::new();
        record.add("b", "/z/b");
        record.add("a", "/y/a");
        record.add("b", "/a/b");

        let commands: Vec<&str> = record.iter().map(|(command, _)| command).collect();
        assert_eq!(commands, vec!["b", "a"]);

        let paths: Vec<&Path> = record.matches_for("b").unwrap().iter().map(PathBuf::as_path).collect();
        assert_eq!(paths, vec![Path::new("/z/b"), Path::new("/a/b")]);
    }

    #[test]
    fn test_satisfaction() {
        let commands = vec!["a".to_string(), "b".to_string()];
        let mut record = MatchRecord::new();

        assert!(!record.has_match("a"));
        assert!(!record.is_fully_satisfied(commands.len()));
        assert_eq!(record.unsatisfied(&commands), vec!["a", "b"]);

        record.add("a", "/bin/a");
        assert!(record.has_match("a"));
        assert!(!record.is_fully_satisfied(commands.len()));
        assert_eq!(record.unsatisfied(&commands), vec!["b"]);

        record.add("b", "/bin/b");
        assert!(record.is_fully_satisfied(commands.len()));
        assert!(record.unsatisfied(&commands).is_empty());
    }

    #[test]
    fn test_commands_are_case_sensitive_keys() {
        let mut record = MatchRecord::new();
        record.add("LS", "/bin/ls");

        assert!(record.has_match("LS"));
        assert!(!record.has_match("ls"));
    }
}
