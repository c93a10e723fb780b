//! I/O boundary traits for testability
//!
//! These traits abstract the document filesystem and the player's console,
//! allowing services to be tested with in-memory implementations.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Replace file content so readers see either the old or the new document.
    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Line-oriented channel to the player.
///
/// Reads block until a line is available; writes are fire-and-forget.
pub trait Console {
    /// Next line without its line terminator, `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Write a prompt without a trailing newline.
    fn write(&mut self, text: &str);

    /// Write a full line.
    fn write_line(&mut self, text: &str);
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Console on the process's stdin and stdout.
#[derive(Debug)]
pub struct StdConsole {
    stdin: io::Stdin,
}

impl StdConsole {
    pub fn new() -> Self {
        Self { stdin: io::stdin() }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.stdin.lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn write(&mut self, text: &str) {
        let mut stdout = io::stdout();
        write!(stdout, "{}", text).ok();
        stdout.flush().ok();
    }

    fn write_line(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// In-memory console replaying scripted answers and recording everything written.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    output: String,
}

impl ScriptedConsole {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            output: String::new(),
        }
    }

    /// Everything written so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.answers.pop_front())
    }

    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn write_line(&mut self, text: &str) {
        self.output.push_str(text);
        self.output.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_existing_file_when_writing_atomically_then_content_replaced() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("questions.txt");
        let fs = RealFileSystem;
        fs.write(&path, "A:\nold\n").unwrap();

        fs.write_atomic(&path, "A:\nnew\n").unwrap();

        assert_eq!(fs.read_to_string(&path).unwrap(), "A:\nnew\n");
        let entries = std::fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(entries, 1, "temp file must not be left behind");
    }

    #[test]
    fn given_nested_path_when_ensuring_parent_then_directories_created() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a").join("b").join("questions.txt");

        RealFileSystem.ensure_parent(&path).unwrap();

        assert!(RealFileSystem.is_dir(&temp.path().join("a").join("b")));
        assert!(!RealFileSystem.exists(&path));
    }

    #[test]
    fn given_scripted_answers_when_reading_then_replays_in_order_then_none() {
        let mut console = ScriptedConsole::new(["y", "Dog"]);

        assert_eq!(console.read_line().unwrap().as_deref(), Some("y"));
        assert_eq!(console.remaining(), 1);
        assert_eq!(console.read_line().unwrap().as_deref(), Some("Dog"));
        assert_eq!(console.read_line().unwrap(), None);

        console.write("Q: ");
        console.write_line("done");
        assert_eq!(console.output(), "Q: done\n");
    }
}
