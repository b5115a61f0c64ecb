use std::{
    fs::File,
    io::{self, BufWriter, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

/// A backing stream of a [`Sink`](crate::Sink). Receives fully formatted lines.
pub trait LogWriter: Send {
    fn regular(&mut self, line: &str) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

/// Appends lines to a file. Each line is on disk when `regular` returns.
pub struct LogFile {
    path: PathBuf,
    file: BufWriter<File>,
}

impl LogFile {
    /// Opens `path` for appending, creating it if needed.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let mut file = File::options()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        file.seek(SeekFrom::End(0))?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            file: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogWriter for LogFile {
    fn regular(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.file, "{line}")?;
        self.file.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Drop for LogFile {
    fn drop(&mut self) {
        self.file.flush().ok();
    }
}

/// Console stream. Every line is flushed right away.
#[derive(Default, Debug)]
pub struct LogStdout;

impl LogWriter for LogStdout {
    fn regular(&mut self, line: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{line}")?;
        stdout.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// In-memory line buffer. Clones share the same lines.
#[derive(Default, Debug, Clone)]
pub struct LogMemory {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All lines joined, each terminated by `\n`.
    pub fn contents(&self) -> String {
        self.lines().iter().map(|line| format!("{line}\n")).collect()
    }

    pub fn clear(&self) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl LogWriter for LogMemory {
    fn regular(&mut self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Adapts any [`Write`] implementor (stderr, a socket, a `Vec<u8>`...) into a line writer.
pub struct LogStream<W: Write + Send> {
    inner: W,
}

impl<W: Write + Send> LogStream<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Send> LogWriter for LogStream<W> {
    fn regular(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.inner, "{line}")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[test]
fn test_log_file() {
    std::fs::remove_file("/tmp/sevlog_test_log_file.log").ok();
    let mut log_file = LogFile::new("/tmp/sevlog_test_log_file.log").unwrap();
    assert_eq!(
        log_file.path(),
        Path::new("/tmp/sevlog_test_log_file.log")
    );
    log_file.regular("Hello, world!").unwrap();
    log_file.regular("rust is awesome !").unwrap();
    assert_eq!(
        std::fs::read_to_string("/tmp/sevlog_test_log_file.log").unwrap(),
        "Hello, world!\nrust is awesome !\n"
    );
}

#[test]
fn test_log_file_lines_on_disk_while_idle() {
    let path = "/tmp/sevlog_test_log_file_idle.log";
    std::fs::remove_file(path).ok();
    let mut log_file = LogFile::new(path).unwrap();
    log_file.regular("first").unwrap();
    log_file.regular("second, then idle").unwrap();
    std::thread::sleep(std::time::Duration::from_millis(200));
    // the writer is still open and nothing else was written
    assert_eq!(
        std::fs::read_to_string(path).unwrap(),
        "first\nsecond, then idle\n"
    );
    drop(log_file);
}

#[test]
fn test_log_file_appends_to_existing() {
    let path = "/tmp/sevlog_test_log_file_append.log";
    std::fs::write(path, "existing\n").unwrap();
    let mut log_file = LogFile::new(path).unwrap();
    log_file.regular("appended").unwrap();
    assert_eq!(
        std::fs::read_to_string(path).unwrap(),
        "existing\nappended\n"
    );
}

#[test]
fn test_log_file_open_failure() {
    let err = LogFile::new("/tmp/sevlog_test_missing_dir/nested/app.log").err();
    assert_eq!(err.map(|e| e.kind()), Some(io::ErrorKind::NotFound));
}

#[test]
fn test_log_memory_shared_between_clones() {
    let memory = LogMemory::new();
    let mut writer = memory.clone();
    writer.regular("a").unwrap();
    writer.regular("b").unwrap();
    assert_eq!(memory.lines(), vec!["a", "b"]);
    assert_eq!(memory.contents(), "a\nb\n");
    memory.clear();
    assert!(memory.lines().is_empty());
}

#[test]
fn test_log_stream() {
    let mut stream = LogStream::new(Vec::new());
    stream.regular("first").unwrap();
    stream.regular("second").unwrap();
    stream.flush().unwrap();
    assert_eq!(stream.into_inner(), b"first\nsecond\n");
}

#[test]
fn test_log_stdout() {
    let mut log_stdout = LogStdout;
    log_stdout.regular("Hello, world!").unwrap();
    log_stdout.flush().unwrap();
}
