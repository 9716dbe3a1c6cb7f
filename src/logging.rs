use std::fs::OpenOptions;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const MAX_LOG_FILE_BYTES: u64 = 10 * 1024 * 1024;

pub fn init_logging(log_level: Level, log_file: Option<&str>) {
    let level_filter = LevelFilter::from_level(log_level);
    let stdout_layer = tracing_subscriber::fmt::layer().with_writer(io::stdout);

    if let Some(path) = log_file {
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(CappedFile::maker(PathBuf::from(path), MAX_LOG_FILE_BYTES));
        tracing_subscriber::registry()
            .with(stdout_layer.with_filter(level_filter))
            .with(file_layer.with_filter(level_filter))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(stdout_layer.with_filter(level_filter))
            .init();
    }
}

/// Append-only log file that, once it reaches `max_len`, is cut down to its
/// newest half before the next write.
struct CappedFile {
    path: PathBuf,
    max_len: u64,
    lock: Arc<Mutex<()>>,
}

impl CappedFile {
    fn maker(path: PathBuf, max_len: u64) -> impl Fn() -> CappedFile {
        let lock = Arc::new(Mutex::new(()));
        move || CappedFile {
            path: path.clone(),
            max_len,
            lock: lock.clone(),
        }
    }

    fn shrink_if_full(&self) -> io::Result<()> {
        let len = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(_) => return Ok(()),
        };
        if len < self.max_len {
            return Ok(());
        }

        let keep = self.max_len / 2;
        let mut tail = Vec::new();
        let mut file = OpenOptions::new().read(true).open(&self.path)?;
        file.seek(SeekFrom::Start(len.saturating_sub(keep)))?;
        file.read_to_end(&mut tail)?;

        std::fs::write(&self.path, &tail)
    }
}

impl Write for CappedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // A poisoned lock only means another writer panicked mid-write
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.shrink_if_full()?;

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capped_file_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxy.log");
        let make = CappedFile::maker(path.clone(), 1024);

        make().write_all(b"first\n").unwrap();
        make().write_all(b"second\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_capped_file_keeps_newest_half() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxy.log");
        let make = CappedFile::maker(path.clone(), 16);

        make().write_all(b"0123456789abcdef").unwrap();
        make().write_all(b"XY").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "89abcdefXY");
    }
}
