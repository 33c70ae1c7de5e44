//! Where a backend's native progress output goes during a solve.
//!
//! Solver libraries print straight to the process standard output. With a file
//! sink, [`OutputCapture`] points descriptor 1 at the file for as long as the
//! guard lives and puts the previous descriptor back when it is dropped.

use log::debug;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogSink {
    /// Backends run with console output disabled.
    #[default]
    Discard,
    /// Native output is appended to this file.
    File(PathBuf),
}

impl LogSink {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        LogSink::File(path.into())
    }

    /// Whether backends should turn their console output on.
    pub fn captures(&self) -> bool {
        matches!(self, LogSink::File(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            LogSink::File(path) => Some(path),
            LogSink::Discard => None,
        }
    }

    /// Acquire the sink. Directory and file creation happen here so that a bad
    /// path fails before any solver runs.
    pub fn capture(&self) -> io::Result<OutputCapture> {
        match self {
            LogSink::Discard => Ok(OutputCapture { redirect: None }),
            LogSink::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                let redirect = Redirect::start(file)?;
                debug!("Capturing solver output into {}", path.display());
                Ok(OutputCapture {
                    redirect: Some(redirect),
                })
            }
        }
    }
}

/// Scope guard returned by [`LogSink::capture`].
#[must_use = "output is only captured while the guard is alive"]
pub struct OutputCapture {
    redirect: Option<Redirect>,
}

impl OutputCapture {
    pub fn is_active(&self) -> bool {
        self.redirect.is_some()
    }
}

impl Drop for OutputCapture {
    fn drop(&mut self) {
        if let Some(redirect) = self.redirect.take() {
            redirect.finish();
        }
    }
}

#[cfg(unix)]
struct Redirect {
    saved: libc::c_int,
    _file: File,
}

#[cfg(unix)]
impl Redirect {
    fn start(file: File) -> io::Result<Self> {
        use std::os::unix::io::AsRawFd;

        io::stdout().flush()?;
        flush_c_streams();
        // SAFETY: dup/dup2 on descriptors we own or that the process always has open.
        let saved = unsafe { libc::dup(libc::STDOUT_FILENO) };
        if saved < 0 {
            return Err(io::Error::last_os_error());
        }
        if unsafe { libc::dup2(file.as_raw_fd(), libc::STDOUT_FILENO) } < 0 {
            let err = io::Error::last_os_error();
            unsafe { libc::close(saved) };
            return Err(err);
        }
        Ok(Redirect { saved, _file: file })
    }

    fn finish(self) {
        let _ = io::stdout().flush();
        flush_c_streams();
        if let Err(e) = restore_stdout(self.saved) {
            log::error!("Failed to restore standard output after solver capture: {}", e);
        }
    }
}

/// Point descriptor 1 back at `saved` and close `saved`.
#[cfg(unix)]
fn restore_stdout(saved: libc::c_int) -> io::Result<()> {
    // SAFETY: `saved` came from dup in `Redirect::start` and is closed exactly once.
    let restored = unsafe { libc::dup2(saved, libc::STDOUT_FILENO) };
    let result = if restored < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    };
    unsafe { libc::close(saved) };
    result
}

#[cfg(unix)]
fn flush_c_streams() {
    // Solver libraries write through C stdio; its buffers must drain before the
    // descriptor changes underneath them.
    unsafe {
        libc::fflush(std::ptr::null_mut());
    }
}

#[cfg(not(unix))]
struct Redirect {
    _file: File,
}

#[cfg(not(unix))]
impl Redirect {
    fn start(file: File) -> io::Result<Self> {
        log::warn!("Solver output capture is only supported on unix; output stays on the console");
        Ok(Redirect { _file: file })
    }

    fn finish(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_stdout(text: &str) {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes()).unwrap();
        out.flush().unwrap();
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_restore_reports_a_bad_descriptor() {
        let err = restore_stdout(-1).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EBADF));
    }

    #[test]
    fn test_discard_sink_does_not_capture() {
        let guard = LogSink::Discard.capture().unwrap();
        assert!(!guard.is_active());
        assert!(!LogSink::Discard.captures());
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_file_sink_captures_only_inside_scope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("solver.log");
        let sink = LogSink::file(&path);
        {
            let guard = sink.capture().unwrap();
            assert!(guard.is_active());
            write_stdout("inside-scope\n");
        }
        write_stdout("after-scope\n");
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("inside-scope"));
        assert!(!contents.contains("after-scope"));
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_file_sink_restores_stdout_when_scope_unwinds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panic.log");
        let sink = LogSink::file(&path);
        let result = std::panic::catch_unwind(|| {
            let _guard = sink.capture().unwrap();
            write_stdout("before-panic\n");
            panic!("backend failure");
        });
        assert!(result.is_err());
        write_stdout("after-panic\n");
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("before-panic"));
        assert!(!contents.contains("after-panic"));
    }

    #[test]
    fn test_unwritable_sink_fails_before_capture() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let sink = LogSink::file(blocker.join("solver.log"));
        assert!(sink.capture().is_err());
    }
}
