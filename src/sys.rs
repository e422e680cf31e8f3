//! Safe wrappers for platform-specific unsafe operations.
//!
//! Every `unsafe` block in the codebase lives here. Call sites use the safe
//! public API and never touch `unsafe` directly.

use std::ffi::CString;
use std::io;
use std::path::Path;

/// Create a named pipe (FIFO) at `path` with mode 0644.
///
/// # Safety
/// `mkfifo` is a standard POSIX call; we pass a valid NUL-terminated path
/// and check the return value.
pub fn make_fifo(path: &Path) -> io::Result<()> {
    let c_path = CString::new(path.as_os_str().as_encoded_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains NUL byte"))?;

    // SAFETY: mkfifo is a standard POSIX call; the pointer comes from a valid
    // CString and the return value is checked before use.
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o644) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
