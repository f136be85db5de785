//! Operating-system process primitives used by the dispatcher.
//!
//! [`ProcessControl`] is the seam between command logic and the kernel. The
//! interpreter only ever talks to this trait, which keeps the dispatch rules testable
//! without forking; [`UnixProcessControl`] is the real implementation on top of `nix`.

use crate::error::ShellError;
use nix::errno::Errno;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, chdir, execvp, fork};
use std::ffi::{CStr, CString};
use std::path::Path;

/// Exit status of a child whose program could not be found.
pub const EXIT_NOT_FOUND: i32 = 127;

/// Exit status of a child whose program was found but could not be executed.
pub const EXIT_NOT_EXECUTABLE: i32 = 126;

/// Process-level operations the shell depends on.
pub trait ProcessControl {
    /// Create a child running `program` with arguments `argv` (`argv[0]` included).
    ///
    /// Returns the child's pid in the parent. The child never returns into shell code:
    /// it either becomes `program` or terminates with a non-zero status.
    fn spawn(&mut self, program: &CStr, argv: &[CString]) -> Result<Pid, ShellError>;

    /// Block until the child `pid` terminates.
    fn wait_for(&mut self, pid: Pid) -> Result<WaitStatus, ShellError>;

    /// Collect every child that has already terminated, without blocking.
    fn reap_exited(&mut self) -> Result<Vec<WaitStatus>, ShellError>;

    /// Change the working directory of the whole process.
    fn change_dir(&mut self, path: &Path) -> Result<(), ShellError>;
}

/// [`ProcessControl`] backed by fork/exec/waitpid/chdir.
#[derive(Debug, Default)]
pub struct UnixProcessControl;

impl ProcessControl for UnixProcessControl {
    fn spawn(&mut self, program: &CStr, argv: &[CString]) -> Result<Pid, ShellError> {
        // SAFETY: the child does nothing but exec, report the failure and _exit.
        match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => Ok(child),
            Ok(ForkResult::Child) => exec_or_exit(program, argv),
            Err(errno) => Err(ShellError::Fork(errno)),
        }
    }

    fn wait_for(&mut self, pid: Pid) -> Result<WaitStatus, ShellError> {
        loop {
            match waitpid(pid, None) {
                Ok(status) => return Ok(status),
                Err(Errno::EINTR) => continue,
                Err(errno) => return Err(ShellError::Wait(errno)),
            }
        }
    }

    fn reap_exited(&mut self) -> Result<Vec<WaitStatus>, ShellError> {
        let mut reaped = Vec::new();
        loop {
            match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => break,
                Ok(status) => reaped.push(status),
                Err(Errno::EINTR) => continue,
                // No children at all.
                Err(Errno::ECHILD) => break,
                Err(errno) => return Err(ShellError::Wait(errno)),
            }
        }
        Ok(reaped)
    }

    fn change_dir(&mut self, path: &Path) -> Result<(), ShellError> {
        chdir(path).map_err(|errno| ShellError::ChangeDir {
            path: path.to_path_buf(),
            errno,
        })
    }
}

/// Runs in the forked child.
fn exec_or_exit(program: &CStr, argv: &[CString]) -> ! {
    let errno = match execvp(program, argv) {
        Ok(never) => match never {},
        Err(errno) => errno,
    };
    write_stderr(&[
        b"lssh: ",
        program.to_bytes(),
        b": ",
        errno.desc().as_bytes(),
        b"\n",
    ]);
    let status = if errno == Errno::ENOENT {
        EXIT_NOT_FOUND
    } else {
        EXIT_NOT_EXECUTABLE
    };
    // SAFETY: _exit skips atexit handlers and stdio flushing that belong to the parent.
    unsafe { libc::_exit(status) }
}

fn write_stderr(parts: &[&[u8]]) {
    for part in parts {
        // SAFETY: pointer and length come from a live slice.
        unsafe {
            libc::write(libc::STDERR_FILENO, part.as_ptr().cast(), part.len());
        }
    }
}

/// Exit code carried by a wait status, if the child terminated.
///
/// Children killed by a signal report `128 + signal`.
pub fn exit_code(status: &WaitStatus) -> Option<i32> {
    match status {
        WaitStatus::Exited(_, code) => Some(*code),
        WaitStatus::Signaled(_, signal, _) => Some(128 + *signal as i32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, OnceLock};
    use std::time::{Duration, Instant};

    // Children of the test process are shared by every test in it.
    fn lock_children() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn cargv(args: &[&str]) -> Vec<CString> {
        args.iter().map(|a| CString::new(*a).unwrap()).collect()
    }

    fn run(args: &[&str]) -> WaitStatus {
        let argv = cargv(args);
        let mut os = UnixProcessControl;
        let pid = os.spawn(&argv[0], &argv).expect("spawn");
        let status = os.wait_for(pid).expect("wait");
        assert_eq!(status.pid(), Some(pid));
        status
    }

    #[test]
    fn test_foreground_child_exit_code() {
        let _lock = lock_children();
        assert_eq!(exit_code(&run(&["true"])), Some(0));
        assert_eq!(exit_code(&run(&["sh", "-c", "exit 3"])), Some(3));
    }

    #[test]
    fn test_missing_program_exits_127() {
        let _lock = lock_children();
        let status = run(&["lssh-definitely-not-a-program"]);
        assert_eq!(exit_code(&status), Some(EXIT_NOT_FOUND));
    }

    #[test]
    fn test_reap_collects_finished_children() {
        let _lock = lock_children();
        let mut os = UnixProcessControl;
        let argv = cargv(&["true"]);
        let mut pids = Vec::new();
        for _ in 0..3 {
            pids.push(os.spawn(&argv[0], &argv).expect("spawn"));
        }

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut reaped = Vec::new();
        while reaped.len() < pids.len() && Instant::now() < deadline {
            let statuses = os.reap_exited().expect("reap");
            reaped.extend(statuses.iter().filter_map(|s| s.pid()));
            std::thread::sleep(Duration::from_millis(20));
        }
        reaped.sort();
        pids.sort();
        assert_eq!(reaped, pids);
        assert!(os.reap_exited().expect("reap").is_empty());
    }

    #[test]
    fn test_reap_does_not_block_on_running_child() {
        let _lock = lock_children();
        let mut os = UnixProcessControl;
        let argv = cargv(&["sleep", "1"]);
        let pid = os.spawn(&argv[0], &argv).expect("spawn");

        let started = Instant::now();
        let reaped = os.reap_exited().expect("reap");
        assert!(started.elapsed() < Duration::from_millis(500));
        assert!(reaped.iter().all(|s| s.pid() != Some(pid)));

        os.wait_for(pid).expect("wait");
    }

    #[test]
    fn test_exit_code_for_signal() {
        let signal = nix::sys::signal::Signal::SIGKILL;
        let status = WaitStatus::Signaled(Pid::from_raw(1), signal, false);
        assert_eq!(exit_code(&status), Some(137));
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::path::PathBuf;

    /// One call made against [`RecordingProcessControl`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Call {
        Spawn(Vec<String>),
        WaitFor(Pid),
        Reap,
        ChangeDir(PathBuf),
    }

    /// In-memory [`ProcessControl`] that records every call instead of touching the
    /// kernel.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingProcessControl {
        pub calls: Vec<Call>,
        pub next_pid: i32,
        pub fork_error: Option<Errno>,
        pub chdir_error: Option<Errno>,
        /// Statuses handed out by the next `reap_exited` calls, one batch per call.
        pub pending_reaps: VecDeque<Vec<WaitStatus>>,
    }

    impl RecordingProcessControl {
        pub(crate) fn spawned(&self) -> Vec<Vec<String>> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Spawn(argv) => Some(argv.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl ProcessControl for RecordingProcessControl {
        fn spawn(&mut self, _program: &CStr, argv: &[CString]) -> Result<Pid, ShellError> {
            if let Some(errno) = self.fork_error {
                return Err(ShellError::Fork(errno));
            }
            self.calls.push(Call::Spawn(
                argv.iter().map(|a| a.to_string_lossy().into_owned()).collect(),
            ));
            self.next_pid += 1;
            Ok(Pid::from_raw(1000 + self.next_pid))
        }

        fn wait_for(&mut self, pid: Pid) -> Result<WaitStatus, ShellError> {
            self.calls.push(Call::WaitFor(pid));
            Ok(WaitStatus::Exited(pid, 0))
        }

        fn reap_exited(&mut self) -> Result<Vec<WaitStatus>, ShellError> {
            self.calls.push(Call::Reap);
            Ok(self.pending_reaps.pop_front().unwrap_or_default())
        }

        fn change_dir(&mut self, path: &Path) -> Result<(), ShellError> {
            self.calls.push(Call::ChangeDir(path.to_path_buf()));
            match self.chdir_error {
                Some(errno) => Err(ShellError::ChangeDir {
                    path: path.to_path_buf(),
                    errno,
                }),
                None => Ok(()),
            }
        }
    }
}
