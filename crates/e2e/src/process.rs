//! Process-group signalling for spawned runners and apps
//!
//! `npx` and `npm start` are wrappers: the process doing the work is a
//! grandchild. Children are started as leaders of their own process group
//! so the whole tree can be signalled at once.

/// Send SIGTERM to the process group led by `pid`
#[cfg(unix)]
pub(crate) fn terminate_group(pid: u32) -> bool {
    signal_group(pid, nix::sys::signal::Signal::SIGTERM)
}

/// Send SIGKILL to the process group led by `pid`
#[cfg(unix)]
pub(crate) fn kill_group(pid: u32) -> bool {
    signal_group(pid, nix::sys::signal::Signal::SIGKILL)
}

#[cfg(unix)]
fn signal_group(pid: u32, signal: nix::sys::signal::Signal) -> bool {
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    match killpg(Pid::from_raw(pid as i32), signal) {
        Ok(()) => true,
        Err(e) => {
            // ESRCH: the group is already gone
            if e != nix::errno::Errno::ESRCH {
                tracing::warn!("Failed to send {:?} to group {}: {}", signal, pid, e);
            }
            false
        }
    }
}

#[cfg(not(unix))]
pub(crate) fn terminate_group(_pid: u32) -> bool {
    false
}

#[cfg(not(unix))]
pub(crate) fn kill_group(_pid: u32) -> bool {
    false
}
