use crate::ExecError;

/// Send `signal` to `pid`, unchanged.
pub fn send_signal(pid: u32, signal: i32) -> Result<(), ExecError> {
    let raw = libc::pid_t::try_from(pid)
        .map_err(|_| ExecError::InvalidConfig(format!("pid {pid} out of range")))?;
    // SAFETY: kill(2) only reads its arguments.
    let rc = unsafe { libc::kill(raw, signal) };
    if rc != 0 {
        return Err(ExecError::Signal {
            pid,
            signal,
            source: std::io::Error::last_os_error(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_zero_checks_own_process() {
        send_signal(std::process::id(), 0).unwrap();
    }

    #[test]
    fn missing_process_reports_errno() {
        // pid_max never reaches i32::MAX, so this pid cannot exist.
        match send_signal(i32::MAX as u32, 0) {
            Err(ExecError::Signal { source, .. }) => {
                assert_eq!(source.raw_os_error(), Some(libc::ESRCH))
            }
            other => panic!("expected ESRCH, got {other:?}"),
        }
    }
}
