//! File descriptor limit detection for capping loader workers (Unix).

/// Estimated FDs per loader worker (the open file plus dir handles).
const FDS_PER_WORKER: usize = 10;

/// Fraction of the process FD limit to use (leave headroom for other code).
const FD_LIMIT_FRACTION: f64 = 0.8;

/// Soft limit for max open file descriptors, or `None` if unavailable
/// (e.g. Windows, or RLIM_INFINITY).
#[cfg(unix)]
fn fd_soft_limit() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut rlim = MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return None;
    }
    let cur = unsafe { rlim.assume_init() }.rlim_cur;
    if cur == libc::RLIM_INFINITY || cur > i64::MAX as u64 {
        return None;
    }
    Some(cur)
}

#[cfg(not(unix))]
fn fd_soft_limit() -> Option<u64> {
    None
}

/// Cap `requested` workers so concurrent loads stay under ~80% of the FD
/// soft limit. With no detectable limit, `requested` passes through.
pub fn cap_workers_by_fd_limit(requested: usize) -> usize {
    match fd_soft_limit() {
        Some(limit) => {
            let usable = (limit as f64 * FD_LIMIT_FRACTION) as usize;
            requested.min((usable / FDS_PER_WORKER).max(1))
        }
        None => requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_never_returns_zero() {
        assert!(cap_workers_by_fd_limit(1) >= 1);
        assert!(cap_workers_by_fd_limit(10_000) >= 1);
    }

    #[test]
    fn cap_never_raises_the_request() {
        assert!(cap_workers_by_fd_limit(4) <= 4);
    }
}
