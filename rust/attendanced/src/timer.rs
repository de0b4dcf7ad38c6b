use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Single outstanding inactivity deadline served by one worker thread.
///
/// `arm` replaces the deadline and `cancel` clears it; both bump the
/// generation, so a token handed to the expiry callback can be stale by the
/// time the receiver sees it. Receivers re-check `is_current(token)`.
pub struct InactivityTimer {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

struct Shared {
    state: Mutex<Deadline>,
    wake: Condvar,
}

#[derive(Default)]
struct Deadline {
    due: Option<(Instant, u64)>,
    generation: u64,
    shutdown: bool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Deadline> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl InactivityTimer {
    pub fn start<F>(on_expire: F) -> std::io::Result<Self>
    where
        F: Fn(u64) + Send + 'static,
    {
        let shared = Arc::new(Shared {
            state: Mutex::new(Deadline::default()),
            wake: Condvar::new(),
        });
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("inactivity-timer".to_string())
            .spawn(move || run(&worker_shared, on_expire))?;
        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    pub fn arm(&self, after: Duration) -> u64 {
        let mut state = self.shared.lock();
        state.generation += 1;
        let token = state.generation;
        state.due = Some((Instant::now() + after, token));
        self.shared.wake.notify_one();
        token
    }

    pub fn cancel(&self) {
        let mut state = self.shared.lock();
        state.generation += 1;
        state.due = None;
        self.shared.wake.notify_one();
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.shared.lock().generation == token
    }
}

impl Drop for InactivityTimer {
    fn drop(&mut self) {
        {
            let mut state = self.shared.lock();
            state.shutdown = true;
            state.due = None;
        }
        self.shared.wake.notify_one();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run<F: Fn(u64)>(shared: &Shared, on_expire: F) {
    let mut state = shared.lock();
    loop {
        if state.shutdown {
            return;
        }
        match state.due {
            None => {
                state = shared.wake.wait(state).unwrap_or_else(PoisonError::into_inner);
            }
            Some((at, token)) => {
                let now = Instant::now();
                if now >= at {
                    state.due = None;
                    drop(state);
                    on_expire(token);
                    state = shared.lock();
                } else {
                    state = match shared.wake.wait_timeout(state, at - now) {
                        Ok((guard, _)) => guard,
                        Err(poisoned) => poisoned.into_inner().0,
                    };
                }
            }
        }
    }
}
