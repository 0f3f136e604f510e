// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A cancellable timer on its own thread whose callback picks the next delay.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use flume::RecvTimeoutError;

/// Calls a closure on a dedicated thread until cancelled. Each call returns
/// the delay until the next one.
///
/// [`RepeatingTimer::cancel`] joins the thread, so once it returns the
/// callback is guaranteed not to run again.
#[derive(Debug)]
pub struct RepeatingTimer {
    signal: Option<flume::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RepeatingTimer {
    /// Spawns the timer thread.
    ///
    /// ## Arguments
    /// * `name` - Thread name, shown in debuggers and panic messages.
    /// * `first_delay` - Delay before the first callback.
    /// * `callback` - Receives the instant it was fired at and returns the
    ///   delay until the next call.
    pub fn start<F>(name: &str, first_delay: Duration, mut callback: F) -> io::Result<Self>
    where
        F: FnMut(Instant) -> Duration + Send + 'static,
    {
        let (signal, signalled) = flume::bounded::<()>(1);
        let handle = thread::Builder::new().name(name.to_string()).spawn(move || {
            log::debug!("Timer thread started ({} ms)", first_delay.as_millis());
            let mut delay = first_delay;
            loop {
                match signalled.recv_timeout(delay) {
                    Ok(()) | Err(RecvTimeoutError::Timeout) => delay = callback(Instant::now()),
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            log::debug!("Timer thread stopped");
        })?;
        Ok(Self {
            signal: Some(signal),
            handle: Some(handle),
        })
    }

    /// Runs the callback now instead of at the end of the current delay.
    /// A wake already pending is not doubled.
    pub fn wake(&self) {
        if let Some(signal) = &self.signal {
            let _ = signal.try_send(());
        }
    }

    /// Stops the timer and waits for its thread. Idempotent.
    pub fn cancel(&mut self) {
        // Dropping the sender disconnects the channel and wakes the thread.
        self.signal.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Timer thread panicked");
            }
        }
    }

    /// Returns `true` until [`RepeatingTimer::cancel`] has run.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for RepeatingTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
