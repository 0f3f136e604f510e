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

//! Messages the engine sends to its host, and the channel that carries them.

use crate::benchmark::BenchmarkReport;

/// A message from the engine to the host's display layer.
#[derive(Debug, Clone, PartialEq)]
pub enum HostNotification {
    /// Live frame-rate text, about once per second.
    LiveFps(String),
    /// Countdown text while a benchmark run is active.
    BenchmarkStatus(String),
    /// Final result of a benchmark run, sent once per run.
    BenchmarkReport(BenchmarkReport),
    /// Rendering was abandoned. Sent at most once per surface lifetime.
    FatalError(String),
}

impl HostNotification {
    /// The text a host shows for this notification.
    pub fn display_text(&self) -> String {
        match self {
            HostNotification::LiveFps(text)
            | HostNotification::BenchmarkStatus(text)
            | HostNotification::FatalError(text) => text.clone(),
            HostNotification::BenchmarkReport(report) => report.to_string(),
        }
    }
}

/// Unbounded multi-producer channel of [`HostNotification`]s.
///
/// The render thread and the host timer each hold a [`flume::Sender`]; the host
/// drains [`NotificationBus::drain`] on its own thread.
#[derive(Debug)]
pub struct NotificationBus {
    sender: flume::Sender<HostNotification>,
    receiver: flume::Receiver<HostNotification>,
}

impl NotificationBus {
    /// Creates a bus with an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!("Notification bus initialized.");
        Self { sender, receiver }
    }

    /// Sends a notification, logging if the receiver is gone.
    ///
    /// ## Arguments
    /// * `notification` - The message to deliver.
    pub fn publish(&self, notification: HostNotification) {
        log::trace!("Publishing {notification:?}");
        if let Err(e) = self.sender.send(notification) {
            log::error!("Failed to send notification: {e}. Receiver likely disconnected.");
        }
    }

    /// A clone of the sending end, for other threads.
    pub fn sender(&self) -> flume::Sender<HostNotification> {
        self.sender.clone()
    }

    /// The receiving end, for the owner of the bus.
    pub fn receiver(&self) -> &flume::Receiver<HostNotification> {
        &self.receiver
    }

    /// Takes every pending notification without blocking.
    pub fn drain(&self) -> Vec<HostNotification> {
        self.receiver.try_iter().collect()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}
