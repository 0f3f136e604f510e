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

//! Operations handed to the render thread.

/// Work that must run on the thread that owns the GPU resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOp {
    /// Release every GPU object of the lane. Queued on pause and teardown.
    ReleaseResources,
}

/// Multi-producer queue drained only by the render thread.
#[derive(Debug)]
pub struct RenderOpQueue {
    sender: flume::Sender<RenderOp>,
    receiver: flume::Receiver<RenderOp>,
}

impl RenderOpQueue {
    /// An empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Queues an operation from the render thread itself.
    pub fn push(&self, op: RenderOp) {
        // The queue owns a receiver, so sending cannot fail.
        let _ = self.sender.send(op);
    }

    /// A sender other threads can queue operations with.
    pub fn sender(&self) -> flume::Sender<RenderOp> {
        self.sender.clone()
    }

    /// Takes every queued operation, oldest first.
    pub fn drain(&self) -> Vec<RenderOp> {
        self.receiver.try_iter().collect()
    }

    /// Returns `true` when no operation is waiting.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for RenderOpQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn drains_in_order_across_threads() {
        let queue = RenderOpQueue::new();
        let sender = queue.sender();
        thread::spawn(move || sender.send(RenderOp::ReleaseResources).unwrap())
            .join()
            .unwrap();
        queue.push(RenderOp::ReleaseResources);

        assert_eq!(queue.drain(), vec![RenderOp::ReleaseResources; 2]);
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }
}
