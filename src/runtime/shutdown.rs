// Copyright 2024 Felix Engl
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

use tokio_util::sync::CancellationToken;

/// The shutdown signal of the application. Clones share the signal.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    inner: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            inner: CancellationToken::new(),
        }
    }

    pub fn shutdown(&self) {
        self.inner.cancel();
    }

    /// Triggers the shutdown on the first Ctrl-C.
    ///
    /// Needs to be called inside of a tokio runtime.
    pub fn shutdown_on_ctrl_c(&self) {
        let shutdown = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    match result {
                        Ok(()) => log::info!("Received Ctrl-C, shutting down after the current cycle."),
                        Err(err) => log::error!("Failed to listen for Ctrl-C: {err}"),
                    }
                    shutdown.shutdown();
                }
                _ = shutdown.wait() => {}
            }
        });
    }
}

impl ShutdownReceiver for Shutdown {
    fn is_shutdown(&self) -> bool {
        self.inner.is_cancelled()
    }
}

impl ShutdownReceiverWithWait for Shutdown {
    async fn wait(&self) {
        self.inner.cancelled().await
    }
}

#[cfg(test)]
mod phantom {
    use super::{ShutdownReceiver, ShutdownReceiverWithWait};

    /// Never shuts down.
    #[derive(Debug, Copy, Clone)]
    pub struct ShutdownPhantom;

    impl ShutdownReceiver for ShutdownPhantom {
        #[inline]
        fn is_shutdown(&self) -> bool {
            false
        }
    }

    impl ShutdownReceiverWithWait for ShutdownPhantom {
        async fn wait(&self) {
            std::future::pending::<()>().await
        }
    }
}

#[cfg(test)]
pub use phantom::*;

/// A simple trait for receiving a shutdown command
pub trait ShutdownReceiver: Clone {
    /// Returns `true` if the shutdown signal has been received.
    fn is_shutdown(&self) -> bool;
}

#[allow(async_fn_in_trait)]
pub trait ShutdownReceiverWithWait: ShutdownReceiver {
    /// Resolves as soon as the shutdown signal is received.
    async fn wait(&self);
}

#[cfg(test)]
mod test {
    use super::{Shutdown, ShutdownReceiver, ShutdownReceiverWithWait};
    use std::time::Duration;

    #[tokio::test]
    async fn clones_share_the_signal() {
        let shutdown = Shutdown::new();
        let clone = shutdown.clone();
        assert!(!clone.is_shutdown());
        shutdown.shutdown();
        assert!(clone.is_shutdown());
        tokio::time::timeout(Duration::from_secs(1), clone.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn wait_blocks_until_the_shutdown() {
        let shutdown = Shutdown::new();
        assert!(tokio::time::timeout(Duration::from_millis(50), shutdown.wait())
            .await
            .is_err());
        assert!(!Shutdown::default().is_shutdown());
    }
}
