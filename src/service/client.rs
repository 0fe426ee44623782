//! Client session over the framed game protocol.
//!
//! Wraps a TCP connection in the frame codec and runs the packet
//! classifier over inbound traffic, so metadata published by the server
//! (its version string, for now) is available on the session.

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::instrument;

use crate::core::codec::FrameCodec;
use crate::core::packet::Frame;
use crate::error::Result;
use crate::protocol::classifier::{Dispatch, PacketClassifier, META_SERVER_VERSION};
use crate::protocol::connection::ConnectionMeta;

/// Client-side connection with its own classifier and metadata
pub struct ClientSession {
    framed: Framed<TcpStream, FrameCodec>,
    meta: ConnectionMeta,
    classifier: PacketClassifier,
}

impl ClientSession {
    /// Connect to a game server
    #[instrument]
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;

        Ok(Self {
            framed: Framed::new(stream, FrameCodec),
            meta: ConnectionMeta::new(),
            classifier: PacketClassifier::new(),
        })
    }

    /// Send a frame to the server
    pub async fn send(&mut self, frame: Frame) -> Result<()> {
        self.framed.send(frame).await
    }

    /// Receive and classify the next frame.
    ///
    /// Classification runs before the frame is handed back, so session
    /// metadata is already updated when this returns. `Ok(None)` means the
    /// server closed the connection.
    pub async fn recv(&mut self) -> Result<Option<(Dispatch, Frame)>> {
        match self.framed.next().await {
            Some(Ok(frame)) => {
                let dispatch = self.classifier.classify(&frame, &mut self.meta)?;
                Ok(Some((dispatch, frame)))
            }
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    /// Metadata extracted from classified packets so far
    pub fn metadata(&self) -> &ConnectionMeta {
        &self.meta
    }

    /// The server's version string, once a ping has been processed
    pub fn server_version(&self) -> Option<&str> {
        self.meta.get(META_SERVER_VERSION)
    }
}
