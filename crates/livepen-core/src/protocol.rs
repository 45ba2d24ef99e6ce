//! Cross-frame message protocol.
//!
//! The preview runs inside a sandboxed frame that cannot be called into
//! directly. Two message kinds leave the frame and one enters it:
//!
//! | direction | `type` | payload |
//! |---|---|---|
//! | frame -> host | `consoleLog` | `logs`: full accumulated log list |
//! | frame -> host | `heightChange` | `height`: candidate content height |
//! | host -> frame | `heightRequest` | none |
//!
//! Delivery is asynchronous and unguaranteed. The host accepts a message only
//! when its [`FrameId`] matches the frame it currently owns.

use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire tag for [`PreviewMessage::ConsoleLog`].
pub const CONSOLE_LOG_TYPE: &str = "consoleLog";
/// Wire tag for [`PreviewMessage::HeightChange`].
pub const HEIGHT_CHANGE_TYPE: &str = "heightChange";
/// Wire tag for [`HostMessage::HeightRequest`].
pub const HEIGHT_REQUEST_TYPE: &str = "heightRequest";

/// Identity of one sandboxed frame instance.
///
/// The generation is bumped each time the frame is torn down and recreated,
/// so late messages from a discarded frame never match the live one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrameId {
    iframe_id: String,
    generation: u64,
}

impl FrameId {
    #[must_use]
    pub fn new(iframe_id: impl Into<String>) -> Self {
        Self {
            iframe_id: iframe_id.into(),
            generation: 0,
        }
    }

    /// Identity of the frame that replaces this one.
    #[must_use]
    pub fn next_generation(&self) -> Self {
        Self {
            iframe_id: self.iframe_id.clone(),
            generation: self.generation.saturating_add(1),
        }
    }

    #[must_use]
    pub fn iframe_id(&self) -> &str {
        &self.iframe_id
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.iframe_id, self.generation)
    }
}

/// Message posted by the sandboxed frame to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PreviewMessage {
    /// Full replacement of the displayed log list.
    ConsoleLog { logs: Vec<String> },
    /// Candidate new content height in CSS pixels.
    HeightChange { height: f64 },
}

impl PreviewMessage {
    /// Decode one raw JSON payload.
    pub fn decode(raw: &str) -> Result<Self, ProtocolError> {
        let message: Self = serde_json::from_str(raw)?;
        if let Self::HeightChange { height } = message
            && (!height.is_finite() || height < 0.0)
        {
            return Err(ProtocolError::InvalidHeight { height });
        }
        Ok(message)
    }

    #[must_use]
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Wire `type` tag of this message.
    #[must_use]
    pub const fn type_tag(&self) -> &'static str {
        match self {
            Self::ConsoleLog { .. } => CONSOLE_LOG_TYPE,
            Self::HeightChange { .. } => HEIGHT_CHANGE_TYPE,
        }
    }
}

/// Message posted by the host into the sandboxed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
    /// Best-effort nudge asking the frame to re-report its height.
    HeightRequest,
}

impl HostMessage {
    #[must_use]
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Raw inbound message together with its sender identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub source: FrameId,
    pub payload: String,
}

impl Envelope {
    #[must_use]
    pub fn new(source: FrameId, payload: impl Into<String>) -> Self {
        Self {
            source,
            payload: payload.into(),
        }
    }

    /// Decode the payload.
    pub fn decode(&self) -> Result<PreviewMessage, ProtocolError> {
        PreviewMessage::decode(&self.payload)
    }
}

/// Failures decoding an inbound payload.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid height: {height}")]
    InvalidHeight { height: f64 },
}

/// Failures posting into a frame. Callers treat all of these as transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("frame {frame} is detached")]
    Detached { frame: FrameId },

    #[error("posting to frame {frame} was refused: {reason}")]
    Refused { frame: FrameId, reason: String },
}

/// Host side of the cross-frame channel.
///
/// Production hosts wrap `window.postMessage` / `message` events; tests use
/// [`InProcessChannel`]. Payloads cross the frame boundary as JSON text in
/// both directions: adapters post [`HostMessage::encode`] output and hand
/// the frame's string payload to [`Envelope`] unparsed.
pub trait MessageChannel {
    /// Post one message into the given frame.
    fn send(&mut self, target: &FrameId, message: &HostMessage) -> Result<(), ChannelError>;

    /// Take the next inbound envelope, if any.
    fn recv(&mut self) -> Option<Envelope>;
}

#[derive(Debug, Default)]
struct SharedQueues {
    to_host: VecDeque<Envelope>,
    to_frame: VecDeque<(FrameId, HostMessage)>,
    detached: BTreeSet<FrameId>,
}

/// In-process channel pair standing in for the browser message bus.
///
/// Messages from one sender are delivered in send order.
#[derive(Debug, Clone, Default)]
pub struct InProcessChannel {
    shared: Rc<RefCell<SharedQueues>>,
}

impl InProcessChannel {
    /// Create a connected host channel and sandbox port.
    #[must_use]
    pub fn pair() -> (Self, SandboxPort) {
        let shared = Rc::new(RefCell::new(SharedQueues::default()));
        (
            Self {
                shared: Rc::clone(&shared),
            },
            SandboxPort { shared },
        )
    }
}

impl MessageChannel for InProcessChannel {
    fn send(&mut self, target: &FrameId, message: &HostMessage) -> Result<(), ChannelError> {
        let mut shared = self.shared.borrow_mut();
        if shared.detached.contains(target) {
            return Err(ChannelError::Detached {
                frame: target.clone(),
            });
        }
        shared.to_frame.push_back((target.clone(), *message));
        Ok(())
    }

    fn recv(&mut self) -> Option<Envelope> {
        self.shared.borrow_mut().to_host.pop_front()
    }
}

/// Frame side of an [`InProcessChannel`].
#[derive(Debug, Clone)]
pub struct SandboxPort {
    shared: Rc<RefCell<SharedQueues>>,
}

impl SandboxPort {
    /// Post a typed message as `source`.
    pub fn post(&self, source: &FrameId, message: &PreviewMessage) {
        self.post_raw(source, message.encode());
    }

    /// Post an arbitrary payload as `source`.
    pub fn post_raw(&self, source: &FrameId, payload: impl Into<String>) {
        self.shared
            .borrow_mut()
            .to_host
            .push_back(Envelope::new(source.clone(), payload));
    }

    /// Drain messages the host posted into frames.
    pub fn take_requests(&self) -> Vec<(FrameId, HostMessage)> {
        self.shared.borrow_mut().to_frame.drain(..).collect()
    }

    /// Mark a frame as torn down; later host sends to it fail.
    pub fn detach(&self, frame: &FrameId) {
        self.shared.borrow_mut().detached.insert(frame.clone());
    }
}
