//! Messages that travel down an execution chain.
//!
//! Data events and the end-of-stream flush are distinct variants so a
//! processor can never mistake a flush for ordinary data.

use crate::event::Event;

/// A unit of work pushed into a chain link.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// An ordinary data event.
    Event(Event),
    /// Emit any buffered state, then forward the flush downstream.
    Flush,
}

impl Message {
    #[inline]
    pub fn is_flush(&self) -> bool {
        matches!(self, Message::Flush)
    }

    pub fn as_event(&self) -> Option<&Event> {
        match self {
            Message::Event(event) => Some(event),
            Message::Flush => None,
        }
    }

    pub fn into_event(self) -> Option<Event> {
        match self {
            Message::Event(event) => Some(event),
            Message::Flush => None,
        }
    }
}

impl From<Event> for Message {
    fn from(event: Event) -> Self {
        Message::Event(event)
    }
}
