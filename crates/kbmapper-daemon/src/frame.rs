//! Per-device frame coalescing
//!
//! The kernel delivers input as frames: a run of records closed by a
//! `SYN_*` record. Each frame is reduced to at most one logical event, the
//! last key or switch record seen before the boundary. If a frame carries
//! several transitions only the last one survives; the earlier ones are
//! dropped on purpose rather than merged.

use evdev::{EventType, InputEvent};

/// A key or switch transition, one per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalEvent {
    /// Key transition: value 0 = release, 1 = press, 2 = autorepeat
    Key { code: u16, value: i32 },
    /// Switch transition: value is the new switch position
    Switch { code: u16, value: i32 },
}

/// Buffers the most recent key or switch record of the current frame
#[derive(Debug, Default)]
pub struct FrameCoalescer {
    pending: Option<LogicalEvent>,
}

impl FrameCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw record.
    ///
    /// Returns the buffered event when `event` closes a frame, `None`
    /// otherwise. A boundary with nothing buffered yields nothing.
    pub fn push(&mut self, event: InputEvent) -> Option<LogicalEvent> {
        let code = event.code();
        let value = event.value();

        match event.event_type() {
            EventType::SYNCHRONIZATION => self.pending.take(),
            EventType::KEY => {
                self.pending = Some(LogicalEvent::Key { code, value });
                None
            }
            EventType::SWITCH => {
                self.pending = Some(LogicalEvent::Switch { code, value });
                None
            }
            // Scan codes, LEDs and the like carry nothing we act on
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: u16, value: i32) -> InputEvent {
        InputEvent::new(EventType::KEY, code, value)
    }

    fn switch(code: u16, value: i32) -> InputEvent {
        InputEvent::new(EventType::SWITCH, code, value)
    }

    fn syn() -> InputEvent {
        InputEvent::new(EventType::SYNCHRONIZATION, 0, 0)
    }

    fn scan(value: i32) -> InputEvent {
        InputEvent::new(EventType::MISC, 4, value)
    }

    #[test]
    fn test_key_frame_emits_on_boundary() {
        let mut coalescer = FrameCoalescer::new();

        assert_eq!(coalescer.push(scan(0x70004)), None);
        assert_eq!(coalescer.push(key(30, 1)), None);
        assert_eq!(
            coalescer.push(syn()),
            Some(LogicalEvent::Key { code: 30, value: 1 })
        );
    }

    #[test]
    fn test_boundary_without_record_emits_nothing() {
        let mut coalescer = FrameCoalescer::new();

        assert_eq!(coalescer.push(syn()), None);
        assert_eq!(coalescer.push(scan(1)), None);
        assert_eq!(coalescer.push(syn()), None);
    }

    #[test]
    fn test_buffer_cleared_after_emit() {
        let mut coalescer = FrameCoalescer::new();

        coalescer.push(key(30, 1));
        assert!(coalescer.push(syn()).is_some());
        assert_eq!(coalescer.push(syn()), None);
    }

    #[test]
    fn test_last_record_in_frame_wins() {
        let mut coalescer = FrameCoalescer::new();

        coalescer.push(key(29, 1));
        coalescer.push(key(30, 1));
        assert_eq!(
            coalescer.push(syn()),
            Some(LogicalEvent::Key { code: 30, value: 1 })
        );
    }

    #[test]
    fn test_switch_frame() {
        let mut coalescer = FrameCoalescer::new();

        coalescer.push(switch(0, 1));
        assert_eq!(
            coalescer.push(syn()),
            Some(LogicalEvent::Switch { code: 0, value: 1 })
        );
    }

    #[test]
    fn test_switch_superseded_by_later_key() {
        let mut coalescer = FrameCoalescer::new();

        coalescer.push(switch(2, 1));
        coalescer.push(key(30, 0));
        assert_eq!(
            coalescer.push(syn()),
            Some(LogicalEvent::Key { code: 30, value: 0 })
        );
    }
}
