//! Errors reported by [`BlipBuffer`](super::BlipBuffer).
//!
//! All of them are local to the buffer that produced them. `OutOfRange` is
//! purely diagnostic: the offending delta has already been dropped and the
//! frame carries on.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlipError {
    /// Invalid rates or length passed to `configure`; the buffer keeps its
    /// previous configuration (or stays unconfigured).
    Config { reason: &'static str },
    /// Synthesis was attempted before `configure`.
    NotConfigured,
    /// A delta landed outside the writable window and was dropped.
    OutOfRange { tick: u32 },
    /// `end_frame` would run past the end of the buffer. Read samples out
    /// and retry.
    FrameOverflow { requested: u32, available: u32 },
}

impl std::fmt::Display for BlipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlipError::Config { reason } => write!(f, "invalid buffer configuration: {}", reason),
            BlipError::NotConfigured => write!(f, "buffer has not been configured"),
            BlipError::OutOfRange { tick } => {
                write!(f, "delta at tick {} falls outside the writable window", tick)
            }
            BlipError::FrameOverflow {
                requested,
                available,
            } => write!(
                f,
                "frame overflow: requested {} ticks, only {} fit before samples are read",
                requested, available
            ),
        }
    }
}

impl std::error::Error for BlipError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_numbers() {
        let err = BlipError::FrameOverflow {
            requested: 10,
            available: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("4"));

        let err = BlipError::OutOfRange { tick: 77 };
        assert!(err.to_string().contains("77"));
    }
}
