/// Runtime frame filter.
///
/// Decides which decoded (or rejected) frames reach the output. Everything
/// passes by default; narrowing is opt-in from the command line.
use crate::decode::{DecodeError, MacFrame};
use crate::mac::FrameType;

/// Bitmask with every frame type enabled
pub const ALL_TYPES: u32 = u32::MAX;

/// Runtime filter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterConfig {
    /// Only show frames for this network id
    pub net: Option<u8>,
    /// Bit N set = frame type N is shown
    pub types: u32,
    /// Show frames rejected by the decoder (CRC errors, short frames)
    pub show_errors: bool,
}

impl FilterConfig {
    pub const fn new() -> Self {
        Self {
            net: None,
            types: ALL_TYPES,
            show_errors: true,
        }
    }

    /// Restrict output to the given frame types. An empty list keeps all.
    pub fn only_types(mut self, types: &[FrameType]) -> Self {
        if !types.is_empty() {
            self.types = types.iter().fold(0, |mask, t| mask | 1 << t.code());
        }
        self
    }

    pub fn allows_type(&self, frame_type: FrameType) -> bool {
        self.types & (1 << frame_type.code()) != 0
    }

    /// Evaluate one decoder outcome against the filter.
    pub fn accepts(&self, outcome: &Result<MacFrame<'_>, DecodeError>) -> bool {
        match outcome {
            Ok(frame) => {
                if let Some(net) = self.net {
                    if frame.header.net != net {
                        return false;
                    }
                }
                self.allows_type(frame.frame_type)
            }
            Err(_) => self.show_errors,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::new()
    }
}
