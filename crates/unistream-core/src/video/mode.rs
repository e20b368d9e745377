use std::fmt;

/// Fixed spatial extent and channel count of a stream mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl Geometry {
    /// Number of pixel bytes following the mode byte.
    pub fn payload_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.channels)
    }
}

/// Encoding selected by the leading byte of every datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamMode {
    /// 195x109, three channels sent in BGR order.
    Color,
    /// 330x185, single channel.
    Grayscale,
}

const COLOR_BYTE: u8 = 3;
const GRAYSCALE_BYTE: u8 = 1;

const COLOR_GEOMETRY: Geometry = Geometry {
    width: 195,
    height: 109,
    channels: 3,
};

const GRAYSCALE_GEOMETRY: Geometry = Geometry {
    width: 330,
    height: 185,
    channels: 1,
};

impl StreamMode {
    pub const ALL: [StreamMode; 2] = [StreamMode::Color, StreamMode::Grayscale];

    /// Resolve a mode byte. Only 3 selects color; every other value is grayscale.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            COLOR_BYTE => StreamMode::Color,
            _ => StreamMode::Grayscale,
        }
    }

    /// The byte a sender writes for this mode.
    pub fn to_byte(self) -> u8 {
        match self {
            StreamMode::Color => COLOR_BYTE,
            StreamMode::Grayscale => GRAYSCALE_BYTE,
        }
    }

    pub fn geometry(self) -> Geometry {
        match self {
            StreamMode::Color => COLOR_GEOMETRY,
            StreamMode::Grayscale => GRAYSCALE_GEOMETRY,
        }
    }
}

impl fmt::Display for StreamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamMode::Color => write!(f, "color"),
            StreamMode::Grayscale => write!(f, "grayscale"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_three_selects_color() {
        assert_eq!(StreamMode::from_byte(3), StreamMode::Color);
        for byte in [0u8, 1, 2, 4, 255] {
            assert_eq!(StreamMode::from_byte(byte), StreamMode::Grayscale, "byte {byte}");
        }
    }

    #[test]
    fn to_byte_resolves_back_to_same_mode() {
        for mode in StreamMode::ALL {
            assert_eq!(StreamMode::from_byte(mode.to_byte()), mode);
        }
    }

    #[test]
    fn payload_lengths_fit_in_one_datagram() {
        assert_eq!(StreamMode::Color.geometry().payload_len(), 63_765);
        assert_eq!(StreamMode::Grayscale.geometry().payload_len(), 61_050);
        for mode in StreamMode::ALL {
            assert!(mode.geometry().payload_len() + 1 <= 64_000);
        }
    }
}
