//! Test data builders for creating captures

/// Builder for `\r`-delimited captures in the device's wire format
#[derive(Debug, Clone, Default)]
pub struct CaptureBuilder {
    bytes: Vec<u8>,
}

impl CaptureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an accelerometer frame
    pub fn accel(self, x: u32, y: u32, z: u32) -> Self {
        self.frame(&format!("~HSAC,{:X},{:X},{:X}", x, y, z))
    }

    /// Append a potentiometer frame
    pub fn pot(self, value: u32) -> Self {
        self.frame(&format!("~HSRD,{:X}", value))
    }

    /// Append one accelerometer frame followed by one potentiometer frame
    pub fn cycle(self, x: u32, y: u32, z: u32, pot: u32) -> Self {
        self.accel(x, y, z).pot(pot)
    }

    /// Append `count` cycles with values derived from the cycle number
    pub fn cycles(mut self, count: u32) -> Self {
        for i in 0..count {
            self = self.cycle(i, i * 2, i * 3, 0x100 + i);
        }
        self
    }

    /// Append a version report
    pub fn version(self, major: u32, minor: u32, patch: u32, build: u32) -> Self {
        self.frame(&format!(
            "~HSVI,{:X},{:X},{:X},{:X}",
            major, minor, patch, build
        ))
    }

    /// Append an arbitrary frame body plus the delimiter
    pub fn frame(mut self, body: &str) -> Self {
        self.bytes.extend_from_slice(body.as_bytes());
        self.bytes.push(b'\r');
        self
    }

    /// Append a frame whose body need not be valid UTF-8
    pub fn frame_bytes(mut self, body: &[u8]) -> Self {
        self.bytes.extend_from_slice(body);
        self.bytes.push(b'\r');
        self
    }

    /// Append bytes with no delimiter
    pub fn partial(mut self, bytes: &str) -> Self {
        self.bytes.extend_from_slice(bytes.as_bytes());
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_builder() {
        let capture = CaptureBuilder::new()
            .version(1, 0, 0, 0x1F)
            .cycle(10, 11, 12, 255)
            .partial("~HSR")
            .build();

        assert_eq!(capture, b"~HSVI,1,0,0,1F\r~HSAC,A,B,C\r~HSRD,FF\r~HSR".to_vec());
    }
}
