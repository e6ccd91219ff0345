//! Format versions and their column limits

use super::error::BlockReaderError;
use crate::config::constants::format::{DEFAULT_VERSION, LINE_LENGTHS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl FormatVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    fn as_tuple(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch)
    }

    /// Maximum number of columns a line may use in this version.
    ///
    /// Versions newer than the default share its width; older versions must
    /// appear in the table exactly.
    pub fn line_length(&self) -> Result<usize, BlockReaderError> {
        let version = self.as_tuple();
        let lookup = if version >= DEFAULT_VERSION {
            DEFAULT_VERSION
        } else {
            version
        };

        LINE_LENGTHS
            .iter()
            .find(|(v, _)| *v == lookup)
            .map(|(_, width)| *width)
            .ok_or_else(|| BlockReaderError::unsupported_version(&self.to_string()))
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        let (major, minor, patch) = DEFAULT_VERSION;
        Self::new(major, minor, patch)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for FormatVersion {
    type Err = BlockReaderError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = text.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(BlockReaderError::unsupported_version(text));
        }

        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| BlockReaderError::unsupported_version(text))?;
        }

        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_line_length_table() {
        assert_eq!(FormatVersion::new(5, 1, 60).line_length().unwrap(), 80);
        assert_eq!(FormatVersion::new(6, 2, 0).line_length().unwrap(), 128);
        assert_eq!(FormatVersion::new(7, 0, 0).line_length().unwrap(), 128);
        assert_matches!(
            FormatVersion::new(6, 1, 5).line_length(),
            Err(BlockReaderError::UnsupportedVersion { .. })
        );
    }

    #[test]
    fn test_parse_version() {
        let version: FormatVersion = "6.1.0".parse().unwrap();
        assert_eq!(version, FormatVersion::new(6, 1, 0));
        assert_eq!(version.to_string(), "6.1.0");
        assert!("6.1".parse::<FormatVersion>().is_err());
        assert!("six.1.0".parse::<FormatVersion>().is_err());
    }
}
