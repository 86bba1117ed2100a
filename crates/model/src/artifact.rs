//! Opaque model artifact

use crate::error::{ModelError, Result};
use crate::header::ModelHeader;

/// A borrowed model blob with its decoded header.
///
/// The bytes are never modified; engines receive them as-is.
#[derive(Debug, Clone, Copy)]
pub struct ModelArtifact<'a> {
    bytes: &'a [u8],
    header: ModelHeader,
}

impl<'a> ModelArtifact<'a> {
    /// Parse the header of a model blob
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let header = ModelHeader::decode(bytes)?;
        if !header.has_file_identifier() {
            tracing::debug!(
                identifier = ?header.file_identifier,
                "Model has no TFL3 file identifier"
            );
        }
        Ok(Self { bytes, header })
    }

    /// Parse and require a specific schema version
    pub fn parse_versioned(bytes: &'a [u8], expected: u32) -> Result<Self> {
        let artifact = Self::parse(bytes)?;
        artifact.check_version(expected)?;
        Ok(artifact)
    }

    /// Fail unless the declared schema version equals `expected`
    pub fn check_version(&self, expected: u32) -> Result<()> {
        if self.header.schema_version != expected {
            return Err(ModelError::VersionMismatch {
                expected,
                got: self.header.schema_version,
            });
        }
        Ok(())
    }

    /// Declared schema version
    pub fn schema_version(&self) -> u32 {
        self.header.schema_version
    }

    /// Decoded header
    pub fn header(&self) -> &ModelHeader {
        &self.header
    }

    /// Raw model bytes
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Size of the blob in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false for a parsed artifact, which holds at least a header
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::SCHEMA_VERSION;

    #[test]
    fn test_parse_keeps_bytes() {
        let blob = ModelHeader::new(SCHEMA_VERSION)
            .encode_with_body(&[1, 2, 3])
            .unwrap();
        let artifact = ModelArtifact::parse(&blob).unwrap();
        assert_eq!(artifact.schema_version(), SCHEMA_VERSION);
        assert_eq!(artifact.bytes(), blob.as_slice());
        assert_eq!(artifact.len(), blob.len());
    }

    #[test]
    fn test_version_mismatch() {
        let blob = ModelHeader::new(2).encode().unwrap();
        let err = ModelArtifact::parse_versioned(&blob, SCHEMA_VERSION).unwrap_err();
        assert!(matches!(
            err,
            ModelError::VersionMismatch {
                expected: 3,
                got: 2
            }
        ));
    }

    #[test]
    fn test_missing_identifier_still_parses() {
        let header = ModelHeader {
            schema_version: SCHEMA_VERSION,
            file_identifier: *b"XXXX",
        };
        let blob = header.encode().unwrap();
        let artifact = ModelArtifact::parse(&blob).unwrap();
        assert!(!artifact.header().has_file_identifier());
        assert!(artifact.check_version(SCHEMA_VERSION).is_ok());
    }
}
