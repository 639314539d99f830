//! Fixed-size tag byte image.

use serde::{Deserialize, Serialize};
use spooltag_core::constants::{
    PAGE_SIZE, TAG_IMAGE_LEN, TAG_IMAGE_PAGES, USER_BASE_PAGE,
};
use spooltag_core::error::DataError;
use std::fmt;

/// The 144-byte image exchanged with the codec and, page by page, with the
/// transport.
///
/// Logically the image is 36 consecutive 4-byte pages starting at the tag's
/// base user page (page 4). Page accessors take absolute page numbers so
/// call sites read the same as the wire protocol.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagImage(#[serde(with = "serde_bytes_array")] [u8; TAG_IMAGE_LEN]);

impl TagImage {
    /// All-zero image; what a freshly formatted tag reads back as.
    #[must_use]
    pub fn blank() -> Self {
        Self([0u8; TAG_IMAGE_LEN])
    }

    /// Wrap a raw byte array.
    #[must_use]
    pub fn from_array(bytes: [u8; TAG_IMAGE_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an image from a byte slice.
    ///
    /// Shorter input is zero-extended (a partial read of a smaller tag still
    /// yields a full image); longer input is truncated.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut image = [0u8; TAG_IMAGE_LEN];
        let n = bytes.len().min(TAG_IMAGE_LEN);
        image[..n].copy_from_slice(&bytes[..n]);
        Self(image)
    }

    /// Build an image from exactly [`TAG_IMAGE_LEN`] bytes.
    ///
    /// # Errors
    /// Returns `DataError::TooShort` when fewer bytes are supplied.
    pub fn from_exact(bytes: &[u8]) -> Result<Self, DataError> {
        if bytes.len() < TAG_IMAGE_LEN {
            return Err(DataError::too_short(bytes.len(), TAG_IMAGE_LEN));
        }
        Ok(Self::from_bytes(bytes))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.0
    }

    /// The 4-byte page at the given absolute page number, or `None` outside
    /// the image range (pages 4-39).
    #[must_use]
    pub fn page(&self, page: u8) -> Option<[u8; PAGE_SIZE]> {
        let index = page.checked_sub(USER_BASE_PAGE)? as usize;
        if index >= TAG_IMAGE_PAGES {
            return None;
        }
        let offset = index * PAGE_SIZE;
        let mut out = [0u8; PAGE_SIZE];
        out.copy_from_slice(&self.0[offset..offset + PAGE_SIZE]);
        Some(out)
    }

    /// Iterate `(absolute_page_number, page_bytes)` pairs over the whole
    /// image, in increasing page order.
    pub fn pages(&self) -> impl Iterator<Item = (u8, [u8; PAGE_SIZE])> + '_ {
        (0..TAG_IMAGE_PAGES).map(|index| {
            let offset = index * PAGE_SIZE;
            let mut page = [0u8; PAGE_SIZE];
            page.copy_from_slice(&self.0[offset..offset + PAGE_SIZE]);
            (USER_BASE_PAGE + index as u8, page)
        })
    }

    /// True when the first byte is zero, the canonical blank-tag signal.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0[0] == 0x00
    }
}

impl Default for TagImage {
    fn default() -> Self {
        Self::blank()
    }
}

impl AsRef<[u8]> for TagImage {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for TagImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First page is enough to identify the image in logs.
        write!(
            f,
            "TagImage({:02X} {:02X} {:02X} {:02X} …)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

/// Serde helper for the fixed 144-byte array (serde's built-in array support
/// stops at 32 elements).
mod serde_bytes_array {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use spooltag_core::constants::TAG_IMAGE_LEN;

    pub fn serialize<S: Serializer>(
        bytes: &[u8; TAG_IMAGE_LEN],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(bytes)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[u8; TAG_IMAGE_LEN], D::Error> {
        let bytes: Vec<u8> = Vec::deserialize(deserializer)?;
        bytes
            .try_into()
            .map_err(|v: Vec<u8>| D::Error::invalid_length(v.len(), &"144 bytes"))
    }
}
