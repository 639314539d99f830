//! Mock NTAG21x implementation for testing and development.
//!
//! [`MockTag`] simulates a complete tag: page-addressed memory sized to the
//! chosen variant, static and dynamic lock bytes, AUTH0/ACCESS password
//! configuration, and scripted faults (failing pages, link drops, silent
//! write corruption). Every exchange is recorded in a journal so tests can
//! assert command ordering.
//!
//! Configuration lives in the simulated memory itself (the lock bytes ARE
//! page 2, AUTH0 IS byte 3 of page 41), so lock diagnostics exercises the
//! same page reads it would issue against real hardware.

use crate::traits::{AuthStatus, Result, TagConnector, TagTransport};
use spooltag_core::constants::{
    AUTH0_BYTE_INDEX, AUTH0_DISABLED, CONFIG_PAGE, DYNAMIC_LOCK_PAGE, LOCK_BIT_OTP,
    LOCK_BIT_PERMANENT, LOCK_BIT_USER_PAGES, PACK_PAGE, PAGE_SIZE, PWD_PAGE, STATIC_LOCK_PAGE,
};
use spooltag_core::error::TransportError;
use spooltag_core::types::{Pack, PasswordSecret, TagIdentity, TagModel, TagUid};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// One recorded exchange with the mock tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Identity,
    Read { page: u8 },
    Write { page: u8, data: [u8; PAGE_SIZE] },
    Authenticate { accepted: bool },
}

/// Simulated NTAG21x tag.
///
/// # Examples
///
/// ```
/// use spooltag_hardware::mock::MockTag;
/// use spooltag_hardware::traits::TagTransport;
/// use spooltag_core::TagModel;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let mut tag = MockTag::blank(TagModel::Ntag215);
///     tag.write_page(4, [0x7B, 0x00, 0x65, 0x00]).await.unwrap();
///     assert_eq!(tag.read_page(4).await.unwrap(), [0x7B, 0x00, 0x65, 0x00]);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockTag {
    model: TagModel,
    uid: TagUid,
    memory: Vec<u8>,
    authenticated: bool,
    link_up: bool,
    fail_write_at: Option<u8>,
    fail_read_at: Option<u8>,
    drop_link_after: Option<usize>,
    corrupt_write_at: Option<(u8, usize)>,
    ops_seen: usize,
    journal: Vec<MockOperation>,
}

impl MockTag {
    /// Factory-fresh tag: zeroed user memory, no locks, AUTH0 disabled,
    /// factory default password.
    #[must_use]
    pub fn blank(model: TagModel) -> Self {
        let mut memory = vec![0u8; model.total_pages() as usize * PAGE_SIZE];

        let config = Self::page_offset(CONFIG_PAGE);
        memory[config + AUTH0_BYTE_INDEX] = AUTH0_DISABLED;
        let pwd = Self::page_offset(PWD_PAGE);
        memory[pwd..pwd + PAGE_SIZE]
            .copy_from_slice(PasswordSecret::FACTORY_DEFAULT.as_bytes());

        Self {
            model,
            uid: TagUid::new(vec![0x04, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E, 0x6F])
                .expect("default UID is valid"),
            memory,
            authenticated: false,
            link_up: true,
            fail_write_at: None,
            fail_read_at: None,
            drop_link_after: None,
            corrupt_write_at: None,
            ops_seen: 0,
            journal: Vec::new(),
        }
    }

    /// Set a specific UID.
    #[must_use]
    pub fn with_uid(mut self, uid: TagUid) -> Self {
        self.uid = uid;
        self
    }

    /// Pre-load user memory (page 4 onward) with an image.
    #[must_use]
    pub fn with_user_memory(mut self, image: &[u8]) -> Self {
        let base = Self::page_offset(4);
        let n = image.len().min(self.memory.len() - base);
        self.memory[base..base + n].copy_from_slice(&image[..n]);
        self
    }

    /// Configure password protection: sets PWD, PACK, and AUTH0.
    ///
    /// Writes to pages at or above `auth0` NAK until a successful
    /// PWD_AUTH with the matching secret.
    #[must_use]
    pub fn password_protected(mut self, secret: PasswordSecret, auth0: u8, pack: Pack) -> Self {
        let pwd = Self::page_offset(PWD_PAGE);
        self.memory[pwd..pwd + PAGE_SIZE].copy_from_slice(secret.as_bytes());
        let pack_off = Self::page_offset(PACK_PAGE);
        self.memory[pack_off..pack_off + 2].copy_from_slice(&pack.0);
        let config = Self::page_offset(CONFIG_PAGE);
        self.memory[config + AUTH0_BYTE_INDEX] = auth0;
        self
    }

    /// Set the "pages 3-15 locked" static lock bit.
    #[must_use]
    pub fn lock_user_pages(mut self) -> Self {
        self.memory[Self::page_offset(STATIC_LOCK_PAGE) + 2] |= LOCK_BIT_USER_PAGES;
        self
    }

    /// Freeze the lock bytes themselves.
    #[must_use]
    pub fn lock_permanently(mut self) -> Self {
        self.memory[Self::page_offset(STATIC_LOCK_PAGE) + 2] |= LOCK_BIT_PERMANENT;
        self
    }

    /// Set the OTP-area lock bit.
    #[must_use]
    pub fn lock_otp(mut self) -> Self {
        self.memory[Self::page_offset(STATIC_LOCK_PAGE) + 2] |= LOCK_BIT_OTP;
        self
    }

    /// Set the three dynamic lock bytes (NTAG215/216 only).
    #[must_use]
    pub fn with_dynamic_lock(mut self, lock: [u8; 3]) -> Self {
        let off = Self::page_offset(DYNAMIC_LOCK_PAGE);
        self.memory[off..off + 3].copy_from_slice(&lock);
        self
    }

    /// NAK every write to the given page.
    #[must_use]
    pub fn fail_writes_at(mut self, page: u8) -> Self {
        self.fail_write_at = Some(page);
        self
    }

    /// NAK every read of the given page.
    #[must_use]
    pub fn fail_reads_at(mut self, page: u8) -> Self {
        self.fail_read_at = Some(page);
        self
    }

    /// Drop the link after the given number of exchanges, simulating a tag
    /// pulled out of the field mid-operation.
    #[must_use]
    pub fn drop_link_after(mut self, ops: usize) -> Self {
        self.drop_link_after = Some(ops);
        self
    }

    /// Silently corrupt one byte of the given page on write: the write
    /// acks, but the stored byte is inverted. For verify-mismatch tests.
    #[must_use]
    pub fn corrupt_written_byte(mut self, page: u8, byte_index: usize) -> Self {
        self.corrupt_write_at = Some((page, byte_index));
        self
    }

    /// The exchange journal, oldest first.
    #[must_use]
    pub fn journal(&self) -> &[MockOperation] {
        &self.journal
    }

    /// Pages written so far, in write order.
    #[must_use]
    pub fn written_pages(&self) -> Vec<u8> {
        self.journal
            .iter()
            .filter_map(|op| match op {
                MockOperation::Write { page, .. } => Some(*page),
                _ => None,
            })
            .collect()
    }

    /// Raw page contents, bypassing lock and auth checks (test inspection).
    #[must_use]
    pub fn page_contents(&self, page: u8) -> [u8; PAGE_SIZE] {
        let off = Self::page_offset(page);
        let mut out = [0u8; PAGE_SIZE];
        out.copy_from_slice(&self.memory[off..off + PAGE_SIZE]);
        out
    }

    /// Reset per-session state, as a real tag does when the RF field drops.
    pub fn end_session(&mut self) {
        self.authenticated = false;
    }

    fn page_offset(page: u8) -> usize {
        page as usize * PAGE_SIZE
    }

    fn auth0(&self) -> u8 {
        self.memory[Self::page_offset(CONFIG_PAGE) + AUTH0_BYTE_INDEX]
    }

    fn static_lock_byte(&self) -> u8 {
        self.memory[Self::page_offset(STATIC_LOCK_PAGE) + 2]
    }

    fn stored_password(&self) -> PasswordSecret {
        let off = Self::page_offset(PWD_PAGE);
        let mut bytes = [0u8; PAGE_SIZE];
        bytes.copy_from_slice(&self.memory[off..off + PAGE_SIZE]);
        PasswordSecret::new(bytes)
    }

    fn stored_pack(&self) -> Pack {
        let off = Self::page_offset(PACK_PAGE);
        Pack([self.memory[off], self.memory[off + 1]])
    }

    /// Per-exchange bookkeeping: link liveness and the scripted drop.
    fn check_link(&mut self) -> Result<()> {
        if !self.link_up {
            return Err(TransportError::connection_lost("mock link is down"));
        }
        if let Some(limit) = self.drop_link_after
            && self.ops_seen >= limit
        {
            self.link_up = false;
            debug!(ops = self.ops_seen, "mock tag leaving field");
            return Err(TransportError::connection_lost(
                "mock tag left the field",
            ));
        }
        self.ops_seen += 1;
        Ok(())
    }

    fn page_exists(&self, page: u8) -> bool {
        page < self.model.total_pages()
    }
}

impl TagTransport for MockTag {
    async fn identity(&mut self) -> Result<TagIdentity> {
        self.check_link()?;
        self.journal.push(MockOperation::Identity);
        Ok(TagIdentity::new(self.uid.clone(), self.model))
    }

    async fn read_page(&mut self, page: u8) -> Result<[u8; PAGE_SIZE]> {
        self.check_link()?;
        self.journal.push(MockOperation::Read { page });

        if self.fail_read_at == Some(page) {
            return Err(TransportError::nak(page));
        }
        // Smaller variants NAK the dynamic-lock page; the diagnostics layer
        // treats that as variant evidence, not a failure.
        if page == DYNAMIC_LOCK_PAGE && !self.model.has_dynamic_lock() {
            return Err(TransportError::nak(page));
        }
        if !self.page_exists(page) {
            return Err(TransportError::nak(page));
        }

        Ok(self.page_contents(page))
    }

    async fn write_page(&mut self, page: u8, data: [u8; PAGE_SIZE]) -> Result<()> {
        self.check_link()?;
        self.journal.push(MockOperation::Write { page, data });

        if self.fail_write_at == Some(page) {
            return Err(TransportError::nak(page));
        }
        if !self.page_exists(page) {
            return Err(TransportError::nak(page));
        }
        if self.static_lock_byte() & LOCK_BIT_USER_PAGES != 0 && (3..=15).contains(&page) {
            return Err(TransportError::nak(page));
        }
        if self.static_lock_byte() & LOCK_BIT_PERMANENT != 0 && page == STATIC_LOCK_PAGE {
            return Err(TransportError::nak(page));
        }
        if page >= self.auth0() && !self.authenticated {
            return Err(TransportError::nak(page));
        }

        let off = Self::page_offset(page);
        self.memory[off..off + PAGE_SIZE].copy_from_slice(&data);

        if let Some((corrupt_page, index)) = self.corrupt_write_at
            && corrupt_page == page
            && index < PAGE_SIZE
        {
            self.memory[off + index] = !data[index];
        }

        Ok(())
    }

    async fn authenticate(&mut self, secret: &PasswordSecret) -> Result<AuthStatus> {
        self.check_link()?;

        let accepted = *secret == self.stored_password();
        self.journal.push(MockOperation::Authenticate { accepted });
        debug!(accepted, "mock PWD_AUTH exchange");

        if accepted {
            self.authenticated = true;
            Ok(AuthStatus::Accepted {
                pack: self.stored_pack(),
            })
        } else {
            Ok(AuthStatus::Rejected)
        }
    }
}

/// Cloneable handle to a [`MockTag`] shared across proximity sessions.
///
/// Write→verify flows span two sessions against the same physical tag; this
/// wrapper gives each session a transport while the underlying memory
/// persists.
#[derive(Debug, Clone)]
pub struct SharedMockTag {
    inner: Arc<Mutex<MockTag>>,
}

impl SharedMockTag {
    #[must_use]
    pub fn new(tag: MockTag) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tag)),
        }
    }

    /// Run a closure against the underlying tag (test inspection).
    pub async fn with_tag<R>(&self, f: impl FnOnce(&MockTag) -> R) -> R {
        let tag = self.inner.lock().await;
        f(&tag)
    }
}

impl TagTransport for SharedMockTag {
    async fn identity(&mut self) -> Result<TagIdentity> {
        self.inner.lock().await.identity().await
    }

    async fn read_page(&mut self, page: u8) -> Result<[u8; PAGE_SIZE]> {
        self.inner.lock().await.read_page(page).await
    }

    async fn write_page(&mut self, page: u8, data: [u8; PAGE_SIZE]) -> Result<()> {
        self.inner.lock().await.write_page(page, data).await
    }

    async fn authenticate(&mut self, secret: &PasswordSecret) -> Result<AuthStatus> {
        self.inner.lock().await.authenticate(secret).await
    }
}

/// Connector that "detects" the same mock tag on every session.
#[derive(Debug, Clone)]
pub struct MockConnector {
    tag: SharedMockTag,
    sessions_opened: Arc<Mutex<usize>>,
}

impl MockConnector {
    #[must_use]
    pub fn new(tag: MockTag) -> Self {
        Self {
            tag: SharedMockTag::new(tag),
            sessions_opened: Arc::new(Mutex::new(0)),
        }
    }

    /// Handle to the shared tag for post-flow assertions.
    #[must_use]
    pub fn tag(&self) -> SharedMockTag {
        self.tag.clone()
    }

    /// Number of proximity sessions opened so far.
    pub async fn sessions_opened(&self) -> usize {
        *self.sessions_opened.lock().await
    }
}

impl TagConnector for MockConnector {
    type Transport = SharedMockTag;

    async fn connect(&mut self) -> Result<Self::Transport> {
        // A new RF session resets the tag's authentication state.
        self.tag.inner.lock().await.end_session();
        *self.sessions_opened.lock().await += 1;
        Ok(self.tag.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_tag_reads_zeroed_user_memory() {
        let mut tag = MockTag::blank(TagModel::Ntag215);
        assert_eq!(tag.read_page(4).await.unwrap(), [0u8; 4]);
        assert_eq!(tag.read_page(31).await.unwrap(), [0u8; 4]);
    }

    #[tokio::test]
    async fn write_then_read_roundtrip() {
        let mut tag = MockTag::blank(TagModel::Ntag215);
        tag.write_page(10, [1, 2, 3, 4]).await.unwrap();
        assert_eq!(tag.read_page(10).await.unwrap(), [1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn ntag213_naks_dynamic_lock_page_reads() {
        let mut tag = MockTag::blank(TagModel::Ntag213);
        let err = tag.read_page(DYNAMIC_LOCK_PAGE).await.unwrap_err();
        assert_eq!(err, TransportError::nak(DYNAMIC_LOCK_PAGE));

        let mut tag215 = MockTag::blank(TagModel::Ntag215);
        assert!(tag215.read_page(DYNAMIC_LOCK_PAGE).await.is_ok());
    }

    #[tokio::test]
    async fn locked_user_pages_nak_writes_in_locked_range() {
        let mut tag = MockTag::blank(TagModel::Ntag215).lock_user_pages();
        assert!(tag.write_page(10, [0xAA; 4]).await.is_err());
        // Pages past 15 are not covered by the static lock bit.
        assert!(tag.write_page(16, [0xAA; 4]).await.is_ok());
    }

    #[tokio::test]
    async fn password_protection_gates_writes_until_auth() {
        let secret = PasswordSecret::new([0xDE, 0xAD, 0xBE, 0xEF]);
        let mut tag = MockTag::blank(TagModel::Ntag215)
            .password_protected(secret, 0x04, Pack([0x80, 0x80]));

        assert!(tag.write_page(4, [1; 4]).await.is_err());

        let status = tag.authenticate(&PasswordSecret::ZERO).await.unwrap();
        assert_eq!(status, AuthStatus::Rejected);
        assert!(tag.write_page(4, [1; 4]).await.is_err());

        let status = tag.authenticate(&secret).await.unwrap();
        assert!(status.is_accepted());
        assert!(tag.write_page(4, [1; 4]).await.is_ok());
    }

    #[tokio::test]
    async fn link_drop_after_budget() {
        let mut tag = MockTag::blank(TagModel::Ntag215).drop_link_after(2);
        assert!(tag.read_page(4).await.is_ok());
        assert!(tag.read_page(5).await.is_ok());
        let err = tag.read_page(6).await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionLost { .. }));
        // The link stays down afterwards.
        assert!(tag.read_page(4).await.is_err());
    }

    #[tokio::test]
    async fn corrupted_write_acks_but_stores_wrong_byte() {
        let mut tag = MockTag::blank(TagModel::Ntag215).corrupt_written_byte(5, 2);
        tag.write_page(5, [1, 2, 3, 4]).await.unwrap();
        assert_eq!(tag.read_page(5).await.unwrap(), [1, 2, !3, 4]);
    }

    #[tokio::test]
    async fn journal_records_exchange_order() {
        let mut tag = MockTag::blank(TagModel::Ntag215);
        tag.identity().await.unwrap();
        tag.write_page(4, [0; 4]).await.unwrap();
        tag.read_page(4).await.unwrap();

        assert_eq!(
            tag.journal(),
            &[
                MockOperation::Identity,
                MockOperation::Write {
                    page: 4,
                    data: [0; 4]
                },
                MockOperation::Read { page: 4 },
            ]
        );
    }

    #[tokio::test]
    async fn new_session_resets_authentication() {
        let secret = PasswordSecret::new([0xAA, 0xBB, 0xCC, 0xDD]);
        let tag = MockTag::blank(TagModel::Ntag215)
            .password_protected(secret, 0x04, Pack([0x11, 0x22]));
        let mut connector = MockConnector::new(tag);

        let mut session1 = connector.connect().await.unwrap();
        session1.authenticate(&secret).await.unwrap();
        session1.write_page(4, [9; 4]).await.unwrap();
        drop(session1);

        let mut session2 = connector.connect().await.unwrap();
        assert!(session2.write_page(5, [9; 4]).await.is_err());
        assert_eq!(connector.sessions_opened().await, 2);
    }
}
