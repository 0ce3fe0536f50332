//! MetaInfo: Data content type, freshness and final block.

use bytes::Bytes;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use ndnwire_core::{
    tlv, Block, ConstructionError, DecodeError, Encoder, EncodingBuffer, Estimator,
};
use ndnwire_name::Component;

use crate::types::ContentType;

/// Metadata attached to a Data packet.
///
/// The encoded element is cached until the next edit.
#[derive(Debug, Clone, Default)]
pub struct MetaInfo {
    content_type: ContentType,
    freshness_period: Duration,
    final_block_id: Option<Component>,
    app_meta_info: Vec<Block>,
    wire: OnceLock<Bytes>,
}

impl MetaInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn set_content_type(&mut self, content_type: ContentType) -> &mut Self {
        self.wire.take();
        self.content_type = content_type;
        self
    }

    /// How long the Data stays fresh after arrival; zero means immediately stale.
    pub fn freshness_period(&self) -> Duration {
        self.freshness_period
    }

    pub fn set_freshness_period(&mut self, period: Duration) -> &mut Self {
        self.wire.take();
        self.freshness_period = period;
        self
    }

    pub fn final_block_id(&self) -> Option<&Component> {
        self.final_block_id.as_ref()
    }

    pub fn set_final_block_id(&mut self, id: Option<Component>) -> &mut Self {
        self.wire.take();
        self.final_block_id = id;
        self
    }

    pub fn app_meta_info(&self) -> &[Block] {
        &self.app_meta_info
    }

    /// Replace every AppMetaInfo block. Nothing changes if any block has a
    /// type outside `[128, 252]`.
    pub fn set_app_meta_info(&mut self, blocks: Vec<Block>) -> Result<&mut Self, ConstructionError> {
        for block in &blocks {
            check_app_meta_info(block)?;
        }
        self.wire.take();
        self.app_meta_info = blocks;
        Ok(self)
    }

    pub fn add_app_meta_info(&mut self, block: Block) -> Result<&mut Self, ConstructionError> {
        check_app_meta_info(&block)?;
        self.wire.take();
        self.app_meta_info.push(block);
        Ok(self)
    }

    /// Remove the first AppMetaInfo block of `tlv_type`; false if none.
    pub fn remove_app_meta_info(&mut self, tlv_type: u32) -> bool {
        match self.app_meta_info.iter().position(|b| b.tlv_type() == tlv_type) {
            Some(i) => {
                self.wire.take();
                self.app_meta_info.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn find_app_meta_info(&self, tlv_type: u32) -> Option<&Block> {
        self.app_meta_info.iter().find(|b| b.tlv_type() == tlv_type)
    }

    /// Prepend the MetaInfo element.
    pub fn encode_to<E: Encoder>(&self, encoder: &mut E) -> usize {
        encoder.prepend_bytes(&self.wire_encode())
    }

    /// The encoded MetaInfo element, built at most once per edit.
    pub fn wire_encode(&self) -> Bytes {
        self.wire
            .get_or_init(|| {
                let mut estimator = Estimator::new();
                let size = self.prepend_fields_to(&mut estimator);
                let mut buffer = EncodingBuffer::with_capacity(size);
                self.prepend_fields_to(&mut buffer);
                buffer.into_bytes()
            })
            .clone()
    }

    pub fn has_wire(&self) -> bool {
        self.wire.get().is_some()
    }

    // Default fields are omitted.
    fn prepend_fields_to<E: Encoder>(&self, encoder: &mut E) -> usize {
        let mut len = 0;
        for block in self.app_meta_info.iter().rev() {
            len += block.encode_to(encoder);
        }
        if let Some(id) = &self.final_block_id {
            len += encoder.prepend_nested(tlv::FINAL_BLOCK_ID, |e| id.encode_to(e));
        }
        let freshness = self.freshness_period.as_millis() as u64;
        if freshness != 0 {
            len += encoder.prepend_non_negative_integer_block(tlv::FRESHNESS_PERIOD, freshness);
        }
        if self.content_type != ContentType::BLOB {
            len += encoder.prepend_non_negative_integer_block(tlv::CONTENT_TYPE, self.content_type.code());
        }
        len + encoder.prepend_tl(tlv::META_INFO, len)
    }

    /// Decode a MetaInfo element.
    ///
    /// ContentType, FreshnessPeriod and FinalBlockId are each optional but
    /// must appear in that order; anything after them is AppMetaInfo.
    pub fn wire_decode(block: &Block) -> Result<Self, DecodeError> {
        if block.tlv_type() != tlv::META_INFO {
            return Err(DecodeError::UnexpectedType {
                expected: tlv::META_INFO,
                actual: block.tlv_type(),
            });
        }
        let mut block = block.clone();
        block.parse()?;
        let mut elements = block.elements().iter().peekable();
        let mut info = Self::new();

        if let Some(e) = elements.next_if(|e| e.tlv_type() == tlv::CONTENT_TYPE) {
            info.content_type = ContentType(e.read_non_negative_integer()?);
        }
        if let Some(e) = elements.next_if(|e| e.tlv_type() == tlv::FRESHNESS_PERIOD) {
            info.freshness_period = Duration::from_millis(e.read_non_negative_integer()?);
        }
        if let Some(e) = elements.next_if(|e| e.tlv_type() == tlv::FINAL_BLOCK_ID) {
            let inner = e.block_from_value()?;
            info.final_block_id = Some(Component::from_block(inner)?);
        }
        info.app_meta_info = elements.cloned().collect();
        if let Some(wire) = block.wire() {
            info.wire = OnceLock::from(wire.clone());
        }
        Ok(info)
    }
}

impl PartialEq for MetaInfo {
    fn eq(&self, other: &Self) -> bool {
        self.content_type == other.content_type
            && self.freshness_period == other.freshness_period
            && self.final_block_id == other.final_block_id
            && self.app_meta_info == other.app_meta_info
    }
}

impl Eq for MetaInfo {}

impl fmt::Display for MetaInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentType: {}", self.content_type.code())?;
        if !self.freshness_period.is_zero() {
            write!(f, ", FreshnessPeriod: {} milliseconds", self.freshness_period.as_millis())?;
        }
        if let Some(id) = &self.final_block_id {
            write!(f, ", FinalBlockId: {id}")?;
        }
        for block in &self.app_meta_info {
            write!(f, ", AppMetaInfoTlvType: {}", block.tlv_type())?;
        }
        Ok(())
    }
}

fn check_app_meta_info(block: &Block) -> Result<(), ConstructionError> {
    if (tlv::APP_META_INFO_MIN..=tlv::APP_META_INFO_MAX).contains(&block.tlv_type()) {
        Ok(())
    } else {
        Err(ConstructionError::AppMetaInfoType(block.tlv_type()))
    }
}
