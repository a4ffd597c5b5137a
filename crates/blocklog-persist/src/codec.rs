use blocklog_core::types::{BlockId, CellPos, Tick};

use crate::error::PersistError;
use crate::format::*;

/// Fixed-width record serializer. Stateless apart from byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordCodec {
    pub endianness: Endianness,
}

impl RecordCodec {
    pub fn new(endianness: Endianness) -> Self {
        Self { endianness }
    }

    /// Serialize history records in the given order (oldest first on disk).
    pub fn encode_history(&self, records: &[HistoryRecord]) -> Vec<u8> {
        let mut out = Vec::with_capacity(records.len() * HISTORY_RECORD_SIZE);
        for record in records {
            self.put_u64(&mut out, record.time.0);
            self.put_pos(&mut out, record.pos);
            out.push(record.old.0);
            out.push(record.new.0);
        }
        out
    }

    /// Parse a buffer of history records.
    pub fn decode_history(&self, bytes: &[u8]) -> Result<Vec<HistoryRecord>, PersistError> {
        check_alignment(bytes, HISTORY_RECORD_SIZE)?;
        Ok(bytes
            .chunks_exact(HISTORY_RECORD_SIZE)
            .map(|rec| HistoryRecord {
                time: Tick(self.get_u64(&rec[0..8])),
                pos: self.get_pos(&rec[8..14]),
                old: BlockId(rec[14]),
                new: BlockId(rec[15]),
            })
            .collect())
    }

    /// Serialize redo-trail records.
    pub fn encode_redo(&self, records: &[RedoRecord]) -> Vec<u8> {
        let mut out = Vec::with_capacity(records.len() * REDO_RECORD_SIZE);
        for record in records {
            self.put_pos(&mut out, record.pos);
            out.push(record.block.0);
        }
        out
    }

    /// Parse a buffer of redo-trail records.
    pub fn decode_redo(&self, bytes: &[u8]) -> Result<Vec<RedoRecord>, PersistError> {
        check_alignment(bytes, REDO_RECORD_SIZE)?;
        Ok(bytes
            .chunks_exact(REDO_RECORD_SIZE)
            .map(|rec| RedoRecord {
                pos: self.get_pos(&rec[0..6]),
                block: BlockId(rec[6]),
            })
            .collect())
    }

    fn put_u64(&self, out: &mut Vec<u8>, value: u64) {
        match self.endianness {
            Endianness::Little => out.extend_from_slice(&value.to_le_bytes()),
            Endianness::Big => out.extend_from_slice(&value.to_be_bytes()),
        }
    }

    fn put_i16(&self, out: &mut Vec<u8>, value: i16) {
        match self.endianness {
            Endianness::Little => out.extend_from_slice(&value.to_le_bytes()),
            Endianness::Big => out.extend_from_slice(&value.to_be_bytes()),
        }
    }

    // Wire order is x, z, y.
    fn put_pos(&self, out: &mut Vec<u8>, pos: CellPos) {
        self.put_i16(out, pos.x);
        self.put_i16(out, pos.z);
        self.put_i16(out, pos.y);
    }

    fn get_u64(&self, bytes: &[u8]) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        match self.endianness {
            Endianness::Little => u64::from_le_bytes(buf),
            Endianness::Big => u64::from_be_bytes(buf),
        }
    }

    fn get_i16(&self, bytes: &[u8]) -> i16 {
        let buf = [bytes[0], bytes[1]];
        match self.endianness {
            Endianness::Little => i16::from_le_bytes(buf),
            Endianness::Big => i16::from_be_bytes(buf),
        }
    }

    fn get_pos(&self, bytes: &[u8]) -> CellPos {
        let x = self.get_i16(&bytes[0..2]);
        let z = self.get_i16(&bytes[2..4]);
        let y = self.get_i16(&bytes[4..6]);
        CellPos::new(x, y, z)
    }
}

fn check_alignment(bytes: &[u8], record_size: usize) -> Result<(), PersistError> {
    if bytes.len() % record_size != 0 {
        return Err(PersistError::MisalignedRecords {
            len: bytes.len(),
            record_size,
        });
    }
    Ok(())
}
