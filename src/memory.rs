use ethereum_types::U256;

use crate::errors::{InternalError, VMError};
use crate::gas_cost;

/// Byte-addressable buffer that expands in 32-byte words (C3). Reads/writes
/// at (offset, size) expand the buffer to ceil((offset+size)/32)*32 bytes,
/// zero-filling new bytes; size-0 accesses never expand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memory {
    data: Vec<u8>,
}

fn required_len(offset: usize, size: usize) -> Result<usize, VMError> {
    offset
        .checked_add(size)
        .ok_or(VMError::Internal(InternalError::Overflow))
}

fn words_for(len: usize) -> Result<u64, VMError> {
    let len: u64 = len.try_into().map_err(|_| InternalError::TypeConversion)?;
    Ok(len.div_ceil(32))
}

impl Memory {
    /// `msize()`: current byte length, always a multiple of 32 after any
    /// non-empty access.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    fn current_words(&self) -> Result<u64, VMError> {
        words_for(self.data.len())
    }

    /// Additional gas to charge BEFORE attempting to resize, so an
    /// unaffordable expansion fails on out-of-gas rather than allocating.
    pub fn expansion_cost(&self, offset: usize, size: usize) -> Result<u64, VMError> {
        if size == 0 {
            return Ok(0);
        }
        let new_words = words_for(required_len(offset, size)?)?;
        gas_cost::memory_expansion_cost(self.current_words()?, new_words)
    }

    fn resize(&mut self, offset: usize, size: usize) -> Result<(), VMError> {
        if size == 0 {
            return Ok(());
        }
        let new_words = words_for(required_len(offset, size)?)?;
        let new_len: usize = new_words
            .checked_mul(32)
            .ok_or(VMError::Internal(InternalError::Overflow))?
            .try_into()
            .map_err(|_| InternalError::TypeConversion)?;
        if new_len > self.data.len() {
            self.data.resize(new_len, 0);
        }
        Ok(())
    }

    pub fn load_word(&mut self, offset: usize) -> Result<U256, VMError> {
        self.resize(offset, 32)?;
        let end = required_len(offset, 32)?;
        let slice = self
            .data
            .get(offset..end)
            .ok_or(VMError::Internal(InternalError::Overflow))?;
        Ok(U256::from_big_endian(slice))
    }

    pub fn store_word(&mut self, offset: usize, value: U256) -> Result<(), VMError> {
        self.resize(offset, 32)?;
        let end = required_len(offset, 32)?;
        let slice = self
            .data
            .get_mut(offset..end)
            .ok_or(VMError::Internal(InternalError::Overflow))?;
        value.to_big_endian(slice);
        Ok(())
    }

    pub fn store_byte(&mut self, offset: usize, value: u8) -> Result<(), VMError> {
        self.resize(offset, 1)?;
        let slot = self
            .data
            .get_mut(offset)
            .ok_or(VMError::Internal(InternalError::Overflow))?;
        *slot = value;
        Ok(())
    }

    /// Zero-filling read that tolerates reads past what was ever written —
    /// used by opcodes like KECCAK256 over freshly expanded memory.
    pub fn load_range(&mut self, offset: usize, size: usize) -> Result<Vec<u8>, VMError> {
        self.resize(offset, size)?;
        let end = required_len(offset, size)?;
        Ok(self
            .data
            .get(offset..end)
            .ok_or(VMError::Internal(InternalError::Overflow))?
            .to_vec())
    }

    pub fn store_bytes(&mut self, offset: usize, data: &[u8]) -> Result<(), VMError> {
        self.resize(offset, data.len())?;
        let end = required_len(offset, data.len())?;
        let slice = self
            .data
            .get_mut(offset..end)
            .ok_or(VMError::Internal(InternalError::Overflow))?;
        slice.copy_from_slice(data);
        Ok(())
    }

    pub fn copy_within(&mut self, dest: usize, src: usize, size: usize) -> Result<(), VMError> {
        if size == 0 {
            return Ok(());
        }
        let max_offset = dest.max(src);
        self.resize(max_offset, size)?;
        let bytes = self.load_range(src, size)?;
        self.store_bytes(dest, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_load_word_round_trips() {
        let mut memory = Memory::default();
        let value = U256::from(0x42);
        memory.store_word(0, value).unwrap();
        assert_eq!(memory.load_word(0).unwrap(), value);
        assert_eq!(memory.size(), 32);
    }

    #[test]
    fn size_zero_access_does_not_expand() {
        let mut memory = Memory::default();
        memory.load_range(100, 0).unwrap();
        assert_eq!(memory.size(), 0);
    }

    #[test]
    fn expansion_is_always_a_multiple_of_32() {
        let mut memory = Memory::default();
        memory.store_byte(5, 1).unwrap();
        assert_eq!(memory.size() % 32, 0);
        assert_eq!(memory.size(), 32);
    }
}
