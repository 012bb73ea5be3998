use super::*;
use crate::constants::BLOCKHASH_WINDOW;

// Block Information (C6.5): BLOCKHASH, COINBASE, TIMESTAMP, NUMBER,
// DIFFICULTY, GASLIMIT, CHAINID, SELFBALANCE, BASEFEE.

impl VM {
    pub fn op_blockhash(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BLOCKHASH)?;
        let requested = current_call_frame.stack.pop()?;

        let oldest_available = self.env.number.saturating_sub(U256::from(BLOCKHASH_WINDOW));
        if requested < oldest_available || requested >= self.env.number {
            current_call_frame.stack.push(U256::zero())?;
            return Ok(OpcodeSuccess::Continue);
        }

        let block_number = requested.low_u64();
        let hash = self.cache.get_block_hash(block_number).unwrap_or_default();
        current_call_frame.stack.push(hash)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_coinbase(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(address_to_word(self.env.coinbase))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_timestamp(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(self.env.timestamp)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_number(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(self.env.number)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_difficulty(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(self.env.difficulty)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_gaslimit(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(U256::from(self.env.gas_limit))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_chainid(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(self.env.chain_id)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_selfbalance(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::LOW)?;
        let balance = self.cache.get_balance(current_call_frame.target);
        current_call_frame.stack.push(balance)?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_basefee(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::BASE)?;
        current_call_frame.stack.push(self.env.base_fee)?;
        Ok(OpcodeSuccess::Continue)
    }
}
