use super::*;

// Push Operations (C6.7): PUSH0, PUSH1..PUSH32. The dispatch loop advances
// `pc` by `1 + push_data_len` after a successful PUSH, so these handlers
// only read the immediate bytes — they never touch `pc` themselves.

impl VM {
    pub fn op_push(&mut self, current_call_frame: &mut CallFrame, op: Opcode) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;

        let n_bytes = get_n_value(op, Opcode::PUSH1)?;
        let start = current_call_frame.pc.saturating_add(1);

        let mut word = [0u8; 32];
        let dest_start = 32usize.saturating_sub(n_bytes);
        for i in 0..n_bytes {
            if let Some(byte) = current_call_frame.bytecode.get(start.saturating_add(i)) {
                if let Some(slot) = word.get_mut(dest_start.saturating_add(i)) {
                    *slot = *byte;
                }
            }
        }

        current_call_frame.stack.push(U256::from_big_endian(&word))?;
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_push0(&mut self, current_call_frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::PUSH0)?;
        current_call_frame.stack.push(U256::zero())?;
        Ok(OpcodeSuccess::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_zero_pads_when_truncated_by_code_end() {
        // PUSH2 with only one byte of immediate data left before the code ends.
        let bytecode = vec![0x61, 0xab];
        let mut frame = CallFrame::new(
            Address::zero(),
            Address::zero(),
            Address::zero(),
            bytecode,
            U256::zero(),
            Vec::new(),
            false,
            false,
            1_000_000,
            0,
        );
        let db: std::sync::Arc<dyn crate::db::Database> = std::sync::Arc::new(crate::db::Db::new());
        let cache = crate::db::CacheDB::new(db.clone());
        let mut vm = VM::new(
            Some(Address::zero()),
            crate::environment::Environment::new(Address::zero()),
            Address::zero(),
            U256::zero(),
            Vec::new(),
            1_000_000,
            U256::zero(),
            0,
            db,
            cache,
            crate::fork::Fork::Shanghai,
        )
        .unwrap();

        vm.op_push(&mut frame, Opcode::PUSH2).unwrap();
        assert_eq!(frame.stack.pop().unwrap(), U256::from(0xab00));
    }
}
