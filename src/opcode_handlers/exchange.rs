use super::*;

// Exchange Operations (C6.9): SWAP1..SWAP16.

impl VM {
    pub fn op_swap(&mut self, current_call_frame: &mut CallFrame, op: Opcode) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let n = get_n_value(op, Opcode::SWAP1)?;
        current_call_frame.stack.swap(n)?;
        Ok(OpcodeSuccess::Continue)
    }
}
