use super::*;

// Duplication Operations (C6.8): DUP1..DUP16.

impl VM {
    pub fn op_dup(&mut self, current_call_frame: &mut CallFrame, op: Opcode) -> Result<OpcodeSuccess, VMError> {
        self.increase_consumed_gas(current_call_frame, gas_cost::VERYLOW)?;
        let n = get_n_value(op, Opcode::DUP1)?;
        current_call_frame.stack.dup(n)?;
        Ok(OpcodeSuccess::Continue)
    }
}
