use super::*;

// Logging Operations (C6.10): LOG0..LOG4.

impl VM {
    pub fn op_log(&mut self, current_call_frame: &mut CallFrame, op: Opcode) -> Result<OpcodeSuccess, VMError> {
        if current_call_frame.is_static {
            return Err(VMError::WriteProtection);
        }

        let number_of_topics = get_number_of_topics(op)?;

        let offset = word_to_usize(current_call_frame.stack.pop()?);
        let size = word_to_usize(current_call_frame.stack.pop()?);

        let mut topics = Vec::new();
        for _ in 0..number_of_topics {
            topics.push(current_call_frame.stack.pop()?);
        }

        let expansion = current_call_frame.memory.expansion_cost(offset, size)?;
        let gas = gas_cost::log_cost(size, number_of_topics)?
            .checked_add(expansion)
            .ok_or(InternalError::Overflow)?;
        self.increase_consumed_gas(current_call_frame, gas)?;

        let data = current_call_frame.memory.load_range(offset, size)?;
        current_call_frame.logs.push(Log {
            address: current_call_frame.target,
            topics,
            data,
        });

        Ok(OpcodeSuccess::Continue)
    }
}
