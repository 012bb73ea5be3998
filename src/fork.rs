use crate::opcodes::Opcode;

/// A tag plus an associated constant table plus a dispatch-time opcode-
/// acceptance predicate, rather than three copies of the interpreter.
///
/// F0/F1/F2 correspond to the original chain launch, its first protocol
/// revision, and a later revision adding a zero-push opcode and initcode
/// metering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fork {
    Frontier,
    Homestead,
    Shanghai,
}

impl Fork {
    /// Whether `opcode` decodes to something other than INVALID under this
    /// fork. PUSH0 is the only opcode gated this way; everything else in the
    /// table is available (or unassigned, which already maps to INVALID) in
    /// all three forks.
    pub fn accepts(self, opcode: Opcode) -> bool {
        match opcode {
            Opcode::PUSH0 => matches!(self, Fork::Shanghai),
            _ => true,
        }
    }

    /// Whether a CREATE/CREATE2 that can't afford its code-deposit charge
    /// rolls back the nonce bump and value transfer (F1/F2) or leaves the
    /// nonce incremented with an empty contract at the target address (the
    /// historical F0 behavior). See the open question in the design notes:
    /// this crate specs F0 as F1/F2 unless exact F0 semantics are required.
    pub fn create_failure_reverts_nonce(self) -> bool {
        matches!(self, Fork::Homestead | Fork::Shanghai)
    }

    pub fn enforces_runtime_code_size_limit(self) -> bool {
        matches!(self, Fork::Shanghai)
    }

    pub fn metered_initcode(self) -> bool {
        matches!(self, Fork::Shanghai)
    }
}
