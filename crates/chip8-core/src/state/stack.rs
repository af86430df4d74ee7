use crate::Fault;

/// Number of return-address slots in the call stack.
pub const STACK_DEPTH: usize = 16;

/// Fixed-depth call stack of return addresses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CallStack {
    slots: [u16; STACK_DEPTH],
    sp: u8,
}

impl CallStack {
    /// Number of return addresses currently on the stack.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.sp as usize
    }

    /// Returns `true` when no return address is held.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sp == 0
    }

    /// Returns `true` when every slot is in use.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.depth() == STACK_DEPTH
    }

    /// Return address that the next `pop` would yield.
    #[must_use]
    pub const fn peek(&self) -> Option<u16> {
        if self.sp == 0 {
            None
        } else {
            Some(self.slots[self.sp as usize - 1])
        }
    }

    /// Live return addresses, oldest first.
    #[must_use]
    pub fn frames(&self) -> &[u16] {
        &self.slots[..self.depth()]
    }

    /// Pushes a return address.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::StackOverflow`] when all slots are in use; the stack
    /// is left unchanged.
    pub fn push(&mut self, addr: u16) -> Result<(), Fault> {
        if self.is_full() {
            return Err(Fault::StackOverflow);
        }
        self.slots[self.depth()] = addr;
        self.sp += 1;
        Ok(())
    }

    /// Pops the most recent return address.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::StackUnderflow`] when the stack is empty.
    pub fn pop(&mut self) -> Result<u16, Fault> {
        let addr = self.peek().ok_or(Fault::StackUnderflow)?;
        self.sp -= 1;
        Ok(addr)
    }

    /// Rebuilds a stack from raw parts, rejecting a pointer past the depth.
    #[must_use]
    pub fn from_parts(slots: [u16; STACK_DEPTH], sp: u8) -> Option<Self> {
        (usize::from(sp) <= STACK_DEPTH).then_some(Self { slots, sp })
    }
}
