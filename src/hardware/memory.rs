use crate::errors::{ExecutionError, RunError};
use crate::hardware::image::AddressSpace;
use crate::numbers::Word;
use std::fmt::{Debug, Formatter};
use std::ops::{Index, IndexMut};

/// Hard machine limit of addressable mailboxes.
pub const MAX_MAILBOXES: usize = 100;

/// A mailbox number that was validated against the bound of a [`Memory`].
///
/// Only [`Memory::check_address`] creates one, so indexing with it cannot leave the address space.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Address(u8);

impl Address {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
    #[must_use]
    pub fn value(self) -> i32 {
        i32::from(self.0)
    }
}

/// The mailboxes of the LMC on top of an image backed [`AddressSpace`].
pub struct Memory {
    space: Box<dyn AddressSpace>,
    /// `min(words in the image, MAX_MAILBOXES)`
    bound: usize,
}

impl Debug for Memory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Mailboxes: {:?} ({:?} backing), contents: {:?}",
            self.bound,
            self.space.backing(),
            self.mailboxes()
        )
    }
}
impl Index<Address> for Memory {
    type Output = Word;
    fn index(&self, address: Address) -> &Self::Output {
        &self.mailboxes()[address.index()]
    }
}
impl IndexMut<Address> for Memory {
    fn index_mut(&mut self, address: Address) -> &mut Self::Output {
        let bound = self.bound;
        &mut self.space.words_mut()[..bound][address.index()]
    }
}
impl Memory {
    #[must_use]
    pub fn new(space: Box<dyn AddressSpace>) -> Self {
        let bound = space.words().len().min(MAX_MAILBOXES);
        Self { space, bound }
    }
    /// Number of valid addresses, legal addresses are `0..bound`.
    #[must_use]
    pub const fn bound(&self) -> usize {
        self.bound
    }
    /// Validates an untrusted number as mailbox address.
    ///
    /// # Errors
    /// - `address` is negative or not below [`Memory::bound`]
    pub fn check_address(&self, address: i32) -> Result<Address, ExecutionError> {
        u8::try_from(address)
            .ok()
            .filter(|a| usize::from(*a) < self.bound)
            .map(Address)
            .ok_or(ExecutionError::IllegalAddress(address))
    }
    /// The addressable part of the image, words beyond [`MAX_MAILBOXES`] are not included.
    #[must_use]
    pub fn mailboxes(&self) -> &[Word] {
        &self.space.words()[..self.bound]
    }
    /// Hands the address space back to its provider, see [`AddressSpace::release`].
    ///
    /// # Errors
    /// - Writing changes back to the image failed
    pub fn release(self) -> Result<(), RunError> {
        self.space.release()
    }
}
