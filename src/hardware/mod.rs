//! Machine resources: the image backed address space, the bounds-checked
//! mailbox view on top of it and the execution state.
pub mod image;
pub mod memory;
pub mod registers;

pub use image::{AddressSpace, Backing, BufferedImage, ImageOptions, WriteBack, load_image};
pub use memory::{Address, MAX_MAILBOXES, Memory};
pub use registers::Registers;
