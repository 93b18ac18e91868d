//! Backing an address space by an image file.
//!
//! An image is a flat array of native-endian [`Word`]s without any header.
//! Two interchangeable strategies exist: [`BufferedImage`] copies the file into a heap buffer,
//! `MappedImage` maps the file into the process (Unix only). Whether writes reach the file is
//! decided by [`WriteBack`], never by the strategy.
use crate::errors::{LoadImageError, RunError};
use crate::numbers::{WORD_BYTES, Word, words_from_ne_bytes, words_to_ne_bytes};
use log::{debug, warn};
use std::fmt::Debug;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// How the words of an image are held in memory.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Backing {
    /// Map the file, fall back to a heap copy if mapping fails.
    #[default]
    Auto,
    /// Map the file, fail if that is not possible.
    Mapped,
    /// Copy the file into a heap buffer.
    Buffered,
}

/// Whether mailbox changes end up in the image file.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum WriteBack {
    /// The file is never modified.
    #[default]
    Discard,
    /// All changes are committed to the file when the address space is released.
    Persist,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct ImageOptions {
    pub backing: Backing,
    pub write_back: WriteBack,
}

/// The words of a loaded image, exclusively owned by one run.
pub trait AddressSpace: Debug {
    fn words(&self) -> &[Word];
    fn words_mut(&mut self) -> &mut [Word];
    /// The strategy actually in use, never [`Backing::Auto`].
    fn backing(&self) -> Backing;
    /// Ends the lifetime of the address space, committing changes per [`WriteBack`].
    ///
    /// # Errors
    /// - Flushing or unmapping failed
    fn release(self: Box<Self>) -> Result<(), RunError>;
}

/// Opens `path` and makes its words available with the strategy selected in `options`.
///
/// # Errors
/// - The file cannot be opened, its size cannot be determined or it cannot be read or mapped
/// - The file length is not a multiple of the word size
pub fn load_image(
    path: &Path,
    options: ImageOptions,
) -> Result<Box<dyn AddressSpace>, LoadImageError> {
    let file = OpenOptions::new()
        .read(true)
        .write(options.write_back == WriteBack::Persist)
        .open(path)
        .map_err(|e| LoadImageError::io("open", e))?;
    let byte_len = file
        .metadata()
        .map_err(|e| LoadImageError::io("fstat", e))?
        .len();
    if byte_len % WORD_BYTES as u64 != 0 {
        return Err(LoadImageError::PartialWord { byte_len });
    }
    let byte_len = usize::try_from(byte_len)
        .map_err(|_| LoadImageError::io("fstat", io::ErrorKind::FileTooLarge.into()))?;
    debug!(
        "loading {} ({byte_len} bytes) with {:?}",
        path.display(),
        options
    );
    match options.backing {
        Backing::Buffered => Ok(Box::new(BufferedImage::read(
            file,
            byte_len,
            options.write_back,
        )?)),
        Backing::Mapped => map_image(&file, byte_len, options.write_back),
        Backing::Auto => match map_image(&file, byte_len, options.write_back) {
            Ok(space) => Ok(space),
            Err(e) => {
                warn!("{e}, falling back to a buffered image");
                Ok(Box::new(BufferedImage::read(
                    file,
                    byte_len,
                    options.write_back,
                )?))
            }
        },
    }
}

#[cfg(unix)]
fn map_image(
    file: &File,
    byte_len: usize,
    write_back: WriteBack,
) -> Result<Box<dyn AddressSpace>, LoadImageError> {
    Ok(Box::new(mapped::MappedImage::map(
        file, byte_len, write_back,
    )?))
}

#[cfg(not(unix))]
fn map_image(
    _file: &File,
    _byte_len: usize,
    _write_back: WriteBack,
) -> Result<Box<dyn AddressSpace>, LoadImageError> {
    Err(LoadImageError::MappingUnsupported)
}

/// Heap copy of an image.
#[derive(Debug)]
pub struct BufferedImage {
    words: Vec<Word>,
    /// Present only for [`WriteBack::Persist`].
    sink: Option<File>,
}

impl BufferedImage {
    /// An image that lives only in memory, release never writes anywhere.
    #[must_use]
    pub const fn from_words(words: Vec<Word>) -> Self {
        Self { words, sink: None }
    }
    fn read(mut file: File, byte_len: usize, write_back: WriteBack) -> Result<Self, LoadImageError> {
        Ok(Self {
            words: read_words(&mut file, byte_len)?,
            sink: (write_back == WriteBack::Persist).then_some(file),
        })
    }
}

/// Reads exactly the `byte_len` bytes `fstat` reported, the same extent a mapping covers.
fn read_words(source: &mut impl Read, byte_len: usize) -> Result<Vec<Word>, LoadImageError> {
    let mut bytes = vec![0; byte_len];
    source
        .read_exact(&mut bytes)
        .map_err(|e| LoadImageError::io("read", e))?;
    Ok(words_from_ne_bytes(&bytes))
}

impl AddressSpace for BufferedImage {
    fn words(&self) -> &[Word] {
        &self.words
    }
    fn words_mut(&mut self) -> &mut [Word] {
        &mut self.words
    }
    fn backing(&self) -> Backing {
        Backing::Buffered
    }
    fn release(self: Box<Self>) -> Result<(), RunError> {
        let Some(mut file) = self.sink else {
            return Ok(());
        };
        file.seek(SeekFrom::Start(0))
            .map_err(release_error("lseek"))?;
        file.write_all(&words_to_ne_bytes(&self.words))
            .map_err(release_error("write"))?;
        file.sync_all().map_err(release_error("fsync"))?;
        debug!("wrote {} words back to the image", self.words.len());
        Ok(())
    }
}

fn release_error(operation: &'static str) -> impl FnOnce(io::Error) -> RunError {
    move |source| RunError::Release { operation, source }
}

#[cfg(unix)]
mod mapped {
    use super::{AddressSpace, Backing, WriteBack};
    use crate::errors::{LoadImageError, RunError};
    use crate::numbers::{WORD_BYTES, Word};
    use log::debug;
    use std::fs::File;
    use std::io;
    use std::os::fd::AsRawFd;
    use std::ptr::{self, NonNull};
    use std::slice;

    /// An image mapped into the process.
    ///
    /// [`WriteBack::Discard`] uses a private copy-on-write mapping, [`WriteBack::Persist`] a
    /// shared one that is synced on release.
    #[derive(Debug)]
    pub struct MappedImage {
        ptr: NonNull<Word>,
        byte_len: usize,
        write_back: WriteBack,
        mapped: bool,
    }

    impl MappedImage {
        pub fn map(
            file: &File,
            byte_len: usize,
            write_back: WriteBack,
        ) -> Result<Self, LoadImageError> {
            // mmap rejects zero lengths, an empty image needs no mapping
            if byte_len == 0 {
                return Ok(Self {
                    ptr: NonNull::dangling(),
                    byte_len,
                    write_back,
                    mapped: false,
                });
            }
            let flags = match write_back {
                WriteBack::Discard => libc::MAP_PRIVATE,
                WriteBack::Persist => libc::MAP_SHARED,
            };
            // SAFETY: the descriptor is open for the duration of the call and the length is
            // non-zero. The kernel chooses a page aligned address, so it is aligned for Word.
            let raw = unsafe {
                libc::mmap(
                    ptr::null_mut(),
                    byte_len,
                    libc::PROT_READ | libc::PROT_WRITE,
                    flags,
                    file.as_raw_fd(),
                    0,
                )
            };
            if raw == libc::MAP_FAILED {
                return Err(LoadImageError::io("mmap", io::Error::last_os_error()));
            }
            let ptr = NonNull::new(raw.cast::<Word>()).ok_or_else(|| {
                LoadImageError::io("mmap", io::ErrorKind::AddrNotAvailable.into())
            })?;
            debug!("mapped {byte_len} bytes, write back: {write_back:?}");
            Ok(Self {
                ptr,
                byte_len,
                write_back,
                mapped: true,
            })
        }
        const fn word_count(&self) -> usize {
            self.byte_len / WORD_BYTES
        }
        fn unmap(&mut self) -> io::Result<()> {
            if !self.mapped {
                return Ok(());
            }
            self.mapped = false;
            // SAFETY: ptr and byte_len describe the mapping created in `map`, no slice borrowed
            // from it can outlive `&mut self`.
            if unsafe { libc::munmap(self.ptr.as_ptr().cast(), self.byte_len) } == -1 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        }
    }

    impl AddressSpace for MappedImage {
        fn words(&self) -> &[Word] {
            // SAFETY: the mapping covers byte_len bytes, is aligned, and stays alive until
            // `unmap`, which needs `&mut self`. An empty image uses a dangling aligned pointer.
            unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.word_count()) }
        }
        fn words_mut(&mut self) -> &mut [Word] {
            // SAFETY: as in `words`, `&mut self` guarantees exclusive access.
            unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.word_count()) }
        }
        fn backing(&self) -> Backing {
            Backing::Mapped
        }
        fn release(mut self: Box<Self>) -> Result<(), RunError> {
            if self.mapped && self.write_back == WriteBack::Persist {
                // SAFETY: the range is exactly the live mapping.
                let rc = unsafe {
                    libc::msync(self.ptr.as_ptr().cast(), self.byte_len, libc::MS_SYNC)
                };
                if rc == -1 {
                    return Err(RunError::Release {
                        operation: "msync",
                        source: io::Error::last_os_error(),
                    });
                }
            }
            self.unmap().map_err(|source| RunError::Release {
                operation: "munmap",
                source,
            })
        }
    }

    impl Drop for MappedImage {
        fn drop(&mut self) {
            if let Err(e) = self.unmap() {
                eprintln!("Error unmapping image: {e}");
            }
        }
    }
}
