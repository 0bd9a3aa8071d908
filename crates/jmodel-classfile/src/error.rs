use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Why a class file (or one of its descriptors or signatures) could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input ended inside a structure.
    UnexpectedEof,
    /// Bytes left over after a structure that must consume its whole input.
    TrailingBytes(usize),
    InvalidMagic(u32),
    /// Index zero, out of range, or the unusable second slot of a long/double.
    InvalidConstantPoolIndex(u16),
    InvalidConstantPoolTag(u8),
    ConstantPoolTypeMismatch {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    InvalidModifiedUtf8,
    InvalidDescriptor(String),
    InvalidSignature(String),
    /// Attribute by name (`ConstantValue`, `element_value`, ...).
    MalformedAttribute(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedEof => f.write_str("class file is truncated"),
            Error::TrailingBytes(count) => write!(f, "{count} unread bytes at end of structure"),
            Error::InvalidMagic(magic) => {
                write!(f, "not a class file (magic 0x{magic:08X}, expected 0xCAFEBABE)")
            }
            Error::InvalidConstantPoolIndex(index) => {
                write!(f, "constant pool index #{index} does not name an entry")
            }
            Error::InvalidConstantPoolTag(tag) => write!(f, "unknown constant pool tag {tag}"),
            Error::ConstantPoolTypeMismatch {
                index,
                expected,
                found,
            } => write!(f, "constant pool entry #{index} is {found}, expected {expected}"),
            Error::InvalidModifiedUtf8 => f.write_str("constant pool string is not modified UTF-8"),
            Error::InvalidDescriptor(desc) => write!(f, "malformed descriptor `{desc}`"),
            Error::InvalidSignature(sig) => write!(f, "malformed generic signature `{sig}`"),
            Error::MalformedAttribute(name) => write!(f, "malformed `{name}` attribute"),
        }
    }
}

impl std::error::Error for Error {}
