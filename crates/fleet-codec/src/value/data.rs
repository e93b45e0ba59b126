use std::{fmt, time::Duration};

/// OS process identifier.
pub type Pid = i32;

/// Tag describing which kind of payload a [`crate::Value`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    /// No payload.
    #[default]
    Null,
    Bool,
    Byte,
    String,
    Size,
    Pid,
    /// Daemon rank within a job.
    Rank,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    ByteObject,
    Float,
    Timeval,
    /// Borrowed address; aliased, never owned.
    Ptr,
    /// Packed buffer; only meaningful to the pack layer.
    Buffer,
    /// Full process name; only meaningful to the pack layer.
    ProcName,
}

impl DataType {
    /// Returns `true` if values of this type can be loaded, unloaded and transferred.
    pub fn is_value_kind(&self) -> bool {
        !matches!(self, DataType::Null | DataType::Buffer | DataType::ProcName)
    }

    /// Returns `true` if the payload is heap-owned and deep-copied.
    pub fn is_owned(&self) -> bool {
        matches!(self, DataType::String | DataType::ByteObject)
    }

    /// Returns the type as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Null => "null",
            DataType::Bool => "bool",
            DataType::Byte => "byte",
            DataType::String => "string",
            DataType::Size => "size",
            DataType::Pid => "pid",
            DataType::Rank => "rank",
            DataType::Int => "int",
            DataType::Int8 => "int8",
            DataType::Int16 => "int16",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Uint => "uint",
            DataType::Uint8 => "uint8",
            DataType::Uint16 => "uint16",
            DataType::Uint32 => "uint32",
            DataType::Uint64 => "uint64",
            DataType::ByteObject => "byte-object",
            DataType::Float => "float",
            DataType::Timeval => "timeval",
            DataType::Ptr => "ptr",
            DataType::Buffer => "buffer",
            DataType::ProcName => "proc-name",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque byte blob. An empty blob is the null blob.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ByteObject(Vec<u8>);

impl ByteObject {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Seconds + microseconds timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timeval {
    pub sec: i64,
    pub usec: i64,
}

impl From<Duration> for Timeval {
    fn from(d: Duration) -> Self {
        Self {
            sec: i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
            usec: i64::from(d.subsec_micros()),
        }
    }
}

/// Address carried by the pointer kind.
///
/// Copying an `Address` aliases the same memory; it never owns or frees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address(usize);

impl Address {
    pub const NULL: Address = Address(0);

    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr as usize)
    }

    pub fn as_ptr<T>(&self) -> *const T {
        self.0 as *const T
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// Tagged payload, one variant per supported kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Data {
    #[default]
    Empty,
    Bool(bool),
    Byte(u8),
    String(Option<String>),
    Size(usize),
    Pid(Pid),
    Rank(u32),
    Int(i32),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint(u32),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    ByteObject(ByteObject),
    Float(f32),
    Timeval(Timeval),
    Ptr(Address),
}

impl Data {
    /// Tag matching this payload.
    pub fn data_type(&self) -> DataType {
        match self {
            Data::Empty => DataType::Null,
            Data::Bool(_) => DataType::Bool,
            Data::Byte(_) => DataType::Byte,
            Data::String(_) => DataType::String,
            Data::Size(_) => DataType::Size,
            Data::Pid(_) => DataType::Pid,
            Data::Rank(_) => DataType::Rank,
            Data::Int(_) => DataType::Int,
            Data::Int8(_) => DataType::Int8,
            Data::Int16(_) => DataType::Int16,
            Data::Int32(_) => DataType::Int32,
            Data::Int64(_) => DataType::Int64,
            Data::Uint(_) => DataType::Uint,
            Data::Uint8(_) => DataType::Uint8,
            Data::Uint16(_) => DataType::Uint16,
            Data::Uint32(_) => DataType::Uint32,
            Data::Uint64(_) => DataType::Uint64,
            Data::ByteObject(_) => DataType::ByteObject,
            Data::Float(_) => DataType::Float,
            Data::Timeval(_) => DataType::Timeval,
            Data::Ptr(_) => DataType::Ptr,
        }
    }

    /// Zero payload for `ty`; `None` for tags that carry no value.
    pub fn zeroed(ty: DataType) -> Option<Data> {
        let data = match ty {
            DataType::Bool => Data::Bool(false),
            DataType::Byte => Data::Byte(0),
            DataType::String => Data::String(None),
            DataType::Size => Data::Size(0),
            DataType::Pid => Data::Pid(0),
            DataType::Rank => Data::Rank(0),
            DataType::Int => Data::Int(0),
            DataType::Int8 => Data::Int8(0),
            DataType::Int16 => Data::Int16(0),
            DataType::Int32 => Data::Int32(0),
            DataType::Int64 => Data::Int64(0),
            DataType::Uint => Data::Uint(0),
            DataType::Uint8 => Data::Uint8(0),
            DataType::Uint16 => Data::Uint16(0),
            DataType::Uint32 => Data::Uint32(0),
            DataType::Uint64 => Data::Uint64(0),
            DataType::ByteObject => Data::ByteObject(ByteObject::default()),
            DataType::Float => Data::Float(0.0),
            DataType::Timeval => Data::Timeval(Timeval::default()),
            DataType::Ptr => Data::Ptr(Address::NULL),
            DataType::Null | DataType::Buffer | DataType::ProcName => return None,
        };
        Some(data)
    }

    /// Copy this payload under the per-kind rules: owned kinds are deep-copied,
    /// the pointer kind is aliased, fixed-width kinds are copied by value.
    pub(crate) fn duplicate(&self) -> Data {
        match self {
            Data::String(s) => Data::String(s.as_deref().map(str::to_owned)),
            Data::ByteObject(bo) => Data::ByteObject(ByteObject::new(bo.as_bytes())),
            Data::Ptr(addr) => Data::Ptr(*addr),
            Data::Empty => Data::Empty,
            Data::Bool(v) => Data::Bool(*v),
            Data::Byte(v) => Data::Byte(*v),
            Data::Size(v) => Data::Size(*v),
            Data::Pid(v) => Data::Pid(*v),
            Data::Rank(v) => Data::Rank(*v),
            Data::Int(v) => Data::Int(*v),
            Data::Int8(v) => Data::Int8(*v),
            Data::Int16(v) => Data::Int16(*v),
            Data::Int32(v) => Data::Int32(*v),
            Data::Int64(v) => Data::Int64(*v),
            Data::Uint(v) => Data::Uint(*v),
            Data::Uint8(v) => Data::Uint8(*v),
            Data::Uint16(v) => Data::Uint16(*v),
            Data::Uint32(v) => Data::Uint32(*v),
            Data::Uint64(v) => Data::Uint64(*v),
            Data::Float(v) => Data::Float(*v),
            Data::Timeval(v) => Data::Timeval(*v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeval_splits_duration() {
        let tv = Timeval::from(Duration::new(5, 250_000_000));
        assert_eq!(tv, Timeval { sec: 5, usec: 250_000 });
    }

    #[test]
    fn timeval_saturates_huge_durations() {
        let tv = Timeval::from(Duration::new(u64::MAX, 999_999_999));
        assert_eq!(tv.sec, i64::MAX);
        assert_eq!(tv.usec, 999_999);
    }
}
