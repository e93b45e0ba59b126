//! Self-describing data exchange primitives shared by the launcher and its daemons.
//!
//! - [`Buffer`]: growable byte region with independent pack/unpack cursors and
//!   explicit ownership transfer (`load` / `unload` / `copy_payload`).
//! - [`Value`]: optionally keyed, tagged value with per-kind copy and aliasing rules.
//!
//! No byte layout is defined here: once a payload leaves a [`Buffer`] it is opaque.
mod error;
pub use error::{CodecError, CodecResult};

mod buffer;
pub use buffer::{Buffer, BufferType, Region};

mod value;
pub use value::{Address, ByteObject, Data, DataType, Pid, Timeval, Value};
