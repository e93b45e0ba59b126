//! Self-describing tagged value exchanged between the launcher and daemons.
//!
//! A [`Value`] owns its string and blob payloads exclusively; the pointer kind only aliases.
//! Every copy operation (`load`, `unload`, `transfer`) drops any previously owned payload before installing the new one.
mod data;
pub use data::{Address, ByteObject, Data, DataType, Pid, Timeval};

use tracing::error;

use crate::{CodecError, CodecResult};

/// Optionally keyed, tagged value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Value {
    key: Option<String>,
    ty: DataType,
    data: Data,
}

impl Value {
    /// Create an unkeyed value holding `data`, tagged with its own type.
    pub fn new(data: Data) -> Self {
        Self {
            key: None,
            ty: data.data_type(),
            data,
        }
    }

    /// Create a keyed value holding `data`.
    pub fn keyed(key: impl Into<String>, data: Data) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::new(data)
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn data_type(&self) -> DataType {
        self.ty
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Stamp `ty` and install a copy of `raw` as the payload.
    ///
    /// - string/blob: deep copy; `None` installs a null string / empty blob;
    /// - pointer: aliases the given address;
    /// - fixed-width kinds: copied by value; `None` zeroes the payload.
    ///
    /// A `raw` payload of a different kind than `ty` fails with `TypeMismatch` and leaves the value untouched.
    /// Tags that carry no value fail with `NotSupported`; the tag is still stamped.
    pub fn load(&mut self, raw: Option<&Data>, ty: DataType) -> CodecResult<()> {
        if let Some(raw) = raw {
            if raw.data_type() != ty {
                return Err(CodecError::TypeMismatch {
                    expected: ty.as_str(),
                    actual: raw.data_type().as_str(),
                });
            }
        }

        self.ty = ty;
        if !ty.is_value_kind() {
            error!(ty = %ty, "load: unsupported data type");
            return Err(CodecError::NotSupported(ty));
        }
        self.data = match raw {
            Some(raw) => raw.duplicate(),
            None => Data::zeroed(ty).ok_or(CodecError::NotSupported(ty))?,
        };
        Ok(())
    }

    /// Copy the payload out into `slot`.
    ///
    /// `ty` must equal the stored tag (`TypeMismatch` otherwise).
    /// `slot` must be present; for fixed-width and pointer kinds it must also already hold a target
    /// (`BadParam` otherwise), which is overwritten. String/blob kinds always receive a fresh deep copy,
    /// so an empty target is fine for them.
    pub fn unload(&self, slot: Option<&mut Option<Data>>, ty: DataType) -> CodecResult<()> {
        if ty != self.ty {
            return Err(CodecError::TypeMismatch {
                expected: self.ty.as_str(),
                actual: ty.as_str(),
            });
        }
        let Some(slot) = slot else {
            error!(ty = %ty, "unload: no destination");
            return Err(CodecError::BadParam("unload destination is missing"));
        };
        if !ty.is_owned() && slot.is_none() {
            error!(ty = %ty, "unload: destination has no target");
            return Err(CodecError::BadParam("unload target is missing"));
        }
        if !ty.is_value_kind() {
            error!(ty = %ty, "unload: unsupported data type");
            return Err(CodecError::NotSupported(ty));
        }

        *slot = Some(self.data.duplicate());
        Ok(())
    }

    /// Copy `src`'s key (if any) and payload into `self` under the same per-kind rules as [`Value::load`].
    ///
    /// On `NotSupported` the payload and tag of `self` are untouched, but the key has already been copied.
    pub fn transfer(&mut self, src: &Value) -> CodecResult<()> {
        if let Some(key) = &src.key {
            self.key = Some(key.clone());
        }
        if !src.ty.is_value_kind() {
            error!(ty = %src.ty, "transfer: unsupported data type");
            return Err(CodecError::NotSupported(src.ty));
        }

        self.ty = src.ty;
        self.data = src.data.duplicate();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<Data> {
        let anchor = 42u64;
        vec![
            Data::Bool(true),
            Data::Byte(0xab),
            Data::String(Some("hello".into())),
            Data::Size(usize::MAX),
            Data::Pid(4242),
            Data::Rank(17),
            Data::Int(-5),
            Data::Int8(-8),
            Data::Int16(-16),
            Data::Int32(-32),
            Data::Int64(i64::MIN),
            Data::Uint(5),
            Data::Uint8(8),
            Data::Uint16(16),
            Data::Uint32(32),
            Data::Uint64(u64::MAX),
            Data::ByteObject(ByteObject::new(vec![1, 2, 3])),
            Data::Float(1.5),
            Data::Timeval(Timeval { sec: 10, usec: 20 }),
            Data::Ptr(Address::from_ptr(&anchor)),
        ]
    }

    #[test]
    fn load_then_unload_returns_same_payload_for_every_kind() {
        for x in samples() {
            let ty = x.data_type();
            let mut v = Value::default();
            v.load(Some(&x), ty).unwrap();

            let mut y = Data::zeroed(ty);
            v.unload(Some(&mut y), ty).unwrap();

            assert_eq!(y.as_ref(), Some(&x), "roundtrip failed for {ty}");
        }
    }

    #[test]
    fn load_null_string_and_blob_installs_empty_payload() {
        let mut v = Value::new(Data::String(Some("old".into())));
        v.load(None, DataType::String).unwrap();
        assert_eq!(v.data(), &Data::String(None));

        let mut v = Value::new(Data::ByteObject(ByteObject::new(vec![9])));
        v.load(None, DataType::ByteObject).unwrap();
        assert_eq!(v.data(), &Data::ByteObject(ByteObject::default()));
    }

    #[test]
    fn load_null_scalar_zeroes_payload() {
        let mut v = Value::new(Data::Int64(99));
        v.load(None, DataType::Int64).unwrap();
        assert_eq!(v.data(), &Data::Int64(0));
        assert_eq!(v.data_type(), DataType::Int64);

        v.load(None, DataType::Ptr).unwrap();
        assert!(matches!(v.data(), Data::Ptr(a) if a.is_null()));
    }

    #[test]
    fn load_unsupported_type_fails() {
        let mut v = Value::default();
        let err = v.load(None, DataType::Buffer).unwrap_err();
        assert_eq!(err, CodecError::NotSupported(DataType::Buffer));
        assert_eq!(v.data_type(), DataType::Buffer);
    }

    #[test]
    fn load_rejects_payload_of_other_kind() {
        let mut v = Value::default();
        let err = v.load(Some(&Data::Int8(1)), DataType::Int32).unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { .. }));
    }

    #[test]
    fn mismatched_load_keeps_tag_and_payload_together() {
        let mut v = Value::new(Data::String(Some("old".into())));
        assert!(v.load(Some(&Data::Int8(1)), DataType::Int32).is_err());

        assert_eq!(v.data_type(), DataType::String);
        assert_eq!(v.data(), &Data::String(Some("old".into())));

        let mut slot = Some(Data::Int32(0));
        let err = v.unload(Some(&mut slot), DataType::Int32).unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { .. }));
        assert_eq!(slot, Some(Data::Int32(0)));
    }

    #[test]
    fn load_string_deep_copies() {
        let src = Data::String(Some("abc".into()));
        let mut v = Value::default();
        v.load(Some(&src), DataType::String).unwrap();
        drop(src);
        assert_eq!(v.data(), &Data::String(Some("abc".into())));
    }

    #[test]
    fn load_pointer_aliases_address() {
        let target = [1u8, 2, 3];
        let addr = Address::from_ptr(target.as_ptr());
        let mut v = Value::default();
        v.load(Some(&Data::Ptr(addr)), DataType::Ptr).unwrap();

        match v.data() {
            Data::Ptr(a) => assert_eq!(a.as_ptr::<u8>(), target.as_ptr()),
            other => panic!("expected pointer payload, got {other:?}"),
        }
    }

    #[test]
    fn unload_type_mismatch() {
        let v = Value::new(Data::Int32(1));
        let mut slot = Some(Data::Int64(0));
        let err = v.unload(Some(&mut slot), DataType::Int64).unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { .. }));
        assert_eq!(slot, Some(Data::Int64(0)));
    }

    #[test]
    fn unload_without_slot_is_bad_param() {
        let v = Value::new(Data::Bool(true));
        let err = v.unload(None, DataType::Bool).unwrap_err();
        assert!(matches!(err, CodecError::BadParam(_)));
    }

    #[test]
    fn unload_scalar_into_empty_target_is_bad_param() {
        let v = Value::new(Data::Uint16(3));
        let mut slot = None;
        let err = v.unload(Some(&mut slot), DataType::Uint16).unwrap_err();
        assert!(matches!(err, CodecError::BadParam(_)));
    }

    #[test]
    fn unload_string_allocates_into_empty_target() {
        let v = Value::new(Data::String(Some("fresh".into())));
        let mut slot = None;
        v.unload(Some(&mut slot), DataType::String).unwrap();
        assert_eq!(slot, Some(Data::String(Some("fresh".into()))));
    }

    #[test]
    fn unload_blob_allocates_into_empty_target() {
        let v = Value::new(Data::ByteObject(ByteObject::new(b"blob".to_vec())));
        let mut slot = None;
        v.unload(Some(&mut slot), DataType::ByteObject).unwrap();
        assert_eq!(slot, Some(Data::ByteObject(ByteObject::new(b"blob".to_vec()))));
    }

    #[test]
    fn transfer_copies_key_and_payload() {
        let src = Value::keyed("launch-id", Data::String(Some("n1".into())));
        let mut dest = Value::new(Data::String(Some("stale".into())));

        dest.transfer(&src).unwrap();

        assert_eq!(dest, src);
    }

    #[test]
    fn transfer_keeps_dest_key_when_src_has_none() {
        let src = Value::new(Data::Uint32(7));
        let mut dest = Value::keyed("mine", Data::Bool(false));

        dest.transfer(&src).unwrap();

        assert_eq!(dest.key(), Some("mine"));
        assert_eq!(dest.data(), &Data::Uint32(7));
    }

    #[test]
    fn transfer_unsupported_copies_key_but_not_payload() {
        let mut src = Value::keyed("k", Data::Empty);
        let _ = src.load(None, DataType::ProcName);
        let mut dest = Value::new(Data::Int(1));

        let err = dest.transfer(&src).unwrap_err();

        assert_eq!(err, CodecError::NotSupported(DataType::ProcName));
        assert_eq!(dest.key(), Some("k"));
        assert_eq!(dest.data_type(), DataType::Int);
        assert_eq!(dest.data(), &Data::Int(1));
    }
}
