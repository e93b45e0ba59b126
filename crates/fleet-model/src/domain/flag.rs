use serde::{Deserialize, Serialize};

/// Boolean flag with explicit set/clear semantics. Cleared by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flag(bool);

impl Flag {
    pub const fn enabled() -> Self {
        Self(true)
    }

    pub const fn disabled() -> Self {
        Self(false)
    }

    pub const fn is_enabled(&self) -> bool {
        self.0
    }

    pub const fn is_disabled(&self) -> bool {
        !self.0
    }

    pub fn set(&mut self) {
        self.0 = true;
    }

    pub fn clear(&mut self) {
        self.0 = false;
    }
}

impl From<bool> for Flag {
    fn from(b: bool) -> Self {
        Self(b)
    }
}

impl From<Flag> for bool {
    fn from(f: Flag) -> Self {
        f.0
    }
}

#[cfg(test)]
mod tests {
    use super::Flag;

    #[test]
    fn default_is_disabled() {
        assert!(Flag::default().is_disabled());
    }

    #[test]
    fn set_and_clear_toggle_value() {
        let mut f = Flag::disabled();
        f.set();
        assert!(f.is_enabled());
        f.clear();
        assert!(f.is_disabled());
    }

    #[test]
    fn serde_transparent_roundtrip() {
        let json = serde_json::to_string(&Flag::enabled()).unwrap();
        assert_eq!(json, "true");
        let back: Flag = serde_json::from_str(&json).unwrap();
        assert!(back.is_enabled());
    }
}
