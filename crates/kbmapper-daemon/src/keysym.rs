//! Key code to key name resolution
//!
//! Chords in the configuration are written with symbolic key names. The
//! names come from the XKB default keymap when the `xkb` feature is enabled
//! and the keymap compiles; otherwise kernel key names are used.

use evdev::Key;

/// Maps a kernel key code to a symbolic name
pub trait KeysymResolver {
    /// Name of the key, or `None` if the layout has no symbol for it
    fn keysym_name(&self, code: u16) -> Option<String>;

    /// Short description for startup logging
    fn describe(&self) -> &'static str;
}

/// Name of a key for chord composition, falling back to the raw code
pub fn symbolic_name(resolver: &dyn KeysymResolver, code: u16) -> String {
    resolver
        .keysym_name(code)
        .unwrap_or_else(|| code.to_string())
}

/// Fold left/right variants of modifier keysyms into one name.
///
/// `Control_L` and `Control_R` both become `Control`, so a chord is written
/// once regardless of which side was pressed. Other names are unchanged.
pub fn normalize_keysym_name(name: &str) -> &str {
    const SIDED: [&str; 6] = ["Control", "Shift", "Alt", "Super", "Meta", "Hyper"];

    match name.rsplit_once('_') {
        Some((base, "L" | "R")) if SIDED.contains(&base) => base,
        _ => name,
    }
}

/// Kernel key names without the `KEY_` prefix (e.g. `LEFTCTRL`, `A`)
#[derive(Debug, Default, Clone, Copy)]
pub struct KernelKeyNames;

impl KeysymResolver for KernelKeyNames {
    fn keysym_name(&self, code: u16) -> Option<String> {
        let name = format!("{:?}", Key::new(code));
        if let Some(stripped) = name.strip_prefix("KEY_") {
            Some(stripped.to_string())
        } else if name.starts_with("BTN_") {
            Some(name)
        } else {
            None
        }
    }

    fn describe(&self) -> &'static str {
        "kernel key names"
    }
}

#[cfg(feature = "xkb")]
pub use self::xkb_names::XkbKeysyms;

#[cfg(feature = "xkb")]
mod xkb_names {
    use xkbcommon::xkb;

    use super::{normalize_keysym_name, KeysymResolver};

    /// Offset between kernel key codes and XKB key codes
    const EVDEV_OFFSET: u32 = 8;

    /// Keysyms from the default XKB keymap.
    ///
    /// The state is never updated with key presses, so lookups always give
    /// the first-level symbol (`t`, not `T`).
    pub struct XkbKeysyms {
        state: xkb::State,
    }

    impl XkbKeysyms {
        /// Compile the default keymap (honours `XKB_DEFAULT_*` variables)
        pub fn from_default_keymap() -> Option<Self> {
            Self::from_layout("")
        }

        /// Compile the keymap for one layout, e.g. "us". An empty layout
        /// means the environment default.
        pub fn from_layout(layout: &str) -> Option<Self> {
            let context = xkb::Context::new(xkb::CONTEXT_NO_FLAGS);
            let keymap = xkb::Keymap::new_from_names(
                &context,
                "",
                "",
                layout,
                "",
                None,
                xkb::KEYMAP_COMPILE_NO_FLAGS,
            )?;

            Some(Self {
                state: xkb::State::new(&keymap),
            })
        }
    }

    impl KeysymResolver for XkbKeysyms {
        fn keysym_name(&self, code: u16) -> Option<String> {
            let keycode = u32::from(code) + EVDEV_OFFSET;
            let sym = self.state.key_get_one_sym(keycode.into());
            if sym.raw() == xkb::keysyms::KEY_NoSymbol {
                return None;
            }

            let name = xkb::keysym_get_name(sym);
            if name.is_empty() || name == "NoSymbol" {
                None
            } else {
                Some(normalize_keysym_name(&name).to_string())
            }
        }

        fn describe(&self) -> &'static str {
            "XKB default keymap"
        }
    }
}

/// Pick the best available resolver
pub fn default_resolver() -> Box<dyn KeysymResolver> {
    #[cfg(feature = "xkb")]
    {
        if let Some(xkb) = XkbKeysyms::from_default_keymap() {
            return Box::new(xkb);
        }
        tracing::warn!("Could not compile the default XKB keymap, using kernel key names");
    }

    Box::new(KernelKeyNames)
}
