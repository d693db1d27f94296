//! Closed operating-mode sets (State Variant Sets).
//!
//! Each subsystem owns one enum of named states. Behavior is dispatched with
//! an explicit `match` in the subsystem's `transition()`; the only data a
//! variant carries is its display name and an optional default setpoint.
//!
//! The [`state_variants!`](crate::state_variants) macro generates the enum
//! plus its name and setpoint tables:
//!
//! ```rust
//! use helm_control::state::variant::StateVariant;
//!
//! helm_control::state_variants! {
//!     /// Elevator heights [m].
//!     pub enum Height {
//!         Stow => 0.0,
//!         Score => 1.2,
//!         Manual,
//!     }
//! }
//!
//! assert_eq!(Height::Score.setpoint(), Some(1.2));
//! assert_eq!(Height::Manual.setpoint(), None);
//! assert_eq!(Height::from_name("Stow"), Some(Height::Stow));
//! assert_eq!(Height::ALL.len(), 3);
//! ```

use std::fmt::Debug;
use std::hash::Hash;

/// A tag from a subsystem's closed set of operating modes.
pub trait StateVariant: Copy + Eq + Hash + Debug + 'static {
    /// Every variant, in declaration order.
    const ALL: &'static [Self];

    /// Stable display name, used for telemetry and config lookup.
    fn name(self) -> &'static str;

    /// Default numeric setpoint, if this variant has a simple numeric goal.
    fn setpoint(self) -> Option<f64> {
        None
    }

    /// Look a variant up by its display name.
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }
}

/// Declare a state enum and implement [`StateVariant`] for it.
///
/// Variants may carry a default setpoint with `=> expr`. The macro derives
/// `Debug, Clone, Copy, PartialEq, Eq, Hash` and implements `Display`.
#[macro_export]
macro_rules! state_variants {
    (@setpoint) => {
        ::core::option::Option::None
    };
    (@setpoint $value:expr) => {
        ::core::option::Option::Some($value)
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident $(=> $setpoint:expr)?
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $crate::state::variant::StateVariant for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }

            fn setpoint(self) -> ::core::option::Option<f64> {
                match self {
                    $(Self::$variant => $crate::state_variants!(@setpoint $($setpoint)?),)+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str($crate::state::variant::StateVariant::name(*self))
            }
        }
    };
}
