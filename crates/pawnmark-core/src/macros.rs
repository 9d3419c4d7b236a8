/// Generate a name table for a closed, fieldless enum: `ALL`, `as_str`,
/// `from_name` and `Display`.
///
/// Persisted data refers to these enums by name, so the table is the single
/// place a name maps to a variant. Unknown names yield `None` and callers
/// turn that into a config error.
macro_rules! name_table {
    ($name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Persisted name of this variant
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $str,)+
                }
            }

            /// Look up a variant by its persisted name
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($str => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}
