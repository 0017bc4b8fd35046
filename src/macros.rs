/// Declares an enumeration whose variants mirror a native enum by ordinal.
///
/// The variant order must stay in lockstep with the native declaration
/// order. Native values past the end of the table land in the trailing
/// `Unknown` variant verbatim instead of being mapped to a wrong variant.
macro_rules! ordinal_enum {
	($(#[$meta:meta])* $vis:vis enum $name:ident { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq)]
		$vis enum $name {
			$($(#[$vmeta])* $variant,)+
			/// Native value outside the known table.
			Unknown(i32),
		}

		impl $crate::marshal::Ordinal for $name {
			const VALUES: &'static [Self] = &[$(Self::$variant),+];

			// `Unknown` sits outside the table and carries the native value
			// directly.
			fn ordinal(self) -> i32 {
				match self {
					Self::Unknown(value) => value,
					known => Self::VALUES
						.iter()
						.position(|value| *value == known)
						.unwrap() as i32,
				}
			}
		}

		impl $name {
			pub fn from_native(value: i32) -> Self {
				<Self as $crate::marshal::Ordinal>::from_ordinal(value)
					.unwrap_or(Self::Unknown(value))
			}

			pub fn to_native(self) -> i32 {
				<Self as $crate::marshal::Ordinal>::ordinal(self)
			}
		}
	};
}
