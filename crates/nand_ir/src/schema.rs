//! Named, fixed-shape input and output records for chip kinds.
//!
//! Every chip kind declares one record for its inputs and one for its
//! outputs. Records are generic over the value carried in each slot: the
//! same `AndIn<T>` is an `AndIn<Input>` while wiring and an `AndIn<bool>`
//! while simulating. The [`schema!`](crate::schema!) macro generates the
//! record together with its [`Schema`] implementation.

/// Errors converting between a flat slot vector and a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The flat vector did not have exactly one value per slot.
    #[error("expected {expected} slot values, got {actual}")]
    WidthMismatch {
        /// Number of slots the record declares.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
}

/// A record with a fixed, ordered set of named slots.
///
/// Scalar fields contribute one slot named after the field; array fields
/// contribute one slot per element, named `field[i]`.
pub trait Schema<T>: Sized {
    /// Total number of slots.
    const WIDTH: usize;

    /// Slot names in flattening order.
    fn slot_names() -> Vec<String>;

    /// Flattens the record into one value per slot.
    fn into_flat(self) -> Vec<T>;

    /// Rebuilds the record from exactly [`WIDTH`](Self::WIDTH) values.
    fn from_flat(values: Vec<T>) -> Result<Self, SchemaError>;
}

/// Checks that `actual` matches the width of `S`.
pub fn check_width<S: Schema<T>, T>(actual: usize) -> Result<(), SchemaError> {
    if actual == S::WIDTH {
        Ok(())
    } else {
        Err(SchemaError::WidthMismatch {
            expected: S::WIDTH,
            actual,
        })
    }
}

/// Declares a named I/O record and implements [`Schema`] for it.
///
/// ```
/// nand_ir::schema! {
///     /// Two four-bit operands and a carry in.
///     pub struct AddIn { a[4], b[4], carry }
/// }
///
/// use nand_ir::Schema;
/// assert_eq!(<AddIn<bool> as Schema<bool>>::WIDTH, 9);
/// assert_eq!(<AddIn<bool> as Schema<bool>>::slot_names()[4], "b[0]");
/// ```
#[macro_export]
macro_rules! schema {
    // Collects fields one at a time so the struct is emitted with plain
    // field types. Derives do not accept macro calls in type position.
    (@def [$($head:tt)*] [$($fields:tt)*]) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $($head)* <T> { $($fields)* }
    };
    (@def [$($head:tt)*] [$($fields:tt)*]
        $(#[$fmeta:meta])* $field:ident [$len:literal] $(, $($rest:tt)*)?
    ) => {
        $crate::schema!(@def [$($head)*] [$($fields)* $(#[$fmeta])* pub $field: [T; $len],] $($($rest)*)?);
    };
    (@def [$($head:tt)*] [$($fields:tt)*]
        $(#[$fmeta:meta])* $field:ident $(, $($rest:tt)*)?
    ) => {
        $crate::schema!(@def [$($head)*] [$($fields)* $(#[$fmeta])* pub $field: T,] $($($rest)*)?);
    };

    (@width) => { 1usize };
    (@width $len:literal) => { $len };

    (@names $names:ident, $field:ident $len:literal) => {
        for i in 0..$len {
            $names.push(::std::format!("{}[{}]", ::std::stringify!($field), i));
        }
    };
    (@names $names:ident, $field:ident) => {
        $names.push(::std::string::String::from(::std::stringify!($field)))
    };

    (@push $flat:ident, $value:expr, $len:literal) => { $flat.extend($value) };
    (@push $flat:ident, $value:expr) => { $flat.push($value) };

    (@take $iter:ident, $expected:expr, $len:literal) => {{
        let chunk: ::std::vec::Vec<_> = $iter.by_ref().take($len).collect();
        let actual = chunk.len();
        <[_; $len] as ::std::convert::TryFrom<::std::vec::Vec<_>>>::try_from(chunk).map_err(|_| $crate::schema::SchemaError::WidthMismatch {
            expected: $expected,
            actual,
        })?
    }};
    (@take $iter:ident, $expected:expr) => {
        $iter.next().ok_or($crate::schema::SchemaError::WidthMismatch {
            expected: $expected,
            actual: 0,
        })?
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $field:ident $([$len:literal])? ),+ $(,)?
        }
    ) => {
        $crate::schema! {
            @def [$(#[$meta])* $vis struct $name]
            []
            $( $(#[$fmeta])* $field $([$len])? ),+
        }

        impl<T> $crate::schema::Schema<T> for $name<T> {
            const WIDTH: usize = 0 $( + $crate::schema!(@width $($len)?) )+;

            fn slot_names() -> ::std::vec::Vec<::std::string::String> {
                let mut names = ::std::vec::Vec::with_capacity(Self::WIDTH);
                $( $crate::schema!(@names names, $field $($len)?); )+
                names
            }

            fn into_flat(self) -> ::std::vec::Vec<T> {
                let mut flat = ::std::vec::Vec::with_capacity(Self::WIDTH);
                $( $crate::schema!(@push flat, self.$field $(, $len)?); )+
                flat
            }

            fn from_flat(
                values: ::std::vec::Vec<T>,
            ) -> ::std::result::Result<Self, $crate::schema::SchemaError> {
                $crate::schema::check_width::<Self, T>(values.len())?;
                let mut iter = values.into_iter();
                ::std::result::Result::Ok(Self {
                    $( $field: $crate::schema!(@take iter, Self::WIDTH $(, $len)?), )+
                })
            }
        }
    };
}
