//! The contract every chip kind implements.

use crate::builder::Builder;
use crate::error::BuildError;
use crate::node::Input;
use crate::schema::Schema;

/// A reusable chip kind: a named input record, a named output record, and a
/// pure construction function wiring one into the other.
///
/// `build` must not keep state between calls; everything it creates goes
/// into the [`Builder`] it is handed.
pub trait Chip {
    /// Human-readable kind label, used in graphs and error messages.
    const LABEL: &'static str;

    /// Input record. Every slot must be bound for construction to proceed.
    type Inputs<T>: Schema<T>;

    /// Output record.
    type Outputs<T>: Schema<T>;

    /// Wires one instance of the chip into `builder`.
    fn build(
        builder: &mut Builder,
        inputs: Self::Inputs<Input>,
    ) -> Result<Self::Outputs<Input>, BuildError>;

    /// Input slot names in flattening order.
    fn input_names() -> Vec<String> {
        <Self::Inputs<()> as Schema<()>>::slot_names()
    }

    /// Output slot names in flattening order.
    fn output_names() -> Vec<String> {
        <Self::Outputs<()> as Schema<()>>::slot_names()
    }
}
