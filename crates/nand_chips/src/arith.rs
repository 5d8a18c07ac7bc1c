//! Adders.

use crate::gates::{And, Binary, Or, Xor};
use nand_ir::{BuildError, Builder, Chip, Input};

nand_ir::schema! {
    /// Sum bit and carry out.
    pub struct SumOut { sum, carry }
}

nand_ir::schema! {
    /// Two addends and a carry in.
    pub struct FullIn { a, b, carry }
}

nand_ir::schema! {
    /// Two four-bit addends, least significant bit first, and a carry in.
    pub struct Add4In { a[4], b[4], carry }
}

nand_ir::schema! {
    /// Four-bit sum, least significant bit first, and the carry out.
    pub struct Add4Out { sum[4], carry }
}

/// Adds two bits.
pub struct HalfAdder;

impl Chip for HalfAdder {
    const LABEL: &'static str = "HalfAdder";
    type Inputs<T> = Binary<T>;
    type Outputs<T> = SumOut<T>;

    fn build(builder: &mut Builder, inputs: Binary<Input>) -> Result<SumOut<Input>, BuildError> {
        let sum = builder.instantiate::<Xor>(inputs)?;
        let carry = builder.instantiate::<And>(inputs)?;
        Ok(SumOut {
            sum: sum.out,
            carry: carry.out,
        })
    }
}

/// Adds two bits and a carry.
pub struct FullAdder;

impl Chip for FullAdder {
    const LABEL: &'static str = "FullAdder";
    type Inputs<T> = FullIn<T>;
    type Outputs<T> = SumOut<T>;

    fn build(builder: &mut Builder, inputs: FullIn<Input>) -> Result<SumOut<Input>, BuildError> {
        let low = builder.instantiate::<HalfAdder>(Binary {
            a: inputs.a,
            b: inputs.b,
        })?;
        let high = builder.instantiate::<HalfAdder>(Binary {
            a: low.sum,
            b: inputs.carry,
        })?;
        let carry = builder.instantiate::<Or>(Binary {
            a: low.carry,
            b: high.carry,
        })?;
        Ok(SumOut {
            sum: high.sum,
            carry: carry.out,
        })
    }
}

/// Four-bit ripple-carry adder.
pub struct Add4;

impl Chip for Add4 {
    const LABEL: &'static str = "Add4";
    type Inputs<T> = Add4In<T>;
    type Outputs<T> = Add4Out<T>;

    fn build(builder: &mut Builder, inputs: Add4In<Input>) -> Result<Add4Out<Input>, BuildError> {
        let mut carry = inputs.carry;
        let mut sum = [Input::LOW; 4];
        for (i, bit) in sum.iter_mut().enumerate() {
            let stage = builder.instantiate::<FullAdder>(FullIn {
                a: inputs.a[i],
                b: inputs.b[i],
                carry,
            })?;
            *bit = stage.sum;
            carry = stage.carry;
        }
        Ok(Add4Out { sum, carry })
    }
}
