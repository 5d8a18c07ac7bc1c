//! Combinational gates derived from NAND.

use nand_ir::{BuildError, Builder, Chip, Input};

nand_ir::schema! {
    /// A single input.
    pub struct Unary { a }
}

nand_ir::schema! {
    /// Two operands.
    pub struct Binary { a, b }
}

nand_ir::schema! {
    /// A single output.
    pub struct Single { out }
}

nand_ir::schema! {
    /// Two data inputs and a selector.
    pub struct MuxIn { a, b, sel }
}

nand_ir::schema! {
    /// One data input and a selector.
    pub struct DemuxIn { input, sel }
}

nand_ir::schema! {
    /// The two routes of a demultiplexer.
    pub struct DemuxOut { a, b }
}

/// The primitive gate as a chip kind.
pub struct Nand;

impl Chip for Nand {
    const LABEL: &'static str = "Nand";
    type Inputs<T> = Binary<T>;
    type Outputs<T> = Single<T>;

    fn build(builder: &mut Builder, inputs: Binary<Input>) -> Result<Single<Input>, BuildError> {
        Ok(Single {
            out: builder.nand(inputs.a, inputs.b),
        })
    }
}

/// `!a`
pub struct Not;

impl Chip for Not {
    const LABEL: &'static str = "Not";
    type Inputs<T> = Unary<T>;
    type Outputs<T> = Single<T>;

    fn build(builder: &mut Builder, inputs: Unary<Input>) -> Result<Single<Input>, BuildError> {
        builder.instantiate::<Nand>(Binary {
            a: inputs.a,
            b: inputs.a,
        })
    }
}

/// `a & b`
pub struct And;

impl Chip for And {
    const LABEL: &'static str = "And";
    type Inputs<T> = Binary<T>;
    type Outputs<T> = Single<T>;

    fn build(builder: &mut Builder, inputs: Binary<Input>) -> Result<Single<Input>, BuildError> {
        let nand = builder.instantiate::<Nand>(inputs)?;
        builder.instantiate::<Not>(Unary { a: nand.out })
    }
}

/// `a | b`
pub struct Or;

impl Chip for Or {
    const LABEL: &'static str = "Or";
    type Inputs<T> = Binary<T>;
    type Outputs<T> = Single<T>;

    fn build(builder: &mut Builder, inputs: Binary<Input>) -> Result<Single<Input>, BuildError> {
        let not_a = builder.instantiate::<Not>(Unary { a: inputs.a })?;
        let not_b = builder.instantiate::<Not>(Unary { a: inputs.b })?;
        builder.instantiate::<Nand>(Binary {
            a: not_a.out,
            b: not_b.out,
        })
    }
}

/// `a ^ b`, the four-NAND form.
pub struct Xor;

impl Chip for Xor {
    const LABEL: &'static str = "Xor";
    type Inputs<T> = Binary<T>;
    type Outputs<T> = Single<T>;

    fn build(builder: &mut Builder, inputs: Binary<Input>) -> Result<Single<Input>, BuildError> {
        let both = builder.nand(inputs.a, inputs.b);
        let left = builder.nand(inputs.a, both);
        let right = builder.nand(inputs.b, both);
        Ok(Single {
            out: builder.nand(left, right),
        })
    }
}

/// `if sel { b } else { a }`
pub struct Mux;

impl Chip for Mux {
    const LABEL: &'static str = "Mux";
    type Inputs<T> = MuxIn<T>;
    type Outputs<T> = Single<T>;

    fn build(builder: &mut Builder, inputs: MuxIn<Input>) -> Result<Single<Input>, BuildError> {
        let not_sel = builder.instantiate::<Not>(Unary { a: inputs.sel })?;
        let pick_a = builder.nand(inputs.a, not_sel.out);
        let pick_b = builder.nand(inputs.b, inputs.sel);
        Ok(Single {
            out: builder.nand(pick_a, pick_b),
        })
    }
}

/// Routes `input` to `a` when `sel` is low and to `b` when it is high.
pub struct Demux;

impl Chip for Demux {
    const LABEL: &'static str = "Demux";
    type Inputs<T> = DemuxIn<T>;
    type Outputs<T> = DemuxOut<T>;

    fn build(builder: &mut Builder, inputs: DemuxIn<Input>) -> Result<DemuxOut<Input>, BuildError> {
        let not_sel = builder.instantiate::<Not>(Unary { a: inputs.sel })?;
        let a = builder.instantiate::<And>(Binary {
            a: inputs.input,
            b: not_sel.out,
        })?;
        let b = builder.instantiate::<And>(Binary {
            a: inputs.input,
            b: inputs.sel,
        })?;
        Ok(DemuxOut { a: a.out, b: b.out })
    }
}
