//! Exhaustive truth tables for the combinational library chips.

use nand_chips::arith::{Add4In, FullIn};
use nand_chips::gates::{Binary, DemuxIn, MuxIn, Unary};
use nand_chips::{Add4, And, Demux, FullAdder, HalfAdder, Mux, Nand, Not, Or, Xor};
use nand_ir::{Chip, ChipGraph};
use nand_sim::{Evaluator, Machine};

const BITS: [bool; 2] = [false, true];

/// Checks a two-input, one-output chip against `expected`.
fn binary_table<C: Chip>(expected: impl Fn(bool, bool) -> bool) {
    let mut evaluator = Evaluator::new(ChipGraph::of::<C>().unwrap()).unwrap();
    for a in BITS {
        for b in BITS {
            let step = evaluator.process(&[a, b]).unwrap();
            assert_eq!(step.outputs, vec![expected(a, b)], "{} {a} {b}", C::LABEL);
            assert!(step.is_stable());
        }
    }
}

#[test]
fn nand_gate() {
    let mut machine = Machine::<Nand>::new().unwrap();
    let out = |m: &mut Machine<Nand>, a: bool, b: bool| m.process(Binary { a, b }).unwrap().outputs.out;
    assert!(!out(&mut machine, true, true));
    assert!(out(&mut machine, false, false));
    binary_table::<Nand>(|a, b| !(a && b));
}

#[test]
fn and_from_nands() {
    let mut machine = Machine::<And>::new().unwrap();
    assert!(!machine.process(Binary { a: true, b: false }).unwrap().outputs.out);
    assert!(machine.process(Binary { a: true, b: true }).unwrap().outputs.out);
    binary_table::<And>(|a, b| a && b);
}

#[test]
fn or_and_xor() {
    binary_table::<Or>(|a, b| a || b);
    binary_table::<Xor>(|a, b| a != b);
}

#[test]
fn not_inverts() {
    let mut machine = Machine::<Not>::new().unwrap();
    for a in BITS {
        assert_eq!(machine.process(Unary { a }).unwrap().outputs.out, !a);
    }
}

#[test]
fn mux_selects() {
    let mut machine = Machine::<Mux>::new().unwrap();
    for a in BITS {
        for b in BITS {
            for sel in BITS {
                let out = machine.process(MuxIn { a, b, sel }).unwrap().outputs.out;
                assert_eq!(out, if sel { b } else { a });
            }
        }
    }
}

#[test]
fn demux_routes() {
    let mut machine = Machine::<Demux>::new().unwrap();
    for input in BITS {
        for sel in BITS {
            let out = machine.process(DemuxIn { input, sel }).unwrap().outputs;
            assert_eq!((out.a, out.b), (input && !sel, input && sel));
        }
    }
}

#[test]
fn half_adder() {
    let mut machine = Machine::<HalfAdder>::new().unwrap();
    for a in BITS {
        for b in BITS {
            let out = machine.process(Binary { a, b }).unwrap().outputs;
            let total = u8::from(a) + u8::from(b);
            assert_eq!((out.sum, out.carry), (total & 1 == 1, total >= 2));
        }
    }
}

#[test]
fn full_adder() {
    let mut machine = Machine::<FullAdder>::new().unwrap();
    for a in BITS {
        for b in BITS {
            for carry in BITS {
                let out = machine.process(FullIn { a, b, carry }).unwrap().outputs;
                let total = u8::from(a) + u8::from(b) + u8::from(carry);
                assert_eq!((out.sum, out.carry), (total & 1 == 1, total >= 2));
            }
        }
    }
}

fn bits(value: u8) -> [bool; 4] {
    [0, 1, 2, 3].map(|i| value >> i & 1 == 1)
}

#[test]
fn four_bit_adder() {
    let mut machine = Machine::<Add4>::new().unwrap();
    for a in 0..16u8 {
        for b in 0..16u8 {
            let out = machine
                .process(Add4In {
                    a: bits(a),
                    b: bits(b),
                    carry: false,
                })
                .unwrap()
                .outputs;
            let total = a + b;
            assert_eq!(out.sum, bits(total & 0xF), "{a} + {b}");
            assert_eq!(out.carry, total >= 16, "{a} + {b}");
        }
    }
}

#[test]
fn combinational_outputs_are_repeatable() {
    let mut machine = Machine::<Xor>::new().unwrap();
    let first = machine.process(Binary { a: true, b: false }).unwrap();
    machine.process(Binary { a: true, b: true }).unwrap();
    let again = machine.process(Binary { a: true, b: false }).unwrap();
    assert_eq!(first, again);
}
