//! Construction-time guarantees, checked across the whole library.

use nand_chips::gates::{Binary, Single};
use nand_chips::registry;
use nand_chips::Nand;
use nand_ir::{BuildError, Builder, Input, NodeKind, Pin};

#[test]
fn complete_inputs_build_and_expose_every_output() {
    for entry in registry::all() {
        let mut builder = Builder::new();
        let inputs: Vec<Input> = entry
            .input_names()
            .into_iter()
            .map(|name| builder.terminal(name))
            .collect();
        let outputs = entry.instantiate(&mut builder, inputs).unwrap();
        let names = entry.output_names();
        assert_eq!(outputs.len(), names.len(), "{}", entry.name);

        let chip = outputs[0].node().unwrap();
        for (name, &output) in names.iter().zip(&outputs) {
            assert_eq!(builder.output_named(chip, name).unwrap(), output, "{}", entry.name);
        }

        let pins = names
            .into_iter()
            .zip(outputs)
            .map(|(name, source)| Pin::new(name, source))
            .collect();
        let graph = builder.finish(entry.label, pins).unwrap();
        assert!(matches!(
            graph.node(chip).kind,
            NodeKind::Chip { ref label, .. } if label == entry.label
        ));
    }
}

#[test]
fn omitted_input_fails_at_construction() {
    for entry in registry::all() {
        let names = entry.input_names();
        let mut builder = Builder::new();
        let short: Vec<Input> = names[..names.len() - 1]
            .iter()
            .map(|name| builder.terminal(name.as_str()))
            .collect();
        let err = entry.instantiate(&mut builder, short).unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingInput {
                chip: entry.label.into(),
                slot: names[names.len() - 1].clone(),
            }
        );
        assert!(builder.finish(entry.label, Vec::new()).is_err());
    }
}

#[test]
fn unknown_output_name_is_rejected() {
    let mut builder = Builder::new();
    let out = builder
        .instantiate::<Nand>(Binary {
            a: Input::HIGH,
            b: Input::LOW,
        })
        .unwrap();
    let chip = out.out.node().unwrap();
    let err = builder.output_named(chip, "carry").unwrap_err();
    assert!(matches!(err, BuildError::UnknownOutput { ref name, .. } if name == "carry"));
    assert!(builder.is_poisoned());
}

#[test]
fn scope_that_skips_a_binding_never_yields_a_graph() {
    let mut builder = Builder::new();
    let set = builder.terminal("set");
    let err = builder
        .cyclic("half-built", |scope| {
            let first = scope.declare::<Nand>()?;
            let second = scope.declare::<Nand>()?;
            let feedback = second.outputs().out;
            scope.build(first, |_| Ok(Binary { a: set, b: feedback }))?;
            drop(second);
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, BuildError::UnboundDeferred { ref group, .. } if group == "half-built"));
    assert!(matches!(
        builder.finish("top", Vec::new()),
        Err(BuildError::Poisoned(_))
    ));
}

#[test]
fn raw_handles_are_checked_at_finish() {
    let mut builder = Builder::new();
    let handle = builder.defer();
    let gate = builder
        .instantiate::<Nand>(Binary {
            a: handle.input(),
            b: Input::HIGH,
        })
        .unwrap();
    let err = builder
        .finish("open", vec![Pin::new("out", gate.out)])
        .unwrap_err();
    assert!(matches!(err, BuildError::UnboundDeferred { .. }));
}

#[test]
fn raw_handles_close_loops_once_bound() {
    let mut builder = Builder::new();
    let handle = builder.defer();
    let gate: Single<Input> = builder
        .instantiate::<Nand>(Binary {
            a: handle.input(),
            b: Input::HIGH,
        })
        .unwrap();
    builder.bind(handle, gate.out).unwrap();
    let graph = builder
        .finish("loop", vec![Pin::new("out", gate.out)])
        .unwrap();
    assert_eq!(graph.gate_count(), 1);
}
