#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::location::FileName;
    use crate::oblige::language::LocalName;
    use crate::oblige::program::Module;
    use crate::oblige::types::{matches_value, MatchOptions, Type, TypeDefs, TypeError};
    use crate::oblige::value::Value;

    fn load(source: &str) -> TypeDefs {
        Module::parse(source, FileName::from("test.obl"))
            .expect("parse failed")
            .load()
            .expect("load failed")
    }

    fn resolve(defs: &TypeDefs, name: &'static str) -> Type {
        defs.resolve(&Type::name(name, vec![]), &BTreeMap::new())
            .expect("resolution failed")
    }

    fn admits(value: &Value, typ: &Type) -> bool {
        matches_value(value, typ, &MatchOptions::default())
    }

    #[test]
    fn rendering_and_reparsing_preserves_the_ast() {
        let sources = [
            "int: 0 ... 2^32",
            "bool: false | true",
            "tree A: leaf | node (tree A) (tree A)",
            "slice: [A], number, number? -> [A]",
            "proto: list <| collection, sequence",
            "point: { x: 0 ... 1, y: 0 ... 1 }",
            "pair: #[A, B]",
            "compose: A -> B -> C",
            "sortable A: { size: int } => [A]",
            "diff: 0 ... 10 \\ 5",
            "wide: -infinity ... +infinity + nan",
        ];
        for source in sources {
            let module = Module::parse(source, FileName::from("test.obl")).expect(source);
            let def = &module.type_defs[0];
            let mut head = def.name.to_string();
            for param in &def.params {
                head.push(' ');
                head.push_str(param.string.as_str());
            }
            let mut body = String::new();
            def.typ.pretty(&mut body, 0).unwrap();
            let rendered = format!("{}: {}", head, body);
            let reparsed = Module::parse(&rendered, FileName::from("test.obl"))
                .unwrap_or_else(|e| panic!("reparse of `{}` failed: {:?}", rendered, e));
            assert!(
                reparsed.type_defs[0].typ.syntactically_equal(&def.typ),
                "round trip changed `{}` into `{}`",
                source,
                rendered
            );
        }
    }

    #[test]
    fn interval_membership_is_half_open() {
        let defs = load("int: 0 ... 2^32");
        let int = resolve(&defs, "int");
        assert!(admits(&Value::number(0.0), &int));
        assert!(admits(&Value::number(4294967295.0), &int));
        assert!(!admits(&Value::number(4294967296.0), &int));
        assert!(!admits(&Value::number(-1.0), &int));
        assert!(!admits(&Value::number(f64::NAN), &int));
    }

    #[test]
    fn nan_matches_only_nan() {
        let nan = Type::number(f64::NAN);
        assert!(admits(&Value::number(f64::NAN), &nan));
        assert!(!admits(&Value::number(0.0), &nan));
        let everything = Type::interval(
            Type::number(f64::NEG_INFINITY),
            Type::number(f64::INFINITY),
        );
        assert!(!admits(&Value::number(f64::NAN), &everything));
    }

    #[test]
    fn union_membership_is_commutative() {
        let a = Type::range(0.0, 10.0);
        let b = Type::tagged(vec![("nothing", vec![])]);
        let values = [
            Value::number(5.0),
            Value::number(50.0),
            Value::tagged("nothing", vec![]),
            Value::string("x"),
        ];
        for value in &values {
            assert_eq!(
                admits(value, &Type::union(a.clone(), b.clone())),
                admits(value, &Type::union(b.clone(), a.clone())),
            );
        }
    }

    #[test]
    fn complement_members_never_match_the_right_operand() {
        let typ = Type::complement(Type::range(0.0, 10.0), Type::number(5.0));
        for i in 0..10 {
            let value = Value::number(i as f64);
            if admits(&value, &typ) {
                assert!(!admits(&value, &Type::number(5.0)));
            }
        }
        assert!(!admits(&Value::number(5.0), &typ));
        assert!(admits(&Value::number(4.0), &typ));
    }

    #[test]
    fn parametric_instantiation_substitutes_positionally() {
        let defs = load("list A: [A]\nint: 0 ... 2^32\nlistOfIntegers: list int");
        let resolved = resolve(&defs, "listOfIntegers");
        let Type::List(_, members) = &resolved else {
            panic!("expected a list normal form, got {}", resolved);
        };
        assert_eq!(members.len(), 1);
        assert!(matches!(members[0], Type::Interval(_, _, _)));

        assert!(admits(&Value::numbers(&[1.0, 2.0, 3.0]), &resolved));
        assert!(!admits(
            &Value::Sequence(vec![Value::number(1.0), Value::string("x")]),
            &resolved
        ));
    }

    #[test]
    fn wrong_argument_count_is_a_resolution_error() {
        let defs = load("list A: [A]\nint: 0 ... 2^32");
        let result = defs.resolve(
            &Type::name("list", vec![Type::name("int", vec![]), Type::name("int", vec![])]),
            &BTreeMap::new(),
        );
        assert!(matches!(
            result,
            Err(TypeError::WrongNumberOfTypeArgs(_, _, 1, 2))
        ));
    }

    #[test]
    fn unknown_names_are_resolution_errors() {
        let defs = load("a: [b]\nb: 0 ... 1");
        assert!(matches!(
            defs.resolve(&Type::name("missing", vec![]), &BTreeMap::new()),
            Err(TypeError::TypeNameNotDefined(_, _))
        ));
        // forward reference inside `a` resolves fine
        resolve(&defs, "a");
    }

    #[test]
    fn self_reference_fails_with_a_cycle_error() {
        let defs = load("a: a");
        assert!(matches!(
            defs.resolve(&Type::name("a", vec![]), &BTreeMap::new()),
            Err(TypeError::DependencyCycle(_, _))
        ));
    }

    #[test]
    fn mutual_recursion_fails_with_a_cycle_error() {
        let defs = load("a: [b]\nb: [a]");
        assert!(matches!(
            defs.resolve(&Type::name("a", vec![]), &BTreeMap::new()),
            Err(TypeError::DependencyCycle(_, _))
        ));
    }

    #[test]
    fn growing_instantiations_trip_the_expansion_budget() {
        let module = Module::parse("grow A: grow [A]\nint: 0 ... 1", FileName::from("test.obl"))
            .expect("parse failed");
        let mut defs = TypeDefs::new().with_expansion_limit(100);
        module.load_into(&mut defs).expect("load failed");
        let result = defs.resolve(
            &Type::name("grow", vec![Type::name("int", vec![])]),
            &BTreeMap::new(),
        );
        assert!(matches!(
            result,
            Err(TypeError::ExpansionLimitExceeded(_, 100))
        ));
    }

    #[test]
    fn tagged_union_matches_by_tag_and_fields() {
        let defs = load("bool: false | true");
        let bool_type = resolve(&defs, "bool");
        assert!(admits(&Value::tagged("true", vec![]), &bool_type));
        assert!(admits(&Value::tagged("false", vec![]), &bool_type));
        assert!(!admits(&Value::number(0.0), &bool_type));
        assert!(!admits(&Value::tagged("maybe", vec![]), &bool_type));

        let defs = load("shape: dot | box (0 ... 10) (0 ... 10)");
        let shape = resolve(&defs, "shape");
        assert!(admits(
            &Value::tagged("box", vec![Value::number(1.0), Value::number(2.0)]),
            &shape
        ));
        assert!(!admits(&Value::tagged("box", vec![Value::number(1.0)]), &shape));
    }

    #[test]
    fn optional_and_variadic_arity_accounting() {
        let defs = load("number: -infinity ... +infinity\nslice: [A], number, number? -> [A]");
        let slice = resolve(&defs, "slice");
        let list = Type::list(vec![Type::range(0.0, 10.0)]);
        let num = Type::range(0.0, 100.0);

        let with = |inputs: Vec<Type>| Value::callable(inputs, vec![]);
        assert!(admits(&with(vec![list.clone(), num.clone()]), &slice));
        assert!(admits(
            &with(vec![list.clone(), num.clone(), num.clone()]),
            &slice
        ));
        assert!(!admits(&with(vec![list.clone()]), &slice));
        assert!(!admits(
            &with(vec![list.clone(), num.clone(), num.clone(), num.clone()]),
            &slice
        ));

        let defs = load("number: -infinity ... +infinity\nmax: number... -> number");
        let max = resolve(&defs, "max");
        assert!(admits(&with(vec![]), &max));
        assert!(admits(&with(vec![num.clone()]), &max));
        assert!(admits(&with(vec![num.clone(), num.clone(), num.clone()]), &max));
        assert!(!admits(&with(vec![list.clone()]), &max));
    }

    #[test]
    fn callable_outputs_check_against_expectations() {
        let defs = load("number: -infinity ... +infinity\nid: number -> number");
        let id = resolve(&defs, "id");
        let num = Type::range(0.0, 1.0);
        let wide = Type::interval(
            Type::number(f64::NEG_INFINITY),
            Type::number(f64::INFINITY),
        );
        assert!(admits(&Value::callable(vec![num.clone()], vec![wide]), &id));
        assert!(!admits(
            &Value::callable(vec![num.clone()], vec![Type::range(0.0, 1.0)]),
            &id
        ));
    }

    #[test]
    fn delegation_consults_targets_in_order() {
        let defs = load(
            "sized: { size: 0 ... +infinity }\n\
             named: { name: [0 ... 128], size: 1 ... 2 }\n\
             thing: { color: [0 ... 8] } <| sized, named",
        );
        let thing = resolve(&defs, "thing");

        let color = thing.member(&LocalName::external("color")).expect("color");
        assert!(matches!(color, Type::List(_, _)));

        // `size` misses on the base and hits `sized` before `named`
        let size = thing.member(&LocalName::external("size")).expect("size");
        assert!(size.syntactically_equal(&Type::interval(
            Type::number(0.0),
            Type::number(f64::INFINITY),
        )));

        let name = thing.member(&LocalName::external("name")).expect("name");
        assert!(matches!(name, Type::List(_, _)));

        assert!(thing.member(&LocalName::external("missing")).is_none());
    }

    #[test]
    fn records_are_width_open_by_default_and_closable() {
        let defs = load("point: { x: 0 ... 1, y: 0 ... 1 }");
        let point = resolve(&defs, "point");
        let value = Value::record(vec![
            ("x", Value::number(0.5)),
            ("y", Value::number(0.5)),
            ("extra", Value::string("note")),
        ]);
        assert!(admits(&value, &point));
        assert!(!matches_value(
            &value,
            &point,
            &MatchOptions {
                exact_records: true
            }
        ));

        let missing = Value::record(vec![("x", Value::number(0.5))]);
        assert!(!admits(&missing, &point));
    }

    #[test]
    fn predicate_constraints_gate_instantiation() {
        let defs = load(
            "labeled A: { label: 0 ... 128 } => #[A, A]\n\
             point: { label: 0 ... 128, x: -infinity ... +infinity }",
        );
        let pair = defs
            .resolve(
                &Type::name("labeled", vec![Type::name("point", vec![])]),
                &BTreeMap::new(),
            )
            .expect("satisfied predicate should resolve");
        assert!(matches!(pair, Type::Tuple(_, _)));

        let result = defs.resolve(
            &Type::name("labeled", vec![Type::range(0.0, 1.0)]),
            &BTreeMap::new(),
        );
        assert!(matches!(result, Err(TypeError::UnsatisfiedPredicate(_, _, _))));
    }

    #[test]
    fn redeclaring_an_identical_body_is_tolerated() {
        let mut defs = load("int: 0 ... 2^32");
        let again = Module::parse("int: 0 ... 2^32", FileName::from("other.obl"))
            .expect("parse failed");
        again.load_into(&mut defs).expect("identical redeclaration");

        let changed = Module::parse("int: 0 ... 2^16", FileName::from("other.obl"))
            .expect("parse failed");
        assert!(matches!(
            changed.load_into(&mut defs),
            Err(TypeError::TypeNameAlreadyDefined(_, _, _))
        ));
    }

    #[test]
    fn empty_intervals_are_rejected_at_resolution() {
        let defs = load("bad: 10 ... 10");
        assert!(matches!(
            defs.resolve(&Type::name("bad", vec![]), &BTreeMap::new()),
            Err(TypeError::EmptyInterval(_, _, _))
        ));
    }

    #[test]
    fn explicit_bindings_substitute_before_expansion() {
        let defs = load("int: 0 ... 2^8");
        let mut bindings = BTreeMap::new();
        bindings.insert(LocalName::external("A"), Type::name("int", vec![]));
        let resolved = defs
            .resolve(&Type::list(vec![Type::var("A")]), &bindings)
            .expect("resolution failed");
        let Type::List(_, members) = &resolved else {
            panic!("expected a list");
        };
        assert!(matches!(members[0], Type::Interval(_, _, _)));
    }

    #[test]
    fn interval_subtyping_is_containment() {
        let narrow = Type::range(2.0, 5.0);
        let wide = Type::range(0.0, 10.0);
        assert!(narrow.is_subtype_of(&wide));
        assert!(!wide.is_subtype_of(&narrow));
        assert!(Type::number(3.0).is_subtype_of(&narrow));
        assert!(!Type::number(5.0).is_subtype_of(&narrow));
    }

    #[test]
    fn record_subtyping_is_width_open() {
        let wide = Type::record(vec![
            ("x", Type::range(0.0, 1.0)),
            ("y", Type::range(0.0, 1.0)),
        ]);
        let narrow = Type::record(vec![("x", Type::range(0.0, 1.0))]);
        assert!(wide.is_subtype_of(&narrow));
        assert!(!narrow.is_subtype_of(&wide));
    }

    #[test]
    fn tuples_fit_list_domains() {
        let tuple = Type::tuple(vec![Type::number(1.0), Type::number(2.0)]);
        let list = Type::list(vec![Type::range(0.0, 10.0)]);
        assert!(tuple.is_subtype_of(&list));
        assert!(!list.is_subtype_of(&tuple));
    }

    #[test]
    fn function_inputs_are_contravariant() {
        let accepts_wide = Type::function(
            vec![Type::param(Type::range(0.0, 100.0))],
            vec![Type::range(0.0, 1.0)],
        );
        let accepts_narrow = Type::function(
            vec![Type::param(Type::range(0.0, 10.0))],
            vec![Type::range(0.0, 1.0)],
        );
        assert!(accepts_wide.is_subtype_of(&accepts_narrow));
        assert!(!accepts_narrow.is_subtype_of(&accepts_wide));
    }

    #[test]
    fn union_and_complement_subtyping() {
        let union = Type::union(Type::range(0.0, 5.0), Type::range(5.0, 10.0));
        assert!(Type::range(1.0, 4.0).is_subtype_of(&union));
        assert!(union.is_subtype_of(&Type::range(0.0, 10.0)));

        let nonzero = Type::complement(Type::range(0.0, 10.0), Type::number(0.0));
        assert!(nonzero.is_subtype_of(&Type::range(0.0, 10.0)));
        assert!(Type::range(1.0, 5.0).is_subtype_of(&nonzero));
        assert!(!Type::range(0.0, 5.0).is_subtype_of(&nonzero));
    }

    #[test]
    fn tagged_union_subtyping_is_tag_subset() {
        let small = Type::tagged(vec![("leaf", vec![])]);
        let big = Type::tagged(vec![("leaf", vec![]), ("node", vec![Type::unit()])]);
        assert!(small.is_subtype_of(&big));
        assert!(!big.is_subtype_of(&small));
    }

    #[test]
    fn memoized_instantiations_stay_consistent() {
        let defs = load("list A: [A]\nint: 0 ... 2^8\nints: list int");
        let first = resolve(&defs, "ints");
        let second = resolve(&defs, "ints");
        assert!(first.syntactically_equal(&second));

        // a clone shares the registry and the cache
        let clone = defs.clone();
        let third = resolve(&clone, "ints");
        assert!(first.syntactically_equal(&third));
    }
}
