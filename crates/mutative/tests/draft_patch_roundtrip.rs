use mutative::patch::codec::{from_json_patch, to_json_patch};
use mutative::record::codec::{from_json_log, to_json_log};
use mutative::{
    apply, apply_patches, create, finalize_patches, produce, ApplyOptions, Draft, MutativeError,
    Options, Patch, PathStep, Produced, ProxyDraft, Value,
};
use mutative_util::WriteError;

fn n(v: i32) -> Value {
    Value::from(v)
}

fn s(v: &str) -> Value {
    Value::from(v)
}

fn k(key: &str) -> PathStep {
    PathStep::from(key)
}

fn i(index: usize) -> PathStep {
    PathStep::Index(index)
}

fn missing(what: &str) -> MutativeError {
    MutativeError::InvalidArgument(format!("missing {what}"))
}

fn run<F>(base: &Value, recipe: F) -> Produced
where
    F: FnOnce(&mut Draft) -> Result<(), MutativeError>,
{
    let options = Options {
        enable_patches: true,
        record: true,
        ..Options::default()
    };
    create(base, recipe, &options).expect("recipe must succeed")
}

fn assert_round_trip(base: &Value, produced: &Produced) {
    let options = ApplyOptions::default();
    let forward = apply_patches(base, &produced.patches, &options).expect("forward apply must succeed");
    assert_eq!(forward, produced.state, "forward patches must rebuild the state");
    let back = apply_patches(&produced.state, &produced.inverse_patches, &options)
        .expect("inverse apply must succeed");
    assert_eq!(&back, base, "inverse patches must restore the base");
    let replayed = apply(base, &produced.recorded, &options).expect("replay must succeed");
    assert_eq!(replayed, produced.state, "recorded entries must replay to the state");
}

// ── Documented scenarios ──────────────────────────────────────────────────

#[test]
fn map_replace_is_positional() {
    let base = Value::map([(s("a"), n(1)), (s("b"), n(2))]);
    let produced = run(&base, |draft| {
        draft.root().map()?.set(s("a"), n(9));
        Ok(())
    });
    assert_eq!(produced.patches, vec![Patch::replace(vec![i(0)], n(9))]);
    assert_eq!(produced.inverse_patches, vec![Patch::replace(vec![i(0)], n(1))]);
    assert_round_trip(&base, &produced);
}

#[test]
fn array_push_adds_tail_and_restores_length() {
    let base = Value::array([n(1), n(2)]);
    let produced = run(&base, |draft| {
        draft.root().array()?.push(vec![n(3)]);
        Ok(())
    });
    assert_eq!(produced.patches, vec![Patch::add(vec![i(2)], n(3))]);
    assert_eq!(produced.inverse_patches, vec![Patch::replace(vec![k("length")], n(2))]);
    assert_round_trip(&base, &produced);
}

#[test]
fn array_pop_truncates_and_readds() {
    let base = Value::array([n(1), n(2), n(3)]);
    let produced = run(&base, |draft| {
        draft.root().array()?.pop();
        Ok(())
    });
    assert_eq!(produced.patches, vec![Patch::replace(vec![k("length")], n(2))]);
    assert_eq!(produced.inverse_patches, vec![Patch::add(vec![i(2)], n(3))]);
    assert_round_trip(&base, &produced);
}

#[test]
fn object_delete_emits_remove_and_readd() {
    let base = Value::object([("a", n(1)), ("b", n(2))]);
    let produced = run(&base, |draft| {
        draft.root().object()?.delete("a");
        Ok(())
    });
    assert_eq!(produced.patches, vec![Patch::remove(vec![k("a")])]);
    assert_eq!(produced.inverse_patches, vec![Patch::add(vec![k("a")], n(1))]);
    assert_round_trip(&base, &produced);
}

#[test]
fn replace_of_deleted_key_is_skipped() {
    let base = Value::object([("a", n(1))]);
    let patches = vec![Patch::remove(vec![k("a")]), Patch::replace(vec![k("a")], n(5))];
    let next = apply_patches(&base, &patches, &ApplyOptions::default()).unwrap();
    assert_eq!(next, Value::object::<&str>([]));
}

#[test]
fn writing_equal_value_emits_nothing() {
    let base = Value::object([("a", Value::array([n(1)]))]);
    let produced = run(&base, |draft| {
        draft.root().object()?.set("a", Value::array([n(1)]));
        Ok(())
    });
    assert!(produced.patches.is_empty());
    assert!(produced.inverse_patches.is_empty());
    assert_eq!(produced.state, base);
}

#[test]
fn untouched_draft_returns_base() {
    let base = Value::object([("nested", Value::object([("x", n(1))]))]);
    let state = produce(&base, |draft| {
        let mut root = draft.root();
        let nested = root.child("nested").ok_or_else(|| missing("nested"))?;
        assert_eq!(nested.get_at("x"), Some(n(1)));
        Ok(())
    })
    .unwrap();
    assert!(state.ptr_eq(&base));
}

#[test]
fn finalize_runs_once_per_draft() {
    let mut proxy = ProxyDraft::new(Value::object([("a", n(1))])).unwrap();
    proxy.assigned.insert(s("a"), true);
    proxy.operated = true;
    let current = Value::object([("a", n(2))]);
    let mut patches = Vec::new();
    let mut inverse = Vec::new();
    finalize_patches(&mut proxy, &current, &[], Some((&mut patches, &mut inverse)));
    finalize_patches(&mut proxy, &current, &[], Some((&mut patches, &mut inverse)));
    assert!(proxy.finalized);
    assert_eq!(patches, vec![Patch::replace(vec![k("a")], n(2))]);
    assert_eq!(inverse, vec![Patch::replace(vec![k("a")], n(1))]);
}

#[test]
fn auto_freeze_rejects_writes() {
    let base = Value::object([("list", Value::array([n(1)])), ("other", Value::object::<&str>([]))]);
    let options = Options {
        enable_auto_freeze: true,
        ..Options::default()
    };
    let produced = create(
        &base,
        |draft| {
            draft
                .root()
                .into_child("list")
                .ok_or_else(|| missing("list"))?
                .array()?
                .push(vec![n(2)]);
            Ok(())
        },
        &options,
    )
    .unwrap();

    let mut state = produced.state.clone();
    assert!(state.is_frozen());
    assert!(matches!(state.insert("x", n(1)), Err(WriteError::Frozen)));
    let mut list = state.get("list").cloned().unwrap();
    assert!(matches!(list.push(n(3)), Err(WriteError::Frozen)));
    assert_eq!(WriteError::Frozen.to_string(), "Cannot modify frozen data");

    let next = produce(&produced.state, |draft| {
        draft.root().object()?.set("x", n(1));
        Ok(())
    })
    .unwrap();
    assert_eq!(next.get("x"), Some(&n(1)));
    assert!(!next.is_frozen());
}

#[test]
fn scalar_base_is_not_draftable() {
    let result = produce(&n(1), |_| Ok(()));
    assert!(matches!(result, Err(MutativeError::NotDraftable(_))));
}

#[test]
fn recipe_error_aborts_session() {
    let base = Value::object([("a", n(1))]);
    let result = produce(&base, |draft| {
        draft.root().object()?.set("a", n(2));
        draft.root().array()?;
        Ok(())
    });
    assert!(matches!(result, Err(MutativeError::WrongDraftType { .. })));
    assert_eq!(base.get("a"), Some(&n(1)));
}

// ── Workflows ─────────────────────────────────────────────────────────────

#[test]
fn nested_object_edits_round_trip() {
    let base = Value::object([
        (
            "user",
            Value::object([("name", s("ada")), ("tags", Value::array([s("x")]))]),
        ),
        ("count", n(1)),
    ]);
    let produced = run(&base, |draft| {
        let mut root = draft.root().object()?;
        root.set("count", n(2));
        let mut user = root.child("user").ok_or_else(|| missing("user"))?.object()?;
        user.set("name", s("grace"));
        let mut tags = user.child("tags").ok_or_else(|| missing("tags"))?.array()?;
        tags.push(vec![s("y")]);
        Ok(())
    });
    assert_eq!(
        produced.patches,
        vec![
            Patch::replace(vec![k("count")], n(2)),
            Patch::replace(vec![k("user"), k("name")], s("grace")),
            Patch::add(vec![k("user"), k("tags"), i(1)], s("y")),
        ]
    );
    assert_eq!(
        produced.inverse_patches,
        vec![
            Patch::replace(vec![k("user"), k("tags"), k("length")], n(1)),
            Patch::replace(vec![k("user"), k("name")], s("ada")),
            Patch::replace(vec![k("count")], n(1)),
        ]
    );
    assert_eq!(produced.recorded.len(), 3);
    assert_round_trip(&base, &produced);
    assert_eq!(base.get("count"), Some(&n(1)));
}

#[test]
fn shifted_array_of_drafted_objects_round_trip() {
    let item = |id: i32| Value::object([("id", n(id)), ("done", Value::from(false))]);
    let base = Value::object([("items", Value::array([item(1), item(2), item(3)]))]);
    let produced = run(&base, |draft| {
        let mut items = draft
            .root()
            .into_child("items")
            .ok_or_else(|| missing("items"))?
            .array()?;
        items
            .child(1)
            .ok_or_else(|| missing("item"))?
            .object()?
            .set("done", Value::from(true));
        items.shift();
        Ok(())
    });
    assert_eq!(
        produced.state,
        Value::object([(
            "items",
            Value::array([
                Value::object([("id", n(2)), ("done", Value::from(true))]),
                item(3),
            ])
        )])
    );
    assert_round_trip(&base, &produced);
}

#[test]
fn map_with_child_draft_round_trip() {
    let entry = |v: i32| Value::object([("n", n(v))]);
    let base = Value::map([(s("a"), entry(1)), (s("b"), entry(2))]);
    let produced = run(&base, |draft| {
        let mut map = draft.root().map()?;
        map.child(&s("b"))
            .ok_or_else(|| missing("b"))?
            .object()?
            .set("n", n(20));
        map.set(s("c"), entry(3));
        map.delete(&s("a"));
        Ok(())
    });
    assert_eq!(produced.state, Value::map([(s("b"), entry(20)), (s("c"), entry(3))]));
    assert_eq!(
        produced.patches,
        vec![
            Patch::remove(vec![i(0)]),
            Patch::add(vec![i(1)], Value::array([s("c"), entry(3)])),
            Patch::replace(vec![i(0), k("n")], n(20)),
        ]
    );
    assert_round_trip(&base, &produced);
}

#[test]
fn set_membership_round_trip() {
    let base = Value::set([n(1), n(2), n(3)]);
    let produced = run(&base, |draft| {
        let mut set = draft.root().set()?;
        set.delete(&n(2));
        set.add(n(4));
        set.add(n(5));
        set.delete(&n(5));
        Ok(())
    });
    assert_eq!(produced.state, Value::set([n(1), n(3), n(4)]));
    assert_eq!(
        produced.patches,
        vec![Patch::remove(vec![i(1)]), Patch::add(vec![i(2)], n(4))]
    );
    assert_round_trip(&base, &produced);
}

#[test]
fn map_set_at_front_round_trip() {
    let base = Value::map([(s("a"), n(1)), (s("b"), n(2))]);
    let produced = run(&base, |draft| {
        draft.root().map()?.set_at(0, s("z"), n(26));
        Ok(())
    });
    assert_eq!(produced.state, Value::map([(s("z"), n(26)), (s("b"), n(2))]));
    assert_eq!(
        produced.patches,
        vec![Patch::remove(vec![i(0)]), Patch::add(vec![i(0)], Value::array([s("z"), n(26)]))]
    );
    assert_round_trip(&base, &produced);
}

#[test]
fn map_insert_at_front_round_trip() {
    let base = Value::map([(s("a"), n(1)), (s("b"), n(2))]);
    let produced = run(&base, |draft| {
        draft.root().map()?.insert_at(0, s("z"), n(0));
        Ok(())
    });
    assert_eq!(
        produced.state,
        Value::map([(s("z"), n(0)), (s("a"), n(1)), (s("b"), n(2))])
    );
    assert_eq!(produced.patches, vec![Patch::add(vec![i(0)], Value::array([s("z"), n(0)]))]);
    assert_eq!(produced.inverse_patches, vec![Patch::remove(vec![i(0)])]);
    assert_round_trip(&base, &produced);
}

#[test]
fn map_child_edit_after_insert_at_front() {
    let entry = |v: i32| Value::object([("x", n(v))]);
    let base = Value::map([(s("a"), entry(1)), (s("b"), entry(2))]);
    let produced = run(&base, |draft| {
        let mut map = draft.root().map()?;
        map.insert_at(0, s("z"), n(0));
        map.child(&s("a"))
            .ok_or_else(|| missing("a"))?
            .object()?
            .set("x", n(9));
        Ok(())
    });
    assert_eq!(
        produced.state,
        Value::map([(s("z"), n(0)), (s("a"), entry(9)), (s("b"), entry(2))])
    );
    assert_eq!(
        produced.patches,
        vec![
            Patch::add(vec![i(0)], Value::array([s("z"), n(0)])),
            Patch::replace(vec![i(1), k("x")], n(9)),
        ]
    );
    assert_round_trip(&base, &produced);
}

#[test]
fn map_reinserted_key_with_child_edit() {
    let entry = |v: i32| Value::object([("x", n(v))]);
    let base = Value::map([(s("a"), entry(1)), (s("b"), entry(2))]);
    let produced = run(&base, |draft| {
        let mut map = draft.root().map()?;
        map.delete(&s("a"));
        map.set(s("a"), n(1));
        map.child(&s("b"))
            .ok_or_else(|| missing("b"))?
            .object()?
            .set("x", n(9));
        Ok(())
    });
    assert_eq!(produced.state, Value::map([(s("b"), entry(9)), (s("a"), n(1))]));
    assert_eq!(
        produced.patches,
        vec![
            Patch::remove(vec![i(0)]),
            Patch::add(vec![i(1)], Value::array([s("a"), n(1)])),
            Patch::replace(vec![i(0), k("x")], n(9)),
        ]
    );
    assert_eq!(
        produced.inverse_patches,
        vec![
            Patch::replace(vec![i(0), k("x")], n(2)),
            Patch::remove(vec![i(1)]),
            Patch::add(vec![i(0)], Value::array([s("a"), entry(1)])),
        ]
    );
    assert_round_trip(&base, &produced);
}

#[test]
fn set_add_at_front_round_trip() {
    let base = Value::set([n(1), n(2)]);
    let produced = run(&base, |draft| {
        draft.root().set()?.add_at(0, n(0));
        Ok(())
    });
    assert_eq!(produced.state, Value::set([n(0), n(1), n(2)]));
    assert_eq!(produced.patches, vec![Patch::add(vec![i(0)], n(0))]);
    assert_eq!(produced.inverse_patches, vec![Patch::remove(vec![i(0)])]);
    assert_round_trip(&base, &produced);
}

#[test]
fn set_drafted_member_keeps_its_slot() {
    let base = Value::set([Value::object([("x", n(1))])]);
    let produced = run(&base, |draft| {
        let mut set = draft.root().set()?;
        set.add_at(0, n(0));
        set.child_at(1)
            .ok_or_else(|| missing("member"))?
            .object()?
            .set("x", n(2));
        Ok(())
    });
    assert_eq!(produced.state, Value::set([n(0), Value::object([("x", n(2))])]));
    assert_eq!(
        produced.patches,
        vec![
            Patch::add(vec![i(0)], n(0)),
            Patch::replace(vec![i(1), k("x")], n(2)),
        ]
    );
    assert_round_trip(&base, &produced);
}

#[test]
fn path_argument_copies_a_snapshot() {
    let base = Value::object([("src", Value::object([("v", n(1))])), ("dst", Value::Null)]);
    let produced = run(&base, |draft| {
        let mut root = draft.root().object()?;
        assert!(root.set_from("dst", &[k("src")]));
        root.child("src")
            .ok_or_else(|| missing("src"))?
            .object()?
            .set("v", n(2));
        Ok(())
    });
    assert_eq!(
        produced.state,
        Value::object([
            ("src", Value::object([("v", n(2))])),
            ("dst", Value::object([("v", n(1))])),
        ])
    );
    assert_round_trip(&base, &produced);
}

#[test]
fn patches_and_log_survive_json_text() {
    let base = Value::map([(s("a"), Value::set([n(1)])), (s("b"), n(2))]);
    let produced = run(&base, |draft| {
        let mut map = draft.root().map()?;
        map.child(&s("a"))
            .ok_or_else(|| missing("a"))?
            .set()?
            .add(n(2));
        map.set(s("z"), Value::map([(n(1), s("one"))]));
        Ok(())
    });

    let text = serde_json::to_string(&to_json_patch(&produced.patches)).unwrap();
    let patches = from_json_patch(&serde_json::from_str(&text).unwrap()).unwrap();
    assert_eq!(patches, produced.patches);
    let forward = apply_patches(&base, &patches, &ApplyOptions::default()).unwrap();
    assert_eq!(forward, produced.state);

    let text = serde_json::to_string(&produced.patches).unwrap();
    let decoded: Vec<Patch> = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded, produced.patches);

    let text = serde_json::to_string(&to_json_log(&produced.recorded)).unwrap();
    let entries = from_json_log(&serde_json::from_str(&text).unwrap()).unwrap();
    assert_eq!(entries, produced.recorded);
    let replayed = apply(&base, &entries, &ApplyOptions::default()).unwrap();
    assert_eq!(replayed, produced.state);
}
