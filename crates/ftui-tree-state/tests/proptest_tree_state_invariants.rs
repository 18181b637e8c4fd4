//! Property-based invariant tests for the tree state engine.
//!
//! Random forests are driven through random action sequences; after every
//! step the resulting snapshot must satisfy:
//!
//! 1. Visible rows are exactly the nodes whose ancestors are all open, in
//!    document order.
//! 2. Open ids are folders of the current tree; selected ids are nodes.
//! 3. Cascading mode: push-down, pull-up and the select-all flag hold.
//! 4. Single mode: at most one selected row.
//! 5. Single-root expansion: at most one open root-level folder.
//! 6. Idempotence: applying an action twice equals applying it once.
//! 7. Select-all followed by unselect-all clears the selection.
//! 8. Host-owned `reduce` and engine-owned `apply` agree step by step.

use ftui_tree_state::{
    Action, EngineState, NodeId, SelectionMode, TreeConfig, TreeEngine, TreeIndex, TreeNode,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

/// One generated node: a parent pick and whether it is a folder.
type NodeSeed = (usize, bool);

fn forest_seeds(max_len: usize) -> impl Strategy<Value = Vec<NodeSeed>> {
    proptest::collection::vec((any::<usize>(), any::<bool>()), 0..=max_len)
}

fn action_seeds(max_len: usize) -> impl Strategy<Value = Vec<(u8, usize)>> {
    proptest::collection::vec((0u8..8, any::<usize>()), 1..=max_len)
}

fn modes() -> impl Strategy<Value = SelectionMode> {
    prop_oneof![
        Just(SelectionMode::None),
        Just(SelectionMode::Independent),
        Just(SelectionMode::DefaultCascading),
        Just(SelectionMode::Single),
    ]
}

/// Node `i` hangs below an earlier folder picked by its seed, or becomes a
/// root when the pick lands on itself or on an item.
fn build_forest(seeds: &[NodeSeed]) -> Vec<TreeNode> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); seeds.len()];
    let mut roots = Vec::new();
    for (i, &(pick, _)) in seeds.iter().enumerate() {
        let parent = pick % (i + 1);
        if parent != i && seeds[parent].1 {
            children[parent].push(i);
        } else {
            roots.push(i);
        }
    }

    fn node(i: usize, seeds: &[NodeSeed], children: &[Vec<usize>]) -> TreeNode {
        let id = format!("n{i}");
        if seeds[i].1 {
            TreeNode::folder(id).with_children(
                children[i]
                    .iter()
                    .map(|&c| node(c, seeds, children))
                    .collect(),
            )
        } else {
            TreeNode::item(id)
        }
    }

    roots
        .into_iter()
        .map(|r| node(r, seeds, &children))
        .collect()
}

fn pick_action(tree: &TreeIndex, (kind, pick): (u8, usize)) -> Action {
    let ids: Vec<&NodeId> = tree.iter().collect();
    let id = if ids.is_empty() {
        NodeId::from("ghost")
    } else {
        ids[pick % ids.len()].clone()
    };
    match kind {
        0 => Action::Expand(id),
        1 => Action::Collapse(id),
        2 => Action::ExpandAll,
        3 => Action::CollapseAll,
        4 => Action::Select(id),
        5 => Action::Unselect(id),
        6 => Action::SelectAll,
        _ => Action::UnselectAll,
    }
}

fn assert_visibility(tree: &TreeIndex, state: &EngineState) -> Result<(), TestCaseError> {
    let expected: Vec<&NodeId> = tree
        .iter()
        .filter(|id| tree.ancestors(id.as_str()).all(|a| state.is_open(a.as_str())))
        .collect();
    let actual: Vec<&NodeId> = state.visible_ids().iter().collect();
    prop_assert_eq!(actual, expected);
    Ok(())
}

fn assert_membership(tree: &TreeIndex, state: &EngineState) -> Result<(), TestCaseError> {
    for id in state.open_ids() {
        prop_assert!(tree.is_folder(id.as_str()), "open id {} is not a folder", id);
    }
    for id in state.selected_ids() {
        prop_assert!(tree.contains(id.as_str()), "selected id {} is not in tree", id);
    }
    Ok(())
}

fn assert_cascade(tree: &TreeIndex, state: &EngineState) -> Result<(), TestCaseError> {
    for id in tree.folders() {
        let selected = state.is_selected(id.as_str());
        if selected {
            for d in tree.descendants(id.as_str()) {
                prop_assert!(state.is_selected(d.as_str()), "{} selected but {} not", id, d);
            }
        }
        let mut children = tree.children_of(id.as_str()).peekable();
        if children.peek().is_some() {
            let all_children = children.all(|c| state.is_selected(c.as_str()));
            prop_assert_eq!(selected, all_children, "pull-up broken at {}", id);
        }
    }
    let roots: Vec<&NodeId> = tree.roots().collect();
    let expected_all = !roots.is_empty() && roots.iter().all(|r| state.is_selected(r.as_str()));
    prop_assert_eq!(state.all_selected(), expected_all);
    Ok(())
}

fn open_root_folders(tree: &TreeIndex, state: &EngineState) -> usize {
    tree.roots()
        .filter(|r| state.is_open(r.as_str()))
        .count()
}

// ═════════════════════════════════════════════════════════════════════════
// 1-5. Structural invariants after every step
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn invariants_hold_after_every_action(
        seeds in forest_seeds(40),
        actions in action_seeds(30),
        mode in modes(),
        single_root in any::<bool>(),
    ) {
        let tree = TreeIndex::from_roots(&build_forest(&seeds));
        let mut engine = TreeEngine::new(
            TreeConfig::new()
                .selection_mode(mode)
                .single_root_expansion(single_root),
        );

        for seed in actions {
            let action = pick_action(&tree, seed);
            let Ok(t) = engine.apply(&tree, action) else {
                continue;
            };
            assert_visibility(&tree, &t.state)?;
            assert_membership(&tree, &t.state)?;
            match mode {
                SelectionMode::DefaultCascading => assert_cascade(&tree, &t.state)?,
                SelectionMode::Single => prop_assert!(t.state.selected_ids().len() <= 1),
                SelectionMode::None => prop_assert!(t.state.selected_ids().is_empty()),
                SelectionMode::Independent => prop_assert!(!t.state.all_selected()),
            }
            if single_root {
                prop_assert!(open_root_folders(&tree, &t.state) <= 1);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn repeated_action_is_idempotent(
        seeds in forest_seeds(30),
        warmup in action_seeds(10),
        last in (0u8..8, any::<usize>()),
        mode in modes(),
        single_root in any::<bool>(),
    ) {
        let tree = TreeIndex::from_roots(&build_forest(&seeds));
        let engine = TreeEngine::new(
            TreeConfig::new()
                .selection_mode(mode)
                .single_root_expansion(single_root)
                .owns_state(false),
        );
        let mut state = engine.seed(&tree);
        for seed in warmup {
            if let Ok(t) = engine.reduce(&tree, &state, pick_action(&tree, seed)) {
                state = t.state;
            }
        }

        let action = pick_action(&tree, last);
        if let Ok(once) = engine.reduce(&tree, &state, action.clone()) {
            let twice = engine.reduce(&tree, &once.state, action).unwrap();
            prop_assert_eq!(&twice.state, &once.state);
            prop_assert!(!twice.changed);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Select-all round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn select_all_then_unselect_all_clears(
        seeds in forest_seeds(40),
        warmup in action_seeds(10),
    ) {
        let tree = TreeIndex::from_roots(&build_forest(&seeds));
        let mut engine = TreeEngine::new(
            TreeConfig::new().selection_mode(SelectionMode::DefaultCascading),
        );
        for seed in warmup {
            engine.apply(&tree, pick_action(&tree, seed)).unwrap();
        }

        let t = engine.apply(&tree, Action::SelectAll).unwrap();
        prop_assert_eq!(t.state.selected_ids().len(), tree.len());
        prop_assert_eq!(t.state.all_selected(), !tree.is_empty());

        let t = engine.apply(&tree, Action::UnselectAll).unwrap();
        prop_assert!(t.state.selected_ids().is_empty());
        prop_assert!(!t.state.all_selected());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Owned and host-held state agree
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reduce_matches_apply(
        seeds in forest_seeds(30),
        actions in action_seeds(20),
        mode in modes(),
    ) {
        let tree = TreeIndex::from_roots(&build_forest(&seeds));
        let config = TreeConfig::new().selection_mode(mode);
        let mut owned = TreeEngine::new(config);
        let hosted = TreeEngine::new(config.owns_state(false));
        let mut host_state = hosted.seed(&tree);

        for seed in actions {
            let action = pick_action(&tree, seed);
            let from_owned = owned.apply(&tree, action.clone());
            let from_host = hosted.reduce(&tree, &host_state, action);
            prop_assert_eq!(&from_owned, &from_host);
            if let Ok(t) = from_host {
                host_state = t.state;
            }
        }
    }
}
