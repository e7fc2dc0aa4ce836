use lingo_tools::ToolError;
use lingo_tools::hierarchy::{Node, ROOT_ID, build_tree};
use lingo_tools::model::Row;

fn rows(levels: &[(&str, u32)]) -> Vec<Row> {
    levels
        .iter()
        .map(|(id, level)| Row::new(*id, format!("name-{id}"), *level))
        .collect()
}

fn ids(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(|node| node.row.id.as_str()).collect()
}

#[test]
fn nests_rows_under_nearest_smaller_level() {
    let root = build_tree(&rows(&[
        ("1", 1),
        ("2", 2),
        ("3", 3),
        ("4", 2),
        ("5", 1),
    ]))
    .expect("tree built");

    assert_eq!(root.row.id, ROOT_ID);
    assert_eq!(root.row.level, 0);
    assert_eq!(ids(&root.children), vec!["1", "5"]);

    let first = &root.children[0];
    assert_eq!(ids(&first.children), vec!["2", "4"]);
    assert_eq!(ids(&first.children[0].children), vec!["3"]);
    assert!(first.children[1].children.is_empty());
    assert!(root.children[1].children.is_empty());
}

#[test]
fn depth_follows_level_order_not_level_value() {
    // A jump from 1 to 5 still only nests one step deeper.
    let root = build_tree(&rows(&[("a", 1), ("b", 5), ("c", 3), ("d", 9)])).expect("tree built");

    let depths: Vec<(usize, &str)> = root
        .descendants()
        .map(|(depth, node)| (depth, node.row.id.as_str()))
        .collect();
    assert_eq!(depths, vec![(1, "a"), (2, "b"), (2, "c"), (3, "d")]);
}

#[test]
fn preserves_source_order_in_pre_order_walk() {
    let input = rows(&[
        ("1", 2),
        ("2", 3),
        ("3", 3),
        ("4", 4),
        ("5", 2),
        ("6", 3),
        ("7", 2),
    ]);
    let root = build_tree(&input).expect("tree built");

    let walked: Vec<&str> = root
        .descendants()
        .map(|(_, node)| node.row.id.as_str())
        .collect();
    let expected: Vec<&str> = input.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(walked, expected);
    assert_eq!(root.descendant_count(), input.len());
}

#[test]
fn every_child_has_a_greater_level_than_its_parent() {
    let root = build_tree(&rows(&[
        ("1", 1),
        ("2", 4),
        ("3", 2),
        ("4", 2),
        ("5", 3),
        ("6", 1),
        ("7", 7),
    ]))
    .expect("tree built");

    let mut stack = vec![&root];
    while let Some(node) = stack.pop() {
        for child in &node.children {
            assert!(
                child.row.level > node.row.level,
                "{} (level {}) under {} (level {})",
                child.row.id,
                child.row.level,
                node.row.id,
                node.row.level
            );
            stack.push(child);
        }
    }
}

#[test]
fn level_zero_rows_attach_to_root() {
    let root = build_tree(&rows(&[("1", 0), ("2", 1), ("3", 0)])).expect("tree built");

    assert_eq!(ids(&root.children), vec!["1", "3"]);
    assert_eq!(ids(&root.children[0].children), vec!["2"]);
}

#[test]
fn single_row_becomes_only_child() {
    let root = build_tree(&rows(&[("only", 3)])).expect("tree built");

    assert_eq!(ids(&root.children), vec!["only"]);
    assert!(root.children[0].children.is_empty());
}

#[test]
fn empty_input_is_rejected() {
    let error = build_tree(&[]).expect_err("empty rows rejected");
    assert!(matches!(error, ToolError::InvalidInput(_)));
}

#[test]
fn deep_input_does_not_recurse() {
    let input: Vec<Row> = (1..=20_000)
        .map(|level| Row::new(level.to_string(), "deep", level))
        .collect();
    let root = build_tree(&input).expect("tree built");

    assert_eq!(root.descendant_count(), input.len());
    let (depth, deepest) = root.descendants().last().expect("has nodes");
    assert_eq!(depth, 20_000);
    assert_eq!(deepest.row.id, "20000");
}

#[test]
fn deep_trees_clone_compare_and_format_without_recursion() {
    let input: Vec<Row> = (1..=20_000)
        .map(|level| Row::new(level.to_string(), "deep", level))
        .collect();
    let root = build_tree(&input).expect("tree built");

    let copy = root.clone();
    assert!(copy == root);
    assert_eq!(copy.descendant_count(), input.len());

    let mut altered = input.clone();
    altered[19_999].name = "changed".into();
    let other = build_tree(&altered).expect("tree built");
    assert!(other != root);

    let rendered = format!("{root:?}");
    assert!(rendered.starts_with("Node"));
    assert!(rendered.contains("\"20000\""));
}

#[test]
fn clone_keeps_shape_of_branching_tree() {
    let root = build_tree(&rows(&[("1", 1), ("2", 2), ("3", 3), ("4", 2), ("5", 1)]))
        .expect("tree built");
    let copy = root.clone();

    assert_eq!(copy, root);
    assert_eq!(ids(&copy.children), vec!["1", "5"]);
    assert_eq!(ids(&copy.children[0].children), vec!["2", "4"]);
    assert_eq!(ids(&copy.children[0].children[0].children), vec!["3"]);

    // Same rows in the same pre-order, nested differently.
    let mut nested = Node::root();
    let mut parent = Node::new(Row::new("1", "one", 1));
    parent.add_child(Node::new(Row::new("2", "two", 2)));
    nested.add_child(parent);
    let mut siblings = Node::root();
    siblings.add_child(Node::new(Row::new("1", "one", 1)));
    siblings.add_child(Node::new(Row::new("2", "two", 2)));
    assert_ne!(nested, siblings);
}

#[test]
fn outline_indents_by_depth() {
    let root = build_tree(&[
        Row::new("1", "Animals", 1),
        Row::new("2", "Cats", 2),
        Row::new("3", "Plants", 1),
    ])
    .expect("tree built");

    let outline = root.outline();
    let lines: Vec<&str> = outline.lines().collect();
    assert_eq!(
        lines,
        vec![
            "0 - Root",
            "    └── 1 - Animals",
            "        └── 2 - Cats",
            "    └── 1 - Plants",
        ]
    );
}
