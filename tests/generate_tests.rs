use block_codegen::{BlockGraph, BlockId, BlockKind, DiagnosticKind, GenerateOptions, Project, generate, validate};

const HEADER: &str = "# Python code generated from block project: test\n# Generated on: 2000-01-01 00:00:00\n";

fn options() -> GenerateOptions {
    GenerateOptions::new("test").with_timestamp("2000-01-01 00:00:00")
}

/// Generated lines after the header and its blank line
fn body(graph: &BlockGraph) -> Vec<String> {
    let result = generate(graph, &options());
    assert!(result.code.starts_with(HEADER), "missing header:\n{}", result.code);
    result.code.lines().skip(3).map(str::to_string).collect()
}

#[test]
fn empty_graph_is_only_the_header() {
    let result = generate(&BlockGraph::new(), &options());
    assert_eq!(result.code, HEADER);
    assert!(result.mappings.is_empty());
    assert!(result.start_blocks.is_empty());
    assert!(result.orphans.is_empty());
}

#[test]
fn single_block() {
    let mut graph = BlockGraph::new();
    graph.add_block(BlockKind::Io, "Print", "print('hello')");
    assert_eq!(body(&graph), vec!["print('hello')"]);
}

#[test]
fn function_definition_with_body_and_caller() {
    let mut graph = BlockGraph::new();
    let def = graph.add_block(BlockKind::Defining, "Define Function", "def greet(name):");
    let body_block = graph.add_block(BlockKind::Io, "Print", "print('hi', name)");
    let call = graph.add_block(BlockKind::FunctionCall, "Call Function", "greet('bob')");
    graph.connect_sequence(&def, &body_block).unwrap();
    graph.connect_sequence(&body_block, &call).unwrap();
    graph.set_scope_end(&def, &call).unwrap();

    assert_eq!(
        body(&graph),
        vec!["def greet(name):", "    print('hi', name)", "greet('bob')"]
    );
}

#[test]
fn scope_end_restores_level_for_following_blocks() {
    let mut graph = BlockGraph::new();
    let head = graph.add_block(BlockKind::Loop, "", "for i in items:");
    let inner = graph.add_block(BlockKind::Io, "", "print(i)");
    let closer = graph.add_block(BlockKind::Statement, "", "total = len(items)");
    let after = graph.add_block(BlockKind::Io, "", "print(total)");
    graph.connect_sequence(&head, &inner).unwrap();
    graph.connect_sequence(&inner, &closer).unwrap();
    graph.connect_sequence(&closer, &after).unwrap();
    graph.set_scope_end(&head, &closer).unwrap();

    assert_eq!(
        body(&graph),
        vec!["for i in items:", "    print(i)", "total = len(items)", "print(total)"]
    );
}

#[test]
fn nested_scopes_indent_twice() {
    let mut graph = BlockGraph::new();
    let outer = graph.add_block(BlockKind::Loop, "", "for row in grid:");
    let inner = graph.add_block(BlockKind::Loop, "", "for cell in row:");
    let work = graph.add_block(BlockKind::FunctionCall, "", "visit(cell)");
    let inner_end = graph.add_block(BlockKind::FunctionCall, "", "next_row()");
    let outer_end = graph.add_block(BlockKind::Io, "", "print('done')");
    graph.connect_sequence(&outer, &inner).unwrap();
    graph.connect_sequence(&inner, &work).unwrap();
    graph.connect_sequence(&work, &inner_end).unwrap();
    graph.connect_sequence(&inner_end, &outer_end).unwrap();
    graph.set_scope_end(&inner, &inner_end).unwrap();
    graph.set_scope_end(&outer, &outer_end).unwrap();

    assert_eq!(
        body(&graph),
        vec![
            "for row in grid:",
            "    for cell in row:",
            "        visit(cell)",
            "    next_row()",
            "print('done')",
        ]
    );
}

#[test]
fn shared_end_block_closes_innermost_scope() {
    let mut graph = BlockGraph::new();
    let outer = graph.add_block(BlockKind::Loop, "", "for a in xs:");
    let inner = graph.add_block(BlockKind::Loop, "", "for b in ys:");
    let work = graph.add_block(BlockKind::FunctionCall, "", "work(a, b)");
    let closer = graph.add_block(BlockKind::FunctionCall, "", "after()");
    graph.connect_sequence(&outer, &inner).unwrap();
    graph.connect_sequence(&inner, &work).unwrap();
    graph.connect_sequence(&work, &closer).unwrap();
    graph.set_scope_end(&outer, &closer).unwrap();
    graph.set_scope_end(&inner, &closer).unwrap();

    assert_eq!(
        body(&graph),
        vec!["for a in xs:", "    for b in ys:", "        work(a, b)", "    after()"]
    );
    let shared: Vec<_> = validate(&graph)
        .into_iter()
        .filter(|d| d.kind == DiagnosticKind::SharedScopeEnd)
        .collect();
    assert_eq!(shared.len(), 1);
}

#[test]
fn continuation_merges_onto_one_line() {
    let mut graph = BlockGraph::new();
    let x = graph.add_block(BlockKind::Variable, "", "x = 1");
    let y = graph.add_block(BlockKind::Variable, "", "y = 2");
    graph.set_continue_line(&x, &y).unwrap();

    let result = generate(&graph, &options());
    assert!(result.code.ends_with("\nx = 1 y = 2"));
    assert_eq!(result.mappings.len(), 1);
    assert_eq!(result.mappings[0].block, x);
    assert!(result.orphans.is_empty());
}

#[test]
fn continuation_keeps_remaining_lines() {
    let mut graph = BlockGraph::new();
    let call = graph.add_block(BlockKind::FunctionCall, "", "result = compute(");
    let args = graph.add_block(BlockKind::Operator, "", "  a, b)\nprint(result)");
    graph.set_continue_line(&call, &args).unwrap();

    assert_eq!(body(&graph), vec!["result = compute( a, b)", "print(result)"]);
}

#[test]
fn unconnected_blocks_are_emitted_in_graph_order() {
    let mut graph = BlockGraph::new();
    let a = graph.add_block(BlockKind::Import, "", "import os");
    let b = graph.add_block(BlockKind::Import, "", "import sys");

    let result = generate(&graph, &options());
    assert_eq!(result.start_blocks, vec![a, b]);
    assert!(result.code.ends_with("\nimport os\nimport sys"));
}

#[test]
fn multiple_successors_are_walked_depth_first() {
    let mut graph = BlockGraph::new();
    let a = graph.add_block(BlockKind::Statement, "", "a()");
    let b = graph.add_block(BlockKind::Statement, "", "b()");
    let c = graph.add_block(BlockKind::Statement, "", "c()");
    let d = graph.add_block(BlockKind::Statement, "", "d()");
    graph.connect_sequence(&a, &b).unwrap();
    graph.connect_sequence(&a, &c).unwrap();
    graph.connect_sequence(&b, &d).unwrap();

    assert_eq!(body(&graph), vec!["a()", "b()", "d()", "c()"]);
}

#[test]
fn cycles_emit_each_block_once() {
    let mut graph = BlockGraph::new();
    let a = graph.add_block(BlockKind::Statement, "", "a()");
    let b = graph.add_block(BlockKind::Statement, "", "b()");
    let c = graph.add_block(BlockKind::Statement, "", "c()");
    graph.connect_sequence(&a, &b).unwrap();
    graph.connect_sequence(&b, &c).unwrap();
    graph.connect_sequence(&c, &b).unwrap();

    assert_eq!(body(&graph), vec!["a()", "b()", "c()"]);
}

#[test]
fn unreachable_end_block_is_appended_verbatim() {
    let mut graph = BlockGraph::new();
    let head = graph.add_block(BlockKind::Class, "", "class Greeter:");
    let method = graph.add_block(BlockKind::Method, "", "def hello(self):\n    return 'hi'");
    let closer = graph.add_block(BlockKind::Statement, "", "g = Greeter()\n\nprint(g.hello())");
    graph.connect_sequence(&head, &method).unwrap();
    graph.set_scope_end(&head, &closer).unwrap();

    let result = generate(&graph, &options());
    assert_eq!(result.orphans, vec![closer.clone()]);
    assert!(result.code.ends_with(
        "class Greeter:\n    def hello(self):\n        return 'hi'\ng = Greeter()\n\nprint(g.hello())"
    ));

    let orphan_lines: Vec<_> = result
        .mappings
        .iter()
        .filter(|m| m.block == closer)
        .map(|m| m.gen_line)
        .collect();
    assert_eq!(orphan_lines, vec![6, 7, 8]);
}

#[test]
fn dangling_references_are_ignored() {
    let json = r#"{
        "project_name": "test",
        "blocks": {
            "a": {"id": "a", "type": "statement", "content": "a()"},
            "b": {"id": "b", "type": "statement", "content": "b()"}
        },
        "sequence_lines": [["a", "ghost"], ["a", "b"]],
        "continue_lines": [["b", "missing"]]
    }"#;
    let project = Project::from_json(json).unwrap();

    assert_eq!(body(&project.graph), vec!["a()", "b()"]);
    let dangling = validate(&project.graph)
        .into_iter()
        .filter(|d| d.kind == DiagnosticKind::DanglingReference)
        .count();
    assert_eq!(dangling, 2);
}

#[test]
fn every_block_appears_exactly_once() {
    let mut graph = BlockGraph::new();
    let ids: Vec<BlockId> = (0..6)
        .map(|i| graph.add_block(BlockKind::Statement, "", format!("step_{i}()")))
        .collect();
    graph.connect_sequence(&ids[0], &ids[1]).unwrap();
    graph.connect_sequence(&ids[1], &ids[0]).unwrap();
    graph.connect_sequence(&ids[2], &ids[3]).unwrap();
    graph.connect_sequence(&ids[3], &ids[4]).unwrap();
    graph.connect_sequence(&ids[4], &ids[2]).unwrap();

    let result = generate(&graph, &options());
    for i in 0..6 {
        let needle = format!("step_{i}()");
        assert_eq!(result.code.matches(&needle).count(), 1, "{needle}");
    }
}

#[test]
fn snapshot_is_unaffected_by_later_edits() {
    let mut graph = BlockGraph::new();
    let a = graph.add_block(BlockKind::Statement, "", "x = 1");
    let snapshot = graph.snapshot();
    graph.set_content(&a, "x = 2").unwrap();

    assert_eq!(body(&snapshot), vec!["x = 1"]);
    assert_eq!(body(&graph), vec!["x = 2"]);
}

#[test]
fn generation_is_deterministic() {
    let mut graph = BlockGraph::new();
    let head = graph.add_block(BlockKind::Control, "", "if ok:");
    let yes = graph.add_block(BlockKind::Statement, "", "go()");
    let end = graph.add_block(BlockKind::Statement, "", "stop()");
    graph.connect_sequence(&head, &yes).unwrap();
    graph.connect_sequence(&yes, &end).unwrap();
    graph.set_scope_end(&head, &end).unwrap();

    let first = generate(&graph, &options());
    let second = generate(&graph, &options());
    assert_eq!(first.code, second.code);
    assert_eq!(first.mappings, second.mappings);
}

#[test]
fn jump_to_outer_end_leaves_inner_scope_open() {
    let mut graph = BlockGraph::new();
    let outer = graph.add_block(BlockKind::Loop, "", "for a in xs:");
    let inner = graph.add_block(BlockKind::Loop, "", "for b in ys:");
    let work = graph.add_block(BlockKind::FunctionCall, "", "work()");
    let outer_end = graph.add_block(BlockKind::FunctionCall, "", "outer_end()");
    let inner_end = graph.add_block(BlockKind::FunctionCall, "", "inner_end()");
    graph.connect_sequence(&outer, &inner).unwrap();
    graph.connect_sequence(&inner, &work).unwrap();
    graph.connect_sequence(&work, &outer_end).unwrap();
    graph.set_scope_end(&outer, &outer_end).unwrap();
    graph.set_scope_end(&inner, &inner_end).unwrap();

    let result = generate(&graph, &options());
    assert_eq!(
        result.code.lines().skip(3).collect::<Vec<_>>(),
        vec!["for a in xs:", "    for b in ys:", "        work()", "outer_end()", "inner_end()"]
    );
    assert_eq!(result.orphans, vec![inner_end]);
}

#[test]
fn continuation_through_empty_block_keeps_its_successors() {
    let mut graph = BlockGraph::new();
    let assign = graph.add_block(BlockKind::Variable, "", "x =");
    let empty = graph.add_block(BlockKind::Statement, "", "");
    let value = graph.add_block(BlockKind::Operator, "", "1");
    let after = graph.add_block(BlockKind::Io, "", "print(x)");
    graph.set_continue_line(&assign, &empty).unwrap();
    graph.set_continue_line(&empty, &value).unwrap();
    graph.connect_sequence(&empty, &after).unwrap();

    assert_eq!(body(&graph), vec!["x = 1", "print(x)"]);
}

#[test]
fn empty_continuation_does_not_swallow_next_line() {
    let mut graph = BlockGraph::new();
    let call = graph.add_block(BlockKind::FunctionCall, "", "a()");
    let empty = graph.add_block(BlockKind::Operator, "", "  ");
    let next = graph.add_block(BlockKind::FunctionCall, "", "b()");
    graph.set_continue_line(&call, &empty).unwrap();
    graph.connect_sequence(&call, &next).unwrap();

    assert_eq!(body(&graph), vec!["a()", "b()"]);
}

#[test]
fn long_sequence_chain() {
    const LEN: usize = 50_000;
    let mut graph = BlockGraph::new();
    let ids: Vec<BlockId> = (0..LEN)
        .map(|i| graph.add_block(BlockKind::Statement, "", format!("x{i} = {i}")))
        .collect();
    for pair in ids.windows(2) {
        graph.connect_sequence(&pair[0], &pair[1]).unwrap();
    }

    let result = generate(&graph, &options());
    assert_eq!(result.code.lines().count(), LEN + 3);
    assert_eq!(result.mappings.len(), LEN);
    assert!(result.orphans.is_empty());
    assert!(result.code.ends_with(&format!("\nx{} = {}", LEN - 1, LEN - 1)));
}

#[test]
fn long_continuation_chain() {
    const LEN: usize = 50_000;
    let mut graph = BlockGraph::new();
    let ids: Vec<BlockId> = (0..LEN)
        .map(|_| graph.add_block(BlockKind::Operator, "", "+ 1"))
        .collect();
    for pair in ids.windows(2) {
        graph.set_continue_line(&pair[0], &pair[1]).unwrap();
    }

    let result = generate(&graph, &options());
    assert_eq!(result.code.lines().count(), 4);
    assert_eq!(result.mappings.len(), 1);
    assert_eq!(result.code.matches("+ 1").count(), LEN);
}
