use hbsx_syntax::ast::{
    AttrPart, AttrValue, Block, Expression, Hash, PathHead, Statement, Template,
};
use hbsx_syntax::builders::AstBuilder;
use hbsx_syntax::{preprocess, ParseOptions, Span};
use pretty_assertions::assert_eq;

fn parse(text: &str) -> Template {
    preprocess(text, &ParseOptions::default())
        .unwrap_or_else(|error| panic!("failed to parse {text:?}: {error}"))
}

/// Parse what the builder wrote and compare with what it built.
fn assert_round_trip(build: impl FnOnce(&mut AstBuilder) -> Vec<Statement>) {
    let mut b = AstBuilder::new();
    let body = build(&mut b);
    let expected = b.template(body);
    assert_eq!(parse(b.source()), expected, "template: {:?}", b.source());
}

// ============================================================================
// Round trip with the AST builder
// ============================================================================

#[test]
fn test_round_trip_content_and_mustache() {
    assert_round_trip(|b| vec![b.text("Hello "), b.mustache("name", |_| {}), b.text("!")]);
}

#[test]
fn test_round_trip_block_with_inverse() {
    assert_round_trip(|b| {
        vec![b.block_with_inverse(
            "if",
            |call| {
                call.path("cond");
            },
            |b| vec![b.text("yes")],
            |b| vec![b.text("no")],
        )]
    });
}

#[test]
fn test_round_trip_sub_expression_and_hash() {
    assert_round_trip(|b| {
        vec![b.mustache("foo", |call| {
            call.param(|b| {
                b.sexpr("bar", |call| {
                    call.path("baz");
                })
            })
            .pair("key", |b| b.string("v"))
            .pair("n", |b| b.number(2.0));
        })]
    });
}

#[test]
fn test_round_trip_element_with_this_path() {
    assert_round_trip(|b| {
        vec![b.element("p", &[("class", "x")], |b| {
            vec![b.mustache("this.y", |_| {})]
        })]
    });
}

#[test]
fn test_round_trip_literals() {
    assert_round_trip(|b| {
        vec![
            b.content_mustache(|b| b.string("lit")),
            b.text(" "),
            b.trusting_mustache("html", |call| {
                call.param(|b| b.boolean(true)).param(|b| b.null());
            }),
        ]
    });
}

#[test]
fn test_round_trip_each_with_block_params() {
    assert_round_trip(|b| {
        vec![b.block(
            "each",
            |call| {
                call.path("items").block_params(&["item"]);
            },
            |b| {
                vec![b.element("li", &[], |b| {
                    vec![b.mustache("item", |_| {})]
                })]
            },
        )]
    });
}

// ============================================================================
// Span containment
// ============================================================================

fn assert_contains(parent: Span, child: Span, what: &str) {
    assert!(
        parent.contains(child),
        "{what} {child:?} escapes its parent {parent:?}"
    );
}

fn check_block(parent: Span, block: &Block) {
    if !block.body.is_empty() {
        assert_contains(parent, block.span, "block body");
    }
    for statement in &block.body {
        check_statement(block.span, statement);
    }
}

fn check_statement(parent: Span, statement: &Statement) {
    let span = statement.span();
    assert_contains(parent, span, "statement");

    match statement {
        Statement::Element(element) => {
            for attr in &element.attributes {
                assert_contains(span, attr.span, "attribute");
                assert_contains(attr.span, attr.value.span(), "attribute value");
                if let AttrValue::Concat(concat) = &attr.value {
                    for part in &concat.parts {
                        assert_contains(concat.span, part.span(), "concat part");
                    }
                }
            }
            for modifier in &element.modifiers {
                assert_contains(span, modifier.span, "modifier");
            }
            for comment in &element.comments {
                assert_contains(span, comment.span, "tag comment");
            }
            for child in &element.children {
                check_statement(span, child);
            }
        }
        Statement::Block(block) | Statement::DecoratorBlock(block) => {
            assert_contains(span, block.path.span(), "block path");
            check_block(span, &block.program);
            if let Some(inverse) = &block.inverse {
                check_block(span, inverse);
            }
        }
        Statement::PartialBlock(partial) => {
            assert_contains(span, partial.name.span(), "partial name");
            assert_contains(span, partial.hash.span, "partial hash");
            check_block(span, &partial.program);
        }
        Statement::Mustache(mustache) => {
            assert_contains(span, mustache.path.span(), "mustache path");
            assert_contains(span, mustache.hash.span, "mustache hash");
            for param in &mustache.params {
                assert_contains(span, param.span(), "param");
            }
        }
        _ => {}
    }
}

#[test]
fn test_spans_nest() {
    let text = concat!(
        "<ul class=\"list {{kind}}\" {{on \"click\" this.pick}}>\n",
        "  {{#each @items as |item index|}}\n",
        "    <li data-index={{index}}>{{item.name}} {{! note }}</li>\n",
        "  {{else}}\n",
        "    <li>none</li>\n",
        "  {{/each}}\n",
        "</ul>\n",
    );
    assert_template_nests(text);
}

fn assert_template_nests(text: &str) {
    let template = parse(text);
    assert_eq!(template.span, Span::new(0, text.len()));
    for statement in &template.body {
        check_statement(template.span, statement);
    }
}

#[test]
fn test_spans_nest_across_block_shapes() {
    let corpus = [
        "{{#if a}}<p>x</p>{{else if b}}<b>y</b>{{else}}z{{/if}}",
        "{{#if a}}1{{else if b}}2{{else if c}}3{{/if}}",
        "{{#unless a}}<i {{on \"click\" go}}></i>{{else}}{{b}}{{/unless}}",
        "{{#> layout title=\"t\"}}<main>{{body}}</main>{{/layout}}",
        "<a href={{url}} class=\"btn {{kind}}\" title=\"{{t}}\">go</a>",
        "{{#each items as |item|}}<li data-id={{item.id}}>{{item}}</li>{{/each}}",
        "<div>\n  {{#if a}}\n    <span>{{a}}</span>\n  {{/if}}\n</div>",
    ];
    for text in corpus {
        assert_template_nests(text);
    }
}

// ============================================================================
// Heads and hashes
// ============================================================================

fn first_mustache(template: &Template) -> &hbsx_syntax::ast::MustacheStatement {
    match &template.body[0] {
        Statement::Mustache(mustache) => mustache,
        other => panic!("Expected mustache, got {other:?}"),
    }
}

#[test]
fn test_arg_head_includes_sigil() {
    let template = parse("{{@title.text}}");
    let Expression::Path(path) = &first_mustache(&template).path else {
        panic!("Expected path");
    };
    assert_eq!(
        path.head,
        PathHead::Arg {
            name: "title".into(),
            span: Span::new(2, 8)
        }
    );
    assert_eq!(path.tail, vec!["text"]);
}

#[test]
fn test_this_head_never_in_tail() {
    let template = parse("{{this}}");
    let Expression::Path(path) = &first_mustache(&template).path else {
        panic!("Expected path");
    };
    assert_eq!(path.head, PathHead::This { span: Span::new(2, 6) });
    assert!(path.tail.is_empty());
}

#[test]
fn test_missing_hash_is_zero_width() {
    let template = parse("{{foo bar}}");
    assert_eq!(first_mustache(&template).hash, Hash::empty(9));

    let template = parse("{{foo}}");
    assert_eq!(first_mustache(&template).hash, Hash::empty(5));
}

// ============================================================================
// Context injection and comments
// ============================================================================

#[test]
fn test_one_mustache_many_places() {
    let template = parse(r#"<div {{m}} a={{v}} b="x{{p}}">{{c}}</div>"#);
    let Statement::Element(div) = &template.body[0] else {
        panic!("Expected element");
    };
    assert_eq!(div.modifiers.len(), 1);
    assert!(matches!(div.attributes[0].value, AttrValue::Mustache(_)));
    match &div.attributes[1].value {
        AttrValue::Concat(concat) => {
            assert!(matches!(concat.parts[0], AttrPart::Text(_)));
            assert!(matches!(concat.parts[1], AttrPart::Mustache(_)));
        }
        other => panic!("Expected concat, got {other:?}"),
    }
    assert!(matches!(div.children[0], Statement::Mustache(_)));
}

#[test]
fn test_comment_placement() {
    let template = parse("<div {{! on tag }}>{{! in body }}<!-- {{! in html }} --></div>");
    let Statement::Element(div) = &template.body[0] else {
        panic!("Expected element");
    };
    assert_eq!(div.comments.len(), 1);
    assert!(matches!(div.children[0], Statement::MustacheComment(_)));
    match &div.children[1] {
        Statement::Comment(comment) => assert_eq!(comment.value, " {{! in html }} "),
        other => panic!("Expected HTML comment, got {other:?}"),
    }
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_errors_are_deterministic() {
    let inputs = [
        "<div>",
        "</div>",
        "<div></span>",
        "<div{{x}}></div>",
        "<div {{#if a}}{{/if}}></div>",
        "{{#if a}}<p>{{/if}}</p>",
        "{{../foo}}",
        "{{foo (\"x\")}}",
        "<input></input>",
        "{{#if a}}",
        "{{@}}",
        "{{#if a}}<p {{/if}}></p>",
        "{{#if a}}<div{{else}}></div>{{/if}}",
        "{{#if a}}<!-- {{/if}} -->",
    ];
    for input in inputs {
        let first = preprocess(input, &ParseOptions::default()).unwrap_err();
        let second = preprocess(input, &ParseOptions::default()).unwrap_err();
        assert_eq!(first, second, "input: {input:?}");
    }
}

#[test]
fn test_bare_at_path() {
    let error = preprocess("{{@}}", &ParseOptions::default()).unwrap_err();
    assert!(error.message.contains("Paths beginning with @ must start with a-z"));
    assert_eq!(error.span, Span::new(2, 3));
}

#[test]
fn test_markup_may_not_cross_a_block_boundary() {
    let cases = [
        ("{{#if a}}<p {{/if}}></p>", "Unclosed element `p`"),
        ("{{#if a}}<div{{else}}></div>{{/if}}", "Unclosed element `div`"),
        ("{{#if a}}<!-- {{/if}} -->", "Unclosed comment"),
    ];
    for (text, expected) in cases {
        let error = preprocess(text, &ParseOptions::default()).unwrap_err();
        assert_eq!(error.message, expected, "template: {text:?}");
    }
}

#[test]
fn test_error_points_at_offending_node() {
    let error = preprocess("<p>\n  <div{{x}}></div></p>", &ParseOptions::default()).unwrap_err();
    assert_eq!(error.message, "Cannot use mustaches in an elements tagname");
    assert_eq!(error.span, Span::new(10, 15));
    assert_eq!((error.line, error.column), (2, 6));
}
