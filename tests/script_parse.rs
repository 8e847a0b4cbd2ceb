use pretty_assertions::assert_eq;

use dealscript::{
    parse, DealRule, ItemsExpr, Matcher, OptionExpr, Rule, Script, ValueExpr, ValueOp,
};

#[test]
fn json5_script_decodes() {
    let text = r#"
// A small werewolf game.
{
    event: 'Night one',
    requireModerator: true,
    minMembers: 3,
    maxMembers: {plus: ['wolves', 6]},
    setup: {
        wolves: 2,
        roles: [{duplicate: 'wolves', from: 'Wolf'}, 'Seer', 'Villager',],
    },
    rules: [
        {deal: 'roles'},
        /* wolves know each other */
        {show: 'Wolf', to: 'Wolf', hideSame: false},
        {explain: 'Wolf', as: "Wins when \"the village\" falls."},
    ],
}
"#;
    let script = Script::from_text(text).unwrap();
    assert_eq!(script.event.as_deref(), Some("Night one"));
    assert_eq!(script.require_moderator, Some(OptionExpr::Flag(true)));
    assert_eq!(script.min_members, Some(ValueExpr::Number(3.0)));
    assert_eq!(
        script.max_members,
        Some(ValueExpr::Op(ValueOp::Plus(vec!["wolves".into(), 6.0.into()])))
    );
    assert_eq!(script.setup.len(), 2);
    assert_eq!(script.rules.len(), 3);
    assert_eq!(
        script.rules[0],
        Rule::Deal(DealRule {
            deal: ItemsExpr::Label("roles".into()),
            recipients: None,
            limit: None,
            cumulative: None,
            when: Default::default(),
        })
    );
    match &script.rules[2] {
        Rule::Explain(e) => assert_eq!(e.text, "Wins when \"the village\" falls."),
        other => panic!("expected explain, got {other:?}"),
    }
}

#[test]
fn numbers_in_json5_forms() {
    let script = parse::parse("{minMembers: +.5e1, maxMembers: 0x10}").unwrap();
    assert_eq!(script.min_members, Some(ValueExpr::Number(5.0)));
    assert_eq!(script.max_members, Some(ValueExpr::Number(16.0)));
}

#[test]
fn rule_shapes_select_variants() {
    let script = Script::from_text(
        "{rules: [
            {deal: {choose: 2, from: ['a', 'b', 'c']}, for: {startsWith: 'W'}, limit: 1},
            {announce: ['Wolf', {matches: '^S'}], as: 'suspect'},
        ]}",
    )
    .unwrap();
    let Rule::Deal(deal) = &script.rules[0] else {
        panic!("expected deal");
    };
    assert!(matches!(deal.deal, ItemsExpr::Choose { .. }));
    assert!(matches!(deal.recipients, Some(Matcher::Test(_))));
    let Rule::Announce(announce) = &script.rules[1] else {
        panic!("expected announce");
    };
    assert_eq!(announce.announce.targets().len(), 2);
    assert_eq!(announce.label.as_deref(), Some("suspect"));
}

#[test]
fn malformed_text_is_a_parse_error() {
    for text in [
        "",
        "{",
        "{rules: [}",
        "{event: 'unterminated}",
        "{minMembers: Infinity}",
        "{rules: [{deal: 'a', announce: 'b'}]}",
        "{rules: [{nothing: true}]}",
        "[1, 2]",
    ] {
        let err = parse::parse(text).unwrap_err();
        assert!(
            err.to_string().starts_with("invalid script: "),
            "{text:?} gave {err}"
        );
    }
}

#[test]
fn rule_errors_name_the_problem() {
    let err = parse::parse("{rules: [{deal: 'a', announce: 'b'}]}").unwrap_err();
    assert!(err.message().contains("cannot combine deal and announce"), "{err}");
}

#[test]
fn nesting_is_bounded() {
    let deep = format!("{{setup: {{x: {}1{}}}}}", "[".repeat(200), "]".repeat(200));
    assert!(parse::parse(&deep).is_err());
    let fine = format!("{{setup: {{x: {}1{}}}}}", "[".repeat(10), "]".repeat(10));
    assert!(parse::parse(&fine).is_ok());
}
