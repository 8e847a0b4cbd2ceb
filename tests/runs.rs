use pretty_assertions::assert_eq;

use dealscript::{
    Engine, EngineConfig, MembershipError, Output, Script, ScriptError, ScriptRng, Table, OVERFLOW,
    UNDEALT, YOU_WERE_DEALT,
};

const VILLAGE: &str = r#"{
    event: "Village",
    minMembers: 3,
    maxMembers: 6,
    setup: {
        wolves: {max: [1, {minus: ["players", 3]}]},
        players: 4,
        roles: [
            {duplicate: "wolves", from: "Wolf"},
            "Seer",
            {repeat: {minus: ["players", {plus: ["wolves", 1]}]}, from: "Villager"},
        ],
    },
    rules: [
        {deal: "roles"},
        {show: "Wolf", to: "Wolf", hideSame: false},
        {show: "Wolf", to: "Seer", as: "a wolf", limit: 1},
        {announce: "Seer", if: false},
        {explain: "Wolf", as: "Eliminate the village."},
    ],
}"#;

fn village() -> Script {
    Script::from_text(VILLAGE).unwrap()
}

fn run(script: &Script, table: &Table, seed: u64) -> Result<Output, ScriptError> {
    Engine::default().run(script, table, &mut ScriptRng::new(seed))
}

fn dealt_to(out: &Output, who: &str) -> Vec<String> {
    out.direct_fields(who)
        .filter(|f| f.name == YOU_WERE_DEALT)
        .flat_map(|f| f.value.lines().map(str::to_owned))
        .collect()
}

#[test]
fn village_deals_one_role_each() {
    let table = Table::new(["ann", "bo", "cy", "di"]);
    let out = run(&village(), &table, 11).unwrap();

    let mut roles: Vec<String> = ["ann", "bo", "cy", "di"]
        .iter()
        .flat_map(|who| dealt_to(&out, who))
        .collect();
    roles.sort();
    assert_eq!(roles, vec!["Seer", "Villager", "Villager", "Wolf"]);

    let channel: Vec<_> = out.channel_fields().collect();
    assert_eq!(channel[0].name, "1 item");
    assert_eq!(channel[0].value.split(", ").count(), 4);
    assert_eq!(channel.last().map(|f| f.name.as_str()), Some("Wolf"));
    assert!(channel.iter().all(|f| f.value != "Seer"));
}

#[test]
fn seer_sees_a_wolf_relabelled() {
    let table = Table::new(["ann", "bo", "cy", "di"]);
    let out = run(&village(), &table, 3).unwrap();
    let seer = ["ann", "bo", "cy", "di"]
        .into_iter()
        .find(|who| dealt_to(&out, who) == ["Seer"])
        .unwrap();
    let reveals: Vec<_> = out
        .direct_fields(seer)
        .filter(|f| f.name != YOU_WERE_DEALT)
        .collect();
    assert_eq!(reveals.len(), 1);
    assert_eq!(reveals[0].value, "a wolf");
}

#[test]
fn same_seed_same_output() {
    let table = Table::new(["ann", "bo", "cy", "di", "ed"]);
    assert_eq!(run(&village(), &table, 77).unwrap(), run(&village(), &table, 77).unwrap());
}

#[test]
fn five_items_two_members() {
    let script = Script::from_text("{rules: [{deal: ['A', 'B', 'C', 'D', 'E']}]}").unwrap();
    let out = run(&script, &Table::new(["p", "q"]), 1).unwrap();
    let mut sizes = vec![dealt_to(&out, "p").len(), dealt_to(&out, "q").len()];
    sizes.sort_unstable();
    assert_eq!(sizes, vec![2, 3]);
    assert!(out.channel_fields().all(|f| f.name != UNDEALT));
}

#[test]
fn moderator_sees_everything_and_is_not_dealt() {
    let script = Script::from_text("{requireModerator: true, rules: [{deal: ['A', 'B', 'C'], limit: 1}]}")
        .unwrap();
    let table = Table::new(["p", "q", "mod"]).with_moderator("mod");
    let out = run(&script, &table, 4).unwrap();

    assert!(dealt_to(&out, "mod").is_empty());
    let rollup: Vec<_> = out.direct_fields("mod").collect();
    assert_eq!(rollup.len(), 3);
    assert_eq!(rollup[2].name, UNDEALT);
    assert_eq!(rollup[2].value.lines().count(), 1);
    assert!(out.channel_fields().all(|f| f.name != UNDEALT));
}

#[test]
fn membership_bounds() {
    let err = run(&village(), &Table::new(["ann", "bo"]), 1).unwrap_err();
    assert!(matches!(
        err,
        ScriptError::Membership(MembershipError::TooFew { count: 2, min: 3 })
    ));
    let err = run(&village(), &Table::new(["a", "b", "c", "d", "e", "f", "g"]), 1).unwrap_err();
    assert_eq!(
        err.to_string(),
        "this script allows at most 6 participants, but 7 are eligible"
    );
}

#[test]
fn moderator_requirement() {
    let script = Script::from_text("{requireModerator: true, rules: [{explain: 'a', as: 'b'}]}").unwrap();
    let err = run(&script, &Table::new(["p"]), 1).unwrap_err();
    assert!(matches!(err, ScriptError::Membership(MembershipError::ModeratorRequired)));
}

#[test]
fn cumulative_show_after_second_deal() {
    let script = Script::from_text(
        "{rules: [
            {deal: ['Wolf', 'Seer']},
            {deal: ['token', 'token']},
            {show: 'Wolf', to: 'Seer'},
            {show: 'Wolf', to: 'Seer', cumulative: true},
        ]}",
    )
    .unwrap();
    let out = run(&script, &Table::new(["p", "q"]), 8).unwrap();
    let seer = ["p", "q"]
        .into_iter()
        .find(|who| dealt_to(&out, who).contains(&"Seer".to_owned()))
        .unwrap();
    let reveals: Vec<_> = out
        .direct_fields(seer)
        .filter(|f| f.name != YOU_WERE_DEALT)
        .collect();
    assert_eq!(reveals.len(), 1);
    assert_eq!(reveals[0].value, "Wolf");
}

#[test]
fn overflowing_announcements_are_capped() {
    let script = Script::from_text(
        "{rules: [{deal: {repeat: 40, from: 'coin'}}, {announce: 'coin'}]}",
    )
    .unwrap();
    let engine = Engine::new(EngineConfig::default().with_max_fields(5).with_max_embeds(2));
    let members: Vec<String> = (0..40).map(|i| format!("m{i}")).collect();
    let out = engine
        .run(&script, &Table::new(members), &mut ScriptRng::new(2))
        .unwrap();
    assert_eq!(out.channel().len(), 2);
    let last = out.channel_fields().last().unwrap();
    assert_eq!(last.name, OVERFLOW);
    assert_eq!(last.value, "…and 32 more");
}

#[test]
fn text_matcher_ignores_non_deck_parameter() {
    let script =
        Script::from_text("{setup: {Wolf: 2}, rules: [{deal: ['Alpha Wolf']}, {announce: 'Wolf'}]}")
            .unwrap();
    let out = run(&script, &Table::new(["p"]), 3).unwrap();
    let announced: Vec<_> = out
        .channel_fields()
        .filter(|f| f.value == "Alpha Wolf")
        .map(|f| f.name.clone())
        .collect();
    assert_eq!(announced, vec!["p".to_owned()]);
}
