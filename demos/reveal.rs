use dealscript::{Engine, Script, ScriptRng, Table};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let script = Script::from_text(
        r#"{
            event: "Werewolf",
            requireModerator: true,
            minMembers: 5,
            setup: {
                wolves: {max: [1, {minus: ["players", 4]}]},
                players: 7,
                evil: [{duplicate: "wolves", from: "Werewolf"}, "Minion"],
                roles: [
                    "evil",
                    "Seer",
                    "Mason",
                    "Mason",
                    {repeat: {minus: ["players", {plus: ["wolves", 4]}]}, from: "Villager"},
                ],
            },
            rules: [
                {deal: "roles"},
                {show: "Werewolf", to: "evil"},
                {show: "Mason", to: "Mason", hideSame: false},
                {show: {not: "evil"}, to: "Seer", as: "not evil", limit: 1},
                {announce: "Mason", whenDealt: "Mason"},
                {explain: "Minion", as: "Knows the wolves; the wolves do not know the Minion."},
            ],
        }"#,
    )
    .expect("failed to parse script");

    let table = Table::new(["ann", "bo", "cy", "di", "ed", "flo", "gus", "host"])
        .with_moderator("host");

    let output = match Engine::default().run(&script, &table, &mut ScriptRng::new(2024)) {
        Ok(output) => output,
        Err(err) => {
            println!("Run failed: {err}");
            return;
        }
    };

    println!("Channel:");
    for field in output.channel_fields() {
        println!("  {field}");
    }
    for recipient in output.direct().keys() {
        println!("{recipient}:");
        for field in output.direct_fields(recipient) {
            println!("  {field}");
        }
    }
}
