use dealscript::{Engine, EngineConfig, Output, Script, ScriptRng, Table};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn print_output(output: &Output) {
    println!("{output}");
    for embed in output.channel() {
        println!("== {} ==", embed.title);
        for field in &embed.fields {
            println!("  {field}");
        }
    }
    for (recipient, embeds) in output.direct() {
        println!("-- to {recipient} --");
        for field in embeds.iter().flat_map(|e| &e.fields) {
            println!("  {field}");
        }
    }
}

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("failed to set subscriber");

    let script = Script::from_text(
        r#"{
            event: "Poker night",
            minMembers: 2,
            setup: {
                ranks: ["A", "K", "Q", "J", "10", "9", "8", "7", "6", "5", "4", "3", "2"],
                suits: ["♠", "♥", "♦", "♣"],
                cards: {cross: "ranks", with: "suits", using: ""},
            },
            rules: [
                {deal: "cards", limit: 2},
                {explain: "Hold'em", as: "Two cards each; the rest stay in the deck."},
            ],
        }"#,
    )
    .expect("failed to parse script");

    let engine = Engine::new(EngineConfig::default().with_default_title("Cards"));
    let table = Table::new(["ann", "bo", "cy"]);

    match engine.run(&script, &table, &mut ScriptRng::from_entropy()) {
        Ok(output) => print_output(&output),
        Err(err) => println!("Run failed: {err}"),
    }
}
