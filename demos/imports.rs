use dealscript::{Engine, EngineConfig, MapFetcher, Script, ScriptRng, Table};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let fetcher = MapFetcher::new()
        .with(
            "base-roles",
            r#"{event: "Base", minMembers: 4, setup: {roles: ["Wolf", "Seer", "Villager", "Villager"]}}"#,
        )
        .with(
            "expansion",
            r#"{
                event: "Expansion",
                minMembers: 3,
                maxMembers: 10,
                setup: {extras: ["Witch", "Hunter"]},
                rules: [{deal: {choose: 1, from: "extras"}}],
            }"#,
        );

    let script = Script::from_text(
        r#"{
            import: ["base-roles", "expansion"],
            rules: [{deal: "roles"}, {show: "Wolf", to: "Seer"}],
        }"#,
    )
    .expect("failed to parse script");

    let engine = Engine::new(EngineConfig::default().with_max_imports(2));
    let prepared = match engine.prepare(script, &fetcher).await {
        Ok(script) => script,
        Err(err) => {
            println!("Import failed: {err}");
            return;
        }
    };
    println!(
        "Merged '{}' with {} rules and {} parameters",
        prepared.event.as_deref().unwrap_or_default(),
        prepared.rules.len(),
        prepared.setup.len()
    );

    let table = Table::new(["ann", "bo", "cy", "di"]);
    match engine.run(&prepared, &table, &mut ScriptRng::from_entropy()) {
        Ok(output) => {
            for field in output.channel_fields() {
                println!("  {field}");
            }
            println!("{} participants received private messages", output.direct().len());
        }
        Err(err) => println!("Run failed: {err}"),
    }
}
