//! `rustedguard rules` lists every rule id the pipeline can report.

use rustedguard_pipeline::rule_catalog;

pub async fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = rule_catalog();

    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    for phase in &catalog {
        println!("{}", phase.phase);
        for rule in &phase.invariants {
            println!("  invariant  {rule}");
        }
        for rule in &phase.overrides {
            println!("  override   {rule}");
        }
        println!();
    }
    Ok(())
}
