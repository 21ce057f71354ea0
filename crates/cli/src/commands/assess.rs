//! `rustedguard assess` governs a single message.

use crate::assessment::{Assessment, assess, audit_logger, new_trace_id};
use rustedguard_config::AppConfig;
use rustedguard_core::taxonomy::IntentFraming;
use rustedguard_security::guard_trace_id;

pub async fn run(
    config: &AppConfig,
    message: &str,
    framing: Option<IntentFraming>,
    trace_id: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let trace_id = match trace_id {
        Some(value) => guard_trace_id(&value, config.input.max_trace_id_len)?,
        None => new_trace_id()?,
    };

    let audit = audit_logger(config);
    let assessment = assess(config, audit.as_ref(), trace_id, message, framing);

    if json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        print_summary(&assessment);
    }

    if !assessment.is_governed() {
        std::process::exit(2);
    }
    Ok(())
}

fn print_summary(assessment: &Assessment) {
    match assessment {
        Assessment::Governed {
            trace_id,
            governance,
            rendered,
        } => {
            let plan = &governance.output_plan;
            let intent = plan.intent();
            println!("trace:    {trace_id}");
            println!("plan:     {}", plan.id());
            println!("action:   {}", plan.action());
            println!("posture:  {}", intent.posture);
            println!("rigor:    {}", governance.control_plan.directive().rigor_level);
            println!();
            println!("{rendered}");
        }
        Assessment::Failed {
            trace_id,
            phase,
            rule,
            rendered,
        } => {
            eprintln!("trace {trace_id}: {phase} failed closed ({rule})");
            println!("{rendered}");
        }
        Assessment::Rejected {
            trace_id,
            reason,
            rendered,
        } => {
            eprintln!("trace {trace_id}: input rejected: {reason}");
            println!("{rendered}");
        }
    }
}
